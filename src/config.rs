use crate::naming::identity::EnvironmentSet;
use crate::naming::resolver::{NamingRules, DEFAULT_REGION};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_DIR_NAME: &str = ".lzctl";
pub const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub terraform: TerraformConfig,
    pub aws: AwsConfig,
    pub naming: NamingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerraformConfig {
    /// Terraform binary; looked up in PATH when unset
    pub executable_path: Option<String>,
    /// Directory holding the numbered layer directories
    pub root_directory: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AwsConfig {
    /// aws CLI binary; looked up in PATH when unset
    pub executable_path: Option<String>,
    /// Region used when neither tfvars nor the ambient profile name one
    pub default_region: String,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            executable_path: None,
            default_region: DEFAULT_REGION.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    pub environment_set: EnvironmentSet,
}

impl Config {
    pub fn naming_rules(&self) -> NamingRules {
        NamingRules {
            environment_set: self.naming.environment_set,
            default_region: self.aws.default_region.clone(),
        }
    }

    /// Apply `LZCTL_*` overrides read through `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(root) = lookup("LZCTL_ROOT") {
            self.terraform.root_directory = Some(root);
        }
        if let Some(binary) = lookup("LZCTL_TERRAFORM_BINARY") {
            self.terraform.executable_path = Some(binary);
        }
        if let Some(binary) = lookup("LZCTL_AWS_BINARY") {
            self.aws.executable_path = Some(binary);
        }
        if let Some(region) = lookup("LZCTL_DEFAULT_REGION") {
            self.aws.default_region = region;
        }
        if let Some(set) = lookup("LZCTL_ENVIRONMENT_SET") {
            self.naming.environment_set = set.parse()?;
        }
        Ok(())
    }
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn load_file(path: &Path) -> anyhow::Result<Config> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Invalid config {}: {}", path.display(), e))
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Load an explicit config file, then apply environment overrides
pub fn init_from_path(path: &str) -> anyhow::Result<Config> {
    let mut config = load_file(Path::new(path))?;
    config.apply_overrides(env_lookup)?;
    Ok(config)
}

/// Load `~/.lzctl/config.json` when present, then apply environment overrides
pub fn init_default() -> anyhow::Result<Config> {
    let mut config = match default_config_path() {
        Some(path) if path.exists() => load_file(&path)?,
        _ => Config::default(),
    };
    config.apply_overrides(env_lookup)?;
    Ok(config)
}
