use crate::bootstrap::state_backend::StateBackend;
use crate::shared::logging;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use thiserror::Error;

pub const BACKEND_DECLARATION_FILE: &str = "backend.tf";
pub const DISABLED_BACKEND_DECLARATION_FILE: &str = "backend.tf.disabled";

const DEFAULT_BACKEND_DECLARATION: &str = r#"terraform {
  backend "s3" {}
}
"#;

#[derive(Error, Debug)]
pub enum TerraformError {
    #[error("terraform {command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("Terraform binary not found at path: {0}")]
    BinaryNotFound(String),

    #[error("Invalid JSON output: {0}")]
    JsonParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Drives the `terraform` binary inside one layer directory.
pub struct TerraformService {
    terraform_path: PathBuf,
    project_directory: PathBuf,
    var_file: Option<PathBuf>,
}

impl TerraformService {
    pub fn new(terraform_path: PathBuf, project_directory: PathBuf) -> Self {
        logging::debug(&format!(
            "TerraformService initialized with terraform path: {} and project directory: {}",
            terraform_path.display(),
            project_directory.display()
        ));
        Self {
            terraform_path,
            project_directory,
            var_file: None,
        }
    }

    /// Pass `-var-file` to plan and apply
    pub fn with_var_file(mut self, var_file: PathBuf) -> Self {
        self.var_file = Some(var_file);
        self
    }

    fn command(&self, args: &[String]) -> Command {
        let mut cmd = Command::new(&self.terraform_path);
        cmd.args(args)
            .env("TF_IN_AUTOMATION", "1")
            .current_dir(&self.project_directory);
        cmd
    }

    /// Run with captured output, returning stdout
    fn run(&self, args: &[String]) -> Result<String, TerraformError> {
        logging::debug(&format!("Running terraform {}", args.join(" ")));
        let output = self
            .command(args)
            .output()
            .map_err(|e| self.spawn_error(e))?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        } else {
            Err(TerraformError::CommandFailed {
                command: args.join(" "),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }

    /// Run attached to the operator's terminal
    fn run_interactive(&self, args: &[String]) -> Result<(), TerraformError> {
        logging::debug(&format!("Running terraform {} (interactive)", args.join(" ")));
        let status = self
            .command(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| self.spawn_error(e))?;

        if status.success() {
            Ok(())
        } else {
            Err(TerraformError::CommandFailed {
                command: args.join(" "),
                stderr: format!("exited with {}", status),
            })
        }
    }

    fn spawn_error(&self, e: std::io::Error) -> TerraformError {
        if e.kind() == std::io::ErrorKind::NotFound {
            TerraformError::BinaryNotFound(self.terraform_path.display().to_string())
        } else {
            TerraformError::IoError(e)
        }
    }

    fn var_file_args(&self) -> Vec<String> {
        self.var_file
            .iter()
            .map(|path| format!("-var-file={}", path.display()))
            .collect()
    }

    fn backend_declaration(&self) -> PathBuf {
        self.project_directory.join(BACKEND_DECLARATION_FILE)
    }

    fn disabled_backend_declaration(&self) -> PathBuf {
        self.project_directory
            .join(DISABLED_BACKEND_DECLARATION_FILE)
    }
}

fn strings(args: &[&str]) -> Vec<String> {
    args.iter().map(|arg| arg.to_string()).collect()
}

fn backend_config_arg(path: &Path) -> String {
    format!("-backend-config={}", path.display())
}

/// Keep only string outputs from `terraform output -json`
pub fn parse_string_outputs(json: &str) -> Result<HashMap<String, String>, TerraformError> {
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| TerraformError::JsonParseError(e.to_string()))?;

    let outputs = value
        .as_object()
        .map(|map| {
            map.iter()
                .filter_map(|(name, output)| {
                    output
                        .get("value")
                        .and_then(|v| v.as_str())
                        .map(|v| (name.clone(), v.to_string()))
                })
                .collect()
        })
        .unwrap_or_default();
    Ok(outputs)
}

impl StateBackend for TerraformService {
    fn disable_remote_backend(&mut self) -> anyhow::Result<()> {
        let declaration = self.backend_declaration();
        if declaration.exists() {
            logging::info(&format!(
                "Disabling remote backend declaration {}",
                declaration.display()
            ));
            std::fs::rename(&declaration, self.disabled_backend_declaration())?;
        }
        Ok(())
    }

    fn enable_remote_backend(&mut self) -> anyhow::Result<()> {
        let declaration = self.backend_declaration();
        let disabled = self.disabled_backend_declaration();
        if disabled.exists() {
            std::fs::rename(&disabled, &declaration)?;
        } else if !declaration.exists() {
            logging::info(&format!(
                "Writing default S3 backend declaration to {}",
                declaration.display()
            ));
            std::fs::write(&declaration, DEFAULT_BACKEND_DECLARATION)?;
        }
        Ok(())
    }

    fn init_local(&mut self) -> anyhow::Result<()> {
        self.run(&strings(&["init", "-input=false", "-reconfigure"]))?;
        Ok(())
    }

    fn init_remote(&mut self, backend_config: &Path) -> anyhow::Result<()> {
        let mut args = strings(&["init", "-input=false", "-reconfigure"]);
        args.push(backend_config_arg(backend_config));
        self.run(&args)?;
        Ok(())
    }

    fn list_state(&mut self) -> anyhow::Result<Vec<String>> {
        let stdout = self.run(&strings(&["state", "list"]))?;
        Ok(stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn plan(&mut self) -> anyhow::Result<()> {
        let mut args = strings(&["plan", "-input=false"]);
        args.extend(self.var_file_args());
        self.run_interactive(&args)?;
        Ok(())
    }

    fn apply(&mut self, auto_approve: bool) -> anyhow::Result<()> {
        let mut args = strings(&["apply"]);
        if auto_approve {
            args.push("-auto-approve".to_string());
            args.push("-input=false".to_string());
        }
        args.extend(self.var_file_args());
        self.run_interactive(&args)?;
        Ok(())
    }

    fn outputs(&mut self) -> anyhow::Result<HashMap<String, String>> {
        let stdout = self.run(&strings(&["output", "-json"]))?;
        Ok(parse_string_outputs(&stdout)?)
    }

    fn migrate_state(&mut self, backend_config: &Path) -> anyhow::Result<()> {
        let mut args = strings(&["init", "-input=false", "-migrate-state", "-force-copy"]);
        args.push(backend_config_arg(backend_config));
        self.run(&args)?;
        Ok(())
    }
}
