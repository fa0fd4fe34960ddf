//! Ambient account/region context.
//!
//! Lookups are injected into the resolver and the orchestrator; nothing here
//! is read from process-wide state except by `AwsCliAmbient` itself.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Command;

pub trait AmbientContextProvider {
    /// Account id of the active credentials
    fn account_id(&self) -> anyhow::Result<String>;

    /// Region of the active profile
    fn region(&self) -> anyhow::Result<String>;

    /// Resolve a KMS alias (e.g. `alias/kms-x-tfstate`) to a key ARN
    fn resolve_kms_alias(&self, alias: &str, region: &str) -> anyhow::Result<String>;
}

/// Looks up ambient context through the `aws` CLI.
pub struct AwsCliAmbient {
    aws_path: PathBuf,
}

impl AwsCliAmbient {
    pub fn new(aws_path: PathBuf) -> Self {
        Self { aws_path }
    }

    fn run(&self, args: &[&str]) -> anyhow::Result<String> {
        let output = Command::new(&self.aws_path).args(args).output()?;

        if !output.status.success() {
            return Err(anyhow::anyhow!(
                "aws {} failed: {}",
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }

        let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if value.is_empty() || value == "None" {
            return Err(anyhow::anyhow!("aws {} returned no value", args.join(" ")));
        }
        Ok(value)
    }
}

impl AmbientContextProvider for AwsCliAmbient {
    fn account_id(&self) -> anyhow::Result<String> {
        self.run(&[
            "sts",
            "get-caller-identity",
            "--query",
            "Account",
            "--output",
            "text",
        ])
    }

    fn region(&self) -> anyhow::Result<String> {
        for var in ["AWS_REGION", "AWS_DEFAULT_REGION"] {
            if let Ok(region) = std::env::var(var) {
                if !region.trim().is_empty() {
                    return Ok(region.trim().to_string());
                }
            }
        }
        self.run(&["configure", "get", "region"])
    }

    fn resolve_kms_alias(&self, alias: &str, region: &str) -> anyhow::Result<String> {
        self.run(&[
            "kms",
            "describe-key",
            "--key-id",
            alias,
            "--region",
            region,
            "--query",
            "KeyMetadata.Arn",
            "--output",
            "text",
        ])
    }
}

/// Fixed ambient values. With nothing set every lookup fails, which is what
/// an offline run without the `aws` CLI looks like.
#[derive(Debug, Clone, Default)]
pub struct StaticAmbient {
    pub account_id: Option<String>,
    pub region: Option<String>,
    pub kms_arns: HashMap<String, String>,
}

impl StaticAmbient {
    pub fn offline() -> Self {
        Self::default()
    }

    pub fn with_kms_arn(mut self, alias: &str, arn: &str) -> Self {
        self.kms_arns.insert(alias.to_string(), arn.to_string());
        self
    }
}

impl AmbientContextProvider for StaticAmbient {
    fn account_id(&self) -> anyhow::Result<String> {
        self.account_id
            .clone()
            .ok_or_else(|| anyhow::anyhow!("No ambient account id available"))
    }

    fn region(&self) -> anyhow::Result<String> {
        self.region
            .clone()
            .ok_or_else(|| anyhow::anyhow!("No ambient region available"))
    }

    fn resolve_kms_alias(&self, alias: &str, _region: &str) -> anyhow::Result<String> {
        self.kms_arns
            .get(alias)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("KMS alias {} not found", alias))
    }
}
