//! Identity input for naming resolution.

use crate::terraform::tfvars::TfVars;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_PIPELINE: &str = "github-actions";

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Prod,
    Stag,
    Test,
    Dev,
    Sbx,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Prod => "prod",
            Environment::Stag => "stag",
            Environment::Test => "test",
            Environment::Dev => "dev",
            Environment::Sbx => "sbx",
        }
    }

    /// Single-letter code used in short identifiers
    pub fn short_code(&self) -> &'static str {
        match self {
            Environment::Prod => "p",
            Environment::Stag => "s",
            Environment::Test => "t",
            Environment::Dev => "d",
            Environment::Sbx => "x",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prod" => Ok(Environment::Prod),
            "stag" => Ok(Environment::Stag),
            "test" => Ok(Environment::Test),
            "dev" => Ok(Environment::Dev),
            "sbx" => Ok(Environment::Sbx),
            _ => Err(anyhow::anyhow!(
                "Unknown environment: {}. Valid environments: prod, stag, test, dev, sbx",
                s
            )),
        }
    }
}

/// The environment vocabulary a deployment uses.
///
/// `stag` and `test` are distinct and never mapped onto each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentSet {
    /// prod, stag, dev, sbx
    #[default]
    Standard,
    /// dev, test, prod, sbx
    Legacy,
}

impl EnvironmentSet {
    pub fn members(&self) -> &'static [Environment] {
        match self {
            EnvironmentSet::Standard => &[
                Environment::Prod,
                Environment::Stag,
                Environment::Dev,
                Environment::Sbx,
            ],
            EnvironmentSet::Legacy => &[
                Environment::Dev,
                Environment::Test,
                Environment::Prod,
                Environment::Sbx,
            ],
        }
    }

    pub fn contains(&self, environment: Environment) -> bool {
        self.members().contains(&environment)
    }

    pub fn describe(&self) -> String {
        self.members()
            .iter()
            .map(Environment::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::str::FromStr for EnvironmentSet {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "standard" => Ok(EnvironmentSet::Standard),
            "legacy" => Ok(EnvironmentSet::Legacy),
            _ => Err(anyhow::anyhow!(
                "Unknown environment set: {}. Valid sets: standard, legacy",
                s
            )),
        }
    }
}

/// Whether the second identity component names a product or a client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TenantKind {
    Product,
    Client,
}

impl TenantKind {
    pub fn id_tag_key(&self) -> &'static str {
        match self {
            TenantKind::Product => "product:Id",
            TenantKind::Client => "client:Id",
        }
    }

    /// Field named by validation errors for the display name
    pub fn name_field(&self) -> &'static str {
        match self {
            TenantKind::Product => "product",
            TenantKind::Client => "client",
        }
    }

    /// Field named by validation errors for the moniker
    pub fn moniker_field(&self) -> &'static str {
        match self {
            TenantKind::Product => "product_moniker",
            TenantKind::Client => "client_moniker",
        }
    }
}

/// Raw identity attributes, validated only when resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityContext {
    pub org: String,
    pub org_moniker: String,
    pub tenant_kind: TenantKind,
    pub tenant: String,
    pub tenant_moniker: String,
    pub environment: String,
    pub layer: String,
    pub aws_region: Option<String>,
    pub aws_account_id: Option<String>,
    pub semantic_version: String,
    pub org_domain: Option<String>,
    pub data_residency: Option<String>,
    pub pipeline: Option<String>,
    pub cost_center: Option<String>,
}

impl IdentityContext {
    /// Build an identity from tfvars values.
    ///
    /// `client_name`/`client_moniker` are used when no product keys are set.
    /// Missing required keys become empty strings and fail validation later.
    pub fn from_tfvars(vars: &TfVars, environment: Environment, layer: &str) -> Self {
        let has_product = vars.get("product_moniker").is_some() || vars.get("product_name").is_some();
        let has_client = vars.get("client_moniker").is_some() || vars.get("client_name").is_some();
        let (tenant_kind, tenant, tenant_moniker) = if !has_product && has_client {
            (
                TenantKind::Client,
                vars.get_or_default("client_name"),
                vars.get_or_default("client_moniker"),
            )
        } else {
            (
                TenantKind::Product,
                vars.get_or_default("product_name"),
                vars.get_or_default("product_moniker"),
            )
        };

        Self {
            org: vars.get_or_default("org_name"),
            org_moniker: vars.get_or_default("org_moniker"),
            tenant_kind,
            tenant,
            tenant_moniker,
            environment: environment.as_str().to_string(),
            layer: layer.to_string(),
            aws_region: vars.get_non_empty("aws_region"),
            aws_account_id: vars.get_non_empty("aws_account_id"),
            semantic_version: vars.get_or_default("semantic_version"),
            org_domain: vars.get_non_empty("org_domain"),
            data_residency: vars.get_non_empty("data_residency"),
            pipeline: vars.get_non_empty("pipeline"),
            cost_center: vars.get_non_empty("cost_center"),
        }
    }
}
