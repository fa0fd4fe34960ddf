//! The fixed set of deployment layers and their on-disk layout.

use crate::naming::identity::Environment;
use crate::terraform::template::TEMPLATE_FILE_NAME;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const BACKEND_CONFIG_FILE_NAME: &str = "backend.conf";
pub const TFVARS_FILE_NAME: &str = "terraform.tfvars";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Layer {
    Bootstrap,
    Governance,
    Infrastructure,
    DataAndAi,
    Compute,
    Applications,
}

impl Layer {
    /// Dependency order
    pub const ALL: [Layer; 6] = [
        Layer::Bootstrap,
        Layer::Governance,
        Layer::Infrastructure,
        Layer::DataAndAi,
        Layer::Compute,
        Layer::Applications,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Layer::Bootstrap => "bootstrap",
            Layer::Governance => "governance",
            Layer::Infrastructure => "infrastructure",
            Layer::DataAndAi => "data-and-ai",
            Layer::Compute => "compute",
            Layer::Applications => "applications",
        }
    }

    pub fn directory(&self) -> &'static str {
        match self {
            Layer::Bootstrap => "01-bootstrap",
            Layer::Governance => "02-governance",
            Layer::Infrastructure => "03-infrastructure",
            Layer::DataAndAi => "04-data-ai",
            Layer::Compute => "05-compute",
            Layer::Applications => "06-applications",
        }
    }

    /// Canonical remote state key
    pub fn state_key(&self) -> &'static str {
        match self {
            Layer::Bootstrap => "bootstrap/terraform.tfstate",
            Layer::Governance => "governance/terraform.tfstate",
            Layer::Infrastructure => "infrastructure/terraform.tfstate",
            Layer::DataAndAi => "data-ai/terraform.tfstate",
            Layer::Compute => "compute/terraform.tfstate",
            Layer::Applications => "applications/terraform.tfstate",
        }
    }

    /// Look a layer up by name or directory
    pub fn find(value: &str) -> Option<Layer> {
        Layer::ALL
            .into_iter()
            .find(|layer| layer.name() == value || layer.directory() == value)
    }
}

impl std::fmt::Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Paths of one layer inside a project root
#[derive(Debug, Clone)]
pub struct LayerPaths {
    pub layer: Layer,
    pub directory: PathBuf,
}

impl LayerPaths {
    pub fn new(root: &Path, layer: Layer) -> Self {
        Self {
            layer,
            directory: root.join(layer.directory()),
        }
    }

    pub fn template(&self) -> PathBuf {
        self.directory.join(TEMPLATE_FILE_NAME)
    }

    pub fn environment_dir(&self, environment: Environment) -> PathBuf {
        self.directory.join("environments").join(environment.as_str())
    }

    pub fn backend_config(&self, environment: Environment) -> PathBuf {
        self.environment_dir(environment)
            .join(BACKEND_CONFIG_FILE_NAME)
    }

    pub fn tfvars(&self, environment: Environment) -> PathBuf {
        self.environment_dir(environment).join(TFVARS_FILE_NAME)
    }
}
