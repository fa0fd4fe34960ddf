//! Per-layer S3 backend configuration artifacts.

use crate::terraform::tfvars::TfVars;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Where a layer keeps its remote state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    pub bucket: String,
    pub key: String,
    pub region: String,
    pub kms_key_id: String,
    pub env_label: String,
}

impl BackendConfig {
    /// Render in the `-backend-config` file format every layer reads
    pub fn render(&self) -> String {
        format!(
            "bucket       = \"{}\"\nkey          = \"{}\"\nregion       = \"{}\"\nencrypt      = true\nkms_key_id   = \"{}\"\nuse_lockfile = true\n",
            self.bucket, self.key, self.region, self.kms_key_id
        )
    }

    pub fn from_vars(vars: &TfVars, env_label: &str) -> Self {
        Self {
            bucket: vars.get_or_default("bucket"),
            key: vars.get_or_default("key"),
            region: vars.get_or_default("region"),
            kms_key_id: vars.get_or_default("kms_key_id"),
            env_label: env_label.to_string(),
        }
    }

    /// Read an existing backend-config file.
    ///
    /// Returns `Ok(None)` when the file is missing or its bucket is empty,
    /// which both mean "no usable remote backend recorded".
    pub fn read_existing(path: &Path, env_label: &str) -> std::io::Result<Option<Self>> {
        let vars = match TfVars::read(path) {
            Ok(vars) => vars,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };

        let config = Self::from_vars(&vars, env_label);
        if config.bucket.trim().is_empty() {
            Ok(None)
        } else {
            Ok(Some(config))
        }
    }
}
