//! Backend-config generation for every layer.

use crate::naming::ambient::AmbientContextProvider;
use crate::naming::identity::Environment;
use crate::naming::resolver::ResolvedNaming;
use crate::shared::logging;
use crate::terraform::backend_config::BackendConfig;
use crate::terraform::layers::{Layer, LayerPaths};
use crate::terraform::template::{render_template, DEFAULT_BACKEND_TEMPLATE};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Remote backend location shared by all layers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendValues {
    pub bucket: String,
    pub region: String,
    /// KMS key ARN or alias
    pub kms_key_id: String,
}

impl BackendValues {
    /// Names the bootstrap layer is expected to have created. Not verified.
    pub fn predicted(naming: &ResolvedNaming) -> Self {
        Self {
            bucket: naming.state_bucket(),
            region: naming.region.clone(),
            kms_key_id: naming.state_kms_alias(),
        }
    }

    pub fn from_config(config: &BackendConfig) -> Self {
        Self {
            bucket: config.bucket.clone(),
            region: config.region.clone(),
            kms_key_id: config.kms_key_id.clone(),
        }
    }

    pub fn for_layer(&self, layer: Layer, environment: Environment) -> BackendConfig {
        BackendConfig {
            bucket: self.bucket.clone(),
            key: layer.state_key().to_string(),
            region: self.region.clone(),
            kms_key_id: self.kms_key_id.clone(),
            env_label: environment.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenerationSummary {
    pub written: Vec<(Layer, PathBuf)>,
    /// Layers without a template
    pub skipped: Vec<Layer>,
}

impl GenerationSummary {
    pub fn wrote(&self, layer: Layer) -> bool {
        self.written.iter().any(|(written, _)| *written == layer)
    }
}

/// Resolve a KMS alias to its ARN, keeping the alias when the lookup fails
pub fn resolve_kms_key(kms_key_id: &str, region: &str, ambient: &dyn AmbientContextProvider) -> String {
    if kms_key_id.starts_with("arn:") || kms_key_id.is_empty() {
        return kms_key_id.to_string();
    }

    match ambient.resolve_kms_alias(kms_key_id, region) {
        Ok(arn) => {
            logging::info(&format!("Resolved {} to {}", kms_key_id, arn));
            arn
        }
        Err(e) => {
            logging::warn(&format!(
                "Could not resolve KMS alias {} ({}), using the alias as-is",
                kms_key_id, e
            ));
            kms_key_id.to_string()
        }
    }
}

/// Render and write the backend config of every layer that has a template.
///
/// Existing configs are overwritten. Missing templates are counted, not
/// treated as errors.
pub fn generate_backend_configs(
    root: &Path,
    environment: Environment,
    values: &BackendValues,
    ambient: &dyn AmbientContextProvider,
) -> anyhow::Result<GenerationSummary> {
    let values = BackendValues {
        kms_key_id: resolve_kms_key(&values.kms_key_id, &values.region, ambient),
        ..values.clone()
    };

    let mut summary = GenerationSummary::default();
    for layer in Layer::ALL {
        let paths = LayerPaths::new(root, layer);
        let template_path = paths.template();

        let template = match std::fs::read_to_string(&template_path) {
            Ok(template) => template,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                logging::info(&format!(
                    "Skipping layer {}: no template at {}",
                    layer,
                    template_path.display()
                ));
                summary.skipped.push(layer);
                continue;
            }
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "Failed to read template {}: {}",
                    template_path.display(),
                    e
                ))
            }
        };

        let config = values.for_layer(layer, environment);
        let output_path = paths.backend_config(environment);
        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&output_path, render_template(&template, &config))?;

        logging::info(&format!(
            "Wrote backend config for {} to {}",
            layer,
            output_path.display()
        ));
        summary.written.push((layer, output_path));
    }

    logging::info(&format!(
        "Generated {} backend configs, skipped {} layers without a template",
        summary.written.len(),
        summary.skipped.len()
    ));
    Ok(summary)
}

/// Write the default template into layer directories that exist but have none
pub fn scaffold_templates(root: &Path) -> anyhow::Result<Vec<Layer>> {
    let mut created = Vec::new();
    for layer in Layer::ALL {
        let paths = LayerPaths::new(root, layer);
        if !paths.directory.is_dir() || paths.template().exists() {
            continue;
        }
        std::fs::write(paths.template(), DEFAULT_BACKEND_TEMPLATE)?;
        logging::info(&format!(
            "Created {}",
            paths.template().display()
        ));
        created.push(layer);
    }
    Ok(created)
}
