use crate::bootstrap::generator::{
    generate_backend_configs, scaffold_templates, BackendValues, GenerationSummary,
};
use crate::bootstrap::orchestrator::{BootstrapOrchestrator, BootstrapReport};
use crate::bootstrap::phase::{BootstrapOptions, PhaseFailure};
use crate::config::{self, Config};
use crate::naming::ambient::{AmbientContextProvider, AwsCliAmbient, StaticAmbient};
use crate::naming::identity::{Environment, IdentityContext};
use crate::naming::resolver::{NamingResolver, ResolvedNaming};
use crate::naming::validation::ValidationError;
use crate::shared::logging;
use crate::terraform::backend_config::BackendConfig;
use crate::terraform::layers::{Layer, LayerPaths};
use crate::terraform::service::TerraformService;
use crate::terraform::tfvars::TfVars;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum LandingZoneError {
    #[error("Terraform binary not found")]
    TerraformNotFound,

    #[error("No identity variables for {environment} at {path}")]
    IdentityNotFound { environment: Environment, path: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Phase(#[from] PhaseFailure),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// A landing-zone project on disk plus the tools used to operate it.
pub struct LandingZone {
    config: Config,
    root: PathBuf,
    ambient: Box<dyn AmbientContextProvider>,
}

fn absolute(path: &str) -> anyhow::Result<PathBuf> {
    let path_buf = PathBuf::from(path);
    if path_buf.is_absolute() {
        Ok(path_buf)
    } else {
        Ok(std::env::current_dir()?.join(path_buf))
    }
}

impl LandingZone {
    pub fn new(config_path: Option<String>, root_dir: Option<String>) -> anyhow::Result<Self> {
        let config = match config_path {
            Some(path) => {
                let abs_path = absolute(&path)?;
                logging::info(&format!("Using config file: {}", abs_path.display()));
                config::init_from_path(&abs_path.to_string_lossy())?
            }
            None => {
                logging::debug("No config path provided, using default configuration");
                config::init_default()?
            }
        };

        // Priority for the project root:
        // 1. Command line argument
        // 2. LZCTL_ROOT (already folded into config)
        // 3. Config file
        // 4. Current directory
        let root = match root_dir.or_else(|| config.terraform.root_directory.clone()) {
            Some(dir) => absolute(&dir)?,
            None => std::env::current_dir()?,
        };
        logging::info(&format!("Landing zone root: {}", root.display()));

        let aws_path = match &config.aws.executable_path {
            Some(path) => Some(absolute(path)?),
            None => which::which("aws").ok(),
        };
        let ambient: Box<dyn AmbientContextProvider> = match aws_path {
            Some(path) => {
                logging::debug(&format!("Using aws CLI at {}", path.display()));
                Box::new(AwsCliAmbient::new(path))
            }
            None => {
                logging::warn("aws CLI not found, ambient account and region lookups are disabled");
                Box::new(StaticAmbient::offline())
            }
        };

        Ok(Self::with_ambient(config, root, ambient))
    }

    pub fn with_ambient(
        config: Config,
        root: PathBuf,
        ambient: Box<dyn AmbientContextProvider>,
    ) -> Self {
        Self {
            config,
            root,
            ambient,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolver(&self) -> NamingResolver<'_> {
        NamingResolver::new(self.ambient.as_ref(), self.config.naming_rules())
    }

    /// Identity shared by all layers, read from the bootstrap layer's tfvars
    pub fn identity(
        &self,
        environment: Environment,
        layer: &str,
    ) -> Result<IdentityContext, LandingZoneError> {
        let path = LayerPaths::new(&self.root, Layer::Bootstrap).tfvars(environment);
        let vars = match TfVars::read(&path) {
            Ok(vars) => vars,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(LandingZoneError::IdentityNotFound {
                    environment,
                    path: path.display().to_string(),
                })
            }
            Err(e) => return Err(anyhow::Error::from(e).into()),
        };

        if let Some(declared) = vars.get("environment") {
            if declared != environment.as_str() {
                logging::warn(&format!(
                    "{} declares environment '{}', using '{}'",
                    path.display(),
                    declared,
                    environment
                ));
            }
        }

        let layer = Layer::find(layer).map(|l| l.name()).unwrap_or(layer);
        Ok(IdentityContext::from_tfvars(&vars, environment, layer))
    }

    pub fn resolve_names(
        &self,
        environment: Environment,
        layer: &str,
    ) -> Result<ResolvedNaming, LandingZoneError> {
        let ctx = self.identity(environment, layer)?;
        Ok(self.resolver().resolve(&ctx)?)
    }

    fn terraform_path(&self) -> Result<PathBuf, LandingZoneError> {
        let path = match &self.config.terraform.executable_path {
            Some(path) => absolute(path)?,
            None => which::which("terraform").map_err(|_| {
                logging::error("Terraform binary 'terraform' not found in PATH");
                LandingZoneError::TerraformNotFound
            })?,
        };

        if !path.exists() {
            logging::error(&format!(
                "Terraform binary not found at: {}",
                path.display()
            ));
            return Err(LandingZoneError::TerraformNotFound);
        }
        Ok(path)
    }

    pub fn bootstrap(
        &self,
        environment: Environment,
        options: BootstrapOptions,
    ) -> Result<BootstrapReport, LandingZoneError> {
        let naming = self.resolve_names(environment, Layer::Bootstrap.name())?;
        let paths = LayerPaths::new(&self.root, Layer::Bootstrap);
        let service = TerraformService::new(self.terraform_path()?, paths.directory.clone())
            .with_var_file(paths.tfvars(environment));

        let mut orchestrator =
            BootstrapOrchestrator::new(service, self.ambient.as_ref(), self.root.clone(), naming);
        Ok(orchestrator.run(options)?)
    }

    /// Regenerate every layer's backend config without touching Terraform
    pub fn generate(&self, environment: Environment) -> Result<GenerationSummary, LandingZoneError> {
        let config_path = LayerPaths::new(&self.root, Layer::Bootstrap).backend_config(environment);
        let values = match BackendConfig::read_existing(&config_path, environment.as_str())
            .map_err(anyhow::Error::from)?
        {
            Some(existing) => BackendValues::from_config(&existing),
            None => {
                let naming = self.resolve_names(environment, Layer::Bootstrap.name())?;
                logging::warn(&format!(
                    "No backend config at {}, using names predicted from naming",
                    config_path.display()
                ));
                BackendValues::predicted(&naming)
            }
        };

        Ok(generate_backend_configs(
            &self.root,
            environment,
            &values,
            self.ambient.as_ref(),
        )?)
    }

    pub fn scaffold(&self) -> Result<Vec<Layer>, LandingZoneError> {
        Ok(scaffold_templates(&self.root)?)
    }
}
