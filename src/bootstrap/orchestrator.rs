//! Staged remote-state bootstrap.
//!
//! ```text
//! ProbingRemote ─┬─ remote found ──────────────────────────────┬─ GeneratingConfigs ─ Verifying ─ Done
//!                └─ LocalBootstrap ─ Applying ─ GeneratingConfigs ─ MigratingState ─┘
//! ```
//!
//! Re-running against a bootstrapped environment only regenerates the
//! backend-config files.

use crate::bootstrap::generator::{generate_backend_configs, BackendValues, GenerationSummary};
use crate::bootstrap::phase::{BootstrapOptions, BootstrapState, Phase, PhaseFailure};
use crate::bootstrap::state_backend::StateBackend;
use crate::naming::ambient::AmbientContextProvider;
use crate::naming::resolver::ResolvedNaming;
use crate::shared::logging;
use crate::terraform::backend_config::BackendConfig;
use crate::terraform::layers::{Layer, LayerPaths};
use serde::Serialize;
use std::path::{Path, PathBuf};

pub const BUCKET_OUTPUT: &str = "state_bucket_name";
pub const KMS_KEY_OUTPUT: &str = "state_kms_key_arn";

#[derive(Debug, Clone, Serialize)]
pub struct BootstrapReport {
    pub phases: Vec<Phase>,
    pub remote_state_detected: bool,
    pub backend: BackendValues,
    pub generation: GenerationSummary,
    pub warnings: Vec<String>,
}

pub struct BootstrapOrchestrator<'a, B: StateBackend> {
    backend: B,
    ambient: &'a dyn AmbientContextProvider,
    root: PathBuf,
    naming: ResolvedNaming,
    state: BootstrapState,
}

impl<'a, B: StateBackend> BootstrapOrchestrator<'a, B> {
    /// `naming` must be resolved for the bootstrap layer of the target
    /// environment.
    pub fn new(
        backend: B,
        ambient: &'a dyn AmbientContextProvider,
        root: PathBuf,
        naming: ResolvedNaming,
    ) -> Self {
        Self {
            backend,
            ambient,
            root,
            naming,
            state: BootstrapState::new(),
        }
    }

    pub fn state(&self) -> &BootstrapState {
        &self.state
    }

    fn bootstrap_config_path(&self) -> PathBuf {
        LayerPaths::new(&self.root, Layer::Bootstrap).backend_config(self.naming.environment)
    }

    fn enter(&mut self, phase: Phase, message: &str) {
        self.state.enter(phase);
        logging::phase(phase, message);
    }

    fn fail(&self, cause: anyhow::Error) -> PhaseFailure {
        let phase = self.state.phase;
        logging::error(&format!("{} phase failed: {}", phase, cause));
        PhaseFailure { phase, cause }
    }

    pub fn run(&mut self, options: BootstrapOptions) -> Result<BootstrapReport, PhaseFailure> {
        let options = options.normalized();
        let config_path = self.bootstrap_config_path();
        let env_label = self.naming.environment.as_str();
        let mut warnings = Vec::new();

        self.state = BootstrapState::new();
        self.enter(
            Phase::ProbingRemote,
            &format!("Looking for remote state via {}", config_path.display()),
        );
        let existing = match BackendConfig::read_existing(&config_path, env_label) {
            Ok(existing) => existing,
            Err(e) => {
                logging::warn(&format!(
                    "Could not read {}: {}",
                    config_path.display(),
                    e
                ));
                None
            }
        };
        let reachable = existing.is_some() && self.probe_remote(&config_path);
        self.state.remote_state_detected = reachable || options.connect_only;

        let bootstrapped_locally = !self.state.remote_state_detected;
        let values = if reachable {
            logging::info("Remote state found, skipping resource creation");
            existing.as_ref().map(BackendValues::from_config)
        } else if options.connect_only {
            logging::info("Connect-only mode, skipping resource creation");
            existing.as_ref().map(BackendValues::from_config)
        } else {
            None
        };

        let values = match values {
            Some(values) => values,
            None if options.connect_only => {
                let predicted = BackendValues::predicted(&self.naming);
                logging::warn(&format!(
                    "No backend config found, assuming bucket {} and KMS key {} from naming",
                    predicted.bucket, predicted.kms_key_id
                ));
                predicted
            }
            None => self.bootstrap_locally(options, &mut warnings)?,
        };

        self.enter(
            Phase::GeneratingConfigs,
            &format!("Writing backend configs for bucket {}", values.bucket),
        );
        let generation = generate_backend_configs(
            &self.root,
            self.naming.environment,
            &values,
            self.ambient,
        )
        .map_err(|e| self.fail(e))?;

        if bootstrapped_locally {
            self.enter(Phase::MigratingState, "Moving local state to the remote backend");
            self.migrate(&config_path, &generation)
                .map_err(|e| self.fail(e))?;
        }

        self.enter(Phase::Verifying, "Checking remote state is listable");
        if let Err(e) = self.verify(&config_path) {
            let warning = format!("Remote state verification failed: {}", e);
            logging::warn(&warning);
            warnings.push(warning);
        }

        self.enter(Phase::Done, "Bootstrap complete");
        Ok(BootstrapReport {
            phases: self.state.history.clone(),
            remote_state_detected: self.state.remote_state_detected,
            backend: values,
            generation,
            warnings,
        })
    }

    /// Both an init against the recorded backend and a state listing must work
    fn probe_remote(&mut self, config_path: &Path) -> bool {
        let probe = self
            .backend
            .init_remote(config_path)
            .and_then(|_| self.backend.list_state());
        match probe {
            Ok(entries) => {
                logging::debug(&format!("Remote state has {} entries", entries.len()));
                true
            }
            Err(e) => {
                logging::info(&format!("Remote state not reachable: {}", e));
                false
            }
        }
    }

    fn bootstrap_locally(
        &mut self,
        options: BootstrapOptions,
        warnings: &mut Vec<String>,
    ) -> Result<BackendValues, PhaseFailure> {
        self.enter(Phase::LocalBootstrap, "Initializing with local state");
        self.backend
            .disable_remote_backend()
            .and_then(|_| self.backend.init_local())
            .map_err(|e| self.fail(e))?;

        self.enter(Phase::Applying, "Creating remote state resources");
        if !options.skip_plan {
            self.backend.plan().map_err(|e| self.fail(e))?;
        }
        self.backend
            .apply(options.auto_approve)
            .map_err(|e| self.fail(e))?;

        let predicted = BackendValues::predicted(&self.naming);
        match self.backend.outputs() {
            Ok(outputs) => Ok(BackendValues {
                bucket: outputs
                    .get(BUCKET_OUTPUT)
                    .cloned()
                    .unwrap_or(predicted.bucket),
                region: predicted.region,
                kms_key_id: outputs
                    .get(KMS_KEY_OUTPUT)
                    .cloned()
                    .unwrap_or(predicted.kms_key_id),
            }),
            Err(e) => {
                let warning = format!(
                    "Could not read terraform outputs ({}), using names predicted from naming",
                    e
                );
                logging::warn(&warning);
                warnings.push(warning);
                Ok(predicted)
            }
        }
    }

    fn migrate(&mut self, config_path: &Path, generation: &GenerationSummary) -> anyhow::Result<()> {
        if !generation.wrote(Layer::Bootstrap) {
            return Err(anyhow::anyhow!(
                "No backend config was generated for the bootstrap layer; add {}",
                LayerPaths::new(&self.root, Layer::Bootstrap)
                    .template()
                    .display()
            ));
        }
        self.backend.enable_remote_backend()?;
        self.backend.migrate_state(config_path)
    }

    fn verify(&mut self, config_path: &Path) -> anyhow::Result<()> {
        self.backend.init_remote(config_path)?;
        let entries = self.backend.list_state()?;
        logging::info(&format!("Remote state lists {} resources", entries.len()));
        Ok(())
    }
}
