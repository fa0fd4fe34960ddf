// Re-export modules for testing and external use
pub mod naming {
    pub mod ambient;
    pub mod identity;
    pub mod region;
    pub mod resolver;
    pub mod validation;

    // Re-export commonly used items
    pub use ambient::{AmbientContextProvider, AwsCliAmbient, StaticAmbient};
    pub use identity::{Environment, EnvironmentSet, IdentityContext, TenantKind};
    pub use resolver::{NamingResolver, NamingRules, ResolvedNaming, ResourceKind};
    pub use validation::ValidationError;
}

pub mod terraform {
    pub mod backend_config;
    pub mod layers;
    pub mod service;
    pub mod template;
    pub mod tfvars;

    pub use backend_config::BackendConfig;
    pub use layers::{Layer, LayerPaths};
    pub use service::TerraformService;
}

pub mod bootstrap {
    pub mod generator;
    pub mod orchestrator;
    pub mod phase;
    pub mod state_backend;

    pub use orchestrator::{BootstrapOrchestrator, BootstrapReport};
    pub use phase::{BootstrapOptions, Phase, PhaseFailure};
    pub use state_backend::StateBackend;
}

pub mod shared {
    pub mod logging;
}

pub mod core {
    pub mod landing_zone;
}

pub mod config;

// Re-export commonly used types for easier testing and external use
pub use crate::core::landing_zone::{LandingZone, LandingZoneError};
pub use crate::naming::resolver::resolve;
