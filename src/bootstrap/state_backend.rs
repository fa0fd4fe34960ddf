use std::collections::HashMap;
use std::path::Path;

/// Operations the orchestrator needs from the state backend tooling.
///
/// Every call is blocking and is made one at a time.
pub trait StateBackend {
    /// Move the remote backend declaration out of the way
    fn disable_remote_backend(&mut self) -> anyhow::Result<()>;

    /// Restore the remote backend declaration
    fn enable_remote_backend(&mut self) -> anyhow::Result<()>;

    /// Initialize against local state only
    fn init_local(&mut self) -> anyhow::Result<()>;

    /// Initialize against the remote backend described by a backend-config file
    fn init_remote(&mut self, backend_config: &Path) -> anyhow::Result<()>;

    /// List resource addresses in the current state
    fn list_state(&mut self) -> anyhow::Result<Vec<String>>;

    fn plan(&mut self) -> anyhow::Result<()>;

    fn apply(&mut self, auto_approve: bool) -> anyhow::Result<()>;

    /// String-valued outputs of the applied configuration
    fn outputs(&mut self) -> anyhow::Result<HashMap<String, String>>;

    /// Copy local state into the remote backend
    fn migrate_state(&mut self, backend_config: &Path) -> anyhow::Result<()>;
}
