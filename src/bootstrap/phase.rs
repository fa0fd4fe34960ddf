//! Bootstrap phases, run state and options.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    ProbingRemote,
    LocalBootstrap,
    Applying,
    GeneratingConfigs,
    MigratingState,
    Verifying,
    Done,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::ProbingRemote => "probing-remote",
            Phase::LocalBootstrap => "local-bootstrap",
            Phase::Applying => "applying",
            Phase::GeneratingConfigs => "generating-configs",
            Phase::MigratingState => "migrating-state",
            Phase::Verifying => "verifying",
            Phase::Done => "done",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Run-time state of one orchestrator run; nothing here is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BootstrapState {
    pub remote_state_detected: bool,
    pub phase: Phase,
    pub history: Vec<Phase>,
}

impl BootstrapState {
    pub fn new() -> Self {
        Self {
            remote_state_detected: false,
            phase: Phase::ProbingRemote,
            history: Vec::new(),
        }
    }

    pub fn enter(&mut self, phase: Phase) {
        self.phase = phase;
        self.history.push(phase);
    }
}

impl Default for BootstrapState {
    fn default() -> Self {
        Self::new()
    }
}

/// Operator choices. These change how `Applying` talks to the operator,
/// never which phases run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BootstrapOptions {
    pub auto_approve: bool,
    pub skip_plan: bool,
    pub connect_only: bool,
}

impl BootstrapOptions {
    /// `connect_only` implies `skip_plan`
    pub fn normalized(self) -> Self {
        Self {
            skip_plan: self.skip_plan || self.connect_only,
            ..self
        }
    }
}

/// A fatal failure inside one phase. No rollback is attempted.
#[derive(Debug, Error)]
#[error("{phase} phase failed: {cause}")]
pub struct PhaseFailure {
    pub phase: Phase,
    pub cause: anyhow::Error,
}
