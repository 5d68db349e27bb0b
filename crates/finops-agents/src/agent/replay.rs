//! Replay a captured agent transcript instead of calling a model.

use std::path::PathBuf;

use tracing::info;

use super::{AgentBackend, AgentProfile, Task};
use crate::error::AgentError;

/// Returns the contents of a transcript file as the agent's answer.
#[derive(Debug, Clone)]
pub struct ReplayBackend {
    path: PathBuf,
}

impl ReplayBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl AgentBackend for ReplayBackend {
    async fn run(&self, _profile: &AgentProfile, task: &Task) -> Result<String, AgentError> {
        info!(policy = %task.policy_id, path = %self.path.display(), "replaying agent transcript");
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| AgentError::Replay {
                path: self.path.clone(),
                source,
            })
    }
}
