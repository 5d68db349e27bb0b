//! The seam between a policy run and the LLM agent that executes it.
//!
//! A run hands an [`AgentProfile`] and a [`Task`] to an [`AgentBackend`] and
//! gets the agent's final free-text answer back. Two backends exist:
//!
//! - [`gateway`] — an OpenAI-compatible chat-completions gateway (e.g. a LiteLLM
//!   proxy) that has the billing/inventory tool server attached
//! - [`replay`] — a previously captured agent transcript read from disk

use std::future::Future;

use serde::Serialize;

use crate::error::AgentError;

pub mod gateway;
pub mod replay;
pub mod retry;

pub use gateway::GatewayBackend;
pub use replay::ReplayBackend;
pub use retry::Backoff;

/// Who the agent is asked to be.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentProfile {
    pub role: String,
    pub goal: String,
    pub backstory: String,
    /// Retries allowed for transient gateway failures.
    pub max_retry_limit: u32,
}

impl AgentProfile {
    /// System message presenting the profile to the model.
    pub fn system_prompt(&self) -> String {
        format!(
            "You are {}. {}\nYour personal goal is: {}",
            self.role, self.backstory, self.goal
        )
    }
}

/// One unit of work for the agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    /// Policy identifier the task enforces (e.g., `POL-DB-LIMIT-002`).
    pub policy_id: String,
    pub description: String,
    pub expected_output: String,
}

impl Task {
    /// User message sent to the model.
    pub fn user_prompt(&self) -> String {
        format!(
            "{}\n\nExpected output: {}",
            self.description, self.expected_output
        )
    }
}

/// Something that can run a task and return the agent's final answer.
pub trait AgentBackend {
    fn run(
        &self,
        profile: &AgentProfile,
        task: &Task,
    ) -> impl Future<Output = Result<String, AgentError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_carries_profile() {
        let profile = AgentProfile {
            role: "OCI Consumption Analyst".into(),
            goal: "Check policy compliance.".into(),
            backstory: "Expert analyst.".into(),
            max_retry_limit: 5,
        };
        let prompt = profile.system_prompt();
        assert_eq!(
            prompt,
            "You are OCI Consumption Analyst. Expert analyst.\nYour personal goal is: Check policy compliance."
        );
    }

    #[test]
    fn test_user_prompt_appends_expected_output() {
        let task = Task {
            policy_id: "POL-X".into(),
            description: "Do the thing.".into(),
            expected_output: "A report.".into(),
        };
        assert_eq!(task.user_prompt(), "Do the thing.\n\nExpected output: A report.");
    }
}
