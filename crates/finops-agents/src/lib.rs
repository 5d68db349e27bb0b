//! # finops-agents
//!
//! FinOps policy agents for Oracle Cloud tenancies.
//!
//! Each policy run frames a calendar month with [`month_window`], hands the
//! resulting task to an LLM agent that has billing and inventory tools, and
//! persists the agent's Markdown report together with the machine-readable
//! FINDINGS block it ends with.
//!
//! ## Modules
//!
//! - [`policy`] — the policy catalogue and its thresholds
//! - [`prompt`] — task descriptions built from a [`month_window::MonthWindow`]
//! - [`agent`] — the backend seam (gateway or replayed transcript)
//! - [`findings`] — FINDINGS JSON extraction from agent output
//! - [`report`] — report and findings files
//! - [`run`] — one policy run, end to end
//! - [`config`] — layered run configuration
//! - [`error`] — error types

pub mod agent;
pub mod config;
pub mod error;
pub mod findings;
pub mod policy;
pub mod prompt;
pub mod report;
pub mod run;

pub use agent::{AgentBackend, AgentProfile, GatewayBackend, ReplayBackend, Task};
pub use config::{FinopsConfig, GatewayConfig, TelemetryConfig};
pub use error::{AgentError, ConfigError, FindingsError, FinopsError};
pub use findings::extract_findings;
pub use policy::{Policy, PolicyKind, PolicyParams};
pub use prompt::build_task;
pub use report::ReportWriter;
pub use run::{prepare, run_policy, RunOutcome, RunSettings};
