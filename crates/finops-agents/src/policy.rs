//! The FinOps policies an agent can be asked to enforce.
//!
//! | Policy | Id | Window use |
//! |---|---|---|
//! | [`PolicyKind::SpendCap`] | POL-COMP-SPEND-001 | month-to-date spend + forecast |
//! | [`PolicyKind::DbLimit`] | POL-DB-LIMIT-002 | rank compartments by Database spend |
//! | [`PolicyKind::DbLicense`] | POL-DB-LICENSE-003 | rank compartments by Database spend |

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::agent::AgentProfile;
use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    /// Monthly spend cap per compartment.
    SpendCap,
    /// Autonomous Database count limit per compartment.
    DbLimit,
    /// Autonomous Databases must use the BYOL license model.
    DbLicense,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 3] = [
        PolicyKind::SpendCap,
        PolicyKind::DbLimit,
        PolicyKind::DbLicense,
    ];

    pub fn id(self) -> &'static str {
        match self {
            PolicyKind::SpendCap => "POL-COMP-SPEND-001",
            PolicyKind::DbLimit => "POL-DB-LIMIT-002",
            PolicyKind::DbLicense => "POL-DB-LICENSE-003",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            PolicyKind::SpendCap => "Monthly Spend Cap per Compartment",
            PolicyKind::DbLimit => "Autonomous Database Count Limit per Compartment",
            PolicyKind::DbLicense => "BYOL license model for Autonomous Databases",
        }
    }

    /// File-name stem of the Markdown report.
    pub fn report_stem(self) -> &'static str {
        match self {
            PolicyKind::SpendCap => "oci_consumption_report",
            PolicyKind::DbLimit => "oci_db_limit_report",
            PolicyKind::DbLicense => "db_license_report",
        }
    }

    /// File-name stem of the findings JSON.
    pub fn findings_stem(self) -> &'static str {
        match self {
            PolicyKind::SpendCap => "oci_consumption_findings",
            PolicyKind::DbLimit => "oci_db_limit_findings",
            PolicyKind::DbLicense => "oci_db_license_findings",
        }
    }

    pub fn profile(self) -> AgentProfile {
        let (role, goal, backstory) = match self {
            PolicyKind::SpendCap => (
                "OCI Consumption Analyst",
                "Analyze OCI tenant consumption and check policy compliance.",
                "Expert analyst with access to OCI Consumption MCP server.",
            ),
            PolicyKind::DbLimit => (
                "ADB Density Compliance Analyst",
                "Check compartments against ADB count limits using minimal tool calls.",
                "FinOps-oriented analyst using OCI Consumption and Inventory MCP tools.",
            ),
            PolicyKind::DbLicense => (
                "ADB License Compliance Analyst",
                "Ensure ADBs in the top spender compartments use BYOL, minimizing tool calls.",
                "FinOps-oriented analyst using OCI Consumption and Inventory MCP tools.",
            ),
        };
        AgentProfile {
            role: role.to_string(),
            goal: goal.to_string(),
            backstory: backstory.to_string(),
            max_retry_limit: 5,
        }
    }

    pub fn expected_output(self) -> &'static str {
        match self {
            PolicyKind::SpendCap => {
                "Markdown report + FINDINGS JSON (as specified). Use amount (USD) only."
            }
            PolicyKind::DbLimit => {
                "Markdown report + FINDINGS JSON (as specified). Use amount (USD) only for \
                 Database spend; count Autonomous Databases via inventory."
            }
            PolicyKind::DbLicense => {
                "Markdown report + FINDINGS JSON (as specified). Use amount (USD) only for \
                 'Database' spend; list ADBs and verify license_model."
            }
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

// ── Parameters ──────────────────────────────────────────────────────────────

/// POL-COMP-SPEND-001 thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpendCapParams {
    /// Applied to month-to-date actuals on the month's last day.
    pub hard_cap_usd: f64,
    /// Applied to the end-of-month forecast on any day.
    pub soft_cap_usd: f64,
    /// Early-month averages are too noisy to forecast from.
    pub min_days_observed_for_forecast: u32,
}

impl Default for SpendCapParams {
    fn default() -> Self {
        Self {
            hard_cap_usd: 400.0,
            soft_cap_usd: 400.0,
            min_days_observed_for_forecast: 3,
        }
    }
}

/// POL-DB-LIMIT-002 thresholds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DbLimitParams {
    pub soft_limit_count: u32,
    pub hard_limit_count: u32,
    /// Databases carrying any of these tags do not count toward the limit.
    pub exempt_tags: Vec<String>,
    pub top_n_compartments: u32,
}

impl Default for DbLimitParams {
    fn default() -> Self {
        Self {
            soft_limit_count: 2,
            hard_limit_count: 4,
            exempt_tags: vec![
                "HighAvailability".to_string(),
                "Clustered".to_string(),
                "DR".to_string(),
            ],
            top_n_compartments: 10,
        }
    }
}

/// POL-DB-LICENSE-003 requirements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DbLicenseParams {
    pub allowed_license_models: Vec<String>,
    pub exempt_tags: Vec<String>,
    pub top_n_compartments: u32,
}

impl Default for DbLicenseParams {
    fn default() -> Self {
        Self {
            allowed_license_models: vec!["BRING_YOUR_OWN_LICENSE".to_string()],
            exempt_tags: Vec::new(),
            top_n_compartments: 10,
        }
    }
}

/// Parameters of every policy, as read from configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyParams {
    pub spend_cap: SpendCapParams,
    pub db_limit: DbLimitParams,
    pub db_license: DbLicenseParams,
}

impl PolicyParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let spend = &self.spend_cap;
        if !(spend.hard_cap_usd.is_finite() && spend.hard_cap_usd >= 0.0)
            || !(spend.soft_cap_usd.is_finite() && spend.soft_cap_usd >= 0.0)
        {
            return Err(ConfigError::Invalid(
                "spend_cap caps must be non-negative amounts".to_string(),
            ));
        }
        if self.db_limit.soft_limit_count > self.db_limit.hard_limit_count {
            return Err(ConfigError::Invalid(format!(
                "db_limit.soft_limit_count {} exceeds hard_limit_count {}",
                self.db_limit.soft_limit_count, self.db_limit.hard_limit_count
            )));
        }
        if self.db_limit.top_n_compartments == 0 || self.db_license.top_n_compartments == 0 {
            return Err(ConfigError::Invalid(
                "top_n_compartments must be positive".to_string(),
            ));
        }
        if self.db_license.allowed_license_models.is_empty() {
            return Err(ConfigError::Invalid(
                "db_license.allowed_license_models is empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// A policy together with the thresholds it is enforced with.
#[derive(Debug, Clone, PartialEq)]
pub enum Policy {
    SpendCap(SpendCapParams),
    DbLimit(DbLimitParams),
    DbLicense(DbLicenseParams),
}

impl Policy {
    pub fn from_params(kind: PolicyKind, params: &PolicyParams) -> Self {
        match kind {
            PolicyKind::SpendCap => Policy::SpendCap(params.spend_cap.clone()),
            PolicyKind::DbLimit => Policy::DbLimit(params.db_limit.clone()),
            PolicyKind::DbLicense => Policy::DbLicense(params.db_license.clone()),
        }
    }

    pub fn kind(&self) -> PolicyKind {
        match self {
            Policy::SpendCap(_) => PolicyKind::SpendCap,
            Policy::DbLimit(_) => PolicyKind::DbLimit,
            Policy::DbLicense(_) => PolicyKind::DbLicense,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_distinct() {
        let ids: std::collections::HashSet<_> = PolicyKind::ALL.iter().map(|k| k.id()).collect();
        assert_eq!(ids.len(), 3);
        assert_eq!(PolicyKind::DbLimit.to_string(), "POL-DB-LIMIT-002");
    }

    #[test]
    fn test_file_stems() {
        assert_eq!(PolicyKind::SpendCap.report_stem(), "oci_consumption_report");
        assert_eq!(PolicyKind::DbLicense.findings_stem(), "oci_db_license_findings");
    }

    #[test]
    fn test_profiles_allow_retries() {
        for kind in PolicyKind::ALL {
            assert_eq!(kind.profile().max_retry_limit, 5, "{kind}");
        }
        assert_eq!(PolicyKind::DbLimit.profile().role, "ADB Density Compliance Analyst");
    }

    #[test]
    fn test_default_params() {
        let params = PolicyParams::default();
        assert_eq!(params.spend_cap.hard_cap_usd, 400.0);
        assert_eq!(params.spend_cap.min_days_observed_for_forecast, 3);
        assert_eq!(params.db_limit.exempt_tags, ["HighAvailability", "Clustered", "DR"]);
        assert_eq!(params.db_license.allowed_license_models, ["BRING_YOUR_OWN_LICENSE"]);
        assert!(params.db_license.exempt_tags.is_empty());
        params.validate().unwrap();
    }

    #[test]
    fn test_validate_soft_above_hard() {
        let mut params = PolicyParams::default();
        params.db_limit.soft_limit_count = 5;
        let err = params.validate().unwrap_err();
        assert!(err.to_string().contains("exceeds"), "got: {err}");
    }

    #[test]
    fn test_validate_negative_cap() {
        let mut params = PolicyParams::default();
        params.spend_cap.soft_cap_usd = -1.0;
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_policy_from_params_roundtrips_kind() {
        let params = PolicyParams::default();
        for kind in PolicyKind::ALL {
            assert_eq!(Policy::from_params(kind, &params).kind(), kind);
        }
    }
}
