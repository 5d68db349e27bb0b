//! One policy run, end to end.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use month_window::{report_timestamp, MonthWindow, WindowSummary, YearMonth};
use serde::Serialize;
use tracing::{info, warn};

use crate::agent::{AgentBackend, Task};
use crate::error::Result;
use crate::findings::extract_findings;
use crate::policy::Policy;
use crate::prompt::build_task;
use crate::report::ReportWriter;

/// Where and when a run happens.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub timezone: String,
    pub output_dir: PathBuf,
    /// Overrides the system clock. Used for reruns of past months and tests.
    pub now: Option<DateTime<Utc>>,
}

impl RunSettings {
    fn now(&self) -> DateTime<Utc> {
        self.now.unwrap_or_else(Utc::now)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub window: WindowSummary,
    pub report_text: String,
    pub markdown_path: PathBuf,
    /// `None` when the agent's answer carried no usable FINDINGS block.
    pub findings_path: Option<PathBuf>,
}

/// Compute the window and the task for `policy` without calling any agent.
pub fn prepare(
    policy: &Policy,
    month: YearMonth,
    settings: &RunSettings,
) -> Result<(MonthWindow, Task)> {
    let window = month.window(&settings.timezone, Some(settings.now()))?;
    let task = build_task(policy, month, &window);
    Ok((window, task))
}

/// Run `policy` for `month` on `backend` and persist what it returns.
///
/// The window is computed before the backend is touched, so calendar errors
/// never cost an agent call. A missing or malformed FINDINGS block is logged
/// and leaves `findings_path` empty; the Markdown report is still written.
pub async fn run_policy<B: AgentBackend>(
    policy: &Policy,
    month: YearMonth,
    settings: &RunSettings,
    backend: &B,
) -> Result<RunOutcome> {
    let now = settings.now();
    let (window, task) = prepare(policy, month, &RunSettings {
        now: Some(now),
        ..settings.clone()
    })?;
    let kind = policy.kind();
    let summary = window.summary();
    info!(
        policy = kind.id(),
        %month,
        start = %summary.start,
        end = %summary.end,
        today = %summary.today,
        days_observed = summary.days_observed,
        remaining_days = summary.remaining_days,
        "running policy"
    );

    let report_text = backend.run(&kind.profile(), &task).await?;

    let writer = ReportWriter::new(
        settings.output_dir.clone(),
        report_timestamp(now, &settings.timezone)?,
    );
    let markdown_path = writer.write_markdown(kind.report_stem(), month, &report_text)?;

    let findings_path = match extract_findings(&report_text) {
        Ok(findings) => Some(writer.write_findings(kind.findings_stem(), month, &findings)?),
        Err(e) => {
            warn!(policy = kind.id(), error = %e, "findings not saved");
            None
        }
    };

    Ok(RunOutcome {
        window: summary,
        report_text,
        markdown_path,
        findings_path,
    })
}
