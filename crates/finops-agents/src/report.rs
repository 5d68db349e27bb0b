//! Report and findings persistence.
//!
//! Both artifacts of a run share one timestamp:
//! `<dir>/<report_stem>_<YYYY-MM>_<timestamp>.md` and
//! `<dir>/<findings_stem>_<YYYY-MM>_<timestamp>.json`.

use std::fs;
use std::path::{Path, PathBuf};

use month_window::YearMonth;
use serde_json::Value;
use tracing::info;

use crate::error::{FinopsError, Result};

pub struct ReportWriter {
    dir: PathBuf,
    timestamp: String,
}

impl ReportWriter {
    pub fn new(dir: impl Into<PathBuf>, timestamp: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            timestamp: timestamp.into(),
        }
    }

    /// Path an artifact named `stem` for `month` is written to.
    fn path_for(&self, stem: &str, month: YearMonth, extension: &str) -> PathBuf {
        self.dir
            .join(format!("{stem}_{month}_{}.{extension}", self.timestamp))
    }

    /// Write the agent's Markdown answer verbatim.
    pub fn write_markdown(&self, stem: &str, month: YearMonth, text: &str) -> Result<PathBuf> {
        let path = self.path_for(stem, month, "md");
        self.write(&path, text)?;
        info!(path = %path.display(), "report saved");
        Ok(path)
    }

    /// Write findings as indented JSON.
    pub fn write_findings(&self, stem: &str, month: YearMonth, findings: &Value) -> Result<PathBuf> {
        let path = self.path_for(stem, month, "json");
        let body = serde_json::to_string_pretty(findings)?;
        self.write(&path, &body)?;
        info!(path = %path.display(), "findings saved");
        Ok(path)
    }

    fn write(&self, path: &Path, contents: &str) -> Result<()> {
        let io_err = |source| FinopsError::Report {
            path: path.to_path_buf(),
            source,
        };
        fs::create_dir_all(&self.dir).map_err(io_err)?;
        fs::write(path, contents).map_err(io_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn month() -> YearMonth {
        "2025-10".parse().unwrap()
    }

    #[test]
    fn test_markdown_path_and_contents() {
        let tmp = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(tmp.path().join("reports"), "20251014_093005");
        let path = writer
            .write_markdown("oci_db_limit_report", month(), "# Report\n")
            .unwrap();
        assert_eq!(
            path,
            tmp.path()
                .join("reports")
                .join("oci_db_limit_report_2025-10_20251014_093005.md")
        );
        assert_eq!(fs::read_to_string(&path).unwrap(), "# Report\n");
    }

    #[test]
    fn test_findings_are_indented_json() {
        let tmp = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(tmp.path(), "20251014_093005");
        let findings = json!({"policy_id": "POL-DB-LIMIT-002", "compartments": []});
        let path = writer
            .write_findings("oci_db_limit_findings", month(), &findings)
            .unwrap();
        assert!(path.ends_with("oci_db_limit_findings_2025-10_20251014_093005.json"));

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("\n  \"policy_id\""), "got: {written}");
        let reparsed: Value = serde_json::from_str(&written).unwrap();
        assert_eq!(reparsed, findings);
    }

    #[test]
    fn test_unwritable_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("file");
        fs::write(&blocker, "").unwrap();
        let writer = ReportWriter::new(blocker.join("reports"), "ts");
        let err = writer.write_markdown("r", month(), "x").unwrap_err();
        assert!(matches!(err, FinopsError::Report { .. }), "got: {err:?}");
    }
}
