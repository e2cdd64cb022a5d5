//! Suite results, summaries and exit status

use serde::Serialize;
use std::fmt::Write as _;
use std::time::Duration;

use super::checks::CheckMetrics;
use crate::error::Result;

/// Exit status when no check failed or errored
pub const EXIT_PASSED: i32 = 0;

/// Exit status when at least one check failed or errored
pub const EXIT_FAILED: i32 = 1;

/// Exit status for configuration and usage errors
pub const EXIT_USAGE: i32 = 2;

/// What happened to one check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CheckOutcome {
    Passed,
    Failed { reason: String },
    Errored { error: String },
    Skipped { blocked_by: Vec<String>, reason: String },
}

impl CheckOutcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, CheckOutcome::Passed)
    }

    /// Failed or errored
    pub fn is_failure(&self) -> bool {
        matches!(self, CheckOutcome::Failed { .. } | CheckOutcome::Errored { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, CheckOutcome::Skipped { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            CheckOutcome::Passed => "PASSED",
            CheckOutcome::Failed { .. } => "FAILED",
            CheckOutcome::Errored { .. } => "ERROR",
            CheckOutcome::Skipped { .. } => "SKIPPED",
        }
    }
}

/// Result of one check within a run
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub name: String,
    pub depends_on: Vec<String>,
    pub outcome: CheckOutcome,
    #[serde(with = "humantime_serde")]
    pub duration: Duration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<CheckMetrics>,
}

/// Counts per outcome
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub errored: usize,
    pub skipped: usize,
}

/// Outcome of a whole suite run, in execution order
#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    /// Bot under test, as `provider/model`
    pub bot: String,
    /// Reference model, as `provider/model`
    pub reference: String,
    pub results: Vec<CheckResult>,
    #[serde(with = "humantime_serde")]
    pub duration: Duration,
    pub summary: ReportSummary,
}

impl SuiteReport {
    pub fn new(
        bot: impl Into<String>,
        reference: impl Into<String>,
        results: Vec<CheckResult>,
        duration: Duration,
    ) -> Self {
        let summary = results.iter().fold(
            ReportSummary {
                total: results.len(),
                ..Default::default()
            },
            |mut summary, result| {
                match result.outcome {
                    CheckOutcome::Passed => summary.passed += 1,
                    CheckOutcome::Failed { .. } => summary.failed += 1,
                    CheckOutcome::Errored { .. } => summary.errored += 1,
                    CheckOutcome::Skipped { .. } => summary.skipped += 1,
                }
                summary
            },
        );

        Self {
            bot: bot.into(),
            reference: reference.into(),
            results,
            duration,
            summary,
        }
    }

    /// True when nothing failed or errored; skipped checks do not count against the run
    pub fn passed(&self) -> bool {
        self.summary.failed == 0 && self.summary.errored == 0
    }

    pub fn exit_code(&self) -> i32 {
        if self.passed() { EXIT_PASSED } else { EXIT_FAILED }
    }

    pub fn get(&self, name: &str) -> Option<&CheckResult> {
        self.results.iter().find(|r| r.name == name)
    }

    pub fn outcome(&self, name: &str) -> Option<&CheckOutcome> {
        self.get(name).map(|r| &r.outcome)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Human-readable summary, one line per check
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "bot: {}  reference: {}", self.bot, self.reference);

        for result in &self.results {
            let _ = write!(
                out,
                "{:<8} {:<22} {:>8.2}s",
                result.outcome.label(),
                result.name,
                result.duration.as_secs_f64()
            );
            match &result.outcome {
                CheckOutcome::Passed => {
                    if let Some(metrics) = &result.metrics {
                        let _ = write!(out, "  {}", metrics);
                    }
                }
                CheckOutcome::Failed { reason } => {
                    let _ = write!(out, "  {}", reason);
                }
                CheckOutcome::Errored { error } => {
                    let _ = write!(out, "  {}", error);
                }
                CheckOutcome::Skipped { reason, .. } => {
                    let _ = write!(out, "  {}", reason);
                }
            }
            out.push('\n');
        }

        let s = &self.summary;
        let _ = writeln!(
            out,
            "{} checks: {} passed, {} failed, {} errored, {} skipped in {:.2}s",
            s.total,
            s.passed,
            s.failed,
            s.errored,
            s.skipped,
            self.duration.as_secs_f64()
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, outcome: CheckOutcome) -> CheckResult {
        CheckResult {
            name: name.to_string(),
            depends_on: Vec::new(),
            outcome,
            duration: Duration::from_millis(10),
            metrics: None,
        }
    }

    #[test]
    fn test_summary_counts() {
        let report = SuiteReport::new(
            "stub/bot",
            "stub/reference",
            vec![
                result("a", CheckOutcome::Passed),
                result(
                    "b",
                    CheckOutcome::Failed {
                        reason: "nope".into(),
                    },
                ),
                result(
                    "c",
                    CheckOutcome::Skipped {
                        blocked_by: vec!["b".into()],
                        reason: "prerequisite 'b' failed".into(),
                    },
                ),
            ],
            Duration::from_secs(1),
        );

        assert_eq!(
            report.summary,
            ReportSummary {
                total: 3,
                passed: 1,
                failed: 1,
                errored: 0,
                skipped: 1
            }
        );
        assert!(!report.passed());
        assert_eq!(report.exit_code(), EXIT_FAILED);
    }

    #[test]
    fn test_skipped_only_run_passes() {
        let report = SuiteReport::new(
            "b",
            "r",
            vec![
                result("a", CheckOutcome::Passed),
                result(
                    "b",
                    CheckOutcome::Skipped {
                        blocked_by: vec!["x".into()],
                        reason: "prerequisite 'x' was not selected".into(),
                    },
                ),
            ],
            Duration::ZERO,
        );
        assert!(report.passed());
        assert_eq!(report.exit_code(), EXIT_PASSED);
    }

    #[test]
    fn test_errored_fails_run() {
        let report = SuiteReport::new(
            "b",
            "r",
            vec![result(
                "a",
                CheckOutcome::Errored {
                    error: "Bot unavailable: refused".into(),
                },
            )],
            Duration::ZERO,
        );
        assert_eq!(report.exit_code(), EXIT_FAILED);
        assert!(report.outcome("a").unwrap().is_failure());
    }

    #[test]
    fn test_json_shape() {
        let report = SuiteReport::new(
            "b",
            "r",
            vec![result(
                "a",
                CheckOutcome::Failed {
                    reason: "a: got 0/3, needed >= 2".into(),
                },
            )],
            Duration::ZERO,
        );

        let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(value["results"][0]["outcome"]["status"], "failed");
        assert_eq!(value["results"][0]["outcome"]["reason"], "a: got 0/3, needed >= 2");
        assert_eq!(value["summary"]["failed"], 1);
        assert!(value["results"][0].get("metrics").is_none());
    }

    #[test]
    fn test_render_lists_every_check() {
        let report = SuiteReport::new(
            "b",
            "r",
            vec![
                result("response_format", CheckOutcome::Passed),
                result(
                    "response_time",
                    CheckOutcome::Failed {
                        reason: "too slow".into(),
                    },
                ),
            ],
            Duration::ZERO,
        );
        let text = report.render();
        assert!(text.contains("PASSED   response_format"));
        assert!(text.contains("FAILED   response_time"));
        assert!(text.contains("too slow"));
        assert!(text.contains("2 checks: 1 passed, 1 failed, 0 errored, 0 skipped"));
    }
}
