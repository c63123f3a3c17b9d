//! Run reports and suite-level aggregation.
//!
//! Each test case produces a [`RunReport`]; a [`SuiteReport`] aggregates
//! them and can be exported as JSON for dashboards or archived next to the
//! run outputs.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::harness::{HarnessError, Verdict};

/// The three-way outcome of a test case.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Passed,
    Skipped { reason: String },
    Failed { error: String },
}

impl Outcome {
    /// Maps a harness result into an outcome.
    pub fn from_result(result: &Result<Verdict, HarnessError>) -> Self {
        match result {
            Ok(Verdict::Passed) => Outcome::Passed,
            Ok(Verdict::Skipped { reason }) => Outcome::Skipped {
                reason: reason.clone(),
            },
            Err(e) => Outcome::Failed {
                error: e.to_string(),
            },
        }
    }
}

/// Report for a single test case.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunReport {
    /// Test case name.
    pub case: String,
    /// Final outcome.
    pub outcome: Outcome,
    /// Wall-clock duration of the case in milliseconds.
    pub wall_ms: f64,
}

impl RunReport {
    /// Builds a report from a harness result.
    pub fn from_result(
        case: impl Into<String>,
        result: &Result<Verdict, HarnessError>,
        wall_ms: f64,
    ) -> Self {
        Self {
            case: case.into(),
            outcome: Outcome::from_result(result),
            wall_ms,
        }
    }

    /// One-line human-readable summary.
    pub fn summary(&self) -> String {
        match &self.outcome {
            Outcome::Passed => format!("PASS {} ({:.1}ms)", self.case, self.wall_ms),
            Outcome::Skipped { reason } => format!("SKIP {}: {}", self.case, reason),
            Outcome::Failed { error } => format!("FAIL {}: {}", self.case, error),
        }
    }
}

/// Aggregated reports for a suite run.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SuiteReport {
    pub reports: Vec<RunReport>,
}

impl SuiteReport {
    /// Creates an empty suite report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a case report.
    pub fn push(&mut self, report: RunReport) {
        self.reports.push(report);
    }

    /// Number of passed cases.
    pub fn passed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Passed))
    }

    /// Number of skipped cases.
    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Skipped { .. }))
    }

    /// Number of failed cases.
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Failed { .. }))
    }

    /// True if no case failed (skips do not count against success).
    pub fn all_ok(&self) -> bool {
        self.failed() == 0
    }

    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.reports.iter().filter(|r| pred(&r.outcome)).count()
    }

    /// Multi-line text summary, one line per case plus a totals line.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        for r in &self.reports {
            out.push_str(&r.summary());
            out.push('\n');
        }
        out.push_str(&format!(
            "{} passed, {} skipped, {} failed\n",
            self.passed(),
            self.skipped(),
            self.failed()
        ));
        out
    }

    /// Writes the report as pretty JSON.
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, json)
    }
}
