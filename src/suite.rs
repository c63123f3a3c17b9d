//! Running a set of test cases.
//!
//! Each case carries its own [`RunContext`] and therefore its own scratch
//! directory, so cases never share mutable filesystem state. Sequential
//! execution is the default; the `parallel` feature adds a rayon-backed
//! variant.
//!
//! Note that staging exports the resolved toolchain path into the process
//! environment, which is process-wide; parallel runs share that export.

use std::time::Instant;

use crate::harness::{RunContext, TestHarness};
use crate::report::{RunReport, SuiteReport};

/// A harness plus the cases it will drive.
#[derive(Default)]
pub struct TestSuite {
    harness: TestHarness,
    cases: Vec<RunContext>,
}

impl TestSuite {
    /// Creates a suite around a configured harness.
    pub fn new(harness: TestHarness) -> Self {
        Self {
            harness,
            cases: Vec::new(),
        }
    }

    /// Adds a test case.
    pub fn add_case(&mut self, ctx: RunContext) -> &mut Self {
        self.cases.push(ctx);
        self
    }

    /// Number of registered cases.
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    /// True if no cases are registered.
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    fn run_one(&self, ctx: &RunContext) -> RunReport {
        let start = Instant::now();
        let result = self.harness.run(ctx);
        let wall_ms = start.elapsed().as_secs_f64() * 1000.0;
        RunReport::from_result(&ctx.case_name, &result, wall_ms)
    }

    /// Runs all cases sequentially.
    pub fn run(&self) -> SuiteReport {
        let mut report = SuiteReport::new();
        for ctx in &self.cases {
            report.push(self.run_one(ctx));
        }
        report
    }

    /// Runs all cases on the rayon thread pool.
    ///
    /// Safe with respect to scratch state (one directory per case); the
    /// toolchain environment export remains process-wide.
    #[cfg(feature = "parallel")]
    pub fn run_parallel(&self) -> SuiteReport {
        use rayon::prelude::*;

        let reports: Vec<RunReport> = self
            .cases
            .par_iter()
            .map(|ctx| self.run_one(ctx))
            .collect();

        SuiteReport { reports }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HarnessParams;

    fn gated_harness() -> TestHarness {
        // A required env var that cannot exist gates every case to a skip,
        // keeping these tests free of external processes.
        TestHarness::new(HarnessParams {
            required_env: vec!["VAULTBENCH_SUITE_TEST_UNSET".to_string()],
            ..HarnessParams::default()
        })
    }

    #[test]
    fn test_empty_suite() {
        let suite = TestSuite::new(gated_harness());
        assert!(suite.is_empty());

        let report = suite.run();
        assert!(report.reports.is_empty());
        assert!(report.all_ok());
    }

    #[test]
    fn test_each_case_reported() {
        let mut suite = TestSuite::new(gated_harness());
        suite.add_case(RunContext::new("a", "/f", "/w"));
        suite.add_case(RunContext::new("b", "/f", "/w"));
        assert_eq!(suite.len(), 2);

        let report = suite.run();
        assert_eq!(report.reports.len(), 2);
        assert_eq!(report.skipped(), 2);
        assert!(report.all_ok());
    }

    #[test]
    fn test_cases_have_distinct_scratch_dirs() {
        let a = RunContext::new("a", "/f", "/w");
        let b = RunContext::new("b", "/f", "/w");
        assert_ne!(a.scratch_dir, b.scratch_dir);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_sequential_counts() {
        let mut suite = TestSuite::new(gated_harness());
        for name in ["a", "b", "c", "d"] {
            suite.add_case(RunContext::new(name, "/f", "/w"));
        }

        let seq = suite.run();
        let par = suite.run_parallel();
        assert_eq!(seq.skipped(), par.skipped());
        assert_eq!(par.reports.len(), 4);
    }
}
