//! End-to-end harness tests against a stub simulator.
//!
//! Each test builds a throwaway fixture tree under a temp directory and
//! drives the full preflight -> stage -> execute -> verify pipeline. The
//! simulator is a small shell script that writes a statistics file, so the
//! pipeline's behavior is observed without any external installation.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use vaultbench::config::HarnessParams;
use vaultbench::harness::{HarnessError, RunContext, TestHarness, Verdict};
use vaultbench::report::{Outcome, RunReport, SuiteReport};

fn write_lines(path: &Path, n: u64) {
    let mut content = String::new();
    for i in 0..n {
        content.push_str(&format!("stat_{i}\n"));
    }
    std::fs::write(path, content).unwrap();
}

/// Lays out fixtures for case "sample": workload sources, trace, memory
/// config, topology script, and a reference file with `ref_lines` lines.
fn make_fixtures(root: &Path, ref_lines: u64) -> RunContext {
    let fixtures = root.join("fixtures");
    let workload = fixtures.join("sample");
    std::fs::create_dir_all(&workload).unwrap();
    std::fs::create_dir_all(fixtures.join("refFiles")).unwrap();

    std::fs::write(workload.join("sample.cu"), "// kernel source\n").unwrap();
    std::fs::write(workload.join("cuda_calls.trace"), "launch 1\n").unwrap();
    std::fs::write(fixtures.join("mem.cfg"), "bank = 0\n").unwrap();
    std::fs::write(fixtures.join("sample.py"), "import sst\n").unwrap();

    let ctx = RunContext::new("sample", &fixtures, root.join("work"))
        .with_staged_files(["mem.cfg"]);
    write_lines(&ctx.ref_file(), ref_lines);
    ctx
}

/// Writes an executable stub simulator that emits `stats_lines` lines to
/// the given statistics file and exits 0.
fn make_stub_simulator(root: &Path, stats_file: &Path, stats_lines: u64) -> PathBuf {
    let script = root.join("stub-sim.sh");
    let body = format!(
        "#!/bin/sh\nseq 1 {} > \"{}\"\n",
        stats_lines,
        stats_file.display()
    );
    std::fs::write(&script, body).unwrap();
    let mut perms = std::fs::metadata(&script).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&script, perms).unwrap();
    script
}

fn stub_params(simulator: &Path) -> HarnessParams {
    HarnessParams {
        required_env: Vec::new(),
        forbidden_build_keys: Vec::new(),
        build_command: vec!["true".to_string()],
        toolchain: "sh".to_string(),
        toolchain_env: "VAULTBENCH_E2E_TOOLCHAIN".to_string(),
        simulator: simulator.display().to_string(),
        timeout_secs: 10,
        line_threshold: 15,
    }
}

#[test]
fn passes_when_stats_drift_stays_within_threshold() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = make_fixtures(dir.path(), 100);
    let sim = make_stub_simulator(dir.path(), &ctx.stats_file(), 115);

    let harness = TestHarness::new(stub_params(&sim));
    let verdict = harness.run(&ctx).unwrap();

    assert_eq!(verdict, Verdict::Passed);
    assert!(ctx.stats_file().is_file());
    assert!(ctx.out_file().is_file());
    assert!(ctx.err_file().is_file());
}

#[test]
fn fails_when_stats_drift_exceeds_threshold() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = make_fixtures(dir.path(), 100);
    let sim = make_stub_simulator(dir.path(), &ctx.stats_file(), 116);

    let harness = TestHarness::new(stub_params(&sim));
    let err = harness.run(&ctx).unwrap_err();

    match err {
        HarnessError::LineCountMismatch { delta, threshold, .. } => {
            assert_eq!(delta, 16);
            assert_eq!(threshold, 15);
        }
        other => panic!("expected line count mismatch, got: {other}"),
    }
}

#[test]
fn fails_when_simulator_produces_no_stats() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = make_fixtures(dir.path(), 100);

    // A simulator that exits cleanly but writes nothing.
    let mut params = stub_params(Path::new("true"));
    params.simulator = "true".to_string();

    let harness = TestHarness::new(params);
    let err = harness.run(&ctx).unwrap_err();
    assert!(matches!(err, HarnessError::MissingOutput(_)));
}

#[test]
fn skips_before_touching_the_filesystem() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = make_fixtures(dir.path(), 100);
    let sim = make_stub_simulator(dir.path(), &ctx.stats_file(), 100);

    let mut params = stub_params(&sim);
    params.required_env = vec!["VAULTBENCH_E2E_UNSET_VAR".to_string()];

    let harness = TestHarness::new(params);
    let verdict = harness.run(&ctx).unwrap();

    match verdict {
        Verdict::Skipped { reason } => {
            assert!(reason.contains("VAULTBENCH_E2E_UNSET_VAR"));
        }
        Verdict::Passed => panic!("expected skip"),
    }
    // Nothing was staged or run.
    assert!(!ctx.scratch_dir.exists());
    assert!(!ctx.stats_file().exists());
}

#[test]
fn simulator_timeout_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = make_fixtures(dir.path(), 100);

    let script = dir.path().join("slow-sim.sh");
    std::fs::write(&script, "#!/bin/sh\nsleep 30\n").unwrap();
    let mut perms = std::fs::metadata(&script).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&script, perms).unwrap();

    let mut params = stub_params(&script);
    params.timeout_secs = 1;

    let harness = TestHarness::new(params);
    let err = harness.run(&ctx).unwrap_err();
    assert!(matches!(err, HarnessError::Timeout(1)));
}

#[test]
fn second_run_reuses_a_clean_scratch() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = make_fixtures(dir.path(), 100);
    let sim = make_stub_simulator(dir.path(), &ctx.stats_file(), 105);

    let harness = TestHarness::new(stub_params(&sim));
    assert!(harness.run(&ctx).unwrap().is_pass());

    // Pollute scratch between runs; staging must wipe it.
    std::fs::write(ctx.scratch_dir.join("leftover.tmp"), "junk").unwrap();
    assert!(harness.run(&ctx).unwrap().is_pass());
    assert!(!ctx.scratch_dir.join("leftover.tmp").exists());
}

#[test]
fn suite_report_reflects_mixed_outcomes() {
    let dir = tempfile::tempdir().unwrap();

    let passing = make_fixtures(dir.path(), 100);
    let sim = make_stub_simulator(dir.path(), &passing.stats_file(), 110);
    let harness = TestHarness::new(stub_params(&sim));

    let mut report = SuiteReport::new();
    let result = harness.run(&passing);
    report.push(RunReport::from_result("sample", &result, 0.0));

    let gated = TestHarness::new(HarnessParams {
        required_env: vec!["VAULTBENCH_E2E_UNSET_VAR".to_string()],
        ..stub_params(&sim)
    });
    let result = gated.run(&passing);
    report.push(RunReport::from_result("gated", &result, 0.0));

    assert_eq!(report.passed(), 1);
    assert_eq!(report.skipped(), 1);
    assert!(report.all_ok());
    assert!(matches!(report.reports[0].outcome, Outcome::Passed));
}
