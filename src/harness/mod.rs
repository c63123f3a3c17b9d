//! Regression harness for trace-driven runs of the external simulator.
//!
//! A single test case flows through a linear pipeline:
//!
//! 1. **preflight**: environment and core build-configuration gating;
//!    an unmet precondition yields [`Verdict::Skipped`], never an error.
//! 2. **stage**: delete and recreate the scratch directory, symlink the
//!    fixture files into it, build the sample workload, resolve the
//!    compiler toolchain.
//! 3. **execute**: invoke the simulator with structured arguments, a
//!    wall-clock timeout, and captured stdout/stderr.
//! 4. **verify**: the produced statistics file must exist and its line
//!    count must be within the configured threshold of the reference.
//!
//! Every failure is terminal for the case; there are no retries. Each
//! case owns its scratch directory, so cases never share mutable state.

pub mod exec;
pub mod preflight;
pub mod stage;
pub mod verify;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::HarnessParams;
use preflight::CoreBuildConfig;

/// Errors that abort a single test case.
#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("workload build failed with exit status {status} in {dir}")]
    BuildFailed { status: i32, dir: PathBuf },

    #[error("toolchain `{0}` not found on PATH")]
    ToolchainNotFound(String),

    #[error("simulator timed out after {0} seconds")]
    Timeout(u64),

    #[error("expected statistics file missing: {0}")]
    MissingOutput(PathBuf),

    #[error(
        "line count between stats file {produced} and reference file {reference} \
         differs by {delta} lines (threshold {threshold})"
    )]
    LineCountMismatch {
        produced: PathBuf,
        reference: PathBuf,
        delta: u64,
        threshold: u64,
    },
}

/// Outcome of a test case that did not error.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// All preconditions held and verification succeeded.
    Passed,
    /// A precondition was unmet; the case did not run.
    Skipped { reason: String },
}

impl Verdict {
    /// True if the case ran and passed.
    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Passed)
    }

    /// True if the case was skipped.
    pub fn is_skip(&self) -> bool {
        matches!(self, Verdict::Skipped { .. })
    }
}

/// Per-run context: every path a test case touches, derived from the case
/// name, the fixture directory, and a work root.
///
/// Replaces the shared working-directory fields of the older suite with an
/// explicit object passed between phases.
#[derive(Clone, Debug)]
pub struct RunContext {
    /// Test case name; also the workload directory and binary name.
    pub case_name: String,
    /// Directory holding fixture files and the `refFiles/` reference.
    pub fixture_dir: PathBuf,
    /// Scratch directory, recreated on every staging pass.
    pub scratch_dir: PathBuf,
    /// Directory receiving `.out`, `.err` and `.stats_out` files.
    pub output_dir: PathBuf,
    /// Fixture files symlinked into the scratch root.
    pub staged_files: Vec<String>,
    /// Workload subdirectory of the fixture dir, staged file by file.
    pub workload: String,
    /// Trace file name inside the workload directory.
    pub trace_name: String,
    /// Memory configuration file name inside the scratch root.
    pub mem_config: String,
    /// Topology script handed to the simulator.
    pub sdl_script: PathBuf,
}

impl RunContext {
    /// Creates a context for `case_name` with fixtures from `fixture_dir`
    /// and all run state under `work_root`.
    pub fn new(
        case_name: impl Into<String>,
        fixture_dir: impl Into<PathBuf>,
        work_root: impl Into<PathBuf>,
    ) -> Self {
        let case_name = case_name.into();
        let fixture_dir = fixture_dir.into();
        let work_root = work_root.into();

        Self {
            sdl_script: fixture_dir.join(format!("{case_name}.py")),
            scratch_dir: work_root.join(format!("scratch_{case_name}")),
            output_dir: work_root.join("run"),
            staged_files: Vec::new(),
            workload: case_name.clone(),
            trace_name: "cuda_calls.trace".to_string(),
            mem_config: "mem.cfg".to_string(),
            case_name,
            fixture_dir,
        }
    }

    /// Sets the fixture files symlinked into the scratch root.
    pub fn with_staged_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.staged_files = files.into_iter().map(Into::into).collect();
        self
    }

    /// Overrides the workload subdirectory name.
    pub fn with_workload(mut self, workload: impl Into<String>) -> Self {
        self.workload = workload.into();
        self
    }

    /// Overrides the trace file name.
    pub fn with_trace_name(mut self, name: impl Into<String>) -> Self {
        self.trace_name = name.into();
        self
    }

    /// Overrides the memory configuration file name.
    pub fn with_mem_config(mut self, name: impl Into<String>) -> Self {
        self.mem_config = name.into();
        self
    }

    /// Overrides the topology script path.
    pub fn with_sdl_script(mut self, path: impl Into<PathBuf>) -> Self {
        self.sdl_script = path.into();
        self
    }

    /// Workload sources inside the fixture directory.
    pub fn workload_src_dir(&self) -> PathBuf {
        self.fixture_dir.join(&self.workload)
    }

    /// Staged workload directory inside scratch.
    pub fn workload_dir(&self) -> PathBuf {
        self.scratch_dir.join(&self.workload)
    }

    /// Compiled workload binary (named after the workload directory).
    pub fn workload_binary(&self) -> PathBuf {
        self.workload_dir().join(&self.workload)
    }

    /// Trace file inside the staged workload directory.
    pub fn trace_file(&self) -> PathBuf {
        self.workload_dir().join(&self.trace_name)
    }

    /// Memory configuration file inside scratch.
    pub fn mem_config_path(&self) -> PathBuf {
        self.scratch_dir.join(&self.mem_config)
    }

    /// Golden reference file, read-only.
    pub fn ref_file(&self) -> PathBuf {
        self.fixture_dir
            .join("refFiles")
            .join(format!("{}.out", self.case_name))
    }

    /// Captured simulator stdout.
    pub fn out_file(&self) -> PathBuf {
        self.output_dir.join(format!("{}.out", self.case_name))
    }

    /// Captured simulator stderr.
    pub fn err_file(&self) -> PathBuf {
        self.output_dir.join(format!("{}.err", self.case_name))
    }

    /// Statistics file the simulator is asked to write.
    pub fn stats_file(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}.stats_out", self.case_name))
    }
}

/// Drives a test case through preflight, staging, execution and
/// verification.
#[derive(Clone, Debug, Default)]
pub struct TestHarness {
    params: HarnessParams,
    build_config: CoreBuildConfig,
}

impl TestHarness {
    /// Creates a harness with the given parameters and an empty core
    /// build configuration (no forbidden key can match).
    pub fn new(params: HarnessParams) -> Self {
        Self {
            params,
            build_config: CoreBuildConfig::default(),
        }
    }

    /// Supplies the external core's build configuration for gating.
    pub fn with_build_config(mut self, build_config: CoreBuildConfig) -> Self {
        self.build_config = build_config;
        self
    }

    /// Loads the core build configuration from a file.
    pub fn with_build_config_file<P: AsRef<Path>>(
        mut self,
        path: P,
    ) -> Result<Self, HarnessError> {
        self.build_config = CoreBuildConfig::from_file(path)?;
        Ok(self)
    }

    /// The harness parameters in effect.
    pub fn params(&self) -> &HarnessParams {
        &self.params
    }

    /// Runs a single test case to completion.
    ///
    /// Unmet preconditions return `Ok(Verdict::Skipped)`. Any later
    /// failure is an error and terminal for this case.
    pub fn run(&self, ctx: &RunContext) -> Result<Verdict, HarnessError> {
        if let Some(reason) = preflight::check(&self.params, &self.build_config) {
            tracing::info!(case = %ctx.case_name, %reason, "skipping test case");
            return Ok(Verdict::Skipped { reason });
        }

        tracing::debug!(case = %ctx.case_name, scratch = %ctx.scratch_dir.display(), "staging");
        stage::stage(ctx, &self.params)?;

        tracing::debug!(case = %ctx.case_name, sdl = %ctx.sdl_script.display(), "executing");
        exec::run_simulator(ctx, &self.params)?;

        let delta = verify::check(ctx, self.params.line_threshold)?;
        tracing::debug!(case = %ctx.case_name, delta, "verified");

        Ok(Verdict::Passed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_paths() {
        let ctx = RunContext::new("vectorAdd", "/fixtures/tests", "/tmp/work");

        assert_eq!(ctx.scratch_dir, PathBuf::from("/tmp/work/scratch_vectorAdd"));
        assert_eq!(ctx.workload_src_dir(), PathBuf::from("/fixtures/tests/vectorAdd"));
        assert_eq!(
            ctx.workload_binary(),
            PathBuf::from("/tmp/work/scratch_vectorAdd/vectorAdd/vectorAdd")
        );
        assert_eq!(
            ctx.trace_file(),
            PathBuf::from("/tmp/work/scratch_vectorAdd/vectorAdd/cuda_calls.trace")
        );
        assert_eq!(
            ctx.ref_file(),
            PathBuf::from("/fixtures/tests/refFiles/vectorAdd.out")
        );
        assert_eq!(
            ctx.stats_file(),
            PathBuf::from("/tmp/work/run/vectorAdd.stats_out")
        );
        assert_eq!(ctx.sdl_script, PathBuf::from("/fixtures/tests/vectorAdd.py"));
    }

    #[test]
    fn test_context_overrides() {
        let ctx = RunContext::new("case", "/f", "/w")
            .with_workload("sample")
            .with_trace_name("calls.trace")
            .with_mem_config("gpu-v100-mem.cfg")
            .with_sdl_script("/f/topology.py");

        assert_eq!(ctx.workload_dir(), PathBuf::from("/w/scratch_case/sample"));
        assert_eq!(
            ctx.trace_file(),
            PathBuf::from("/w/scratch_case/sample/calls.trace")
        );
        assert_eq!(
            ctx.mem_config_path(),
            PathBuf::from("/w/scratch_case/gpu-v100-mem.cfg")
        );
        assert_eq!(ctx.sdl_script, PathBuf::from("/f/topology.py"));
    }

    #[test]
    fn test_verdict_predicates() {
        assert!(Verdict::Passed.is_pass());
        assert!(!Verdict::Passed.is_skip());

        let skip = Verdict::Skipped {
            reason: "missing env".to_string(),
        };
        assert!(skip.is_skip());
        assert!(!skip.is_pass());
    }
}
