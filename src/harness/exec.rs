//! Simulator invocation with structured arguments and a wall-clock
//! timeout.
//!
//! The model options are built as a typed value and rendered once, instead
//! of string-concatenating a command line. stdout and stderr go to the
//! context's `.out`/`.err` files.

use std::fmt;
use std::fs::File;
use std::path::PathBuf;
use std::process::Command;
use std::time::{Duration, Instant};

use crate::config::HarnessParams;

use super::{HarnessError, RunContext};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// The element-specific options passed through to the simulated model:
/// memory configuration, statistics output, workload binary and trace.
#[derive(Clone, Debug)]
pub struct ModelOptions {
    pub mem_config: PathBuf,
    pub stats_file: PathBuf,
    pub binary: PathBuf,
    pub trace: PathBuf,
}

impl ModelOptions {
    /// Derives the options from a run context.
    pub fn from_context(ctx: &RunContext) -> Self {
        Self {
            mem_config: ctx.mem_config_path(),
            stats_file: ctx.stats_file(),
            binary: ctx.workload_binary(),
            trace: ctx.trace_file(),
        }
    }
}

impl fmt::Display for ModelOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "-c {} -s {} -x {} -t {}",
            self.mem_config.display(),
            self.stats_file.display(),
            self.binary.display(),
            self.trace.display()
        )
    }
}

/// Runs the simulator for a test case.
///
/// Blocks until the process exits or the timeout elapses; a timeout kills
/// the process and is a hard failure. A nonzero exit status is logged but
/// not fatal here; verification decides the case on the statistics file.
pub fn run_simulator(ctx: &RunContext, params: &HarnessParams) -> Result<(), HarnessError> {
    let options = ModelOptions::from_context(ctx);

    let stdout = File::create(ctx.out_file())?;
    let stderr = File::create(ctx.err_file())?;

    tracing::debug!(
        simulator = %params.simulator,
        sdl = %ctx.sdl_script.display(),
        model_options = %options,
        "launching simulator"
    );

    let mut child = Command::new(&params.simulator)
        .arg(format!("--model-options={options}"))
        .arg(&ctx.sdl_script)
        .current_dir(&ctx.scratch_dir)
        .stdout(stdout)
        .stderr(stderr)
        .spawn()?;

    let deadline = Instant::now() + Duration::from_secs(params.timeout_secs);
    loop {
        if let Some(status) = child.try_wait()? {
            if !status.success() {
                tracing::warn!(
                    status = ?status.code(),
                    err_file = %ctx.err_file().display(),
                    "simulator exited with nonzero status"
                );
            }
            return Ok(());
        }
        if Instant::now() >= deadline {
            child.kill().ok();
            child.wait().ok();
            return Err(HarnessError::Timeout(params.timeout_secs));
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}
