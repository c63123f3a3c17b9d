//! Fixture staging: scratch directory, symlinks, workload build,
//! toolchain lookup.
//!
//! Staging is idempotent per invocation: the scratch directory is deleted
//! and recreated every time, so two consecutive passes leave identical
//! contents. Fixture files are linked, never copied; the golden reference
//! stays untouched in the fixture directory.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::HarnessParams;

use super::{HarnessError, RunContext};

/// Stages a test case: recreates scratch, links fixtures, builds the
/// workload, resolves and exports the toolchain path.
pub fn stage(ctx: &RunContext, params: &HarnessParams) -> Result<(), HarnessError> {
    if ctx.scratch_dir.is_dir() {
        std::fs::remove_dir_all(&ctx.scratch_dir)?;
    }
    std::fs::create_dir_all(&ctx.scratch_dir)?;
    std::fs::create_dir_all(&ctx.output_dir)?;

    for file in &ctx.staged_files {
        link_into(&ctx.fixture_dir.join(file), &ctx.scratch_dir.join(file))?;
    }

    let workload_dir = ctx.workload_dir();
    std::fs::create_dir_all(&workload_dir)?;
    for entry in std::fs::read_dir(ctx.workload_src_dir())? {
        let entry = entry?;
        link_into(&entry.path(), &workload_dir.join(entry.file_name()))?;
    }

    build_workload(&workload_dir, &params.build_command)?;

    let tool = find_in_path(&params.toolchain)
        .ok_or_else(|| HarnessError::ToolchainNotFound(params.toolchain.clone()))?;
    tracing::debug!(toolchain = %tool.display(), env = %params.toolchain_env, "resolved toolchain");
    std::env::set_var(&params.toolchain_env, &tool);

    Ok(())
}

/// Runs the workload build command; nonzero exit is fatal.
fn build_workload(dir: &Path, argv: &[String]) -> Result<(), HarnessError> {
    let Some((program, args)) = argv.split_first() else {
        return Ok(());
    };
    let output = Command::new(program)
        .args(args)
        .current_dir(dir)
        .output()?;

    tracing::debug!(
        status = ?output.status.code(),
        stdout = %String::from_utf8_lossy(&output.stdout),
        stderr = %String::from_utf8_lossy(&output.stderr),
        "workload build finished"
    );

    if !output.status.success() {
        return Err(HarnessError::BuildFailed {
            status: output.status.code().unwrap_or(-1),
            dir: dir.to_path_buf(),
        });
    }
    Ok(())
}

#[cfg(unix)]
fn link_into(src: &Path, dst: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(src, dst)
}

#[cfg(not(unix))]
fn link_into(src: &Path, dst: &Path) -> std::io::Result<()> {
    std::fs::copy(src, dst).map(|_| ())
}

/// Searches PATH for an executable, like `which`.
pub fn find_in_path(name: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}
