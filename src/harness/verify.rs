//! Output verification by line-count comparison.
//!
//! The produced statistics file is compared to the golden reference by
//! absolute line-count difference against a fixed threshold. This is a
//! deliberately approximate oracle carried over from the older shell-based
//! suite; it is preserved as a literal compatibility behavior.

use std::io::{self, BufRead, BufReader};
use std::path::Path;

use super::{HarnessError, RunContext};

/// Counts the lines of a file.
pub fn line_count<P: AsRef<Path>>(path: P) -> io::Result<u64> {
    let file = std::fs::File::open(path)?;
    let reader = BufReader::new(file);
    let mut count = 0u64;
    for line in reader.lines() {
        line?;
        count += 1;
    }
    Ok(count)
}

/// True if the two line counts differ by no more than `threshold`.
pub fn within_threshold(produced: u64, reference: u64, threshold: u64) -> bool {
    produced.abs_diff(reference) <= threshold
}

/// Verifies a test case's statistics output against its reference.
///
/// Returns the line-count delta on success. The statistics file must
/// exist; a delta beyond the threshold fails with both paths and the
/// numeric difference.
pub fn check(ctx: &RunContext, threshold: u64) -> Result<u64, HarnessError> {
    let stats = ctx.stats_file();
    if !stats.is_file() {
        return Err(HarnessError::MissingOutput(stats));
    }

    let produced = line_count(&stats)?;
    let reference_path = ctx.ref_file();
    let reference = line_count(&reference_path)?;
    let delta = produced.abs_diff(reference);

    tracing::debug!(produced, reference, delta, threshold, "line count comparison");

    if delta > threshold {
        return Err(HarnessError::LineCountMismatch {
            produced: stats,
            reference: reference_path,
            delta,
            threshold,
        });
    }
    Ok(delta)
}
