//! # Vaultbench
//!
//! Topology description and regression-test tooling for an external
//! discrete-event simulation core. The core itself (component scheduling,
//! event delivery, link timing, statistics collection) is an external
//! collaborator; this crate supplies the orchestration around it:
//!
//! - **Topology descriptors**: declarative component/link graphs with
//!   per-link latencies, built from compact parameter tables and rendered
//!   into the SDL scripts the core loads at startup.
//! - **Regression harness**: environment-gated test invocation, fixture
//!   staging into a scratch directory, trace-driven simulator runs with
//!   timeouts, and line-count comparison against golden references.
//!
//! ## Quick Start
//!
//! ```
//! use vaultbench::vaults::VaultChainSpec;
//! use vaultbench::sdl;
//!
//! // Two logic layers, eight DRAM vaults each.
//! let topology = VaultChainSpec::default().build().unwrap();
//! assert_eq!(topology.link_count(), 18);
//!
//! let script = sdl::render(&topology).unwrap();
//! assert!(script.contains("import sst"));
//! ```
//!
//! ## Running a test case
//!
//! ```rust,ignore
//! use vaultbench::config::BenchConfig;
//! use vaultbench::harness::{RunContext, TestHarness};
//!
//! let config = BenchConfig::from_yaml_file("bench.yaml")?;
//! let harness = TestHarness::new(config.harness.clone())
//!     .with_build_config_file("core_config.h")?;
//!
//! let ctx = RunContext::new("vectorAdd", "tests/fixtures", "/tmp/vaultbench")
//!     .with_staged_files(["gpu-v100-mem.cfg", "gpgpusim.config"])
//!     .with_mem_config("gpu-v100-mem.cfg");
//!
//! let verdict = harness.run(&ctx)?;
//! ```
//!
//! ## Features
//!
//! - `parallel` - Enable parallel suite execution using rayon

pub mod config;
pub mod harness;
pub mod report;
pub mod sdl;
pub mod suite;
pub mod timespec;
pub mod topology;
pub mod vaults;

// Re-export commonly used types
pub use config::{BenchConfig, BenchConfigBuilder, ConfigError, HarnessParams};
pub use harness::{HarnessError, RunContext, TestHarness, Verdict};
pub use report::{Outcome, RunReport, SuiteReport};
pub use sdl::SdlError;
pub use suite::TestSuite;
pub use timespec::{TimeSpec, TimeUnit};
pub use topology::{Component, Endpoint, Link, ProgramOptions, Topology, TopologyError};
pub use vaults::VaultChainSpec;

/// Initialize the tracing subscriber for logging.
///
/// Call this at the start of your program to enable logging.
///
/// # Example
///
/// ```rust,ignore
/// vaultbench::init_logging("info");
/// ```
pub fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
