//! Configuration system for the harness and topology tooling.
//!
//! This module provides YAML/JSON configuration file support for defining
//! a regression run declaratively.
//!
//! # Configuration File Structure
//!
//! ```yaml
//! harness:
//!   required_env: [CUDA_INSTALL_PATH, GPGPUSIM_ROOT]
//!   forbidden_build_keys: [USE_MEMPOOL, SST_CONFIG_HAVE_MPI]
//!   build_command: [make]
//!   toolchain: nvcc
//!   toolchain_env: NVCC_PATH
//!   simulator: sst
//!   timeout_secs: 400
//!   line_threshold: 15
//!
//! vault_chain:
//!   logic_layers: 2
//!   vaults_per_layer: 8
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::vaults::{VaultChainError, VaultChainSpec};

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown file format: {0}")]
    UnknownFormat(String),
}

impl From<VaultChainError> for ConfigError {
    fn from(e: VaultChainError) -> Self {
        ConfigError::Validation(e.to_string())
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

fn default_required_env() -> Vec<String> {
    vec!["CUDA_INSTALL_PATH".to_string(), "GPGPUSIM_ROOT".to_string()]
}

fn default_forbidden_build_keys() -> Vec<String> {
    vec!["USE_MEMPOOL".to_string(), "SST_CONFIG_HAVE_MPI".to_string()]
}

fn default_build_command() -> Vec<String> {
    vec!["make".to_string()]
}

fn default_toolchain() -> String {
    "nvcc".to_string()
}

fn default_toolchain_env() -> String {
    "NVCC_PATH".to_string()
}

fn default_simulator() -> String {
    "sst".to_string()
}

fn default_timeout_secs() -> u64 {
    400
}

fn default_line_threshold() -> u64 {
    15
}

/// Knobs for a single harness run.
///
/// The defaults describe the stock trace-replay regression: CUDA toolchain
/// and GPU model repository must be present, the core must be built without
/// memory pools and without MPI, and statistics output may drift from the
/// reference by at most 15 lines.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HarnessParams {
    /// Environment variables that must be set for the test to run at all.
    #[serde(default = "default_required_env")]
    pub required_env: Vec<String>,

    /// Core build-configuration keys that, when set, make the test
    /// inapplicable (skip, not failure).
    #[serde(default = "default_forbidden_build_keys")]
    pub forbidden_build_keys: Vec<String>,

    /// Command run inside the staged workload directory to build it.
    #[serde(default = "default_build_command")]
    pub build_command: Vec<String>,

    /// Compiler executable to locate on PATH during staging.
    #[serde(default = "default_toolchain")]
    pub toolchain: String,

    /// Environment variable the resolved toolchain path is exported to.
    #[serde(default = "default_toolchain_env")]
    pub toolchain_env: String,

    /// External simulator executable.
    #[serde(default = "default_simulator")]
    pub simulator: String,

    /// Wall-clock timeout for the simulator run, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum tolerated line-count difference between the produced
    /// statistics file and the reference file.
    ///
    /// Inherited as-is from the older shell-based suite; a compatibility
    /// behavior, not a precise oracle.
    #[serde(default = "default_line_threshold")]
    pub line_threshold: u64,
}

impl Default for HarnessParams {
    fn default() -> Self {
        Self {
            required_env: default_required_env(),
            forbidden_build_keys: default_forbidden_build_keys(),
            build_command: default_build_command(),
            toolchain: default_toolchain(),
            toolchain_env: default_toolchain_env(),
            simulator: default_simulator(),
            timeout_secs: default_timeout_secs(),
            line_threshold: default_line_threshold(),
        }
    }
}

impl HarnessParams {
    /// Validates the harness parameters.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.build_command.is_empty() {
            return Err(ConfigError::Validation(
                "build_command must not be empty".to_string(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "timeout_secs must be nonzero".to_string(),
            ));
        }
        if self.simulator.is_empty() {
            return Err(ConfigError::Validation(
                "simulator must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Complete configuration: harness knobs plus an optional topology table.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BenchConfig {
    /// Harness run parameters.
    #[serde(default)]
    pub harness: HarnessParams,

    /// Optional vault-chain topology table.
    #[serde(default)]
    pub vault_chain: Option<VaultChainSpec>,
}

impl BenchConfig {
    /// Creates a configuration with all defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Loads configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> ConfigResult<Self> {
        let config: BenchConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Loads configuration from a JSON string.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: BenchConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a file, auto-detecting format.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        match ext.to_lowercase().as_str() {
            "yaml" | "yml" => Self::from_yaml_file(path),
            "json" => Self::from_json_file(path),
            _ => Err(ConfigError::UnknownFormat(ext.to_string())),
        }
    }

    /// Validates the entire configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        self.harness.validate()?;
        if let Some(chain) = &self.vault_chain {
            chain.validate()?;
        }
        Ok(())
    }

    /// Saves configuration to a YAML file.
    pub fn to_yaml_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Converts to YAML string.
    pub fn to_yaml(&self) -> ConfigResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Converts to JSON string.
    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Builder for creating a BenchConfig programmatically.
#[derive(Default)]
pub struct BenchConfigBuilder {
    config: BenchConfig,
}

impl BenchConfigBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the required environment variables.
    pub fn required_env<I, S>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.harness.required_env = vars.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the forbidden core build keys.
    pub fn forbidden_build_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.harness.forbidden_build_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the workload build command.
    pub fn build_command<I, S>(mut self, argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.harness.build_command = argv.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the simulator executable.
    pub fn simulator(mut self, simulator: impl Into<String>) -> Self {
        self.config.harness.simulator = simulator.into();
        self
    }

    /// Sets the run timeout in seconds.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.harness.timeout_secs = secs;
        self
    }

    /// Sets the line-count acceptance threshold.
    pub fn line_threshold(mut self, threshold: u64) -> Self {
        self.config.harness.line_threshold = threshold;
        self
    }

    /// Sets the vault-chain topology table.
    pub fn vault_chain(mut self, spec: VaultChainSpec) -> Self {
        self.config.vault_chain = Some(spec);
        self
    }

    /// Builds and validates the configuration.
    pub fn build(self) -> ConfigResult<BenchConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
