//! Precondition gating: environment variables and core build flags.
//!
//! These checks decide test *applicability*, not correctness. A missing
//! environment variable or an incompatible core build mode means the case
//! is skipped with a descriptive reason; it is never a failure.

use std::collections::HashMap;
use std::io;
use std::path::Path;

use crate::config::HarnessParams;

/// Key/value view of the external core's build configuration.
///
/// Parsed from the core's generated configuration header, accepting both
/// `#define KEY VALUE` and `KEY=VALUE` lines. A key defined with an empty
/// value counts as unset.
#[derive(Clone, Debug, Default)]
pub struct CoreBuildConfig {
    values: HashMap<String, String>,
}

impl CoreBuildConfig {
    /// Creates an empty build configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a build configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_str_lossy(&content))
    }

    /// Parses build configuration text, ignoring unrecognized lines.
    pub fn from_str_lossy(content: &str) -> Self {
        let mut values = HashMap::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(rest) = line.strip_prefix("#define ") {
                let mut parts = rest.splitn(2, char::is_whitespace);
                if let Some(key) = parts.next() {
                    let value = parts.next().unwrap_or("").trim();
                    values.insert(key.to_string(), value.to_string());
                }
            } else if !line.starts_with('#') {
                if let Some((key, value)) = line.split_once('=') {
                    values.insert(key.trim().to_string(), value.trim().to_string());
                }
            }
        }

        Self { values }
    }

    /// Inserts a key/value pair directly.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Looks up a key's value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// True if the key is defined with a non-empty value.
    pub fn is_set(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| !v.is_empty())
    }
}

/// Checks all preconditions; returns the first skip reason, if any.
///
/// Each precondition produces a distinct reason so the skip message names
/// exactly what was missing or incompatible.
pub fn check(params: &HarnessParams, build_config: &CoreBuildConfig) -> Option<String> {
    for var in &params.required_env {
        if std::env::var_os(var).is_none() {
            return Some(format!("requires missing environment variable {var}"));
        }
    }

    for key in &params.forbidden_build_keys {
        if build_config.is_set(key) {
            return Some(format!(
                "core build configuration defines {key}; incompatible with trace-driven runs"
            ));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HarnessParams;

    fn params_with(env: Vec<&str>, keys: Vec<&str>) -> HarnessParams {
        HarnessParams {
            required_env: env.into_iter().map(String::from).collect(),
            forbidden_build_keys: keys.into_iter().map(String::from).collect(),
            ..HarnessParams::default()
        }
    }

    #[test]
    fn test_parse_define_lines() {
        let cfg = CoreBuildConfig::from_str_lossy(
            "#define USE_MEMPOOL 1\n#define SST_CONFIG_HAVE_MPI\n// comment\n",
        );
        assert_eq!(cfg.get("USE_MEMPOOL"), Some("1"));
        assert!(cfg.is_set("USE_MEMPOOL"));
        // Defined with no value counts as unset.
        assert_eq!(cfg.get("SST_CONFIG_HAVE_MPI"), Some(""));
        assert!(!cfg.is_set("SST_CONFIG_HAVE_MPI"));
    }

    #[test]
    fn test_parse_assignment_lines() {
        let cfg = CoreBuildConfig::from_str_lossy("USE_MEMPOOL=1\n# pure comment\nOTHER = yes\n");
        assert!(cfg.is_set("USE_MEMPOOL"));
        assert_eq!(cfg.get("OTHER"), Some("yes"));
        assert!(cfg.get("pure").is_none());
    }

    #[test]
    fn test_check_missing_env_skips() {
        let params = params_with(vec!["VAULTBENCH_SURELY_UNSET_VAR_12345"], vec![]);
        let reason = check(&params, &CoreBuildConfig::new()).unwrap();
        assert!(reason.contains("VAULTBENCH_SURELY_UNSET_VAR_12345"));
        assert!(reason.contains("missing environment variable"));
    }

    #[test]
    fn test_check_forbidden_build_key_skips() {
        let params = params_with(vec![], vec!["USE_MEMPOOL"]);
        let mut cfg = CoreBuildConfig::new();
        cfg.set("USE_MEMPOOL", "1");

        let reason = check(&params, &cfg).unwrap();
        assert!(reason.contains("USE_MEMPOOL"));
    }

    #[test]
    fn test_check_passes_with_no_requirements() {
        let params = params_with(vec![], vec![]);
        assert!(check(&params, &CoreBuildConfig::new()).is_none());
    }

    #[test]
    fn test_check_unset_forbidden_key_is_fine() {
        let params = params_with(vec![], vec!["USE_MEMPOOL"]);
        let cfg = CoreBuildConfig::from_str_lossy("#define USE_MEMPOOL\n");
        assert!(check(&params, &cfg).is_none());
    }
}
