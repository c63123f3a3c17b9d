//! Data-driven construction of vault-chain topologies.
//!
//! The original input scripts enumerate every vault component and link by
//! hand. Here the whole graph is derived from a compact parameter table,
//! [`VaultChainSpec`]: a CPU model, a chain of logic-layer controllers, and
//! a fixed number of DRAM vaults behind each layer. The default table
//! reproduces the stock two-layer, eight-vault configuration exactly,
//! including component names, link names, and latency strings.
//!
//! # Example
//!
//! ```
//! use vaultbench::vaults::VaultChainSpec;
//!
//! let topo = VaultChainSpec::default().build().unwrap();
//! // cpu + 2 logic layers + 16 vaults
//! assert_eq!(topo.component_count(), 19);
//! // 16 vault links + cpu chain link + 1 inter-layer chain link
//! assert_eq!(topo.link_count(), 18);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::timespec::TimeSpec;
use crate::topology::{Component, Endpoint, Link, ProgramOptions, Topology};

/// Errors from an inconsistent vault-chain table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VaultChainError {
    #[error("invalid vault chain: {0}")]
    Invalid(String),
}

fn default_logic_layers() -> u32 {
    2
}

fn default_vaults_per_layer() -> u32 {
    8
}

fn default_cpu_app() -> u32 {
    0
}

fn default_cpu_seed() -> u64 {
    10000
}

fn default_cpu_threads() -> u32 {
    256
}

fn default_bwlimit() -> u32 {
    32
}

fn default_cpu_clock() -> String {
    "500Mhz".to_string()
}

fn default_vault_clock() -> String {
    "750Mhz".to_string()
}

fn default_chain_latency() -> TimeSpec {
    TimeSpec::ps(5000)
}

fn default_vault_latency() -> TimeSpec {
    TimeSpec::ps(1000)
}

fn default_timebase() -> TimeSpec {
    TimeSpec::ps(1)
}

fn default_stop_at() -> TimeSpec {
    TimeSpec::us(50)
}

/// Parameter table for a CPU + logic-layer + vault topology.
///
/// The logic layers form a chain hanging off the CPU's memory port; each
/// layer aggregates `vaults_per_layer` vault controllers on its bus ports.
/// Both counts must be powers of two (the layer mask and the per-vault
/// address split are log2-derived).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VaultChainSpec {
    /// Number of logic-layer controllers in the chain.
    #[serde(default = "default_logic_layers")]
    pub logic_layers: u32,

    /// Number of vaults behind each logic layer.
    #[serde(default = "default_vaults_per_layer")]
    pub vaults_per_layer: u32,

    /// CPU workload selector.
    #[serde(default = "default_cpu_app")]
    pub cpu_app: u32,

    /// CPU model RNG seed.
    #[serde(default = "default_cpu_seed")]
    pub cpu_seed: u64,

    /// Number of CPU threads.
    #[serde(default = "default_cpu_threads")]
    pub cpu_threads: u32,

    /// Bandwidth limit shared by the CPU and logic layers.
    #[serde(default = "default_bwlimit")]
    pub bwlimit: u32,

    /// CPU and logic-layer clock.
    #[serde(default = "default_cpu_clock")]
    pub cpu_clock: String,

    /// Vault controller clock.
    #[serde(default = "default_vault_clock")]
    pub vault_clock: String,

    /// Latency of CPU-to-layer and layer-to-layer chain links.
    #[serde(default = "default_chain_latency")]
    pub chain_latency: TimeSpec,

    /// Latency of layer-to-vault bus links.
    #[serde(default = "default_vault_latency")]
    pub vault_latency: TimeSpec,

    /// Core time base.
    #[serde(default = "default_timebase")]
    pub timebase: TimeSpec,

    /// Simulated stop time.
    #[serde(default = "default_stop_at")]
    pub stop_at: TimeSpec,
}

impl Default for VaultChainSpec {
    fn default() -> Self {
        Self {
            logic_layers: default_logic_layers(),
            vaults_per_layer: default_vaults_per_layer(),
            cpu_app: default_cpu_app(),
            cpu_seed: default_cpu_seed(),
            cpu_threads: default_cpu_threads(),
            bwlimit: default_bwlimit(),
            cpu_clock: default_cpu_clock(),
            vault_clock: default_vault_clock(),
            chain_latency: default_chain_latency(),
            vault_latency: default_vault_latency(),
            timebase: default_timebase(),
            stop_at: default_stop_at(),
        }
    }
}

impl VaultChainSpec {
    /// Checks the table for internal consistency.
    pub fn validate(&self) -> Result<(), VaultChainError> {
        if self.logic_layers == 0 {
            return Err(VaultChainError::Invalid(
                "logic_layers must be at least 1".to_string(),
            ));
        }
        if !self.logic_layers.is_power_of_two() {
            return Err(VaultChainError::Invalid(format!(
                "logic_layers must be a power of two, got {}",
                self.logic_layers
            )));
        }
        if self.vaults_per_layer == 0 || !self.vaults_per_layer.is_power_of_two() {
            return Err(VaultChainError::Invalid(format!(
                "vaults_per_layer must be a nonzero power of two, got {}",
                self.vaults_per_layer
            )));
        }
        Ok(())
    }

    /// Total number of links the built topology will contain.
    ///
    /// One vault link per vault plus one chain link per layer (the CPU link
    /// for layer 0, then one between each adjacent pair).
    pub fn expected_link_count(&self) -> usize {
        (self.logic_layers * self.vaults_per_layer + self.logic_layers) as usize
    }

    /// Builds the complete topology from the table.
    pub fn build(&self) -> Result<Topology, VaultChainError> {
        self.validate()?;

        let ll_mask = self.logic_layers - 1;
        let num_vaults2 = self.vaults_per_layer.trailing_zeros();

        let mut topo = Topology::new(ProgramOptions::new(self.timebase, self.stop_at));

        topo.add_component(
            Component::new("cpu", "vaultsim.cpu")
                .with_param("app", self.cpu_app.to_string())
                .with_param("seed", self.cpu_seed.to_string())
                .with_param("threads", self.cpu_threads.to_string())
                .with_param("bwlimit", self.bwlimit.to_string())
                .with_param("clock", &self.cpu_clock),
        );

        for layer in 0..self.logic_layers {
            let terminal = if layer == self.logic_layers - 1 { 1 } else { 0 };
            topo.add_component(
                Component::new(format!("ll{layer}"), "vaultsim.logicLayer")
                    .with_param("bwlimit", self.bwlimit.to_string())
                    .with_param("clock", &self.cpu_clock)
                    .with_param("vaults", self.vaults_per_layer.to_string())
                    .with_param("terminal", terminal.to_string())
                    .with_param("llID", layer.to_string())
                    .with_param("LL_MASK", ll_mask.to_string()),
            );

            for vault in 0..self.vaults_per_layer {
                topo.add_component(
                    Component::new(format!("c{layer}_{vault}"), "vaultsim.vaultsim")
                        .with_param("clock", &self.vault_clock)
                        .with_param("VaultID", vault.to_string())
                        .with_param("numVaults2", num_vaults2.to_string()),
                );
            }
        }

        topo.add_link(Link::new(
            "link_chain_c_0",
            Endpoint::new("cpu", "toMem", self.chain_latency),
            Endpoint::new("ll0", "toCPU", self.chain_latency),
        ));

        for layer in 0..self.logic_layers {
            for vault in 0..self.vaults_per_layer {
                topo.add_link(Link::new(
                    format!("link_ll2V_{layer}_{vault}"),
                    Endpoint::new(format!("ll{layer}"), format!("bus_{vault}"), self.vault_latency),
                    Endpoint::new(format!("c{layer}_{vault}"), "bus", self.vault_latency),
                ));
            }
            if layer + 1 < self.logic_layers {
                topo.add_link(Link::new(
                    format!("link_chain_{}_{}", layer, layer + 1),
                    Endpoint::new(format!("ll{layer}"), "toMem", self.chain_latency),
                    Endpoint::new(format!("ll{}", layer + 1), "toCPU", self.chain_latency),
                ));
            }
        }

        Ok(topo)
    }
}
