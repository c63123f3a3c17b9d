//! Generate an SDL input script for a vault-chain topology.
//!
//! Builds the stock two-layer, eight-vault graph (or a custom size from
//! the command line) and prints the Python script the simulation core
//! loads at startup.
//!
//! Usage: `cargo run --example vault_chain [layers] [vaults_per_layer]`

use vaultbench::sdl;
use vaultbench::vaults::VaultChainSpec;

fn main() {
    vaultbench::init_logging("info");

    let mut args = std::env::args().skip(1);
    let mut spec = VaultChainSpec::default();
    if let Some(layers) = args.next().and_then(|s| s.parse().ok()) {
        spec.logic_layers = layers;
    }
    if let Some(vaults) = args.next().and_then(|s| s.parse().ok()) {
        spec.vaults_per_layer = vaults;
    }

    let topology = match spec.build() {
        Ok(t) => t,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        components = topology.component_count(),
        links = topology.link_count(),
        "built vault chain"
    );

    match sdl::render(&topology) {
        Ok(script) => print!("{script}"),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}
