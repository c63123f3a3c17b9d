//! Rendering topologies into SDL input scripts.
//!
//! The external core consumes a Python description of the component/link
//! graph. [`render`] produces that script from a [`Topology`], in the same
//! shape the core's own generator emits: program options first, then one
//! `sst.Component` block per component, then the link section.
//!
//! The topology is validated before rendering; a malformed graph never
//! reaches the core.

use std::path::Path;
use thiserror::Error;

use crate::topology::{Topology, TopologyError};

/// Errors from rendering or writing an SDL script.
#[derive(Error, Debug)]
pub enum SdlError {
    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Renders a topology into SDL script text.
pub fn render(topology: &Topology) -> Result<String, SdlError> {
    topology.validate()?;

    let mut out = String::new();
    out.push_str("# Automatically generated SST Python input\n");
    out.push_str("import sst\n\n");

    out.push_str("# Define SST core options\n");
    // The core's generator spells the timebase with a space ("1 ps").
    out.push_str(&format!(
        "sst.setProgramOption(\"timebase\", \"{} {}\")\n",
        topology.options.timebase.value, topology.options.timebase.unit
    ));
    out.push_str(&format!(
        "sst.setProgramOption(\"stop-at\", \"{}\")\n\n",
        topology.options.stop_at
    ));

    out.push_str("# Define the simulation components\n");
    for c in topology.components() {
        out.push_str(&format!(
            "comp_{} = sst.Component(\"{}\", \"{}\")\n",
            c.name, c.name, c.kind
        ));
        if !c.params.is_empty() {
            out.push_str(&format!("comp_{}.addParams({{\n", c.name));
            let body: Vec<String> = c
                .params
                .iter()
                .map(|(k, v)| format!("      \"{}\" : \"\"\"{}\"\"\"", k, v))
                .collect();
            out.push_str(&body.join(",\n"));
            out.push_str("\n})\n");
        }
    }

    out.push_str("\n\n# Define the simulation links\n");
    for l in topology.links() {
        out.push_str(&format!("{} = sst.Link(\"{}\")\n", l.name, l.name));
        out.push_str(&format!(
            "{}.connect( (comp_{}, \"{}\", \"{}\"), (comp_{}, \"{}\", \"{}\") )\n",
            l.name, l.a.component, l.a.port, l.a.latency, l.b.component, l.b.port, l.b.latency
        ));
    }
    out.push_str("# End of generated output.\n");

    Ok(out)
}

/// Renders a topology and writes the script to `path`.
pub fn write_script<P: AsRef<Path>>(topology: &Topology, path: P) -> Result<(), SdlError> {
    let script = render(topology)?;
    std::fs::write(path, script)?;
    Ok(())
}
