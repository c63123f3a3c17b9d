//! Declarative component/link topology descriptions.
//!
//! A [`Topology`] is a statically determined graph: a set of typed,
//! parameterized components and the point-to-point links connecting them.
//! It carries no behavior; the external simulation core instantiates and
//! schedules the described components at load time.
//!
//! Registration is infallible. Structural invariants (unique component
//! names, each port referenced by at most one link, no dangling endpoint)
//! are checked by [`Topology::validate`], which runs at the render/load
//! boundary.
//!
//! # Example
//!
//! ```
//! use vaultbench::timespec::TimeSpec;
//! use vaultbench::topology::{Component, Endpoint, Link, ProgramOptions, Topology};
//!
//! let mut topo = Topology::new(ProgramOptions::new(TimeSpec::ps(1), TimeSpec::us(50)));
//! topo.add_component(
//!     Component::new("cpu", "vaultsim.cpu")
//!         .with_param("clock", "500Mhz")
//!         .with_param("threads", "256"),
//! );
//! topo.add_component(Component::new("ll0", "vaultsim.logicLayer"));
//! topo.add_link(Link::new(
//!     "link_chain_c_0",
//!     Endpoint::new("cpu", "toMem", TimeSpec::ps(5000)),
//!     Endpoint::new("ll0", "toCPU", TimeSpec::ps(5000)),
//! ));
//!
//! assert!(topo.validate().is_ok());
//! assert_eq!(topo.link_count(), 1);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::timespec::TimeSpec;

/// Errors detected when validating a topology.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopologyError {
    #[error("duplicate component name: {0}")]
    DuplicateComponent(String),

    #[error("duplicate link name: {0}")]
    DuplicateLink(String),

    #[error("link {link} references undeclared component {component}")]
    UnknownComponent { link: String, component: String },

    #[error("port {component}.{port} is referenced by more than one link")]
    PortReused { component: String, port: String },
}

/// A simulated hardware unit: name, type tag, and opaque parameters.
///
/// Parameters are string key/value pairs interpreted only by the external
/// core; the descriptor never inspects them. They keep declaration order,
/// so rendering emits them in the order the caller registered them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    /// Unique name within the topology (e.g. "ll0", "c0_3").
    pub name: String,
    /// Element type tag understood by the core (e.g. "vaultsim.vaultsim").
    pub kind: String,
    /// Construction-time parameters in declaration order; never mutated
    /// after registration.
    #[serde(default)]
    pub params: Vec<(String, String)>,
}

impl Component {
    /// Creates a component with no parameters.
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            params: Vec::new(),
        }
    }

    /// Adds a construction parameter. Re-adding a key overwrites its value
    /// but keeps its original position.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.params.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.params.push((key, value)),
        }
        self
    }

    /// Looks up a parameter value.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// One end of a link: a (component, port) pair with its transmission latency.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub component: String,
    pub port: String,
    pub latency: TimeSpec,
}

impl Endpoint {
    /// Creates a new endpoint reference.
    pub fn new(
        component: impl Into<String>,
        port: impl Into<String>,
        latency: TimeSpec,
    ) -> Self {
        Self {
            component: component.into(),
            port: port.into(),
            latency,
        }
    }
}

/// A symmetric point-to-point link between two endpoints.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub name: String,
    pub a: Endpoint,
    pub b: Endpoint,
}

impl Link {
    /// Creates a named link between two endpoints.
    pub fn new(name: impl Into<String>, a: Endpoint, b: Endpoint) -> Self {
        Self {
            name: name.into(),
            a,
            b,
        }
    }

    /// Both endpoints of this link.
    pub fn endpoints(&self) -> [&Endpoint; 2] {
        [&self.a, &self.b]
    }

    /// True if either endpoint references the given (component, port) pair.
    pub fn touches(&self, component: &str, port: &str) -> bool {
        self.endpoints()
            .iter()
            .any(|e| e.component == component && e.port == port)
    }
}

/// Run-level options set once per topology.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramOptions {
    /// Core time base unit (e.g. 1ps).
    pub timebase: TimeSpec,
    /// Simulated time at which the run stops.
    pub stop_at: TimeSpec,
}

impl ProgramOptions {
    /// Creates run-level options.
    pub fn new(timebase: TimeSpec, stop_at: TimeSpec) -> Self {
        Self { timebase, stop_at }
    }
}

/// A complete, statically determined component/link graph.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Topology {
    pub options: ProgramOptions,
    components: Vec<Component>,
    links: Vec<Link>,
}

impl Topology {
    /// Creates an empty topology with the given run-level options.
    pub fn new(options: ProgramOptions) -> Self {
        Self {
            options,
            components: Vec::new(),
            links: Vec::new(),
        }
    }

    /// Registers a component. Infallible; duplicates surface in `validate`.
    pub fn add_component(&mut self, component: Component) {
        self.components.push(component);
    }

    /// Registers a link. Infallible; port reuse surfaces in `validate`.
    pub fn add_link(&mut self, link: Link) {
        self.links.push(link);
    }

    /// All components in registration order.
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// All links in registration order.
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Finds a component by name.
    pub fn component(&self, name: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.name == name)
    }

    /// Finds a link by name.
    pub fn link(&self, name: &str) -> Option<&Link> {
        self.links.iter().find(|l| l.name == name)
    }

    /// Number of registered components.
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Number of registered links.
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// All links touching the given component.
    pub fn links_of(&self, component: &str) -> Vec<&Link> {
        self.links
            .iter()
            .filter(|l| l.endpoints().iter().any(|e| e.component == component))
            .collect()
    }

    /// Checks the structural invariants of the graph.
    ///
    /// - component names are unique
    /// - link names are unique
    /// - every endpoint references a declared component
    /// - every (component, port) pair is used by at most one link
    pub fn validate(&self) -> Result<(), TopologyError> {
        let mut names = HashSet::new();
        for c in &self.components {
            if !names.insert(c.name.as_str()) {
                return Err(TopologyError::DuplicateComponent(c.name.clone()));
            }
        }

        let mut link_names = HashSet::new();
        let mut ports = HashSet::new();
        for l in &self.links {
            if !link_names.insert(l.name.as_str()) {
                return Err(TopologyError::DuplicateLink(l.name.clone()));
            }
            for e in l.endpoints() {
                if !names.contains(e.component.as_str()) {
                    return Err(TopologyError::UnknownComponent {
                        link: l.name.clone(),
                        component: e.component.clone(),
                    });
                }
                if !ports.insert((e.component.clone(), e.port.clone())) {
                    return Err(TopologyError::PortReused {
                        component: e.component.clone(),
                        port: e.port.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_topology() -> Topology {
        let mut topo = Topology::new(ProgramOptions::new(TimeSpec::ps(1), TimeSpec::us(50)));
        topo.add_component(Component::new("cpu", "vaultsim.cpu").with_param("clock", "500Mhz"));
        topo.add_component(Component::new("ll0", "vaultsim.logicLayer"));
        topo.add_link(Link::new(
            "link_chain_c_0",
            Endpoint::new("cpu", "toMem", TimeSpec::ps(5000)),
            Endpoint::new("ll0", "toCPU", TimeSpec::ps(5000)),
        ));
        topo
    }

    #[test]
    fn test_registration_and_lookup() {
        let topo = small_topology();
        assert_eq!(topo.component_count(), 2);
        assert_eq!(topo.link_count(), 1);

        let cpu = topo.component("cpu").unwrap();
        assert_eq!(cpu.kind, "vaultsim.cpu");
        assert_eq!(cpu.param("clock"), Some("500Mhz"));
        assert_eq!(cpu.param("missing"), None);

        let link = topo.link("link_chain_c_0").unwrap();
        assert!(link.touches("cpu", "toMem"));
        assert!(link.touches("ll0", "toCPU"));
        assert!(!link.touches("cpu", "toCPU"));
    }

    #[test]
    fn test_params_keep_declaration_order() {
        let c = Component::new("cpu", "vaultsim.cpu")
            .with_param("seed", "10000")
            .with_param("app", "0")
            .with_param("clock", "500Mhz")
            .with_param("seed", "42");

        let keys: Vec<&str> = c.params.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["seed", "app", "clock"]);
        assert_eq!(c.param("seed"), Some("42"));
    }

    #[test]
    fn test_links_of() {
        let topo = small_topology();
        assert_eq!(topo.links_of("cpu").len(), 1);
        assert_eq!(topo.links_of("ll0").len(), 1);
        assert!(topo.links_of("c0_0").is_empty());
    }

    #[test]
    fn test_validate_ok() {
        assert!(small_topology().validate().is_ok());
    }

    #[test]
    fn test_validate_duplicate_component() {
        let mut topo = small_topology();
        topo.add_component(Component::new("cpu", "vaultsim.cpu"));
        assert_eq!(
            topo.validate(),
            Err(TopologyError::DuplicateComponent("cpu".to_string()))
        );
    }

    #[test]
    fn test_validate_duplicate_link_name() {
        let mut topo = small_topology();
        topo.add_component(Component::new("ll1", "vaultsim.logicLayer"));
        topo.add_link(Link::new(
            "link_chain_c_0",
            Endpoint::new("ll0", "toMem", TimeSpec::ps(5000)),
            Endpoint::new("ll1", "toCPU", TimeSpec::ps(5000)),
        ));
        assert!(matches!(
            topo.validate(),
            Err(TopologyError::DuplicateLink(_))
        ));
    }

    #[test]
    fn test_validate_unknown_component() {
        let mut topo = small_topology();
        topo.add_link(Link::new(
            "link_bad",
            Endpoint::new("ll0", "toMem", TimeSpec::ps(5000)),
            Endpoint::new("ghost", "toCPU", TimeSpec::ps(5000)),
        ));
        assert_eq!(
            topo.validate(),
            Err(TopologyError::UnknownComponent {
                link: "link_bad".to_string(),
                component: "ghost".to_string(),
            })
        );
    }

    #[test]
    fn test_validate_port_reuse() {
        let mut topo = small_topology();
        topo.add_component(Component::new("ll1", "vaultsim.logicLayer"));
        // cpu.toMem is already connected by link_chain_c_0.
        topo.add_link(Link::new(
            "link_fanout",
            Endpoint::new("cpu", "toMem", TimeSpec::ps(5000)),
            Endpoint::new("ll1", "toCPU", TimeSpec::ps(5000)),
        ));
        assert_eq!(
            topo.validate(),
            Err(TopologyError::PortReused {
                component: "cpu".to_string(),
                port: "toMem".to_string(),
            })
        );
    }

    #[test]
    fn test_serialization_roundtrip() {
        let topo = small_topology();
        let json = serde_json::to_string(&topo).unwrap();
        let back: Topology = serde_json::from_str(&json).unwrap();

        assert_eq!(back.component_count(), topo.component_count());
        assert_eq!(back.link_count(), topo.link_count());
        assert_eq!(back.options, topo.options);
        assert_eq!(back.link("link_chain_c_0"), topo.link("link_chain_c_0"));
    }
}
