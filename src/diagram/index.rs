//! Threats keyed by the diagram element they attach to.

use crate::model::{Threat, EDGE_ARROW};
use indexmap::IndexMap;

/// Threats split into edge elements (labels containing `→`) and node
/// elements (everything else), each in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct ElementIndex<'a> {
    nodes: IndexMap<&'a str, Vec<&'a Threat>>,
    edges: IndexMap<&'a str, Vec<&'a Threat>>,
}

impl<'a> ElementIndex<'a> {
    #[must_use]
    pub fn from_threats(threats: &'a [Threat]) -> Self {
        let mut index = Self::default();
        for threat in threats {
            let element = threat.dfd_element.as_str();
            let bucket = if is_edge(element) {
                &mut index.edges
            } else {
                &mut index.nodes
            };
            bucket.entry(element).or_default().push(threat);
        }
        index
    }

    /// Threats on a node (process, store, boundary or component).
    #[must_use]
    pub fn node(&self, name: &str) -> &[&'a Threat] {
        self.nodes.get(name).map_or(&[], Vec::as_slice)
    }

    /// Threats on an edge label.
    #[must_use]
    pub fn edge(&self, label: &str) -> &[&'a Threat] {
        self.edges.get(label).map_or(&[], Vec::as_slice)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (&'a str, &[&'a Threat])> {
        self.nodes.iter().map(|(k, v)| (*k, v.as_slice()))
    }

    pub fn edges(&self) -> impl Iterator<Item = (&'a str, &[&'a Threat])> {
        self.edges.iter().map(|(k, v)| (*k, v.as_slice()))
    }
}

/// Whether a DFD element names an edge.
#[must_use]
pub fn is_edge(element: &str) -> bool {
    element.contains(EDGE_ARROW)
}

/// `"T1: Spoofing, T4: Tampering"`, or `"None"`.
#[must_use]
pub fn threat_labels(threats: &[&Threat]) -> String {
    if threats.is_empty() {
        "None".to_string()
    } else {
        threats.iter().map(|t| t.label()).collect::<Vec<_>>().join(", ")
    }
}
