/*!
 * Write-back addressing.
 *
 * Every target segment marker, and every placeholder directly addressable
 * inside one, is registered once at load time under the path
 * `(file original, unit id, mid[, placeholder id])`.
 */

use std::collections::HashMap;
use std::fmt;

use crate::dom::NodeId;

/// Path identifying one marker or placeholder of a unit's target
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeAddress {
    /// `original` attribute of the file
    pub file: String,
    /// Translation unit id
    pub unit: String,
    /// Segment marker id
    pub mid: String,
    /// Placeholder id inside the marker
    pub placeholder: Option<String>,
}

impl NodeAddress {
    pub fn marker(file: impl Into<String>, unit: impl Into<String>, mid: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            unit: unit.into(),
            mid: mid.into(),
            placeholder: None,
        }
    }

    /// Same marker, narrowed to one of its placeholders
    pub fn with_placeholder(&self, placeholder: impl Into<String>) -> Self {
        Self {
            placeholder: Some(placeholder.into()),
            ..self.clone()
        }
    }
}

impl fmt::Display for NodeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file '{}' / unit '{}' / mrk '{}'", self.file, self.unit, self.mid)?;
        if let Some(placeholder) = &self.placeholder {
            write!(f, " / g '{}'", placeholder)?;
        }
        Ok(())
    }
}

/// Address to node map for a loaded tree
#[derive(Debug, Clone, Default)]
pub struct NodeIndex {
    nodes: HashMap<NodeAddress, NodeId>,
    duplicates: Vec<NodeAddress>,
}

impl NodeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node; the first registration of an address wins
    pub fn insert(&mut self, address: NodeAddress, node: NodeId) -> bool {
        if self.nodes.contains_key(&address) {
            self.duplicates.push(address);
            return false;
        }
        self.nodes.insert(address, node);
        true
    }

    pub fn get(&self, address: &NodeAddress) -> Option<NodeId> {
        self.nodes.get(address).copied()
    }

    /// Addresses seen more than once while indexing
    pub fn duplicates(&self) -> &[NodeAddress] {
        &self.duplicates
    }
}
