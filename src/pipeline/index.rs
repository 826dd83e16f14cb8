use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::parsers::{NodeId, Way, WayId};

///
/// Way id -> node count for every way seen, plus the node lists of the ways
/// relation classification needs. Built in one pass and only read
/// afterwards.
///
#[derive(Debug, Default)]
pub struct WayIndex {
    node_counts: HashMap<WayId, usize>,
    nodes: HashMap<WayId, Vec<NodeId>>,
}

impl WayIndex {
    pub fn new() -> Self {
        WayIndex::default()
    }

    /// Record a way together with its node list.
    pub fn insert(&mut self, way: &Way) -> Result<()> {
        self.record(way, true)
    }

    ///
    /// Record the node count of a way and, if `keep_nodes` is set, its node
    /// list. Every way id may only be recorded once.
    ///
    pub fn record(&mut self, way: &Way, keep_nodes: bool) -> Result<()> {
        match self.node_counts.entry(way.id) {
            Entry::Occupied(_) => {
                return Err(Error::malformed(
                    format!("w{}", way.id.0),
                    "way appears more than once in the input",
                ))
            }
            Entry::Vacant(entry) => {
                entry.insert(way.nodes.len());
            }
        }
        if keep_nodes {
            self.nodes.insert(way.id, way.nodes.clone());
        }
        Ok(())
    }

    pub fn contains(&self, way: WayId) -> bool {
        self.node_counts.contains_key(&way)
    }

    pub fn node_count(&self, way: WayId) -> Option<usize> {
        self.node_counts.get(&way).cloned()
    }

    pub fn nodes(&self, way: WayId) -> Option<&[NodeId]> {
        self.nodes.get(&way).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.node_counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_counts.is_empty()
    }
}
