//! Mutable state shared by the reports of one decoding run.
//!
//! Passed explicitly to the report decoder so that separate inputs can be
//! decoded independently and merged afterwards.

use crate::constants::SYNTHETIC_ID_BASE;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Synthetic ids for mobile stations without a numeric identifier
#[derive(Debug, Clone)]
pub struct ShipRegistry {
    ids: HashMap<String, u32>,
    next_id: u32,
}

impl Default for ShipRegistry {
    fn default() -> Self {
        Self {
            ids: HashMap::new(),
            next_id: SYNTHETIC_ID_BASE,
        }
    }
}

impl ShipRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of a ship name, allocating a new one for names not seen before
    pub fn id_for(&mut self, name: &str) -> u32 {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.ids.insert(name.to_string(), id);
        debug!("Allocated synthetic id {} for '{}'", id, name);
        id
    }

    pub fn get(&self, name: &str) -> Option<u32> {
        self.ids.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Take over the names of another registry.
    ///
    /// Returns how ids handed out by `other` map onto ids of `self`; only
    /// ids that change are listed.
    pub fn merge(&mut self, other: ShipRegistry) -> HashMap<u32, u32> {
        let mut entries: Vec<(String, u32)> = other.ids.into_iter().collect();
        entries.sort_by_key(|(_, id)| *id);

        let mut remap = HashMap::new();
        for (name, other_id) in entries {
            let id = self.id_for(&name);
            if id != other_id {
                remap.insert(other_id, id);
            }
        }
        remap
    }
}

/// Explicit decoding context
#[derive(Debug, Clone, Default)]
pub struct DecodeContext {
    /// Land station ids the resolver did not know
    pub unresolved: BTreeSet<u32>,
    pub ships: ShipRegistry,
}

impl DecodeContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_unresolved(&mut self, id: u32) {
        if self.unresolved.insert(id) {
            debug!("Unknown station id {}", id);
        }
    }
}
