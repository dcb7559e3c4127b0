//! Page-wide set of targets currently carrying the `zooming` marker.

use std::collections::BTreeMap;

use crate::stage::Stage;
use crate::{TargetId, ZOOMING};

#[derive(Debug)]
pub struct TransitionRegistry<N> {
    entries: BTreeMap<TargetId, N>,
}

impl<N> Default for TransitionRegistry<N> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<N: Clone> TransitionRegistry<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(&mut self, id: TargetId, node: N) {
        self.entries.insert(id, node);
    }

    pub fn leave(&mut self, id: TargetId) {
        self.entries.remove(&id);
    }

    pub fn contains(&self, id: TargetId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn ids(&self) -> Vec<TargetId> {
        self.entries.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Strip the `zooming` marker from every registered node and forget
    /// them. Returns how many were cleared.
    pub fn sweep<S: Stage<Node = N>>(&mut self, stage: &S) -> usize {
        let cleared = self.entries.len();
        for node in self.entries.values() {
            stage.remove_class(node, ZOOMING);
        }
        self.entries.clear();
        cleared
    }
}
