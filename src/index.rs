use std::collections::{BTreeSet, HashMap};

use crate::error::{PartitionError, Result};
use crate::types::{VInt, VertexAttr};

/// Exact-match secondary index, mapping an attribute value to the set of
/// vertices holding it. Empty buckets are dropped, so the key set is exactly
/// the set of populated values.
#[derive(Debug, Clone)]
pub(crate) struct AttrIndex {
    attr: VertexAttr,
    entries: HashMap<u32, BTreeSet<VInt>>,
}

impl AttrIndex {
    pub(crate) fn create(attr: VertexAttr) -> AttrIndex {
        AttrIndex {
            attr,
            entries: HashMap::new(),
        }
    }

    pub(crate) fn insert(&mut self, value: u32, vertex_id: VInt) {
        self.entries.entry(value).or_default().insert(vertex_id);
    }

    pub(crate) fn remove(&mut self, value: u32, vertex_id: VInt) {
        if let Some(holders) = self.entries.get_mut(&value) {
            holders.remove(&vertex_id);
            if holders.is_empty() {
                self.entries.remove(&value);
            }
        }
    }

    /// Move a vertex from its old bucket to the new one in a single step.
    pub(crate) fn relabel(&mut self, vertex_id: VInt, old_value: Option<u32>, new_value: u32) {
        if old_value == Some(new_value) {
            return;
        }
        if let Some(old_value) = old_value {
            self.remove(old_value, vertex_id);
        }
        self.insert(new_value, vertex_id);
    }

    pub(crate) fn get(&self, value: u32) -> Option<&BTreeSet<VInt>> {
        self.entries.get(&value)
    }

    /// Holders of a value that must be populated.
    pub(crate) fn holders(&self, value: u32) -> Result<&BTreeSet<VInt>> {
        self.entries
            .get(&value)
            .ok_or_else(|| PartitionError::not_found(self.attr, value))
    }

    pub(crate) fn holder_count(&self, value: u32) -> usize {
        self.entries.get(&value).map_or(0, |holders| holders.len())
    }

    pub(crate) fn contains_value(&self, value: u32) -> bool {
        self.entries.contains_key(&value)
    }

    /// Number of distinct populated values.
    pub(crate) fn value_count(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn values(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries.keys().copied()
    }

    /// Copy the holders of a value out of the index.
    pub(crate) fn snapshot(&self, value: u32) -> IndexScan {
        let holders = self
            .entries
            .get(&value)
            .map(|holders| holders.iter().copied().collect())
            .unwrap_or_default();
        IndexScan::new(holders)
    }
}

/// Result of an index lookup. The matching ids are copied at lookup time, so
/// the store may be mutated while the scan is being drained.
#[derive(Debug, Clone)]
pub struct IndexScan {
    inner: std::vec::IntoIter<VInt>,
}

impl IndexScan {
    pub(crate) fn new(vertex_ids: Vec<VInt>) -> IndexScan {
        IndexScan {
            inner: vertex_ids.into_iter(),
        }
    }

    pub(crate) fn empty() -> IndexScan {
        IndexScan::new(Vec::new())
    }
}

impl Iterator for IndexScan {
    type Item = VInt;

    fn next(&mut self) -> Option<VInt> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for IndexScan {}
