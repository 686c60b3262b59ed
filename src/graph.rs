use std::collections::{BTreeMap, BTreeSet};

use crate::community::CommunityPartition;
use crate::config::StoreConfig;
use crate::degree::DegreeCalculator;
use crate::error::{PartitionError, Precondition, Result};
use crate::index::{AttrIndex, IndexScan};
use crate::partition_query::PartitionQuery;
use crate::types::{CommID, EdgeLabel, Neighbor, PartitionLabels, VInt, VertexAttr, VertexRecord};

/// The indexed graph store.
///
/// Vertices are kept in id order together with their adjacency lists, and the
/// two partition labels (`community`, `nodeCommunity`) are mirrored by exact-match
/// indexes that every label write keeps in sync. The `nodeId` index is the
/// vertex map itself.
///
/// Components are views over a store: [`DegreeCalculator`] and
/// [`PartitionQuery`] borrow it shared, [`CommunityPartition`] borrows it
/// shared for reads and exclusively for relabeling.
#[derive(Debug, Clone)]
pub struct GraphStore {
    vertices: BTreeMap<VInt, VertexRecord>,
    community_index: AttrIndex,
    node_community_index: AttrIndex,
    e_size: usize,
    partition_initialized: bool,
    config: StoreConfig,
}

impl Default for GraphStore {
    fn default() -> Self {
        GraphStore::new()
    }
}

impl GraphStore {
    pub fn new() -> GraphStore {
        GraphStore::with_config(StoreConfig::default())
    }

    pub fn with_config(config: StoreConfig) -> GraphStore {
        GraphStore {
            vertices: BTreeMap::new(),
            community_index: AttrIndex::create(VertexAttr::Community),
            node_community_index: AttrIndex::create(VertexAttr::NodeCommunity),
            e_size: 0,
            partition_initialized: false,
            config,
        }
    }

    /// Build a store from a list of `similar` edges. Endpoints are created on demand.
    pub fn from_edges(edges_iter: impl IntoIterator<Item = (VInt, VInt)>) -> GraphStore {
        let mut store = GraphStore::new();
        for (u, v) in edges_iter {
            store.put_vertex(u);
            store.put_vertex(v);
            store.put_edge(u, v, EdgeLabel::Similar);
        }
        store
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Insert a vertex, returns whether it is new.
    /// New vertices are rejected once the partition is initialized, since they
    /// would carry no partition labels.
    pub fn insert_vertex(&mut self, vertex_id: VInt) -> Result<bool> {
        self.check_insertable(vertex_id)?;
        Ok(self.put_vertex(vertex_id))
    }

    /// Insert a directed edge, creating missing endpoints. Returns whether the
    /// edge is new; an identical `(src, dst, label)` edge is stored once.
    pub fn insert_edge(&mut self, src_id: VInt, dst_id: VInt, label: EdgeLabel) -> Result<bool> {
        // Validate both endpoints before touching anything.
        self.check_insertable(src_id)?;
        self.check_insertable(dst_id)?;
        self.put_vertex(src_id);
        self.put_vertex(dst_id);
        Ok(self.put_edge(src_id, dst_id, label))
    }

    fn check_insertable(&self, vertex_id: VInt) -> Result<()> {
        if self.partition_initialized && !self.vertices.contains_key(&vertex_id) {
            return Err(PartitionError::from(Precondition::AlreadyInitialized));
        }
        Ok(())
    }

    fn put_vertex(&mut self, vertex_id: VInt) -> bool {
        if self.vertices.contains_key(&vertex_id) {
            return false;
        }
        self.vertices.insert(vertex_id, VertexRecord::new(vertex_id));
        true
    }

    // Both endpoints must exist.
    fn put_edge(&mut self, src_id: VInt, dst_id: VInt, label: EdgeLabel) -> bool {
        let successor = Neighbor::new_successor(dst_id, label.clone());
        match self.vertices.get_mut(&src_id) {
            Some(src) if !src.has_neighbor(&successor) => src.neighbors.push(successor),
            _ => return false,
        }
        if let Some(dst) = self.vertices.get_mut(&dst_id) {
            dst.neighbors.push(Neighbor::new_predecessor(src_id, label));
        }
        self.e_size += 1;
        true
    }

    pub fn vertex(&self, vertex_id: VInt) -> Option<&VertexRecord> {
        self.vertices.get(&vertex_id)
    }

    /// All vertices in id order.
    pub fn vertices(&self) -> impl Iterator<Item = &VertexRecord> {
        self.vertices.values()
    }

    /// Snapshot of all vertex ids in id order.
    pub fn vertex_ids(&self) -> Vec<VInt> {
        self.vertices.keys().copied().collect()
    }

    /// All vertices whose attribute equals `value`. An unmatched value yields
    /// an empty scan. The scan is a snapshot taken at call time.
    pub fn index_lookup(&self, attr: VertexAttr, value: u32) -> IndexScan {
        match attr {
            VertexAttr::Id => {
                if self.vertices.contains_key(&value) {
                    IndexScan::new(vec![value])
                } else {
                    IndexScan::empty()
                }
            }
            VertexAttr::Community => self.community_index.snapshot(value),
            VertexAttr::NodeCommunity => self.node_community_index.snapshot(value),
        }
    }

    pub fn exists(&self, attr: VertexAttr, value: u32) -> bool {
        match attr {
            VertexAttr::Id => self.vertices.contains_key(&value),
            VertexAttr::Community => self.community_index.contains_value(value),
            VertexAttr::NodeCommunity => self.node_community_index.contains_value(value),
        }
    }

    pub fn node_exists(&self, vertex_id: VInt) -> bool {
        self.exists(VertexAttr::Id, vertex_id)
    }

    /// Targets of the out-edges of `vertex_id` with the given label.
    /// Unknown vertices have no neighbors.
    pub fn out_neighbors(&self, vertex_id: VInt, label: &EdgeLabel) -> Vec<VInt> {
        self.vertices
            .get(&vertex_id)
            .map(|u| u.successors(label).collect())
            .unwrap_or_default()
    }

    /// Sources of the in-edges of `vertex_id` with the given label.
    pub fn in_neighbors(&self, vertex_id: VInt, label: &EdgeLabel) -> Vec<VInt> {
        self.vertices
            .get(&vertex_id)
            .map(|u| u.predecessors(label).collect())
            .unwrap_or_default()
    }

    /// Distinct ids one `similar` hop away from `vertex_id`.
    pub fn neighbor_ids(&self, vertex_id: VInt) -> Result<BTreeSet<VInt>> {
        // The id index holds at most one vertex, an absent one is the caller's failure.
        let u = self
            .vertices
            .get(&vertex_id)
            .ok_or_else(|| PartitionError::not_found(VertexAttr::Id, vertex_id))?;
        Ok(u.successors(&EdgeLabel::Similar).collect())
    }

    pub fn has_edge(&self, src_id: VInt, dst_id: VInt, label: &EdgeLabel) -> bool {
        self.vertices
            .get(&src_id)
            .map_or(false, |u| u.successors(label).any(|v| v == dst_id))
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of stored edges, all labels included.
    pub fn edge_count(&self) -> usize {
        self.e_size
    }

    pub fn is_partition_initialized(&self) -> bool {
        self.partition_initialized
    }

    pub(crate) fn ensure_partition_initialized(&self) -> Result<()> {
        if self.partition_initialized {
            Ok(())
        } else {
            Err(Precondition::NotInitialized.into())
        }
    }

    pub(crate) fn mark_partition_initialized(&mut self) {
        self.partition_initialized = true;
    }

    /// Overwrite both labels of a vertex, moving its index entries in the same step.
    pub(crate) fn set_labels(&mut self, vertex_id: VInt, labels: PartitionLabels) -> bool {
        let old_labels = match self.vertices.get_mut(&vertex_id) {
            None => return false,
            Some(u) => u.labels.replace(labels),
        };
        self.community_index.relabel(
            vertex_id,
            old_labels.map(|l| l.community),
            labels.community,
        );
        self.node_community_index.relabel(
            vertex_id,
            old_labels.map(|l| l.node_community),
            labels.node_community,
        );
        true
    }

    /// Overwrite the coarse label only. Vertices without labels are left alone.
    pub(crate) fn set_community(&mut self, vertex_id: VInt, comm_id: CommID) -> bool {
        let old_labels = match self.vertices.get(&vertex_id).and_then(|u| u.labels) {
            None => return false,
            Some(labels) => labels,
        };
        self.set_labels(
            vertex_id,
            PartitionLabels {
                node_community: old_labels.node_community,
                community: comm_id,
            },
        )
    }

    pub(crate) fn community_index(&self) -> &AttrIndex {
        &self.community_index
    }

    pub(crate) fn node_community_index(&self) -> &AttrIndex {
        &self.node_community_index
    }

    pub fn degrees(&self) -> DegreeCalculator<'_> {
        DegreeCalculator::new(self)
    }

    /// Read-only partition view.
    pub fn communities(&self) -> CommunityPartition<&GraphStore> {
        CommunityPartition::new(self)
    }

    /// Partition view that may relabel vertices.
    pub fn partition(&mut self) -> CommunityPartition<&mut GraphStore> {
        CommunityPartition::new(self)
    }

    pub fn partition_query(&self) -> PartitionQuery<'_> {
        PartitionQuery::new(self)
    }

    pub fn print_graph(&self) {
        println!("Graph Store: {} vertices, {} edges", self.vertex_count(), self.edge_count());
        for u in self.vertices.values() {
            println!("{}", u);
        }
    }
}
