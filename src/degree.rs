use crate::error::{PartitionError, Result};
use crate::graph::GraphStore;
use crate::types::{EdgeLabel, VInt, VertexAttr};

/// Degree and weight aggregation over a store.
/// Edges are unweighted, so a weight is an edge count.
#[derive(Debug, Clone, Copy)]
pub struct DegreeCalculator<'a> {
    store: &'a GraphStore,
}

impl<'a> DegreeCalculator<'a> {
    pub(crate) fn new(store: &'a GraphStore) -> Self {
        DegreeCalculator { store }
    }

    /// Number of distinct `similar` out-edges. Unknown vertices have degree 0.
    pub fn out_degree(&self, vertex_id: VInt) -> f64 {
        self.store
            .vertex(vertex_id)
            .map_or(0, |u| u.successors(&EdgeLabel::Similar).count()) as f64
    }

    /// Number of distinct `similar` in-edges. Unknown vertices have degree 0.
    pub fn in_degree(&self, vertex_id: VInt) -> f64 {
        self.store
            .vertex(vertex_id)
            .map_or(0, |u| u.predecessors(&EdgeLabel::Similar).count()) as f64
    }

    /// Out-degree of the vertex with the given id, which must exist.
    pub fn node_weight(&self, vertex_id: VInt) -> Result<f64> {
        // The id index is unique, so an absent vertex is the caller's failure.
        if !self.store.node_exists(vertex_id) {
            return Err(PartitionError::not_found(VertexAttr::Id, vertex_id));
        }
        Ok(self.out_degree(vertex_id))
    }

    /// Sum of out-degrees over a vertex subset, usually an index scan.
    pub fn out_degree_sum(&self, vertices: impl IntoIterator<Item = VInt>) -> f64 {
        vertices.into_iter().map(|v| self.out_degree(v)).sum()
    }

    /// Total edge count of the store, the global modularity denominator.
    pub fn graph_weight_sum(&self) -> f64 {
        self.store.edge_count() as f64
    }
}
