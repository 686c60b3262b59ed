use crate::degree::DegreeCalculator;
use crate::error::Result;
use crate::graph::GraphStore;
use crate::types::{CommID, EdgeLabel, VertexAttr};

/// Read-only weight queries a modularity driver issues between passes.
#[derive(Debug, Clone, Copy)]
pub struct PartitionQuery<'a> {
    store: &'a GraphStore,
    degrees: DegreeCalculator<'a>,
}

impl<'a> PartitionQuery<'a> {
    pub(crate) fn new(store: &'a GraphStore) -> Self {
        PartitionQuery {
            store,
            degrees: store.degrees(),
        }
    }

    /// Sum of out-degrees of the community's vertices.
    /// A community with a single vertex weighs 0, since self-loops are not
    /// accounted for.
    pub fn community_weight(&self, comm_id: CommID) -> Result<f64> {
        self.store.ensure_partition_initialized()?;
        if self.store.community_index().holder_count(comm_id) <= 1 {
            return Ok(0.0);
        }
        let holders = self.store.index_lookup(VertexAttr::Community, comm_id);
        Ok(self.degrees.out_degree_sum(holders))
    }

    /// Sum of out-degrees of the node community's vertices, singletons included.
    pub fn node_community_weight(&self, node_community: CommID) -> Result<f64> {
        self.store.ensure_partition_initialized()?;
        let holders = self.store.index_lookup(VertexAttr::NodeCommunity, node_community);
        Ok(self.degrees.out_degree_sum(holders))
    }

    /// Number of `similar` out-edges leaving `node_community` that land in `comm_id`.
    pub fn edges_inside_community(&self, node_community: CommID, comm_id: CommID) -> Result<f64> {
        self.store.ensure_partition_initialized()?;
        let mut edges = 0usize;
        for vertex_id in self.store.index_lookup(VertexAttr::NodeCommunity, node_community) {
            let u = match self.store.vertex(vertex_id) {
                None => continue,
                Some(u) => u,
            };
            edges += u
                .successors(&EdgeLabel::Similar)
                .filter(|v| {
                    self.store
                        .vertex(*v)
                        .map_or(false, |nv| nv.community() == Some(comm_id))
                })
                .count();
        }
        Ok(edges as f64)
    }

    pub fn degrees(&self) -> DegreeCalculator<'a> {
        self.degrees
    }
}
