use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::ops::{Deref, DerefMut};

use itertools::Itertools;
use log::{debug, info, warn};

use crate::error::{PartitionError, Precondition, Result};
use crate::graph::GraphStore;
use crate::types::{CommID, EdgeLabel, PartitionLabels, VInt, VertexAttr};

/// The two-level community partition of a store.
///
/// Every vertex carries a fine label (`nodeCommunity`) and a coarse label
/// (`community`). Merges move a whole node community into a community at once,
/// and a compaction collapses both levels back into a dense `0..k` range.
///
/// Built over `&GraphStore` the view only answers queries; over
/// `&mut GraphStore` it can also relabel.
pub struct CommunityPartition<S> {
    store: S,
}

impl<S: Deref<Target = GraphStore>> CommunityPartition<S> {
    pub(crate) fn new(store: S) -> Self {
        CommunityPartition { store }
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    /// Community shared by the holders of `node_community`.
    ///
    /// Holders are expected to agree, which holds as long as node communities
    /// only ever move as a whole. With strict checks a disagreement is an
    /// `InvariantViolation`; otherwise the lowest-id holder wins.
    pub fn get_community(&self, node_community: CommID) -> Result<CommID> {
        self.store.ensure_partition_initialized()?;
        let holders = self.store.node_community_index().holders(node_community)?;
        let communities = holders
            .iter()
            .filter_map(|v| self.store.vertex(*v).and_then(|u| u.community()))
            .unique()
            .collect::<Vec<_>>();
        let first = match communities.first() {
            None => return Err(PartitionError::not_found(VertexAttr::NodeCommunity, node_community)),
            Some(comm_id) => *comm_id,
        };
        if communities.len() == 1 {
            return Ok(first);
        }
        if self.store.config().strict_partition_checks {
            return Err(PartitionError::InvariantViolation {
                node_community,
                communities,
            });
        }
        warn!(
            "node community {} spans communities {:?}, answering {}",
            node_community, communities, first
        );
        Ok(first)
    }

    /// Community of the vertex with the given id.
    pub fn get_community_from_node(&self, vertex_id: VInt) -> Result<CommID> {
        self.store.ensure_partition_initialized()?;
        // The id index is unique, so an absent vertex is the only failure.
        self.store
            .vertex(vertex_id)
            .and_then(|u| u.community())
            .ok_or_else(|| PartitionError::not_found(VertexAttr::Id, vertex_id))
    }

    /// Number of distinct node communities inside a community.
    pub fn get_community_size(&self, comm_id: CommID) -> Result<usize> {
        self.store.ensure_partition_initialized()?;
        let size = match self.store.community_index().get(comm_id) {
            None => 0,
            Some(holders) => holders
                .iter()
                .filter_map(|v| self.store.vertex(*v).and_then(|u| u.node_community()))
                .collect::<HashSet<_>>()
                .len(),
        };
        Ok(size)
    }

    pub fn get_nodes_from_community(&self, comm_id: CommID) -> Result<BTreeSet<VInt>> {
        self.store.ensure_partition_initialized()?;
        Ok(self.store.community_index().get(comm_id).cloned().unwrap_or_default())
    }

    pub fn get_nodes_from_node_community(&self, node_community: CommID) -> Result<BTreeSet<VInt>> {
        self.store.ensure_partition_initialized()?;
        Ok(self
            .store
            .node_community_index()
            .get(node_community)
            .cloned()
            .unwrap_or_default())
    }

    /// Members of every community in `0..count`.
    /// The populated community ids must be exactly that range, so this is
    /// normally called with the count returned by the last compaction.
    pub fn map_communities(&self, count: usize) -> Result<BTreeMap<CommID, Vec<VInt>>> {
        self.store.ensure_partition_initialized()?;
        let index = self.store.community_index();
        let populated = index.value_count();
        if populated != count || index.values().any(|comm_id| comm_id as usize >= count) {
            return Err(Precondition::CommunityCountMismatch {
                requested: count,
                actual: populated,
            }
            .into());
        }
        Ok((0..count as CommID)
            .map(|comm_id| {
                let members = index
                    .get(comm_id)
                    .map(|holders| holders.iter().copied().collect())
                    .unwrap_or_default();
                (comm_id, members)
            })
            .collect())
    }

    /// Communities one `similar` out-edge away from any holder of `node_community`.
    pub fn get_communities_connected_to_node_community(
        &self,
        node_community: CommID,
    ) -> Result<BTreeSet<CommID>> {
        self.store.ensure_partition_initialized()?;
        let mut communities = BTreeSet::new();
        if let Some(holders) = self.store.node_community_index().get(node_community) {
            for u in holders.iter().filter_map(|v| self.store.vertex(*v)) {
                communities.extend(
                    u.successors(&EdgeLabel::Similar)
                        .filter_map(|v| self.store.vertex(v).and_then(|nv| nv.community())),
                );
            }
        }
        Ok(communities)
    }

    /// Number of distinct populated communities.
    pub fn community_count(&self) -> Result<usize> {
        self.store.ensure_partition_initialized()?;
        Ok(self.store.community_index().value_count())
    }

    /// Number of distinct populated node communities.
    pub fn node_community_count(&self) -> Result<usize> {
        self.store.ensure_partition_initialized()?;
        Ok(self.store.node_community_index().value_count())
    }
}

impl<S: DerefMut<Target = GraphStore>> CommunityPartition<S> {
    /// Give the i-th vertex (in id order) `nodeCommunity = community = i`.
    /// Runs once per store.
    pub fn init_community_property(&mut self) -> Result<()> {
        if self.store.is_partition_initialized() {
            return Err(Precondition::AlreadyInitialized.into());
        }
        let vertex_ids = self.store.vertex_ids();
        for (comm_counter, vertex_id) in vertex_ids.iter().enumerate() {
            self.store
                .set_labels(*vertex_id, PartitionLabels::identity(comm_counter as CommID));
        }
        self.store.mark_partition_initialized();
        info!("Community partition initialized over {} vertices", vertex_ids.len());
        Ok(())
    }

    /// Move every holder of `node_community` into `to_community`.
    /// An unpopulated node community is a no-op.
    pub fn move_node(&mut self, node_community: CommID, to_community: CommID) -> Result<()> {
        self.store.ensure_partition_initialized()?;
        let holders = self.store.index_lookup(VertexAttr::NodeCommunity, node_community);
        let moved = holders.len();
        for vertex_id in holders {
            self.store.set_community(vertex_id, to_community);
        }
        debug!(
            "Moved node community {} ({} vertices) to community {}",
            node_community, moved, to_community
        );
        Ok(())
    }

    /// Renumber communities densely into `0..k` in first-encounter order of an
    /// id-ordered scan, then set each vertex's node community to its new
    /// community. Returns `k`.
    pub fn reinitialize_communities(&mut self) -> Result<usize> {
        self.store.ensure_partition_initialized()?;
        let mut renumbered = HashMap::<CommID, CommID>::new();
        for vertex_id in self.store.vertex_ids() {
            let old_comm_id = match self.store.vertex(vertex_id).and_then(|u| u.community()) {
                None => continue,
                Some(comm_id) => comm_id,
            };
            let next_comm_id = renumbered.len() as CommID;
            let new_comm_id = *renumbered.entry(old_comm_id).or_insert(next_comm_id);
            self.store.set_labels(vertex_id, PartitionLabels::identity(new_comm_id));
        }
        info!("Communities compacted into {} dense ids", renumbered.len());
        Ok(renumbered.len())
    }
}

#[cfg(test)]
mod test_community {
    use std::collections::{BTreeMap, BTreeSet, HashSet};

    use itertools::Itertools;
    use rand::Rng;

    use crate::config::StoreConfig;
    use crate::error::{PartitionError, Precondition};
    use crate::graph::GraphStore;
    use crate::types::{CommID, EdgeLabel, VInt, VertexAttr};

    /// 0 -> 1, 0 -> 2, 1 -> 2, 2 -> 0, 3 -> 2, 4 -> 3.
    fn generate_example() -> GraphStore {
        let mut store = GraphStore::from_edges(vec![(0, 1), (0, 2), (1, 2), (2, 0), (3, 2), (4, 3)]);
        store.partition().init_community_property().unwrap();
        store
    }

    fn random_store(vertex_count: u32, edge_count: usize) -> GraphStore {
        let mut rng = rand::thread_rng();
        let edges = (0..edge_count)
            .map(|_| (rng.gen_range(0..vertex_count), rng.gen_range(0..vertex_count)))
            .collect::<Vec<_>>();
        GraphStore::from_edges(edges)
    }

    fn membership(store: &GraphStore) -> BTreeSet<BTreeSet<VInt>> {
        store
            .vertices()
            .map(|u| (u.community().unwrap(), u.vertex_id))
            .into_group_map()
            .into_values()
            .map(|members| members.into_iter().collect())
            .collect()
    }

    #[test]
    fn test_init_bijection() {
        let mut store = random_store(200, 600);
        store.partition().init_community_property().unwrap();
        let n = store.vertex_count() as CommID;
        let communities = store.vertices().map(|u| u.community().unwrap()).sorted().collect::<Vec<_>>();
        let node_communities = store.vertices().map(|u| u.node_community().unwrap()).sorted().collect::<Vec<_>>();
        assert_eq!(communities, (0..n).collect::<Vec<_>>());
        assert_eq!(node_communities, (0..n).collect::<Vec<_>>());
        for u in store.vertices() {
            assert_eq!(u.community(), u.node_community());
        }
    }

    #[test]
    fn test_init_twice() {
        let mut store = generate_example();
        assert_eq!(
            store.partition().init_community_property(),
            Err(PartitionError::from(Precondition::AlreadyInitialized))
        );
    }

    #[test]
    fn test_ops_before_init() {
        let mut store = GraphStore::from_edges(vec![(0, 1)]);
        let not_initialized = PartitionError::from(Precondition::NotInitialized);
        assert_eq!(store.partition().move_node(0, 1), Err(not_initialized.clone()));
        assert_eq!(store.partition().reinitialize_communities(), Err(not_initialized.clone()));
        assert_eq!(store.communities().get_community(0), Err(not_initialized.clone()));
        assert_eq!(store.communities().get_community_from_node(0), Err(not_initialized.clone()));
        assert_eq!(store.communities().map_communities(2), Err(not_initialized.clone()));
        assert_eq!(store.communities().get_community_size(0), Err(not_initialized));
    }

    #[test]
    fn test_init_empty_graph() {
        let mut store = GraphStore::new();
        store.partition().init_community_property().unwrap();
        assert_eq!(store.partition().reinitialize_communities().unwrap(), 0);
        assert!(store.communities().map_communities(0).unwrap().is_empty());
    }

    #[test]
    fn test_move_node() {
        let mut store = generate_example();
        store.partition().move_node(1, 0).unwrap();
        let communities = store.communities();
        assert_eq!(communities.get_community(1).unwrap(), 0);
        assert_eq!(communities.get_community_from_node(1).unwrap(), 0);
        // The fine label is untouched.
        assert_eq!(store.vertex(1).unwrap().node_community(), Some(1));
        assert_eq!(communities.get_nodes_from_community(0).unwrap(), BTreeSet::from([0, 1]));
        assert_eq!(communities.get_community_size(0).unwrap(), 2);
        assert!(communities.get_nodes_from_community(1).unwrap().is_empty());
        assert!(!store.exists(VertexAttr::Community, 1));
    }

    #[test]
    fn test_move_node_idempotent() {
        let mut once = generate_example();
        once.partition().move_node(2, 3).unwrap();
        let mut twice = generate_example();
        twice.partition().move_node(2, 3).unwrap();
        twice.partition().move_node(2, 3).unwrap();
        let labels = |store: &GraphStore| store.vertices().map(|u| u.labels()).collect::<Vec<_>>();
        assert_eq!(labels(&once), labels(&twice));
    }

    #[test]
    fn test_move_missing_node_community() {
        let mut store = generate_example();
        let before = store.vertices().map(|u| u.labels()).collect::<Vec<_>>();
        store.partition().move_node(42, 0).unwrap();
        let after = store.vertices().map(|u| u.labels()).collect::<Vec<_>>();
        assert_eq!(before, after);
    }

    #[test]
    fn test_move_merged_node_community() {
        let mut store = generate_example();
        store.partition().move_node(1, 0).unwrap();
        store.partition().move_node(2, 0).unwrap();
        assert_eq!(store.partition().reinitialize_communities().unwrap(), 3);
        assert_eq!(
            store.communities().get_nodes_from_node_community(0).unwrap(),
            BTreeSet::from([0, 1, 2])
        );

        // Node community 0 now has three holders, they travel together.
        store.partition().move_node(0, 1).unwrap();
        assert!(store.config().strict_partition_checks);
        let communities = store.communities();
        for v in [0, 1, 2] {
            assert_eq!(communities.get_community_from_node(v).unwrap(), 1);
            assert_eq!(store.vertex(v).unwrap().node_community(), Some(0));
        }
        assert_eq!(communities.get_community(0), Ok(1));
        assert_eq!(communities.get_nodes_from_community(1).unwrap(), BTreeSet::from([0, 1, 2, 3]));
        // {0, 1, 2} counts once, plus node community 1 held by vertex 3.
        assert_eq!(communities.get_community_size(1).unwrap(), 2);
        assert!(!store.exists(VertexAttr::Community, 0));
    }

    #[test]
    fn test_reinitialize() {
        let mut store = generate_example();
        store.partition().move_node(1, 0).unwrap();
        store.partition().move_node(2, 0).unwrap();
        store.partition().move_node(4, 3).unwrap();
        let before = membership(&store);
        let k = store.partition().reinitialize_communities().unwrap();
        assert_eq!(k, 2);
        assert_eq!(membership(&store), before);
        // First encounter in id order: vertex 0 opens community 0, vertex 3 opens community 1.
        let communities = store.communities();
        assert_eq!(communities.get_nodes_from_community(0).unwrap(), BTreeSet::from([0, 1, 2]));
        assert_eq!(communities.get_nodes_from_community(1).unwrap(), BTreeSet::from([3, 4]));
        assert_eq!(communities.get_nodes_from_node_community(1).unwrap(), BTreeSet::from([3, 4]));
        assert_eq!(communities.get_community_size(0).unwrap(), 1);
        assert_eq!(communities.node_community_count().unwrap(), 2);
        for u in store.vertices() {
            assert_eq!(u.community(), u.node_community());
        }
    }

    #[test]
    fn test_reinitialize_random() {
        let mut rng = rand::thread_rng();
        let mut store = random_store(300, 900);
        store.partition().init_community_property().unwrap();
        let n = store.vertex_count() as CommID;
        for _ in 0..200 {
            let from = rng.gen_range(0..n);
            let to = rng.gen_range(0..n);
            store.partition().move_node(from, to).unwrap();
        }
        let before = membership(&store);
        let distinct = store.communities().community_count().unwrap();
        let k = store.partition().reinitialize_communities().unwrap();
        println!("Compacted {} vertices into {} communities", n, k);
        assert_eq!(k, distinct);
        assert_eq!(membership(&store), before);
        let ids = store.vertices().map(|u| u.community().unwrap()).unique().sorted().collect::<Vec<_>>();
        assert_eq!(ids, (0..k as CommID).collect::<Vec<_>>());
    }

    #[test]
    fn test_get_community_not_found() {
        let store = generate_example();
        assert_eq!(
            store.communities().get_community(99),
            Err(PartitionError::NotFound { attr: VertexAttr::NodeCommunity, value: 99 })
        );
        assert_eq!(
            store.communities().get_community_from_node(99),
            Err(PartitionError::NotFound { attr: VertexAttr::Id, value: 99 })
        );
    }

    /// Put vertices 0 and 1 in one node community, then move only vertex 1.
    fn split_node_community(store: &mut GraphStore) {
        store.partition().move_node(1, 0).unwrap();
        store.partition().reinitialize_communities().unwrap();
        assert_eq!(store.communities().get_nodes_from_node_community(0).unwrap(), BTreeSet::from([0, 1]));
        store.set_community(1, 3);
    }

    #[test]
    fn test_partial_move_detected() {
        let mut store = generate_example();
        split_node_community(&mut store);
        assert_eq!(
            store.communities().get_community(0),
            Err(PartitionError::InvariantViolation { node_community: 0, communities: vec![0, 3] })
        );
    }

    #[test]
    fn test_partial_move_lenient() {
        let config = StoreConfig { strict_partition_checks: false, ..StoreConfig::default() };
        let mut store = GraphStore::with_config(config);
        for (u, v) in [(0, 1), (0, 2), (1, 2), (2, 0), (3, 2), (4, 3)] {
            store.insert_edge(u, v, EdgeLabel::Similar).unwrap();
        }
        store.partition().init_community_property().unwrap();
        split_node_community(&mut store);
        // The lowest-id holder answers.
        assert_eq!(store.communities().get_community(0).unwrap(), 0);
    }

    #[test]
    fn test_map_communities() {
        let mut store = generate_example();
        store.partition().move_node(1, 0).unwrap();
        store.partition().move_node(4, 3).unwrap();
        // Ids are sparse until compaction.
        assert_eq!(
            store.communities().map_communities(3),
            Err(PartitionError::from(Precondition::CommunityCountMismatch { requested: 3, actual: 3 }))
        );
        let k = store.partition().reinitialize_communities().unwrap();
        assert_eq!(k, 3);
        let mapped = store.communities().map_communities(k).unwrap();
        let expected = BTreeMap::from([(0, vec![0, 1]), (1, vec![2]), (2, vec![3, 4])]);
        assert_eq!(mapped, expected);
        assert_eq!(
            store.communities().map_communities(4),
            Err(PartitionError::from(Precondition::CommunityCountMismatch { requested: 4, actual: 3 }))
        );
    }

    #[test]
    fn test_map_communities_covers_all() {
        let mut rng = rand::thread_rng();
        let mut store = random_store(150, 400);
        store.partition().init_community_property().unwrap();
        let n = store.vertex_count() as CommID;
        for _ in 0..100 {
            store.partition().move_node(rng.gen_range(0..n), rng.gen_range(0..n)).unwrap();
        }
        let k = store.partition().reinitialize_communities().unwrap();
        let mapped = store.communities().map_communities(k).unwrap();
        let all = mapped.values().flatten().copied().collect::<Vec<_>>();
        let distinct = all.iter().copied().collect::<HashSet<_>>();
        assert_eq!(all.len(), store.vertex_count());
        assert_eq!(distinct.len(), store.vertex_count());
        assert!(mapped.values().all(|members| !members.is_empty()));
    }

    #[test]
    fn test_connected_communities() {
        let mut store = generate_example();
        store.partition().move_node(2, 1).unwrap();
        let communities = store.communities();
        // Vertex 0 points at 1 and 2, both in community 1 now.
        assert_eq!(communities.get_communities_connected_to_node_community(0).unwrap(), BTreeSet::from([1]));
        // Vertex 4 points at 3.
        assert_eq!(communities.get_communities_connected_to_node_community(4).unwrap(), BTreeSet::from([3]));
        assert!(communities.get_communities_connected_to_node_community(42).unwrap().is_empty());
    }

    #[test]
    fn test_config_is_respected() {
        let config = StoreConfig { strict_partition_checks: false, ..StoreConfig::default() };
        let store = GraphStore::with_config(config);
        assert!(!store.config().strict_partition_checks);
    }
}
