//! An indexed graph store with two-level community partition management,
//! providing the storage and bookkeeping primitives a Louvain-style
//! modularity driver calls on every pass.
//!
//! ```
//! use community_store::GraphStore;
//!
//! let mut store = GraphStore::from_edges(vec![(0, 1), (0, 2), (1, 2), (2, 0)]);
//! store.partition().init_community_property().unwrap();
//! store.partition().move_node(1, 0).unwrap();
//! assert_eq!(store.partition_query().community_weight(0).unwrap(), 3.0);
//! let k = store.partition().reinitialize_communities().unwrap();
//! assert_eq!(k, 2);
//! ```

pub mod community;
pub mod config;
pub mod degree;
pub mod error;
pub mod graph;
mod index;
pub mod logger;
pub mod partition_query;
pub mod types;

pub use community::CommunityPartition;
pub use config::{LogConfig, StoreConfig};
pub use degree::DegreeCalculator;
pub use error::{PartitionError, Precondition, Result};
pub use graph::GraphStore;
pub use index::IndexScan;
pub use logger::init_logger;
pub use partition_query::PartitionQuery;
pub use types::{CommID, EdgeLabel, Neighbor, PartitionLabels, VInt, VertexAttr, VertexRecord};
