use std::fmt;
use std::fmt::{Display, Formatter};

/// Vertex ID, unique in this system.
pub type VInt = u32;

/// Community label, shared by the coarse and the fine partition level.
pub type CommID = u32;

/// Direction tag of a successor (out) neighbor.
pub(crate) const SUCCESSOR: u8 = 1;

/// Direction tag of a predecessor (in) neighbor.
pub(crate) const PREDECESSOR: u8 = 2;

/// Vertex attributes that carry an exact-match index.
#[derive(Debug, derive_more::Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexAttr {
    #[display(fmt = "nodeId")]
    Id,
    #[display(fmt = "community")]
    Community,
    #[display(fmt = "nodeCommunity")]
    NodeCommunity,
}

/// Relation type of an edge. Community bookkeeping only follows `Similar`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EdgeLabel {
    Similar,
    Other(String),
}

impl Display for EdgeLabel {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            EdgeLabel::Similar => write!(f, "similar"),
            EdgeLabel::Other(name) => write!(f, "{}", name),
        }
    }
}

impl From<&str> for EdgeLabel {
    fn from(name: &str) -> Self {
        match name {
            "similar" => EdgeLabel::Similar,
            other => EdgeLabel::Other(other.to_owned()),
        }
    }
}

/// One entry of an adjacency list.
/// The direction tag tells whether the edge leaves (1) or enters (2) the owner vertex.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Neighbor {
    pub vertex_id: VInt,
    pub direction_tag: u8,
    pub label: EdgeLabel,
}

impl Neighbor {
    pub fn new_successor(v_id: VInt, label: EdgeLabel) -> Self {
        Neighbor {
            vertex_id: v_id,
            direction_tag: SUCCESSOR,
            label,
        }
    }

    pub fn new_predecessor(v_id: VInt, label: EdgeLabel) -> Self {
        Neighbor {
            vertex_id: v_id,
            direction_tag: PREDECESSOR,
            label,
        }
    }

    pub fn is_successor(&self) -> bool {
        self.direction_tag == SUCCESSOR
    }

    pub fn is_predecessor(&self) -> bool {
        self.direction_tag == PREDECESSOR
    }
}

impl Display for Neighbor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let dir_display_tag = match self.direction_tag {
            SUCCESSOR => "+",
            PREDECESSOR => "-",
            _ => "?",
        };
        write!(f, "({})V{}[{}]", dir_display_tag, self.vertex_id, self.label)
    }
}

/// The two partition labels of a vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PartitionLabels {
    pub node_community: CommID,
    pub community: CommID,
}

impl PartitionLabels {
    /// Both levels start from the same label.
    pub fn identity(comm_id: CommID) -> Self {
        PartitionLabels {
            node_community: comm_id,
            community: comm_id,
        }
    }
}

/// A stored vertex: its id, its partition labels (absent until the partition
/// is initialized) and its adjacency list in both directions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexRecord {
    pub vertex_id: VInt,
    pub(crate) labels: Option<PartitionLabels>,
    pub(crate) neighbors: Vec<Neighbor>,
}

impl VertexRecord {
    pub fn new(v_id: VInt) -> Self {
        VertexRecord {
            vertex_id: v_id,
            labels: None,
            neighbors: Vec::new(),
        }
    }

    pub fn labels(&self) -> Option<PartitionLabels> {
        self.labels
    }

    pub fn community(&self) -> Option<CommID> {
        self.labels.map(|labels| labels.community)
    }

    pub fn node_community(&self) -> Option<CommID> {
        self.labels.map(|labels| labels.node_community)
    }

    /// Read an indexed attribute of this vertex.
    pub fn attr(&self, attr: VertexAttr) -> Option<u32> {
        match attr {
            VertexAttr::Id => Some(self.vertex_id),
            VertexAttr::Community => self.community(),
            VertexAttr::NodeCommunity => self.node_community(),
        }
    }

    pub fn neighbors(&self) -> &[Neighbor] {
        &self.neighbors
    }

    /// Successors reached through edges with the given label.
    pub fn successors<'a>(&'a self, label: &'a EdgeLabel) -> impl Iterator<Item = VInt> + 'a {
        self.neighbors
            .iter()
            .filter(move |n| n.is_successor() && n.label == *label)
            .map(|n| n.vertex_id)
    }

    /// Predecessors reached through edges with the given label.
    pub fn predecessors<'a>(&'a self, label: &'a EdgeLabel) -> impl Iterator<Item = VInt> + 'a {
        self.neighbors
            .iter()
            .filter(move |n| n.is_predecessor() && n.label == *label)
            .map(|n| n.vertex_id)
    }

    pub(crate) fn has_neighbor(&self, neighbor: &Neighbor) -> bool {
        self.neighbors.iter().any(|n| n == neighbor)
    }
}

impl Display for VertexRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.labels {
            None => write!(f, "V{} (unassigned) -> ", self.vertex_id)?,
            Some(labels) => write!(
                f,
                "V{} (nc: {}, c: {}) -> ",
                self.vertex_id, labels.node_community, labels.community
            )?,
        }
        for v in &self.neighbors {
            write!(f, "{} -> ", v)?;
        }
        write!(f, " End")
    }
}
