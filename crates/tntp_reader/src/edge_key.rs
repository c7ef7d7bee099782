use std::fmt;

use crate::value::NodeId;

/// Composite key of a directed edge: endpoints plus the parallel index that
/// tells apart edges sharing the same ordered endpoints.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey {
    pub from: NodeId,
    pub to: NodeId,
    pub key: u32,
}

impl EdgeKey {
    pub fn new(from: impl Into<NodeId>, to: impl Into<NodeId>, key: u32) -> Self {
        EdgeKey {
            from: from.into(),
            to: to.into(),
            key,
        }
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.from, self.to, self.key)
    }
}
