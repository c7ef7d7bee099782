use fxhash::FxHashMap;
use geo_types::{LineString, Point};
use petgraph::{
    Direction,
    graph::{DiGraph, EdgeIndex, NodeIndex},
    visit::EdgeRef,
};

use crate::{attributes::AttributeMap, edge_key::EdgeKey, value::NodeId};

#[derive(Debug, Clone)]
pub struct NetworkNode {
    pub id: NodeId,
    /// `None` for nodes only known from the edge table.
    pub geometry: Option<Point<f64>>,
    pub attributes: AttributeMap,
}

impl NetworkNode {
    pub fn x(&self) -> Option<f64> {
        self.geometry.map(|point| point.x())
    }

    pub fn y(&self) -> Option<f64> {
        self.geometry.map(|point| point.y())
    }
}

#[derive(Debug, Clone)]
pub struct NetworkEdge {
    pub key: EdgeKey,
    pub geometry: Option<LineString<f64>>,
    pub attributes: AttributeMap,
}

/// Directed multigraph of a TNTP network. Parallel edges between the same
/// ordered pair of nodes are distinguished by [`EdgeKey::key`].
#[derive(Debug)]
pub struct TransportNetwork {
    graph: DiGraph<NetworkNode, NetworkEdge>,
    node_lookup: FxHashMap<NodeId, NodeIndex>,
    edge_lookup: FxHashMap<EdgeKey, EdgeIndex>,
    crs: Option<String>,
}

impl TransportNetwork {
    pub(crate) fn with_capacity(nodes: usize, edges: usize, crs: Option<String>) -> Self {
        TransportNetwork {
            graph: DiGraph::with_capacity(nodes, edges),
            node_lookup: FxHashMap::default(),
            edge_lookup: FxHashMap::default(),
            crs,
        }
    }

    /// Returns the index of the already existing node when `node.id` is
    /// known.
    pub(crate) fn add_node(&mut self, node: NetworkNode) -> NodeIndex {
        if let Some(index) = self.node_lookup.get(&node.id) {
            return *index;
        }

        let id = node.id.clone();
        let index = self.graph.add_node(node);
        self.node_lookup.insert(id, index);
        index
    }

    pub(crate) fn add_edge(&mut self, from: NodeIndex, to: NodeIndex, edge: NetworkEdge) -> EdgeIndex {
        let key = edge.key.clone();
        let index = self.graph.add_edge(from, to, edge);
        self.edge_lookup.insert(key, index);
        index
    }

    pub fn graph(&self) -> &DiGraph<NetworkNode, NetworkEdge> {
        &self.graph
    }

    pub fn crs(&self) -> Option<&str> {
        self.crs.as_deref()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Node ids in insertion order (node table order, then ids discovered
    /// from edges).
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.graph
            .node_weights()
            .map(|node| node.id.clone())
            .collect()
    }

    pub fn node_index(&self, id: &NodeId) -> Option<NodeIndex> {
        self.node_lookup.get(id).copied()
    }

    pub fn node(&self, id: &NodeId) -> Option<&NetworkNode> {
        self.node_index(id).map(|index| &self.graph[index])
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NetworkNode> {
        self.graph.node_weights()
    }

    pub fn edge(&self, key: &EdgeKey) -> Option<&NetworkEdge> {
        self.edge_lookup.get(key).map(|index| &self.graph[*index])
    }

    pub fn edges(&self) -> impl Iterator<Item = &NetworkEdge> {
        self.graph.edge_weights()
    }

    /// All parallel edges from `from` to `to`.
    pub fn edges_between(&self, from: &NodeId, to: &NodeId) -> Vec<&NetworkEdge> {
        let (Some(from), Some(to)) = (self.node_index(from), self.node_index(to)) else {
            return Vec::new();
        };

        self.graph
            .edges_connecting(from, to)
            .map(|edge| edge.weight())
            .collect()
    }

    pub fn out_degree(&self, id: &NodeId) -> usize {
        self.node_index(id)
            .map_or(0, |index| {
                self.graph.edges_directed(index, Direction::Outgoing).count()
            })
    }

    pub fn in_degree(&self, id: &NodeId) -> usize {
        self.node_index(id)
            .map_or(0, |index| {
                self.graph.edges_directed(index, Direction::Incoming).count()
            })
    }
}
