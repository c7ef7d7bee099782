use fxhash::FxHashSet;
use geo_types::LineString;
use petgraph::graph::NodeIndex;
use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    attributes::AttributeMap,
    edge_key::EdgeKey,
    error::{Result, TntpError},
    network::transport_network::{NetworkEdge, NetworkNode, TransportNetwork},
    readers::{edge_reader::EdgeTable, flow_reader::FlowTable, node_reader::NodeTable},
    value::{NodeId, Value},
};

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct AssembleOptions {
    /// Graph-level reference tag. Falls back to the node table's tag.
    pub crs: Option<String>,
    /// Reject flow tables whose key values do not occur at the same key
    /// level of the edge table. The join matches key levels by position, so
    /// a flow file read with from/to swapped would otherwise attach flows to
    /// the wrong edges.
    pub validate_flow_keys: bool,
}

impl Default for AssembleOptions {
    fn default() -> Self {
        AssembleOptions {
            crs: None,
            validate_flow_keys: true,
        }
    }
}

fn check_key_level<'a>(
    level: &str,
    edge_values: FxHashSet<&'a NodeId>,
    mut flow_values: impl Iterator<Item = &'a NodeId>,
) -> Result<()> {
    match flow_values.find(|value| !edge_values.contains(value)) {
        Some(value) => Err(TntpError::FlowKeyMismatch {
            level: level.to_string(),
            sample: value.to_string(),
        }),
        None => Ok(()),
    }
}

fn validate_flow_keys(edges: &EdgeTable, flows: &FlowTable) -> Result<()> {
    let names = edges.table().index_names();

    check_key_level(
        &names[0],
        edges.keys().iter().map(|key| &key.from).collect(),
        flows.index().iter().map(|key| &key.from),
    )?;
    check_key_level(
        &names[1],
        edges.keys().iter().map(|key| &key.to).collect(),
        flows.index().iter().map(|key| &key.to),
    )?;

    let edge_parallel_keys = edges.keys().iter().map(|key| key.key).collect::<FxHashSet<_>>();
    if let Some(key) = flows
        .index()
        .iter()
        .find(|key| !edge_parallel_keys.contains(&key.key))
    {
        return Err(TntpError::FlowKeyMismatch {
            level: names[2].clone(),
            sample: key.key.to_string(),
        });
    }

    Ok(())
}

/// Left-joins `flows` onto `edges` by composite key.
///
/// The flow index levels are renamed to the edge index levels first, levels
/// are matched by position. Every edge is kept; edges without a flow record
/// get missing values in the flow columns. Flow records matching no edge are
/// dropped with a warning.
pub fn join_flows(mut edges: EdgeTable, mut flows: FlowTable, options: &AssembleOptions) -> Result<EdgeTable> {
    flows.set_index_names(edges.table().index_names().to_vec());

    if let Some(column) = flows
        .columns()
        .iter()
        .find(|column| edges.table().columns().contains(column))
    {
        return Err(TntpError::ColumnOverlap {
            column: column.clone(),
        });
    }

    if options.validate_flow_keys {
        validate_flow_keys(&edges, &flows)?;
    }

    let orphans = flows
        .index()
        .iter()
        .filter(|key| !edges.table().contains_key(key))
        .count();
    if orphans > 0 {
        warn!("{} flow records match no edge and are ignored", orphans);
    }

    let width = flows.columns().len();
    edges
        .table_mut()
        .extend_columns(flows.columns(), |key: &EdgeKey| match flows.row(key) {
            Some(row) => row.to_vec(),
            None => vec![Value::Missing; width],
        });

    Ok(edges)
}

fn present_attributes<'a>(
    columns: &'a [String],
    row: &'a [Value],
) -> impl Iterator<Item = (&'a String, &'a Value)> {
    columns
        .iter()
        .zip(row.iter())
        .filter(|(_, value)| !value.is_missing())
}

fn endpoint_index(network: &mut TransportNetwork, id: &NodeId, unknown_nodes: &mut usize) -> NodeIndex {
    if let Some(index) = network.node_index(id) {
        return index;
    }

    *unknown_nodes += 1;
    network.add_node(NetworkNode {
        id: id.clone(),
        geometry: None,
        attributes: AttributeMap::new(),
    })
}

/// Builds the network multigraph: one node per node table row, one edge per
/// (joined) edge table row. Missing cells are left out of the attributes.
/// Edge geometries are straight segments between the endpoint coordinates.
pub fn build_network(
    nodes: &NodeTable,
    edges: EdgeTable,
    flows: Option<FlowTable>,
    options: &AssembleOptions,
) -> Result<TransportNetwork> {
    let edges = match flows {
        Some(flows) => join_flows(edges, flows, options)?,
        None => edges,
    };

    let crs = options
        .crs
        .clone()
        .or_else(|| nodes.crs().map(String::from));
    let mut network = TransportNetwork::with_capacity(nodes.len(), edges.len(), crs);

    let node_table = nodes.table();
    for ((id, row), point) in node_table.iter().zip(nodes.geometry()) {
        let mut attributes = AttributeMap::with_capacity(row.len() + 2);
        for (column, value) in present_attributes(node_table.columns(), row) {
            attributes.insert(column.as_str(), value.clone());
        }
        attributes.insert("x", Value::Float(point.x()));
        attributes.insert("y", Value::Float(point.y()));

        network.add_node(NetworkNode {
            id: id.clone(),
            geometry: Some(*point),
            attributes,
        });
    }

    let mut unknown_nodes = 0;
    let edge_table = edges.table();
    for (key, row) in edge_table.iter() {
        let from = endpoint_index(&mut network, &key.from, &mut unknown_nodes);
        let to = endpoint_index(&mut network, &key.to, &mut unknown_nodes);

        let geometry = match (network.graph()[from].geometry, network.graph()[to].geometry) {
            (Some(start), Some(end)) => Some(LineString::from(vec![start, end])),
            _ => None,
        };

        let mut attributes = AttributeMap::with_capacity(row.len());
        for (column, value) in present_attributes(edge_table.columns(), row) {
            attributes.insert(column.as_str(), value.clone());
        }

        network.add_edge(
            from,
            to,
            NetworkEdge {
                key: key.clone(),
                geometry,
                attributes,
            },
        );
    }

    if unknown_nodes > 0 {
        warn!(
            "{} nodes referenced by edges are missing from the node table",
            unknown_nodes
        );
    }

    info!(
        "Built network with {} nodes and {} edges",
        network.node_count(),
        network.edge_count()
    );

    Ok(network)
}
