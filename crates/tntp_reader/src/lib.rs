//! Readers for the TransportationNetworks (TNTP) file family and assembly of
//! the files into a directed multigraph plus an origin-destination demand
//! matrix.

pub mod attributes;
pub mod dataset;
pub mod demand_matrix;
pub mod edge_key;
pub mod error;
pub mod naming;
pub mod network;
pub mod readers;
pub mod table;
pub mod value;

#[cfg(test)]
pub(crate) mod test_utils;

pub use dataset::{DatasetOptions, LoadedDataset, TntpDataset};
pub use demand_matrix::DemandMatrix;
pub use edge_key::EdgeKey;
pub use error::TntpError;
pub use naming::ColumnNaming;
pub use network::{AssembleOptions, TransportNetwork, build_network, join_flows};
pub use readers::{
    demand_reader::{DemandReaderOptions, ReadMode, TextEncoding, parse_demand, read_demand_file},
    edge_reader::{EdgeReaderOptions, EdgeTable, read_net_file},
    flow_reader::{FlowReaderOptions, FlowTable, read_flow_file},
    node_reader::{NodeReaderOptions, NodeTable, read_node_file},
};
pub use value::{NodeId, Value};
