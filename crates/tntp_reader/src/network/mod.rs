pub mod assembler;
pub mod transport_network;

pub use assembler::{AssembleOptions, build_network, join_flows};
pub use transport_network::{NetworkEdge, NetworkNode, TransportNetwork};
