use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    demand_matrix::DemandMatrix,
    error::Result,
    naming::{FLOW_FILE_FROM_COL, FLOW_FILE_TO_COL},
    network::{AssembleOptions, TransportNetwork, build_network},
    readers::{
        demand_reader::{DemandReaderOptions, read_demand_file},
        edge_reader::{EdgeReaderOptions, read_net_file},
        flow_reader::{FlowReaderOptions, read_flow_file},
        node_reader::{NodeReaderOptions, read_node_file},
    },
};

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct DatasetOptions {
    pub nodes: NodeReaderOptions,
    pub edges: EdgeReaderOptions,
    pub flows: FlowReaderOptions,
    pub demand: DemandReaderOptions,
    pub assemble: AssembleOptions,
}

impl Default for DatasetOptions {
    /// Published flow files name their endpoint columns `From`/`To`
    /// instead of the net file's `init_node`/`term_node`.
    fn default() -> Self {
        DatasetOptions {
            nodes: NodeReaderOptions::default(),
            edges: EdgeReaderOptions::default(),
            flows: FlowReaderOptions {
                from_col: String::from(FLOW_FILE_FROM_COL),
                to_col: String::from(FLOW_FILE_TO_COL),
                ..FlowReaderOptions::default()
            },
            demand: DemandReaderOptions::default(),
            assemble: AssembleOptions::default(),
        }
    }
}

/// A network directory laid out like the TransportationNetworks repository:
/// `<root>/<Name>_node.tntp`, `<Name>_net.tntp`, `<Name>_flow.tntp` and
/// `<Name>_trips.tntp`.
#[derive(Debug, Clone)]
pub struct TntpDataset {
    root: PathBuf,
    name: String,
}

pub struct LoadedDataset {
    pub network: TransportNetwork,
    /// Aligned on the network node ids, `None` without a trips file.
    pub demand: Option<DemandMatrix>,
}

impl TntpDataset {
    pub fn new<P: AsRef<Path>>(root: P, name: &str) -> Self {
        TntpDataset {
            root: root.as_ref().to_path_buf(),
            name: name.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn file(&self, kind: &str) -> PathBuf {
        self.root.join(format!("{}_{}.tntp", self.name, kind))
    }

    pub fn node_path(&self) -> PathBuf {
        self.file("node")
    }

    pub fn net_path(&self) -> PathBuf {
        self.file("net")
    }

    pub fn flow_path(&self) -> PathBuf {
        self.file("flow")
    }

    pub fn trips_path(&self) -> PathBuf {
        self.file("trips")
    }

    /// Node and net files are required, flow and trips files are used when
    /// they exist.
    pub fn load(&self, options: &DatasetOptions) -> Result<LoadedDataset> {
        info!("Loading dataset {} from {:?}", self.name, self.root);

        let nodes = read_node_file(self.node_path(), &options.nodes)?;
        let edges = read_net_file(self.net_path(), &options.edges)?;

        let flow_path = self.flow_path();
        let flows = if flow_path.is_file() {
            Some(read_flow_file(&flow_path, &options.flows)?)
        } else {
            warn!("No flow file at {:?}", flow_path);
            None
        };

        let network = build_network(&nodes, edges, flows, &options.assemble)?;

        let trips_path = self.trips_path();
        let demand = if trips_path.is_file() {
            let node_ids = network.node_ids();
            let demand = read_demand_file(&trips_path, &options.demand)?;
            Some(demand.reindex(&node_ids, &node_ids))
        } else {
            warn!("No trips file at {:?}", trips_path);
            None
        };

        Ok(LoadedDataset { network, demand })
    }
}
