use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use comfy_table::Table;
use tntp_reader::{ColumnNaming, DatasetOptions, LoadedDataset, TntpDataset};
use tracing::info;

use crate::stopwatch::Stopwatch;

pub const DATA_DIR_ENV: &str = "TNTP_DATA_DIR";

#[derive(Args)]
pub struct InspectArgs {
    /// Network name, used as the `<name>_*.tntp` file prefix
    #[arg(short, long)]
    name: String,

    /// Directory holding the network files (defaults to `$TNTP_DATA_DIR/<name>`)
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// JSON file with reader and assembly options
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Keep header names as written instead of lower-casing them
    #[arg(long)]
    raw_columns: bool,

    /// Coordinate reference tag attached to nodes, edges and the graph
    #[arg(long)]
    crs: Option<String>,
}

fn dataset_root(args: &InspectArgs) -> Result<PathBuf, anyhow::Error> {
    if let Some(root) = &args.root {
        return Ok(root.clone());
    }

    let data_dir = std::env::var(DATA_DIR_ENV)
        .with_context(|| format!("--root is required when {DATA_DIR_ENV} is not set"))?;

    Ok(PathBuf::from(data_dir).join(&args.name))
}

fn dataset_options(args: &InspectArgs) -> Result<DatasetOptions, anyhow::Error> {
    let mut options = match &args.config {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {path:?}"))?;
            serde_json::from_str::<DatasetOptions>(&contents)
                .with_context(|| format!("Invalid config {path:?}"))?
        }
        None => DatasetOptions::default(),
    };

    if args.raw_columns {
        options.nodes.naming = ColumnNaming::Raw;
        options.edges.naming = ColumnNaming::Raw;
        options.flows.naming = ColumnNaming::Raw;
    }

    if let Some(crs) = &args.crs {
        options.nodes.crs = Some(crs.clone());
        options.edges.crs = Some(crs.clone());
        options.assemble.crs = Some(crs.clone());
    }

    Ok(options)
}

pub fn run(args: InspectArgs) -> Result<(), anyhow::Error> {
    let root = dataset_root(&args)?;
    let options = dataset_options(&args)?;
    let dataset = TntpDataset::new(&root, &args.name);

    let stopwatch = Stopwatch::start("load");
    let loaded = dataset
        .load(&options)
        .with_context(|| format!("Failed to load {} from {root:?}", args.name))?;
    stopwatch.report();

    println!("{}", summary_table(dataset.name(), &loaded));

    Ok(())
}

fn summary_table(name: &str, loaded: &LoadedDataset) -> Table {
    let network = &loaded.network;

    let mut table = Table::new();
    table.set_header(vec!["Network", name]);
    table.add_row(vec![String::from("Nodes"), network.node_count().to_string()]);
    table.add_row(vec![String::from("Edges"), network.edge_count().to_string()]);
    table.add_row(vec![
        String::from("CRS"),
        network.crs().unwrap_or("-").to_string(),
    ]);

    if let Some(edge) = network.edges().next() {
        let attributes = edge
            .attributes
            .iter()
            .map(|(name, _)| name)
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![String::from("Edge attributes"), attributes]);
    }

    match &loaded.demand {
        Some(demand) => {
            let (origins, destinations) = demand.shape();
            table.add_row(vec![
                String::from("Demand shape"),
                format!("{origins} x {destinations}"),
            ]);
            table.add_row(vec![String::from("Total demand"), demand.total().to_string()]);
        }
        None => {
            info!("No demand loaded for {}", name);
        }
    }

    table
}
