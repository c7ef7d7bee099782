use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use comfy_table::Table;
use tntp_reader::{DemandMatrix, DemandReaderOptions, ReadMode, TextEncoding, read_demand_file};

use crate::stopwatch::Stopwatch;

#[derive(Args)]
pub struct DemandArgs {
    /// The trips file to parse
    #[arg(short, long)]
    file: PathBuf,

    /// Read raw bytes and decode them with --encoding
    #[arg(short, long)]
    binary: bool,

    /// utf8, utf8-lossy or latin1
    #[arg(short, long, default_value = "utf8")]
    encoding: TextEncoding,
}

pub fn run(args: DemandArgs) -> Result<(), anyhow::Error> {
    let options = DemandReaderOptions {
        mode: if args.binary {
            ReadMode::Binary
        } else {
            ReadMode::Text
        },
        encoding: args.encoding,
    };

    let stopwatch = Stopwatch::start("demand");
    let matrix = read_demand_file(&args.file, &options)
        .with_context(|| format!("Failed to read demand from {:?}", args.file))?;
    stopwatch.report();

    println!("{}", summary_table(&matrix));

    Ok(())
}

fn summary_table(matrix: &DemandMatrix) -> Table {
    let (origins, destinations) = matrix.shape();

    let mut table = Table::new();
    table.set_header(vec!["Key", "Value"]);
    table.add_row(vec![String::from("Origins"), origins.to_string()]);
    table.add_row(vec![String::from("Destinations"), destinations.to_string()]);
    table.add_row(vec![
        String::from("Non-empty cells"),
        matrix.entries().count().to_string(),
    ]);
    table.add_row(vec![String::from("Total"), matrix.total().to_string()]);

    for (key, value) in matrix.metadata() {
        table.add_row(vec![format!("<{key}>"), value.clone()]);
    }

    table
}
