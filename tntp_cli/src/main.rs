use clap::{Parser, Subcommand};

use crate::{demand::DemandArgs, inspect::InspectArgs};

mod demand;
mod inspect;
mod stopwatch;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a network directory and print a summary of the assembled graph
    #[command(visible_alias = "i")]
    Inspect {
        #[command(flatten)]
        args: InspectArgs,
    },
    /// Parse a single trips file and print the demand matrix summary
    #[command(visible_alias = "d")]
    Demand {
        #[command(flatten)]
        args: DemandArgs,
    },
}

fn main() -> Result<(), anyhow::Error> {
    dotenvy::from_filename("./.env.local").ok();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    match cli.command {
        Some(Commands::Inspect { args }) => inspect::run(args)?,
        Some(Commands::Demand { args }) => demand::run(args)?,
        None => {}
    }

    Ok(())
}
