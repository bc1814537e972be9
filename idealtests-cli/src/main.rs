//! `idealtests` command line front-end.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use idealtests::{
    Config,
    dataset::{load_records, write_records},
    rank_records, select_ideal_tests,
};

mod cli;
mod report;

use cli::{Cli, Command};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over -v.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli::log_level(cli.verbose)));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    match &cli.command {
        Command::Rank(args) => {
            args.apply(&mut config);
            info!(ranking = ?config.ranking, "ranking");
            let records = load_records(&args.input)?;
            let ranked = rank_records(&records, &config.ranking)?;
            print!("{}", report::ranking(&ranked, &config.ranking.key, config.ranking.order));
            if let Some(output) = &args.output {
                write_records(output, &ranked)
                    .with_context(|| format!("writing ranked records to {}", output.display()))?;
            }
        }
        Command::Select(args) => {
            args.apply(&mut config);
            info!(selection = ?config.selection, "selecting");
            let records = load_records(&args.input)?;
            let outcome = select_ideal_tests(&records, &config.selection)?;
            print!("{}", report::selection(&outcome));
        }
    }
    Ok(())
}
