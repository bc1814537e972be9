use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use idealtests::{
    Config,
    evaluator::{FitnessTransform, NonPassedPolicy, ZeroDurationPolicy},
    operators::{selection::AccumulationRule, sorting::{RankOrder, SortStrategy}},
};

#[derive(Parser, Debug)]
#[command(name = "idealtests", version, about = "Rank tests and select the ideal subset")]
pub struct Cli {
    /// JSON config file; flags given on the command line take precedence
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Order tests by a single metric
    Rank(RankArgs),
    /// Run the round-robin tournament and print the ideal tests
    Select(SelectArgs),
}

#[derive(Args, Debug)]
pub struct RankArgs {
    /// Metrics JSON file
    #[arg(short, long)]
    pub input: PathBuf,
    /// Field to rank by
    #[arg(short, long)]
    pub key: Option<String>,
    #[arg(long)]
    pub strategy: Option<SortStrategy>,
    /// Highest value first
    #[arg(long)]
    pub descending: bool,
    #[arg(long)]
    pub seed: Option<u64>,
    /// Write the ranked records to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct SelectArgs {
    /// Metrics JSON file
    #[arg(short, long)]
    pub input: PathBuf,
    #[arg(long)]
    pub rule: Option<AccumulationRule>,
    #[arg(long)]
    pub fitness: Option<FitnessTransform>,
    #[arg(long)]
    pub zero_duration: Option<ZeroDurationPolicy>,
    #[arg(long)]
    pub non_passed: Option<NonPassedPolicy>,
    #[arg(long)]
    pub parallel: bool,
}

impl RankArgs {
    pub fn apply(&self, config: &mut Config) {
        let ranking = &mut config.ranking;
        if let Some(key) = &self.key {
            ranking.key = key.clone();
        }
        if let Some(strategy) = self.strategy {
            ranking.strategy = strategy;
        }
        if self.descending {
            ranking.order = RankOrder::Descending;
        }
        if self.seed.is_some() {
            ranking.seed = self.seed;
        }
    }
}

impl SelectArgs {
    pub fn apply(&self, config: &mut Config) {
        let selection = &mut config.selection;
        if let Some(rule) = self.rule {
            selection.accumulation = rule;
        }
        if let Some(fitness) = self.fitness {
            selection.fitness = fitness;
        }
        if let Some(policy) = self.zero_duration {
            selection.zero_duration = policy;
        }
        if let Some(policy) = self.non_passed {
            selection.non_passed = policy;
        }
        if self.parallel {
            selection.parallel = true;
        }
    }
}

/// Maps `-v` occurrences to a default `EnvFilter` directive.
pub fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}
