use std::time::Instant;

use thiserror::Error;
use tracing::info;

use crate::{
    config::{RankingConfig, SelectionConfig},
    evaluator::{Evaluator, EvaluatorError, FitnessFn},
    genetic::{PopulationDecisions, PopulationFitness},
    metrics::MetricRecord,
    operators::{
        FitnessTournament, SelectionOperator,
        selection::{SelectionError, TournamentOutcome},
        sorting::{RankingError, rank},
    },
    random::{RandomGenerator, SeededRandomGenerator},
};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("error during ranking: {0}")]
    Ranking(#[from] RankingError),
    #[error("error during evaluation: {0}")]
    Evaluator(#[from] EvaluatorError),
    #[error("error during selection: {0}")]
    Selection(#[from] SelectionError),
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

fn validate_key(key: &str) -> Result<(), PipelineError> {
    if key.trim().is_empty() {
        return Err(PipelineError::InvalidParameter(
            "ranking key must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Ranks records with a generator seeded from `config.seed`.
pub fn rank_records(
    records: &[MetricRecord],
    config: &RankingConfig,
) -> Result<Vec<MetricRecord>, PipelineError> {
    let mut rng = SeededRandomGenerator::from_seed(config.seed);
    rank_records_with(records, config, &mut rng)
}

pub fn rank_records_with(
    records: &[MetricRecord],
    config: &RankingConfig,
    rng: &mut dyn RandomGenerator,
) -> Result<Vec<MetricRecord>, PipelineError> {
    validate_key(&config.key)?;
    let start = Instant::now();
    let ranked = rank(records, &config.key, config.strategy, config.order, rng)?;
    info!(
        key = %config.key,
        strategy = %config.strategy,
        records = ranked.len(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "ranked records"
    );
    Ok(ranked)
}

/// Adapter plus tournament: records in, ideal tests out.
pub struct SelectionPipeline<Sel, F>
where
    Sel: SelectionOperator,
    F: Fn(&PopulationDecisions) -> PopulationFitness,
{
    evaluator: Evaluator<F>,
    selector: Sel,
}

impl SelectionPipeline<FitnessTournament, FitnessFn> {
    pub fn from_config(config: &SelectionConfig) -> Self {
        let evaluator = Evaluator::new(
            config.fitness.fitness_fn(),
            config.zero_duration,
            config.non_passed,
        );
        let selector =
            FitnessTournament::new_with_rule(config.accumulation).with_parallel(config.parallel);
        Self::new(evaluator, selector)
    }
}

impl<Sel, F> SelectionPipeline<Sel, F>
where
    Sel: SelectionOperator,
    F: Fn(&PopulationDecisions) -> PopulationFitness,
{
    pub fn new(evaluator: Evaluator<F>, selector: Sel) -> Self {
        Self {
            evaluator,
            selector,
        }
    }

    pub fn run(&self, records: &[MetricRecord]) -> Result<TournamentOutcome, PipelineError> {
        let start = Instant::now();
        let population = self.evaluator.evaluate(records)?;
        let outcome = self.selector.operate(&population)?;
        info!(
            selector = %self.selector.name(),
            population_size = population.len(),
            comparisons = outcome.n_comparisons(),
            ideal = outcome.ideal().len(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "selected ideal tests"
        );
        Ok(outcome)
    }
}

/// Shorthand for `SelectionPipeline::from_config(config).run(records)`.
pub fn select_ideal_tests(
    records: &[MetricRecord],
    config: &SelectionConfig,
) -> Result<TournamentOutcome, PipelineError> {
    SelectionPipeline::from_config(config).run(records)
}
