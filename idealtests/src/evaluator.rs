use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::genetic::{
    COVERAGE_IDX, DURATION_IDX, Population, PopulationDecisions, PopulationError,
    PopulationFitness,
};
use crate::metrics::MetricRecord;

/// Error type for the Evaluator.
#[derive(Debug, Error, PartialEq)]
pub enum EvaluatorError {
    #[error("test '{name}' has zero duration, its coverage/duration fitness is undefined")]
    DivisionByZero { name: String },
    #[error("test '{name}' has invalid decision values (duration {duration}, coverage {coverage})")]
    InvalidDecision {
        name: String,
        duration: f64,
        coverage: f64,
    },
    #[error("no eligible records left after applying the outcome and duration policies")]
    NoEligibleRecords,
    #[error(transparent)]
    Population(#[from] PopulationError),
}

pub type FitnessFn = fn(&PopulationDecisions) -> PopulationFitness;

fn ratio(decisions: &PopulationDecisions) -> PopulationFitness {
    &decisions.column(COVERAGE_IDX) / &decisions.column(DURATION_IDX)
}

fn inverse_ratio(decisions: &PopulationDecisions) -> PopulationFitness {
    &decisions.column(DURATION_IDX) / &decisions.column(COVERAGE_IDX)
}

fn negated_ratio(decisions: &PopulationDecisions) -> PopulationFitness {
    ratio(decisions).mapv(|v| -v)
}

/// How decision vectors become fitness. The tournament minimises, so pick
/// the transform under which a smaller value is the more desirable test.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FitnessTransform {
    /// `coverage / duration`.
    #[default]
    Ratio,
    /// `duration / coverage`. Zero coverage yields infinite fitness, which
    /// the tournament rejects.
    InverseRatio,
    /// `-(coverage / duration)`: more coverage per second wins.
    NegatedRatio,
}

impl FitnessTransform {
    pub fn fitness_fn(self) -> FitnessFn {
        match self {
            FitnessTransform::Ratio => ratio,
            FitnessTransform::InverseRatio => inverse_ratio,
            FitnessTransform::NegatedRatio => negated_ratio,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ZeroDurationPolicy {
    #[default]
    Reject,
    Skip,
}

/// Treatment of records whose outcome is not `passed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NonPassedPolicy {
    #[default]
    Keep,
    ZeroCoverage,
    Exclude,
}

macro_rules! kebab_enum_str {
    ($ty:ty, $($variant:path => $text:literal),+ $(,)?) => {
        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($variant),)+
                    other => Err(format!(
                        "unknown value '{}', expected one of: {}",
                        other,
                        [$($text),+].join(", ")
                    )),
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $($variant => write!(f, $text),)+
                }
            }
        }
    };
}

kebab_enum_str!(FitnessTransform,
    FitnessTransform::Ratio => "ratio",
    FitnessTransform::InverseRatio => "inverse-ratio",
    FitnessTransform::NegatedRatio => "negated-ratio",
);
kebab_enum_str!(ZeroDurationPolicy,
    ZeroDurationPolicy::Reject => "reject",
    ZeroDurationPolicy::Skip => "skip",
);
kebab_enum_str!(NonPassedPolicy,
    NonPassedPolicy::Keep => "keep",
    NonPassedPolicy::ZeroCoverage => "zero-coverage",
    NonPassedPolicy::Exclude => "exclude",
);

/// Turns metric records into a tournament `Population`.
///
/// Each record becomes one individual with decision vector
/// `[duration, coverage]` (mapping coverage is summed) and fitness computed
/// by `fitness_fn` over the whole decision matrix.
pub struct Evaluator<F>
where
    F: Fn(&PopulationDecisions) -> PopulationFitness,
{
    fitness_fn: F,
    zero_duration: ZeroDurationPolicy,
    non_passed: NonPassedPolicy,
}

impl<F> Evaluator<F>
where
    F: Fn(&PopulationDecisions) -> PopulationFitness,
{
    pub fn new(fitness_fn: F, zero_duration: ZeroDurationPolicy, non_passed: NonPassedPolicy) -> Self {
        Self {
            fitness_fn,
            zero_duration,
            non_passed,
        }
    }

    fn evaluate_fitness(&self, decisions: &PopulationDecisions) -> PopulationFitness {
        (self.fitness_fn)(decisions)
    }

    /// Builds the population. Zero durations are guarded here, before any
    /// fitness is computed.
    pub fn evaluate(&self, records: &[MetricRecord]) -> Result<Population, EvaluatorError> {
        let mut names = Vec::with_capacity(records.len());
        let mut rows: Vec<[f64; 2]> = Vec::with_capacity(records.len());

        for record in records {
            let mut coverage = record.coverage.scalar();
            if !record.is_passed() {
                match self.non_passed {
                    NonPassedPolicy::Keep => {}
                    NonPassedPolicy::ZeroCoverage => coverage = 0.0,
                    NonPassedPolicy::Exclude => {
                        debug!(test = %record.name, outcome = ?record.outcome, "excluding non-passed test");
                        continue;
                    }
                }
            }

            let duration = record.duration;
            if !duration.is_finite() || duration < 0.0 || !coverage.is_finite() {
                return Err(EvaluatorError::InvalidDecision {
                    name: record.name.clone(),
                    duration,
                    coverage,
                });
            }
            if duration == 0.0 {
                match self.zero_duration {
                    ZeroDurationPolicy::Reject => {
                        return Err(EvaluatorError::DivisionByZero {
                            name: record.name.clone(),
                        });
                    }
                    ZeroDurationPolicy::Skip => {
                        warn!(test = %record.name, "skipping test with zero duration");
                        continue;
                    }
                }
            }

            names.push(record.name.clone());
            rows.push([duration, coverage]);
        }

        if names.is_empty() && !records.is_empty() {
            return Err(EvaluatorError::NoEligibleRecords);
        }

        let mut decisions = PopulationDecisions::zeros((rows.len(), 2));
        for (i, row) in rows.iter().enumerate() {
            decisions[[i, DURATION_IDX]] = row[DURATION_IDX];
            decisions[[i, COVERAGE_IDX]] = row[COVERAGE_IDX];
        }
        let fitness = self.evaluate_fitness(&decisions);
        Ok(Population::new(names, decisions, fitness)?)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::metrics::{MetricValue, Outcome};
    use ndarray::array;
    use rstest::rstest;
    use std::collections::BTreeMap;

    fn evaluator(
        transform: FitnessTransform,
        zero_duration: ZeroDurationPolicy,
        non_passed: NonPassedPolicy,
    ) -> Evaluator<FitnessFn> {
        Evaluator::new(transform.fitness_fn(), zero_duration, non_passed)
    }

    fn default_evaluator() -> Evaluator<FitnessFn> {
        evaluator(
            FitnessTransform::default(),
            ZeroDurationPolicy::default(),
            NonPassedPolicy::default(),
        )
    }

    #[test]
    fn test_evaluate_ratio_fitness() {
        let records = vec![
            MetricRecord::new("T1", 2.0, 10.0),
            MetricRecord::new("T2", 1.0, 10.0),
            MetricRecord::new("T3", 5.0, 5.0),
        ];
        let pop = default_evaluator().evaluate(&records).unwrap();
        assert_eq!(pop.names, vec!["T1", "T2", "T3"]);
        assert_eq!(pop.decisions, array![[2.0, 10.0], [1.0, 10.0], [5.0, 5.0]]);
        assert_eq!(pop.fitness, array![5.0, 10.0, 1.0]);
    }

    #[rstest(
        transform, expected,
        case(FitnessTransform::Ratio, array![4.0, 0.5]),
        case(FitnessTransform::InverseRatio, array![0.25, 2.0]),
        case(FitnessTransform::NegatedRatio, array![-4.0, -0.5])
    )]
    fn test_fitness_transforms(transform: FitnessTransform, expected: PopulationFitness) {
        let decisions = array![[1.0, 4.0], [4.0, 2.0]];
        assert_eq!((transform.fitness_fn())(&decisions), expected);
    }

    #[test]
    fn test_mapping_coverage_is_summed() {
        let coverage = MetricValue::Mapping(BTreeMap::from([
            ("lines".to_string(), 6.0),
            ("branches".to_string(), 2.0),
        ]));
        let records = vec![MetricRecord::new("a", 2.0, coverage)];
        let pop = default_evaluator().evaluate(&records).unwrap();
        assert_eq!(pop.decisions.column(COVERAGE_IDX).to_owned(), array![8.0]);
        assert_eq!(pop.fitness, array![4.0]);
    }

    #[test]
    fn test_zero_duration_rejected_by_default() {
        let records = vec![MetricRecord::new("a", 1.0, 1.0), MetricRecord::new("z", 0.0, 3.0)];
        let err = default_evaluator().evaluate(&records).unwrap_err();
        assert_eq!(err, EvaluatorError::DivisionByZero { name: "z".into() });
    }

    #[test]
    fn test_zero_duration_skipped() {
        let records = vec![MetricRecord::new("a", 1.0, 1.0), MetricRecord::new("z", 0.0, 3.0)];
        let pop = evaluator(FitnessTransform::Ratio, ZeroDurationPolicy::Skip, NonPassedPolicy::Keep)
            .evaluate(&records)
            .unwrap();
        assert_eq!(pop.names, vec!["a"]);
    }

    #[test]
    fn test_all_skipped_is_an_error() {
        let records = vec![MetricRecord::new("z", 0.0, 3.0)];
        let err = evaluator(FitnessTransform::Ratio, ZeroDurationPolicy::Skip, NonPassedPolicy::Keep)
            .evaluate(&records)
            .unwrap_err();
        assert_eq!(err, EvaluatorError::NoEligibleRecords);
    }

    #[test]
    fn test_empty_records_give_empty_population() {
        let pop = default_evaluator().evaluate(&[]).unwrap();
        assert!(pop.is_empty());
    }

    #[rstest(duration, coverage, case(-1.0, 1.0), case(f64::NAN, 1.0), case(1.0, f64::INFINITY))]
    fn test_invalid_decision(duration: f64, coverage: f64) {
        let records = vec![MetricRecord::new("bad", duration, coverage)];
        let err = default_evaluator().evaluate(&records).unwrap_err();
        assert!(matches!(err, EvaluatorError::InvalidDecision { .. }));
    }

    #[rstest(
        policy, expected_names, expected_coverage,
        case(NonPassedPolicy::Keep, vec!["ok", "failed"], array![4.0, 9.0]),
        case(NonPassedPolicy::ZeroCoverage, vec!["ok", "failed"], array![4.0, 0.0]),
        case(NonPassedPolicy::Exclude, vec!["ok"], array![4.0])
    )]
    fn test_non_passed_policy(
        policy: NonPassedPolicy,
        expected_names: Vec<&str>,
        expected_coverage: PopulationFitness,
    ) {
        let records = vec![
            MetricRecord::new("ok", 1.0, 4.0).with_outcome(Outcome::Passed),
            MetricRecord::new("failed", 1.0, 9.0).with_outcome(Outcome::Failed),
        ];
        let pop = evaluator(FitnessTransform::Ratio, ZeroDurationPolicy::Reject, policy)
            .evaluate(&records)
            .unwrap();
        assert_eq!(pop.names, expected_names);
        assert_eq!(pop.decisions.column(COVERAGE_IDX).to_owned(), expected_coverage);
    }

    #[test]
    fn test_custom_fitness_closure() {
        let evaluator = Evaluator::new(
            |d: &PopulationDecisions| d.column(DURATION_IDX).to_owned(),
            ZeroDurationPolicy::Reject,
            NonPassedPolicy::Keep,
        );
        let pop = evaluator
            .evaluate(&[MetricRecord::new("a", 3.0, 1.0), MetricRecord::new("b", 2.0, 1.0)])
            .unwrap();
        assert_eq!(pop.fitness, array![3.0, 2.0]);
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!("skip".parse::<ZeroDurationPolicy>(), Ok(ZeroDurationPolicy::Skip));
        assert_eq!("zero-coverage".parse::<NonPassedPolicy>(), Ok(NonPassedPolicy::ZeroCoverage));
        assert_eq!(FitnessTransform::NegatedRatio.to_string(), "negated-ratio");
        assert!("max".parse::<FitnessTransform>().is_err());
    }
}
