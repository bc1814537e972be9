use std::fmt;
use std::str::FromStr;

use indexmap::IndexSet;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

use crate::{
    genetic::{Individual, Population},
    operators::Operator,
};

mod fitness_tournament;

pub use fitness_tournament::FitnessTournament;

/// Index pair `(i, j)` with `i < j` into a population.
pub type Pairing = (usize, usize);

// Enum to represent the result of a tournament duel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuelResult {
    LeftWins,
    RightWins,
    Tie,
}

#[derive(Debug, Error, PartialEq)]
pub enum SelectionError {
    #[error("tournament selection needs at least one individual")]
    EmptyPopulation,
    #[error("individual {index} ('{name}') has non-finite fitness {value}")]
    InvalidFitness {
        index: usize,
        name: String,
        value: f64,
    },
}

/// How winners and losers are accumulated over the round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccumulationRule {
    /// A first-time winner joins the winners unless it already lost; in that
    /// case the current loser is struck from the losers instead. Losers are
    /// always recorded.
    #[default]
    Literal,
    /// Winners are the names that won at least once and never lost.
    NeverDefeated,
}

impl FromStr for AccumulationRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "literal" => Ok(AccumulationRule::Literal),
            "never-defeated" => Ok(AccumulationRule::NeverDefeated),
            other => Err(format!(
                "unknown accumulation rule '{other}', expected literal or never-defeated"
            )),
        }
    }
}

impl fmt::Display for AccumulationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccumulationRule::Literal => write!(f, "literal"),
            AccumulationRule::NeverDefeated => write!(f, "never-defeated"),
        }
    }
}

/// Every pair `(i, j)` with `0 <= i < j < population_size`, row-major.
pub fn round_robin_pairs(population_size: usize) -> Vec<Pairing> {
    let total = population_size * population_size.saturating_sub(1) / 2;
    let mut pairs = Vec::with_capacity(total);
    for i in 0..population_size {
        for j in (i + 1)..population_size {
            pairs.push((i, j));
        }
    }
    pairs
}

/// Result of one pairwise comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Duel {
    pub pairing: Pairing,
    pub winner: usize,
    pub loser: usize,
}

impl Duel {
    /// Ties go to the right operand.
    pub fn resolve(pairing: Pairing, result: DuelResult) -> Self {
        let (left, right) = pairing;
        let (winner, loser) = match result {
            DuelResult::LeftWins => (left, right),
            DuelResult::RightWins | DuelResult::Tie => (right, left),
        };
        Self {
            pairing,
            winner,
            loser,
        }
    }
}

/// Running winners and losers sets, in first-insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Standings {
    winners: IndexSet<String>,
    losers: IndexSet<String>,
}

impl Standings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, winner: &str, loser: &str, rule: AccumulationRule) {
        match rule {
            AccumulationRule::Literal => {
                if !self.winners.contains(winner) {
                    if !self.losers.contains(winner) {
                        self.winners.insert(winner.to_string());
                    } else {
                        self.losers.shift_remove(loser);
                    }
                }
                if !self.losers.contains(loser) {
                    self.losers.insert(loser.to_string());
                }
            }
            AccumulationRule::NeverDefeated => {
                self.winners.shift_remove(loser);
                self.losers.insert(loser.to_string());
                if !self.losers.contains(winner) {
                    self.winners.insert(winner.to_string());
                }
            }
        }
    }

    pub fn winners(&self) -> &IndexSet<String> {
        &self.winners
    }

    pub fn losers(&self) -> &IndexSet<String> {
        &self.losers
    }
}

/// Everything one round-robin round produced.
#[derive(Debug, Clone, PartialEq)]
pub struct TournamentOutcome {
    pub pairings: Vec<Pairing>,
    pub duels: Vec<Duel>,
    pub standings: Standings,
}

impl TournamentOutcome {
    /// The ideal tests: the final winners set.
    pub fn ideal(&self) -> &IndexSet<String> {
        self.standings.winners()
    }

    pub fn n_comparisons(&self) -> usize {
        self.duels.len()
    }
}

pub trait SelectionOperator: Operator + Sync {
    fn accumulation_rule(&self) -> AccumulationRule {
        AccumulationRule::Literal
    }

    /// Evaluate duels on the rayon pool. Folding stays sequential.
    fn parallel(&self) -> bool {
        false
    }

    /// Tournament between 2 individuals.
    fn tournament_duel(&self, left: &Individual, right: &Individual) -> DuelResult;

    /// Rejects populations the round cannot be run on. Checked before any
    /// comparison happens.
    fn validate(&self, population: &Population) -> Result<(), SelectionError> {
        if population.is_empty() {
            return Err(SelectionError::EmptyPopulation);
        }
        if let Some((index, &value)) = population
            .fitness
            .iter()
            .enumerate()
            .find(|(_, f)| !f.is_finite())
        {
            return Err(SelectionError::InvalidFitness {
                index,
                name: population.names[index].clone(),
                value,
            });
        }
        Ok(())
    }

    /// Runs every duel of the round-robin schedule and folds the results
    /// into standings, in pairing order.
    fn operate(&self, population: &Population) -> Result<TournamentOutcome, SelectionError> {
        self.validate(population)?;

        let individuals = population.individuals();
        let pairings = round_robin_pairs(individuals.len());
        debug!(
            operator = %self.name(),
            population_size = individuals.len(),
            comparisons = pairings.len(),
            parallel = self.parallel(),
            "running round-robin tournament"
        );

        let duel = |&(i, j): &Pairing| {
            Duel::resolve((i, j), self.tournament_duel(&individuals[i], &individuals[j]))
        };
        let duels: Vec<Duel> = if self.parallel() {
            pairings.par_iter().map(duel).collect()
        } else {
            pairings.iter().map(duel).collect()
        };

        let rule = self.accumulation_rule();
        let mut standings = Standings::new();
        for d in &duels {
            let winner = &population.names[d.winner];
            let loser = &population.names[d.loser];
            trace!(winner = %winner, loser = %loser, "duel");
            standings.record(winner, loser, rule);
        }

        debug!(
            winners = standings.winners().len(),
            losers = standings.losers().len(),
            "tournament finished"
        );
        Ok(TournamentOutcome {
            pairings,
            duels,
            standings,
        })
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use rstest::rstest;

    fn names(set: &IndexSet<String>) -> Vec<&str> {
        set.iter().map(String::as_str).collect()
    }

    #[rstest(n, case(0), case(1), case(2), case(5), case(12))]
    fn test_round_robin_completeness(n: usize) {
        let pairs = round_robin_pairs(n);
        assert_eq!(pairs.len(), n * n.saturating_sub(1) / 2);
        for idx in 0..n {
            let appearances = pairs.iter().filter(|&&(i, j)| i == idx || j == idx).count();
            assert_eq!(appearances, n - 1);
        }
        assert!(pairs.iter().all(|&(i, j)| i < j));
    }

    proptest::proptest! {
        #[test]
        fn prop_every_unordered_pair_once(n in 0usize..40) {
            let pairs = round_robin_pairs(n);
            let unique: std::collections::HashSet<_> = pairs.iter().copied().collect();
            proptest::prop_assert_eq!(unique.len(), pairs.len());
            for i in 0..n {
                for j in (i + 1)..n {
                    proptest::prop_assert!(unique.contains(&(i, j)));
                }
            }
        }
    }

    #[test]
    fn test_round_robin_order() {
        assert_eq!(
            round_robin_pairs(4),
            vec![(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]
        );
    }

    #[rstest(
        result, expected,
        case(DuelResult::LeftWins, (3, 7)),
        case(DuelResult::RightWins, (7, 3)),
        case(DuelResult::Tie, (7, 3))
    )]
    fn test_duel_resolve(result: DuelResult, expected: (usize, usize)) {
        let duel = Duel::resolve((3, 7), result);
        assert_eq!((duel.winner, duel.loser), expected);
    }

    #[test]
    fn test_literal_rule_strikes_current_loser() {
        let mut standings = Standings::new();
        standings.record("B", "A", AccumulationRule::Literal);
        standings.record("C", "D", AccumulationRule::Literal);
        // A already lost; its win removes D from the losers, then D is
        // recorded again as this pair's loser.
        standings.record("A", "D", AccumulationRule::Literal);
        assert_eq!(names(standings.winners()), vec!["B", "C"]);
        assert_eq!(names(standings.losers()), vec!["A", "D"]);
    }

    #[test]
    fn test_literal_rule_leaves_previous_loser_out_of_winners() {
        let mut standings = Standings::new();
        standings.record("B", "A", AccumulationRule::Literal);
        standings.record("A", "C", AccumulationRule::Literal);
        assert_eq!(names(standings.winners()), vec!["B"]);
        assert_eq!(names(standings.losers()), vec!["A", "C"]);
    }

    #[test]
    fn test_literal_rule_keeps_winner_that_later_loses() {
        let mut standings = Standings::new();
        standings.record("A", "B", AccumulationRule::Literal);
        standings.record("C", "A", AccumulationRule::Literal);
        assert_eq!(names(standings.winners()), vec!["A", "C"]);
        assert_eq!(names(standings.losers()), vec!["B", "A"]);
    }

    #[test]
    fn test_never_defeated_rule() {
        let mut standings = Standings::new();
        standings.record("A", "B", AccumulationRule::NeverDefeated);
        standings.record("C", "A", AccumulationRule::NeverDefeated);
        standings.record("B", "D", AccumulationRule::NeverDefeated);
        assert_eq!(names(standings.winners()), vec!["C"]);
        assert_eq!(names(standings.losers()), vec!["B", "A", "D"]);
    }

    #[test]
    fn test_accumulation_rule_parse_and_display() {
        assert_eq!(
            "never-defeated".parse::<AccumulationRule>(),
            Ok(AccumulationRule::NeverDefeated)
        );
        assert!("pareto".parse::<AccumulationRule>().is_err());
        assert_eq!(AccumulationRule::Literal.to_string(), "literal");
    }
}
