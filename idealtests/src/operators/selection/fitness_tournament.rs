use std::fmt::Debug;

use crate::genetic::Individual;
use crate::operators::{
    Operator,
    selection::{AccumulationRule, DuelResult, SelectionOperator},
};

/// Binary tournament on scalar fitness under minimisation: the strictly
/// smaller fitness wins, equal fitness is a tie (and ties go to the right
/// operand when the round is folded).
#[derive(Clone, Debug, Default)]
pub struct FitnessTournament {
    accumulation_rule: AccumulationRule,
    parallel: bool,
}

impl FitnessTournament {
    /// Creates a new FitnessTournament with the literal accumulation rule.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_with_rule(accumulation_rule: AccumulationRule) -> Self {
        Self {
            accumulation_rule,
            parallel: false,
        }
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

impl Operator for FitnessTournament {
    fn name(&self) -> String {
        "FitnessTournament".to_string()
    }
}

impl SelectionOperator for FitnessTournament {
    fn accumulation_rule(&self) -> AccumulationRule {
        self.accumulation_rule
    }

    fn parallel(&self) -> bool {
        self.parallel
    }

    fn tournament_duel(&self, left: &Individual, right: &Individual) -> DuelResult {
        if left.fitness < right.fitness {
            DuelResult::LeftWins
        } else if right.fitness < left.fitness {
            DuelResult::RightWins
        } else {
            DuelResult::Tie
        }
    }
}
