use ndarray::{Array1, Array2};
use thiserror::Error;

/// Column of the duration in a decision vector.
pub const DURATION_IDX: usize = 0;
/// Column of the coverage in a decision vector.
pub const COVERAGE_IDX: usize = 1;

/// Decision vector of one individual: `[duration, coverage]`.
pub type DecisionVector = Array1<f64>;

/// Type aliases to work with populations.
pub type PopulationDecisions = Array2<f64>;
pub type PopulationFitness = Array1<f64>;

#[derive(Debug, Error, PartialEq)]
pub enum PopulationError {
    #[error("decision matrix must have 2 columns (duration, coverage), got {0}")]
    DecisionShape(usize),
    #[error("population has {names} names, {decisions} decision vectors and {fitness} fitness values")]
    LengthMismatch {
        names: usize,
        decisions: usize,
        fitness: usize,
    },
}

/// A single test seen as a tournament participant.
#[derive(Debug, Clone, PartialEq)]
pub struct Individual {
    pub name: String,
    pub decision: DecisionVector,
    pub fitness: f64,
}

impl Individual {
    pub fn new(name: impl Into<String>, decision: DecisionVector, fitness: f64) -> Self {
        Self {
            name: name.into(),
            decision,
            fitness,
        }
    }
}

/// The `Population` struct holds names, decision vectors (one row per
/// individual) and fitness. Row order is the index order used for pairing.
#[derive(Debug, Clone, PartialEq)]
pub struct Population {
    pub names: Vec<String>,
    pub decisions: PopulationDecisions,
    pub fitness: PopulationFitness,
}

impl Population {
    pub fn new(
        names: Vec<String>,
        decisions: PopulationDecisions,
        fitness: PopulationFitness,
    ) -> Result<Self, PopulationError> {
        if decisions.ncols() != 2 {
            return Err(PopulationError::DecisionShape(decisions.ncols()));
        }
        if names.len() != decisions.nrows() || names.len() != fitness.len() {
            return Err(PopulationError::LengthMismatch {
                names: names.len(),
                decisions: decisions.nrows(),
                fitness: fitness.len(),
            });
        }
        Ok(Self {
            names,
            decisions,
            fitness,
        })
    }

    /// Builds a population from already constructed individuals.
    pub fn from_individuals(individuals: &[Individual]) -> Result<Self, PopulationError> {
        if let Some(bad) = individuals.iter().find(|ind| ind.decision.len() != 2) {
            return Err(PopulationError::DecisionShape(bad.decision.len()));
        }
        let names = individuals.iter().map(|ind| ind.name.clone()).collect();
        let decisions = PopulationDecisions::from_shape_fn((individuals.len(), 2), |(i, j)| {
            individuals[i].decision[j]
        });
        let fitness = individuals.iter().map(|ind| ind.fitness).collect();
        Self::new(names, decisions, fitness)
    }

    /// Retrieves an `Individual` from the population by index.
    pub fn get(&self, idx: usize) -> Individual {
        Individual::new(
            self.names[idx].clone(),
            self.decisions.row(idx).to_owned(),
            self.fitness[idx],
        )
    }

    pub fn individuals(&self) -> Vec<Individual> {
        (0..self.len()).map(|i| self.get(i)).collect()
    }

    /// Returns the number of individuals in the population.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
