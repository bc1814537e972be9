use std::fmt;
use std::str::FromStr;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::{
    metrics::{MetricRecord, Shape},
    operators::Operator,
    random::RandomGenerator,
};

mod bubble;
mod bucket;
mod quick;

pub use bubble::BubbleSort;
pub use bucket::BucketSort;
pub use quick::RandomizedQuickSort;

/// Totally ordered comparison value. NaN sorts after every number.
pub type SortKey = OrderedFloat<f64>;

#[derive(Debug, Error, PartialEq)]
pub enum RankingError {
    #[error("record {index} ('{name}') has no field '{key}'")]
    MissingKey {
        key: String,
        index: usize,
        name: String,
    },
    #[error("field '{key}' of record '{name}' is a {found} but earlier records hold a {expected}")]
    ShapeMismatch {
        key: String,
        name: String,
        expected: Shape,
        found: Shape,
    },
    #[error("field '{key}' of record '{name}' cannot be ranked: {reason}")]
    NotNumeric {
        key: String,
        name: String,
        reason: String,
    },
}

/// Which sorting operator ranks the records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortStrategy {
    #[default]
    Quick,
    Bucket,
    Bubble,
}

impl SortStrategy {
    pub fn operator(self) -> Box<dyn SortingOperator> {
        match self {
            SortStrategy::Quick => Box::new(RandomizedQuickSort::new()),
            SortStrategy::Bucket => Box::new(BucketSort::new()),
            SortStrategy::Bubble => Box::new(BubbleSort::new()),
        }
    }
}

impl FromStr for SortStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "quick" => Ok(SortStrategy::Quick),
            "bucket" => Ok(SortStrategy::Bucket),
            "bubble" => Ok(SortStrategy::Bubble),
            other => Err(format!(
                "unknown sort strategy '{other}', expected quick, bucket or bubble"
            )),
        }
    }
}

impl fmt::Display for SortStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortStrategy::Quick => write!(f, "quick"),
            SortStrategy::Bucket => write!(f, "bucket"),
            SortStrategy::Bubble => write!(f, "bubble"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RankOrder {
    #[default]
    Ascending,
    Descending,
}

/// Extracts one comparison key per record for `key`.
///
/// Every record is checked for the field before any shape check, so a
/// missing key is always reported first. All records must agree on the
/// shape (scalar or mapping) of the field.
pub fn extract_keys(records: &[MetricRecord], key: &str) -> Result<Vec<SortKey>, RankingError> {
    let mut values = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        match record.field(key) {
            None => {
                return Err(RankingError::MissingKey {
                    key: key.to_string(),
                    index,
                    name: record.name.clone(),
                });
            }
            Some(value) => values.push(value),
        }
    }

    let mut expected: Option<Shape> = None;
    let mut keys = Vec::with_capacity(records.len());
    for (record, value) in records.iter().zip(values) {
        let value = value.map_err(|e| RankingError::NotNumeric {
            key: key.to_string(),
            name: record.name.clone(),
            reason: e.to_string(),
        })?;
        let shape = value.shape();
        match expected {
            None => expected = Some(shape),
            Some(exp) if exp != shape => {
                return Err(RankingError::ShapeMismatch {
                    key: key.to_string(),
                    name: record.name.clone(),
                    expected: exp,
                    found: shape,
                });
            }
            Some(_) => {}
        }
        keys.push(OrderedFloat(value.scalar()));
    }
    Ok(keys)
}

pub trait SortingOperator: Operator {
    /// Returns the permutation of `0..keys.len()` that orders `keys` ascending.
    fn sort_indices(&self, keys: &[SortKey], rng: &mut dyn RandomGenerator) -> Vec<usize>;

    /// Generic key-based sort: returns a sorted copy of `items`.
    fn sort_by_key<T, F>(&self, items: &[T], key_fn: F, rng: &mut dyn RandomGenerator) -> Vec<T>
    where
        Self: Sized,
        T: Clone,
        F: Fn(&T) -> f64,
    {
        let keys: Vec<SortKey> = items.iter().map(|item| OrderedFloat(key_fn(item))).collect();
        self.sort_indices(&keys, rng)
            .into_iter()
            .map(|i| items[i].clone())
            .collect()
    }

    /// Ranks metric records by `key`, ascending. The input is left untouched.
    fn operate(
        &self,
        records: &[MetricRecord],
        key: &str,
        rng: &mut dyn RandomGenerator,
    ) -> Result<Vec<MetricRecord>, RankingError> {
        let keys = extract_keys(records, key)?;
        debug!(
            operator = %self.name(),
            key,
            records = records.len(),
            "ranking records"
        );
        Ok(self
            .sort_indices(&keys, rng)
            .into_iter()
            .map(|i| records[i].clone())
            .collect())
    }
}

/// Ranks `records` by `key` with the given strategy and order.
pub fn rank(
    records: &[MetricRecord],
    key: &str,
    strategy: SortStrategy,
    order: RankOrder,
    rng: &mut dyn RandomGenerator,
) -> Result<Vec<MetricRecord>, RankingError> {
    let mut ranked = strategy.operator().operate(records, key, rng)?;
    if order == RankOrder::Descending {
        ranked.reverse();
    }
    Ok(ranked)
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::random::{RandomGenerator, TestDummyRng};

    /// Always picks the first element of a partition as the pivot.
    pub struct FirstPivotRng {
        dummy: TestDummyRng,
    }

    impl FirstPivotRng {
        pub fn new() -> Self {
            Self {
                dummy: TestDummyRng,
            }
        }
    }

    impl RandomGenerator for FirstPivotRng {
        fn rng(&mut self) -> &mut dyn rand::RngCore {
            &mut self.dummy
        }
        fn gen_range_usize(&mut self, min: usize, _max: usize) -> usize {
            min
        }
    }

    pub fn is_sorted(values: &[f64]) -> bool {
        values.windows(2).all(|w| w[0] <= w[1])
    }
}
