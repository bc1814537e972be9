use std::fmt::Debug;

pub mod selection;
pub mod sorting;

pub use selection::{FitnessTournament, SelectionOperator};
pub use sorting::{BubbleSort, BucketSort, RandomizedQuickSort, SortingOperator};

pub trait Operator: Debug {
    fn name(&self) -> String;
}
