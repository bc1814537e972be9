use crate::operators::Operator;
use crate::operators::sorting::{SortKey, SortingOperator};
use crate::random::RandomGenerator;

/// Quicksort with a pivot drawn uniformly from the current partition.
///
/// Elements are split into `<= pivot` and `> pivot` around the pivot, and
/// both sides are sorted the same way, left side first. Equal keys may be
/// reordered, so the sort is not stable; seed the generator to make tie
/// order reproducible.
#[derive(Clone, Debug, Default)]
pub struct RandomizedQuickSort {}

impl RandomizedQuickSort {
    pub fn new() -> Self {
        Self {}
    }

    /// Sorts `order` in place. Pending partitions live on a heap stack, so
    /// runs of equal keys cost time but never call depth.
    fn quicksort(&self, order: &mut [usize], keys: &[SortKey], rng: &mut dyn RandomGenerator) {
        let mut pending = vec![(0, order.len())];
        let mut left = Vec::with_capacity(order.len());
        let mut right = Vec::with_capacity(order.len());

        while let Some((start, end)) = pending.pop() {
            if end - start <= 1 {
                continue;
            }
            let pivot_pos = start + rng.gen_range_usize(0, end - start);
            let pivot = order[pivot_pos];
            let pivot_key = keys[pivot];

            left.clear();
            right.clear();
            for (pos, &idx) in order[start..end].iter().enumerate() {
                if start + pos == pivot_pos {
                    continue;
                }
                if keys[idx] <= pivot_key {
                    left.push(idx);
                } else {
                    right.push(idx);
                }
            }

            let mid = start + left.len();
            order[start..mid].copy_from_slice(&left);
            order[mid] = pivot;
            order[mid + 1..end].copy_from_slice(&right);

            // Left side is popped first.
            pending.push((mid + 1, end));
            pending.push((start, mid));
        }
    }
}

impl Operator for RandomizedQuickSort {
    fn name(&self) -> String {
        "RandomizedQuickSort".to_string()
    }
}

impl SortingOperator for RandomizedQuickSort {
    fn sort_indices(&self, keys: &[SortKey], rng: &mut dyn RandomGenerator) -> Vec<usize> {
        let mut order: Vec<usize> = (0..keys.len()).collect();
        self.quicksort(&mut order, keys, rng);
        order
    }
}
