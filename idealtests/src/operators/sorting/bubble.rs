use crate::operators::Operator;
use crate::operators::sorting::{SortKey, SortingOperator};
use crate::random::RandomGenerator;

/// Exchange sort. Quadratic, but stable and deterministic; kept as the
/// baseline the randomized sort is timed against.
#[derive(Clone, Debug, Default)]
pub struct BubbleSort {}

impl BubbleSort {
    pub fn new() -> Self {
        Self {}
    }
}

impl Operator for BubbleSort {
    fn name(&self) -> String {
        "BubbleSort".to_string()
    }
}

impl SortingOperator for BubbleSort {
    fn sort_indices(&self, keys: &[SortKey], _rng: &mut dyn RandomGenerator) -> Vec<usize> {
        let mut order: Vec<usize> = (0..keys.len()).collect();
        let n = order.len();
        for i in 0..n {
            let mut swapped = false;
            for j in 0..n.saturating_sub(i + 1) {
                if keys[order[j]] > keys[order[j + 1]] {
                    order.swap(j, j + 1);
                    swapped = true;
                }
            }
            if !swapped {
                break;
            }
        }
        order
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::random::SeededRandomGenerator;
    use ordered_float::OrderedFloat;

    #[test]
    fn test_bubble_sort_is_stable() {
        let keys: Vec<SortKey> = [3.0, 1.0, 3.0, 1.0, 2.0].into_iter().map(OrderedFloat).collect();
        let mut rng = SeededRandomGenerator::from_seed(Some(0));
        assert_eq!(BubbleSort::new().sort_indices(&keys, &mut rng), vec![1, 3, 4, 0, 2]);
    }

    #[test]
    fn test_bubble_sort_empty() {
        let mut rng = SeededRandomGenerator::from_seed(Some(0));
        assert!(BubbleSort::new().sort_indices(&[], &mut rng).is_empty());
    }
}
