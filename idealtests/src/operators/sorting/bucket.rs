use crate::operators::Operator;
use crate::operators::sorting::{SortKey, SortingOperator};
use crate::random::RandomGenerator;

/// Bucket sort over `n` buckets spanning the finite key range.
///
/// Non-finite keys are clamped into the first (`-inf`) or last (`+inf`,
/// `NaN`) bucket. Each bucket is ordered by insertion sort, which keeps the
/// sort stable.
#[derive(Clone, Debug, Default)]
pub struct BucketSort {}

impl BucketSort {
    pub fn new() -> Self {
        Self {}
    }

    fn bucket_of(key: f64, min: f64, max: f64, n_buckets: usize) -> usize {
        if key.is_nan() || key == f64::INFINITY {
            return n_buckets - 1;
        }
        if key == f64::NEG_INFINITY || max <= min {
            return 0;
        }
        let pos = (key - min) / (max - min) * (n_buckets - 1) as f64;
        (pos.floor() as usize).min(n_buckets - 1)
    }
}

fn insertion_sort(bucket: &mut [usize], keys: &[SortKey]) {
    for i in 1..bucket.len() {
        let mut j = i;
        while j > 0 && keys[bucket[j - 1]] > keys[bucket[j]] {
            bucket.swap(j - 1, j);
            j -= 1;
        }
    }
}

impl Operator for BucketSort {
    fn name(&self) -> String {
        "BucketSort".to_string()
    }
}

impl SortingOperator for BucketSort {
    fn sort_indices(&self, keys: &[SortKey], _rng: &mut dyn RandomGenerator) -> Vec<usize> {
        let n = keys.len();
        if n <= 1 {
            return (0..n).collect();
        }

        let finite = keys.iter().map(|k| k.0).filter(|k| k.is_finite());
        let (min, max) = finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), k| {
            (lo.min(k), hi.max(k))
        });

        let mut buckets: Vec<Vec<usize>> = vec![Vec::new(); n];
        for (idx, key) in keys.iter().enumerate() {
            buckets[Self::bucket_of(key.0, min, max, n)].push(idx);
        }

        let mut order = Vec::with_capacity(n);
        for mut bucket in buckets {
            insertion_sort(&mut bucket, keys);
            order.extend(bucket);
        }
        order
    }
}
