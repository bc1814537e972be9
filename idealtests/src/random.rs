use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// Source of randomness used by the operators.
///
/// Operators never reach for a global generator; they receive a
/// `&mut dyn RandomGenerator` so tests can pin every random decision.
pub trait RandomGenerator {
    fn rng(&mut self) -> &mut dyn RngCore;

    /// Uniform index in `min..max`.
    fn gen_range_usize(&mut self, min: usize, max: usize) -> usize {
        self.rng().random_range(min..max)
    }
}

/// Default generator backed by `StdRng`.
pub struct SeededRandomGenerator {
    rng: StdRng,
}

impl SeededRandomGenerator {
    pub fn new(rng: StdRng) -> Self {
        Self { rng }
    }

    /// Seeded when `seed` is given, otherwise seeded from the thread rng.
    pub fn from_seed(seed: Option<u64>) -> Self {
        Self::new(seed.map_or_else(|| StdRng::from_rng(&mut rand::rng()), StdRng::seed_from_u64))
    }
}

impl RandomGenerator for SeededRandomGenerator {
    fn rng(&mut self) -> &mut dyn RngCore {
        &mut self.rng
    }
}

/// RngCore that always yields zero. Test fakes wrap it and override the
/// `RandomGenerator` methods they care about.
pub struct TestDummyRng;

impl RngCore for TestDummyRng {
    fn next_u32(&mut self) -> u32 {
        0
    }

    fn next_u64(&mut self) -> u64 {
        0
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        dest.fill(0);
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = SeededRandomGenerator::from_seed(Some(7));
        let mut b = SeededRandomGenerator::from_seed(Some(7));
        let seq_a: Vec<usize> = (0..32).map(|_| a.gen_range_usize(0, 1000)).collect();
        let seq_b: Vec<usize> = (0..32).map(|_| b.gen_range_usize(0, 1000)).collect();
        assert_eq!(seq_a, seq_b);
    }

    #[test]
    fn test_gen_range_usize_within_bounds() {
        let mut rng = SeededRandomGenerator::from_seed(None);
        for _ in 0..200 {
            let value = rng.gen_range_usize(3, 9);
            assert!((3..9).contains(&value));
        }
    }
}
