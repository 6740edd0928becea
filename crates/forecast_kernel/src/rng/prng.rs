//! Seeded pseudo-random generator for path simulation.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};

use super::NormalSource;

/// Simulation random number generator.
///
/// Wraps `StdRng` and samples normals with the Ziggurat algorithm via
/// `rand_distr::StandardNormal`. The seed is kept so reports can state how a
/// run can be reproduced.
///
/// # Examples
///
/// ```rust
/// use forecast_kernel::rng::SimRng;
///
/// let mut rng1 = SimRng::from_seed(42);
/// let mut rng2 = SimRng::from_seed(42);
/// assert_eq!(rng1.gen_normal(), rng2.gen_normal());
/// assert_eq!(rng1.seed(), 42);
/// ```
#[derive(Clone, Debug)]
pub struct SimRng {
    inner: StdRng,
    seed: u64,
}

impl SimRng {
    /// Creates a generator initialised with `seed`.
    #[inline]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Creates a generator from an operating-system entropy seed.
    ///
    /// The drawn seed is still recorded and available through
    /// [`seed`](Self::seed).
    pub fn from_entropy() -> Self {
        let seed: u64 = StdRng::from_entropy().gen();
        Self::from_seed(seed)
    }

    /// Returns the seed used for initialisation.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Derives an independent child generator.
    ///
    /// The child seed is drawn from this generator, so a sequence of forks
    /// is itself reproducible from the parent seed.
    pub fn fork(&mut self) -> Self {
        let child_seed: u64 = self.inner.gen();
        Self::from_seed(child_seed)
    }

    /// Generates a single standard normal variate.
    #[inline]
    pub fn gen_normal(&mut self) -> f64 {
        StandardNormal.sample(&mut self.inner)
    }
}

impl NormalSource for SimRng {
    #[inline]
    fn fill_normal(&mut self, buffer: &mut [f64]) {
        for value in buffer.iter_mut() {
            *value = StandardNormal.sample(&mut self.inner);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_reproducibility() {
        let mut rng1 = SimRng::from_seed(12345);
        let mut rng2 = SimRng::from_seed(12345);

        let mut a = vec![0.0; 256];
        let mut b = vec![0.0; 256];
        rng1.fill_normal(&mut a);
        rng2.fill_normal(&mut b);
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seeds_differ() {
        let mut rng1 = SimRng::from_seed(1);
        let mut rng2 = SimRng::from_seed(2);
        assert_ne!(rng1.gen_normal(), rng2.gen_normal());
    }

    #[test]
    fn test_normal_moments() {
        let mut rng = SimRng::from_seed(42);
        let mut buffer = vec![0.0; 100_000];
        rng.fill_normal(&mut buffer);

        let n = buffer.len() as f64;
        let mean = buffer.iter().sum::<f64>() / n;
        let variance = buffer.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;

        assert!(mean.abs() < 0.02, "mean {} too far from 0", mean);
        assert!((variance - 1.0).abs() < 0.02, "variance {} too far from 1", variance);
    }

    #[test]
    fn test_fork_reproducible_and_independent() {
        let mut parent1 = SimRng::from_seed(99);
        let mut parent2 = SimRng::from_seed(99);

        let mut child1 = parent1.fork();
        let mut child2 = parent2.fork();
        assert_eq!(child1.seed(), child2.seed());
        assert_eq!(child1.gen_normal(), child2.gen_normal());

        let sibling = parent1.fork();
        assert_ne!(sibling.seed(), child1.seed());
    }

    #[test]
    fn test_from_entropy_records_seed() {
        let rng = SimRng::from_entropy();
        let mut replay = SimRng::from_seed(rng.seed());
        let mut original = rng.clone();
        assert_eq!(original.gen_normal(), replay.gen_normal());
    }
}
