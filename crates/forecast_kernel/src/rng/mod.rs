//! # Random Number Generation
//!
//! Randomness enters the kernel only through the [`NormalSource`] capability,
//! which every simulation call receives as an explicit `&mut` argument. There
//! is no global generator.
//!
//! - [`SimRng`]: production source, a seeded `StdRng` with Ziggurat normals
//! - [`NormalSource`]: the trait simulation code is generic over, so tests can
//!   substitute counting or scripted sources
//!
//! ## Usage Example
//!
//! ```rust
//! use forecast_kernel::rng::{NormalSource, SimRng};
//!
//! // Reproducible stream for tests and reports
//! let mut rng = SimRng::from_seed(12345);
//!
//! let mut buffer = vec![0.0; 1000];
//! rng.fill_normal(&mut buffer);
//!
//! // Independent child stream, e.g. for a parallel level
//! let child = rng.fork();
//! assert_ne!(child.seed(), rng.seed());
//! ```

mod prng;

pub use prng::SimRng;

/// A source of independent standard normal variates.
///
/// Implementors fill the whole buffer on every call. Empty buffers must be
/// accepted and leave the source unchanged.
pub trait NormalSource {
    /// Fills `buffer` with N(0, 1) draws.
    fn fill_normal(&mut self, buffer: &mut [f64]);
}

impl<S: NormalSource + ?Sized> NormalSource for &mut S {
    #[inline]
    fn fill_normal(&mut self, buffer: &mut [f64]) {
        (**self).fill_normal(buffer);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted sources for deterministic kernel tests.

    use super::NormalSource;

    /// Returns the same value for every draw and counts how many were taken.
    #[derive(Debug, Default)]
    pub struct ConstantSource {
        pub value: f64,
        pub draws: usize,
    }

    impl ConstantSource {
        pub fn new(value: f64) -> Self {
            Self { value, draws: 0 }
        }
    }

    impl NormalSource for ConstantSource {
        fn fill_normal(&mut self, buffer: &mut [f64]) {
            buffer.fill(self.value);
            self.draws += buffer.len();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::ConstantSource;
    use super::*;

    #[test]
    fn test_mut_ref_forwards() {
        fn draw_four<S: NormalSource>(mut source: S) -> [f64; 4] {
            let mut buffer = [0.0; 4];
            source.fill_normal(&mut buffer);
            buffer
        }

        let mut source = ConstantSource::new(0.5);
        assert_eq!(draw_four(&mut source), [0.5; 4]);
        assert_eq!(source.draws, 4);
    }

    #[test]
    fn test_empty_buffer() {
        let mut rng = SimRng::from_seed(7);
        let mut reference = SimRng::from_seed(7);
        rng.fill_normal(&mut []);
        assert_eq!(rng.gen_normal(), reference.gen_normal());
    }
}
