//! The single randomness handle threaded through the simulation.
//!
//! A world owns exactly one [`Randomness`] and lends it, by `&mut`, to every
//! subsystem that draws numbers: genetics, placement, food spawning and
//! survival rules. There is no ambient generator anywhere in the core.
//!
//! All draws are derived from [`Randomness::random`], so the three strategies
//! differ only in where the unit-interval values come from:
//!
//! - `System`: ChaCha8 seeded from OS entropy.
//! - `Seeded`: ChaCha8 seeded from a fixed `u64`; fully reproducible.
//! - `Explicit`: a pre-recorded sequence, mostly for tests. Asking for more
//!   values than were recorded fails with [`SimError::RandomnessExhausted`],
//!   and a recorded NaN or infinity fails with [`SimError::Invariant`].

use crate::error::{Result, SimError};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[derive(Debug, Clone)]
pub enum Randomness {
    System(ChaCha8Rng),
    Seeded { seed: u64, rng: ChaCha8Rng },
    Explicit { values: Vec<f64>, cursor: usize },
}

impl Randomness {
    #[must_use]
    pub fn system() -> Self {
        Self::System(ChaCha8Rng::from_entropy())
    }

    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::Seeded {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Replays `values` in order. Each value is treated as a unit-interval
    /// draw and clamped into `[0, 1]`; non-finite values are rejected when
    /// drawn.
    pub fn explicit<I: IntoIterator<Item = f64>>(values: I) -> Self {
        Self::Explicit {
            values: values.into_iter().collect(),
            cursor: 0,
        }
    }

    /// Seeded when a seed is configured, entropy-backed otherwise.
    #[must_use]
    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::system(),
        }
    }

    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        !matches!(self, Self::System(_))
    }

    #[must_use]
    pub fn seed(&self) -> Option<u64> {
        match self {
            Self::Seeded { seed, .. } => Some(*seed),
            _ => None,
        }
    }

    /// Recorded values left, for the explicit strategy only.
    #[must_use]
    pub fn remaining(&self) -> Option<usize> {
        match self {
            Self::Explicit { values, cursor } => Some(values.len().saturating_sub(*cursor)),
            _ => None,
        }
    }

    /// Uniform draw in `[0, 1)` (explicit values may hit `1.0`).
    pub fn random(&mut self) -> Result<f64> {
        match self {
            Self::System(rng) | Self::Seeded { rng, .. } => Ok(rng.gen::<f64>()),
            Self::Explicit { values, cursor } => {
                let value = values
                    .get(*cursor)
                    .copied()
                    .ok_or(SimError::RandomnessExhausted { consumed: *cursor })?;
                if !value.is_finite() {
                    return Err(SimError::invariant(format!(
                        "recorded value {value} at position {cursor} is not finite"
                    )));
                }
                *cursor += 1;
                Ok(value.clamp(0.0, 1.0))
            }
        }
    }

    /// Uniform draw in `[low, high]`.
    pub fn uniform(&mut self, low: f64, high: f64) -> Result<f64> {
        let u = self.random()?;
        Ok(low + (high - low) * u)
    }

    /// Uniform integer in the inclusive range `[low, high]`.
    pub fn randint(&mut self, low: i64, high: i64) -> Result<i64> {
        if high < low {
            return Err(SimError::invariant(format!(
                "randint called with empty range [{low}, {high}]"
            )));
        }
        let span = (high - low + 1) as f64;
        let u = self.random()?;
        Ok((low + (u * span).floor() as i64).min(high))
    }

    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Result<Option<&'a T>> {
        if items.is_empty() {
            return Ok(None);
        }
        let idx = self.randint(0, items.len() as i64 - 1)?;
        Ok(items.get(idx as usize))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_streams_repeat() {
        let mut a = Randomness::seeded(7);
        let mut b = Randomness::seeded(7);
        for _ in 0..32 {
            assert_eq!(a.random().unwrap(), b.random().unwrap());
        }
        assert_eq!(a.seed(), Some(7));
        assert!(a.is_deterministic());
    }

    #[test]
    fn test_system_is_not_deterministic() {
        let rng = Randomness::system();
        assert!(!rng.is_deterministic());
        assert_eq!(rng.seed(), None);
    }

    #[test]
    fn test_explicit_replays_then_exhausts() {
        let mut rng = Randomness::explicit([0.25, 0.75]);
        assert_eq!(rng.random().unwrap(), 0.25);
        assert_eq!(rng.remaining(), Some(1));
        assert_eq!(rng.uniform(0.0, 4.0).unwrap(), 3.0);
        assert_eq!(
            rng.random(),
            Err(SimError::RandomnessExhausted { consumed: 2 })
        );
    }

    #[test]
    fn test_randint_stays_inclusive() {
        let mut rng = Randomness::explicit([0.0, 0.999, 1.0]);
        assert_eq!(rng.randint(2, 4).unwrap(), 2);
        assert_eq!(rng.randint(2, 4).unwrap(), 4);
        assert_eq!(rng.randint(2, 4).unwrap(), 4);
        assert!(rng.randint(5, 4).is_err());
    }

    #[test]
    fn test_explicit_rejects_non_finite() {
        let mut rng = Randomness::explicit([f64::NAN, f64::INFINITY]);
        assert!(matches!(rng.randint(0, 9), Err(SimError::Invariant(_))));
        assert_eq!(rng.remaining(), Some(2));

        let mut rng = Randomness::explicit([f64::NEG_INFINITY]);
        assert!(matches!(rng.uniform(0.0, 1.0), Err(SimError::Invariant(_))));
    }

    #[test]
    fn test_choose() {
        let mut rng = Randomness::explicit([0.5]);
        let items = ["a", "b", "c"];
        assert_eq!(rng.choose(&items).unwrap(), Some(&"b"));
        let empty: [u8; 0] = [];
        assert_eq!(rng.choose(&empty).unwrap(), None);
    }
}
