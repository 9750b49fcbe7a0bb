//! Run statistics and logging setup.
//!
//! [`Metrics`] is fed once per round by the world and emits an `info!`
//! summary every `log_interval` rounds.

use beans_data::Reason;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

pub const DEFAULT_LOG_INTERVAL: u64 = 100;

pub struct Metrics {
    rounds: AtomicU64,
    population: AtomicU64,
    /// `f64` bits of the latest food total.
    food_energy: AtomicU64,
    deaths: Mutex<HashMap<Reason, u64>>,
    log_interval: u64,
    start_time: Instant,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics")
            .field("rounds", &self.rounds())
            .field("population", &self.population())
            .field("food_energy", &self.food_energy())
            .field("deaths", &self.total_deaths())
            .finish()
    }
}

impl Metrics {
    #[must_use]
    pub fn new() -> Self {
        Self::with_log_interval(DEFAULT_LOG_INTERVAL)
    }

    /// A zero interval disables the periodic summary.
    #[must_use]
    pub fn with_log_interval(log_interval: u64) -> Self {
        Self {
            rounds: AtomicU64::new(0),
            population: AtomicU64::new(0),
            food_energy: AtomicU64::new(0f64.to_bits()),
            deaths: Mutex::new(HashMap::new()),
            log_interval,
            start_time: Instant::now(),
        }
    }

    /// Records a finished round.
    pub fn record_round<'a, I>(&self, duration: Duration, population: usize, food_energy: f64, deaths: I)
    where
        I: IntoIterator<Item = &'a Reason>,
    {
        let round = self.rounds.fetch_add(1, Ordering::Relaxed) + 1;
        self.population.store(population as u64, Ordering::Relaxed);
        self.food_energy.store(food_energy.to_bits(), Ordering::Relaxed);
        {
            let mut tally = self.deaths.lock().unwrap_or_else(|e| e.into_inner());
            for reason in deaths {
                *tally.entry(*reason).or_insert(0) += 1;
            }
        }

        if self.log_interval > 0 && round % self.log_interval == 0 {
            tracing::info!(
                round,
                population,
                food_energy,
                deaths = self.total_deaths(),
                duration_us = duration.as_micros() as u64,
                "Simulation round"
            );
        }
    }

    #[must_use]
    pub fn rounds(&self) -> u64 {
        self.rounds.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn population(&self) -> u64 {
        self.population.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn food_energy(&self) -> f64 {
        f64::from_bits(self.food_energy.load(Ordering::Relaxed))
    }

    #[must_use]
    pub fn deaths(&self, reason: Reason) -> u64 {
        let tally = self.deaths.lock().unwrap_or_else(|e| e.into_inner());
        tally.get(&reason).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn total_deaths(&self) -> u64 {
        let tally = self.deaths.lock().unwrap_or_else(|e| e.into_inner());
        tally.values().sum()
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Installs the global fmt subscriber.
///
/// An explicit `level` (any `EnvFilter` directive) wins over `RUST_LOG`;
/// with neither set the filter is `info`. Calling this twice is harmless.
pub fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = Metrics::new();
        assert_eq!(metrics.rounds(), 0);
        assert_eq!(metrics.total_deaths(), 0);
    }

    #[test]
    fn test_record_round() {
        let metrics = Metrics::with_log_interval(1);
        metrics.record_round(Duration::from_millis(2), 40, 12.5, &[Reason::MaxAge]);
        metrics.record_round(
            Duration::from_millis(2),
            37,
            10.0,
            &[Reason::Starvation, Reason::Starvation, Reason::MaxAge],
        );
        assert_eq!(metrics.rounds(), 2);
        assert_eq!(metrics.population(), 37);
        assert_eq!(metrics.food_energy(), 10.0);
        assert_eq!(metrics.deaths(Reason::MaxAge), 2);
        assert_eq!(metrics.deaths(Reason::Starvation), 2);
        assert_eq!(metrics.deaths(Reason::Obesity), 0);
        assert_eq!(metrics.total_deaths(), 4);
    }

    #[test]
    fn test_init_logging_twice() {
        init_logging(Some("warn"));
        init_logging(None);
    }
}
