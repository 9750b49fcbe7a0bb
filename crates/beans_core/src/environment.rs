//! Ambient conditions the world queries once per tick.

use crate::config::{AppConfig, BeansConfig, EnvironmentConfig};
use crate::error::{Result, SimError};

pub trait Environment: std::fmt::Debug {
    fn name(&self) -> &'static str;

    /// Advances ambient state by one tick.
    fn step(&mut self);

    /// Energy every bean receives this tick before food.
    fn get_energy_intake(&self) -> f64;

    fn get_temperature(&self) -> f64;
}

/// Constant conditions read straight from configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultEnvironment {
    energy_intake: f64,
    temperature: f64,
    ticks: u64,
}

impl DefaultEnvironment {
    #[must_use]
    pub fn new(env: &EnvironmentConfig, beans: &BeansConfig) -> Self {
        Self {
            energy_intake: beans.energy_gain_per_step,
            temperature: (env.temp_min + env.temp_max) / 2.0,
            ticks: 0,
        }
    }

    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl Environment for DefaultEnvironment {
    fn name(&self) -> &'static str {
        "default"
    }

    fn step(&mut self) {
        self.ticks += 1;
    }

    fn get_energy_intake(&self) -> f64 {
        self.energy_intake
    }

    fn get_temperature(&self) -> f64 {
        self.temperature
    }
}

pub fn create_environment(config: &AppConfig) -> Result<Box<dyn Environment>> {
    match config.environment.environment.to_ascii_lowercase().as_str() {
        "default" | "" => Ok(Box::new(DefaultEnvironment::new(
            &config.environment,
            &config.beans,
        ))),
        _ => Err(SimError::unknown(
            "environment",
            config.environment.environment.as_str(),
        )),
    }
}
