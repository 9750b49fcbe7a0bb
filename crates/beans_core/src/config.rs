//! Configuration for the arena, the beans and the environment.
//!
//! Every section is `#[serde(default)]`, so a partial file only overrides
//! the keys it names. Files are TOML or JSON, picked by extension in
//! [`AppConfig::load`].
//!
//! ## Example `beans.toml`
//!
//! ```toml
//! [world]
//! width = 400
//! height = 300
//! population_density = 0.05
//! seed = 42
//!
//! [beans]
//! speed_min = 1.0
//! speed_max = 6.0
//!
//! [environment]
//! food_density = 0.001
//! food_distribution = "clustered"
//! ```

use crate::error::{ensure_config, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Arena and population-level parameters.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    pub width: u32,
    pub height: u32,
    /// Males per female when splitting the estimated population.
    pub male_female_ratio: f64,
    /// Beans per unit of area, before dividing by bean footprint.
    pub population_density: f64,
    pub placement_strategy: String,
    pub population_estimator: String,
    pub energy_system: String,
    /// Fraction of ideal circle packing assumed reachable by placement.
    pub packing_efficiency: f64,
    pub max_age_years: u32,
    pub rounds_per_year: u32,
    pub seed: Option<u64>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            male_female_ratio: 1.0,
            population_density: 0.1,
            placement_strategy: "random".to_string(),
            population_estimator: "density".to_string(),
            energy_system: "standard".to_string(),
            packing_efficiency: 0.5,
            max_age_years: 100,
            rounds_per_year: 12,
            seed: None,
        }
    }
}

/// Per-bean biology: speed, energy, fat, survival and collision damage.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct BeansConfig {
    pub speed_min: f64,
    pub speed_max: f64,
    /// Derived from `max_age_years * rounds_per_year` when loading a file.
    pub max_age_rounds: u32,
    pub initial_energy: f64,
    pub energy_gain_per_step: f64,
    pub energy_cost_per_speed: f64,
    pub min_speed_factor: f64,
    pub initial_bean_size: f64,
    pub min_bean_size: f64,
    pub base_bean_size: f64,
    pub max_bean_size: f64,
    pub energy_baseline: f64,
    pub fat_gain_rate: f64,
    pub fat_burn_rate: f64,
    pub starvation_base_depletion: f64,
    pub starvation_depletion_multiplier: f64,
    pub metabolism_base_burn: f64,
    pub energy_to_fat_ratio: f64,
    pub fat_to_energy_ratio: f64,
    pub energy_max_storage: f64,
    pub size_sigma_frac: f64,
    pub size_penalty_above_k: f64,
    pub size_penalty_below_k: f64,
    pub size_penalty_min_above: f64,
    pub size_penalty_min_below: f64,
    pub pixels_per_unit_speed: f64,
    pub energy_loss_on_bounce: f64,
    pub collision_enable: bool,
    pub collision_base_damage: f64,
    pub collision_damage_speed_factor: f64,
    pub collision_min_damage: f64,
    pub collision_damage_size_exponent: f64,
    /// Damage multipliers as `[female, male]`.
    pub collision_damage_sex_factors: [f64; 2],
}

impl Default for BeansConfig {
    fn default() -> Self {
        Self {
            speed_min: 0.5,
            speed_max: 8.0,
            max_age_rounds: 1200,
            initial_energy: 100.0,
            energy_gain_per_step: 1.0,
            energy_cost_per_speed: 0.1,
            min_speed_factor: 0.07,
            initial_bean_size: 5.0,
            min_bean_size: 3.0,
            base_bean_size: 6.0,
            max_bean_size: 16.0,
            energy_baseline: 50.0,
            fat_gain_rate: 0.02,
            fat_burn_rate: 0.02,
            starvation_base_depletion: 1.0,
            starvation_depletion_multiplier: 1.0,
            metabolism_base_burn: 0.01,
            energy_to_fat_ratio: 1.0,
            fat_to_energy_ratio: 0.9,
            energy_max_storage: 200.0,
            size_sigma_frac: 0.15,
            size_penalty_above_k: 0.20,
            size_penalty_below_k: 0.15,
            size_penalty_min_above: 0.3,
            size_penalty_min_below: 0.4,
            pixels_per_unit_speed: 1.0,
            energy_loss_on_bounce: 2.0,
            collision_enable: true,
            collision_base_damage: 5.0,
            collision_damage_speed_factor: 0.05,
            collision_min_damage: 0.5,
            collision_damage_size_exponent: 1.0,
            collision_damage_sex_factors: [1.05, 1.0],
        }
    }
}

impl BeansConfig {
    #[must_use]
    pub fn female_damage_factor(&self) -> f64 {
        self.collision_damage_sex_factors[0]
    }

    #[must_use]
    pub fn male_damage_factor(&self) -> f64 {
        self.collision_damage_sex_factors[1]
    }
}

/// Food field and ambient conditions.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub food_manager: String,
    /// `random` or `clustered`.
    pub food_distribution: String,
    /// Food items per unit of area targeted by spawning.
    pub food_density: f64,
    /// Energy in one food item, and the most a single bite can take.
    pub food_quality: f64,
    /// Rounds a carcass lasts before it is removed.
    pub decomposition_rounds: u32,
    pub temp_min: f64,
    pub temp_max: f64,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: "default".to_string(),
            food_manager: "hybrid".to_string(),
            food_distribution: "random".to_string(),
            food_density: 0.0005,
            food_quality: 10.0,
            decomposition_rounds: 3,
            temp_min: 0.0,
            temp_max: 100.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub world: WorldConfig,
    pub beans: BeansConfig,
    pub environment: EnvironmentConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let mut config = Self {
            world: WorldConfig::default(),
            beans: BeansConfig::default(),
            environment: EnvironmentConfig::default(),
        };
        config.derive_max_age_rounds();
        config
    }
}

impl AppConfig {
    /// Validates every section, failing on the first bad value.
    pub fn validate(&self) -> Result<()> {
        let w = &self.world;
        ensure_config!(w.width > 0, "World width must be > 0, got {}", w.width);
        ensure_config!(w.height > 0, "World height must be > 0, got {}", w.height);
        ensure_config!(
            w.population_density > 0.0,
            "Population density must be > 0, got {}",
            w.population_density
        );
        ensure_config!(
            w.male_female_ratio > 0.0,
            "Male/female ratio must be > 0, got {}",
            w.male_female_ratio
        );
        ensure_config!(
            w.packing_efficiency > 0.0 && w.packing_efficiency <= 1.0,
            "packing_efficiency must be in (0.0, 1.0], got {}",
            w.packing_efficiency
        );
        ensure_config!(w.max_age_years > 0, "max_age_years must be > 0");
        ensure_config!(w.rounds_per_year > 0, "rounds_per_year must be > 0");

        let b = &self.beans;
        ensure_config!(
            b.speed_min <= b.speed_max,
            "speed_min ({}) cannot be greater than speed_max ({})",
            b.speed_min,
            b.speed_max
        );
        ensure_config!(
            b.speed_min != 0.0 && b.speed_max != 0.0,
            "speed_min and speed_max must be non-zero, got {} and {}",
            b.speed_min,
            b.speed_max
        );
        for (name, value) in [
            ("initial_energy", b.initial_energy),
            ("energy_gain_per_step", b.energy_gain_per_step),
            ("energy_cost_per_speed", b.energy_cost_per_speed),
            ("energy_loss_on_bounce", b.energy_loss_on_bounce),
            ("fat_gain_rate", b.fat_gain_rate),
            ("fat_burn_rate", b.fat_burn_rate),
            ("metabolism_base_burn", b.metabolism_base_burn),
            ("starvation_base_depletion", b.starvation_base_depletion),
            ("starvation_depletion_multiplier", b.starvation_depletion_multiplier),
            ("collision_base_damage", b.collision_base_damage),
            ("collision_damage_speed_factor", b.collision_damage_speed_factor),
            ("collision_min_damage", b.collision_min_damage),
            ("collision_damage_size_exponent", b.collision_damage_size_exponent),
        ] {
            ensure_config!(value >= 0.0, "{name} must be >= 0.0, got {value}");
        }
        for (name, value) in [
            ("initial_bean_size", b.initial_bean_size),
            ("min_bean_size", b.min_bean_size),
            ("pixels_per_unit_speed", b.pixels_per_unit_speed),
            ("energy_to_fat_ratio", b.energy_to_fat_ratio),
            ("fat_to_energy_ratio", b.fat_to_energy_ratio),
            ("energy_max_storage", b.energy_max_storage),
            ("size_sigma_frac", b.size_sigma_frac),
        ] {
            ensure_config!(value > 0.0, "{name} must be > 0.0, got {value}");
        }
        for (name, value) in [
            ("min_speed_factor", b.min_speed_factor),
            ("size_penalty_min_above", b.size_penalty_min_above),
            ("size_penalty_min_below", b.size_penalty_min_below),
        ] {
            ensure_config!(
                (0.0..=1.0).contains(&value),
                "{name} must be between 0.0 and 1.0, got {value}"
            );
        }
        ensure_config!(
            b.min_bean_size <= b.max_bean_size,
            "min_bean_size ({}) cannot exceed max_bean_size ({})",
            b.min_bean_size,
            b.max_bean_size
        );
        ensure_config!(
            b.collision_damage_sex_factors.iter().all(|f| *f >= 0.0),
            "collision_damage_sex_factors values must be >= 0.0, got {:?}",
            b.collision_damage_sex_factors
        );

        let e = &self.environment;
        ensure_config!(
            e.food_density >= 0.0,
            "food_density must be >= 0.0, got {}",
            e.food_density
        );
        ensure_config!(
            e.food_quality > 0.0,
            "food_quality must be > 0.0, got {}",
            e.food_quality
        );
        ensure_config!(
            e.decomposition_rounds > 0,
            "decomposition_rounds must be > 0"
        );
        ensure_config!(
            e.temp_min <= e.temp_max,
            "temp_min ({}) cannot exceed temp_max ({})",
            e.temp_min,
            e.temp_max
        );

        Ok(())
    }

    /// Recomputes `beans.max_age_rounds` from the world's calendar.
    pub fn derive_max_age_rounds(&mut self) {
        self.beans.max_age_rounds = self
            .world
            .max_age_years
            .saturating_mul(self.world.rounds_per_year);
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let mut config = toml::from_str::<Self>(content)?;
        config.derive_max_age_rounds();
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        let mut config = serde_json::from_str::<Self>(content)?;
        config.derive_max_age_rounds();
        config.validate()?;
        Ok(config)
    }

    /// Loads a `.json` or `.toml` file; other extensions are read as TOML.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Configuration file not found: {}", path.display()))?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let config = if is_json {
            Self::from_json(&content)
        } else {
            Self::from_toml(&content)
        };
        config.with_context(|| format!("Invalid configuration in {}", path.display()))
    }

    #[must_use]
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(format!("{:?}", self.world).as_bytes());
        hasher.update(format!("{:?}", self.beans).as_bytes());
        hasher.update(format!("{:?}", self.environment).as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimError;

    #[test]
    fn test_default_config_validates() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.beans.max_age_rounds, 1200);
    }

    #[test]
    fn test_invalid_world_width() {
        let config = AppConfig {
            world: WorldConfig {
                width: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(SimError::Config(_))));
    }

    #[test]
    fn test_speed_min_above_max_rejected() {
        let config = AppConfig {
            beans: BeansConfig {
                speed_min: 5.0,
                speed_max: 1.0,
                ..Default::default()
            },
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("speed_min"));
    }

    #[test]
    fn test_zero_speed_rejected() {
        let config = AppConfig {
            beans: BeansConfig {
                speed_min: 0.0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_min_speed_factor_out_of_range() {
        let config = AppConfig {
            beans: BeansConfig {
                min_speed_factor: 1.5,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_negative_sex_factor_rejected() {
        let config = AppConfig {
            beans: BeansConfig {
                collision_damage_sex_factors: [1.0, -0.5],
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults_and_derives_age() {
        let config = AppConfig::from_toml(
            r#"
            [world]
            width = 200
            max_age_years = 10
            rounds_per_year = 6

            [beans]
            speed_max = 4.0
            "#,
        )
        .unwrap();
        assert_eq!(config.world.width, 200);
        assert_eq!(config.world.height, 600);
        assert_eq!(config.beans.speed_max, 4.0);
        assert_eq!(config.beans.max_age_rounds, 60);
    }

    #[test]
    fn test_from_json() {
        let config = AppConfig::from_json(
            r#"{"world": {"seed": 9}, "environment": {"food_quality": 4.0}}"#,
        )
        .unwrap();
        assert_eq!(config.world.seed, Some(9));
        assert_eq!(config.environment.food_quality, 4.0);
    }

    #[test]
    fn test_invalid_file_values_fail_fast() {
        let err = AppConfig::from_toml("[world]\nheight = 0\n").unwrap_err();
        assert!(err.downcast_ref::<SimError>().is_some());
    }

    #[test]
    fn test_fingerprint_consistency() {
        let config1 = AppConfig::default();
        let config2 = AppConfig::default();
        assert_eq!(config1.fingerprint(), config2.fingerprint());

        let mut config3 = AppConfig::default();
        config3.beans.speed_max = 9.0;
        assert_ne!(config1.fingerprint(), config3.fingerprint());
    }
}
