use beans_core::bean::Bean;
use beans_core::config::AppConfig;
use beans_core::energy::EnergySystem;
use beans_core::environment::Environment;
use beans_core::food::FoodManager;
use beans_core::metrics::Metrics;
use beans_core::placement::PlacementStrategy;
use beans_core::survival::{DeathRecord, SurvivalManager};
use beans_core::Randomness;
use beans_data::BeanId;
use std::collections::BTreeMap;
use tracing::warn;

pub mod init;
pub mod state;
pub mod update;

pub use state::WorldState;

/// Owns the population, the food field and the random source, and advances
/// them one round at a time.
#[derive(Debug)]
pub struct World {
    config: AppConfig,
    beans: Vec<Bean>,
    round: u64,
    rng: Randomness,
    environment: Option<Box<dyn Environment>>,
    food: Box<dyn FoodManager>,
    energy_system: Box<dyn EnergySystem>,
    survival: SurvivalManager,
    placement: Box<dyn PlacementStrategy>,
    /// Food eaten since the last step, by bean.
    pending_intake: BTreeMap<BeanId, f64>,
    metrics: Metrics,
}

impl World {
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Alive beans in id order.
    #[must_use]
    pub fn beans(&self) -> &[Bean] {
        &self.beans
    }

    /// Mutable view for frame-level movement and collisions. The set itself
    /// only changes in [`World::step`].
    pub fn beans_mut(&mut self) -> &mut [Bean] {
        &mut self.beans
    }

    #[must_use]
    pub fn dead_beans(&self) -> &[DeathRecord] {
        self.survival.dead_beans()
    }

    #[must_use]
    pub fn round(&self) -> u64 {
        self.round
    }

    #[must_use]
    pub fn food(&self) -> &dyn FoodManager {
        self.food.as_ref()
    }

    pub fn food_mut(&mut self) -> &mut dyn FoodManager {
        self.food.as_mut()
    }

    #[must_use]
    pub fn placement_strategy(&self) -> &dyn PlacementStrategy {
        self.placement.as_ref()
    }

    #[must_use]
    pub fn environment(&self) -> Option<&dyn Environment> {
        self.environment.as_deref()
    }

    pub fn rng_mut(&mut self) -> &mut Randomness {
        &mut self.rng
    }

    #[must_use]
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Energy queued for `id` by [`World::feed`] and not yet applied.
    #[must_use]
    pub fn pending_intake(&self, id: BeanId) -> f64 {
        self.pending_intake.get(&id).copied().unwrap_or(0.0)
    }

    #[must_use]
    pub fn get_energy_intake(&self) -> f64 {
        match &self.environment {
            Some(environment) => environment.get_energy_intake(),
            None => self.config.beans.energy_gain_per_step,
        }
    }

    #[must_use]
    pub fn get_temperature(&self) -> f64 {
        match &self.environment {
            Some(environment) => environment.get_temperature(),
            None => (self.config.environment.temp_min + self.config.environment.temp_max) / 2.0,
        }
    }

    /// Spawn layout for the current population from the configured strategy.
    pub fn initial_positions(&mut self) -> anyhow::Result<Vec<(f64, f64)>> {
        let positions = self.placement.place(
            self.beans.len(),
            self.config.world.width,
            self.config.world.height,
            self.config.beans.initial_bean_size,
            &mut self.rng,
        )?;
        Ok(positions)
    }

    /// Drops every bean past the first `len`, for layouts that could not fit
    /// the whole population. Dropped beans are not recorded as deaths.
    pub fn truncate_population(&mut self, len: usize) {
        if len < self.beans.len() {
            warn!(
                kept = len,
                dropped = self.beans.len() - len,
                "Population truncated to placed beans"
            );
            self.beans.truncate(len);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beans_core::collision::FoodCollision;
    use beans_core::environment::DefaultEnvironment;
    use beans_data::{FoodCell, FoodType, Sex};

    fn small_config(seed: u64) -> AppConfig {
        let mut config = AppConfig::default();
        config.world.width = 100;
        config.world.height = 100;
        config.world.population_density = 0.05;
        config.world.seed = Some(seed);
        config
    }

    #[test]
    fn test_new_spawns_males_first() {
        // 100 * 100 * 0.05 / 25 = 20 beans, split 10/10
        let world = World::new(small_config(1), None).unwrap();
        assert_eq!(world.beans().len(), 20);
        assert_eq!(world.round(), 0);
        for (i, bean) in world.beans().iter().enumerate() {
            assert_eq!(bean.id() as usize, i);
            let expected = if i < 10 { Sex::Male } else { Sex::Female };
            assert_eq!(bean.sex(), expected);
        }
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = small_config(1);
        config.world.width = 0;
        assert!(World::new(config, None).is_err());
    }

    #[test]
    fn test_new_rejects_unknown_placement() {
        let mut config = small_config(1);
        config.world.placement_strategy = "spiral".to_string();
        assert!(World::new(config, None).is_err());
    }

    #[test]
    fn test_ambient_fallbacks() {
        let mut config = small_config(1);
        config.environment.temp_min = 10.0;
        config.environment.temp_max = 30.0;
        config.beans.energy_gain_per_step = 2.5;
        let world = World::new(config.clone(), None).unwrap();
        assert_eq!(world.get_energy_intake(), 2.5);
        assert_eq!(world.get_temperature(), 20.0);

        let env = DefaultEnvironment::new(&config.environment, &config.beans);
        let world = World::new(config, Some(Box::new(env))).unwrap();
        assert_eq!(world.environment().map(|e| e.name()), Some("default"));
        assert_eq!(world.get_temperature(), 20.0);
    }

    #[test]
    fn test_step_advances_round_and_ages() {
        let mut world = World::new(small_config(3), None).unwrap();
        let state = world.step(1.0 / 60.0).unwrap();
        assert_eq!(state.round, 1);
        assert_eq!(world.round(), 1);
        assert_eq!(state.alive.len(), world.beans().len());
        for bean in state.alive {
            assert_eq!(bean.age(), 1.0);
        }
    }

    #[test]
    fn test_feed_queues_intake() {
        let mut config = small_config(5);
        config.environment.food_quality = 4.0;
        let mut world = World::new(config, None).unwrap();
        let position = (7, 7);
        let hit = FoodCollision {
            bean_id: 0,
            food_type: FoodType::DeadBean,
            position,
        };
        world.food_mut().add_dead_bean_as_food(position, 10.0);
        assert_eq!(
            world.food().get_food_at(position),
            Some(&FoodCell::dead_bean(10.0))
        );

        let eaten = world.feed(&[hit, hit]);
        assert_eq!(eaten, 8.0);
        assert_eq!(world.pending_intake(0), 8.0);
        assert_eq!(world.pending_intake(1), 0.0);

        world.step(1.0).unwrap();
        assert_eq!(world.pending_intake(0), 0.0);
    }

    #[test]
    fn test_truncate_population() {
        let mut world = World::new(small_config(1), None).unwrap();
        world.truncate_population(5);
        assert_eq!(world.beans().len(), 5);
        assert!(world.dead_beans().is_empty());
    }
}
