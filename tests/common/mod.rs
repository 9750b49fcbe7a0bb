pub mod macros;

use beans_core::Randomness;
use beans_lib::app::App;
use beans_lib::model::config::AppConfig;
use beans_lib::model::world::World;

/// Small, seeded world: 100x100 at density 0.05 gives 20 beans.
#[allow(dead_code)]
pub struct WorldBuilder {
    config: AppConfig,
    rng: Option<Randomness>,
}

#[allow(dead_code)]
impl WorldBuilder {
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.world.width = 100;
        config.world.height = 100;
        config.world.population_density = 0.05;
        config.world.seed = Some(42);
        Self { config, rng: None }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.world.seed = Some(seed);
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.config.world.width = width;
        self.config.world.height = height;
        self
    }

    pub fn with_density(mut self, density: f64) -> Self {
        self.config.world.population_density = density;
        self
    }

    /// Lifespan cap in rounds, via the year calendar.
    pub fn with_lifespan(mut self, years: u32, rounds_per_year: u32) -> Self {
        self.config.world.max_age_years = years;
        self.config.world.rounds_per_year = rounds_per_year;
        self.config.derive_max_age_rounds();
        self
    }

    pub fn with_config<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        modifier(&mut self.config);
        self
    }

    pub fn with_randomness(mut self, rng: Randomness) -> Self {
        self.rng = Some(rng);
        self
    }

    pub fn config(&self) -> AppConfig {
        self.config.clone()
    }

    pub fn build(self) -> World {
        let world = match self.rng {
            Some(rng) => World::with_randomness(self.config, None, rng),
            None => World::new(self.config, None),
        };
        world.expect("Failed to build world")
    }

    pub fn build_app(self) -> App {
        App::new(self.config).expect("Failed to build app")
    }
}
