use crate::model::world::World;
use anyhow::Context;
use beans_core::bean::Bean;
use beans_core::config::AppConfig;
use beans_core::energy::create_energy_system;
use beans_core::environment::Environment;
use beans_core::food::create_food_manager;
use beans_core::metrics::Metrics;
use beans_core::placement::create_placement_strategy;
use beans_core::population::create_population_estimator;
use beans_core::survival::SurvivalManager;
use beans_core::Randomness;
use beans_data::{BeanId, Sex};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

impl World {
    /// Validates `config` and spawns the initial population.
    ///
    /// Randomness comes from `config.world.seed` when set, system entropy
    /// otherwise. Without an `environment` the world reads intake and
    /// temperature straight from configuration.
    pub fn new(config: AppConfig, environment: Option<Box<dyn Environment>>) -> anyhow::Result<Self> {
        let rng = Randomness::from_seed(config.world.seed);
        Self::with_randomness(config, environment, rng)
    }

    /// Like [`World::new`] with a caller-supplied random source.
    pub fn with_randomness(
        config: AppConfig,
        environment: Option<Box<dyn Environment>>,
        mut rng: Randomness,
    ) -> anyhow::Result<Self> {
        config.validate().context("Invalid world configuration")?;

        let beans_config = Arc::new(config.beans.clone());
        let estimator = create_population_estimator(&config.world.population_estimator);
        let (male_count, female_count) = estimator.estimate(
            config.world.width,
            config.world.height,
            config.beans.initial_bean_size,
            config.world.population_density,
            config.world.male_female_ratio,
        );

        let total = male_count + female_count;
        let mut beans = Vec::with_capacity(total);
        for i in 0..total {
            let id = BeanId::try_from(i).context("Population exceeds the bean id range")?;
            let sex = if i < male_count { Sex::Male } else { Sex::Female };
            let bean = Bean::spawn(Arc::clone(&beans_config), id, sex, &mut rng)
                .with_context(|| format!("Failed to spawn bean {id}"))?;
            beans.push(bean);
        }

        let placement = create_placement_strategy(
            &config.world.placement_strategy,
            config.world.packing_efficiency,
        )?;
        let food = create_food_manager(&config)?;
        let energy_system = create_energy_system(&config.world.energy_system)?;

        info!(
            width = config.world.width,
            height = config.world.height,
            male = male_count,
            female = female_count,
            estimator = estimator.name(),
            placement = placement.name(),
            food = food.name(),
            deterministic = rng.is_deterministic(),
            fingerprint = %config.fingerprint(),
            "World created"
        );

        Ok(Self {
            config,
            beans,
            round: 0,
            rng,
            environment,
            food,
            energy_system,
            survival: SurvivalManager::default(),
            placement,
            pending_intake: BTreeMap::new(),
            metrics: Metrics::new(),
        })
    }
}
