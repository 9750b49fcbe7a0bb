//! The live simulation entity.
//!
//! A [`Bean`] never exposes its mutable fields. Subsystems take a
//! [`BeanState`] snapshot, edit it and hand it back through
//! [`Bean::update_from_state`], which is the only place live state changes.

use crate::config::BeansConfig;
use crate::error::{Result, SimError};
use crate::genetics::{self, Phenotype};
use crate::randomness::Randomness;
use beans_data::{BeanId, BeanState, Genotype, Sex, StateUpdate};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Bean {
    config: Arc<BeansConfig>,
    id: BeanId,
    sex: Sex,
    genotype: Genotype,
    state: BeanState,
    max_age: f64,
    max_speed: f64,
}

impl Bean {
    pub fn new(
        config: Arc<BeansConfig>,
        id: BeanId,
        sex: Sex,
        genotype: Genotype,
        phenotype: Phenotype,
    ) -> Self {
        let max_age = genetics::genetic_max_age(&config, &genotype);
        let max_speed = genetics::genetic_max_speed(&config, &genotype);
        let state = BeanState::new(
            id,
            phenotype.age,
            phenotype.speed,
            phenotype.energy,
            phenotype.size,
            phenotype.target_size,
        );
        debug!(
            id,
            ?sex,
            genotype = %genotype,
            speed = phenotype.speed,
            energy = phenotype.energy,
            size = phenotype.size,
            "Bean created"
        );
        Self {
            config,
            id,
            sex,
            genotype,
            state,
            max_age,
            max_speed,
        }
    }

    /// Births a bean with a random genotype and jittered phenotype.
    pub fn spawn(
        config: Arc<BeansConfig>,
        id: BeanId,
        sex: Sex,
        rng: &mut Randomness,
    ) -> Result<Self> {
        let genotype = genetics::create_random_genotype(rng)?;
        let phenotype = genetics::create_phenotype(&config, &genotype, rng)?;
        Ok(Self::new(config, id, sex, genotype, phenotype))
    }

    #[must_use]
    pub fn to_state(&self) -> BeanState {
        self.state.clone()
    }

    /// Commits a snapshot taken from this bean.
    pub fn update_from_state(&mut self, state: BeanState) -> Result<()> {
        if state.id() != self.id {
            return Err(SimError::invariant(format!(
                "bean {} cannot commit a snapshot of bean {}",
                self.id,
                state.id()
            )));
        }
        self.state = state;
        Ok(())
    }

    fn apply(&mut self, update: StateUpdate) {
        self.state.store(update);
    }

    pub fn die(&mut self) {
        self.apply(StateUpdate::new().alive(false));
    }

    #[must_use]
    pub fn can_survive_age(&self) -> bool {
        self.state.age() < self.max_age
    }

    #[must_use]
    pub fn config(&self) -> &BeansConfig {
        &self.config
    }

    #[must_use]
    pub fn id(&self) -> BeanId {
        self.id
    }

    #[must_use]
    pub fn sex(&self) -> Sex {
        self.sex
    }

    #[must_use]
    pub fn is_male(&self) -> bool {
        self.sex == Sex::Male
    }

    #[must_use]
    pub fn is_female(&self) -> bool {
        self.sex == Sex::Female
    }

    #[must_use]
    pub fn genotype(&self) -> &Genotype {
        &self.genotype
    }

    #[must_use]
    pub fn max_age(&self) -> f64 {
        self.max_age
    }

    #[must_use]
    pub fn max_speed(&self) -> f64 {
        self.max_speed
    }

    #[must_use]
    pub fn age(&self) -> f64 {
        self.state.age()
    }

    #[must_use]
    pub fn speed(&self) -> f64 {
        self.state.speed()
    }

    #[must_use]
    pub fn energy(&self) -> f64 {
        self.state.energy()
    }

    #[must_use]
    pub fn size(&self) -> f64 {
        self.state.size()
    }

    #[must_use]
    pub fn target_size(&self) -> f64 {
        self.state.target_size()
    }

    #[must_use]
    pub fn alive(&self) -> bool {
        self.state.alive()
    }
}
