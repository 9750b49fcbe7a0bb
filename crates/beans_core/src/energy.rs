//! Per-tick metabolism.
//!
//! An [`EnergySystem`] maps `(bean, intake)` to the candidate state for the
//! next tick without touching the bean. The world commits the candidate and
//! then hands it to survival.

use crate::bean::Bean;
use crate::dynamics::calculate_speed;
use crate::error::{Result, SimError};
use crate::genetics::size_target;
use beans_data::{BeanState, Gene, StateUpdate};
use tracing::debug;

pub trait EnergySystem: std::fmt::Debug {
    fn name(&self) -> &'static str;

    fn apply(&self, bean: &Bean, intake: f64) -> BeanState;
}

/// Intake, basal burn, movement cost, fat exchange, clamp, speed, age.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardEnergySystem;

impl EnergySystem for StandardEnergySystem {
    fn name(&self) -> &'static str {
        "standard"
    }

    fn apply(&self, bean: &Bean, intake: f64) -> BeanState {
        let config = bean.config();
        let genotype = bean.genotype();
        let metabolism = genotype.gene(Gene::MetabolismSpeed);
        let fat_accumulation = genotype.gene(Gene::FatAccumulation);
        let age = bean.age();

        let target_size = size_target(age, genotype, config);
        let mut energy = bean.energy() + intake;
        let mut size = bean.size();

        let basal = config.metabolism_base_burn * (1.0 + 0.5 * metabolism) * size;
        energy -= basal;

        let movement = bean.speed().abs() * config.energy_cost_per_speed;
        energy -= movement;

        let available_fat = |size: f64| (size - config.min_bean_size).max(0.0);

        if energy > config.energy_baseline {
            let surplus = energy - config.energy_baseline;
            let fat = config.fat_gain_rate * fat_accumulation * surplus;
            size += fat;
            energy -= fat * config.energy_to_fat_ratio;
        } else if energy < config.energy_baseline {
            let deficit = config.energy_baseline - energy;
            let burn = (config.fat_burn_rate * fat_accumulation * deficit).min(available_fat(size));
            size -= burn;
            energy += burn * config.fat_to_energy_ratio;
        }

        if energy < 0.0 {
            let needed = -energy / config.fat_to_energy_ratio;
            let burn = needed.min(available_fat(size));
            size -= burn;
            energy += burn * config.fat_to_energy_ratio;
        }

        let size = size.clamp(config.min_bean_size, config.max_bean_size);
        let energy = energy.clamp(0.0, config.energy_max_storage);
        let speed = calculate_speed(bean, age, size, target_size);

        debug!(
            id = bean.id(),
            intake,
            basal,
            movement,
            energy,
            size,
            speed,
            "Energy step"
        );

        let mut state = bean.to_state();
        state.store(
            StateUpdate::new()
                .target_size(target_size)
                .energy(energy)
                .size(size)
                .speed(speed)
                .age(age + 1.0),
        );
        state
    }
}

pub fn create_energy_system(name: &str) -> Result<Box<dyn EnergySystem>> {
    match name.to_ascii_lowercase().as_str() {
        "standard" | "" => Ok(Box::new(StandardEnergySystem)),
        _ => Err(SimError::unknown("energy system", name)),
    }
}
