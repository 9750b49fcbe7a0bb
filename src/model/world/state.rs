use beans_core::survival::DeathRecord;
use beans_data::BeanState;
use serde::{Deserialize, Serialize};

/// What one call to [`World::step`](super::World::step) produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldState {
    /// Rounds completed, including this one.
    pub round: u64,
    /// Survivors in id order.
    pub alive: Vec<BeanState>,
    pub dead_this_tick: Vec<DeathRecord>,
}

impl WorldState {
    #[must_use]
    pub fn population(&self) -> usize {
        self.alive.len()
    }

    #[must_use]
    pub fn is_extinct(&self) -> bool {
        self.alive.is_empty()
    }
}
