use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable bean identifier, assigned in creation order.
pub type BeanId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
}

/// Why a bean left the alive set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    /// Age reached the genetic maximum.
    MaxAge,
    /// Energy depleted with no fat reserve left.
    Starvation,
    /// Reserved for an obesity rule; nothing ships that produces it.
    Obesity,
}

impl Reason {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Reason::MaxAge => "max_age_reached",
            Reason::Starvation => "energy_depleted",
            Reason::Obesity => "obesity",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of a bean's mutable attributes.
///
/// Obtained from `Bean::to_state`, edited with [`BeanState::store`] and
/// written back through `Bean::update_from_state`. The id is fixed when the
/// snapshot is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeanState {
    id: BeanId,
    age: f64,
    speed: f64,
    energy: f64,
    size: f64,
    target_size: f64,
    alive: bool,
}

impl BeanState {
    #[must_use]
    pub fn new(id: BeanId, age: f64, speed: f64, energy: f64, size: f64, target_size: f64) -> Self {
        Self {
            id,
            age,
            speed,
            energy,
            size,
            target_size,
            alive: true,
        }
    }

    /// Applies every field set in `update`, leaving the rest untouched.
    pub fn store(&mut self, update: StateUpdate) {
        if let Some(age) = update.age {
            self.age = age;
        }
        if let Some(speed) = update.speed {
            self.speed = speed;
        }
        if let Some(energy) = update.energy {
            self.energy = energy;
        }
        if let Some(size) = update.size {
            self.size = size;
        }
        if let Some(target_size) = update.target_size {
            self.target_size = target_size;
        }
        if let Some(alive) = update.alive {
            self.alive = alive;
        }
    }

    #[must_use]
    pub fn id(&self) -> BeanId {
        self.id
    }

    #[must_use]
    pub fn age(&self) -> f64 {
        self.age
    }

    #[must_use]
    pub fn speed(&self) -> f64 {
        self.speed
    }

    #[must_use]
    pub fn energy(&self) -> f64 {
        self.energy
    }

    #[must_use]
    pub fn size(&self) -> f64 {
        self.size
    }

    #[must_use]
    pub fn target_size(&self) -> f64 {
        self.target_size
    }

    #[must_use]
    pub fn alive(&self) -> bool {
        self.alive
    }
}

/// Partial field set for [`BeanState::store`].
///
/// ```
/// use beans_data::{BeanState, StateUpdate};
///
/// let mut state = BeanState::new(7, 0.0, 1.0, 100.0, 5.0, 5.0);
/// state.store(StateUpdate::new().energy(0.0).size(3.0));
/// assert_eq!(state.energy(), 0.0);
/// assert_eq!(state.speed(), 1.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StateUpdate {
    pub age: Option<f64>,
    pub speed: Option<f64>,
    pub energy: Option<f64>,
    pub size: Option<f64>,
    pub target_size: Option<f64>,
    pub alive: Option<bool>,
}

impl StateUpdate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn age(mut self, age: f64) -> Self {
        self.age = Some(age);
        self
    }

    #[must_use]
    pub fn speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }

    #[must_use]
    pub fn energy(mut self, energy: f64) -> Self {
        self.energy = Some(energy);
        self
    }

    #[must_use]
    pub fn size(mut self, size: f64) -> Self {
        self.size = Some(size);
        self
    }

    #[must_use]
    pub fn target_size(mut self, target_size: f64) -> Self {
        self.target_size = Some(target_size);
        self
    }

    #[must_use]
    pub fn alive(mut self, alive: bool) -> Self {
        self.alive = Some(alive);
        self
    }
}
