use serde::{Deserialize, Serialize};

/// Integer cell coordinate on the food grid.
pub type GridPos = (i32, i32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoodType {
    /// Ambient food spawned by the field.
    Common,
    /// A decomposing carcass.
    DeadBean,
}

/// One unit of the food grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FoodCell {
    pub value: f64,
    pub food_type: FoodType,
    /// Decay rounds survived; only advanced for [`FoodType::DeadBean`].
    pub rounds: u32,
}

impl FoodCell {
    #[must_use]
    pub fn common(value: f64) -> Self {
        Self {
            value,
            food_type: FoodType::Common,
            rounds: 0,
        }
    }

    #[must_use]
    pub fn dead_bean(value: f64) -> Self {
        Self {
            value,
            food_type: FoodType::DeadBean,
            rounds: 0,
        }
    }
}
