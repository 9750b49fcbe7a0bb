//! Plain data types shared by the bean simulation crates.
//!
//! Nothing in here knows about configuration or randomness; the logic that
//! derives these values lives in `beans_core`.

pub mod data;

pub use data::entity::{BeanId, BeanState, Reason, Sex, StateUpdate};
pub use data::food::{FoodCell, FoodType, GridPos};
pub use data::genotype::{Gene, Genotype, GenotypeError};
