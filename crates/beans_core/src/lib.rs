//! # Beans Core
//!
//! Simulation engine for a population of "beans": small circular organisms
//! that move, eat, grow, collide and die inside a bounded 2D arena.
//!
//! This crate contains the deterministic simulation logic, including:
//! - Genotype and phenotype derivation
//! - Per-tick metabolism and survival rules
//! - Initial population sizing and placement
//! - Food ecology on a sparse grid
//! - Wall bounces and bean-bean collisions
//! - Metrics collection and structured logging
//!
//! ## Determinism
//!
//! Every random draw goes through one [`Randomness`] value owned by the
//! caller. A seeded or explicit source makes a whole run reproducible.
//!
//! ## Example
//!
//! ```
//! use beans_core::bean::Bean;
//! use beans_core::config::BeansConfig;
//! use beans_core::Randomness;
//! use beans_data::Sex;
//! use std::sync::Arc;
//!
//! let mut rng = Randomness::seeded(42);
//! let config = Arc::new(BeansConfig::default());
//! let bean = Bean::spawn(config, 0, Sex::Female, &mut rng).unwrap();
//! assert!(bean.alive());
//! assert!(bean.max_speed() >= 0.5);
//! ```

/// Bean entity: genotype, derived limits and the mutable state
pub mod bean;
/// Bean-bean and bean-food collision handling
pub mod collision;
/// Configuration sections, defaults and validation
pub mod config;
/// Speed model and wall-bounded movement
pub mod dynamics;
/// Per-tick metabolism
pub mod energy;
/// Ambient energy intake and temperature
pub mod environment;
pub mod error;
/// Food spawning, decay and consumption
pub mod food;
/// Gene curves, phenotype derivation and growth
pub mod genetics;
/// Run statistics and logging setup
pub mod metrics;
/// Initial position generation
pub mod placement;
/// Initial population sizing
pub mod population;
pub mod randomness;
/// Spatial hashing for neighbourhood queries
pub mod spatial_hash;
/// Survival rules and the death log
pub mod survival;

pub use error::{Result, SimError};
pub use metrics::{init_logging, Metrics};
pub use randomness::Randomness;
