//! Core data structures for the bean simulation.

pub mod entity;
pub mod food;
pub mod genotype;
