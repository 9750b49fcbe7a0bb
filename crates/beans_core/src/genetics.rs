//! Gene curves and the trait derivations that hang off a genotype.
//!
//! Everything here is a pure function of `(config, genotype, age)` except the
//! two factories, which draw from the caller's [`Randomness`].

use crate::config::BeansConfig;
use crate::error::Result;
use crate::randomness::Randomness;
use beans_data::{Gene, Genotype};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Lifespan fraction granted by a zero `MAX_GENETIC_AGE` gene.
const AGE_CURVE_FLOOR: f64 = 0.1;
const AGE_CURVE_STEEPNESS: f64 = 5.0;
const SIZE_GROWTH_RATE: f64 = 5.0;
const BIRTH_JITTER: (f64, f64) = (0.95, 1.05);

/// Initial expression of a genotype at birth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Phenotype {
    pub age: f64,
    pub speed: f64,
    pub energy: f64,
    pub size: f64,
    pub target_size: f64,
}

/// Maps a raw `[0, 1]` draw onto a log curve that favours long lives.
///
/// `f(0) = 0.1`, `f(1) = 1.0`, `f(0.5) ≈ 0.73`.
#[must_use]
pub fn apply_age_gene_curve(raw: f64) -> f64 {
    let raw = raw.clamp(0.0, 1.0);
    let log_factor = (1.0 + AGE_CURVE_STEEPNESS * raw).ln() / (1.0 + AGE_CURVE_STEEPNESS).ln();
    AGE_CURVE_FLOOR + (1.0 - AGE_CURVE_FLOOR) * log_factor
}

#[must_use]
pub fn genetic_max_age(config: &BeansConfig, genotype: &Genotype) -> f64 {
    f64::from(config.max_age_rounds) * genotype.gene(Gene::MaxGeneticAge)
}

#[must_use]
pub fn genetic_max_speed(config: &BeansConfig, genotype: &Genotype) -> f64 {
    config.speed_min + (config.speed_max - config.speed_min) * genotype.gene(Gene::MaxGeneticSpeed)
}

/// Speed multiplier from age: 1 at birth, falling off as a quartic toward
/// `max_age`, never below `min`.
#[must_use]
pub fn age_speed_factor(age: f64, max_age: f64, min: f64) -> f64 {
    if max_age <= 0.0 {
        return min;
    }
    let x = (age / max_age).clamp(0.0, 1.0);
    (1.0 - x.powi(4)).max(min)
}

/// Ideal size at `age`: grows from `initial_bean_size` toward an adult size
/// scaled by `FAT_ACCUMULATION`, saturating early in life.
#[must_use]
pub fn size_target(age: f64, genotype: &Genotype, config: &BeansConfig) -> f64 {
    let max_age = genetic_max_age(config, genotype);
    let x = if max_age > 0.0 {
        (age / max_age).clamp(0.0, 1.0)
    } else {
        1.0
    };
    let growth =
        (1.0 - (-SIZE_GROWTH_RATE * x).exp()) / (1.0 - (-SIZE_GROWTH_RATE).exp());
    let adult = config.base_bean_size * (0.75 + 0.5 * genotype.gene(Gene::FatAccumulation));
    let start = config.initial_bean_size;
    (start + (adult - start) * growth).clamp(config.min_bean_size, config.max_bean_size)
}

/// Standard score of `size` against `target`, using `sigma_frac * target`.
#[must_use]
pub fn size_z_score(size: f64, target: f64, sigma_frac: f64) -> f64 {
    let sigma = target * sigma_frac;
    if sigma > 0.0 {
        (size - target) / sigma
    } else {
        0.0
    }
}

/// Speed multiplier for beans far from their target size.
///
/// Flat at 1 inside two sigma; beyond that it drops linearly per sigma,
/// separately for over- and underweight beans, down to a floor.
#[must_use]
pub fn size_speed_penalty(size: f64, target: f64, config: &BeansConfig) -> f64 {
    let z = size_z_score(size, target, config.size_sigma_frac);
    if z > 2.0 {
        (1.0 - config.size_penalty_above_k * (z - 2.0)).max(config.size_penalty_min_above)
    } else if z < -2.0 {
        (1.0 - config.size_penalty_below_k * (-z - 2.0)).max(config.size_penalty_min_below)
    } else {
        1.0
    }
}

/// Draws one value per gene, in [`Gene::ALL`] order.
pub fn create_random_genotype(rng: &mut Randomness) -> Result<Genotype> {
    let mut genes = BTreeMap::new();
    for gene in Gene::ALL {
        let (min, max) = gene.range();
        let raw = rng.uniform(min, max)?;
        let value = match gene {
            Gene::MaxGeneticAge => apply_age_gene_curve(raw),
            _ => raw,
        };
        genes.insert(gene, value);
    }
    let genotype = Genotype::new(genes)?;
    debug!(genotype = %genotype, "Created random genotype");
    Ok(genotype)
}

pub fn create_genotype_from_values(genes: BTreeMap<Gene, f64>) -> Result<Genotype> {
    Ok(Genotype::new(genes)?)
}

/// Birth state: age 0 with speed, energy and size jittered by ±5%.
pub fn create_phenotype(
    config: &BeansConfig,
    genotype: &Genotype,
    rng: &mut Randomness,
) -> Result<Phenotype> {
    let max_age = genetic_max_age(config, genotype);
    let base_speed = genetic_max_speed(config, genotype) * age_speed_factor(0.0, max_age, config.min_speed_factor);
    let (lo, hi) = BIRTH_JITTER;

    let phenotype = Phenotype {
        age: 0.0,
        speed: base_speed * rng.uniform(lo, hi)?,
        energy: config.initial_energy * rng.uniform(lo, hi)?,
        size: config.initial_bean_size * rng.uniform(lo, hi)?,
        target_size: size_target(0.0, genotype, config),
    };
    debug!(
        speed = phenotype.speed,
        energy = phenotype.energy,
        size = phenotype.size,
        max_age,
        "Created phenotype"
    );
    Ok(phenotype)
}
