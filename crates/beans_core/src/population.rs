//! Initial population sizing.
//!
//! Estimators turn arena area and bean footprint into a `(male, female)`
//! split. Unlike the other factories, an unknown name falls back to
//! [`DensityPopulationEstimator`] instead of failing.

use tracing::{debug, info};

pub trait PopulationEstimator: std::fmt::Debug {
    fn name(&self) -> &'static str;

    /// Returns `(male, female)` counts.
    fn estimate(
        &self,
        width: u32,
        height: u32,
        sprite_size: f64,
        population_density: f64,
        male_female_ratio: f64,
    ) -> (usize, usize);
}

/// Beans the arena holds at `density`, before any rounding.
fn raw_capacity(width: u32, height: u32, sprite_size: f64, density: f64) -> f64 {
    let area = f64::from(width) * f64::from(height);
    let per_bean_area = (sprite_size * sprite_size).max(1.0);
    area * density / per_bean_area
}

fn split_by_ratio(total: usize, male_female_ratio: f64) -> (usize, usize) {
    let male_fraction = male_female_ratio / (1.0 + male_female_ratio);
    let male = ((total as f64) * male_fraction).floor() as usize;
    (male, total - male)
}

/// Linear in area: `floor(area * density / size²)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DensityPopulationEstimator;

impl PopulationEstimator for DensityPopulationEstimator {
    fn name(&self) -> &'static str {
        "density"
    }

    fn estimate(
        &self,
        width: u32,
        height: u32,
        sprite_size: f64,
        population_density: f64,
        male_female_ratio: f64,
    ) -> (usize, usize) {
        let total = raw_capacity(width, height, sprite_size, population_density)
            .max(0.0)
            .floor() as usize;
        let (male, female) = split_by_ratio(total, male_female_ratio);
        info!(total, male, female, "Density population estimate");
        (male, female)
    }
}

/// Scales the density capacity by `ln(1 + raw) / ln(1 + cap)` and rounds up,
/// never exceeding the density estimate.
#[derive(Debug, Default, Clone, Copy)]
pub struct SoftLogPopulationEstimator;

impl PopulationEstimator for SoftLogPopulationEstimator {
    fn name(&self) -> &'static str {
        "soft_log"
    }

    fn estimate(
        &self,
        width: u32,
        height: u32,
        sprite_size: f64,
        population_density: f64,
        male_female_ratio: f64,
    ) -> (usize, usize) {
        let raw = raw_capacity(width, height, sprite_size, population_density);
        let cap = raw.max(0.0).floor() as usize;
        if cap == 0 {
            info!("Soft-log capacity is zero, no beans");
            return (0, 0);
        }
        let log_max = (cap as f64).ln_1p();
        let scale = if log_max > 0.0 { raw.ln_1p() / log_max } else { 0.0 };
        let soft = ((scale * cap as f64).ceil() as usize).max(1).min(cap);
        let (male, female) = split_by_ratio(soft, male_female_ratio);
        info!(raw, soft, male, female, "Soft-log population estimate");
        (male, female)
    }
}

/// Looks up an estimator by case-insensitive name.
#[must_use]
pub fn create_population_estimator(name: &str) -> Box<dyn PopulationEstimator> {
    match name.to_ascii_lowercase().as_str() {
        "density" | "default" => Box::new(DensityPopulationEstimator),
        "soft_log" | "softlog" | "soft-log" => Box::new(SoftLogPopulationEstimator),
        other => {
            debug!(name = other, "Unknown population estimator, using density");
            Box::new(DensityPopulationEstimator)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_density_small_arena() {
        let est = DensityPopulationEstimator;
        assert_eq!(est.estimate(20, 20, 10.0, 1.0, 1.0), (2, 2));
    }

    #[test]
    fn test_density_ratio_split() {
        let est = DensityPopulationEstimator;
        // 100 beans, 3 males per female
        let (male, female) = est.estimate(100, 100, 1.0, 0.01, 3.0);
        assert_eq!((male, female), (75, 25));
    }

    #[test]
    fn test_soft_log_never_exceeds_density() {
        let density = DensityPopulationEstimator;
        let soft = SoftLogPopulationEstimator;
        for (w, h, size, d) in [(20, 20, 10.0, 1.0), (800, 600, 5.0, 0.1), (33, 47, 3.0, 0.37)] {
            let (dm, df) = density.estimate(w, h, size, d, 1.0);
            let (sm, sf) = soft.estimate(w, h, size, d, 1.0);
            assert!(sm + sf <= dm + df);
        }
    }

    #[test]
    fn test_soft_log_zero_capacity() {
        let soft = SoftLogPopulationEstimator;
        assert_eq!(soft.estimate(5, 5, 10.0, 0.5, 1.0), (0, 0));
    }

    #[test]
    fn test_factory_aliases_and_fallback() {
        assert_eq!(create_population_estimator("SOFT-LOG").name(), "soft_log");
        assert_eq!(create_population_estimator("softlog").name(), "soft_log");
        assert_eq!(create_population_estimator("default").name(), "density");
        assert_eq!(create_population_estimator("no-such").name(), "density");
        assert_eq!(create_population_estimator("").name(), "density");
    }
}
