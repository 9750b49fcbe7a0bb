//! The food field: a sparse grid of [`FoodCell`]s that decays and refills.
//!
//! Each round the field decays first and spawns second. Spawning tops the
//! total energy up to a density target, one 2×2 block per item, while
//! carcasses are deposited on demand and never count against the cap.

use crate::config::{AppConfig, EnvironmentConfig};
use crate::error::{Result, SimError};
use crate::randomness::Randomness;
use beans_data::{FoodCell, FoodType, GridPos};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Values below this are treated as gone.
pub const FOOD_EPSILON: f64 = 1e-6;
/// Hard ceiling on spawned energy per unit of area.
pub const MAX_FOOD_PER_AREA: f64 = 0.05;
pub const COMMON_DECAY: f64 = 0.9;
pub const DEAD_BEAN_DECAY: f64 = 0.5;
/// Side of the square block one spawned item covers.
pub const FOOD_BLOCK: i32 = 2;
const SPAWN_ATTEMPTS: usize = 10;

pub trait FoodManager: std::fmt::Debug {
    fn name(&self) -> &'static str;

    /// Decays existing food, then spawns toward the density target.
    fn step(&mut self, rng: &mut Randomness) -> Result<()>;

    fn add_dead_bean_as_food(&mut self, position: GridPos, size: f64);

    fn get_food_at(&self, position: GridPos) -> Option<&FoodCell>;

    /// Takes at most one bite from the cell and returns the energy taken.
    fn consume_food_at_position(&mut self, position: GridPos) -> f64;

    /// Cells that spawning must avoid, usually those under live beans.
    fn set_occupied_positions(&mut self, occupied: HashSet<GridPos>);

    fn total_energy(&self) -> f64;

    fn cells(&self) -> &BTreeMap<GridPos, FoodCell>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoodDistribution {
    /// Independent blocks anywhere in the arena.
    Random,
    /// Blocks packed around a randomly drawn anchor block.
    Clustered,
}

impl std::str::FromStr for FoodDistribution {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "random" | "" => Ok(Self::Random),
            "clustered" | "cluster" => Ok(Self::Clustered),
            _ => Err(SimError::unknown("food distribution", s)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HybridFoodManager {
    width: i32,
    height: i32,
    food_density: f64,
    food_quality: f64,
    decomposition_rounds: u32,
    distribution: FoodDistribution,
    grid: BTreeMap<GridPos, FoodCell>,
    occupied: HashSet<GridPos>,
    anchor: Option<GridPos>,
}

impl HybridFoodManager {
    pub fn new(width: u32, height: u32, env: &EnvironmentConfig) -> Result<Self> {
        Ok(Self {
            width: i32::try_from(width).map_err(|_| SimError::config("arena width too large"))?,
            height: i32::try_from(height)
                .map_err(|_| SimError::config("arena height too large"))?,
            food_density: env.food_density,
            food_quality: env.food_quality,
            decomposition_rounds: env.decomposition_rounds,
            distribution: env.food_distribution.parse()?,
            grid: BTreeMap::new(),
            occupied: HashSet::new(),
            anchor: None,
        })
    }

    /// Places a single cell directly, bypassing spawn rules.
    pub fn insert_cell(&mut self, position: GridPos, cell: FoodCell) {
        self.grid.insert(position, cell);
    }

    fn block_cells((x, y): GridPos) -> [GridPos; 4] {
        [(x, y), (x + 1, y), (x, y + 1), (x + 1, y + 1)]
    }

    fn block_is_free(&self, origin: GridPos) -> bool {
        Self::block_cells(origin)
            .iter()
            .all(|p| !self.grid.contains_key(p) && !self.occupied.contains(p))
    }

    fn fill_block(&mut self, origin: GridPos) {
        let share = self.food_quality / (FOOD_BLOCK * FOOD_BLOCK) as f64;
        for pos in Self::block_cells(origin) {
            self.grid.insert(pos, FoodCell::common(share));
        }
    }

    fn decay(&mut self) {
        let rounds_cap = self.decomposition_rounds;
        self.grid.retain(|_, cell| match cell.food_type {
            FoodType::Common => {
                cell.value *= COMMON_DECAY;
                cell.value >= FOOD_EPSILON
            }
            FoodType::DeadBean => {
                cell.value *= DEAD_BEAN_DECAY;
                cell.rounds += 1;
                cell.rounds < rounds_cap && cell.value >= FOOD_EPSILON
            }
        });
    }

    /// Items needed to reach this round's target energy.
    fn items_to_spawn(&self) -> usize {
        let area = f64::from(self.width) * f64::from(self.height);
        let target = (area * self.food_density * self.food_quality).min(area * MAX_FOOD_PER_AREA);
        let delta = target - self.total_energy();
        if delta <= 0.0 {
            0
        } else {
            (delta / self.food_quality).floor() as usize
        }
    }

    fn spawn_random(&mut self, items: usize, rng: &mut Randomness) -> Result<usize> {
        let (max_x, max_y) = (i64::from(self.width - FOOD_BLOCK), i64::from(self.height - FOOD_BLOCK));
        let mut spawned = 0;
        for _ in 0..items {
            for _ in 0..SPAWN_ATTEMPTS {
                let origin = (rng.randint(0, max_x)? as i32, rng.randint(0, max_y)? as i32);
                if self.block_is_free(origin) {
                    self.fill_block(origin);
                    spawned += 1;
                    break;
                }
            }
        }
        Ok(spawned)
    }

    fn free_blocks_around(&self, (ax, ay): GridPos) -> Vec<GridPos> {
        let (blocks_x, blocks_y) = (self.width / FOOD_BLOCK, self.height / FOOD_BLOCK);
        let mut free = Vec::new();
        for by in (ay - 1)..=(ay + 1) {
            for bx in (ax - 1)..=(ax + 1) {
                if bx < 0 || by < 0 || bx >= blocks_x || by >= blocks_y {
                    continue;
                }
                let origin = (bx * FOOD_BLOCK, by * FOOD_BLOCK);
                if self.block_is_free(origin) {
                    free.push(origin);
                }
            }
        }
        free
    }

    fn draw_anchor(&self, rng: &mut Randomness) -> Result<GridPos> {
        let (blocks_x, blocks_y) = (self.width / FOOD_BLOCK, self.height / FOOD_BLOCK);
        Ok((
            rng.randint(0, i64::from(blocks_x - 1))? as i32,
            rng.randint(0, i64::from(blocks_y - 1))? as i32,
        ))
    }

    fn spawn_clustered(&mut self, items: usize, rng: &mut Randomness) -> Result<usize> {
        let mut spawned = 0;
        for _ in 0..items {
            for _ in 0..SPAWN_ATTEMPTS {
                let anchor = match self.anchor {
                    Some(anchor) => anchor,
                    None => self.draw_anchor(rng)?,
                };
                let free = self.free_blocks_around(anchor);
                match rng.choose(&free)? {
                    Some(&origin) => {
                        self.anchor = Some(anchor);
                        self.fill_block(origin);
                        spawned += 1;
                        break;
                    }
                    None => self.anchor = None,
                }
            }
        }
        Ok(spawned)
    }
}

impl FoodManager for HybridFoodManager {
    fn name(&self) -> &'static str {
        "hybrid"
    }

    fn step(&mut self, rng: &mut Randomness) -> Result<()> {
        self.decay();

        if self.width < FOOD_BLOCK || self.height < FOOD_BLOCK {
            return Ok(());
        }
        let items = self.items_to_spawn();
        if items == 0 {
            return Ok(());
        }
        let spawned = match self.distribution {
            FoodDistribution::Random => self.spawn_random(items, rng)?,
            FoodDistribution::Clustered => self.spawn_clustered(items, rng)?,
        };
        debug!(requested = items, spawned, total = self.total_energy(), "Food spawned");
        Ok(())
    }

    fn add_dead_bean_as_food(&mut self, position: GridPos, size: f64) {
        let cell = self
            .grid
            .entry(position)
            .or_insert_with(|| FoodCell::dead_bean(0.0));
        cell.value += size;
        cell.food_type = FoodType::DeadBean;
        cell.rounds = 0;
    }

    fn get_food_at(&self, position: GridPos) -> Option<&FoodCell> {
        self.grid.get(&position)
    }

    fn consume_food_at_position(&mut self, position: GridPos) -> f64 {
        let Some(cell) = self.grid.get_mut(&position) else {
            return 0.0;
        };
        let bite = cell.value.min(self.food_quality).max(0.0);
        cell.value -= bite;
        bite
    }

    fn set_occupied_positions(&mut self, occupied: HashSet<GridPos>) {
        self.occupied = occupied;
    }

    fn total_energy(&self) -> f64 {
        self.grid.values().map(|c| c.value).sum()
    }

    fn cells(&self) -> &BTreeMap<GridPos, FoodCell> {
        &self.grid
    }
}

pub fn create_food_manager(config: &AppConfig) -> Result<Box<dyn FoodManager>> {
    let env = &config.environment;
    match env.food_manager.to_ascii_lowercase().as_str() {
        "hybrid" => Ok(Box::new(HybridFoodManager::new(
            config.world.width,
            config.world.height,
            env,
        )?)),
        _ => Err(SimError::unknown("food manager", env.food_manager.as_str())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(density: f64, distribution: &str) -> HybridFoodManager {
        let env = EnvironmentConfig {
            food_density: density,
            food_distribution: distribution.to_string(),
            ..EnvironmentConfig::default()
        };
        HybridFoodManager::new(40, 40, &env).unwrap()
    }

    #[test]
    fn test_dead_bean_decay_schedule() {
        let mut food = manager(0.0, "random");
        let mut rng = Randomness::explicit([]);
        food.add_dead_bean_as_food((3, 3), 10.0);
        food.step(&mut rng).unwrap();
        assert_eq!(food.get_food_at((3, 3)).unwrap().value, 5.0);
        food.step(&mut rng).unwrap();
        assert_eq!(food.get_food_at((3, 3)).unwrap().value, 2.5);
        food.step(&mut rng).unwrap();
        assert!(food.get_food_at((3, 3)).is_none());
    }

    #[test]
    fn test_common_decay_schedule() {
        let mut food = manager(0.0, "random");
        let mut rng = Randomness::explicit([]);
        food.insert_cell((1, 1), FoodCell::common(20.0));
        food.step(&mut rng).unwrap();
        assert!((food.get_food_at((1, 1)).unwrap().value - 18.0).abs() < 1e-9);
        food.step(&mut rng).unwrap();
        assert!((food.get_food_at((1, 1)).unwrap().value - 16.2).abs() < 1e-9);
    }

    #[test]
    fn test_dead_bean_accumulates_and_resets_rounds() {
        let mut food = manager(0.0, "random");
        let mut rng = Randomness::explicit([]);
        food.insert_cell((2, 2), FoodCell::common(4.0));
        food.add_dead_bean_as_food((2, 2), 6.0);
        let cell = *food.get_food_at((2, 2)).unwrap();
        assert_eq!(cell.food_type, FoodType::DeadBean);
        assert_eq!(cell.value, 10.0);

        food.step(&mut rng).unwrap();
        food.add_dead_bean_as_food((2, 2), 1.0);
        assert_eq!(food.get_food_at((2, 2)).unwrap().rounds, 0);
    }

    #[test]
    fn test_consume_takes_one_bite_and_keeps_cell() {
        let mut food = manager(0.0, "random");
        food.insert_cell((0, 0), FoodCell::common(25.0));
        assert_eq!(food.consume_food_at_position((0, 0)), 10.0);
        assert_eq!(food.get_food_at((0, 0)).unwrap().value, 15.0);
        food.insert_cell((5, 5), FoodCell::common(3.0));
        assert_eq!(food.consume_food_at_position((5, 5)), 3.0);
        assert!(food.get_food_at((5, 5)).is_some());
        assert_eq!(food.consume_food_at_position((9, 9)), 0.0);
    }

    #[test]
    fn test_spawn_reaches_capped_target() {
        // 40x40 area, target = min(1600 * 0.01 * 10, 1600 * 0.05) = 80
        let mut food = manager(0.01, "random");
        let mut rng = Randomness::seeded(1);
        food.step(&mut rng).unwrap();
        let total = food.total_energy();
        assert!(total <= 80.0 + 1e-9);
        assert!(total > 0.0);
        for cell in food.cells().values() {
            assert!((cell.value - 2.5).abs() < 1e-9);
        }
    }

    #[test]
    fn test_spawn_avoids_occupied_cells() {
        let mut food = manager(0.01, "clustered");
        let occupied: HashSet<GridPos> = (0..40).flat_map(|x| (0..20).map(move |y| (x, y))).collect();
        food.set_occupied_positions(occupied.clone());
        food.step(&mut Randomness::seeded(4)).unwrap();
        assert!(food.cells().keys().all(|p| !occupied.contains(p)));
    }

    #[test]
    fn test_clustered_blocks_stay_near_anchor() {
        // 40x40 area at this density asks for exactly two items.
        let mut food = manager(0.00125, "clustered");
        // anchor block (10, 10), then the first free neighbor twice
        let mut rng = Randomness::explicit([0.5, 0.5, 0.0, 0.0]);
        food.step(&mut rng).unwrap();
        let cells: Vec<GridPos> = food.cells().keys().copied().collect();
        assert_eq!(cells.len(), 8);
        assert!(cells.iter().all(|&(x, y)| (18..=21).contains(&x) && (18..=19).contains(&y)));
        assert_eq!(rng.remaining(), Some(0));
    }

    #[test]
    fn test_unknown_names_rejected() {
        let mut config = AppConfig::default();
        config.environment.food_distribution = "spiral".into();
        assert!(create_food_manager(&config).is_err());
        let mut config = AppConfig::default();
        config.environment.food_manager = "static".into();
        assert!(matches!(
            create_food_manager(&config),
            Err(SimError::UnknownStrategy { .. })
        ));
    }
}
