use crate::model::world::{World, WorldState};
use beans_core::bean::Bean;
use beans_core::collision::FoodCollision;
use std::time::Instant;
use tracing::{debug, trace};

impl World {
    /// Advances the simulation by one round.
    ///
    /// Order: food decay and spawn, environment, then per bean (in id order)
    /// energy pass, commit and survival check. Dead beans leave the alive set
    /// before the round counter moves. `dt` is the frame time of the caller
    /// and does not scale any per-round quantity.
    pub fn step(&mut self, dt: f64) -> anyhow::Result<WorldState> {
        let started = Instant::now();

        self.food.step(&mut self.rng)?;
        if let Some(environment) = self.environment.as_mut() {
            environment.step();
        }

        let ambient = self.get_energy_intake();
        let recorded_before = self.survival.dead_beans().len();

        for bean in &mut self.beans {
            let eaten = self.pending_intake.remove(&bean.id()).unwrap_or(0.0);
            let next = self.energy_system.apply(bean, ambient + eaten);
            bean.update_from_state(next)?;
            self.survival.check_and_record(bean, &mut self.rng)?;
        }
        self.beans.retain(Bean::alive);
        self.pending_intake.clear();
        self.round += 1;

        let dead_this_tick = self.survival.dead_beans()[recorded_before..].to_vec();
        self.metrics.record_round(
            started.elapsed(),
            self.beans.len(),
            self.food.total_energy(),
            dead_this_tick.iter().map(|record| &record.reason),
        );
        debug!(
            round = self.round,
            dt,
            alive = self.beans.len(),
            died = dead_this_tick.len(),
            "Round complete"
        );

        Ok(WorldState {
            round: self.round,
            alive: self.beans.iter().map(Bean::to_state).collect(),
            dead_this_tick,
        })
    }

    /// Eats every reported cell and queues the energy for the eater's next
    /// energy pass. Returns the total energy taken.
    pub fn feed(&mut self, collisions: &[FoodCollision]) -> f64 {
        let mut total = 0.0;
        for hit in collisions {
            let eaten = self.food.consume_food_at_position(hit.position);
            if eaten > 0.0 {
                *self.pending_intake.entry(hit.bean_id).or_insert(0.0) += eaten;
                total += eaten;
                trace!(id = hit.bean_id, position = ?hit.position, eaten, "Food eaten");
            }
        }
        total
    }
}
