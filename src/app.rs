//! Headless frame driver.
//!
//! Each frame moves every body, resolves bean collisions, lets beans eat the
//! food under them, advances the world one round and turns the round's dead
//! into carcass food where they fell.

use anyhow::{bail, Result};
use beans_core::collision::{detect_food_collisions, resolve_bean_collisions};
use beans_core::config::{AppConfig, BeansConfig};
use beans_core::dynamics::{move_body, Body};
use beans_core::environment::create_environment;
use beans_data::{BeanId, GridPos};
use std::collections::HashSet;
use tracing::info;

use crate::model::world::{World, WorldState};

/// Nominal frame time handed to [`World::step`].
pub const FRAME_DT: f64 = 1.0 / 60.0;

#[must_use]
pub fn grid_pos(body: &Body) -> GridPos {
    (body.x.floor() as i32, body.y.floor() as i32)
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct FrameStats {
    pub bounces: u32,
    pub contacts: usize,
    pub collision_damage: f64,
    pub food_eaten: f64,
}

#[derive(Debug)]
pub struct App {
    pub running: bool,
    pub world: World,
    /// One body per alive bean, in the same order.
    bodies: Vec<Body>,
    beans_config: BeansConfig,
    last_state: Option<WorldState>,
    totals: FrameStats,
}

impl App {
    /// Builds the world with the configured environment and lays out the
    /// initial population. Beans the layout could not fit are dropped.
    pub fn new(config: AppConfig) -> Result<Self> {
        let environment = create_environment(&config)?;
        let beans_config = config.beans.clone();
        let mut world = World::new(config, Some(environment))?;

        let population = world.beans().len();
        let positions = world.initial_positions()?;
        if positions.is_empty() && population > 0 {
            bail!(
                "Could not place {population} beans with the {} strategy",
                world.placement_strategy().name()
            );
        }
        world.truncate_population(positions.len());

        let ids: Vec<BeanId> = world.beans().iter().map(|bean| bean.id()).collect();
        let mut bodies = Vec::with_capacity(ids.len());
        for (id, (x, y)) in ids.into_iter().zip(positions) {
            let direction = world.rng_mut().uniform(0.0, 360.0)?;
            bodies.push(Body::new(id, x, y, direction));
        }

        let occupied = bodies.iter().map(grid_pos).collect();
        world.food_mut().set_occupied_positions(occupied);

        info!(
            population = bodies.len(),
            strategy = world.placement_strategy().name(),
            "Initial layout placed"
        );

        Ok(Self {
            running: true,
            world,
            bodies,
            beans_config,
            last_state: None,
            totals: FrameStats::default(),
        })
    }

    #[must_use]
    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    #[must_use]
    pub fn last_state(&self) -> Option<&WorldState> {
        self.last_state.as_ref()
    }

    /// Sums of every frame run so far.
    #[must_use]
    pub fn totals(&self) -> FrameStats {
        self.totals
    }

    pub fn frame(&mut self) -> Result<FrameStats> {
        let width = self.world.config().world.width;
        let height = self.world.config().world.height;
        let mut stats = FrameStats::default();

        for (bean, body) in self.world.beans_mut().iter_mut().zip(self.bodies.iter_mut()) {
            stats.bounces += move_body(bean, body, f64::from(width), f64::from(height))?;
        }

        let report = resolve_bean_collisions(
            self.world.beans_mut(),
            &mut self.bodies,
            &self.beans_config,
            width,
            height,
        )?;
        stats.contacts = report.contacts;
        stats.collision_damage = report.total_damage();

        let hits = detect_food_collisions(self.world.beans(), &self.bodies, self.world.food().cells())?;
        stats.food_eaten = self.world.feed(&hits);

        let state = self.world.step(FRAME_DT)?;

        for record in &state.dead_this_tick {
            if let Some(body) = self.bodies.iter().find(|body| body.id == record.bean.id()) {
                let position = grid_pos(body);
                self.world
                    .food_mut()
                    .add_dead_bean_as_food(position, record.bean.size());
            }
        }

        let alive: HashSet<BeanId> = state.alive.iter().map(|bean| bean.id()).collect();
        self.bodies.retain(|body| alive.contains(&body.id));
        let occupied = self.bodies.iter().map(grid_pos).collect();
        self.world.food_mut().set_occupied_positions(occupied);

        if state.is_extinct() {
            info!(round = state.round, "Population extinct");
            self.running = false;
        }
        self.last_state = Some(state);

        self.totals.bounces += stats.bounces;
        self.totals.contacts += stats.contacts;
        self.totals.collision_damage += stats.collision_damage;
        self.totals.food_eaten += stats.food_eaten;
        Ok(stats)
    }

    /// Runs frames until `rounds` complete, the population dies out, or
    /// `running` is cleared. `None` runs until extinction.
    pub fn run(&mut self, rounds: Option<u64>) -> Result<()> {
        if self.bodies.is_empty() {
            self.running = false;
        }
        while self.running {
            if rounds.is_some_and(|limit| self.world.round() >= limit) {
                break;
            }
            self.frame()?;
        }
        info!(
            rounds = self.world.round(),
            alive = self.world.beans().len(),
            dead = self.world.dead_beans().len(),
            "Simulation finished"
        );
        Ok(())
    }
}
