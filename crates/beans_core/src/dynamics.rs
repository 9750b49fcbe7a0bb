//! Kinematics: how fast a bean may go, and how its body moves in the arena.
//!
//! Positions are not part of [`BeanState`](beans_data::BeanState). They live
//! on a [`Body`] owned by whatever drives frames, keyed by bean id.

use crate::bean::Bean;
use crate::error::{Result, SimError};
use crate::genetics::{age_speed_factor, size_speed_penalty};
use beans_data::{BeanId, StateUpdate};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Position and heading of one bean. `direction` is in degrees, `[0, 360)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub id: BeanId,
    pub x: f64,
    pub y: f64,
    pub direction: f64,
}

impl Body {
    #[must_use]
    pub fn new(id: BeanId, x: f64, y: f64, direction: f64) -> Self {
        Self {
            id,
            x,
            y,
            direction: normalize_angle(direction),
        }
    }
}

#[must_use]
pub fn normalize_angle(degrees: f64) -> f64 {
    let a = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negatives
    if a >= 360.0 {
        0.0
    } else {
        a
    }
}

/// Pixel displacement per frame for `speed` along `direction`.
#[must_use]
pub fn velocity(speed: f64, direction: f64, pixels_per_unit_speed: f64) -> (f64, f64) {
    let px = speed * pixels_per_unit_speed;
    let rad = direction.to_radians();
    (px * rad.cos(), px * rad.sin())
}

/// Speed the bean can sustain at `age` and `size`.
#[must_use]
pub fn calculate_speed(bean: &Bean, age: f64, size: f64, target_size: f64) -> f64 {
    let config = bean.config();
    let life = age_speed_factor(age, bean.max_age(), config.min_speed_factor);
    let penalty = size_speed_penalty(size, target_size, config);
    bean.max_speed() * life * penalty
}

/// Advances `body` one frame and reflects it off the arena walls.
///
/// Each crossed edge clamps the circle back inside, mirrors the heading
/// (`180 - θ` on vertical walls, `-θ` on horizontal ones) and costs the bean
/// `energy_loss_on_bounce`. Returns the number of edges hit.
pub fn move_body(bean: &mut Bean, body: &mut Body, width: f64, height: f64) -> Result<u32> {
    if body.id != bean.id() {
        return Err(SimError::invariant(format!(
            "body {} paired with bean {}",
            body.id,
            bean.id()
        )));
    }
    let config = bean.config();
    let (dx, dy) = velocity(bean.speed(), body.direction, config.pixels_per_unit_speed);
    let loss = config.energy_loss_on_bounce;
    let radius = bean.size() / 2.0;

    let mut x = body.x + dx;
    let mut y = body.y + dy;
    let mut direction = body.direction;
    let mut edges = 0;

    if x - radius < 0.0 {
        x = radius;
        direction = normalize_angle(180.0 - direction);
        edges += 1;
    } else if x + radius > width {
        x = width - radius;
        direction = normalize_angle(180.0 - direction);
        edges += 1;
    }

    if y - radius < 0.0 {
        y = radius;
        direction = normalize_angle(-direction);
        edges += 1;
    } else if y + radius > height {
        y = height - radius;
        direction = normalize_angle(-direction);
        edges += 1;
    }

    body.x = x;
    body.y = y;
    body.direction = direction;

    if edges > 0 {
        let mut state = bean.to_state();
        state.store(StateUpdate::new().energy(state.energy() - loss * f64::from(edges)));
        bean.update_from_state(state)?;
        debug!(id = bean.id(), edges, energy = bean.energy(), "Wall bounce");
    }
    Ok(edges)
}
