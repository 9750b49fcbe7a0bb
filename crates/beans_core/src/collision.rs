//! Bean–bean physics and bean–food contact detection.
//!
//! `beans` and `bodies` are index-matched slices: `bodies[i]` is the
//! position of `beans[i]`. Pairs are found through a [`SpatialHash`] broad
//! phase and then processed in ascending `(i, j)` order, so a frame resolves
//! the same way for the same input.
//!
//! Pairs are resolved sequentially: each pair commits its speed, heading,
//! damage and separation before the next pair is read. A bean touching
//! several others meets its later partners with the velocity and position
//! left by its earlier pairs, so momentum can travel down a chain within a
//! single frame.

use crate::bean::Bean;
use crate::config::BeansConfig;
use crate::dynamics::{normalize_angle, velocity, Body};
use crate::error::{Result, SimError};
use crate::spatial_hash::SpatialHash;
use beans_data::{BeanId, FoodCell, FoodType, GridPos, Sex, StateUpdate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f64::consts::PI;
use tracing::{debug, trace};

/// Overlaps smaller than this, in px², are grazes and cost nothing.
pub const COLLISION_AREA_THRESHOLD: f64 = 2.0;
const MIN_SEPARATION: f64 = 1e-9;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionReport {
    /// Total damage taken this frame, by bean.
    pub damage: BTreeMap<BeanId, f64>,
    /// Pairs that overlapped past the area threshold.
    pub contacts: usize,
}

impl CollisionReport {
    #[must_use]
    pub fn total_damage(&self) -> f64 {
        self.damage.values().sum()
    }
}

/// A bean overlapping a food cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FoodCollision {
    pub bean_id: BeanId,
    pub food_type: FoodType,
    pub position: GridPos,
}

/// Area of the lens where two circles overlap.
#[must_use]
pub fn circle_intersection_area(r1: f64, r2: f64, distance: f64) -> f64 {
    if r1 <= 0.0 || r2 <= 0.0 || distance >= r1 + r2 {
        return 0.0;
    }
    if distance <= (r1 - r2).abs() {
        let r = r1.min(r2);
        return PI * r * r;
    }
    let d = distance;
    let a1 = ((d * d + r1 * r1 - r2 * r2) / (2.0 * d * r1)).clamp(-1.0, 1.0).acos();
    let a2 = ((d * d + r2 * r2 - r1 * r1) / (2.0 * d * r2)).clamp(-1.0, 1.0).acos();
    let k = (-d + r1 + r2) * (d + r1 - r2) * (d - r1 + r2) * (d + r1 + r2);
    r1 * r1 * a1 + r2 * r2 * a2 - 0.5 * k.max(0.0).sqrt()
}

/// One-dimensional elastic exchange along the unit `normal` (pointing from
/// body 1 to body 2). Velocities are only changed when the bodies approach.
#[must_use]
pub fn elastic_collision(
    m1: f64,
    v1: (f64, f64),
    m2: f64,
    v2: (f64, f64),
    normal: (f64, f64),
) -> ((f64, f64), (f64, f64)) {
    let total = m1 + m2;
    let approach = (v1.0 - v2.0) * normal.0 + (v1.1 - v2.1) * normal.1;
    if total <= 0.0 || approach <= 0.0 {
        return (v1, v2);
    }
    let j1 = 2.0 * m2 / total * approach;
    let j2 = 2.0 * m1 / total * approach;
    (
        (v1.0 - j1 * normal.0, v1.1 - j1 * normal.1),
        (v2.0 + j2 * normal.0, v2.1 + j2 * normal.1),
    )
}

/// Splits the impact damage between two beans.
///
/// Returns `(damage_a, damage_b)`. The smaller bean takes the larger share
/// (weights `size^e`), then each share is scaled by its sex factor.
#[must_use]
pub fn collision_damage(
    config: &BeansConfig,
    relative_speed: f64,
    (size_a, sex_a): (f64, Sex),
    (size_b, sex_b): (f64, Sex),
) -> (f64, f64) {
    let total = (config.collision_base_damage * relative_speed * config.collision_damage_speed_factor)
        .max(config.collision_min_damage);
    let e = config.collision_damage_size_exponent;
    let (wa, wb) = (size_a.max(0.0).powf(e), size_b.max(0.0).powf(e));
    let weight = wa + wb;
    // Each bean's share is weighted by the other's size.
    let (share_a, share_b) = if weight > 0.0 {
        (total * wb / weight, total * wa / weight)
    } else {
        (total / 2.0, total / 2.0)
    };
    let factor = |sex: Sex| match sex {
        Sex::Female => config.female_damage_factor(),
        Sex::Male => config.male_damage_factor(),
    };
    (share_a * factor(sex_a), share_b * factor(sex_b))
}

fn check_pairing(beans: &[Bean], bodies: &[Body]) -> Result<()> {
    if beans.len() != bodies.len() {
        return Err(SimError::invariant(format!(
            "{} beans but {} bodies",
            beans.len(),
            bodies.len()
        )));
    }
    if let Some((bean, body)) = beans.iter().zip(bodies).find(|(b, p)| b.id() != p.id) {
        return Err(SimError::invariant(format!(
            "body {} paired with bean {}",
            body.id,
            bean.id()
        )));
    }
    Ok(())
}

/// Overlapping `(i, j)` pairs with `i < j`, sorted.
fn broad_phase(beans: &[Bean], bodies: &[Body], hash: &mut SpatialHash) -> Vec<(usize, usize)> {
    let positions: Vec<(f64, f64)> = bodies.iter().map(|b| (b.x, b.y)).collect();
    hash.build(&positions);
    let max_radius = beans.iter().map(|b| b.size() / 2.0).fold(0.0, f64::max);

    let mut pairs = Vec::new();
    let mut nearby = Vec::new();
    for (i, body) in bodies.iter().enumerate() {
        let ri = beans[i].size() / 2.0;
        hash.query_into(body.x, body.y, ri + max_radius, &mut nearby);
        for &j in &nearby {
            if j <= i {
                continue;
            }
            let (dx, dy) = (bodies[j].x - body.x, bodies[j].y - body.y);
            let reach = ri + beans[j].size() / 2.0;
            if dx * dx + dy * dy < reach * reach {
                pairs.push((i, j));
            }
        }
    }
    pairs.sort_unstable();
    pairs
}

fn commit_impact(bean: &mut Bean, damage: f64, v: (f64, f64)) -> Result<(f64, f64)> {
    let speed = (v.0 * v.0 + v.1 * v.1).sqrt();
    let mut state = bean.to_state();
    state.store(
        StateUpdate::new()
            .energy(state.energy() - damage)
            .speed(speed),
    );
    bean.update_from_state(state)?;
    Ok(v)
}

/// Separation never pushes a circle through a wall.
fn keep_inside(body: &mut Body, radius: f64, width: u32, height: u32) {
    let (w, h) = (f64::from(width), f64::from(height));
    body.x = body.x.max(radius).min((w - radius).max(radius));
    body.y = body.y.max(radius).min((h - radius).max(radius));
}

/// Applies damage, momentum exchange and separation for every overlapping
/// pair. Does nothing when `collision_enable` is off.
pub fn resolve_bean_collisions(
    beans: &mut [Bean],
    bodies: &mut [Body],
    config: &BeansConfig,
    width: u32,
    height: u32,
) -> Result<CollisionReport> {
    check_pairing(beans, bodies)?;
    let mut report = CollisionReport::default();
    if !config.collision_enable || beans.len() < 2 {
        return Ok(report);
    }

    let cell = config.max_bean_size.max(1.0);
    let mut hash = SpatialHash::new(cell, width, height);
    let pairs = broad_phase(beans, bodies, &mut hash);

    for (i, j) in pairs {
        let (ri, rj) = (beans[i].size() / 2.0, beans[j].size() / 2.0);
        let (dx, dy) = (bodies[j].x - bodies[i].x, bodies[j].y - bodies[i].y);
        let distance = (dx * dx + dy * dy).sqrt();
        let area = circle_intersection_area(ri, rj, distance);
        if area < COLLISION_AREA_THRESHOLD {
            trace!(a = beans[i].id(), b = beans[j].id(), area, "Graze ignored");
            continue;
        }

        let normal = if distance > MIN_SEPARATION {
            (dx / distance, dy / distance)
        } else {
            (1.0, 0.0)
        };
        let vi = velocity(beans[i].speed(), bodies[i].direction, 1.0);
        let vj = velocity(beans[j].speed(), bodies[j].direction, 1.0);
        let relative_speed = ((vi.0 - vj.0).powi(2) + (vi.1 - vj.1).powi(2)).sqrt();

        let (damage_i, damage_j) = collision_damage(
            config,
            relative_speed,
            (beans[i].size(), beans[i].sex()),
            (beans[j].size(), beans[j].sex()),
        );
        let (new_vi, new_vj) = elastic_collision(ri * ri, vi, rj * rj, vj, normal);

        let new_vi = commit_impact(&mut beans[i], damage_i, new_vi)?;
        let new_vj = commit_impact(&mut beans[j], damage_j, new_vj)?;
        if new_vi != vi {
            bodies[i].direction = normalize_angle(new_vi.1.atan2(new_vi.0).to_degrees());
        }
        if new_vj != vj {
            bodies[j].direction = normalize_angle(new_vj.1.atan2(new_vj.0).to_degrees());
        }

        let overlap = ri + rj - distance;
        if overlap > 0.0 {
            let push = overlap / 2.0;
            bodies[i].x -= normal.0 * push;
            bodies[i].y -= normal.1 * push;
            bodies[j].x += normal.0 * push;
            bodies[j].y += normal.1 * push;
            keep_inside(&mut bodies[i], ri, width, height);
            keep_inside(&mut bodies[j], rj, width, height);
        }

        *report.damage.entry(beans[i].id()).or_insert(0.0) += damage_i;
        *report.damage.entry(beans[j].id()).or_insert(0.0) += damage_j;
        report.contacts += 1;
        debug!(
            a = beans[i].id(),
            b = beans[j].id(),
            area,
            damage_a = damage_i,
            damage_b = damage_j,
            "Bean collision"
        );
    }
    Ok(report)
}

/// Lists every food cell under a bean's circle. Read-only.
pub fn detect_food_collisions(
    beans: &[Bean],
    bodies: &[Body],
    food: &BTreeMap<GridPos, FoodCell>,
) -> Result<Vec<FoodCollision>> {
    check_pairing(beans, bodies)?;
    let mut hits = Vec::new();
    if food.is_empty() {
        return Ok(hits);
    }
    for (bean, body) in beans.iter().zip(bodies) {
        let r = bean.size() / 2.0;
        let (min_x, max_x) = ((body.x - r).floor() as i32, (body.x + r).ceil() as i32);
        let (min_y, max_y) = ((body.y - r).floor() as i32, (body.y + r).ceil() as i32);
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let Some(cell) = food.get(&(x, y)) else {
                    continue;
                };
                let (dx, dy) = (f64::from(x) - body.x, f64::from(y) - body.y);
                if dx * dx + dy * dy <= r * r {
                    hits.push(FoodCollision {
                        bean_id: bean.id(),
                        food_type: cell.food_type,
                        position: (x, y),
                    });
                }
            }
        }
    }
    Ok(hits)
}
