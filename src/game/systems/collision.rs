//! Obstacle collision queries for movement and line of fire

use crate::game::spatial::ObstacleLookup;
use crate::game::state::{Obstacle, ObstacleId};
use crate::util::geometry::{closest_point_on_segment, sqr};
use crate::util::vec2::Vec2;

/// Which obstacles count as blocking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionFilter {
    /// Every obstacle blocks (unit movement)
    Movement,
    /// Shoot-through obstacles are skipped (projectiles, sight lines)
    LineOfFire,
}

/// First obstacle hit along a segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collision<'a> {
    pub obstacle: &'a Obstacle,
    /// Point of the segment closest to the obstacle center
    pub point: Vec2,
}

/// Find the blocking obstacle nearest to `start` along `start`-`finish`
///
/// Candidates come from `lookup.nearby(start)` only, so the lookup's reach
/// has to cover the whole segment length. Each obstacle is inflated by
/// `extra_radius`; on equal distance the earlier candidate wins.
pub fn closest_collision<'a, L>(
    lookup: &'a L,
    start: Vec2,
    finish: Vec2,
    extra_radius: f64,
    ignore_id: Option<ObstacleId>,
    filter: CollisionFilter,
) -> Option<Collision<'a>>
where
    L: ObstacleLookup + ?Sized,
{
    let mut closest: Option<Collision<'a>> = None;
    let mut closest_distance = f64::INFINITY;

    for obstacle in lookup.nearby(start) {
        if ignore_id == Some(obstacle.id)
            || (filter == CollisionFilter::LineOfFire && obstacle.can_shoot_through)
        {
            continue;
        }
        let radius_sqr = sqr(obstacle.radius + extra_radius);
        let point = closest_point_on_segment(obstacle.position, start, finish);
        if (point - obstacle.position).sqr_norm() > radius_sqr {
            continue;
        }
        let distance = (point - start).sqr_norm();
        if distance < closest_distance {
            closest_distance = distance;
            closest = Some(Collision { obstacle, point });
        }
    }

    closest
}

/// Whether a projectile of `projectile_radius` from `from` reaches `to` unblocked
pub fn has_line_of_fire<L>(lookup: &L, from: Vec2, to: Vec2, projectile_radius: f64) -> bool
where
    L: ObstacleLookup + ?Sized,
{
    closest_collision(lookup, from, to, projectile_radius, None, CollisionFilter::LineOfFire).is_none()
}
