//! Synthetic match driving the tactical core
//!
//! Generates a deterministic arena from a seed, steps units and the zone
//! tick by tick, and picks the least dangerous reachable position for our
//! unit from a ring of candidates.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::game::constants::Constants;
use crate::game::debug::{Color, DebugSink};
use crate::game::spatial::ObstacleGrid;
use crate::game::state::{Obstacle, PlayerId, Tick, Unit, WeaponId, WorldSnapshot, Zone};
use crate::game::systems::collision::{closest_collision, CollisionFilter};
use crate::game::systems::danger::DangerField;
use crate::game::systems::unit::{apply_zone_damage, tick_respawn_time};
use crate::game::systems::zone::ZoneMover;
use crate::util::vec2::Vec2;

/// Scenario generation and movement parameters
pub mod params {
    /// Player controlled by the agent
    pub const MY_PLAYER: i32 = 0;
    /// Candidate ring radius around our unit
    pub const PROBE_RADIUS: f64 = 3.0;
    /// Our unit's movement speed (units/s)
    pub const MY_SPEED: f64 = 6.0;
    /// Enemy speed range (units/s)
    pub const ENEMY_MIN_SPEED: f64 = 2.0;
    pub const ENEMY_MAX_SPEED: f64 = 7.0;
    /// Enemies start within this distance of our unit
    pub const ENEMY_SPAWN_RADIUS: f64 = 40.0;
    /// Obstacle radius range
    pub const OBSTACLE_MIN_RADIUS: f64 = 0.5;
    pub const OBSTACLE_MAX_RADIUS: f64 = 4.0;
    /// Share of obstacles projectiles pass through
    pub const SHOOT_THROUGH_CHANCE: f64 = 0.3;
    /// Share of enemies still spawning at the start
    pub const SPAWNING_CHANCE: f64 = 0.25;
    /// Next zone radius relative to the initial one
    pub const NEXT_ZONE_SCALE: f64 = 0.5;
    /// Added to candidates the zone will reach within the lookahead
    pub const ZONE_PENALTY: f64 = 10.0;
    pub const ZONE_LOOKAHEAD_TICKS: u32 = 30;
    /// Largest heading change after bouncing off something (radians)
    pub const BOUNCE_JITTER: f64 = 0.5;
}

use params::*;

const BEST_COLOR: Color = Color::new(0.0, 1.0, 0.0, 1.0);

/// Counts used to generate a scenario
#[derive(Debug, Clone, Copy)]
pub struct ScenarioSettings {
    pub enemy_count: usize,
    pub obstacle_count: usize,
}

/// Outcome of one [`Scenario::step`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepReport {
    pub tick: Tick,
    /// Units damaged by the zone this tick
    pub zone_hits: usize,
    /// Units that died and started respawning
    pub respawns: usize,
    /// Collision queries made while moving enemies
    pub collision_queries: usize,
}

/// Outcome of one [`Scenario::probe_candidates`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeOutcome {
    /// Least dangerous reachable position (our current one if nothing beats it)
    pub best: Vec2,
    pub danger: f64,
    /// Candidates evaluated, our current position included
    pub evaluated: usize,
    /// Candidates dropped as unreachable
    pub blocked: usize,
    pub collision_queries: usize,
}

/// A generated match with all tactical state
pub struct Scenario {
    constants: Constants,
    obstacles: Vec<Obstacle>,
    grid: ObstacleGrid,
    snapshot: WorldSnapshot,
    zone: ZoneMover,
    danger: DangerField,
    rng: StdRng,
}

impl Scenario {
    /// Generate a match; the same seed and settings give the same match
    pub fn generate(seed: u64, constants: Constants, settings: ScenarioSettings) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let bounds = constants.bounds;
        let center = Vec2::new(
            (bounds.min_x as f64 + bounds.max_x as f64) * 0.5,
            (bounds.min_y as f64 + bounds.max_y as f64) * 0.5,
        );
        let half_extent = (bounds.width().min(bounds.height()) as f64) * 0.5;

        let obstacles: Vec<Obstacle> = (0..settings.obstacle_count)
            .map(|i| {
                let radius = rng.gen_range(OBSTACLE_MIN_RADIUS..OBSTACLE_MAX_RADIUS);
                Obstacle {
                    id: i as i32,
                    position: random_point(&mut rng, center, half_extent),
                    radius,
                    can_shoot_through: rng.gen_bool(SHOOT_THROUGH_CHANCE),
                }
            })
            .collect();
        let grid = ObstacleGrid::from_constants(&obstacles, &constants);

        let me = free_position(&mut rng, &obstacles, center, 0.0, constants.unit_radius);
        let mut units = vec![Unit::new(0, MY_PLAYER, me)];

        for i in 0..settings.enemy_count {
            let position = free_position(&mut rng, &obstacles, me, ENEMY_SPAWN_RADIUS, constants.unit_radius);
            let mut enemy = Unit::new(i as i32 + 1, i as PlayerId + 1, position);
            enemy.velocity =
                Vec2::from_angle(rng.gen_range(-std::f64::consts::PI..std::f64::consts::PI))
                    * rng.gen_range(ENEMY_MIN_SPEED..ENEMY_MAX_SPEED);
            enemy.direction = (me - position).normalize();
            if !constants.weapons.is_empty() {
                let weapon = WeaponId(rng.gen_range(0..constants.weapons.len()));
                enemy.weapon = Some(weapon);
                enemy.set_ammo(weapon, rng.gen_range(0..20));
            }
            if constants.max_shield > 0.0 {
                enemy.shield = rng.gen_range(0.0..constants.max_shield);
            }
            if constants.spawn_time > 0.0 && rng.gen_bool(SPAWNING_CHANCE) {
                enemy.remaining_spawn_time = Some(rng.gen_range(0.0..constants.spawn_time));
            }
            units.push(enemy);
        }

        let zone = Zone {
            current_center: center,
            current_radius: half_extent,
            next_center: random_point(&mut rng, center, half_extent * (1.0 - NEXT_ZONE_SCALE)),
            next_radius: half_extent * NEXT_ZONE_SCALE,
        };

        tracing::info!(
            "Scenario generated: seed {}, {} enemies, {} obstacles, zone radius {:.1}",
            seed,
            settings.enemy_count,
            obstacles.len(),
            zone.current_radius
        );

        Self {
            danger: DangerField::new(bounds),
            snapshot: WorldSnapshot {
                current_tick: 0,
                my_id: MY_PLAYER,
                units,
                zone,
            },
            zone: ZoneMover::new(zone),
            constants,
            obstacles,
            grid,
            rng,
        }
    }

    pub fn constants(&self) -> &Constants {
        &self.constants
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn snapshot(&self) -> &WorldSnapshot {
        &self.snapshot
    }

    pub fn danger_field(&self) -> &DangerField {
        &self.danger
    }

    /// Our unit (always the first one)
    pub fn my_unit(&self) -> &Unit {
        &self.snapshot.units[0]
    }

    /// Advance the match by one tick
    pub fn step(&mut self) -> StepReport {
        let constants = &self.constants;
        self.snapshot.current_tick += 1;
        let tick = self.snapshot.current_tick;

        self.zone.next_tick(constants);
        self.snapshot.zone = self.zone.zone;

        let mut report = StepReport {
            tick,
            ..StepReport::default()
        };
        let my_position = self.snapshot.units[0].position;
        let dt = constants.tick_time();

        for unit in &mut self.snapshot.units {
            tick_respawn_time(unit, constants);
            if apply_zone_damage(unit, &self.zone, tick, constants) {
                report.zone_hits += 1;
            }
            if unit.health <= 0.0 {
                unit.health = constants.max_health;
                unit.shield = 0.0;
                unit.remaining_spawn_time = Some(constants.spawn_time);
                report.respawns += 1;
                tracing::debug!("Unit {} died and is respawning", unit.id);
            }

            if unit.player_id == MY_PLAYER || unit.is_spawning() {
                continue;
            }

            let next = unit.position + unit.velocity * dt;
            report.collision_queries += 1;
            let blocked = !constants.bounds.contains(next.x, next.y)
                || closest_collision(
                    &self.grid,
                    unit.position,
                    next,
                    constants.unit_radius,
                    None,
                    CollisionFilter::Movement,
                )
                .is_some();
            if blocked {
                let jitter = self.rng.gen_range(-BOUNCE_JITTER..BOUNCE_JITTER);
                unit.velocity = (-unit.velocity).rotate(jitter);
            } else {
                unit.position = next;
            }

            let facing = (my_position - unit.position).normalize();
            if facing != Vec2::ZERO {
                unit.direction = facing;
            }
        }

        report
    }

    /// Score a ring of `count` candidates around our unit and return the best
    ///
    /// Candidates our unit cannot reach in a straight line, or that lie off
    /// the map, are skipped. Staying put is always a candidate.
    pub fn probe_candidates<S>(&mut self, count: usize, sink: &mut S) -> ProbeOutcome
    where
        S: DebugSink + ?Sized,
    {
        let constants = &self.constants;
        let origin = self.snapshot.units[0].position;
        let future_zone = ZoneMover::new(self.zone.predict(ZONE_LOOKAHEAD_TICKS, constants));

        let mut outcome = ProbeOutcome {
            best: origin,
            danger: f64::INFINITY,
            evaluated: 0,
            blocked: 0,
            collision_queries: 0,
        };

        let ring = (0..count).map(|i| {
            let angle = std::f64::consts::TAU * i as f64 / count as f64;
            origin + Vec2::from_angle(angle) * PROBE_RADIUS
        });

        for candidate in std::iter::once(origin).chain(ring) {
            if candidate != origin {
                if !constants.bounds.contains(candidate.x, candidate.y) {
                    outcome.blocked += 1;
                    continue;
                }
                outcome.collision_queries += 1;
                let collision = closest_collision(
                    &self.grid,
                    origin,
                    candidate,
                    constants.unit_radius,
                    None,
                    CollisionFilter::Movement,
                );
                if collision.is_some() {
                    outcome.blocked += 1;
                    continue;
                }
            }

            let mut danger =
                self.danger
                    .evaluate_including_obstacles(candidate, &self.snapshot, &self.grid, constants, sink);
            if future_zone.is_touching_zone(candidate, constants) {
                danger += ZONE_PENALTY;
            }
            outcome.evaluated += 1;

            if danger < outcome.danger {
                outcome.danger = danger;
                outcome.best = candidate;
            }
        }

        if sink.is_enabled() && outcome.best != origin {
            sink.add_segment(origin, outcome.best, 0.1, BEST_COLOR);
        }

        outcome
    }

    /// Move our unit toward `target` at its speed for one tick
    pub fn move_my_unit(&mut self, target: Vec2) {
        let max_step = MY_SPEED * self.constants.tick_time();
        let me = &mut self.snapshot.units[0];
        let offset = target - me.position;
        let distance = offset.norm();
        if distance <= max_step {
            me.position = target;
        } else {
            me.position += offset * (max_step / distance);
        }
    }
}

fn random_point(rng: &mut StdRng, center: Vec2, radius: f64) -> Vec2 {
    if radius <= 0.0 {
        return center;
    }
    let angle = rng.gen_range(0.0..std::f64::consts::TAU);
    // sqrt keeps the distribution uniform over the disk
    let distance = radius * rng.gen_range(0.0f64..1.0).sqrt();
    center + Vec2::from_angle(angle) * distance
}

/// Random point near `center` not overlapping any obstacle
///
/// Gives up after a fixed number of tries and returns the last sample.
fn free_position(rng: &mut StdRng, obstacles: &[Obstacle], center: Vec2, radius: f64, unit_radius: f64) -> Vec2 {
    let mut position = random_point(rng, center, radius);
    for _ in 0..32 {
        let overlaps = obstacles
            .iter()
            .any(|o| o.position.distance_to(position) < o.radius + unit_radius);
        if !overlaps {
            break;
        }
        position = random_point(rng, center, radius.max(OBSTACLE_MAX_RADIUS * 2.0));
    }
    position
}
