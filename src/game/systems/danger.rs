//! Danger field evaluation
//!
//! Scores how exposed a position is to enemy fire this tick. Scores are only
//! meaningful relative to each other: the policy compares many candidate
//! positions per tick and picks the least exposed one.
//!
//! Evaluation is memoized per integer map cell. A cell's value is valid only
//! for the tick it was computed in, so the cache is never cleared; a stale
//! tick stamp is enough to force recomputation.

use smallvec::SmallVec;

use crate::game::constants::danger::*;
use crate::game::constants::{Constants, MapBounds};
use crate::game::debug::{Color, DebugSink};
use crate::game::spatial::ObstacleLookup;
use crate::game::state::{Tick, Unit, WorldSnapshot};
use crate::util::geometry::{angle_difference, sqr};
use crate::util::vec2::Vec2;

const CELL_COLOR: Color = Color::new(0.0, 0.0, 0.0, 0.5);
const TEXT_COLOR: Color = Color::new(1.0, 1.0, 1.0, 0.9);

/// Danger a single enemy poses to `position`
///
/// Product of a facing factor, a distance factor and a weapon factor.
pub fn calculate_danger(position: Vec2, enemy: &Unit) -> f64 {
    let distance_vec = position - enemy.position;

    let angle_diff = angle_difference(enemy.direction.angle(), distance_vec.angle()).abs();
    let offset = (angle_diff - FACING_FULL_DANGER_ANGLE).clamp(0.0, FACING_FALLOFF_SPAN);
    let mut danger = 1.0 - offset / FACING_NORMALIZATION;

    let distance = distance_vec.norm();
    danger *= MAX_DANGER_DISTANCE / distance.max(MAX_DANGER_DISTANCE);

    match enemy.armed_weapon() {
        Some(weapon) => {
            danger *= WEAPON_DANGER
                .get(weapon.index())
                .copied()
                .unwrap_or(UNKNOWN_WEAPON_DANGER);
            if weapon.index() == CLOSE_RANGE_WEAPON && distance < MAX_DANGER_DISTANCE {
                danger *= CLOSE_RANGE_BOOST;
            }
        }
        None => danger *= UNARMED_DANGER,
    }

    danger
}

/// Per-enemy danger source used by [`DangerField`]
pub trait ThreatModel {
    fn unit_danger(&self, position: Vec2, enemy: &Unit) -> f64;
}

/// Facing, distance and weapon based threat ([`calculate_danger`])
#[derive(Debug, Default, Clone, Copy)]
pub struct WeaponThreat;

impl ThreatModel for WeaponThreat {
    #[inline]
    fn unit_danger(&self, position: Vec2, enemy: &Unit) -> f64 {
        calculate_danger(position, enemy)
    }
}

/// Weight of the smaller danger of two enemies seen `angle_diff` apart
///
/// Threats from clearly different directions cannot both be dodged, so they
/// stack; nearly aligned threats mostly overlap.
pub fn pair_coefficient(angle_diff: f64) -> f64 {
    if angle_diff <= PAIR_MIN_ANGLE {
        PAIR_MIN_COEFF
    } else if angle_diff >= PAIR_MAX_ANGLE {
        PAIR_MAX_COEFF
    } else {
        let per_radian = (PAIR_MAX_COEFF - PAIR_MIN_COEFF) / (PAIR_MAX_ANGLE - PAIR_MIN_ANGLE);
        PAIR_MIN_COEFF + per_radian * (angle_diff - PAIR_MIN_ANGLE)
    }
}

/// Integer grid coordinates of a danger cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellIndex {
    pub x: usize,
    pub y: usize,
}

#[derive(Debug, Clone, Copy, Default)]
struct DangerCell {
    last_computed_tick: Option<Tick>,
    value: f64,
}

/// Cache counters since the cache was created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub recomputes: u64,
    /// Queries that fell outside the map and were clamped onto its edge
    pub clamped: u64,
}

/// Match-long grid of tick-stamped danger values
pub struct DangerCache {
    min_x: i32,
    min_y: i32,
    width: usize,
    height: usize,
    /// Row-major, `width * height` cells
    cells: Vec<DangerCell>,
    stats: CacheStats,
}

impl DangerCache {
    pub fn new(bounds: MapBounds) -> Self {
        let width = bounds.width().max(1);
        let height = bounds.height().max(1);
        Self {
            min_x: bounds.min_x,
            min_y: bounds.min_y,
            width,
            height,
            cells: vec![DangerCell::default(); width * height],
            stats: CacheStats::default(),
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Unclamped grid offsets of a world position
    ///
    /// Coordinates are truncated toward zero, then shifted by the map
    /// minimum. Kept in f64 so huge or infinite inputs cannot overflow.
    #[inline]
    fn offsets(&self, position: Vec2) -> (f64, f64) {
        (
            position.x.trunc() - self.min_x as f64,
            position.y.trunc() - self.min_y as f64,
        )
    }

    /// Cell containing `position`, `None` when it lies outside the map
    pub fn cell_of(&self, position: Vec2) -> Option<CellIndex> {
        if !position.is_finite() {
            return None;
        }
        let (x, y) = self.offsets(position);
        if x < 0.0 || y < 0.0 || x >= self.width as f64 || y >= self.height as f64 {
            return None;
        }
        Some(CellIndex {
            x: x as usize,
            y: y as usize,
        })
    }

    /// Cell containing `position`, or the nearest edge cell when outside the map
    ///
    /// A NaN coordinate maps to the minimum edge on that axis.
    pub fn clamped_cell(&self, position: Vec2) -> CellIndex {
        let (x, y) = self.offsets(position);
        CellIndex {
            x: clamp_offset(x, self.width),
            y: clamp_offset(y, self.height),
        }
    }

    /// World position every query in `cell` is evaluated at
    #[inline]
    pub fn cell_position(&self, cell: CellIndex) -> Vec2 {
        Vec2::new(
            (cell.x as i64 + self.min_x as i64) as f64,
            (cell.y as i64 + self.min_y as i64) as f64,
        )
    }

    #[inline]
    fn slot(&self, cell: CellIndex) -> usize {
        cell.y * self.width + cell.x
    }

    /// Cached value of `cell`, only if it was computed during `tick`
    pub fn get(&self, cell: CellIndex, tick: Tick) -> Option<f64> {
        let entry = &self.cells[self.slot(cell)];
        (entry.last_computed_tick == Some(tick)).then_some(entry.value)
    }

    pub fn store(&mut self, cell: CellIndex, tick: Tick, value: f64) {
        let slot = self.slot(cell);
        self.cells[slot] = DangerCell {
            last_computed_tick: Some(tick),
            value,
        };
    }
}

#[inline]
fn clamp_offset(offset: f64, len: usize) -> usize {
    if offset.is_nan() {
        0
    } else {
        offset.clamp(0.0, (len - 1) as f64) as usize
    }
}

/// Danger evaluator owning the match-long cache
pub struct DangerField<M = WeaponThreat> {
    cache: DangerCache,
    model: M,
}

impl DangerField<WeaponThreat> {
    pub fn new(bounds: MapBounds) -> Self {
        Self::with_model(bounds, WeaponThreat)
    }
}

impl<M: ThreatModel> DangerField<M> {
    pub fn with_model(bounds: MapBounds, model: M) -> Self {
        Self {
            cache: DangerCache::new(bounds),
            model,
        }
    }

    #[inline]
    pub fn cache(&self) -> &DangerCache {
        &self.cache
    }

    #[inline]
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Enemy fire exposure at `position` for the snapshot's tick
    ///
    /// All positions truncating to the same integer point share a value,
    /// computed at that point. Positions outside the map are clamped onto
    /// its edge.
    pub fn evaluate(&mut self, position: Vec2, snapshot: &WorldSnapshot) -> f64 {
        let cell = match self.cache.cell_of(position) {
            Some(cell) => cell,
            None => {
                self.cache.stats.clamped += 1;
                tracing::trace!(?position, "danger query outside map, clamping");
                self.cache.clamped_cell(position)
            }
        };

        if let Some(value) = self.cache.get(cell, snapshot.current_tick) {
            self.cache.stats.hits += 1;
            return value;
        }
        self.cache.stats.recomputes += 1;

        let target = self.cache.cell_position(cell);
        let value = self.compute(target, snapshot);
        self.cache.store(cell, snapshot.current_tick, value);
        value
    }

    fn compute(&self, target: Vec2, snapshot: &WorldSnapshot) -> f64 {
        // (bearing from target, danger)
        let mut units_danger: SmallVec<[(f64, f64); 16]> = SmallVec::new();
        let mut sum_danger = 0.0;

        for unit in snapshot.enemies() {
            let position_diff = unit.position - target;
            let danger = self.model.unit_danger(target, unit);
            units_danger.push((position_diff.angle(), danger));
            if position_diff.sqr_norm() < sqr(MAX_DANGER_DISTANCE) {
                sum_danger += danger;
            }
        }

        for (i, &(angle, danger)) in units_danger.iter().enumerate() {
            for &(other_angle, other_danger) in &units_danger[i + 1..] {
                let angle_diff = angle_difference(angle, other_angle).abs();
                sum_danger += pair_coefficient(angle_diff) * danger.min(other_danger);
            }
        }

        sum_danger
    }

    /// [`Self::evaluate`] plus a penalty for every obstacle close to `position`
    ///
    /// Each obstacle whose edge is closer than the penalty distance (counting
    /// the unit's own radius) adds a share growing linearly to the maximum
    /// at contact. The result is pushed to `sink` when it is enabled.
    pub fn evaluate_including_obstacles<L, S>(
        &mut self,
        position: Vec2,
        snapshot: &WorldSnapshot,
        lookup: &L,
        constants: &Constants,
        sink: &mut S,
    ) -> f64
    where
        L: ObstacleLookup + ?Sized,
        S: DebugSink + ?Sized,
    {
        let mut danger = self.evaluate(position, snapshot);

        for obstacle in lookup.nearby(position) {
            let distance = ((obstacle.position - position).norm() - obstacle.radius - constants.unit_radius).max(0.0);
            if distance >= OBSTACLE_MAX_DISTANCE {
                continue;
            }
            danger += (OBSTACLE_MAX_DISTANCE - distance) / OBSTACLE_MAX_DISTANCE * OBSTACLE_MAX_PENALTY;
        }

        if sink.is_enabled() {
            sink.add_rect(position - Vec2::new(0.5, 0.5), Vec2::ONE, CELL_COLOR);
            sink.add_placed_text(position, &format!("{danger:.4}"), Vec2::new(0.5, 0.5), 0.05, TEXT_COLOR);
        }

        danger
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::debug::{DebugShape, NoopDebugSink, RecordingDebugSink};
    use crate::game::state::{Obstacle, WeaponId, Zone};
    use proptest::prelude::*;
    use std::cell::Cell;
    use std::f64::consts::PI;

    const EPSILON: f64 = 1e-9;

    fn bounds() -> MapBounds {
        MapBounds {
            min_x: -50,
            min_y: -50,
            max_x: 50,
            max_y: 50,
        }
    }

    fn enemy(position: Vec2, facing: Vec2, weapon: Option<usize>) -> Unit {
        let mut unit = Unit::new(2, 2, position);
        unit.direction = facing.normalize();
        if let Some(weapon) = weapon {
            unit.weapon = Some(WeaponId(weapon));
            unit.set_ammo(WeaponId(weapon), 10);
        }
        unit
    }

    /// Armed with the strongest weapon, facing the origin
    fn facing_origin(position: Vec2) -> Unit {
        enemy(position, -position, Some(2))
    }

    fn snapshot(tick: Tick, enemies: Vec<Unit>) -> WorldSnapshot {
        let mut units = vec![Unit::new(1, 1, Vec2::ZERO)];
        units.extend(enemies);
        WorldSnapshot {
            current_tick: tick,
            my_id: 1,
            units,
            zone: Zone {
                current_center: Vec2::ZERO,
                current_radius: 100.0,
                next_center: Vec2::ZERO,
                next_radius: 50.0,
            },
        }
    }

    struct CountingThreat {
        calls: Cell<usize>,
    }

    impl ThreatModel for CountingThreat {
        fn unit_danger(&self, _position: Vec2, _enemy: &Unit) -> f64 {
            self.calls.set(self.calls.get() + 1);
            0.5
        }
    }

    #[test]
    fn test_calculate_danger_facing_close() {
        let unit = enemy(Vec2::ZERO, Vec2::RIGHT, Some(2));
        assert!((calculate_danger(Vec2::new(3.0, 0.0), &unit) - 1.0).abs() < EPSILON);
        // Still inside the 30 degree cone
        let inside_cone = Vec2::from_angle(PI / 7.0) * 3.0;
        assert!((calculate_danger(inside_cone, &unit) - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_calculate_danger_distance_falloff() {
        let unit = enemy(Vec2::ZERO, Vec2::RIGHT, Some(2));
        assert!((calculate_danger(Vec2::new(14.0, 0.0), &unit) - 0.5).abs() < EPSILON);
        assert!((calculate_danger(Vec2::new(7.0, 0.0), &unit) - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_calculate_danger_behind() {
        let unit = enemy(Vec2::ZERO, Vec2::RIGHT, Some(2));
        assert!((calculate_danger(Vec2::new(-3.0, 0.0), &unit) - 0.2).abs() < EPSILON);
        // 90 degrees off: 60 degrees past the cone out of 150
        let side = calculate_danger(Vec2::new(0.0, 3.0), &unit);
        assert!((side - 0.6).abs() < EPSILON);
    }

    #[test]
    fn test_calculate_danger_weapons() {
        let position = Vec2::new(3.0, 0.0);
        let wand = enemy(Vec2::ZERO, Vec2::RIGHT, Some(0));
        assert!((calculate_danger(position, &wand) - 0.34).abs() < EPSILON);

        let staff = enemy(Vec2::ZERO, Vec2::RIGHT, Some(1));
        assert!((calculate_danger(position, &staff) - 0.6666 * 1.55).abs() < EPSILON);
        // No close-range boost from 7 units on
        let far = calculate_danger(Vec2::new(14.0, 0.0), &staff);
        assert!((far - 0.6666 * 0.5).abs() < EPSILON);

        let unarmed = enemy(Vec2::ZERO, Vec2::RIGHT, None);
        assert!((calculate_danger(position, &unarmed) - 0.01).abs() < EPSILON);

        let mut empty = enemy(Vec2::ZERO, Vec2::RIGHT, Some(2));
        empty.set_ammo(WeaponId(2), 0);
        assert!((calculate_danger(position, &empty) - 0.01).abs() < EPSILON);
    }

    #[test]
    fn test_pair_coefficient() {
        assert_eq!(pair_coefficient(0.0), 0.0);
        assert_eq!(pair_coefficient(PAIR_MIN_ANGLE), 0.0);
        assert_eq!(pair_coefficient(PAIR_MAX_ANGLE), 1.0);
        assert_eq!(pair_coefficient(PI), 1.0);
        let mid = pair_coefficient(85f64.to_radians());
        assert!((mid - 0.5).abs() < EPSILON);
    }

    #[test]
    fn test_opposite_enemies_stack() {
        let mut field = DangerField::new(bounds());
        let snapshot = snapshot(
            1,
            vec![facing_origin(Vec2::new(3.0, 0.0)), facing_origin(Vec2::new(-3.0, 0.0))],
        );
        // Two direct hits plus the full pair term
        assert!((field.evaluate(Vec2::ZERO, &snapshot) - 3.0).abs() < EPSILON);
    }

    #[test]
    fn test_aligned_enemies_do_not_stack() {
        let mut field = DangerField::new(bounds());
        let snapshot = snapshot(
            1,
            vec![facing_origin(Vec2::new(3.0, 0.0)), facing_origin(Vec2::new(5.0, 0.0))],
        );
        assert!((field.evaluate(Vec2::ZERO, &snapshot) - 2.0).abs() < EPSILON);
    }

    #[test]
    fn test_pair_term_interpolates() {
        let mut field = DangerField::new(bounds());
        let snapshot = snapshot(
            1,
            vec![
                facing_origin(Vec2::new(3.0, 0.0)),
                facing_origin(Vec2::from_angle(85f64.to_radians()) * 3.0),
            ],
        );
        assert!((field.evaluate(Vec2::ZERO, &snapshot) - 2.5).abs() < 1e-6);
    }

    #[test]
    fn test_far_enemies_only_count_in_pairs() {
        let mut field = DangerField::new(bounds());
        let snapshot = snapshot(
            1,
            vec![facing_origin(Vec2::new(14.0, 0.0)), facing_origin(Vec2::new(-14.0, 0.0))],
        );
        assert!((field.evaluate(Vec2::ZERO, &snapshot) - 0.5).abs() < EPSILON);
    }

    #[test]
    fn test_own_units_are_ignored() {
        let mut field = DangerField::new(bounds());
        let mut snapshot = snapshot(1, Vec::new());
        let mut friend = facing_origin(Vec2::new(3.0, 0.0));
        friend.player_id = snapshot.my_id;
        snapshot.units.push(friend);
        assert_eq!(field.evaluate(Vec2::ZERO, &snapshot), 0.0);
    }

    #[test]
    fn test_same_tick_same_cell_is_memoized() {
        let model = CountingThreat { calls: Cell::new(0) };
        let mut field = DangerField::with_model(bounds(), model);
        let snapshot = snapshot(
            5,
            vec![facing_origin(Vec2::new(3.0, 0.0)), facing_origin(Vec2::new(-3.0, 0.0))],
        );

        let first = field.evaluate(Vec2::new(10.2, 10.7), &snapshot);
        let second = field.evaluate(Vec2::new(10.9, 10.1), &snapshot);
        assert_eq!(first, second);
        assert_eq!(field.model().calls.get(), 2);
        assert_eq!(field.cache().stats().hits, 1);
        assert_eq!(field.cache().stats().recomputes, 1);
    }

    #[test]
    fn test_new_tick_recomputes() {
        let model = CountingThreat { calls: Cell::new(0) };
        let mut field = DangerField::with_model(bounds(), model);
        let enemies = vec![facing_origin(Vec2::new(3.0, 0.0)), facing_origin(Vec2::new(-3.0, 0.0))];

        field.evaluate(Vec2::new(1.5, 1.5), &snapshot(5, enemies.clone()));
        field.evaluate(Vec2::new(1.5, 1.5), &snapshot(6, enemies));
        assert_eq!(field.model().calls.get(), 4);
        assert_eq!(field.cache().stats().recomputes, 2);
        assert_eq!(field.cache().stats().hits, 0);
    }

    #[test]
    fn test_new_tick_sees_moved_enemies() {
        let mut field = DangerField::new(bounds());
        let near = snapshot(1, vec![facing_origin(Vec2::new(3.0, 0.0))]);
        let gone = snapshot(2, vec![facing_origin(Vec2::new(40.0, 0.0))]);
        let before = field.evaluate(Vec2::ZERO, &near);
        let after = field.evaluate(Vec2::ZERO, &gone);
        assert!(before > after);
        assert_eq!(after, 0.0);
    }

    #[test]
    fn test_cells_are_addressed_by_truncation() {
        let cache = DangerCache::new(bounds());
        assert_eq!(cache.cell_of(Vec2::new(-50.0, -50.0)), Some(CellIndex { x: 0, y: 0 }));
        // Negative coordinates truncate toward zero
        assert_eq!(cache.cell_of(Vec2::new(-0.5, -0.5)), Some(CellIndex { x: 50, y: 50 }));
        assert_eq!(cache.cell_of(Vec2::new(-1.5, 0.5)), Some(CellIndex { x: 49, y: 50 }));
        assert_eq!(cache.cell_of(Vec2::new(49.99, 0.0)), Some(CellIndex { x: 99, y: 50 }));
        assert_eq!(cache.cell_of(Vec2::new(50.0, 0.0)), None);
        assert_eq!(cache.cell_of(Vec2::new(0.0, -51.0)), None);
        assert_eq!(cache.cell_of(Vec2::new(f64::NAN, 0.0)), None);
        assert_eq!(cache.cell_position(CellIndex { x: 50, y: 50 }), Vec2::ZERO);
        assert_eq!(cache.cell_position(CellIndex { x: 49, y: 50 }), Vec2::new(-1.0, 0.0));
    }

    #[test]
    fn test_negative_position_evaluated_at_truncated_point() {
        let mut field = DangerField::new(bounds());
        let snapshot = snapshot(1, vec![facing_origin(Vec2::new(3.0, 0.0))]);
        let at_origin = field.evaluate(Vec2::ZERO, &snapshot);
        let nearby = field.evaluate(Vec2::new(-0.5, -0.5), &snapshot);
        assert_eq!(at_origin, nearby);
        assert_eq!(field.cache().stats().hits, 1);
    }

    #[test]
    fn test_extreme_queries_clamp_to_the_matching_edge() {
        let cache = DangerCache::new(bounds());
        let right = CellIndex { x: cache.width() - 1, y: 50 };
        assert_eq!(cache.clamped_cell(Vec2::new(f64::INFINITY, 0.0)), right);
        assert_eq!(cache.clamped_cell(Vec2::new(1e19, 0.0)), right);
        assert_eq!(cache.clamped_cell(Vec2::new(f64::NEG_INFINITY, 0.0)), CellIndex { x: 0, y: 50 });
        assert_eq!(cache.clamped_cell(Vec2::new(-1e19, 0.0)), CellIndex { x: 0, y: 50 });
        assert_eq!(cache.clamped_cell(Vec2::new(f64::NAN, 0.0)), CellIndex { x: 0, y: 50 });

        let mut field = DangerField::new(bounds());
        let snapshot = snapshot(1, vec![facing_origin(Vec2::new(45.0, 0.0))]);
        let edge = field.evaluate(Vec2::new(49.5, 0.0), &snapshot);
        assert_eq!(field.evaluate(Vec2::new(f64::INFINITY, 0.0), &snapshot), edge);
        assert_eq!(field.evaluate(Vec2::new(1e19, 0.0), &snapshot), edge);
        assert!(field.evaluate(Vec2::new(f64::NAN, 0.0), &snapshot).is_finite());
        assert_eq!(field.cache().stats().clamped, 3);
    }

    #[test]
    fn test_out_of_bounds_queries_are_clamped() {
        let mut field = DangerField::new(bounds());
        let snapshot = snapshot(1, vec![facing_origin(Vec2::new(45.0, 45.0))]);
        let edge = field.evaluate(Vec2::new(49.5, 49.5), &snapshot);
        let outside = field.evaluate(Vec2::new(1000.0, 1000.0), &snapshot);
        assert_eq!(edge, outside);
        assert_eq!(field.cache().stats().clamped, 1);
        assert_eq!(field.cache().stats().hits, 1);

        let cache = field.cache();
        assert_eq!(
            cache.clamped_cell(Vec2::new(-1e9, 1e9)),
            CellIndex {
                x: 0,
                y: cache.height() - 1
            }
        );
    }

    #[test]
    fn test_obstacle_penalty() {
        let constants = Constants {
            unit_radius: 1.0,
            ..Constants::default()
        };
        let mut field = DangerField::new(bounds());
        let snapshot = snapshot(1, Vec::new());
        let obstacles = vec![Obstacle {
            id: 1,
            position: Vec2::new(5.0, 0.0),
            radius: 1.0,
            can_shoot_through: false,
        }];

        // Edge exactly at the penalty distance
        let clear = field.evaluate_including_obstacles(Vec2::ZERO, &snapshot, &obstacles, &constants, &mut NoopDebugSink);
        assert_eq!(clear, 0.0);

        let near = field.evaluate_including_obstacles(
            Vec2::new(1.0, 0.0),
            &snapshot,
            &obstacles,
            &constants,
            &mut NoopDebugSink,
        );
        assert!((near - 1.0 / 3.0).abs() < EPSILON);

        let contact = field.evaluate_including_obstacles(
            Vec2::new(4.0, 0.0),
            &snapshot,
            &obstacles,
            &constants,
            &mut NoopDebugSink,
        );
        assert!((contact - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_obstacle_penalty_adds_to_enemy_danger() {
        let constants = Constants::default();
        let mut field = DangerField::new(bounds());
        let snapshot = snapshot(
            1,
            vec![facing_origin(Vec2::new(3.0, 0.0)), facing_origin(Vec2::new(-3.0, 0.0))],
        );
        let obstacles = vec![Obstacle {
            id: 1,
            position: Vec2::new(0.0, 3.5),
            radius: 1.0,
            can_shoot_through: true,
        }];
        let mut sink = RecordingDebugSink::new();
        let danger = field.evaluate_including_obstacles(Vec2::ZERO, &snapshot, &obstacles, &constants, &mut sink);
        // Edge distance 1.5 gives half the maximum
        assert!((danger - 3.5).abs() < EPSILON);

        let shapes = sink.drain();
        assert_eq!(shapes.len(), 2);
        assert!(matches!(shapes[0], DebugShape::Rect { .. }));
        assert!(matches!(&shapes[1], DebugShape::Text { text, .. } if text == "3.5000"));
    }

    proptest! {
        #[test]
        fn prop_danger_non_increasing_with_distance(
            near in 0.01f64..100.0,
            extra in 0.0f64..100.0,
            weapon in proptest::option::of(0usize..4),
            facing in -PI..PI,
        ) {
            let origin = Vec2::new(2.0, -3.0);
            let direction = Vec2::from_angle(facing);
            let unit = enemy(origin, direction, weapon);
            let close = calculate_danger(origin + direction * near, &unit);
            let far = calculate_danger(origin + direction * (near + extra), &unit);
            prop_assert!(close + 1e-12 >= far);
        }
    }
}
