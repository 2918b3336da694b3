//! Geometry kernel
//!
//! Pure functions on points, segments and angles used by every tactical
//! query. Angles are radians in `(-π, π]` unless stated otherwise.

use std::f64::consts::{PI, TAU};

use crate::util::vec2::Vec2;

/// Padding added to the Thales circle radius in [`tangential_points`] so a
/// target sitting exactly on the circle still produces two points
const TANGENT_RADIUS_PADDING: f64 = 1e-10;

#[inline]
pub fn sqr(value: f64) -> f64 {
    value * value
}

/// Project `point` onto the segment, clamped to its endpoints
///
/// A zero-length segment returns `segment_start`.
pub fn closest_point_on_segment(point: Vec2, segment_start: Vec2, segment_end: Vec2) -> Vec2 {
    let v = segment_end - segment_start;
    let w = point - segment_start;

    let c1 = v.dot(w);
    if c1 <= 0.0 {
        return segment_start;
    }
    let c2 = v.dot(v);
    if c2 <= c1 {
        return segment_end;
    }
    segment_start + v * (c1 / c2)
}

#[inline]
pub fn segment_point_sqr_distance(point: Vec2, segment_start: Vec2, segment_end: Vec2) -> f64 {
    (closest_point_on_segment(point, segment_start, segment_end) - point).sqr_norm()
}

#[inline]
pub fn segment_point_distance(point: Vec2, segment_start: Vec2, segment_end: Vec2) -> f64 {
    (closest_point_on_segment(point, segment_start, segment_end) - point).norm()
}

/// Wrap any finite angle into `(-π, π]`
pub fn wrap_angle(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

/// Signed shortest rotation from `second` to `first`, in `(-π, π]`
pub fn angle_difference(first: f64, second: f64) -> f64 {
    let mut diff = first - second;
    if diff > PI {
        diff -= TAU;
    } else if diff <= -PI {
        diff += TAU;
    }
    // Inputs outside (-π, π] can leave more than one turn behind
    if diff > PI || diff <= -PI {
        wrap_angle(diff)
    } else {
        diff
    }
}

/// Add whole turns to `angle` until it is at least `lower_bound`
///
/// Non-finite inputs are returned unchanged.
pub fn increase_angle_until(angle: f64, lower_bound: f64) -> f64 {
    if !angle.is_finite() || !lower_bound.is_finite() || angle >= lower_bound {
        return angle;
    }
    let turns = ((lower_bound - angle) / TAU).ceil();
    let mut result = angle + turns * TAU;
    // ceil() works on a rounded quotient, so nudge by at most one turn
    if result < lower_bound {
        result += TAU;
    } else if result - TAU >= lower_bound {
        result -= TAU;
    }
    result
}

#[inline]
pub fn add_angle(angle: f64, angle_to_add: f64) -> f64 {
    wrap_angle(angle + angle_to_add)
}

#[inline]
pub fn subtract_angle(angle: f64, angle_to_subtract: f64) -> f64 {
    wrap_angle(angle - angle_to_subtract)
}

/// Whether sweeping counter-clockwise from `from` reaches `angle` no later than `to`
pub fn angle_is_between_ccw(angle: f64, from: f64, to: f64) -> bool {
    let to = if to < from { to + TAU } else { to };
    let angle = if angle < from { angle + TAU } else { angle };
    angle <= to
}

/// Tangency points on the circle of `radius` around `to`, as seen from `from`
///
/// Intersects that circle with the circle whose diameter is `from`-`to`.
/// Returns `None` when no tangent exists: `from` inside the circle,
/// coincident points, or any non-finite intermediate.
pub fn tangential_points(from: Vec2, to: Vec2, radius: f64) -> Option<(Vec2, Vec2)> {
    let center = (to + from) * 0.5;
    let first_radius_sqr = (center - to).sqr_norm() + TANGENT_RADIUS_PADDING;
    let target = to - center;

    let a = -2.0 * target.x;
    let b = -2.0 * target.y;
    let c = sqr(target.x) + sqr(target.y) + first_radius_sqr - sqr(radius);

    let ab_sqr = a * a + b * b;
    if ab_sqr <= 0.0 {
        return None;
    }
    let x0 = -a * c / ab_sqr;
    let y0 = -b * c / ab_sqr;
    let d = first_radius_sqr - sqr(c) / ab_sqr;
    if d.is_nan() || d < 0.0 {
        return None;
    }
    let mult = (d / ab_sqr).sqrt();

    let first = Vec2::new(x0 + b * mult, y0 - a * mult) + center;
    let second = Vec2::new(x0 - b * mult, y0 + a * mult) + center;
    if first.is_finite() && second.is_finite() {
        Some((first, second))
    } else {
        None
    }
}

/// Whether B passes within `collision_radius` of A during `duration`
///
/// Works in A's rest frame: B moves along a straight segment with the
/// relative velocity and A sits still at its position.
pub fn relative_motion_collision(
    position: Vec2,
    velocity: Vec2,
    other_position: Vec2,
    other_velocity: Vec2,
    duration: f64,
    collision_radius: f64,
) -> bool {
    let relative_velocity = other_velocity - velocity;
    let other_end = other_position + relative_velocity * duration;
    segment_point_sqr_distance(position, other_position, other_end) < sqr(collision_radius)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f64::consts::FRAC_PI_2;

    const EPSILON: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_closest_point_clamps_to_endpoints() {
        let start = Vec2::new(0.0, 0.0);
        let end = Vec2::new(10.0, 0.0);
        assert_eq!(closest_point_on_segment(Vec2::new(-5.0, 3.0), start, end), start);
        assert_eq!(closest_point_on_segment(Vec2::new(15.0, 3.0), start, end), end);
        let mid = closest_point_on_segment(Vec2::new(4.0, 3.0), start, end);
        assert!(mid.approx_eq(Vec2::new(4.0, 0.0), EPSILON));
    }

    #[test]
    fn test_closest_point_zero_length_segment() {
        let p = Vec2::new(2.0, 2.0);
        assert_eq!(closest_point_on_segment(Vec2::new(7.0, 1.0), p, p), p);
    }

    #[test]
    fn test_segment_distances() {
        let start = Vec2::new(0.0, 0.0);
        let end = Vec2::new(10.0, 0.0);
        let point = Vec2::new(5.0, 4.0);
        assert!(approx_eq(segment_point_distance(point, start, end), 4.0));
        assert!(approx_eq(segment_point_sqr_distance(point, start, end), 16.0));
    }

    #[test]
    fn test_angle_difference_wraps() {
        assert!(approx_eq(angle_difference(PI - 0.1, -PI + 0.1), -0.2));
        assert!(approx_eq(angle_difference(-PI + 0.1, PI - 0.1), 0.2));
        assert!(approx_eq(angle_difference(0.5, 0.2), 0.3));
        assert!(approx_eq(angle_difference(PI, 0.0), PI));
        assert!(approx_eq(angle_difference(0.0, PI), PI));
    }

    #[test]
    fn test_increase_angle_until() {
        assert!(approx_eq(increase_angle_until(-PI, 0.0), PI));
        assert!(approx_eq(increase_angle_until(1.0, 0.5), 1.0));
        let far = increase_angle_until(-100.0, 3.0);
        assert!(far >= 3.0 && far < 3.0 + TAU);
        assert!(approx_eq(((far + 100.0) / TAU).round() * TAU, far + 100.0));
    }

    #[test]
    fn test_increase_angle_until_non_finite_terminates() {
        assert_eq!(increase_angle_until(f64::NEG_INFINITY, 0.0), f64::NEG_INFINITY);
        assert_eq!(increase_angle_until(0.0, f64::INFINITY), 0.0);
        assert!(increase_angle_until(f64::NAN, 0.0).is_nan());
    }

    #[test]
    fn test_add_subtract_angle_wrap() {
        assert!(approx_eq(add_angle(PI - 0.1, 0.3), -PI + 0.2));
        assert!(approx_eq(subtract_angle(-PI + 0.1, 0.3), PI - 0.2));
        assert!(approx_eq(add_angle(0.0, 5.0 * TAU + 0.25), 0.25));
    }

    #[test]
    fn test_angle_between_ccw() {
        assert!(angle_is_between_ccw(0.5, 0.0, 1.0));
        assert!(!angle_is_between_ccw(1.5, 0.0, 1.0));
        // Sweep across the ±π seam
        assert!(angle_is_between_ccw(PI, PI - 0.2, -PI + 0.2));
        assert!(angle_is_between_ccw(-PI + 0.1, PI - 0.2, -PI + 0.2));
        assert!(!angle_is_between_ccw(0.0, PI - 0.2, -PI + 0.2));
        assert!(angle_is_between_ccw(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_tangential_points_touch_circle() {
        let from = Vec2::new(0.0, 0.0);
        let to = Vec2::new(10.0, 0.0);
        let (first, second) = tangential_points(from, to, 5.0).unwrap();
        for p in [first, second] {
            assert!((p.distance_to(to) - 5.0).abs() < 1e-6);
            // Radius is perpendicular to the tangent line
            assert!((p - from).dot(p - to).abs() < 1e-6);
        }
        assert!(first.y * second.y < 0.0);
    }

    #[test]
    fn test_tangential_points_infeasible() {
        let from = Vec2::new(0.0, 0.0);
        let to = Vec2::new(10.0, 0.0);
        assert!(tangential_points(from, to, 15.0).is_none());
        assert!(tangential_points(to, to, 1.0).is_none());
        assert!(tangential_points(from, to, f64::NAN).is_none());
        assert!(tangential_points(from, Vec2::new(f64::NAN, 0.0), 1.0).is_none());
    }

    #[test]
    fn test_relative_motion_collision() {
        // B flies straight through A
        assert!(relative_motion_collision(
            Vec2::ZERO,
            Vec2::ZERO,
            Vec2::new(-10.0, 0.5),
            Vec2::new(10.0, 0.0),
            2.0,
            1.0,
        ));
        // Same path but A moves along with B
        assert!(!relative_motion_collision(
            Vec2::ZERO,
            Vec2::new(10.0, 0.0),
            Vec2::new(-10.0, 0.5),
            Vec2::new(10.0, 0.0),
            2.0,
            1.0,
        ));
        // Not enough time to arrive
        assert!(!relative_motion_collision(
            Vec2::ZERO,
            Vec2::ZERO,
            Vec2::new(-10.0, 0.5),
            Vec2::new(10.0, 0.0),
            0.5,
            1.0,
        ));
    }

    proptest! {
        #[test]
        fn prop_collinear_point_is_its_own_projection(
            sx in -100.0f64..100.0, sy in -100.0f64..100.0,
            ex in -100.0f64..100.0, ey in -100.0f64..100.0,
            t in 0.0f64..=1.0,
        ) {
            let start = Vec2::new(sx, sy);
            let end = Vec2::new(ex, ey);
            let point = start.lerp(end, t);
            let closest = closest_point_on_segment(point, start, end);
            prop_assert!(closest.approx_eq(point, 1e-7));
        }

        #[test]
        fn prop_angle_difference_with_self_is_zero(a in -PI..=PI) {
            prop_assert_eq!(angle_difference(a, a), 0.0);
        }

        #[test]
        fn prop_angle_difference_in_range(a in -PI..=PI, b in -PI..=PI) {
            let diff = angle_difference(a, b);
            prop_assert!(diff > -PI && diff <= PI);
        }

        #[test]
        fn prop_add_subtract_are_inverse(a in -PI..=PI, d in -20.0f64..20.0) {
            let back = subtract_angle(add_angle(a, d), d);
            prop_assert!(back > -PI && back <= PI);
            prop_assert!(angle_difference(back, a).abs() < 1e-9);
        }

        #[test]
        fn prop_increase_angle_until_lands_within_one_turn(
            a in -1000.0f64..1000.0, bound in -10.0f64..10.0,
        ) {
            let result = increase_angle_until(a, bound);
            prop_assert!(result >= bound || a >= bound);
            if a < bound {
                prop_assert!(result < bound + TAU);
            }
        }

        #[test]
        fn prop_quarter_sweep_contains_midpoint(from in -PI..=PI) {
            let to = add_angle(from, FRAC_PI_2);
            let mid = add_angle(from, FRAC_PI_2 / 2.0);
            prop_assert!(angle_is_between_ccw(mid, from, to));
        }
    }
}
