//! Safe zone simulation
//!
//! The live zone converges linearly toward its next circle, shrinking by a
//! fixed amount every tick. Once it is no larger than the target it keeps
//! shrinking in place.

use crate::game::constants::Constants;
use crate::game::state::Zone;
use crate::util::vec2::Vec2;

/// Steps a [`Zone`] forward one tick at a time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneMover {
    pub zone: Zone,
}

impl ZoneMover {
    pub fn new(zone: Zone) -> Self {
        Self { zone }
    }

    pub fn next_tick(&mut self, constants: &Constants) {
        let speed = constants.zone_speed_per_tick;
        let zone = &mut self.zone;

        if zone.current_radius <= zone.next_radius {
            zone.current_radius = (zone.current_radius - speed).max(0.0);
            return;
        }

        // Less than half a step left rounds to zero ticks; finish in one
        let ticks_to_reach = ((zone.current_radius - zone.next_radius) / speed).round().max(1.0);
        zone.current_center += (zone.next_center - zone.current_center) * (1.0 / ticks_to_reach);
        zone.current_radius = (zone.current_radius - speed).max(0.0);
    }

    /// Whether a unit at `position` touches or crosses the zone boundary
    #[inline]
    pub fn is_touching_zone(&self, position: Vec2, constants: &Constants) -> bool {
        (position - self.zone.current_center).norm() + constants.unit_radius > self.zone.current_radius
    }

    /// Zone as it will be after `ticks` more ticks
    pub fn predict(&self, ticks: u32, constants: &Constants) -> Zone {
        let mut mover = *self;
        for _ in 0..ticks {
            mover.next_tick(constants);
        }
        mover.zone
    }
}
