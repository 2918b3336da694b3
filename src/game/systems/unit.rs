//! Per-unit state stepping: spawn countdown and damage application
//!
//! [`apply_damage`] is the only place shield and health are reduced.

use crate::game::constants::unit::{SHIELD_BREAK_EPSILON, SPAWN_TIME_EPSILON};
use crate::game::constants::Constants;
use crate::game::state::{Tick, Unit};
use crate::game::systems::zone::ZoneMover;

/// Advance the spawn countdown by one tick, clearing it once spawning is done
pub fn tick_respawn_time(unit: &mut Unit, constants: &Constants) {
    if let Some(remaining) = unit.remaining_spawn_time {
        let remaining = remaining - constants.tick_time();
        unit.remaining_spawn_time = if remaining < SPAWN_TIME_EPSILON {
            None
        } else {
            Some(remaining)
        };
    }
}

/// Apply incoming damage to shield first, then health
///
/// Breaking the shield postpones health regeneration by the configured
/// delay, counted from `current_tick`.
pub fn apply_damage(unit: &mut Unit, incoming_damage: f64, current_tick: Tick, constants: &Constants) {
    if incoming_damage - SHIELD_BREAK_EPSILON > unit.shield {
        unit.health -= incoming_damage - unit.shield;
        unit.shield = 0.0;
        unit.health_regeneration_start_tick =
            Some(current_tick.saturating_add(constants.health_regeneration_delay_ticks));
    } else {
        unit.shield = (unit.shield - incoming_damage).max(0.0);
    }
}

/// Apply one tick of zone damage if the unit touches the zone boundary
///
/// Returns whether damage was applied.
pub fn apply_zone_damage(unit: &mut Unit, zone: &ZoneMover, current_tick: Tick, constants: &Constants) -> bool {
    if unit.is_spawning() || !zone.is_touching_zone(unit.position, constants) {
        return false;
    }
    let damage = constants.zone_damage_per_second * constants.tick_time();
    apply_damage(unit, damage, current_tick, constants);
    tracing::trace!(unit_id = unit.id, damage, health = unit.health, "zone damage");
    true
}
