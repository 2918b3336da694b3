//! Aim progression and spawn-window shot checks

use crate::game::constants::Constants;
use crate::game::state::{Unit, WeaponId};

/// Aim value after one more tick of aiming (or relaxing) with `weapon`
///
/// Aim stays within `[0, 1]`. Returns `None` for a weapon missing from the table.
pub fn next_aim(keep_aiming: bool, aim: f64, weapon: WeaponId, constants: &Constants) -> Option<f64> {
    let aim_per_tick = constants.weapon(weapon)?.aim_per_tick;
    Some(if keep_aiming {
        (aim + aim_per_tick).min(1.0)
    } else {
        (aim - aim_per_tick).max(0.0)
    })
}

/// Whether a shot from `shooter` would land while `target` is still spawning
///
/// `extra_distance` accounts for travel beyond the straight line (e.g. the
/// target's radius or a detour). Unarmed shooters never qualify.
pub fn can_hit_while_spawning(shooter: &Unit, target: &Unit, extra_distance: f64, constants: &Constants) -> bool {
    let Some(remaining) = target.remaining_spawn_time else {
        return false;
    };
    let Some(weapon) = shooter.weapon.and_then(|w| constants.weapon(w)) else {
        return false;
    };
    let travel = (target.position - shooter.position).norm() + extra_distance;
    travel / weapon.projectile_speed < remaining
}
