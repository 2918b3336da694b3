//! Match constants and tuning values
//!
//! [`Constants`] is the read-only, per-process description of the match
//! (weapon table, map bounds, zone and regeneration rates). It is built once
//! at startup and passed by reference into every core call. The nested
//! modules below hold the tuned numbers the danger field depends on.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::game::state::WeaponId;

/// Danger field tuning
pub mod danger {
    use std::f64::consts::PI;

    /// Facing offset below which the angular factor gives no reduction (30 degrees)
    pub const FACING_FULL_DANGER_ANGLE: f64 = PI / 6.0;
    /// Extra offset over which the angular factor keeps falling (120 degrees)
    pub const FACING_FALLOFF_SPAN: f64 = PI * 2.0 / 3.0;
    /// Offset span the falloff is normalized against (150 degrees)
    pub const FACING_NORMALIZATION: f64 = PI * 5.0 / 6.0;
    /// Distance inside which an enemy counts at full weight
    pub const MAX_DANGER_DISTANCE: f64 = 7.0;
    /// Multiplier per weapon index when the enemy is armed with ammo
    pub const WEAPON_DANGER: [f64; 3] = [0.34, 0.6666, 1.0];
    /// Multiplier for weapon indices missing from [`WEAPON_DANGER`]
    pub const UNKNOWN_WEAPON_DANGER: f64 = 1.0;
    /// Weapon index that gets the close-range boost
    pub const CLOSE_RANGE_WEAPON: usize = 1;
    /// Close-range boost for [`CLOSE_RANGE_WEAPON`]
    pub const CLOSE_RANGE_BOOST: f64 = 1.55;
    /// Multiplier for unarmed enemies or enemies out of ammo
    pub const UNARMED_DANGER: f64 = 1e-2;

    /// Bearing separation at or below which a pair adds nothing (50 degrees)
    pub const PAIR_MIN_ANGLE: f64 = PI / 3.6;
    pub const PAIR_MIN_COEFF: f64 = 0.0;
    /// Bearing separation at or above which a pair adds its full minimum (120 degrees)
    pub const PAIR_MAX_ANGLE: f64 = PI * (2.0 / 3.0);
    pub const PAIR_MAX_COEFF: f64 = 1.0;

    /// Edge distance under which an obstacle adds a proximity penalty
    pub const OBSTACLE_MAX_DISTANCE: f64 = 3.0;
    /// Penalty of an obstacle at contact
    pub const OBSTACLE_MAX_PENALTY: f64 = 1.0;
}

/// Unit stepping tolerances
pub mod unit {
    /// Remaining spawn time below which spawning counts as finished
    pub const SPAWN_TIME_EPSILON: f64 = 1e-5;
    /// Slack on the shield comparison so float noise does not break a shield
    pub const SHIELD_BREAK_EPSILON: f64 = 1e-6;
}

/// Constants loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConstantsError {
    #[error("Failed to read constants file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse constants: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid constants: {0}")]
    Invalid(String),
}

/// Weapon table entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponProperties {
    pub name: String,
    /// Aim progress gained (or lost) per tick, aim runs from 0 to 1
    pub aim_per_tick: f64,
    /// Projectile speed in units per second
    pub projectile_speed: f64,
    /// Damage of a single projectile
    pub projectile_damage: f64,
}

/// Integer map bounds, `min` inclusive and `max` exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapBounds {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl MapBounds {
    pub fn width(&self) -> usize {
        (self.max_x - self.min_x).max(0) as usize
    }

    pub fn height(&self) -> usize {
        (self.max_y - self.min_y).max(0) as usize
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x as f64 && x < self.max_x as f64 && y >= self.min_y as f64 && y < self.max_y as f64
    }
}

/// Process-wide match constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constants {
    pub ticks_per_second: f64,
    pub unit_radius: f64,
    pub max_health: f64,
    pub max_shield: f64,
    /// Seconds a unit spends spawning before it can act
    pub spawn_time: f64,
    pub health_regeneration_delay_ticks: u32,
    /// Zone radius shrink per tick
    pub zone_speed_per_tick: f64,
    pub zone_damage_per_second: f64,
    pub weapons: Vec<WeaponProperties>,
    pub bounds: MapBounds,
    /// Reach of the obstacle lookup around a query point
    #[serde(default = "default_obstacle_lookup_radius")]
    pub obstacle_lookup_radius: f64,
}

fn default_obstacle_lookup_radius() -> f64 {
    30.0
}

impl Default for Constants {
    fn default() -> Self {
        Self {
            ticks_per_second: 30.0,
            unit_radius: 1.0,
            max_health: 100.0,
            max_shield: 100.0,
            spawn_time: 5.0,
            health_regeneration_delay_ticks: 60,
            zone_speed_per_tick: 0.05,
            zone_damage_per_second: 10.0,
            weapons: vec![
                WeaponProperties {
                    name: "wand".to_string(),
                    aim_per_tick: 1.0 / 6.0,
                    projectile_speed: 50.0,
                    projectile_damage: 20.0,
                },
                WeaponProperties {
                    name: "staff".to_string(),
                    aim_per_tick: 1.0 / 15.0,
                    projectile_speed: 40.0,
                    projectile_damage: 30.0,
                },
                WeaponProperties {
                    name: "bow".to_string(),
                    aim_per_tick: 1.0 / 30.0,
                    projectile_speed: 100.0,
                    projectile_damage: 50.0,
                },
            ],
            bounds: MapBounds {
                min_x: -200,
                min_y: -200,
                max_x: 200,
                max_y: 200,
            },
            obstacle_lookup_radius: default_obstacle_lookup_radius(),
        }
    }
}

impl Constants {
    /// Seconds per tick
    #[inline]
    pub fn tick_time(&self) -> f64 {
        1.0 / self.ticks_per_second
    }

    #[inline]
    pub fn weapon(&self, weapon: WeaponId) -> Option<&WeaponProperties> {
        self.weapons.get(weapon.index())
    }

    pub fn from_json(json: &str) -> Result<Self, ConstantsError> {
        let constants: Constants = serde_json::from_str(json)?;
        constants.validate()?;
        Ok(constants)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConstantsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConstantsError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let constants = Self::from_json(&json)?;
        tracing::info!(
            "Loaded constants from {}: {} weapons, bounds {:?}",
            path.display(),
            constants.weapons.len(),
            constants.bounds
        );
        Ok(constants)
    }

    pub fn validate(&self) -> Result<(), ConstantsError> {
        if self.ticks_per_second.is_nan() || self.ticks_per_second <= 0.0 {
            return Err(ConstantsError::Invalid("ticks_per_second must be > 0".to_string()));
        }
        if self.zone_speed_per_tick.is_nan() || self.zone_speed_per_tick <= 0.0 {
            return Err(ConstantsError::Invalid("zone_speed_per_tick must be > 0".to_string()));
        }
        if self.unit_radius < 0.0 {
            return Err(ConstantsError::Invalid("unit_radius cannot be negative".to_string()));
        }
        if self.weapons.is_empty() {
            return Err(ConstantsError::Invalid("weapon table is empty".to_string()));
        }
        if let Some(weapon) = self.weapons.iter().find(|w| w.projectile_speed.is_nan() || w.projectile_speed <= 0.0) {
            return Err(ConstantsError::Invalid(format!(
                "weapon '{}' must have a positive projectile speed",
                weapon.name
            )));
        }
        if self.bounds.width() == 0 || self.bounds.height() == 0 {
            return Err(ConstantsError::Invalid(format!("empty map bounds {:?}", self.bounds)));
        }
        Ok(())
    }
}
