//! World snapshot types
//!
//! Units, obstacles and the safe zone as the environment reports them for
//! one tick. Obstacles are immutable for the whole match; units and the zone
//! are stepped forward in place by the systems.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::util::vec2::Vec2;

/// Simulation tick counter
pub type Tick = u32;

/// Owning player identifier
pub type PlayerId = i32;

/// Unit identifier
pub type UnitId = i32;

/// Obstacle identifier
pub type ObstacleId = i32;

/// Index into the weapon table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeaponId(pub usize);

impl WeaponId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Unit state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    // Read by every danger and collision query
    pub position: Vec2,
    pub velocity: Vec2,
    /// Facing, unit length
    pub direction: Vec2,
    pub weapon: Option<WeaponId>,
    /// Ammo per weapon index, missing entries count as empty
    pub ammo: SmallVec<[u32; 4]>,

    // Stepped once per tick
    pub health: f64,
    pub shield: f64,
    /// Tick from which health may regenerate again
    pub health_regeneration_start_tick: Option<Tick>,
    /// Seconds until the unit finishes spawning
    pub remaining_spawn_time: Option<f64>,

    pub id: UnitId,
    pub player_id: PlayerId,
}

impl Unit {
    pub fn new(id: UnitId, player_id: PlayerId, position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            direction: Vec2::RIGHT,
            weapon: None,
            ammo: SmallVec::new(),
            health: 100.0,
            shield: 0.0,
            health_regeneration_start_tick: None,
            remaining_spawn_time: None,
            id,
            player_id,
        }
    }

    #[inline]
    pub fn ammo_for(&self, weapon: WeaponId) -> u32 {
        self.ammo.get(weapon.index()).copied().unwrap_or(0)
    }

    pub fn set_ammo(&mut self, weapon: WeaponId, amount: u32) {
        if self.ammo.len() <= weapon.index() {
            self.ammo.resize(weapon.index() + 1, 0);
        }
        self.ammo[weapon.index()] = amount;
    }

    /// Equipped weapon, only if it has ammo left
    pub fn armed_weapon(&self) -> Option<WeaponId> {
        self.weapon.filter(|&weapon| self.ammo_for(weapon) > 0)
    }

    #[inline]
    pub fn is_spawning(&self) -> bool {
        self.remaining_spawn_time.is_some()
    }
}

/// Static circular obstacle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: ObstacleId,
    pub position: Vec2,
    pub radius: f64,
    /// Projectiles pass through, units do not
    pub can_shoot_through: bool,
}

/// Safe zone converging from its current circle toward the next one
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub current_center: Vec2,
    pub current_radius: f64,
    pub next_center: Vec2,
    pub next_radius: f64,
}

/// Everything the environment reports for one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub current_tick: Tick,
    /// Our player; every unit owned by someone else is an enemy
    pub my_id: PlayerId,
    pub units: Vec<Unit>,
    pub zone: Zone,
}

impl WorldSnapshot {
    pub fn enemies(&self) -> impl Iterator<Item = &Unit> {
        let my_id = self.my_id;
        self.units.iter().filter(move |unit| unit.player_id != my_id)
    }

    pub fn my_units(&self) -> impl Iterator<Item = &Unit> {
        let my_id = self.my_id;
        self.units.iter().filter(move |unit| unit.player_id == my_id)
    }
}
