//! Arena Tactics
//!
//! Tactical core of an arena combat agent: geometry, obstacle collision
//! queries, safe zone simulation, unit state stepping and a memoized danger
//! field used to rank candidate positions every tick.

pub mod config;
pub mod game;
pub mod metrics;
pub mod util;
