pub mod collision;
pub mod combat;
pub mod danger;
pub mod unit;
pub mod zone;
