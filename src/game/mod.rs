pub mod constants;
pub mod debug;
pub mod performance;
pub mod scenario;
pub mod spatial;
pub mod state;
pub mod systems;
