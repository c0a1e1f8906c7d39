//! Alliance War - land-battle tournament engine

pub mod combat;
pub mod core;
pub mod scenario;
pub mod war;
