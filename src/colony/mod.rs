//! Colony host: colonist components, the per-frame roster and debug spawners.
pub mod components;
pub mod plugin;
pub mod roster;
pub mod systems;

pub use plugin::ColonyPlugin;
