//! World module housing the ground, lighting and camera controls.
pub mod components;
pub mod plugin;
pub mod systems;

pub use plugin::WorldPlugin;
