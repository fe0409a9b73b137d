//! Storyteller incidents, machine breakdowns and the rules that suppress them.
pub mod components;
pub mod config;
pub mod plugin;
pub mod policy;
pub mod resources;
pub mod systems;

pub use plugin::IncidentPlugin;
