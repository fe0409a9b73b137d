pub mod bubble;
pub mod config;
pub mod events;
pub mod interactions;
pub mod mental_break;
pub mod mood;
pub mod nearby;
pub mod phrases;
pub mod plugin;
pub mod random_bubbles;
pub mod resources;
pub mod telemetry;

pub use plugin::ChatterPlugin;
