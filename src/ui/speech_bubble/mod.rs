// src/ui/speech_bubble/mod.rs
//
// Speech bubbles drawn as UI nodes that track colonists through the camera.

pub mod components;
pub mod plugin;
pub mod systems;

pub use plugin::SpeechBubblePlugin;
