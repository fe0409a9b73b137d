// src/ui/mod.rs
//
// UI module providing screen-space overlays for the colony.

pub mod speech_bubble;

use bevy::prelude::*;

use speech_bubble::SpeechBubblePlugin;

/// Bundles every UI overlay.
pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(SpeechBubblePlugin);
    }
}
