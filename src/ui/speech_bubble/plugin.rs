// src/ui/speech_bubble/plugin.rs
//
// Plugin registration for speech bubble systems.

use bevy::prelude::*;

use crate::chatter::plugin::ChatterSet;

use super::components::SpeechBubbleTracker;
use super::systems::{position_bubble_nodes, setup_speech_bubble_root, sync_bubble_nodes};

/// Draws the BubbleManager's bubbles as screen-space UI nodes.
///
/// Runs after `ChatterSet` so nodes reflect the bubbles created and expired
/// this frame. Requires `ChatterPlugin` and `WorldPlugin` (for `ColonyCamera`).
pub struct SpeechBubblePlugin;

impl Plugin for SpeechBubblePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SpeechBubbleTracker>()
            .add_systems(Startup, setup_speech_bubble_root)
            .add_systems(
                Update,
                (sync_bubble_nodes, position_bubble_nodes)
                    .chain()
                    .after(ChatterSet),
            );
    }
}
