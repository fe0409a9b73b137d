// src/ui/speech_bubble/components.rs
//
// Screen-space nodes mirroring the bubbles held by the BubbleManager.

use std::collections::HashMap;

use bevy::prelude::*;

use crate::chatter::bubble::BubbleId;

/// Full-screen overlay node every bubble node is parented to.
#[derive(Resource, Debug, Clone, Copy)]
pub struct SpeechBubbleUiRoot(pub Entity);

/// UI node drawing one bubble.
#[derive(Component, Debug, Clone, Copy)]
pub struct SpeechBubbleNode {
    pub bubble: BubbleId,
}

/// Maps each live bubble to the node drawing it.
#[derive(Resource, Debug, Default)]
pub struct SpeechBubbleTracker {
    pub by_bubble: HashMap<BubbleId, Entity>,
}

impl SpeechBubbleTracker {
    /// Removes and returns nodes whose bubble is no longer alive.
    pub fn take_stale(&mut self, mut alive: impl FnMut(BubbleId) -> bool) -> Vec<Entity> {
        let stale: Vec<BubbleId> = self
            .by_bubble
            .keys()
            .copied()
            .filter(|id| !alive(*id))
            .collect();
        stale
            .into_iter()
            .filter_map(|id| self.by_bubble.remove(&id))
            .collect()
    }
}
