//! Systems driving the bubble manager from the simulation clock.
use bevy::{ecs::system::SystemParam, prelude::*};
use rand::Rng;

use crate::chatter::{config::ChatterConfig, nearby::NearbyStateCache};
use crate::colony::{components::ColonistId, roster::ColonyRoster};
use crate::core::SimulationClock;

use super::{
    components::{BubbleCategory, BubbleId, SoundCue},
    manager::{BubbleManager, BubbleSpeaker},
};

/// Written once per created bubble; hosts play the cue and record the line.
#[derive(Message, Debug, Clone)]
pub struct BubbleCueMessage {
    pub bubble: BubbleId,
    pub speaker: Entity,
    pub colonist: ColonistId,
    pub category: BubbleCategory,
    pub cue: SoundCue,
    pub text: String,
    pub shown_at_secs: f32,
}

/// Entry point other systems use to show a bubble.
#[derive(SystemParam)]
pub struct BubbleEmitter<'w> {
    manager: ResMut<'w, BubbleManager>,
    cues: MessageWriter<'w, BubbleCueMessage>,
    config: Res<'w, ChatterConfig>,
    clock: Res<'w, SimulationClock>,
}

impl BubbleEmitter<'_> {
    /// Triggers a bubble at the current simulation time.
    ///
    /// Rejections are expected during normal play and only traced.
    pub fn show<R: Rng + ?Sized>(
        &mut self,
        speaker: impl Into<BubbleSpeaker>,
        category: BubbleCategory,
        text: Option<&str>,
        rng: &mut R,
    ) -> Option<BubbleId> {
        let speaker = speaker.into();
        let now = self.clock.elapsed_secs();
        match self
            .manager
            .trigger(&speaker, category, text, now, &self.config.phrases, rng)
        {
            Ok(id) => {
                let text = self
                    .manager
                    .get(id)
                    .map(|bubble| bubble.text().to_string())
                    .unwrap_or_default();
                debug!(
                    "{} shows {} bubble {}: {:?}",
                    speaker.colonist, category, id, text
                );
                self.cues.write(BubbleCueMessage {
                    bubble: id,
                    speaker: speaker.entity,
                    colonist: speaker.colonist,
                    category,
                    cue: category.sound_cue(),
                    text,
                    shown_at_secs: now,
                });
                Some(id)
            }
            Err(rejection) => {
                trace!("Bubble rejected: {}", rejection);
                None
            }
        }
    }
}

/// Drops bubbles whose lifetime has ended.
pub fn expire_bubbles(clock: Res<SimulationClock>, mut manager: ResMut<BubbleManager>) {
    let expired = manager.tick(clock.elapsed_secs());
    if !expired.is_empty() {
        trace!("Expired {} bubble(s); {} active", expired.len(), manager.len());
    }
}

/// Stand-in for the host's audio: logs each cue.
pub fn play_bubble_cues(mut cues: MessageReader<BubbleCueMessage>) {
    for cue in cues.read() {
        debug!("Playing {} for {} ({})", cue.cue, cue.colonist, cue.bubble);
    }
}

/// Forgets cooldowns and cached proximity of colonists that are no longer live.
pub fn sweep_departed_colonists(
    clock: Res<SimulationClock>,
    config: Res<ChatterConfig>,
    roster: Res<ColonyRoster>,
    mut manager: ResMut<BubbleManager>,
    mut cache: ResMut<NearbyStateCache>,
) {
    if !clock.crossed_interval(config.bubble.sweep_interval_ticks) {
        return;
    }

    let cooldowns = manager.sweep_cooldowns(|id| roster.is_live(id));
    let entries = cache.retain_live(|id| roster.is_live(id));
    if cooldowns + entries > 0 {
        debug!(
            "Swept {} cooldown record(s) and {} nearby entr(ies) for departed colonists",
            cooldowns, entries
        );
    }
}
