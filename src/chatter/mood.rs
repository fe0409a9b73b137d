//! Mood thoughts driven by company, and the host's mood drift.
use bevy::prelude::*;

use crate::colony::components::{ColonistId, Identity, Mood};
use crate::colony::roster::{colonists_within, has_company_within, ColonistSnapshot, ColonyRoster};
use crate::core::SimulationClock;

use super::config::{ChatterConfig, MoodSettings};
use super::nearby::{CompanyProbe, NearbyStateCache};

/// Stage of the chatty colonist's company thought.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChattyThought {
    NearOthers,
    Alone,
}

impl ChattyThought {
    pub fn stage(self) -> usize {
        match self {
            Self::NearOthers => 0,
            Self::Alone => 1,
        }
    }

    pub fn mood_offset(self, settings: &MoodSettings) -> f32 {
        match self {
            Self::NearOthers => settings.near_others_offset,
            Self::Alone => settings.alone_offset,
        }
    }
}

/// Chatty colonists enjoy company and dislike solitude; others feel nothing.
///
/// Reads the undebounced state so the thought reacts as soon as the cache
/// refreshes.
pub fn chatty_near_others(
    subject: &ColonistSnapshot,
    probe: &mut CompanyProbe,
) -> Option<ChattyThought> {
    if !subject.chatty {
        return None;
    }
    if probe.state(subject.id).raw {
        Some(ChattyThought::NearOthers)
    } else {
        Some(ChattyThought::Alone)
    }
}

/// General company thought: any faction member close by.
pub fn colony_chatter_company(roster: &ColonyRoster, colonist: ColonistId, radius: f32) -> bool {
    has_company_within(roster, colonist, radius)
}

/// Social variant of the company thought, towards one specific colonist.
pub fn colony_chatter_company_with(
    roster: &ColonyRoster,
    colonist: ColonistId,
    other: ColonistId,
    radius: f32,
) -> bool {
    colonist != other && colonists_within(roster, colonist, other, radius)
}

/// Thoughts currently held by a colonist.
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct ActiveThoughts {
    pub chatty: Option<ChattyThought>,
    pub company: bool,
    /// Colonists this one currently holds a company opinion towards.
    pub company_with: Vec<ColonistId>,
}

impl ActiveThoughts {
    pub fn mood_offset(&self, settings: &MoodSettings) -> f32 {
        let chatty = self
            .chatty
            .map(|thought| thought.mood_offset(settings))
            .unwrap_or(0.0);
        let company = if self.company {
            settings.company_offset
        } else {
            0.0
        };
        chatty + company
    }
}

/// Re-evaluates every colonist's thoughts on the refresh interval.
pub fn refresh_thoughts(
    clock: Res<SimulationClock>,
    config: Res<ChatterConfig>,
    roster: Res<ColonyRoster>,
    mut cache: ResMut<NearbyStateCache>,
    mut colonists: Query<(&Identity, &mut ActiveThoughts)>,
) {
    let settings = &config.mood;
    if !clock.crossed_interval(settings.refresh_interval_ticks) {
        return;
    }

    let mut probe = CompanyProbe::new(
        &mut cache,
        &roster,
        clock.ticks(),
        config.nearby.radius_tiles,
    );

    for (identity, mut thoughts) in colonists.iter_mut() {
        let Some(subject) = roster.get(identity.id) else {
            continue;
        };

        let radius = settings.company_radius_tiles;
        let refreshed = ActiveThoughts {
            chatty: chatty_near_others(subject, &mut probe),
            company: colony_chatter_company(&roster, subject.id, radius),
            company_with: roster
                .iter()
                .filter(|other| colony_chatter_company_with(&roster, subject.id, other.id, radius))
                .map(|other| other.id)
                .collect(),
        };

        if *thoughts != refreshed {
            if thoughts.chatty != refreshed.chatty {
                debug!(
                    "{} now thinks {:?} (stage {:?})",
                    identity.id,
                    refreshed.chatty,
                    refreshed.chatty.map(ChattyThought::stage)
                );
            }
            *thoughts = refreshed;
        }
    }
}

/// Moves each mood toward its baseline plus active thought offsets.
pub fn drift_mood(
    clock: Res<SimulationClock>,
    config: Res<ChatterConfig>,
    mut colonists: Query<(&ActiveThoughts, &mut Mood)>,
) {
    let settings = &config.mood;
    let step = settings.drift_per_second * clock.last_scaled_delta().as_secs_f32();
    if step <= 0.0 {
        return;
    }

    for (thoughts, mut mood) in colonists.iter_mut() {
        let target = (settings.baseline + thoughts.mood_offset(settings)).clamp(0.0, 1.0);
        let delta = (target - mood.level).clamp(-step, step);
        if delta != 0.0 {
            mood.shift(delta);
        }
    }
}
