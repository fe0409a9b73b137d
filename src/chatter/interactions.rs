//! Social interactions between colonists and the bubbles they produce.
use std::fmt;

use bevy::prelude::*;
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::colony::components::{ColonistId, Faction, Identity, SocialSkill};
use crate::colony::roster::{ColonistSnapshot, ColonyRoster};
use crate::core::SimulationClock;

use super::bubble::{BubbleCategory, BubbleEmitter};
use super::config::{ChatterConfig, InteractionSettings};
use super::events::InteractionMessage;
use super::resources::ChatterRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionKind {
    Chitchat,
    EnthusiasticChat,
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Chitchat => "chitchat",
            Self::EnthusiasticChat => "enthusiastic_chat",
        };
        f.write_str(label)
    }
}

/// Selection weight of an enthusiastic chat between two colonists.
pub fn enthusiastic_chat_weight(
    initiator_chatty: bool,
    recipient_chatty: bool,
    settings: &InteractionSettings,
) -> f32 {
    let factor = match (initiator_chatty, recipient_chatty) {
        (true, true) => settings.both_chatty_factor,
        (true, false) | (false, true) => settings.one_chatty_factor,
        (false, false) => settings.neither_chatty_factor,
    };
    settings.base_weight * factor
}

/// Weighted choice between the host's chitchat and an enthusiastic chat.
pub fn pick_interaction_kind<R: Rng + ?Sized>(
    initiator: &ColonistSnapshot,
    recipient: &ColonistSnapshot,
    settings: &InteractionSettings,
    rng: &mut R,
) -> InteractionKind {
    const KINDS: [InteractionKind; 2] =
        [InteractionKind::Chitchat, InteractionKind::EnthusiasticChat];
    let weights = [
        settings.chitchat_weight,
        enthusiastic_chat_weight(initiator.chatty, recipient.chatty, settings),
    ];

    match WeightedIndex::new(weights) {
        Ok(distribution) => KINDS[distribution.sample(rng)],
        Err(_) => InteractionKind::Chitchat,
    }
}

/// Side effects of an enthusiastic chat once it has happened.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ChatOutcome {
    pub initiator_joke: bool,
    pub recipient_joke: bool,
    pub social_xp: Option<f32>,
}

pub fn resolve_enthusiastic_chat<R: Rng + ?Sized>(
    initiator: &ColonistSnapshot,
    recipient: &ColonistSnapshot,
    settings: &InteractionSettings,
    rng: &mut R,
) -> ChatOutcome {
    let initiator_joke =
        initiator.chatty && rng.gen_bool(f64::from(settings.initiator_joke_chance));
    let recipient_joke =
        recipient.chatty && rng.gen_bool(f64::from(settings.recipient_joke_chance));
    let social_xp = (initiator.chatty && recipient.chatty).then_some(settings.social_xp);

    ChatOutcome {
        initiator_joke,
        recipient_joke,
        social_xp,
    }
}

/// Ticks until the next chatty-pair check.
#[derive(Resource, Debug, Default)]
pub struct InteractionSchedule {
    ticks_until_check: i64,
}

impl InteractionSchedule {
    /// Spends `elapsed` ticks and reports whether a check is due.
    ///
    /// Overshoot carries into the next countdown, so checks stay on the
    /// interval grid; several missed intervals still yield a single check.
    pub fn advance(&mut self, elapsed: u64, interval: u64) -> bool {
        self.ticks_until_check -= elapsed as i64;
        if self.ticks_until_check > 0 {
            return false;
        }
        let interval = interval.max(1) as i64;
        while self.ticks_until_check <= 0 {
            self.ticks_until_check += interval;
        }
        true
    }
}

/// Picks at most one chatty initiator/recipient pair.
///
/// Initiators are tried in order; each gets one random capable partner in
/// range and a single chance roll.
pub fn choose_chatty_pair<'a, R: Rng + ?Sized>(
    chatty: &[&'a ColonistSnapshot],
    settings: &InteractionSettings,
    rng: &mut R,
) -> Option<(&'a ColonistSnapshot, &'a ColonistSnapshot)> {
    if chatty.len() < 2 {
        return None;
    }

    for &initiator in chatty {
        if !initiator.capabilities.can_initiate() {
            continue;
        }

        let partners: Vec<&ColonistSnapshot> = chatty
            .iter()
            .copied()
            .filter(|other| {
                other.id != initiator.id
                    && other.position.distance(initiator.position) <= settings.range_tiles
                    && other.capabilities.can_receive()
            })
            .collect();
        let Some(&recipient) = partners.choose(rng) else {
            continue;
        };

        if rng.gen_bool(f64::from(settings.trigger_chance)) {
            return Some((initiator, recipient));
        }
    }

    None
}

fn grant_social_xp(
    skills: &mut Query<(&Identity, &mut SocialSkill)>,
    colonists: [ColonistId; 2],
    amount: f32,
) {
    for (identity, mut skill) in skills.iter_mut() {
        if colonists.contains(&identity.id) {
            skill.learn(amount);
        }
    }
}

/// Shows the bubbles and applies the rewards of a finished enthusiastic chat.
///
/// `opening_line` makes the initiator fall back to the enthusiastic bubble
/// when they do not tell a joke.
fn apply_enthusiastic_chat<R: Rng + ?Sized>(
    initiator: &ColonistSnapshot,
    recipient: &ColonistSnapshot,
    opening_line: bool,
    settings: &InteractionSettings,
    emitter: &mut BubbleEmitter,
    skills: &mut Query<(&Identity, &mut SocialSkill)>,
    rng: &mut R,
) {
    let outcome = resolve_enthusiastic_chat(initiator, recipient, settings, rng);

    if outcome.initiator_joke {
        emitter.show(initiator, BubbleCategory::Joke, None, rng);
    } else if opening_line {
        emitter.show(initiator, BubbleCategory::Enthusiastic, None, rng);
    }
    if outcome.recipient_joke {
        emitter.show(recipient, BubbleCategory::Joke, None, rng);
    }
    if let Some(xp) = outcome.social_xp {
        grant_social_xp(skills, [initiator.id, recipient.id], xp);
    }
}

/// Periodically starts an enthusiastic chat between two nearby chatty colonists.
pub fn schedule_chatty_interactions(
    clock: Res<SimulationClock>,
    config: Res<ChatterConfig>,
    roster: Res<ColonyRoster>,
    mut schedule: ResMut<InteractionSchedule>,
    mut rng: ResMut<ChatterRng>,
    mut emitter: BubbleEmitter,
    mut skills: Query<(&Identity, &mut SocialSkill)>,
    mut interactions: MessageWriter<InteractionMessage>,
) {
    let settings = &config.interactions;
    if !schedule.advance(clock.ticks_this_frame(), settings.check_interval_ticks) {
        return;
    }

    let chatty: Vec<&ColonistSnapshot> = roster
        .chatty_colonists()
        .filter(|colonist| colonist.faction == Faction::PLAYER)
        .collect();
    let Some((initiator, recipient)) = choose_chatty_pair(&chatty, settings, &mut rng.0) else {
        return;
    };

    debug!(
        "{} starts an enthusiastic chat with {}",
        initiator.id, recipient.id
    );
    apply_enthusiastic_chat(
        initiator,
        recipient,
        true,
        settings,
        &mut emitter,
        &mut skills,
        &mut rng.0,
    );
    interactions.write(InteractionMessage {
        initiator: initiator.id,
        recipient: recipient.id,
        kind: InteractionKind::EnthusiasticChat,
    });
}

/// Host-side social tick: a random capable colonist talks to someone in range,
/// with the interaction kind drawn by weight.
pub fn pick_ambient_interactions(
    clock: Res<SimulationClock>,
    config: Res<ChatterConfig>,
    roster: Res<ColonyRoster>,
    mut rng: ResMut<ChatterRng>,
    mut emitter: BubbleEmitter,
    mut skills: Query<(&Identity, &mut SocialSkill)>,
    mut interactions: MessageWriter<InteractionMessage>,
) {
    let settings = &config.interactions;
    if !clock.crossed_interval(settings.ambient_interval_ticks) {
        return;
    }

    let initiators: Vec<&ColonistSnapshot> = roster
        .iter()
        .filter(|colonist| {
            colonist.live && colonist.humanlike && colonist.capabilities.can_initiate()
        })
        .collect();
    let Some(&initiator) = initiators.choose(&mut rng.0) else {
        return;
    };

    let recipients: Vec<&ColonistSnapshot> = roster
        .iter()
        .filter(|other| {
            other.id != initiator.id
                && other.live
                && other.humanlike
                && other.faction == initiator.faction
                && other.capabilities.can_receive()
                && other.position.distance(initiator.position) <= settings.range_tiles
        })
        .collect();
    let Some(&recipient) = recipients.choose(&mut rng.0) else {
        return;
    };

    let kind = pick_interaction_kind(initiator, recipient, settings, &mut rng.0);
    trace!("{} -> {}: {}", initiator.id, recipient.id, kind);
    if kind == InteractionKind::EnthusiasticChat {
        apply_enthusiastic_chat(
            initiator,
            recipient,
            false,
            settings,
            &mut emitter,
            &mut skills,
            &mut rng.0,
        );
    }
    interactions.write(InteractionMessage {
        initiator: initiator.id,
        recipient: recipient.id,
        kind,
    });
}
