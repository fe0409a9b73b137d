//! Spontaneous chat and joke bubbles from chatty colonists.
use bevy::prelude::*;
use rand::Rng;

use crate::colony::components::Faction;
use crate::colony::roster::{has_nearby_humanlike, ColonyRoster};
use crate::core::SimulationClock;

use super::bubble::{BubbleCategory, BubbleEmitter};
use super::config::{ChatterConfig, RandomBubbleSettings};
use super::resources::ChatterRng;

/// Ticks left until the next round of random bubbles.
#[derive(Resource, Debug, Clone, Copy)]
pub struct RandomBubbleTimer {
    countdown: i64,
}

impl RandomBubbleTimer {
    pub fn new(initial_countdown: i64) -> Self {
        Self {
            countdown: initial_countdown,
        }
    }

    pub fn countdown(&self) -> i64 {
        self.countdown
    }

    /// Spends `elapsed` ticks. Returns true and re-arms with a random
    /// interval when the countdown runs out.
    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        elapsed: i64,
        settings: &RandomBubbleSettings,
        rng: &mut R,
    ) -> bool {
        self.countdown -= elapsed;
        if self.countdown > 0 {
            return false;
        }
        self.countdown = rng.gen_range(settings.min_interval_ticks..settings.max_interval_ticks);
        true
    }
}

/// Decides which bubble, if any, one chatty colonist shows this round.
pub fn roll_random_bubble<R: Rng + ?Sized>(
    near_others: bool,
    settings: &RandomBubbleSettings,
    rng: &mut R,
) -> Option<BubbleCategory> {
    if !rng.gen_bool(f64::from(settings.bubble_chance)) {
        return None;
    }

    if near_others {
        if rng.gen::<f32>() < settings.chat_when_near_chance {
            Some(BubbleCategory::Chat)
        } else {
            Some(BubbleCategory::Joke)
        }
    } else {
        rng.gen_bool(f64::from(settings.chat_when_alone_chance))
            .then_some(BubbleCategory::Chat)
    }
}

pub fn show_random_bubbles(
    clock: Res<SimulationClock>,
    config: Res<ChatterConfig>,
    roster: Res<ColonyRoster>,
    mut timer: ResMut<RandomBubbleTimer>,
    mut rng: ResMut<ChatterRng>,
    mut emitter: BubbleEmitter,
) {
    let settings = &config.random_bubbles;
    let evaluations = clock.intervals_crossed(settings.evaluation_interval_ticks);
    if evaluations == 0 {
        return;
    }

    let elapsed = (evaluations * settings.evaluation_interval_ticks) as i64;
    if !timer.advance(elapsed, settings, &mut rng.0) {
        return;
    }
    trace!(
        "Random bubble round; next in {} ticks",
        timer.countdown()
    );

    for colonist in roster
        .chatty_colonists()
        .filter(|colonist| colonist.faction == Faction::PLAYER)
    {
        let near_others =
            has_nearby_humanlike(&roster, colonist.id, settings.company_radius_tiles);
        if let Some(category) = roll_random_bubble(near_others, settings, &mut rng.0) {
            emitter.show(colonist, category, None, &mut rng.0);
        }
    }
}
