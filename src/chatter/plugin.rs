//! Chatter plugin wiring bubbles, company tracking and social systems.
use bevy::prelude::*;

use super::{
    bubble::{
        systems::{expire_bubbles, play_bubble_cues, sweep_departed_colonists},
        BubbleCueMessage, BubbleManager,
    },
    config::ChatterConfig,
    events::{InteractionMessage, MentalBreakMessage},
    interactions::{pick_ambient_interactions, schedule_chatty_interactions, InteractionSchedule},
    mental_break::{
        check_mental_breaks, recover_from_mental_states, ChattyBreakModifier, MentalBreakHooks,
    },
    mood::{drift_mood, refresh_thoughts},
    nearby::NearbyStateCache,
    random_bubbles::{show_random_bubbles, RandomBubbleTimer},
    resources::ChatterRng,
    telemetry::{
        flush_bubble_telemetry_log, log_chatter_summary, record_bubble_telemetry, BubbleTelemetry,
        BubbleTelemetryLog,
    },
};

/// Systems that create or age bubbles; the UI reads the manager after them.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChatterSet;

pub struct ChatterPlugin;

impl Plugin for ChatterPlugin {
    fn build(&self, app: &mut App) {
        let config = ChatterConfig::load_or_default();

        let mut hooks = MentalBreakHooks::default();
        hooks.register(Box::new(ChattyBreakModifier::from(&config.mental_break)));

        app.insert_resource(BubbleManager::new(
            config.bubble.min_cooldown_secs,
            config.bubble.profile,
        ))
        .insert_resource(NearbyStateCache::new(
            config.nearby.ttl_ticks,
            config.nearby.grace_ticks,
        ))
        .insert_resource(RandomBubbleTimer::new(
            config.random_bubbles.initial_countdown_ticks,
        ))
        .insert_resource(BubbleTelemetry::new(config.telemetry.capacity))
        .insert_resource(BubbleTelemetryLog::new(
            config.telemetry.log_path.clone(),
            config.telemetry.capacity,
        ))
        .insert_resource(hooks)
        .insert_resource(config)
        .init_resource::<InteractionSchedule>()
        .init_resource::<ChatterRng>()
        .add_message::<BubbleCueMessage>()
        .add_message::<InteractionMessage>()
        .add_message::<MentalBreakMessage>()
        .add_systems(Startup, log_chatter_config)
        .add_systems(
            Update,
            (
                expire_bubbles,
                (
                    show_random_bubbles,
                    schedule_chatty_interactions,
                    pick_ambient_interactions,
                )
                    .chain(),
                (
                    refresh_thoughts,
                    drift_mood,
                    check_mental_breaks,
                    recover_from_mental_states,
                )
                    .chain(),
                sweep_departed_colonists,
                (
                    play_bubble_cues,
                    record_bubble_telemetry,
                    flush_bubble_telemetry_log,
                    log_chatter_summary,
                )
                    .chain(),
            )
                .chain()
                .in_set(ChatterSet),
        );
    }
}

fn log_chatter_config(config: Res<ChatterConfig>) {
    let profile = config.bubble.profile;
    info!(
        "ChatterPlugin initialised: bubbles {:.2}s (fade {:.2}s/{:.2}s), cooldown {:.1}s, nearby ttl {} / grace {} ticks, radius {:.1} tiles",
        profile.duration(),
        profile.fade_in(),
        profile.fade_out(),
        config.bubble.min_cooldown_secs,
        config.nearby.ttl_ticks,
        config.nearby.grace_ticks,
        config.nearby.radius_tiles
    );
}
