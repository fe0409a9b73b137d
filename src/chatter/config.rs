use std::{fs, path::Path};

use bevy::prelude::*;
use serde::Deserialize;

use super::bubble::components::BubbleProfile;
use super::bubble::layout::BubbleStyle;
use super::mental_break::BreakThresholds;
use super::phrases::{PhraseBook, DEFAULT_CHAT_SNIPPETS, DEFAULT_ENTHUSIASTIC_LINE, DEFAULT_JOKES};

const CONFIG_PATH: &str = "config/chatter.toml";

#[derive(Debug, Clone, Deserialize, Default)]
struct RawChatterConfig {
    #[serde(default)]
    bubble: RawBubble,
    #[serde(default)]
    nearby: RawNearby,
    #[serde(default)]
    mental_break: RawMentalBreak,
    #[serde(default)]
    mood: RawMood,
    #[serde(default)]
    phrases: RawPhrases,
    #[serde(default)]
    random_bubbles: RawRandomBubbles,
    #[serde(default)]
    interactions: RawInteractions,
    #[serde(default)]
    telemetry: RawTelemetry,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawBubble {
    duration_seconds: f32,
    fade_in_seconds: f32,
    fade_out_seconds: f32,
    min_cooldown_seconds: f32,
    max_width_px: f32,
    padding_x_px: f32,
    padding_y_px: f32,
    font_size: f32,
    vertical_offset_tiles: f32,
    sweep_interval_ticks: u64,
}

impl Default for RawBubble {
    fn default() -> Self {
        Self {
            duration_seconds: BubbleProfile::DEFAULT_DURATION_SECS,
            fade_in_seconds: BubbleProfile::DEFAULT_FADE_IN_SECS,
            fade_out_seconds: BubbleProfile::DEFAULT_FADE_OUT_SECS,
            min_cooldown_seconds: 10.0,
            max_width_px: 200.0,
            padding_x_px: 10.0,
            padding_y_px: 5.0,
            font_size: 13.0,
            vertical_offset_tiles: 0.5,
            sweep_interval_ticks: 2500,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawNearby {
    ttl_ticks: u64,
    grace_ticks: u64,
    radius_tiles: f32,
}

impl Default for RawNearby {
    fn default() -> Self {
        Self {
            ttl_ticks: 500,
            grace_ticks: 1800,
            radius_tiles: 10.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawMentalBreak {
    around_others_multiplier: f32,
    alone_multiplier: f32,
    check_interval_ticks: u64,
    mental_state_seconds: f32,
    extreme_threshold: f32,
    major_threshold: f32,
    minor_threshold: f32,
    recovery_mood_boost: f32,
}

impl Default for RawMentalBreak {
    fn default() -> Self {
        Self {
            around_others_multiplier: 0.7,
            alone_multiplier: 1.3,
            check_interval_ticks: 150,
            mental_state_seconds: 20.0,
            extreme_threshold: 0.05,
            major_threshold: 0.15,
            minor_threshold: 0.35,
            recovery_mood_boost: 0.2,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawMood {
    baseline: f32,
    drift_per_second: f32,
    near_others_offset: f32,
    alone_offset: f32,
    company_radius_tiles: f32,
    company_offset: f32,
    refresh_interval_ticks: u64,
}

impl Default for RawMood {
    fn default() -> Self {
        Self {
            refresh_interval_ticks: 150,
            baseline: 0.5,
            drift_per_second: 0.01,
            near_others_offset: 0.1,
            alone_offset: -0.15,
            company_radius_tiles: 5.0,
            company_offset: 0.05,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawPhrases {
    enthusiastic: String,
    chat: Vec<String>,
    jokes: Vec<String>,
}

impl Default for RawPhrases {
    fn default() -> Self {
        Self {
            enthusiastic: DEFAULT_ENTHUSIASTIC_LINE.to_string(),
            chat: DEFAULT_CHAT_SNIPPETS.iter().map(|s| s.to_string()).collect(),
            jokes: DEFAULT_JOKES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawRandomBubbles {
    evaluation_interval_ticks: u64,
    initial_countdown_ticks: i64,
    min_interval_ticks: i64,
    max_interval_ticks: i64,
    bubble_chance: f32,
    company_radius_tiles: f32,
    chat_when_near_chance: f32,
    chat_when_alone_chance: f32,
}

impl Default for RawRandomBubbles {
    fn default() -> Self {
        Self {
            evaluation_interval_ticks: 250,
            initial_countdown_ticks: 1000,
            min_interval_ticks: 2000,
            max_interval_ticks: 5000,
            bubble_chance: 0.4,
            company_radius_tiles: 5.0,
            chat_when_near_chance: 0.6,
            chat_when_alone_chance: 0.3,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawInteractions {
    check_interval_ticks: u64,
    range_tiles: f32,
    trigger_chance: f32,
    base_weight: f32,
    both_chatty_factor: f32,
    one_chatty_factor: f32,
    neither_chatty_factor: f32,
    initiator_joke_chance: f32,
    recipient_joke_chance: f32,
    social_xp: f32,
    ambient_interval_ticks: u64,
    chitchat_weight: f32,
}

impl Default for RawInteractions {
    fn default() -> Self {
        Self {
            check_interval_ticks: 2500,
            range_tiles: 10.0,
            trigger_chance: 0.3,
            base_weight: 0.6,
            both_chatty_factor: 3.0,
            one_chatty_factor: 1.5,
            neither_chatty_factor: 0.2,
            initiator_joke_chance: 0.7,
            recipient_joke_chance: 0.3,
            social_xp: 10.0,
            ambient_interval_ticks: 750,
            chitchat_weight: 1.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawTelemetry {
    log_path: String,
    capacity: usize,
}

impl Default for RawTelemetry {
    fn default() -> Self {
        Self {
            log_path: "logs/bubble_history.jsonl".to_string(),
            capacity: 64,
        }
    }
}

/// Runtime configuration derived from `config/chatter.toml`.
#[derive(Resource, Debug, Clone)]
pub struct ChatterConfig {
    pub bubble: BubbleSettings,
    pub nearby: NearbySettings,
    pub mental_break: MentalBreakSettings,
    pub mood: MoodSettings,
    pub phrases: PhraseBook,
    pub random_bubbles: RandomBubbleSettings,
    pub interactions: InteractionSettings,
    pub telemetry: TelemetrySettings,
}

#[derive(Debug, Clone)]
pub struct BubbleSettings {
    pub profile: BubbleProfile,
    pub min_cooldown_secs: f32,
    pub style: BubbleStyle,
    pub vertical_offset_tiles: f32,
    pub sweep_interval_ticks: u64,
}

#[derive(Debug, Clone)]
pub struct NearbySettings {
    pub ttl_ticks: u64,
    pub grace_ticks: u64,
    pub radius_tiles: f32,
}

#[derive(Debug, Clone)]
pub struct MentalBreakSettings {
    pub around_others_multiplier: f32,
    pub alone_multiplier: f32,
    pub check_interval_ticks: u64,
    pub mental_state_secs: f32,
    pub base_thresholds: BreakThresholds,
    pub recovery_mood_boost: f32,
}

#[derive(Debug, Clone)]
pub struct MoodSettings {
    pub baseline: f32,
    pub drift_per_second: f32,
    pub near_others_offset: f32,
    pub alone_offset: f32,
    pub company_radius_tiles: f32,
    pub company_offset: f32,
    pub refresh_interval_ticks: u64,
}

#[derive(Debug, Clone)]
pub struct RandomBubbleSettings {
    pub evaluation_interval_ticks: u64,
    pub initial_countdown_ticks: i64,
    pub min_interval_ticks: i64,
    pub max_interval_ticks: i64,
    pub bubble_chance: f32,
    pub company_radius_tiles: f32,
    pub chat_when_near_chance: f32,
    pub chat_when_alone_chance: f32,
}

#[derive(Debug, Clone)]
pub struct InteractionSettings {
    pub check_interval_ticks: u64,
    pub range_tiles: f32,
    pub trigger_chance: f32,
    pub base_weight: f32,
    pub both_chatty_factor: f32,
    pub one_chatty_factor: f32,
    pub neither_chatty_factor: f32,
    pub initiator_joke_chance: f32,
    pub recipient_joke_chance: f32,
    pub social_xp: f32,
    pub ambient_interval_ticks: u64,
    pub chitchat_weight: f32,
}

#[derive(Debug, Clone)]
pub struct TelemetrySettings {
    pub log_path: String,
    pub capacity: usize,
}

impl ChatterConfig {
    pub fn load_or_default() -> Self {
        Self::load_from(Path::new(CONFIG_PATH))
    }

    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(raw) => match Self::parse(&raw) {
                Ok(parsed) => parsed,
                Err(err) => {
                    warn!(
                        "Failed to parse {} ({}). Falling back to defaults.",
                        path.display(),
                        err
                    );
                    RawChatterConfig::default().into()
                }
            },
            Err(err) => {
                warn!(
                    "Failed to read {} ({}). Falling back to defaults.",
                    path.display(),
                    err
                );
                RawChatterConfig::default().into()
            }
        }
    }

    pub fn parse(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<RawChatterConfig>(raw).map(Into::into)
    }
}

impl Default for ChatterConfig {
    fn default() -> Self {
        RawChatterConfig::default().into()
    }
}

fn chance(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn non_empty(lines: Vec<String>) -> Vec<String> {
    lines
        .into_iter()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

impl From<RawChatterConfig> for ChatterConfig {
    fn from(value: RawChatterConfig) -> Self {
        let raw_bubble = value.bubble;
        let profile = BubbleProfile::new(
            raw_bubble.duration_seconds,
            raw_bubble.fade_in_seconds,
            raw_bubble.fade_out_seconds,
        );
        if !profile.has_hold_segment() {
            warn!(
                "Bubble fades ({:.2}s + {:.2}s) do not fit inside duration {:.2}s; bubbles will never be fully opaque.",
                profile.fade_in(),
                profile.fade_out(),
                profile.duration()
            );
        }

        let bubble = BubbleSettings {
            profile,
            min_cooldown_secs: raw_bubble.min_cooldown_seconds.max(0.0),
            style: BubbleStyle {
                max_width: raw_bubble.max_width_px.max(16.0),
                padding: Vec2::new(
                    raw_bubble.padding_x_px.max(0.0),
                    raw_bubble.padding_y_px.max(0.0),
                ),
                font_size: raw_bubble.font_size.max(4.0),
            },
            vertical_offset_tiles: raw_bubble.vertical_offset_tiles,
            sweep_interval_ticks: raw_bubble.sweep_interval_ticks.max(1),
        };

        let nearby = NearbySettings {
            ttl_ticks: value.nearby.ttl_ticks,
            grace_ticks: value.nearby.grace_ticks,
            radius_tiles: value.nearby.radius_tiles.max(0.0),
        };

        let mental_break = MentalBreakSettings {
            around_others_multiplier: value.mental_break.around_others_multiplier.max(0.0),
            alone_multiplier: value.mental_break.alone_multiplier.max(0.0),
            check_interval_ticks: value.mental_break.check_interval_ticks.max(1),
            mental_state_secs: value.mental_break.mental_state_seconds.max(0.0),
            base_thresholds: BreakThresholds::new(
                value.mental_break.extreme_threshold,
                value.mental_break.major_threshold,
                value.mental_break.minor_threshold,
            ),
            recovery_mood_boost: value.mental_break.recovery_mood_boost.max(0.0),
        };

        let mood = MoodSettings {
            baseline: value.mood.baseline.clamp(0.0, 1.0),
            drift_per_second: value.mood.drift_per_second.max(0.0),
            near_others_offset: value.mood.near_others_offset,
            alone_offset: value.mood.alone_offset,
            company_radius_tiles: value.mood.company_radius_tiles.max(0.0),
            company_offset: value.mood.company_offset,
            refresh_interval_ticks: value.mood.refresh_interval_ticks.max(1),
        };

        let phrases = PhraseBook::new(
            value.phrases.enthusiastic.trim(),
            non_empty(value.phrases.chat),
            non_empty(value.phrases.jokes),
        );

        let raw_random = value.random_bubbles;
        let min_interval = raw_random.min_interval_ticks.max(1);
        let random_bubbles = RandomBubbleSettings {
            evaluation_interval_ticks: raw_random.evaluation_interval_ticks.max(1),
            initial_countdown_ticks: raw_random.initial_countdown_ticks,
            min_interval_ticks: min_interval,
            max_interval_ticks: raw_random.max_interval_ticks.max(min_interval + 1),
            bubble_chance: chance(raw_random.bubble_chance),
            company_radius_tiles: raw_random.company_radius_tiles.max(0.0),
            chat_when_near_chance: chance(raw_random.chat_when_near_chance),
            chat_when_alone_chance: chance(raw_random.chat_when_alone_chance),
        };

        let raw_interactions = value.interactions;
        let interactions = InteractionSettings {
            check_interval_ticks: raw_interactions.check_interval_ticks.max(1),
            range_tiles: raw_interactions.range_tiles.max(0.0),
            trigger_chance: chance(raw_interactions.trigger_chance),
            base_weight: raw_interactions.base_weight.max(0.0),
            both_chatty_factor: raw_interactions.both_chatty_factor.max(0.0),
            one_chatty_factor: raw_interactions.one_chatty_factor.max(0.0),
            neither_chatty_factor: raw_interactions.neither_chatty_factor.max(0.0),
            initiator_joke_chance: chance(raw_interactions.initiator_joke_chance),
            recipient_joke_chance: chance(raw_interactions.recipient_joke_chance),
            social_xp: raw_interactions.social_xp.max(0.0),
            ambient_interval_ticks: raw_interactions.ambient_interval_ticks.max(1),
            chitchat_weight: raw_interactions.chitchat_weight.max(0.0),
        };

        let telemetry = TelemetrySettings {
            log_path: value.telemetry.log_path,
            capacity: value.telemetry.capacity.max(1),
        };

        Self {
            bubble,
            nearby,
            mental_break,
            mood,
            phrases,
            random_bubbles,
            interactions,
            telemetry,
        }
    }
}
