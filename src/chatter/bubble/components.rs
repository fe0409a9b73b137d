//! Bubble data: identity, category, timing profile and the fade curve.
use std::fmt;

use bevy::prelude::*;

use crate::colony::components::ColonistId;

/// Identifier handed out by the bubble manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BubbleId(u64);

impl BubbleId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for BubbleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bubble-{}", self.0)
    }
}

/// Bubble classification. Only affects colour and the sound cue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BubbleCategory {
    Enthusiastic,
    Chat,
    Joke,
}

impl BubbleCategory {
    pub fn label(self) -> &'static str {
        match self {
            Self::Enthusiastic => "enthusiastic",
            Self::Chat => "chat",
            Self::Joke => "joke",
        }
    }

    /// Fixed background palette.
    pub fn background_color(self) -> Color {
        match self {
            Self::Enthusiastic => Color::srgb(1.0, 0.7, 0.7),
            Self::Chat => Color::WHITE,
            Self::Joke => Color::srgb(0.7, 1.0, 0.7),
        }
    }

    pub fn sound_cue(self) -> SoundCue {
        match self {
            Self::Enthusiastic => SoundCue::TickHigh,
            Self::Chat => SoundCue::TickLow,
            Self::Joke => SoundCue::TickTiny,
        }
    }
}

impl fmt::Display for BubbleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One-shot UI sounds played alongside a new bubble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    TickHigh,
    TickLow,
    TickTiny,
}

impl fmt::Display for SoundCue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::TickHigh => "tick_high",
            Self::TickLow => "tick_low",
            Self::TickTiny => "tick_tiny",
        };
        f.write_str(label)
    }
}

/// Fade-in, lifetime and fade-out of a bubble, in seconds.
///
/// A profile whose ramps overlap (`fade_in + fade_out >= duration`) is allowed;
/// it simply never reaches a hold segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BubbleProfile {
    fade_in: f32,
    fade_out: f32,
    duration: f32,
}

fn non_negative(value: f32) -> f32 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

impl BubbleProfile {
    pub const DEFAULT_DURATION_SECS: f32 = 4.0;
    pub const DEFAULT_FADE_IN_SECS: f32 = 0.15;
    pub const DEFAULT_FADE_OUT_SECS: f32 = 0.5;

    /// Profile with an explicit total lifetime.
    pub fn new(duration: f32, fade_in: f32, fade_out: f32) -> Self {
        Self {
            fade_in: non_negative(fade_in),
            fade_out: non_negative(fade_out),
            duration: non_negative(duration),
        }
    }

    /// Profile whose lifetime is `fade_in + solid + fade_out` (floating text motes).
    pub fn composed(fade_in: f32, solid: f32, fade_out: f32) -> Self {
        let fade_in = non_negative(fade_in);
        let fade_out = non_negative(fade_out);
        Self {
            fade_in,
            fade_out,
            duration: fade_in + non_negative(solid) + fade_out,
        }
    }

    pub fn fade_in(&self) -> f32 {
        self.fade_in
    }

    pub fn fade_out(&self) -> f32 {
        self.fade_out
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn has_hold_segment(&self) -> bool {
        self.duration > self.fade_in + self.fade_out
    }

    /// Opacity `elapsed` seconds after creation.
    ///
    /// Minimum of the rising and falling ramps, clamped to `[0, 1]`; zero
    /// outside `[0, duration]`.
    pub fn alpha(&self, elapsed: f32) -> f32 {
        if !elapsed.is_finite() || elapsed < 0.0 || elapsed > self.duration {
            return 0.0;
        }

        let rising = if self.fade_in > 0.0 {
            elapsed / self.fade_in
        } else {
            1.0
        };
        let falling = if self.fade_out > 0.0 {
            (self.duration - elapsed) / self.fade_out
        } else {
            1.0
        };

        rising.min(falling).clamp(0.0, 1.0)
    }
}

impl Default for BubbleProfile {
    fn default() -> Self {
        Self::new(
            Self::DEFAULT_DURATION_SECS,
            Self::DEFAULT_FADE_IN_SECS,
            Self::DEFAULT_FADE_OUT_SECS,
        )
    }
}

/// A short-lived annotation above a colonist.
#[derive(Debug, Clone)]
pub struct Bubble {
    id: BubbleId,
    speaker: Entity,
    colonist: ColonistId,
    text: String,
    category: BubbleCategory,
    created_at: f32,
    profile: BubbleProfile,
}

impl Bubble {
    pub fn new(
        id: BubbleId,
        speaker: Entity,
        colonist: ColonistId,
        text: impl Into<String>,
        category: BubbleCategory,
        created_at: f32,
        profile: BubbleProfile,
    ) -> Self {
        Self {
            id,
            speaker,
            colonist,
            text: text.into(),
            category,
            created_at,
            profile,
        }
    }

    pub fn id(&self) -> BubbleId {
        self.id
    }

    /// The entity this bubble follows. Never owned; may have been despawned.
    pub fn speaker(&self) -> Entity {
        self.speaker
    }

    pub fn colonist(&self) -> ColonistId {
        self.colonist
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn category(&self) -> BubbleCategory {
        self.category
    }

    pub fn created_at(&self) -> f32 {
        self.created_at
    }

    pub fn profile(&self) -> &BubbleProfile {
        &self.profile
    }

    pub fn expires_at(&self) -> f32 {
        self.created_at + self.profile.duration()
    }

    pub fn is_active(&self, now: f32) -> bool {
        now <= self.expires_at()
    }

    pub fn alpha_at(&self, now: f32) -> f32 {
        self.profile.alpha(now - self.created_at)
    }

    pub fn is_visible(&self, now: f32) -> bool {
        self.is_active(now) && self.alpha_at(now) > 0.0
    }
}
