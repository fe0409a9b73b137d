//! Colonist components and supporting resources.
use std::fmt;

use bevy::prelude::*;

/// Stable identifier for a colonist, independent of the ECS entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Component)]
pub struct ColonistId(u64);

impl ColonistId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ColonistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Colonist-{:04}", self.0)
    }
}

/// Display data for a colonist.
#[derive(Component, Debug, Clone)]
pub struct Identity {
    pub id: ColonistId,
    pub display_name: String,
}

impl Identity {
    pub fn new(id: ColonistId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
        }
    }
}

/// Faction membership; proximity checks only count colonists of the same faction.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Faction(pub u32);

impl Faction {
    pub const PLAYER: Faction = Faction(0);
}

/// Trait flags relevant to chatter behaviour.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Traits {
    pub chatty: bool,
}

/// Humanlike race flag. Animals never count as company.
#[derive(Component, Debug, Clone, Copy)]
pub struct Humanlike(pub bool);

/// Liveness of a colonist as seen by the host.
#[derive(Component, Debug, Clone, Copy)]
pub struct Vitality {
    pub dead: bool,
    pub spawned: bool,
}

impl Vitality {
    pub fn alive() -> Self {
        Self {
            dead: false,
            spawned: true,
        }
    }

    /// A colonist that can carry bubbles and be counted as company.
    pub fn is_live(&self) -> bool {
        self.spawned && !self.dead
    }
}

/// Capacities and states that gate social interactions.
#[derive(Component, Debug, Clone, Copy)]
pub struct Capabilities {
    pub awake: bool,
    pub drafted: bool,
    pub in_mental_state: bool,
    pub can_talk: bool,
    pub can_hear: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            awake: true,
            drafted: false,
            in_mental_state: false,
            can_talk: true,
            can_hear: true,
        }
    }
}

impl Capabilities {
    pub fn can_initiate(&self) -> bool {
        self.awake && !self.drafted && !self.in_mental_state && self.can_talk
    }

    pub fn can_receive(&self) -> bool {
        self.awake && !self.drafted && !self.in_mental_state && self.can_hear
    }
}

/// Position on the colony grid, in tiles.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct TilePosition(pub Vec2);

/// Random-walk state for debug colonists.
#[derive(Component, Debug, Clone)]
pub struct Wander {
    pub target: Vec2,
    pub speed_tiles_per_sec: f32,
    pub pause_remaining: f32,
}

impl Wander {
    pub fn new(start: Vec2, speed_tiles_per_sec: f32) -> Self {
        Self {
            target: start,
            speed_tiles_per_sec,
            pause_remaining: 0.0,
        }
    }
}

/// Accumulated social experience.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct SocialSkill {
    pub xp: f32,
}

impl SocialSkill {
    pub fn learn(&mut self, amount: f32) {
        if amount > 0.0 {
            self.xp += amount;
        }
    }
}

/// Mood level in `[0, 1]`.
#[derive(Component, Debug, Clone, Copy)]
pub struct Mood {
    pub level: f32,
}

impl Mood {
    pub fn new(level: f32) -> Self {
        Self {
            level: level.clamp(0.0, 1.0),
        }
    }

    pub fn shift(&mut self, delta: f32) {
        self.level = (self.level + delta).clamp(0.0, 1.0);
    }
}

/// Resource that issues monotonically increasing colonist ids.
#[derive(Resource, Default)]
pub struct ColonistIdGenerator {
    next: u64,
}

impl ColonistIdGenerator {
    pub fn next_id(&mut self) -> ColonistId {
        let id = self.next;
        self.next += 1;
        ColonistId::new(id)
    }
}
