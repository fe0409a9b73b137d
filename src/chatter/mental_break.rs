//! Mental break thresholds and the hook that lets chatter bend them.
use std::fmt;

use bevy::prelude::*;

use crate::colony::components::{Capabilities, Identity, Mood};
use crate::colony::roster::{ColonistSnapshot, ColonyRoster};
use crate::core::SimulationClock;

use super::config::{ChatterConfig, MentalBreakSettings};
use super::events::MentalBreakMessage;
use super::nearby::{CompanyProbe, NearbyStateCache};

/// Mood levels below which a break of each severity can start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreakThresholds {
    pub extreme: f32,
    pub major: f32,
    pub minor: f32,
}

impl BreakThresholds {
    pub fn new(extreme: f32, major: f32, minor: f32) -> Self {
        Self {
            extreme: extreme.clamp(0.0, 1.0),
            major: major.clamp(0.0, 1.0),
            minor: minor.clamp(0.0, 1.0),
        }
    }

    pub fn scaled(self, factor: f32) -> Self {
        Self {
            extreme: self.extreme * factor,
            major: self.major * factor,
            minor: self.minor * factor,
        }
    }

    /// The most severe break `mood` qualifies for.
    pub fn severity_for(&self, mood: f32) -> Option<BreakSeverity> {
        if mood < self.extreme {
            Some(BreakSeverity::Extreme)
        } else if mood < self.major {
            Some(BreakSeverity::Major)
        } else if mood < self.minor {
            Some(BreakSeverity::Minor)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakSeverity {
    Minor,
    Major,
    Extreme,
}

impl fmt::Display for BreakSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Minor => "minor",
            Self::Major => "major",
            Self::Extreme => "extreme",
        };
        f.write_str(label)
    }
}

/// Hook consulted every time the host reads a colonist's break thresholds.
pub trait MentalBreakModifier: Send + Sync + 'static {
    fn adjust(
        &self,
        subject: &ColonistSnapshot,
        probe: &mut CompanyProbe,
        thresholds: BreakThresholds,
    ) -> BreakThresholds;
}

/// Chatty colonists break less around company and more when alone.
///
/// Uses the debounced state so brief encounters do not swing thresholds.
#[derive(Debug, Clone, Copy)]
pub struct ChattyBreakModifier {
    pub around_others: f32,
    pub alone: f32,
}

impl From<&MentalBreakSettings> for ChattyBreakModifier {
    fn from(settings: &MentalBreakSettings) -> Self {
        Self {
            around_others: settings.around_others_multiplier,
            alone: settings.alone_multiplier,
        }
    }
}

impl MentalBreakModifier for ChattyBreakModifier {
    fn adjust(
        &self,
        subject: &ColonistSnapshot,
        probe: &mut CompanyProbe,
        thresholds: BreakThresholds,
    ) -> BreakThresholds {
        if !subject.chatty {
            return thresholds;
        }

        if probe.state(subject.id).effective {
            thresholds.scaled(self.around_others)
        } else {
            thresholds.scaled(self.alone)
        }
    }
}

/// Registered threshold modifiers, applied in order.
#[derive(Resource, Default)]
pub struct MentalBreakHooks {
    modifiers: Vec<Box<dyn MentalBreakModifier>>,
}

impl MentalBreakHooks {
    pub fn register(&mut self, modifier: Box<dyn MentalBreakModifier>) {
        self.modifiers.push(modifier);
    }

    pub fn thresholds_for(
        &self,
        subject: &ColonistSnapshot,
        probe: &mut CompanyProbe,
        base: BreakThresholds,
    ) -> BreakThresholds {
        self.modifiers
            .iter()
            .fold(base, |current, modifier| modifier.adjust(subject, probe, current))
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.modifiers.len()
    }
}

/// Per-colonist break thresholds before any hook runs.
#[derive(Component, Debug, Clone, Copy)]
pub struct MentalBreaker {
    pub base: BreakThresholds,
}

/// A colonist currently in a mental state.
#[derive(Component, Debug, Clone, Copy)]
pub struct MentalState {
    pub severity: BreakSeverity,
    pub remaining_secs: f32,
}

/// Compares each colonist's mood against their hooked thresholds and starts breaks.
pub fn check_mental_breaks(
    mut commands: Commands,
    clock: Res<SimulationClock>,
    config: Res<ChatterConfig>,
    roster: Res<ColonyRoster>,
    hooks: Res<MentalBreakHooks>,
    mut cache: ResMut<NearbyStateCache>,
    mut colonists: Query<
        (Entity, &Identity, &MentalBreaker, &Mood, &mut Capabilities),
        Without<MentalState>,
    >,
    mut breaks: MessageWriter<MentalBreakMessage>,
) {
    let settings = &config.mental_break;
    if !clock.crossed_interval(settings.check_interval_ticks) {
        return;
    }

    let mut probe = CompanyProbe::new(
        &mut cache,
        &roster,
        clock.ticks(),
        config.nearby.radius_tiles,
    );

    for (entity, identity, breaker, mood, mut capabilities) in colonists.iter_mut() {
        let Some(subject) = roster.get(identity.id) else {
            continue;
        };
        if !subject.live || capabilities.in_mental_state {
            continue;
        }

        let thresholds = hooks.thresholds_for(subject, &mut probe, breaker.base);
        let Some(severity) = thresholds.severity_for(mood.level) else {
            continue;
        };

        capabilities.in_mental_state = true;
        commands.entity(entity).insert(MentalState {
            severity,
            remaining_secs: settings.mental_state_secs,
        });
        info!(
            "{} ({}) suffers a {} mental break at mood {:.2} (minor threshold {:.2})",
            identity.display_name, identity.id, severity, mood.level, thresholds.minor
        );
        breaks.write(MentalBreakMessage {
            colonist: identity.id,
            severity,
        });
    }
}

/// Counts mental states down and releases colonists with a small mood catharsis.
pub fn recover_from_mental_states(
    mut commands: Commands,
    clock: Res<SimulationClock>,
    config: Res<ChatterConfig>,
    mut colonists: Query<(
        Entity,
        &Identity,
        &mut MentalState,
        &mut Capabilities,
        &mut Mood,
    )>,
) {
    let delta = clock.last_scaled_delta().as_secs_f32();
    for (entity, identity, mut state, mut capabilities, mut mood) in colonists.iter_mut() {
        state.remaining_secs -= delta;
        if state.remaining_secs > 0.0 {
            continue;
        }

        capabilities.in_mental_state = false;
        mood.shift(config.mental_break.recovery_mood_boost);
        commands.entity(entity).remove::<MentalState>();
        debug!("{} recovered from a {} mental state", identity.id, state.severity);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::colony::components::{
        ColonistId, Faction, Humanlike, TilePosition, Traits, Vitality,
    };
    use crate::colony::roster::refresh_colony_roster;
    use crate::colony::roster::test_support::{chatty, snapshot};

    fn base() -> BreakThresholds {
        BreakThresholds::new(0.05, 0.15, 0.35)
    }

    fn modifier() -> ChattyBreakModifier {
        ChattyBreakModifier {
            around_others: 0.7,
            alone: 1.3,
        }
    }

    #[test]
    fn chatty_colonist_in_company_breaks_less() {
        let roster = ColonyRoster::from_snapshots(vec![
            chatty(1, Vec2::ZERO),
            snapshot(2, Vec2::new(4.0, 0.0)),
        ]);
        let mut cache = NearbyStateCache::default();
        let mut probe = CompanyProbe::new(&mut cache, &roster, 0, 10.0);

        let subject = roster.get(ColonistId::new(1)).unwrap();
        let adjusted = modifier().adjust(subject, &mut probe, base());
        assert!((adjusted.minor - 0.245).abs() < 1e-5);
        assert!((adjusted.major - 0.105).abs() < 1e-5);
        assert!((adjusted.extreme - 0.035).abs() < 1e-5);
    }

    #[test]
    fn lonely_chatty_colonist_breaks_more() {
        let roster = ColonyRoster::from_snapshots(vec![
            chatty(1, Vec2::ZERO),
            snapshot(2, Vec2::new(40.0, 0.0)),
        ]);
        let mut cache = NearbyStateCache::default();
        let mut probe = CompanyProbe::new(&mut cache, &roster, 0, 10.0);

        let subject = roster.get(ColonistId::new(1)).unwrap();
        let adjusted = modifier().adjust(subject, &mut probe, base());
        assert!((adjusted.minor - 0.455).abs() < 1e-5);
    }

    #[test]
    fn quiet_colonists_are_untouched_and_never_cached() {
        let roster = ColonyRoster::from_snapshots(vec![snapshot(1, Vec2::ZERO)]);
        let mut cache = NearbyStateCache::default();
        let mut probe = CompanyProbe::new(&mut cache, &roster, 0, 10.0);

        let subject = roster.get(ColonistId::new(1)).unwrap();
        assert_eq!(modifier().adjust(subject, &mut probe, base()), base());
        assert!(cache.is_empty());
    }

    #[test]
    fn brief_company_does_not_change_thresholds() {
        let mut cache = NearbyStateCache::new(1, 1800);
        let alone = ColonyRoster::from_snapshots(vec![
            chatty(1, Vec2::ZERO),
            snapshot(2, Vec2::new(40.0, 0.0)),
        ]);
        let together = ColonyRoster::from_snapshots(vec![
            chatty(1, Vec2::ZERO),
            snapshot(2, Vec2::new(1.0, 0.0)),
        ]);

        let first = {
            let mut probe = CompanyProbe::new(&mut cache, &alone, 0, 10.0);
            let subject = alone.get(ColonistId::new(1)).unwrap();
            modifier().adjust(subject, &mut probe, base())
        };
        let visited = {
            let mut probe = CompanyProbe::new(&mut cache, &together, 100, 10.0);
            let subject = together.get(ColonistId::new(1)).unwrap();
            modifier().adjust(subject, &mut probe, base())
        };
        assert_eq!(first, visited);
    }

    #[test]
    fn severity_picks_the_deepest_threshold() {
        let thresholds = base();
        assert_eq!(thresholds.severity_for(0.01), Some(BreakSeverity::Extreme));
        assert_eq!(thresholds.severity_for(0.10), Some(BreakSeverity::Major));
        assert_eq!(thresholds.severity_for(0.30), Some(BreakSeverity::Minor));
        assert_eq!(thresholds.severity_for(0.50), None);
    }

    #[test]
    fn hooks_fold_in_registration_order() {
        struct Halve;
        impl MentalBreakModifier for Halve {
            fn adjust(
                &self,
                _subject: &ColonistSnapshot,
                _probe: &mut CompanyProbe,
                thresholds: BreakThresholds,
            ) -> BreakThresholds {
                thresholds.scaled(0.5)
            }
        }

        let roster = ColonyRoster::from_snapshots(vec![chatty(1, Vec2::ZERO)]);
        let mut cache = NearbyStateCache::default();
        let mut probe = CompanyProbe::new(&mut cache, &roster, 0, 10.0);
        let mut hooks = MentalBreakHooks::default();
        hooks.register(Box::new(modifier()));
        hooks.register(Box::new(Halve));

        let subject = roster.get(ColonistId::new(1)).unwrap();
        let thresholds = hooks.thresholds_for(subject, &mut probe, base());
        assert!((thresholds.minor - 0.35 * 1.3 * 0.5).abs() < 1e-5);
    }

    #[test]
    fn lonely_chatty_colonist_breaks_then_recovers() {
        let mut app = App::new();
        let config = ChatterConfig::default();
        let mut hooks = MentalBreakHooks::default();
        hooks.register(Box::new(ChattyBreakModifier::from(&config.mental_break)));

        app.add_message::<MentalBreakMessage>()
            .insert_resource(config)
            .insert_resource(hooks)
            .insert_resource(SimulationClock::default())
            .init_resource::<NearbyStateCache>()
            .init_resource::<ColonyRoster>()
            .add_systems(
                Update,
                (
                    refresh_colony_roster,
                    check_mental_breaks,
                    recover_from_mental_states,
                )
                    .chain(),
            );

        // Mood 0.4 is above the base minor threshold but below 0.35 * 1.3.
        let lonely = app
            .world_mut()
            .spawn((
                Identity::new(ColonistId::new(1), "Lonely"),
                TilePosition(Vec2::ZERO),
                Faction::PLAYER,
                Humanlike(true),
                Traits { chatty: true },
                Vitality::alive(),
                Capabilities::default(),
                MentalBreaker { base: base() },
                Mood::new(0.4),
            ))
            .id();

        app.world_mut()
            .resource_mut::<SimulationClock>()
            .tick(Duration::from_secs(3));
        app.update();

        let state = app
            .world()
            .entity(lonely)
            .get::<MentalState>()
            .copied()
            .expect("lonely chatty colonist breaks");
        assert_eq!(state.severity, BreakSeverity::Minor);
        assert!(app.world().entity(lonely).get::<Capabilities>().unwrap().in_mental_state);

        app.world_mut()
            .resource_mut::<SimulationClock>()
            .tick(Duration::from_secs(25));
        app.update();

        let entity = app.world().entity(lonely);
        assert!(entity.get::<MentalState>().is_none());
        assert!(!entity.get::<Capabilities>().unwrap().in_mental_state);
        assert!(entity.get::<Mood>().unwrap().level > 0.4);
    }
}
