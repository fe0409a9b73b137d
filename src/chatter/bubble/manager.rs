//! Owns active bubbles and the per-colonist trigger cooldowns.
use std::collections::HashMap;

use bevy::prelude::*;
use rand::Rng;

use crate::chatter::phrases::PhraseBook;
use crate::colony::components::ColonistId;
use crate::colony::roster::ColonistSnapshot;

use super::components::{Bubble, BubbleCategory, BubbleId, BubbleProfile};
use super::errors::BubbleRejection;

pub const DEFAULT_MIN_COOLDOWN_SECS: f32 = 10.0;

/// The colonist a bubble is requested for, as seen at trigger time.
#[derive(Debug, Clone, Copy)]
pub struct BubbleSpeaker {
    pub entity: Entity,
    pub colonist: ColonistId,
    pub live: bool,
}

impl From<&ColonistSnapshot> for BubbleSpeaker {
    fn from(snapshot: &ColonistSnapshot) -> Self {
        Self {
            entity: snapshot.entity,
            colonist: snapshot.id,
            live: snapshot.live,
        }
    }
}

/// Last successful trigger time per colonist.
#[derive(Debug, Default)]
pub struct CooldownLedger {
    last_trigger: HashMap<ColonistId, f32>,
}

impl CooldownLedger {
    pub fn last_trigger(&self, colonist: ColonistId) -> Option<f32> {
        self.last_trigger.get(&colonist).copied()
    }

    /// Seconds left before `colonist` may trigger again, if any.
    pub fn remaining(&self, colonist: ColonistId, now: f32, cooldown: f32) -> Option<f32> {
        let last = self.last_trigger(colonist)?;
        let since = now - last;
        (since < cooldown).then_some(cooldown - since)
    }

    pub fn record(&mut self, colonist: ColonistId, now: f32) {
        self.last_trigger.insert(colonist, now);
    }

    /// Drops records for colonists that no longer exist. Returns how many were removed.
    pub fn retain_live(&mut self, mut is_live: impl FnMut(ColonistId) -> bool) -> usize {
        let before = self.last_trigger.len();
        self.last_trigger.retain(|colonist, _| is_live(*colonist));
        before - self.last_trigger.len()
    }

    pub fn len(&self) -> usize {
        self.last_trigger.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.last_trigger.is_empty()
    }
}

/// Creates, expires and enumerates bubbles. Single owner of the bubble set.
#[derive(Resource, Debug)]
pub struct BubbleManager {
    bubbles: Vec<Bubble>,
    cooldowns: CooldownLedger,
    next_id: u64,
    min_cooldown_secs: f32,
    profile: BubbleProfile,
}

impl BubbleManager {
    pub fn new(min_cooldown_secs: f32, profile: BubbleProfile) -> Self {
        Self {
            bubbles: Vec::new(),
            cooldowns: CooldownLedger::default(),
            next_id: 0,
            min_cooldown_secs: min_cooldown_secs.max(0.0),
            profile,
        }
    }

    pub fn min_cooldown_secs(&self) -> f32 {
        self.min_cooldown_secs
    }

    /// Shows a bubble above `speaker` with the manager's default profile.
    ///
    /// `text` wins when non-empty; otherwise the text comes from `phrases`.
    pub fn trigger<R: Rng + ?Sized>(
        &mut self,
        speaker: &BubbleSpeaker,
        category: BubbleCategory,
        text: Option<&str>,
        now: f32,
        phrases: &PhraseBook,
        rng: &mut R,
    ) -> Result<BubbleId, BubbleRejection> {
        let profile = self.profile;
        self.trigger_with_profile(speaker, category, text, now, profile, phrases, rng)
    }

    /// Same as `trigger` with an explicit timing profile.
    #[allow(clippy::too_many_arguments)]
    pub fn trigger_with_profile<R: Rng + ?Sized>(
        &mut self,
        speaker: &BubbleSpeaker,
        category: BubbleCategory,
        text: Option<&str>,
        now: f32,
        profile: BubbleProfile,
        phrases: &PhraseBook,
        rng: &mut R,
    ) -> Result<BubbleId, BubbleRejection> {
        if !speaker.live || speaker.entity == Entity::PLACEHOLDER {
            return Err(BubbleRejection::invalid_speaker(speaker.colonist));
        }

        if let Some(remaining) =
            self.cooldowns
                .remaining(speaker.colonist, now, self.min_cooldown_secs)
        {
            return Err(BubbleRejection::cooling_down(speaker.colonist, remaining));
        }

        let text = match text.map(str::trim) {
            Some(supplied) if !supplied.is_empty() => supplied.to_string(),
            _ => phrases.pick(category, rng),
        };

        let id = BubbleId::new(self.next_id);
        self.next_id += 1;

        self.cooldowns.record(speaker.colonist, now);
        self.bubbles.push(Bubble::new(
            id,
            speaker.entity,
            speaker.colonist,
            text,
            category,
            now,
            profile,
        ));

        Ok(id)
    }

    /// Removes every bubble past its lifetime and returns their ids.
    pub fn tick(&mut self, now: f32) -> Vec<BubbleId> {
        let mut expired = Vec::new();
        self.bubbles.retain(|bubble| {
            if bubble.is_active(now) {
                true
            } else {
                expired.push(bubble.id());
                false
            }
        });
        expired
    }

    pub fn get(&self, id: BubbleId) -> Option<&Bubble> {
        self.bubbles.iter().find(|bubble| bubble.id() == id)
    }

    pub fn bubbles(&self) -> impl Iterator<Item = &Bubble> {
        self.bubbles.iter()
    }

    pub fn cooldowns(&self) -> &CooldownLedger {
        &self.cooldowns
    }

    /// Forgets cooldowns of colonists that are gone for good.
    pub fn sweep_cooldowns(&mut self, is_live: impl FnMut(ColonistId) -> bool) -> usize {
        self.cooldowns.retain_live(is_live)
    }

    pub fn len(&self) -> usize {
        self.bubbles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bubbles.is_empty()
    }
}

impl Default for BubbleManager {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_COOLDOWN_SECS, BubbleProfile::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Live speaker backed by a real entity; distinct ids give distinct entities.
    fn speaker(id: u64) -> BubbleSpeaker {
        let mut world = World::new();
        let entity = (0..=id)
            .map(|_| world.spawn_empty().id())
            .last()
            .expect("at least one spawn");
        BubbleSpeaker {
            entity,
            colonist: ColonistId::new(id),
            live: true,
        }
    }

    #[test]
    fn helper_speakers_are_never_placeholders() {
        let entities: Vec<Entity> = (0..4).map(|id| speaker(id).entity).collect();
        for (n, entity) in entities.iter().enumerate() {
            assert_ne!(*entity, Entity::PLACEHOLDER);
            assert!(!entities[..n].contains(entity));
        }
    }

    fn hi_hey() -> PhraseBook {
        PhraseBook::new(
            "So excited to chat!",
            vec!["Hi".to_string(), "Hey".to_string()],
            vec!["A joke".to_string()],
        )
    }

    #[test]
    fn cooldown_rejects_then_accepts() {
        let mut manager = BubbleManager::default();
        let mut rng = StdRng::seed_from_u64(3);
        let phrases = hi_hey();
        let alice = speaker(1);

        assert!(manager
            .trigger(&alice, BubbleCategory::Chat, None, 0.0, &phrases, &mut rng)
            .is_ok());

        let rejected = manager.trigger(&alice, BubbleCategory::Joke, None, 9.5, &phrases, &mut rng);
        match rejected {
            Err(BubbleRejection::CoolingDown { remaining_secs, .. }) => {
                assert!((remaining_secs - 0.5).abs() < 1e-4)
            }
            other => panic!("expected cooldown rejection, got {other:?}"),
        }

        assert!(manager
            .trigger(&alice, BubbleCategory::Joke, None, 10.0, &phrases, &mut rng)
            .is_ok());
        assert_eq!(manager.cooldowns().last_trigger(alice.colonist), Some(10.0));
    }

    #[test]
    fn cooldown_is_per_colonist() {
        let mut manager = BubbleManager::default();
        let mut rng = StdRng::seed_from_u64(3);
        let phrases = hi_hey();

        assert!(manager
            .trigger(&speaker(1), BubbleCategory::Chat, None, 0.0, &phrases, &mut rng)
            .is_ok());
        assert!(manager
            .trigger(&speaker(2), BubbleCategory::Chat, None, 0.1, &phrases, &mut rng)
            .is_ok());
        assert_eq!(manager.len(), 2);
    }

    #[test]
    fn invalid_speaker_is_rejected_without_recording() {
        let mut manager = BubbleManager::default();
        let mut rng = StdRng::seed_from_u64(3);
        let phrases = hi_hey();
        let mut ghost = speaker(5);
        ghost.live = false;

        let result = manager.trigger(&ghost, BubbleCategory::Chat, None, 0.0, &phrases, &mut rng);
        assert_eq!(result, Err(BubbleRejection::invalid_speaker(ColonistId::new(5))));
        assert!(manager.is_empty());
        assert_eq!(manager.cooldowns().last_trigger(ghost.colonist), None);

        // Reviving right after must not be blocked by a phantom cooldown.
        ghost.live = true;
        assert!(manager
            .trigger(&ghost, BubbleCategory::Chat, None, 0.5, &phrases, &mut rng)
            .is_ok());
    }

    #[test]
    fn text_comes_from_caller_or_pool() {
        let mut manager = BubbleManager::new(0.0, BubbleProfile::default());
        let mut rng = StdRng::seed_from_u64(11);
        let phrases = hi_hey();

        let supplied = manager
            .trigger(&speaker(1), BubbleCategory::Chat, Some("Lunch?"), 0.0, &phrases, &mut rng)
            .unwrap();
        assert_eq!(manager.get(supplied).unwrap().text(), "Lunch?");

        let blank = manager
            .trigger(&speaker(1), BubbleCategory::Chat, Some("   "), 1.0, &phrases, &mut rng)
            .unwrap();
        let text = manager.get(blank).unwrap().text();
        assert!(text == "Hi" || text == "Hey");

        let eager = manager
            .trigger(&speaker(1), BubbleCategory::Enthusiastic, None, 2.0, &phrases, &mut rng)
            .unwrap();
        assert_eq!(manager.get(eager).unwrap().text(), "So excited to chat!");
    }

    #[test]
    fn tick_removes_only_expired_bubbles() {
        let mut manager = BubbleManager::new(0.0, BubbleProfile::default());
        let mut rng = StdRng::seed_from_u64(1);
        let phrases = hi_hey();

        let first = manager
            .trigger(&speaker(1), BubbleCategory::Chat, None, 0.0, &phrases, &mut rng)
            .unwrap();
        let second = manager
            .trigger(&speaker(2), BubbleCategory::Joke, None, 1.0, &phrases, &mut rng)
            .unwrap();

        assert!(manager.tick(4.0).is_empty());
        assert_eq!(manager.tick(4.1), vec![first]);
        assert!(manager.get(first).is_none());
        assert!(manager.get(second).is_some());
        assert_eq!(manager.tick(5.5), vec![second]);
        assert!(manager.is_empty());
    }

    #[test]
    fn reference_scenario() {
        let mut manager = BubbleManager::default();
        let mut rng = StdRng::seed_from_u64(42);
        let phrases = hi_hey();

        let id = manager
            .trigger(&speaker(1), BubbleCategory::Chat, None, 0.0, &phrases, &mut rng)
            .unwrap();
        let bubble = manager.get(id).unwrap().clone();
        assert!(bubble.text() == "Hi" || bubble.text() == "Hey");
        assert!((bubble.alpha_at(0.075) - 0.5).abs() < 1e-4);
        assert_eq!(bubble.alpha_at(2.0), 1.0);
        assert!((bubble.alpha_at(3.8) - 0.4).abs() < 1e-4);

        assert_eq!(manager.tick(4.1), vec![id]);
        assert!(manager.bubbles().next().is_none());
    }

    #[test]
    fn ids_are_unique_and_increasing() {
        let mut manager = BubbleManager::new(0.0, BubbleProfile::default());
        let mut rng = StdRng::seed_from_u64(9);
        let phrases = hi_hey();
        let ids: Vec<_> = (0..4)
            .map(|n| {
                manager
                    .trigger(&speaker(n), BubbleCategory::Chat, None, 0.0, &phrases, &mut rng)
                    .unwrap()
            })
            .collect();
        assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn composed_profile_is_honoured() {
        let mut manager = BubbleManager::default();
        let mut rng = StdRng::seed_from_u64(9);
        let phrases = hi_hey();
        let id = manager
            .trigger_with_profile(
                &speaker(1),
                BubbleCategory::Joke,
                None,
                0.0,
                BubbleProfile::composed(0.15, 2.0, 0.5),
                &phrases,
                &mut rng,
            )
            .unwrap();
        assert!(manager.tick(2.6).is_empty());
        assert_eq!(manager.tick(2.7), vec![id]);
    }

    #[test]
    fn sweep_forgets_departed_colonists() {
        let mut manager = BubbleManager::default();
        let mut rng = StdRng::seed_from_u64(9);
        let phrases = hi_hey();
        for n in 0..3 {
            manager
                .trigger(&speaker(n), BubbleCategory::Chat, None, 0.0, &phrases, &mut rng)
                .unwrap();
        }
        let removed = manager.sweep_cooldowns(|colonist| colonist == ColonistId::new(1));
        assert_eq!(removed, 2);
        assert_eq!(manager.cooldowns().len(), 1);
    }
}
