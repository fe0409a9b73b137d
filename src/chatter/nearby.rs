//! Shared, debounced "has company nearby" state per colonist.
//!
//! The proximity scan is cached for `ttl_ticks`; the value consumers act on
//! (`effective`) only follows the raw value once it has held for `grace_ticks`.
use std::collections::hash_map::Entry;
use std::collections::HashMap;

use bevy::prelude::*;

use crate::colony::components::ColonistId;
use crate::colony::roster::{has_nearby_colonist, ColonyRoster};

pub const DEFAULT_TTL_TICKS: u64 = 500;
pub const DEFAULT_GRACE_TICKS: u64 = 1800;

/// Result of a cache query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NearbyState {
    /// Last computed proximity result.
    pub raw: bool,
    /// Debounced value.
    pub effective: bool,
}

/// Cached proximity state for one colonist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NearbyEntry {
    raw: bool,
    effective: bool,
    last_checked_at: u64,
    state_changed_at: u64,
}

impl NearbyEntry {
    fn first_observation(raw: bool, now: u64) -> Self {
        Self {
            raw,
            effective: raw,
            last_checked_at: now,
            state_changed_at: now,
        }
    }

    pub fn raw(&self) -> bool {
        self.raw
    }

    pub fn effective(&self) -> bool {
        self.effective
    }

    pub fn last_checked_at(&self) -> u64 {
        self.last_checked_at
    }

    pub fn state_changed_at(&self) -> u64 {
        self.state_changed_at
    }

    fn state(&self) -> NearbyState {
        NearbyState {
            raw: self.raw,
            effective: self.effective,
        }
    }
}

/// One cache for every consumer, keyed by colonist.
#[derive(Resource, Debug)]
pub struct NearbyStateCache {
    entries: HashMap<ColonistId, NearbyEntry>,
    ttl_ticks: u64,
    grace_ticks: u64,
}

impl NearbyStateCache {
    pub fn new(ttl_ticks: u64, grace_ticks: u64) -> Self {
        Self {
            entries: HashMap::new(),
            ttl_ticks,
            grace_ticks,
        }
    }

    pub fn ttl_ticks(&self) -> u64 {
        self.ttl_ticks
    }

    pub fn grace_ticks(&self) -> u64 {
        self.grace_ticks
    }

    /// Returns the raw and debounced state of `colonist` at tick `now`.
    ///
    /// `compute` runs only for a first observation or once the cached value is
    /// at least `ttl_ticks` old, so repeated queries in one window are free and
    /// return identical results.
    pub fn query(
        &mut self,
        colonist: ColonistId,
        now: u64,
        compute: impl FnOnce(ColonistId) -> bool,
    ) -> NearbyState {
        let ttl = self.ttl_ticks;
        let grace = self.grace_ticks;

        let entry = match self.entries.entry(colonist) {
            Entry::Occupied(occupied) => occupied.into_mut(),
            Entry::Vacant(vacant) => {
                let entry = NearbyEntry::first_observation(compute(colonist), now);
                vacant.insert(entry);
                return entry.state();
            }
        };

        let raw = if now.saturating_sub(entry.last_checked_at) >= ttl {
            entry.last_checked_at = now;
            compute(colonist)
        } else {
            entry.raw
        };

        if raw != entry.raw {
            entry.raw = raw;
            entry.state_changed_at = now;
        }

        if entry.effective != entry.raw && now.saturating_sub(entry.state_changed_at) >= grace {
            entry.effective = entry.raw;
        }

        entry.state()
    }

    pub fn entry(&self, colonist: ColonistId) -> Option<&NearbyEntry> {
        self.entries.get(&colonist)
    }

    /// Drops entries for colonists that no longer exist. Returns how many were removed.
    pub fn retain_live(&mut self, mut is_live: impl FnMut(ColonistId) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|colonist, _| is_live(*colonist));
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for NearbyStateCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL_TICKS, DEFAULT_GRACE_TICKS)
    }
}

/// Borrowed view that answers "does this colonist have company" for one frame.
///
/// Every consumer goes through the same cache so they agree on the state.
pub struct CompanyProbe<'a> {
    cache: &'a mut NearbyStateCache,
    roster: &'a ColonyRoster,
    now: u64,
    radius: f32,
}

impl<'a> CompanyProbe<'a> {
    pub fn new(
        cache: &'a mut NearbyStateCache,
        roster: &'a ColonyRoster,
        now: u64,
        radius: f32,
    ) -> Self {
        Self {
            cache,
            roster,
            now,
            radius,
        }
    }

    pub fn state(&mut self, colonist: ColonistId) -> NearbyState {
        let roster = self.roster;
        let radius = self.radius;
        self.cache.query(colonist, self.now, |id| {
            has_nearby_colonist(roster, id, radius)
        })
    }
}
