//! Per-frame snapshot of colonist state used for proximity queries.
use std::collections::HashMap;

use bevy::prelude::*;

use super::components::{
    Capabilities, ColonistId, Faction, Humanlike, Identity, TilePosition, Traits, Vitality,
};

/// Everything the chatter logic needs to know about one colonist.
#[derive(Debug, Clone)]
pub struct ColonistSnapshot {
    pub entity: Entity,
    pub id: ColonistId,
    pub position: Vec2,
    pub faction: Faction,
    pub humanlike: bool,
    pub chatty: bool,
    pub live: bool,
    pub capabilities: Capabilities,
}

/// Snapshot of every colonist on the map, rebuilt at the start of each frame.
#[derive(Resource, Debug, Default)]
pub struct ColonyRoster {
    colonists: Vec<ColonistSnapshot>,
    index: HashMap<ColonistId, usize>,
}

impl ColonyRoster {
    pub fn from_snapshots(colonists: Vec<ColonistSnapshot>) -> Self {
        let index = colonists
            .iter()
            .enumerate()
            .map(|(slot, snapshot)| (snapshot.id, slot))
            .collect();
        Self { colonists, index }
    }

    pub fn get(&self, id: ColonistId) -> Option<&ColonistSnapshot> {
        self.index.get(&id).map(|slot| &self.colonists[*slot])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColonistSnapshot> {
        self.colonists.iter()
    }

    pub fn is_live(&self, id: ColonistId) -> bool {
        self.get(id).is_some_and(|snapshot| snapshot.live)
    }

    /// Live chatty colonists in roster order.
    pub fn chatty_colonists(&self) -> impl Iterator<Item = &ColonistSnapshot> {
        self.colonists
            .iter()
            .filter(|snapshot| snapshot.live && snapshot.chatty)
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.colonists.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.colonists.is_empty()
    }
}

fn within_radius(a: Vec2, b: Vec2, radius: f32) -> bool {
    a.distance_squared(b) <= radius * radius
}

/// True when another live humanlike colonist of the same faction is within `radius` tiles.
///
/// Unknown or non-live colonists never have company.
pub fn has_nearby_colonist(roster: &ColonyRoster, id: ColonistId, radius: f32) -> bool {
    let Some(subject) = roster.get(id) else {
        return false;
    };
    if !subject.live {
        return false;
    }

    roster.iter().any(|other| {
        other.id != subject.id
            && other.live
            && other.humanlike
            && other.faction == subject.faction
            && within_radius(other.position, subject.position, radius)
    })
}

/// True when any other live humanlike is within `radius` tiles, regardless of faction.
pub fn has_nearby_humanlike(roster: &ColonyRoster, id: ColonistId, radius: f32) -> bool {
    let Some(subject) = roster.get(id) else {
        return false;
    };

    roster.iter().any(|other| {
        other.id != subject.id
            && other.live
            && other.humanlike
            && within_radius(other.position, subject.position, radius)
    })
}

/// True when another live colonist of the same faction is strictly closer than `distance`.
///
/// Unlike [`has_nearby_colonist`] this counts non-humanlike faction members too.
pub fn has_company_within(roster: &ColonyRoster, id: ColonistId, distance: f32) -> bool {
    let Some(subject) = roster.get(id) else {
        return false;
    };
    if !subject.live {
        return false;
    }

    roster.iter().any(|other| {
        other.id != subject.id
            && other.live
            && other.faction == subject.faction
            && other.position.distance(subject.position) < distance
    })
}

/// Strictly-closer-than check between two colonists, used by company thoughts.
pub fn colonists_within(roster: &ColonyRoster, a: ColonistId, b: ColonistId, distance: f32) -> bool {
    match (roster.get(a), roster.get(b)) {
        (Some(first), Some(second)) => {
            first.live && second.live && first.position.distance(second.position) < distance
        }
        _ => false,
    }
}

/// Rebuilds the roster from live ECS state.
pub fn refresh_colony_roster(
    mut roster: ResMut<ColonyRoster>,
    query: Query<(
        Entity,
        &Identity,
        &TilePosition,
        &Faction,
        &Humanlike,
        &Traits,
        &Vitality,
        &Capabilities,
    )>,
) {
    let snapshots = query
        .iter()
        .map(
            |(entity, identity, position, faction, humanlike, traits, vitality, capabilities)| {
                ColonistSnapshot {
                    entity,
                    id: identity.id,
                    position: position.0,
                    faction: *faction,
                    humanlike: humanlike.0,
                    chatty: traits.chatty,
                    live: vitality.is_live(),
                    capabilities: *capabilities,
                }
            },
        )
        .collect();

    *roster = ColonyRoster::from_snapshots(snapshots);
}
