//! Colony plugin wiring colonist identity, movement and the roster snapshot.
use bevy::prelude::*;

use crate::{
    colony::{
        components::ColonistIdGenerator,
        roster::{refresh_colony_roster, ColonyRoster},
        systems::{spawn_debug_colonists, sync_colonist_transforms, wander_colonists},
    },
    world::systems::spawn_world_environment,
};

pub struct ColonyPlugin;

impl Plugin for ColonyPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ColonistIdGenerator>()
            .init_resource::<ColonyRoster>()
            .add_systems(
                Startup,
                spawn_debug_colonists.after(spawn_world_environment),
            )
            .add_systems(PreUpdate, refresh_colony_roster)
            .add_systems(Update, (wander_colonists, sync_colonist_transforms).chain());
    }
}
