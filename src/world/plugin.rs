//! WorldPlugin sets up the ground, lighting and the colony camera.
use bevy::prelude::*;

use crate::world::systems::{pan_colony_camera, spawn_world_environment, zoom_colony_camera};

pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(Color::srgb_u8(40, 44, 52)))
            .add_systems(Startup, spawn_world_environment)
            .add_systems(Update, (pan_colony_camera, zoom_colony_camera));
    }
}
