use bevy::{log::LogPlugin, prelude::*};

mod chatter;
mod colony;
mod core;
mod incidents;
mod ui;
mod world;

use crate::{
    chatter::ChatterPlugin, colony::ColonyPlugin, core::CorePlugin, incidents::IncidentPlugin,
    ui::UiPlugin, world::WorldPlugin,
};

fn main() {
    App::new()
        .add_plugins((
            DefaultPlugins
                .set(LogPlugin {
                    filter: "info,wgpu=error,naga=warn,colony_chatter=debug".to_string(),
                    ..default()
                })
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Colony Chatter".to_string(),
                        ..default()
                    }),
                    ..default()
                }),
            CorePlugin::default(),
            WorldPlugin,
            ColonyPlugin,
            ChatterPlugin,
            IncidentPlugin,
            UiPlugin, // After ChatterPlugin so ChatterSet exists
        ))
        .run();
}
