//! IncidentPlugin wires the storyteller and its suppression rules.
use bevy::prelude::*;

use crate::world::systems::spawn_world_environment;

use super::{
    components::{BreakdownMessage, IncidentMessage},
    config::IncidentConfig,
    policy::{BlockListFilter, ComponentMachinesNeverBreak, IncidentPolicies},
    resources::StorytellerRng,
    systems::{
        repair_machines_on_spawn, roll_breakdowns, roll_incidents, spawn_demo_machines,
        tint_machines,
    },
};

pub struct IncidentPlugin;

impl Plugin for IncidentPlugin {
    fn build(&self, app: &mut App) {
        let config = IncidentConfig::load_or_default();

        let mut policies = IncidentPolicies::default();
        policies
            .add_filter(Box::new(BlockListFilter::new(config.blocked.clone())))
            .add_breakdown_policy(Box::new(ComponentMachinesNeverBreak));

        app.insert_resource(policies)
            .insert_resource(config)
            .init_resource::<StorytellerRng>()
            .add_message::<IncidentMessage>()
            .add_message::<BreakdownMessage>()
            .add_systems(
                Startup,
                (
                    spawn_demo_machines.after(spawn_world_environment),
                    log_incident_config,
                ),
            )
            .add_systems(
                Update,
                (
                    repair_machines_on_spawn,
                    roll_incidents,
                    roll_breakdowns,
                    tint_machines,
                )
                    .chain(),
            );
    }
}

fn log_incident_config(config: Res<IncidentConfig>) {
    let blocked: Vec<_> = config.blocked.iter().map(ToString::to_string).collect();
    info!(
        "IncidentPlugin initialised: blocked [{}], incident roll every {} ticks ({:.0}%), breakdown roll every {} ticks ({:.0}%)",
        blocked.join(", "),
        config.incident_interval_ticks,
        config.incident_chance * 100.0,
        config.breakdown_interval_ticks,
        config.breakdown_chance * 100.0
    );
}
