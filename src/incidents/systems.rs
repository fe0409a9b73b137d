//! Storyteller systems: incident rolls, breakdowns and spawn-time repairs.
use bevy::{math::primitives::Cuboid, prelude::*};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::colony::systems::{COLONY_HALF_EXTENT, TILE_SIZE};
use crate::core::SimulationClock;

use super::components::{
    BreakdownMessage, Breakdownable, BuildCost, IncidentKind, IncidentMessage, Machine, Material,
    PowerTrader,
};
use super::config::IncidentConfig;
use super::policy::{IncidentPolicies, MachineProfile};
use super::resources::StorytellerRng;

const WORKING_COLOR: Color = Color::srgb(0.58, 0.62, 0.66);
const BROKEN_COLOR: Color = Color::srgb(0.67, 0.24, 0.2);

struct MachinePrototype {
    label: &'static str,
    powered: bool,
    cost: &'static [(Material, u32)],
    broken: bool,
}

/// Spawns a row of buildings along the colony's northern edge.
///
/// The battery and comms console start broken so the spawn-time repair is
/// visible.
pub fn spawn_demo_machines(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let prototypes = [
        MachinePrototype {
            label: "Battery",
            powered: true,
            cost: &[(Material::Steel, 70), (Material::ComponentIndustrial, 2)],
            broken: true,
        },
        MachinePrototype {
            label: "Hydroponics basin",
            powered: true,
            cost: &[(Material::Steel, 100), (Material::ComponentIndustrial, 1)],
            broken: false,
        },
        MachinePrototype {
            label: "Comms console",
            powered: true,
            cost: &[(Material::Steel, 120), (Material::ComponentSpacer, 1)],
            broken: true,
        },
        MachinePrototype {
            label: "Standing lamp",
            powered: true,
            cost: &[(Material::Steel, 20)],
            broken: false,
        },
        MachinePrototype {
            label: "Hand tailoring bench",
            powered: false,
            cost: &[(Material::Wood, 75), (Material::ComponentIndustrial, 1)],
            broken: false,
        },
    ];

    let mesh = meshes.add(Cuboid::new(TILE_SIZE * 0.9, TILE_SIZE * 0.9, TILE_SIZE * 0.9));
    let z = -(COLONY_HALF_EXTENT + 2.0) * TILE_SIZE;

    for (index, prototype) in prototypes.iter().enumerate() {
        let x = (index as f32 * 3.0 - 6.0) * TILE_SIZE;
        let breakdown = if prototype.broken {
            Breakdownable::broken()
        } else {
            Breakdownable::default()
        };
        let color = if prototype.broken {
            BROKEN_COLOR
        } else {
            WORKING_COLOR
        };

        let mut entity = commands.spawn((
            Mesh3d(mesh.clone()),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: color,
                ..default()
            })),
            Transform::from_xyz(x, TILE_SIZE * 0.45, z),
            Machine {
                label: prototype.label.to_string(),
            },
            BuildCost(prototype.cost.to_vec()),
            breakdown,
            Name::new(prototype.label),
        ));
        if prototype.powered {
            entity.insert(PowerTrader);
        }
    }

    info!("Spawned {} demo machines", prototypes.len());
}

/// Repairs protected machines that spawn already broken down.
pub fn repair_machines_on_spawn(
    config: Res<IncidentConfig>,
    policies: Res<IncidentPolicies>,
    mut machines: Query<
        (&Machine, Has<PowerTrader>, &BuildCost, &mut Breakdownable),
        Added<Breakdownable>,
    >,
) {
    if !config.repair_on_spawn {
        return;
    }

    for (machine, powered, cost, mut breakdown) in machines.iter_mut() {
        if !breakdown.is_broken_down() {
            continue;
        }
        if policies.allows_breakdown(MachineProfile { powered, cost }) {
            continue;
        }
        breakdown.repair();
        info!("{} spawned broken down and was repaired", machine.label);
    }
}

/// Rolls storyteller incidents on their interval, dropping the filtered ones.
pub fn roll_incidents(
    clock: Res<SimulationClock>,
    config: Res<IncidentConfig>,
    policies: Res<IncidentPolicies>,
    mut rng: ResMut<StorytellerRng>,
    mut incidents: MessageWriter<IncidentMessage>,
) {
    for _ in 0..clock.intervals_crossed(config.incident_interval_ticks) {
        if !rng.0.gen_bool(f64::from(config.incident_chance)) {
            continue;
        }
        let Some(&kind) = IncidentKind::ALL.choose(&mut rng.0) else {
            continue;
        };

        if policies.allows_incident(kind) {
            info!("Incident: {}", kind);
            incidents.write(IncidentMessage { kind });
        } else {
            debug!("Suppressed incident {}", kind);
        }
    }
}

/// Gives every working machine a chance to break down on the interval.
pub fn roll_breakdowns(
    clock: Res<SimulationClock>,
    config: Res<IncidentConfig>,
    policies: Res<IncidentPolicies>,
    mut rng: ResMut<StorytellerRng>,
    mut machines: Query<(
        Entity,
        &Machine,
        Has<PowerTrader>,
        &BuildCost,
        &mut Breakdownable,
    )>,
    mut breakdowns: MessageWriter<BreakdownMessage>,
) {
    if !clock.crossed_interval(config.breakdown_interval_ticks) {
        return;
    }

    for (entity, machine, powered, cost, mut breakdown) in machines.iter_mut() {
        if breakdown.is_broken_down() || !rng.0.gen_bool(f64::from(config.breakdown_chance)) {
            continue;
        }

        if !policies.allows_breakdown(MachineProfile { powered, cost }) {
            debug!("Suppressed breakdown of {}", machine.label);
            continue;
        }

        breakdown.break_down();
        info!("{} broke down", machine.label);
        breakdowns.write(BreakdownMessage {
            machine: entity,
            label: machine.label.clone(),
        });
    }
}

/// Shows broken machines in red.
pub fn tint_machines(
    machines: Query<
        (&Breakdownable, &MeshMaterial3d<StandardMaterial>),
        Changed<Breakdownable>,
    >,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for (breakdown, material) in machines.iter() {
        if let Some(material) = materials.get_mut(&material.0) {
            material.base_color = if breakdown.is_broken_down() {
                BROKEN_COLOR
            } else {
                WORKING_COLOR
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::incidents::policy::{BlockListFilter, ComponentMachinesNeverBreak};

    fn app_with(config: IncidentConfig) -> App {
        let mut policies = IncidentPolicies::default();
        policies
            .add_filter(Box::new(BlockListFilter::new(config.blocked.clone())))
            .add_breakdown_policy(Box::new(ComponentMachinesNeverBreak));

        let mut app = App::new();
        app.add_message::<IncidentMessage>()
            .add_message::<BreakdownMessage>()
            .insert_resource(config)
            .insert_resource(policies)
            .insert_resource(SimulationClock::default())
            .insert_resource(StorytellerRng::seeded(3))
            .add_systems(
                Update,
                (repair_machines_on_spawn, roll_incidents, roll_breakdowns).chain(),
            );
        app
    }

    fn spawn_machine(
        app: &mut App,
        label: &str,
        powered: bool,
        cost: Vec<(Material, u32)>,
        broken: bool,
    ) -> Entity {
        let breakdown = if broken {
            Breakdownable::broken()
        } else {
            Breakdownable::default()
        };
        let mut entity = app.world_mut().spawn((
            Machine {
                label: label.to_string(),
            },
            BuildCost(cost),
            breakdown,
        ));
        if powered {
            entity.insert(PowerTrader);
        }
        entity.id()
    }

    fn is_broken(app: &App, entity: Entity) -> bool {
        app.world()
            .entity(entity)
            .get::<Breakdownable>()
            .unwrap()
            .is_broken_down()
    }

    #[test]
    fn only_protected_machines_are_repaired_on_spawn() {
        let mut app = app_with(IncidentConfig::default());
        let battery = spawn_machine(
            &mut app,
            "Battery",
            true,
            vec![(Material::ComponentIndustrial, 2)],
            true,
        );
        let lamp = spawn_machine(&mut app, "Lamp", true, vec![(Material::Steel, 20)], true);
        let bench = spawn_machine(
            &mut app,
            "Bench",
            false,
            vec![(Material::ComponentIndustrial, 1)],
            true,
        );

        app.update();

        assert!(!is_broken(&app, battery));
        assert!(is_broken(&app, lamp));
        assert!(is_broken(&app, bench));
    }

    #[test]
    fn repair_on_spawn_can_be_disabled() {
        let mut config = IncidentConfig::default();
        config.repair_on_spawn = false;
        let mut app = app_with(config);
        let battery = spawn_machine(
            &mut app,
            "Battery",
            true,
            vec![(Material::ComponentSpacer, 1)],
            true,
        );
        app.update();
        assert!(is_broken(&app, battery));
    }

    #[test]
    fn certain_breakdowns_spare_component_machines() {
        let mut config = IncidentConfig::default();
        config.breakdown_chance = 1.0;
        let mut app = app_with(config);
        let battery = spawn_machine(
            &mut app,
            "Battery",
            true,
            vec![(Material::Steel, 70), (Material::ComponentIndustrial, 2)],
            false,
        );
        let lamp = spawn_machine(&mut app, "Lamp", true, vec![(Material::Steel, 20)], false);

        // 42 seconds is 2520 ticks, one breakdown interval.
        app.world_mut()
            .resource_mut::<SimulationClock>()
            .tick(Duration::from_secs(42));
        app.update();

        assert!(!is_broken(&app, battery));
        assert!(is_broken(&app, lamp));

        let messages = app.world().resource::<Messages<BreakdownMessage>>();
        let mut cursor = messages.get_cursor();
        let sent: Vec<_> = cursor.read(messages).collect();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].machine, lamp);
        assert_eq!(sent[0].label, "Lamp");
    }

    #[test]
    fn blocked_incidents_never_fire() {
        let mut config = IncidentConfig::default();
        config.incident_chance = 1.0;
        config.incident_interval_ticks = 60;
        let mut app = app_with(config);

        // One frame spanning 60 intervals.
        app.world_mut()
            .resource_mut::<SimulationClock>()
            .tick(Duration::from_secs(60));
        app.update();

        let messages = app.world().resource::<Messages<IncidentMessage>>();
        let mut cursor = messages.get_cursor();
        let fired: Vec<_> = cursor.read(messages).map(|message| message.kind).collect();
        assert!(!fired.is_empty());
        assert!(fired.len() < 60);
        assert!(fired
            .iter()
            .all(|kind| !matches!(kind, IncidentKind::ShortCircuit | IncidentKind::SolarFlare)));
    }
}
