//! Systems related to colonist spawning and movement.
use bevy::{math::primitives::Capsule3d, prelude::*};
use rand::Rng;

use crate::{
    chatter::{config::ChatterConfig, mental_break::MentalBreaker, mood::ActiveThoughts},
    colony::components::{
        Capabilities, ColonistIdGenerator, Faction, Humanlike, Identity, Mood, SocialSkill,
        TilePosition, Traits, Vitality, Wander,
    },
    core::plugin::SimulationClock,
};

/// World units per tile.
pub const TILE_SIZE: f32 = 1.0;
/// Colonists wander inside `[-COLONY_HALF_EXTENT, COLONY_HALF_EXTENT]` tiles on both axes.
pub const COLONY_HALF_EXTENT: f32 = 14.0;
const COLONIST_HEIGHT: f32 = 1.0;

struct ColonistPrototype {
    name: &'static str,
    faction: Faction,
    humanlike: bool,
    chatty: bool,
    color: Color,
    tile: Vec2,
}

/// Spawns a small mixed colony: chatty and quiet colonists, a visiting trader
/// group from another faction and a pet.
pub fn spawn_debug_colonists(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut id_generator: ResMut<ColonistIdGenerator>,
    config: Res<ChatterConfig>,
) {
    let visitors = Faction(1);
    let prototypes = [
        ColonistPrototype {
            name: "Ada",
            faction: Faction::PLAYER,
            humanlike: true,
            chatty: true,
            color: Color::srgb_u8(220, 120, 120),
            tile: Vec2::new(0.0, 0.0),
        },
        ColonistPrototype {
            name: "Bram",
            faction: Faction::PLAYER,
            humanlike: true,
            chatty: true,
            color: Color::srgb_u8(230, 170, 90),
            tile: Vec2::new(3.0, 2.0),
        },
        ColonistPrototype {
            name: "Cleo",
            faction: Faction::PLAYER,
            humanlike: true,
            chatty: true,
            color: Color::srgb_u8(200, 110, 200),
            tile: Vec2::new(-9.0, 8.0),
        },
        ColonistPrototype {
            name: "Dorn",
            faction: Faction::PLAYER,
            humanlike: true,
            chatty: false,
            color: Color::srgb_u8(120, 150, 220),
            tile: Vec2::new(-2.0, -3.0),
        },
        ColonistPrototype {
            name: "Esk",
            faction: Faction::PLAYER,
            humanlike: true,
            chatty: false,
            color: Color::srgb_u8(110, 190, 170),
            tile: Vec2::new(10.0, -10.0),
        },
        ColonistPrototype {
            name: "Trader Fenn",
            faction: visitors,
            humanlike: true,
            chatty: true,
            color: Color::srgb_u8(150, 150, 150),
            tile: Vec2::new(12.0, 12.0),
        },
        ColonistPrototype {
            name: "Guard Gisla",
            faction: visitors,
            humanlike: true,
            chatty: false,
            color: Color::srgb_u8(110, 110, 110),
            tile: Vec2::new(11.0, 10.0),
        },
        ColonistPrototype {
            name: "Husky",
            faction: Faction::PLAYER,
            humanlike: false,
            chatty: false,
            color: Color::srgb_u8(160, 120, 80),
            tile: Vec2::new(1.0, -1.0),
        },
    ];

    let count = prototypes.len();
    let baseline = config.mood.baseline;
    let thresholds = config.mental_break.base_thresholds;

    for prototype in prototypes {
        let id = id_generator.next_id();
        let (radius, length, speed) = if prototype.humanlike {
            (0.3, 1.0, 1.4)
        } else {
            (0.2, 0.4, 2.2)
        };

        let mut entity = commands.spawn((
            Mesh3d(meshes.add(Mesh::from(Capsule3d::new(radius, length)))),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: prototype.color,
                ..default()
            })),
            Transform::from_translation(tile_to_world(prototype.tile)),
            Identity::new(id, prototype.name),
            prototype.faction,
            Humanlike(prototype.humanlike),
            Traits {
                chatty: prototype.chatty,
            },
            Vitality::alive(),
            Capabilities::default(),
            TilePosition(prototype.tile),
            Wander::new(prototype.tile, speed),
            Name::new(format!("{} ({})", prototype.name, id)),
        ));

        if prototype.humanlike {
            entity.insert((
                SocialSkill::default(),
                Mood::new(baseline),
                ActiveThoughts::default(),
                MentalBreaker { base: thresholds },
            ));
        }

        debug!(
            "Spawned {} ({}) faction {} chatty={}",
            prototype.name, id, prototype.faction.0, prototype.chatty
        );
    }

    info!("Spawned {} debug colonists", count);
}

/// Centre of a tile in world space, at colonist height.
pub fn tile_to_world(tile: Vec2) -> Vec3 {
    Vec3::new(tile.x * TILE_SIZE, COLONIST_HEIGHT, tile.y * TILE_SIZE)
}

/// Advances one colonist's random walk by `dt` seconds.
///
/// Returns the new tile position. Picks a fresh target inside the colony
/// bounds after reaching the current one and pausing.
pub fn step_wander<R: Rng + ?Sized>(
    wander: &mut Wander,
    position: Vec2,
    dt: f32,
    rng: &mut R,
) -> Vec2 {
    if wander.pause_remaining > 0.0 {
        wander.pause_remaining = (wander.pause_remaining - dt).max(0.0);
        return position;
    }

    let to_target = wander.target - position;
    let step = wander.speed_tiles_per_sec * dt;
    if to_target.length() > step {
        return position + to_target.normalize_or_zero() * step;
    }

    let arrived = wander.target;
    wander.pause_remaining = rng.gen_range(1.0..6.0);
    let offset = Vec2::new(rng.gen_range(-6.0..6.0), rng.gen_range(-6.0..6.0));
    wander.target = (arrived + offset).clamp(
        Vec2::splat(-COLONY_HALF_EXTENT),
        Vec2::splat(COLONY_HALF_EXTENT),
    );
    arrived
}

/// Moves live, awake colonists along their random walk.
pub fn wander_colonists(
    clock: Res<SimulationClock>,
    mut colonists: Query<(&mut Wander, &mut TilePosition, &Vitality, &Capabilities)>,
) {
    let dt = clock.last_scaled_delta().as_secs_f32();
    if dt <= 0.0 {
        return;
    }

    let mut rng = rand::thread_rng();
    for (mut wander, mut position, vitality, capabilities) in colonists.iter_mut() {
        if !vitality.is_live() || !capabilities.awake {
            continue;
        }
        position.0 = step_wander(&mut wander, position.0, dt, &mut rng);
    }
}

/// Mirrors tile positions onto transforms.
pub fn sync_colonist_transforms(
    mut colonists: Query<(&TilePosition, &mut Transform), Changed<TilePosition>>,
) {
    for (position, mut transform) in colonists.iter_mut() {
        transform.translation = tile_to_world(position.0);
    }
}
