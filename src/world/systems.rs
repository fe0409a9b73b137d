//! Systems for the world module.
use bevy::{
    input::mouse::{MouseScrollUnit, MouseWheel},
    math::primitives::Plane3d,
    prelude::*,
};

use crate::colony::systems::{COLONY_HALF_EXTENT, TILE_SIZE};
use crate::world::components::{ColonyCamera, PrimarySun};

const CAMERA_START_DISTANCE: f32 = 28.0;
const PIXELS_PER_SCROLL_LINE: f32 = 40.0;

/// Spawns the initial scene: ground plane covering the colony, light, and the colony camera.
pub fn spawn_world_environment(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let ground_extent = (COLONY_HALF_EXTENT + 4.0) * TILE_SIZE;
    commands.spawn((
        Mesh3d(meshes.add(Mesh::from(
            Plane3d::default().mesh().size(ground_extent * 2.0, ground_extent * 2.0),
        ))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb_u8(120, 110, 80),
            perceptual_roughness: 0.95,
            metallic: 0.0,
            ..default()
        })),
        Transform::default(),
    ));

    commands.spawn((
        DirectionalLight {
            illuminance: 12_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(10.0, 30.0, 6.0).looking_at(Vec3::ZERO, Vec3::Y),
        PrimarySun,
    ));

    let camera = ColonyCamera::new(Vec3::ZERO, CAMERA_START_DISTANCE);
    commands.spawn((Camera3d::default(), camera.transform(), camera));
}

/// Pans the colony camera over the ground with WASD or the arrow keys.
pub fn pan_colony_camera(
    keyboard: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    mut query: Query<(&mut ColonyCamera, &mut Transform)>,
) {
    let Ok((mut camera, mut transform)) = query.single_mut() else {
        return;
    };

    let mut direction = Vec3::ZERO;
    if keyboard.any_pressed([KeyCode::KeyW, KeyCode::ArrowUp]) {
        direction -= Vec3::Z;
    }
    if keyboard.any_pressed([KeyCode::KeyS, KeyCode::ArrowDown]) {
        direction += Vec3::Z;
    }
    if keyboard.any_pressed([KeyCode::KeyA, KeyCode::ArrowLeft]) {
        direction -= Vec3::X;
    }
    if keyboard.any_pressed([KeyCode::KeyD, KeyCode::ArrowRight]) {
        direction += Vec3::X;
    }

    if direction == Vec3::ZERO {
        return;
    }

    let modifier = if keyboard.pressed(KeyCode::ShiftLeft) {
        2.5
    } else {
        1.0
    };
    let limit = COLONY_HALF_EXTENT * TILE_SIZE;
    let step = direction.normalize() * camera.pan_speed * modifier * time.delta_secs();
    camera.focus = (camera.focus + step).clamp(
        Vec3::new(-limit, 0.0, -limit),
        Vec3::new(limit, 0.0, limit),
    );
    *transform = camera.transform();
}

/// Zooms the colony camera with the mouse wheel.
pub fn zoom_colony_camera(
    mut wheel_events: MessageReader<MouseWheel>,
    mut query: Query<(&mut ColonyCamera, &mut Transform)>,
) {
    let steps: f32 = wheel_events
        .read()
        .map(|event| match event.unit {
            MouseScrollUnit::Line => event.y,
            MouseScrollUnit::Pixel => event.y / PIXELS_PER_SCROLL_LINE,
        })
        .sum();

    if steps == 0.0 {
        return;
    }

    if let Ok((mut camera, mut transform)) = query.single_mut() {
        camera.zoom(steps);
        *transform = camera.transform();
    }
}
