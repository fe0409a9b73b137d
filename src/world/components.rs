//! Components used by the world module.
use bevy::prelude::*;

/// Top-down camera looking at the colony, panned along the ground plane.
#[derive(Component, Debug)]
pub struct ColonyCamera {
    /// Ground point the camera looks at.
    pub focus: Vec3,
    /// Distance from the focus along the viewing direction.
    pub distance: f32,
    pub pan_speed: f32,
    pub zoom_speed: f32,
}

impl ColonyCamera {
    pub const MIN_DISTANCE: f32 = 6.0;
    pub const MAX_DISTANCE: f32 = 60.0;
    /// Viewing direction from the focus towards the camera.
    pub const VIEW_DIRECTION: Vec3 = Vec3::new(0.0, 1.0, 0.75);

    pub fn new(focus: Vec3, distance: f32) -> Self {
        Self {
            focus,
            distance: distance.clamp(Self::MIN_DISTANCE, Self::MAX_DISTANCE),
            pan_speed: 12.0,
            zoom_speed: 2.0,
        }
    }

    pub fn zoom(&mut self, steps: f32) {
        self.distance = (self.distance - steps * self.zoom_speed)
            .clamp(Self::MIN_DISTANCE, Self::MAX_DISTANCE);
    }

    pub fn transform(&self) -> Transform {
        let eye = self.focus + Self::VIEW_DIRECTION.normalize() * self.distance;
        Transform::from_translation(eye).looking_at(self.focus, Vec3::Y)
    }
}

/// Marker component identifying the main directional light.
#[derive(Component, Default)]
pub struct PrimarySun;
