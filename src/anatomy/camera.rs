use crate::anatomy::settings::CameraSettings;
use bevy::prelude::*;

/// Mouse interaction gathered for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OrbitInput {
    pub drag: Vec2,
    pub scroll: f32,
}

/// Damped orbit controller around a fixed target, Y up.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub yaw_velocity: f32,
    pub pitch_velocity: f32,
    /// Fraction of the remaining motion applied per 60 Hz frame.
    pub damping: f32,
    pub auto_rotate: bool,
    /// Radians per second.
    pub auto_rotate_speed: f32,
    pub rotate_sensitivity: f32,
    pub zoom_sensitivity: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

const PITCH_LIMIT: f32 = 1.45;

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::from_settings(&CameraSettings::default())
    }
}

impl OrbitCamera {
    pub fn from_settings(settings: &CameraSettings) -> Self {
        let target = Vec3::from_array(settings.target);
        let offset = Vec3::from_array(settings.start_position) - target;
        let distance = offset.length().max(settings.min_distance);
        let pitch = (offset.y / distance).clamp(-1.0, 1.0).asin();
        let yaw = offset.x.atan2(offset.z);

        Self {
            target,
            distance: distance.min(settings.max_distance),
            yaw,
            pitch: pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
            yaw_velocity: 0.0,
            pitch_velocity: 0.0,
            damping: settings.damping.clamp(0.001, 1.0),
            auto_rotate: settings.auto_rotate,
            auto_rotate_speed: settings.auto_rotate_speed,
            rotate_sensitivity: settings.rotate_sensitivity,
            zoom_sensitivity: settings.zoom_sensitivity,
            min_distance: settings.min_distance,
            max_distance: settings.max_distance,
        }
    }

    /// Advances the damped motion by `delta_secs` and returns the camera pose.
    pub fn update(&mut self, input: &OrbitInput, delta_secs: f32) -> Transform {
        self.yaw_velocity -= input.drag.x * self.rotate_sensitivity;
        self.pitch_velocity += input.drag.y * self.rotate_sensitivity;

        if input.scroll.abs() > f32::EPSILON {
            let zoom_factor = (1.0 - input.scroll * self.zoom_sensitivity).clamp(0.2, 5.0);
            self.distance = (self.distance * zoom_factor)
                .max(self.min_distance)
                .min(self.max_distance);
        }

        let frames = (delta_secs.max(0.0) * 60.0).min(120.0);
        let remaining = (1.0 - self.damping).powf(frames);
        let applied = 1.0 - remaining;

        self.yaw += self.yaw_velocity * applied;
        self.pitch = (self.pitch + self.pitch_velocity * applied).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.yaw_velocity *= remaining;
        self.pitch_velocity *= remaining;

        if self.auto_rotate {
            self.yaw += self.auto_rotate_speed * delta_secs.max(0.0);
        }

        self.transform()
    }

    pub fn position(&self) -> Vec3 {
        let horizontal = self.distance * self.pitch.cos();
        self.target
            + Vec3::new(
                horizontal * self.yaw.sin(),
                self.distance * self.pitch.sin(),
                horizontal * self.yaw.cos(),
            )
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.position()).looking_at(self.target, Vec3::Y)
    }
}

#[derive(Resource, Default)]
pub struct UiInteractionState {
    pub wants_pointer_input: bool,
    pub wants_keyboard_input: bool,
}

#[derive(Component)]
pub struct AnatomyCamera;

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn still_camera() -> OrbitCamera {
        OrbitCamera {
            auto_rotate: false,
            ..OrbitCamera::default()
        }
    }

    #[test]
    fn default_pose_matches_configured_start() {
        let camera = still_camera();
        let position = camera.position();
        assert_relative_eq!(position.x, 0.0, epsilon = 1e-4);
        assert_relative_eq!(position.y, 1.0, epsilon = 1e-4);
        assert_relative_eq!(position.z, 16.0, epsilon = 1e-4);
    }

    #[test]
    fn drag_motion_decays_and_converges() {
        let mut camera = still_camera();
        let start_yaw = camera.yaw;
        camera.update(
            &OrbitInput {
                drag: Vec2::new(-100.0, 0.0),
                scroll: 0.0,
            },
            1.0 / 60.0,
        );
        let after_first = camera.yaw - start_yaw;
        assert!(after_first > 0.0);

        for _ in 0..600 {
            camera.update(&OrbitInput::default(), 1.0 / 60.0);
        }
        let total = camera.yaw - start_yaw;
        assert!(total > after_first);
        assert_relative_eq!(total, 100.0 * camera.rotate_sensitivity, epsilon = 1e-4);
        assert!(camera.yaw_velocity.abs() < 1e-6);
    }

    #[test]
    fn pitch_and_zoom_are_clamped() {
        let mut camera = still_camera();
        camera.update(
            &OrbitInput {
                drag: Vec2::new(0.0, 1.0e6),
                scroll: -1000.0,
            },
            1.0,
        );
        assert!(camera.pitch <= PITCH_LIMIT);
        assert_eq!(camera.distance, camera.max_distance);
    }

    #[test]
    fn inverted_distance_limits_do_not_panic() {
        let settings = CameraSettings {
            min_distance: 70.0,
            max_distance: 60.0,
            ..CameraSettings::default()
        };
        let mut camera = OrbitCamera::from_settings(&settings);
        assert_eq!(camera.distance, 60.0);

        camera.update(
            &OrbitInput {
                drag: Vec2::ZERO,
                scroll: 1.0,
            },
            1.0 / 60.0,
        );
        assert!(camera.distance.is_finite());
    }

    #[test]
    fn auto_rotate_advances_with_time() {
        let mut camera = OrbitCamera::default();
        let yaw = camera.yaw;
        camera.update(&OrbitInput::default(), 0.5);
        assert_relative_eq!(camera.yaw - yaw, camera.auto_rotate_speed * 0.5, epsilon = 1e-6);
    }
}
