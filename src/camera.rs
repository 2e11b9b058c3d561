//! Orbit camera around a fixed target.
//!
//! The camera position is derived from spherical coordinates every time
//! [`Camera::update_view_projection_matrix`] runs; it cannot be set directly.
//!
//! ```
//! use meshlite::{Camera, CameraConfig, OrbitEvent};
//!
//! let mut camera = Camera::new(CameraConfig::default());
//! camera.set_aspect(16.0 / 9.0);
//!
//! // once per frame, after draining input:
//! camera.apply_all([OrbitEvent::Drag { dx: 40.0, dy: -10.0 }]);
//! camera.update_view_projection_matrix();
//! ```

use glam::{Mat4, Vec3};

use crate::input::OrbitEvent;
use crate::math::mat4;

/// Radians of rotation per pixel of pointer drag.
pub const ROTATE_SENSITIVITY: f32 = 0.005;
/// Distance units per wheel delta unit.
pub const ZOOM_SENSITIVITY: f32 = 0.01;
/// Gap kept between the pitch and the poles.
pub const PITCH_MARGIN: f32 = 0.05;
pub const MIN_DISTANCE: f32 = 1.0;
pub const MAX_DISTANCE: f32 = 20.0;

const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - PITCH_MARGIN;

/// Construction options for [`Camera`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Initial eye position. Only its length is used: it becomes the orbit
    /// distance. Without it the camera starts 5 units from the target.
    pub position: Option<Vec3>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            near: 0.1,
            far: 2000.0,
            position: None,
        }
    }
}

impl CameraConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fov(mut self, fov_degrees: f32) -> Self {
        self.fov_degrees = fov_degrees;
        self
    }

    pub fn clip(mut self, near: f32, far: f32) -> Self {
        self.near = near;
        self.far = far;
        self
    }

    pub fn position(mut self, position: Vec3) -> Self {
        self.position = Some(position);
        self
    }
}

/// Spherical orbit parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Orbit {
    /// Rotation around the vertical axis, radians.
    pub yaw: f32,
    /// Elevation above the horizontal plane, radians.
    pub pitch: f32,
    pub distance: f32,
}

/// Perspective camera orbiting `target`.
#[derive(Clone, Debug)]
pub struct Camera {
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub aspect: f32,
    position: Vec3,
    orbit: Orbit,
    view: Mat4,
    projection: Mat4,
    view_projection: Mat4,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(CameraConfig::default())
    }
}

impl Camera {
    pub fn new(config: CameraConfig) -> Self {
        let position = config.position.unwrap_or(Vec3::ZERO);
        let distance = config.position.map_or(5.0, |p| p.length());

        Self {
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov: config.fov_degrees.to_radians(),
            near: config.near,
            far: config.far,
            aspect: 1.0,
            position,
            orbit: Orbit {
                yaw: 0.0,
                pitch: 0.0,
                distance: distance.clamp(MIN_DISTANCE, MAX_DISTANCE),
            },
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            view_projection: Mat4::IDENTITY,
        }
    }

    /// Recomputes position, view, projection and view-projection.
    ///
    /// Must run once per frame before any mesh uniforms are computed.
    pub fn update_view_projection_matrix(&mut self) {
        self.projection = mat4::perspective(self.fov, self.aspect, self.near, self.far);

        let Orbit {
            yaw,
            pitch,
            distance,
        } = self.orbit;
        self.position = Vec3::new(
            distance * pitch.cos() * yaw.sin(),
            distance * pitch.sin(),
            distance * pitch.cos() * yaw.cos(),
        );

        self.view = mat4::look_at(self.position, self.target, self.up);
        self.view_projection = mat4::multiply(&self.projection, &self.view);
    }

    /// Applies a pointer drag in pixels. Dragging down raises the camera.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.orbit.yaw -= dx * ROTATE_SENSITIVITY;
        self.orbit.pitch =
            (self.orbit.pitch + dy * ROTATE_SENSITIVITY).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Applies a wheel delta; positive values move the camera away.
    pub fn zoom(&mut self, delta: f32) {
        self.orbit.distance =
            (self.orbit.distance + delta * ZOOM_SENSITIVITY).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    pub fn apply(&mut self, event: OrbitEvent) {
        match event {
            OrbitEvent::Drag { dx, dy } => self.rotate(dx, dy),
            OrbitEvent::Zoom { delta } => self.zoom(delta),
        }
    }

    pub fn apply_all(&mut self, events: impl IntoIterator<Item = OrbitEvent>) {
        for event in events {
            self.apply(event);
        }
    }

    /// Sets all orbit parameters at once, clamping pitch and distance.
    pub fn set_orbit(&mut self, yaw: f32, pitch: f32, distance: f32) {
        self.orbit = Orbit {
            yaw,
            pitch: pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
            distance: distance.clamp(MIN_DISTANCE, MAX_DISTANCE),
        };
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    pub fn orbit(&self) -> Orbit {
        self.orbit
    }

    /// Eye position as of the last update.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.view
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.view_projection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_camera_sits_five_units_down_z() {
        let mut camera = Camera::default();
        camera.update_view_projection_matrix();
        let p = camera.position();
        assert_relative_eq!(p.x, 0.0);
        assert_relative_eq!(p.y, 0.0);
        assert_relative_eq!(p.z, 5.0);
        assert_relative_eq!(camera.fov, std::f32::consts::FRAC_PI_4);
    }

    #[test]
    fn configured_position_sets_distance() {
        let camera = Camera::new(CameraConfig::new().position(Vec3::new(0.0, 3.0, 4.0)));
        assert_relative_eq!(camera.orbit().distance, 5.0);
        assert_eq!(camera.position(), Vec3::new(0.0, 3.0, 4.0));
    }

    #[test]
    fn pitch_stays_clamped_under_any_drag() {
        let mut camera = Camera::default();
        for dy in [1.0e4, -3.0e4, 250.0, 999.0, -1.0e6, 12.5] {
            camera.rotate(7.0, dy);
            let pitch = camera.orbit().pitch;
            assert!(pitch <= std::f32::consts::FRAC_PI_2 - 0.05);
            assert!(pitch >= -std::f32::consts::FRAC_PI_2 + 0.05);
        }
    }

    #[test]
    fn distance_stays_clamped_under_any_zoom() {
        let mut camera = Camera::default();
        camera.zoom(1.0e5);
        assert_eq!(camera.orbit().distance, MAX_DISTANCE);
        camera.zoom(-1.0e5);
        assert_eq!(camera.orbit().distance, MIN_DISTANCE);
        camera.zoom(100.0);
        assert_relative_eq!(camera.orbit().distance, 2.0, epsilon = 1e-6);
    }

    #[test]
    fn drag_direction_conventions() {
        let mut camera = Camera::default();
        camera.rotate(100.0, 100.0);
        // rightward drag decreases yaw, downward drag increases pitch
        assert_relative_eq!(camera.orbit().yaw, -0.5, epsilon = 1e-6);
        assert_relative_eq!(camera.orbit().pitch, 0.5, epsilon = 1e-6);
    }

    #[test]
    fn view_projection_is_projection_times_view() {
        let mut camera = Camera::default();
        camera.set_aspect(2.0);
        camera.set_orbit(0.7, 0.3, 8.0);
        camera.update_view_projection_matrix();

        let expected = camera.projection_matrix() * camera.view_matrix();
        assert_eq!(camera.view_projection_matrix(), expected);
        assert_relative_eq!(camera.position().length(), 8.0, epsilon = 1e-5);
    }

    #[test]
    fn target_projects_to_screen_center() {
        let mut camera = Camera::default();
        camera.set_orbit(1.2, -0.4, 6.0);
        camera.update_view_projection_matrix();
        let clip = camera.view_projection_matrix() * camera.target.extend(1.0);
        assert_relative_eq!(clip.x / clip.w, 0.0, epsilon = 1e-5);
        assert_relative_eq!(clip.y / clip.w, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn events_route_to_rotate_and_zoom() {
        let mut camera = Camera::default();
        camera.apply_all([
            OrbitEvent::Drag { dx: -20.0, dy: 0.0 },
            OrbitEvent::Zoom { delta: 300.0 },
        ]);
        assert_relative_eq!(camera.orbit().yaw, 0.1, epsilon = 1e-6);
        assert_relative_eq!(camera.orbit().distance, 8.0, epsilon = 1e-6);
    }

    #[test]
    fn invalid_aspect_is_ignored() {
        let mut camera = Camera::default();
        camera.set_aspect(0.0);
        camera.set_aspect(f32::NAN);
        assert_eq!(camera.aspect, 1.0);
    }
}
