//! Orbit controls: drag to rotate the camera around its target, wheel to
//! dolly in and out.
//!
//! The camera offset from the target is tracked in spherical coordinates
//! (`theta` around +Y measured from +Z, `phi` down from +Y). Pointer input
//! accumulates a pending delta; [`OrbitControls::update`] applies it to the
//! camera once per frame. With damping enabled only a fraction of the pending
//! delta is applied per update and the remainder decays, which gives the
//! drag a short glide after release.

use foundation::math::Vec3;
use runtime::config::OrbitConfig;
use runtime::gesture::ScreenPoint;

use crate::camera::PerspectiveCamera;

/// Polar angle margin keeping the camera off the poles, where `up` and the
/// view direction would become parallel.
const POLE_EPSILON: f64 = 1e-6;

/// Per-notch dolly factor before `zoom_speed` is applied.
const ZOOM_BASE: f64 = 0.95;

/// Movement below this is treated as "camera did not change".
const CHANGE_EPSILON: f64 = 1e-9;

#[derive(Debug, Copy, Clone, PartialEq)]
struct Spherical {
    radius: f64,
    phi: f64,
    theta: f64,
}

impl Spherical {
    fn from_offset(offset: Vec3) -> Self {
        let radius = offset.length();
        if radius == 0.0 {
            return Self {
                radius,
                phi: 0.0,
                theta: 0.0,
            };
        }
        Self {
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    fn to_offset(self) -> Vec3 {
        let sin_phi_r = self.phi.sin() * self.radius;
        Vec3::new(
            sin_phi_r * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_r * self.theta.cos(),
        )
    }
}

#[derive(Debug, Clone)]
pub struct OrbitControls {
    config: OrbitConfig,
    /// Pending rotation not yet applied to the camera.
    delta_theta: f64,
    delta_phi: f64,
    /// Pending dolly factor; 1 means no change.
    scale: f64,
    rotate_from: Option<ScreenPoint>,
    viewport_height_px: f64,
}

impl OrbitControls {
    pub fn new(config: OrbitConfig) -> Self {
        Self {
            config,
            delta_theta: 0.0,
            delta_phi: 0.0,
            scale: 1.0,
            rotate_from: None,
            viewport_height_px: 1.0,
        }
    }

    /// Rotation per pixel is relative to the viewport height.
    pub fn set_viewport_height(&mut self, height_px: f64) {
        self.viewport_height_px = height_px.max(1.0);
    }

    pub fn is_rotating(&self) -> bool {
        self.rotate_from.is_some()
    }

    pub fn on_pointer_down(&mut self, at: ScreenPoint) {
        self.rotate_from = Some(at);
    }

    pub fn on_pointer_move(&mut self, at: ScreenPoint) {
        let Some(from) = self.rotate_from else {
            return;
        };
        let dx = (at.x_px - from.x_px) * self.config.rotate_speed;
        let dy = (at.y_px - from.y_px) * self.config.rotate_speed;

        let full_turn = std::f64::consts::TAU / self.viewport_height_px;
        self.rotate_left(full_turn * dx);
        self.rotate_up(full_turn * dy);

        self.rotate_from = Some(at);
    }

    pub fn on_pointer_up(&mut self) {
        self.rotate_from = None;
    }

    /// Wheel input; a negative `delta_y` (scrolling up) dollies in.
    pub fn on_wheel(&mut self, delta_y: f64) {
        let factor = ZOOM_BASE.powf(self.config.zoom_speed);
        if delta_y < 0.0 {
            self.scale *= factor;
        } else if delta_y > 0.0 {
            self.scale /= factor;
        }
    }

    fn rotate_left(&mut self, angle: f64) {
        self.delta_theta -= angle;
    }

    fn rotate_up(&mut self, angle: f64) {
        self.delta_phi -= angle;
    }

    /// Apply pending input to `camera`. Returns whether the camera moved.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        let offset = camera.position - camera.target;
        let mut spherical = Spherical::from_offset(offset);

        if self.config.enable_damping {
            spherical.theta += self.delta_theta * self.config.damping_factor;
            spherical.phi += self.delta_phi * self.config.damping_factor;
        } else {
            spherical.theta += self.delta_theta;
            spherical.phi += self.delta_phi;
        }
        spherical.phi = spherical
            .phi
            .clamp(POLE_EPSILON, std::f64::consts::PI - POLE_EPSILON);
        spherical.radius = (spherical.radius * self.scale)
            .clamp(self.config.min_distance, self.config.max_distance);

        let next = camera.target + spherical.to_offset();
        let moved = (next - camera.position).length() > CHANGE_EPSILON;
        camera.position = next;

        if self.config.enable_damping {
            let keep = 1.0 - self.config.damping_factor;
            self.delta_theta *= keep;
            self.delta_phi *= keep;
        } else {
            self.delta_theta = 0.0;
            self.delta_phi = 0.0;
        }
        self.scale = 1.0;

        if moved {
            tracing::trace!(
                radius = spherical.radius,
                theta = spherical.theta,
                phi = spherical.phi,
                "orbit camera moved"
            );
        }
        moved
    }
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self::new(OrbitConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::OrbitControls;
    use crate::camera::PerspectiveCamera;
    use foundation::math::Vec3;
    use runtime::config::{CameraConfig, OrbitConfig};
    use runtime::gesture::ScreenPoint;

    fn assert_close(a: f64, b: f64, eps: f64) {
        assert!((a - b).abs() < eps, "expected {a} ~= {b}");
    }

    fn camera() -> PerspectiveCamera {
        PerspectiveCamera::from_config(&CameraConfig::default(), 1.0)
    }

    fn undamped() -> OrbitControls {
        OrbitControls::new(OrbitConfig {
            enable_damping: false,
            rotate_speed: 1.0,
            ..OrbitConfig::default()
        })
    }

    #[test]
    fn idle_update_keeps_camera_still() {
        let mut controls = OrbitControls::default();
        let mut cam = camera();
        assert!(!controls.update(&mut cam));
        assert_close(cam.position.z, 2.0, 1e-12);
    }

    #[test]
    fn horizontal_drag_orbits_around_y() {
        let mut controls = undamped();
        controls.set_viewport_height(400.0);
        let mut cam = camera();

        // A quarter of the viewport height is a quarter turn.
        controls.on_pointer_down(ScreenPoint::new(0.0, 0.0));
        controls.on_pointer_move(ScreenPoint::new(100.0, 0.0));
        assert!(controls.update(&mut cam));

        assert_close(cam.position.x, -2.0, 1e-9);
        assert_close(cam.position.y, 0.0, 1e-9);
        assert_close(cam.position.z, 0.0, 1e-9);
        assert_close((cam.position - cam.target).length(), 2.0, 1e-12);
    }

    #[test]
    fn move_without_press_is_ignored() {
        let mut controls = undamped();
        let mut cam = camera();
        controls.on_pointer_move(ScreenPoint::new(50.0, 50.0));
        assert!(!controls.update(&mut cam));
    }

    #[test]
    fn vertical_drag_stops_short_of_the_pole() {
        let mut controls = undamped();
        controls.set_viewport_height(100.0);
        let mut cam = camera();

        controls.on_pointer_down(ScreenPoint::new(0.0, 0.0));
        controls.on_pointer_move(ScreenPoint::new(0.0, 1000.0));
        controls.update(&mut cam);

        assert!(cam.position.y > 0.0 && cam.position.y < 2.0);
        let ray = cam.ray_through_ndc(foundation::math::Vec2::new(0.0, 0.0));
        assert!(ray.is_some());
    }

    #[test]
    fn damping_applies_a_fraction_and_keeps_gliding() {
        let mut controls = OrbitControls::new(OrbitConfig {
            rotate_speed: 1.0,
            ..OrbitConfig::default()
        });
        controls.set_viewport_height(400.0);
        let mut cam = camera();

        controls.on_pointer_down(ScreenPoint::new(0.0, 0.0));
        controls.on_pointer_move(ScreenPoint::new(100.0, 0.0));
        controls.on_pointer_up();

        assert!(controls.update(&mut cam));
        let theta_1 = cam.position.x.atan2(cam.position.z);
        assert_close(theta_1, -std::f64::consts::FRAC_PI_2 * 0.05, 1e-9);

        // Released, but the remaining delta still moves the camera.
        assert!(controls.update(&mut cam));
        let theta_2 = cam.position.x.atan2(cam.position.z);
        assert!(theta_2 < theta_1);
    }

    #[test]
    fn wheel_dollies_and_clamps() {
        let mut controls = OrbitControls::new(OrbitConfig {
            min_distance: 1.5,
            ..OrbitConfig::default()
        });
        let mut cam = camera();

        controls.on_wheel(-120.0);
        controls.update(&mut cam);
        assert_close(cam.position.z, 2.0 * 0.95, 1e-9);

        controls.on_wheel(120.0);
        controls.update(&mut cam);
        assert_close(cam.position.z, 2.0, 1e-9);

        for _ in 0..50 {
            controls.on_wheel(-1.0);
            controls.update(&mut cam);
        }
        assert_close(cam.position.length(), 1.5, 1e-9);
    }

    #[test]
    fn update_follows_a_moved_target() {
        let mut controls = OrbitControls::default();
        let mut cam = camera();
        cam.target = Vec3::new(1.0, 0.0, 0.0);
        cam.position = Vec3::new(1.0, 0.0, 3.0);
        controls.update(&mut cam);
        assert_close((cam.position - cam.target).length(), 3.0, 1e-12);
    }
}
