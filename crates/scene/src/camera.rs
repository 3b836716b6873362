use foundation::math::{Mat4, Vec2, Vec3, mat4_look_at_rh, mat4_mul, mat4_perspective_rh_z0};
use runtime::config::CameraConfig;

use crate::picking::Ray;

/// Perspective camera looking at `target`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees.
    pub fov_y_deg: f64,
    pub aspect: f64,
    pub near: f64,
    pub far: f64,
}

impl PerspectiveCamera {
    pub fn from_config(cfg: &CameraConfig, aspect: f64) -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, cfg.distance),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y_deg: cfg.fov_y_deg,
            aspect: sanitize_aspect(aspect),
            near: cfg.near,
            far: cfg.far,
        }
    }

    /// Recompute the aspect ratio after a viewport resize.
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.aspect = if height > 0.0 {
            sanitize_aspect(width / height)
        } else {
            1.0
        };
    }

    pub fn view_matrix(&self) -> Mat4 {
        mat4_look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        mat4_perspective_rh_z0(self.fov_y_deg.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_proj_matrix(&self) -> Mat4 {
        mat4_mul(self.projection_matrix(), self.view_matrix())
    }

    /// Ray from the camera position through a point in normalized device
    /// coordinates. `None` if the camera basis is degenerate.
    pub fn ray_through_ndc(&self, ndc: Vec2) -> Option<Ray> {
        let forward = (self.target - self.position).normalize()?;
        let right = forward.cross(self.up).normalize()?;
        let up = right.cross(forward);

        let tan = (0.5 * self.fov_y_deg.to_radians()).tan();
        let px = ndc.x * tan * self.aspect;
        let py = ndc.y * tan;

        let dir = (forward + right.scale(px) + up.scale(py)).normalize()?;
        Some(Ray::new(self.position, dir))
    }
}

fn sanitize_aspect(aspect: f64) -> f64 {
    if aspect.is_finite() && aspect > 0.0 {
        aspect.max(1e-6)
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::PerspectiveCamera;
    use foundation::math::{Vec2, Vec3, mat4_mul_vec4};
    use runtime::config::CameraConfig;

    fn assert_close(a: f64, b: f64, eps: f64) {
        assert!((a - b).abs() <= eps, "expected {a} ~= {b}");
    }

    #[test]
    fn default_camera_sits_on_positive_z() {
        let cam = PerspectiveCamera::from_config(&CameraConfig::default(), 16.0 / 9.0);
        assert_eq!(cam.position, Vec3::new(0.0, 0.0, 2.0));
        assert_eq!(cam.target, Vec3::ZERO);
        assert_eq!(cam.fov_y_deg, 75.0);
    }

    #[test]
    fn center_ray_points_at_target() {
        let cam = PerspectiveCamera::from_config(&CameraConfig::default(), 1.5);
        let ray = cam.ray_through_ndc(Vec2::new(0.0, 0.0)).expect("ray");
        assert_eq!(ray.origin, cam.position);
        assert_close(ray.dir.z, -1.0, 1e-12);
    }

    #[test]
    fn ndc_corner_ray_projects_back_to_corner() {
        let cam = PerspectiveCamera::from_config(&CameraConfig::default(), 1.5);
        let ray = cam.ray_through_ndc(Vec2::new(1.0, 1.0)).expect("ray");
        let p = ray.at(3.0);
        let clip = mat4_mul_vec4(
            cam.view_proj_matrix(),
            [p.x as f32, p.y as f32, p.z as f32, 1.0],
        );
        assert_close((clip[0] / clip[3]) as f64, 1.0, 1e-4);
        assert_close((clip[1] / clip[3]) as f64, 1.0, 1e-4);
    }

    #[test]
    fn set_viewport_updates_aspect() {
        let mut cam = PerspectiveCamera::from_config(&CameraConfig::default(), 1.0);
        cam.set_viewport(1920.0, 1080.0);
        assert_close(cam.aspect, 1920.0 / 1080.0, 1e-12);

        cam.set_viewport(100.0, 0.0);
        assert_eq!(cam.aspect, 1.0);
    }

    #[test]
    fn degenerate_camera_has_no_ray() {
        let mut cam = PerspectiveCamera::from_config(&CameraConfig::default(), 1.0);
        cam.target = cam.position;
        assert_eq!(cam.ray_through_ndc(Vec2::new(0.0, 0.0)), None);
    }
}
