//! Column-major 4x4 matrices in the layout WGSL expects (`m[col][row]`).

use super::Vec3;

pub type Mat4 = [[f32; 4]; 4];

pub const MAT4_IDENTITY: Mat4 = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// `c = a * b`.
pub fn mat4_mul(a: Mat4, b: Mat4) -> Mat4 {
    let mut c = [[0.0f32; 4]; 4];
    for col in 0..4 {
        for row in 0..4 {
            c[col][row] = a[0][row] * b[col][0]
                + a[1][row] * b[col][1]
                + a[2][row] * b[col][2]
                + a[3][row] * b[col][3];
        }
    }
    c
}

pub fn mat4_mul_vec4(m: Mat4, v: [f32; 4]) -> [f32; 4] {
    [
        m[0][0] * v[0] + m[1][0] * v[1] + m[2][0] * v[2] + m[3][0] * v[3],
        m[0][1] * v[0] + m[1][1] * v[1] + m[2][1] * v[2] + m[3][1] * v[3],
        m[0][2] * v[0] + m[1][2] * v[1] + m[2][2] * v[2] + m[3][2] * v[3],
        m[0][3] * v[0] + m[1][3] * v[1] + m[2][3] * v[2] + m[3][3] * v[3],
    ]
}

/// Right-handed perspective projection with depth range [0, 1].
pub fn mat4_perspective_rh_z0(fov_y_rad: f64, aspect: f64, near: f64, far: f64) -> Mat4 {
    let f = 1.0 / (0.5 * fov_y_rad).tan();
    let m00 = (f / aspect) as f32;
    let m11 = f as f32;
    let m22 = (far / (near - far)) as f32;
    let m23 = ((near * far) / (near - far)) as f32;

    [
        [m00, 0.0, 0.0, 0.0],
        [0.0, m11, 0.0, 0.0],
        [0.0, 0.0, m22, -1.0],
        [0.0, 0.0, m23, 0.0],
    ]
}

pub fn mat4_look_at_rh(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
    let f = (target - eye).normalize().unwrap_or(Vec3::new(0.0, 0.0, -1.0));
    let s = f.cross(up).normalize().unwrap_or(Vec3::new(1.0, 0.0, 0.0));
    let u = s.cross(f);

    let ex = -s.dot(eye);
    let ey = -u.dot(eye);
    let ez = f.dot(eye);

    [
        [s.x as f32, u.x as f32, (-f.x) as f32, 0.0],
        [s.y as f32, u.y as f32, (-f.y) as f32, 0.0],
        [s.z as f32, u.z as f32, (-f.z) as f32, 0.0],
        [ex as f32, ey as f32, ez as f32, 1.0],
    ]
}

/// Rotation about +Y by `angle_rad` (counter-clockwise looking down -Y).
pub fn mat4_rotation_y(angle_rad: f64) -> Mat4 {
    let (s, c) = angle_rad.sin_cos();
    let (s, c) = (s as f32, c as f32);
    [
        [c, 0.0, -s, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [s, 0.0, c, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-5, "expected {a} ~= {b}");
    }

    #[test]
    fn identity_is_neutral() {
        let r = mat4_rotation_y(0.3);
        assert_eq!(mat4_mul(MAT4_IDENTITY, r), r);
        assert_eq!(mat4_mul(r, MAT4_IDENTITY), r);
    }

    #[test]
    fn rotation_y_quarter_turn_maps_z_to_x() {
        let p = mat4_mul_vec4(mat4_rotation_y(std::f64::consts::FRAC_PI_2), [0.0, 0.0, 1.0, 1.0]);
        assert_close(p[0], 1.0);
        assert_close(p[1], 0.0);
        assert_close(p[2], 0.0);
    }

    #[test]
    fn look_at_puts_target_on_negative_z() {
        let view = mat4_look_at_rh(Vec3::new(0.0, 0.0, 2.0), Vec3::ZERO, Vec3::Y);
        let p = mat4_mul_vec4(view, [0.0, 0.0, 0.0, 1.0]);
        assert_close(p[0], 0.0);
        assert_close(p[1], 0.0);
        assert_close(p[2], -2.0);
    }

    #[test]
    fn projected_center_lands_in_depth_range() {
        let view = mat4_look_at_rh(Vec3::new(0.0, 0.0, 2.0), Vec3::ZERO, Vec3::Y);
        let proj = mat4_perspective_rh_z0(75f64.to_radians(), 1.5, 0.1, 1000.0);
        let clip = mat4_mul_vec4(mat4_mul(proj, view), [0.0, 0.0, 0.0, 1.0]);
        let depth = clip[2] / clip[3];
        assert_close(clip[0] / clip[3], 0.0);
        assert!(depth > 0.0 && depth < 1.0);
    }
}
