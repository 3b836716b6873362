use foundation::math::Vec3;

use crate::globe::Globe;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self { origin, dir }
    }

    pub fn at(&self, t: f64) -> Vec3 {
        self.origin + self.dir.scale(t)
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PickHit {
    /// Distance from the ray origin along the normalized direction.
    pub distance: f64,
    /// World-space intersection point.
    pub point: Vec3,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PickOptions {
    pub min_distance: f64,
    pub max_distance: f64,
}

impl Default for PickOptions {
    fn default() -> Self {
        Self {
            min_distance: 0.0,
            max_distance: f64::INFINITY,
        }
    }
}

/// Nearest intersection of `ray` with the globe's world-space sphere.
///
/// Only the outside of the sphere is pickable: a ray starting inside the globe
/// would exit through a back face and reports no hit. Hits closer than
/// `min_distance` or beyond `max_distance` are discarded.
pub fn pick_ray(globe: &Globe, ray: Ray, opts: PickOptions) -> Option<PickHit> {
    let dir = ray.dir.normalize()?;
    let oc = ray.origin - globe.center;

    let b = oc.dot(dir);
    let c = oc.dot(oc) - globe.radius * globe.radius;
    if c < 0.0 {
        return None;
    }

    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }

    // Origin outside: the smaller root is the entry point. A negative root
    // means the sphere lies behind the ray.
    let t = -b - disc.sqrt();
    if t < opts.min_distance || t > opts.max_distance {
        return None;
    }

    Some(PickHit {
        distance: t,
        point: Ray::new(ray.origin, dir).at(t),
    })
}

/// Screen picking wrapper.
///
/// The caller supplies the screen->ray mapping via `make_ray`; a `None` ray
/// (degenerate viewport or camera) is a miss.
pub fn pick_screen<F>(
    globe: &Globe,
    x_px: f64,
    y_px: f64,
    make_ray: F,
    opts: PickOptions,
) -> Option<PickHit>
where
    F: FnOnce(f64, f64) -> Option<Ray>,
{
    let ray = make_ray(x_px, y_px)?;
    pick_ray(globe, ray, opts)
}

#[cfg(test)]
mod tests {
    use super::{PickOptions, Ray, pick_ray, pick_screen};
    use crate::globe::Globe;
    use foundation::math::Vec3;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "expected {a} ~= {b}");
    }

    #[test]
    fn ray_picks_nearest_hit() {
        let globe = Globe::unit();
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        let hit = pick_ray(&globe, ray, PickOptions::default()).expect("hit");
        assert_close(hit.distance, 4.0);
        assert_close(hit.point.z, 1.0);
    }

    #[test]
    fn unnormalized_direction_reports_world_distance() {
        let globe = Globe::unit();
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -10.0));
        let hit = pick_ray(&globe, ray, PickOptions::default()).expect("hit");
        assert_close(hit.distance, 4.0);
    }

    #[test]
    fn ray_pointing_away_misses() {
        let globe = Globe::unit();
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(pick_ray(&globe, ray, PickOptions::default()), None);
    }

    #[test]
    fn ray_passing_beside_misses() {
        let globe = Globe::unit();
        let ray = Ray::new(Vec3::new(1.5, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(pick_ray(&globe, ray, PickOptions::default()), None);
    }

    #[test]
    fn origin_inside_globe_has_no_front_face() {
        let globe = Globe::unit();
        let ray = Ray::new(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(pick_ray(&globe, ray, PickOptions::default()), None);
    }

    #[test]
    fn respects_max_distance() {
        let globe = Globe::unit();
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        let opts = PickOptions {
            max_distance: 3.0,
            ..PickOptions::default()
        };
        assert_eq!(pick_ray(&globe, ray, opts), None);
    }

    #[test]
    fn follows_globe_center() {
        let mut globe = Globe::unit();
        globe.center = Vec3::new(10.0, 0.0, 0.0);
        let ray = Ray::new(Vec3::new(10.0, 5.0, 0.0), Vec3::new(0.0, -1.0, 0.0));
        let hit = pick_ray(&globe, ray, PickOptions::default()).expect("hit");
        assert_close(hit.point.y, 1.0);
        assert_close(hit.point.x, 10.0);
    }

    #[test]
    fn screen_pick_without_ray_is_a_miss() {
        let globe = Globe::unit();
        let hit = pick_screen(&globe, 1.0, 2.0, |_, _| None, PickOptions::default());
        assert_eq!(hit, None);
    }
}
