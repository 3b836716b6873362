use super::Vec3;

/// Longitude calibration for the globe's texture layout, in degrees.
///
/// The sphere's `u` texture coordinate starts on the -X axis and wraps
/// eastwards, so `atan2(x, z)` has to be shifted by this amount before the
/// result lines up with the equirectangular image.
pub const TEXTURE_LONGITUDE_OFFSET_DEG: f64 = 270.0;

/// Geographic coordinates in degrees.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GeoPoint {
    /// Latitude in [-90, 90].
    pub lat_deg: f64,
    /// Longitude in [-180, 180).
    pub lon_deg: f64,
}

impl GeoPoint {
    pub fn new(lat_deg: f64, lon_deg: f64) -> Self {
        Self { lat_deg, lon_deg }
    }

    /// Convert a point on (or near) the unit sphere to latitude/longitude.
    ///
    /// The point is normalized first; intersection points carry floating-point
    /// drift off the exact sphere. Returns `None` for zero-length or
    /// non-finite input.
    pub fn from_unit(point: Vec3) -> Option<Self> {
        let p = point.normalize()?;
        let lat_deg = 90.0 - p.y.clamp(-1.0, 1.0).acos().to_degrees();
        let lon_deg = (TEXTURE_LONGITUDE_OFFSET_DEG + p.x.atan2(p.z).to_degrees()).rem_euclid(360.0)
            - 180.0;
        Some(Self { lat_deg, lon_deg })
    }

    /// Inverse of [`GeoPoint::from_unit`]: the unit-sphere point for this
    /// coordinate in the same texture-calibrated frame.
    pub fn to_unit(self) -> Vec3 {
        let lat = self.lat_deg.to_radians();
        let azimuth = (self.lon_deg + 180.0 - TEXTURE_LONGITUDE_OFFSET_DEG).to_radians();
        let (sin_lat, cos_lat) = lat.sin_cos();
        Vec3::new(cos_lat * azimuth.sin(), sin_lat, cos_lat * azimuth.cos())
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "latitude: {:.2}, longitude: {:.2}", self.lat_deg, self.lon_deg)
    }
}

#[cfg(test)]
mod tests {
    use super::{GeoPoint, Vec3};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn north_pole_ignores_x_and_z() {
        let a = GeoPoint::from_unit(Vec3::new(0.0, 1.0, 0.0)).expect("geo");
        assert_close(a.lat_deg, 90.0, 1e-9);

        // Tiny horizontal drift must not move the pole.
        let b = GeoPoint::from_unit(Vec3::new(1e-9, 1.0, -1e-9)).expect("geo");
        assert_close(b.lat_deg, 90.0, 1e-6);
    }

    #[test]
    fn south_pole() {
        let g = GeoPoint::from_unit(Vec3::new(0.0, -1.0, 0.0)).expect("geo");
        assert_close(g.lat_deg, -90.0, 1e-9);
    }

    #[test]
    fn off_sphere_points_are_normalized() {
        let on = GeoPoint::from_unit(Vec3::new(0.3, 0.4, -0.5)).expect("geo");
        let off = GeoPoint::from_unit(Vec3::new(0.6, 0.8, -1.0)).expect("geo");
        assert_close(on.lat_deg, off.lat_deg, 1e-12);
        assert_close(on.lon_deg, off.lon_deg, 1e-12);
    }

    #[test]
    fn axis_longitudes_follow_texture_calibration() {
        // +Z: atan2 = 0 -> (270 % 360) - 180 = 90.
        let z = GeoPoint::from_unit(Vec3::new(0.0, 0.0, 1.0)).expect("geo");
        assert_close(z.lon_deg, 90.0, 1e-9);
        assert_close(z.lat_deg, 0.0, 1e-9);

        // +X: atan2 = 90 -> (360 % 360) - 180 = -180.
        let x = GeoPoint::from_unit(Vec3::new(1.0, 0.0, 0.0)).expect("geo");
        assert_close(x.lon_deg, -180.0, 1e-9);

        // -X: atan2 = -90 -> 180 - 180 = 0.
        let neg_x = GeoPoint::from_unit(Vec3::new(-1.0, 0.0, 0.0)).expect("geo");
        assert_close(neg_x.lon_deg, 0.0, 1e-9);
    }

    #[test]
    fn results_stay_in_range_over_the_sphere() {
        for i in 0..=36 {
            for j in 0..72 {
                let theta = (i as f64 * 5.0).to_radians();
                let phi = (j as f64 * 5.0).to_radians();
                let p = Vec3::new(theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin());
                let g = GeoPoint::from_unit(p).expect("geo");
                assert!((-90.0..=90.0).contains(&g.lat_deg), "lat {}", g.lat_deg);
                assert!((-180.0..180.0).contains(&g.lon_deg), "lon {}", g.lon_deg);
            }
        }
    }

    #[test]
    fn to_unit_inverts_from_unit() {
        for (lat, lon) in [(38.0, -25.0), (0.0, 0.0), (-45.5, 170.25), (12.0, -179.0)] {
            let g = GeoPoint::from_unit(GeoPoint::new(lat, lon).to_unit()).expect("geo");
            assert_close(g.lat_deg, lat, 1e-9);
            assert_close(g.lon_deg, lon, 1e-9);
        }
    }

    #[test]
    fn degenerate_input_has_no_geo_point() {
        assert_eq!(GeoPoint::from_unit(Vec3::ZERO), None);
    }

    #[test]
    fn display_uses_two_decimals() {
        let g = GeoPoint::new(38.123, -25.5);
        assert_eq!(g.to_string(), "latitude: 38.12, longitude: -25.50");
    }
}
