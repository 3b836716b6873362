use crate::math::GeoPoint;

/// Axis-aligned rectangle in latitude/longitude space, inclusive on every edge.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GeoRect {
    pub min_lat_deg: f64,
    pub max_lat_deg: f64,
    pub min_lon_deg: f64,
    pub max_lon_deg: f64,
}

impl GeoRect {
    pub const fn new(
        min_lat_deg: f64,
        max_lat_deg: f64,
        min_lon_deg: f64,
        max_lon_deg: f64,
    ) -> Self {
        Self {
            min_lat_deg,
            max_lat_deg,
            min_lon_deg,
            max_lon_deg,
        }
    }

    pub fn contains(&self, point: GeoPoint) -> bool {
        point.lat_deg >= self.min_lat_deg
            && point.lat_deg <= self.max_lat_deg
            && point.lon_deg >= self.min_lon_deg
            && point.lon_deg <= self.max_lon_deg
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            0.5 * (self.min_lat_deg + self.max_lat_deg),
            0.5 * (self.min_lon_deg + self.max_lon_deg),
        )
    }
}
