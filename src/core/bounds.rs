use crate::core::geo::LatLng;
use serde::{Deserialize, Serialize};

/// A rectangle in lat/lng space described by its top-left (north-west) and
/// bottom-right (south-east) corners. North is "top", so a well-formed
/// bounds has `top_left_lat >= bottom_right_lat`.
///
/// No dateline wrap-around handling is attempted: a rectangle crossing the
/// antimeridian has `top_left_lng > bottom_right_lng` and is passed to the
/// native engine as-is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub top_left_lat: f64,
    pub top_left_lng: f64,
    pub bottom_right_lat: f64,
    pub bottom_right_lng: f64,
}

impl Bounds {
    /// Creates bounds from individual coordinates
    pub fn new(
        top_left_lat: f64,
        top_left_lng: f64,
        bottom_right_lat: f64,
        bottom_right_lng: f64,
    ) -> Self {
        Self {
            top_left_lat,
            top_left_lng,
            bottom_right_lat,
            bottom_right_lng,
        }
    }

    /// Creates bounds from the two corners
    pub fn from_corners(top_left: LatLng, bottom_right: LatLng) -> Self {
        Self::new(top_left.lat, top_left.lng, bottom_right.lat, bottom_right.lng)
    }

    /// The smallest bounds enclosing every point, or `None` for an empty slice
    pub fn from_lat_lngs(points: &[LatLng]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut bounds = Self::from_corners(*first, *first);
        for point in rest {
            bounds.extend(point);
        }
        Some(bounds)
    }

    pub fn top_left(&self) -> LatLng {
        LatLng::new(self.top_left_lat, self.top_left_lng)
    }

    pub fn bottom_right(&self) -> LatLng {
        LatLng::new(self.bottom_right_lat, self.bottom_right_lng)
    }

    /// South-west corner, for engines that describe bounds that way
    pub fn south_west(&self) -> LatLng {
        LatLng::new(self.bottom_right_lat, self.top_left_lng)
    }

    /// North-east corner, for engines that describe bounds that way
    pub fn north_east(&self) -> LatLng {
        LatLng::new(self.top_left_lat, self.bottom_right_lng)
    }

    /// Checks the north-up invariant
    pub fn is_valid(&self) -> bool {
        self.top_left_lat >= self.bottom_right_lat
    }

    /// Checks if the bounds contain a point
    pub fn contains(&self, point: &LatLng) -> bool {
        point.lat <= self.top_left_lat
            && point.lat >= self.bottom_right_lat
            && point.lng >= self.top_left_lng
            && point.lng <= self.bottom_right_lng
    }

    /// Extends the bounds to include a point
    pub fn extend(&mut self, point: &LatLng) {
        self.top_left_lat = self.top_left_lat.max(point.lat);
        self.top_left_lng = self.top_left_lng.min(point.lng);
        self.bottom_right_lat = self.bottom_right_lat.min(point.lat);
        self.bottom_right_lng = self.bottom_right_lng.max(point.lng);
    }

    /// Gets the center point of the bounds
    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.top_left_lat + self.bottom_right_lat) / 2.0,
            (self.top_left_lng + self.bottom_right_lng) / 2.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_corners() {
        let bounds = Bounds::new(52.0, -1.0, 51.0, 1.0);
        assert!(bounds.is_valid());
        assert_eq!(bounds.south_west(), LatLng::new(51.0, -1.0));
        assert_eq!(bounds.north_east(), LatLng::new(52.0, 1.0));
        assert_eq!(bounds.center(), LatLng::new(51.5, 0.0));
    }

    #[test]
    fn test_bounds_contains() {
        let bounds = Bounds::new(41.0, -75.0, 40.0, -73.0);
        assert!(bounds.contains(&LatLng::new(40.5, -74.0)));
        assert!(!bounds.contains(&LatLng::new(42.0, -74.0)));
    }

    #[test]
    fn test_bounds_from_points() {
        let points = [
            LatLng::new(51.2, -0.5),
            LatLng::new(51.8, 0.3),
            LatLng::new(51.4, -0.1),
        ];
        let bounds = Bounds::from_lat_lngs(&points).unwrap();
        assert_eq!(bounds, Bounds::new(51.8, -0.5, 51.2, 0.3));
        assert!(points.iter().all(|p| bounds.contains(p)));
        assert!(Bounds::from_lat_lngs(&[]).is_none());
    }

    #[test]
    fn test_inverted_bounds_invalid() {
        assert!(!Bounds::new(10.0, 0.0, 20.0, 1.0).is_valid());
    }
}
