use serde::{Deserialize, Serialize};

/// Represents a geographical coordinate with latitude and longitude
///
/// No range validation is performed; native engines may clamp or reject
/// out-of-range values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    /// Creates a new LatLng coordinate
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl Default for LatLng {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// A pixel-space position, used for icon anchors and origins
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// A pixel-space extent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Describes a marker image. A marker without an icon uses the
/// provider's default image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Icon {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaled_size: Option<Size>,
}

impl Icon {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            size: None,
            anchor: None,
            origin: None,
            scaled_size: None,
        }
    }

    pub fn with_size(mut self, size: Size) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_anchor(mut self, anchor: Point) -> Self {
        self.anchor = Some(anchor);
        self
    }

    pub fn with_origin(mut self, origin: Point) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn with_scaled_size(mut self, scaled_size: Size) -> Self {
        self.scaled_size = Some(scaled_size);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lat_lng_creation() {
        let coord = LatLng::new(40.7128, -74.0060);
        assert_eq!(coord.lat, 40.7128);
        assert_eq!(coord.lng, -74.0060);
    }

    #[test]
    fn test_icon_builder() {
        let icon = Icon::new("plane.png")
            .with_size(Size::new(32.0, 32.0))
            .with_anchor(Point::new(16.0, 16.0));

        assert_eq!(icon.url, "plane.png");
        assert_eq!(icon.size, Some(Size::new(32.0, 32.0)));
        assert_eq!(icon.anchor, Some(Point::new(16.0, 16.0)));
        assert!(icon.origin.is_none());
        assert!(icon.scaled_size.is_none());
    }

    #[test]
    fn test_icon_json_skips_missing_fields() {
        let json = serde_json::to_value(Icon::new("a.png")).unwrap();
        assert_eq!(json, serde_json::json!({ "url": "a.png" }));
    }
}
