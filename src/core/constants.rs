//! Library-wide defaults. Keeping them in a single place makes it easier to
//! tweak the magic numbers.

use crate::core::{geo::LatLng, types::MapType};

/// Zoom used when neither the caller nor the server supplies one.
pub const DEFAULT_ZOOM: f64 = 12.0;

/// Center used when neither the caller nor the server supplies one.
pub const DEFAULT_CENTER: LatLng = LatLng {
    lat: 51.5,
    lng: -0.125,
};

pub const DEFAULT_MAP_TYPE: MapType = MapType::RoadMap;

/// Prefix of the state store key; the map name is appended.
pub const STATE_KEY_PREFIX: &str = "mapState";

/// Script loader key for the commercial map library. Every map on the page
/// shares the load.
pub const GOOGLE_MAPS_SCRIPT_KEY: &str = "google-maps";

pub const GOOGLE_MAPS_SCRIPT_URL: &str = "https://maps.googleapis.com/maps/api/js";

/// Native map-type id under which the high contrast style is registered.
pub const HIGH_CONTRAST_MAP_TYPE_ID: &str = "high-contrast";

/// Brightness percentage applied to tiles when nothing else is configured.
pub const DEFAULT_MAP_BRIGHTNESS: u32 = 100;

/// Brightness is clamped to this range of percentages.
pub const MAP_BRIGHTNESS_RANGE: (u32, u32) = (10, 150);
