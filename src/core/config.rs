//! Configuration for adapter timing and the server-supplied defaults
//!
//! Timing is grouped into presets the same way the rest of the crate groups
//! tunables: pick a preset or build a custom value.

use crate::core::{
    geo::LatLng,
    options::MapOptions,
    types::MapType,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timing knobs for opening a map
#[derive(Debug, Clone, PartialEq)]
pub struct MapRuntimeConfig {
    /// Give up on the native library script after this long
    pub script_timeout: Duration,
    /// Interval between readiness checks when waiting for the map
    pub ready_poll_interval: Duration,
    /// Total time to wait for readiness before reporting a timeout
    pub ready_max_wait: Duration,
}

impl Default for MapRuntimeConfig {
    fn default() -> Self {
        Self {
            script_timeout: Duration::from_secs(30),
            ready_poll_interval: Duration::from_millis(100),
            ready_max_wait: Duration::from_secs(30),
        }
    }
}

impl MapRuntimeConfig {
    /// Slow links: longer script timeout, patient readiness wait
    pub fn slow_network() -> Self {
        Self {
            script_timeout: Duration::from_secs(60),
            ready_poll_interval: Duration::from_millis(250),
            ready_max_wait: Duration::from_secs(120),
        }
    }

    pub fn for_testing() -> Self {
        Self {
            script_timeout: Duration::from_millis(200),
            ready_poll_interval: Duration::from_millis(5),
            ready_max_wait: Duration::from_millis(100),
        }
    }
}

/// A tile server for the tile-based provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileServerSettings {
    pub name: String,
    /// URL with `{s}`, `{z}`, `{x}` and `{y}` placeholders
    pub url: String,
    pub attribution: String,
    #[serde(default)]
    pub subdomains: Vec<String>,
    #[serde(default)]
    pub min_zoom: Option<f64>,
    #[serde(default)]
    pub max_zoom: Option<f64>,
    /// CSS class put on the tile layer, used to restyle tiles
    #[serde(default)]
    pub class_name: Option<String>,
    /// Brightness percentage the tiles look right at
    #[serde(default)]
    pub default_brightness: Option<u32>,
}

impl Default for TileServerSettings {
    fn default() -> Self {
        Self {
            name: "OpenStreetMap".to_string(),
            url: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            attribution: "&copy; OpenStreetMap contributors".to_string(),
            subdomains: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            min_zoom: None,
            max_zoom: Some(19.0),
            class_name: None,
            default_brightness: None,
        }
    }
}

/// Defaults fetched from the server, consumed when `use_server_defaults`
/// is set on the map options
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerDefaults {
    pub initial_latitude: Option<f64>,
    pub initial_longitude: Option<f64>,
    pub initial_zoom: Option<f64>,
    pub initial_map_type: Option<MapType>,
    pub google_maps_api_key: Option<String>,
    pub tile_server: Option<TileServerSettings>,
}

impl ServerDefaults {
    /// The initial view as partial map options
    pub fn to_map_options(&self) -> MapOptions {
        let center = match (self.initial_latitude, self.initial_longitude) {
            (Some(lat), Some(lng)) => Some(LatLng::new(lat, lng)),
            _ => None,
        };
        MapOptions {
            zoom: self.initial_zoom,
            center,
            map_type: self.initial_map_type,
            ..MapOptions::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_defaults_from_json() {
        let defaults: ServerDefaults = serde_json::from_str(
            r#"{ "initialLatitude": 53.0, "initialLongitude": -2.5, "initialZoom": 8, "initialMapType": "k" }"#,
        )
        .unwrap();

        let options = defaults.to_map_options();
        assert_eq!(options.center, Some(LatLng::new(53.0, -2.5)));
        assert_eq!(options.zoom, Some(8.0));
        assert_eq!(options.map_type, Some(MapType::Satellite));
        assert!(defaults.tile_server.is_none());
    }

    #[test]
    fn test_partial_center_is_ignored() {
        let defaults = ServerDefaults {
            initial_latitude: Some(10.0),
            ..ServerDefaults::default()
        };
        assert_eq!(defaults.to_map_options().center, None);
    }

    #[test]
    fn test_presets_poll_inside_wait() {
        for config in [
            MapRuntimeConfig::default(),
            MapRuntimeConfig::slow_network(),
            MapRuntimeConfig::for_testing(),
        ] {
            assert!(config.ready_poll_interval < config.ready_max_wait);
        }
    }
}
