use crate::core::{constants::STATE_KEY_PREFIX, geo::LatLng, types::MapType};
use serde::{Deserialize, Serialize};

/// The part of a map's view that survives a page reload
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapState {
    pub zoom: f64,
    pub center: LatLng,
    pub map_type: MapType,
}

/// What the store actually holds. Any field may be missing, e.g. when the
/// record was written by an older version.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedMapState {
    pub zoom: Option<f64>,
    pub center: Option<LatLng>,
    pub map_type: Option<MapType>,
}

impl PersistedMapState {
    /// Fills missing fields from `live`
    pub fn or_live(self, live: MapState) -> MapState {
        MapState {
            zoom: self.zoom.unwrap_or(live.zoom),
            center: self.center.unwrap_or(live.center),
            map_type: self.map_type.unwrap_or(live.map_type),
        }
    }
}

impl From<MapState> for PersistedMapState {
    fn from(state: MapState) -> Self {
        Self {
            zoom: Some(state.zoom),
            center: Some(state.center),
            map_type: Some(state.map_type),
        }
    }
}

/// Store key for the named map
pub fn state_key(name: &str) -> String {
    format!("{}-{}", STATE_KEY_PREFIX, name)
}
