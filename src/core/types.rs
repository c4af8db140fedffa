//! Provider-independent enumerations and identity types

use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// The map types a caller can ask for. Not every provider supports every
/// type; probe with the provider's map-type conversion or `set_map_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MapType {
    #[serde(rename = "h")]
    Hybrid,
    #[serde(rename = "m")]
    RoadMap,
    #[serde(rename = "k")]
    Satellite,
    #[serde(rename = "t")]
    Terrain,
    #[serde(rename = "o")]
    HighContrast,
}

impl MapType {
    pub const ALL: [MapType; 5] = [
        MapType::Hybrid,
        MapType::RoadMap,
        MapType::Satellite,
        MapType::Terrain,
        MapType::HighContrast,
    ];
}

impl fmt::Display for MapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapType::Hybrid => write!(f, "hybrid"),
            MapType::RoadMap => write!(f, "roadmap"),
            MapType::Satellite => write!(f, "satellite"),
            MapType::Terrain => write!(f, "terrain"),
            MapType::HighContrast => write!(f, "high-contrast"),
        }
    }
}

/// Where a control sits on the map surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MapControlPosition {
    TopLeft,
    TopCentre,
    TopRight,
    LeftTop,
    LeftCentre,
    LeftBottom,
    RightTop,
    RightCentre,
    RightBottom,
    BottomLeft,
    BottomCentre,
    BottomRight,
}

impl MapControlPosition {
    pub const ALL: [MapControlPosition; 12] = [
        MapControlPosition::TopLeft,
        MapControlPosition::TopCentre,
        MapControlPosition::TopRight,
        MapControlPosition::LeftTop,
        MapControlPosition::LeftCentre,
        MapControlPosition::LeftBottom,
        MapControlPosition::RightTop,
        MapControlPosition::RightCentre,
        MapControlPosition::RightBottom,
        MapControlPosition::BottomLeft,
        MapControlPosition::BottomCentre,
        MapControlPosition::BottomRight,
    ];
}

impl fmt::Display for MapControlPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Style of the map-type picker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MapControlStyle {
    #[default]
    Default,
    DropdownMenu,
    HorizontalBar,
}

/// Caller-supplied identity of an overlay, unique within one registry
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OverlayId {
    Number(i64),
    Text(String),
}

impl fmt::Display for OverlayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverlayId::Number(n) => write!(f, "{}", n),
            OverlayId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for OverlayId {
    fn from(value: &str) -> Self {
        OverlayId::Text(value.to_string())
    }
}

impl From<String> for OverlayId {
    fn from(value: String) -> Self {
        OverlayId::Text(value)
    }
}

impl From<i64> for OverlayId {
    fn from(value: i64) -> Self {
        OverlayId::Number(value)
    }
}

impl From<i32> for OverlayId {
    fn from(value: i32) -> Self {
        OverlayId::Number(value as i64)
    }
}

impl From<u32> for OverlayId {
    fn from(value: u32) -> Self {
        OverlayId::Number(value as i64)
    }
}

/// Opaque value a caller attaches to an overlay for its own bookkeeping.
/// The adapter stores it and hands it back, nothing more.
#[derive(Clone)]
pub struct Tag(Arc<dyn Any + Send + Sync>);

impl Tag {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Tag(..)")
    }
}

/// A control element placed on the map surface. The content is markup
/// handed to the native engine untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct MapControl {
    pub id: String,
    pub content: String,
}

impl MapControl {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
        }
    }
}

/// The native engine behind an adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    GoogleMaps,
    Leaflet,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::GoogleMaps => write!(f, "GoogleMaps"),
            Provider::Leaflet => write!(f, "Leaflet"),
        }
    }
}

/// Optional features that depend on the native engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub polygons: bool,
    pub info_windows: bool,
    pub clustering: bool,
    pub layers: bool,
    pub brightness: bool,
}

/// Lifecycle of a map adapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapStatus {
    Unopened,
    /// Waiting for the native library to load
    Opening,
    Open,
    /// The native library could not be loaded; carries the status string
    LoadFailed(String),
    Destroyed,
}

impl MapStatus {
    pub fn is_open(&self) -> bool {
        matches!(self, MapStatus::Open)
    }
}
