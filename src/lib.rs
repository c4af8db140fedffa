//! # trackmap
//!
//! A provider-independent map adapter for real-time aircraft tracking
//! displays.
//!
//! Application code talks to one interface, [`MapAdapter`], with markers,
//! polylines, polygons, circles, info windows, bounds/zoom/center and a set
//! of hooked events. Two implementations drive structurally different native
//! engines: [`GoogleMap`] over a commercial map service and [`LeafletMap`]
//! over an open tile-based service. Each native engine is described by a
//! family of traits, so a browser binding or the bundled headless engines
//! can stand behind either adapter.

pub mod core;
#[macro_use]
pub mod overlays;
pub mod events;
pub mod map;
pub mod prelude;
pub mod providers;
pub mod runtime;
pub mod services;
pub use crate::core::constants;

// Re-export public API
pub use core::{
    bounds::Bounds,
    geo::{Icon, LatLng, Point, Size},
    state::MapState,
    types::{Capabilities, MapControlPosition, MapStatus, MapType, OverlayId, Provider, Tag},
};

pub use events::{HookHandle, MapEvent, MapEventKind, MapEvents, MouseEvent};

pub use map::{MapAdapter, MapEnvironment};

pub use overlays::{MapCircle, MapInfoWindow, MapMarker, MapPolygon, MapPolyline};

pub use providers::{google::GoogleMap, leaflet::LeafletMap};

pub use services::{
    container::MapContainer,
    script::{LoadError, ScriptFetcher, ScriptLoader, ScriptRequest},
    store::StateStore,
    text::Localiser,
};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Unsupported {kind} value: {value}")]
    UnsupportedValue { kind: &'static str, value: String },

    #[error("Map did not become ready within {0:?}")]
    ReadyTimeout(std::time::Duration),

    #[error("Map has been destroyed")]
    Destroyed,

    #[error("State store error: {0}")]
    Store(String),
}

impl MapError {
    pub(crate) fn unsupported(kind: &'static str, value: impl ToString) -> Self {
        MapError::UnsupportedValue {
            kind,
            value: value.to_string(),
        }
    }
}

/// Error type alias for convenience
pub type Error = MapError;

/// Initialises `env_logger` from `RUST_LOG`. Safe to call more than once.
#[cfg(feature = "debug")]
pub fn init_logging() {
    let _ = env_logger::builder().is_test(cfg!(test)).try_init();
}
