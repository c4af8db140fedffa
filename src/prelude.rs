//! Prelude module for common trackmap types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use trackmap::prelude::*;`

pub use crate::core::{
    bounds::Bounds,
    config::{MapRuntimeConfig, ServerDefaults, TileServerSettings},
    geo::{Icon, LatLng, Point, Size},
    options::{
        CircleOptions, ClustererSettings, InfoWindowOptions, LayerSettings, MapOptions,
        MarkerOptions, OpenCallbacks, PolygonOptions, PolylineOptions, ResolvedMapOptions,
        TrimResult,
    },
    state::MapState,
    types::{
        Capabilities, MapControl, MapControlPosition, MapControlStyle, MapStatus, MapType,
        OverlayId, Provider, Tag,
    },
};

pub use crate::events::{HookHandle, MapEvent, MapEventKind, MapEvents, MouseEvent};

pub use crate::map::{MapAdapter, MapEnvironment};

pub use crate::overlays::{MapCircle, MapInfoWindow, MapMarker, MapPolygon, MapPolyline};

pub use crate::providers::{
    google::{GoogleMap, HeadlessGoogleMaps},
    leaflet::{HeadlessLeaflet, LeafletMap},
};

pub use crate::services::{
    container::{HeadlessContainer, MapContainer},
    script::{HeadlessFetcher, LoadError, ScriptFetcher, ScriptLoader, ScriptRequest},
    store::{JsonFileStore, MemoryStore, StateStore},
    text::{DefaultStrings, Localiser},
};

pub use crate::{Error as MapError, Result};

pub use std::{
    sync::Arc,
    time::Duration,
};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
