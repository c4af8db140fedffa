//! The provider-independent map interface
//!
//! Application code holds a `Box<dyn MapAdapter>` and never sees the native
//! engine. Operations a provider cannot support are silent no-ops that
//! return `None` or `false`; ask [`MapAdapter::capabilities`] first when the
//! difference matters.

pub(crate) mod base;

pub use base::MapEnvironment;

use crate::{
    core::{
        bounds::Bounds,
        geo::LatLng,
        options::{
            CircleOptions, ClustererSettings, InfoWindowOptions, LayerSettings, MapOptions,
            MarkerOptions, OpenCallbacks, PolygonOptions, PolylineOptions, TrimResult,
        },
        state::MapState,
        types::{Capabilities, MapControl, MapControlPosition, MapStatus, MapType, OverlayId, Provider},
    },
    events::{HookHandle, MapEvent, MapEvents},
    overlays::{MapCircle, MapInfoWindow, MapMarker, MapPolygon, MapPolyline},
    Result,
};
use async_trait::async_trait;
use crossbeam_channel::Receiver;

#[async_trait]
pub trait MapAdapter: Send {
    /// Name the map's state is persisted under
    fn name(&self) -> &str;

    fn provider(&self) -> Provider;

    fn capabilities(&self) -> Capabilities;

    fn supports_polygons(&self) -> bool {
        self.capabilities().polygons
    }

    fn supports_info_windows(&self) -> bool {
        self.capabilities().info_windows
    }

    fn supports_clustering(&self) -> bool {
        self.capabilities().clustering
    }

    fn supports_layers(&self) -> bool {
        self.capabilities().layers
    }

    fn supports_brightness(&self) -> bool {
        self.capabilities().brightness
    }

    fn status(&self) -> MapStatus;

    fn is_open(&self) -> bool {
        self.status().is_open()
    }

    /// The native engine can compute the visible bounds
    fn is_ready(&self) -> bool;

    /// Creates the native map.
    ///
    /// `options` are layered over the instance options. When the native
    /// library cannot be loaded the container shows a placeholder, every
    /// callback still runs, and the result is `Ok(MapStatus::LoadFailed)`.
    /// When waiting for readiness gives up the map stays open, `after_open`
    /// still runs, and the result is `Err(MapError::ReadyTimeout)`.
    async fn open(&mut self, options: Option<MapOptions>, callbacks: OpenCallbacks) -> Result<MapStatus>;

    /// Destroys every overlay and the native map. The adapter cannot be
    /// opened again.
    fn destroy(&mut self);

    /// Re-lays the map out after its container changed size, keeping the
    /// center
    fn refresh_map(&mut self);

    fn events(&self) -> &MapEvents;

    fn unhook(&self, handle: HookHandle) -> bool {
        self.events().unhook(handle)
    }

    fn subscribe(&self) -> Receiver<MapEvent> {
        self.events().subscribe()
    }

    /// `None` until the map is open and ready
    fn bounds(&self) -> Option<Bounds>;
    fn fit_bounds(&mut self, bounds: &Bounds);

    fn center(&self) -> LatLng;
    fn set_center(&mut self, center: LatLng);
    fn pan_to(&mut self, center: LatLng);

    fn zoom(&self) -> f64;
    fn set_zoom(&mut self, zoom: f64);

    fn map_type(&self) -> MapType;
    /// Unsupported map types are ignored
    fn set_map_type(&mut self, map_type: MapType);

    fn is_draggable(&self) -> bool;
    fn has_scroll_wheel(&self) -> bool;

    /// Adds arbitrary content at a control position. Returns false before
    /// open.
    fn add_control(&mut self, control: MapControl, position: MapControlPosition) -> bool;

    /// The live view, as it would be persisted
    fn create_settings(&self) -> MapState {
        MapState {
            zoom: self.zoom(),
            center: self.center(),
            map_type: self.map_type(),
        }
    }

    fn save_state(&self) -> Result<()>;

    /// The persisted state, with anything missing taken from the live view
    fn load_state(&self) -> MapState;

    fn apply_state(&mut self, state: &MapState) {
        self.set_zoom(state.zoom);
        self.set_center(state.center);
        self.set_map_type(state.map_type);
    }

    fn load_and_apply_state(&mut self) {
        let state = self.load_state();
        self.apply_state(&state);
    }

    /// Replaces any marker already registered under `id`. `None` before
    /// open.
    fn add_marker(&mut self, id: OverlayId, options: MarkerOptions) -> Option<&mut dyn MapMarker>;
    fn marker(&self, id: &OverlayId) -> Option<&dyn MapMarker>;
    fn marker_mut(&mut self, id: &OverlayId) -> Option<&mut dyn MapMarker>;
    fn marker_ids(&self) -> Vec<OverlayId>;
    fn destroy_marker(&mut self, id: &OverlayId) -> bool;

    fn center_on_marker(&mut self, id: &OverlayId) -> bool {
        match self.marker(id).map(|m| m.position()) {
            Some(position) => {
                self.set_center(position);
                true
            }
            None => false,
        }
    }

    fn create_marker_clusterer(&mut self, settings: ClustererSettings) -> bool;
    /// Hands markers to the clusterer; returns how many were added
    fn cluster_markers(&mut self, ids: &[OverlayId]) -> usize;
    fn uncluster_markers(&mut self, ids: &[OverlayId]) -> usize;
    fn repaint_clusterer(&mut self);
    fn clusterer_max_zoom(&self) -> Option<f64>;
    fn set_clusterer_max_zoom(&mut self, max_zoom: Option<f64>);

    fn add_polyline(&mut self, id: OverlayId, options: PolylineOptions) -> Option<&mut dyn MapPolyline>;
    fn polyline(&self, id: &OverlayId) -> Option<&dyn MapPolyline>;
    fn polyline_mut(&mut self, id: &OverlayId) -> Option<&mut dyn MapPolyline>;
    fn polyline_ids(&self) -> Vec<OverlayId>;
    fn destroy_polyline(&mut self, id: &OverlayId) -> bool;

    /// Removes up to `count` points from the start or end of the path
    fn trim_polyline(&mut self, id: &OverlayId, count: usize, from_start: bool) -> TrimResult;
    /// `-1` is the last point; out-of-range indexes are ignored
    fn remove_polyline_point_at(&mut self, id: &OverlayId, index: isize);
    /// Points keep their order whichever end they are added to
    fn append_to_polyline(&mut self, id: &OverlayId, points: &[LatLng], to_start: bool);
    fn replace_polyline_point_at(&mut self, id: &OverlayId, index: isize, point: LatLng);

    fn add_polygon(&mut self, id: OverlayId, options: PolygonOptions) -> Option<&mut dyn MapPolygon>;
    fn polygon(&self, id: &OverlayId) -> Option<&dyn MapPolygon>;
    fn polygon_mut(&mut self, id: &OverlayId) -> Option<&mut dyn MapPolygon>;
    fn destroy_polygon(&mut self, id: &OverlayId) -> bool;

    fn add_circle(&mut self, id: OverlayId, options: CircleOptions) -> Option<&mut dyn MapCircle>;
    fn circle(&self, id: &OverlayId) -> Option<&dyn MapCircle>;
    fn circle_mut(&mut self, id: &OverlayId) -> Option<&mut dyn MapCircle>;
    fn destroy_circle(&mut self, id: &OverlayId) -> bool;
    /// Lowest positive numeric id not used by a circle
    fn unused_circle_id(&self) -> OverlayId;

    fn add_info_window(&mut self, id: OverlayId, options: InfoWindowOptions) -> Option<&mut dyn MapInfoWindow>;
    fn info_window(&self, id: &OverlayId) -> Option<&dyn MapInfoWindow>;
    fn info_window_mut(&mut self, id: &OverlayId) -> Option<&mut dyn MapInfoWindow>;
    fn destroy_info_window(&mut self, id: &OverlayId) -> bool;
    /// Opens over the anchor marker if one is named and exists, otherwise
    /// at the window's position
    fn open_info_window(&mut self, id: &OverlayId, anchor: Option<&OverlayId>) -> bool;
    fn close_info_window(&mut self, id: &OverlayId) -> bool;

    fn add_layer(&mut self, settings: LayerSettings, opacity: f64) -> bool;
    fn destroy_layer(&mut self, id: &str) -> bool;
    fn has_layer(&self, id: &str) -> bool;
    fn layer_opacity(&self, id: &str) -> Option<f64>;
    fn set_layer_opacity(&mut self, id: &str, opacity: f64) -> bool;

    fn can_set_map_brightness(&self) -> bool {
        self.supports_brightness()
    }
    /// Percentage; 100 is unaltered
    fn default_map_brightness(&self) -> u32;
    fn map_brightness(&self) -> u32;
    fn set_map_brightness(&mut self, brightness: u32);
}

/// Lowest positive number not already taken as an id
pub(crate) fn lowest_unused_id(ids: impl Iterator<Item = OverlayId>) -> OverlayId {
    let mut taken: Vec<i64> = ids
        .filter_map(|id| match id {
            OverlayId::Number(n) if n > 0 => Some(n),
            _ => None,
        })
        .collect();
    taken.sort_unstable();
    let mut candidate = 1;
    for n in taken {
        if n == candidate {
            candidate += 1;
        } else if n > candidate {
            break;
        }
    }
    OverlayId::Number(candidate)
}
