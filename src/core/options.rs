//! Option structs for the map and its overlays
//!
//! Map options come in two shapes: [`MapOptions`] is a partial set where
//! every field may be absent, and [`ResolvedMapOptions`] is the fully
//! populated result of layering partial sets over the library defaults.
//! Overlay options carry their defaulting rules in their `Default` impls:
//! markers are clickable by default, lines and shapes are not.

use crate::core::{
    geo::{Icon, LatLng, Size},
    types::{MapControl, MapControlPosition, MapControlStyle, MapType, Tag},
};
use crate::core::constants::{DEFAULT_CENTER, DEFAULT_MAP_TYPE, DEFAULT_ZOOM};

/// Partial map options. `None` means "not specified at this level".
#[derive(Debug, Clone, Default)]
pub struct MapOptions {
    pub zoom: Option<f64>,
    pub center: Option<LatLng>,
    pub map_type: Option<MapType>,
    /// Take initial zoom/center/map type from the server defaults
    pub use_server_defaults: Option<bool>,
    /// Overlay the persisted state on the options when opening
    pub use_state_on_open: Option<bool>,
    /// Hold back `after_open` until the native engine reports bounds
    pub wait_until_ready: Option<bool>,
    pub show_map_type_control: Option<bool>,
    pub map_type_control_style: Option<MapControlStyle>,
    pub map_type_control_position: Option<MapControlPosition>,
    pub zoom_control_position: Option<MapControlPosition>,
    pub show_high_contrast: Option<bool>,
    pub show_points_of_interest: Option<bool>,
    pub scroll_wheel: Option<bool>,
    pub draggable: Option<bool>,
    pub scale_control: Option<bool>,
    pub street_view_control: Option<bool>,
    /// Controls added to the map as soon as it opens
    pub controls: Option<Vec<(MapControl, MapControlPosition)>>,
}

impl MapOptions {
    /// Returns these options with every field `over` specifies replaced
    pub fn overlay(&self, over: &MapOptions) -> MapOptions {
        MapOptions {
            zoom: over.zoom.or(self.zoom),
            center: over.center.or(self.center),
            map_type: over.map_type.or(self.map_type),
            use_server_defaults: over.use_server_defaults.or(self.use_server_defaults),
            use_state_on_open: over.use_state_on_open.or(self.use_state_on_open),
            wait_until_ready: over.wait_until_ready.or(self.wait_until_ready),
            show_map_type_control: over.show_map_type_control.or(self.show_map_type_control),
            map_type_control_style: over.map_type_control_style.or(self.map_type_control_style),
            map_type_control_position: over
                .map_type_control_position
                .or(self.map_type_control_position),
            zoom_control_position: over.zoom_control_position.or(self.zoom_control_position),
            show_high_contrast: over.show_high_contrast.or(self.show_high_contrast),
            show_points_of_interest: over
                .show_points_of_interest
                .or(self.show_points_of_interest),
            scroll_wheel: over.scroll_wheel.or(self.scroll_wheel),
            draggable: over.draggable.or(self.draggable),
            scale_control: over.scale_control.or(self.scale_control),
            street_view_control: over.street_view_control.or(self.street_view_control),
            controls: over.controls.clone().or_else(|| self.controls.clone()),
        }
    }

    /// Fills every absent field from the library defaults
    pub fn resolve(&self) -> ResolvedMapOptions {
        ResolvedMapOptions::default().apply(self)
    }
}

/// Fully populated map options
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMapOptions {
    pub zoom: f64,
    pub center: LatLng,
    pub map_type: MapType,
    pub use_server_defaults: bool,
    pub use_state_on_open: bool,
    pub wait_until_ready: bool,
    pub show_map_type_control: bool,
    pub map_type_control_style: MapControlStyle,
    pub map_type_control_position: MapControlPosition,
    pub zoom_control_position: MapControlPosition,
    pub show_high_contrast: bool,
    pub show_points_of_interest: bool,
    pub scroll_wheel: bool,
    pub draggable: bool,
    pub scale_control: bool,
    pub street_view_control: bool,
    pub controls: Vec<(MapControl, MapControlPosition)>,
}

impl Default for ResolvedMapOptions {
    fn default() -> Self {
        Self {
            zoom: DEFAULT_ZOOM,
            center: DEFAULT_CENTER,
            map_type: DEFAULT_MAP_TYPE,
            use_server_defaults: false,
            use_state_on_open: false,
            wait_until_ready: true,
            show_map_type_control: true,
            map_type_control_style: MapControlStyle::Default,
            map_type_control_position: MapControlPosition::TopLeft,
            zoom_control_position: MapControlPosition::RightTop,
            show_high_contrast: false,
            show_points_of_interest: false,
            scroll_wheel: true,
            draggable: true,
            scale_control: true,
            street_view_control: false,
            controls: Vec::new(),
        }
    }
}

impl ResolvedMapOptions {
    /// Replaces every field `options` specifies
    pub fn apply(mut self, options: &MapOptions) -> Self {
        if let Some(zoom) = options.zoom {
            self.zoom = zoom;
        }
        if let Some(center) = options.center {
            self.center = center;
        }
        if let Some(map_type) = options.map_type {
            self.map_type = map_type;
        }
        if let Some(value) = options.use_server_defaults {
            self.use_server_defaults = value;
        }
        if let Some(value) = options.use_state_on_open {
            self.use_state_on_open = value;
        }
        if let Some(value) = options.wait_until_ready {
            self.wait_until_ready = value;
        }
        if let Some(value) = options.show_map_type_control {
            self.show_map_type_control = value;
        }
        if let Some(value) = options.map_type_control_style {
            self.map_type_control_style = value;
        }
        if let Some(value) = options.map_type_control_position {
            self.map_type_control_position = value;
        }
        if let Some(value) = options.zoom_control_position {
            self.zoom_control_position = value;
        }
        if let Some(value) = options.show_high_contrast {
            self.show_high_contrast = value;
        }
        if let Some(value) = options.show_points_of_interest {
            self.show_points_of_interest = value;
        }
        if let Some(value) = options.scroll_wheel {
            self.scroll_wheel = value;
        }
        if let Some(value) = options.draggable {
            self.draggable = value;
        }
        if let Some(value) = options.scale_control {
            self.scale_control = value;
        }
        if let Some(value) = options.street_view_control {
            self.street_view_control = value;
        }
        if let Some(controls) = &options.controls {
            self.controls = controls.clone();
        }
        self
    }
}

/// Callbacks invoked by `open`. Each runs at most once per `open` call.
#[derive(Default)]
pub struct OpenCallbacks {
    /// The native map exists, or the placeholder replaced it
    pub after_create: Option<Box<dyn FnOnce() + Send>>,
    /// The map is open (and ready, when waiting was requested)
    pub after_open: Option<Box<dyn FnOnce() + Send>>,
    /// The native library failed to load; receives the status string
    pub on_load_failure: Option<Box<dyn FnOnce(&str) + Send>>,
}

impl OpenCallbacks {
    pub fn after_create(mut self, callback: impl FnOnce() + Send + 'static) -> Self {
        self.after_create = Some(Box::new(callback));
        self
    }

    pub fn after_open(mut self, callback: impl FnOnce() + Send + 'static) -> Self {
        self.after_open = Some(Box::new(callback));
        self
    }

    pub fn on_load_failure(mut self, callback: impl FnOnce(&str) + Send + 'static) -> Self {
        self.on_load_failure = Some(Box::new(callback));
        self
    }
}

impl std::fmt::Debug for OpenCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenCallbacks")
            .field("after_create", &self.after_create.is_some())
            .field("after_open", &self.after_open.is_some())
            .field("on_load_failure", &self.on_load_failure.is_some())
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct MarkerOptions {
    pub position: LatLng,
    pub icon: Option<Icon>,
    pub tooltip: Option<String>,
    pub clickable: bool,
    pub draggable: bool,
    pub visible: bool,
    pub z_index: i32,
    pub tag: Option<Tag>,
}

impl MarkerOptions {
    pub fn at(position: LatLng) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }
}

impl Default for MarkerOptions {
    fn default() -> Self {
        Self {
            position: DEFAULT_CENTER,
            icon: None,
            tooltip: None,
            clickable: true,
            draggable: false,
            visible: true,
            z_index: 0,
            tag: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PolylineOptions {
    pub path: Vec<LatLng>,
    pub stroke_colour: String,
    pub stroke_opacity: f64,
    pub stroke_weight: f64,
    pub clickable: bool,
    pub draggable: bool,
    pub editable: bool,
    pub visible: bool,
    pub z_index: i32,
    pub tag: Option<Tag>,
}

impl PolylineOptions {
    pub fn with_path(path: Vec<LatLng>) -> Self {
        Self {
            path,
            ..Self::default()
        }
    }
}

impl Default for PolylineOptions {
    fn default() -> Self {
        Self {
            path: Vec::new(),
            stroke_colour: "#000000".to_string(),
            stroke_opacity: 1.0,
            stroke_weight: 1.0,
            clickable: false,
            draggable: false,
            editable: false,
            visible: true,
            z_index: 0,
            tag: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PolygonOptions {
    pub paths: Vec<Vec<LatLng>>,
    pub fill_colour: String,
    pub fill_opacity: f64,
    pub stroke_colour: String,
    pub stroke_opacity: f64,
    pub stroke_weight: f64,
    pub clickable: bool,
    pub draggable: bool,
    pub editable: bool,
    pub visible: bool,
    pub z_index: i32,
    pub tag: Option<Tag>,
}

impl Default for PolygonOptions {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            fill_colour: "#000000".to_string(),
            fill_opacity: 0.0,
            stroke_colour: "#000000".to_string(),
            stroke_opacity: 1.0,
            stroke_weight: 1.0,
            clickable: false,
            draggable: false,
            editable: false,
            visible: true,
            z_index: 0,
            tag: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CircleOptions {
    pub center: LatLng,
    /// Radius in metres
    pub radius: f64,
    pub fill_colour: String,
    pub fill_opacity: f64,
    pub stroke_colour: String,
    pub stroke_opacity: f64,
    pub stroke_weight: f64,
    pub clickable: bool,
    pub draggable: bool,
    pub editable: bool,
    pub visible: bool,
    pub z_index: i32,
    pub tag: Option<Tag>,
}

impl CircleOptions {
    pub fn at(center: LatLng, radius: f64) -> Self {
        Self {
            center,
            radius,
            ..Self::default()
        }
    }
}

impl Default for CircleOptions {
    fn default() -> Self {
        Self {
            center: DEFAULT_CENTER,
            radius: 0.0,
            fill_colour: "#000000".to_string(),
            fill_opacity: 0.0,
            stroke_colour: "#000000".to_string(),
            stroke_opacity: 1.0,
            stroke_weight: 1.0,
            clickable: false,
            draggable: false,
            editable: false,
            visible: true,
            z_index: 0,
            tag: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct InfoWindowOptions {
    /// Markup shown inside the window
    pub content: String,
    pub position: Option<LatLng>,
    pub disable_auto_pan: bool,
    pub max_width: Option<f64>,
    pub pixel_offset: Option<Size>,
    pub z_index: i32,
    pub tag: Option<Tag>,
}

/// Settings for a marker clusterer
#[derive(Debug, Clone, PartialEq)]
pub struct ClustererSettings {
    /// Zoom level above which markers are never clustered
    pub max_zoom: Option<f64>,
    /// Cluster radius in pixels
    pub grid_size: u32,
    pub minimum_cluster_size: usize,
}

impl Default for ClustererSettings {
    fn default() -> Self {
        Self {
            max_zoom: None,
            grid_size: 60,
            minimum_cluster_size: 2,
        }
    }
}

/// An overlay image tile layer drawn above the base map
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSettings {
    pub id: String,
    /// URL with `{z}`, `{x}` and `{y}` placeholders
    pub url_template: String,
    pub min_zoom: Option<f64>,
    pub max_zoom: Option<f64>,
}

/// Outcome of trimming a polyline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrimResult {
    /// The path held fewer points than were asked for and is now empty
    pub emptied: bool,
    pub count_removed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_precedence() {
        let base = MapOptions {
            zoom: Some(5.0),
            center: Some(LatLng::new(1.0, 2.0)),
            ..MapOptions::default()
        };
        let over = MapOptions {
            zoom: Some(9.0),
            ..MapOptions::default()
        };

        let merged = base.overlay(&over);
        assert_eq!(merged.zoom, Some(9.0));
        assert_eq!(merged.center, Some(LatLng::new(1.0, 2.0)));
        assert_eq!(merged.map_type, None);
    }

    #[test]
    fn test_resolve_uses_library_defaults() {
        let resolved = MapOptions::default().resolve();
        assert_eq!(resolved.zoom, DEFAULT_ZOOM);
        assert_eq!(resolved.center, DEFAULT_CENTER);
        assert_eq!(resolved.map_type, MapType::RoadMap);
        assert!(resolved.scroll_wheel);
    }

    #[test]
    fn test_clickable_defaults() {
        assert!(MarkerOptions::default().clickable);
        assert!(!PolylineOptions::default().clickable);
        assert!(!PolygonOptions::default().clickable);
        assert!(!CircleOptions::default().clickable);
    }
}
