//! The commercial map engine's object model
//!
//! These traits mirror the JavaScript API closely enough that a browser
//! binding is a thin shim. Native objects use interior mutability, like the
//! script objects they stand for: every setter takes `&self`.

use std::sync::Arc;

/// A native coordinate. Unlike the abstract `LatLng`, values are read
/// through accessor methods.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GLatLng {
    lat: f64,
    lng: f64,
}

impl GLatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lng(&self) -> f64 {
        self.lng
    }
}

/// Bounds described by the south-west and north-east corners
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GLatLngBounds {
    south_west: GLatLng,
    north_east: GLatLng,
}

impl GLatLngBounds {
    pub fn new(south_west: GLatLng, north_east: GLatLng) -> Self {
        Self {
            south_west,
            north_east,
        }
    }

    pub fn get_south_west(&self) -> GLatLng {
        self.south_west
    }

    pub fn get_north_east(&self) -> GLatLng {
        self.north_east
    }

    pub fn get_center(&self) -> GLatLng {
        GLatLng::new(
            (self.south_west.lat + self.north_east.lat) / 2.0,
            (self.south_west.lng + self.north_east.lng) / 2.0,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GSize {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GIcon {
    pub url: String,
    pub size: Option<GSize>,
    pub anchor: Option<GPoint>,
    pub origin: Option<GPoint>,
    pub scaled_size: Option<GSize>,
}

/// Numeric control position codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GControlPosition(pub u8);

impl GControlPosition {
    pub const TOP_LEFT: GControlPosition = GControlPosition(1);
    pub const TOP_CENTER: GControlPosition = GControlPosition(2);
    pub const TOP_RIGHT: GControlPosition = GControlPosition(3);
    pub const LEFT_CENTER: GControlPosition = GControlPosition(4);
    pub const LEFT_TOP: GControlPosition = GControlPosition(5);
    pub const LEFT_BOTTOM: GControlPosition = GControlPosition(6);
    pub const RIGHT_TOP: GControlPosition = GControlPosition(7);
    pub const RIGHT_CENTER: GControlPosition = GControlPosition(8);
    pub const RIGHT_BOTTOM: GControlPosition = GControlPosition(9);
    pub const BOTTOM_LEFT: GControlPosition = GControlPosition(10);
    pub const BOTTOM_CENTER: GControlPosition = GControlPosition(11);
    pub const BOTTOM_RIGHT: GControlPosition = GControlPosition(12);
}

/// Map-type picker style codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GMapTypeControlStyle(pub u8);

impl GMapTypeControlStyle {
    pub const DEFAULT: GMapTypeControlStyle = GMapTypeControlStyle(0);
    pub const HORIZONTAL_BAR: GMapTypeControlStyle = GMapTypeControlStyle(1);
    pub const DROPDOWN_MENU: GMapTypeControlStyle = GMapTypeControlStyle(2);
}

/// Built-in map type ids
pub mod map_type_id {
    pub const HYBRID: &str = "hybrid";
    pub const ROADMAP: &str = "roadmap";
    pub const SATELLITE: &str = "satellite";
    pub const TERRAIN: &str = "terrain";
}

/// Mouse event passed to listeners
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GMouseEvent {
    pub lat_lng: Option<GLatLng>,
    pub pixel: Option<GPoint>,
}

pub type GHandler = Arc<dyn Fn(&GMouseEvent) + Send + Sync>;

/// Handle to a registered listener. Removing consumes it; dropping it
/// leaves the listener registered, as the script API does.
pub struct GListener {
    remover: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl GListener {
    pub fn new(remover: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            remover: Some(Box::new(remover)),
        }
    }

    pub fn remove(mut self) {
        if let Some(remover) = self.remover.take() {
            remover();
        }
    }
}

impl std::fmt::Debug for GListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("GListener")
    }
}

pub trait GEventTarget {
    fn add_listener(&self, event: &str, handler: GHandler) -> GListener;
}

#[derive(Debug, Clone, PartialEq)]
pub struct GMapTypeControlOptions {
    pub style: GMapTypeControlStyle,
    pub position: GControlPosition,
    pub map_type_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GMapOptions {
    pub center: GLatLng,
    pub zoom: f64,
    pub map_type_id: String,
    pub map_type_control: bool,
    pub map_type_control_options: GMapTypeControlOptions,
    pub zoom_control_position: GControlPosition,
    pub street_view_control: bool,
    pub scroll_wheel: bool,
    pub scale_control: bool,
    pub draggable: bool,
    /// Styling rules applied to the base map
    pub styles: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GMarkerOptions {
    pub position: GLatLng,
    pub icon: Option<GIcon>,
    pub title: Option<String>,
    pub clickable: bool,
    pub draggable: bool,
    pub visible: bool,
    pub z_index: i32,
}

/// Style patch for lines and shapes; `None` leaves a value untouched
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GShapeStyle {
    pub stroke_color: Option<String>,
    pub stroke_opacity: Option<f64>,
    pub stroke_weight: Option<f64>,
    pub fill_color: Option<String>,
    pub fill_opacity: Option<f64>,
    pub z_index: Option<i32>,
}

impl GShapeStyle {
    /// Overwrites every field `patch` sets
    pub fn merge(&mut self, patch: &GShapeStyle) {
        if patch.stroke_color.is_some() {
            self.stroke_color = patch.stroke_color.clone();
        }
        if patch.stroke_opacity.is_some() {
            self.stroke_opacity = patch.stroke_opacity;
        }
        if patch.stroke_weight.is_some() {
            self.stroke_weight = patch.stroke_weight;
        }
        if patch.fill_color.is_some() {
            self.fill_color = patch.fill_color.clone();
        }
        if patch.fill_opacity.is_some() {
            self.fill_opacity = patch.fill_opacity;
        }
        if patch.z_index.is_some() {
            self.z_index = patch.z_index;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GPolylineOptions {
    pub path: Vec<GLatLng>,
    pub style: GShapeStyle,
    pub clickable: bool,
    pub draggable: bool,
    pub editable: bool,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GPolygonOptions {
    pub paths: Vec<Vec<GLatLng>>,
    pub style: GShapeStyle,
    pub clickable: bool,
    pub draggable: bool,
    pub editable: bool,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GCircleOptions {
    pub center: GLatLng,
    pub radius: f64,
    pub style: GShapeStyle,
    pub clickable: bool,
    pub draggable: bool,
    pub editable: bool,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GInfoWindowOptions {
    pub content: String,
    pub position: Option<GLatLng>,
    pub disable_auto_pan: bool,
    pub max_width: Option<f64>,
    pub pixel_offset: Option<GSize>,
    pub z_index: i32,
}

/// A restyled copy of the road map registered under its own id
#[derive(Debug, Clone, PartialEq)]
pub struct GStyledMapType {
    pub name: String,
    pub styles: Vec<serde_json::Value>,
}

/// Image tiles drawn above the base map
#[derive(Debug, Clone, PartialEq)]
pub struct GImageMapType {
    pub name: String,
    pub url_template: String,
    pub opacity: f64,
    pub min_zoom: Option<f64>,
    pub max_zoom: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GClustererOptions {
    pub max_zoom: Option<f64>,
    pub grid_size: u32,
    pub minimum_cluster_size: usize,
}

/// The loaded library
pub trait GoogleMapsApi: Send + Sync {
    fn create_map(&self, options: &GMapOptions) -> Box<dyn GMap>;
}

pub trait GMap: GEventTarget + Send + Sync {
    /// `None` until the first tiles have been laid out
    fn get_bounds(&self) -> Option<GLatLngBounds>;
    fn get_center(&self) -> GLatLng;
    fn set_center(&self, center: GLatLng);
    fn pan_to(&self, center: GLatLng);
    fn fit_bounds(&self, bounds: GLatLngBounds);
    fn get_zoom(&self) -> f64;
    fn set_zoom(&self, zoom: f64);
    fn get_map_type_id(&self) -> String;
    fn set_map_type_id(&self, map_type_id: &str);
    fn register_map_type(&self, map_type_id: &str, map_type: GStyledMapType);
    fn trigger_resize(&self);
    fn add_control(&self, position: GControlPosition, id: &str, content: &str);

    fn push_overlay_map_type(&self, map_type: GImageMapType);
    fn remove_overlay_map_type(&self, name: &str) -> bool;
    fn set_overlay_map_type_opacity(&self, name: &str, opacity: f64);

    fn create_marker(&self, options: GMarkerOptions) -> Box<dyn GMarker>;
    fn create_polyline(&self, options: GPolylineOptions) -> Box<dyn GPolyline>;
    fn create_polygon(&self, options: GPolygonOptions) -> Box<dyn GPolygon>;
    fn create_circle(&self, options: GCircleOptions) -> Box<dyn GCircle>;
    fn create_info_window(&self, options: GInfoWindowOptions) -> Box<dyn GInfoWindow>;
    fn create_marker_clusterer(&self, options: GClustererOptions) -> Box<dyn GMarkerClusterer>;
}

pub trait GMarker: GEventTarget + Send + Sync {
    /// Identity of the native object, for passing it to other objects
    fn handle(&self) -> u64;
    fn get_position(&self) -> GLatLng;
    fn set_position(&self, position: GLatLng);
    fn set_icon(&self, icon: Option<GIcon>);
    fn set_title(&self, title: Option<String>);
    fn get_draggable(&self) -> bool;
    fn set_draggable(&self, draggable: bool);
    fn get_visible(&self) -> bool;
    fn set_visible(&self, visible: bool);
    fn set_z_index(&self, z_index: i32);
    /// Takes the marker off the map for good
    fn detach(&self);
}

pub trait GPolyline: GEventTarget + Send + Sync {
    fn handle(&self) -> u64;
    fn get_path(&self) -> Vec<GLatLng>;
    fn set_path(&self, path: Vec<GLatLng>);
    fn path_length(&self) -> usize;
    fn path_get_at(&self, index: usize) -> Option<GLatLng>;
    fn path_remove_at(&self, index: usize);
    fn path_insert_at(&self, index: usize, point: GLatLng);
    fn path_push(&self, point: GLatLng);
    fn path_set_at(&self, index: usize, point: GLatLng);
    fn set_options(&self, style: &GShapeStyle);
    fn set_draggable(&self, draggable: bool);
    fn set_editable(&self, editable: bool);
    fn set_visible(&self, visible: bool);
    fn detach(&self);
}

pub trait GPolygon: GEventTarget + Send + Sync {
    fn handle(&self) -> u64;
    fn get_paths(&self) -> Vec<Vec<GLatLng>>;
    fn set_paths(&self, paths: Vec<Vec<GLatLng>>);
    /// Replaces the first path only
    fn set_path(&self, path: Vec<GLatLng>);
    fn set_options(&self, style: &GShapeStyle);
    fn set_draggable(&self, draggable: bool);
    fn set_editable(&self, editable: bool);
    fn set_visible(&self, visible: bool);
    fn detach(&self);
}

pub trait GCircle: GEventTarget + Send + Sync {
    fn handle(&self) -> u64;
    fn get_center(&self) -> GLatLng;
    fn set_center(&self, center: GLatLng);
    fn get_radius(&self) -> f64;
    fn set_radius(&self, radius: f64);
    fn set_options(&self, style: &GShapeStyle);
    fn set_visible(&self, visible: bool);
    fn detach(&self);
}

pub trait GInfoWindow: GEventTarget + Send + Sync {
    fn handle(&self) -> u64;
    fn set_content(&self, content: &str);
    fn get_position(&self) -> Option<GLatLng>;
    fn set_position(&self, position: GLatLng);
    fn set_options(&self, options: &GInfoWindowOptions);
    fn set_z_index(&self, z_index: i32);
    /// Opens on the map, anchored to the marker with that handle if given
    fn open(&self, anchor: Option<u64>);
    fn close(&self);
}

pub trait GMarkerClusterer: Send + Sync {
    fn add_markers(&self, markers: &[u64]);
    fn remove_markers(&self, markers: &[u64]);
    fn clear_markers(&self);
    fn repaint(&self);
    fn get_max_zoom(&self) -> Option<f64>;
    fn set_max_zoom(&self, max_zoom: Option<f64>);
}
