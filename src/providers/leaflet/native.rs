//! The tile-based engine's object model
//!
//! Layers are created detached from the map and added to it; removing a
//! layer is the only way to hide it. Events are subscribed with `on` and
//! unsubscribed with `off`, matching on the handler's identity.

use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LLatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LLatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Always stored normalised, whichever corners it was built from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LLatLngBounds {
    south_west: LLatLng,
    north_east: LLatLng,
}

impl LLatLngBounds {
    /// Bounds enclosing two opposite corners, given in any order
    pub fn from_corners(a: LLatLng, b: LLatLng) -> Self {
        Self {
            south_west: LLatLng::new(a.lat.min(b.lat), a.lng.min(b.lng)),
            north_east: LLatLng::new(a.lat.max(b.lat), a.lng.max(b.lng)),
        }
    }

    pub fn get_south_west(&self) -> LLatLng {
        self.south_west
    }

    pub fn get_north_east(&self) -> LLatLng {
        self.north_east
    }

    pub fn get_north_west(&self) -> LLatLng {
        LLatLng::new(self.north_east.lat, self.south_west.lng)
    }

    pub fn get_south_east(&self) -> LLatLng {
        LLatLng::new(self.south_west.lat, self.north_east.lng)
    }

    pub fn get_center(&self) -> LLatLng {
        LLatLng::new(
            (self.south_west.lat + self.north_east.lat) / 2.0,
            (self.south_west.lng + self.north_east.lng) / 2.0,
        )
    }
}

/// Screen offsets and sizes alike
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LPoint {
    pub x: f64,
    pub y: f64,
}

impl LPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LIcon {
    pub icon_url: String,
    pub icon_size: Option<LPoint>,
    pub icon_anchor: Option<LPoint>,
}

impl LIcon {
    /// The library's stock pin
    pub fn default_marker() -> Self {
        Self {
            icon_url: "marker-icon.png".to_string(),
            icon_size: Some(LPoint::new(25.0, 41.0)),
            icon_anchor: Some(LPoint::new(12.0, 41.0)),
        }
    }
}

/// The four corners controls can be placed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LControlPosition {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl LControlPosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            LControlPosition::TopLeft => "topleft",
            LControlPosition::TopRight => "topright",
            LControlPosition::BottomLeft => "bottomleft",
            LControlPosition::BottomRight => "bottomright",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "topleft" => Some(LControlPosition::TopLeft),
            "topright" => Some(LControlPosition::TopRight),
            "bottomleft" => Some(LControlPosition::BottomLeft),
            "bottomright" => Some(LControlPosition::BottomRight),
            _ => None,
        }
    }
}

impl fmt::Display for LControlPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LMouseEvent {
    pub latlng: Option<LLatLng>,
    pub container_point: Option<LPoint>,
}

pub type LHandler = Arc<dyn Fn(&LMouseEvent) + Send + Sync>;

pub trait LEvented {
    fn on(&self, event: &str, handler: LHandler);
    /// Removes the subscription whose handler is the same `Arc`
    fn off(&self, event: &str, handler: &LHandler);
}

#[derive(Debug, Clone, PartialEq)]
pub struct LMapOptions {
    pub center: LLatLng,
    pub zoom: f64,
    pub zoom_control_position: LControlPosition,
    pub scroll_wheel_zoom: bool,
    pub dragging: bool,
    pub scale_control: bool,
    /// Where the base layer picker goes; `None` for no picker
    pub layers_control_position: Option<LControlPosition>,
    /// Names offered by the base layer picker
    pub base_layers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LTileLayerOptions {
    pub name: String,
    pub url: String,
    pub attribution: String,
    pub subdomains: Vec<String>,
    pub min_zoom: Option<f64>,
    pub max_zoom: Option<f64>,
    pub class_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LMarkerOptions {
    pub icon: LIcon,
    pub title: Option<String>,
    pub draggable: bool,
    pub interactive: bool,
    pub z_index_offset: i32,
}

/// Path style patch; `None` leaves a value untouched
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LPathStyle {
    pub color: Option<String>,
    pub opacity: Option<f64>,
    pub weight: Option<f64>,
    pub fill_color: Option<String>,
    pub fill_opacity: Option<f64>,
}

impl LPathStyle {
    /// Overwrites every field `patch` sets
    pub fn merge(&mut self, patch: &LPathStyle) {
        if patch.color.is_some() {
            self.color = patch.color.clone();
        }
        if patch.opacity.is_some() {
            self.opacity = patch.opacity;
        }
        if patch.weight.is_some() {
            self.weight = patch.weight;
        }
        if patch.fill_color.is_some() {
            self.fill_color = patch.fill_color.clone();
        }
        if patch.fill_opacity.is_some() {
            self.fill_opacity = patch.fill_opacity;
        }
    }
}

/// The loaded library
pub trait LeafletApi: Send + Sync {
    fn create_map(&self, options: &LMapOptions) -> Box<dyn LMap>;
}

pub trait LMap: LEvented + Send + Sync {
    /// `None` while the container has no size
    fn get_bounds(&self) -> Option<LLatLngBounds>;
    fn get_center(&self) -> LLatLng;
    fn get_zoom(&self) -> f64;
    fn set_view(&self, center: LLatLng, zoom: f64);
    fn set_zoom(&self, zoom: f64);
    fn pan_to(&self, center: LLatLng);
    fn fit_bounds(&self, bounds: LLatLngBounds);
    fn invalidate_size(&self);

    /// Replaces the base tile layer
    fn set_base_layer(&self, options: LTileLayerOptions);
    fn base_layer(&self) -> Option<String>;
    /// CSS filter applied to the base layer's tiles
    fn set_tile_filter(&self, filter: Option<String>);
    fn add_control(&self, position: LControlPosition, id: &str, content: &str);

    /// Layers are created detached; call `add_to_map` to show them
    fn create_marker(&self, position: LLatLng, options: LMarkerOptions) -> Box<dyn LMarker>;
    fn create_polyline(&self, latlngs: Vec<LLatLng>, style: LPathStyle, interactive: bool) -> Box<dyn LPolyline>;
    fn create_circle(&self, center: LLatLng, radius: f64, style: LPathStyle, interactive: bool) -> Box<dyn LCircle>;

    /// Tears the map down
    fn remove(&self);
}

pub trait LLayer: LEvented + Send + Sync {
    fn handle(&self) -> u64;
    fn add_to_map(&self);
    fn remove_from_map(&self);
    fn is_on_map(&self) -> bool;
}

pub trait LMarker: LLayer {
    fn get_lat_lng(&self) -> LLatLng;
    fn set_lat_lng(&self, position: LLatLng);
    fn set_icon(&self, icon: LIcon);
    fn set_z_index_offset(&self, offset: i32);
    /// The layer's drag handler
    fn set_dragging(&self, enabled: bool);
    fn bind_tooltip(&self, content: &str);
    fn unbind_tooltip(&self);
}

pub trait LPolyline: LLayer {
    /// Copies the whole path
    fn get_lat_lngs(&self) -> Vec<LLatLng>;
    fn lat_lngs_len(&self) -> usize;
    fn lat_lng_at(&self, index: usize) -> Option<LLatLng>;
    fn set_lat_lngs(&self, latlngs: Vec<LLatLng>);
    /// Removes `delete_count` points at `start` and inserts `insert` there
    fn splice_lat_lngs(&self, start: usize, delete_count: usize, insert: Vec<LLatLng>);
    fn set_style(&self, style: &LPathStyle);
}

pub trait LCircle: LLayer {
    fn get_lat_lng(&self) -> LLatLng;
    fn set_lat_lng(&self, center: LLatLng);
    fn get_radius(&self) -> f64;
    fn set_radius(&self, radius: f64);
    fn set_style(&self, style: &LPathStyle);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_normalise_corners() {
        let bounds = LLatLngBounds::from_corners(LLatLng::new(50.0, 2.0), LLatLng::new(52.0, -1.0));
        assert_eq!(bounds.get_south_west(), LLatLng::new(50.0, -1.0));
        assert_eq!(bounds.get_north_east(), LLatLng::new(52.0, 2.0));
        assert_eq!(bounds.get_north_west(), LLatLng::new(52.0, -1.0));
        assert_eq!(bounds.get_south_east(), LLatLng::new(50.0, 2.0));
        assert_eq!(bounds.get_center(), LLatLng::new(51.0, 0.5));
    }

    #[test]
    fn test_control_position_strings() {
        for position in [
            LControlPosition::TopLeft,
            LControlPosition::TopRight,
            LControlPosition::BottomLeft,
            LControlPosition::BottomRight,
        ] {
            assert_eq!(LControlPosition::parse(position.as_str()), Some(position));
        }
        assert_eq!(LControlPosition::parse("middle"), None);
    }
}
