//! Conversions between the abstract vocabulary and the commercial engine's
//!
//! The `From` impls convert single values. The `to_native_*` and
//! `from_native_*` functions are the nullable forms: `None` in, `None` out.
//! Enum tables fail with [`MapError::UnsupportedValue`] for values they do
//! not know.

use crate::{
    core::{
        bounds::Bounds,
        constants::HIGH_CONTRAST_MAP_TYPE_ID,
        geo::{Icon, LatLng, Point, Size},
        types::{MapControlPosition, MapControlStyle, MapType},
    },
    providers::google::native::{
        map_type_id, GControlPosition, GIcon, GLatLng, GLatLngBounds, GMapTypeControlStyle, GPoint,
        GSize,
    },
    MapError, Result,
};

impl From<&LatLng> for GLatLng {
    fn from(value: &LatLng) -> Self {
        GLatLng::new(value.lat, value.lng)
    }
}

impl From<&GLatLng> for LatLng {
    fn from(value: &GLatLng) -> Self {
        LatLng::new(value.lat(), value.lng())
    }
}

impl From<&Point> for GPoint {
    fn from(value: &Point) -> Self {
        GPoint {
            x: value.x,
            y: value.y,
        }
    }
}

impl From<&GPoint> for Point {
    fn from(value: &GPoint) -> Self {
        Point::new(value.x, value.y)
    }
}

impl From<&Size> for GSize {
    fn from(value: &Size) -> Self {
        GSize {
            width: value.width,
            height: value.height,
        }
    }
}

impl From<&GSize> for Size {
    fn from(value: &GSize) -> Self {
        Size::new(value.width, value.height)
    }
}

impl From<&Bounds> for GLatLngBounds {
    fn from(value: &Bounds) -> Self {
        GLatLngBounds::new((&value.south_west()).into(), (&value.north_east()).into())
    }
}

impl From<&GLatLngBounds> for Bounds {
    fn from(value: &GLatLngBounds) -> Self {
        let south_west = value.get_south_west();
        let north_east = value.get_north_east();
        Bounds::new(
            north_east.lat(),
            south_west.lng(),
            south_west.lat(),
            north_east.lng(),
        )
    }
}

impl From<&Icon> for GIcon {
    fn from(value: &Icon) -> Self {
        GIcon {
            url: value.url.clone(),
            size: value.size.as_ref().map(GSize::from),
            anchor: value.anchor.as_ref().map(GPoint::from),
            origin: value.origin.as_ref().map(GPoint::from),
            scaled_size: value.scaled_size.as_ref().map(GSize::from),
        }
    }
}

impl From<&GIcon> for Icon {
    fn from(value: &GIcon) -> Self {
        Icon {
            url: value.url.clone(),
            size: value.size.as_ref().map(Size::from),
            anchor: value.anchor.as_ref().map(Point::from),
            origin: value.origin.as_ref().map(Point::from),
            scaled_size: value.scaled_size.as_ref().map(Size::from),
        }
    }
}

pub fn to_native_lat_lng(value: Option<&LatLng>) -> Option<GLatLng> {
    value.map(GLatLng::from)
}

pub fn from_native_lat_lng(value: Option<&GLatLng>) -> Option<LatLng> {
    value.map(LatLng::from)
}

pub fn to_native_lat_lng_array(value: Option<&[LatLng]>) -> Option<Vec<GLatLng>> {
    value.map(|points| points.iter().map(GLatLng::from).collect())
}

pub fn from_native_lat_lng_array(value: Option<&[GLatLng]>) -> Option<Vec<LatLng>> {
    value.map(|points| points.iter().map(LatLng::from).collect())
}

pub fn to_native_lat_lng_array_array(value: Option<&[Vec<LatLng>]>) -> Option<Vec<Vec<GLatLng>>> {
    value.map(|paths| {
        paths
            .iter()
            .map(|path| path.iter().map(GLatLng::from).collect())
            .collect()
    })
}

pub fn from_native_lat_lng_array_array(value: Option<&[Vec<GLatLng>]>) -> Option<Vec<Vec<LatLng>>> {
    value.map(|paths| {
        paths
            .iter()
            .map(|path| path.iter().map(LatLng::from).collect())
            .collect()
    })
}

pub fn to_native_point(value: Option<&Point>) -> Option<GPoint> {
    value.map(GPoint::from)
}

pub fn from_native_point(value: Option<&GPoint>) -> Option<Point> {
    value.map(Point::from)
}

pub fn to_native_size(value: Option<&Size>) -> Option<GSize> {
    value.map(GSize::from)
}

pub fn from_native_size(value: Option<&GSize>) -> Option<Size> {
    value.map(Size::from)
}

pub fn to_native_bounds(value: Option<&Bounds>) -> Option<GLatLngBounds> {
    value.map(GLatLngBounds::from)
}

pub fn from_native_bounds(value: Option<&GLatLngBounds>) -> Option<Bounds> {
    value.map(Bounds::from)
}

pub fn to_native_icon(value: Option<&Icon>) -> Option<GIcon> {
    value.map(GIcon::from)
}

pub fn from_native_icon(value: Option<&GIcon>) -> Option<Icon> {
    value.map(Icon::from)
}

const CONTROL_POSITIONS: [(MapControlPosition, GControlPosition); 12] = [
    (MapControlPosition::TopLeft, GControlPosition::TOP_LEFT),
    (MapControlPosition::TopCentre, GControlPosition::TOP_CENTER),
    (MapControlPosition::TopRight, GControlPosition::TOP_RIGHT),
    (MapControlPosition::LeftTop, GControlPosition::LEFT_TOP),
    (MapControlPosition::LeftCentre, GControlPosition::LEFT_CENTER),
    (MapControlPosition::LeftBottom, GControlPosition::LEFT_BOTTOM),
    (MapControlPosition::RightTop, GControlPosition::RIGHT_TOP),
    (MapControlPosition::RightCentre, GControlPosition::RIGHT_CENTER),
    (MapControlPosition::RightBottom, GControlPosition::RIGHT_BOTTOM),
    (MapControlPosition::BottomLeft, GControlPosition::BOTTOM_LEFT),
    (MapControlPosition::BottomCentre, GControlPosition::BOTTOM_CENTER),
    (MapControlPosition::BottomRight, GControlPosition::BOTTOM_RIGHT),
];

pub fn to_native_control_position(value: MapControlPosition) -> Result<GControlPosition> {
    CONTROL_POSITIONS
        .iter()
        .find(|(position, _)| *position == value)
        .map(|(_, native)| *native)
        .ok_or_else(|| MapError::unsupported("control position", format!("{:?}", value)))
}

pub fn from_native_control_position(value: GControlPosition) -> Result<MapControlPosition> {
    CONTROL_POSITIONS
        .iter()
        .find(|(_, native)| *native == value)
        .map(|(position, _)| *position)
        .ok_or_else(|| MapError::unsupported("control position", value.0))
}

pub fn to_native_control_style(value: MapControlStyle) -> GMapTypeControlStyle {
    match value {
        MapControlStyle::Default => GMapTypeControlStyle::DEFAULT,
        MapControlStyle::DropdownMenu => GMapTypeControlStyle::DROPDOWN_MENU,
        MapControlStyle::HorizontalBar => GMapTypeControlStyle::HORIZONTAL_BAR,
    }
}

pub fn from_native_control_style(value: GMapTypeControlStyle) -> Result<MapControlStyle> {
    match value {
        GMapTypeControlStyle::DEFAULT => Ok(MapControlStyle::Default),
        GMapTypeControlStyle::DROPDOWN_MENU => Ok(MapControlStyle::DropdownMenu),
        GMapTypeControlStyle::HORIZONTAL_BAR => Ok(MapControlStyle::HorizontalBar),
        other => Err(MapError::unsupported("map type control style", other.0)),
    }
}

const MAP_TYPES: [(MapType, &str); 5] = [
    (MapType::Hybrid, map_type_id::HYBRID),
    (MapType::RoadMap, map_type_id::ROADMAP),
    (MapType::Satellite, map_type_id::SATELLITE),
    (MapType::Terrain, map_type_id::TERRAIN),
    (MapType::HighContrast, HIGH_CONTRAST_MAP_TYPE_ID),
];

/// Native id for `value`. With `suppress_error` an unmapped type yields
/// `Ok(None)`.
pub fn to_native_map_type(value: MapType, suppress_error: bool) -> Result<Option<&'static str>> {
    match MAP_TYPES.iter().find(|(map_type, _)| *map_type == value) {
        Some((_, id)) => Ok(Some(*id)),
        None if suppress_error => Ok(None),
        None => Err(MapError::unsupported("map type", value)),
    }
}

/// Abstract type for a native id. With `suppress_error` an unknown id
/// yields `Ok(None)`.
pub fn from_native_map_type(value: &str, suppress_error: bool) -> Result<Option<MapType>> {
    match MAP_TYPES.iter().find(|(_, id)| *id == value) {
        Some((map_type, _)) => Ok(Some(*map_type)),
        None if suppress_error => Ok(None),
        None => Err(MapError::unsupported("map type", value)),
    }
}
