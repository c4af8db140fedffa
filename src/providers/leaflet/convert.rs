//! Conversions between the abstract vocabulary and the tile engine's
//!
//! The engine uses one point type for offsets and sizes and has no sprite
//! origin, so icons lose `origin` on the way in and come back with a single
//! size. Bounds are read back from their north-west and south-east corners.

use crate::{
    core::{
        bounds::Bounds,
        constants::HIGH_CONTRAST_MAP_TYPE_ID,
        geo::{Icon, LatLng, Point, Size},
        types::{MapControlPosition, MapType},
    },
    providers::leaflet::native::{LControlPosition, LIcon, LLatLng, LLatLngBounds, LPoint},
    MapError, Result,
};

/// Name of the plain tile layer
pub const ROADMAP_LAYER: &str = "roadmap";

impl From<&LatLng> for LLatLng {
    fn from(value: &LatLng) -> Self {
        LLatLng::new(value.lat, value.lng)
    }
}

impl From<&LLatLng> for LatLng {
    fn from(value: &LLatLng) -> Self {
        LatLng::new(value.lat, value.lng)
    }
}

impl From<&Point> for LPoint {
    fn from(value: &Point) -> Self {
        LPoint::new(value.x, value.y)
    }
}

impl From<&LPoint> for Point {
    fn from(value: &LPoint) -> Self {
        Point::new(value.x, value.y)
    }
}

impl From<&Size> for LPoint {
    fn from(value: &Size) -> Self {
        LPoint::new(value.width, value.height)
    }
}

impl From<&LPoint> for Size {
    fn from(value: &LPoint) -> Self {
        Size::new(value.x, value.y)
    }
}

impl From<&Bounds> for LLatLngBounds {
    fn from(value: &Bounds) -> Self {
        LLatLngBounds::from_corners((&value.top_left()).into(), (&value.bottom_right()).into())
    }
}

impl From<&LLatLngBounds> for Bounds {
    fn from(value: &LLatLngBounds) -> Self {
        Bounds::from_corners(
            (&value.get_north_west()).into(),
            (&value.get_south_east()).into(),
        )
    }
}

impl From<&Icon> for LIcon {
    fn from(value: &Icon) -> Self {
        LIcon {
            icon_url: value.url.clone(),
            icon_size: value.scaled_size.or(value.size).as_ref().map(LPoint::from),
            icon_anchor: value.anchor.as_ref().map(LPoint::from),
        }
    }
}

impl From<&LIcon> for Icon {
    fn from(value: &LIcon) -> Self {
        Icon {
            url: value.icon_url.clone(),
            size: value.icon_size.as_ref().map(Size::from),
            anchor: value.icon_anchor.as_ref().map(Point::from),
            origin: None,
            scaled_size: None,
        }
    }
}

pub fn to_native_lat_lng(value: Option<&LatLng>) -> Option<LLatLng> {
    value.map(LLatLng::from)
}

pub fn from_native_lat_lng(value: Option<&LLatLng>) -> Option<LatLng> {
    value.map(LatLng::from)
}

pub fn to_native_lat_lng_array(value: Option<&[LatLng]>) -> Option<Vec<LLatLng>> {
    value.map(|points| points.iter().map(LLatLng::from).collect())
}

pub fn from_native_lat_lng_array(value: Option<&[LLatLng]>) -> Option<Vec<LatLng>> {
    value.map(|points| points.iter().map(LatLng::from).collect())
}

pub fn to_native_point(value: Option<&Point>) -> Option<LPoint> {
    value.map(LPoint::from)
}

pub fn from_native_point(value: Option<&LPoint>) -> Option<Point> {
    value.map(Point::from)
}

pub fn to_native_size(value: Option<&Size>) -> Option<LPoint> {
    value.map(LPoint::from)
}

pub fn from_native_size(value: Option<&LPoint>) -> Option<Size> {
    value.map(Size::from)
}

pub fn to_native_bounds(value: Option<&Bounds>) -> Option<LLatLngBounds> {
    value.map(LLatLngBounds::from)
}

pub fn from_native_bounds(value: Option<&LLatLngBounds>) -> Option<Bounds> {
    value.map(Bounds::from)
}

pub fn to_native_icon(value: Option<&Icon>) -> Option<LIcon> {
    value.map(LIcon::from)
}

pub fn from_native_icon(value: Option<&LIcon>) -> Option<Icon> {
    value.map(Icon::from)
}

/// Every abstract position folds onto the nearest corner
pub fn to_native_control_position(value: MapControlPosition) -> Result<LControlPosition> {
    use MapControlPosition::*;
    Ok(match value {
        TopLeft | TopCentre | LeftTop | LeftCentre => LControlPosition::TopLeft,
        TopRight | RightTop | RightCentre => LControlPosition::TopRight,
        BottomLeft | BottomCentre | LeftBottom => LControlPosition::BottomLeft,
        BottomRight | RightBottom => LControlPosition::BottomRight,
    })
}

/// The canonical abstract position for a corner name
pub fn from_native_control_position(value: &str) -> Result<MapControlPosition> {
    match LControlPosition::parse(value) {
        Some(LControlPosition::TopLeft) => Ok(MapControlPosition::TopLeft),
        Some(LControlPosition::TopRight) => Ok(MapControlPosition::TopRight),
        Some(LControlPosition::BottomLeft) => Ok(MapControlPosition::BottomLeft),
        Some(LControlPosition::BottomRight) => Ok(MapControlPosition::BottomRight),
        None => Err(MapError::unsupported("control position", value)),
    }
}

const MAP_TYPES: [(MapType, &str); 2] = [
    (MapType::RoadMap, ROADMAP_LAYER),
    (MapType::HighContrast, HIGH_CONTRAST_MAP_TYPE_ID),
];

/// Base layer name for `value`. Only the road map and its high contrast
/// restyling exist here.
pub fn to_native_map_type(value: MapType, suppress_error: bool) -> Result<Option<&'static str>> {
    match MAP_TYPES.iter().find(|(map_type, _)| *map_type == value) {
        Some((_, name)) => Ok(Some(*name)),
        None if suppress_error => Ok(None),
        None => Err(MapError::unsupported("map type", value)),
    }
}

pub fn from_native_map_type(value: &str, suppress_error: bool) -> Result<Option<MapType>> {
    match MAP_TYPES.iter().find(|(_, name)| *name == value) {
        Some((map_type, _)) => Ok(Some(*map_type)),
        None if suppress_error => Ok(None),
        None => Err(MapError::unsupported("map type", value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_read_back_from_corners() {
        let bounds = Bounds::new(52.0, -1.0, 50.0, 2.0);
        let native = LLatLngBounds::from(&bounds);
        assert_eq!(native.get_north_west(), LLatLng::new(52.0, -1.0));
        assert_eq!(native.get_south_east(), LLatLng::new(50.0, 2.0));
        assert_eq!(Bounds::from(&native), bounds);
    }

    #[test]
    fn test_inverted_bounds_are_normalised() {
        let inverted = Bounds::new(50.0, 2.0, 52.0, -1.0);
        let back = from_native_bounds(to_native_bounds(Some(&inverted)).as_ref()).unwrap();
        assert_eq!(back, Bounds::new(52.0, -1.0, 50.0, 2.0));
    }

    #[test]
    fn test_icon_conversion_is_lossy() {
        let icon = Icon::new("plane.png")
            .with_size(Size::new(20.0, 20.0))
            .with_scaled_size(Size::new(40.0, 40.0))
            .with_origin(Point::new(5.0, 5.0))
            .with_anchor(Point::new(20.0, 20.0));

        let native = LIcon::from(&icon);
        assert_eq!(native.icon_size, Some(LPoint::new(40.0, 40.0)));

        let back = Icon::from(&native);
        assert_eq!(back.size, Some(Size::new(40.0, 40.0)));
        assert_eq!(back.anchor, Some(Point::new(20.0, 20.0)));
        assert!(back.origin.is_none());
        assert!(back.scaled_size.is_none());
    }

    #[test]
    fn test_nullable_forms() {
        assert!(to_native_lat_lng(None).is_none());
        assert!(from_native_icon(None).is_none());
        let path = [LatLng::new(1.0, 2.0), LatLng::new(3.0, 4.0)];
        let native = to_native_lat_lng_array(Some(&path)).unwrap();
        assert_eq!(from_native_lat_lng_array(Some(&native)).unwrap(), path.to_vec());
        assert_eq!(
            from_native_size(to_native_size(Some(&Size::new(3.0, 4.0))).as_ref()),
            Some(Size::new(3.0, 4.0))
        );
    }

    #[test]
    fn test_control_positions_fold_to_corners() {
        assert_eq!(
            to_native_control_position(MapControlPosition::TopCentre).unwrap(),
            LControlPosition::TopLeft
        );
        assert_eq!(
            to_native_control_position(MapControlPosition::RightBottom).unwrap(),
            LControlPosition::BottomRight
        );
        assert_eq!(
            from_native_control_position("topright").unwrap(),
            MapControlPosition::TopRight
        );
        assert!(matches!(
            from_native_control_position("centre"),
            Err(MapError::UnsupportedValue { .. })
        ));
    }

    #[test]
    fn test_map_types() {
        assert_eq!(to_native_map_type(MapType::RoadMap, false).unwrap(), Some("roadmap"));
        assert_eq!(to_native_map_type(MapType::Satellite, true).unwrap(), None);
        assert!(to_native_map_type(MapType::Terrain, false).is_err());
        assert_eq!(
            from_native_map_type("high-contrast", false).unwrap(),
            Some(MapType::HighContrast)
        );
        assert_eq!(from_native_map_type("satellite", true).unwrap(), None);
    }
}
