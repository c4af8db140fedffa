//! Overlay wrapper traits
//!
//! Each provider implements these over its own native overlay objects. A
//! wrapper caches the style values its native engine cannot report back;
//! for those properties the cache is the only source of truth, and every
//! setter is a no-op when the new value equals the cached one.

#[macro_use]
pub(crate) mod macros;
pub(crate) mod registry;

use crate::core::{
    geo::{Icon, LatLng, Size},
    types::{OverlayId, Tag},
};

/// Identity and caller bookkeeping shared by every overlay
pub trait Overlay {
    /// The caller's id; `None` once the overlay has been destroyed
    fn id(&self) -> Option<&OverlayId>;

    fn is_destroyed(&self) -> bool {
        self.id().is_none()
    }

    fn tag(&self) -> Option<&Tag>;

    fn set_tag(&mut self, tag: Option<Tag>);
}

pub trait MapMarker: Overlay + Send {
    fn position(&self) -> LatLng;
    fn set_position(&mut self, position: LatLng);

    fn icon(&self) -> Option<&Icon>;
    fn set_icon(&mut self, icon: Option<Icon>);

    fn tooltip(&self) -> Option<&str>;
    fn set_tooltip(&mut self, tooltip: Option<String>);

    fn is_clickable(&self) -> bool;

    fn is_draggable(&self) -> bool;
    fn set_draggable(&mut self, draggable: bool);

    fn is_visible(&self) -> bool;
    fn set_visible(&mut self, visible: bool);

    fn z_index(&self) -> i32;
    fn set_z_index(&mut self, z_index: i32);
}

pub trait MapPolyline: Overlay + Send {
    fn path(&self) -> Vec<LatLng>;
    fn set_path(&mut self, path: Vec<LatLng>);
    fn path_len(&self) -> usize;
    fn first_point(&self) -> Option<LatLng>;
    fn last_point(&self) -> Option<LatLng>;

    fn stroke_colour(&self) -> &str;
    fn set_stroke_colour(&mut self, colour: &str);

    fn stroke_opacity(&self) -> f64;
    fn set_stroke_opacity(&mut self, opacity: f64);

    fn stroke_weight(&self) -> f64;
    fn set_stroke_weight(&mut self, weight: f64);

    fn is_draggable(&self) -> bool;
    fn set_draggable(&mut self, draggable: bool);

    fn is_editable(&self) -> bool;
    fn set_editable(&mut self, editable: bool);

    fn is_visible(&self) -> bool;
    fn set_visible(&mut self, visible: bool);

    fn z_index(&self) -> i32;
    fn set_z_index(&mut self, z_index: i32);
}

pub trait MapPolygon: Overlay + Send {
    fn paths(&self) -> Vec<Vec<LatLng>>;
    fn set_paths(&mut self, paths: Vec<Vec<LatLng>>);

    fn first_path(&self) -> Vec<LatLng> {
        self.paths().into_iter().next().unwrap_or_default()
    }
    fn set_first_path(&mut self, path: Vec<LatLng>);

    fn is_clickable(&self) -> bool;

    fn fill_colour(&self) -> &str;
    fn set_fill_colour(&mut self, colour: &str);

    fn fill_opacity(&self) -> f64;
    fn set_fill_opacity(&mut self, opacity: f64);

    fn stroke_colour(&self) -> &str;
    fn set_stroke_colour(&mut self, colour: &str);

    fn stroke_opacity(&self) -> f64;
    fn set_stroke_opacity(&mut self, opacity: f64);

    fn stroke_weight(&self) -> f64;
    fn set_stroke_weight(&mut self, weight: f64);

    fn is_draggable(&self) -> bool;
    fn set_draggable(&mut self, draggable: bool);

    fn is_editable(&self) -> bool;
    fn set_editable(&mut self, editable: bool);

    fn is_visible(&self) -> bool;
    fn set_visible(&mut self, visible: bool);

    fn z_index(&self) -> i32;
    fn set_z_index(&mut self, z_index: i32);
}

pub trait MapCircle: Overlay + Send {
    fn center(&self) -> LatLng;
    fn set_center(&mut self, center: LatLng);

    /// Radius in metres
    fn radius(&self) -> f64;
    fn set_radius(&mut self, radius: f64);

    fn fill_colour(&self) -> &str;
    fn set_fill_colour(&mut self, colour: &str);

    fn fill_opacity(&self) -> f64;
    fn set_fill_opacity(&mut self, opacity: f64);

    fn stroke_colour(&self) -> &str;
    fn set_stroke_colour(&mut self, colour: &str);

    fn stroke_opacity(&self) -> f64;
    fn set_stroke_opacity(&mut self, opacity: f64);

    fn stroke_weight(&self) -> f64;
    fn set_stroke_weight(&mut self, weight: f64);

    fn is_visible(&self) -> bool;
    fn set_visible(&mut self, visible: bool);

    fn z_index(&self) -> i32;
    fn set_z_index(&mut self, z_index: i32);
}

/// Opening and closing go through the adapter, which can resolve the
/// anchor marker.
pub trait MapInfoWindow: Overlay + Send {
    fn content(&self) -> &str;
    fn set_content(&mut self, content: String);

    fn position(&self) -> Option<LatLng>;
    fn set_position(&mut self, position: LatLng);

    fn is_open(&self) -> bool;

    fn disable_auto_pan(&self) -> bool;
    fn set_disable_auto_pan(&mut self, disable: bool);

    fn max_width(&self) -> Option<f64>;
    fn set_max_width(&mut self, max_width: Option<f64>);

    fn pixel_offset(&self) -> Option<Size>;
    fn set_pixel_offset(&mut self, offset: Option<Size>);

    fn z_index(&self) -> i32;
    fn set_z_index(&mut self, z_index: i32);
}

/// Stores `value` in `slot` and reports whether it differed
pub(crate) fn replace_if_changed<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

/// Index of `index` in a path of `len` points, where -1 means the last
/// point. `None` when out of range.
pub(crate) fn resolve_path_index(index: isize, len: usize) -> Option<usize> {
    let resolved = if index < 0 {
        len.checked_sub(index.unsigned_abs())?
    } else {
        index as usize
    };
    (resolved < len).then_some(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_if_changed() {
        let mut colour = "#000000".to_string();
        assert!(!replace_if_changed(&mut colour, "#000000".to_string()));
        assert!(replace_if_changed(&mut colour, "#ff0000".to_string()));
        assert_eq!(colour, "#ff0000");
    }

    #[test]
    fn test_resolve_path_index() {
        assert_eq!(resolve_path_index(-1, 3), Some(2));
        assert_eq!(resolve_path_index(-3, 3), Some(0));
        assert_eq!(resolve_path_index(-4, 3), None);
        assert_eq!(resolve_path_index(0, 3), Some(0));
        assert_eq!(resolve_path_index(3, 3), None);
        assert_eq!(resolve_path_index(-1, 0), None);
    }
}
