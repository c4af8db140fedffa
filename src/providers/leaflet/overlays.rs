//! Overlay wrappers over the tile engine's layers
//!
//! The engine has no visibility flag, so hiding a layer removes it from
//! the map and showing it adds it back. Flags the engine has no notion of
//! (line dragging and editing, path stacking) are kept in the cache only.

use crate::{
    core::{
        geo::{Icon, LatLng},
        options::{CircleOptions, MarkerOptions, PolylineOptions, TrimResult},
        types::{OverlayId, Tag},
    },
    overlays::{registry::Destroy, resolve_path_index, MapCircle, MapMarker, MapPolyline},
    providers::leaflet::native::{LCircle, LHandler, LIcon, LLatLng, LLayer, LMarker, LPathStyle, LPolyline},
};

/// Shows or hides a layer by attaching it to or detaching it from the map
fn set_layer_visible<L: LLayer + ?Sized>(layer: &L, visible: bool) {
    match (visible, layer.is_on_map()) {
        (true, false) => layer.add_to_map(),
        (false, true) => layer.remove_from_map(),
        _ => {}
    }
}

/// The stock pin stands in for a missing icon
pub(crate) fn native_icon(icon: Option<&Icon>) -> LIcon {
    icon.map(LIcon::from).unwrap_or_else(LIcon::default_marker)
}

pub struct LeafletMarker {
    id: Option<OverlayId>,
    tag: Option<Tag>,
    native: Option<Box<dyn LMarker>>,
    handlers: Vec<(&'static str, LHandler)>,
    position: LatLng,
    icon: Option<Icon>,
    tooltip: Option<String>,
    clickable: bool,
    draggable: bool,
    visible: bool,
    z_index: i32,
}

impl LeafletMarker {
    /// Takes a detached marker and puts it on the map unless it starts
    /// hidden
    pub(crate) fn new(
        id: OverlayId,
        native: Box<dyn LMarker>,
        handlers: Vec<(&'static str, LHandler)>,
        options: MarkerOptions,
    ) -> Self {
        if options.visible {
            native.add_to_map();
        }
        Self {
            id: Some(id),
            tag: options.tag,
            native: Some(native),
            handlers,
            position: options.position,
            icon: options.icon,
            tooltip: options.tooltip,
            clickable: options.clickable,
            draggable: options.draggable,
            visible: options.visible,
            z_index: options.z_index,
        }
    }
}

impl_overlay!(LeafletMarker);

impl MapMarker for LeafletMarker {
    fn position(&self) -> LatLng {
        match &self.native {
            Some(native) => LatLng::from(&native.get_lat_lng()),
            None => self.position,
        }
    }

    fn set_position(&mut self, position: LatLng) {
        if self.position() != position {
            self.position = position;
            if let Some(native) = &self.native {
                native.set_lat_lng(LLatLng::from(&position));
            }
        }
    }

    fn icon(&self) -> Option<&Icon> {
        self.icon.as_ref()
    }

    cached_setter!(set_icon, icon: Option<Icon>, |this, icon| {
        if let Some(native) = &this.native {
            native.set_icon(native_icon(icon.as_ref()));
        }
    });

    fn tooltip(&self) -> Option<&str> {
        self.tooltip.as_deref()
    }

    cached_setter!(set_tooltip, tooltip: Option<String>, |this, tooltip| {
        if let Some(native) = &this.native {
            native.unbind_tooltip();
            if let Some(text) = &tooltip {
                native.bind_tooltip(text);
            }
        }
    });

    fn is_clickable(&self) -> bool {
        self.clickable
    }

    fn is_draggable(&self) -> bool {
        self.draggable
    }

    cached_setter!(set_draggable, draggable: bool, |this, draggable| {
        if let Some(native) = &this.native {
            native.set_dragging(draggable);
        }
    });

    fn is_visible(&self) -> bool {
        self.visible
    }

    cached_setter!(set_visible, visible: bool, |this, visible| {
        if let Some(native) = &this.native {
            set_layer_visible(native.as_ref(), visible);
        }
    });

    fn z_index(&self) -> i32 {
        self.z_index
    }

    cached_setter!(set_z_index, z_index: i32, |this, z_index| {
        if let Some(native) = &this.native {
            native.set_z_index_offset(z_index);
        }
    });
}

impl Destroy for LeafletMarker {
    fn destroy(&mut self) {
        if let Some(native) = self.native.take() {
            for (event, handler) in self.handlers.drain(..) {
                native.off(event, &handler);
            }
            self.position = LatLng::from(&native.get_lat_lng());
            native.remove_from_map();
        }
        self.tag = None;
        self.id = None;
    }
}

pub struct LeafletPolyline {
    id: Option<OverlayId>,
    tag: Option<Tag>,
    native: Option<Box<dyn LPolyline>>,
    stroke_colour: String,
    stroke_opacity: f64,
    stroke_weight: f64,
    draggable: bool,
    editable: bool,
    visible: bool,
    z_index: i32,
}

impl LeafletPolyline {
    pub(crate) fn new(id: OverlayId, native: Box<dyn LPolyline>, options: PolylineOptions) -> Self {
        if options.visible {
            native.add_to_map();
        }
        Self {
            id: Some(id),
            tag: options.tag,
            native: Some(native),
            stroke_colour: options.stroke_colour,
            stroke_opacity: options.stroke_opacity,
            stroke_weight: options.stroke_weight,
            draggable: options.draggable,
            editable: options.editable,
            visible: options.visible,
            z_index: options.z_index,
        }
    }

    fn restyle(&self, patch: LPathStyle) {
        if let Some(native) = &self.native {
            native.set_style(&patch);
        }
    }

    /// Removes up to `count` points from one end in a single splice
    pub(crate) fn trim(&mut self, count: usize, from_start: bool) -> TrimResult {
        let Some(native) = &self.native else {
            return TrimResult::default();
        };
        let length = native.lat_lngs_len();
        let remove = count.min(length);
        if remove > 0 {
            let start = if from_start { 0 } else { length - remove };
            native.splice_lat_lngs(start, remove, Vec::new());
        }
        TrimResult {
            emptied: length < count,
            count_removed: remove,
        }
    }

    pub(crate) fn remove_point_at(&mut self, index: isize) {
        if let Some(native) = &self.native {
            if let Some(index) = resolve_path_index(index, native.lat_lngs_len()) {
                native.splice_lat_lngs(index, 1, Vec::new());
            }
        }
    }

    pub(crate) fn append(&mut self, points: &[LatLng], to_start: bool) {
        let Some(native) = &self.native else {
            return;
        };
        if points.is_empty() {
            return;
        }
        let insert: Vec<LLatLng> = points.iter().map(LLatLng::from).collect();
        let at = if to_start { 0 } else { native.lat_lngs_len() };
        native.splice_lat_lngs(at, 0, insert);
    }

    pub(crate) fn replace_point_at(&mut self, index: isize, point: LatLng) {
        if let Some(native) = &self.native {
            if let Some(index) = resolve_path_index(index, native.lat_lngs_len()) {
                native.splice_lat_lngs(index, 1, vec![LLatLng::from(&point)]);
            }
        }
    }
}

impl_overlay!(LeafletPolyline);

impl MapPolyline for LeafletPolyline {
    fn path(&self) -> Vec<LatLng> {
        self.native
            .as_ref()
            .map(|n| n.get_lat_lngs().iter().map(LatLng::from).collect())
            .unwrap_or_default()
    }

    fn set_path(&mut self, path: Vec<LatLng>) {
        if self.path() != path {
            if let Some(native) = &self.native {
                native.set_lat_lngs(path.iter().map(LLatLng::from).collect());
            }
        }
    }

    fn path_len(&self) -> usize {
        self.native.as_ref().map_or(0, |n| n.lat_lngs_len())
    }

    fn first_point(&self) -> Option<LatLng> {
        let native = self.native.as_ref()?;
        native.lat_lng_at(0).as_ref().map(LatLng::from)
    }

    fn last_point(&self) -> Option<LatLng> {
        let native = self.native.as_ref()?;
        let last = native.lat_lngs_len().checked_sub(1)?;
        native.lat_lng_at(last).as_ref().map(LatLng::from)
    }

    fn stroke_colour(&self) -> &str {
        &self.stroke_colour
    }

    fn set_stroke_colour(&mut self, colour: &str) {
        if self.stroke_colour != colour {
            self.stroke_colour = colour.to_string();
            self.restyle(LPathStyle {
                color: Some(colour.to_string()),
                ..LPathStyle::default()
            });
        }
    }

    fn stroke_opacity(&self) -> f64 {
        self.stroke_opacity
    }

    cached_setter!(set_stroke_opacity, stroke_opacity: f64, |this, opacity| {
        this.restyle(LPathStyle {
            opacity: Some(opacity),
            ..LPathStyle::default()
        });
    });

    fn stroke_weight(&self) -> f64 {
        self.stroke_weight
    }

    cached_setter!(set_stroke_weight, stroke_weight: f64, |this, weight| {
        this.restyle(LPathStyle {
            weight: Some(weight),
            ..LPathStyle::default()
        });
    });

    fn is_draggable(&self) -> bool {
        self.draggable
    }

    fn set_draggable(&mut self, draggable: bool) {
        self.draggable = draggable;
    }

    fn is_editable(&self) -> bool {
        self.editable
    }

    fn set_editable(&mut self, editable: bool) {
        self.editable = editable;
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    cached_setter!(set_visible, visible: bool, |this, visible| {
        if let Some(native) = &this.native {
            set_layer_visible(native.as_ref(), visible);
        }
    });

    fn z_index(&self) -> i32 {
        self.z_index
    }

    fn set_z_index(&mut self, z_index: i32) {
        self.z_index = z_index;
    }
}

impl Destroy for LeafletPolyline {
    fn destroy(&mut self) {
        if let Some(native) = self.native.take() {
            native.remove_from_map();
        }
        self.tag = None;
        self.id = None;
    }
}

pub struct LeafletCircle {
    id: Option<OverlayId>,
    tag: Option<Tag>,
    native: Option<Box<dyn LCircle>>,
    center: LatLng,
    radius: f64,
    fill_colour: String,
    fill_opacity: f64,
    stroke_colour: String,
    stroke_opacity: f64,
    stroke_weight: f64,
    visible: bool,
    z_index: i32,
}

impl LeafletCircle {
    pub(crate) fn new(id: OverlayId, native: Box<dyn LCircle>, options: CircleOptions) -> Self {
        if options.visible {
            native.add_to_map();
        }
        Self {
            id: Some(id),
            tag: options.tag,
            native: Some(native),
            center: options.center,
            radius: options.radius,
            fill_colour: options.fill_colour,
            fill_opacity: options.fill_opacity,
            stroke_colour: options.stroke_colour,
            stroke_opacity: options.stroke_opacity,
            stroke_weight: options.stroke_weight,
            visible: options.visible,
            z_index: options.z_index,
        }
    }

    fn restyle(&self, patch: LPathStyle) {
        if let Some(native) = &self.native {
            native.set_style(&patch);
        }
    }
}

impl_overlay!(LeafletCircle);

impl MapCircle for LeafletCircle {
    fn center(&self) -> LatLng {
        match &self.native {
            Some(native) => LatLng::from(&native.get_lat_lng()),
            None => self.center,
        }
    }

    fn set_center(&mut self, center: LatLng) {
        if self.center() != center {
            self.center = center;
            if let Some(native) = &self.native {
                native.set_lat_lng(LLatLng::from(&center));
            }
        }
    }

    fn radius(&self) -> f64 {
        self.native.as_ref().map_or(self.radius, |n| n.get_radius())
    }

    fn set_radius(&mut self, radius: f64) {
        if self.radius() != radius {
            self.radius = radius;
            if let Some(native) = &self.native {
                native.set_radius(radius);
            }
        }
    }

    fn fill_colour(&self) -> &str {
        &self.fill_colour
    }

    fn set_fill_colour(&mut self, colour: &str) {
        if self.fill_colour != colour {
            self.fill_colour = colour.to_string();
            self.restyle(LPathStyle {
                fill_color: Some(colour.to_string()),
                ..LPathStyle::default()
            });
        }
    }

    fn fill_opacity(&self) -> f64 {
        self.fill_opacity
    }

    cached_setter!(set_fill_opacity, fill_opacity: f64, |this, opacity| {
        this.restyle(LPathStyle {
            fill_opacity: Some(opacity),
            ..LPathStyle::default()
        });
    });

    fn stroke_colour(&self) -> &str {
        &self.stroke_colour
    }

    fn set_stroke_colour(&mut self, colour: &str) {
        if self.stroke_colour != colour {
            self.stroke_colour = colour.to_string();
            self.restyle(LPathStyle {
                color: Some(colour.to_string()),
                ..LPathStyle::default()
            });
        }
    }

    fn stroke_opacity(&self) -> f64 {
        self.stroke_opacity
    }

    cached_setter!(set_stroke_opacity, stroke_opacity: f64, |this, opacity| {
        this.restyle(LPathStyle {
            opacity: Some(opacity),
            ..LPathStyle::default()
        });
    });

    fn stroke_weight(&self) -> f64 {
        self.stroke_weight
    }

    cached_setter!(set_stroke_weight, stroke_weight: f64, |this, weight| {
        this.restyle(LPathStyle {
            weight: Some(weight),
            ..LPathStyle::default()
        });
    });

    fn is_visible(&self) -> bool {
        self.visible
    }

    cached_setter!(set_visible, visible: bool, |this, visible| {
        if let Some(native) = &this.native {
            set_layer_visible(native.as_ref(), visible);
        }
    });

    fn z_index(&self) -> i32 {
        self.z_index
    }

    fn set_z_index(&mut self, z_index: i32) {
        self.z_index = z_index;
    }
}

impl Destroy for LeafletCircle {
    fn destroy(&mut self) {
        if let Some(native) = self.native.take() {
            self.center = LatLng::from(&native.get_lat_lng());
            self.radius = native.get_radius();
            native.remove_from_map();
        }
        self.tag = None;
        self.id = None;
    }
}
