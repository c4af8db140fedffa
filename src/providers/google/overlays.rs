//! Overlay wrappers over the commercial engine's native objects
//!
//! Geometry the engine can report (positions, paths, centers, radii) is
//! read back from the native object. Styling is cached here and pushed to
//! the engine as `set_options` patches.

use crate::{
    core::{
        geo::{Icon, LatLng, Size},
        options::{CircleOptions, InfoWindowOptions, MarkerOptions, PolygonOptions, PolylineOptions, TrimResult},
        types::{OverlayId, Tag},
    },
    overlays::{
        registry::Destroy, resolve_path_index, MapCircle, MapInfoWindow, MapMarker, MapPolygon,
        MapPolyline,
    },
    providers::google::native::{
        GCircle, GIcon, GInfoWindow, GInfoWindowOptions, GLatLng, GListener, GMarker, GPolygon,
        GPolyline, GShapeStyle, GSize,
    },
};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

fn remove_listeners(listeners: &mut Vec<GListener>) {
    for listener in listeners.drain(..) {
        listener.remove();
    }
}

pub struct GoogleMarker {
    id: Option<OverlayId>,
    tag: Option<Tag>,
    native: Option<Box<dyn GMarker>>,
    listeners: Vec<GListener>,
    /// Last known position, reported once the native marker is gone
    position: LatLng,
    icon: Option<Icon>,
    tooltip: Option<String>,
    clickable: bool,
    draggable: bool,
    visible: bool,
    z_index: i32,
}

impl GoogleMarker {
    pub(crate) fn new(
        id: OverlayId,
        native: Box<dyn GMarker>,
        listeners: Vec<GListener>,
        options: MarkerOptions,
    ) -> Self {
        Self {
            id: Some(id),
            tag: options.tag,
            native: Some(native),
            listeners,
            position: options.position,
            icon: options.icon,
            tooltip: options.tooltip,
            clickable: options.clickable,
            draggable: options.draggable,
            visible: options.visible,
            z_index: options.z_index,
        }
    }

    pub(crate) fn native_handle(&self) -> Option<u64> {
        self.native.as_ref().map(|n| n.handle())
    }
}

impl_overlay!(GoogleMarker);

impl MapMarker for GoogleMarker {
    fn position(&self) -> LatLng {
        match &self.native {
            Some(native) => LatLng::from(&native.get_position()),
            None => self.position,
        }
    }

    fn set_position(&mut self, position: LatLng) {
        if self.position() != position {
            self.position = position;
            if let Some(native) = &self.native {
                native.set_position(GLatLng::from(&position));
            }
        }
    }

    fn icon(&self) -> Option<&Icon> {
        self.icon.as_ref()
    }

    cached_setter!(set_icon, icon: Option<Icon>, |this, icon| {
        if let Some(native) = &this.native {
            native.set_icon(icon.as_ref().map(GIcon::from));
        }
    });

    fn tooltip(&self) -> Option<&str> {
        self.tooltip.as_deref()
    }

    cached_setter!(set_tooltip, tooltip: Option<String>, |this, tooltip| {
        if let Some(native) = &this.native {
            native.set_title(tooltip);
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
            native.set_draggable(draggable);
        }
    });

    fn is_visible(&self) -> bool {
        self.visible
    }

    cached_setter!(set_visible, visible: bool, |this, visible| {
        if let Some(native) = &this.native {
            native.set_visible(visible);
        }
    });

    fn z_index(&self) -> i32 {
        self.z_index
    }

    cached_setter!(set_z_index, z_index: i32, |this, z_index| {
        if let Some(native) = &this.native {
            native.set_z_index(z_index);
        }
    });
}

impl Destroy for GoogleMarker {
    fn destroy(&mut self) {
        remove_listeners(&mut self.listeners);
        if let Some(native) = self.native.take() {
            self.position = LatLng::from(&native.get_position());
            native.detach();
        }
        self.tag = None;
        self.id = None;
    }
}

pub struct GooglePolyline {
    id: Option<OverlayId>,
    tag: Option<Tag>,
    native: Option<Box<dyn GPolyline>>,
    stroke_colour: String,
    stroke_opacity: f64,
    stroke_weight: f64,
    draggable: bool,
    editable: bool,
    visible: bool,
    z_index: i32,
}

impl GooglePolyline {
    pub(crate) fn new(id: OverlayId, native: Box<dyn GPolyline>, options: PolylineOptions) -> Self {
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

    fn restyle(&self, patch: GShapeStyle) {
        if let Some(native) = &self.native {
            native.set_options(&patch);
        }
    }

    /// Removes up to `count` points from one end, one at a time
    pub(crate) fn trim(&mut self, count: usize, from_start: bool) -> TrimResult {
        let Some(native) = &self.native else {
            return TrimResult::default();
        };
        let length = native.path_length();
        let remove = count.min(length);
        for _ in 0..remove {
            let index = if from_start { 0 } else { native.path_length() - 1 };
            native.path_remove_at(index);
        }
        TrimResult {
            emptied: length < count,
            count_removed: remove,
        }
    }

    pub(crate) fn remove_point_at(&mut self, index: isize) {
        if let Some(native) = &self.native {
            if let Some(index) = resolve_path_index(index, native.path_length()) {
                native.path_remove_at(index);
            }
        }
    }

    pub(crate) fn append(&mut self, points: &[LatLng], to_start: bool) {
        let Some(native) = &self.native else {
            return;
        };
        for (offset, point) in points.iter().enumerate() {
            if to_start {
                native.path_insert_at(offset, GLatLng::from(point));
            } else {
                native.path_push(GLatLng::from(point));
            }
        }
    }

    pub(crate) fn replace_point_at(&mut self, index: isize, point: LatLng) {
        if let Some(native) = &self.native {
            if let Some(index) = resolve_path_index(index, native.path_length()) {
                native.path_set_at(index, GLatLng::from(&point));
            }
        }
    }
}

impl_overlay!(GooglePolyline);

impl MapPolyline for GooglePolyline {
    fn path(&self) -> Vec<LatLng> {
        self.native
            .as_ref()
            .map(|n| n.get_path().iter().map(LatLng::from).collect())
            .unwrap_or_default()
    }

    fn set_path(&mut self, path: Vec<LatLng>) {
        if self.path() != path {
            if let Some(native) = &self.native {
                native.set_path(path.iter().map(GLatLng::from).collect());
            }
        }
    }

    fn path_len(&self) -> usize {
        self.native.as_ref().map_or(0, |n| n.path_length())
    }

    fn first_point(&self) -> Option<LatLng> {
        let native = self.native.as_ref()?;
        native.path_get_at(0).as_ref().map(LatLng::from)
    }

    fn last_point(&self) -> Option<LatLng> {
        let native = self.native.as_ref()?;
        let last = native.path_length().checked_sub(1)?;
        native.path_get_at(last).as_ref().map(LatLng::from)
    }

    fn stroke_colour(&self) -> &str {
        &self.stroke_colour
    }

    fn set_stroke_colour(&mut self, colour: &str) {
        if self.stroke_colour != colour {
            self.stroke_colour = colour.to_string();
            self.restyle(GShapeStyle {
                stroke_color: Some(colour.to_string()),
                ..GShapeStyle::default()
            });
        }
    }

    fn stroke_opacity(&self) -> f64 {
        self.stroke_opacity
    }

    cached_setter!(set_stroke_opacity, stroke_opacity: f64, |this, opacity| {
        this.restyle(GShapeStyle {
            stroke_opacity: Some(opacity),
            ..GShapeStyle::default()
        });
    });

    fn stroke_weight(&self) -> f64 {
        self.stroke_weight
    }

    cached_setter!(set_stroke_weight, stroke_weight: f64, |this, weight| {
        this.restyle(GShapeStyle {
            stroke_weight: Some(weight),
            ..GShapeStyle::default()
        });
    });

    fn is_draggable(&self) -> bool {
        self.draggable
    }

    cached_setter!(set_draggable, draggable: bool, |this, draggable| {
        if let Some(native) = &this.native {
            native.set_draggable(draggable);
        }
    });

    fn is_editable(&self) -> bool {
        self.editable
    }

    cached_setter!(set_editable, editable: bool, |this, editable| {
        if let Some(native) = &this.native {
            native.set_editable(editable);
        }
    });

    fn is_visible(&self) -> bool {
        self.visible
    }

    cached_setter!(set_visible, visible: bool, |this, visible| {
        if let Some(native) = &this.native {
            native.set_visible(visible);
        }
    });

    fn z_index(&self) -> i32 {
        self.z_index
    }

    cached_setter!(set_z_index, z_index: i32, |this, z_index| {
        this.restyle(GShapeStyle {
            z_index: Some(z_index),
            ..GShapeStyle::default()
        });
    });
}

impl Destroy for GooglePolyline {
    fn destroy(&mut self) {
        if let Some(native) = self.native.take() {
            native.detach();
        }
        self.tag = None;
        self.id = None;
    }
}

pub struct GooglePolygon {
    id: Option<OverlayId>,
    tag: Option<Tag>,
    native: Option<Box<dyn GPolygon>>,
    clickable: bool,
    fill_colour: String,
    fill_opacity: f64,
    stroke_colour: String,
    stroke_opacity: f64,
    stroke_weight: f64,
    draggable: bool,
    editable: bool,
    visible: bool,
    z_index: i32,
}

impl GooglePolygon {
    pub(crate) fn new(id: OverlayId, native: Box<dyn GPolygon>, options: PolygonOptions) -> Self {
        Self {
            id: Some(id),
            tag: options.tag,
            native: Some(native),
            clickable: options.clickable,
            fill_colour: options.fill_colour,
            fill_opacity: options.fill_opacity,
            stroke_colour: options.stroke_colour,
            stroke_opacity: options.stroke_opacity,
            stroke_weight: options.stroke_weight,
            draggable: options.draggable,
            editable: options.editable,
            visible: options.visible,
            z_index: options.z_index,
        }
    }

    fn restyle(&self, patch: GShapeStyle) {
        if let Some(native) = &self.native {
            native.set_options(&patch);
        }
    }
}

impl_overlay!(GooglePolygon);

impl MapPolygon for GooglePolygon {
    fn paths(&self) -> Vec<Vec<LatLng>> {
        self.native
            .as_ref()
            .map(|n| {
                n.get_paths()
                    .iter()
                    .map(|path| path.iter().map(LatLng::from).collect())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn set_paths(&mut self, paths: Vec<Vec<LatLng>>) {
        if self.paths() != paths {
            if let Some(native) = &self.native {
                native.set_paths(
                    paths
                        .iter()
                        .map(|path| path.iter().map(GLatLng::from).collect())
                        .collect(),
                );
            }
        }
    }

    fn set_first_path(&mut self, path: Vec<LatLng>) {
        if self.first_path() != path {
            if let Some(native) = &self.native {
                native.set_path(path.iter().map(GLatLng::from).collect());
            }
        }
    }

    fn is_clickable(&self) -> bool {
        self.clickable
    }

    fn fill_colour(&self) -> &str {
        &self.fill_colour
    }

    fn set_fill_colour(&mut self, colour: &str) {
        if self.fill_colour != colour {
            self.fill_colour = colour.to_string();
            self.restyle(GShapeStyle {
                fill_color: Some(colour.to_string()),
                ..GShapeStyle::default()
            });
        }
    }

    fn fill_opacity(&self) -> f64 {
        self.fill_opacity
    }

    cached_setter!(set_fill_opacity, fill_opacity: f64, |this, opacity| {
        this.restyle(GShapeStyle {
            fill_opacity: Some(opacity),
            ..GShapeStyle::default()
        });
    });

    fn stroke_colour(&self) -> &str {
        &self.stroke_colour
    }

    fn set_stroke_colour(&mut self, colour: &str) {
        if self.stroke_colour != colour {
            self.stroke_colour = colour.to_string();
            self.restyle(GShapeStyle {
                stroke_color: Some(colour.to_string()),
                ..GShapeStyle::default()
            });
        }
    }

    fn stroke_opacity(&self) -> f64 {
        self.stroke_opacity
    }

    cached_setter!(set_stroke_opacity, stroke_opacity: f64, |this, opacity| {
        this.restyle(GShapeStyle {
            stroke_opacity: Some(opacity),
            ..GShapeStyle::default()
        });
    });

    fn stroke_weight(&self) -> f64 {
        self.stroke_weight
    }

    cached_setter!(set_stroke_weight, stroke_weight: f64, |this, weight| {
        this.restyle(GShapeStyle {
            stroke_weight: Some(weight),
            ..GShapeStyle::default()
        });
    });

    fn is_draggable(&self) -> bool {
        self.draggable
    }

    cached_setter!(set_draggable, draggable: bool, |this, draggable| {
        if let Some(native) = &this.native {
            native.set_draggable(draggable);
        }
    });

    fn is_editable(&self) -> bool {
        self.editable
    }

    cached_setter!(set_editable, editable: bool, |this, editable| {
        if let Some(native) = &this.native {
            native.set_editable(editable);
        }
    });

    fn is_visible(&self) -> bool {
        self.visible
    }

    cached_setter!(set_visible, visible: bool, |this, visible| {
        if let Some(native) = &this.native {
            native.set_visible(visible);
        }
    });

    fn z_index(&self) -> i32 {
        self.z_index
    }

    cached_setter!(set_z_index, z_index: i32, |this, z_index| {
        this.restyle(GShapeStyle {
            z_index: Some(z_index),
            ..GShapeStyle::default()
        });
    });
}

impl Destroy for GooglePolygon {
    fn destroy(&mut self) {
        if let Some(native) = self.native.take() {
            native.detach();
        }
        self.tag = None;
        self.id = None;
    }
}

pub struct GoogleCircle {
    id: Option<OverlayId>,
    tag: Option<Tag>,
    native: Option<Box<dyn GCircle>>,
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

impl GoogleCircle {
    pub(crate) fn new(id: OverlayId, native: Box<dyn GCircle>, options: CircleOptions) -> Self {
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

    fn restyle(&self, patch: GShapeStyle) {
        if let Some(native) = &self.native {
            native.set_options(&patch);
        }
    }
}

impl_overlay!(GoogleCircle);

impl MapCircle for GoogleCircle {
    fn center(&self) -> LatLng {
        match &self.native {
            Some(native) => LatLng::from(&native.get_center()),
            None => self.center,
        }
    }

    fn set_center(&mut self, center: LatLng) {
        if self.center() != center {
            self.center = center;
            if let Some(native) = &self.native {
                native.set_center(GLatLng::from(&center));
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
            self.restyle(GShapeStyle {
                fill_color: Some(colour.to_string()),
                ..GShapeStyle::default()
            });
        }
    }

    fn fill_opacity(&self) -> f64 {
        self.fill_opacity
    }

    cached_setter!(set_fill_opacity, fill_opacity: f64, |this, opacity| {
        this.restyle(GShapeStyle {
            fill_opacity: Some(opacity),
            ..GShapeStyle::default()
        });
    });

    fn stroke_colour(&self) -> &str {
        &self.stroke_colour
    }

    fn set_stroke_colour(&mut self, colour: &str) {
        if self.stroke_colour != colour {
            self.stroke_colour = colour.to_string();
            self.restyle(GShapeStyle {
                stroke_color: Some(colour.to_string()),
                ..GShapeStyle::default()
            });
        }
    }

    fn stroke_opacity(&self) -> f64 {
        self.stroke_opacity
    }

    cached_setter!(set_stroke_opacity, stroke_opacity: f64, |this, opacity| {
        this.restyle(GShapeStyle {
            stroke_opacity: Some(opacity),
            ..GShapeStyle::default()
        });
    });

    fn stroke_weight(&self) -> f64 {
        self.stroke_weight
    }

    cached_setter!(set_stroke_weight, stroke_weight: f64, |this, weight| {
        this.restyle(GShapeStyle {
            stroke_weight: Some(weight),
            ..GShapeStyle::default()
        });
    });

    fn is_visible(&self) -> bool {
        self.visible
    }

    cached_setter!(set_visible, visible: bool, |this, visible| {
        if let Some(native) = &this.native {
            native.set_visible(visible);
        }
    });

    fn z_index(&self) -> i32 {
        self.z_index
    }

    cached_setter!(set_z_index, z_index: i32, |this, z_index| {
        this.restyle(GShapeStyle {
            z_index: Some(z_index),
            ..GShapeStyle::default()
        });
    });
}

impl Destroy for GoogleCircle {
    fn destroy(&mut self) {
        if let Some(native) = self.native.take() {
            self.center = LatLng::from(&native.get_center());
            self.radius = native.get_radius();
            native.detach();
        }
        self.tag = None;
        self.id = None;
    }
}

pub struct GoogleInfoWindow {
    id: Option<OverlayId>,
    tag: Option<Tag>,
    native: Option<Box<dyn GInfoWindow>>,
    listeners: Vec<GListener>,
    /// Shared with the close-button listener
    open: Arc<AtomicBool>,
    content: String,
    position: Option<LatLng>,
    disable_auto_pan: bool,
    max_width: Option<f64>,
    pixel_offset: Option<Size>,
    z_index: i32,
}

impl GoogleInfoWindow {
    pub(crate) fn new(
        id: OverlayId,
        native: Box<dyn GInfoWindow>,
        listeners: Vec<GListener>,
        open: Arc<AtomicBool>,
        options: InfoWindowOptions,
    ) -> Self {
        Self {
            id: Some(id),
            tag: options.tag,
            native: Some(native),
            listeners,
            open,
            content: options.content,
            position: options.position,
            disable_auto_pan: options.disable_auto_pan,
            max_width: options.max_width,
            pixel_offset: options.pixel_offset,
            z_index: options.z_index,
        }
    }

    /// The native options the cached values describe
    pub(crate) fn native_options(options: &InfoWindowOptions) -> GInfoWindowOptions {
        GInfoWindowOptions {
            content: options.content.clone(),
            position: options.position.as_ref().map(GLatLng::from),
            disable_auto_pan: options.disable_auto_pan,
            max_width: options.max_width,
            pixel_offset: options.pixel_offset.as_ref().map(GSize::from),
            z_index: options.z_index,
        }
    }

    fn push_options(&self) {
        if let Some(native) = &self.native {
            native.set_options(&GInfoWindowOptions {
                content: self.content.clone(),
                position: self.position().as_ref().map(GLatLng::from),
                disable_auto_pan: self.disable_auto_pan,
                max_width: self.max_width,
                pixel_offset: self.pixel_offset.as_ref().map(GSize::from),
                z_index: self.z_index,
            });
        }
    }

    pub(crate) fn open(&mut self, anchor: Option<u64>) {
        if let Some(native) = &self.native {
            native.open(anchor);
            self.open.store(true, Ordering::SeqCst);
        }
    }

    pub(crate) fn close(&mut self) {
        if let Some(native) = &self.native {
            native.close();
        }
        self.open.store(false, Ordering::SeqCst);
    }
}

impl_overlay!(GoogleInfoWindow);

impl MapInfoWindow for GoogleInfoWindow {
    fn content(&self) -> &str {
        &self.content
    }

    fn set_content(&mut self, content: String) {
        if self.content != content {
            if let Some(native) = &self.native {
                native.set_content(&content);
            }
            self.content = content;
        }
    }

    fn position(&self) -> Option<LatLng> {
        match &self.native {
            Some(native) => native.get_position().as_ref().map(LatLng::from),
            None => self.position,
        }
    }

    fn set_position(&mut self, position: LatLng) {
        if self.position() != Some(position) {
            self.position = Some(position);
            if let Some(native) = &self.native {
                native.set_position(GLatLng::from(&position));
            }
        }
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    fn disable_auto_pan(&self) -> bool {
        self.disable_auto_pan
    }

    cached_setter!(set_disable_auto_pan, disable_auto_pan: bool, |this, _disable| {
        this.push_options();
    });

    fn max_width(&self) -> Option<f64> {
        self.max_width
    }

    cached_setter!(set_max_width, max_width: Option<f64>, |this, _max_width| {
        this.push_options();
    });

    fn pixel_offset(&self) -> Option<Size> {
        self.pixel_offset
    }

    cached_setter!(set_pixel_offset, pixel_offset: Option<Size>, |this, _offset| {
        this.push_options();
    });

    fn z_index(&self) -> i32 {
        self.z_index
    }

    cached_setter!(set_z_index, z_index: i32, |this, z_index| {
        if let Some(native) = &this.native {
            native.set_z_index(z_index);
        }
    });
}

impl Destroy for GoogleInfoWindow {
    fn destroy(&mut self) {
        remove_listeners(&mut self.listeners);
        if let Some(native) = self.native.take() {
            native.close();
        }
        self.open.store(false, Ordering::SeqCst);
        self.tag = None;
        self.id = None;
    }
}
