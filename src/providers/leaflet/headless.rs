//! In-memory tile engine
//!
//! Shares its shape with the commercial headless engine: models behind
//! shared handles, a per-name call counter and a listener table, so tests
//! can see which native calls the adapter made and which subscriptions it
//! left behind.

use crate::prelude::HashMap;
use crate::providers::leaflet::native::*;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct Subscription {
    target: u64,
    event: String,
    handler: LHandler,
}

struct World {
    next_handle: u64,
    subscriptions: Vec<Subscription>,
    calls: HashMap<String, usize>,
    sized: bool,
    maps: HashMap<u64, Arc<Mutex<MapModel>>>,
    layers: HashMap<u64, Arc<Mutex<LayerModel>>>,
}

impl World {
    fn record(&mut self, call: &str) {
        *self.calls.entry(call.to_string()).or_default() += 1;
    }

    fn next_handle(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }
}

fn fire(world: &Mutex<World>, target: u64, event: &str, mouse: &LMouseEvent) {
    let handlers: Vec<LHandler> = lock(world)
        .subscriptions
        .iter()
        .filter(|s| s.target == target && s.event == event)
        .map(|s| s.handler.clone())
        .collect();
    for handler in handlers {
        handler(mouse);
    }
}

struct Node<M> {
    handle: u64,
    model: Arc<Mutex<M>>,
    world: Arc<Mutex<World>>,
}

impl<M> Node<M> {
    fn read<R>(&self, f: impl FnOnce(&M) -> R) -> R {
        f(&lock(&self.model))
    }

    fn write<R>(&self, call: &str, f: impl FnOnce(&mut M) -> R) -> R {
        lock(&self.world).record(call);
        f(&mut lock(&self.model))
    }

    fn fire(&self, event: &str) {
        fire(&self.world, self.handle, event, &LMouseEvent::default());
    }

    fn on(&self, event: &str, handler: LHandler) {
        lock(&self.world).subscriptions.push(Subscription {
            target: self.handle,
            event: event.to_string(),
            handler,
        });
    }

    fn off(&self, event: &str, handler: &LHandler) {
        lock(&self.world).subscriptions.retain(|s| {
            !(s.target == self.handle && s.event == event && Arc::ptr_eq(&s.handler, handler))
        });
    }
}

macro_rules! impl_evented {
    ($($ty:ty),* $(,)?) => {
        $(
            impl LEvented for $ty {
                fn on(&self, event: &str, handler: LHandler) {
                    self.node.on(event, handler)
                }

                fn off(&self, event: &str, handler: &LHandler) {
                    self.node.off(event, handler)
                }
            }
        )*
    };
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapModel {
    pub options: LMapOptions,
    pub center: LLatLng,
    pub zoom: f64,
    pub base_layer: Option<LTileLayerOptions>,
    pub tile_filter: Option<String>,
    pub controls: Vec<(LControlPosition, String, String)>,
    pub removed: bool,
}

/// What kind of layer a model describes, with its kind-specific state
#[derive(Debug, Clone, PartialEq)]
pub enum LayerKind {
    Marker {
        position: LLatLng,
        options: LMarkerOptions,
        tooltip: Option<String>,
    },
    Polyline {
        latlngs: Vec<LLatLng>,
    },
    Circle {
        center: LLatLng,
        radius: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayerModel {
    pub kind: LayerKind,
    pub style: LPathStyle,
    pub interactive: bool,
    pub on_map: bool,
}

impl LayerModel {
    pub fn marker_options(&self) -> Option<&LMarkerOptions> {
        match &self.kind {
            LayerKind::Marker { options, .. } => Some(options),
            _ => None,
        }
    }

    pub fn tooltip(&self) -> Option<&str> {
        match &self.kind {
            LayerKind::Marker { tooltip, .. } => tooltip.as_deref(),
            _ => None,
        }
    }

    pub fn latlngs(&self) -> Option<&[LLatLng]> {
        match &self.kind {
            LayerKind::Polyline { latlngs } => Some(latlngs),
            _ => None,
        }
    }
}

fn view_bounds(center: LLatLng, zoom: f64) -> LLatLngBounds {
    let half_lng = 180.0 / 2f64.powf(zoom);
    let half_lat = half_lng / 2.0;
    LLatLngBounds::from_corners(
        LLatLng::new((center.lat - half_lat).max(-85.0), center.lng - half_lng),
        LLatLng::new((center.lat + half_lat).min(85.0), center.lng + half_lng),
    )
}

fn zoom_to_fit(bounds: &LLatLngBounds) -> f64 {
    let south_west = bounds.get_south_west();
    let north_east = bounds.get_north_east();
    let span = (north_east.lng - south_west.lng)
        .max((north_east.lat - south_west.lat) * 2.0)
        .max(1e-9);
    (360.0 / span).log2().floor().clamp(0.0, 19.0)
}

/// The engine. Cloning shares the same world.
#[derive(Clone)]
pub struct HeadlessLeaflet {
    world: Arc<Mutex<World>>,
}

impl HeadlessLeaflet {
    /// Maps have a sized container and can report bounds at once
    pub fn new() -> Self {
        Self::with_container(true)
    }

    /// Maps report no bounds until `invalidate_size` is called
    pub fn unsized_container() -> Self {
        Self::with_container(false)
    }

    fn with_container(sized: bool) -> Self {
        Self {
            world: Arc::new(Mutex::new(World {
                next_handle: 0,
                subscriptions: Vec::new(),
                calls: HashMap::default(),
                sized,
                maps: HashMap::default(),
                layers: HashMap::default(),
            })),
        }
    }

    pub fn calls(&self, call: &str) -> usize {
        lock(&self.world).calls.get(call).copied().unwrap_or(0)
    }

    pub fn subscription_count(&self) -> usize {
        lock(&self.world).subscriptions.len()
    }

    pub fn subscription_count_on(&self, handle: u64) -> usize {
        lock(&self.world)
            .subscriptions
            .iter()
            .filter(|s| s.target == handle)
            .count()
    }

    pub fn maps_created(&self) -> usize {
        lock(&self.world).maps.len()
    }

    pub fn map_handle(&self) -> Option<u64> {
        lock(&self.world).maps.keys().max().copied()
    }

    pub fn map(&self) -> Option<MapModel> {
        let world = lock(&self.world);
        let handle = world.maps.keys().max()?;
        world.maps.get(handle).map(|m| lock(m).clone())
    }

    pub fn trigger(&self, handle: u64, event: &str, mouse: LMouseEvent) {
        fire(&self.world, handle, event, &mouse);
    }

    /// Simulates the user dragging a marker to `to`
    pub fn drag_marker(&self, handle: u64, to: LLatLng) {
        let layer = lock(&self.world).layers.get(&handle).cloned();
        if let Some(layer) = layer {
            if let LayerKind::Marker { position, .. } = &mut lock(&layer).kind {
                *position = to;
            }
            self.trigger(
                handle,
                "dragend",
                LMouseEvent {
                    latlng: Some(to),
                    container_point: None,
                },
            );
        }
    }

    pub fn layer(&self, handle: u64) -> Option<LayerModel> {
        lock(&self.world).layers.get(&handle).map(|l| lock(l).clone())
    }

    /// Handles of layers currently on a map, oldest first
    pub fn layers_on_map(&self) -> Vec<u64> {
        let world = lock(&self.world);
        let mut handles: Vec<u64> = world
            .layers
            .iter()
            .filter(|(_, layer)| lock(layer).on_map)
            .map(|(handle, _)| *handle)
            .collect();
        handles.sort_unstable();
        handles
    }
}

impl Default for HeadlessLeaflet {
    fn default() -> Self {
        Self::new()
    }
}

impl LeafletApi for HeadlessLeaflet {
    fn create_map(&self, options: &LMapOptions) -> Box<dyn LMap> {
        let model = Arc::new(Mutex::new(MapModel {
            options: options.clone(),
            center: options.center,
            zoom: options.zoom,
            base_layer: None,
            tile_filter: None,
            controls: Vec::new(),
            removed: false,
        }));
        let handle = {
            let mut world = lock(&self.world);
            world.record("create_map");
            let handle = world.next_handle();
            world.maps.insert(handle, model.clone());
            handle
        };
        Box::new(HeadlessMap {
            node: Node {
                handle,
                model,
                world: self.world.clone(),
            },
        })
    }
}

struct HeadlessMap {
    node: Node<MapModel>,
}

impl HeadlessMap {
    fn create_layer(&self, call: &str, model: LayerModel) -> Node<LayerModel> {
        let model = Arc::new(Mutex::new(model));
        let mut world = lock(&self.node.world);
        world.record(call);
        let handle = world.next_handle();
        world.layers.insert(handle, model.clone());
        Node {
            handle,
            model,
            world: self.node.world.clone(),
        }
    }

    fn moved(&self, zoomed: bool, moved: bool) {
        if zoomed {
            self.node.fire("zoomend");
        }
        if zoomed || moved {
            self.node.fire("moveend");
        }
    }
}

impl_evented!(HeadlessMap, HeadlessMarker, HeadlessPolyline, HeadlessCircle);

impl LMap for HeadlessMap {
    fn get_bounds(&self) -> Option<LLatLngBounds> {
        if !lock(&self.node.world).sized {
            return None;
        }
        self.node.read(|m| Some(view_bounds(m.center, m.zoom)))
    }

    fn get_center(&self) -> LLatLng {
        self.node.read(|m| m.center)
    }

    fn get_zoom(&self) -> f64 {
        self.node.read(|m| m.zoom)
    }

    fn set_view(&self, center: LLatLng, zoom: f64) {
        let (zoomed, moved) = self.node.write("map.set_view", |m| {
            let changed = (m.zoom != zoom, m.center != center);
            m.center = center;
            m.zoom = zoom;
            changed
        });
        self.moved(zoomed, moved);
    }

    fn set_zoom(&self, zoom: f64) {
        let zoomed = self
            .node
            .write("map.set_zoom", |m| std::mem::replace(&mut m.zoom, zoom) != zoom);
        self.moved(zoomed, false);
    }

    fn pan_to(&self, center: LLatLng) {
        let moved = self
            .node
            .write("map.pan_to", |m| std::mem::replace(&mut m.center, center) != center);
        self.moved(false, moved);
    }

    fn fit_bounds(&self, bounds: LLatLngBounds) {
        let (zoomed, moved) = self.node.write("map.fit_bounds", |m| {
            let center = bounds.get_center();
            let zoom = zoom_to_fit(&bounds);
            let changed = (m.zoom != zoom, m.center != center);
            m.center = center;
            m.zoom = zoom;
            changed
        });
        self.moved(zoomed, moved);
    }

    fn invalidate_size(&self) {
        let mut world = lock(&self.node.world);
        world.record("map.invalidate_size");
        world.sized = true;
    }

    fn set_base_layer(&self, options: LTileLayerOptions) {
        let changed = self.node.write("map.set_base_layer", |m| {
            let changed = m.base_layer.as_ref().map(|l| &l.name) != Some(&options.name);
            m.base_layer = Some(options);
            changed
        });
        if changed {
            self.node.fire("baselayerchange");
        }
        self.node.fire("load");
    }

    fn base_layer(&self) -> Option<String> {
        self.node.read(|m| m.base_layer.as_ref().map(|l| l.name.clone()))
    }

    fn set_tile_filter(&self, filter: Option<String>) {
        self.node.write("map.set_tile_filter", |m| m.tile_filter = filter);
    }

    fn add_control(&self, position: LControlPosition, id: &str, content: &str) {
        self.node.write("map.add_control", |m| {
            m.controls.push((position, id.to_string(), content.to_string()))
        });
    }

    fn create_marker(&self, position: LLatLng, options: LMarkerOptions) -> Box<dyn LMarker> {
        let interactive = options.interactive;
        let node = self.create_layer(
            "create_marker",
            LayerModel {
                kind: LayerKind::Marker {
                    position,
                    tooltip: options.title.clone(),
                    options,
                },
                style: LPathStyle::default(),
                interactive,
                on_map: false,
            },
        );
        Box::new(HeadlessMarker { node })
    }

    fn create_polyline(&self, latlngs: Vec<LLatLng>, style: LPathStyle, interactive: bool) -> Box<dyn LPolyline> {
        let node = self.create_layer(
            "create_polyline",
            LayerModel {
                kind: LayerKind::Polyline { latlngs },
                style,
                interactive,
                on_map: false,
            },
        );
        Box::new(HeadlessPolyline { node })
    }

    fn create_circle(&self, center: LLatLng, radius: f64, style: LPathStyle, interactive: bool) -> Box<dyn LCircle> {
        let node = self.create_layer(
            "create_circle",
            LayerModel {
                kind: LayerKind::Circle { center, radius },
                style,
                interactive,
                on_map: false,
            },
        );
        Box::new(HeadlessCircle { node })
    }

    fn remove(&self) {
        self.node.write("map.remove", |m| m.removed = true);
    }
}

macro_rules! impl_layer {
    ($($ty:ty => $name:literal),* $(,)?) => {
        $(
            impl LLayer for $ty {
                fn handle(&self) -> u64 {
                    self.node.handle
                }

                fn add_to_map(&self) {
                    self.node.write(concat!($name, ".add_to_map"), |m| m.on_map = true);
                }

                fn remove_from_map(&self) {
                    self.node.write(concat!($name, ".remove_from_map"), |m| m.on_map = false);
                }

                fn is_on_map(&self) -> bool {
                    self.node.read(|m| m.on_map)
                }
            }
        )*
    };
}

struct HeadlessMarker {
    node: Node<LayerModel>,
}

struct HeadlessPolyline {
    node: Node<LayerModel>,
}

struct HeadlessCircle {
    node: Node<LayerModel>,
}

impl_layer!(
    HeadlessMarker => "marker",
    HeadlessPolyline => "polyline",
    HeadlessCircle => "circle",
);

impl HeadlessMarker {
    fn update(&self, call: &str, f: impl FnOnce(&mut LLatLng, &mut LMarkerOptions, &mut Option<String>)) {
        self.node.write(call, |m| {
            if let LayerKind::Marker {
                position,
                options,
                tooltip,
            } = &mut m.kind
            {
                f(position, options, tooltip);
            }
        });
    }
}

impl LMarker for HeadlessMarker {
    fn get_lat_lng(&self) -> LLatLng {
        self.node.read(|m| match &m.kind {
            LayerKind::Marker { position, .. } => *position,
            _ => LLatLng::default(),
        })
    }

    fn set_lat_lng(&self, to: LLatLng) {
        self.update("marker.set_lat_lng", |position, _, _| *position = to);
        self.node.fire("move");
    }

    fn set_icon(&self, icon: LIcon) {
        self.update("marker.set_icon", |_, options, _| options.icon = icon);
    }

    fn set_z_index_offset(&self, offset: i32) {
        self.update("marker.set_z_index_offset", |_, options, _| {
            options.z_index_offset = offset
        });
    }

    fn set_dragging(&self, enabled: bool) {
        self.update("marker.set_dragging", |_, options, _| options.draggable = enabled);
    }

    fn bind_tooltip(&self, content: &str) {
        self.update("marker.bind_tooltip", |_, _, tooltip| {
            *tooltip = Some(content.to_string())
        });
    }

    fn unbind_tooltip(&self) {
        self.update("marker.unbind_tooltip", |_, _, tooltip| *tooltip = None);
    }
}

impl HeadlessPolyline {
    fn update<R>(&self, call: &str, f: impl FnOnce(&mut Vec<LLatLng>) -> R) -> Option<R> {
        self.node.write(call, |m| match &mut m.kind {
            LayerKind::Polyline { latlngs } => Some(f(latlngs)),
            _ => None,
        })
    }
}

impl LPolyline for HeadlessPolyline {
    fn get_lat_lngs(&self) -> Vec<LLatLng> {
        lock(&self.node.world).record("polyline.get_lat_lngs");
        self.node
            .read(|m| m.latlngs().map(<[LLatLng]>::to_vec).unwrap_or_default())
    }

    fn lat_lngs_len(&self) -> usize {
        self.node.read(|m| m.latlngs().map_or(0, <[LLatLng]>::len))
    }

    fn lat_lng_at(&self, index: usize) -> Option<LLatLng> {
        self.node
            .read(|m| m.latlngs().and_then(|latlngs| latlngs.get(index).copied()))
    }

    fn set_lat_lngs(&self, to: Vec<LLatLng>) {
        self.update("polyline.set_lat_lngs", |latlngs| *latlngs = to);
    }

    fn splice_lat_lngs(&self, start: usize, delete_count: usize, insert: Vec<LLatLng>) {
        self.update("polyline.splice_lat_lngs", |latlngs| {
            let start = start.min(latlngs.len());
            let end = start.saturating_add(delete_count).min(latlngs.len());
            latlngs.splice(start..end, insert);
        });
    }

    fn set_style(&self, style: &LPathStyle) {
        self.node.write("polyline.set_style", |m| m.style.merge(style));
    }
}

impl LCircle for HeadlessCircle {
    fn get_lat_lng(&self) -> LLatLng {
        self.node.read(|m| match &m.kind {
            LayerKind::Circle { center, .. } => *center,
            _ => LLatLng::default(),
        })
    }

    fn set_lat_lng(&self, to: LLatLng) {
        self.node.write("circle.set_lat_lng", |m| {
            if let LayerKind::Circle { center, .. } = &mut m.kind {
                *center = to;
            }
        });
    }

    fn get_radius(&self) -> f64 {
        self.node.read(|m| match &m.kind {
            LayerKind::Circle { radius, .. } => *radius,
            _ => 0.0,
        })
    }

    fn set_radius(&self, to: f64) {
        self.node.write("circle.set_radius", |m| {
            if let LayerKind::Circle { radius, .. } = &mut m.kind {
                *radius = to;
            }
        });
    }

    fn set_style(&self, style: &LPathStyle) {
        self.node.write("circle.set_style", |m| m.style.merge(style));
    }
}
