//! In-memory commercial map engine
//!
//! Every native object keeps its state in a model shared with the engine,
//! so tests can inspect what the adapter asked for. The engine also counts
//! calls by name (`"marker.set_icon"`, `"polyline.set_options"`, ...) and
//! tracks registered listeners, which is how change suppression and
//! listener cleanup are verified.

use crate::prelude::HashMap;
use crate::providers::google::native::*;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct Listener {
    target: u64,
    event: String,
    handler: GHandler,
}

struct World {
    next_handle: u64,
    next_listener: u64,
    listeners: HashMap<u64, Listener>,
    calls: HashMap<String, usize>,
    ready_after: Option<usize>,
    maps: HashMap<u64, Arc<Mutex<MapModel>>>,
    markers: HashMap<u64, Arc<Mutex<MarkerModel>>>,
    polylines: HashMap<u64, Arc<Mutex<PolylineModel>>>,
    polygons: HashMap<u64, Arc<Mutex<PolygonModel>>>,
    circles: HashMap<u64, Arc<Mutex<CircleModel>>>,
    info_windows: HashMap<u64, Arc<Mutex<InfoWindowModel>>>,
    clusterers: HashMap<u64, Arc<Mutex<ClustererModel>>>,
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

fn fire(world: &Mutex<World>, target: u64, event: &str, mouse: &GMouseEvent) {
    let handlers: Vec<GHandler> = lock(world)
        .listeners
        .values()
        .filter(|l| l.target == target && l.event == event)
        .map(|l| l.handler.clone())
        .collect();
    for handler in handlers {
        handler(mouse);
    }
}

/// A native object: its handle, its model and the engine it lives in
struct Node<M> {
    handle: u64,
    model: Arc<Mutex<M>>,
    world: Arc<Mutex<World>>,
}

impl<M> Node<M> {
    fn create<F>(world: &Arc<Mutex<World>>, model: M, table: F) -> Self
    where
        F: FnOnce(&mut World) -> &mut HashMap<u64, Arc<Mutex<M>>>,
    {
        let model = Arc::new(Mutex::new(model));
        let mut guard = lock(world);
        let handle = guard.next_handle();
        table(&mut *guard).insert(handle, model.clone());
        Self {
            handle,
            model,
            world: world.clone(),
        }
    }

    fn read<R>(&self, f: impl FnOnce(&M) -> R) -> R {
        f(&lock(&self.model))
    }

    /// Counts `call` and then applies `f` to the model
    fn write<R>(&self, call: &str, f: impl FnOnce(&mut M) -> R) -> R {
        lock(&self.world).record(call);
        f(&mut lock(&self.model))
    }

    fn fire(&self, event: &str) {
        fire(&self.world, self.handle, event, &GMouseEvent::default());
    }

    fn add_listener(&self, event: &str, handler: GHandler) -> GListener {
        let id = {
            let mut world = lock(&self.world);
            world.next_listener += 1;
            let id = world.next_listener;
            world.listeners.insert(
                id,
                Listener {
                    target: self.handle,
                    event: event.to_string(),
                    handler,
                },
            );
            id
        };
        let world = Arc::downgrade(&self.world);
        GListener::new(move || {
            if let Some(world) = world.upgrade() {
                lock(&world).listeners.remove(&id);
            }
        })
    }
}

macro_rules! impl_event_target {
    ($($ty:ty),* $(,)?) => {
        $(
            impl GEventTarget for $ty {
                fn add_listener(&self, event: &str, handler: GHandler) -> GListener {
                    self.node.add_listener(event, handler)
                }
            }
        )*
    };
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapModel {
    pub options: GMapOptions,
    pub center: GLatLng,
    pub zoom: f64,
    pub map_type_id: String,
    pub map_types: Vec<(String, GStyledMapType)>,
    pub controls: Vec<(GControlPosition, String, String)>,
    pub overlay_map_types: Vec<GImageMapType>,
    pub resize_count: usize,
    polls_until_ready: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerModel {
    pub options: GMarkerOptions,
    pub on_map: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PolylineModel {
    pub path: VecDeque<GLatLng>,
    pub style: GShapeStyle,
    pub clickable: bool,
    pub draggable: bool,
    pub editable: bool,
    pub visible: bool,
    pub on_map: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PolygonModel {
    pub options: GPolygonOptions,
    pub on_map: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CircleModel {
    pub options: GCircleOptions,
    pub on_map: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InfoWindowModel {
    pub options: GInfoWindowOptions,
    pub open: bool,
    pub anchor: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClustererModel {
    pub options: GClustererOptions,
    pub markers: Vec<u64>,
    pub repaints: usize,
}

/// The visible rectangle for a view, assuming a 360-degree-wide world at
/// zoom 0
fn view_bounds(center: GLatLng, zoom: f64) -> GLatLngBounds {
    let half_lng = 180.0 / 2f64.powf(zoom);
    let half_lat = half_lng / 2.0;
    GLatLngBounds::new(
        GLatLng::new((center.lat() - half_lat).max(-85.0), center.lng() - half_lng),
        GLatLng::new((center.lat() + half_lat).min(85.0), center.lng() + half_lng),
    )
}

fn zoom_to_fit(bounds: &GLatLngBounds) -> f64 {
    let south_west = bounds.get_south_west();
    let north_east = bounds.get_north_east();
    let span = (north_east.lng() - south_west.lng())
        .abs()
        .max((north_east.lat() - south_west.lat()).abs() * 2.0)
        .max(1e-9);
    (360.0 / span).log2().floor().clamp(0.0, 21.0)
}

/// The engine. Cloning shares the same world.
#[derive(Clone)]
pub struct HeadlessGoogleMaps {
    world: Arc<Mutex<World>>,
}

impl HeadlessGoogleMaps {
    /// An engine whose maps can report bounds straight away
    pub fn new() -> Self {
        Self::with_readiness(Some(0))
    }

    /// Maps answer `None` to the first `polls` bounds requests
    pub fn ready_after_polls(polls: usize) -> Self {
        Self::with_readiness(Some(polls))
    }

    /// Maps never report bounds until [`make_ready`](Self::make_ready)
    pub fn never_ready() -> Self {
        Self::with_readiness(None)
    }

    fn with_readiness(ready_after: Option<usize>) -> Self {
        Self {
            world: Arc::new(Mutex::new(World {
                next_handle: 0,
                next_listener: 0,
                listeners: HashMap::default(),
                calls: HashMap::default(),
                ready_after,
                maps: HashMap::default(),
                markers: HashMap::default(),
                polylines: HashMap::default(),
                polygons: HashMap::default(),
                circles: HashMap::default(),
                info_windows: HashMap::default(),
                clusterers: HashMap::default(),
            })),
        }
    }

    pub fn make_ready(&self) {
        for map in lock(&self.world).maps.values() {
            lock(map).polls_until_ready = Some(0);
        }
    }

    /// How many times the named native call has been made
    pub fn calls(&self, call: &str) -> usize {
        lock(&self.world).calls.get(call).copied().unwrap_or(0)
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.world).listeners.len()
    }

    pub fn listener_count_on(&self, handle: u64) -> usize {
        lock(&self.world)
            .listeners
            .values()
            .filter(|l| l.target == handle)
            .count()
    }

    pub fn maps_created(&self) -> usize {
        lock(&self.world).maps.len()
    }

    /// Handle of the most recently created map
    pub fn map_handle(&self) -> Option<u64> {
        lock(&self.world).maps.keys().max().copied()
    }

    pub fn map(&self) -> Option<MapModel> {
        let world = lock(&self.world);
        let handle = world.maps.keys().max()?;
        world.maps.get(handle).map(|m| lock(m).clone())
    }

    /// Fires a native event on any object, as the engine would
    pub fn trigger(&self, handle: u64, event: &str, mouse: GMouseEvent) {
        fire(&self.world, handle, event, &mouse);
    }

    /// Simulates the user dragging a marker to `to`
    pub fn drag_marker(&self, handle: u64, to: GLatLng) {
        let marker = lock(&self.world).markers.get(&handle).cloned();
        if let Some(marker) = marker {
            lock(&marker).options.position = to;
            self.trigger(
                handle,
                "dragend",
                GMouseEvent {
                    lat_lng: Some(to),
                    pixel: None,
                },
            );
        }
    }

    /// Simulates the user pressing an info window's close button
    pub fn close_info_window_by_user(&self, handle: u64) {
        let window = lock(&self.world).info_windows.get(&handle).cloned();
        if let Some(window) = window {
            lock(&window).open = false;
            self.trigger(handle, "closeclick", GMouseEvent::default());
        }
    }

    pub fn marker(&self, handle: u64) -> Option<MarkerModel> {
        lock(&self.world).markers.get(&handle).map(|m| lock(m).clone())
    }

    /// Handles of markers currently drawn on a map, oldest first
    pub fn markers_on_map(&self) -> Vec<u64> {
        on_map(&lock(&self.world).markers, |m| m.on_map)
    }

    pub fn polyline(&self, handle: u64) -> Option<PolylineModel> {
        lock(&self.world).polylines.get(&handle).map(|m| lock(m).clone())
    }

    pub fn polylines_on_map(&self) -> Vec<u64> {
        on_map(&lock(&self.world).polylines, |m| m.on_map)
    }

    pub fn polygon(&self, handle: u64) -> Option<PolygonModel> {
        lock(&self.world).polygons.get(&handle).map(|m| lock(m).clone())
    }

    pub fn polygons_on_map(&self) -> Vec<u64> {
        on_map(&lock(&self.world).polygons, |m| m.on_map)
    }

    pub fn circle(&self, handle: u64) -> Option<CircleModel> {
        lock(&self.world).circles.get(&handle).map(|m| lock(m).clone())
    }

    pub fn circles_on_map(&self) -> Vec<u64> {
        on_map(&lock(&self.world).circles, |m| m.on_map)
    }

    pub fn info_window(&self, handle: u64) -> Option<InfoWindowModel> {
        lock(&self.world)
            .info_windows
            .get(&handle)
            .map(|m| lock(m).clone())
    }

    /// Every info window ever created, oldest first
    pub fn info_windows(&self) -> Vec<u64> {
        on_map(&lock(&self.world).info_windows, |_| true)
    }

    /// The most recently created clusterer
    pub fn clusterer(&self) -> Option<ClustererModel> {
        let world = lock(&self.world);
        let handle = world.clusterers.keys().max()?;
        world.clusterers.get(handle).map(|m| lock(m).clone())
    }
}

fn on_map<M>(table: &HashMap<u64, Arc<Mutex<M>>>, keep: impl Fn(&M) -> bool) -> Vec<u64> {
    let mut handles: Vec<u64> = table
        .iter()
        .filter(|(_, model)| keep(&lock(model)))
        .map(|(handle, _)| *handle)
        .collect();
    handles.sort_unstable();
    handles
}

impl Default for HeadlessGoogleMaps {
    fn default() -> Self {
        Self::new()
    }
}

impl GoogleMapsApi for HeadlessGoogleMaps {
    fn create_map(&self, options: &GMapOptions) -> Box<dyn GMap> {
        let ready_after = {
            let mut world = lock(&self.world);
            world.record("create_map");
            world.ready_after
        };
        let model = MapModel {
            options: options.clone(),
            center: options.center,
            zoom: options.zoom,
            map_type_id: options.map_type_id.clone(),
            map_types: Vec::new(),
            controls: Vec::new(),
            overlay_map_types: Vec::new(),
            resize_count: 0,
            polls_until_ready: ready_after,
        };
        Box::new(HeadlessMap {
            node: Node::create(&self.world, model, |w| &mut w.maps),
        })
    }
}

struct HeadlessMap {
    node: Node<MapModel>,
}

impl HeadlessMap {
    fn view_changed(&self, changed: &[&str]) {
        for event in changed {
            self.node.fire(event);
        }
        if !changed.is_empty() {
            self.node.fire("bounds_changed");
            self.node.fire("idle");
        }
    }
}

impl_event_target!(
    HeadlessMap,
    HeadlessMarker,
    HeadlessPolyline,
    HeadlessPolygon,
    HeadlessCircle,
    HeadlessInfoWindow,
);

impl GMap for HeadlessMap {
    fn get_bounds(&self) -> Option<GLatLngBounds> {
        let mut model = lock(&self.node.model);
        match model.polls_until_ready {
            Some(0) => Some(view_bounds(model.center, model.zoom)),
            Some(remaining) => {
                model.polls_until_ready = Some(remaining - 1);
                None
            }
            None => None,
        }
    }

    fn get_center(&self) -> GLatLng {
        self.node.read(|m| m.center)
    }

    fn set_center(&self, center: GLatLng) {
        let changed = self.node.write("map.set_center", |m| {
            std::mem::replace(&mut m.center, center) != center
        });
        self.view_changed(if changed { &["center_changed"] } else { &[] });
    }

    fn pan_to(&self, center: GLatLng) {
        let changed = self.node.write("map.pan_to", |m| {
            std::mem::replace(&mut m.center, center) != center
        });
        self.view_changed(if changed { &["center_changed"] } else { &[] });
    }

    fn fit_bounds(&self, bounds: GLatLngBounds) {
        let (center_changed, zoom_changed) = self.node.write("map.fit_bounds", |m| {
            let center = bounds.get_center();
            let zoom = zoom_to_fit(&bounds);
            let result = (m.center != center, m.zoom != zoom);
            m.center = center;
            m.zoom = zoom;
            result
        });
        let mut changed = Vec::new();
        if center_changed {
            changed.push("center_changed");
        }
        if zoom_changed {
            changed.push("zoom_changed");
        }
        self.view_changed(&changed);
    }

    fn get_zoom(&self) -> f64 {
        self.node.read(|m| m.zoom)
    }

    fn set_zoom(&self, zoom: f64) {
        let changed = self
            .node
            .write("map.set_zoom", |m| std::mem::replace(&mut m.zoom, zoom) != zoom);
        self.view_changed(if changed { &["zoom_changed"] } else { &[] });
    }

    fn get_map_type_id(&self) -> String {
        self.node.read(|m| m.map_type_id.clone())
    }

    fn set_map_type_id(&self, map_type_id: &str) {
        let changed = self.node.write("map.set_map_type_id", |m| {
            let changed = m.map_type_id != map_type_id;
            m.map_type_id = map_type_id.to_string();
            changed
        });
        if changed {
            self.node.fire("maptypeid_changed");
        }
    }

    fn register_map_type(&self, map_type_id: &str, map_type: GStyledMapType) {
        self.node.write("map.register_map_type", |m| {
            m.map_types.retain(|(id, _)| id != map_type_id);
            m.map_types.push((map_type_id.to_string(), map_type));
        });
    }

    fn trigger_resize(&self) {
        self.node.write("map.trigger_resize", |m| m.resize_count += 1);
    }

    fn add_control(&self, position: GControlPosition, id: &str, content: &str) {
        self.node.write("map.add_control", |m| {
            m.controls.push((position, id.to_string(), content.to_string()))
        });
    }

    fn push_overlay_map_type(&self, map_type: GImageMapType) {
        self.node
            .write("map.push_overlay_map_type", |m| m.overlay_map_types.push(map_type));
    }

    fn remove_overlay_map_type(&self, name: &str) -> bool {
        self.node.write("map.remove_overlay_map_type", |m| {
            let before = m.overlay_map_types.len();
            m.overlay_map_types.retain(|layer| layer.name != name);
            before != m.overlay_map_types.len()
        })
    }

    fn set_overlay_map_type_opacity(&self, name: &str, opacity: f64) {
        self.node.write("map.set_overlay_map_type_opacity", |m| {
            for layer in m.overlay_map_types.iter_mut().filter(|l| l.name == name) {
                layer.opacity = opacity;
            }
        });
    }

    fn create_marker(&self, options: GMarkerOptions) -> Box<dyn GMarker> {
        lock(&self.node.world).record("create_marker");
        let model = MarkerModel {
            options,
            on_map: true,
        };
        Box::new(HeadlessMarker {
            node: Node::create(&self.node.world, model, |w| &mut w.markers),
        })
    }

    fn create_polyline(&self, options: GPolylineOptions) -> Box<dyn GPolyline> {
        lock(&self.node.world).record("create_polyline");
        let model = PolylineModel {
            path: options.path.into_iter().collect(),
            style: options.style,
            clickable: options.clickable,
            draggable: options.draggable,
            editable: options.editable,
            visible: options.visible,
            on_map: true,
        };
        Box::new(HeadlessPolyline {
            node: Node::create(&self.node.world, model, |w| &mut w.polylines),
        })
    }

    fn create_polygon(&self, options: GPolygonOptions) -> Box<dyn GPolygon> {
        lock(&self.node.world).record("create_polygon");
        let model = PolygonModel {
            options,
            on_map: true,
        };
        Box::new(HeadlessPolygon {
            node: Node::create(&self.node.world, model, |w| &mut w.polygons),
        })
    }

    fn create_circle(&self, options: GCircleOptions) -> Box<dyn GCircle> {
        lock(&self.node.world).record("create_circle");
        let model = CircleModel {
            options,
            on_map: true,
        };
        Box::new(HeadlessCircle {
            node: Node::create(&self.node.world, model, |w| &mut w.circles),
        })
    }

    fn create_info_window(&self, options: GInfoWindowOptions) -> Box<dyn GInfoWindow> {
        lock(&self.node.world).record("create_info_window");
        let model = InfoWindowModel {
            options,
            open: false,
            anchor: None,
        };
        Box::new(HeadlessInfoWindow {
            node: Node::create(&self.node.world, model, |w| &mut w.info_windows),
        })
    }

    fn create_marker_clusterer(&self, options: GClustererOptions) -> Box<dyn GMarkerClusterer> {
        lock(&self.node.world).record("create_marker_clusterer");
        let model = ClustererModel {
            options,
            markers: Vec::new(),
            repaints: 0,
        };
        Box::new(HeadlessClusterer {
            node: Node::create(&self.node.world, model, |w| &mut w.clusterers),
        })
    }
}

struct HeadlessMarker {
    node: Node<MarkerModel>,
}

impl GMarker for HeadlessMarker {
    fn handle(&self) -> u64 {
        self.node.handle
    }

    fn get_position(&self) -> GLatLng {
        self.node.read(|m| m.options.position)
    }

    fn set_position(&self, position: GLatLng) {
        self.node
            .write("marker.set_position", |m| m.options.position = position);
    }

    fn set_icon(&self, icon: Option<GIcon>) {
        self.node.write("marker.set_icon", |m| m.options.icon = icon);
    }

    fn set_title(&self, title: Option<String>) {
        self.node.write("marker.set_title", |m| m.options.title = title);
    }

    fn get_draggable(&self) -> bool {
        self.node.read(|m| m.options.draggable)
    }

    fn set_draggable(&self, draggable: bool) {
        self.node
            .write("marker.set_draggable", |m| m.options.draggable = draggable);
    }

    fn get_visible(&self) -> bool {
        self.node.read(|m| m.options.visible)
    }

    fn set_visible(&self, visible: bool) {
        self.node
            .write("marker.set_visible", |m| m.options.visible = visible);
    }

    fn set_z_index(&self, z_index: i32) {
        self.node
            .write("marker.set_z_index", |m| m.options.z_index = z_index);
    }

    fn detach(&self) {
        self.node.write("marker.detach", |m| m.on_map = false);
    }
}

struct HeadlessPolyline {
    node: Node<PolylineModel>,
}

impl GPolyline for HeadlessPolyline {
    fn handle(&self) -> u64 {
        self.node.handle
    }

    fn get_path(&self) -> Vec<GLatLng> {
        self.node.read(|m| m.path.iter().copied().collect())
    }

    fn set_path(&self, path: Vec<GLatLng>) {
        self.node
            .write("polyline.set_path", |m| m.path = path.into_iter().collect());
    }

    fn path_length(&self) -> usize {
        self.node.read(|m| m.path.len())
    }

    fn path_get_at(&self, index: usize) -> Option<GLatLng> {
        self.node.read(|m| m.path.get(index).copied())
    }

    fn path_remove_at(&self, index: usize) {
        self.node.write("polyline.path_remove_at", |m| {
            m.path.remove(index);
        });
    }

    fn path_insert_at(&self, index: usize, point: GLatLng) {
        self.node.write("polyline.path_insert_at", |m| {
            if index <= m.path.len() {
                m.path.insert(index, point);
            }
        });
    }

    fn path_push(&self, point: GLatLng) {
        self.node
            .write("polyline.path_push", |m| m.path.push_back(point));
    }

    fn path_set_at(&self, index: usize, point: GLatLng) {
        self.node.write("polyline.path_set_at", |m| {
            if let Some(slot) = m.path.get_mut(index) {
                *slot = point;
            }
        });
    }

    fn set_options(&self, style: &GShapeStyle) {
        self.node
            .write("polyline.set_options", |m| m.style.merge(style));
    }

    fn set_draggable(&self, draggable: bool) {
        self.node
            .write("polyline.set_draggable", |m| m.draggable = draggable);
    }

    fn set_editable(&self, editable: bool) {
        self.node
            .write("polyline.set_editable", |m| m.editable = editable);
    }

    fn set_visible(&self, visible: bool) {
        self.node
            .write("polyline.set_visible", |m| m.visible = visible);
    }

    fn detach(&self) {
        self.node.write("polyline.detach", |m| m.on_map = false);
    }
}

struct HeadlessPolygon {
    node: Node<PolygonModel>,
}

impl GPolygon for HeadlessPolygon {
    fn handle(&self) -> u64 {
        self.node.handle
    }

    fn get_paths(&self) -> Vec<Vec<GLatLng>> {
        self.node.read(|m| m.options.paths.clone())
    }

    fn set_paths(&self, paths: Vec<Vec<GLatLng>>) {
        self.node
            .write("polygon.set_paths", |m| m.options.paths = paths);
    }

    fn set_path(&self, path: Vec<GLatLng>) {
        self.node.write("polygon.set_path", |m| {
            match m.options.paths.first_mut() {
                Some(first) => *first = path,
                None => m.options.paths.push(path),
            }
        });
    }

    fn set_options(&self, style: &GShapeStyle) {
        self.node
            .write("polygon.set_options", |m| m.options.style.merge(style));
    }

    fn set_draggable(&self, draggable: bool) {
        self.node
            .write("polygon.set_draggable", |m| m.options.draggable = draggable);
    }

    fn set_editable(&self, editable: bool) {
        self.node
            .write("polygon.set_editable", |m| m.options.editable = editable);
    }

    fn set_visible(&self, visible: bool) {
        self.node
            .write("polygon.set_visible", |m| m.options.visible = visible);
    }

    fn detach(&self) {
        self.node.write("polygon.detach", |m| m.on_map = false);
    }
}

struct HeadlessCircle {
    node: Node<CircleModel>,
}

impl GCircle for HeadlessCircle {
    fn handle(&self) -> u64 {
        self.node.handle
    }

    fn get_center(&self) -> GLatLng {
        self.node.read(|m| m.options.center)
    }

    fn set_center(&self, center: GLatLng) {
        self.node
            .write("circle.set_center", |m| m.options.center = center);
    }

    fn get_radius(&self) -> f64 {
        self.node.read(|m| m.options.radius)
    }

    fn set_radius(&self, radius: f64) {
        self.node
            .write("circle.set_radius", |m| m.options.radius = radius);
    }

    fn set_options(&self, style: &GShapeStyle) {
        self.node
            .write("circle.set_options", |m| m.options.style.merge(style));
    }

    fn set_visible(&self, visible: bool) {
        self.node
            .write("circle.set_visible", |m| m.options.visible = visible);
    }

    fn detach(&self) {
        self.node.write("circle.detach", |m| m.on_map = false);
    }
}

struct HeadlessInfoWindow {
    node: Node<InfoWindowModel>,
}

impl GInfoWindow for HeadlessInfoWindow {
    fn handle(&self) -> u64 {
        self.node.handle
    }

    fn set_content(&self, content: &str) {
        self.node.write("info_window.set_content", |m| {
            m.options.content = content.to_string()
        });
    }

    fn get_position(&self) -> Option<GLatLng> {
        self.node.read(|m| m.options.position)
    }

    fn set_position(&self, position: GLatLng) {
        self.node
            .write("info_window.set_position", |m| m.options.position = Some(position));
    }

    fn set_options(&self, options: &GInfoWindowOptions) {
        self.node
            .write("info_window.set_options", |m| m.options = options.clone());
    }

    fn set_z_index(&self, z_index: i32) {
        self.node
            .write("info_window.set_z_index", |m| m.options.z_index = z_index);
    }

    fn open(&self, anchor: Option<u64>) {
        self.node.write("info_window.open", |m| {
            m.open = true;
            m.anchor = anchor;
        });
    }

    fn close(&self) {
        self.node.write("info_window.close", |m| {
            m.open = false;
            m.anchor = None;
        });
    }
}

struct HeadlessClusterer {
    node: Node<ClustererModel>,
}

impl GMarkerClusterer for HeadlessClusterer {
    fn add_markers(&self, markers: &[u64]) {
        self.node.write("clusterer.add_markers", |m| {
            for handle in markers {
                if !m.markers.contains(handle) {
                    m.markers.push(*handle);
                }
            }
        });
    }

    fn remove_markers(&self, markers: &[u64]) {
        self.node.write("clusterer.remove_markers", |m| {
            m.markers.retain(|handle| !markers.contains(handle))
        });
    }

    fn clear_markers(&self) {
        self.node
            .write("clusterer.clear_markers", |m| m.markers.clear());
    }

    fn repaint(&self) {
        self.node.write("clusterer.repaint", |m| m.repaints += 1);
    }

    fn get_max_zoom(&self) -> Option<f64> {
        self.node.read(|m| m.options.max_zoom)
    }

    fn set_max_zoom(&self, max_zoom: Option<f64>) {
        self.node
            .write("clusterer.set_max_zoom", |m| m.options.max_zoom = max_zoom);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn map_options() -> GMapOptions {
        GMapOptions {
            center: GLatLng::new(51.5, -0.125),
            zoom: 12.0,
            map_type_id: map_type_id::ROADMAP.to_string(),
            map_type_control: true,
            map_type_control_options: GMapTypeControlOptions {
                style: GMapTypeControlStyle::DEFAULT,
                position: GControlPosition::TOP_LEFT,
                map_type_ids: vec![map_type_id::ROADMAP.to_string()],
            },
            zoom_control_position: GControlPosition::RIGHT_TOP,
            street_view_control: false,
            scroll_wheel: true,
            scale_control: true,
            draggable: true,
            styles: Vec::new(),
        }
    }

    #[test]
    fn test_bounds_after_polls() {
        let engine = HeadlessGoogleMaps::ready_after_polls(2);
        let map = engine.create_map(&map_options());
        assert!(map.get_bounds().is_none());
        assert!(map.get_bounds().is_none());
        let bounds = map.get_bounds().unwrap();
        assert!(bounds.get_north_east().lat() > bounds.get_south_west().lat());
    }

    #[test]
    fn test_listener_removal() {
        let engine = HeadlessGoogleMaps::new();
        let map = engine.create_map(&map_options());
        let fired = Arc::new(AtomicUsize::new(0));
        let f = fired.clone();
        let listener = map.add_listener(
            "zoom_changed",
            Arc::new(move |_: &GMouseEvent| {
                f.fetch_add(1, Ordering::SeqCst);
            }),
        );
        assert_eq!(engine.listener_count(), 1);

        map.set_zoom(5.0);
        map.set_zoom(5.0);
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        listener.remove();
        assert_eq!(engine.listener_count(), 0);
        map.set_zoom(6.0);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_path_edits() {
        let engine = HeadlessGoogleMaps::new();
        let map = engine.create_map(&map_options());
        let line = map.create_polyline(GPolylineOptions {
            path: vec![GLatLng::new(0.0, 0.0), GLatLng::new(1.0, 1.0)],
            style: GShapeStyle::default(),
            clickable: false,
            draggable: false,
            editable: false,
            visible: true,
        });

        line.path_insert_at(0, GLatLng::new(-1.0, -1.0));
        line.path_push(GLatLng::new(2.0, 2.0));
        line.path_remove_at(1);
        assert_eq!(
            line.get_path(),
            vec![
                GLatLng::new(-1.0, -1.0),
                GLatLng::new(1.0, 1.0),
                GLatLng::new(2.0, 2.0)
            ]
        );
        assert_eq!(engine.calls("polyline.path_remove_at"), 1);
    }

    #[test]
    fn test_detach_keeps_model() {
        let engine = HeadlessGoogleMaps::new();
        let map = engine.create_map(&map_options());
        let marker = map.create_marker(GMarkerOptions {
            position: GLatLng::new(1.0, 2.0),
            icon: None,
            title: None,
            clickable: true,
            draggable: false,
            visible: true,
            z_index: 0,
        });

        assert_eq!(engine.markers_on_map(), vec![marker.handle()]);
        marker.detach();
        assert!(engine.markers_on_map().is_empty());
        assert!(!engine.marker(marker.handle()).unwrap().on_map);
    }
}
