use crate::{
    core::{
        bounds::Bounds,
        constants::{
            DEFAULT_MAP_BRIGHTNESS, GOOGLE_MAPS_SCRIPT_KEY, GOOGLE_MAPS_SCRIPT_URL,
            HIGH_CONTRAST_MAP_TYPE_ID,
        },
        geo::LatLng,
        options::{
            CircleOptions, ClustererSettings, InfoWindowOptions, LayerSettings, MapOptions,
            MarkerOptions, OpenCallbacks, PolygonOptions, PolylineOptions, ResolvedMapOptions,
            TrimResult,
        },
        state::MapState,
        types::{Capabilities, MapControl, MapControlPosition, MapStatus, MapType, OverlayId, Provider},
    },
    events::{MapEvent, MapEvents, MouseEvent},
    map::{base::MapBase, lowest_unused_id, MapAdapter, MapEnvironment},
    overlays::{
        registry::OverlayRegistry, MapCircle, MapInfoWindow, MapMarker, MapPolygon, MapPolyline,
    },
    prelude::{HashMap, HashSet},
    providers::google::{
        convert::{to_native_control_position, to_native_control_style, to_native_map_type, from_native_map_type},
        native::*,
        overlays::{GoogleCircle, GoogleInfoWindow, GoogleMarker, GooglePolygon, GooglePolyline},
    },
    runtime,
    services::{
        script::{ScriptLoader, ScriptRequest},
        text::{keys, localise},
    },
    Result,
};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde_json::{json, Value};
use std::sync::{atomic::AtomicBool, Arc};

/// Styling rules for the high contrast map type
static HIGH_CONTRAST_STYLES: Lazy<Vec<Value>> = Lazy::new(|| {
    vec![
        json!({ "featureType": "all", "elementType": "labels.text.fill", "stylers": [{ "color": "#ffffff" }] }),
        json!({ "featureType": "all", "elementType": "labels.text.stroke", "stylers": [{ "color": "#000000" }, { "lightness": 13 }] }),
        json!({ "featureType": "administrative", "elementType": "geometry.stroke", "stylers": [{ "color": "#144b53" }, { "lightness": 14 }, { "weight": 1.4 }] }),
        json!({ "featureType": "landscape", "elementType": "all", "stylers": [{ "color": "#08304b" }] }),
        json!({ "featureType": "road.highway", "elementType": "geometry.fill", "stylers": [{ "color": "#000000" }] }),
        json!({ "featureType": "road.arterial", "elementType": "geometry.fill", "stylers": [{ "color": "#000000" }] }),
        json!({ "featureType": "water", "elementType": "all", "stylers": [{ "color": "#021019" }] }),
    ]
});

/// Hides point-of-interest labels on the base map
static HIDE_POINTS_OF_INTEREST: Lazy<Value> = Lazy::new(|| {
    json!({ "featureType": "poi", "elementType": "labels", "stylers": [{ "visibility": "off" }] })
});

/// Map types offered in the picker, in display order
const PICKER_MAP_TYPES: [MapType; 4] = [
    MapType::RoadMap,
    MapType::Terrain,
    MapType::Satellite,
    MapType::Hybrid,
];

type EventMapper = fn(&GMouseEvent) -> MapEvent;

/// Native map events and the adapter events they become
const MAP_EVENTS: [(&str, EventMapper); 9] = [
    ("bounds_changed", |_| MapEvent::BoundsChanged),
    ("center_changed", |_| MapEvent::CenterChanged),
    ("click", |e| MapEvent::Clicked(MouseEvent::from_native(*e))),
    ("dblclick", |e| MapEvent::DoubleClicked(MouseEvent::from_native(*e))),
    ("idle", |_| MapEvent::Idle),
    ("maptypeid_changed", |_| MapEvent::MapTypeChanged),
    ("rightclick", |e| MapEvent::RightClicked(MouseEvent::from_native(*e))),
    ("tilesloaded", |_| MapEvent::TilesLoaded),
    ("zoom_changed", |_| MapEvent::ZoomChanged),
];

/// Map adapter over the commercial map service
pub struct GoogleMap {
    base: MapBase,
    api: Arc<dyn GoogleMapsApi>,
    loader: Arc<ScriptLoader>,
    native: Option<Box<dyn GMap>>,
    map_listeners: Vec<GListener>,
    high_contrast_registered: bool,
    markers: OverlayRegistry<GoogleMarker>,
    polylines: OverlayRegistry<GooglePolyline>,
    polygons: OverlayRegistry<GooglePolygon>,
    circles: OverlayRegistry<GoogleCircle>,
    info_windows: OverlayRegistry<GoogleInfoWindow>,
    clusterer: Option<Box<dyn GMarkerClusterer>>,
    clustered: HashSet<OverlayId>,
    /// Overlay image layers by id, with their opacity
    layers: HashMap<String, f64>,
}

impl GoogleMap {
    /// `loader` should be shared by every map on the page so the library
    /// script is fetched once.
    pub fn new(
        name: &str,
        options: MapOptions,
        api: Arc<dyn GoogleMapsApi>,
        loader: Arc<ScriptLoader>,
        env: MapEnvironment,
    ) -> Result<Self> {
        Ok(Self {
            base: MapBase::new(name, options, env)?,
            api,
            loader,
            native: None,
            map_listeners: Vec::new(),
            high_contrast_registered: false,
            markers: OverlayRegistry::new(),
            polylines: OverlayRegistry::new(),
            polygons: OverlayRegistry::new(),
            circles: OverlayRegistry::new(),
            info_windows: OverlayRegistry::new(),
            clusterer: None,
            clustered: HashSet::default(),
            layers: HashMap::default(),
        })
    }

    /// The native map, for interop the adapter does not cover
    pub fn native(&self) -> Option<&dyn GMap> {
        self.native.as_deref()
    }

    fn script_request(&self) -> ScriptRequest {
        let mut request = ScriptRequest::new(
            GOOGLE_MAPS_SCRIPT_KEY,
            GOOGLE_MAPS_SCRIPT_URL,
            self.base.env.runtime.script_timeout,
        );
        let api_key = self
            .base
            .env
            .server_defaults
            .as_ref()
            .and_then(|d| d.google_maps_api_key.as_deref())
            .filter(|key| !key.is_empty());
        if let Some(key) = api_key {
            request = request.with_param("key", key);
        }
        request
    }

    fn native_options(settings: &ResolvedMapOptions) -> Result<GMapOptions> {
        let mut map_type_ids = Vec::new();
        for map_type in PICKER_MAP_TYPES {
            if let Some(id) = to_native_map_type(map_type, true)? {
                map_type_ids.push(id.to_string());
            }
        }
        if settings.show_high_contrast {
            map_type_ids.push(HIGH_CONTRAST_MAP_TYPE_ID.to_string());
        }

        let styles = if settings.show_points_of_interest {
            Vec::new()
        } else {
            vec![HIDE_POINTS_OF_INTEREST.clone()]
        };

        let map_type_id = to_native_map_type(settings.map_type, true)?.unwrap_or(map_type_id::ROADMAP);

        Ok(GMapOptions {
            center: GLatLng::from(&settings.center),
            zoom: settings.zoom,
            map_type_id: map_type_id.to_string(),
            map_type_control: settings.show_map_type_control,
            map_type_control_options: GMapTypeControlOptions {
                style: to_native_control_style(settings.map_type_control_style),
                position: to_native_control_position(settings.map_type_control_position)?,
                map_type_ids,
            },
            zoom_control_position: to_native_control_position(settings.zoom_control_position)?,
            street_view_control: settings.street_view_control,
            scroll_wheel: settings.scroll_wheel,
            scale_control: settings.scale_control,
            draggable: settings.draggable,
            styles,
        })
    }

    fn register_high_contrast(&mut self) {
        if self.high_contrast_registered {
            return;
        }
        if let Some(native) = &self.native {
            native.register_map_type(
                HIGH_CONTRAST_MAP_TYPE_ID,
                GStyledMapType {
                    name: localise(self.base.env.localiser.as_ref(), keys::HIGH_CONTRAST_MAP_NAME),
                    styles: HIGH_CONTRAST_STYLES.clone(),
                },
            );
            self.high_contrast_registered = true;
        }
    }

    /// Subscribes once to every native map event the adapter re-publishes
    fn hook_native_events(&mut self) {
        let Some(native) = &self.native else {
            return;
        };
        for (name, mapper) in MAP_EVENTS {
            let events = self.base.events.clone();
            self.map_listeners.push(native.add_listener(
                name,
                Arc::new(move |e: &GMouseEvent| events.publish(mapper(e))),
            ));
        }
    }

    async fn wait_until_ready(&self) -> Result<()> {
        let native = self.native.as_deref();
        let runtime = &self.base.env.runtime;
        runtime::wait_until(
            || native.map_or(false, |n| n.get_bounds().is_some()),
            runtime.ready_poll_interval,
            runtime.ready_max_wait,
        )
        .await
    }

    fn marker_handles(&self, ids: &[OverlayId]) -> Vec<(OverlayId, u64)> {
        ids.iter()
            .filter_map(|id| {
                let handle = self.markers.get(id)?.native_handle()?;
                Some((id.clone(), handle))
            })
            .collect()
    }

    fn snapshot_view(&mut self) {
        if self.native.is_some() {
            self.base.settings.zoom = self.zoom();
            self.base.settings.center = self.center();
            self.base.settings.map_type = self.map_type();
        }
    }
}

fn shape_style(
    stroke_colour: &str,
    stroke_opacity: f64,
    stroke_weight: f64,
    fill: Option<(&str, f64)>,
    z_index: i32,
) -> GShapeStyle {
    GShapeStyle {
        stroke_color: Some(stroke_colour.to_string()),
        stroke_opacity: Some(stroke_opacity),
        stroke_weight: Some(stroke_weight),
        fill_color: fill.map(|(colour, _)| colour.to_string()),
        fill_opacity: fill.map(|(_, opacity)| opacity),
        z_index: Some(z_index),
    }
}

#[async_trait]
impl MapAdapter for GoogleMap {
    fn name(&self) -> &str {
        &self.base.name
    }

    fn provider(&self) -> Provider {
        Provider::GoogleMaps
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            polygons: true,
            info_windows: true,
            clustering: true,
            layers: true,
            brightness: false,
        }
    }

    fn status(&self) -> MapStatus {
        self.base.status.clone()
    }

    fn is_ready(&self) -> bool {
        self.native
            .as_ref()
            .map_or(false, |n| n.get_bounds().is_some())
    }

    async fn open(&mut self, options: Option<MapOptions>, callbacks: OpenCallbacks) -> Result<MapStatus> {
        self.base.ensure_not_destroyed()?;
        if self.native.is_some() {
            log::debug!("map {} is already open", self.base.name);
            return Ok(self.base.status.clone());
        }

        let settings = self.base.resolve_open_options(options.as_ref());
        let native_options = Self::native_options(&settings)?;
        let mut controls = Vec::with_capacity(settings.controls.len());
        for (control, position) in &settings.controls {
            controls.push((to_native_control_position(*position)?, control.clone()));
        }

        self.base.settings = settings.clone();
        self.base.status = MapStatus::Opening;
        log::info!("opening map {}", self.base.name);

        if let Err(error) = self.loader.load(self.script_request()).await {
            return Ok(self.base.fail_load(&error, callbacks));
        }
        self.base.env.container.clear_placeholder();

        self.native = Some(self.api.create_map(&native_options));
        if settings.show_high_contrast || settings.map_type == MapType::HighContrast {
            self.register_high_contrast();
            if let Some(native) = &self.native {
                if settings.map_type == MapType::HighContrast {
                    native.set_map_type_id(HIGH_CONTRAST_MAP_TYPE_ID);
                }
            }
        }
        if let Some(native) = &self.native {
            for (position, control) in &controls {
                native.add_control(*position, &control.id, &control.content);
            }
        }
        self.hook_native_events();
        self.base.status = MapStatus::Open;

        if let Some(after_create) = callbacks.after_create {
            after_create();
        }

        let ready = if settings.wait_until_ready {
            self.wait_until_ready().await
        } else {
            Ok(())
        };
        match &ready {
            Ok(()) => log::info!("map {} is open", self.base.name),
            Err(e) => log::warn!("map {} is open but not ready: {}", self.base.name, e),
        }

        if let Some(after_open) = callbacks.after_open {
            after_open();
        }
        ready.map(|()| MapStatus::Open)
    }

    fn destroy(&mut self) {
        if self.base.status == MapStatus::Destroyed {
            return;
        }
        self.snapshot_view();

        if let Some(clusterer) = self.clusterer.take() {
            clusterer.clear_markers();
        }
        self.clustered.clear();
        self.info_windows.destroy_all();
        self.markers.destroy_all();
        self.polylines.destroy_all();
        self.polygons.destroy_all();
        self.circles.destroy_all();
        if let Some(native) = &self.native {
            for id in self.layers.keys() {
                native.remove_overlay_map_type(id);
            }
        }
        self.layers.clear();

        for listener in self.map_listeners.drain(..) {
            listener.remove();
        }
        self.native = None;
        self.base.status = MapStatus::Destroyed;
        log::info!("destroyed map {}", self.base.name);
    }

    fn refresh_map(&mut self) {
        if let Some(native) = &self.native {
            let center = native.get_center();
            native.trigger_resize();
            native.set_center(center);
        }
    }

    fn events(&self) -> &MapEvents {
        &self.base.events
    }

    fn bounds(&self) -> Option<Bounds> {
        let native = self.native.as_ref()?;
        native.get_bounds().as_ref().map(Bounds::from)
    }

    fn fit_bounds(&mut self, bounds: &Bounds) {
        match &self.native {
            Some(native) => native.fit_bounds(GLatLngBounds::from(bounds)),
            None => {
                let center = bounds.center();
                self.base.update_options(|o| o.center = Some(center));
            }
        }
    }

    fn center(&self) -> LatLng {
        match &self.native {
            Some(native) => LatLng::from(&native.get_center()),
            None => self.base.settings.center,
        }
    }

    fn set_center(&mut self, center: LatLng) {
        match &self.native {
            Some(native) => native.set_center(GLatLng::from(&center)),
            None => self.base.update_options(|o| o.center = Some(center)),
        }
    }

    fn pan_to(&mut self, center: LatLng) {
        match &self.native {
            Some(native) => native.pan_to(GLatLng::from(&center)),
            None => self.base.update_options(|o| o.center = Some(center)),
        }
    }

    fn zoom(&self) -> f64 {
        self.native
            .as_ref()
            .map_or(self.base.settings.zoom, |n| n.get_zoom())
    }

    fn set_zoom(&mut self, zoom: f64) {
        match &self.native {
            Some(native) => native.set_zoom(zoom),
            None => self.base.update_options(|o| o.zoom = Some(zoom)),
        }
    }

    fn map_type(&self) -> MapType {
        let native_type = self
            .native
            .as_ref()
            .and_then(|n| from_native_map_type(&n.get_map_type_id(), true).ok().flatten());
        native_type.unwrap_or(self.base.settings.map_type)
    }

    fn set_map_type(&mut self, map_type: MapType) {
        let Some(id) = to_native_map_type(map_type, true).ok().flatten() else {
            log::debug!("map type {} is not available", map_type);
            return;
        };
        if self.native.is_none() {
            self.base.update_options(|o| o.map_type = Some(map_type));
            return;
        }
        if map_type == MapType::HighContrast {
            self.register_high_contrast();
        }
        if let Some(native) = &self.native {
            native.set_map_type_id(id);
        }
    }

    fn is_draggable(&self) -> bool {
        self.base.settings.draggable
    }

    fn has_scroll_wheel(&self) -> bool {
        self.base.settings.scroll_wheel
    }

    fn add_control(&mut self, control: MapControl, position: MapControlPosition) -> bool {
        let Some(native) = &self.native else {
            return false;
        };
        match to_native_control_position(position) {
            Ok(native_position) => {
                native.add_control(native_position, &control.id, &control.content);
                true
            }
            Err(e) => {
                log::warn!("cannot add control {}: {}", control.id, e);
                false
            }
        }
    }

    fn save_state(&self) -> Result<()> {
        self.base.save_state(&self.create_settings())
    }

    fn load_state(&self) -> MapState {
        self.base.load_state(self.create_settings())
    }

    fn add_marker(&mut self, id: OverlayId, options: MarkerOptions) -> Option<&mut dyn MapMarker> {
        if self.native.is_none() {
            log::debug!("marker {} not added, map {} is not open", id, self.base.name);
            return None;
        }
        self.destroy_marker(&id);
        let native_map = self.native.as_ref()?;

        let native = native_map.create_marker(GMarkerOptions {
            position: GLatLng::from(&options.position),
            icon: options.icon.as_ref().map(GIcon::from),
            title: options.tooltip.clone(),
            clickable: options.clickable,
            draggable: options.draggable,
            visible: options.visible,
            z_index: options.z_index,
        });

        let mut listeners = Vec::new();
        if options.clickable {
            let events = self.base.events.clone();
            let marker_id = id.clone();
            listeners.push(native.add_listener(
                "click",
                Arc::new(move |e: &GMouseEvent| {
                    events.publish(MapEvent::MarkerClicked {
                        id: marker_id.clone(),
                        mouse: MouseEvent::from_native(*e),
                    })
                }),
            ));
        }
        let events = self.base.events.clone();
        let marker_id = id.clone();
        listeners.push(native.add_listener(
            "dragend",
            Arc::new(move |e: &GMouseEvent| {
                events.publish(MapEvent::MarkerDragged {
                    id: marker_id.clone(),
                    mouse: MouseEvent::from_native(*e),
                })
            }),
        ));

        let wrapper = GoogleMarker::new(id.clone(), native, listeners, options);
        Some(self.markers.insert(id, wrapper))
    }

    fn marker(&self, id: &OverlayId) -> Option<&dyn MapMarker> {
        self.markers.get(id).map(|m| m as &dyn MapMarker)
    }

    fn marker_mut(&mut self, id: &OverlayId) -> Option<&mut dyn MapMarker> {
        self.markers.get_mut(id).map(|m| m as &mut dyn MapMarker)
    }

    fn marker_ids(&self) -> Vec<OverlayId> {
        self.markers.ids()
    }

    fn destroy_marker(&mut self, id: &OverlayId) -> bool {
        if self.clustered.remove(id) {
            let handle = self.markers.get(id).and_then(|m| m.native_handle());
            if let (Some(clusterer), Some(handle)) = (&self.clusterer, handle) {
                clusterer.remove_markers(&[handle]);
            }
        }
        self.markers.destroy(id)
    }

    fn create_marker_clusterer(&mut self, settings: ClustererSettings) -> bool {
        let Some(native) = &self.native else {
            return false;
        };
        if let Some(previous) = self.clusterer.take() {
            previous.clear_markers();
            self.clustered.clear();
        }
        self.clusterer = Some(native.create_marker_clusterer(GClustererOptions {
            max_zoom: settings.max_zoom,
            grid_size: settings.grid_size,
            minimum_cluster_size: settings.minimum_cluster_size,
        }));
        true
    }

    fn cluster_markers(&mut self, ids: &[OverlayId]) -> usize {
        if self.clusterer.is_none() {
            log::debug!("no clusterer on map {}", self.base.name);
            return 0;
        }
        let added: Vec<(OverlayId, u64)> = self
            .marker_handles(ids)
            .into_iter()
            .filter(|(id, _)| !self.clustered.contains(id))
            .collect();
        if let Some(clusterer) = &self.clusterer {
            let handles: Vec<u64> = added.iter().map(|(_, h)| *h).collect();
            clusterer.add_markers(&handles);
        }
        let count = added.len();
        self.clustered.extend(added.into_iter().map(|(id, _)| id));
        count
    }

    fn uncluster_markers(&mut self, ids: &[OverlayId]) -> usize {
        if self.clusterer.is_none() {
            return 0;
        }
        let removed: Vec<(OverlayId, u64)> = self
            .marker_handles(ids)
            .into_iter()
            .filter(|(id, _)| self.clustered.contains(id))
            .collect();
        if let Some(clusterer) = &self.clusterer {
            let handles: Vec<u64> = removed.iter().map(|(_, h)| *h).collect();
            clusterer.remove_markers(&handles);
        }
        for (id, _) in &removed {
            self.clustered.remove(id);
        }
        removed.len()
    }

    fn repaint_clusterer(&mut self) {
        if let Some(clusterer) = &self.clusterer {
            clusterer.repaint();
        }
    }

    fn clusterer_max_zoom(&self) -> Option<f64> {
        self.clusterer.as_ref().and_then(|c| c.get_max_zoom())
    }

    fn set_clusterer_max_zoom(&mut self, max_zoom: Option<f64>) {
        if let Some(clusterer) = &self.clusterer {
            if clusterer.get_max_zoom() != max_zoom {
                clusterer.set_max_zoom(max_zoom);
            }
        }
    }

    fn add_polyline(&mut self, id: OverlayId, options: PolylineOptions) -> Option<&mut dyn MapPolyline> {
        if self.native.is_none() {
            log::debug!("polyline {} not added, map {} is not open", id, self.base.name);
            return None;
        }
        self.destroy_polyline(&id);
        let native_map = self.native.as_ref()?;

        let native = native_map.create_polyline(GPolylineOptions {
            path: options.path.iter().map(GLatLng::from).collect(),
            style: shape_style(
                &options.stroke_colour,
                options.stroke_opacity,
                options.stroke_weight,
                None,
                options.z_index,
            ),
            clickable: options.clickable,
            draggable: options.draggable,
            editable: options.editable,
            visible: options.visible,
        });
        let wrapper = GooglePolyline::new(id.clone(), native, options);
        Some(self.polylines.insert(id, wrapper))
    }

    fn polyline(&self, id: &OverlayId) -> Option<&dyn MapPolyline> {
        self.polylines.get(id).map(|p| p as &dyn MapPolyline)
    }

    fn polyline_mut(&mut self, id: &OverlayId) -> Option<&mut dyn MapPolyline> {
        self.polylines.get_mut(id).map(|p| p as &mut dyn MapPolyline)
    }

    fn polyline_ids(&self) -> Vec<OverlayId> {
        self.polylines.ids()
    }

    fn destroy_polyline(&mut self, id: &OverlayId) -> bool {
        self.polylines.destroy(id)
    }

    fn trim_polyline(&mut self, id: &OverlayId, count: usize, from_start: bool) -> TrimResult {
        self.polylines
            .get_mut(id)
            .map_or(TrimResult::default(), |p| p.trim(count, from_start))
    }

    fn remove_polyline_point_at(&mut self, id: &OverlayId, index: isize) {
        if let Some(polyline) = self.polylines.get_mut(id) {
            polyline.remove_point_at(index);
        }
    }

    fn append_to_polyline(&mut self, id: &OverlayId, points: &[LatLng], to_start: bool) {
        if let Some(polyline) = self.polylines.get_mut(id) {
            polyline.append(points, to_start);
        }
    }

    fn replace_polyline_point_at(&mut self, id: &OverlayId, index: isize, point: LatLng) {
        if let Some(polyline) = self.polylines.get_mut(id) {
            polyline.replace_point_at(index, point);
        }
    }

    fn add_polygon(&mut self, id: OverlayId, options: PolygonOptions) -> Option<&mut dyn MapPolygon> {
        if self.native.is_none() {
            log::debug!("polygon {} not added, map {} is not open", id, self.base.name);
            return None;
        }
        self.destroy_polygon(&id);
        let native_map = self.native.as_ref()?;

        let native = native_map.create_polygon(GPolygonOptions {
            paths: options
                .paths
                .iter()
                .map(|path| path.iter().map(GLatLng::from).collect())
                .collect(),
            style: shape_style(
                &options.stroke_colour,
                options.stroke_opacity,
                options.stroke_weight,
                Some((options.fill_colour.as_str(), options.fill_opacity)),
                options.z_index,
            ),
            clickable: options.clickable,
            draggable: options.draggable,
            editable: options.editable,
            visible: options.visible,
        });
        let wrapper = GooglePolygon::new(id.clone(), native, options);
        Some(self.polygons.insert(id, wrapper))
    }

    fn polygon(&self, id: &OverlayId) -> Option<&dyn MapPolygon> {
        self.polygons.get(id).map(|p| p as &dyn MapPolygon)
    }

    fn polygon_mut(&mut self, id: &OverlayId) -> Option<&mut dyn MapPolygon> {
        self.polygons.get_mut(id).map(|p| p as &mut dyn MapPolygon)
    }

    fn destroy_polygon(&mut self, id: &OverlayId) -> bool {
        self.polygons.destroy(id)
    }

    fn add_circle(&mut self, id: OverlayId, options: CircleOptions) -> Option<&mut dyn MapCircle> {
        if self.native.is_none() {
            log::debug!("circle {} not added, map {} is not open", id, self.base.name);
            return None;
        }
        self.destroy_circle(&id);
        let native_map = self.native.as_ref()?;

        let native = native_map.create_circle(GCircleOptions {
            center: GLatLng::from(&options.center),
            radius: options.radius,
            style: shape_style(
                &options.stroke_colour,
                options.stroke_opacity,
                options.stroke_weight,
                Some((options.fill_colour.as_str(), options.fill_opacity)),
                options.z_index,
            ),
            clickable: options.clickable,
            draggable: options.draggable,
            editable: options.editable,
            visible: options.visible,
        });
        let wrapper = GoogleCircle::new(id.clone(), native, options);
        Some(self.circles.insert(id, wrapper))
    }

    fn circle(&self, id: &OverlayId) -> Option<&dyn MapCircle> {
        self.circles.get(id).map(|c| c as &dyn MapCircle)
    }

    fn circle_mut(&mut self, id: &OverlayId) -> Option<&mut dyn MapCircle> {
        self.circles.get_mut(id).map(|c| c as &mut dyn MapCircle)
    }

    fn destroy_circle(&mut self, id: &OverlayId) -> bool {
        self.circles.destroy(id)
    }

    fn unused_circle_id(&self) -> OverlayId {
        lowest_unused_id(self.circles.ids().into_iter())
    }

    fn add_info_window(&mut self, id: OverlayId, options: InfoWindowOptions) -> Option<&mut dyn MapInfoWindow> {
        if self.native.is_none() {
            log::debug!("info window {} not added, map {} is not open", id, self.base.name);
            return None;
        }
        self.destroy_info_window(&id);
        let native_map = self.native.as_ref()?;

        let native = native_map.create_info_window(GoogleInfoWindow::native_options(&options));
        let open = Arc::new(AtomicBool::new(false));
        let events = self.base.events.clone();
        let window_id = id.clone();
        let closed = open.clone();
        let listener = native.add_listener(
            "closeclick",
            Arc::new(move |_: &GMouseEvent| {
                closed.store(false, std::sync::atomic::Ordering::SeqCst);
                events.publish(MapEvent::InfoWindowClosedByUser {
                    id: window_id.clone(),
                });
            }),
        );

        let wrapper = GoogleInfoWindow::new(id.clone(), native, vec![listener], open, options);
        Some(self.info_windows.insert(id, wrapper))
    }

    fn info_window(&self, id: &OverlayId) -> Option<&dyn MapInfoWindow> {
        self.info_windows.get(id).map(|w| w as &dyn MapInfoWindow)
    }

    fn info_window_mut(&mut self, id: &OverlayId) -> Option<&mut dyn MapInfoWindow> {
        self.info_windows
            .get_mut(id)
            .map(|w| w as &mut dyn MapInfoWindow)
    }

    fn destroy_info_window(&mut self, id: &OverlayId) -> bool {
        self.info_windows.destroy(id)
    }

    fn open_info_window(&mut self, id: &OverlayId, anchor: Option<&OverlayId>) -> bool {
        let anchor_handle = anchor
            .and_then(|a| self.markers.get(a))
            .and_then(|m| m.native_handle());
        match self.info_windows.get_mut(id) {
            Some(window) => {
                window.open(anchor_handle);
                true
            }
            None => false,
        }
    }

    fn close_info_window(&mut self, id: &OverlayId) -> bool {
        match self.info_windows.get_mut(id) {
            Some(window) => {
                window.close();
                true
            }
            None => false,
        }
    }

    fn add_layer(&mut self, settings: LayerSettings, opacity: f64) -> bool {
        let Some(native) = &self.native else {
            return false;
        };
        if self.layers.remove(&settings.id).is_some() {
            native.remove_overlay_map_type(&settings.id);
        }
        native.push_overlay_map_type(GImageMapType {
            name: settings.id.clone(),
            url_template: settings.url_template,
            opacity,
            min_zoom: settings.min_zoom,
            max_zoom: settings.max_zoom,
        });
        self.layers.insert(settings.id, opacity);
        true
    }

    fn destroy_layer(&mut self, id: &str) -> bool {
        if self.layers.remove(id).is_none() {
            return false;
        }
        if let Some(native) = &self.native {
            native.remove_overlay_map_type(id);
        }
        true
    }

    fn has_layer(&self, id: &str) -> bool {
        self.layers.contains_key(id)
    }

    fn layer_opacity(&self, id: &str) -> Option<f64> {
        self.layers.get(id).copied()
    }

    fn set_layer_opacity(&mut self, id: &str, opacity: f64) -> bool {
        let Some(current) = self.layers.get_mut(id) else {
            return false;
        };
        if *current != opacity {
            *current = opacity;
            if let Some(native) = &self.native {
                native.set_overlay_map_type_opacity(id, opacity);
            }
        }
        true
    }

    fn default_map_brightness(&self) -> u32 {
        DEFAULT_MAP_BRIGHTNESS
    }

    fn map_brightness(&self) -> u32 {
        DEFAULT_MAP_BRIGHTNESS
    }

    fn set_map_brightness(&mut self, brightness: u32) {
        log::debug!("map {} cannot change brightness to {}", self.base.name, brightness);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_options_hide_points_of_interest() {
        let settings = MapOptions::default().resolve();
        let options = GoogleMap::native_options(&settings).unwrap();
        assert_eq!(options.styles.len(), 1);
        assert_eq!(options.map_type_id, "roadmap");
        assert_eq!(options.zoom_control_position, GControlPosition::RIGHT_TOP);
        assert!(!options
            .map_type_control_options
            .map_type_ids
            .contains(&HIGH_CONTRAST_MAP_TYPE_ID.to_string()));
    }

    #[test]
    fn test_native_options_offer_high_contrast() {
        let settings = MapOptions {
            show_high_contrast: Some(true),
            show_points_of_interest: Some(true),
            map_type: Some(MapType::Satellite),
            ..MapOptions::default()
        }
        .resolve();
        let options = GoogleMap::native_options(&settings).unwrap();
        assert!(options.styles.is_empty());
        assert_eq!(options.map_type_id, "satellite");
        assert_eq!(
            options.map_type_control_options.map_type_ids.last().map(String::as_str),
            Some(HIGH_CONTRAST_MAP_TYPE_ID)
        );
    }
}
