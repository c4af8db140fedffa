use crate::{
    core::{
        bounds::Bounds,
        config::TileServerSettings,
        constants::{DEFAULT_MAP_BRIGHTNESS, HIGH_CONTRAST_MAP_TYPE_ID, MAP_BRIGHTNESS_RANGE},
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
    providers::leaflet::{
        convert::{from_native_map_type, to_native_control_position, to_native_map_type, ROADMAP_LAYER},
        native::*,
        overlays::{native_icon, LeafletCircle, LeafletMarker, LeafletPolyline},
    },
    runtime, Result,
};
use async_trait::async_trait;
use std::sync::Arc;

type EventPublisher = fn(&MapEvents, &LMouseEvent);

/// Native map events and what each re-publishes
const MAP_EVENTS: [(&str, EventPublisher); 7] = [
    ("moveend", |events, _| {
        events.publish(MapEvent::BoundsChanged);
        events.publish(MapEvent::CenterChanged);
        events.publish(MapEvent::Idle);
    }),
    ("zoomend", |events, _| events.publish(MapEvent::ZoomChanged)),
    ("click", |events, e| events.publish(MapEvent::Clicked(MouseEvent::from_native(*e)))),
    ("dblclick", |events, e| events.publish(MapEvent::DoubleClicked(MouseEvent::from_native(*e)))),
    ("contextmenu", |events, e| events.publish(MapEvent::RightClicked(MouseEvent::from_native(*e)))),
    ("baselayerchange", |events, _| events.publish(MapEvent::MapTypeChanged)),
    ("load", |events, _| events.publish(MapEvent::TilesLoaded)),
];

/// CSS filter for a brightness percentage; none at full brightness
fn brightness_filter(brightness: u32) -> Option<String> {
    (brightness != 100).then(|| format!("brightness({}%)", brightness))
}

/// Map adapter over the open tile-based service
pub struct LeafletMap {
    base: MapBase,
    api: Arc<dyn LeafletApi>,
    tile_server: Option<TileServerSettings>,
    native: Option<Box<dyn LMap>>,
    map_handlers: Vec<(&'static str, LHandler)>,
    markers: OverlayRegistry<LeafletMarker>,
    polylines: OverlayRegistry<LeafletPolyline>,
    circles: OverlayRegistry<LeafletCircle>,
    /// `None` until someone sets it
    brightness: Option<u32>,
}

impl LeafletMap {
    pub fn new(
        name: &str,
        options: MapOptions,
        api: Arc<dyn LeafletApi>,
        env: MapEnvironment,
    ) -> Result<Self> {
        Ok(Self {
            base: MapBase::new(name, options, env)?,
            api,
            tile_server: None,
            native: None,
            map_handlers: Vec::new(),
            markers: OverlayRegistry::new(),
            polylines: OverlayRegistry::new(),
            circles: OverlayRegistry::new(),
            brightness: None,
        })
    }

    /// Uses `settings` for the base layer whatever the server defaults say
    pub fn with_tile_server(mut self, settings: TileServerSettings) -> Self {
        self.tile_server = Some(settings);
        self
    }

    pub fn native(&self) -> Option<&dyn LMap> {
        self.native.as_deref()
    }

    /// The explicit tile server, then the server's when its defaults are in
    /// use, then the library's
    pub fn tile_server(&self) -> TileServerSettings {
        if let Some(settings) = &self.tile_server {
            return settings.clone();
        }
        let from_server = self
            .base
            .env
            .server_defaults
            .as_ref()
            .filter(|_| self.base.settings.use_server_defaults)
            .and_then(|d| d.tile_server.clone());
        from_server.unwrap_or_default()
    }

    fn tile_layer(&self, map_type: MapType) -> LTileLayerOptions {
        let server = self.tile_server();
        let name = to_native_map_type(map_type, true)
            .ok()
            .flatten()
            .unwrap_or(ROADMAP_LAYER);
        let class_name = if map_type == MapType::HighContrast {
            Some(HIGH_CONTRAST_MAP_TYPE_ID.to_string())
        } else {
            server.class_name
        };
        LTileLayerOptions {
            name: name.to_string(),
            url: server.url,
            attribution: server.attribution,
            subdomains: server.subdomains,
            min_zoom: server.min_zoom,
            max_zoom: server.max_zoom,
            class_name,
        }
    }

    fn native_options(settings: &ResolvedMapOptions) -> Result<LMapOptions> {
        let mut base_layers = vec![ROADMAP_LAYER.to_string()];
        if settings.show_high_contrast {
            base_layers.push(HIGH_CONTRAST_MAP_TYPE_ID.to_string());
        }
        let layers_control_position = if settings.show_map_type_control && base_layers.len() > 1 {
            Some(to_native_control_position(settings.map_type_control_position)?)
        } else {
            None
        };

        Ok(LMapOptions {
            center: LLatLng::from(&settings.center),
            zoom: settings.zoom,
            zoom_control_position: to_native_control_position(settings.zoom_control_position)?,
            scroll_wheel_zoom: settings.scroll_wheel,
            dragging: settings.draggable,
            scale_control: settings.scale_control,
            layers_control_position,
            base_layers,
        })
    }

    fn hook_native_events(&mut self) {
        let Some(native) = &self.native else {
            return;
        };
        for (name, publisher) in MAP_EVENTS {
            let events = self.base.events.clone();
            let handler: LHandler = Arc::new(move |e: &LMouseEvent| publisher(&events, e));
            native.on(name, handler.clone());
            self.map_handlers.push((name, handler));
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

    fn snapshot_view(&mut self) {
        if self.native.is_some() {
            self.base.settings.zoom = self.zoom();
            self.base.settings.center = self.center();
            self.base.settings.map_type = self.map_type();
        }
    }

    fn unsupported(&self, what: &str) {
        log::debug!("map {}: {} not available on this provider", self.base.name, what);
    }
}

fn path_style(
    stroke_colour: &str,
    stroke_opacity: f64,
    stroke_weight: f64,
    fill: Option<(&str, f64)>,
) -> LPathStyle {
    LPathStyle {
        color: Some(stroke_colour.to_string()),
        opacity: Some(stroke_opacity),
        weight: Some(stroke_weight),
        fill_color: fill.map(|(colour, _)| colour.to_string()),
        fill_opacity: fill.map(|(_, opacity)| opacity),
    }
}

#[async_trait]
impl MapAdapter for LeafletMap {
    fn name(&self) -> &str {
        &self.base.name
    }

    fn provider(&self) -> Provider {
        Provider::Leaflet
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            polygons: false,
            info_windows: false,
            clustering: false,
            layers: false,
            brightness: true,
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

        let mut settings = self.base.resolve_open_options(options.as_ref());
        if to_native_map_type(settings.map_type, true)?.is_none() {
            log::debug!("map type {} not available, using the road map", settings.map_type);
            settings.map_type = MapType::RoadMap;
        }
        let native_options = Self::native_options(&settings)?;
        let mut controls = Vec::with_capacity(settings.controls.len());
        for (control, position) in &settings.controls {
            controls.push((to_native_control_position(*position)?, control.clone()));
        }
        self.base.settings = settings.clone();
        log::info!("opening map {}", self.base.name);

        self.base.env.container.clear_placeholder();
        let native = self.api.create_map(&native_options);
        native.set_base_layer(self.tile_layer(settings.map_type));
        if let Some(filter) = brightness_filter(self.map_brightness()) {
            native.set_tile_filter(Some(filter));
        }
        for (position, control) in &controls {
            native.add_control(*position, &control.id, &control.content);
        }
        self.native = Some(native);
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

        self.markers.destroy_all();
        self.polylines.destroy_all();
        self.circles.destroy_all();

        if let Some(native) = self.native.take() {
            for (event, handler) in self.map_handlers.drain(..) {
                native.off(event, &handler);
            }
            native.remove();
        }
        self.base.status = MapStatus::Destroyed;
        log::info!("destroyed map {}", self.base.name);
    }

    fn refresh_map(&mut self) {
        if let Some(native) = &self.native {
            native.invalidate_size();
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
            Some(native) => native.fit_bounds(LLatLngBounds::from(bounds)),
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
            Some(native) => native.set_view(LLatLng::from(&center), native.get_zoom()),
            None => self.base.update_options(|o| o.center = Some(center)),
        }
    }

    fn pan_to(&mut self, center: LatLng) {
        match &self.native {
            Some(native) => native.pan_to(LLatLng::from(&center)),
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
            .and_then(|n| n.base_layer())
            .and_then(|name| from_native_map_type(&name, true).ok().flatten());
        native_type.unwrap_or(self.base.settings.map_type)
    }

    fn set_map_type(&mut self, map_type: MapType) {
        if !matches!(to_native_map_type(map_type, true), Ok(Some(_))) {
            self.unsupported(&format!("map type {}", map_type));
            return;
        }
        if self.native.is_none() {
            self.base.update_options(|o| o.map_type = Some(map_type));
            return;
        }
        let layer = self.tile_layer(map_type);
        if let Some(native) = &self.native {
            native.set_base_layer(layer);
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
            Ok(corner) => {
                native.add_control(corner, &control.id, &control.content);
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

        let native = native_map.create_marker(
            LLatLng::from(&options.position),
            LMarkerOptions {
                icon: native_icon(options.icon.as_ref()),
                title: options.tooltip.clone(),
                draggable: options.draggable,
                interactive: options.clickable,
                z_index_offset: options.z_index,
            },
        );

        let mut handlers: Vec<(&'static str, LHandler)> = Vec::new();
        if options.clickable {
            let events = self.base.events.clone();
            let marker_id = id.clone();
            handlers.push((
                "click",
                Arc::new(move |e: &LMouseEvent| {
                    events.publish(MapEvent::MarkerClicked {
                        id: marker_id.clone(),
                        mouse: MouseEvent::from_native(*e),
                    })
                }),
            ));
        }
        let events = self.base.events.clone();
        let marker_id = id.clone();
        handlers.push((
            "dragend",
            Arc::new(move |e: &LMouseEvent| {
                events.publish(MapEvent::MarkerDragged {
                    id: marker_id.clone(),
                    mouse: MouseEvent::from_native(*e),
                })
            }),
        ));
        for (event, handler) in &handlers {
            native.on(event, handler.clone());
        }

        let wrapper = LeafletMarker::new(id.clone(), native, handlers, options);
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
        self.markers.destroy(id)
    }

    fn create_marker_clusterer(&mut self, _settings: ClustererSettings) -> bool {
        self.unsupported("marker clustering");
        false
    }

    fn cluster_markers(&mut self, _ids: &[OverlayId]) -> usize {
        0
    }

    fn uncluster_markers(&mut self, _ids: &[OverlayId]) -> usize {
        0
    }

    fn repaint_clusterer(&mut self) {}

    fn clusterer_max_zoom(&self) -> Option<f64> {
        None
    }

    fn set_clusterer_max_zoom(&mut self, _max_zoom: Option<f64>) {}

    fn add_polyline(&mut self, id: OverlayId, options: PolylineOptions) -> Option<&mut dyn MapPolyline> {
        if self.native.is_none() {
            log::debug!("polyline {} not added, map {} is not open", id, self.base.name);
            return None;
        }
        self.destroy_polyline(&id);
        let native_map = self.native.as_ref()?;

        let native = native_map.create_polyline(
            options.path.iter().map(LLatLng::from).collect(),
            path_style(
                &options.stroke_colour,
                options.stroke_opacity,
                options.stroke_weight,
                None,
            ),
            options.clickable,
        );
        let wrapper = LeafletPolyline::new(id.clone(), native, options);
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

    fn add_polygon(&mut self, id: OverlayId, _options: PolygonOptions) -> Option<&mut dyn MapPolygon> {
        self.unsupported(&format!("polygon {}", id));
        None
    }

    fn polygon(&self, _id: &OverlayId) -> Option<&dyn MapPolygon> {
        None
    }

    fn polygon_mut(&mut self, _id: &OverlayId) -> Option<&mut dyn MapPolygon> {
        None
    }

    fn destroy_polygon(&mut self, _id: &OverlayId) -> bool {
        false
    }

    fn add_circle(&mut self, id: OverlayId, options: CircleOptions) -> Option<&mut dyn MapCircle> {
        if self.native.is_none() {
            log::debug!("circle {} not added, map {} is not open", id, self.base.name);
            return None;
        }
        self.destroy_circle(&id);
        let native_map = self.native.as_ref()?;

        let native = native_map.create_circle(
            LLatLng::from(&options.center),
            options.radius,
            path_style(
                &options.stroke_colour,
                options.stroke_opacity,
                options.stroke_weight,
                Some((options.fill_colour.as_str(), options.fill_opacity)),
            ),
            options.clickable,
        );
        let wrapper = LeafletCircle::new(id.clone(), native, options);
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

    fn add_info_window(&mut self, id: OverlayId, _options: InfoWindowOptions) -> Option<&mut dyn MapInfoWindow> {
        self.unsupported(&format!("info window {}", id));
        None
    }

    fn info_window(&self, _id: &OverlayId) -> Option<&dyn MapInfoWindow> {
        None
    }

    fn info_window_mut(&mut self, _id: &OverlayId) -> Option<&mut dyn MapInfoWindow> {
        None
    }

    fn destroy_info_window(&mut self, _id: &OverlayId) -> bool {
        false
    }

    fn open_info_window(&mut self, _id: &OverlayId, _anchor: Option<&OverlayId>) -> bool {
        false
    }

    fn close_info_window(&mut self, _id: &OverlayId) -> bool {
        false
    }

    fn add_layer(&mut self, settings: LayerSettings, _opacity: f64) -> bool {
        self.unsupported(&format!("layer {}", settings.id));
        false
    }

    fn destroy_layer(&mut self, _id: &str) -> bool {
        false
    }

    fn has_layer(&self, _id: &str) -> bool {
        false
    }

    fn layer_opacity(&self, _id: &str) -> Option<f64> {
        None
    }

    fn set_layer_opacity(&mut self, _id: &str, _opacity: f64) -> bool {
        false
    }

    fn default_map_brightness(&self) -> u32 {
        self.tile_server()
            .default_brightness
            .unwrap_or(DEFAULT_MAP_BRIGHTNESS)
    }

    fn map_brightness(&self) -> u32 {
        self.brightness
            .unwrap_or_else(|| self.default_map_brightness())
    }

    /// Clamped to the supported range
    fn set_map_brightness(&mut self, brightness: u32) {
        let (min, max) = MAP_BRIGHTNESS_RANGE;
        let brightness = brightness.clamp(min, max);
        if brightness == self.map_brightness() {
            return;
        }
        self.brightness = Some(brightness);
        if let Some(native) = &self.native {
            native.set_tile_filter(brightness_filter(brightness));
        }
        self.base.events.publish(MapEvent::BrightnessChanged);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{core::config::ServerDefaults, providers::leaflet::HeadlessLeaflet};

    #[test]
    fn test_brightness_filter() {
        assert_eq!(brightness_filter(100), None);
        assert_eq!(brightness_filter(60).as_deref(), Some("brightness(60%)"));
    }

    #[test]
    fn test_layers_control_only_with_a_choice() {
        let plain = LeafletMap::native_options(&MapOptions::default().resolve()).unwrap();
        assert!(plain.layers_control_position.is_none());
        assert_eq!(plain.base_layers, vec!["roadmap".to_string()]);

        let with_high_contrast = LeafletMap::native_options(
            &MapOptions {
                show_high_contrast: Some(true),
                ..MapOptions::default()
            }
            .resolve(),
        )
        .unwrap();
        assert_eq!(
            with_high_contrast.layers_control_position,
            Some(LControlPosition::TopLeft)
        );
        assert_eq!(with_high_contrast.zoom_control_position, LControlPosition::TopRight);
    }

    #[test]
    fn test_tile_server_precedence() {
        let custom = TileServerSettings {
            name: "Custom".to_string(),
            ..TileServerSettings::default()
        };
        let env = MapEnvironment::default().with_server_defaults(ServerDefaults {
            tile_server: Some(custom.clone()),
            ..Default::default()
        });

        let map = LeafletMap::new("m", MapOptions::default(), Arc::new(HeadlessLeaflet::new()), env.clone()).unwrap();
        assert_eq!(map.tile_server().name, "OpenStreetMap");

        let map = LeafletMap::new(
            "m",
            MapOptions {
                use_server_defaults: Some(true),
                ..MapOptions::default()
            },
            Arc::new(HeadlessLeaflet::new()),
            env,
        )
        .unwrap();
        assert_eq!(map.tile_server().name, "Custom");
    }
}
