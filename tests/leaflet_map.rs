use std::sync::atomic::{AtomicUsize, Ordering};
use trackmap::prelude::*;
use trackmap::providers::leaflet::native::{LControlPosition, LLatLng, LMouseEvent};

/// Integration tests for the tile-based provider, driven through the
/// headless engine
mod leaflet_map_tests {
    use super::*;

    struct Harness {
        engine: HeadlessLeaflet,
        container: Arc<HeadlessContainer>,
        map: LeafletMap,
    }

    fn harness_with(engine: HeadlessLeaflet, options: MapOptions) -> Harness {
        let container = Arc::new(HeadlessContainer::new());
        container.show_placeholder("loading");
        let env = MapEnvironment::default()
            .with_container(container.clone())
            .with_runtime(MapRuntimeConfig::for_testing());
        let map = LeafletMap::new("main", options, Arc::new(engine.clone()), env).unwrap();
        Harness {
            engine,
            container,
            map,
        }
    }

    async fn opened() -> Harness {
        let mut h = harness_with(HeadlessLeaflet::new(), MapOptions::default());
        let status = h.map.open(None, OpenCallbacks::default()).await.unwrap();
        assert_eq!(status, MapStatus::Open);
        h
    }

    #[tokio::test]
    async fn test_open_without_loading_a_script() {
        let h = opened().await;
        assert_eq!(h.map.provider(), Provider::Leaflet);
        assert!(h.map.is_ready());
        assert!(h.container.placeholder().is_none());

        let model = h.engine.map().unwrap();
        assert_eq!(model.zoom, 12.0);
        assert_eq!(model.base_layer.unwrap().name, "roadmap");
        assert_eq!(model.options.zoom_control_position, LControlPosition::TopRight);
        assert!(model.tile_filter.is_none());
    }

    #[tokio::test]
    async fn test_ready_once_the_container_has_a_size() {
        let mut h = harness_with(HeadlessLeaflet::unsized_container(), MapOptions::default());
        let result = h.map.open(None, OpenCallbacks::default()).await;
        assert!(matches!(result, Err(MapError::ReadyTimeout(_))));
        assert!(h.map.is_open());
        assert!(h.map.bounds().is_none());

        h.map.refresh_map();
        assert!(h.map.is_ready());
        assert!(h.map.bounds().is_some());
    }

    #[tokio::test]
    async fn test_unsupported_map_type_falls_back() {
        let mut h = harness_with(
            HeadlessLeaflet::new(),
            MapOptions {
                map_type: Some(MapType::Satellite),
                ..MapOptions::default()
            },
        );
        h.map.open(None, OpenCallbacks::default()).await.unwrap();
        assert_eq!(h.map.map_type(), MapType::RoadMap);

        h.map.set_map_type(MapType::Terrain);
        assert_eq!(h.engine.calls("map.set_base_layer"), 1);

        h.map.set_map_type(MapType::HighContrast);
        assert_eq!(h.map.map_type(), MapType::HighContrast);
        let layer = h.engine.map().unwrap().base_layer.unwrap();
        assert_eq!(layer.class_name.as_deref(), Some("high-contrast"));
    }

    #[tokio::test]
    async fn test_capability_gaps_are_silent() {
        let mut h = opened().await;
        assert!(!h.map.supports_polygons());
        assert!(!h.map.supports_info_windows());
        assert!(!h.map.supports_clustering());
        assert!(!h.map.supports_layers());

        assert!(h.map.add_polygon(OverlayId::from(1), PolygonOptions::default()).is_none());
        assert!(h.map.polygon(&OverlayId::from(1)).is_none());
        assert!(h.map.add_info_window(OverlayId::from(1), InfoWindowOptions::default()).is_none());
        assert!(!h.map.open_info_window(&OverlayId::from(1), None));
        assert!(!h.map.create_marker_clusterer(ClustererSettings::default()));
        assert_eq!(h.map.cluster_markers(&[OverlayId::from(1)]), 0);
        assert_eq!(h.map.clusterer_max_zoom(), None);
        assert!(!h.map.has_layer("weather"));
        assert_eq!(h.engine.layers_on_map(), Vec::<u64>::new());
    }

    #[tokio::test]
    async fn test_markers_attach_and_detach() {
        let mut h = opened().await;
        let baseline = h.engine.subscription_count();
        h.map.add_marker(
            OverlayId::from("G-ABCD"),
            MarkerOptions {
                tooltip: Some("G-ABCD".to_string()),
                ..MarkerOptions::at(LatLng::new(51.0, 0.0))
            },
        );
        let handle = h.engine.layers_on_map()[0];
        assert_eq!(h.engine.layer(handle).unwrap().tooltip(), Some("G-ABCD"));
        assert_eq!(h.engine.subscription_count_on(handle), 2);

        let marker = h.map.marker_mut(&OverlayId::from("G-ABCD")).unwrap();
        marker.set_visible(false);
        assert!(h.engine.layers_on_map().is_empty());
        marker.set_visible(false);
        assert_eq!(h.engine.calls("marker.remove_from_map"), 1);
        marker.set_visible(true);
        assert_eq!(h.engine.layers_on_map(), vec![handle]);

        assert!(h.map.destroy_marker(&OverlayId::from("G-ABCD")));
        assert!(h.engine.layers_on_map().is_empty());
        assert_eq!(h.engine.subscription_count(), baseline);
    }

    #[tokio::test]
    async fn test_hidden_markers_start_detached() {
        let mut h = opened().await;
        h.map.add_marker(
            OverlayId::from(1),
            MarkerOptions {
                visible: false,
                ..MarkerOptions::at(LatLng::new(51.0, 0.0))
            },
        );
        assert!(h.engine.layers_on_map().is_empty());
        assert_eq!(h.engine.calls("create_marker"), 1);
    }

    #[tokio::test]
    async fn test_marker_events() {
        let mut h = opened().await;
        let id = OverlayId::from(5);
        h.map.add_marker(id.clone(), MarkerOptions::at(LatLng::new(51.0, 0.0)));
        h.map.add_marker(id.clone(), MarkerOptions::at(LatLng::new(51.0, 1.0)));
        let handle = h.engine.layers_on_map()[0];

        let clicks = Arc::new(AtomicUsize::new(0));
        let c = clicks.clone();
        h.map.events().hook_marker_clicked(move |_, _| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        h.engine.trigger(handle, "click", LMouseEvent::default());
        assert_eq!(clicks.load(Ordering::SeqCst), 1);

        let rx = h.map.subscribe();
        h.engine.drag_marker(handle, LLatLng::new(52.0, 1.0));
        match rx.try_recv().unwrap() {
            MapEvent::MarkerDragged { id: dragged, .. } => assert_eq!(dragged, id),
            other => panic!("unexpected event {:?}", other),
        }
        assert_eq!(h.map.marker(&id).unwrap().position(), LatLng::new(52.0, 1.0));
    }

    #[tokio::test]
    async fn test_unchanged_marker_setters_skip_the_engine() {
        let mut h = opened().await;
        h.map.add_marker(OverlayId::from(1), MarkerOptions::at(LatLng::new(51.0, 0.0)));
        let marker = h.map.marker_mut(&OverlayId::from(1)).unwrap();

        marker.set_tooltip(Some("A".to_string()));
        marker.set_tooltip(Some("A".to_string()));
        marker.set_z_index(2);
        marker.set_z_index(2);
        marker.set_draggable(false);
        assert_eq!(h.engine.calls("marker.bind_tooltip"), 1);
        assert_eq!(h.engine.calls("marker.set_z_index_offset"), 1);
        assert_eq!(h.engine.calls("marker.set_dragging"), 0);
    }

    #[tokio::test]
    async fn test_unchanged_path_styles_skip_the_engine() {
        let mut h = opened().await;
        let id = OverlayId::from(1);
        h.map.add_polyline(id.clone(), PolylineOptions::with_path(vec![LatLng::new(51.0, 0.0)]));
        h.map.add_circle(id.clone(), CircleOptions::at(LatLng::new(51.0, 0.0), 500.0));
        let polyline_calls = h.engine.calls("polyline.set_style");
        let circle_calls = h.engine.calls("circle.set_style");

        let polyline = h.map.polyline_mut(&id).unwrap();
        let colour = polyline.stroke_colour().to_string();
        polyline.set_stroke_colour(&colour);
        let stroke_opacity = polyline.stroke_opacity();
        polyline.set_stroke_opacity(stroke_opacity);
        let stroke_weight = polyline.stroke_weight();
        polyline.set_stroke_weight(stroke_weight);
        assert_eq!(h.engine.calls("polyline.set_style"), polyline_calls);
        polyline.set_stroke_weight(3.0);
        polyline.set_stroke_weight(3.0);
        assert_eq!(h.engine.calls("polyline.set_style"), polyline_calls + 1);

        let circle = h.map.circle_mut(&id).unwrap();
        let fill = circle.fill_colour().to_string();
        let stroke = circle.stroke_colour().to_string();
        circle.set_fill_colour(&fill);
        let fill_opacity = circle.fill_opacity();
        circle.set_fill_opacity(fill_opacity);
        circle.set_stroke_colour(&stroke);
        let stroke_opacity = circle.stroke_opacity();
        circle.set_stroke_opacity(stroke_opacity);
        let stroke_weight = circle.stroke_weight();
        circle.set_stroke_weight(stroke_weight);
        assert_eq!(h.engine.calls("circle.set_style"), circle_calls);
        circle.set_fill_colour("#00ff00");
        circle.set_fill_colour("#00ff00");
        assert_eq!(h.engine.calls("circle.set_style"), circle_calls + 1);
    }

    #[tokio::test]
    async fn test_trail_updates_do_not_copy_the_path() {
        let mut h = opened().await;
        let id = OverlayId::from("trail");
        let history: Vec<LatLng> = (0..500).map(|i| LatLng::new(50.0, i as f64 * 0.001)).collect();
        h.map.add_polyline(id.clone(), PolylineOptions::with_path(history));
        let copies = h.engine.calls("polyline.get_lat_lngs");

        for i in 0..20 {
            h.map.append_to_polyline(&id, &[LatLng::new(51.0, i as f64)], false);
            h.map.trim_polyline(&id, 1, true);
        }
        h.map.replace_polyline_point_at(&id, -1, LatLng::new(52.0, 0.0));
        h.map.remove_polyline_point_at(&id, 0);

        let polyline = h.map.polyline(&id).unwrap();
        assert_eq!(polyline.path_len(), 499);
        assert_eq!(polyline.last_point(), Some(LatLng::new(52.0, 0.0)));
        assert_eq!(polyline.first_point(), Some(LatLng::new(50.0, 21.0 * 0.001)));
        assert_eq!(h.engine.calls("polyline.get_lat_lngs"), copies);
    }

    #[tokio::test]
    async fn test_polyline_trim_and_edit() {
        let mut h = opened().await;
        let id = OverlayId::from("track");
        let path: Vec<LatLng> = (0..4).map(|i| LatLng::new(50.0 + i as f64, 0.0)).collect();
        h.map.add_polyline(id.clone(), PolylineOptions::with_path(path.clone()));

        assert_eq!(
            h.map.trim_polyline(&id, 1, false),
            TrimResult { emptied: false, count_removed: 1 }
        );
        assert_eq!(h.map.polyline(&id).unwrap().last_point(), Some(path[2]));

        h.map.append_to_polyline(&id, &[LatLng::new(1.0, 1.0)], true);
        h.map.replace_polyline_point_at(&id, -1, LatLng::new(9.0, 9.0));
        let current = h.map.polyline(&id).unwrap().path();
        assert_eq!(current.first(), Some(&LatLng::new(1.0, 1.0)));
        assert_eq!(current.last(), Some(&LatLng::new(9.0, 9.0)));
        assert_eq!(current.len(), 4);

        assert_eq!(
            h.map.trim_polyline(&id, 10, true),
            TrimResult { emptied: true, count_removed: 4 }
        );
    }

    #[tokio::test]
    async fn test_circles() {
        let mut h = opened().await;
        let id = h.map.unused_circle_id();
        assert_eq!(id, OverlayId::Number(1));
        h.map.add_circle(id.clone(), CircleOptions::at(LatLng::new(51.0, 0.0), 1000.0));
        assert_eq!(h.map.unused_circle_id(), OverlayId::Number(2));

        let circle = h.map.circle_mut(&id).unwrap();
        circle.set_radius(2000.0);
        circle.set_radius(2000.0);
        assert_eq!(circle.radius(), 2000.0);
        assert_eq!(h.engine.calls("circle.set_radius"), 1);

        h.map.destroy();
        assert!(h.engine.layers_on_map().is_empty());
        assert_eq!(h.engine.subscription_count(), 0);
        assert!(h.engine.map().unwrap().removed);
    }

    #[tokio::test]
    async fn test_view_events() {
        let mut h = opened().await;
        let rx = h.map.subscribe();
        h.map.set_zoom(14.0);
        let kinds: Vec<MapEventKind> = rx.try_iter().map(|e| e.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                MapEventKind::ZoomChanged,
                MapEventKind::BoundsChanged,
                MapEventKind::CenterChanged,
                MapEventKind::Idle,
            ]
        );

        h.map.pan_to(LatLng::new(40.0, -3.0));
        assert_eq!(h.map.center(), LatLng::new(40.0, -3.0));
        assert_eq!(h.map.zoom(), 14.0);

        let handle = h.engine.map_handle().unwrap();
        h.engine.trigger(handle, "contextmenu", LMouseEvent::default());
        assert!(matches!(rx.try_iter().last(), Some(MapEvent::RightClicked(_))));
    }

    #[tokio::test]
    async fn test_brightness() {
        let mut h = opened().await;
        assert!(h.map.can_set_map_brightness());
        assert_eq!(h.map.default_map_brightness(), 100);

        let changes = Arc::new(AtomicUsize::new(0));
        let c = changes.clone();
        h.map.events().hook_brightness_changed(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });

        h.map.set_map_brightness(60);
        assert_eq!(h.map.map_brightness(), 60);
        assert_eq!(h.engine.map().unwrap().tile_filter.as_deref(), Some("brightness(60%)"));

        h.map.set_map_brightness(60);
        h.map.set_map_brightness(500);
        assert_eq!(h.map.map_brightness(), 150);
        h.map.set_map_brightness(0);
        assert_eq!(h.map.map_brightness(), 10);
        assert_eq!(changes.load(Ordering::SeqCst), 3);

        h.map.set_map_brightness(100);
        assert!(h.engine.map().unwrap().tile_filter.is_none());
    }

    #[tokio::test]
    async fn test_brightness_set_before_open() {
        let mut h = harness_with(HeadlessLeaflet::new(), MapOptions::default());
        h.map.set_map_brightness(80);
        h.map.open(None, OpenCallbacks::default()).await.unwrap();
        assert_eq!(h.engine.map().unwrap().tile_filter.as_deref(), Some("brightness(80%)"));
    }

    #[tokio::test]
    async fn test_tile_server_brightness_default() {
        let engine = HeadlessLeaflet::new();
        let env = MapEnvironment::default().with_runtime(MapRuntimeConfig::for_testing());
        let mut map = LeafletMap::new("dim", MapOptions::default(), Arc::new(engine.clone()), env)
            .unwrap()
            .with_tile_server(TileServerSettings {
                name: "Dark".to_string(),
                default_brightness: Some(70),
                ..TileServerSettings::default()
            });
        map.open(None, OpenCallbacks::default()).await.unwrap();
        assert_eq!(map.default_map_brightness(), 70);
        assert_eq!(map.map_brightness(), 70);
        assert_eq!(engine.map().unwrap().tile_filter.as_deref(), Some("brightness(70%)"));
    }

    #[tokio::test]
    async fn test_controls_fold_to_corners() {
        let mut h = opened().await;
        assert!(h.map.add_control(
            MapControl::new("legend", "<div>Legend</div>"),
            MapControlPosition::BottomCentre
        ));
        let controls = h.engine.map().unwrap().controls;
        assert_eq!(
            controls,
            vec![(
                LControlPosition::BottomLeft,
                "legend".to_string(),
                "<div>Legend</div>".to_string()
            )]
        );
    }
}
