use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex,
};
use trackmap::prelude::*;
use trackmap::providers::google::native::{GLatLng, GMouseEvent};

/// Integration tests for the commercial provider, driven through the
/// headless engine
mod google_map_tests {
    use super::*;

    struct Harness {
        engine: HeadlessGoogleMaps,
        fetcher: Arc<HeadlessFetcher>,
        container: Arc<HeadlessContainer>,
        store: Arc<MemoryStore>,
        map: GoogleMap,
    }

    fn harness_with(engine: HeadlessGoogleMaps, fetcher: HeadlessFetcher, options: MapOptions) -> Harness {
        let fetcher = Arc::new(fetcher);
        let container = Arc::new(HeadlessContainer::new());
        let store = Arc::new(MemoryStore::new());
        let env = MapEnvironment::default()
            .with_container(container.clone())
            .with_store(store.clone())
            .with_runtime(MapRuntimeConfig::for_testing());
        let loader = Arc::new(ScriptLoader::new(fetcher.clone()));
        let map = GoogleMap::new("main", options, Arc::new(engine.clone()), loader, env).unwrap();
        Harness {
            engine,
            fetcher,
            container,
            store,
            map,
        }
    }

    fn harness() -> Harness {
        harness_with(HeadlessGoogleMaps::new(), HeadlessFetcher::resident(), MapOptions::default())
    }

    async fn opened() -> Harness {
        let mut h = harness();
        let status = h.map.open(None, OpenCallbacks::default()).await.unwrap();
        assert_eq!(status, MapStatus::Open);
        h
    }

    fn track(points: usize) -> Vec<LatLng> {
        (0..points)
            .map(|i| LatLng::new(51.0 + i as f64 * 0.01, -0.5))
            .collect()
    }

    #[tokio::test]
    async fn test_open_creates_one_native_map() {
        let mut h = opened().await;
        assert!(h.map.is_open());
        assert!(h.map.is_ready());
        assert!(h.map.bounds().is_some());

        let status = h.map.open(None, OpenCallbacks::default()).await.unwrap();
        assert_eq!(status, MapStatus::Open);
        assert_eq!(h.engine.maps_created(), 1);
        assert_eq!(h.fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_setters_before_open_feed_the_native_map() {
        let mut h = harness();
        h.map.set_zoom(7.0);
        h.map.set_center(LatLng::new(48.0, 2.0));
        assert_eq!(h.map.zoom(), 7.0);
        assert!(h.map.bounds().is_none());
        assert!(h.map.add_marker(OverlayId::from(1), MarkerOptions::at(LatLng::new(0.0, 0.0))).is_none());

        h.map.open(None, OpenCallbacks::default()).await.unwrap();
        let model = h.engine.map().unwrap();
        assert_eq!(model.zoom, 7.0);
        assert_eq!(model.center, GLatLng::new(48.0, 2.0));
    }

    #[tokio::test]
    async fn test_call_options_override_instance_options() {
        let mut h = harness_with(
            HeadlessGoogleMaps::new(),
            HeadlessFetcher::resident(),
            MapOptions {
                zoom: Some(5.0),
                ..MapOptions::default()
            },
        );
        h.map
            .open(
                Some(MapOptions {
                    zoom: Some(9.0),
                    ..MapOptions::default()
                }),
                OpenCallbacks::default(),
            )
            .await
            .unwrap();
        assert_eq!(h.map.zoom(), 9.0);
    }

    #[tokio::test]
    async fn test_callbacks_run_in_order() {
        let mut h = harness();
        let order = Arc::new(Mutex::new(Vec::new()));
        let (created, opened) = (order.clone(), order.clone());
        h.map
            .open(
                None,
                OpenCallbacks::default()
                    .after_create(move || created.lock().unwrap().push("create"))
                    .after_open(move || opened.lock().unwrap().push("open")),
            )
            .await
            .unwrap();
        assert_eq!(*order.lock().unwrap(), vec!["create", "open"]);
    }

    #[tokio::test]
    async fn test_load_failure_shows_placeholder_and_runs_callbacks() {
        let mut h = harness_with(
            HeadlessGoogleMaps::new(),
            HeadlessFetcher::resident().failing(LoadError::Failed("403".to_string())),
            MapOptions::default(),
        );
        let failure = Arc::new(Mutex::new(None));
        let opened = Arc::new(AtomicUsize::new(0));
        let (f, o) = (failure.clone(), opened.clone());

        let status = h
            .map
            .open(
                None,
                OpenCallbacks::default()
                    .on_load_failure(move |status| *f.lock().unwrap() = Some(status.to_string()))
                    .after_open(move || {
                        o.fetch_add(1, Ordering::SeqCst);
                    }),
            )
            .await
            .unwrap();

        assert_eq!(status, MapStatus::LoadFailed("error: 403".to_string()));
        assert_eq!(failure.lock().unwrap().as_deref(), Some("error: 403"));
        assert_eq!(opened.load(Ordering::SeqCst), 1);
        assert_eq!(h.container.placeholder().as_deref(), Some("The map could not be loaded"));
        assert_eq!(h.engine.maps_created(), 0);
        assert!(h.map.add_marker(OverlayId::from(1), MarkerOptions::at(LatLng::new(0.0, 0.0))).is_none());
    }

    #[tokio::test]
    async fn test_offline_placeholder() {
        let mut h = harness_with(
            HeadlessGoogleMaps::new(),
            HeadlessFetcher::resident().offline(),
            MapOptions::default(),
        );
        let status = h.map.open(None, OpenCallbacks::default()).await.unwrap();
        assert_eq!(status, MapStatus::LoadFailed("offline".to_string()));
        assert_eq!(h.fetcher.calls(), 0);
        assert!(h.container.placeholder().unwrap().contains("offline"));
    }

    #[tokio::test]
    async fn test_ready_wait_gives_up() {
        let mut h = harness_with(
            HeadlessGoogleMaps::never_ready(),
            HeadlessFetcher::resident(),
            MapOptions::default(),
        );
        let opened = Arc::new(AtomicUsize::new(0));
        let o = opened.clone();
        let result = h
            .map
            .open(
                None,
                OpenCallbacks::default().after_open(move || {
                    o.fetch_add(1, Ordering::SeqCst);
                }),
            )
            .await;

        assert!(matches!(result, Err(MapError::ReadyTimeout(_))));
        assert_eq!(opened.load(Ordering::SeqCst), 1);
        assert!(h.map.is_open());
        assert!(!h.map.is_ready());

        h.engine.make_ready();
        assert!(h.map.is_ready());
    }

    #[tokio::test]
    async fn test_no_wait_when_not_asked() {
        let mut h = harness_with(
            HeadlessGoogleMaps::never_ready(),
            HeadlessFetcher::resident(),
            MapOptions {
                wait_until_ready: Some(false),
                ..MapOptions::default()
            },
        );
        let status = h.map.open(None, OpenCallbacks::default()).await.unwrap();
        assert_eq!(status, MapStatus::Open);
    }

    #[tokio::test]
    async fn test_maps_share_one_script_load() {
        let fetcher = Arc::new(HeadlessFetcher::resident().with_delay(Duration::from_millis(20)));
        let loader = Arc::new(ScriptLoader::new(fetcher.clone()));
        let engine = HeadlessGoogleMaps::new();
        let env = MapEnvironment::default().with_runtime(MapRuntimeConfig::for_testing());

        let mut first = GoogleMap::new("first", MapOptions::default(), Arc::new(engine.clone()), loader.clone(), env.clone()).unwrap();
        let mut second = GoogleMap::new("second", MapOptions::default(), Arc::new(engine.clone()), loader, env).unwrap();

        let (a, b) = tokio::join!(
            first.open(None, OpenCallbacks::default()),
            second.open(None, OpenCallbacks::default())
        );
        assert_eq!(a.unwrap(), MapStatus::Open);
        assert_eq!(b.unwrap(), MapStatus::Open);
        assert_eq!(fetcher.calls(), 1);
        assert_eq!(engine.maps_created(), 2);
    }

    #[tokio::test]
    async fn test_destroyed_map_cannot_reopen() {
        let mut h = opened().await;
        h.map.destroy();
        assert_eq!(h.map.status(), MapStatus::Destroyed);
        assert!(matches!(
            h.map.open(None, OpenCallbacks::default()).await,
            Err(MapError::Destroyed)
        ));
    }

    #[tokio::test]
    async fn test_destroy_tears_down_every_overlay() {
        let mut h = opened().await;
        let baseline = h.engine.listener_count();
        h.map.add_marker(OverlayId::from(1), MarkerOptions::at(LatLng::new(51.0, 0.0)));
        h.map.add_polyline(OverlayId::from(1), PolylineOptions::with_path(track(3)));
        h.map.add_circle(OverlayId::from(1), CircleOptions::at(LatLng::new(51.0, 0.0), 500.0));
        h.map.set_zoom(9.0);

        h.map.destroy();
        assert!(h.engine.markers_on_map().is_empty());
        assert!(h.engine.polylines_on_map().is_empty());
        assert!(h.engine.circles_on_map().is_empty());
        assert!(h.engine.listener_count() < baseline);
        assert_eq!(h.engine.listener_count(), 0);
        assert_eq!(h.map.zoom(), 9.0);
    }

    #[tokio::test]
    async fn test_destroyed_marker_leaves_nothing_behind() {
        let mut h = opened().await;
        let baseline = h.engine.listener_count();
        h.map.add_marker(OverlayId::from("G-ABCD"), MarkerOptions::at(LatLng::new(51.0, 0.0)));
        assert_eq!(h.engine.markers_on_map().len(), 1);
        assert!(h.engine.listener_count() > baseline);

        assert!(h.map.destroy_marker(&OverlayId::from("G-ABCD")));
        assert!(h.engine.markers_on_map().is_empty());
        assert_eq!(h.engine.listener_count(), baseline);
        assert!(h.map.marker(&OverlayId::from("G-ABCD")).is_none());
        assert!(!h.map.destroy_marker(&OverlayId::from("G-ABCD")));
    }

    #[tokio::test]
    async fn test_replacing_a_marker_does_not_double_events() {
        let mut h = opened().await;
        let id = OverlayId::from(7);
        h.map.add_marker(id.clone(), MarkerOptions::at(LatLng::new(51.0, 0.0)));
        h.map.add_marker(id.clone(), MarkerOptions::at(LatLng::new(52.0, 0.0)));
        assert_eq!(h.engine.markers_on_map().len(), 1);
        assert_eq!(h.map.marker_ids(), vec![id.clone()]);

        let clicks = Arc::new(AtomicUsize::new(0));
        let c = clicks.clone();
        h.map.events().hook_marker_clicked(move |clicked, _| {
            assert_eq!(*clicked, OverlayId::from(7));
            c.fetch_add(1, Ordering::SeqCst);
        });

        let handle = h.engine.markers_on_map()[0];
        h.engine.trigger(handle, "click", GMouseEvent::default());
        assert_eq!(clicks.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unclickable_markers_publish_no_clicks() {
        let mut h = opened().await;
        h.map.add_marker(
            OverlayId::from(1),
            MarkerOptions {
                clickable: false,
                ..MarkerOptions::at(LatLng::new(51.0, 0.0))
            },
        );
        let rx = h.map.subscribe();
        let handle = h.engine.markers_on_map()[0];
        h.engine.trigger(handle, "click", GMouseEvent::default());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_marker_drag_reports_new_position() {
        let mut h = opened().await;
        h.map.add_marker(
            OverlayId::from(3),
            MarkerOptions {
                draggable: true,
                ..MarkerOptions::at(LatLng::new(51.0, 0.0))
            },
        );
        let rx = h.map.subscribe();
        let handle = h.engine.markers_on_map()[0];
        h.engine.drag_marker(handle, GLatLng::new(51.5, 0.5));

        match rx.try_recv().unwrap() {
            MapEvent::MarkerDragged { id, .. } => assert_eq!(id, OverlayId::from(3)),
            other => panic!("unexpected event {:?}", other),
        }
        let marker = h.map.marker(&OverlayId::from(3)).unwrap();
        assert_eq!(marker.position(), LatLng::new(51.5, 0.5));
    }

    #[tokio::test]
    async fn test_unchanged_setters_skip_the_engine() {
        let mut h = opened().await;
        let icon = Icon::new("plane.png").with_size(Size::new(24.0, 24.0));
        h.map.add_marker(OverlayId::from(1), MarkerOptions::at(LatLng::new(51.0, 0.0)));

        let marker = h.map.marker_mut(&OverlayId::from(1)).unwrap();
        marker.set_icon(Some(icon.clone()));
        marker.set_icon(Some(icon.clone()));
        marker.set_z_index(4);
        marker.set_z_index(4);
        marker.set_visible(true);
        assert_eq!(h.engine.calls("marker.set_icon"), 1);
        assert_eq!(h.engine.calls("marker.set_z_index"), 1);
        assert_eq!(h.engine.calls("marker.set_visible"), 0);

        let marker = h.map.marker(&OverlayId::from(1)).unwrap();
        assert_eq!(marker.icon(), Some(&icon));
    }

    #[tokio::test]
    async fn test_unchanged_shape_styles_skip_the_engine() {
        let mut h = opened().await;
        let id = OverlayId::from(1);
        h.map.add_polyline(id.clone(), PolylineOptions::with_path(track(3)));
        h.map.add_polygon(id.clone(), PolygonOptions::default());
        h.map.add_circle(id.clone(), CircleOptions::at(LatLng::new(51.0, 0.0), 500.0));
        let polyline_calls = h.engine.calls("polyline.set_options");
        let polygon_calls = h.engine.calls("polygon.set_options");
        let circle_calls = h.engine.calls("circle.set_options");

        let polyline = h.map.polyline_mut(&id).unwrap();
        let colour = polyline.stroke_colour().to_string();
        polyline.set_stroke_colour(&colour);
        let stroke_opacity = polyline.stroke_opacity();
        polyline.set_stroke_opacity(stroke_opacity);
        let stroke_weight = polyline.stroke_weight();
        polyline.set_stroke_weight(stroke_weight);
        let z_index = polyline.z_index();
        polyline.set_z_index(z_index);
        assert_eq!(h.engine.calls("polyline.set_options"), polyline_calls);

        let polyline = h.map.polyline_mut(&id).unwrap();
        polyline.set_stroke_colour("#ff0000");
        polyline.set_stroke_colour("#ff0000");
        polyline.set_z_index(3);
        polyline.set_z_index(3);
        assert_eq!(polyline.z_index(), 3);
        assert_eq!(h.engine.calls("polyline.set_options"), polyline_calls + 2);

        let polygon = h.map.polygon_mut(&id).unwrap();
        let fill = polygon.fill_colour().to_string();
        let stroke = polygon.stroke_colour().to_string();
        polygon.set_fill_colour(&fill);
        let fill_opacity = polygon.fill_opacity();
        polygon.set_fill_opacity(fill_opacity);
        polygon.set_stroke_colour(&stroke);
        let stroke_opacity = polygon.stroke_opacity();
        polygon.set_stroke_opacity(stroke_opacity);
        let stroke_weight = polygon.stroke_weight();
        polygon.set_stroke_weight(stroke_weight);
        assert_eq!(h.engine.calls("polygon.set_options"), polygon_calls);
        polygon.set_fill_opacity(0.1);
        polygon.set_fill_opacity(0.1);
        assert_eq!(h.engine.calls("polygon.set_options"), polygon_calls + 1);

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
        assert_eq!(h.engine.calls("circle.set_options"), circle_calls);
        circle.set_stroke_weight(4.0);
        circle.set_stroke_weight(4.0);
        assert_eq!(h.engine.calls("circle.set_options"), circle_calls + 1);
    }

    #[tokio::test]
    async fn test_trim_polyline() {
        let mut h = opened().await;
        let id = OverlayId::from("track");
        h.map.add_polyline(id.clone(), PolylineOptions::with_path(track(5)));

        let result = h.map.trim_polyline(&id, 2, true);
        assert_eq!(result, TrimResult { emptied: false, count_removed: 2 });
        assert_eq!(h.map.polyline(&id).unwrap().first_point(), Some(track(5)[2]));

        let result = h.map.trim_polyline(&id, 3, false);
        assert_eq!(result, TrimResult { emptied: false, count_removed: 3 });
        assert_eq!(h.map.polyline(&id).unwrap().path_len(), 0);

        h.map.append_to_polyline(&id, &track(2), false);
        let result = h.map.trim_polyline(&id, 5, true);
        assert_eq!(result, TrimResult { emptied: true, count_removed: 2 });

        let missing = h.map.trim_polyline(&OverlayId::from("none"), 1, true);
        assert_eq!(missing, TrimResult::default());
    }

    #[tokio::test]
    async fn test_polyline_point_edits() {
        let mut h = opened().await;
        let id = OverlayId::from(1);
        let path = track(3);
        h.map.add_polyline(id.clone(), PolylineOptions::with_path(path.clone()));

        h.map.append_to_polyline(&id, &[LatLng::new(1.0, 1.0), LatLng::new(2.0, 2.0)], true);
        assert_eq!(h.map.polyline(&id).unwrap().first_point(), Some(LatLng::new(1.0, 1.0)));
        assert_eq!(h.map.polyline(&id).unwrap().path()[1], LatLng::new(2.0, 2.0));

        h.map.remove_polyline_point_at(&id, -1);
        assert_eq!(h.map.polyline(&id).unwrap().last_point(), Some(path[1]));

        h.map.replace_polyline_point_at(&id, 0, LatLng::new(9.0, 9.0));
        assert_eq!(h.map.polyline(&id).unwrap().first_point(), Some(LatLng::new(9.0, 9.0)));

        h.map.remove_polyline_point_at(&id, 40);
        assert_eq!(h.map.polyline(&id).unwrap().path_len(), 4);
    }

    #[tokio::test]
    async fn test_polygons_and_info_windows() {
        let mut h = opened().await;
        assert!(h.map.supports_polygons());
        let polygon = h
            .map
            .add_polygon(
                OverlayId::from(1),
                PolygonOptions {
                    paths: vec![vec![
                        LatLng::new(0.0, 0.0),
                        LatLng::new(1.0, 0.0),
                        LatLng::new(1.0, 1.0),
                    ]],
                    ..PolygonOptions::default()
                },
            )
            .unwrap();
        assert_eq!(polygon.first_path().len(), 3);
        assert_eq!(h.engine.polygons_on_map().len(), 1);

        h.map.add_marker(OverlayId::from("anchor"), MarkerOptions::at(LatLng::new(51.0, 0.0)));
        h.map.add_info_window(
            OverlayId::from("info"),
            InfoWindowOptions {
                content: "<b>G-ABCD</b>".to_string(),
                ..InfoWindowOptions::default()
            },
        );
        assert!(h.map.open_info_window(&OverlayId::from("info"), Some(&OverlayId::from("anchor"))));
        assert!(h.map.info_window(&OverlayId::from("info")).unwrap().is_open());

        let closed = Arc::new(AtomicUsize::new(0));
        let c = closed.clone();
        h.map.events().hook_info_window_closed_by_user(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        let window = h.engine.info_windows()[0];
        h.engine.close_info_window_by_user(window);
        assert_eq!(closed.load(Ordering::SeqCst), 1);
        assert!(!h.map.info_window(&OverlayId::from("info")).unwrap().is_open());
    }

    #[tokio::test]
    async fn test_clustering() {
        let mut h = opened().await;
        assert_eq!(h.map.cluster_markers(&[OverlayId::from(1)]), 0);
        assert!(h.map.create_marker_clusterer(ClustererSettings::default()));

        for i in 1..=3 {
            h.map.add_marker(OverlayId::from(i), MarkerOptions::at(LatLng::new(51.0, i as f64)));
        }
        let ids: Vec<OverlayId> = (1..=3).map(OverlayId::from).collect();
        assert_eq!(h.map.cluster_markers(&ids), 3);
        assert_eq!(h.map.cluster_markers(&ids), 0);
        assert_eq!(h.engine.clusterer().unwrap().markers.len(), 3);

        assert_eq!(h.map.uncluster_markers(&ids[..1]), 1);
        h.map.set_clusterer_max_zoom(Some(10.0));
        assert_eq!(h.map.clusterer_max_zoom(), Some(10.0));
    }

    #[tokio::test]
    async fn test_layers() {
        let mut h = opened().await;
        let weather = LayerSettings {
            id: "weather".to_string(),
            url_template: "https://tiles.example.com/{z}/{x}/{y}.png".to_string(),
            min_zoom: None,
            max_zoom: None,
        };
        assert!(h.map.add_layer(weather, 0.5));
        assert!(h.map.has_layer("weather"));
        assert_eq!(h.map.layer_opacity("weather"), Some(0.5));
        assert!(h.map.set_layer_opacity("weather", 0.8));
        assert!(h.map.destroy_layer("weather"));
        assert!(!h.map.has_layer("weather"));
        assert!(h.engine.map().unwrap().overlay_map_types.is_empty());
    }

    #[tokio::test]
    async fn test_unused_circle_id() {
        let mut h = opened().await;
        assert_eq!(h.map.unused_circle_id(), OverlayId::Number(1));
        h.map.add_circle(OverlayId::from(1), CircleOptions::at(LatLng::new(0.0, 0.0), 10.0));
        h.map.add_circle(OverlayId::from(3), CircleOptions::at(LatLng::new(0.0, 0.0), 10.0));
        assert_eq!(h.map.unused_circle_id(), OverlayId::Number(2));
    }

    #[tokio::test]
    async fn test_state_round_trip() {
        let mut h = opened().await;
        h.map.set_zoom(8.0);
        h.map.set_map_type(MapType::Satellite);
        h.map.save_state().unwrap();
        assert_eq!(h.store.len(), 1);

        h.map.set_zoom(3.0);
        let state = h.map.load_state();
        assert_eq!(state.zoom, 8.0);
        assert_eq!(state.map_type, MapType::Satellite);

        h.map.apply_state(&state);
        assert_eq!(h.map.zoom(), 8.0);
    }

    #[tokio::test]
    async fn test_missing_state_falls_back_to_live_view() {
        let mut h = opened().await;
        h.map.set_zoom(6.0);
        let state = h.map.load_state();
        assert_eq!(state, h.map.create_settings());
    }

    #[tokio::test]
    async fn test_hooks_fan_out_and_unhook() {
        let mut h = opened().await;
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let (a, b) = (first.clone(), second.clone());
        let handle = h.map.events().hook_zoom_changed(move || {
            a.fetch_add(1, Ordering::SeqCst);
        });
        h.map.events().hook_zoom_changed(move || {
            b.fetch_add(1, Ordering::SeqCst);
        });

        h.map.set_zoom(14.0);
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 1);

        assert!(h.map.unhook(handle));
        assert!(!h.map.unhook(handle));
        h.map.set_zoom(15.0);
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_brightness_is_unsupported() {
        let mut h = opened().await;
        assert!(!h.map.can_set_map_brightness());
        h.map.set_map_brightness(50);
        assert_eq!(h.map.map_brightness(), 100);
    }

    #[tokio::test]
    async fn test_high_contrast_map_type() {
        let mut h = harness_with(
            HeadlessGoogleMaps::new(),
            HeadlessFetcher::resident(),
            MapOptions {
                map_type: Some(MapType::HighContrast),
                ..MapOptions::default()
            },
        );
        h.map.open(None, OpenCallbacks::default()).await.unwrap();
        assert_eq!(h.map.map_type(), MapType::HighContrast);
        assert_eq!(h.engine.map().unwrap().map_types.len(), 1);
    }
}
