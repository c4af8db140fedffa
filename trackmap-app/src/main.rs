use anyhow::{bail, Context};
use std::sync::Arc;
use trackmap::prelude::*;

/// Longest trail kept behind each aircraft
const TRAIL_LENGTH: usize = 10;

/// Replays a few synthetic aircraft tracks on a headless map.
///
/// Usage: `trackmap-app [google|leaflet] [server-defaults.json]`
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let provider = args.next().unwrap_or_else(|| "leaflet".to_string());
    let server_defaults = match args.next() {
        Some(path) => Some(read_server_defaults(&path)?),
        None => None,
    };

    let state_path = std::env::temp_dir().join("trackmap-state.json");
    let mut env = MapEnvironment::default()
        .with_store(Arc::new(JsonFileStore::open(&state_path)?))
        .with_runtime(MapRuntimeConfig::slow_network());
    if let Some(defaults) = server_defaults {
        env = env.with_server_defaults(defaults);
    }

    let options = MapOptions {
        use_server_defaults: Some(true),
        use_state_on_open: Some(true),
        show_high_contrast: Some(true),
        ..MapOptions::default()
    };
    let mut map: Box<dyn MapAdapter> = match provider.as_str() {
        "google" => {
            let loader = Arc::new(ScriptLoader::new(Arc::new(HeadlessFetcher::resident())));
            Box::new(GoogleMap::new("replay", options, Arc::new(HeadlessGoogleMaps::new()), loader, env)?)
        }
        "leaflet" => Box::new(LeafletMap::new("replay", options, Arc::new(HeadlessLeaflet::new()), env)?),
        other => bail!("unknown provider {}, expected google or leaflet", other),
    };

    map.events().hook_marker_clicked(|id, _| log::info!("aircraft {} selected", id));
    let status = map
        .open(
            None,
            OpenCallbacks::default().on_load_failure(|status| log::error!("map unavailable: {}", status)),
        )
        .await?;
    if !status.is_open() {
        bail!("map did not open: {:?}", status);
    }

    replay(map.as_mut());
    map.save_state()
        .with_context(|| format!("saving state to {}", state_path.display()))?;

    log::info!(
        "{:?} map at zoom {} showing {} aircraft",
        map.provider(),
        map.zoom(),
        map.marker_ids().len()
    );
    map.destroy();
    Ok(())
}

fn read_server_defaults(path: &str) -> anyhow::Result<ServerDefaults> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path))
}

/// Moves every aircraft along a straight line, keeping a bounded trail
fn replay(map: &mut dyn MapAdapter) {
    let flights = [
        ("BAW123", LatLng::new(51.47, -0.45), (0.02, 0.03)),
        ("EZY45", LatLng::new(51.15, -0.18), (0.03, -0.01)),
        ("RYR8", LatLng::new(51.88, 0.23), (-0.01, -0.02)),
    ];

    for step in 0..20 {
        for (callsign, origin, (dlat, dlng)) in &flights {
            let id = OverlayId::from(*callsign);
            let position = LatLng::new(origin.lat + dlat * step as f64, origin.lng + dlng * step as f64);

            match map.marker_mut(&id) {
                Some(marker) => marker.set_position(position),
                None => {
                    map.add_marker(
                        id.clone(),
                        MarkerOptions {
                            tooltip: Some(callsign.to_string()),
                            ..MarkerOptions::at(position)
                        },
                    );
                }
            }

            if map.polyline(&id).is_none() {
                map.add_polyline(
                    id.clone(),
                    PolylineOptions {
                        stroke_colour: "#1e90ff".to_string(),
                        stroke_weight: 2.0,
                        ..PolylineOptions::with_path(Vec::new())
                    },
                );
            }
            map.append_to_polyline(&id, &[position], false);
            let excess = map.polyline(&id).map_or(0, |p| p.path_len().saturating_sub(TRAIL_LENGTH));
            if excess > 0 {
                map.trim_polyline(&id, excess, true);
            }
        }
    }

    let positions: Vec<LatLng> = map
        .marker_ids()
        .iter()
        .filter_map(|id| map.marker(id).map(|m| m.position()))
        .collect();
    if let Some(bounds) = Bounds::from_lat_lngs(&positions) {
        map.fit_bounds(&bounds);
    }
}
