use crate::{
    core::{
        config::{MapRuntimeConfig, ServerDefaults},
        options::{MapOptions, OpenCallbacks, ResolvedMapOptions},
        state::{state_key, MapState, PersistedMapState},
        types::MapStatus,
    },
    events::MapEvents,
    services::{
        container::{HeadlessContainer, MapContainer},
        script::LoadError,
        store::{MemoryStore, StateStore},
        text::{keys, localise, DefaultStrings, Localiser},
    },
    MapError, Result,
};
use std::sync::Arc;

/// The collaborators a map adapter needs from its host page
#[derive(Clone)]
pub struct MapEnvironment {
    pub store: Arc<dyn StateStore>,
    pub localiser: Arc<dyn Localiser>,
    pub container: Arc<dyn MapContainer>,
    pub runtime: MapRuntimeConfig,
    /// Consulted only when a map is opened with `use_server_defaults`
    pub server_defaults: Option<ServerDefaults>,
}

impl MapEnvironment {
    pub fn with_store(mut self, store: Arc<dyn StateStore>) -> Self {
        self.store = store;
        self
    }

    pub fn with_localiser(mut self, localiser: Arc<dyn Localiser>) -> Self {
        self.localiser = localiser;
        self
    }

    pub fn with_container(mut self, container: Arc<dyn MapContainer>) -> Self {
        self.container = container;
        self
    }

    pub fn with_runtime(mut self, runtime: MapRuntimeConfig) -> Self {
        self.runtime = runtime;
        self
    }

    pub fn with_server_defaults(mut self, defaults: ServerDefaults) -> Self {
        self.server_defaults = Some(defaults);
        self
    }
}

impl Default for MapEnvironment {
    fn default() -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            localiser: Arc::new(DefaultStrings),
            container: Arc::new(HeadlessContainer::new()),
            runtime: MapRuntimeConfig::default(),
            server_defaults: None,
        }
    }
}

impl std::fmt::Debug for MapEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapEnvironment")
            .field("runtime", &self.runtime)
            .field("server_defaults", &self.server_defaults)
            .finish_non_exhaustive()
    }
}

/// State and behaviour shared by both adapters
pub(crate) struct MapBase {
    pub name: String,
    /// Options given at construction, updated by setters called before open
    pub options: MapOptions,
    /// What getters report while there is no native map
    pub settings: ResolvedMapOptions,
    pub status: MapStatus,
    pub events: Arc<MapEvents>,
    pub env: MapEnvironment,
}

impl MapBase {
    pub fn new(name: &str, options: MapOptions, env: MapEnvironment) -> Result<Self> {
        if name.trim().is_empty() {
            return Err(MapError::Configuration(
                "a map needs a name to save its state under".to_string(),
            ));
        }
        Ok(Self {
            name: name.to_string(),
            settings: options.resolve(),
            options,
            status: MapStatus::Unopened,
            events: Arc::new(MapEvents::new()),
            env,
        })
    }

    pub fn ensure_not_destroyed(&self) -> Result<()> {
        match self.status {
            MapStatus::Destroyed => Err(MapError::Destroyed),
            _ => Ok(()),
        }
    }

    /// Layers library defaults, server defaults (when asked for), the
    /// instance options and the call options, then the persisted state when
    /// `use_state_on_open` is set.
    pub fn resolve_open_options(&self, call: Option<&MapOptions>) -> ResolvedMapOptions {
        let requested = match call {
            Some(call) => self.options.overlay(call),
            None => self.options.clone(),
        };

        let mut layered = MapOptions::default();
        if requested.use_server_defaults.unwrap_or(false) {
            match &self.env.server_defaults {
                Some(defaults) => layered = defaults.to_map_options(),
                None => log::warn!("map {}: server defaults requested but none supplied", self.name),
            }
        }

        let mut resolved = layered.overlay(&requested).resolve();
        if resolved.use_state_on_open {
            if let Some(saved) = self.persisted_state() {
                resolved.zoom = saved.zoom.unwrap_or(resolved.zoom);
                resolved.center = saved.center.unwrap_or(resolved.center);
                resolved.map_type = saved.map_type.unwrap_or(resolved.map_type);
            }
        }
        resolved
    }

    /// Applies `f` to the construction options and re-resolves the settings
    pub fn update_options(&mut self, f: impl FnOnce(&mut MapOptions)) {
        f(&mut self.options);
        self.settings = self.settings.clone().apply(&self.options);
    }

    /// The stored record, if there is a readable one
    pub fn persisted_state(&self) -> Option<PersistedMapState> {
        let key = state_key(&self.name);
        let value = match self.env.store.load(&key) {
            Ok(value) => value?,
            Err(e) => {
                log::warn!("could not read {}: {}", key, e);
                return None;
            }
        };
        match serde_json::from_value(value) {
            Ok(state) => Some(state),
            Err(e) => {
                log::warn!("ignoring unreadable {}: {}", key, e);
                None
            }
        }
    }

    pub fn save_state(&self, state: &MapState) -> Result<()> {
        let key = state_key(&self.name);
        self.env.store.save(&key, serde_json::to_value(state)?)?;
        log::debug!("saved {}", key);
        Ok(())
    }

    /// The stored state with anything missing taken from `live`
    pub fn load_state(&self, live: MapState) -> MapState {
        match self.persisted_state() {
            Some(saved) => saved.or_live(live),
            None => live,
        }
    }

    /// Puts the placeholder up and runs every callback. The map stays
    /// without a native engine.
    pub fn fail_load(&mut self, error: &LoadError, callbacks: OpenCallbacks) -> MapStatus {
        let status = error.status();
        log::error!("map {} could not load its library: {}", self.name, status);

        let text_key = match error {
            LoadError::Offline => keys::MAP_OFFLINE,
            _ => keys::MAP_LOAD_FAILED,
        };
        self.env
            .container
            .show_placeholder(&localise(self.env.localiser.as_ref(), text_key));
        self.status = MapStatus::LoadFailed(status.clone());

        if let Some(on_load_failure) = callbacks.on_load_failure {
            on_load_failure(&status);
        }
        if let Some(after_create) = callbacks.after_create {
            after_create();
        }
        if let Some(after_open) = callbacks.after_open {
            after_open();
        }
        self.status.clone()
    }
}
