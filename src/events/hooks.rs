use crate::{
    core::types::OverlayId,
    events::map_event::{MapEvent, MapEventKind, MouseEvent},
    prelude::HashMap,
};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex,
};

/// Event listener callback type
pub type EventCallback = Arc<dyn Fn(&MapEvent) + Send + Sync>;

/// Opaque handle returned by every hook; pass it to [`MapEvents::unhook`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookHandle {
    kind: MapEventKind,
    id: u64,
}

impl HookHandle {
    pub fn kind(&self) -> MapEventKind {
        self.kind
    }
}

/// Generates the typed hook methods for events without a payload
macro_rules! plain_hooks {
    ($($method:ident => $kind:ident),* $(,)?) => {
        $(
            pub fn $method<F>(&self, callback: F) -> HookHandle
            where
                F: Fn() + Send + Sync + 'static,
            {
                self.hook(MapEventKind::$kind, move |_| callback())
            }
        )*
    };
}

/// Publish/subscribe hub for one map's events.
///
/// Any number of hooks may listen to the same event; the order they fire in
/// is unspecified. Events are delivered synchronously in publish order.
/// Callbacks may hook or unhook while an event is being delivered.
pub struct MapEvents {
    listeners: Mutex<HashMap<MapEventKind, Vec<(u64, EventCallback)>>>,
    subscribers: Mutex<Vec<Sender<MapEvent>>>,
    next_id: AtomicU64,
}

impl MapEvents {
    pub fn new() -> Self {
        Self {
            listeners: Mutex::new(HashMap::default()),
            subscribers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a listener for one kind of event
    pub fn hook<F>(&self, kind: MapEventKind, callback: F) -> HookHandle
    where
        F: Fn(&MapEvent) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners
                .entry(kind)
                .or_default()
                .push((id, Arc::new(callback)));
        }
        HookHandle { kind, id }
    }

    /// Removes a listener. Returns false if the handle was already unhooked.
    pub fn unhook(&self, handle: HookHandle) -> bool {
        let Ok(mut listeners) = self.listeners.lock() else {
            return false;
        };
        let Some(callbacks) = listeners.get_mut(&handle.kind) else {
            return false;
        };
        let before = callbacks.len();
        callbacks.retain(|(id, _)| *id != handle.id);
        before != callbacks.len()
    }

    /// Every event published from now on is also sent down the returned
    /// channel. Dropping the receiver ends the subscription.
    pub fn subscribe(&self) -> Receiver<MapEvent> {
        let (tx, rx) = unbounded();
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.push(tx);
        }
        rx
    }

    /// Number of hooks currently registered for `kind`
    pub fn hook_count(&self, kind: MapEventKind) -> usize {
        self.listeners
            .lock()
            .map(|l| l.get(&kind).map_or(0, Vec::len))
            .unwrap_or(0)
    }

    pub(crate) fn publish(&self, event: MapEvent) {
        let callbacks: Vec<EventCallback> = match self.listeners.lock() {
            Ok(listeners) => listeners
                .get(&event.kind())
                .map(|c| c.iter().map(|(_, cb)| cb.clone()).collect())
                .unwrap_or_default(),
            Err(_) => Vec::new(),
        };

        for callback in callbacks {
            callback(&event);
        }

        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        }
    }

    plain_hooks! {
        hook_bounds_changed => BoundsChanged,
        hook_brightness_changed => BrightnessChanged,
        hook_center_changed => CenterChanged,
        hook_idle => Idle,
        hook_map_type_changed => MapTypeChanged,
        hook_tiles_loaded => TilesLoaded,
        hook_zoom_changed => ZoomChanged,
    }

    pub fn hook_clicked<F>(&self, callback: F) -> HookHandle
    where
        F: Fn(&MouseEvent) + Send + Sync + 'static,
    {
        self.hook(MapEventKind::Clicked, move |event| {
            if let Some(mouse) = event.mouse() {
                callback(mouse);
            }
        })
    }

    pub fn hook_double_clicked<F>(&self, callback: F) -> HookHandle
    where
        F: Fn(&MouseEvent) + Send + Sync + 'static,
    {
        self.hook(MapEventKind::DoubleClicked, move |event| {
            if let Some(mouse) = event.mouse() {
                callback(mouse);
            }
        })
    }

    pub fn hook_right_clicked<F>(&self, callback: F) -> HookHandle
    where
        F: Fn(&MouseEvent) + Send + Sync + 'static,
    {
        self.hook(MapEventKind::RightClicked, move |event| {
            if let Some(mouse) = event.mouse() {
                callback(mouse);
            }
        })
    }

    pub fn hook_marker_clicked<F>(&self, callback: F) -> HookHandle
    where
        F: Fn(&OverlayId, &MouseEvent) + Send + Sync + 'static,
    {
        self.hook(MapEventKind::MarkerClicked, move |event| {
            if let MapEvent::MarkerClicked { id, mouse } = event {
                callback(id, mouse);
            }
        })
    }

    pub fn hook_marker_dragged<F>(&self, callback: F) -> HookHandle
    where
        F: Fn(&OverlayId, &MouseEvent) + Send + Sync + 'static,
    {
        self.hook(MapEventKind::MarkerDragged, move |event| {
            if let MapEvent::MarkerDragged { id, mouse } = event {
                callback(id, mouse);
            }
        })
    }

    pub fn hook_info_window_closed_by_user<F>(&self, callback: F) -> HookHandle
    where
        F: Fn(&OverlayId) + Send + Sync + 'static,
    {
        self.hook(MapEventKind::InfoWindowClosedByUser, move |event| {
            if let MapEvent::InfoWindowClosedByUser { id } = event {
                callback(id);
            }
        })
    }
}

impl Default for MapEvents {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_fan_out_and_unhook() {
        let events = MapEvents::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let f = first.clone();
        let handle = events.hook_idle(move || {
            f.fetch_add(1, Ordering::SeqCst);
        });
        let s = second.clone();
        events.hook_idle(move || {
            s.fetch_add(1, Ordering::SeqCst);
        });

        events.publish(MapEvent::Idle);
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 1);

        assert!(events.unhook(handle));
        assert!(!events.unhook(handle));
        events.publish(MapEvent::Idle);
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_marker_hook_receives_id() {
        let events = MapEvents::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        events.hook_marker_clicked(move |id, _| {
            s.lock().unwrap().push(id.clone());
        });

        events.publish(MapEvent::ZoomChanged);
        events.publish(MapEvent::MarkerClicked {
            id: OverlayId::from(7_i64),
            mouse: MouseEvent::empty(),
        });

        assert_eq!(*seen.lock().unwrap(), vec![OverlayId::from(7_i64)]);
    }

    #[test]
    fn test_subscribe_channel() {
        let events = MapEvents::new();
        let rx = events.subscribe();

        events.publish(MapEvent::BoundsChanged);
        events.publish(MapEvent::CenterChanged);

        let kinds: Vec<_> = rx.try_iter().map(|e| e.kind()).collect();
        assert_eq!(kinds, vec![MapEventKind::BoundsChanged, MapEventKind::CenterChanged]);

        drop(rx);
        events.publish(MapEvent::Idle);
        assert_eq!(events.subscribers.lock().unwrap().len(), 0);
    }

    #[test]
    fn test_reentrant_unhook() {
        let events = Arc::new(MapEvents::new());
        let handle_slot: Arc<Mutex<Option<HookHandle>>> = Arc::new(Mutex::new(None));

        let ev = events.clone();
        let slot = handle_slot.clone();
        let handle = events.hook_zoom_changed(move || {
            if let Some(h) = slot.lock().unwrap().take() {
                ev.unhook(h);
            }
        });
        *handle_slot.lock().unwrap() = Some(handle);

        events.publish(MapEvent::ZoomChanged);
        assert_eq!(events.hook_count(MapEventKind::ZoomChanged), 0);
    }
}
