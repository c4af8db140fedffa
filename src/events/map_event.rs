use crate::core::types::OverlayId;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// The native engine's own mouse event, passed through untouched for
/// callers that need further native interop. The adapter never looks
/// inside it.
#[derive(Clone, Default)]
pub struct MouseEvent {
    native: Option<Arc<dyn Any + Send + Sync>>,
}

impl MouseEvent {
    pub fn from_native<T: Any + Send + Sync>(native: T) -> Self {
        Self {
            native: Some(Arc::new(native)),
        }
    }

    /// An event with no native payload
    pub fn empty() -> Self {
        Self::default()
    }

    /// Borrows the native event if it is a `T`
    pub fn native<T: Any>(&self) -> Option<&T> {
        self.native.as_ref().and_then(|n| n.downcast_ref::<T>())
    }
}

impl fmt::Debug for MouseEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MouseEvent")
            .field("has_native", &self.native.is_some())
            .finish()
    }
}

/// Events raised by a map adapter. Overlay events carry the caller's id,
/// never the native overlay.
#[derive(Debug, Clone)]
pub enum MapEvent {
    BoundsChanged,
    BrightnessChanged,
    CenterChanged,
    Clicked(MouseEvent),
    DoubleClicked(MouseEvent),
    /// The map has settled after a pan or zoom
    Idle,
    MapTypeChanged,
    RightClicked(MouseEvent),
    TilesLoaded,
    ZoomChanged,
    MarkerClicked { id: OverlayId, mouse: MouseEvent },
    MarkerDragged { id: OverlayId, mouse: MouseEvent },
    InfoWindowClosedByUser { id: OverlayId },
}

impl MapEvent {
    pub fn kind(&self) -> MapEventKind {
        match self {
            MapEvent::BoundsChanged => MapEventKind::BoundsChanged,
            MapEvent::BrightnessChanged => MapEventKind::BrightnessChanged,
            MapEvent::CenterChanged => MapEventKind::CenterChanged,
            MapEvent::Clicked(_) => MapEventKind::Clicked,
            MapEvent::DoubleClicked(_) => MapEventKind::DoubleClicked,
            MapEvent::Idle => MapEventKind::Idle,
            MapEvent::MapTypeChanged => MapEventKind::MapTypeChanged,
            MapEvent::RightClicked(_) => MapEventKind::RightClicked,
            MapEvent::TilesLoaded => MapEventKind::TilesLoaded,
            MapEvent::ZoomChanged => MapEventKind::ZoomChanged,
            MapEvent::MarkerClicked { .. } => MapEventKind::MarkerClicked,
            MapEvent::MarkerDragged { .. } => MapEventKind::MarkerDragged,
            MapEvent::InfoWindowClosedByUser { .. } => MapEventKind::InfoWindowClosedByUser,
        }
    }

    /// The overlay the event concerns, if any
    pub fn overlay_id(&self) -> Option<&OverlayId> {
        match self {
            MapEvent::MarkerClicked { id, .. }
            | MapEvent::MarkerDragged { id, .. }
            | MapEvent::InfoWindowClosedByUser { id } => Some(id),
            _ => None,
        }
    }

    pub fn mouse(&self) -> Option<&MouseEvent> {
        match self {
            MapEvent::Clicked(mouse)
            | MapEvent::DoubleClicked(mouse)
            | MapEvent::RightClicked(mouse)
            | MapEvent::MarkerClicked { mouse, .. }
            | MapEvent::MarkerDragged { mouse, .. } => Some(mouse),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapEventKind {
    BoundsChanged,
    BrightnessChanged,
    CenterChanged,
    Clicked,
    DoubleClicked,
    Idle,
    MapTypeChanged,
    RightClicked,
    TilesLoaded,
    ZoomChanged,
    MarkerClicked,
    MarkerDragged,
    InfoWindowClosedByUser,
}

impl fmt::Display for MapEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MapEventKind::BoundsChanged => "boundsChanged",
            MapEventKind::BrightnessChanged => "brightnessChanged",
            MapEventKind::CenterChanged => "centerChanged",
            MapEventKind::Clicked => "clicked",
            MapEventKind::DoubleClicked => "doubleClicked",
            MapEventKind::Idle => "idle",
            MapEventKind::MapTypeChanged => "mapTypeChanged",
            MapEventKind::RightClicked => "rightClicked",
            MapEventKind::TilesLoaded => "tilesLoaded",
            MapEventKind::ZoomChanged => "zoomChanged",
            MapEventKind::MarkerClicked => "markerClicked",
            MapEventKind::MarkerDragged => "markerDragged",
            MapEventKind::InfoWindowClosedByUser => "infoWindowClosedByUser",
        };
        f.write_str(name)
    }
}
