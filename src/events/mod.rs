//! Adapter-level events and the hook registry that re-publishes them

pub mod hooks;
pub mod map_event;

// Re-export the essential types
pub use hooks::{EventCallback, HookHandle, MapEvents};
pub use map_event::{MapEvent, MapEventKind, MouseEvent};
