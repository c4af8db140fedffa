//! Collaborators the adapters consume but do not own: a state store, a
//! script loader, display strings and the host container.

pub mod container;
pub mod script;
pub mod store;
pub mod text;

pub use container::{HeadlessContainer, MapContainer};
pub use script::{HeadlessFetcher, LoadError, ScriptFetcher, ScriptLoader, ScriptRequest};
pub use store::{JsonFileStore, MemoryStore, StateStore};
pub use text::{DefaultStrings, Localiser};
