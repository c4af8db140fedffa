//! The open tile-based provider

pub mod convert;
pub mod headless;
mod map;
pub mod native;
pub(crate) mod overlays;

pub use headless::HeadlessLeaflet;
pub use map::LeafletMap;
