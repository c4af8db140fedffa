//! The commercial map service
//!
//! [`native`] describes the script API as traits, [`headless`] implements
//! them in memory, and [`GoogleMap`] adapts either to [`MapAdapter`].
//!
//! [`MapAdapter`]: crate::map::MapAdapter

pub mod convert;
pub mod headless;
mod map;
pub mod native;
pub(crate) mod overlays;

pub use headless::HeadlessGoogleMaps;
pub use map::GoogleMap;
