pub mod bounds;
pub mod config;
pub mod constants;
pub mod geo;
pub mod options;
pub mod state;
pub mod types;
