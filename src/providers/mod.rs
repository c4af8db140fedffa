//! Native map engines and their adapters

pub mod google;
pub mod leaflet;
