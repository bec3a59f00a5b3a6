//! ISS flyover subsystem.
//!
//! Resolves the caller's public IP, geolocates it, and asks the pass
//! prediction service when the station will next be overhead.

pub mod providers;
pub mod resolver;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use resolver::FlyoverResolver;
pub use types::{Coordinates, FetchError, FlyoverReport, PassTime, Stage};
