//! Find out when the International Space Station will next pass overhead.
//!
//! The chain is IP lookup → geolocation → pass prediction, each stage one
//! HTTP GET. See [`flyover::FlyoverResolver`].

pub mod config;
pub mod flyover;
pub mod logging;
pub mod report;
pub mod server;
