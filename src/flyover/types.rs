//! Core types for the flyover subsystem.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A point on the Earth's surface, as reported by the geo-lookup service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Whether both components fall inside the valid geographic ranges.
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// One predicted overhead-visibility window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassTime {
    /// Start of the pass, in Unix epoch seconds.
    pub risetime: i64,
    /// Length of the pass, in seconds.
    pub duration: i64,
}

/// Everything the full chain learned along the way.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlyoverReport {
    /// `None` when the caller supplied coordinates directly.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    pub coordinates: Coordinates,
    pub passes: Vec<PassTime>,
}

/// Which resolver in the chain produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stage {
    FetchingIp,
    FetchingCoords,
    FetchingFlyovers,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FetchingIp => write!(f, "fetching IP"),
            Self::FetchingCoords => write!(f, "fetching coordinates for IP"),
            Self::FetchingFlyovers => write!(f, "fetching fly over times for coordinates"),
        }
    }
}

/// Failure of a single resolver call.
#[derive(Debug, Error)]
pub enum FetchError {
    /// DNS, connection or timeout failure, before or during the body read.
    /// The underlying ureq or I/O error is kept intact.
    #[error("Transport error when {stage}: {source}")]
    Transport {
        stage: Stage,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The upstream answered with something other than 200 OK.
    #[error("Status Code {status} when {stage}. Response: {body}")]
    Status {
        stage: Stage,
        status: u16,
        body: String,
    },

    /// The body parsed but carried no usable data.
    #[error("No results when {stage}")]
    Empty { stage: Stage },

    /// The body was not the JSON shape we expected.
    #[error("Invalid response when {stage}: {message}")]
    Decode { stage: Stage, message: String },

    /// The blocking request task panicked or was cancelled.
    #[error("Request task failed when {stage}: {message}")]
    Worker { stage: Stage, message: String },
}

impl FetchError {
    pub fn stage(&self) -> Stage {
        match self {
            Self::Transport { stage, .. }
            | Self::Status { stage, .. }
            | Self::Empty { stage }
            | Self::Decode { stage, .. }
            | Self::Worker { stage, .. } => *stage,
        }
    }

    pub fn is_empty_result(&self) -> bool {
        matches!(self, Self::Empty { .. })
    }
}
