//! Upstream providers: IP lookup, geo lookup and ISS pass predictions.
//!
//! Everything here is blocking; [`super::resolver::FlyoverResolver`] moves
//! each call onto tokio's blocking pool.

use super::types::{Coordinates, FetchError, PassTime, Stage};
use log::{debug, warn};
use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Value;
use std::io;
use ureq::Agent;

// ─── HTTP plumbing ──────────────────────────────────────────────

/// Issue one GET and return the body of a 200 response.
pub(crate) fn get_body(agent: &Agent, url: &str, stage: Stage) -> Result<String, FetchError> {
    debug!("GET {} ({})", url, stage);

    let response = match agent.get(url).call() {
        Ok(response) => response,
        Err(ureq::Error::Status(status, response)) => {
            let body = response.into_string().unwrap_or_else(|e| {
                warn!("{} returned status {} and its body could not be read: {}", url, status, e);
                format!("<unreadable body: {}>", e)
            });
            warn!("{} returned status {}", url, status);
            return Err(FetchError::Status { stage, status, body });
        }
        Err(ureq::Error::Transport(source)) => {
            warn!("{} failed: {}", url, source);
            return Err(FetchError::Transport {
                stage,
                source: Box::new(source),
            });
        }
    };

    let status = response.status();
    let body = response.into_string().map_err(|e| body_read_error(stage, url, e))?;

    // ureq only reports 4xx/5xx as errors; anything else that isn't 200 is still unexpected.
    if status != 200 {
        warn!("{} returned status {}", url, status);
        return Err(FetchError::Status { stage, status, body });
    }

    Ok(body)
}

/// Oversized or non-UTF-8 bodies are a decode problem; anything else
/// (timeout, reset, early EOF) means the connection failed mid-body.
fn body_read_error(stage: Stage, url: &str, e: io::Error) -> FetchError {
    if e.kind() == io::ErrorKind::InvalidData {
        return FetchError::Decode {
            stage,
            message: format!("failed to read body: {}", e),
        };
    }
    warn!("{} failed while reading the body: {}", url, e);
    FetchError::Transport {
        stage,
        source: Box::new(e),
    }
}

fn decode<'a, T: Deserialize<'a>>(body: &'a str, stage: Stage) -> Result<T, FetchError> {
    serde_json::from_str(body).map_err(|e| FetchError::Decode {
        stage,
        message: e.to_string(),
    })
}

// ─── IP lookup ──────────────────────────────────────────────────

#[derive(Deserialize)]
struct IpBody {
    ip: Option<String>,
}

pub(crate) fn parse_ip(body: &str) -> Result<String, FetchError> {
    let stage = Stage::FetchingIp;
    let parsed: IpBody = decode(body, stage)?;
    match parsed.ip.map(|ip| ip.trim().to_string()) {
        Some(ip) if !ip.is_empty() => Ok(ip),
        _ => Err(FetchError::Empty { stage }),
    }
}

pub fn fetch_my_ip(agent: &Agent, url: &str) -> Result<String, FetchError> {
    let body = get_body(agent, url, Stage::FetchingIp)?;
    parse_ip(&body)
}

// ─── Geo lookup ─────────────────────────────────────────────────

#[derive(Deserialize)]
struct GeoBody {
    data: Option<GeoData>,
}

#[derive(Deserialize)]
struct GeoData {
    #[serde(default, deserialize_with = "number_or_string")]
    latitude: Option<f64>,
    #[serde(default, deserialize_with = "number_or_string")]
    longitude: Option<f64>,
}

/// Some geo services send coordinates as JSON strings ("40.7128").
fn number_or_string<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_f64()
            .map(Some)
            .ok_or_else(|| de::Error::custom("coordinate is not representable as f64")),
        Some(Value::String(s)) => s.trim().parse::<f64>().map(Some).map_err(de::Error::custom),
        Some(other) => Err(de::Error::custom(format!("expected a number, found {}", other))),
    }
}

pub(crate) fn coords_url(base: &str, ip: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), ip)
}

pub(crate) fn parse_coords(body: &str) -> Result<Coordinates, FetchError> {
    let stage = Stage::FetchingCoords;
    let parsed: GeoBody = decode(body, stage)?;
    let data = parsed.data.ok_or(FetchError::Empty { stage })?;
    let coords = match (data.latitude, data.longitude) {
        (Some(latitude), Some(longitude)) => Coordinates { latitude, longitude },
        _ => return Err(FetchError::Empty { stage }),
    };
    // Also rejects NaN and infinities, which "NaN"/"inf" strings parse to.
    if !coords.is_valid() {
        return Err(FetchError::Decode {
            stage,
            message: format!(
                "coordinates out of range: latitude {}, longitude {}",
                coords.latitude, coords.longitude
            ),
        });
    }
    Ok(coords)
}

pub fn fetch_coords_by_ip(agent: &Agent, base_url: &str, ip: &str) -> Result<Coordinates, FetchError> {
    let body = get_body(agent, &coords_url(base_url, ip), Stage::FetchingCoords)?;
    parse_coords(&body)
}

// ─── ISS pass predictions ───────────────────────────────────────

#[derive(Deserialize)]
struct PassBody {
    response: Option<Vec<PassTime>>,
}

pub(crate) fn passes_url(base: &str, coords: Coordinates, count: Option<u32>) -> String {
    let sep = if base.contains('?') { '&' } else { '?' };
    let mut url = format!(
        "{}{}lat={}&lon={}",
        base, sep, coords.latitude, coords.longitude
    );
    if let Some(n) = count {
        url.push_str(&format!("&n={}", n));
    }
    url
}

/// An empty `response` array is a valid answer: no passes coming up.
pub(crate) fn parse_passes(body: &str) -> Result<Vec<PassTime>, FetchError> {
    let stage = Stage::FetchingFlyovers;
    let parsed: PassBody = decode(body, stage)?;
    parsed.response.ok_or(FetchError::Empty { stage })
}

pub fn fetch_flyover_times(
    agent: &Agent,
    base_url: &str,
    coords: Coordinates,
    count: Option<u32>,
) -> Result<Vec<PassTime>, FetchError> {
    let body = get_body(agent, &passes_url(base_url, coords, count), Stage::FetchingFlyovers)?;
    parse_passes(&body)
}
