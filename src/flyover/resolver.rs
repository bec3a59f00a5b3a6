//! Flyover resolver: async front door to the three providers.
//!
//! Chain:  IP lookup → geo lookup → ISS pass predictions
//!
//! The first failing stage ends the chain; its error is returned unchanged.

use super::providers;
use super::types::{Coordinates, FetchError, FlyoverReport, PassTime, Stage};
use crate::config::{Config, Endpoints};
use log::{debug, info};
use std::sync::Arc;
use std::time::Duration;

const USER_AGENT: &str = concat!("iss-flyover/", env!("CARGO_PKG_VERSION"));

/// Holds the shared HTTP agent and the upstream endpoints.
#[derive(Clone)]
pub struct FlyoverResolver {
    agent: ureq::Agent,
    endpoints: Arc<Endpoints>,
    passes: Option<u32>,
}

impl FlyoverResolver {
    pub fn new(config: &Config) -> Self {
        Self::from_parts(config.endpoints.clone(), config.timeout(), config.passes)
    }

    /// Build a resolver without going through a [`Config`] (sub-second timeouts in tests).
    pub fn from_parts(endpoints: Endpoints, timeout: Duration, passes: Option<u32>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build();
        Self {
            agent,
            endpoints: Arc::new(endpoints),
            passes,
        }
    }

    /// Look up the caller's public IP address.
    pub async fn fetch_my_ip(&self) -> Result<String, FetchError> {
        let agent = self.agent.clone();
        let url = self.endpoints.ip_url.clone();
        run_blocking(Stage::FetchingIp, move || providers::fetch_my_ip(&agent, &url)).await
    }

    /// Geolocate an IP address. The address is passed through as-is.
    pub async fn fetch_coords_by_ip(&self, ip: &str) -> Result<Coordinates, FetchError> {
        let agent = self.agent.clone();
        let base = self.endpoints.geo_url.clone();
        let ip = ip.to_string();
        run_blocking(Stage::FetchingCoords, move || {
            providers::fetch_coords_by_ip(&agent, &base, &ip)
        })
        .await
    }

    /// Upcoming ISS passes over `coords`, in the order the service lists them.
    pub async fn fetch_flyover_times(&self, coords: Coordinates) -> Result<Vec<PassTime>, FetchError> {
        let agent = self.agent.clone();
        let base = self.endpoints.pass_url.clone();
        let count = self.passes;
        run_blocking(Stage::FetchingFlyovers, move || {
            providers::fetch_flyover_times(&agent, &base, coords, count)
        })
        .await
    }

    /// Run the whole chain starting from a known IP.
    pub async fn report_for_ip(&self, ip: &str) -> Result<FlyoverReport, FetchError> {
        let coordinates = self.fetch_coords_by_ip(ip).await?;
        debug!("{} is at {}", ip, coordinates);
        let passes = self.fetch_flyover_times(coordinates).await?;
        Ok(FlyoverReport {
            ip: Some(ip.to_string()),
            coordinates,
            passes,
        })
    }

    /// Run the whole chain starting from known coordinates.
    pub async fn report_for_coords(&self, coordinates: Coordinates) -> Result<FlyoverReport, FetchError> {
        let passes = self.fetch_flyover_times(coordinates).await?;
        Ok(FlyoverReport {
            ip: None,
            coordinates,
            passes,
        })
    }

    /// IP → coordinates → passes, keeping the intermediate values.
    pub async fn report_for_my_location(&self) -> Result<FlyoverReport, FetchError> {
        let ip = self.fetch_my_ip().await?;
        debug!("public IP is {}", ip);
        let report = self.report_for_ip(&ip).await?;
        info!(
            "{} upcoming passes over {}",
            report.passes.len(),
            report.coordinates
        );
        Ok(report)
    }

    /// IP → coordinates → passes.
    pub async fn next_flyovers_for_my_location(&self) -> Result<Vec<PassTime>, FetchError> {
        self.report_for_my_location().await.map(|report| report.passes)
    }
}

async fn run_blocking<T, F>(stage: Stage, f: F) -> Result<T, FetchError>
where
    F: FnOnce() -> Result<T, FetchError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| FetchError::Worker {
            stage,
            message: e.to_string(),
        })?
}
