use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use log::info;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::flyover::{Coordinates, FetchError, FlyoverReport};

use super::state::AppState;

// ─── Error response ──────────────────────────────────────────────

#[derive(Serialize)]
struct ApiErrorBody {
    error: String,
    code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    stage: Option<String>,
}

pub struct ApiError {
    status: StatusCode,
    message: String,
    stage: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: self.message,
            code: self.status.as_u16(),
            stage: self.stage,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<FetchError> for ApiError {
    fn from(e: FetchError) -> Self {
        let status = match &e {
            FetchError::Transport { .. } => StatusCode::GATEWAY_TIMEOUT,
            FetchError::Worker { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            FetchError::Status { .. } | FetchError::Empty { .. } | FetchError::Decode { .. } => {
                StatusCode::BAD_GATEWAY
            }
        };
        Self {
            status,
            message: e.to_string(),
            stage: Some(e.stage().to_string()),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        bad_request(rejection.body_text())
    }
}

fn bad_request(msg: impl Into<String>) -> ApiError {
    ApiError {
        status: StatusCode::BAD_REQUEST,
        message: msg.into(),
        stage: None,
    }
}

// ─── GET /api/ip ─────────────────────────────────────────────────

#[derive(Serialize)]
pub struct IpResponse {
    pub ip: String,
}

pub async fn my_ip(State(state): State<Arc<AppState>>) -> Result<Json<IpResponse>, ApiError> {
    let ip = state.resolver.fetch_my_ip().await?;
    Ok(Json(IpResponse { ip }))
}

// ─── GET /api/coords ─────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CoordsQuery {
    pub ip: Option<String>,
}

pub async fn coords(
    State(state): State<Arc<AppState>>,
    params: Result<Query<CoordsQuery>, QueryRejection>,
) -> Result<Json<Coordinates>, ApiError> {
    let Query(params) = params?;
    let ip = match params.ip.as_deref().map(str::trim) {
        Some(ip) if !ip.is_empty() => ip.to_string(),
        _ => state.resolver.fetch_my_ip().await?,
    };
    let coords = state.resolver.fetch_coords_by_ip(&ip).await?;
    Ok(Json(coords))
}

// ─── GET /api/flyovers ───────────────────────────────────────────

#[derive(Deserialize)]
pub struct FlyoverQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

pub async fn flyovers(
    State(state): State<Arc<AppState>>,
    params: Result<Query<FlyoverQuery>, QueryRejection>,
) -> Result<Json<FlyoverReport>, ApiError> {
    let start = Instant::now();
    let Query(params) = params?;

    let report = match (params.lat, params.lon) {
        (Some(lat), Some(lon)) => {
            let coords = Coordinates::new(lat, lon);
            if !coords.is_valid() {
                return Err(bad_request("Invalid coordinates. Lat: -90..90, Lon: -180..180"));
            }
            state.resolver.report_for_coords(coords).await?
        }
        (None, None) => state.resolver.report_for_my_location().await?,
        _ => return Err(bad_request("Provide both 'lat' and 'lon', or neither")),
    };

    info!(
        "GET /api/flyovers {} -> {} passes ({:.1}ms)",
        report.coordinates,
        report.passes.len(),
        start.elapsed().as_secs_f64() * 1000.0,
    );

    Ok(Json(report))
}
