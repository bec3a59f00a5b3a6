//! Local stand-ins for the three upstream services, served by axum on 127.0.0.1.

use crate::config::Endpoints;
use axum::extract::{Path, RawQuery, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
pub(crate) struct Hits {
    pub ip: AtomicUsize,
    pub geo: AtomicUsize,
    pub passes: AtomicUsize,
}

#[derive(Default)]
struct Seen {
    geo_ip: Option<String>,
    pass_query: Option<String>,
}

#[derive(Clone)]
struct Canned {
    status: u16,
    body: String,
    delay: Duration,
}

impl Canned {
    fn ok(body: &str) -> Self {
        Self {
            status: 200,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    async fn respond(&self) -> Response {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, [(header::CONTENT_TYPE, "application/json")], self.body.clone()).into_response()
    }
}

struct MockState {
    ip: Canned,
    geo: Canned,
    passes: Canned,
    hits: Arc<Hits>,
    seen: Arc<Mutex<Seen>>,
}

pub(crate) struct MockUpstream {
    ip: Canned,
    geo: Canned,
    passes: Canned,
    pub hits: Arc<Hits>,
    seen: Arc<Mutex<Seen>>,
    base: String,
}

impl MockUpstream {
    /// All three services answer with well-formed bodies.
    pub fn healthy() -> Self {
        Self {
            ip: Canned::ok(r#"{"ip":"1.2.3.4"}"#),
            geo: Canned::ok(r#"{"status":"success","data":{"ipv4":"1.2.3.4","latitude":40.7,"longitude":-74.0}}"#),
            passes: Canned::ok(
                r#"{"message":"success","request":{"altitude":100,"passes":2},"response":[{"risetime":1600000000,"duration":600},{"risetime":1600005800,"duration":540}]}"#,
            ),
            hits: Arc::new(Hits::default()),
            seen: Arc::new(Mutex::new(Seen::default())),
            base: String::new(),
        }
    }

    pub fn with_ip_status(mut self, status: u16, body: &str) -> Self {
        self.ip = Canned { status, ..Canned::ok(body) };
        self
    }

    pub fn with_geo(mut self, body: &str) -> Self {
        self.geo = Canned::ok(body);
        self
    }

    pub fn with_geo_delay(mut self, delay: Duration) -> Self {
        self.geo.delay = delay;
        self
    }

    pub fn with_passes(mut self, body: &str) -> Self {
        self.passes = Canned::ok(body);
        self
    }

    pub fn with_pass_status(mut self, status: u16, body: &str) -> Self {
        self.passes = Canned { status, ..Canned::ok(body) };
        self
    }

    pub async fn start(mut self) -> Self {
        let state = Arc::new(MockState {
            ip: self.ip.clone(),
            geo: self.geo.clone(),
            passes: self.passes.clone(),
            hits: self.hits.clone(),
            seen: self.seen.clone(),
        });
        let router = Router::new()
            .route("/ip", get(ip_handler))
            .route("/geo/{ip}", get(geo_handler))
            .route("/iss-pass.json", get(pass_handler))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        self.base = format!("http://{}", addr);
        self
    }

    pub fn endpoints(&self) -> Endpoints {
        Endpoints {
            ip_url: format!("{}/ip", self.base),
            geo_url: format!("{}/geo", self.base),
            pass_url: format!("{}/iss-pass.json", self.base),
        }
    }

    pub fn last_geo_ip(&self) -> Option<String> {
        self.seen.lock().unwrap().geo_ip.clone()
    }

    pub fn last_pass_query(&self) -> Option<String> {
        self.seen.lock().unwrap().pass_query.clone()
    }
}

async fn ip_handler(State(state): State<Arc<MockState>>) -> Response {
    state.hits.ip.fetch_add(1, Ordering::SeqCst);
    state.ip.respond().await
}

async fn geo_handler(State(state): State<Arc<MockState>>, Path(ip): Path<String>) -> Response {
    state.hits.geo.fetch_add(1, Ordering::SeqCst);
    state.seen.lock().unwrap().geo_ip = Some(ip);
    state.geo.respond().await
}

async fn pass_handler(State(state): State<Arc<MockState>>, RawQuery(query): RawQuery) -> Response {
    state.hits.passes.fetch_add(1, Ordering::SeqCst);
    state.seen.lock().unwrap().pass_query = query;
    state.passes.respond().await
}

/// A URL whose server writes `raw` (headers plus a truncated body), holds the
/// connection open for `stall`, then closes it.
pub(crate) async fn raw_response_url(raw: &'static str, stall: Duration) -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = [0u8; 1024];
        let _ = socket.read(&mut request).await;
        socket.write_all(raw.as_bytes()).await.unwrap();
        socket.flush().await.unwrap();
        tokio::time::sleep(stall).await;
    });
    format!("http://{}/ip", addr)
}

/// A URL on a port nothing is listening on.
pub(crate) async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/ip", addr)
}
