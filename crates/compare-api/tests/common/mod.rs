//! In-process stub HTTP servers standing in for the compared targets.

#![allow(dead_code)]

use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

/// Canned response served for every request.
#[derive(Debug, Clone)]
pub struct Stub {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
    /// Held before responding
    pub delay: Option<Duration>,
}

impl Stub {
    pub fn json(status: u16, body: serde_json::Value) -> Self {
        Self::text(status, "application/json", &body.to_string())
    }

    pub fn text(status: u16, content_type: &str, body: &str) -> Self {
        Self {
            status,
            headers: vec![("content-type".to_string(), content_type.to_string())],
            body: body.to_string(),
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// Requests currently being handled and the most seen at once.
#[derive(Debug, Default)]
pub struct InFlight {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl InFlight {
    fn enter(&self) {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn leave(&self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A request as the stub received it.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub method: String,
    pub uri: String,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

pub struct StubServer {
    pub base_url: String,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
    in_flight: Arc<InFlight>,
}

impl StubServer {
    pub fn requests(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }

    /// Most requests this stub was handling at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.in_flight.peak.load(Ordering::SeqCst)
    }
}

async fn handle(
    req: Request<Incoming>,
    stub: Arc<Stub>,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
    in_flight: Arc<InFlight>,
) -> Result<Response<Full<Bytes>>, hyper::Error> {
    in_flight.enter();
    if let Some(delay) = stub.delay {
        tokio::time::sleep(delay).await;
    }
    in_flight.leave();

    let (parts, body) = req.into_parts();
    let body = body.collect().await?.to_bytes();
    seen.lock().unwrap().push(SeenRequest {
        method: parts.method.to_string(),
        uri: parts.uri.to_string(),
        headers: parts
            .headers
            .iter()
            .map(|(k, v)| {
                (
                    k.as_str().to_string(),
                    v.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect(),
        body: String::from_utf8_lossy(&body).into_owned(),
    });

    let mut response = Response::builder().status(stub.status);
    for (name, value) in &stub.headers {
        response = response.header(name.as_str(), value.as_str());
    }
    Ok(response
        .body(Full::new(Bytes::from(stub.body.clone())))
        .unwrap())
}

/// Serve `stub` on an ephemeral local port until the runtime shuts down.
pub async fn spawn_stub(stub: Stub) -> StubServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let in_flight = Arc::new(InFlight::default());
    let stub = Arc::new(stub);

    let recorded = Arc::clone(&seen);
    let tracked = Arc::clone(&in_flight);
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let io = TokioIo::new(stream);
            let stub = Arc::clone(&stub);
            let seen = Arc::clone(&recorded);
            let in_flight = Arc::clone(&tracked);
            tokio::spawn(async move {
                let service = service_fn(move |req| {
                    handle(
                        req,
                        Arc::clone(&stub),
                        Arc::clone(&seen),
                        Arc::clone(&in_flight),
                    )
                });
                let _ = http1::Builder::new().serve_connection(io, service).await;
            });
        }
    });

    StubServer {
        base_url: format!("http://{addr}"),
        seen,
        in_flight,
    }
}

/// A base URL nothing listens on.
pub fn unreachable_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
