//! HTTP server: accept loop, per-request span, request-id propagation.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use http::header::HeaderValue;
use http::{Request, Response};
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{debug, error, info, Instrument};
use uuid::Uuid;

use walhall_api::Transport;

use crate::api::Gateway;
use crate::config::AdaptorConfig;
use crate::error::{AdaptorError, AdaptorResult};
use crate::health::HealthChecker;

/// The adaptor HTTP server.
pub struct AdaptorServer<T> {
    config: Arc<AdaptorConfig>,
    gateway: Arc<Gateway<T>>,
    health: Arc<HealthChecker>,
}

impl<T> AdaptorServer<T>
where
    T: Transport + Clone + Send + Sync + 'static,
{
    /// Create a server over a shared transport.
    pub fn new(config: AdaptorConfig, transport: T) -> Self {
        let config = Arc::new(config);
        let health = Arc::new(HealthChecker::new());
        let gateway = Arc::new(Gateway::new(config.clone(), transport, health.clone()));

        Self {
            config,
            gateway,
            health,
        }
    }

    /// Bind and serve until the process is stopped.
    pub async fn run(self) -> AdaptorResult<()> {
        let addr = SocketAddr::new(
            self.config
                .server
                .listen_addr
                .parse()
                .map_err(|e| AdaptorError::config(format!("invalid listen address: {e}")))?,
            self.config.server.listen_port,
        );

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| AdaptorError::server(format!("failed to bind: {e}")))?;

        info!("walhall adaptor listening on {}", addr);
        info!("upstream: {}", self.config.upstream.api_prefix);

        self.health.set_ready(true);

        loop {
            let (stream, peer_addr) = match listener.accept().await {
                Ok(conn) => conn,
                Err(e) => {
                    error!("failed to accept connection: {}", e);
                    continue;
                }
            };

            let gateway = self.gateway.clone();

            tokio::spawn(async move {
                let io = TokioIo::new(stream);

                let service = service_fn(move |req| {
                    let gateway = gateway.clone();
                    async move { handle_request(req, gateway, peer_addr).await }
                });

                if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                    debug!("connection error: {}", e);
                }
            });
        }
    }
}

/// Handle one inbound request.
async fn handle_request<T>(
    req: Request<Incoming>,
    gateway: Arc<Gateway<T>>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    T: Transport + Clone + Send + Sync + 'static,
{
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        path = %path,
        peer = %peer_addr,
    );

    async move {
        let mut response = gateway
            .dispatch(&method, &path, req.headers(), &request_id)
            .await;

        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response.headers_mut().insert("x-request-id", value);
        }

        info!(
            status = %response.status(),
            duration_ms = %start.elapsed().as_millis(),
            "request completed"
        );

        Ok(response)
    }
    .instrument(span)
    .await
}
