//! HTTP server component.
//!
//! # Responsibilities
//! - Bind the configured address when the service runs
//! - Serve `GET /health` through the tower-http trace and timeout layers
//! - Drain in-flight requests on cancellation or `stop`
//!
//! # Design Decisions
//! - The listener is bound inside `run`, so a bind failure is a run error
//! - `Server::address` reports the bound address once listening, which
//!   makes port 0 usable in tests

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::Level;

use crate::component::{Component, Dependency, Initializer, Server};
use crate::components::{LoggerSlot, LOGGER};
use crate::config::ServerConfig;
use crate::error::ComponentError;
use crate::lifecycle::Context;

const NAME: &str = "http";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Serving(SocketAddr),
    Stopped,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    service: String,
}

/// Axum server exposing a health endpoint.
pub struct HttpServer {
    lifecycle: Arc<ServerLifecycle>,
}

struct ServerLifecycle {
    service: String,
    bind_address: String,
    request_timeout: Duration,
    logger: LoggerSlot,
    phase: watch::Sender<Phase>,
    shutdown: CancellationToken,
}

impl HttpServer {
    pub fn new(service: impl Into<String>, config: &ServerConfig) -> Self {
        let (phase, _) = watch::channel(Phase::Idle);
        Self {
            lifecycle: Arc::new(ServerLifecycle {
                service: service.into(),
                bind_address: config.bind_address.clone(),
                request_timeout: Duration::from_secs(config.request_timeout_secs),
                logger: LoggerSlot::default(),
                phase,
                shutdown: CancellationToken::new(),
            }),
        }
    }

    /// The bound address, once the server is listening.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        match *self.lifecycle.phase.borrow() {
            Phase::Serving(addr) => Some(addr),
            _ => None,
        }
    }

    /// Wait until the server is listening. `None` if it stopped first.
    pub async fn ready(&self) -> Option<SocketAddr> {
        let mut phase = self.lifecycle.phase.subscribe();
        let phase = phase
            .wait_for(|phase| *phase != Phase::Idle)
            .await
            .ok()?;
        match *phase {
            Phase::Serving(addr) => Some(addr),
            _ => None,
        }
    }
}

impl Server for HttpServer {
    fn address(&self) -> String {
        self.local_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|| self.lifecycle.bind_address.clone())
    }
}

impl Component for HttpServer {
    fn initializer(&self) -> Option<Arc<dyn Initializer>> {
        Some(self.lifecycle.clone())
    }

    fn dependency(self: Arc<Self>) -> Dependency {
        Dependency::Server(self)
    }
}

impl ServerLifecycle {
    #[allow(deprecated)]
    fn build_router(&self) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .with_state(self.service.clone())
            .layer(TimeoutLayer::new(self.request_timeout))
            .layer(TraceLayer::new_for_http())
    }
}

#[async_trait]
impl Initializer for ServerLifecycle {
    fn dependencies(&self) -> Vec<String> {
        vec![LOGGER.to_string()]
    }

    fn add_dependency(&self, dependency: Dependency) -> Result<(), ComponentError> {
        self.logger.inject(dependency)
    }

    fn can_run(&self) -> bool {
        true
    }

    async fn run(&self, ctx: Context) -> Result<(), ComponentError> {
        let listener = TcpListener::bind(&self.bind_address).await?;
        let addr = listener.local_addr()?;
        self.phase.send_replace(Phase::Serving(addr));
        self.logger
            .log(Level::INFO, NAME, &format!("HTTP server listening on {addr}"));

        let shutdown = self.shutdown.clone();
        let result = axum::serve(listener, self.build_router())
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = ctx.cancelled() => {}
                    _ = shutdown.cancelled() => {}
                }
            })
            .await;

        self.phase.send_replace(Phase::Stopped);
        self.logger.log(Level::INFO, NAME, "HTTP server stopped");
        result.map_err(ComponentError::from)
    }

    fn can_stop(&self) -> bool {
        true
    }

    async fn stop(&self, _ctx: Context) -> Result<(), ComponentError> {
        self.shutdown.cancel();

        // Wait for in-flight requests to drain if the server is up.
        let mut phase = self.phase.subscribe();
        let _ = phase
            .wait_for(|phase| !matches!(phase, Phase::Serving(_)))
            .await;
        Ok(())
    }
}

async fn health_handler(State(service): State<String>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service,
    })
}
