//! ServerBuilder for assembling and serving the HTTP application

use super::entity_registry::{EntityDescriptor, EntityRegistry};
use anyhow::Result;
use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Builder for the catalog's HTTP server
///
/// # Example
///
/// ```ignore
/// ServerBuilder::new("game-catalog")
///     .register(Box::new(GameDescriptor::new(boundary, games, lifecycle)))
///     .serve(config.server.addr()?)
///     .await?;
/// ```
pub struct ServerBuilder {
    service: String,
    entity_registry: EntityRegistry,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            entity_registry: EntityRegistry::new(),
            custom_routes: Vec::new(),
        }
    }

    pub fn register(mut self, descriptor: Box<dyn EntityDescriptor>) -> Self {
        self.entity_registry.register(descriptor);
        self
    }

    /// Replace the registry wholesale
    pub fn with_registry(mut self, registry: EntityRegistry) -> Self {
        self.entity_registry = registry;
        self
    }

    /// Add routes that don't fit the entity pattern
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Build the final router: health check, entity routes, custom routes
    pub fn build(self) -> Router {
        let mut app = health_routes(self.service).merge(self.entity_registry.build_routes());
        for custom in self.custom_routes {
            app = app.merge(custom);
        }
        app.layer(TraceLayer::new_for_http())
    }

    /// Serve the application with graceful shutdown
    ///
    /// Stops accepting connections on SIGTERM or Ctrl+C and waits for
    /// in-flight requests to finish.
    pub async fn serve(self, addr: SocketAddr) -> Result<()> {
        let app = self.build();
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

fn health_routes(service: String) -> Router {
    Router::new().route(
        "/health",
        get(move || {
            let service = service.clone();
            async move { Json(health_body(&service)) }
        }),
    )
}

fn health_body(service: &str) -> Value {
    json!({
        "status": "ok",
        "service": service
    })
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
