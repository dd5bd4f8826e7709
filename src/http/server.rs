//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the public router: redirect middleware in front of normal handling
//! - Build the admin router on its own listener
//! - Wire up middleware (tracing, timeout, request ID)
//! - Serve both listeners until shutdown

use axum::{http::uri::Authority, middleware, Router};
use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin::{setup_admin_router, AdminState};
use crate::config::GatewayConfig;
use crate::http::request::{request_span, MakeRequestUuidV4, X_REQUEST_ID};
use crate::http::upstream::{content_handler, ContentState};
use crate::lifecycle::Shutdown;
use crate::redirects::{redirect_middleware, RedirectResolver, RedirectStore};

/// HTTP server for the redirect gateway.
pub struct HttpServer {
    public: Router,
    admin: Option<Router>,
}

impl HttpServer {
    /// Create a new HTTP server over the given store.
    pub fn new(config: GatewayConfig, store: Arc<dyn RedirectStore>) -> Self {
        let resolver = RedirectResolver::new(store.clone(), &config.site.base_url);

        let upstream = config.upstream.as_ref().and_then(|u| {
            u.address
                .parse::<Authority>()
                .map_err(|e| {
                    tracing::warn!(address = %u.address, error = %e, "Ignoring invalid upstream address");
                })
                .ok()
        });

        let public = Self::build_public_router(&config, resolver, ContentState::new(upstream));
        let admin = config.admin.enabled.then(|| {
            let state = AdminState::new(store, &config.admin.api_key);
            Self::build_admin_router(&config, state)
        });

        Self { public, admin }
    }

    /// Public router: every request passes the resolver before normal handling.
    #[allow(deprecated)]
    pub fn build_public_router(
        config: &GatewayConfig,
        resolver: RedirectResolver,
        content: ContentState,
    ) -> Router {
        Router::new()
            .fallback(content_handler)
            .with_state(content)
            .layer(middleware::from_fn_with_state(resolver, redirect_middleware))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TraceLayer::new_for_http().make_span_with(request_span))
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuidV4))
    }

    #[allow(deprecated)]
    pub fn build_admin_router(config: &GatewayConfig, state: AdminState) -> Router {
        setup_admin_router(state, config.import.max_upload_bytes)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.admin_secs)))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TraceLayer::new_for_http().make_span_with(request_span))
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuidV4))
    }

    /// Serve until `shutdown` fires. The admin router only runs when it is
    /// enabled and an admin listener is supplied.
    pub async fn run(
        self,
        listener: TcpListener,
        admin_listener: Option<TcpListener>,
        shutdown: &Shutdown,
    ) -> Result<(), std::io::Error> {
        tracing::info!(address = %listener.local_addr()?, "Public listener starting");

        let public = axum::serve(listener, self.public)
            .with_graceful_shutdown(Shutdown::wait(shutdown.subscribe()))
            .into_future();

        match (self.admin, admin_listener) {
            (Some(admin), Some(admin_listener)) => {
                tracing::info!(address = %admin_listener.local_addr()?, "Admin listener starting");
                let admin = axum::serve(admin_listener, admin)
                    .with_graceful_shutdown(Shutdown::wait(shutdown.subscribe()))
                    .into_future();
                tokio::try_join!(public, admin)?;
            }
            _ => public.await?,
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
