use std::path::Path;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use gift_core::GiftLifecycle;
use tokio::net::{TcpListener, ToSocketAddrs};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::rest;
use crate::GiftAxumState;

/// The wired HTTP surface: routes, middleware, and the lifecycle behind
/// them. Hold onto the router for in-process testing or call
/// [`listen`](GiftApp::listen) to serve it.
#[derive(Clone)]
pub struct GiftApp {
    pub router: Router<()>,
}

impl GiftApp {
    pub fn new(lifecycle: GiftLifecycle) -> Self {
        // Room for a full set of photos at the configured cap, plus slack
        // for the text fields and multipart framing.
        let config = lifecycle.config();
        let body_limit = config.max_photos * config.max_photo_bytes as usize + 1024 * 1024;

        let state = GiftAxumState::new(lifecycle);
        let router = Router::new()
            .route("/gifts", post(rest::create_gift))
            .route("/gifts/{token}", get(rest::fetch_gift))
            .route("/gifts/{token}/view/{section}", post(rest::view_section))
            .route("/health", get(rest::health))
            .layer(DefaultBodyLimit::max(body_limit))
            .layer(
                tower_http::cors::CorsLayer::new()
                    .allow_origin(tower_http::cors::Any)
                    .allow_methods(tower_http::cors::Any)
                    .allow_headers(tower_http::cors::Any),
            )
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .with_state(state);

        Self { router }
    }

    /// Serves stored photo files under `/photos`, for deployments where the
    /// photo store writes to local disk and `public_url` points back here.
    pub fn serve_photos<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.router = self.router.nest_service("/photos", ServeDir::new(dir));
        self
    }

    pub async fn listen<A>(self, addr: A) -> anyhow::Result<()>
    where
        A: ToSocketAddrs,
    {
        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, self.router).await?;
        Ok(())
    }
}
