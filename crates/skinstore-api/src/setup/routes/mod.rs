//! Route configuration and setup.
//!
//! File routes live under the configured storage URL segment so that the URLs
//! returned by uploads are the URLs that serve the files. Health checks are in
//! [health](health).

mod health;

use crate::api_doc;
use crate::handlers::files;
use crate::middleware::{get_request_id, request_id_middleware};
use crate::state::AppState;
use anyhow::Context;
use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::{HeaderName, HeaderValue, Method, Request},
    response::Redirect,
    routing::get,
    Json, Router,
};
use skinstore_core::Config;
use std::sync::Arc;
use std::time::Duration;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Room for multipart boundaries and part headers on top of the file size limit.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

static X_SERVER: HeaderName = HeaderName::from_static("x-server");
const SERVER_NAME: &str = concat!("skinstore/", env!("CARGO_PKG_VERSION"));

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    let files_path = format!("/{}", config.storage_url_segment());
    let file_path = format!("{}/{{identifier}}", files_path);

    let openapi = api_doc::get_openapi_spec(config.storage_url_segment());

    let trace_layer = TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
        tracing::info_span!(
            "http_request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = get_request_id(request).unwrap_or("-"),
        )
    });

    let http_concurrency_limit = config.http_concurrency_limit();
    tracing::info!(
        http_concurrency_limit = http_concurrency_limit,
        "HTTP concurrency limit layer enabled"
    );

    let request_timeout_secs = config.request_timeout_secs();
    tracing::info!(request_timeout_secs, "Request timeout layer enabled");

    let app = Router::new()
        .route("/", get(|| async { Redirect::temporary("/docs") }))
        .route("/health", get(health::health_check))
        .route(
            "/openapi.json",
            get(move || {
                let openapi = openapi.clone();
                async move { Json(openapi) }
            }),
        )
        .route(&files_path, get(files::list_files).post(files::upload_file))
        .route(
            &file_path,
            get(files::get_file)
                .put(files::update_file)
                .delete(files::delete_file),
        )
        .merge(utoipa_rapidoc::RapiDoc::new("/openapi.json").path("/docs"))
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(TimeoutLayer::new(Duration::from_secs(request_timeout_secs)))
        .layer(RequestBodyLimitLayer::new(
            config.max_file_size_bytes() + MULTIPART_OVERHEAD_BYTES,
        ))
        .layer(DefaultBodyLimit::disable())
        .layer(SetResponseHeaderLayer::if_not_present(
            X_SERVER.clone(),
            HeaderValue::from_static(SERVER_NAME),
        ))
        .layer(cors)
        .layer(trace_layer)
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state);

    Ok(app)
}

/// Without `CORS_ORIGINS` the request origin is mirrored; credentials are allowed either way.
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
        .expose_headers([X_SERVER.clone()]);

    let cors = match config.cors_origins() {
        Some(origins) => {
            let origins = origins
                .iter()
                .map(|o| {
                    o.parse::<HeaderValue>()
                        .with_context(|| format!("Invalid CORS origin: {}", o))
                })
                .collect::<Result<Vec<_>, _>>()?;
            cors.allow_origin(origins)
        }
        None => {
            if config.is_production() {
                tracing::warn!(
                    "CORS mirrors every request origin with credentials - set CORS_ORIGINS in production"
                );
            }
            cors.allow_origin(AllowOrigin::mirror_request())
        }
    };

    Ok(cors)
}
