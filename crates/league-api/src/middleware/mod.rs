//! Middleware stack for the API server
//!
//! Request ids, tracing, timeouts, CORS and optional rate limiting.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, HeaderValue, Method, Request, StatusCode},
    Router,
};
use league_common::AppConfig;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::GlobalKeyExtractor, GovernorLayer,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{warn, Level};

use crate::state::AppState;

/// Header name for request ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Apply the middleware stack configured by `config`
///
/// Outermost first: rate limit, request id, trace, timeout, CORS.
pub fn apply_middleware(router: Router<AppState>, config: &AppConfig) -> Router<AppState> {
    let request_id = header::HeaderName::from_static(REQUEST_ID_HEADER);

    let router = router
        .layer(create_cors_layer(
            &config.cors.allowed_origins,
            config.app.env.is_production(),
        ))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::SERVICE_UNAVAILABLE,
            Duration::from_secs(config.api.request_timeout_secs),
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = request
                        .headers()
                        .get(REQUEST_ID_HEADER)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("unknown");

                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %request_id,
                    )
                })
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid));

    if !config.rate_limit.enabled {
        return router;
    }

    // Global bucket; a per-IP key would need connect info on the listener
    let governor = GovernorConfigBuilder::default()
        .per_second(config.rate_limit.requests_per_second.into())
        .burst_size(config.rate_limit.burst)
        .key_extractor(GlobalKeyExtractor)
        .finish();

    match governor {
        Some(governor) => router.layer(GovernorLayer {
            config: Arc::new(governor),
        }),
        None => {
            warn!(
                requests_per_second = config.rate_limit.requests_per_second,
                burst = config.rate_limit.burst,
                "Invalid rate limit settings; rate limiting disabled"
            );
            router
        }
    }
}

/// CORS: configured origins, or any origin outside production when none
/// are configured
fn create_cors_layer(allowed_origins: &[String], is_production: bool) -> CorsLayer {
    let base_layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::HeaderName::from_static(REQUEST_ID_HEADER),
        ])
        .expose_headers([header::HeaderName::from_static(REQUEST_ID_HEADER)]);

    if allowed_origins.is_empty() {
        if is_production {
            warn!("CORS: no allowed origins configured in production; cross-origin requests will be blocked");
            return base_layer.allow_origin(AllowOrigin::list(Vec::<HeaderValue>::new()));
        }
        warn!("CORS: allowing any origin (development mode)");
        return base_layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                warn!(origin = %origin, "Invalid CORS origin");
                None
            })
        })
        .collect();

    tracing::info!("CORS: allowing {} configured origins", origins.len());
    base_layer.allow_origin(AllowOrigin::list(origins))
}
