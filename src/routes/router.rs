use crate::core::error::{self, Error};
use crate::core::state::AppState;
use crate::routes::auth;
use crate::types::response;
use crate::types::user::Caller;
use crate::utils;
use axum::error_handling::HandleErrorLayer;
use axum::{
    Json, Router,
    extract::{Extension, MatchedPath, Request},
    http::Method,
    middleware,
    routing::{get, post},
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::info_span;

pub(crate) fn routes(state: AppState, rate_limit: u64) -> Router {
    // /api/auth/... behind the bearer token; `layer` also covers unmatched methods
    let protected_routes = Router::new().route(
        "/me",
        get(auth::me).layer(middleware::from_fn(utils::auth::require_auth)),
    );

    // /api/auth/...
    let auth_router = Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/test", get(auth::test))
        .merge(protected_routes);

    Router::new()
        .route("/api/health", get(health))
        .nest("/api/auth", auth_router)
        .fallback(fallback)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            utils::auth::authenticate,
        ))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                        let matched_path = request
                            .extensions()
                            .get::<MatchedPath>()
                            .map(MatchedPath::as_str);

                        info_span!(
                            "request",
                            method = ?request.method(),
                            matched_path,
                        )
                    }),
                )
                .layer(HandleErrorLayer::new(error::handle_middleware_errors))
                .buffer(128)
                .rate_limit(rate_limit, Duration::from_secs(1))
                .layer(
                    CorsLayer::new()
                        .allow_methods([
                            Method::GET,
                            Method::POST,
                            Method::PUT,
                            Method::DELETE,
                            Method::OPTIONS,
                        ])
                        .allow_origin(AllowOrigin::mirror_request())
                        .allow_headers(AllowHeaders::mirror_request())
                        .allow_credentials(true)
                        .max_age(Duration::from_secs(3600)),
                ),
        )
}

async fn health() -> Json<response::Health> {
    Json(response::Health { status: "UP" })
}

/// Routes that are not explicitly public require a principal.
async fn fallback(Extension(caller): Extension<Caller>) -> Error {
    match caller {
        Caller::Authenticated(_) => Error::NotFound,
        Caller::Anonymous(rejection) => Error::from(rejection),
    }
}
