//! Route modules and router assembly

pub mod form;
pub mod health;
pub mod ocr;
pub mod respond;
pub mod status;
pub mod tts;

use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::Request,
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::config::HttpConfig;
use crate::state::AppState;

/// Build the full application router
pub fn router(state: AppState, http: &HttpConfig) -> Router {
    let mut app = Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health_check))
        .route("/status", get(status::backend_status))
        .route("/ocr", post(ocr::extract_text))
        .route("/tts", post(tts::text_to_speech));

    if state.language().is_some() {
        app = app.route("/respond", post(respond::generate_response));
    }

    app.layer(DefaultBodyLimit::disable())
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    id = %Uuid::new_v4(),
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(cors_layer(http))
        .with_state(state)
}

/// Open CORS policy. With credentials enabled the request origin, method and
/// headers are mirrored back, since wildcards are not allowed alongside credentials.
fn cors_layer(http: &HttpConfig) -> CorsLayer {
    if http.cors_allow_credentials {
        CorsLayer::new()
            .allow_origin(AllowOrigin::mirror_request())
            .allow_methods(AllowMethods::mirror_request())
            .allow_headers(AllowHeaders::mirror_request())
            .allow_credentials(true)
    } else {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
            .expose_headers([axum::http::header::CONTENT_DISPOSITION])
    }
}
