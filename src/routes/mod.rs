use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::{Config, GeminiClient, SensorStore};

mod ask;
mod health;
mod sample_data;

// ---

pub fn router(store: SensorStore, gemini: GeminiClient, config: Config) -> Router {
    // ---
    Router::new()
        .merge(ask::router())
        .merge(health::router())
        .merge(sample_data::router())
        .layer(cors_layer())
        .with_state((store, gemini, config))
}

/// Browser allowlist: the Next.js dev server and the production dashboard.
fn cors_layer() -> CorsLayer {
    // ---
    CorsLayer::new()
        .allow_origin(AllowOrigin::list([
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("https://agri-edge.vercel.app"),
        ]))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}
