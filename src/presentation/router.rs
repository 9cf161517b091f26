use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::application::ports::{DeviceGateway, GuideExtractor, ImageHost, InstructionStore};
use crate::infrastructure::observability::request_id_middleware;
use crate::presentation::handlers::{
    guides_handler, health_handler, regenerate_handler, store_status_handler, user_guide_handler,
};
use crate::presentation::state::AppState;

pub fn create_router<E, S, G, H>(state: AppState<E, S, G, H>) -> Router
where
    E: GuideExtractor + 'static,
    S: InstructionStore + 'static,
    G: DeviceGateway + 'static,
    H: ImageHost + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/v1/guides", get(guides_handler::<E, S, G, H>))
        .route(
            "/api/v1/users/{user_id}/guide",
            get(user_guide_handler::<E, S, G, H>),
        )
        .route(
            "/api/v1/guides/{platform}/regenerate",
            post(regenerate_handler::<E, S, G, H>),
        )
        .route(
            "/api/v1/guides/{platform}/status",
            get(store_status_handler::<E, S, G, H>),
        )
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}
