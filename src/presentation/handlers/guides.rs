use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::application::ports::{DeviceGateway, GuideExtractor, ImageHost, InstructionStore};
use crate::domain::{GuideResult, LookupStatus, Platform};
use crate::presentation::state::AppState;

#[derive(Deserialize)]
pub struct GuideQuery {
    pub device_name: Option<String>,
    pub platform: Option<String>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Looks up a guide by device name or directly by platform tag.
#[tracing::instrument(skip(state, query))]
pub async fn guides_handler<E, S, G, H>(
    State(state): State<AppState<E, S, G, H>>,
    Query(query): Query<GuideQuery>,
) -> impl IntoResponse
where
    E: GuideExtractor + 'static,
    S: InstructionStore + 'static,
    G: DeviceGateway + 'static,
    H: ImageHost + 'static,
{
    tracing::debug!(
        device_name = ?query.device_name,
        platform = ?query.platform,
        "Guide lookup requested"
    );

    let result = match (query.device_name, query.platform) {
        (Some(device_name), _) => state.guide_service.lookup_by_device_name(&device_name).await,
        (None, Some(platform)) => {
            let platform = Platform::from(platform);
            state.guide_service.lookup_platform(&platform, "").await
        }
        (None, None) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "either device_name or platform is required".to_string(),
                }),
            )
                .into_response();
        }
    };

    guide_response(result)
}

/// Maps a lookup outcome onto an HTTP status; the result itself is the
/// body in every case, so callers always get the structured form.
pub fn guide_response(result: GuideResult) -> Response {
    let status = match result.status {
        LookupStatus::Success => StatusCode::OK,
        LookupStatus::NotFound => StatusCode::NOT_FOUND,
        LookupStatus::Error => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(result)).into_response()
}
