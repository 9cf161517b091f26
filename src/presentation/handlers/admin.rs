use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;

use crate::application::ports::{
    DeviceGateway, GuideExtractor, GuideExtractorError, ImageHost, InstructionStore,
    StoreReadiness,
};
use crate::application::services::GuideLookupError;
use crate::domain::Platform;
use crate::presentation::state::AppState;

use super::guides::ErrorResponse;

#[derive(Serialize)]
pub struct StoreStatusResponse {
    pub platform: Platform,
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_count: Option<usize>,
}

/// Forces a fresh extraction for one platform.
#[tracing::instrument(skip(state))]
pub async fn regenerate_handler<E, S, G, H>(
    State(state): State<AppState<E, S, G, H>>,
    Path(platform): Path<String>,
) -> impl IntoResponse
where
    E: GuideExtractor + 'static,
    S: InstructionStore + 'static,
    G: DeviceGateway + 'static,
    H: ImageHost + 'static,
{
    let platform = Platform::from(platform);

    match state.guide_service.regenerate(&platform).await {
        Ok(summary) => {
            tracing::info!(platform = %platform, steps = summary.step_count, "Regeneration complete");
            (StatusCode::OK, Json(summary)).into_response()
        }
        Err(GuideLookupError::Extraction(e @ GuideExtractorError::SourceMissing(_))) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(platform = %platform, error = %e, "Regeneration failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// Reports whether a platform's store would be served as-is or rebuilt.
#[tracing::instrument(skip(state))]
pub async fn store_status_handler<E, S, G, H>(
    State(state): State<AppState<E, S, G, H>>,
    Path(platform): Path<String>,
) -> impl IntoResponse
where
    E: GuideExtractor + 'static,
    S: InstructionStore + 'static,
    G: DeviceGateway + 'static,
    H: ImageHost + 'static,
{
    let platform = Platform::from(platform);
    let status = state.guide_service.store_status(&platform).await;

    let (state_label, reason) = match status.readiness {
        StoreReadiness::Ready => ("ready", None),
        StoreReadiness::Unloaded(reason) => ("unloaded", Some(reason.to_string())),
    };

    (
        StatusCode::OK,
        Json(StoreStatusResponse {
            platform,
            state: state_label.to_string(),
            reason,
            step_count: status.step_count,
        }),
    )
        .into_response()
}
