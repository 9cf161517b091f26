use axum::extract::{Path, State};
use axum::response::IntoResponse;

use crate::application::ports::{DeviceGateway, GuideExtractor, ImageHost, InstructionStore};
use crate::presentation::state::AppState;

use super::guides::guide_response;

/// Resolves the user's registered device through the device info service,
/// then returns that device's guide.
#[tracing::instrument(skip(state))]
pub async fn user_guide_handler<E, S, G, H>(
    State(state): State<AppState<E, S, G, H>>,
    Path(user_id): Path<String>,
) -> impl IntoResponse
where
    E: GuideExtractor + 'static,
    S: InstructionStore + 'static,
    G: DeviceGateway + 'static,
    H: ImageHost + 'static,
{
    let result = state.guide_service.lookup_for_user(&user_id).await;
    guide_response(result)
}
