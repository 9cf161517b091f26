use std::sync::Arc;

use crate::application::ports::{DeviceGateway, GuideExtractor, ImageHost, InstructionStore};
use crate::application::services::GuideLookupService;

pub struct AppState<E, S, G, H>
where
    E: GuideExtractor,
    S: InstructionStore,
    G: DeviceGateway,
    H: ImageHost,
{
    pub guide_service: Arc<GuideLookupService<E, S, G, H>>,
}

impl<E, S, G, H> Clone for AppState<E, S, G, H>
where
    E: GuideExtractor,
    S: InstructionStore,
    G: DeviceGateway,
    H: ImageHost,
{
    fn clone(&self) -> Self {
        Self {
            guide_service: Arc::clone(&self.guide_service),
        }
    }
}
