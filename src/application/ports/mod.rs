mod device_gateway;
mod guide_extractor;
mod image_host;
mod instruction_store;

pub use device_gateway::{DeviceGateway, DeviceGatewayError};
pub use guide_extractor::{ExtractionOutcome, GuideExtractor, GuideExtractorError};
pub use image_host::{ImageHost, ImageHostError};
pub use instruction_store::{
    InstructionStore, InstructionStoreError, StoreReadiness, UnloadedReason,
};
