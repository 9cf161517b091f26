mod device;
mod extracted_image;
mod guide;
mod platform;
mod step;

pub use device::DeviceRecord;
pub use extracted_image::{ExtractedImage, mime_type_for_path};
pub use guide::{GUIDE_SEPARATOR, GuideResult, LookupStatus, StepImage};
pub use platform::Platform;
pub use step::InstructionStep;
