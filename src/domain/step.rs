use serde::{Deserialize, Serialize};

use super::platform::Platform;

/// One entry of a platform's instruction list. `image_path` is relative to
/// the content root; a dangling reference degrades to a textual step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstructionStep {
    pub step_number: u32,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
    pub folder_type: Platform,
}

impl InstructionStep {
    pub fn new(
        step_number: u32,
        text: String,
        image_path: Option<String>,
        folder_type: Platform,
    ) -> Self {
        Self {
            step_number,
            text,
            image_path,
            folder_type,
        }
    }
}
