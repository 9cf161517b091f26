use serde::{Deserialize, Serialize};

use super::platform::Platform;

/// Separator used when joining step texts into one guide string.
pub const GUIDE_SEPARATOR: &str = " → ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupStatus {
    Success,
    NotFound,
    Error,
}

/// Screenshot attached to a step, addressed through the image host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepImage {
    pub step_number: u32,
    pub url: String,
    pub filename: String,
    pub mime_type: String,
    pub size_kb: u64,
}

/// Outcome of one guide lookup. Recomputed per request, never persisted.
/// `message` carries the device status on per-user lookups and the failure
/// detail on `not_found`/`error` outcomes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuideResult {
    pub status: LookupStatus,
    pub device_name: String,
    pub guide: String,
    pub images: Vec<StepImage>,
    pub folder_type: Platform,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl GuideResult {
    pub fn success(
        device_name: String,
        guide: String,
        images: Vec<StepImage>,
        folder_type: Platform,
    ) -> Self {
        Self {
            status: LookupStatus::Success,
            device_name,
            guide,
            images,
            folder_type,
            message: None,
        }
    }

    pub fn not_found(device_name: String, folder_type: Platform, message: String) -> Self {
        Self {
            status: LookupStatus::NotFound,
            device_name,
            guide: String::new(),
            images: Vec::new(),
            folder_type,
            message: Some(message),
        }
    }

    pub fn error(device_name: String, folder_type: Platform, message: String) -> Self {
        Self {
            status: LookupStatus::Error,
            device_name,
            guide: String::new(),
            images: Vec::new(),
            folder_type,
            message: Some(message),
        }
    }
}
