use serde::{Deserialize, Serialize};

/// Device row returned by the device info service. Upstream column names
/// are PascalCase; columns we do not interpret ride along in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceRecord {
    #[serde(rename = "DeviceName")]
    pub device_name: String,
    #[serde(rename = "StatusMessage", default)]
    pub status_message: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl DeviceRecord {
    pub fn new(device_name: String, status_message: Option<String>) -> Self {
        Self {
            device_name,
            status_message,
            extra: serde_json::Map::new(),
        }
    }
}
