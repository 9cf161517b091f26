use std::fmt;

use serde::{Deserialize, Serialize};

const IOS_NAME_TOKENS: [&str; 3] = ["iphone", "ios", "ipad"];

/// Platform tag routing a device to its instruction set. `Custom` carries
/// the label of an extra guide document (e.g. a campaign-specific help file).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Platform {
    Ios,
    Android,
    Custom(String),
}

impl Platform {
    /// Classifies a device name. Anything that is not recognizably Apple
    /// hardware falls back to Android, including an empty name.
    pub fn from_device_name(device_name: &str) -> Self {
        let lowered = device_name.to_lowercase();
        if IOS_NAME_TOKENS.iter().any(|t| lowered.contains(t)) {
            Platform::Ios
        } else {
            Platform::Android
        }
    }

    /// Classifies a model code from the device catalog. Codes are terser
    /// than marketing names ("iPhone11,8"), so this matches on the prefix
    /// rather than anywhere in the string.
    pub fn from_model_code(code: &str) -> Self {
        let lowered = code.trim().to_lowercase();
        if IOS_NAME_TOKENS.iter().any(|t| lowered.starts_with(t)) {
            Platform::Ios
        } else {
            Platform::Android
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Platform::Ios => "IOS",
            Platform::Android => "Android",
            Platform::Custom(label) => label,
        }
    }

    /// Directory holding the platform's extracted screenshots.
    pub fn image_dir_name(&self) -> String {
        format!("{}_Instruction", self.as_str())
    }

    /// File name of the platform's persisted instruction list.
    pub fn store_file_name(&self) -> String {
        format!("{}_instructions.json", self.as_str().to_lowercase())
    }

    /// Source document name the platform's guide is extracted from.
    pub fn source_document_name(&self) -> String {
        format!("{}.docx", self.as_str())
    }
}

impl From<String> for Platform {
    fn from(value: String) -> Self {
        if value.eq_ignore_ascii_case("ios") {
            Platform::Ios
        } else if value.eq_ignore_ascii_case("android") {
            Platform::Android
        } else {
            Platform::Custom(value)
        }
    }
}

impl From<Platform> for String {
    fn from(value: Platform) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
