use std::path::PathBuf;

/// Runtime settings, read from the environment at startup.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub server: ServerSettings,
    pub content: ContentSettings,
    pub image_host: ImageHostSettings,
    pub device_api: DeviceApiSettings,
    pub catalog: CatalogSettings,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: std::env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
        }
    }
}

/// Where source documents, instruction stores and image folders live.
#[derive(Debug, Clone)]
pub struct ContentSettings {
    pub root: PathBuf,
}

impl Default for ContentSettings {
    fn default() -> Self {
        Self {
            root: std::env::var("CONTENT_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("content")),
        }
    }
}

/// Port range probed by the lazy image file server.
#[derive(Debug, Clone)]
pub struct ImageHostSettings {
    pub port_start: u16,
    pub port_end: u16,
}

impl Default for ImageHostSettings {
    fn default() -> Self {
        Self {
            port_start: std::env::var("IMAGE_PORT_START")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8001),
            port_end: std::env::var("IMAGE_PORT_END")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8010),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DeviceApiSettings {
    pub base_url: String,
}

impl Default for DeviceApiSettings {
    fn default() -> Self {
        Self {
            base_url: std::env::var("DEVICE_API_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:5000/api".to_string()),
        }
    }
}

/// Positional image split for the PDF model catalog. These track the
/// catalog document, not the code, so they are configuration.
#[derive(Debug, Clone)]
pub struct CatalogSettings {
    pub ios_image_count: usize,
    pub android_image_count: usize,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            ios_image_count: std::env::var("CATALOG_IOS_IMAGE_COUNT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            android_image_count: std::env::var("CATALOG_ANDROID_IMAGE_COUNT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3),
        }
    }
}
