mod settings;

pub use settings::{
    CatalogSettings, ContentSettings, DeviceApiSettings, ImageHostSettings, ServerSettings,
    Settings,
};
