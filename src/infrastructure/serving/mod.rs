mod image_server;

pub use image_server::{ImageFileServer, image_router};
