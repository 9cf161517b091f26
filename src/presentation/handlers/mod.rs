mod admin;
mod guides;
mod health;
mod users;

pub use admin::{regenerate_handler, store_status_handler};
pub use guides::guides_handler;
pub use health::health_handler;
pub use users::user_guide_handler;
