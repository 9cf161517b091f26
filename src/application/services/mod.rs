mod guide_service;

pub use guide_service::{GuideLookupError, GuideLookupService, RegenerationSummary, StoreStatus};
