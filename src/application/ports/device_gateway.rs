use async_trait::async_trait;

use crate::domain::DeviceRecord;

#[async_trait]
pub trait DeviceGateway: Send + Sync {
    /// Looks up the device registered for a user. The first record wins
    /// when the upstream service returns several.
    async fn device_for_user(&self, user_id: &str) -> Result<DeviceRecord, DeviceGatewayError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DeviceGatewayError {
    #[error("device lookup request failed: {0}")]
    RequestFailed(String),
    /// Upstream reported a non-success status; the message is passed
    /// through verbatim.
    #[error("{0}")]
    Upstream(String),
    #[error("no device on record for user {0}")]
    NotFound(String),
    #[error("invalid device lookup response: {0}")]
    InvalidResponse(String),
}
