use std::collections::HashMap;

use async_trait::async_trait;

use crate::application::ports::{DeviceGateway, DeviceGatewayError};
use crate::domain::DeviceRecord;

/// In-memory gateway for tests and local runs without the warranty service.
#[derive(Default)]
pub struct MockDeviceGateway {
    devices: HashMap<String, DeviceRecord>,
}

impl MockDeviceGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_device(mut self, user_id: &str, record: DeviceRecord) -> Self {
        self.devices.insert(user_id.to_string(), record);
        self
    }
}

#[async_trait]
impl DeviceGateway for MockDeviceGateway {
    async fn device_for_user(&self, user_id: &str) -> Result<DeviceRecord, DeviceGatewayError> {
        self.devices
            .get(user_id)
            .cloned()
            .ok_or_else(|| DeviceGatewayError::NotFound(user_id.to_string()))
    }
}
