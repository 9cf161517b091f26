use async_trait::async_trait;
use serde::Deserialize;

use crate::application::ports::{DeviceGateway, DeviceGatewayError};
use crate::domain::DeviceRecord;

/// Device lookup against the warranty service's REST endpoint.
pub struct HttpDeviceGateway {
    client: reqwest::Client,
    base_url: String,
}

/// Wire shape of the upstream response:
/// `{ "status": "success", "data": [ { "DeviceName": ... } ], "message": ... }`.
#[derive(Debug, Deserialize)]
struct DeviceLookupResponse {
    status: String,
    #[serde(default)]
    data: Vec<DeviceRecord>,
    #[serde(default)]
    message: Option<String>,
}

impl HttpDeviceGateway {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl DeviceGateway for HttpDeviceGateway {
    #[tracing::instrument(skip(self))]
    async fn device_for_user(&self, user_id: &str) -> Result<DeviceRecord, DeviceGatewayError> {
        let url = format!("{}/device-info/{}", self.base_url, user_id);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DeviceGatewayError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeviceGatewayError::RequestFailed(format!(
                "HTTP {status}: {body}"
            )));
        }

        let payload: DeviceLookupResponse = response
            .json()
            .await
            .map_err(|e| DeviceGatewayError::InvalidResponse(e.to_string()))?;

        if payload.status != "success" {
            return Err(DeviceGatewayError::Upstream(
                payload.message.unwrap_or(payload.status),
            ));
        }

        payload
            .data
            .into_iter()
            .next()
            .ok_or_else(|| DeviceGatewayError::NotFound(user_id.to_string()))
    }
}
