mod http_device_gateway;
mod mock_device_gateway;

pub use http_device_gateway::HttpDeviceGateway;
pub use mock_device_gateway::MockDeviceGateway;
