use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use guidepost::application::services::GuideLookupService;
use guidepost::infrastructure::extraction::CompositeGuideExtractor;
use guidepost::infrastructure::gateway::HttpDeviceGateway;
use guidepost::infrastructure::observability::{TracingConfig, init_tracing};
use guidepost::infrastructure::persistence::JsonInstructionStore;
use guidepost::infrastructure::serving::ImageFileServer;
use guidepost::presentation::{AppState, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env();

    init_tracing(TracingConfig::default(), settings.server.port);

    let store = Arc::new(JsonInstructionStore::new(settings.content.root.clone())?);
    let extractor = Arc::new(CompositeGuideExtractor::new(
        settings.content.root.clone(),
        settings.catalog.ios_image_count,
        settings.catalog.android_image_count,
    ));
    let device_gateway = Arc::new(HttpDeviceGateway::new(&settings.device_api.base_url));
    let image_host = Arc::new(ImageFileServer::new(
        settings.content.root.clone(),
        settings.image_host.port_start..=settings.image_host.port_end,
    ));

    let guide_service = Arc::new(GuideLookupService::new(
        extractor,
        store,
        device_gateway,
        image_host,
    ));

    let state = AppState { guide_service };
    let router = create_router(state);

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
