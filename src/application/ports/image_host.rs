use async_trait::async_trait;

#[async_trait]
pub trait ImageHost: Send + Sync {
    /// Starts the host on first call and returns the bound port. Later
    /// calls return the same port without side effects.
    async fn ensure_started(&self) -> Result<u16, ImageHostError>;

    /// Public URL for a content-root-relative image path.
    async fn url_for(&self, relative_path: &str) -> Result<String, ImageHostError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ImageHostError {
    #[error("no free port in {0}..={1}")]
    NoFreePort(u16, u16),
    #[error("image host failed to start: {0}")]
    StartFailed(String),
}
