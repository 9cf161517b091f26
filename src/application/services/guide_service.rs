use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::application::ports::{
    DeviceGateway, DeviceGatewayError, GuideExtractor, GuideExtractorError, ImageHost,
    InstructionStore, InstructionStoreError, StoreReadiness,
};
use crate::domain::{
    GUIDE_SEPARATOR, GuideResult, InstructionStep, LookupStatus, Platform, StepImage,
    mime_type_for_path,
};

/// Facade tying device classification, store regeneration and image URL
/// assembly together. Every public operation returns a well-formed result;
/// faults degrade to `not_found`/`error` outcomes instead of surfacing.
pub struct GuideLookupService<E, S, G, H>
where
    E: GuideExtractor,
    S: InstructionStore,
    G: DeviceGateway,
    H: ImageHost,
{
    extractor: Arc<E>,
    store: Arc<S>,
    device_gateway: Arc<G>,
    image_host: Arc<H>,
    regeneration_locks: Mutex<HashMap<Platform, Arc<Mutex<()>>>>,
}

impl<E, S, G, H> GuideLookupService<E, S, G, H>
where
    E: GuideExtractor,
    S: InstructionStore,
    G: DeviceGateway,
    H: ImageHost,
{
    pub fn new(
        extractor: Arc<E>,
        store: Arc<S>,
        device_gateway: Arc<G>,
        image_host: Arc<H>,
    ) -> Self {
        Self {
            extractor,
            store,
            device_gateway,
            image_host,
            regeneration_locks: Mutex::new(HashMap::new()),
        }
    }

    pub async fn lookup_by_device_name(&self, device_name: &str) -> GuideResult {
        let platform = Platform::from_device_name(device_name);
        self.lookup_platform(&platform, device_name).await
    }

    pub async fn lookup_platform(&self, platform: &Platform, device_name: &str) -> GuideResult {
        match self.load_fresh(platform).await {
            Ok(steps) if steps.is_empty() => GuideResult::not_found(
                device_name.to_string(),
                platform.clone(),
                format!("no guide found for platform {platform}"),
            ),
            Ok(steps) => {
                let guide = steps
                    .iter()
                    .map(|step| step.text.as_str())
                    .collect::<Vec<_>>()
                    .join(GUIDE_SEPARATOR);
                let images = self.assemble_images(&steps).await;
                GuideResult::success(device_name.to_string(), guide, images, platform.clone())
            }
            Err(GuideLookupError::Extraction(e @ GuideExtractorError::SourceMissing(_))) => {
                GuideResult::not_found(device_name.to_string(), platform.clone(), e.to_string())
            }
            Err(e) => {
                tracing::error!(platform = %platform, error = %e, "Guide lookup failed");
                GuideResult::error(device_name.to_string(), platform.clone(), e.to_string())
            }
        }
    }

    /// Resolves the user's registered device, then looks up its guide.
    /// Gateway failures are forwarded in the result, not reinterpreted.
    pub async fn lookup_for_user(&self, user_id: &str) -> GuideResult {
        match self.device_gateway.device_for_user(user_id).await {
            Ok(record) => {
                let mut result = self.lookup_by_device_name(&record.device_name).await;
                if result.status == LookupStatus::Success {
                    result.message = record.status_message;
                }
                result
            }
            Err(e @ DeviceGatewayError::NotFound(_)) => {
                GuideResult::not_found(String::new(), Platform::Android, e.to_string())
            }
            Err(e) => GuideResult::error(String::new(), Platform::Android, e.to_string()),
        }
    }

    /// Forces a regeneration regardless of store freshness.
    pub async fn regenerate(
        &self,
        platform: &Platform,
    ) -> Result<RegenerationSummary, GuideLookupError> {
        let guard = self.lock_for(platform).await;
        let _held = guard.lock().await;
        self.regenerate_locked(platform).await
    }

    pub async fn store_status(&self, platform: &Platform) -> StoreStatus {
        let readiness = self.store.readiness(platform).await;
        let step_count = match readiness {
            StoreReadiness::Ready => self
                .store
                .load(platform)
                .await
                .ok()
                .map(|steps| steps.len()),
            StoreReadiness::Unloaded(_) => None,
        };
        StoreStatus {
            readiness,
            step_count,
        }
    }

    /// Loads a platform's steps, regenerating at most once when the store
    /// is not ready. Concurrent callers share one regeneration through the
    /// per-platform guard.
    async fn load_fresh(
        &self,
        platform: &Platform,
    ) -> Result<Vec<InstructionStep>, GuideLookupError> {
        if self.store.readiness(platform).await == StoreReadiness::Ready {
            return Ok(self.store.load(platform).await?);
        }

        let guard = self.lock_for(platform).await;
        let _held = guard.lock().await;

        // Another caller may have finished regenerating while we waited.
        match self.store.readiness(platform).await {
            StoreReadiness::Ready => {}
            StoreReadiness::Unloaded(reason) => {
                tracing::info!(platform = %platform, %reason, "Store not ready, regenerating");
                self.regenerate_locked(platform).await?;
            }
        }

        match self.store.load(platform).await {
            Ok(steps) => Ok(steps),
            Err(InstructionStoreError::NotFound(_)) => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn regenerate_locked(
        &self,
        platform: &Platform,
    ) -> Result<RegenerationSummary, GuideLookupError> {
        let outcome = self.extractor.extract_for(platform).await?;
        let image_count = outcome.images.len();

        // One extraction run may cover several platforms (the PDF catalog
        // does); each platform's block is persisted to its own store.
        let mut grouped: HashMap<Platform, Vec<InstructionStep>> = HashMap::new();
        grouped.entry(platform.clone()).or_default();
        for step in outcome.steps {
            grouped
                .entry(step.folder_type.clone())
                .or_default()
                .push(step);
        }

        let mut requested_count = 0;
        for (group_platform, steps) in &grouped {
            self.store.save(group_platform, steps).await?;
            if group_platform == platform {
                requested_count = steps.len();
            }
        }

        tracing::info!(
            platform = %platform,
            steps = requested_count,
            images = image_count,
            "Instruction store regenerated"
        );

        Ok(RegenerationSummary {
            platform: platform.clone(),
            step_count: requested_count,
            image_count,
            completed_at: Utc::now(),
        })
    }

    /// Steps keep their order; a step whose image file is gone stays in the
    /// guide with its image omitted.
    async fn assemble_images(&self, steps: &[InstructionStep]) -> Vec<StepImage> {
        let mut images = Vec::new();

        for step in steps {
            let Some(relative) = step.image_path.as_deref() else {
                continue;
            };

            let absolute = self.store.content_root().join(relative);
            let size_kb = match tokio::fs::metadata(&absolute).await {
                Ok(meta) => meta.len() / 1024,
                Err(_) => {
                    tracing::warn!(
                        step = step.step_number,
                        path = relative,
                        "Step image missing on disk, omitting"
                    );
                    continue;
                }
            };

            let url = match self.image_host.url_for(relative).await {
                Ok(url) => url,
                Err(e) => {
                    tracing::warn!(
                        step = step.step_number,
                        error = %e,
                        "Image host unavailable, omitting image"
                    );
                    continue;
                }
            };

            images.push(StepImage {
                step_number: step.step_number,
                url,
                filename: relative.rsplit('/').next().unwrap_or(relative).to_string(),
                mime_type: mime_type_for_path(relative).to_string(),
                size_kb,
            });
        }

        images
    }

    async fn lock_for(&self, platform: &Platform) -> Arc<Mutex<()>> {
        let mut locks = self.regeneration_locks.lock().await;
        locks.entry(platform.clone()).or_default().clone()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RegenerationSummary {
    pub platform: Platform,
    pub step_count: usize,
    pub image_count: usize,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStatus {
    pub readiness: StoreReadiness,
    pub step_count: Option<usize>,
}

#[derive(Debug, thiserror::Error)]
pub enum GuideLookupError {
    #[error("extraction: {0}")]
    Extraction(#[from] GuideExtractorError),
    #[error("store: {0}")]
    Store(#[from] InstructionStoreError),
}
