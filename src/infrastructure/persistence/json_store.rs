use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::application::ports::{
    InstructionStore, InstructionStoreError, StoreReadiness, UnloadedReason,
};
use crate::domain::{InstructionStep, Platform};

const RECOGNIZED_IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// File-backed instruction store: one pretty-printed JSON array per
/// platform under the content root, next to the image folders.
pub struct JsonInstructionStore {
    content_root: PathBuf,
}

impl JsonInstructionStore {
    pub fn new(content_root: PathBuf) -> Result<Self, InstructionStoreError> {
        std::fs::create_dir_all(&content_root)?;
        Ok(Self { content_root })
    }

    fn store_path(&self, platform: &Platform) -> PathBuf {
        self.content_root.join(platform.store_file_name())
    }

    fn image_dir_has_images(&self, platform: &Platform) -> bool {
        let Ok(entries) = std::fs::read_dir(self.image_dir(platform)) else {
            return false;
        };
        entries.filter_map(|e| e.ok()).any(|entry| {
            entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| {
                    RECOGNIZED_IMAGE_EXTENSIONS
                        .iter()
                        .any(|known| ext.eq_ignore_ascii_case(known))
                })
        })
    }
}

#[async_trait]
impl InstructionStore for JsonInstructionStore {
    async fn load(
        &self,
        platform: &Platform,
    ) -> Result<Vec<InstructionStep>, InstructionStoreError> {
        let path = self.store_path(platform);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(InstructionStoreError::NotFound(path.display().to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let mut steps: Vec<InstructionStep> = serde_json::from_slice(&bytes).map_err(|e| {
            InstructionStoreError::Malformed(path.display().to_string(), e.to_string())
        })?;

        // Write order follows extraction order, not numeric order.
        steps.sort_by_key(|step| step.step_number);
        Ok(steps)
    }

    async fn save(
        &self,
        platform: &Platform,
        steps: &[InstructionStep],
    ) -> Result<(), InstructionStoreError> {
        let path = self.store_path(platform);
        let json = serde_json::to_vec_pretty(steps).map_err(|e| {
            InstructionStoreError::Malformed(path.display().to_string(), e.to_string())
        })?;
        tokio::fs::write(&path, json).await?;

        tracing::debug!(platform = %platform, steps = steps.len(), "Saved instruction store");
        Ok(())
    }

    async fn readiness(&self, platform: &Platform) -> StoreReadiness {
        let path = self.store_path(platform);
        if !path.exists() {
            return StoreReadiness::Unloaded(UnloadedReason::StoreFileMissing);
        }
        if !self.image_dir(platform).is_dir() {
            return StoreReadiness::Unloaded(UnloadedReason::ImageDirMissing);
        }
        if !self.image_dir_has_images(platform) {
            return StoreReadiness::Unloaded(UnloadedReason::NoImages);
        }

        match self.load(platform).await {
            Ok(steps) if !steps.is_empty() => StoreReadiness::Ready,
            Ok(_) => StoreReadiness::Unloaded(UnloadedReason::EmptyOrInvalid),
            Err(_) => StoreReadiness::Unloaded(UnloadedReason::EmptyOrInvalid),
        }
    }

    fn image_dir(&self, platform: &Platform) -> PathBuf {
        self.content_root.join(platform.image_dir_name())
    }

    fn content_root(&self) -> &Path {
        &self.content_root
    }
}
