use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::{InstructionStep, Platform};

/// Freshness of a platform's persisted instruction list. The store only
/// reports; regeneration is driven by the lookup service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreReadiness {
    Ready,
    Unloaded(UnloadedReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnloadedReason {
    StoreFileMissing,
    ImageDirMissing,
    NoImages,
    EmptyOrInvalid,
}

impl UnloadedReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnloadedReason::StoreFileMissing => "store file missing",
            UnloadedReason::ImageDirMissing => "image folder missing",
            UnloadedReason::NoImages => "image folder empty",
            UnloadedReason::EmptyOrInvalid => "store file empty or invalid",
        }
    }
}

impl fmt::Display for UnloadedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[async_trait]
pub trait InstructionStore: Send + Sync {
    /// Loads a platform's steps, re-sorted by step number.
    async fn load(
        &self,
        platform: &Platform,
    ) -> Result<Vec<InstructionStep>, InstructionStoreError>;

    /// Overwrites a platform's persisted list.
    async fn save(
        &self,
        platform: &Platform,
        steps: &[InstructionStep],
    ) -> Result<(), InstructionStoreError>;

    async fn readiness(&self, platform: &Platform) -> StoreReadiness;

    fn image_dir(&self, platform: &Platform) -> PathBuf;

    fn content_root(&self) -> &Path;
}

#[derive(Debug, thiserror::Error)]
pub enum InstructionStoreError {
    #[error("store file not found: {0}")]
    NotFound(String),
    #[error("malformed store file {0}: {1}")]
    Malformed(String, String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
