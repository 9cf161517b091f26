use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tempfile::TempDir;

use guidepost::application::ports::{
    DeviceGateway, DeviceGatewayError, ExtractionOutcome, GuideExtractor, GuideExtractorError,
    InstructionStore, StoreReadiness, UnloadedReason,
};
use guidepost::application::services::GuideLookupService;
use guidepost::domain::{DeviceRecord, ExtractedImage, InstructionStep, LookupStatus, Platform};
use guidepost::infrastructure::gateway::MockDeviceGateway;
use guidepost::infrastructure::persistence::JsonInstructionStore;

use crate::FixedPortImageHost;

const ANDROID_DEVICE: &str = "Samsung Galaxy A6 (2018)";

/// Extractor producing one step and its screenshot file, counting calls.
struct CountingExtractor {
    content_root: PathBuf,
    calls: AtomicUsize,
}

impl CountingExtractor {
    fn new(content_root: PathBuf) -> Self {
        Self {
            content_root,
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl GuideExtractor for CountingExtractor {
    async fn extract_for(
        &self,
        platform: &Platform,
    ) -> Result<ExtractionOutcome, GuideExtractorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let dir = self.content_root.join(platform.image_dir_name());
        std::fs::create_dir_all(&dir)?;
        std::fs::write(dir.join("1.jpg"), b"jpeg-bytes")?;

        let path = format!("{}/1.jpg", platform.image_dir_name());
        Ok(ExtractionOutcome {
            steps: vec![InstructionStep::new(
                1,
                "Bước 1: Mở Cài đặt".to_string(),
                Some(path.clone()),
                platform.clone(),
            )],
            images: vec![ExtractedImage {
                index: 1,
                path,
                mime_type: "image/jpeg".to_string(),
                size_kb: 1,
            }],
        })
    }
}

/// Extractor that succeeds with nothing to persist.
struct EmptyExtractor {
    calls: AtomicUsize,
}

impl EmptyExtractor {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl GuideExtractor for EmptyExtractor {
    async fn extract_for(
        &self,
        _platform: &Platform,
    ) -> Result<ExtractionOutcome, GuideExtractorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ExtractionOutcome::default())
    }
}

/// Extractor whose single run covers both platforms, like the PDF catalog.
struct DualPlatformExtractor {
    content_root: PathBuf,
}

#[async_trait::async_trait]
impl GuideExtractor for DualPlatformExtractor {
    async fn extract_for(
        &self,
        _platform: &Platform,
    ) -> Result<ExtractionOutcome, GuideExtractorError> {
        let mut steps = Vec::new();
        let mut images = Vec::new();

        for (platform, text) in [
            (Platform::Ios, "Bước 1: Mở Cài đặt"),
            (Platform::Android, "Bước 1: Mở Ứng dụng"),
        ] {
            let dir = self.content_root.join(platform.image_dir_name());
            std::fs::create_dir_all(&dir)?;
            std::fs::write(dir.join("1.jpg"), b"jpeg-bytes")?;

            let path = format!("{}/1.jpg", platform.image_dir_name());
            steps.push(InstructionStep::new(
                1,
                text.to_string(),
                Some(path.clone()),
                platform.clone(),
            ));
            images.push(ExtractedImage {
                index: 1,
                path,
                mime_type: "image/jpeg".to_string(),
                size_kb: 1,
            });
        }

        Ok(ExtractionOutcome { steps, images })
    }
}

struct FailingGateway;

#[async_trait::async_trait]
impl DeviceGateway for FailingGateway {
    async fn device_for_user(&self, _user_id: &str) -> Result<DeviceRecord, DeviceGatewayError> {
        Err(DeviceGatewayError::Upstream(
            "database under maintenance".to_string(),
        ))
    }
}

fn service_over<E>(
    extractor: Arc<E>,
    root: &Path,
) -> GuideLookupService<E, JsonInstructionStore, MockDeviceGateway, FixedPortImageHost>
where
    E: GuideExtractor,
{
    GuideLookupService::new(
        extractor,
        Arc::new(JsonInstructionStore::new(root.to_path_buf()).unwrap()),
        Arc::new(MockDeviceGateway::new()),
        Arc::new(FixedPortImageHost),
    )
}

#[tokio::test]
async fn given_missing_store_when_looking_up_then_regenerates_exactly_once() {
    let root = TempDir::new().unwrap();
    let extractor = Arc::new(CountingExtractor::new(root.path().to_path_buf()));
    let service = service_over(extractor.clone(), root.path());

    let result = service.lookup_by_device_name(ANDROID_DEVICE).await;

    assert_eq!(result.status, LookupStatus::Success);
    assert_eq!(result.guide, "Bước 1: Mở Cài đặt");
    assert_eq!(result.images.len(), 1);
    assert_eq!(extractor.calls(), 1);
}

#[tokio::test]
async fn given_fresh_store_when_looking_up_again_then_reads_without_extracting() {
    let root = TempDir::new().unwrap();
    let extractor = Arc::new(CountingExtractor::new(root.path().to_path_buf()));
    let service = service_over(extractor.clone(), root.path());

    service.lookup_by_device_name(ANDROID_DEVICE).await;
    let again = service.lookup_by_device_name(ANDROID_DEVICE).await;

    assert_eq!(again.status, LookupStatus::Success);
    assert_eq!(extractor.calls(), 1);
}

#[tokio::test]
async fn given_concurrent_lookups_when_store_unready_then_single_regeneration() {
    let root = TempDir::new().unwrap();
    let extractor = Arc::new(CountingExtractor::new(root.path().to_path_buf()));
    let service = service_over(extractor.clone(), root.path());

    let (first, second) = tokio::join!(
        service.lookup_by_device_name(ANDROID_DEVICE),
        service.lookup_by_device_name(ANDROID_DEVICE),
    );

    assert_eq!(first.status, LookupStatus::Success);
    assert_eq!(second.status, LookupStatus::Success);
    assert_eq!(extractor.calls(), 1);
}

#[tokio::test]
async fn given_extractor_with_no_steps_when_looking_up_then_returns_not_found() {
    let root = TempDir::new().unwrap();
    let extractor = Arc::new(EmptyExtractor::new());
    let service = service_over(extractor.clone(), root.path());

    let result = service.lookup_by_device_name(ANDROID_DEVICE).await;

    assert_eq!(result.status, LookupStatus::NotFound);
    assert!(
        result
            .message
            .as_deref()
            .unwrap_or_default()
            .contains("no guide found for platform Android")
    );
    assert_eq!(extractor.calls(), 1);
}

#[tokio::test]
async fn given_step_image_missing_on_disk_when_looking_up_then_image_omitted() {
    let root = TempDir::new().unwrap();
    let image_dir = root.path().join("Android_Instruction");
    std::fs::create_dir_all(&image_dir).unwrap();
    std::fs::write(image_dir.join("2.jpg"), b"jpeg-bytes").unwrap();

    let steps = vec![
        InstructionStep::new(
            1,
            "Bước 1: Mở Ứng dụng".to_string(),
            Some("Android_Instruction/missing.jpg".to_string()),
            Platform::Android,
        ),
        InstructionStep::new(
            2,
            "Bước 2: Chọn Cho phép".to_string(),
            Some("Android_Instruction/2.jpg".to_string()),
            Platform::Android,
        ),
    ];
    std::fs::write(
        root.path().join("android_instructions.json"),
        serde_json::to_vec_pretty(&steps).unwrap(),
    )
    .unwrap();

    let extractor = Arc::new(CountingExtractor::new(root.path().to_path_buf()));
    let service = service_over(extractor.clone(), root.path());

    let result = service.lookup_by_device_name(ANDROID_DEVICE).await;

    assert_eq!(result.status, LookupStatus::Success);
    assert_eq!(result.guide, "Bước 1: Mở Ứng dụng → Bước 2: Chọn Cho phép");
    assert_eq!(result.images.len(), 1);
    assert_eq!(result.images[0].filename, "2.jpg");
    assert_eq!(result.images[0].step_number, 2);
    assert_eq!(extractor.calls(), 0);
}

#[tokio::test]
async fn given_ready_store_when_regenerate_called_then_extracts_again() {
    let root = TempDir::new().unwrap();
    let extractor = Arc::new(CountingExtractor::new(root.path().to_path_buf()));
    let service = service_over(extractor.clone(), root.path());

    service.lookup_by_device_name(ANDROID_DEVICE).await;
    let summary = service.regenerate(&Platform::Android).await.unwrap();

    assert_eq!(extractor.calls(), 2);
    assert_eq!(summary.platform, Platform::Android);
    assert_eq!(summary.step_count, 1);
    assert_eq!(summary.image_count, 1);
}

#[tokio::test]
async fn given_catalog_covering_both_platforms_when_regenerating_then_each_store_written() {
    let root = TempDir::new().unwrap();
    let extractor = Arc::new(DualPlatformExtractor {
        content_root: root.path().to_path_buf(),
    });
    let service = service_over(extractor, root.path());

    let summary = service.regenerate(&Platform::Android).await.unwrap();

    assert_eq!(summary.step_count, 1);
    assert_eq!(summary.image_count, 2);

    let store = JsonInstructionStore::new(root.path().to_path_buf()).unwrap();
    let ios_steps = store.load(&Platform::Ios).await.unwrap();
    let android_steps = store.load(&Platform::Android).await.unwrap();
    assert_eq!(ios_steps[0].text, "Bước 1: Mở Cài đặt");
    assert_eq!(android_steps[0].text, "Bước 1: Mở Ứng dụng");
}

#[tokio::test]
async fn given_user_with_registered_device_when_looking_up_then_status_message_attached() {
    let root = TempDir::new().unwrap();
    let extractor = Arc::new(CountingExtractor::new(root.path().to_path_buf()));
    let gateway = MockDeviceGateway::new().with_device(
        "user-1",
        DeviceRecord::new("iPhone 6".to_string(), Some("Warranty active".to_string())),
    );
    let service = GuideLookupService::new(
        extractor,
        Arc::new(JsonInstructionStore::new(root.path().to_path_buf()).unwrap()),
        Arc::new(gateway),
        Arc::new(FixedPortImageHost),
    );

    let result = service.lookup_for_user("user-1").await;

    assert_eq!(result.status, LookupStatus::Success);
    assert_eq!(result.folder_type, Platform::Ios);
    assert_eq!(result.device_name, "iPhone 6");
    assert_eq!(result.message.as_deref(), Some("Warranty active"));
}

#[tokio::test]
async fn given_unknown_user_when_looking_up_then_returns_not_found() {
    let root = TempDir::new().unwrap();
    let extractor = Arc::new(EmptyExtractor::new());
    let service = service_over(extractor, root.path());

    let result = service.lookup_for_user("nobody").await;

    assert_eq!(result.status, LookupStatus::NotFound);
    assert!(
        result
            .message
            .as_deref()
            .unwrap_or_default()
            .contains("nobody")
    );
}

#[tokio::test]
async fn given_gateway_upstream_failure_when_looking_up_then_message_passed_through() {
    let root = TempDir::new().unwrap();
    let extractor = Arc::new(EmptyExtractor::new());
    let service = GuideLookupService::new(
        extractor,
        Arc::new(JsonInstructionStore::new(root.path().to_path_buf()).unwrap()),
        Arc::new(FailingGateway),
        Arc::new(FixedPortImageHost),
    );

    let result = service.lookup_for_user("user-1").await;

    assert_eq!(result.status, LookupStatus::Error);
    assert_eq!(result.message.as_deref(), Some("database under maintenance"));
}

#[tokio::test]
async fn given_store_lifecycle_when_status_queried_then_readiness_tracked() {
    let root = TempDir::new().unwrap();
    let extractor = Arc::new(CountingExtractor::new(root.path().to_path_buf()));
    let service = service_over(extractor, root.path());

    let before = service.store_status(&Platform::Android).await;
    assert_eq!(
        before.readiness,
        StoreReadiness::Unloaded(UnloadedReason::StoreFileMissing)
    );
    assert_eq!(before.step_count, None);

    service.lookup_by_device_name(ANDROID_DEVICE).await;

    let after = service.store_status(&Platform::Android).await;
    assert_eq!(after.readiness, StoreReadiness::Ready);
    assert_eq!(after.step_count, Some(1));
}
