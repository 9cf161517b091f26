use std::path::Path;

use tempfile::TempDir;

use guidepost::application::ports::{
    InstructionStore, InstructionStoreError, StoreReadiness, UnloadedReason,
};
use guidepost::domain::{InstructionStep, Platform};
use guidepost::infrastructure::persistence::JsonInstructionStore;

fn step(number: u32, text: &str) -> InstructionStep {
    InstructionStep::new(
        number,
        text.to_string(),
        Some(format!("Android_Instruction/{number}.jpg")),
        Platform::Android,
    )
}

fn seed_image_dir(root: &Path) {
    let dir = root.join("Android_Instruction");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("1.jpg"), b"jpeg-bytes").unwrap();
}

#[tokio::test]
async fn given_saved_steps_when_loading_then_round_trips() {
    let root = TempDir::new().unwrap();
    let store = JsonInstructionStore::new(root.path().to_path_buf()).unwrap();
    let steps = vec![step(1, "Bước 1: Mở Ứng dụng"), step(2, "Bước 2: Chọn Quyền")];

    store.save(&Platform::Android, &steps).await.unwrap();
    let loaded = store.load(&Platform::Android).await.unwrap();

    assert_eq!(loaded, steps);
    assert!(root.path().join("android_instructions.json").exists());
}

#[tokio::test]
async fn given_unordered_store_file_when_loading_then_sorted_by_step_number() {
    let root = TempDir::new().unwrap();
    let store = JsonInstructionStore::new(root.path().to_path_buf()).unwrap();
    let steps = vec![step(3, "Bước 3"), step(1, "Bước 1"), step(2, "Bước 2")];

    store.save(&Platform::Android, &steps).await.unwrap();
    let loaded = store.load(&Platform::Android).await.unwrap();

    let numbers: Vec<u32> = loaded.iter().map(|s| s.step_number).collect();
    assert_eq!(numbers, vec![1, 2, 3]);
}

#[tokio::test]
async fn given_no_store_file_when_loading_then_not_found() {
    let root = TempDir::new().unwrap();
    let store = JsonInstructionStore::new(root.path().to_path_buf()).unwrap();

    let error = store.load(&Platform::Ios).await.unwrap_err();

    assert!(matches!(error, InstructionStoreError::NotFound(_)));
    assert!(error.to_string().contains("ios_instructions.json"));
}

#[tokio::test]
async fn given_corrupt_store_file_when_loading_then_malformed_error() {
    let root = TempDir::new().unwrap();
    let store = JsonInstructionStore::new(root.path().to_path_buf()).unwrap();
    std::fs::write(root.path().join("android_instructions.json"), b"{ not json").unwrap();

    let error = store.load(&Platform::Android).await.unwrap_err();

    assert!(matches!(error, InstructionStoreError::Malformed(_, _)));
}

#[tokio::test]
async fn given_missing_store_file_when_checking_readiness_then_store_file_missing() {
    let root = TempDir::new().unwrap();
    let store = JsonInstructionStore::new(root.path().to_path_buf()).unwrap();

    assert_eq!(
        store.readiness(&Platform::Android).await,
        StoreReadiness::Unloaded(UnloadedReason::StoreFileMissing)
    );
}

#[tokio::test]
async fn given_store_without_image_dir_when_checking_readiness_then_image_dir_missing() {
    let root = TempDir::new().unwrap();
    let store = JsonInstructionStore::new(root.path().to_path_buf()).unwrap();
    store
        .save(&Platform::Android, &[step(1, "Bước 1")])
        .await
        .unwrap();

    assert_eq!(
        store.readiness(&Platform::Android).await,
        StoreReadiness::Unloaded(UnloadedReason::ImageDirMissing)
    );
}

#[tokio::test]
async fn given_image_dir_without_recognized_files_when_checking_readiness_then_no_images() {
    let root = TempDir::new().unwrap();
    let store = JsonInstructionStore::new(root.path().to_path_buf()).unwrap();
    store
        .save(&Platform::Android, &[step(1, "Bước 1")])
        .await
        .unwrap();
    let dir = root.path().join("Android_Instruction");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("notes.txt"), b"not a screenshot").unwrap();

    assert_eq!(
        store.readiness(&Platform::Android).await,
        StoreReadiness::Unloaded(UnloadedReason::NoImages)
    );
}

#[tokio::test]
async fn given_empty_step_list_when_checking_readiness_then_empty_or_invalid() {
    let root = TempDir::new().unwrap();
    let store = JsonInstructionStore::new(root.path().to_path_buf()).unwrap();
    store.save(&Platform::Android, &[]).await.unwrap();
    seed_image_dir(root.path());

    assert_eq!(
        store.readiness(&Platform::Android).await,
        StoreReadiness::Unloaded(UnloadedReason::EmptyOrInvalid)
    );
}

#[tokio::test]
async fn given_complete_store_when_checking_readiness_then_ready() {
    let root = TempDir::new().unwrap();
    let store = JsonInstructionStore::new(root.path().to_path_buf()).unwrap();
    store
        .save(&Platform::Android, &[step(1, "Bước 1")])
        .await
        .unwrap();
    seed_image_dir(root.path());

    assert_eq!(
        store.readiness(&Platform::Android).await,
        StoreReadiness::Ready
    );
}

#[tokio::test]
async fn given_uppercase_extension_when_checking_readiness_then_image_recognized() {
    let root = TempDir::new().unwrap();
    let store = JsonInstructionStore::new(root.path().to_path_buf()).unwrap();
    store
        .save(&Platform::Android, &[step(1, "Bước 1")])
        .await
        .unwrap();
    let dir = root.path().join("Android_Instruction");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("1.JPG"), b"jpeg-bytes").unwrap();

    assert_eq!(
        store.readiness(&Platform::Android).await,
        StoreReadiness::Ready
    );
}
