use guidepost::domain::{GuideResult, InstructionStep, Platform, mime_type_for_path};

#[test]
fn given_success_result_when_serialized_then_status_is_snake_case_and_message_omitted() {
    let result = GuideResult::success(
        "iPhone 6".to_string(),
        "Bước 1: Mở Cài đặt".to_string(),
        Vec::new(),
        Platform::Ios,
    );

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["status"], "success");
    assert_eq!(json["folder_type"], "IOS");
    assert!(json.get("message").is_none());
}

#[test]
fn given_not_found_result_when_serialized_then_carries_message() {
    let result = GuideResult::not_found(
        "Nokia 3310".to_string(),
        Platform::Android,
        "no guide found for platform Android".to_string(),
    );

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["status"], "not_found");
    assert_eq!(json["guide"], "");
    assert_eq!(json["message"], "no guide found for platform Android");
}

#[test]
fn given_step_without_image_when_serialized_then_image_path_omitted() {
    let step = InstructionStep::new(3, "Bước 3: Xong".to_string(), None, Platform::Android);

    let json = serde_json::to_value(&step).unwrap();
    assert!(json.get("image_path").is_none());
    assert_eq!(json["folder_type"], "Android");
}

#[test]
fn given_store_json_without_image_paths_when_deserialized_then_steps_are_tolerated() {
    let raw = r#"[
        {"step_number": 2, "text": "B", "folder_type": "Android"},
        {"step_number": 1, "text": "A", "image_path": "Android_Instruction/1.jpg", "folder_type": "Android"}
    ]"#;

    let steps: Vec<InstructionStep> = serde_json::from_str(raw).unwrap();
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0].image_path, None);
    assert_eq!(steps[1].image_path.as_deref(), Some("Android_Instruction/1.jpg"));
}

#[test]
fn given_image_paths_when_deriving_mime_type_then_unknown_defaults_to_jpeg() {
    assert_eq!(mime_type_for_path("IOS_Instruction/1.png"), "image/png");
    assert_eq!(mime_type_for_path("shot.webp"), "image/webp");
    assert_eq!(mime_type_for_path("archive.bin"), "image/jpeg");
    assert_eq!(mime_type_for_path("noextension"), "image/jpeg");
}
