use std::path::Path;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use tempfile::TempDir;
use tower::ServiceExt;

use guidepost::application::ports::ImageHost;
use guidepost::infrastructure::serving::{ImageFileServer, image_router};

fn seed_screenshot(root: &Path, dir: &str, name: &str) {
    let folder = root.join(dir);
    std::fs::create_dir_all(&folder).unwrap();
    std::fs::write(folder.join(name), b"image-bytes").unwrap();
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

#[tokio::test]
async fn given_existing_screenshot_when_requested_then_served_with_image_headers() {
    let root = TempDir::new().unwrap();
    seed_screenshot(root.path(), "IOS_Instruction", "1.jpg");
    let app = image_router(root.path().to_path_buf());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/IOS_Instruction/1.jpg")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/jpeg"
    );
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "*"
    );
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "public, max-age=3600"
    );
    assert_eq!(body_bytes(response).await, b"image-bytes");
}

#[tokio::test]
async fn given_png_screenshot_when_requested_then_png_content_type() {
    let root = TempDir::new().unwrap();
    seed_screenshot(root.path(), "extracted_images", "chart.png");
    let app = image_router(root.path().to_path_buf());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/extracted_images/chart.png")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/png"
    );
}

#[tokio::test]
async fn given_unknown_file_when_requested_then_not_found() {
    let root = TempDir::new().unwrap();
    let app = image_router(root.path().to_path_buf());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/IOS_Instruction/404.jpg")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn given_parent_dir_in_path_when_requested_then_forbidden() {
    let root = TempDir::new().unwrap();
    std::fs::write(root.path().join("secret.txt"), b"keep out").unwrap();
    let app = image_router(root.path().join("IOS_Instruction"));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/../secret.txt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn given_bare_filename_when_requested_then_known_folders_searched() {
    let root = TempDir::new().unwrap();
    seed_screenshot(root.path(), "Android_Instruction", "3.jpg");
    let app = image_router(root.path().to_path_buf());

    let response = app
        .oneshot(Request::builder().uri("/3.jpg").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"image-bytes");
}

#[tokio::test]
async fn given_started_server_when_started_again_then_same_port_kept() {
    let root = TempDir::new().unwrap();
    seed_screenshot(root.path(), "IOS_Instruction", "1.jpg");
    let server = ImageFileServer::new(root.path().to_path_buf(), 18301..=18310);

    let first = server.ensure_started().await.unwrap();
    let second = server.ensure_started().await.unwrap();

    assert_eq!(first, second);
    assert!((18301..=18310).contains(&first));

    let url = server.url_for("IOS_Instruction/1.jpg").await.unwrap();
    assert_eq!(url, format!("http://127.0.0.1:{first}/IOS_Instruction/1.jpg"));

    let fetched = reqwest::get(&url).await.unwrap();
    assert_eq!(fetched.status(), reqwest::StatusCode::OK);
    assert_eq!(fetched.bytes().await.unwrap().as_ref(), b"image-bytes");
}

#[tokio::test]
async fn given_occupied_port_when_starting_then_next_port_probed() {
    let root = TempDir::new().unwrap();
    let blocker = tokio::net::TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 18311))
        .await
        .unwrap();
    let server = ImageFileServer::new(root.path().to_path_buf(), 18311..=18320);

    let port = server.ensure_started().await.unwrap();

    assert_eq!(port, 18312);
    drop(blocker);
}
