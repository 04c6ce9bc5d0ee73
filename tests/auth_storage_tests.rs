use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use storefront_client::config::ClientOptions;
use storefront_client::error::Error;
use storefront_client::state::AppState;
use storefront_client::storage::UploadTarget;
use storefront_client::Storefront;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_login_stores_token_and_sends_bearer() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_partial_json(json!({ "email": "admin@example.com", "password": "secret123" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "opaque-token",
            "user": { "_id": "u1", "email": "admin@example.com", "role": "admin" }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/products"))
        .and(header("authorization", "Bearer opaque-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let shop = Storefront::new(&mock_server.uri()).unwrap();
    let auth = shop.auth();
    assert!(!auth.is_logged_in());

    let session = auth.login(" admin@example.com ", "secret123").await.unwrap();
    assert_eq!(session.token, "opaque-token");
    assert!(session.user.as_ref().is_some_and(|u| u.is_admin()));
    assert!(shop.state().is_logged_in());

    shop.products().list().await.unwrap();

    auth.logout().unwrap();
    assert!(!auth.is_logged_in());
}

#[tokio::test]
async fn test_rejected_login_keeps_signed_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "Invalid credentials" })))
        .mount(&mock_server)
        .await;

    let shop = Storefront::new(&mock_server.uri()).unwrap();
    let err = shop.auth().login("admin@example.com", "wrong-pass").await.unwrap_err();

    assert_eq!(err.status(), Some(401));
    assert!(!shop.state().is_logged_in());
}

#[tokio::test]
async fn test_malformed_email_is_rejected_locally() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let shop = Storefront::new(&mock_server.uri()).unwrap();
    let result = shop.auth().login("not-an-email", "secret123").await;
    assert!(matches!(result, Err(Error::Validation(_))));
}

#[tokio::test]
async fn test_session_survives_restart() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "persisted" })))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let options = ClientOptions::default()
        .with_base_url(&mock_server.uri())
        .with_state_path(dir.path().join("state.json"));

    let first = Storefront::new_with_options(options.clone()).unwrap();
    first.auth().login("admin@example.com", "secret123").await.unwrap();

    let second = Storefront::new_with_options(options).unwrap();
    assert_eq!(second.state().token().as_deref(), Some("persisted"));
}

#[tokio::test]
async fn test_upload_product_image_returns_url() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/upload/product-image"))
        .and(body_string_contains("name=\"image\""))
        .and(body_string_contains("filename=\"kettle.png\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "imageUrl": "https://cdn.example.com/kettle.png"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "url": "https://cdn.example.com/banner.jpg" }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let shop = Storefront::new(&mock_server.uri()).unwrap();
    let storage = shop.storage();

    let url = storage
        .upload_product_image("kettle.png", b"PNG image bytes".to_vec())
        .await
        .unwrap();
    assert_eq!(url, "https://cdn.example.com/kettle.png");

    let url = storage.upload(UploadTarget::General, "banner.jpg", b"JPEG image bytes".to_vec()).await.unwrap();
    assert_eq!(url, "https://cdn.example.com/banner.jpg");
}

#[tokio::test]
async fn test_upload_rejects_bad_files_before_sending() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let shop = Storefront::new(&mock_server.uri()).unwrap();
    let storage = shop.storage();

    assert!(matches!(
        storage.upload_image("notes.txt", b"hello".to_vec()).await,
        Err(Error::Upload(_))
    ));
    assert!(matches!(
        storage.upload_image("empty.png", Vec::new()).await,
        Err(Error::Upload(_))
    ));
}

#[tokio::test]
async fn test_upload_without_url_is_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "Storage quota exceeded" })))
        .mount(&mock_server)
        .await;

    let state = Arc::new(AppState::new(Duration::from_secs(60)));
    let shop = Storefront::with_state(ClientOptions::default().with_base_url(&mock_server.uri()), state).unwrap();

    let err = shop.storage().upload_image("logo.webp", vec![1, 2, 3]).await.unwrap_err();
    assert_eq!(err.user_message(), "Storage quota exceeded");
}
