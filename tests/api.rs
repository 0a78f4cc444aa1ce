use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use profile_site::config::RunMode;
use profile_site::{router, AppState, LocalStorage, ProfileRecord, ProfileStore};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "profile-site-test-boundary";

struct TestApp {
    router: Router,
    uploads: TempDir,
    _public: TempDir,
}

impl TestApp {
    fn new(mode: RunMode) -> Self {
        let uploads = tempfile::tempdir().unwrap();
        let public = tempfile::tempdir().unwrap();
        std::fs::write(public.path().join("index.html"), "<h1>profile</h1>").unwrap();

        let profile = ProfileRecord::new(
            "Ada Lovelace",
            "Writes programs for engines that do not exist yet.",
            vec!["Maths".into(), "Poetry".into()],
        );
        let state = AppState::new(
            ProfileStore::new(profile),
            LocalStorage::new(uploads.path()),
            public.path(),
            mode,
        );

        Self {
            router: router(state),
            uploads,
            _public: public,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    async fn put_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::put(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    async fn upload(&self, uri: &str, field: &str, filename: &str, mime: &str, data: &[u8]) -> (StatusCode, Value) {
        self.send(multipart_request(uri, field, filename, mime, data)).await
    }

    fn stored_files(&self) -> usize {
        std::fs::read_dir(self.uploads.path()).map(|dir| dir.count()).unwrap_or(0)
    }
}

fn multipart_request(uri: &str, field: &str, filename: &str, mime: &str, data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: {mime}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::post(uri)
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(body))
        .unwrap()
}

fn valid_update() -> Value {
    json!({
        "name": "Grace Hopper",
        "bio": "Invented the first compiler toolchain.",
    })
}

fn uploaded_name(url: &str) -> &str {
    url.strip_prefix("/uploads/").unwrap()
}

#[tokio::test]
async fn health_reports_running() {
    let app = TestApp::new(RunMode::Production);
    let (status, body) = app.get("/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Server is running");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn get_profile_returns_record() {
    let app = TestApp::new(RunMode::Production);
    let (status, body) = app.get("/api/profile").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["name"], "Ada Lovelace");
    assert_eq!(body["data"]["skills"], json!(["Maths", "Poetry"]));
    assert!(body["data"]["photoUrl"].is_null());
}

#[tokio::test]
async fn partial_update_keeps_absent_fields() {
    let app = TestApp::new(RunMode::Production);
    let (_, before) = app.get("/api/profile").await;

    let mut update = valid_update();
    update["location"] = json!("Arlington");
    let (status, body) = app.put_json("/api/profile", update).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Profile updated successfully");
    let data = &body["data"];
    assert_eq!(data["name"], "Grace Hopper");
    assert_eq!(data["location"], "Arlington");
    assert_eq!(data["skills"], before["data"]["skills"]);
    assert_eq!(data["id"], before["data"]["id"]);
    assert_eq!(data["createdAt"], before["data"]["createdAt"]);
}

#[tokio::test]
async fn invalid_update_lists_each_field_and_changes_nothing() {
    let app = TestApp::new(RunMode::Production);
    let (_, before) = app.get("/api/profile").await;

    let (status, body) = app
        .put_json("/api/profile", json!({ "name": "A", "bio": "short" }))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Validation error");
    let errors: Vec<String> = serde_json::from_value(body["errors"].clone()).unwrap();
    assert_eq!(errors.len(), 2);
    assert!(errors.iter().any(|e| e.contains("\"name\"")));
    assert!(errors.iter().any(|e| e.contains("\"bio\"")));

    let (_, after) = app.get("/api/profile").await;
    assert_eq!(after, before);
}

#[tokio::test]
async fn name_length_bounds_are_enforced() {
    let app = TestApp::new(RunMode::Production);
    for name in ["A".to_string(), "x".repeat(101)] {
        let mut update = valid_update();
        update["name"] = json!(name);
        let (status, _) = app.put_json("/api/profile", update).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn malformed_or_unknown_bodies_are_validation_errors() {
    let app = TestApp::new(RunMode::Production);

    let mut update = valid_update();
    update["photoUrl"] = json!("/uploads/evil.png");
    let (status, body) = app.put_json("/api/profile", update).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Validation error");

    let request = Request::put("/api/profile")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn updated_at_moves_forward_only_on_success() {
    let app = TestApp::new(RunMode::Production);
    let (_, before) = app.get("/api/profile").await;

    app.put_json("/api/profile", json!({ "name": "A", "bio": "short" })).await;
    let (_, unchanged) = app.get("/api/profile").await;
    assert_eq!(unchanged["data"]["updatedAt"], before["data"]["updatedAt"]);

    let (_, updated) = app.put_json("/api/profile", valid_update()).await;
    let earlier: chrono::DateTime<chrono::Utc> =
        serde_json::from_value(before["data"]["updatedAt"].clone()).unwrap();
    let later: chrono::DateTime<chrono::Utc> =
        serde_json::from_value(updated["data"]["updatedAt"].clone()).unwrap();
    assert!(later >= earlier);
}

#[tokio::test]
async fn photo_upload_stores_file_and_sets_url() {
    let app = TestApp::new(RunMode::Production);
    let (status, body) = app
        .upload("/api/upload/photo", "photo", "me.png", "image/png", b"\x89PNG fake image")
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Photo uploaded successfully");
    let url = body["photoUrl"].as_str().unwrap();
    assert!(url.starts_with("/uploads/"));
    assert!(url.ends_with(".png"));
    assert_eq!(body["data"]["photoUrl"], url);

    let stored = app.uploads.path().join(uploaded_name(url));
    assert_eq!(std::fs::read(stored).unwrap(), b"\x89PNG fake image");

    let response = app
        .router
        .clone()
        .oneshot(Request::get(url).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
}

#[tokio::test]
async fn resume_upload_sets_resume_url() {
    let app = TestApp::new(RunMode::Production);
    let (status, body) = app
        .upload("/api/upload/resume", "resume", "cv.pdf", "application/pdf", b"%PDF-1.7")
        .await;

    assert_eq!(status, StatusCode::OK);
    let url = body["resumeUrl"].as_str().unwrap();
    assert!(url.ends_with(".pdf"));
    assert_eq!(body["data"]["resumeUrl"], url);
    assert!(body.get("photoUrl").is_none());

    let (_, stats) = app.get("/api/profile/stats").await;
    assert_eq!(stats["data"]["hasResume"], true);
    assert_eq!(stats["data"]["hasPhoto"], false);
}

#[tokio::test]
async fn executables_are_rejected_whatever_the_mime() {
    let app = TestApp::new(RunMode::Production);
    for mime in ["image/png", "application/octet-stream"] {
        let (status, body) = app
            .upload("/api/upload/photo", "photo", "setup.exe", mime, b"MZ")
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Only images (JPEG, PNG, GIF) and PDF files are allowed");
    }
    assert_eq!(app.stored_files(), 0);
}

#[tokio::test]
async fn oversized_photo_is_rejected_without_side_effects() {
    let app = TestApp::new(RunMode::Production);
    let (_, before) = app.get("/api/profile").await;

    let data = vec![0xFFu8; 6 * 1024 * 1024];
    let (status, body) = app
        .upload("/api/upload/photo", "photo", "big.jpg", "image/jpeg", &data)
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "File size too large. Maximum size is 5MB.");
    assert_eq!(app.stored_files(), 0);

    let (_, after) = app.get("/api/profile").await;
    assert_eq!(after["data"]["photoUrl"], before["data"]["photoUrl"]);
}

#[tokio::test]
async fn upload_without_expected_field_is_missing_file() {
    let app = TestApp::new(RunMode::Production);
    let (status, body) = app
        .upload("/api/upload/photo", "resume", "me.png", "image/png", b"png")
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No file uploaded");

    let request = Request::post("/api/upload/resume").body(Body::empty()).unwrap();
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No file uploaded");
}

#[tokio::test]
async fn delete_removes_file_but_leaves_dangling_profile_url() {
    let app = TestApp::new(RunMode::Production);
    let (_, body) = app
        .upload("/api/upload/photo", "photo", "me.gif", "image/gif", b"GIF89a")
        .await;
    let url = body["photoUrl"].as_str().unwrap().to_string();

    let request = Request::builder()
        .method(Method::DELETE)
        .uri(format!("/api/upload/{}", uploaded_name(&url)))
        .body(Body::empty())
        .unwrap();
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "File deleted successfully");
    assert_eq!(app.stored_files(), 0);

    // Current behaviour: the profile still points at the deleted file.
    let (_, profile) = app.get("/api/profile").await;
    assert_eq!(profile["data"]["photoUrl"], url);
}

#[tokio::test]
async fn deleting_unknown_or_escaping_names_is_not_found() {
    let app = TestApp::new(RunMode::Development);
    for uri in ["/api/upload/nothing-here.png", "/api/upload/..%2Fsecret.txt"] {
        let request = Request::builder()
            .method(Method::DELETE)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let (status, body) = app.send(request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "File not found");
    }
}

#[tokio::test]
async fn stats_summarise_profile() {
    let app = TestApp::new(RunMode::Production);
    let (status, body) = app.get("/api/profile/stats").await;

    assert_eq!(status, StatusCode::OK);
    let stats = &body["data"];
    assert_eq!(stats["skillsCount"], 2);
    assert_eq!(stats["hasPhoto"], false);
    let views = stats["profileViews"].as_u64().unwrap();
    assert!((100..1100).contains(&views));
    assert!(stats["lastUpdated"].is_string());
}

#[tokio::test]
async fn unmatched_routes_get_not_found_envelope() {
    let app = TestApp::new(RunMode::Production);
    let (status, body) = app.get("/api/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "success": false, "message": "Route not found" }));
}

#[tokio::test]
async fn site_assets_are_served_for_other_paths() {
    let app = TestApp::new(RunMode::Production);
    let response = app
        .router
        .clone()
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/html");
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"<h1>profile</h1>");
}

#[tokio::test]
async fn wrong_method_on_known_path_gets_not_found_envelope() {
    let app = TestApp::new(RunMode::Production);
    for method in [Method::POST, Method::DELETE] {
        let request = Request::builder()
            .method(method)
            .uri("/api/profile")
            .body(Body::empty())
            .unwrap();
        let (status, body) = app.send(request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "success": false, "message": "Route not found" }));
    }
}

#[tokio::test]
async fn body_over_transport_limit_is_payload_too_large() {
    let app = TestApp::new(RunMode::Production);
    let data = vec![0xFFu8; 12 * 1024 * 1024];
    let (status, body) = app
        .upload("/api/upload/photo", "photo", "huge.jpg", "image/jpeg", &data)
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "File size too large. Maximum size is 5MB.");
    assert_eq!(app.stored_files(), 0);
}

#[tokio::test]
async fn empty_or_null_optional_fields_are_rejected() {
    let app = TestApp::new(RunMode::Production);
    let (_, before) = app.get("/api/profile").await;

    let mut empty_location = valid_update();
    empty_location["location"] = json!("");
    let mut null_github = valid_update();
    null_github["githubUrl"] = Value::Null;

    for update in [empty_location, null_github] {
        let (status, body) = app.put_json("/api/profile", update).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Validation error");
    }

    let (_, after) = app.get("/api/profile").await;
    assert_eq!(after, before);
}

#[tokio::test]
async fn non_ascii_phone_digits_are_rejected() {
    let app = TestApp::new(RunMode::Production);
    let mut update = valid_update();
    update["phone"] = json!("+1\u{663}\u{663}\u{663}\u{663}\u{663}\u{663}\u{663}\u{663}");

    let (status, body) = app.put_json("/api/profile", update).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Validation error");
}
