//! Integration tests for the approved-item zip export.

mod common;

use std::io::{Cursor, Read};

use axum::http::StatusCode;
use common::{body_bytes, body_json, get, post_empty, TestApp};

#[tokio::test]
async fn export_without_approved_items_is_bad_request() {
    let app = TestApp::new().await;
    app.import(&["a.png"]).await;

    let response = get(app.app(), "/api/v1/review/export").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn export_bundles_approved_media_and_manifest() {
    let app = TestApp::new().await;
    app.load_dataset(&["MC in the bedroom || chap_3_1"]).await;
    let ids = app.import(&["chap_3_1.png", "b.png", "c.png"]).await;

    post_empty(app.app(), &format!("/api/v1/review/items/{}/approve", ids[0])).await;
    post_empty(app.app(), &format!("/api/v1/review/items/{}/reject", ids[1])).await;
    // Regenerated then approved: remote locator, manifest only.
    post_empty(app.app(), &format!("/api/v1/review/items/{}/regenerate", ids[2])).await;
    post_empty(app.app(), &format!("/api/v1/review/items/{}/approve", ids[2])).await;

    let response = get(app.app(), "/api/v1/review/export").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "application/zip");
    assert!(response.headers()["content-disposition"]
        .to_str()
        .unwrap()
        .starts_with("attachment"));

    let bytes = body_bytes(response).await;
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();

    let mut names: Vec<_> = archive.file_names().map(str::to_string).collect();
    names.sort();
    let mut expected = vec![format!("{}_chap_3_1.png", ids[0]), "manifest.json".to_string()];
    expected.sort();
    assert_eq!(names, expected);

    let mut image = Vec::new();
    archive
        .by_name(&format!("{}_chap_3_1.png", ids[0]))
        .unwrap()
        .read_to_end(&mut image)
        .unwrap();
    assert_eq!(image, b"png");

    let mut manifest = String::new();
    archive
        .by_name("manifest.json")
        .unwrap()
        .read_to_string(&mut manifest)
        .unwrap();
    let manifest: serde_json::Value = serde_json::from_str(&manifest).unwrap();
    let items = manifest["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["prompt"], "MC in the bedroom");
    assert_eq!(items[0]["setting"], "apartment_bedroom");
    assert_eq!(items[1]["sourceUrl"], "https://gen.test/regen-1.png");
    assert!(manifest["generatedAt"].is_string());

    // Export does not change the session.
    let stats = body_json(get(app.app(), "/api/v1/review/stats").await).await;
    assert_eq!(stats["data"]["approved"], 2);
}
