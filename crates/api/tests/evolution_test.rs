//! Evolution endpoints.

mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};

use common::{TestApp, OTHER_USER, PNG, USER};

async fn start_session(app: &TestApp, style: &str) -> String {
    let (status, body) = app
        .post_json(
            "/api/evolution/sessions",
            Some(USER),
            json!({"basePrompt": "a lighthouse at dusk", "style": style}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["status"], "active");
    body["data"]["id"].as_str().unwrap().to_string()
}

async fn record(app: &TestApp, session_id: &str, prompt: &str, parent: Option<&str>) -> Value {
    let (status, body) = app
        .post_json(
            &format!("/api/evolution/sessions/{}/generations", session_id),
            Some(USER),
            json!({
                "prompt": prompt,
                "imageUrl": format!("https://cdn.example.com/{}.png", prompt),
                "parentImageId": parent,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["data"].clone()
}

#[tokio::test]
async fn test_identity_header_required() {
    let app = TestApp::new();

    let (status, body) = app.get("/api/evolution/sessions", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, _) = app.get("/api/evolution/sessions", Some("not valid!")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_session_lifecycle() {
    let app = TestApp::new();
    let session_id = start_session(&app, "anime").await;

    let first = record(&app, &session_id, "first", None).await;
    let second = record(&app, &session_id, "second", first["id"].as_str()).await;
    assert_eq!(first["generation"], 0);
    assert_eq!(second["generation"], 1);
    assert_eq!(second["style"], "anime");

    let (status, body) = app
        .get(&format!("/api/evolution/sessions/{}", session_id), Some(USER))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["generationCount"], 2);
    assert_eq!(body["data"]["currentImageId"], second["id"]);

    let (status, _) = app
        .get(&format!("/api/evolution/sessions/{}", session_id), Some(OTHER_USER))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .post_json(
            &format!("/api/evolution/sessions/{}/complete", session_id),
            Some(USER),
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "completed");

    let (status, body) = app
        .post_json(
            &format!("/api/evolution/sessions/{}/generations", session_id),
            Some(USER),
            json!({"prompt": "late", "imageUrl": "https://cdn.example.com/late.png"}),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Evolution session is already completed");
}

#[tokio::test]
async fn test_start_session_validates_prompt() {
    let app = TestApp::new();
    let (status, body) = app
        .post_json("/api/evolution/sessions", Some(USER), json!({"basePrompt": ""}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "basePrompt must be 1-2000 characters");
}

#[tokio::test]
async fn test_reference_uploads() {
    let app = TestApp::new();
    let session_id = start_session(&app, "photo").await;
    let uri = format!("/api/evolution/sessions/{}/references", session_id);

    let (status, body) = app.upload(&uri, USER, "notes.txt", b"plain text").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Only PNG, JPEG and WebP images are supported");

    let mut upload_ids = Vec::new();
    for i in 0..4 {
        let (status, body) = app.upload(&uri, USER, &format!("ref{}.png", i), PNG).await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        assert_eq!(body["data"]["contentType"], "image/png");
        assert_eq!(body["data"]["sizeBytes"], PNG.len());
        upload_ids.push(body["data"]["id"].as_str().unwrap().to_string());
    }

    let (status, body) = app.upload(&uri, USER, "ref5.png", PNG).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Reference image limit reached (max 4)");

    let (status, body) = app
        .delete(&format!("{}/{}", uri, upload_ids[0]), Some(USER))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = app.upload(&uri, USER, "ref5.png", PNG).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_oversized_upload_rejected() {
    let app = TestApp::new();
    let session_id = start_session(&app, "photo").await;
    let uri = format!("/api/evolution/sessions/{}/references", session_id);

    let mut bytes = PNG.to_vec();
    bytes.resize(10 * 1024 * 1024 + 1, 0);

    let (status, body) = app.upload(&uri, USER, "huge.png", &bytes).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_favorites_and_gallery() {
    let app = TestApp::new();
    let anime = start_session(&app, "anime").await;
    let photo = start_session(&app, "photo").await;

    let one = record(&app, &anime, "one", None).await;
    let two = record(&app, &photo, "two", None).await;
    let three = record(&app, &anime, "three", None).await;
    let one_id = one["id"].as_str().unwrap();

    let favorite_uri = format!("/api/evolution/favorites/{}", one_id);
    let (status, first) = app.put(&favorite_uri, Some(USER)).await;
    assert_eq!(status, StatusCode::OK);
    let (_, second) = app.put(&favorite_uri, Some(USER)).await;
    assert_eq!(first, second);

    let (status, _) = app
        .put(&format!("/api/evolution/favorites/{}", two["id"].as_str().unwrap()), Some(OTHER_USER))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, favorites) = app.get("/api/evolution/favorites", Some(USER)).await;
    assert_eq!(favorites["data"].as_array().unwrap().len(), 1);

    let (status, gallery) = app.get("/api/evolution/gallery", Some(USER)).await;
    assert_eq!(status, StatusCode::OK);
    let page = &gallery["data"];
    assert_eq!(page["meta"]["total"], 3);
    assert_eq!(page["meta"]["page"], 1);
    assert_eq!(page["meta"]["per_page"], 20);
    assert_eq!(page["data"][0]["id"], three["id"]);
    let flagged: Vec<&Value> = page["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|item| item["isFavorite"] == true)
        .collect();
    assert_eq!(flagged.len(), 1);
    assert_eq!(flagged[0]["id"], one["id"]);

    let (_, styled) = app
        .get("/api/evolution/gallery?style=anime&per_page=1", Some(USER))
        .await;
    assert_eq!(styled["data"]["meta"]["total"], 2);
    assert_eq!(styled["data"]["meta"]["total_pages"], 2);
    assert_eq!(styled["data"]["data"].as_array().unwrap().len(), 1);

    let (_, by_session) = app
        .get(&format!("/api/evolution/gallery?session_id={}", photo), Some(USER))
        .await;
    assert_eq!(by_session["data"]["meta"]["total"], 1);

    let (_, favorites_only) = app
        .get("/api/evolution/gallery?favorites_only=true", Some(USER))
        .await;
    let items = favorites_only["data"]["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], one["id"]);
    assert_eq!(items[0]["isFavorite"], true);

    let (status, _) = app.delete(&favorite_uri, Some(USER)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, favorites) = app.get("/api/evolution/favorites", Some(USER)).await;
    assert!(favorites["data"].as_array().unwrap().is_empty());

    let (_, other) = app.get("/api/evolution/gallery", Some(OTHER_USER)).await;
    assert_eq!(other["data"]["meta"]["total"], 0);
}

#[tokio::test]
async fn test_favorite_removal_cannot_reach_lookalike_user() {
    let app = TestApp::new();
    let (_, body) = app
        .post_json(
            "/api/evolution/sessions",
            Some("bob_smith"),
            json!({"basePrompt": "a lighthouse at dusk"}),
        )
        .await;
    let session_id = body["data"]["id"].as_str().unwrap().to_string();
    let (_, body) = app
        .post_json(
            &format!("/api/evolution/sessions/{}/generations", session_id),
            Some("bob_smith"),
            json!({"prompt": "mine", "imageUrl": "https://cdn.example.com/mine.png"}),
        )
        .await;
    let image_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .put(&format!("/api/evolution/favorites/{}", image_id), Some("bob_smith"))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .delete(&format!("/api/evolution/favorites/smith_{}", image_id), Some("bob"))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, favorites) = app.get("/api/evolution/favorites", Some("bob_smith")).await;
    assert_eq!(favorites["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_gallery_page_beyond_range_is_empty() {
    let app = TestApp::new();
    let session_id = start_session(&app, "anime").await;
    record(&app, &session_id, "only", None).await;

    let (status, body) = app
        .get("/api/evolution/gallery?page=18446744073709551615", Some(USER))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["data"].as_array().unwrap().is_empty());
    assert_eq!(body["data"]["meta"]["total"], 1);
}
