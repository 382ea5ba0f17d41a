use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;
use tower::ServiceExt;

fn write_snapshot(dir: &std::path::Path) -> PathBuf {
    let courses = json!([
        {
            "id": 1001,
            "title": "Python Basics",
            "category": "Programming",
            "organization": "EduPath",
            "difficulty": "Beginner",
            "estimated_hours": 10.0,
            "rating": 4.5,
            "prerequisite_ids": []
        },
        {
            "id": 1002,
            "title": "Data Analysis with Python",
            "category": "Data Science",
            "organization": "EduPath",
            "difficulty": "Intermediate",
            "estimated_hours": 20.0,
            "rating": 4.7,
            "prerequisite_ids": [1001]
        },
        {
            "id": 1003,
            "title": "Machine Learning Fundamentals",
            "category": "AI",
            "organization": "EduPath",
            "difficulty": "Advanced",
            "estimated_hours": 30.0,
            "rating": 4.9,
            "prerequisite_ids": [1001, 1002]
        },
        {
            "id": 1004,
            "title": "French Cooking",
            "category": "Culinary",
            "organization": "EduPath",
            "difficulty": "Beginner",
            "estimated_hours": 5.0,
            "rating": 3.8,
            "prerequisite_ids": []
        }
    ]);
    let path = dir.join("courses.json");
    fs::write(&path, serde_json::to_string_pretty(&courses).unwrap()).unwrap();
    path
}

fn test_app(dir: &std::path::Path) -> Router {
    let snapshot = write_snapshot(dir);
    edupath_server::build_app(snapshot).unwrap()
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let req = Request::get(uri).body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn post(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let req = Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn health_reports_course_count() {
    let dir = tempdir().unwrap();
    let (status, body) = get(test_app(dir.path()), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["courses_loaded"], 4);
}

#[tokio::test]
async fn search_by_id_and_title() {
    let dir = tempdir().unwrap();

    let (status, body) = get(test_app(dir.path()), "/api/search?course_id=1002").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Data Analysis with Python");

    let (status, _) = get(test_app(dir.path()), "/api/search?course_id=9999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = get(test_app(dir.path()), "/api/search?title=python").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (status, _) = get(test_app(dir.path()), "/api/search").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn roadmap_levels_and_flat_path() {
    let dir = tempdir().unwrap();
    let (status, body) = get(test_app(dir.path()), "/api/roadmap/1003").await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["levels"].as_array().unwrap().len(), 1);
    let flat: Vec<u64> = data["flat_path"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_u64().unwrap())
        .collect();
    assert_eq!(flat, vec![1001, 1002]);
    assert_eq!(data["total_hours"], 30);
    assert_eq!(data["cycle_detected"], false);

    let (status, _) = get(test_app(dir.path()), "/api/roadmap/4242").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn similar_excludes_the_query_course() {
    let dir = tempdir().unwrap();
    let (status, body) =
        get(test_app(dir.path()), "/api/recommend/similar/1001?top_k=3").await;
    assert_eq!(status, StatusCode::OK);
    let results = body["data"].as_array().unwrap();
    assert!(results.len() <= 3);
    assert!(results.iter().all(|c| c["id"] != 1001));
}

#[tokio::test]
async fn smart_recommend_applies_filters() {
    let dir = tempdir().unwrap();
    let (status, body) = post(
        test_app(dir.path()),
        "/api/recommend/smart",
        json!({ "difficulty": "beginner", "min_rating": 4.0, "top_k": 5 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let results = body["data"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["id"], 1001);
}

#[tokio::test]
async fn career_rejects_unknown_goal() {
    let dir = tempdir().unwrap();
    let (status, body) = post(
        test_app(dir.path()),
        "/api/recommend/career",
        json!({ "career_goal": "Astronaut" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, body) = post(
        test_app(dir.path()),
        "/api/recommend/career",
        json!({ "career_goal": "Data Scientist" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].is_object());
}

#[tokio::test]
async fn skill_gap_reports_missing_prereqs() {
    let dir = tempdir().unwrap();
    let (status, body) = post(
        test_app(dir.path()),
        "/api/skill-gap",
        json!({ "target_course_id": 1003, "completed_course_ids": [1001] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    let missing: Vec<u64> = data["missing_courses"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_u64().unwrap())
        .collect();
    assert_eq!(missing, vec![1002]);
    assert_eq!(data["progress_percent"], 50.0);
    assert_eq!(data["total_required"], 2);
}

#[tokio::test]
async fn chat_finds_courses_by_topic() {
    let dir = tempdir().unwrap();
    let (status, body) = post(
        test_app(dir.path()),
        "/api/chat",
        json!({ "message": "Show me courses on python" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["intent"], "find_course");
    assert!(!body["courses"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn stats_aggregates_the_catalog() {
    let dir = tempdir().unwrap();
    let (status, body) = get(test_app(dir.path()), "/api/stats").await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["total_courses"], 4);
    assert_eq!(data["categories"]["Programming"], 1);
    assert_eq!(data["difficulties"]["Beginner"], 2);
}

#[tokio::test]
async fn reload_requires_the_admin_token() {
    let dir = tempdir().unwrap();
    std::env::set_var("ADMIN_TOKEN", "sekrit");
    let app = test_app(dir.path());

    let req = Request::post("/api/admin/reload")
        .header("X-ADMIN-TOKEN", "wrong")
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = Request::post("/api/admin/reload")
        .header("X-ADMIN-TOKEN", "sekrit")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}
