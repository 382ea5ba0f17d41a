pub mod career;
pub mod chat;

use anyhow::{Context, Result};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use edupath_core::catalog::Catalog;
use edupath_core::path::{resolve, DEFAULT_MAX_DEPTH};
use edupath_core::similarity::{recommend_by_filters, Filters, SimilarityModel};
use edupath_core::{Course, CourseId};
use parking_lot::RwLock;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// The catalog plus its derived similarity model, built together so a
/// reload swaps both at once.
pub struct Engine {
    pub catalog: Catalog,
    pub model: SimilarityModel,
}

impl Engine {
    /// Build from a JSON snapshot of already-cleaned courses. A duplicate
    /// id in the snapshot is the loader's bug and fails the build.
    pub fn from_snapshot(path: &std::path::Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading snapshot {}", path.display()))?;
        let courses: Vec<Course> =
            serde_json::from_str(&raw).context("parsing course snapshot")?;
        let catalog = Catalog::build(courses).context("building catalog")?;
        let model = SimilarityModel::build(&catalog);
        Ok(Self { catalog, model })
    }
}

#[derive(Clone)]
pub struct AppState {
    engine: Arc<RwLock<Arc<Engine>>>,
    snapshot_path: PathBuf,
    admin_token: Option<String>,
}

impl AppState {
    /// Snapshot of the active engine; a concurrent reload never affects a
    /// request that already holds its `Arc`.
    fn engine(&self) -> Arc<Engine> {
        self.engine.read().clone()
    }
}

pub fn build_app(snapshot: impl Into<PathBuf>) -> Result<Router> {
    let snapshot_path = snapshot.into();
    let engine = Engine::from_snapshot(&snapshot_path)?;
    let admin_token = std::env::var("ADMIN_TOKEN").ok();
    let state = AppState {
        engine: Arc::new(RwLock::new(Arc::new(engine))),
        snapshot_path,
        admin_token,
    };

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new()
                    .allow_origin(AllowOrigin::list(origins))
                    .allow_methods(Any)
                    .allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/api/search", get(search_handler))
        .route("/api/course/:id", get(course_handler))
        .route("/api/roadmap/:id", get(roadmap_handler))
        .route("/api/recommend/similar/:id", get(similar_handler))
        .route("/api/recommend/smart", post(smart_handler))
        .route("/api/recommend/career", post(career_handler))
        .route("/api/skill-gap", post(skill_gap_handler))
        .route("/api/stats", get(stats_handler))
        .route("/api/chat", post(chat_handler))
        .route("/api/admin/reload", post(reload_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);
    Ok(app)
}

type ApiResponse = (StatusCode, Json<Value>);

fn ok(data: Value) -> ApiResponse {
    (StatusCode::OK, Json(json!({ "success": true, "data": data })))
}

fn err(status: StatusCode, message: &str) -> ApiResponse {
    (status, Json(json!({ "success": false, "error": message })))
}

async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let engine = state.engine();
    Json(json!({ "status": "healthy", "courses_loaded": engine.catalog.len() }))
}

#[derive(Deserialize)]
struct SearchParams {
    course_id: Option<CourseId>,
    title: Option<String>,
}

async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResponse {
    let engine = state.engine();
    if let Some(id) = params.course_id {
        return match engine.catalog.lookup(id) {
            Some(course) => ok(json!(course)),
            None => err(StatusCode::NOT_FOUND, "Course not found"),
        };
    }
    if let Some(title) = params.title.as_deref().filter(|t| !t.trim().is_empty()) {
        return ok(json!(engine.catalog.search_title(title)));
    }
    err(StatusCode::BAD_REQUEST, "Provide course_id or title parameter")
}

async fn course_handler(
    State(state): State<AppState>,
    Path(id): Path<CourseId>,
) -> ApiResponse {
    let engine = state.engine();
    match engine.catalog.lookup_fast(id) {
        Some(course) => ok(json!(course)),
        None => err(StatusCode::NOT_FOUND, "Course not found"),
    }
}

#[derive(Deserialize)]
struct RoadmapParams {
    max_depth: Option<usize>,
}

async fn roadmap_handler(
    State(state): State<AppState>,
    Path(id): Path<CourseId>,
    Query(params): Query<RoadmapParams>,
) -> ApiResponse {
    let engine = state.engine();
    let depth = params.max_depth.unwrap_or(DEFAULT_MAX_DEPTH);
    match resolve(&engine.catalog, id, depth) {
        Some(path) => ok(json!(path)),
        None => err(StatusCode::NOT_FOUND, "Course not found"),
    }
}

#[derive(Deserialize)]
struct TopKParams {
    #[serde(default = "default_k")]
    top_k: usize,
}

fn default_k() -> usize {
    5
}

fn clamp_k(k: usize) -> usize {
    k.max(1).min(100)
}

async fn similar_handler(
    State(state): State<AppState>,
    Path(id): Path<CourseId>,
    Query(params): Query<TopKParams>,
) -> ApiResponse {
    let engine = state.engine();
    let results = engine
        .model
        .top_similar(&engine.catalog, id, clamp_k(params.top_k));
    ok(json!(results))
}

#[derive(Deserialize)]
struct SmartRequest {
    #[serde(flatten)]
    filters: Filters,
    #[serde(default = "default_k")]
    top_k: usize,
}

async fn smart_handler(
    State(state): State<AppState>,
    Json(req): Json<SmartRequest>,
) -> ApiResponse {
    let engine = state.engine();
    let results = recommend_by_filters(&engine.catalog, &req.filters, clamp_k(req.top_k));
    ok(json!(results))
}

#[derive(Deserialize)]
struct CareerRequest {
    #[serde(default)]
    career_goal: String,
}

async fn career_handler(
    State(state): State<AppState>,
    Json(req): Json<CareerRequest>,
) -> ApiResponse {
    let engine = state.engine();
    let Some(categories) = career::categories_for(&req.career_goal) else {
        let msg = format!(
            "Unknown career goal. Choose from: {}",
            career::goal_names().join(", ")
        );
        return err(StatusCode::BAD_REQUEST, &msg);
    };
    let mut roadmap: BTreeMap<&str, Vec<Course>> = BTreeMap::new();
    for cat in categories {
        let filters = Filters {
            category: Some((*cat).into()),
            ..Default::default()
        };
        roadmap.insert(*cat, recommend_by_filters(&engine.catalog, &filters, 5));
    }
    (
        StatusCode::OK,
        Json(json!({ "success": true, "career_goal": req.career_goal, "data": roadmap })),
    )
}

#[derive(Deserialize)]
struct SkillGapRequest {
    target_course_id: Option<CourseId>,
    #[serde(default)]
    completed_course_ids: Vec<CourseId>,
}

async fn skill_gap_handler(
    State(state): State<AppState>,
    Json(req): Json<SkillGapRequest>,
) -> ApiResponse {
    let engine = state.engine();
    let Some(target_id) = req.target_course_id else {
        return err(StatusCode::BAD_REQUEST, "target_course_id required");
    };
    let Some(path) = resolve(&engine.catalog, target_id, DEFAULT_MAX_DEPTH) else {
        return err(StatusCode::NOT_FOUND, "Target course not found");
    };

    let required: Vec<CourseId> = path.flat_path.iter().map(|c| c.id).collect();
    let completed: Vec<CourseId> = required
        .iter()
        .copied()
        .filter(|id| req.completed_course_ids.contains(id))
        .collect();
    let missing: Vec<&Course> = path
        .flat_path
        .iter()
        .filter(|c| !req.completed_course_ids.contains(&c.id))
        .collect();
    let progress = if required.is_empty() {
        100.0
    } else {
        completed.len() as f32 / required.len() as f32 * 100.0
    };
    let next_recommended: Vec<&Course> = missing.iter().take(3).copied().collect();

    ok(json!({
        "target": path.target,
        "missing_courses": missing,
        "completed_course_ids": completed,
        "progress_percent": (progress * 10.0).round() / 10.0,
        "next_recommended": next_recommended,
        "total_missing": missing.len(),
        "total_required": required.len(),
    }))
}

async fn stats_handler(State(state): State<AppState>) -> ApiResponse {
    let engine = state.engine();
    let all = engine.catalog.all();
    let mut categories: BTreeMap<String, u32> = BTreeMap::new();
    let mut difficulties: BTreeMap<String, u32> = BTreeMap::new();
    let mut total_hours = 0.0f32;
    let mut rating_sum = 0.0f32;
    for course in all {
        *categories.entry(course.category.clone()).or_insert(0) += 1;
        *difficulties.entry(course.difficulty.clone()).or_insert(0) += 1;
        total_hours += course.estimated_hours;
        rating_sum += course.rating;
    }
    let avg_rating = if all.is_empty() { 0.0 } else { rating_sum / all.len() as f32 };
    ok(json!({
        "total_courses": all.len(),
        "avg_rating": avg_rating,
        "total_hours": total_hours,
        "categories": categories,
        "difficulties": difficulties,
    }))
}

async fn chat_handler(
    State(state): State<AppState>,
    Json(req): Json<chat::ChatRequest>,
) -> Json<chat::ChatResponse> {
    let engine = state.engine();
    Json(chat::respond(&engine, &req))
}

/// Rebuild the engine from the snapshot file and swap it in whole. Readers
/// holding the previous `Arc` finish against the old engine.
async fn reload_handler(State(state): State<AppState>, headers: HeaderMap) -> ApiResponse {
    if let Err(resp) = authorize(&state, &headers) {
        return resp;
    }
    match Engine::from_snapshot(&state.snapshot_path) {
        Ok(engine) => {
            let count = engine.catalog.len();
            *state.engine.write() = Arc::new(engine);
            tracing::info!(courses_loaded = count, "engine reloaded");
            ok(json!({ "courses_loaded": count }))
        }
        Err(e) => err(StatusCode::UNPROCESSABLE_ENTITY, &format!("reload failed: {e:#}")),
    }
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiResponse> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err(err(StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set")),
    };
    let provided = headers
        .get("X-ADMIN-TOKEN")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err(err(StatusCode::UNAUTHORIZED, "invalid admin token"))
    }
}
