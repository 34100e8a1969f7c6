//! HTTP Server Module
//!
//! axumによる薄いHTTPラッパー。ルーティング・CORS・トレーシングの各ミドルウェアと
//! パラメータの受け渡しのみを担当し、すべての照会はQueryServiceへ委譲する。
//! 各ハンドラーはリクエスト開始時にスナップショットを1回取得し、
//! 同一世代に対して処理を完了する。

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::cache::DataCache;
use crate::error::CapMapError;
use crate::query::{
    self, ApplicationFilter, ApplicationList, ByCapabilityQuery, CapabilityApplications,
    CapabilityFilter, CapabilityList,
};

/// 共有アプリケーション状態
#[derive(Clone)]
pub struct AppState {
    /// プロセス全体のデータキャッシュ
    pub cache: Arc<DataCache>,
}

/// APIルーターを構築する
pub fn router(state: AppState) -> Router {
    // CORS: 開発用に全面許可
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/applications", get(applications))
        .route("/api/capabilities", get(capabilities))
        .route("/api/applications/by-capability", get(applications_by_capability))
        .route("/api/domains", get(domains))
        .route("/api/verticals", get(verticals))
        .route("/api/functions", get(functions))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// リクエストレベルのエラーレスポンス
///
/// 構造化JSON（`error`フィールド）と適切なステータスコードのみを返す。
/// スタックトレースは公開しない。
struct ApiError(CapMapError);

impl From<CapMapError> for ApiError {
    fn from(error: CapMapError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            CapMapError::MissingParameter(_) => StatusCode::BAD_REQUEST,
            CapMapError::FunctionNotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

/// GET /health
async fn health(State(state): State<AppState>) -> Json<Value> {
    let snapshot = state.cache.snapshot();
    Json(json!({
        "status": "OK",
        "excelLoaded": snapshot.loaded,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// GET /api/applications
async fn applications(
    State(state): State<AppState>,
    Query(filter): Query<ApplicationFilter>,
) -> Json<ApplicationList> {
    let snapshot = state.cache.snapshot();
    Json(query::list_applications(&snapshot, &filter))
}

/// GET /api/capabilities
async fn capabilities(
    State(state): State<AppState>,
    Query(filter): Query<CapabilityFilter>,
) -> Json<CapabilityList> {
    let snapshot = state.cache.snapshot();
    Json(query::list_capabilities(&snapshot, &filter))
}

/// GET /api/applications/by-capability
async fn applications_by_capability(
    State(state): State<AppState>,
    Query(params): Query<ByCapabilityQuery>,
) -> Result<Json<CapabilityApplications>, ApiError> {
    let snapshot = state.cache.snapshot();
    Ok(Json(query::applications_by_capability(&snapshot, &params)?))
}

/// GET /api/domains
async fn domains(State(state): State<AppState>) -> Json<Value> {
    let snapshot = state.cache.snapshot();
    Json(json!({ "domains": query::list_domains(&snapshot) }))
}

#[derive(Debug, Deserialize)]
struct VerticalsParams {
    domain: Option<String>,
}

/// GET /api/verticals
///
/// `domain`指定時はそのドメインの縦割り一覧、未指定時は全マッピングを返す。
async fn verticals(
    State(state): State<AppState>,
    Query(params): Query<VerticalsParams>,
) -> Json<Value> {
    let snapshot = state.cache.snapshot();
    match params.domain {
        Some(domain) => {
            let verticals = query::verticals_for(&snapshot, &domain);
            Json(json!({ "domain": domain, "verticals": verticals }))
        }
        None => Json(json!({ "verticals": &snapshot.verticals_by_domain })),
    }
}

#[derive(Debug, Deserialize)]
struct FunctionsParams {
    vertical: Option<String>,
}

/// GET /api/functions
///
/// `vertical`指定時はその縦割りの機能一覧、未指定時は全マッピングを返す。
async fn functions(
    State(state): State<AppState>,
    Query(params): Query<FunctionsParams>,
) -> Json<Value> {
    let snapshot = state.cache.snapshot();
    match params.vertical {
        Some(vertical) => {
            let functions = query::functions_for(&snapshot, &vertical);
            Json(json!({ "vertical": vertical, "functions": functions }))
        }
        None => Json(json!({ "functions": &snapshot.functions_by_vertical })),
    }
}
