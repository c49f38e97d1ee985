use axum::Json;
use serde_json::{json, Value};

/// GET /health - 健康检查
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "build_time": env!("BUILD_TIME"),
    }))
}
