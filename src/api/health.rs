use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};

/// Liveness and build info / 健康检查与构建信息
pub async fn health() -> Json<Value> {
    Json(json!({
        "code": 200,
        "message": "success",
        "data": {
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION"),
            "build_time": env!("BUILD_TIME"),
            "server_time": Utc::now().to_rfc3339(),
        }
    }))
}
