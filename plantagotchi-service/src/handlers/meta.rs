use axum::Json;
use serde_json::{json, Value};

pub const SERVICE_NAME: &str = "plantagotchi";
pub const ENDPOINTS: [&str; 3] = ["/esplanta", "/especie", "/health"];

/// Service descriptor listing the available routes.
pub async fn root() -> Json<Value> {
    Json(json!({
        "ok": true,
        "service": SERVICE_NAME,
        "endpoints": ENDPOINTS,
    }))
}

/// Liveness probe.
pub async fn health_check() -> Json<Value> {
    Json(json!({ "ok": true }))
}
