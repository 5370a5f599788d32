// author: kodeholic (powered by Claude)
// 설정 조회/변경 핸들러
//   GET   /config/{key}   → { "value": "..." }
//   PATCH /config/{key}   ← { "value": "..." }
//
// 허용 키는 CONCERTS_MAX_USERS_BEFORE_QUEUE 하나. 변경은 파일에 즉시 반영되고
// 다음 입장 판단부터 적용된다 (기존 입장자는 유지).

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::info;

use crate::config;
use crate::error::RoomError;

use super::dto::{ConfigUpdate, ConfigValue};
use super::error_response;
use super::state::HttpState;

fn check_key(key: &str) -> Result<(), RoomError> {
    if key != config::MAX_USERS_KEY {
        return Err(RoomError::InvalidConfigKey(key.to_string()));
    }
    Ok(())
}

/// GET /config/{key}
pub async fn get_config_value(
    State(state): State<HttpState>,
    Path(key): Path<String>,
) -> impl IntoResponse {
    if let Err(e) = check_key(&key) {
        return error_response(e);
    }
    match state.settings.get(&key) {
        Ok(value) => Json(ConfigValue { value }).into_response(),
        Err(e)    => error_response(e),
    }
}

/// PATCH /config/{key}
pub async fn update_config_value(
    State(state): State<HttpState>,
    Path(key): Path<String>,
    Json(body): Json<ConfigUpdate>,
) -> impl IntoResponse {
    if let Err(e) = check_key(&key) {
        return error_response(e);
    }
    let value = match body.value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        Some(v) => v,
        None    => return error_response(RoomError::MissingParam("value")),
    };
    // 임계값은 0 이상의 정수만 허용
    if let Err(e) = value.parse::<usize>() {
        return error_response(RoomError::InvalidPayload(format!("{}={} ({})", key, value, e)));
    }
    if let Err(e) = state.settings.set(&key, &value) {
        return error_response(e);
    }

    info!("[settings] {} set to {} via API", key, value);
    (StatusCode::OK, Json(serde_json::json!({
        "message": "Configuration updated successfully"
    }))).into_response()
}
