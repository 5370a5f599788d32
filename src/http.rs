// author: kodeholic (powered by Claude)
//
// HTTP REST API 핸들러
//
// GET   /admin/status                 → 서버 상태 요약
// GET   /admin/concerts               → 콘서트 목록
// GET   /admin/concerts/{concert_id}  → 콘서트 상세
// GET   /config/{key}                 → 설정 값 조회
// PATCH /config/{key}                 → 설정 값 변경
// GET   /trace[/{concert_id}]         → 입장 이벤트 SSE

pub mod admin;
pub mod dto;
pub mod settings;
pub mod state;
pub mod trace;

pub use admin::{admin_get_concert, admin_list_concerts, admin_status};
pub use settings::{get_config_value, update_config_value};
pub use state::HttpState;
pub use trace::trace_stream;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::error::RoomError;
use crate::protocol::error_code::to_error_code;

/// RoomError → HTTP 상태 코드
pub fn status_for(err: &RoomError) -> StatusCode {
    match err {
        RoomError::MissingParam(_)
        | RoomError::InvalidPayload(_)
        | RoomError::InvalidConfigKey(_)  => StatusCode::BAD_REQUEST,
        RoomError::ConfigKeyMissing(_)
        | RoomError::ConcertNotFound(_)   => StatusCode::NOT_FOUND,
        _                                 => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// 에러 응답 바디: { "code": 2000, "error": "..." }
pub fn error_response(err: RoomError) -> Response {
    (status_for(&err), Json(serde_json::json!({
        "code":  to_error_code(&err),
        "error": err.to_string(),
    }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(status_for(&RoomError::InvalidConfigKey("X".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(&RoomError::ConfigKeyMissing("X".into())), StatusCode::NOT_FOUND);
        assert_eq!(status_for(&RoomError::ConcertNotFound("X".into())), StatusCode::NOT_FOUND);
        assert_eq!(
            status_for(&RoomError::ConfigIo(std::io::Error::other("disk"))),
            StatusCode::INTERNAL_SERVER_ERROR,
        );
    }
}
