// author: kodeholic (powered by Claude)
// Admin REST API 핸들러 (조회 전용)
//
//   GET /admin/status                  → 서버 상태 요약
//   GET /admin/concerts                → 콘서트 전체 목록 (입장/대기 인원)
//   GET /admin/concerts/{concert_id}   → 콘서트 상세 (입장자, 대기열 순번)
//
// 강제 퇴장 API는 두지 않는다 — 연결 종료만이 release 신호

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};

use crate::error::RoomError;
use crate::utils::current_timestamp;

use super::dto::*;
use super::error_response;
use super::state::HttpState;

/// GET /admin/status
pub async fn admin_status(State(state): State<HttpState>) -> impl IntoResponse {
    let uptime_secs = current_timestamp().saturating_sub(state.start_time_ms) / 1000;

    let concerts = state.waiting_room.all_concerts();
    let admitted_total = concerts.iter().map(|c| c.admitted_count()).sum();
    let queued_total   = concerts.iter().map(|c| c.queue_len()).sum();

    Json(ServerStatus {
        uptime_secs,
        concert_count: concerts.len(),
        admitted_total,
        queued_total,
        max_users: state.waiting_room.max_users(),
    })
}

/// GET /admin/concerts
pub async fn admin_list_concerts(State(state): State<HttpState>) -> impl IntoResponse {
    let mut list: Vec<AdminConcertSummary> = state.waiting_room
        .all_concerts()
        .into_iter()
        .map(|c| AdminConcertSummary {
            concert_id: c.concert_id.clone(),
            admitted:   c.admitted_count(),
            queued:     c.queue_len(),
            created_at: c.created_at,
        })
        .collect();
    list.sort_by(|a, b| a.concert_id.cmp(&b.concert_id));
    Json(list)
}

/// GET /admin/concerts/{concert_id}
pub async fn admin_get_concert(
    State(state): State<HttpState>,
    Path(concert_id): Path<String>,
) -> impl IntoResponse {
    let concert = match state.waiting_room.get(&concert_id) {
        Some(c) => c,
        None    => return error_response(RoomError::ConcertNotFound(concert_id)),
    };

    let now = current_timestamp();
    let queue: Vec<AdminQueueEntry> = concert.queued()
        .into_iter()
        .map(|q| AdminQueueEntry {
            user_id:   q.user_id,
            position:  q.position,
            queued_at: q.joined_at,
            wait_secs: now.saturating_sub(q.joined_at) / 1000,
        })
        .collect();

    Json(AdminConcertDetail {
        concert_id: concert.concert_id.clone(),
        created_at: concert.created_at,
        max_users:  state.waiting_room.max_users(),
        admitted:   concert.admitted_users(),
        queue,
    }).into_response()
}
