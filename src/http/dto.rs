// author: kodeholic (powered by Claude)
// HTTP 응답/요청 DTO — Admin / 설정 공용

use serde::{Deserialize, Serialize};

// ----------------------------------------------------------------------------
// [Admin]
// ----------------------------------------------------------------------------

/// GET /admin/status
#[derive(Serialize)]
pub struct ServerStatus {
    pub uptime_secs:    u64,
    pub concert_count:  usize,
    pub admitted_total: usize,
    pub queued_total:   usize,
    pub max_users:      usize, // 현재 임계값 (조회 시점에 새로 읽음)
}

/// GET /admin/concerts 아이템
#[derive(Serialize)]
pub struct AdminConcertSummary {
    pub concert_id: String,
    pub admitted:   usize,
    pub queued:     usize,
    pub created_at: u64,
}

/// GET /admin/concerts/{concert_id}
#[derive(Serialize)]
pub struct AdminConcertDetail {
    pub concert_id: String,
    pub created_at: u64,
    pub max_users:  usize,
    pub admitted:   Vec<String>,
    pub queue:      Vec<AdminQueueEntry>,
}

#[derive(Serialize)]
pub struct AdminQueueEntry {
    pub user_id:   String,
    pub position:  usize,
    pub queued_at: u64,
    pub wait_secs: u64,
}

// ----------------------------------------------------------------------------
// [설정]
// ----------------------------------------------------------------------------

/// GET /config/{key} 응답
#[derive(Serialize)]
pub struct ConfigValue {
    pub value: String,
}

/// PATCH /config/{key} 요청
#[derive(Deserialize)]
pub struct ConfigUpdate {
    #[serde(default)]
    pub value: Option<String>,
}
