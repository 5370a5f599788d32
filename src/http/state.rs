// author: kodeholic (powered by Claude)
// HttpState — HTTP 핸들러 공유 상태

use std::sync::Arc;

use crate::core::WaitingRoom;
use crate::settings::FileSettings;
use crate::trace::TraceHub;
use crate::utils::current_timestamp;

#[derive(Clone)]
pub struct HttpState {
    pub waiting_room:  Arc<WaitingRoom>,
    pub settings:      Arc<FileSettings>,
    pub trace_hub:     Arc<TraceHub>,
    /// 서버 프로세스 시작 시각 (Unix millis) — uptime 계산용
    pub start_time_ms: u64,
}

impl HttpState {
    pub fn new(
        waiting_room: Arc<WaitingRoom>,
        settings:     Arc<FileSettings>,
        trace_hub:    Arc<TraceHub>,
    ) -> Self {
        Self { waiting_room, settings, trace_hub, start_time_ms: current_timestamp() }
    }
}
