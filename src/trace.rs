// author: kodeholic (powered by Claude)
//
// TraceHub — 대기실 입장 이벤트 실시간 관찰 버스
//
// 구조:
//   WaitingRoom(decide / release)
//       └── TraceHub::publish(event)
//               └── broadcast::Sender  (구독자 수에 무관하게 O(1) publish)
//                       ├── SSE subscriber (wrtrace 프로세스 1)
//                       └── SSE subscriber (wrtrace 프로세스 2)
//
// 구독자가 없을 때 publish는 그냥 drop (서버 성능에 무영향)
// 구독자가 느리면 lagged 에러 반환 — 구독자 쪽에서 처리

use std::sync::Arc;
use tokio::sync::broadcast;
use serde::Serialize;
use crate::utils::current_timestamp;

/// 브로드캐스트 채널 버퍼 크기
/// 구독자가 느릴 때 최대 보유 이벤트 수 — 초과 시 오래된 이벤트 drop
const TRACE_BUF: usize = 512;

// ----------------------------------------------------------------------------
// [TraceEvent]
// ----------------------------------------------------------------------------

/// 이벤트 종류
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TraceKind {
    /// 즉시 입장 (중복 연결 재승인 포함)
    Granted,
    /// 대기열 진입
    Queued,
    /// 대기열 선두 → 입장 승격
    Promoted,
    /// 입장자 퇴장
    Released,
    /// 대기자 이탈
    LeftQueue,
}

#[derive(Debug, Clone, Serialize)]
pub struct TraceEvent {
    /// Unix millis
    pub ts:         u64,
    pub concert_id: String,
    pub user_id:    String,
    pub kind:       TraceKind,
    /// 이벤트 요약 메시지
    pub summary:    String,
}

impl TraceEvent {
    pub fn new(kind: TraceKind, concert_id: &str, user_id: &str, summary: impl Into<String>) -> Self {
        Self {
            ts:         current_timestamp(),
            concert_id: concert_id.to_string(),
            user_id:    user_id.to_string(),
            kind,
            summary:    summary.into(),
        }
    }
}

// ----------------------------------------------------------------------------
// [TraceHub]
// ----------------------------------------------------------------------------

pub struct TraceHub {
    tx: broadcast::Sender<TraceEvent>,
}

impl TraceHub {
    pub fn new() -> Arc<Self> {
        let (tx, _) = broadcast::channel(TRACE_BUF);
        Arc::new(Self { tx })
    }

    /// 이벤트 publish — 구독자가 없으면 조용히 무시
    pub fn publish(&self, event: TraceEvent) {
        let _ = self.tx.send(event);
    }

    /// SSE 구독자 생성 — 각 HTTP 연결마다 호출
    pub fn subscribe(&self) -> broadcast::Receiver<TraceEvent> {
        self.tx.subscribe()
    }
}
