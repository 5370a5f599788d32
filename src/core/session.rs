// author: kodeholic (powered by Claude)
// Session — (user_id, 송신 채널) 쌍
//
// 코어는 소켓에 직접 쓰지 않는다. 연결마다 egress writer 태스크가 mpsc 수신측을 비우고,
// 코어는 try_send로 프레임만 밀어 넣는다 → 방 락을 잡은 채 블로킹되는 일이 없다.

use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::warn;

use crate::error::{RoomError, RoomResult};
use crate::utils::current_timestamp;

/// egress writer로 넘기는 송신 프레임
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    /// 직렬화된 JSON 텍스트 프레임
    Text(String),
    /// 생존 확인 Ping 프레임
    Probe,
}

/// 세션 송신자 타입
pub type SessionTx = mpsc::Sender<Outbound>;

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Clone)]
pub struct Session {
    /// 프로세스 내 고유 ID — 같은 user_id의 연결끼리도 구분
    pub session_id: u64,
    pub user_id:    String,
    pub tx:         SessionTx,
    /// 세션 생성 시각 (Unix millis) — 대기 시간 표시용
    pub joined_at:  u64,
}

impl Session {
    pub fn new(user_id: &str, tx: SessionTx) -> Self {
        Self {
            session_id: NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed),
            user_id:    user_id.to_string(),
            tx,
            joined_at:  current_timestamp(),
        }
    }

    /// best-effort 텍스트 전송
    /// - 큐가 가득 차면 버리고 경고만 남김 (Ok)
    /// - 수신측이 닫혔으면 SessionClosed
    pub fn push(&self, json: String) -> RoomResult<()> {
        match self.tx.try_send(Outbound::Text(json)) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                warn!("[session] egress full, message dropped user={} session={}", self.user_id, self.session_id);
                Ok(())
            }
            Err(TrySendError::Closed(_)) => Err(RoomError::SessionClosed(self.user_id.clone())),
        }
    }
}
