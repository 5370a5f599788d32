// author: kodeholic (powered by Claude)
// 연결별 생존 확인 태스크
//
// 입장 판단 직후 시작, 입장/대기 여부와 무관하게 주기마다 Probe(Ping) 프레임을 egress 큐에 넣는다.
// 실제 소켓 쓰기는 writer 태스크가 하며, 쓰기가 실패하면 writer가 끝나고
// 연결 핸들러가 이를 연결 종료로 보고 release 한다.
// 여기서는 큐가 닫혔을 때(연결 정리 중) 로그 후 종료만 한다.

use std::time::Duration;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::{trace, warn};

use crate::core::{Outbound, SessionTx};

pub fn spawn_liveness(concert_id: String, user_id: String, tx: SessionTx, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(run_liveness(concert_id, user_id, tx, interval))
}

async fn run_liveness(concert_id: String, user_id: String, tx: SessionTx, interval: Duration) {
    let mut timer = tokio::time::interval(interval);
    timer.tick().await; // 첫 틱 skip (판단 메시지 직후 즉시 Ping 방지)

    loop {
        timer.tick().await;

        match tx.try_send(Outbound::Probe) {
            Ok(()) => trace!("[liveness] probe queued user={} concert={}", user_id, concert_id),
            Err(TrySendError::Full(_)) => {
                warn!("[liveness] egress full, probe skipped user={} concert={}", user_id, concert_id);
            }
            Err(TrySendError::Closed(_)) => {
                warn!("[liveness] probe failed, channel closed user={} concert={}", user_id, concert_id);
                break;
            }
        }
    }
}
