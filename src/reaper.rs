// author: kodeholic (powered by Claude)
// 빈 콘서트 항목 정리 태스크
//
// 입장자도 대기자도 없는 콘서트 항목을 레지스트리에서 제거한다.
// 살아있는 세션 정리는 하지 않는다 — 세션 종료는 연결 종료(read loop / writer)만이 신호.

use std::sync::Arc;
use tracing::info;

use crate::config;
use crate::core::WaitingRoom;

pub async fn run_concert_reaper(waiting_room: Arc<WaitingRoom>) {
    let interval  = tokio::time::Duration::from_millis(config::REAPER_INTERVAL_MS);
    let mut timer = tokio::time::interval(interval);
    timer.tick().await; // 첫 틱 skip (startup 시 즉시 실행 방지)

    info!("[reaper] Started (interval={}ms)", config::REAPER_INTERVAL_MS);

    loop {
        timer.tick().await;

        let pruned = waiting_room.prune_empty();
        if pruned > 0 {
            info!("[reaper] Pruned {} empty concert(s), {} remaining", pruned, waiting_room.count());
        }
    }
}
