// author: kodeholic (powered by Claude)
// 대기실 WS 진입점 — GET /ws-queue?concertId=...&userId=...
//
// 연결 생명주기:
//   1. 업그레이드 전 식별자 검증 (없으면 400, 세션 미생성)
//   2. 입장 판단 → 최초 메시지 1회 전송
//   3. 생존 확인 태스크 시작
//   4. read loop (수신 내용은 무시, 종료 감지용)
//   5. read loop 종료 또는 writer 종료(쓰기 실패) → release 정확히 1회 (serve_until_closed)

use axum::{
    extract::{
        ws::{rejection::WebSocketUpgradeRejection, Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::{IntoResponse, Response},
};
use futures_util::stream::StreamExt;
use serde::Deserialize;
use std::future::Future;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{trace, warn};

use crate::config;
use crate::core::{Admission, Outbound, ReleaseOutcome, Session, WaitingRoom};
use crate::error::{RoomError, RoomResult};
use crate::http::error_response;
use crate::liveness::spawn_liveness;
use crate::protocol::{spawn_writer, AppState};

#[derive(Deserialize, Debug, Default)]
pub struct QueueParams {
    #[serde(rename = "concertId")]
    pub concert_id: Option<String>,
    #[serde(rename = "userId")]
    pub user_id:    Option<String>,
}

impl QueueParams {
    /// (concert_id, user_id) — 둘 다 비어있지 않아야 함
    pub fn validate(self) -> RoomResult<(String, String)> {
        let concert_id = self.concert_id.filter(|s| !s.is_empty())
            .ok_or(RoomError::MissingParam("concertId"))?;
        let user_id = self.user_id.filter(|s| !s.is_empty())
            .ok_or(RoomError::MissingParam("userId"))?;
        Ok((concert_id, user_id))
    }
}

pub async fn queue_ws_handler(
    Query(params): Query<QueueParams>,
    State(state):  State<AppState>,
    ws:            Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    let (concert_id, user_id) = match params.validate() {
        Ok(ids) => ids,
        Err(e)  => {
            warn!("[queue-ws] rejected before upgrade: {}", e);
            return error_response(e);
        }
    };

    match ws {
        Ok(ws)   => ws.on_upgrade(move |socket| handle_queue_socket(socket, state, concert_id, user_id)),
        Err(rej) => rej.into_response(),
    }
}

async fn handle_queue_socket(socket: WebSocket, state: AppState, concert_id: String, user_id: String) {
    let (ws_tx, mut ws_rx) = socket.split();
    let (tx, rx) = mpsc::channel::<Outbound>(config::EGRESS_QUEUE_SIZE);
    let mut writer = spawn_writer(ws_tx, rx);

    let session = Session::new(&user_id, tx.clone());
    if admit(&state.waiting_room, &concert_id, session).is_err() {
        writer.abort();
        return;
    }

    let liveness = spawn_liveness(concert_id.clone(), user_id.clone(), tx, state.liveness_interval);

    let read_loop = async {
        while let Some(msg) = ws_rx.next().await {
            match msg {
                Ok(Message::Close(_)) => break,
                Ok(_)                 => continue,
                Err(e) => {
                    warn!("[queue-ws] read error user={}: {}", user_id, e);
                    break;
                }
            }
        }
    };

    let outcome = serve_until_closed(&state.waiting_room, &concert_id, &user_id, read_loop, &mut writer).await;
    trace!("[queue-ws] release user={} concert={} {:?}", user_id, concert_id, outcome);

    liveness.abort();
    writer.abort();
}

/// 입장 판단. 최초 메시지를 보내지 못하면 그 자리에서 release 후 에러 반환
fn admit(waiting_room: &WaitingRoom, concert_id: &str, session: Session) -> RoomResult<Admission> {
    let user_id = session.user_id.clone();
    match waiting_room.decide(concert_id, session) {
        Ok(admission) => Ok(admission),
        Err(e) => {
            warn!("[queue-ws] decision not delivered user={} concert={}: {}", user_id, concert_id, e);
            waiting_room.release(concert_id, &user_id);
            Err(e)
        }
    }
}

/// read loop 종료(수신 측) 또는 writer 종료(쓰기 실패) 중 먼저 오는 쪽을 연결 종료로 보고
/// release를 정확히 1회 수행
async fn serve_until_closed<R>(
    waiting_room: &WaitingRoom,
    concert_id:   &str,
    user_id:      &str,
    read_loop:    R,
    writer:       &mut JoinHandle<()>,
) -> ReleaseOutcome
where
    R: Future<Output = ()>,
{
    tokio::select! {
        _ = read_loop => trace!("[queue-ws] read loop ended user={} concert={}", user_id, concert_id),
        _ = writer    => warn!("[queue-ws] writer ended, treating as closed user={} concert={}", user_id, concert_id),
    }
    waiting_room.release(concert_id, user_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::FixedMaxUsers;
    use crate::trace::TraceHub;
    use std::sync::Arc;
    use std::time::Duration;

    fn make_room(max: usize) -> WaitingRoom {
        WaitingRoom::new(Arc::new(FixedMaxUsers::new(max)), TraceHub::new())
    }

    fn make_session(user_id: &str) -> (Session, mpsc::Receiver<Outbound>) {
        let (tx, rx) = mpsc::channel(16);
        (Session::new(user_id, tx), rx)
    }

    #[tokio::test]
    async fn writer_exit_releases_and_promotes() {
        let room = make_room(1);
        let (s1, _r1) = make_session("u1");
        let (s2, _r2) = make_session("u2");
        admit(&room, "X", s1).unwrap();
        admit(&room, "X", s2).unwrap();

        // 쓰기 실패로 writer가 먼저 끝나고, read loop는 아직 살아있는 상황
        let mut writer = tokio::spawn(async {});
        let outcome = serve_until_closed(&room, "X", "u1", std::future::pending::<()>(), &mut writer).await;

        assert!(outcome.was_admitted);
        assert_eq!(outcome.promoted.as_deref(), Some("u2"));
        let concert = room.get("X").unwrap();
        assert_eq!(concert.admitted_users(), vec!["u2"]);
        assert_eq!(concert.queue_len(), 0);

        // 같은 user의 두 번째 release는 아무 일도 하지 않음
        assert_eq!(room.release("X", "u1"), ReleaseOutcome::default());
    }

    #[tokio::test]
    async fn read_loop_exit_releases_while_writer_alive() {
        let room = make_room(1);
        let (s1, _r1) = make_session("u1");
        admit(&room, "X", s1).unwrap();

        let mut writer = tokio::spawn(std::future::pending::<()>());
        let outcome = tokio::time::timeout(
            Duration::from_secs(1),
            serve_until_closed(&room, "X", "u1", async {}, &mut writer),
        ).await.unwrap();

        assert!(outcome.was_admitted);
        assert_eq!(room.get("X").unwrap().admitted_count(), 0);
        writer.abort();
    }

    #[test]
    fn undeliverable_decision_is_released_immediately() {
        let room = make_room(1);
        let (s1, _r1) = make_session("u1");
        admit(&room, "X", s1).unwrap();

        // 대기열로 들어가지만 최초 메시지를 받을 채널이 이미 닫힘
        let (s2, r2) = make_session("u2");
        drop(r2);
        assert!(matches!(admit(&room, "X", s2), Err(RoomError::SessionClosed(_))));

        let concert = room.get("X").unwrap();
        assert_eq!(concert.admitted_users(), vec!["u1"]);
        assert_eq!(concert.queue_len(), 0);
    }

    #[test]
    fn validate_requires_both_ids() {
        let ok = QueueParams { concert_id: Some("X".into()), user_id: Some("u1".into()) };
        assert_eq!(ok.validate().unwrap(), ("X".to_string(), "u1".to_string()));

        let no_user = QueueParams { concert_id: Some("X".into()), user_id: None };
        assert!(matches!(no_user.validate(), Err(RoomError::MissingParam("userId"))));

        let empty_concert = QueueParams { concert_id: Some(String::new()), user_id: Some("u1".into()) };
        assert!(matches!(empty_concert.validate(), Err(RoomError::MissingParam("concertId"))));
    }
}
