// author: kodeholic (powered by Claude)

pub mod chat;
pub mod error_code;
pub mod message;
pub mod queue;

pub use chat::chat_ws_handler;
pub use queue::queue_ws_handler;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{sink::SinkExt, stream::SplitSink};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::config;
use crate::core::{ChatHub, Outbound, WaitingRoom};
use crate::error::RoomError;
use crate::protocol::{error_code::to_error_code, message::ErrorPayload};

// ----------------------------------------------------------------------------
// [공유 상태] WS 핸들러용
// ----------------------------------------------------------------------------

#[derive(Clone)]
pub struct AppState {
    pub waiting_room:      Arc<WaitingRoom>,
    pub chat_hub:          Arc<ChatHub>,
    /// 생존 확인 주기 (테스트에서 단축)
    pub liveness_interval: Duration,
}

impl AppState {
    pub fn new(waiting_room: Arc<WaitingRoom>, chat_hub: Arc<ChatHub>) -> Self {
        Self {
            waiting_room,
            chat_hub,
            liveness_interval: Duration::from_millis(config::LIVENESS_INTERVAL_MS),
        }
    }
}

// ----------------------------------------------------------------------------
// [egress writer] egress 큐 → WS 송신
// 소켓 쓰기 실패 시 종료 — 핸들러는 이 태스크 종료를 연결 종료로 취급
// ----------------------------------------------------------------------------

pub(crate) fn spawn_writer(
    mut ws_tx: SplitSink<WebSocket, Message>,
    mut rx:    mpsc::Receiver<Outbound>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            let msg = match frame {
                Outbound::Text(json) => Message::Text(json.into()),
                Outbound::Probe      => Message::Ping(Default::default()),
            };
            if let Err(e) = ws_tx.send(msg).await {
                warn!("[ws] write failed: {}", e);
                break;
            }
        }
    })
}

pub(crate) fn error_packet(err: &RoomError) -> String {
    serde_json::to_string(&ErrorPayload {
        code:   to_error_code(err),
        reason: err.to_string(),
    }).unwrap_or_default()
}
