// author: kodeholic (powered by Claude)
// 채팅 릴레이 WS 진입점 — GET /ws-chat
//
// 입장 제한 없음. 첫 텍스트 프레임으로 대화방을 지정(없으면 생성)하고,
// 이후 프레임은 검증 후 대화방 전원에게 브로드캐스트한다. 메시지 저장은 하지 않는다.

use axum::{
    extract::{ws::{Message, WebSocket, WebSocketUpgrade}, State},
    response::Response,
};
use futures_util::stream::{SplitStream, StreamExt};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tracing::{info, trace, warn};

use crate::config;
use crate::core::{Outbound, SessionTx};
use crate::error::{RoomError, RoomResult};
use crate::protocol::{
    error_packet,
    message::{ChatInitAck, ChatInitPayload, ChatMessageEvent, ChatMessagePayload},
    spawn_writer, AppState,
};
use crate::utils::current_timestamp;

static NEXT_CONN_ID: AtomicU64 = AtomicU64::new(1);

pub async fn chat_ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(|socket| handle_chat_socket(socket, state))
}

async fn handle_chat_socket(socket: WebSocket, state: AppState) {
    let (ws_tx, mut ws_rx) = socket.split();
    let (tx, rx) = mpsc::channel::<Outbound>(config::EGRESS_QUEUE_SIZE);
    let writer  = spawn_writer(ws_tx, rx);
    let conn_id = NEXT_CONN_ID.fetch_add(1, Ordering::Relaxed);

    // 첫 프레임 — 대화방 지정
    let init = match next_text(&mut ws_rx).await {
        Some(text) => text,
        None       => {
            writer.abort();
            return;
        }
    };
    let init = match parse_init(&init) {
        Ok(p)  => p,
        Err(e) => {
            warn!("[chat] invalid init frame conn={}: {}", conn_id, e);
            let _ = tx.send(Outbound::Text(error_packet(&e))).await;
            drop(tx);
            let _ = writer.await;
            return;
        }
    };

    let created = init.conversation_id.is_none();
    let conversation_id = init.conversation_id.clone().unwrap_or_else(new_conversation_id);
    let sender_id       = init.sender_id.clone();

    state.chat_hub.join(&conversation_id, conn_id, tx.clone());
    info!("[chat] sender={} joined conversation={} (created={})", sender_id, conversation_id, created);

    let ack = ChatInitAck {
        conversation_id: conversation_id.clone(),
        sender_id:       if created { Some(init.sender_id) } else { None },
        receiver_id:     if created { init.receiver_id } else { None },
    };
    push(&tx, serde_json::to_string(&ack).unwrap_or_default());

    // 이후 프레임 — 브로드캐스트
    while let Some(text) = next_text(&mut ws_rx).await {
        match parse_message(&text) {
            Ok(content) => {
                let event = ChatMessageEvent {
                    conversation_id: conversation_id.clone(),
                    sender_id:       sender_id.clone(),
                    content,
                    timestamp:       current_timestamp(),
                };
                let json = serde_json::to_string(&event).unwrap_or_default();
                let delivered = state.chat_hub.broadcast(&conversation_id, &json);
                trace!("[chat] conversation={} message from {} delivered to {}", conversation_id, sender_id, delivered);
            }
            Err(e) => {
                warn!("[chat] rejected frame sender={}: {}", sender_id, e);
                push(&tx, error_packet(&e));
            }
        }
    }

    state.chat_hub.leave(&conversation_id, conn_id);
    info!("[chat] sender={} left conversation={}", sender_id, conversation_id);
    writer.abort();
}

// ----------------------------------------------------------------------------
// [내부 유틸]
// ----------------------------------------------------------------------------

/// 다음 텍스트 프레임. Close/에러/스트림 종료면 None
async fn next_text(ws_rx: &mut SplitStream<WebSocket>) -> Option<String> {
    while let Some(msg) = ws_rx.next().await {
        match msg {
            Ok(Message::Text(t))  => return Some(t.to_string()),
            Ok(Message::Close(_)) => return None,
            Ok(_)                 => continue,
            Err(e) => {
                warn!("[chat] read error: {}", e);
                return None;
            }
        }
    }
    None
}

fn push(tx: &SessionTx, json: String) {
    if let Err(e) = tx.try_send(Outbound::Text(json)) {
        warn!("[chat] send failed: {}", e);
    }
}

fn parse_init(text: &str) -> RoomResult<ChatInitPayload> {
    let payload: ChatInitPayload = match serde_json::from_str(text) {
        Ok(p)  => p,
        // 대화방 지정 전에 메시지부터 보낸 경우
        Err(_) if serde_json::from_str::<ChatMessagePayload>(text).is_ok() => return Err(RoomError::NotInRoom),
        Err(e) => return Err(RoomError::InvalidPayload(e.to_string())),
    };
    if payload.sender_id.is_empty() {
        return Err(RoomError::MissingParam("sender_id"));
    }
    Ok(payload)
}

fn parse_message(text: &str) -> RoomResult<String> {
    let payload: ChatMessagePayload = serde_json::from_str(text)
        .map_err(|e| RoomError::InvalidPayload(e.to_string()))?;
    if payload.content.trim().is_empty() {
        return Err(RoomError::EmptyMessage);
    }
    if payload.content.len() > config::MAX_MESSAGE_LENGTH {
        return Err(RoomError::MessageTooLong(payload.content.len()));
    }
    Ok(payload.content)
}

fn new_conversation_id() -> String {
    format!("conv_{:016x}", rand::random::<u64>())
}
