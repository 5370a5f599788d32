// author: kodeholic (powered by Claude)
// ChatHub — 대화방별 연결 목록 + 브로드캐스트 라우팅 테이블
// 입장 제한 없음. 대기실과 같은 연결/송신 구조만 공유한다.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tracing::{trace, warn};

use super::session::{Outbound, SessionTx};

struct ChatMember {
    conn_id: u64,
    tx:      SessionTx,
}

pub struct ChatHub {
    rooms: RwLock<HashMap<String, Vec<ChatMember>>>,
}

impl ChatHub {
    pub fn new() -> Self {
        trace!("Initializing ChatHub");
        Self { rooms: RwLock::new(HashMap::new()) }
    }

    pub fn join(&self, conversation_id: &str, conn_id: u64, tx: SessionTx) {
        let mut rooms = self.rooms.write().unwrap_or_else(PoisonError::into_inner);
        rooms.entry(conversation_id.to_string())
            .or_default()
            .push(ChatMember { conn_id, tx });
        trace!("[chat] conn={} joined conversation={}", conn_id, conversation_id);
    }

    /// 연결 제거. 마지막 연결이 나가면 대화방 항목도 제거
    pub fn leave(&self, conversation_id: &str, conn_id: u64) {
        let mut rooms = self.rooms.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(members) = rooms.get_mut(conversation_id) {
            members.retain(|m| m.conn_id != conn_id);
            if members.is_empty() {
                rooms.remove(conversation_id);
            }
        }
        trace!("[chat] conn={} left conversation={}", conn_id, conversation_id);
    }

    /// 대화방 전원(발신자 포함)에게 전송. 전달 성공 수 반환
    pub fn broadcast(&self, conversation_id: &str, json: &str) -> usize {
        let rooms = self.rooms.read().unwrap_or_else(PoisonError::into_inner);
        let members = match rooms.get(conversation_id) {
            Some(m) => m,
            None    => return 0,
        };

        let mut delivered = 0;
        for member in members {
            match member.tx.try_send(Outbound::Text(json.to_string())) {
                Ok(()) => delivered += 1,
                Err(e) => warn!("[chat] broadcast failed conn={}: {}", member.conn_id, e),
            }
        }
        delivered
    }

    pub fn member_count(&self, conversation_id: &str) -> usize {
        self.rooms.read().unwrap_or_else(PoisonError::into_inner)
            .get(conversation_id)
            .map_or(0, Vec::len)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl Default for ChatHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn broadcast_reaches_every_member() {
        let hub = ChatHub::new();
        let (tx1, mut rx1) = mpsc::channel(4);
        let (tx2, mut rx2) = mpsc::channel(4);
        hub.join("c1", 1, tx1);
        hub.join("c1", 2, tx2);

        assert_eq!(hub.broadcast("c1", "hi"), 2);
        assert_eq!(rx1.try_recv().unwrap(), Outbound::Text("hi".to_string()));
        assert_eq!(rx2.try_recv().unwrap(), Outbound::Text("hi".to_string()));
    }

    #[test]
    fn rooms_are_isolated() {
        let hub = ChatHub::new();
        let (tx1, mut rx1) = mpsc::channel(4);
        let (tx2, _rx2)    = mpsc::channel(4);
        hub.join("c1", 1, tx1);
        hub.join("c2", 2, tx2);

        assert_eq!(hub.broadcast("c2", "hi"), 1);
        assert!(rx1.try_recv().is_err());
    }

    #[test]
    fn last_leave_removes_room() {
        let hub = ChatHub::new();
        let (tx, _rx) = mpsc::channel(4);
        hub.join("c1", 1, tx);
        assert_eq!(hub.member_count("c1"), 1);
        hub.leave("c1", 1);
        assert_eq!(hub.member_count("c1"), 0);
        assert_eq!(hub.room_count(), 0);
    }
}
