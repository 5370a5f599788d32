// author: kodeholic (powered by Claude)

use serde::{Deserialize, Serialize};

// ----------------------------------------------------------------------------
// [대기실] 입장 판단/갱신 메시지
// ----------------------------------------------------------------------------

/// 입장 상태
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AdmissionStatus {
    AccessGranted,
    InQueue,
}

/// 대기실 채널로 나가는 모든 판단/갱신 메시지
///
/// 예시:
///   { "status": "in_queue", "position": 3, "concertId": "X", "isFirstMessage": false }
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueueMessage {
    pub status:           AdmissionStatus,
    /// in_queue 일 때만 존재 (1부터 시작)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub position:         Option<usize>,
    pub concert_id:       String,
    /// 채널의 최초 판단이면 true, 이후 승격/순번 갱신은 false
    pub is_first_message: bool,
}

impl QueueMessage {
    pub fn granted(concert_id: &str, is_first_message: bool) -> Self {
        Self {
            status:     AdmissionStatus::AccessGranted,
            position:   None,
            concert_id: concert_id.to_string(),
            is_first_message,
        }
    }

    pub fn in_queue(concert_id: &str, position: usize, is_first_message: bool) -> Self {
        Self {
            status:     AdmissionStatus::InQueue,
            position:   Some(position),
            concert_id: concert_id.to_string(),
            is_first_message,
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

// ----------------------------------------------------------------------------
// [채팅] C→S
// ----------------------------------------------------------------------------

/// 연결 직후 첫 프레임 — 대화방 지정(또는 생성)
#[derive(Deserialize, Debug)]
pub struct ChatInitPayload {
    #[serde(default)]
    pub conversation_id: Option<String>,
    pub sender_id:       String,
    #[serde(default)]
    pub receiver_id:     Option<String>,
}

/// 이후 프레임 — 메시지 본문
#[derive(Deserialize, Debug)]
pub struct ChatMessagePayload {
    pub content: String,
}

// ----------------------------------------------------------------------------
// [채팅] S→C
// ----------------------------------------------------------------------------

/// 첫 프레임 응답. 새로 만든 대화방이면 sender/receiver도 돌려줌
#[derive(Serialize, Debug)]
pub struct ChatInitAck {
    pub conversation_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_id:       Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver_id:     Option<String>,
}

/// 대화방 브로드캐스트
#[derive(Serialize, Debug)]
pub struct ChatMessageEvent {
    pub conversation_id: String,
    pub sender_id:       String,
    pub content:         String,
    pub timestamp:       u64,
}

/// 에러 프레임
#[derive(Serialize, Debug)]
pub struct ErrorPayload {
    pub code:   u16,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn granted_omits_position() {
        let v: Value = serde_json::from_str(&QueueMessage::granted("X", true).to_json()).unwrap();
        assert_eq!(v, json!({ "status": "access_granted", "concertId": "X", "isFirstMessage": true }));
    }

    #[test]
    fn in_queue_carries_position() {
        let v: Value = serde_json::from_str(&QueueMessage::in_queue("X", 3, false).to_json()).unwrap();
        assert_eq!(v, json!({ "status": "in_queue", "position": 3, "concertId": "X", "isFirstMessage": false }));
    }

    #[test]
    fn chat_init_optional_fields() {
        let p: ChatInitPayload = serde_json::from_str(r#"{ "sender_id": "u1" }"#).unwrap();
        assert!(p.conversation_id.is_none());
        assert!(p.receiver_id.is_none());
        assert_eq!(p.sender_id, "u1");
    }
}
