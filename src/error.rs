// author: kodeholic (powered by Gemini)

use std::fmt;

#[derive(Debug)]
pub enum RoomError {
    // 요청/입력
    MissingParam(&'static str),
    InvalidPayload(String),

    // 설정 저장소
    InvalidConfigKey(String),
    ConfigKeyMissing(String),
    ConfigIo(std::io::Error),
    ConfigParse(String),

    // 대기실
    ConcertNotFound(String),
    SessionClosed(String),

    // 채팅
    EmptyMessage,
    MessageTooLong(usize),
    NotInRoom,

    InternalError(String),
}

impl fmt::Display for RoomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoomError::MissingParam(name)     => write!(f, "Missing required parameter: {}", name),
            RoomError::InvalidPayload(msg)    => write!(f, "Invalid payload: {}", msg),
            RoomError::InvalidConfigKey(key)  => write!(f, "Invalid configuration key: {}", key),
            RoomError::ConfigKeyMissing(key)  => write!(f, "Configuration key not found: {}", key),
            RoomError::ConfigIo(err)          => write!(f, "Configuration I/O error: {}", err),
            RoomError::ConfigParse(msg)       => write!(f, "Configuration parse error: {}", msg),
            RoomError::ConcertNotFound(id)    => write!(f, "Concert not found: {}", id),
            RoomError::SessionClosed(user_id) => write!(f, "Session channel closed for user: {}", user_id),
            RoomError::EmptyMessage           => write!(f, "Message content is empty"),
            RoomError::MessageTooLong(len)    => write!(f, "Message too long: {} bytes", len),
            RoomError::NotInRoom              => write!(f, "Conversation not initialized"),
            RoomError::InternalError(msg)     => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for RoomError {}

impl From<std::io::Error> for RoomError {
    fn from(err: std::io::Error) -> Self {
        RoomError::ConfigIo(err)
    }
}

pub type RoomResult<T> = Result<T, RoomError>;
