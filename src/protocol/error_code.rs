// author: kodeholic (powered by Claude)

use crate::error::RoomError;

/// 1xxx: 요청/입력
pub const MISSING_PARAM:      u16 = 1000;
pub const INVALID_PAYLOAD:    u16 = 1004;

/// 2xxx: 설정 저장소
pub const INVALID_CONFIG_KEY: u16 = 2000;
pub const CONFIG_KEY_MISSING: u16 = 2001;
pub const CONFIG_IO:          u16 = 2002;
pub const CONFIG_PARSE:       u16 = 2003;

/// 3xxx: 대기실
pub const CONCERT_NOT_FOUND:  u16 = 3000;
pub const SESSION_CLOSED:     u16 = 3001;

/// 4xxx: 채팅
pub const EMPTY_MESSAGE:      u16 = 4000;
pub const MESSAGE_TOO_LONG:   u16 = 4001;
pub const NOT_IN_ROOM:        u16 = 4002;

/// 9xxx: 서버 내부
pub const INTERNAL_ERROR:     u16 = 9000;

/// RoomError → 에러 코드 변환
/// 채팅 에러 프레임, HTTP 에러 바디 생성 시 사용
pub fn to_error_code(err: &RoomError) -> u16 {
    match err {
        RoomError::MissingParam(_)     => MISSING_PARAM,
        RoomError::InvalidPayload(_)   => INVALID_PAYLOAD,

        RoomError::InvalidConfigKey(_) => INVALID_CONFIG_KEY,
        RoomError::ConfigKeyMissing(_) => CONFIG_KEY_MISSING,
        RoomError::ConfigIo(_)         => CONFIG_IO,
        RoomError::ConfigParse(_)      => CONFIG_PARSE,

        RoomError::ConcertNotFound(_)  => CONCERT_NOT_FOUND,
        RoomError::SessionClosed(_)    => SESSION_CLOSED,

        RoomError::EmptyMessage        => EMPTY_MESSAGE,
        RoomError::MessageTooLong(_)   => MESSAGE_TOO_LONG,
        RoomError::NotInRoom           => NOT_IN_ROOM,

        RoomError::InternalError(_)    => INTERNAL_ERROR,
    }
}
