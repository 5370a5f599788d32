// author: kodeholic (powered by Claude)
// 매직 넘버를 배제하고 대기실 전체의 동작과 한계를 제어하는 상수 모음입니다.

/// 웹소켓/REST 공용 TCP 포트
pub const SIGNALING_PORT: u16 = 8080;

/// 운영자가 직접 편집하는 key=value 설정 파일 기본 경로
pub const DEFAULT_CONFIG_PATH: &str = "config/waitroom.config";

/// 동시 입장 허용 인원을 담는 설정 키
pub const MAX_USERS_KEY: &str = "CONCERTS_MAX_USERS_BEFORE_QUEUE";

/// 설정 파일을 읽지 못하거나 값이 정수가 아닐 때 대체값
pub const DEFAULT_MAX_USERS: usize = 100;

/// 송신(Egress) 큐 사이즈.
/// 꽉 차면 락 보유자가 막히지 않도록 메시지를 버리고 로그만 남깁니다.
pub const EGRESS_QUEUE_SIZE: usize = 256;

/// 연결 생존 확인(Ping) 주기 (30초)
pub const LIVENESS_INTERVAL_MS: u64 = 30_000;

/// 빈 콘서트 항목 정리 주기 (60초)
pub const REAPER_INTERVAL_MS: u64 = 60_000;

/// 채팅 메시지 최대 길이 (bytes)
pub const MAX_MESSAGE_LENGTH: usize = 2_000;
