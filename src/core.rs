// author: kodeholic (powered by Claude)
// 네트워크 로직과 분리된, 순수 상태 관리 모듈입니다.

pub mod chat;
pub mod session;
pub mod waitroom;

pub use chat::ChatHub;
pub use session::{Outbound, Session, SessionTx};
pub use waitroom::{Admission, ConcertRoom, QueuedView, ReleaseOutcome, WaitingRoom};
