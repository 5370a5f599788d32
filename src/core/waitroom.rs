// author: kodeholic (powered by Claude)
// WaitingRoom — 콘서트별 입장 집합(Admission Set) + 대기열(Wait Queue)
//
// 구조:
//   WaitingRoom
//     └── concerts: RwLock<HashMap<concert_id, Arc<ConcertRoom>>>
//             └── ConcertRoom.state: Mutex<RoomState { admitted, queue }>
//
// 락은 콘서트 단위로 샤딩 — 한 콘서트의 부하가 다른 콘서트를 막지 않는다.
// 락 구간 안의 송신은 모두 Session::push(try_send)라 블로킹되지 않는다.
//
// 불변식:
//   - |admitted| <= 마지막 입장 판단 시점의 max_users (임계값이 줄어도 기존 입장자는 유지)
//   - 대기열 순번 = 선두로부터의 1-based 거리, 바뀔 때마다 해당 세션에 갱신 통지
//   - 세션은 admitted / queue 중 정확히 한 곳에만 존재

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use tracing::{info, trace, warn};

use crate::error::RoomResult;
use crate::protocol::message::QueueMessage;
use crate::settings::MaxUsersSource;
use crate::trace::{TraceEvent, TraceHub, TraceKind};
use crate::utils::current_timestamp;

use super::session::Session;

// ----------------------------------------------------------------------------
// [판단 결과]
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Granted,
    Queued { position: usize },
}

/// release 1회의 결과 — 로그/테스트 확인용
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReleaseOutcome {
    /// 입장 집합에서 제거되었는지
    pub was_admitted: bool,
    /// 대기열에서 제거되었는지
    pub left_queue:   bool,
    /// 빈자리로 승격된 user_id
    pub promoted:     Option<String>,
    /// 순번 갱신 통지를 받은 세션 수
    pub renumbered:   usize,
}

// ----------------------------------------------------------------------------
// [ConcertRoom]
// ----------------------------------------------------------------------------

struct RoomState {
    admitted: Vec<Session>,
    queue:    VecDeque<Session>,
    /// reaper가 레지스트리에서 떼어낸 방. 이 방에는 더 이상 세션을 넣지 않는다
    retired:  bool,
}

impl RoomState {
    fn is_empty(&self) -> bool {
        self.admitted.is_empty() && self.queue.is_empty()
    }
}

/// 관리 조회용 대기자 스냅샷
#[derive(Debug, Clone)]
pub struct QueuedView {
    pub user_id:   String,
    pub position:  usize,
    pub joined_at: u64,
}

pub struct ConcertRoom {
    pub concert_id: String,
    pub created_at: u64,
    state:          Mutex<RoomState>,
}

impl ConcertRoom {
    fn new(concert_id: &str) -> Self {
        trace!("Creating ConcertRoom: {}", concert_id);
        Self {
            concert_id: concert_id.to_string(),
            created_at: current_timestamp(),
            state:      Mutex::new(RoomState {
                admitted: Vec::new(),
                queue:    VecDeque::new(),
                retired:  false,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RoomState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn admitted_count(&self) -> usize {
        self.lock().admitted.len()
    }

    pub fn queue_len(&self) -> usize {
        self.lock().queue.len()
    }

    pub fn admitted_users(&self) -> Vec<String> {
        self.lock().admitted.iter().map(|s| s.user_id.clone()).collect()
    }

    pub fn queued(&self) -> Vec<QueuedView> {
        self.lock().queue.iter()
            .enumerate()
            .map(|(idx, s)| QueuedView {
                user_id:   s.user_id.clone(),
                position:  idx + 1,
                joined_at: s.joined_at,
            })
            .collect()
    }
}

// ----------------------------------------------------------------------------
// [WaitingRoom] 레지스트리 + 입장 판단 + 퇴장 처리
// ----------------------------------------------------------------------------

pub struct WaitingRoom {
    concerts:  RwLock<HashMap<String, Arc<ConcertRoom>>>,
    limits:    Arc<dyn MaxUsersSource>,
    trace_hub: Arc<TraceHub>,
}

impl WaitingRoom {
    pub fn new(limits: Arc<dyn MaxUsersSource>, trace_hub: Arc<TraceHub>) -> Self {
        trace!("Initializing WaitingRoom");
        Self { concerts: RwLock::new(HashMap::new()), limits, trace_hub }
    }

    /// 현재 임계값 (매 호출마다 설정 저장소에서 새로 읽음)
    pub fn max_users(&self) -> usize {
        self.limits.current_max_users()
    }

    pub fn get(&self, concert_id: &str) -> Option<Arc<ConcertRoom>> {
        self.concerts.read().unwrap_or_else(PoisonError::into_inner).get(concert_id).cloned()
    }

    fn get_or_create(&self, concert_id: &str) -> Arc<ConcertRoom> {
        if let Some(room) = self.get(concert_id) {
            return room;
        }
        let mut concerts = self.concerts.write().unwrap_or_else(PoisonError::into_inner);
        let room = concerts.entry(concert_id.to_string())
            .or_insert_with(|| Arc::new(ConcertRoom::new(concert_id)));
        Arc::clone(room)
    }

    /// 전체 콘서트 목록 (관리 조회용)
    pub fn all_concerts(&self) -> Vec<Arc<ConcertRoom>> {
        self.concerts.read().unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    pub fn count(&self) -> usize {
        self.concerts.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// 입장 판단
    ///
    /// 1. 이미 입장한 user_id면 상태 변경 없이 재승인
    /// 2. 입장 인원 < max_users면 입장 집합에 추가
    /// 3. 아니면 대기열 끝에 추가, 순번 = 추가 후 길이
    ///
    /// 판단 결과는 isFirstMessage=true로 session 채널에 1회 전송한다.
    /// 전송 실패 시 SessionClosed를 돌려주며, 호출자는 즉시 release 해야 한다.
    pub fn decide(&self, concert_id: &str, session: Session) -> RoomResult<Admission> {
        loop {
            let room   = self.get_or_create(concert_id);
            let mut st = room.lock();
            if st.retired {
                // reaper가 방금 떼어낸 방 — 새 방으로 재시도
                continue;
            }

            if st.admitted.iter().any(|s| s.user_id == session.user_id) {
                trace!("[waitroom] user={} already admitted concert={}, re-grant", session.user_id, concert_id);
                self.trace_hub.publish(TraceEvent::new(
                    TraceKind::Granted, concert_id, &session.user_id, "re-grant (already admitted)",
                ));
                session.push(QueueMessage::granted(concert_id, true).to_json())?;
                return Ok(Admission::Granted);
            }

            let max_users = self.limits.current_max_users();

            let (admission, message) = if st.admitted.len() < max_users {
                st.admitted.push(session.clone());
                info!("[waitroom] user={} granted concert={} ({}/{})",
                    session.user_id, concert_id, st.admitted.len(), max_users);
                self.trace_hub.publish(TraceEvent::new(
                    TraceKind::Granted, concert_id, &session.user_id,
                    format!("{}/{}", st.admitted.len(), max_users),
                ));
                (Admission::Granted, QueueMessage::granted(concert_id, true))
            } else {
                st.queue.push_back(session.clone());
                let position = st.queue.len();
                info!("[waitroom] user={} queued concert={} position={}", session.user_id, concert_id, position);
                self.trace_hub.publish(TraceEvent::new(
                    TraceKind::Queued, concert_id, &session.user_id, format!("position {}", position),
                ));
                (Admission::Queued { position }, QueueMessage::in_queue(concert_id, position, true))
            };

            if let Err(e) = session.push(message.to_json()) {
                warn!("[waitroom] initial decision send failed: {}", e);
                return Err(e);
            }
            return Ok(admission);
        }
    }

    /// 퇴장 처리 — 채널 read loop 종료 시 정확히 1회 호출
    ///
    /// 1. 입장 집합에서 user_id 제거
    /// 2. 1에서 제거되었고 빈자리가 있으면(임계값 재조회) 대기열 선두 1명만 승격
    /// 3. 대기열에서 user_id 제거 (대기 중 이탈)
    /// 4. 대기열이 바뀌었으면 순번이 달라진 세션에만 in_queue 갱신 통지
    ///
    /// 두 번 호출해도 두 번째는 아무것도 하지 않는다.
    pub fn release(&self, concert_id: &str, user_id: &str) -> ReleaseOutcome {
        let mut outcome = ReleaseOutcome::default();

        let room = match self.get(concert_id) {
            Some(r) => r,
            None    => return outcome,
        };
        let mut st = room.lock();

        let before: HashMap<u64, usize> = st.queue.iter()
            .enumerate()
            .map(|(idx, s)| (s.session_id, idx + 1))
            .collect();
        let mut queue_changed = false;

        // 1. 입장 집합
        if let Some(idx) = st.admitted.iter().position(|s| s.user_id == user_id) {
            st.admitted.remove(idx);
            outcome.was_admitted = true;
            info!("[waitroom] user={} released concert={}", user_id, concert_id);
            self.trace_hub.publish(TraceEvent::new(
                TraceKind::Released, concert_id, user_id, format!("{} admitted left", st.admitted.len()),
            ));
        }

        // 2. 빈자리 1개당 승격 1명
        if outcome.was_admitted && st.admitted.len() < self.limits.current_max_users() {
            if let Some(next) = st.queue.pop_front() {
                if let Err(e) = next.push(QueueMessage::granted(concert_id, false).to_json()) {
                    warn!("[waitroom] promotion notice failed user={}: {}", next.user_id, e);
                }
                info!("[waitroom] user={} promoted concert={}", next.user_id, concert_id);
                self.trace_hub.publish(TraceEvent::new(
                    TraceKind::Promoted, concert_id, &next.user_id, format!("vacancy from {}", user_id),
                ));
                outcome.promoted = Some(next.user_id.clone());
                st.admitted.push(next);
                queue_changed = true;
            }
        }

        // 3. 대기열
        if let Some(idx) = st.queue.iter().position(|s| s.user_id == user_id) {
            st.queue.remove(idx);
            outcome.left_queue = true;
            queue_changed = true;
            info!("[waitroom] user={} left queue concert={} (was position {})", user_id, concert_id, idx + 1);
            self.trace_hub.publish(TraceEvent::new(
                TraceKind::LeftQueue, concert_id, user_id, format!("was position {}", idx + 1),
            ));
        }

        // 4. 순번 재계산
        if queue_changed {
            for (idx, s) in st.queue.iter().enumerate() {
                let position = idx + 1;
                if before.get(&s.session_id) == Some(&position) {
                    continue;
                }
                if let Err(e) = s.push(QueueMessage::in_queue(concert_id, position, false).to_json()) {
                    warn!("[waitroom] position update failed user={}: {}", s.user_id, e);
                }
                outcome.renumbered += 1;
            }
        }

        outcome
    }

    /// 입장자도 대기자도 없는 콘서트 항목 제거. 제거한 개수 반환
    ///
    /// 레지스트리 write 락 아래에서 방마다 비었는지 다시 확인하고 retired 표시 후 제거 —
    /// 동시에 decide가 같은 방을 잡고 있었다면 retired를 보고 새 방으로 재시도한다.
    pub fn prune_empty(&self) -> usize {
        let mut concerts = self.concerts.write().unwrap_or_else(PoisonError::into_inner);
        let before = concerts.len();
        concerts.retain(|concert_id, room| {
            let mut st = room.lock();
            if st.is_empty() {
                st.retired = true;
                trace!("[waitroom] concert={} pruned (empty)", concert_id);
                false
            } else {
                true
            }
        });
        before - concerts.len()
    }
}
