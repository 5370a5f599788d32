use concert_waitroom::core::{Admission, Outbound, Session, WaitingRoom};
use concert_waitroom::protocol::message::{AdmissionStatus, QueueMessage};
use concert_waitroom::settings::FixedMaxUsers;
use concert_waitroom::trace::{TraceHub, TraceKind};
use std::sync::Arc;
use tokio::sync::mpsc;

fn setup(max: usize) -> (WaitingRoom, Arc<FixedMaxUsers>) {
    let limits = Arc::new(FixedMaxUsers::new(max));
    (WaitingRoom::new(limits.clone(), TraceHub::new()), limits)
}

fn join(room: &WaitingRoom, concert_id: &str, user_id: &str) -> (Admission, mpsc::Receiver<Outbound>) {
    let (tx, rx) = mpsc::channel(16);
    let admission = room.decide(concert_id, Session::new(user_id, tx)).unwrap();
    (admission, rx)
}

fn next(rx: &mut mpsc::Receiver<Outbound>) -> Option<QueueMessage> {
    match rx.try_recv().ok()? {
        Outbound::Text(json) => Some(serde_json::from_str(&json).unwrap()),
        Outbound::Probe      => None,
    }
}

fn sorted(mut v: Vec<String>) -> Vec<String> {
    v.sort();
    v
}

#[test]
fn test_grant_queue_and_promotion() {
    let (room, _) = setup(2);

    let (a1, mut r1) = join(&room, "X", "u1");
    let (a2, mut r2) = join(&room, "X", "u2");
    let (a3, mut r3) = join(&room, "X", "u3");

    assert_eq!(a1, Admission::Granted);
    assert_eq!(a2, Admission::Granted);
    assert_eq!(a3, Admission::Queued { position: 1 });

    assert_eq!(next(&mut r1).unwrap(), QueueMessage::granted("X", true));
    assert_eq!(next(&mut r2).unwrap(), QueueMessage::granted("X", true));
    assert_eq!(next(&mut r3).unwrap(), QueueMessage::in_queue("X", 1, true));

    // u1 퇴장 → u3 승격, 대기열 비움
    let outcome = room.release("X", "u1");
    assert!(outcome.was_admitted);
    assert_eq!(outcome.promoted.as_deref(), Some("u3"));
    assert_eq!(next(&mut r3).unwrap(), QueueMessage::granted("X", false));

    let concert = room.get("X").unwrap();
    assert_eq!(sorted(concert.admitted_users()), vec!["u2", "u3"]);
    assert_eq!(concert.queue_len(), 0);

    // u4 → 대기 1번
    let (a4, mut r4) = join(&room, "X", "u4");
    assert_eq!(a4, Admission::Queued { position: 1 });
    assert_eq!(next(&mut r4).unwrap(), QueueMessage::in_queue("X", 1, true));
    assert_eq!(sorted(concert.admitted_users()), vec!["u2", "u3"]);
}

#[test]
fn test_already_admitted_user_is_regranted_without_growth() {
    let (room, _) = setup(2);
    let (_, _r1) = join(&room, "X", "u1");
    let (_, _r2) = join(&room, "X", "u2");

    // u2의 두 번째 채널
    let (again, mut r2b) = join(&room, "X", "u2");
    assert_eq!(again, Admission::Granted);
    assert_eq!(next(&mut r2b).unwrap(), QueueMessage::granted("X", true));

    let concert = room.get("X").unwrap();
    assert_eq!(concert.admitted_count(), 2);
    assert_eq!(concert.queue_len(), 0);
}

#[test]
fn test_queue_is_fifo() {
    let (room, _) = setup(1);
    let (_, _r0) = join(&room, "X", "u0");
    let (_, mut ra) = join(&room, "X", "a");
    let (_, mut rb) = join(&room, "X", "b");
    let (_, mut rc) = join(&room, "X", "c");
    next(&mut ra);
    next(&mut rb);
    next(&mut rc);

    assert_eq!(room.release("X", "u0").promoted.as_deref(), Some("a"));
    assert_eq!(next(&mut ra).unwrap().status, AdmissionStatus::AccessGranted);
    assert_eq!(next(&mut rb).unwrap(), QueueMessage::in_queue("X", 1, false));
    assert_eq!(next(&mut rc).unwrap(), QueueMessage::in_queue("X", 2, false));

    assert_eq!(room.release("X", "a").promoted.as_deref(), Some("b"));
    assert_eq!(room.release("X", "b").promoted.as_deref(), Some("c"));
}

#[test]
fn test_one_promotion_per_vacancy_after_threshold_raise() {
    let (room, limits) = setup(1);
    let (_, _r0) = join(&room, "X", "u0");
    let (_, _r1) = join(&room, "X", "u1");
    let (_, _r2) = join(&room, "X", "u2");
    let (_, _r3) = join(&room, "X", "u3");

    // 임계값을 올려도 빈자리 1개에 승격은 1명
    limits.set(10);
    let outcome = room.release("X", "u0");
    assert_eq!(outcome.promoted.as_deref(), Some("u1"));

    let concert = room.get("X").unwrap();
    assert_eq!(concert.admitted_count(), 1);
    assert_eq!(concert.queue_len(), 2);

    // 새 도착자는 새 임계값으로 판단 — 대기열을 건너뛰어 바로 입장
    let (a4, _r4) = join(&room, "X", "u4");
    assert_eq!(a4, Admission::Granted);
}

#[test]
fn test_double_release_is_idempotent() {
    let (room, _) = setup(1);
    let (_, _r1) = join(&room, "X", "u1");
    let (_, mut r2) = join(&room, "X", "u2");
    next(&mut r2);

    let first = room.release("X", "u1");
    assert_eq!(first.promoted.as_deref(), Some("u2"));
    next(&mut r2);

    let second = room.release("X", "u1");
    assert!(!second.was_admitted);
    assert!(!second.left_queue);
    assert_eq!(second.promoted, None);
    assert!(next(&mut r2).is_none(), "두 번째 release는 통지를 만들지 않아야 합니다.");
    assert_eq!(room.get("X").unwrap().admitted_users(), vec!["u2"]);
}

#[test]
fn test_waiter_leaving_renumbers_each_affected_session_once() {
    let (room, _) = setup(1);
    let (_, _r0) = join(&room, "X", "u0");
    let (_, mut ra) = join(&room, "X", "a");
    let (_, mut rb) = join(&room, "X", "b");
    let (_, mut rc) = join(&room, "X", "c");
    let (_, mut rd) = join(&room, "X", "d");
    for rx in [&mut ra, &mut rb, &mut rc, &mut rd] {
        next(rx);
    }

    let outcome = room.release("X", "b");
    assert!(outcome.left_queue);
    assert_eq!(outcome.renumbered, 2);

    assert!(next(&mut ra).is_none(), "앞선 대기자는 통지를 받지 않아야 합니다.");
    assert_eq!(next(&mut rc).unwrap(), QueueMessage::in_queue("X", 2, false));
    assert!(next(&mut rc).is_none());
    assert_eq!(next(&mut rd).unwrap(), QueueMessage::in_queue("X", 3, false));
    assert!(next(&mut rd).is_none());
}

#[test]
fn test_concerts_are_independent() {
    let (room, _) = setup(1);
    let (a, _ra) = join(&room, "X", "u1");
    let (b, _rb) = join(&room, "Y", "u1");
    assert_eq!(a, Admission::Granted);
    assert_eq!(b, Admission::Granted);

    let (c, _rc) = join(&room, "X", "u2");
    assert_eq!(c, Admission::Queued { position: 1 });
    assert_eq!(room.get("Y").unwrap().queue_len(), 0);
    assert_eq!(room.count(), 2);
}

#[test]
fn test_trace_events_follow_decisions() {
    let limits = Arc::new(FixedMaxUsers::new(1));
    let hub    = TraceHub::new();
    let mut events = hub.subscribe();
    let room = WaitingRoom::new(limits, Arc::clone(&hub));

    let (_, _r1) = join(&room, "X", "u1");
    let (_, _r2) = join(&room, "X", "u2");
    room.release("X", "u1");

    let kinds: Vec<TraceKind> = std::iter::from_fn(|| events.try_recv().ok())
        .map(|e| e.kind)
        .collect();
    assert_eq!(kinds, vec![TraceKind::Granted, TraceKind::Queued, TraceKind::Released, TraceKind::Promoted]);
}

#[test]
fn test_concurrent_decisions_respect_threshold() {
    const MAX: usize = 3;
    const USERS: usize = 64;

    let (room, _) = setup(MAX);

    // 수신측은 테스트 끝까지 유지해야 전송 실패로 취급되지 않음
    let joined: Vec<(String, Admission, mpsc::Receiver<Outbound>)> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..USERS)
            .map(|i| {
                let room = &room;
                scope.spawn(move || {
                    let user_id = format!("u{}", i);
                    let (admission, rx) = join(room, "X", &user_id);
                    (user_id, admission, rx)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let concert = room.get("X").unwrap();
    assert_eq!(concert.admitted_count(), MAX);
    assert_eq!(concert.queue_len(), USERS - MAX);

    let granted = joined.iter().filter(|(_, a, _)| *a == Admission::Granted).count();
    assert_eq!(granted, MAX);

    // 최초 판단의 순번은 1..n 을 빠짐없이 한 번씩
    let mut positions: Vec<usize> = joined.iter()
        .filter_map(|(_, a, _)| match a {
            Admission::Queued { position } => Some(*position),
            Admission::Granted             => None,
        })
        .collect();
    positions.sort();
    assert_eq!(positions, (1..=USERS - MAX).collect::<Vec<_>>());

    let queued: Vec<usize> = concert.queued().iter().map(|q| q.position).collect();
    assert_eq!(queued, (1..=USERS - MAX).collect::<Vec<_>>());

    // 입장자 퇴장마다 대기열 선두 1명만 승격
    let heads: Vec<String> = concert.queued().iter().take(MAX).map(|q| q.user_id.clone()).collect();
    let mut promoted = Vec::new();
    for user_id in concert.admitted_users() {
        let outcome = room.release("X", &user_id);
        assert!(outcome.was_admitted);
        promoted.push(outcome.promoted.expect("빈자리마다 승격 1명"));
        assert_eq!(concert.admitted_count(), MAX);
    }
    assert_eq!(promoted, heads);
    assert_eq!(concert.queue_len(), USERS - 2 * MAX);
}
