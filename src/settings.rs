// author: kodeholic (powered by Claude)
// 설정 저장소 접근자
//
// 운영자가 손으로 편집하는 key=value 텍스트 파일에서 동시 입장 허용 인원을 읽는다.
// 입장 판단/퇴장 처리 때마다 새로 읽으며 캐시하지 않는다.
// 어떤 실패든 DEFAULT_MAX_USERS로 대체 — 입장 판단은 항상 완료되어야 한다.
//
// 파일 포맷:
//   # 주석
//   CONCERTS_MAX_USERS_BEFORE_QUEUE=100

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tracing::{trace, warn};

use crate::config;
use crate::error::{RoomError, RoomResult};

// ----------------------------------------------------------------------------
// [접근자 계약]
// ----------------------------------------------------------------------------

/// 현재 동시 입장 허용 인원 공급자
pub trait MaxUsersSource: Send + Sync {
    /// 실패하지 않는다. 읽기 실패 시 구현체가 대체값을 돌려준다.
    fn current_max_users(&self) -> usize;
}

// ----------------------------------------------------------------------------
// [FileSettings] key=value 파일 기반
// ----------------------------------------------------------------------------

pub struct FileSettings {
    path:       PathBuf,
    write_lock: Mutex<()>,   // PATCH 동시 요청 간 파일 덮어쓰기 직렬화
}

impl FileSettings {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 파일 전체를 (key, value) 목록으로 로드 (파일 내 순서 유지)
    pub fn load(&self) -> RoomResult<Vec<(String, String)>> {
        let text = fs::read_to_string(&self.path)?;
        Ok(parse_config(&text))
    }

    pub fn get(&self, key: &str) -> RoomResult<String> {
        self.load()?
            .into_iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
            .ok_or_else(|| RoomError::ConfigKeyMissing(key.to_string()))
    }

    /// 값 갱신. 다른 키와 주석 줄은 그대로 두고 대상 줄만 교체, 없으면 끝에 추가
    pub fn set(&self, key: &str, value: &str) -> RoomResult<()> {
        let _guard = self.write_lock.lock()
            .map_err(|_| RoomError::InternalError("settings write lock poisoned".to_string()))?;

        let text = match fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };

        let mut replaced = false;
        let mut lines: Vec<String> = text.lines()
            .map(|line| match split_entry(line) {
                Some((k, _)) if k == key && !replaced => {
                    replaced = true;
                    format!("{}={}", key, value)
                }
                _ => line.to_string(),
            })
            .collect();
        if !replaced {
            lines.push(format!("{}={}", key, value));
        }

        let mut out = lines.join("\n");
        out.push('\n');
        fs::write(&self.path, out)?;
        trace!("[settings] {} updated to {} ({})", key, value, self.path.display());
        Ok(())
    }

    fn read_max_users(&self) -> RoomResult<usize> {
        let raw = self.get(config::MAX_USERS_KEY)?;
        raw.parse::<usize>()
            .map_err(|e| RoomError::ConfigParse(format!("{}={} ({})", config::MAX_USERS_KEY, raw, e)))
    }
}

impl MaxUsersSource for FileSettings {
    fn current_max_users(&self) -> usize {
        match self.read_max_users() {
            Ok(n)  => n,
            Err(e) => {
                warn!("[settings] {} — fallback max_users={}", e, config::DEFAULT_MAX_USERS);
                config::DEFAULT_MAX_USERS
            }
        }
    }
}

// ----------------------------------------------------------------------------
// [FixedMaxUsers] 메모리 값 — 테스트 및 파일 없는 구동용
// ----------------------------------------------------------------------------

pub struct FixedMaxUsers {
    value: AtomicUsize,
}

impl FixedMaxUsers {
    pub fn new(value: usize) -> Self {
        Self { value: AtomicUsize::new(value) }
    }

    /// 런타임 중 임계값 변경 (다음 판단부터 적용)
    pub fn set(&self, value: usize) {
        self.value.store(value, Ordering::Relaxed);
    }
}

impl MaxUsersSource for FixedMaxUsers {
    fn current_max_users(&self) -> usize {
        self.value.load(Ordering::Relaxed)
    }
}

// ----------------------------------------------------------------------------
// [파서]
// ----------------------------------------------------------------------------

/// 빈 줄과 '#' 주석 줄은 건너뛰고, '=' 없는 줄은 무시. 첫 '=' 기준으로 분리 후 trim
pub fn parse_config(text: &str) -> Vec<(String, String)> {
    text.lines()
        .filter_map(split_entry)
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn split_entry(line: &str) -> Option<(&str, &str)> {
    if line.trim().is_empty() || line.starts_with('#') {
        return None;
    }
    let (key, value) = line.split_once('=')?;
    Some((key.trim(), value.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn settings_with(content: &str) -> (tempfile::TempDir, FileSettings) {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("waitroom.config");
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        (dir, FileSettings::new(path))
    }

    #[test]
    fn parse_skips_comments_blank_and_malformed() {
        let parsed = parse_config("# comment\n\nA=1\nnot a pair\n B = two \nC=x=y\n");
        assert_eq!(parsed, vec![
            ("A".to_string(), "1".to_string()),
            ("B".to_string(), "two".to_string()),
            ("C".to_string(), "x=y".to_string()),
        ]);
    }

    #[test]
    fn reads_max_users_from_file() {
        let (_dir, s) = settings_with("CONCERTS_MAX_USERS_BEFORE_QUEUE=2\n");
        assert_eq!(s.current_max_users(), 2);
    }

    #[test]
    fn missing_file_falls_back_to_default() {
        let s = FileSettings::new("/nonexistent/dir/waitroom.config");
        assert_eq!(s.current_max_users(), config::DEFAULT_MAX_USERS);
    }

    #[test]
    fn non_integer_value_falls_back_to_default() {
        let (_dir, s) = settings_with("CONCERTS_MAX_USERS_BEFORE_QUEUE=lots\n");
        assert_eq!(s.current_max_users(), config::DEFAULT_MAX_USERS);
    }

    #[test]
    fn missing_key_falls_back_to_default() {
        let (_dir, s) = settings_with("OTHER=5\n");
        assert_eq!(s.current_max_users(), config::DEFAULT_MAX_USERS);
        assert!(matches!(s.get(config::MAX_USERS_KEY), Err(RoomError::ConfigKeyMissing(_))));
    }

    #[test]
    fn value_is_reread_on_every_call() {
        let (_dir, s) = settings_with("CONCERTS_MAX_USERS_BEFORE_QUEUE=3\n");
        assert_eq!(s.current_max_users(), 3);
        fs::write(s.path(), "CONCERTS_MAX_USERS_BEFORE_QUEUE=7\n").unwrap();
        assert_eq!(s.current_max_users(), 7);
    }

    #[test]
    fn set_preserves_other_lines() {
        let (_dir, s) = settings_with("# header\nOTHER=5\nCONCERTS_MAX_USERS_BEFORE_QUEUE=3\n");
        s.set(config::MAX_USERS_KEY, "9").unwrap();

        let text = fs::read_to_string(s.path()).unwrap();
        assert!(text.starts_with("# header\nOTHER=5\n"));
        assert_eq!(s.current_max_users(), 9);
    }

    #[test]
    fn set_appends_missing_key() {
        let (_dir, s) = settings_with("OTHER=5\n");
        s.set(config::MAX_USERS_KEY, "4").unwrap();
        assert_eq!(s.get("OTHER").unwrap(), "5");
        assert_eq!(s.current_max_users(), 4);
    }

    #[test]
    fn fixed_source_can_change_at_runtime() {
        let src = FixedMaxUsers::new(2);
        assert_eq!(src.current_max_users(), 2);
        src.set(5);
        assert_eq!(src.current_max_users(), 5);
    }
}
