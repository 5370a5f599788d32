// author: kodeholic (powered by Claude)
//
// wradmin — 콘서트 대기실 운영 관리 CLI
//
// 사용법:
//   wradmin [--host HOST] [--port PORT] <COMMAND>
//
// 조회 명령
//   wradmin status                    서버 상태 요약 (uptime, 입장/대기 인원, 임계값)
//   wradmin concerts                  콘서트 전체 테이블
//   wradmin concerts <concert_id>     콘서트 상세 (입장자, 대기열)
//   wradmin config get                현재 동시 입장 허용 인원
//
// 조작 명령
//   wradmin config set <N>            동시 입장 허용 인원 변경 (다음 판단부터 적용)

use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::Deserialize;
use tabled::{Table, Tabled};

const MAX_USERS_KEY: &str = "CONCERTS_MAX_USERS_BEFORE_QUEUE";

// ----------------------------------------------------------------------------
// [CLI 정의]
// ----------------------------------------------------------------------------

#[derive(Parser)]
#[command(
    name    = "wradmin",
    about   = "콘서트 대기실 운영 관리 CLI",
    version,
)]
struct Cli {
    /// 서버 호스트
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// 서버 포트 (WS/HTTP 공용)
    #[arg(long, default_value_t = 8080)]
    port: u16,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 서버 상태 요약
    Status,

    /// 콘서트 목록 또는 상세
    Concerts {
        /// concert_id 지정 시 상세 보기
        concert_id: Option<String>,
    },

    /// 동시 입장 허용 인원 조회/변경
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// 현재 값 조회
    Get,
    /// 값 변경
    Set {
        /// 새 동시 입장 허용 인원
        value: usize,
    },
}

// ----------------------------------------------------------------------------
// [응답 타입] — http/dto.rs 와 대응
// ----------------------------------------------------------------------------

#[derive(Deserialize)]
struct ServerStatus {
    uptime_secs:    u64,
    concert_count:  usize,
    admitted_total: usize,
    queued_total:   usize,
    max_users:      usize,
}

#[derive(Deserialize, Tabled)]
struct AdminConcertSummary {
    #[tabled(rename = "CONCERT ID")]
    concert_id: String,
    #[tabled(rename = "ADMITTED")]
    admitted:   usize,
    #[tabled(rename = "QUEUED")]
    queued:     usize,
    #[tabled(skip)]
    #[allow(dead_code)]
    created_at: u64,
}

#[derive(Deserialize)]
struct AdminConcertDetail {
    concert_id: String,
    created_at: u64,
    max_users:  usize,
    admitted:   Vec<String>,
    queue:      Vec<AdminQueueEntry>,
}

#[derive(Deserialize, Tabled)]
struct AdminQueueEntry {
    #[tabled(rename = "POS")]
    position:  usize,
    #[tabled(rename = "USER ID")]
    user_id:   String,
    #[tabled(rename = "WAIT(s)")]
    wait_secs: u64,
    #[tabled(skip)]
    #[allow(dead_code)]
    queued_at: u64,
}

#[derive(Deserialize)]
struct ConfigValue {
    value: String,
}

// ----------------------------------------------------------------------------
// [main]
// ----------------------------------------------------------------------------

fn main() {
    let cli = Cli::parse();
    let base = format!("http://{}:{}", cli.host, cli.port);

    let result = match &cli.command {
        Command::Status                                  => cmd_status(&base),
        Command::Concerts { concert_id: None }           => cmd_concerts(&base),
        Command::Concerts { concert_id: Some(cid) }      => cmd_concert_detail(&base, cid),
        Command::Config { action: ConfigAction::Get }    => cmd_config_get(&base),
        Command::Config { action: ConfigAction::Set { value } } => cmd_config_set(&base, *value),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "ERROR:".red().bold(), e);
        std::process::exit(1);
    }
}

// ----------------------------------------------------------------------------
// [커맨드 구현]
// ----------------------------------------------------------------------------

fn cmd_status(base: &str) -> Result<(), Box<dyn std::error::Error>> {
    let s: ServerStatus = get_json(&format!("{}/admin/status", base))?;

    let hours   = s.uptime_secs / 3600;
    let minutes = (s.uptime_secs % 3600) / 60;
    let secs    = s.uptime_secs % 60;

    println!();
    println!("{}", "  Concert Waitroom Status".bold().cyan());
    println!("  {}", "─".repeat(36).dimmed());
    println!("  {:16} {}",
        "Uptime:".bold(),
        format!("{}h {}m {}s", hours, minutes, secs).green()
    );
    println!("  {:16} {}", "Concerts:".bold(),  s.concert_count.to_string().yellow());
    println!("  {:16} {}", "Admitted:".bold(),  s.admitted_total.to_string().yellow());
    println!("  {:16} {}",
        "Queued:".bold(),
        if s.queued_total > 0 {
            s.queued_total.to_string().red().bold().to_string()
        } else {
            s.queued_total.to_string().dimmed().to_string()
        }
    );
    println!("  {:16} {}", "Max Users:".bold(), s.max_users.to_string().cyan());
    println!();
    Ok(())
}

fn cmd_concerts(base: &str) -> Result<(), Box<dyn std::error::Error>> {
    let concerts: Vec<AdminConcertSummary> = get_json(&format!("{}/admin/concerts", base))?;

    if concerts.is_empty() {
        println!("{}", "  대기실이 열린 콘서트 없음".dimmed());
        return Ok(());
    }

    println!();
    println!("{}", Table::new(&concerts));
    println!("  {} concert(s)", concerts.len());
    println!();
    Ok(())
}

fn cmd_concert_detail(base: &str, concert_id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let c: AdminConcertDetail = get_json(&format!("{}/admin/concerts/{}", base, concert_id))?;

    println!();
    println!("{}", format!("  Concert: {}", c.concert_id).bold().cyan());
    println!("  {}", "─".repeat(48).dimmed());
    println!("  {:18} {}", "Admitted:".bold(), format!("{}/{}", c.admitted.len(), c.max_users));
    println!("  {:18} {}", "Created:".bold(),  format_ts(c.created_at));

    println!();
    println!("{}", "  Admitted".bold());
    if c.admitted.is_empty() {
        println!("    {}", "(없음)".dimmed());
    } else {
        for u in &c.admitted {
            println!("    · {}", u.yellow());
        }
    }

    if !c.queue.is_empty() {
        println!();
        println!("{} ({})", "  Wait Queue".bold(), c.queue.len());
        println!("{}", Table::new(&c.queue).to_string()
            .lines()
            .map(|l| format!("  {}", l))
            .collect::<Vec<_>>()
            .join("\n"));
    }

    println!();
    Ok(())
}

fn cmd_config_get(base: &str) -> Result<(), Box<dyn std::error::Error>> {
    let v: ConfigValue = get_json(&format!("{}/config/{}", base, MAX_USERS_KEY))?;
    println!();
    println!("  {:16} {}", format!("{}:", MAX_USERS_KEY).bold(), v.value.cyan());
    println!();
    Ok(())
}

fn cmd_config_set(base: &str, value: usize) -> Result<(), Box<dyn std::error::Error>> {
    let client = reqwest::blocking::Client::new();
    let url    = format!("{}/config/{}", base, MAX_USERS_KEY);
    let resp   = client.patch(&url)
        .json(&serde_json::json!({ "value": value.to_string() }))
        .send()?;

    let status = resp.status();
    let body: serde_json::Value = resp.json().unwrap_or_default();

    if !status.is_success() {
        let msg = body["error"].as_str().unwrap_or("unknown error");
        return Err(format!("[{}] {}", status, msg).into());
    }

    println!();
    println!("  {} {}={}", "Config Updated".green().bold(), MAX_USERS_KEY, value.to_string().yellow());
    println!();
    Ok(())
}

// ----------------------------------------------------------------------------
// [공통 유틸]
// ----------------------------------------------------------------------------

/// GET 요청 + JSON 역직렬화
fn get_json<T: for<'de> serde::Deserialize<'de>>(url: &str) -> Result<T, Box<dyn std::error::Error>> {
    let resp = reqwest::blocking::get(url)?;
    let status = resp.status();
    if !status.is_success() {
        let body: serde_json::Value = resp.json().unwrap_or_default();
        let msg = body["error"].as_str().unwrap_or("unknown error");
        return Err(format!("[{}] {}", status, msg).into());
    }
    Ok(resp.json()?)
}

/// Unix millis → "day+N HH:MM:SS UTC" (운영 로그 참고용)
fn format_ts(ms: u64) -> String {
    if ms == 0 { return "-".to_string(); }
    let secs = ms / 1000;
    let s = secs % 60;
    let m = (secs / 60) % 60;
    let h = (secs / 3600) % 24;
    let d = secs / 86400;
    format!("day+{} {:02}:{:02}:{:02} UTC", d, h, m, s)
}
