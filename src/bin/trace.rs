// author: kodeholic (powered by Claude)
//
// wrtrace — 콘서트 대기실 실시간 입장 이벤트 관찰 CLI
//
// 사용법:
//   wrtrace [--host HOST] [--port PORT] [--filter KIND] [CONCERT_ID]
//
// 예시:
//   wrtrace                          # 전체 이벤트 스트림
//   wrtrace X                        # 콘서트 X만
//   wrtrace --filter promoted        # 승격 이벤트만 (전체 콘서트)
//   wrtrace X --filter queue         # 콘서트 X + queued/left_queue

use clap::Parser;
use colored::Colorize;
use reqwest::blocking::Client;
use std::io::{BufRead, BufReader};

use serde::Deserialize;

// ----------------------------------------------------------------------------
// [CLI 인자]
// ----------------------------------------------------------------------------

#[derive(Parser)]
#[command(
    name    = "wrtrace",
    about   = "콘서트 대기실 입장 이벤트 스트림 관찰",
    version,
)]
struct Cli {
    /// 서버 호스트
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// 서버 포트
    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// 이벤트 종류 필터 (예: granted, queue, promoted)
    /// 대소문자 무관, kind 부분 일치
    #[arg(long, short = 'f')]
    filter: Option<String>,

    /// 관찰할 콘서트 ID (생략 시 전체)
    concert_id: Option<String>,
}

// ----------------------------------------------------------------------------
// [TraceEvent 역직렬화] — src/trace.rs와 동일 구조
// ----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TraceEvent {
    ts:         u64,
    concert_id: String,
    user_id:    String,
    kind:       String,   // granted | queued | promoted | released | left_queue
    summary:    String,
}

// ----------------------------------------------------------------------------
// [메인]
// ----------------------------------------------------------------------------

fn main() {
    let cli = Cli::parse();

    let url = match &cli.concert_id {
        Some(id) => format!("http://{}:{}/trace/{}", cli.host, cli.port, id),
        None     => format!("http://{}:{}/trace",   cli.host, cli.port),
    };

    let filter = cli.filter.as_ref().map(|s| s.to_lowercase());

    println!("{}", "─".repeat(90).dimmed());
    println!(
        "  {} {}  {}  {}",
        "wrtrace".bold().cyan(),
        "▶".green(),
        url.dimmed(),
        filter.as_deref()
            .map(|f| format!("[filter: {}]", f).yellow().to_string())
            .unwrap_or_default(),
    );
    println!("{}", "─".repeat(90).dimmed());
    println!(
        "  {:<12} {:<12} {:<20} {:<18} {}",
        "TIME".dimmed(),
        "KIND".dimmed(),
        "CONCERT".dimmed(),
        "USER".dimmed(),
        "SUMMARY".dimmed(),
    );
    println!("{}", "─".repeat(90).dimmed());

    // SSE 스트림 연결 (blocking, chunked read)
    let client = match Client::builder().timeout(None).build() {
        Ok(c)  => c,
        Err(e) => {
            eprintln!("{} HTTP client 생성 실패: {}", "✗".red(), e);
            std::process::exit(1);
        }
    };

    let resp = match client
        .get(&url)
        .header("Accept", "text/event-stream")
        .send()
    {
        Ok(r)  => r,
        Err(e) => {
            eprintln!("{} 서버 연결 실패: {}", "✗".red(), e);
            eprintln!("  서버가 실행 중인지 확인하세요: {}", url.dimmed());
            std::process::exit(1);
        }
    };

    if !resp.status().is_success() {
        eprintln!("{} HTTP {}", "✗".red(), resp.status());
        std::process::exit(1);
    }

    let reader = BufReader::new(resp);
    let mut event_count: u64 = 0;

    for line in reader.lines() {
        let line = match line {
            Ok(l)  => l,
            Err(e) => {
                eprintln!("{} 스트림 읽기 실패: {}", "✗".red(), e);
                break;
            }
        };

        // SSE 포맷: "data: {JSON}" 또는 ": keep-alive" 또는 빈 줄
        let json_str = match line.strip_prefix("data: ") {
            Some(rest) => rest,
            None       => continue,
        };

        let event: TraceEvent = match serde_json::from_str(json_str) {
            Ok(e)  => e,
            Err(e) => {
                eprintln!("{} JSON 파싱 실패: {} ({})", "⚠".yellow(), e, json_str);
                continue;
            }
        };

        if let Some(ref f) = filter {
            if !event.kind.to_lowercase().contains(f.as_str()) {
                continue;
            }
        }

        print_event(&event);
        event_count += 1;
    }

    println!("{}", "─".repeat(90).dimmed());
    println!("  스트림 종료 (총 {} 이벤트)", event_count);
}

// ----------------------------------------------------------------------------
// [이벤트 출력]
// ----------------------------------------------------------------------------

fn print_event(e: &TraceEvent) {
    println!(
        "  {} {:<12} {:<20} {:<18} {}",
        format_ts(e.ts).dimmed(),
        colorize_kind(&e.kind),
        truncate(&e.concert_id, 20).dimmed(),
        truncate(&e.user_id, 18).bright_white(),
        e.summary.dimmed(),
    );
}

fn colorize_kind(kind: &str) -> String {
    let padded = format!("{:<12}", kind);
    match kind {
        "granted"    => padded.bright_green().to_string(),
        "promoted"   => padded.bright_green().bold().to_string(),
        "queued"     => padded.bright_yellow().to_string(),
        "released"   => padded.bright_cyan().to_string(),
        "left_queue" => padded.bright_red().to_string(),
        _            => padded.normal().to_string(),
    }
}

/// Unix millis → "HH:MM:SS.mmm" (UTC)
fn format_ts(ts_ms: u64) -> String {
    let secs   = ts_ms / 1000;
    let millis = ts_ms % 1000;

    let total_secs_today = secs % 86400;
    let hh = total_secs_today / 3600;
    let mm = (total_secs_today % 3600) / 60;
    let ss = total_secs_today % 60;

    format!("{:02}:{:02}:{:02}.{:03}", hh, mm, ss, millis)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        format!("{:<width$}", s, width = max)
    } else {
        let head: String = s.chars().take(max - 1).collect();
        format!("{}…", head)
    }
}
