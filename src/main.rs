// author: kodeholic (powered by Claude)

use clap::Parser;
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::EnvFilter;

use concert_waitroom::{config, run_server, ServerArgs};

#[derive(Parser)]
#[command(
    name    = "wrserver",
    about   = "콘서트 티켓 대기실 서버",
    version,
)]
struct Cli {
    /// WS/HTTP 공용 포트
    #[arg(long, default_value_t = config::SIGNALING_PORT)]
    port: u16,

    /// key=value 설정 파일 경로 (CONCERTS_MAX_USERS_BEFORE_QUEUE)
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

#[tokio::main]
async fn main() {
    // 환경 변수 기반 로깅 초기화 (기본값: info)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    if let Err(e) = run_server(ServerArgs { port: cli.port, config_path: cli.config }).await {
        error!("[waitroom] server terminated: {}", e);
        std::process::exit(1);
    }
}
