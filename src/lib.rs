// author: kodeholic (powered by Claude)

pub mod config;
pub mod core;
pub mod error;
pub mod http;
pub mod liveness;
pub mod protocol;
pub mod reaper;
pub mod settings;
pub mod trace;
pub mod utils;

use axum::{routing::get, Router};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::core::{ChatHub, WaitingRoom};
use crate::http::HttpState;
use crate::protocol::{chat_ws_handler, queue_ws_handler, AppState};
use crate::settings::{FileSettings, MaxUsersSource};
use crate::trace::TraceHub;

/// CLI에서 주입되는 런타임 설정
/// - 기본값은 config.rs 상수
pub struct ServerArgs {
    pub port:        u16,
    pub config_path: PathBuf,
}

/// WS 진입점 + REST 라우터 구성
/// 테스트에서도 같은 구성으로 서버를 띄운다
pub fn build_router(app_state: AppState, http_state: HttpState) -> Router {
    let http_router = Router::new()
        .route("/admin/status",                get(http::admin_status))
        .route("/admin/concerts",              get(http::admin_list_concerts))
        .route("/admin/concerts/{concert_id}", get(http::admin_get_concert))
        .route("/config/{key}",                get(http::get_config_value).patch(http::update_config_value))
        .route("/trace",                       get(http::trace_stream))
        .route("/trace/{concert_id}",          get(http::trace_stream))
        .with_state(http_state);

    // CORS — 전체 허용 (브라우저 클라이언트 직접 접속)
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ws-queue", get(queue_ws_handler))
        .route("/ws-chat",  get(chat_ws_handler))
        .with_state(app_state)
        .merge(http_router)
        .layer(cors)
}

pub async fn run_server(args: ServerArgs) -> std::io::Result<()> {
    let settings  = Arc::new(FileSettings::new(args.config_path.clone()));
    let trace_hub = TraceHub::new();

    let limits: Arc<dyn MaxUsersSource> = settings.clone();
    let waiting_room = Arc::new(WaitingRoom::new(limits, Arc::clone(&trace_hub)));
    let chat_hub     = Arc::new(ChatHub::new());

    // 빈 콘서트 항목 정리 태스크
    tokio::spawn(reaper::run_concert_reaper(Arc::clone(&waiting_room)));

    let app_state  = AppState::new(Arc::clone(&waiting_room), chat_hub);
    let http_state = HttpState::new(Arc::clone(&waiting_room), Arc::clone(&settings), trace_hub);

    let app = build_router(app_state, http_state);

    let addr     = format!("0.0.0.0:{}", args.port);
    let listener = TcpListener::bind(&addr).await?;

    info!("[waitroom] Queue WS on ws://{}/ws-queue", addr);
    info!("[waitroom] Chat WS on ws://{}/ws-chat", addr);
    info!("[waitroom] Config file: {} (max_users now {})",
        settings.path().display(), waiting_room.max_users());

    axum::serve(listener, app).await
}
