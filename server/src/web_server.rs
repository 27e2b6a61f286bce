use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    extract::{State, WebSocketUpgrade},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use tokio::sync::Mutex;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};

use lobby_common::defaults::WS_PATH;
use lobby_common::log;

use crate::broadcaster::Broadcaster;
use crate::connection_tracker::ConnectionTracker;
use crate::lobby_manager::LobbyManager;
use crate::ws_handler::handle_websocket;

#[derive(Clone)]
pub struct WebServerState {
    pub lobby_manager: LobbyManager,
    pub broadcaster: Broadcaster,
    pub tracker: ConnectionTracker,
    pub roster_lock: Arc<Mutex<()>>,
}

impl WebServerState {
    pub fn new(max_connections: usize) -> Self {
        Self {
            lobby_manager: LobbyManager::new(),
            broadcaster: Broadcaster::new(),
            tracker: ConnectionTracker::new(max_connections),
            roster_lock: Arc::new(Mutex::new(())),
        }
    }
}

pub fn router(state: WebServerState, static_files_path: PathBuf) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(WS_PATH, get(ws_upgrade_handler))
        .fallback_service(ServeDir::new(static_files_path))
        .layer(cors)
        .with_state(state)
}

pub async fn run_web_server(
    state: WebServerState,
    static_files_path: PathBuf,
    port: u16,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = router(state, static_files_path);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log!("Lobby server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

async fn ws_upgrade_handler(
    ws: WebSocketUpgrade,
    State(state): State<WebServerState>,
) -> Response {
    match state.tracker.try_acquire() {
        Some(slot) => ws
            .on_upgrade(move |socket| handle_websocket(socket, state, slot))
            .into_response(),
        None => {
            log!("Too many connections, rejecting new connection");
            (StatusCode::TOO_MANY_REQUESTS, "Too many connections").into_response()
        }
    }
}
