//! Server assembly and lifecycle.

use std::{future::Future, net::SocketAddr, sync::Arc};

use axum::{Router, routing::get};
use hiroba_shared::time::MonotonicClock;
use thiserror::Error;
use tokio::{net::TcpListener, task::JoinHandle};
use tower_http::trace::TraceLayer;

use crate::{
    config::ServerConfig,
    domain::{PersistenceError, RoomFactory, RoomRepository, Timestamp},
    infrastructure::{
        ActivityLogHandler, BroadcastEngine, InMemoryIdentityProvider, InMemoryMessageRepository,
        InMemoryRoomRepository, InMemoryTransport, TokioJobDispatcher,
    },
    ui::{
        handler::{
            get_conversation, get_message, get_room_detail, get_rooms, health_check,
            websocket_handler,
        },
        signal::shutdown_signal,
        state::AppState,
    },
};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("Failed to seed rooms: {0}")]
    Seed(#[from] PersistenceError),

    #[error("Server error: {0}")]
    Serve(std::io::Error),
}

/// Handle to a server running in the background.
pub struct RunningServer {
    addr: SocketAddr,
    task: JoinHandle<Result<(), RunError>>,
}

impl RunningServer {
    /// Address actually bound (useful with port 0).
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Wait for the server to stop.
    pub async fn wait(self) -> Result<(), RunError> {
        match self.task.await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!("Server task failed: {}", e);
                Ok(())
            }
        }
    }
}

/// Run the server until Ctrl+C or SIGTERM.
pub async fn run(config: ServerConfig) -> Result<(), RunError> {
    let server = start(config, shutdown_signal()).await?;
    tracing::info!("Listening on {}", server.addr());
    server.wait().await
}

/// Bind, wire every component and serve in a background task until
/// `shutdown` resolves.
pub async fn start<F>(config: ServerConfig, shutdown: F) -> Result<RunningServer, RunError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(config.addr)
        .await
        .map_err(|source| RunError::Bind {
            addr: config.addr,
            source,
        })?;
    let addr = listener.local_addr().map_err(RunError::Serve)?;

    let engine = Arc::new(BroadcastEngine::new(Arc::new(InMemoryTransport::default())));
    let relay = engine.spawn_relay();
    let (dispatcher, _worker) = TokioJobDispatcher::spawn(Arc::new(ActivityLogHandler));

    let clock = Arc::new(MonotonicClock::new());
    let rooms = Arc::new(InMemoryRoomRepository::new());
    seed_rooms(rooms.as_ref(), &config, &clock).await?;

    let state = Arc::new(AppState {
        messages: Arc::new(InMemoryMessageRepository::new()),
        rooms,
        identities: Arc::new(InMemoryIdentityProvider::open(config.staff.iter().copied())),
        engine,
        dispatcher: Arc::new(dispatcher),
        clock,
        delivery_buffer: config.delivery_buffer,
    });
    tracing::info!(
        node_id = %state.engine.node_id(),
        delivery_buffer = state.delivery_buffer,
        staff = config.staff.len(),
        "Server state initialized"
    );

    let app = router(state);
    let task = tokio::spawn(async move {
        let result = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(RunError::Serve);
        relay.abort();
        tracing::info!("Server stopped");
        result
    });

    Ok(RunningServer { addr, task })
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/rooms", get(get_rooms))
        .route("/api/rooms/{room_id}", get(get_room_detail))
        .route("/api/messages/{message_id}", get(get_message))
        .route("/api/conversations/{a}/{b}", get(get_conversation))
        .route("/ws", get(websocket_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn seed_rooms(
    rooms: &dyn RoomRepository,
    config: &ServerConfig,
    clock: &MonotonicClock,
) -> Result<(), PersistenceError> {
    for (title, staff_only) in &config.seed_rooms {
        let room = rooms
            .insert(RoomFactory::draft(
                title,
                *staff_only,
                Timestamp::new(clock.now_millis()),
            ))
            .await?;
        tracing::debug!(room_id = %room.id, title = %room.title, staff_only, "Room created");
    }
    Ok(())
}
