//! The `Server<Stopped>` / `Server<Running>` typestate controlling the HTTP
//! frontend's lifecycle, mirroring [`crate::udp::server`].
use std::net::SocketAddr;
use std::sync::Arc;

use glowworm_hooks::Pipeline;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use super::routes;

#[derive(Debug)]
pub enum HttpError {
    Error(String),
}

/// Request-resolution state shared by every handler.
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub allow_ip_spoofing: bool,
    pub real_ip_header: Option<String>,
    pub read_timeout_ms: u64,
}

pub struct Stopped {
    bind_to: SocketAddr,
}

pub struct Running {
    pub binding: SocketAddr,
    halt: tokio::sync::oneshot::Sender<()>,
    task: JoinHandle<SocketAddr>,
}

pub struct Server<S> {
    pub state: S,
}

impl Server<Stopped> {
    #[must_use]
    pub fn new(bind_to: SocketAddr) -> Self {
        Self { state: Stopped { bind_to } }
    }

    /// Binds the listener and spawns the axum service with graceful
    /// shutdown wired to the returned handle's [`Server::stop`].
    ///
    /// # Errors
    ///
    /// Returns `Err` if the listener cannot be bound.
    pub async fn start(self, app_state: Arc<AppState>) -> Result<Server<Running>, std::io::Error> {
        let listener = TcpListener::bind(self.state.bind_to).await?;
        let binding = listener.local_addr()?;

        let (halt_tx, halt_rx) = tokio::sync::oneshot::channel::<()>();
        let read_timeout_ms = app_state.read_timeout_ms;
        let router = routes::router(app_state, read_timeout_ms);

        let task = tokio::spawn(async move {
            let service = router.into_make_service_with_connect_info::<SocketAddr>();
            axum::serve(listener, service)
                .with_graceful_shutdown(async {
                    let _ = halt_rx.await;
                })
                .await
                .expect("http server loop does not fail except on shutdown");
            binding
        });

        tracing::info!(%binding, "http tracker listening");

        Ok(Server { state: Running { binding, halt: halt_tx, task } })
    }
}

impl Server<Running> {
    /// Signals graceful shutdown and waits for in-flight requests to drain.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the halt signal could not be delivered, e.g. because
    /// the server task already exited on its own.
    pub async fn stop(self) -> Result<Server<Stopped>, HttpError> {
        self.state.halt.send(()).map_err(|()| HttpError::Error("http server already stopped".to_owned()))?;

        let bind_to = self.state.task.await.map_err(|e| HttpError::Error(e.to_string()))?;

        tracing::info!("http tracker stopped");

        Ok(Server { state: Stopped { bind_to } })
    }
}
