//! The `Server<Stopped>` / `Server<Running>` typestate controlling the UDP
//! frontend's lifecycle, mirroring the same pattern used by the HTTP
//! frontend.
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::UdpSocket;
use tokio::task::JoinHandle;

use super::handlers::{self, Shared};

#[derive(Debug)]
pub enum UdpError {
    Error(String),
}

/// A UDP server with no socket bound.
pub struct Stopped {
    bind_to: SocketAddr,
}

/// A UDP server with an active receive loop.
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

    /// Binds the socket and spawns the receive loop: one `tokio::spawn` per
    /// datagram, so a slow pipeline call for one peer never delays decoding
    /// the next packet.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the socket cannot be bound.
    pub async fn start(self, shared: Arc<Shared>) -> Result<Server<Running>, std::io::Error> {
        let socket = Arc::new(UdpSocket::bind(self.state.bind_to).await?);
        let binding = socket.local_addr()?;

        let (halt_tx, mut halt_rx) = tokio::sync::oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let mut buf = vec![0u8; 65_507];
            loop {
                tokio::select! {
                    biased;
                    _ = &mut halt_rx => break,
                    received = socket.recv_from(&mut buf) => {
                        let Ok((len, peer_addr)) = received else { continue };
                        let packet = buf[..len].to_vec();
                        let socket = Arc::clone(&socket);
                        let shared = Arc::clone(&shared);
                        tokio::spawn(async move {
                            if let Some(reply) = handlers::handle_packet(&packet, peer_addr, &shared) {
                                let _ = socket.send_to(&reply, peer_addr).await;
                            }
                        });
                    }
                }
            }
            binding
        });

        tracing::info!(%binding, "udp tracker listening");

        Ok(Server {
            state: Running { binding, halt: halt_tx, task },
        })
    }
}

impl Server<Running> {
    /// Signals the receive loop to stop and waits for it to exit.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the halt signal could not be delivered, e.g. because
    /// the receive loop already exited on its own.
    pub async fn stop(self) -> Result<Server<Stopped>, UdpError> {
        self.state.halt.send(()).map_err(|()| UdpError::Error("udp receive loop already stopped".to_owned()))?;

        let bind_to = self.state.task.await.map_err(|e| UdpError::Error(e.to_string()))?;

        tracing::info!("udp tracker stopped");

        Ok(Server { state: Stopped { bind_to } })
    }
}
