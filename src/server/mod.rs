//! Thread-per-connection TCP server.
//!
//! ```text
//!   Acceptor ──accept──► Connection ──spawn──► Worker thread
//!                                                 │ poll 1s / handle
//!                          Registry ◄──register───┘
//!                             ▲
//!   Reaper (1s tick) ─join finished workers─┘
//! ```
//!
//! A single atomic running flag is shared by the accept loop, every worker
//! and the reaper. Each of them rechecks it at its own timeout boundary, so
//! shutdown is cooperative and bounded by the longest wait.

pub mod acceptor;
pub mod connection;
pub mod limits;
pub mod poll;
pub mod registry;
pub mod worker;

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::buffer::BUFFER_CAPACITY;
use crate::config::Config;
use crate::error::ErrorCode;
use acceptor::{ACCEPT_TIMEOUT, Acceptor};
use connection::Connection;
use registry::{REAP_INTERVAL, Registry, WorkerId, WorkerRecord};
use worker::{EchoHandler, HandlerFactory, IncomingHandler, Worker};

/// Clears the running flag of a server from another thread.
#[derive(Clone)]
pub struct ShutdownHandle {
    running: Arc<AtomicBool>,
}

impl ShutdownHandle {
    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }
}

pub struct TcpServer {
    config: Config,
    acceptor: Acceptor,
    running: Arc<AtomicBool>,
    registry: Arc<Registry>,
    max_clients: usize,
    handlers: HandlerFactory,
    accept_timeout: Duration,
}

impl TcpServer {
    /// Binds the listening socket and marks the server running.
    ///
    /// `handlers` is called once per accepted connection to build that
    /// worker's incoming-data handler.
    pub fn bind(config: &Config, handlers: HandlerFactory) -> Result<Self, ErrorCode> {
        let max_clients = limits::clamp_max_clients(config.max_clients, BUFFER_CAPACITY);
        let acceptor = Acceptor::bind_and_listen(config.port, config.ipv4, max_clients)?;
        Ok(Self::from_acceptor(config, acceptor, max_clients, handlers))
    }

    /// A plain TCP echo server.
    pub fn echo(config: &Config) -> Result<Self, ErrorCode> {
        Self::bind(
            config,
            Arc::new(|| Box::new(EchoHandler::new()) as Box<dyn IncomingHandler>),
        )
    }

    /// Wraps an already listening acceptor.
    pub fn from_acceptor(
        config: &Config,
        acceptor: Acceptor,
        max_clients: usize,
        handlers: HandlerFactory,
    ) -> Self {
        info!(
            max_clients,
            family = %acceptor.family(),
            "Server is running"
        );
        Self {
            config: config.clone(),
            acceptor,
            running: Arc::new(AtomicBool::new(true)),
            registry: Arc::new(Registry::new()),
            max_clients,
            handlers,
            accept_timeout: ACCEPT_TIMEOUT,
        }
    }

    /// Overrides the accept wait, which also bounds how long shutdown takes
    /// to reach the accept loop.
    pub fn with_accept_timeout(mut self, timeout: Duration) -> Self {
        self.accept_timeout = timeout;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ErrorCode> {
        self.acceptor.local_addr()
    }

    pub fn max_clients(&self) -> usize {
        self.max_clients
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            running: Arc::clone(&self.running),
        }
    }

    pub fn accept(&self, timeout: Duration) -> Result<Connection, ErrorCode> {
        self.acceptor.accept(timeout)
    }

    /// Starts a worker thread for `conn` and registers it.
    pub fn spawn_worker(&self, conn: Connection) -> Result<WorkerId, ErrorCode> {
        let id = WorkerId::next();
        let info = conn.info();
        let finished = Arc::new(AtomicBool::new(false));
        let worker = Worker::new(
            id,
            conn,
            (self.handlers)(),
            Arc::clone(&self.running),
            Arc::clone(&finished),
        );

        debug!(worker = %id, peer = %info.peer, "Creating a new client worker");
        let handle = thread::Builder::new()
            .name(id.to_string())
            .spawn(move || worker.run())?;

        self.registry
            .register(WorkerRecord::new(id, info, handle, finished));
        Ok(id)
    }

    /// Starts the background reaper thread.
    pub fn spawn_reaper(&self) -> Result<JoinHandle<()>, ErrorCode> {
        let registry = Arc::clone(&self.registry);
        let running = Arc::clone(&self.running);
        let handle = thread::Builder::new()
            .name("reaper".to_string())
            .spawn(move || registry::run_reaper(registry, running, REAP_INTERVAL))?;
        Ok(handle)
    }

    /// Accept loop. Returns once the running flag is cleared.
    pub fn run(&self) {
        while self.is_running() {
            let conn = match self.accept(self.accept_timeout) {
                Ok(conn) => conn,
                Err(ErrorCode::Timeout) => continue,
                Err(e) => {
                    error!(error = %e, "accept failed");
                    continue;
                }
            };

            if !self.is_running() {
                break;
            }

            let live = self.registry.active();
            if live >= self.max_clients {
                warn!(
                    peer = %conn.peer_addr(),
                    live,
                    max_clients = self.max_clients,
                    "too many clients, dropping connection"
                );
                continue;
            }

            if let Err(e) = self.spawn_worker(conn) {
                error!(error = %e, "cannot start worker");
            }
        }
        info!("Accept loop stopped");
    }
}
