use std::os::fd::AsRawFd;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::{debug, error, info};

use crate::buffer::BoundedBuffer;
use crate::error::ErrorCode;
use crate::server::connection::Connection;
use crate::server::poll;
use crate::server::registry::WorkerId;

/// Read-readiness poll interval of a worker.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// What a worker does when its socket becomes readable.
///
/// Any error ends the worker.
pub trait IncomingHandler: Send {
    fn on_incoming(&mut self, conn: &mut Connection) -> Result<(), ErrorCode>;
}

impl<F> IncomingHandler for F
where
    F: FnMut(&mut Connection) -> Result<(), ErrorCode> + Send,
{
    fn on_incoming(&mut self, conn: &mut Connection) -> Result<(), ErrorCode> {
        self(conn)
    }
}

/// Builds one handler per worker.
pub type HandlerFactory = Arc<dyn Fn() -> Box<dyn IncomingHandler> + Send + Sync>;

/// Sends every received byte straight back.
pub struct EchoHandler {
    buffer: BoundedBuffer,
}

impl EchoHandler {
    pub fn new() -> Self {
        Self {
            buffer: BoundedBuffer::new(),
        }
    }
}

impl Default for EchoHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl IncomingHandler for EchoHandler {
    fn on_incoming(&mut self, conn: &mut Connection) -> Result<(), ErrorCode> {
        self.buffer.clear();
        let received = conn.recv(self.buffer.unfilled_mut())?;
        self.buffer.advance(received)?;
        info!(peer = %conn.peer_addr(), "<-- {} bytes received", received);

        conn.send_all(self.buffer.as_slice())?;
        info!(peer = %conn.peer_addr(), "--> {} bytes sent", received);
        Ok(())
    }
}

/// Sets the finished flag when dropped, panics included.
struct FinishGuard(Arc<AtomicBool>);

impl Drop for FinishGuard {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Release);
    }
}

/// One connection's read/handle/write loop.
pub struct Worker {
    id: WorkerId,
    conn: Connection,
    handler: Box<dyn IncomingHandler>,
    running: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
    poll_interval: Duration,
}

impl Worker {
    pub fn new(
        id: WorkerId,
        conn: Connection,
        handler: Box<dyn IncomingHandler>,
        running: Arc<AtomicBool>,
        finished: Arc<AtomicBool>,
    ) -> Self {
        Self {
            id,
            conn,
            handler,
            running,
            finished,
            poll_interval: POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Runs until the server stops, the peer closes, or the handler fails.
    ///
    /// The connection is closed and the worker marked finished on return.
    pub fn run(self) {
        let Worker {
            id,
            mut conn,
            mut handler,
            running,
            finished,
            poll_interval,
        } = self;
        let _finished = FinishGuard(finished);
        let peer = conn.peer_addr();

        info!(worker = %id, %peer, "New client worker has been started");

        while running.load(Ordering::Acquire) {
            match poll::wait_readable(conn.as_raw_fd(), poll_interval) {
                Err(e) => {
                    error!(worker = %id, %peer, error = %e, "poll failed");
                    break;
                }
                Ok(false) => continue,
                Ok(true) => {
                    if let Err(e) = handler.on_incoming(&mut conn) {
                        match e {
                            ErrorCode::ClosedConnection => {
                                info!(worker = %id, %peer, "{}", e)
                            }
                            _ => error!(worker = %id, %peer, error = %e, "worker failed"),
                        }
                        break;
                    }
                }
            }
        }

        drop(conn);
        debug!(worker = %id, %peer, "worker finished");
    }
}
