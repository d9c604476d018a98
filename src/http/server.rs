use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{error, info};

use crate::buffer::BoundedBuffer;
use crate::config::Config;
use crate::error::ErrorCode;
use crate::http::fsa::RequestHandler;
use crate::server::TcpServer;
use crate::server::connection::Connection;
use crate::server::worker::{HandlerFactory, IncomingHandler};

/// Incoming-data handler of an HTTP worker.
///
/// Owns the worker's buffer, which is reused for every request on the
/// connection.
pub struct HttpHandler {
    root: Arc<PathBuf>,
    buffer: BoundedBuffer,
}

impl HttpHandler {
    pub fn new(root: Arc<PathBuf>) -> Self {
        Self::with_buffer(root, BoundedBuffer::new())
    }

    pub fn with_buffer(root: Arc<PathBuf>, buffer: BoundedBuffer) -> Self {
        Self { root, buffer }
    }

    /// Runs one request held in `pdu` and returns the response bytes.
    pub fn respond(&mut self, pdu: &[u8]) -> Result<&[u8], ErrorCode> {
        self.buffer.clear();
        self.buffer.write(pdu)?;
        self.process();
        Ok(self.buffer.as_slice())
    }

    /// Turns the request held in the buffer into the response, in place.
    fn process(&mut self) {
        RequestHandler::new(&self.root).process(&mut self.buffer);
    }
}

impl IncomingHandler for HttpHandler {
    fn on_incoming(&mut self, conn: &mut Connection) -> Result<(), ErrorCode> {
        self.buffer.clear();
        let received = conn.recv(self.buffer.unfilled_mut())?;
        self.buffer.advance(received)?;
        info!(peer = %conn.peer_addr(), "<-- {} bytes received", received);

        self.process();

        if let Err(e) = conn.send_all(self.buffer.as_slice()) {
            error!(peer = %conn.peer_addr(), error = %e, "send failed");
            return Err(e);
        }
        info!(peer = %conn.peer_addr(), "--> {} bytes sent", self.buffer.len());
        Ok(())
    }
}

/// Builds an HTTP server serving `config.root`.
///
/// Fails with [`ErrorCode::NotDirectory`] when the root is not a directory.
pub fn bind(config: &Config) -> Result<TcpServer, ErrorCode> {
    let root = check_root(&config.root)?;
    TcpServer::bind(config, handler_factory(root))
}

/// One [`HttpHandler`] per worker, all serving `root`.
pub fn handler_factory(root: PathBuf) -> HandlerFactory {
    let root = Arc::new(root);
    Arc::new(move || Box::new(HttpHandler::new(Arc::clone(&root))) as Box<dyn IncomingHandler>)
}

fn check_root(root: &Path) -> Result<PathBuf, ErrorCode> {
    if !root.is_dir() {
        error!(root = %root.display(), "served root is not a directory");
        return Err(ErrorCode::NotDirectory);
    }
    Ok(root.to_path_buf())
}
