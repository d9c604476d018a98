//! Request state machine.
//!
//! ```text
//!   ParseIncomingPdu ──GET──► HandleGetRequest ──► Done
//!          │                                        ▲
//!          └──────────── error / not GET ───────────┘
//! ```
//!
//! The machine works on the worker's [`BoundedBuffer`]: it starts with the
//! received bytes in it and leaves the complete response in it.

use std::path::{Component, Path, PathBuf};

use tracing::{debug, error};

use crate::buffer::BoundedBuffer;
use crate::compress;
use crate::error::ErrorCode;
use crate::http::mime::ContentType;
use crate::http::parser;
use crate::http::request::{Method, Request};
use crate::http::response::{self, ResponseHeader, StatusCode};

const INDEX_FILE: &str = "index.html";

/// Largest value the 8-digit Content-Length field holds. Used for the
/// header written before the compressed size is known.
const PLACEHOLDER_CONTENT_LENGTH: usize = 99_999_999;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsaState {
    ParseIncomingPdu,
    HandleGetRequest,
    Done,
}

pub struct RequestHandler<'a> {
    root: &'a Path,
    state: FsaState,
    request: Option<Request>,
    error: Option<ErrorCode>,
}

impl<'a> RequestHandler<'a> {
    pub fn new(root: &'a Path) -> Self {
        Self {
            root,
            state: FsaState::ParseIncomingPdu,
            request: None,
            error: None,
        }
    }

    pub fn state(&self) -> FsaState {
        self.state
    }

    /// The parsed request, once parsing succeeded.
    pub fn request(&self) -> Option<&Request> {
        self.request.as_ref()
    }

    /// The error answered with, if any.
    pub fn error(&self) -> Option<&ErrorCode> {
        self.error.as_ref()
    }

    /// Runs the machine to completion over `buffer`.
    pub fn process(&mut self, buffer: &mut BoundedBuffer) {
        self.state = FsaState::ParseIncomingPdu;
        loop {
            self.state = match self.state {
                FsaState::ParseIncomingPdu => self.parse_incoming_pdu(buffer),
                FsaState::HandleGetRequest => self.handle_get_request(buffer),
                FsaState::Done => {
                    self.done(buffer);
                    break;
                }
            };
        }
    }

    fn fail(&mut self, err: ErrorCode) -> FsaState {
        error!(error = %err, "request failed");
        self.error = Some(err);
        FsaState::Done
    }

    fn parse_incoming_pdu(&mut self, buffer: &BoundedBuffer) -> FsaState {
        let request = match parser::parse_pdu(buffer.as_slice()) {
            Ok(request) => request,
            Err(e) => return self.fail(e),
        };
        debug!(method = request.method.as_str(), uri = %request.uri, "request parsed");

        let method = request.method;
        self.request = Some(request);
        if method != Method::GET {
            return self.fail(ErrorCode::NotImplemented);
        }
        FsaState::HandleGetRequest
    }

    fn handle_get_request(&mut self, buffer: &mut BoundedBuffer) -> FsaState {
        let Some(request) = self.request.as_ref() else {
            return self.fail(ErrorCode::InternalServerError);
        };

        let path = match resolve(self.root, &request.uri) {
            Ok(path) => path,
            Err(e) => return self.fail(e),
        };
        debug!(path = %path.display(), "resolved");

        if path.is_dir() {
            return self.fail(ErrorCode::NotImplemented);
        }

        let content_type = ContentType::from_path(&path).as_str();
        let status = StatusCode::Ok.status_line();

        // First pass reserves the header; the length is only known after
        // compressing and always fits the same 8 digits.
        let placeholder = ResponseHeader {
            status: &status,
            encoding: "deflate",
            content_length: PLACEHOLDER_CONTENT_LENGTH,
            content_type,
        }
        .render();

        buffer.clear();
        if let Err(e) = buffer.write(placeholder.as_bytes()) {
            return self.fail(e);
        }

        let compressed = match compress::compress(&path, buffer) {
            Ok(n) => n,
            Err(e) => return self.fail(e),
        };

        let header = ResponseHeader {
            status: &status,
            encoding: "deflate",
            content_length: compressed,
            content_type,
        }
        .render();
        if let Err(e) = buffer.overwrite(0, header.as_bytes()) {
            return self.fail(e);
        }

        FsaState::Done
    }

    fn done(&mut self, buffer: &mut BoundedBuffer) {
        let Some(err) = self.error.as_ref() else {
            return;
        };

        let answer = response::error_response(err);
        buffer.clear();
        if buffer.write(&answer).is_err() {
            // Only reachable with a buffer smaller than an error page.
            error!(len = answer.len(), "error page does not fit into the buffer");
        }
    }
}

/// Maps a request target onto a file under `root`.
///
/// `/` means the index file; one leading slash is stripped otherwise.
/// Targets with `..` segments are refused.
fn resolve(root: &Path, uri: &str) -> Result<PathBuf, ErrorCode> {
    if uri == "/" {
        return Ok(root.join(INDEX_FILE));
    }

    let relative = Path::new(uri.strip_prefix('/').unwrap_or(uri));
    if relative
        .components()
        .any(|c| matches!(c, Component::ParentDir))
    {
        return Err(ErrorCode::Forbidden);
    }
    // A second leading slash would make `join` drop the root.
    if relative.has_root() {
        return Err(ErrorCode::Forbidden);
    }

    Ok(root.join(relative))
}
