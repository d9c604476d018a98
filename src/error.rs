//! Error kinds shared by the server core.
//!
//! Every fallible operation in the crate returns [`ErrorCode`]. The set of
//! kinds is closed: socket setup failures, registry misses, per-connection
//! failures and the protocol failures that end up as HTTP error pages.

use std::io;

use thiserror::Error;

use crate::http::response::StatusCode;

#[derive(Debug, Error)]
pub enum ErrorCode {
    #[error("Failed to create socket: {0}")]
    CreateSocket(#[source] io::Error),

    #[error("Failed to bind socket: {0}")]
    SocketNotBound(#[source] io::Error),

    #[error("Failed to listen socket: {0}")]
    ListenToSocket(#[source] io::Error),

    #[error("Failed to accept incoming connection: {0}")]
    AcceptConnection(#[source] io::Error),

    #[error("There is no such thread id in the thread list")]
    ThreadNotFound,

    #[error("The connection has been closed by the peer")]
    ClosedConnection,

    #[error("This should be a directory")]
    NotDirectory,

    #[error("400 Bad Request")]
    BadRequest,

    #[error("501 Not Implemented")]
    NotImplemented,

    #[error("404 Not Found")]
    FileNotFound,

    #[error("403 Forbidden")]
    Forbidden,

    #[error("Timeout expired")]
    Timeout,

    #[error("500 Internal Server Error")]
    InternalServerError,

    /// Low-level system call failure.
    #[error("{0}")]
    Os(#[from] io::Error),
}

impl ErrorCode {
    /// HTTP status reported to the client for this error.
    ///
    /// Anything that is not a protocol failure is reported as a 500.
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::BadRequest => StatusCode::BadRequest,
            ErrorCode::Forbidden => StatusCode::Forbidden,
            ErrorCode::FileNotFound => StatusCode::NotFound,
            ErrorCode::NotImplemented => StatusCode::NotImplemented,
            _ => StatusCode::InternalServerError,
        }
    }

    /// True for failures that are answered with an error page rather than
    /// tearing down the worker.
    pub fn is_protocol(&self) -> bool {
        matches!(
            self,
            ErrorCode::BadRequest
                | ErrorCode::NotImplemented
                | ErrorCode::FileNotFound
                | ErrorCode::Forbidden
                | ErrorCode::InternalServerError
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_errors_display_as_status_lines() {
        assert_eq!(ErrorCode::FileNotFound.to_string(), "404 Not Found");
        assert_eq!(ErrorCode::BadRequest.to_string(), "400 Bad Request");
        assert_eq!(ErrorCode::NotImplemented.status().as_u16(), 501);
    }

    #[test]
    fn infrastructure_errors_map_to_500() {
        let err = ErrorCode::Os(io::Error::from(io::ErrorKind::BrokenPipe));
        assert_eq!(err.status(), StatusCode::InternalServerError);
        assert!(!err.is_protocol());
        assert!(!ErrorCode::ClosedConnection.is_protocol());
    }
}
