use tracing::debug;

use crate::error::ErrorCode;
use crate::http::request::{Method, Request};

/// Longest accepted request target.
pub const MAX_URI_LEN: usize = 2000;

const HTTP_VERSION: &str = "HTTP/1.1";
const CONTENT_SEPARATOR: &[u8] = b"\r\n\r\n";

/// Parses the request line of a raw PDU.
///
/// The bytes are split once on the first blank line; everything after it
/// becomes the request content. Only the first header line is interpreted,
/// tokenised on spaces into method, URI and an optional version.
pub fn parse_pdu(pdu: &[u8]) -> Result<Request, ErrorCode> {
    let (header_bytes, content) = match find_headers_end(pdu) {
        Some(end) => (&pdu[..end], &pdu[end + CONTENT_SEPARATOR.len()..]),
        None => (pdu, &pdu[pdu.len()..]),
    };

    let header = std::str::from_utf8(header_bytes).map_err(|_| ErrorCode::BadRequest)?;

    let request_line = header
        .split(['\r', '\n'])
        .find(|line| !line.is_empty())
        .ok_or(ErrorCode::BadRequest)?;

    let mut parts = request_line.split(' ').filter(|t| !t.is_empty());

    let method = parts
        .next()
        .and_then(Method::parse)
        .ok_or(ErrorCode::BadRequest)?;

    let uri = parts.next().ok_or(ErrorCode::BadRequest)?;
    let uri_len = uri.chars().count();
    if uri_len > MAX_URI_LEN {
        debug!(len = uri_len, "URI too long");
        return Err(ErrorCode::BadRequest);
    }

    // A request line without a version is still served.
    let version = parts.next().unwrap_or("");
    if version.len() > HTTP_VERSION.len() {
        return Err(ErrorCode::BadRequest);
    }

    Ok(Request {
        method,
        uri: uri.to_string(),
        version: version.to_string(),
        content: content.to_vec(),
    })
}

fn find_headers_end(buf: &[u8]) -> Option<usize> {
    buf.windows(CONTENT_SEPARATOR.len())
        .position(|w| w == CONTENT_SEPARATOR)
}
