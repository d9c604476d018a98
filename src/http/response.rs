use crate::error::ErrorCode;

/// Value of the `Server` header.
pub const SERVER_TOKEN: &str = "simple-http-server";

/// HTTP status codes the server answers with.
///
/// - `Ok` (200): File served
/// - `BadRequest` (400): Malformed request line
/// - `Forbidden` (403): Path escapes the served root
/// - `NotFound` (404): No such file
/// - `InternalServerError` (500): Server error
/// - `NotImplemented` (501): Method other than GET, or a directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 400 Bad Request
    BadRequest,
    /// 403 Forbidden
    Forbidden,
    /// 404 Not Found
    NotFound,
    /// 500 Internal Server Error
    InternalServerError,
    /// 501 Not Implemented
    NotImplemented,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use simple_http_server::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::NotFound.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::Forbidden => 403,
            StatusCode::NotFound => 404,
            StatusCode::InternalServerError => 500,
            StatusCode::NotImplemented => 501,
        }
    }

    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::Forbidden => "Forbidden",
            StatusCode::NotFound => "Not Found",
            StatusCode::InternalServerError => "Internal Server Error",
            StatusCode::NotImplemented => "Not Implemented",
        }
    }

    /// `"<code> <reason>"`, as it appears after `HTTP/1.1`.
    pub fn status_line(&self) -> String {
        format!("{} {}", self.as_u16(), self.reason_phrase())
    }
}

/// The fixed response header.
///
/// The content length is always rendered as eight zero-padded digits, so
/// the header length does not depend on the body and the header can be
/// rewritten in place once the body size is known.
#[derive(Debug, Clone)]
pub struct ResponseHeader<'a> {
    pub status: &'a str,
    pub encoding: &'a str,
    pub content_length: usize,
    pub content_type: &'a str,
}

impl ResponseHeader<'_> {
    pub fn render(&self) -> String {
        format!(
            "HTTP/1.1 {}\r\n\
             Server: {}\r\n\
             Content-Encoding: {}\r\n\
             Content-Length: {:08}\r\n\
             Content-Type: {}\r\n\
             \r\n",
            self.status, SERVER_TOKEN, self.encoding, self.content_length, self.content_type
        )
    }
}

/// Minimal HTML page using `message` as title, heading and text.
pub fn error_page(message: &str) -> String {
    format!(
        "<!DOCTYPE HTML PUBLIC \"-//IETF//DTD HTML 2.0//EN\">\
         <html>\
         <head>\t<title>{message}</title></head>\
         <body>\t<h1>{message}</h1>\t<p>{message}</p></body>\
         </html>"
    )
}

/// Header plus error page for `err`. The page is sent uncompressed.
pub fn error_response(err: &ErrorCode) -> Vec<u8> {
    let status = err.status().status_line();
    let page = error_page(&status);
    let header = ResponseHeader {
        status: &status,
        encoding: "identity",
        content_length: page.len(),
        content_type: "text/html",
    };

    let mut out = header.render().into_bytes();
    out.extend_from_slice(page.as_bytes());
    out
}
