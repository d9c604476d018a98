/// HTTP request methods.
///
/// Every method is recognised by the parser, but only GET is served; the
/// rest are answered with 501 Not Implemented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// OPTIONS - Describe communication options
    OPTIONS,
    /// GET - Retrieve a resource
    GET,
    /// HEAD - Like GET but without the response body
    HEAD,
    /// POST - Create or submit data
    POST,
    /// PUT - Replace a resource
    PUT,
    /// DELETE - Delete a resource
    DELETE,
    /// TRACE - Loop-back test
    TRACE,
    /// CONNECT - Open a tunnel
    CONNECT,
}

impl Method {
    /// The method table, in matching order.
    pub const ALL: [Method; 8] = [
        Method::OPTIONS,
        Method::GET,
        Method::HEAD,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::TRACE,
        Method::CONNECT,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::OPTIONS => "OPTIONS",
            Method::GET => "GET",
            Method::HEAD => "HEAD",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::TRACE => "TRACE",
            Method::CONNECT => "CONNECT",
        }
    }

    /// Matches the start of `token` against the method table.
    ///
    /// The comparison is case-sensitive and picks the longest method name
    /// that prefixes the token.
    ///
    /// # Example
    ///
    /// ```
    /// # use simple_http_server::http::request::Method;
    /// assert_eq!(Method::parse("GET"), Some(Method::GET));
    /// assert_eq!(Method::parse("get"), None);
    /// ```
    pub fn parse(token: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .filter(|m| token.starts_with(m.as_str()))
            .max_by_key(|m| m.as_str().len())
            .copied()
    }
}

/// A parsed request line plus whatever followed the header block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    /// The request target as sent, e.g. "/index.html"
    pub uri: String,
    /// Protocol version, e.g. "HTTP/1.1"
    pub version: String,
    /// Everything after the blank line
    pub content: Vec<u8>,
}
