use simple_http_server::error::ErrorCode;
use simple_http_server::http::parser::{MAX_URI_LEN, parse_pdu};
use simple_http_server::http::request::Method;

#[test]
fn test_parse_simple_get_request() {
    let req = parse_pdu(b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n").unwrap();

    assert_eq!(req.method, Method::GET);
    assert_eq!(req.uri, "/");
    assert_eq!(req.version, "HTTP/1.1");
}

#[test]
fn test_parse_post_request_with_body() {
    let req = parse_pdu(b"POST /api HTTP/1.1\r\nHost: localhost\r\nContent-Length: 5\r\n\r\nhello").unwrap();

    assert_eq!(req.method, Method::POST);
    assert_eq!(req.uri, "/api");
    assert_eq!(req.content, b"hello".to_vec());
}

#[test]
fn test_parse_request_with_path_and_query_string() {
    let req = parse_pdu(b"GET /search?q=rust HTTP/1.1\r\n\r\n").unwrap();
    assert_eq!(req.uri, "/search?q=rust");
}

#[test]
fn test_parse_without_blank_line_has_no_content() {
    let req = parse_pdu(b"GET /a.css HTTP/1.1\r\nHost: example.com\r\n").unwrap();
    assert_eq!(req.uri, "/a.css");
    assert!(req.content.is_empty());
}

#[test]
fn test_parse_invalid_http_method() {
    let result = parse_pdu(b"INVALID / HTTP/1.1\r\n\r\n");
    assert!(matches!(result, Err(ErrorCode::BadRequest)));
}

#[test]
fn test_parse_method_is_case_sensitive() {
    let result = parse_pdu(b"get / HTTP/1.1\r\n\r\n");
    assert!(matches!(result, Err(ErrorCode::BadRequest)));
}

#[test]
fn test_parse_method_matches_by_prefix() {
    let req = parse_pdu(b"GETX / HTTP/1.1\r\n\r\n").unwrap();
    assert_eq!(req.method, Method::GET);
}

#[test]
fn test_parse_various_http_methods() {
    for method in Method::ALL {
        let raw = format!("{} / HTTP/1.1\r\n\r\n", method.as_str());
        let req = parse_pdu(raw.as_bytes()).unwrap();
        assert_eq!(req.method, method);
    }
}

#[test]
fn test_parse_uri_length_limit() {
    let ok = format!("GET /{} HTTP/1.1\r\n\r\n", "a".repeat(MAX_URI_LEN - 1));
    assert!(parse_pdu(ok.as_bytes()).is_ok());

    let too_long = format!("GET /{} HTTP/1.1\r\n\r\n", "a".repeat(MAX_URI_LEN));
    assert!(matches!(parse_pdu(too_long.as_bytes()), Err(ErrorCode::BadRequest)));
}

#[test]
fn test_parse_rejects_long_version() {
    let result = parse_pdu(b"GET / HTTP/1.10\r\n\r\n");
    assert!(matches!(result, Err(ErrorCode::BadRequest)));
}

#[test]
fn test_parse_rejects_incomplete_request_line() {
    assert!(matches!(parse_pdu(b""), Err(ErrorCode::BadRequest)));
    assert!(matches!(parse_pdu(b"\r\n\r\n"), Err(ErrorCode::BadRequest)));
    assert!(matches!(parse_pdu(b"GET\r\n\r\n"), Err(ErrorCode::BadRequest)));
}

#[test]
fn test_parse_rejects_non_utf8_header() {
    let result = parse_pdu(b"GET /\xff\xfe HTTP/1.1\r\n\r\n");
    assert!(matches!(result, Err(ErrorCode::BadRequest)));
}

#[test]
fn test_parse_keeps_binary_body() {
    let req = parse_pdu(b"PUT /upload HTTP/1.1\r\n\r\n\x00\x01\x02\x03").unwrap();
    assert_eq!(req.content, vec![0, 1, 2, 3]);
}

#[test]
fn test_parse_accepts_missing_version() {
    let req = parse_pdu(b"GET /\r\n\r\n").unwrap();
    assert_eq!(req.method, Method::GET);
    assert_eq!(req.uri, "/");
    assert_eq!(req.version, "");
}
