use simple_http_server::error::ErrorCode;
use simple_http_server::http::response::{ResponseHeader, StatusCode, error_page, error_response};

#[test]
fn test_status_code_as_u16() {
    assert_eq!(StatusCode::Ok.as_u16(), 200);
    assert_eq!(StatusCode::BadRequest.as_u16(), 400);
    assert_eq!(StatusCode::Forbidden.as_u16(), 403);
    assert_eq!(StatusCode::NotFound.as_u16(), 404);
    assert_eq!(StatusCode::InternalServerError.as_u16(), 500);
    assert_eq!(StatusCode::NotImplemented.as_u16(), 501);
}

#[test]
fn test_status_line() {
    assert_eq!(StatusCode::Ok.status_line(), "200 OK");
    assert_eq!(StatusCode::NotImplemented.status_line(), "501 Not Implemented");
}

#[test]
fn test_header_template_order_and_padding() {
    let header = ResponseHeader {
        status: "200 OK",
        encoding: "deflate",
        content_length: 42,
        content_type: "text/css",
    }
    .render();

    assert_eq!(
        header,
        "HTTP/1.1 200 OK\r\n\
         Server: simple-http-server\r\n\
         Content-Encoding: deflate\r\n\
         Content-Length: 00000042\r\n\
         Content-Type: text/css\r\n\
         \r\n"
    );
}

#[test]
fn test_header_length_does_not_depend_on_content_length() {
    let render = |n| {
        ResponseHeader {
            status: "200 OK",
            encoding: "deflate",
            content_length: n,
            content_type: "text/html",
        }
        .render()
        .len()
    };
    assert_eq!(render(0), render(10_485_760));
}

#[test]
fn test_error_page_uses_message_everywhere() {
    let page = error_page("404 Not Found");
    assert!(page.contains("<title>404 Not Found</title>"));
    assert!(page.contains("<h1>404 Not Found</h1>"));
    assert!(page.contains("<p>404 Not Found</p>"));
}

#[test]
fn test_error_response_is_self_contained() {
    let bytes = error_response(&ErrorCode::FileNotFound);
    let text = String::from_utf8(bytes).unwrap();

    assert!(text.starts_with("HTTP/1.1 404 Not Found\r\n"));
    assert!(text.contains("Content-Encoding: identity\r\n"));
    assert!(text.contains("Content-Type: text/html\r\n"));

    let (head, body) = text.split_once("\r\n\r\n").unwrap();
    let expected = format!("Content-Length: {:08}", body.len());
    assert!(head.contains(&expected));
}

#[test]
fn test_error_response_for_infrastructure_errors_is_500() {
    let err = ErrorCode::Os(std::io::Error::from(std::io::ErrorKind::Other));
    let text = String::from_utf8(error_response(&err)).unwrap();
    assert!(text.starts_with("HTTP/1.1 500 Internal Server Error\r\n"));
}
