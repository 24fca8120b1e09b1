use pier::http::response::{Response, ResponseBuilder, StatusCode};
use pier::http::writer::{ResponseWriter, serialize_head, serialize_response};

#[test]
fn test_status_code_as_u16() {
    assert_eq!(StatusCode::Ok.as_u16(), 200);
    assert_eq!(StatusCode::BadRequest.as_u16(), 400);
    assert_eq!(StatusCode::NotFound.as_u16(), 404);
    assert_eq!(StatusCode::InternalServerError.as_u16(), 500);
}

#[test]
fn test_status_code_reason_phrase() {
    assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
    assert_eq!(StatusCode::BadRequest.reason_phrase(), "Bad Request");
    assert_eq!(StatusCode::NotFound.reason_phrase(), "Not Found");
    assert_eq!(
        StatusCode::InternalServerError.reason_phrase(),
        "Internal Server Error"
    );
}

#[test]
fn test_response_builder_auto_content_length() {
    let body = b"This is the body".to_vec();
    let response = ResponseBuilder::new(StatusCode::Ok)
        .body(body.clone())
        .build();

    assert_eq!(response.header("Content-Length").unwrap(), body.len().to_string());
    assert_eq!(response.headers[0].0, "Content-Length");
}

#[test]
fn test_response_builder_preserves_custom_content_length() {
    let response = ResponseBuilder::new(StatusCode::Ok)
        .header("Content-Length", "999")
        .build();

    // File heads announce the file size with an empty in-memory body
    assert_eq!(response.header("content-length").unwrap(), "999");
    assert_eq!(response.headers.len(), 1);
}

#[test]
fn test_response_builder_header_replaces_in_place() {
    let response = ResponseBuilder::new(StatusCode::Ok)
        .header("Content-Type", "text/plain")
        .header("X-Custom", "value")
        .header("content-type", "text/html")
        .build();

    let names: Vec<&str> = response.headers.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(names, ["Content-Length", "Content-Type", "X-Custom"]);
    assert_eq!(response.header("Content-Type").unwrap(), "text/html");
}

#[test]
fn test_response_file_head() {
    let response = Response::file(1234, "image/png", true);

    assert_eq!(response.status, StatusCode::Ok);
    assert!(response.body.is_empty());
    assert!(response.keeps_alive());
    assert_eq!(
        serialize_head(&response),
        b"HTTP/1.1 200 OK\r\nContent-Length: 1234\r\nContent-Type: image/png\r\nConnection: keep-alive\r\n\r\n"
    );
}

#[test]
fn test_response_not_found_bytes() {
    let response = Response::not_found(true);

    assert_eq!(
        serialize_response(&response),
        b"HTTP/1.1 404 Not Found\r\nContent-Length: 10\r\nContent-Type: text/plain; charset=UTF-8\r\nConnection: keep-alive\r\n\r\nNot Found\n"
    );
}

#[test]
fn test_response_bad_request_closes() {
    let response = Response::bad_request();

    assert_eq!(response.status, StatusCode::BadRequest);
    assert_eq!(response.header("Connection"), Some("close"));
    assert_eq!(response.body, b"Bad Request\n".to_vec());
}

#[test]
fn test_response_internal_error_closes() {
    let response = Response::internal_error();

    assert_eq!(response.status, StatusCode::InternalServerError);
    assert!(!response.keeps_alive());
    assert_eq!(response.body, b"Internal Server Error\n".to_vec());
}

#[tokio::test]
async fn test_response_writer_writes_everything() {
    let response = Response::not_found(false);
    let writer = ResponseWriter::new(&response);
    let mut out: Vec<u8> = Vec::new();

    writer.write_to_stream(&mut out, None).await.unwrap();

    assert_eq!(out, serialize_response(&response));
    assert!(out.starts_with(b"HTTP/1.1 404 Not Found\r\n"));
    assert!(out.ends_with(b"\r\n\r\nNot Found\n"));
}
