use crate::http::mime;

/// HTTP status codes emitted by the server.
///
/// - `Ok` (200): File found and streamed
/// - `BadRequest` (400): Malformed request or unusable path
/// - `NotFound` (404): Nothing servable at the resolved path
/// - `InternalServerError` (500): I/O failure before the header block went out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 400 Bad Request
    BadRequest,
    /// 404 Not Found
    NotFound,
    /// 500 Internal Server Error
    InternalServerError,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use pier::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::NotFound.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::NotFound => 404,
            StatusCode::InternalServerError => 500,
        }
    }

    /// Returns the standard HTTP reason phrase for this status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use pier::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
    /// assert_eq!(StatusCode::NotFound.reason_phrase(), "Not Found");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }
}

/// A status line, header block and an in-memory body.
///
/// File responses leave `body` empty and carry the file's size in
/// `Content-Length`; the body is streamed separately by
/// [`FileTransfer`](crate::http::transfer::FileTransfer).
#[derive(Debug)]
pub struct Response {
    /// The HTTP status code
    pub status: StatusCode,
    /// Headers in the order they are written
    pub headers: Vec<(String, String)>,
    /// Response body as bytes
    pub body: Vec<u8>,
}

/// Builder for constructing HTTP responses in a fluent style.
///
/// # Example
///
/// ```ignore
/// let response = ResponseBuilder::new(StatusCode::Ok)
///     .header("Content-Type", "text/html")
///     .body(b"<h1>hi</h1>".to_vec())
///     .build();
/// ```
pub struct ResponseBuilder {
    status: StatusCode,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl ResponseBuilder {
    /// Creates a new response builder with the specified status code.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Adds a header, replacing an existing one with the same name
    /// (case-insensitive) in place.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match self
            .headers
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(&key))
        {
            Some(slot) => slot.1 = value,
            None => self.headers.push((key, value)),
        }
        self
    }

    /// Sets the `Connection` header from a keep-alive decision.
    pub fn keep_alive(self, keep_alive: bool) -> Self {
        self.header("Connection", if keep_alive { "keep-alive" } else { "close" })
    }

    /// Sets the response body.
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Builds the final Response.
    ///
    /// Puts a Content-Length derived from the body first unless one was set
    /// explicitly.
    pub fn build(mut self) -> Response {
        if !self
            .headers
            .iter()
            .any(|(k, _)| k.eq_ignore_ascii_case("Content-Length"))
        {
            self.headers
                .insert(0, ("Content-Length".to_string(), self.body.len().to_string()));
        }

        Response {
            status: self.status,
            headers: self.headers,
            body: self.body,
        }
    }
}

impl Response {
    /// Header block announcing a file of `size` bytes; the body follows
    /// separately.
    pub fn file(size: u64, content_type: &str, keep_alive: bool) -> Self {
        ResponseBuilder::new(StatusCode::Ok)
            .header("Content-Length", size.to_string())
            .header("Content-Type", content_type)
            .keep_alive(keep_alive)
            .build()
    }

    /// Creates a 400 Bad Request response. The connection always closes.
    pub fn bad_request() -> Self {
        Self::error(StatusCode::BadRequest, false)
    }

    /// Creates a 404 Not Found response.
    pub fn not_found(keep_alive: bool) -> Self {
        Self::error(StatusCode::NotFound, keep_alive)
    }

    /// Creates a 500 Internal Server Error response. The connection always
    /// closes.
    pub fn internal_error() -> Self {
        Self::error(StatusCode::InternalServerError, false)
    }

    /// Short plain-text error response whose body is the reason phrase.
    pub fn error(status: StatusCode, keep_alive: bool) -> Self {
        ResponseBuilder::new(status)
            .header("Content-Type", mime::PLAIN_TEXT)
            .keep_alive(keep_alive)
            .body(format!("{}\n", status.reason_phrase()).into_bytes())
            .build()
    }

    /// Retrieves a header value by name (case-insensitive).
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Whether the `Connection` header tells the client to keep the
    /// connection open.
    pub fn keeps_alive(&self) -> bool {
        self.header("Connection")
            .is_some_and(|v| v.eq_ignore_ascii_case("keep-alive"))
    }
}
