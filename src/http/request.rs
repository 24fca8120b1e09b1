/// A single request header.
///
/// Names keep the case the client sent; comparisons go through
/// [`Header::is`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Case-insensitive name comparison.
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// Represents a parsed HTTP request from a client.
///
/// Every field is owned: the parser copies method, path and headers out of
/// the connection's read buffer, so the buffer can be recycled while the
/// request is still being served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// The method token exactly as sent. It is not validated; every method
    /// is served as a file lookup.
    pub method: String,
    /// The raw request target (e.g., "/index.html?v=2")
    pub path: String,
    /// Minor HTTP version: 0 for HTTP/1.0, 1 for HTTP/1.1
    pub minor_version: u8,
    /// Headers in arrival order. Duplicates are kept, not merged.
    pub headers: Vec<Header>,
}

/// Builder for constructing Request objects.
pub struct RequestBuilder {
    method: String,
    path: Option<String>,
    minor_version: u8,
    headers: Vec<Header>,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            method: "GET".to_string(),
            path: None,
            minor_version: 1,
            headers: Vec::new(),
        }
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn minor_version(mut self, minor_version: u8) -> Self {
        self.minor_version = minor_version;
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(Header::new(name, value));
        self
    }

    pub fn build(self) -> Result<Request, &'static str> {
        Ok(Request {
            method: self.method,
            path: self.path.ok_or("path missing")?,
            minor_version: self.minor_version,
            headers: self.headers,
        })
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Request {
    /// Retrieves the first header with the given name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.is(name))
            .map(|h| h.value.as_str())
    }

    /// All values of a header, in arrival order.
    pub fn header_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |h| h.is(name))
            .map(|h| h.value.as_str())
    }

    /// Retrieves the Content-Length header value and parses it as a usize.
    ///
    /// Returns 0 if the header is missing or not a valid number.
    pub fn content_length(&self) -> usize {
        self.header("Content-Length")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0)
    }

    /// Whether the request announces a body framed by Transfer-Encoding.
    pub fn has_transfer_encoding(&self) -> bool {
        self.header("Transfer-Encoding").is_some()
    }

    /// HTTP version string, e.g. "HTTP/1.1".
    pub fn version(&self) -> &'static str {
        match self.minor_version {
            0 => "HTTP/1.0",
            _ => "HTTP/1.1",
        }
    }

    /// Determines whether the client wants the connection kept open.
    ///
    /// `Connection` values are comma-separated token lists and every
    /// `Connection` header is consulted. `close` wins over anything else;
    /// HTTP/1.1 defaults to keep-alive, HTTP/1.0 only opts in with an
    /// explicit `keep-alive` token.
    pub fn keep_alive(&self) -> bool {
        let mut close = false;
        let mut keep_alive = false;

        for token in self
            .header_values("Connection")
            .flat_map(|v| v.split(','))
            .map(str::trim)
        {
            if token.eq_ignore_ascii_case("close") {
                close = true;
            } else if token.eq_ignore_ascii_case("keep-alive") {
                keep_alive = true;
            }
        }

        if close {
            return false;
        }
        self.minor_version >= 1 || keep_alive
    }
}
