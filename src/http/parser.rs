use crate::http::request::{Header, Request};

/// Upper bound on the number of headers in one request.
pub const MAX_HEADERS: usize = 64;

/// Upper bound on the size of a request line plus headers.
pub const MAX_HEAD_SIZE: usize = 64 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// More bytes are needed before the head is complete.
    #[error("incomplete request")]
    Incomplete,
    #[error("request head exceeds {0} bytes")]
    TooLarge(usize),
    #[error("malformed request: {0}")]
    Malformed(#[from] httparse::Error),
}

/// Parses one request head from the start of `buf`.
///
/// On success returns the request and the number of bytes the head took up.
/// Bytes after that are payload or the next request and are left to the
/// caller. All strings are copied out of `buf`.
pub fn parse_http_request(buf: &[u8]) -> Result<(Request, usize), ParseError> {
    let mut headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
    let mut parsed = httparse::Request::new(&mut headers);

    let consumed = match parsed.parse(buf)? {
        httparse::Status::Complete(n) => n,
        httparse::Status::Partial if buf.len() > MAX_HEAD_SIZE => {
            return Err(ParseError::TooLarge(MAX_HEAD_SIZE));
        }
        httparse::Status::Partial => return Err(ParseError::Incomplete),
    };

    if consumed > MAX_HEAD_SIZE {
        return Err(ParseError::TooLarge(MAX_HEAD_SIZE));
    }

    // A complete parse always fills method, path and version.
    let (Some(method), Some(path), Some(minor_version)) =
        (parsed.method, parsed.path, parsed.version)
    else {
        return Err(ParseError::Incomplete);
    };

    let headers = parsed
        .headers
        .iter()
        .map(|h| Header {
            name: h.name.to_string(),
            value: String::from_utf8_lossy(h.value).into_owned(),
        })
        .collect();

    let request = Request {
        method: method.to_string(),
        path: path.to_string(),
        minor_version,
        headers,
    };

    Ok((request, consumed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_get() {
        let req = b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n";

        let (parsed, consumed) = parse_http_request(req).unwrap();

        assert_eq!(parsed.path, "/");
        assert_eq!(parsed.header("Host").unwrap(), "example.com");
        assert_eq!(consumed, req.len());
    }

    #[test]
    fn oversized_partial_head_is_rejected() {
        let mut req = b"GET / HTTP/1.1\r\nX-Filler: ".to_vec();
        req.resize(MAX_HEAD_SIZE + 1, b'a');

        assert!(matches!(parse_http_request(&req), Err(ParseError::TooLarge(_))));
    }
}
