use std::io;
use std::path::{Path, PathBuf};

use crate::http::parser::ParseError;
use crate::http::resolve::ResolveError;
use crate::http::response::{Response, StatusCode};
use crate::http::transfer::TransferError;

/// Everything that can end a request cycle early.
///
/// Every variant stays inside its connection; none of them reaches the
/// listener as anything but a log line.
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    /// The request head could not be parsed.
    #[error(transparent)]
    Protocol(#[from] ParseError),
    /// The request target cannot be mapped beneath the document root.
    #[error(transparent)]
    BadPath(#[from] ResolveError),
    /// Nothing servable at the resolved path (stat or open failed, or not a
    /// regular file).
    #[error("{}: {source}", .path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Socket read failure while waiting for a request.
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Transfer(#[from] TransferError),
}

impl ServeError {
    pub fn not_found(path: &Path, source: io::Error) -> Self {
        ServeError::NotFound {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ServeError::Protocol(_) | ServeError::BadPath(_) => StatusCode::BadRequest,
            ServeError::NotFound { .. } => StatusCode::NotFound,
            ServeError::Io(_) | ServeError::Transfer(_) => StatusCode::InternalServerError,
        }
    }

    /// The error response to attempt, if the connection can still carry
    /// one.
    ///
    /// A 404 honours the request's keep-alive intent because its framing is
    /// intact; 400 and 500 always close.
    pub fn response(&self, keep_alive: bool) -> Option<Response> {
        match self {
            ServeError::Protocol(_) | ServeError::BadPath(_) => Some(Response::bad_request()),
            ServeError::NotFound { .. } => Some(Response::not_found(keep_alive)),
            ServeError::Transfer(e) if !e.headers_sent() => Some(Response::internal_error()),
            ServeError::Io(_) | ServeError::Transfer(_) => None,
        }
    }
}
