use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use bytes::{Buf, BytesMut};
use tokio::fs::{self, File};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::http::error::ServeError;
use crate::http::mime;
use crate::http::parser::{ParseError, parse_http_request};
use crate::http::request::Request;
use crate::http::resolve::PathResolver;
use crate::http::response::Response;
use crate::http::transfer::FileTransfer;
use crate::http::writer::ResponseWriter;

const READ_RESERVE: usize = 4096;

/// Per-server settings shared read-only by every connection.
#[derive(Debug, Clone)]
pub struct ServeOptions {
    pub resolver: PathResolver,
    pub chunk_size: usize,
    /// When false every response closes the connection.
    pub keep_alive: bool,
    /// Bounds the wait for request bytes and each socket write.
    pub idle_timeout: Option<Duration>,
}

impl ServeOptions {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            resolver: PathResolver::new(&cfg.static_files.root, &cfg.static_files.index),
            chunk_size: cfg.static_files.chunk_size,
            keep_alive: cfg.server.keep_alive,
            idle_timeout: cfg.server.idle_timeout(),
        }
    }
}

/// A file that passed stat and open, ready to stream.
struct OpenFile {
    file: File,
    size: u64,
    path: PathBuf,
}

/// One accepted connection, driven from the first read to the close.
///
/// The connection owns its socket, its read buffer and whatever the current
/// state holds (a request, an error response or a file transfer). Each state
/// is moved out before it is acted on, so every resource is released exactly
/// once no matter which step fails.
pub struct Connection<S> {
    stream: S,
    buffer: BytesMut,
    /// Request body bytes still to be skipped as they arrive.
    discard: usize,
    state: ConnectionState,
    options: Arc<ServeOptions>,
    peer: String,
}

pub enum ConnectionState {
    Reading,
    Processing(Request),
    Writing(ResponseWriter, bool), // bool = keep_alive?
    Transferring(FileTransfer, bool),
    Closed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, options: Arc<ServeOptions>, peer: impl Into<String>) -> Self {
        Self {
            stream,
            buffer: BytesMut::with_capacity(READ_RESERVE),
            discard: 0,
            state: ConnectionState::Reading,
            options,
            peer: peer.into(),
        }
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::Reading => {
                    self.state = match self.read_request().await {
                        Ok(Some(req)) => ConnectionState::Processing(req),
                        Ok(None) => ConnectionState::Closed,
                        Err(ServeError::Protocol(e)) => {
                            warn!(peer = %self.peer, error = %e, status = 400, "Malformed request");
                            ConnectionState::Writing(
                                ResponseWriter::new(&Response::bad_request()),
                                false,
                            )
                        }
                        // socket is unusable, no response attempt
                        Err(e) => return Err(e.into()),
                    };
                }

                ConnectionState::Processing(req) => {
                    self.state = self.process(req).await;
                }

                ConnectionState::Writing(writer, keep_alive) => {
                    writer
                        .write_to_stream(&mut self.stream, self.options.idle_timeout)
                        .await?;
                    self.state = self.after_response(keep_alive);
                }

                ConnectionState::Transferring(transfer, keep_alive) => {
                    let total = transfer.total();
                    match transfer.send(&mut self.stream, self.options.idle_timeout).await {
                        Ok(sent) => {
                            debug!(peer = %self.peer, bytes = sent, "Transfer complete");
                            self.state = self.after_response(keep_alive);
                        }
                        Err(e) if !e.headers_sent() => {
                            error!(
                                peer = %self.peer,
                                error = %e,
                                status = 500,
                                "File transfer failed"
                            );
                            self.state = ConnectionState::Writing(
                                ResponseWriter::new(&Response::internal_error()),
                                false,
                            );
                        }
                        Err(e) => {
                            // Content-Length is committed, only closing signals the failure
                            warn!(peer = %self.peer, error = %e, total, "Transfer aborted");
                            return Err(ServeError::from(e).into());
                        }
                    }
                }

                ConnectionState::Closed => {
                    break;
                }
            }
        }

        // best effort, the peer may already be gone
        let _ = self.stream.shutdown().await;
        Ok(())
    }

    /// Reads until one complete request head is buffered.
    ///
    /// Returns `Ok(None)` when the peer closes the connection or stays idle
    /// past the timeout.
    pub async fn read_request(&mut self) -> Result<Option<Request>, ServeError> {
        loop {
            // Try parsing whatever we already have
            if !self.buffer.is_empty() {
                match parse_http_request(&self.buffer) {
                    Ok((request, consumed)) => {
                        self.buffer.advance(consumed);
                        self.skip_body(request.content_length());
                        return Ok(Some(request));
                    }
                    Err(ParseError::Incomplete) => {}
                    Err(e) => return Err(e.into()),
                }
            }

            self.buffer.reserve(READ_RESERVE);
            let read = self.stream.read_buf(&mut self.buffer);
            let n = match self.options.idle_timeout {
                Some(limit) => match tokio::time::timeout(limit, read).await {
                    Ok(n) => n?,
                    Err(_) => {
                        debug!(peer = %self.peer, "Idle timeout, closing");
                        return Ok(None);
                    }
                },
                None => read.await?,
            };

            if n == 0 {
                // Client closed connection
                if !self.buffer.is_empty() {
                    debug!(
                        peer = %self.peer,
                        buffered = self.buffer.len(),
                        "Peer closed mid-request"
                    );
                }
                return Ok(None);
            }

            self.drop_discarded();
        }
    }

    async fn process(&self, req: Request) -> ConnectionState {
        let keep_alive =
            self.options.keep_alive && req.keep_alive() && !req.has_transfer_encoding();

        match self.open(&req).await {
            Ok(OpenFile { file, size, path }) => {
                let content_type = mime::content_type(&path);
                info!(
                    peer = %self.peer,
                    method = %req.method,
                    path = %req.path,
                    version = req.version(),
                    status = 200,
                    bytes = size,
                    "Serving file"
                );
                let head = Response::file(size, content_type, keep_alive);
                let transfer = FileTransfer::new(file, size, &head, self.options.chunk_size);
                ConnectionState::Transferring(transfer, keep_alive)
            }
            Err(e) => {
                let Some(response) = e.response(keep_alive) else {
                    return ConnectionState::Closed;
                };
                warn!(
                    peer = %self.peer,
                    method = %req.method,
                    path = %req.path,
                    version = req.version(),
                    status = response.status.as_u16(),
                    error = %e,
                    "Request failed"
                );
                let keep_alive = response.keeps_alive();
                ConnectionState::Writing(ResponseWriter::new(&response), keep_alive)
            }
        }
    }

    /// Resolve, stat and open the file a request names.
    async fn open(&self, req: &Request) -> Result<OpenFile, ServeError> {
        let path = self.options.resolver.resolve(&req.path)?;

        let metadata = fs::metadata(&path)
            .await
            .map_err(|e| ServeError::not_found(&path, e))?;
        if !metadata.is_file() {
            return Err(ServeError::not_found(
                &path,
                std::io::Error::other("not a regular file"),
            ));
        }

        let file = File::open(&path)
            .await
            .map_err(|e| ServeError::not_found(&path, e))?;

        Ok(OpenFile {
            file,
            size: metadata.len(),
            path,
        })
    }

    fn after_response(&self, keep_alive: bool) -> ConnectionState {
        if keep_alive {
            debug!(peer = %self.peer, "Keep-alive, waiting for next request");
            ConnectionState::Reading
        } else {
            debug!(peer = %self.peer, "Closing connection");
            ConnectionState::Closed
        }
    }

    /// Drops the part of a request body that is already buffered and
    /// remembers how much more to skip.
    fn skip_body(&mut self, len: usize) {
        let now = len.min(self.buffer.len());
        self.buffer.advance(now);
        self.discard = len - now;
    }

    fn drop_discarded(&mut self) {
        let now = self.discard.min(self.buffer.len());
        self.buffer.advance(now);
        self.discard -= now;
    }
}
