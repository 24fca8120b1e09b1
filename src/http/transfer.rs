//! Streams one file to a client.
//!
//! A transfer alternates strictly between one file read and one socket
//! write on a single fixed buffer; the next read is only issued after the
//! previous write completed. A slow reader therefore holds at most one
//! chunk in memory.
//!
//! The header block is sent together with the first chunk, so a failure of
//! the very first file read can still be answered with a 500.

use std::io;
use std::time::Duration;

use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::http::response::Response;
use crate::http::writer::{serialize_head, write_all_within};

#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("file read failed after {sent} bytes: {source}")]
    Read {
        sent: u64,
        headers_sent: bool,
        #[source]
        source: io::Error,
    },
    #[error("socket write failed after {sent} bytes: {source}")]
    Write {
        sent: u64,
        headers_sent: bool,
        #[source]
        source: io::Error,
    },
    #[error("file ended after {sent} of {total} bytes")]
    Truncated {
        sent: u64,
        total: u64,
        headers_sent: bool,
    },
}

impl TransferError {
    /// Whether any part of the response reached the socket. Once it has,
    /// the `Content-Length` framing is committed and the only way out is to
    /// close the connection.
    pub fn headers_sent(&self) -> bool {
        match self {
            TransferError::Read { headers_sent, .. }
            | TransferError::Write { headers_sent, .. }
            | TransferError::Truncated { headers_sent, .. } => *headers_sent,
        }
    }
}

/// Streaming state for one file response.
///
/// Owns the open file and the chunk buffer; both are released when the
/// transfer is dropped, whichever way it ends.
#[derive(Debug)]
pub struct FileTransfer {
    file: File,
    head: Vec<u8>,
    total: u64,
    sent: u64,
    buffer: Vec<u8>,
    head_sent: bool,
}

impl FileTransfer {
    pub fn new(file: File, total: u64, head: &Response, chunk_size: usize) -> Self {
        Self {
            file,
            head: serialize_head(head),
            total,
            sent: 0,
            buffer: vec![0; chunk_size.max(1)],
            head_sent: false,
        }
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Runs the transfer to completion and returns the body bytes sent.
    ///
    /// `write_timeout` bounds every individual socket write.
    pub async fn send<W>(
        mut self,
        stream: &mut W,
        write_timeout: Option<Duration>,
    ) -> Result<u64, TransferError>
    where
        W: AsyncWrite + Unpin,
    {
        loop {
            let remaining = self.total - self.sent;
            if remaining == 0 {
                break;
            }

            let want = usize::try_from(remaining)
                .map_or(self.buffer.len(), |r| r.min(self.buffer.len()));
            let headers_sent = self.head_sent;

            let n = match self.file.read(&mut self.buffer[..want]).await {
                Ok(0) => {
                    return Err(TransferError::Truncated {
                        sent: self.sent,
                        total: self.total,
                        headers_sent,
                    });
                }
                Ok(n) => n,
                Err(source) => {
                    return Err(TransferError::Read {
                        sent: self.sent,
                        headers_sent,
                        source,
                    });
                }
            };

            if !headers_sent {
                self.write_head(stream, write_timeout).await?;
            }

            write_all_within(stream, &self.buffer[..n], write_timeout)
                .await
                .map_err(|source| TransferError::Write {
                    sent: self.sent,
                    headers_sent: true,
                    source,
                })?;

            self.sent += n as u64;
        }

        // zero-length file: the head is the whole response
        if !self.head_sent {
            self.write_head(stream, write_timeout).await?;
        }

        stream.flush().await.map_err(|source| TransferError::Write {
            sent: self.sent,
            headers_sent: true,
            source,
        })?;

        Ok(self.sent)
    }

    async fn write_head<W>(
        &mut self,
        stream: &mut W,
        write_timeout: Option<Duration>,
    ) -> Result<(), TransferError>
    where
        W: AsyncWrite + Unpin,
    {
        // A partial head is as unrecoverable as a partial body.
        self.head_sent = true;
        write_all_within(stream, &self.head, write_timeout)
            .await
            .map_err(|source| TransferError::Write {
                sent: 0,
                headers_sent: true,
                source,
            })
    }
}
