//! HTTP protocol implementation.
//!
//! This module serves files from a document root over HTTP/1.0 and HTTP/1.1
//! with support for keep-alive connections.
//!
//! # Architecture
//!
//! - **`connection`**: Per-connection state machine from first read to close
//! - **`parser`**: Turns buffered bytes into an owned [`request::Request`]
//! - **`request`**: HTTP request representation and keep-alive rules
//! - **`resolve`**: Maps request targets onto files beneath the root
//! - **`response`**: Status codes, header blocks and the fixed error bodies
//! - **`writer`**: Serializes responses and writes them to the client
//! - **`transfer`**: Streams a file in fixed-size chunks
//! - **`mime`**: Content-type detection based on file extensions
//! - **`error`**: Per-request error taxonomy and its status mapping
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Wait for a complete request head
//!        └──────┬──────┘
//!               │ Request parsed          (malformed → Writing 400, close)
//!               ▼
//!        ┌──────────────────┐
//!        │   Processing     │ ← Resolve path, stat, open
//!        └──────┬───────────┘
//!               │ File open               (missing → Writing 404)
//!               ▼
//!        ┌──────────────────┐
//!        │  Transferring    │ ← Header block, then read ⇄ write chunks
//!        └──────┬───────────┘
//!               │ Body sent               (first read fails → Writing 500, close)
//!               ├─ Keep-Alive → Reading (same connection)
//!               └─ Close → Closed
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use pier::config::Config;
//! use pier::http::connection::{Connection, ServeOptions};
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let options = Arc::new(ServeOptions::from_config(&Config::default()));
//!     let listener = TcpListener::bind("127.0.0.1:7000").await?;
//!
//!     loop {
//!         let (socket, addr) = listener.accept().await?;
//!         let options = Arc::clone(&options);
//!         tokio::spawn(async move {
//!             let mut conn = Connection::new(socket, options, addr.to_string());
//!             if let Err(e) = conn.run().await {
//!                 eprintln!("Connection error: {}", e);
//!             }
//!         });
//!     }
//! }
//! ```

pub mod connection;
pub mod error;
pub mod mime;
pub mod parser;
pub mod request;
pub mod resolve;
pub mod response;
pub mod transfer;
pub mod writer;
