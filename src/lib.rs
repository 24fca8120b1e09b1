//! Pier - static file HTTP server
//!
//! Maps request paths onto a document root and streams the files back over
//! persistent HTTP/1.x connections.

pub mod config;
pub mod http;
pub mod server;
