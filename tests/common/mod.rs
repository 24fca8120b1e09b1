#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use pier::http::connection::ServeOptions;
use pier::http::resolve::PathResolver;
use tokio::io::{AsyncRead, AsyncReadExt};

static NEXT_ROOT: AtomicUsize = AtomicUsize::new(0);

/// A throwaway document root, removed on drop.
pub struct DocRoot {
    path: PathBuf,
}

impl DocRoot {
    pub fn new() -> Self {
        let path = std::env::temp_dir().join(format!(
            "pier-test-{}-{}",
            std::process::id(),
            NEXT_ROOT.fetch_add(1, Ordering::Relaxed)
        ));
        std::fs::create_dir_all(&path).unwrap();
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&self, rel: &str, contents: &[u8]) -> PathBuf {
        let file = self.path.join(rel);
        if let Some(parent) = file.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&file, contents).unwrap();
        file
    }

    pub fn mkdir(&self, rel: &str) {
        std::fs::create_dir_all(self.path.join(rel)).unwrap();
    }

    pub fn options(&self) -> ServeOptions {
        ServeOptions {
            resolver: PathResolver::new(&self.path, "index.html"),
            chunk_size: 8192,
            keep_alive: true,
            idle_timeout: Some(Duration::from_secs(5)),
        }
    }

    pub fn shared_options(&self) -> Arc<ServeOptions> {
        Arc::new(self.options())
    }
}

impl Drop for DocRoot {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

/// Deterministic non-repeating-looking file contents.
pub fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 31 % 251) as u8).collect()
}

pub struct RawResponse {
    pub head: String,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn status_line(&self) -> &str {
        self.head.lines().next().unwrap_or_default()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.head.lines().skip(1).find_map(|line| {
            let (k, v) = line.split_once(':')?;
            k.eq_ignore_ascii_case(name).then(|| v.trim())
        })
    }
}

/// Reads exactly one response framed by Content-Length.
pub async fn read_response<R: AsyncRead + Unpin>(stream: &mut R) -> RawResponse {
    let mut head = Vec::new();
    let mut byte = [0u8; 1];
    while !head.ends_with(b"\r\n\r\n") {
        let n = stream.read(&mut byte).await.unwrap();
        assert_ne!(n, 0, "connection closed inside response head: {:?}", String::from_utf8_lossy(&head));
        head.push(byte[0]);
    }

    let head = String::from_utf8(head).unwrap();
    let mut response = RawResponse {
        head,
        body: Vec::new(),
    };

    let length: usize = response
        .header("Content-Length")
        .expect("response without Content-Length")
        .parse()
        .unwrap();
    response.body = vec![0; length];
    stream.read_exact(&mut response.body).await.unwrap();
    response
}

/// True when the peer has closed its side (no further bytes arrive).
pub async fn at_eof<R: AsyncRead + Unpin>(stream: &mut R) -> bool {
    let mut rest = Vec::new();
    match tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut rest)).await {
        Ok(Ok(_)) => rest.is_empty(),
        _ => false,
    }
}
