use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use pier::http::response::Response;
use pier::http::transfer::{FileTransfer, TransferError};
use pier::http::writer::serialize_head;
use tokio::fs::File;
use tokio::io::AsyncWrite;

mod common;

/// Records every write it receives.
#[derive(Default)]
struct Recorder {
    writes: Vec<usize>,
    data: Vec<u8>,
}

impl AsyncWrite for Recorder {
    fn poll_write(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        self.writes.push(buf.len());
        self.data.extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

/// A peer that has gone away.
struct Broken;

impl AsyncWrite for Broken {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Poll::Ready(Err(io::ErrorKind::BrokenPipe.into()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

async fn transfer(
    root: &common::DocRoot,
    name: &str,
    total: u64,
    chunk: usize,
) -> (FileTransfer, Vec<u8>) {
    let file = File::open(root.path().join(name)).await.unwrap();
    let head = Response::file(total, "application/octet-stream", true);
    (FileTransfer::new(file, total, &head, chunk), serialize_head(&head))
}

#[tokio::test]
async fn test_transfer_round_trips_file() {
    let root = common::DocRoot::new();
    let contents = common::pattern(20_000);
    root.write("blob.bin", &contents);

    let (transfer, head) = transfer(&root, "blob.bin", contents.len() as u64, 4096).await;
    let mut out = Recorder::default();
    let sent = transfer.send(&mut out, None).await.unwrap();

    assert_eq!(sent, contents.len() as u64);
    assert_eq!(&out.data[..head.len()], &head[..]);
    assert_eq!(&out.data[head.len()..], &contents[..]);
}

#[tokio::test]
async fn test_transfer_never_writes_more_than_one_chunk() {
    let root = common::DocRoot::new();
    let contents = common::pattern(10_000);
    root.write("blob.bin", &contents);

    let (transfer, head) = transfer(&root, "blob.bin", contents.len() as u64, 1000).await;
    let mut out = Recorder::default();
    transfer.send(&mut out, None).await.unwrap();

    assert_eq!(out.writes[0], head.len());
    let body_writes = &out.writes[1..];
    assert!(body_writes.iter().all(|&n| n <= 1000));
    assert_eq!(body_writes.iter().sum::<usize>(), contents.len());
}

#[tokio::test]
async fn test_transfer_zero_length_file_sends_head_only() {
    let root = common::DocRoot::new();
    root.write("empty.txt", b"");

    let (transfer, head) = transfer(&root, "empty.txt", 0, 4096).await;
    let mut out = Recorder::default();
    let sent = transfer.send(&mut out, None).await.unwrap();

    assert_eq!(sent, 0);
    assert_eq!(out.data, head);
    assert!(String::from_utf8_lossy(&head).contains("Content-Length: 0\r\n"));
}

#[tokio::test]
async fn test_transfer_stops_at_stat_size() {
    let root = common::DocRoot::new();
    let contents = common::pattern(100);
    root.write("grown.bin", &contents);

    let (transfer, head) = transfer(&root, "grown.bin", 50, 4096).await;
    let mut out = Recorder::default();
    let sent = transfer.send(&mut out, None).await.unwrap();

    assert_eq!(sent, 50);
    assert_eq!(&out.data[head.len()..], &contents[..50]);
}

#[tokio::test]
async fn test_transfer_truncated_before_headers() {
    let root = common::DocRoot::new();
    root.write("shrunk.bin", b"");

    let (transfer, _) = transfer(&root, "shrunk.bin", 5, 4096).await;
    let mut out = Recorder::default();
    let err = transfer.send(&mut out, None).await.unwrap_err();

    assert!(matches!(err, TransferError::Truncated { sent: 0, total: 5, .. }));
    assert!(!err.headers_sent());
    assert!(out.data.is_empty());
}

#[tokio::test]
async fn test_transfer_truncated_mid_body() {
    let root = common::DocRoot::new();
    root.write("shrunk.bin", b"0123456789");

    let (transfer, _) = transfer(&root, "shrunk.bin", 100, 4096).await;
    let mut out = Recorder::default();
    let err = transfer.send(&mut out, None).await.unwrap_err();

    assert!(matches!(err, TransferError::Truncated { sent: 10, .. }));
    assert!(err.headers_sent());
}

#[tokio::test]
async fn test_transfer_write_failure() {
    let root = common::DocRoot::new();
    root.write("a.txt", b"hello");

    let (transfer, _) = transfer(&root, "a.txt", 5, 4096).await;
    let err = transfer.send(&mut Broken, None).await.unwrap_err();

    assert!(matches!(err, TransferError::Write { .. }));
    assert!(err.headers_sent());
}
