// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Output stream aggregation for child processes.

use std::io;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::task::JoinHandle;

const CHUNK_SIZE: usize = 8 * 1024;

/// Accumulates one output stream of a running process into a single buffer.
///
/// Reading starts the moment the aggregator is attached, so a process that
/// writes a lot and exits quickly cannot fill the pipe and stall. Chunks are
/// concatenated in delivery order with no splitting or deduplication. The
/// buffer is only handed out by [`StreamAggregator::collect`], which the
/// process runner calls once the owning process has terminated.
#[derive(Debug)]
pub struct StreamAggregator {
    task: Option<JoinHandle<io::Result<Vec<u8>>>>,
}

impl StreamAggregator {
    /// Start capturing `reader` on a background task.
    pub fn attach<R>(reader: R) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        Self {
            task: Some(tokio::spawn(read_to_end(reader))),
        }
    }

    /// An aggregator for a stream that was never piped; collects to empty.
    pub fn detached() -> Self {
        Self { task: None }
    }

    /// Wait for end-of-stream and return everything that was read.
    ///
    /// An empty stream is a successful, empty buffer.
    pub async fn collect(mut self) -> io::Result<Vec<u8>> {
        let Some(task) = self.task.take() else {
            return Ok(Vec::new());
        };
        match task.await {
            Ok(result) => result,
            Err(e) => Err(io::Error::other(e)),
        }
    }

    /// Stop capturing; used when the owning process is abandoned.
    pub fn abort(&self) {
        if let Some(ref task) = self.task {
            task.abort();
        }
    }
}

impl Drop for StreamAggregator {
    fn drop(&mut self) {
        self.abort();
    }
}

async fn read_to_end<R>(mut reader: R) -> io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    let mut chunk = vec![0u8; CHUNK_SIZE];
    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    Ok(buf)
}

#[cfg(test)]
#[path = "stream_tests.rs"]
mod tests;
