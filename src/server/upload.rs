use std::io::{self, Read};

use axum::body::Bytes;
use tokio::sync::mpsc;

// Characters Windows refuses in names; stripped everywhere so shares stay portable.
const RESERVED: &[char] = &['<', '>', ':', '"', '|', '?', '*'];

/// Reduces a client-supplied filename to a single safe path segment.
///
/// Directory components (either separator) are dropped, control and reserved
/// characters removed. Returns `None` if nothing usable is left.
pub fn sanitize_filename(raw: &str) -> Option<String> {
    let last = raw.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = last
        .chars()
        .filter(|c| !c.is_control() && !RESERVED.contains(c))
        .collect();
    let cleaned = cleaned.trim();

    match cleaned {
        "" | "." | ".." => None,
        name => Some(name.to_string()),
    }
}

/// Joins a sanitized filename onto a root-relative directory.
pub fn join_relative(dir: &str, name: &str) -> String {
    let dir = dir.trim_matches('/');
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{dir}/{name}")
    }
}

/// Blocking reader fed with body chunks from the async side of a request.
///
/// Lets `save_upload` stream a multipart field to disk from a blocking task.
/// An `Err` chunk fails the read; a closed channel is end of input.
pub struct ChunkReader {
    chunks: mpsc::Receiver<io::Result<Bytes>>,
    current: Bytes,
}

impl ChunkReader {
    pub fn new(chunks: mpsc::Receiver<io::Result<Bytes>>) -> Self {
        Self {
            chunks,
            current: Bytes::new(),
        }
    }
}

impl Read for ChunkReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        while self.current.is_empty() {
            match self.chunks.blocking_recv() {
                Some(Ok(chunk)) => self.current = chunk,
                Some(Err(err)) => return Err(err),
                None => return Ok(0),
            }
        }
        let len = buf.len().min(self.current.len());
        buf[..len].copy_from_slice(&self.current[..len]);
        self.current = self.current.slice(len..);
        Ok(len)
    }
}
