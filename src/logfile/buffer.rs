//! Bounded, offset-addressable buffer of recent log output.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::logfile::range::{ByteRange, LogSlice, LogfileError};

/// Append-only log stream that keeps at most `max_bytes` of its tail.
///
/// Offsets are absolute: byte `n` is the `n`-th byte ever appended. Trimming
/// moves the floor of the retained window but never renumbers bytes, so a
/// range computed before a trim either still resolves to the same bytes or
/// is rejected.
#[derive(Debug)]
pub struct LogBuffer {
    max_bytes: usize,
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    chunks: VecDeque<Vec<u8>>,
    retained: usize,
    total: u64,
}

impl Inner {
    fn floor(&self) -> u64 {
        self.total - self.retained as u64
    }

    fn contents(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.retained);
        for chunk in &self.chunks {
            out.extend_from_slice(chunk);
        }
        out
    }

    /// Copy absolute offsets `[start, end]`; both must lie in the retained window.
    fn slice(&self, start: u64, end: u64) -> Vec<u8> {
        let mut out = Vec::with_capacity((end - start + 1) as usize);
        let mut offset = self.floor();
        for chunk in &self.chunks {
            let chunk_end = offset + chunk.len() as u64;
            if chunk_end > start && offset <= end {
                let from = start.saturating_sub(offset) as usize;
                let to = ((end + 1).min(chunk_end) - offset) as usize;
                out.extend_from_slice(&chunk[from..to]);
            }
            if chunk_end > end {
                break;
            }
            offset = chunk_end;
        }
        out
    }
}

impl LogBuffer {
    /// Create an empty buffer. A zero bound is raised to one byte.
    pub fn new(max_bytes: usize) -> Self {
        Self {
            max_bytes: max_bytes.max(1),
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Append a chunk of log output, dropping the oldest chunks past the bound.
    pub fn append(&self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        // A chunk larger than the whole bound only keeps its tail.
        let kept = &bytes[bytes.len().saturating_sub(self.max_bytes)..];

        let mut inner = self.lock();
        inner.total += bytes.len() as u64;
        inner.retained += kept.len();
        inner.chunks.push_back(kept.to_vec());
        while inner.retained > self.max_bytes {
            match inner.chunks.pop_front() {
                Some(oldest) => inner.retained -= oldest.len(),
                None => break,
            }
        }
    }

    /// Every retained byte, oldest first.
    pub fn contents(&self) -> Vec<u8> {
        self.lock().contents()
    }

    /// Total bytes ever appended.
    pub fn total_written(&self) -> u64 {
        self.lock().total
    }

    /// Absolute offsets `[floor, total)` currently retained.
    pub fn window(&self) -> (u64, u64) {
        let inner = self.lock();
        (inner.floor(), inner.total)
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Serve a `Range` header value (or its absence) from the current contents.
    pub fn resolve_range(&self, range: Option<&str>) -> Result<LogSlice, LogfileError> {
        let inner = self.lock();
        let total = inner.total;

        let Some(range) = range else {
            return Ok(LogSlice {
                body: inner.contents(),
                range: None,
                total,
            });
        };

        let (start, end) = ByteRange::parse(range)
            .and_then(|r| r.resolve(inner.floor(), total))
            .ok_or(LogfileError::RangeNotSatisfiable { total })?;

        if start == 0 && end == total - 1 {
            return Ok(LogSlice {
                body: inner.contents(),
                range: None,
                total,
            });
        }

        Ok(LogSlice {
            body: inner.slice(start, end),
            range: Some((start, end)),
            total,
        })
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
