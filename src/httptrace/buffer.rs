//! Bounded FIFO store of recent trace records.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::httptrace::record::TraceRecord;

/// A thread-safe ring buffer of trace records.
///
/// Inserting into a full buffer evicts the oldest record. The lock is held
/// only for the push/pop or the snapshot copy.
#[derive(Debug)]
pub struct TraceRingBuffer {
    capacity: usize,
    records: Mutex<VecDeque<TraceRecord>>,
}

impl TraceRingBuffer {
    /// Create an empty buffer. A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            records: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Insert a record, evicting the oldest one when full.
    pub fn add(&self, record: TraceRecord) {
        let mut records = self.lock();
        if records.len() == self.capacity {
            records.pop_front();
        }
        records.push_back(record);
    }

    /// Copy of the retained records, oldest first.
    pub fn snapshot(&self) -> Vec<TraceRecord> {
        self.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // The deque is consistent between operations, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, VecDeque<TraceRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
