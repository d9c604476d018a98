//! Bookkeeping of live workers and the reaper that joins finished ones.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, error, info};

use crate::error::ErrorCode;
use crate::server::connection::ConnectionInfo;

/// How often the reaper scans the registry.
pub const REAP_INTERVAL: Duration = Duration::from_secs(1);

/// Identity of a worker, unique for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkerId(u64);

impl WorkerId {
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        WorkerId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "worker-{}", self.0)
    }
}

pub struct WorkerRecord {
    id: WorkerId,
    conn: ConnectionInfo,
    handle: JoinHandle<()>,
    finished: Arc<AtomicBool>,
}

impl WorkerRecord {
    pub fn new(
        id: WorkerId,
        conn: ConnectionInfo,
        handle: JoinHandle<()>,
        finished: Arc<AtomicBool>,
    ) -> Self {
        Self {
            id,
            conn,
            handle,
            finished,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    fn join(self) {
        if self.handle.join().is_err() {
            error!(worker = %self.id, peer = %self.conn.peer, "worker panicked");
        }
    }
}

/// Live workers keyed by identity.
///
/// The lock is held only for the map operation itself; joining happens
/// after it is released.
#[derive(Default)]
pub struct Registry {
    workers: Mutex<HashMap<WorkerId, WorkerRecord>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<WorkerId, WorkerRecord>> {
        self.workers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn register(&self, record: WorkerRecord) {
        let id = record.id;
        let live = {
            let mut workers = self.lock();
            workers.insert(id, record);
            workers.len()
        };
        debug!(worker = %id, live, "worker registered");
    }

    pub fn lookup(&self, id: WorkerId) -> Result<ConnectionInfo, ErrorCode> {
        self.lock()
            .get(&id)
            .map(|record| record.conn)
            .ok_or(ErrorCode::ThreadNotFound)
    }

    /// Drops the entry without joining its thread.
    pub fn remove(&self, id: WorkerId) -> Result<(), ErrorCode> {
        self.lock()
            .remove(&id)
            .map(|_| ())
            .ok_or(ErrorCode::ThreadNotFound)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Entries whose worker has not finished yet.
    pub fn active(&self) -> usize {
        self.lock().values().filter(|r| !r.is_finished()).count()
    }

    /// Removes and joins every worker that has signalled completion.
    /// Returns how many were reaped.
    pub fn reap_finished(&self) -> usize {
        let done: Vec<WorkerRecord> = {
            let mut workers = self.lock();
            let ids: Vec<WorkerId> = workers
                .values()
                .filter(|record| record.is_finished())
                .map(|record| record.id)
                .collect();
            ids.iter().filter_map(|id| workers.remove(id)).collect()
        };

        let count = done.len();
        for record in done {
            debug!(worker = %record.id, peer = %record.conn.peer, "reaping worker");
            record.join();
        }
        count
    }
}

/// Reaper loop: every `interval`, join finished workers.
///
/// Exits once `running` is cleared and the registry has drained.
pub fn run_reaper(registry: Arc<Registry>, running: Arc<AtomicBool>, interval: Duration) {
    info!("Reaper started");
    loop {
        thread::sleep(interval);
        let reaped = registry.reap_finished();
        if reaped > 0 {
            debug!(reaped, live = registry.len(), "reaper tick");
        }
        if !running.load(Ordering::Acquire) && registry.is_empty() {
            break;
        }
    }
    info!("Reaper stopped");
}
