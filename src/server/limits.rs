//! Concurrency bound derived from the host's cores and memory.

use tracing::{info, warn};

/// Workers allowed when the core count is unknown.
const FALLBACK_THREADS: usize = 10;

fn max_threads_by_cpu_cores() -> usize {
    match num_cpus::get() {
        0 => FALLBACK_THREADS,
        cores => 2 * cores,
    }
}

fn max_threads_by_memory(buffer_size: usize) -> Option<usize> {
    match sys_info::mem_info() {
        Ok(mem) => {
            let total_bytes = mem.total.saturating_mul(1024);
            Some((total_bytes / buffer_size.max(1) as u64) as usize)
        }
        Err(e) => {
            warn!(error = %e, "cannot read total memory, bounding by cores only");
            None
        }
    }
}

/// `min(2 × cpu_cores, total_memory / buffer_size)`.
pub fn max_threads(buffer_size: usize) -> usize {
    let by_cores = max_threads_by_cpu_cores();
    match max_threads_by_memory(buffer_size) {
        Some(by_memory) => by_cores.min(by_memory),
        None => by_cores,
    }
}

/// Clamps the requested client count to [`max_threads`]; at least one
/// client is always allowed.
pub fn clamp_max_clients(requested: usize, buffer_size: usize) -> usize {
    let limit = max_threads(buffer_size);
    let effective = requested.min(limit).max(1);
    if effective != requested {
        info!(requested, effective, "max_clients clamped");
    }
    effective
}
