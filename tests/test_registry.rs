use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use simple_http_server::error::ErrorCode;
use simple_http_server::server::connection::{AddressFamily, ConnectionInfo};
use simple_http_server::server::registry::{Registry, WorkerId, WorkerRecord, run_reaper};

fn info(port: u16) -> ConnectionInfo {
    let peer: SocketAddr = ([127, 0, 0, 1], port).into();
    ConnectionInfo {
        fd: 3,
        peer,
        family: AddressFamily::of(&peer),
    }
}

fn record(id: WorkerId, port: u16, finished: bool) -> WorkerRecord {
    let flag = Arc::new(AtomicBool::new(finished));
    let handle = thread::spawn(|| {});
    WorkerRecord::new(id, info(port), handle, flag)
}

#[test]
fn test_worker_ids_are_unique() {
    let ids: HashSet<WorkerId> = (0..1000).map(|_| WorkerId::next()).collect();
    assert_eq!(ids.len(), 1000);
}

#[test]
fn test_register_then_lookup() {
    let registry = Registry::new();
    let id = WorkerId::next();
    registry.register(record(id, 4000, false));

    let conn = registry.lookup(id).unwrap();
    assert_eq!(conn.peer.port(), 4000);
    assert_eq!(conn.family, AddressFamily::V4);
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_remove_then_lookup_fails() {
    let registry = Registry::new();
    let id = WorkerId::next();
    registry.register(record(id, 4001, false));

    registry.remove(id).unwrap();
    assert!(matches!(registry.lookup(id), Err(ErrorCode::ThreadNotFound)));
    assert!(matches!(registry.remove(id), Err(ErrorCode::ThreadNotFound)));
    assert!(registry.is_empty());
}

#[test]
fn test_unknown_id_is_thread_not_found() {
    let registry = Registry::new();
    assert!(matches!(registry.lookup(WorkerId::next()), Err(ErrorCode::ThreadNotFound)));
}

#[test]
fn test_reap_only_removes_finished_workers() {
    let registry = Registry::new();
    let done = WorkerId::next();
    let busy = WorkerId::next();
    registry.register(record(done, 5000, true));
    registry.register(record(busy, 5001, false));

    assert_eq!(registry.active(), 1);
    assert_eq!(registry.reap_finished(), 1);
    assert!(registry.lookup(done).is_err());
    assert!(registry.lookup(busy).is_ok());
    assert_eq!(registry.reap_finished(), 0);
}

#[test]
fn test_reaper_joins_workers_as_they_finish_and_exits_when_drained() {
    let registry = Arc::new(Registry::new());
    let running = Arc::new(AtomicBool::new(true));

    let finished = Arc::new(AtomicBool::new(false));
    let id = WorkerId::next();
    let flag = Arc::clone(&finished);
    let handle = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        flag.store(true, Ordering::Release);
    });
    registry.register(WorkerRecord::new(id, info(6000), handle, finished));

    let reaper = {
        let registry = Arc::clone(&registry);
        let running = Arc::clone(&running);
        thread::spawn(move || run_reaper(registry, running, Duration::from_millis(20)))
    };

    thread::sleep(Duration::from_millis(300));
    assert!(registry.is_empty());

    running.store(false, Ordering::Release);
    reaper.join().unwrap();
}

#[test]
fn test_concurrent_registration() {
    let registry = Arc::new(Registry::new());
    let threads: Vec<_> = (0..8)
        .map(|t| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                for i in 0..25 {
                    registry.register(record(WorkerId::next(), 7000 + t * 25 + i, true));
                }
            })
        })
        .collect();
    for t in threads {
        t.join().unwrap();
    }

    assert_eq!(registry.len(), 200);
    assert_eq!(registry.reap_finished(), 200);
    assert!(registry.is_empty());
}
