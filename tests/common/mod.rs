//! Shared helpers for realm integration tests
//!
//! The realm is a process-wide singleton, so tests in one binary serialize
//! on `world_lock` and reset the singleton between cases.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use mudcore::{Config, Realm};

static WORLD_LOCK: Mutex<()> = Mutex::new(());

/// Hold this for the whole test body; it keeps parallel test threads off
/// the realm singleton
pub fn world_lock() -> MutexGuard<'static, ()> {
    WORLD_LOCK.lock()
}

/// Instantiate a fresh realm over `save_dir`, tearing down any singleton a
/// previous (possibly panicked) test left behind
pub async fn start_realm(save_dir: &Path) -> Arc<Realm> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mudcore=info".into()),
        )
        .with_test_writer()
        .try_init();
    if Realm::try_instance().is_some() {
        Realm::destroy().await;
    }
    Realm::instantiate(Config::with_save_dir(save_dir)).expect("failed to instantiate realm")
}

/// Wait until the sync queue is quiescent
pub async fn settle(realm: &Realm) {
    for _ in 0..1000 {
        if realm.pending_sync() == 0 {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(1)).await;
    }
    panic!("sync queue never drained");
}
