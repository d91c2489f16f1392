//! Background persistence
//!
//! The simulation marks objects dirty; the sync worker writes them out.
//! The two sides share exactly one resource, the [`SyncQueue`], which
//! coalesces repeated marks so a rapidly mutated object costs one pending
//! save, not a backlog. The worker re-resolves every id at save time, so a
//! save always captures the latest state, and it only ever reads object
//! state - a worker failure can never corrupt the world.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::{watch, Notify};
use tracing::{debug, info, warn};

use crate::objects::GameObjectId;
use crate::persist;
use crate::realm::Realm;

/// A unit of work for the sync worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTask {
    /// Serialize the object's current state to its record
    Save(GameObjectId),
    /// Remove the object's record from disk
    Delete(GameObjectId),
    /// Write the id-allocation counters
    Counters,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SyncOp {
    Save,
    Delete,
}

#[derive(Default)]
struct QueueState {
    order: VecDeque<GameObjectId>,
    ops: HashMap<GameObjectId, SyncOp>,
    counters: bool,
}

/// Pending-work queue shared by the simulation side and the worker
///
/// Enqueueing coalesces: at most one pending entry per object id at any
/// inspection point, and a delete supersedes a pending save for the same
/// id. Counter writes collapse into a single pending flag.
pub struct SyncQueue {
    state: Mutex<QueueState>,
    notify: Notify,
}

impl Default for SyncQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncQueue {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState::default()),
            notify: Notify::new(),
        }
    }

    /// Queue a save for `id`; a no-op if one is already pending
    pub fn enqueue_save(&self, id: GameObjectId) {
        {
            let mut state = self.state.lock();
            if state.ops.contains_key(&id) {
                // already pending; a queued delete must not be downgraded
                return;
            }
            state.ops.insert(id, SyncOp::Save);
            state.order.push_back(id);
        }
        self.notify.notify_one();
    }

    /// Queue removal of `id`'s record, superseding any pending save
    pub fn enqueue_delete(&self, id: GameObjectId) {
        {
            let mut state = self.state.lock();
            if state.ops.insert(id, SyncOp::Delete).is_none() {
                state.order.push_back(id);
            }
        }
        self.notify.notify_one();
    }

    /// Queue a write of the id-allocation counters
    pub fn enqueue_counters(&self) {
        {
            let mut state = self.state.lock();
            state.counters = true;
        }
        self.notify.notify_one();
    }

    /// Take the next task, object work before counter writes
    pub fn pop(&self) -> Option<SyncTask> {
        let mut state = self.state.lock();
        while let Some(id) = state.order.pop_front() {
            if let Some(op) = state.ops.remove(&id) {
                return Some(match op {
                    SyncOp::Save => SyncTask::Save(id),
                    SyncOp::Delete => SyncTask::Delete(id),
                });
            }
        }
        if state.counters {
            state.counters = false;
            return Some(SyncTask::Counters);
        }
        None
    }

    /// True if a save (not a delete) is still pending for `id`
    pub fn has_pending_save(&self, id: GameObjectId) -> bool {
        self.state.lock().ops.get(&id) == Some(&SyncOp::Save)
    }

    pub fn len(&self) -> usize {
        let state = self.state.lock();
        state.ops.len() + usize::from(state.counters)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Wait until new work is enqueued
    pub async fn wait(&self) {
        self.notify.notified().await;
    }
}

/// Worker loop: drain the queue, sleep until notified, drain again
///
/// On shutdown the queue is drained one final time and the counters are
/// written so id allocation survives the restart. The caller bounds the
/// wait on the task handle.
pub(crate) async fn run(
    realm: Weak<Realm>,
    queue: Arc<SyncQueue>,
    mut shutdown: watch::Receiver<bool>,
) {
    debug!("sync worker started");
    loop {
        while let Some(task) = queue.pop() {
            let Some(realm) = realm.upgrade() else {
                debug!("realm dropped, sync worker exiting");
                return;
            };
            process(&realm, &queue, task).await;
        }
        if *shutdown.borrow() {
            break;
        }
        tokio::select! {
            _ = queue.wait() => {}
            _ = shutdown.changed() => {}
        }
    }

    let mut drained = 0usize;
    while let Some(task) = queue.pop() {
        let Some(realm) = realm.upgrade() else {
            return;
        };
        process(&realm, &queue, task).await;
        drained += 1;
    }
    if let Some(realm) = realm.upgrade() {
        write_counters(&realm).await;
    }
    info!(drained, "sync worker stopped");
}

async fn process(realm: &Realm, queue: &SyncQueue, task: SyncTask) {
    match task {
        SyncTask::Save(id) => save_object(realm, queue, id).await,
        SyncTask::Delete(id) => delete_record(realm, id).await,
        SyncTask::Counters => write_counters(realm).await,
    }
}

async fn save_object(realm: &Realm, queue: &SyncQueue, id: GameObjectId) {
    // Re-resolve at save time: the object may have been mutated again or
    // destroyed since it was marked dirty.
    let Some(object) = realm.resolve(id) else {
        debug!(%id, "object destroyed before save, skipping");
        return;
    };
    let record = {
        let guard = object.read();
        persist::serialize(&guard)
    };
    let path = persist::record_path(&realm.objects_dir(), id);
    match persist::write_record(&path, &record).await {
        Ok(()) => {
            debug!(%id, "object saved");
            if !queue.has_pending_save(id) {
                object.write().clear_modified();
            }
        }
        Err(err) => warn!(%id, %err, "failed to save object, dropping"),
    }
}

async fn delete_record(realm: &Realm, id: GameObjectId) {
    let path = persist::record_path(&realm.objects_dir(), id);
    if let Err(err) = persist::remove_record(&path).await {
        warn!(%id, %err, "failed to remove object record");
    }
}

async fn write_counters(realm: &Realm) {
    if let Err(err) = persist::write_counters(&realm.counters_path(), &realm.counters_snapshot()).await
    {
        warn!(%err, "failed to write id counters");
    }
}
