//! The realm - process-wide object registry and id authority
//!
//! All object creation, destruction, and reference resolution flow through
//! the realm. It is an explicit singleton with an `instantiate`/`destroy`
//! lifecycle (not implicit static construction) so tests and embedders can
//! reset world state deliberately. The realm owns the authoritative id map,
//! the character name index (always a subset view of the id map), the
//! per-type id counters, and the background sync worker.

mod names;

pub use names::{validate_character_name, NameError};

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use parking_lot::{Mutex, RwLock};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::objects::{
    remove_ref, Area, GameObject, GameObjectId, GameObjectRef, GameObjectType, Room,
};
use crate::persist;
use crate::sync::{self, SyncQueue};
use crate::world;
use crate::Config;

static INSTANCE: RwLock<Option<Arc<Realm>>> = RwLock::new(None);

/// What happened during world load
#[derive(Debug, Clone, Default)]
pub struct LoadSummary {
    /// Objects registered from records
    pub loaded: usize,
    /// Corrupt or unreadable records skipped
    pub skipped: usize,
    /// Objects whose init pass failed; left registered, partially initialized
    pub failed_init: Vec<GameObjectId>,
}

/// The object registry
pub struct Realm {
    config: Config,
    objects: RwLock<HashMap<GameObjectId, Arc<RwLock<GameObject>>>>,
    /// Lowercased name -> ref, characters and players only
    characters: RwLock<HashMap<String, GameObjectRef>>,
    next_ids: Mutex<HashMap<GameObjectType, u32>>,
    queue: Arc<SyncQueue>,
    shutdown: watch::Sender<bool>,
    worker: Mutex<Option<JoinHandle<()>>>,
    load: LoadSummary,
}

impl Realm {
    /// Create the process-wide realm: load the world from the save
    /// directory, rebuild derived state, and start the sync worker
    ///
    /// Must run inside a tokio runtime. Fails if a realm already exists.
    pub fn instantiate(config: Config) -> Result<Arc<Realm>> {
        if INSTANCE.read().is_some() {
            bail!("realm is already instantiated");
        }

        let objects_dir = config.save_dir.join("objects");
        std::fs::create_dir_all(&objects_dir)
            .with_context(|| format!("creating {}", objects_dir.display()))?;

        let mut realm = Realm {
            config,
            objects: RwLock::new(HashMap::new()),
            characters: RwLock::new(HashMap::new()),
            next_ids: Mutex::new(HashMap::new()),
            queue: Arc::new(SyncQueue::new()),
            shutdown: watch::channel(false).0,
            worker: Mutex::new(None),
            load: LoadSummary::default(),
        };

        let mut summary = realm.load_world()?;
        summary.failed_init = world::initialize(&realm);
        info!(
            loaded = summary.loaded,
            skipped = summary.skipped,
            failed_init = summary.failed_init.len(),
            "world loaded"
        );
        realm.load = summary;

        let realm = Arc::new(realm);
        {
            let mut slot = INSTANCE.write();
            if slot.is_some() {
                bail!("realm is already instantiated");
            }
            *slot = Some(realm.clone());
        }

        let handle = tokio::spawn(sync::run(
            Arc::downgrade(&realm),
            realm.queue.clone(),
            realm.shutdown.subscribe(),
        ));
        *realm.worker.lock() = Some(handle);

        info!(save_dir = %realm.config.save_dir.display(), "realm instantiated");
        Ok(realm)
    }

    /// The singleton; panics if [`instantiate`](Realm::instantiate) has not
    /// run - calling this before then is a programming error
    pub fn instance() -> Arc<Realm> {
        Realm::try_instance().expect("realm is not instantiated")
    }

    pub fn try_instance() -> Option<Arc<Realm>> {
        INSTANCE.read().clone()
    }

    /// Tear down the singleton, draining pending saves with a bounded wait
    pub async fn destroy() {
        let realm = { INSTANCE.write().take() };
        let Some(realm) = realm else {
            warn!("realm destroy requested but none is instantiated");
            return;
        };
        let _ = realm.shutdown.send(true);
        let handle = realm.worker.lock().take();
        if let Some(mut handle) = handle {
            let limit = Duration::from_secs(realm.config.sync_shutdown_timeout_secs);
            if tokio::time::timeout(limit, &mut handle).await.is_err() {
                warn!("sync worker did not drain in time, aborting");
                handle.abort();
            }
        }
        info!("realm destroyed");
    }

    pub fn save_dir(&self) -> &Path {
        &self.config.save_dir
    }

    pub fn objects_dir(&self) -> PathBuf {
        self.config.save_dir.join("objects")
    }

    pub(crate) fn counters_path(&self) -> PathBuf {
        self.config.save_dir.join("realm.json")
    }

    pub fn load_summary(&self) -> &LoadSummary {
        &self.load
    }

    /// Next unused id for the type; ids start at 1 and are never reused
    ///
    /// Exhausting the 32-bit id space is unrecoverable and aborts the
    /// process.
    pub fn allocate_id(&self, object_type: GameObjectType) -> GameObjectId {
        let id = {
            let mut next_ids = self.next_ids.lock();
            let counter = next_ids.entry(object_type).or_insert(1);
            let id = *counter;
            *counter = counter.checked_add(1).expect("object id space exhausted");
            id
        };
        self.queue.enqueue_counters();
        GameObjectId::new(object_type, id)
    }

    /// Create, register, and queue the initial save of a fresh object
    pub fn create_object(&self, object_type: GameObjectType) -> GameObjectRef {
        let id = self.allocate_id(object_type);
        let object_ref = self.register(GameObject::create(id));
        if let Some(object) = self.resolve(id) {
            object.write().flag_modified();
        }
        self.mark_dirty(id);
        info!(%id, "object created");
        object_ref
    }

    /// Insert an already-built object into the registry
    ///
    /// Registering an id twice is a programming error: fatal in debug
    /// builds, logged and ignored in release.
    pub fn register(&self, object: GameObject) -> GameObjectRef {
        let id = object.id();
        let object_ref = object.object_ref();
        let name = object.name().to_string();
        {
            let mut objects = self.objects.write();
            if objects.contains_key(&id) {
                debug_assert!(false, "duplicate object id {id}");
                warn!(%id, "attempted to register duplicate object id, ignoring");
                return object_ref;
            }
            objects.insert(id, Arc::new(RwLock::new(object)));
        }
        if id.object_type.is_character() && !name.is_empty() {
            self.index_character(&name, object_ref);
        }
        debug!(%id, "object registered");
        object_ref
    }

    /// Remove an object from the id map and, synchronously, the name index
    pub fn unregister(&self, id: GameObjectId) {
        let removed = { self.objects.write().remove(&id) };
        let Some(object) = removed else {
            return;
        };
        if id.object_type.is_character() {
            let key = object.read().name().to_lowercase();
            let mut characters = self.characters.write();
            if matches!(characters.get(&key), Some(r) if r.id() == Some(id)) {
                characters.remove(&key);
            }
        }
        debug!(%id, "object unregistered");
    }

    /// O(1) lookup; `None` covers both never-existed and since-destroyed
    pub fn resolve(&self, id: GameObjectId) -> Option<Arc<RwLock<GameObject>>> {
        self.objects.read().get(&id).cloned()
    }

    pub fn resolve_ref(&self, reference: &GameObjectRef) -> Option<Arc<RwLock<GameObject>>> {
        self.resolve(reference.id()?)
    }

    /// Case-insensitive lookup of an addressable character or player
    pub fn resolve_by_name(&self, name: &str) -> Option<Arc<RwLock<GameObject>>> {
        let reference = { self.characters.read().get(&name.to_lowercase()).copied() }?;
        self.resolve_ref(&reference)
    }

    /// Queue a save for the object; rapid repeat marks coalesce into one
    pub fn mark_dirty(&self, id: GameObjectId) {
        self.queue.enqueue_save(id);
    }

    /// Pending sync tasks (saves, deletes, counter writes)
    pub fn pending_sync(&self) -> usize {
        self.queue.len()
    }

    pub fn object_count(&self) -> usize {
        self.objects.read().len()
    }

    /// Destroy an object: detach the back-references the registry knows
    /// about, drop it from both indices, and queue removal of its record
    ///
    /// Refs held in arbitrary properties elsewhere are not chased; they
    /// self-heal to null on their next resolution.
    pub fn destroy_object(&self, id: GameObjectId) -> bool {
        let Some(object) = self.resolve(id) else {
            return false;
        };
        let self_ref = GameObjectRef::new(id);
        match id.object_type {
            GameObjectType::Area => {
                let rooms = object
                    .read()
                    .cast::<Area>()
                    .map(|area| area.rooms.clone())
                    .unwrap_or_default();
                for room_ref in rooms {
                    if let Some(room_object) = self.resolve_ref(&room_ref) {
                        let mut guard = room_object.write();
                        if let Some(room) = guard.cast_mut::<Room>() {
                            if room.area == self_ref {
                                room.area = GameObjectRef::NULL;
                            }
                        }
                    }
                }
            }
            GameObjectType::Room => {
                let (area_ref, present) = {
                    let guard = object.read();
                    match guard.cast::<Room>() {
                        Some(room) => (room.area, room.characters.clone()),
                        None => (GameObjectRef::NULL, Vec::new()),
                    }
                };
                if let Some(area_object) = self.resolve_ref(&area_ref) {
                    let mut guard = area_object.write();
                    let removed = guard
                        .cast_mut::<Area>()
                        .map(|area| remove_ref(&mut area.rooms, self_ref))
                        .unwrap_or(false);
                    if removed {
                        guard.set_modified();
                    }
                }
                for character_ref in present {
                    if let Some(character_object) = self.resolve_ref(&character_ref) {
                        let mut guard = character_object.write();
                        let cleared = match guard.as_character_mut() {
                            Some(character) if character.current_room == self_ref => {
                                character.current_room = GameObjectRef::NULL;
                                true
                            }
                            _ => false,
                        };
                        if cleared {
                            guard.set_modified();
                        }
                    }
                }
            }
            GameObjectType::Character | GameObjectType::Player => {
                let room_ref = object
                    .read()
                    .as_character()
                    .map(|character| character.current_room)
                    .unwrap_or_default();
                if let Some(room_object) = self.resolve_ref(&room_ref) {
                    let mut guard = room_object.write();
                    if let Some(room) = guard.cast_mut::<Room>() {
                        remove_ref(&mut room.characters, self_ref);
                    }
                }
            }
            _ => {}
        }
        self.unregister(id);
        self.queue.enqueue_delete(id);
        info!(%id, "object destroyed");
        true
    }

    pub(crate) fn index_character(&self, name: &str, reference: GameObjectRef) {
        let key = name.to_lowercase();
        let previous = self.characters.write().insert(key, reference);
        if let Some(previous) = previous {
            if previous != reference {
                warn!(name, "character name collision, newer registration wins");
            }
        }
    }

    pub(crate) fn reindex_character(&self, old: &str, new: &str, reference: GameObjectRef) {
        if !old.is_empty() {
            let key = old.to_lowercase();
            let mut characters = self.characters.write();
            if matches!(characters.get(&key), Some(r) if *r == reference) {
                characters.remove(&key);
            }
        }
        self.index_character(new, reference);
    }

    /// Per-type counters keyed by tag, for the counters record
    pub(crate) fn counters_snapshot(&self) -> HashMap<String, u32> {
        self.next_ids
            .lock()
            .iter()
            .map(|(object_type, next)| (object_type.as_str().to_string(), *next))
            .collect()
    }

    /// All live objects in id order
    pub(crate) fn snapshot(&self) -> Vec<(GameObjectId, Arc<RwLock<GameObject>>)> {
        let objects = self.objects.read();
        let mut all: Vec<_> = objects
            .iter()
            .map(|(id, object)| (*id, object.clone()))
            .collect();
        all.sort_by_key(|(id, _)| *id);
        all
    }

    fn load_world(&self) -> Result<LoadSummary> {
        let mut summary = LoadSummary::default();

        match persist::read_counters(&self.counters_path()) {
            Ok(counters) => {
                let mut next_ids = self.next_ids.lock();
                for (tag, next) in counters {
                    match GameObjectType::from_tag(&tag) {
                        Some(object_type) => {
                            next_ids.insert(object_type, next);
                        }
                        None => warn!(%tag, "ignoring unknown type in id counters"),
                    }
                }
            }
            Err(err) => warn!(%err, "could not read id counters, starting fresh"),
        }

        let objects_dir = self.objects_dir();
        let entries = std::fs::read_dir(&objects_dir)
            .with_context(|| format!("reading {}", objects_dir.display()))?;

        let mut records: Vec<(GameObjectId, PathBuf)> = Vec::new();
        for entry in entries {
            let entry = entry?;
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            match persist::parse_record_file_name(name) {
                Some(id) => records.push((id, entry.path())),
                None => {
                    if !name.ends_with(".tmp") {
                        warn!(file = name, "ignoring unrecognized file in objects directory");
                    }
                }
            }
        }
        records.sort();

        for (id, path) in records {
            match persist::read_record(&path).and_then(|record| persist::deserialize(id, &record))
            {
                Ok(object) => {
                    self.register(object);
                    self.note_loaded_id(id);
                    summary.loaded += 1;
                }
                Err(err) => {
                    // one bad record must never take the rest of the world
                    // down with it
                    warn!(%id, %err, "skipping corrupt object record");
                    summary.skipped += 1;
                }
            }
        }
        Ok(summary)
    }

    /// Floor the type's counter so a stale counters file cannot recycle a
    /// loaded object's id
    fn note_loaded_id(&self, id: GameObjectId) {
        let mut next_ids = self.next_ids.lock();
        let counter = next_ids.entry(id.object_type).or_insert(1);
        if *counter <= id.id {
            *counter = id.id.checked_add(1).expect("object id space exhausted");
        }
    }
}
