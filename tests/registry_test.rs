//! Registry lifecycle: create, resolve, name lookup, destroy, dirty queue

mod common;

use common::{settle, start_realm, world_lock};
use mudcore::objects::{GameObjectType, Value};
use mudcore::Realm;

#[tokio::test]
async fn test_resolve_until_unregistered() {
    let _guard = world_lock();
    let dir = tempfile::tempdir().unwrap();
    let realm = start_realm(dir.path()).await;

    let item_ref = realm.create_object(GameObjectType::Item);
    let id = item_ref.id().unwrap();
    assert!(realm.resolve(id).is_some());
    assert!(item_ref.resolve().is_some());

    assert!(realm.destroy_object(id));
    assert!(realm.resolve(id).is_none());
    assert!(item_ref.resolve().is_none());

    // destroying again is a no-op
    assert!(!realm.destroy_object(id));

    Realm::destroy().await;
}

#[tokio::test]
async fn test_ids_are_monotonic_per_type() {
    let _guard = world_lock();
    let dir = tempfile::tempdir().unwrap();
    let realm = start_realm(dir.path()).await;

    let first = realm.create_object(GameObjectType::Room).id().unwrap();
    let second = realm.create_object(GameObjectType::Room).id().unwrap();
    assert_eq!(second.id, first.id + 1);

    // destroying does not return the id to the pool
    realm.destroy_object(second);
    let third = realm.create_object(GameObjectType::Room).id().unwrap();
    assert!(third.id > second.id);

    // each type has its own namespace, also starting at 1
    let item = realm.create_object(GameObjectType::Item).id().unwrap();
    assert_eq!(item.id, 1);

    Realm::destroy().await;
}

#[tokio::test]
async fn test_name_index_is_case_insensitive() {
    let _guard = world_lock();
    let dir = tempfile::tempdir().unwrap();
    let realm = start_realm(dir.path()).await;

    let player_ref = realm.create_object(GameObjectType::Player);
    {
        let object = player_ref.resolve().unwrap();
        object
            .write()
            .set_property("name", Value::String("Gandalf".into()))
            .unwrap();
    }

    assert!(realm.resolve_by_name("gandalf").is_some());
    assert!(realm.resolve_by_name("GANDALF").is_some());
    assert!(realm.resolve_by_name("saruman").is_none());

    // only characters and players are name-addressable
    let room_ref = realm.create_object(GameObjectType::Room);
    room_ref.resolve().unwrap().write().set_name("Moria").unwrap();
    assert!(realm.resolve_by_name("moria").is_none());

    Realm::destroy().await;
}

#[tokio::test]
async fn test_rename_moves_the_index_entry() {
    let _guard = world_lock();
    let dir = tempfile::tempdir().unwrap();
    let realm = start_realm(dir.path()).await;

    let player_ref = realm.create_object(GameObjectType::Player);
    let object = player_ref.resolve().unwrap();
    object.write().set_name("Strider").unwrap();
    assert!(realm.resolve_by_name("strider").is_some());

    object.write().set_name("Aragorn").unwrap();
    assert!(realm.resolve_by_name("strider").is_none());
    assert!(realm.resolve_by_name("aragorn").is_some());

    Realm::destroy().await;
}

#[tokio::test]
async fn test_destroy_removes_name_entry_synchronously() {
    let _guard = world_lock();
    let dir = tempfile::tempdir().unwrap();
    let realm = start_realm(dir.path()).await;

    let player_ref = realm.create_object(GameObjectType::Player);
    let id = player_ref.id().unwrap();
    player_ref.resolve().unwrap().write().set_name("Boromir").unwrap();
    assert!(realm.resolve_by_name("boromir").is_some());

    realm.destroy_object(id);
    // the name index is a subset view of the id map: removal is synchronous
    assert!(realm.resolve_by_name("boromir").is_none());

    Realm::destroy().await;
}

#[tokio::test]
async fn test_mark_dirty_coalesces() {
    let _guard = world_lock();
    let dir = tempfile::tempdir().unwrap();
    let realm = start_realm(dir.path()).await;

    let item_ref = realm.create_object(GameObjectType::Item);
    let id = item_ref.id().unwrap();
    settle(&realm).await;

    // no awaits between the marks: the worker cannot interleave here
    for _ in 0..50 {
        realm.mark_dirty(id);
    }
    assert_eq!(realm.pending_sync(), 1);

    Realm::destroy().await;
}

#[tokio::test]
async fn test_instantiate_twice_fails() {
    let _guard = world_lock();
    let dir = tempfile::tempdir().unwrap();
    let _realm = start_realm(dir.path()).await;

    let again = Realm::instantiate(mudcore::Config::with_save_dir(dir.path()));
    assert!(again.is_err());

    Realm::destroy().await;
    assert!(Realm::try_instance().is_none());
}
