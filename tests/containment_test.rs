//! Containment invariants and movement across the object graph

mod common;

use common::{start_realm, world_lock};
use mudcore::objects::{Area, Character, Exit, GameObjectRef, GameObjectType, Room};
use mudcore::world::{self, WorldError};
use mudcore::Realm;

fn area_of(reference: GameObjectRef) -> GameObjectRef {
    let object = reference.resolve().unwrap();
    let guard = object.read();
    guard.cast::<Room>().unwrap().area
}

fn area_rooms(reference: GameObjectRef) -> Vec<GameObjectRef> {
    let object = reference.resolve().unwrap();
    let guard = object.read();
    guard.cast::<Area>().unwrap().rooms.clone()
}

fn room_characters(reference: GameObjectRef) -> Vec<GameObjectRef> {
    let object = reference.resolve().unwrap();
    let guard = object.read();
    guard.cast::<Room>().unwrap().characters.clone()
}

#[tokio::test]
async fn test_add_room_sets_backref() {
    let _guard = world_lock();
    let dir = tempfile::tempdir().unwrap();
    let realm = start_realm(dir.path()).await;

    let area = realm.create_object(GameObjectType::Area);
    let room = realm.create_object(GameObjectType::Room);

    world::add_room(area, room).unwrap();
    assert_eq!(area_rooms(area), vec![room]);
    assert_eq!(area_of(room), area);

    Realm::destroy().await;
}

#[tokio::test]
async fn test_no_double_containment() {
    let _guard = world_lock();
    let dir = tempfile::tempdir().unwrap();
    let realm = start_realm(dir.path()).await;

    let first = realm.create_object(GameObjectType::Area);
    let second = realm.create_object(GameObjectType::Area);
    let room = realm.create_object(GameObjectType::Room);

    world::add_room(first, room).unwrap();
    world::add_room(second, room).unwrap();

    // exactly one area's room list contains the room
    assert_eq!(area_rooms(first), Vec::new());
    assert_eq!(area_rooms(second), vec![room]);
    assert_eq!(area_of(room), second);

    // adding to the same area again is an invariant violation
    assert_eq!(
        world::add_room(second, room),
        Err(WorldError::Duplicate {
            child: room,
            container: second,
        })
    );
    assert_eq!(area_rooms(second), vec![room]);

    Realm::destroy().await;
}

#[tokio::test]
async fn test_remove_room_clears_backref() {
    let _guard = world_lock();
    let dir = tempfile::tempdir().unwrap();
    let realm = start_realm(dir.path()).await;

    let area = realm.create_object(GameObjectType::Area);
    let room = realm.create_object(GameObjectType::Room);
    world::add_room(area, room).unwrap();

    world::remove_room(area, room).unwrap();
    assert_eq!(area_rooms(area), Vec::new());
    assert!(area_of(room).is_null());

    assert_eq!(
        world::remove_room(area, room),
        Err(WorldError::NotContained {
            child: room,
            container: area,
        })
    );

    Realm::destroy().await;
}

#[tokio::test]
async fn test_kind_checks() {
    let _guard = world_lock();
    let dir = tempfile::tempdir().unwrap();
    let realm = start_realm(dir.path()).await;

    let area = realm.create_object(GameObjectType::Area);
    let room = realm.create_object(GameObjectType::Room);
    let item = realm.create_object(GameObjectType::Item);

    assert_eq!(
        world::add_room(item, room),
        Err(WorldError::WrongKind(item, GameObjectType::Area))
    );
    assert_eq!(
        world::add_room(area, item),
        Err(WorldError::WrongKind(item, GameObjectType::Room))
    );
    assert_eq!(
        world::add_exit(room, item),
        Err(WorldError::WrongKind(item, GameObjectType::Exit))
    );

    // nothing was mutated by the rejected calls
    assert_eq!(area_rooms(area), Vec::new());

    Realm::destroy().await;
}

#[tokio::test]
async fn test_exit_list_rejects_duplicates() {
    let _guard = world_lock();
    let dir = tempfile::tempdir().unwrap();
    let realm = start_realm(dir.path()).await;

    let room = realm.create_object(GameObjectType::Room);
    let exit = realm.create_object(GameObjectType::Exit);

    world::add_exit(room, exit).unwrap();
    assert_eq!(
        world::add_exit(room, exit),
        Err(WorldError::Duplicate {
            child: exit,
            container: room,
        })
    );

    world::remove_exit(room, exit).unwrap();
    assert_eq!(
        world::remove_exit(room, exit),
        Err(WorldError::NotContained {
            child: exit,
            container: room,
        })
    );

    Realm::destroy().await;
}

#[tokio::test]
async fn test_movement_through_exit() {
    let _guard = world_lock();
    let dir = tempfile::tempdir().unwrap();
    let realm = start_realm(dir.path()).await;

    // Area with two rooms joined by an exit
    let area = realm.create_object(GameObjectType::Area);
    let first = realm.create_object(GameObjectType::Room);
    let second = realm.create_object(GameObjectType::Room);
    world::add_room(area, first).unwrap();
    world::add_room(area, second).unwrap();

    let east = realm.create_object(GameObjectType::Exit);
    {
        let object = east.resolve().unwrap();
        let mut guard = object.write();
        guard.set_name("east").unwrap();
        guard.cast_mut::<Exit>().unwrap().destination = second;
    }
    world::add_exit(first, east).unwrap();

    let character = realm.create_object(GameObjectType::Character);
    character.resolve().unwrap().write().set_name("Gimli").unwrap();
    world::enter(character, first).unwrap();
    assert_eq!(room_characters(first), vec![character]);

    // walk the exit: leave the source, enter the destination
    let destination = {
        let object = east.resolve().unwrap();
        let guard = object.read();
        guard.cast::<Exit>().unwrap().destination
    };
    world::leave(character, first).unwrap();
    world::enter(character, destination).unwrap();

    // both containment lists updated, nothing else touched
    assert_eq!(room_characters(first), Vec::new());
    assert_eq!(room_characters(second), vec![character]);
    {
        let object = character.resolve().unwrap();
        let guard = object.read();
        let state = guard.as_character().unwrap();
        assert_eq!(state.current_room, second);
        assert_eq!(state.inventory, Vec::new());
    }
    assert_eq!(area_rooms(area), vec![first, second]);

    Realm::destroy().await;
}

#[tokio::test]
async fn test_leave_requires_presence() {
    let _guard = world_lock();
    let dir = tempfile::tempdir().unwrap();
    let realm = start_realm(dir.path()).await;

    let room = realm.create_object(GameObjectType::Room);
    let character = realm.create_object(GameObjectType::Character);
    character.resolve().unwrap().write().set_name("Merry").unwrap();

    assert_eq!(
        world::leave(character, room),
        Err(WorldError::NotContained {
            child: character,
            container: room,
        })
    );

    Realm::destroy().await;
}

#[tokio::test]
async fn test_take_and_drop_item() {
    let _guard = world_lock();
    let dir = tempfile::tempdir().unwrap();
    let realm = start_realm(dir.path()).await;

    let room = realm.create_object(GameObjectType::Room);
    let character = realm.create_object(GameObjectType::Character);
    character.resolve().unwrap().write().set_name("Pippin").unwrap();
    world::enter(character, room).unwrap();

    let lamp = realm.create_object(GameObjectType::Item);
    world::put_item(room, lamp).unwrap();
    assert_eq!(
        world::put_item(room, lamp),
        Err(WorldError::Duplicate {
            child: lamp,
            container: room,
        })
    );

    world::take_item(character, lamp).unwrap();
    {
        let object = character.resolve().unwrap();
        let guard = object.read();
        assert!(guard.as_character().unwrap().carries(lamp));
    }
    // already taken
    assert!(matches!(
        world::take_item(character, lamp),
        Err(WorldError::NotContained { .. })
    ));

    world::drop_item(character, lamp).unwrap();
    {
        let room_object = room.resolve().unwrap();
        let guard = room_object.read();
        assert_eq!(guard.cast::<Room>().unwrap().items, vec![lamp]);
    }
    {
        let object = character.resolve().unwrap();
        let guard = object.read();
        assert!(!guard.as_character().unwrap().carries(lamp));
    }

    Realm::destroy().await;
}

#[tokio::test]
async fn test_fixed_items_cannot_be_taken() {
    let _guard = world_lock();
    let dir = tempfile::tempdir().unwrap();
    let realm = start_realm(dir.path()).await;

    let room = realm.create_object(GameObjectType::Room);
    let character = realm.create_object(GameObjectType::Character);
    character.resolve().unwrap().write().set_name("Frodo").unwrap();
    world::enter(character, room).unwrap();

    let statue = realm.create_object(GameObjectType::Item);
    {
        let object = statue.resolve().unwrap();
        let mut guard = object.write();
        guard
            .set_property("portable", mudcore::objects::Value::Bool(false))
            .unwrap();
    }
    world::put_item(room, statue).unwrap();

    assert_eq!(
        world::take_item(character, statue),
        Err(WorldError::NotPortable(statue))
    );

    Realm::destroy().await;
}

#[tokio::test]
async fn test_refs_heal_to_null_after_destroy() {
    let _guard = world_lock();
    let dir = tempfile::tempdir().unwrap();
    let realm = start_realm(dir.path()).await;

    let area = realm.create_object(GameObjectType::Area);
    let room = realm.create_object(GameObjectType::Room);
    world::add_room(area, room).unwrap();

    let exit = realm.create_object(GameObjectType::Exit);
    exit.resolve().unwrap().write().cast_mut::<Exit>().unwrap().destination = room;

    let character = realm.create_object(GameObjectType::Character);
    character.resolve().unwrap().write().set_name("Sam").unwrap();
    world::enter(character, room).unwrap();

    realm.destroy_object(room.id().unwrap());

    // the exit still holds the ref; it now resolves to nothing
    let stale = {
        let object = exit.resolve().unwrap();
        let guard = object.read();
        guard.cast::<Exit>().unwrap().destination
    };
    assert_eq!(stale, room);
    assert!(stale.resolve().is_none());

    // known back-references were detached eagerly
    assert_eq!(area_rooms(area), Vec::new());
    {
        let object = character.resolve().unwrap();
        let guard = object.read();
        assert!(guard.as_character().unwrap().current_room.is_null());
    }

    Realm::destroy().await;
}

#[tokio::test]
async fn test_cast_through_refs_is_checked() {
    let _guard = world_lock();
    let dir = tempfile::tempdir().unwrap();
    let realm = start_realm(dir.path()).await;

    let room = realm.create_object(GameObjectType::Room);

    // ref-level narrowing checks the type tag before resolving
    assert!(room.cast::<Area>().is_none());
    assert!(room.cast::<Character>().is_none());
    assert!(room.cast::<Room>().is_some());

    // object-level downcast is equally strict
    let object = room.resolve().unwrap();
    let guard = object.read();
    assert!(guard.cast::<Area>().is_none());
    assert!(guard.cast::<Room>().is_some());
    drop(guard);

    // a cast to the right kind still fails once the object is gone
    realm.destroy_object(room.id().unwrap());
    assert!(room.cast::<Room>().is_none());

    Realm::destroy().await;
}
