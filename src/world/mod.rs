//! Cross-object operations
//!
//! Everything that touches more than one object at a time lives here:
//! containment, movement, and the post-load init pass. Operations resolve
//! their refs through the realm, lock one object at a time, and reject any
//! call that would corrupt a containment invariant - duplicate entries,
//! self-containment, double-containment - leaving state unchanged.

use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;
use tracing::error;

use crate::objects::{
    remove_ref, Area, Exit, GameObject, GameObjectId, GameObjectRef, GameObjectType, Item, Room,
};
use crate::realm::Realm;

/// Invariant violations and lookup failures from world operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WorldError {
    #[error("object not found: {0}")]
    NotFound(GameObjectRef),

    #[error("{0} is not a {1}")]
    WrongKind(GameObjectRef, GameObjectType),

    #[error("{child} is already in {container}")]
    Duplicate {
        child: GameObjectRef,
        container: GameObjectRef,
    },

    #[error("{child} is not in {container}")]
    NotContained {
        child: GameObjectRef,
        container: GameObjectRef,
    },

    #[error("an object cannot contain itself")]
    SelfReference,

    #[error("{0} is not in a room")]
    NotInRoom(GameObjectRef),

    #[error("{0} cannot be picked up")]
    NotPortable(GameObjectRef),
}

fn resolve_or(reference: GameObjectRef) -> Result<Arc<RwLock<GameObject>>, WorldError> {
    reference.resolve().ok_or(WorldError::NotFound(reference))
}

/// Put a room into an area
///
/// A room already owned by another area is detached from it first - a room
/// is never contained twice. The room's `area` backref is updated in the
/// same operation.
pub fn add_room(area_ref: GameObjectRef, room_ref: GameObjectRef) -> Result<(), WorldError> {
    if area_ref == room_ref {
        return Err(WorldError::SelfReference);
    }
    let area_object = resolve_or(area_ref)?;
    let room_object = resolve_or(room_ref)?;

    {
        let guard = area_object.read();
        let area = guard
            .cast::<Area>()
            .ok_or(WorldError::WrongKind(area_ref, GameObjectType::Area))?;
        if area.contains_room(room_ref) {
            return Err(WorldError::Duplicate {
                child: room_ref,
                container: area_ref,
            });
        }
    }
    let old_area_ref = {
        let guard = room_object.read();
        guard
            .cast::<Room>()
            .ok_or(WorldError::WrongKind(room_ref, GameObjectType::Room))?
            .area
    };

    if !old_area_ref.is_null() && old_area_ref != area_ref {
        if let Some(old_area_object) = old_area_ref.resolve() {
            let mut guard = old_area_object.write();
            let removed = guard
                .cast_mut::<Area>()
                .map(|area| remove_ref(&mut area.rooms, room_ref))
                .unwrap_or(false);
            if removed {
                guard.set_modified();
            }
        }
    }

    {
        let mut guard = room_object.write();
        if let Some(room) = guard.cast_mut::<Room>() {
            room.area = area_ref;
        }
    }
    {
        let mut guard = area_object.write();
        if let Some(area) = guard.cast_mut::<Area>() {
            area.rooms.push(room_ref);
        }
        guard.set_modified();
    }
    Ok(())
}

/// Take a room out of its area, clearing the room's backref
pub fn remove_room(area_ref: GameObjectRef, room_ref: GameObjectRef) -> Result<(), WorldError> {
    let area_object = resolve_or(area_ref)?;

    {
        let mut guard = area_object.write();
        let area = guard
            .cast_mut::<Area>()
            .ok_or(WorldError::WrongKind(area_ref, GameObjectType::Area))?;
        if !remove_ref(&mut area.rooms, room_ref) {
            return Err(WorldError::NotContained {
                child: room_ref,
                container: area_ref,
            });
        }
        guard.set_modified();
    }

    // the room may already be gone; a stale entry still counts as removed
    if let Some(room_object) = room_ref.resolve() {
        let mut guard = room_object.write();
        if let Some(room) = guard.cast_mut::<Room>() {
            if room.area == area_ref {
                room.area = GameObjectRef::NULL;
            }
        }
    }
    Ok(())
}

/// Attach an exit to a room
pub fn add_exit(room_ref: GameObjectRef, exit_ref: GameObjectRef) -> Result<(), WorldError> {
    if room_ref == exit_ref {
        return Err(WorldError::SelfReference);
    }
    let room_object = resolve_or(room_ref)?;
    let exit_object = resolve_or(exit_ref)?;

    if exit_object.read().cast::<Exit>().is_none() {
        return Err(WorldError::WrongKind(exit_ref, GameObjectType::Exit));
    }

    let mut guard = room_object.write();
    let room = guard
        .cast_mut::<Room>()
        .ok_or(WorldError::WrongKind(room_ref, GameObjectType::Room))?;
    if room.has_exit(exit_ref) {
        return Err(WorldError::Duplicate {
            child: exit_ref,
            container: room_ref,
        });
    }
    room.exits.push(exit_ref);
    guard.set_modified();
    Ok(())
}

/// Detach an exit from a room
pub fn remove_exit(room_ref: GameObjectRef, exit_ref: GameObjectRef) -> Result<(), WorldError> {
    let room_object = resolve_or(room_ref)?;

    let mut guard = room_object.write();
    let room = guard
        .cast_mut::<Room>()
        .ok_or(WorldError::WrongKind(room_ref, GameObjectType::Room))?;
    if !remove_ref(&mut room.exits, exit_ref) {
        return Err(WorldError::NotContained {
            child: exit_ref,
            container: room_ref,
        });
    }
    guard.set_modified();
    Ok(())
}

/// Move a character into a room
///
/// Updates the room's presence list and the character's `currentRoom`
/// together; a character already somewhere else leaves that room first.
pub fn enter(character_ref: GameObjectRef, room_ref: GameObjectRef) -> Result<(), WorldError> {
    let character_object = resolve_or(character_ref)?;
    let room_object = resolve_or(room_ref)?;

    if room_object.read().cast::<Room>().is_none() {
        return Err(WorldError::WrongKind(room_ref, GameObjectType::Room));
    }
    let current_ref = {
        let guard = character_object.read();
        guard
            .as_character()
            .ok_or(WorldError::WrongKind(
                character_ref,
                GameObjectType::Character,
            ))?
            .current_room
    };
    if current_ref == room_ref {
        return Ok(());
    }

    if !current_ref.is_null() {
        if let Some(old_room_object) = current_ref.resolve() {
            let mut guard = old_room_object.write();
            if let Some(room) = guard.cast_mut::<Room>() {
                remove_ref(&mut room.characters, character_ref);
            }
        }
    }

    {
        let mut guard = room_object.write();
        if let Some(room) = guard.cast_mut::<Room>() {
            if !room.characters.contains(&character_ref) {
                room.characters.push(character_ref);
            }
        }
    }
    {
        let mut guard = character_object.write();
        if let Some(character) = guard.as_character_mut() {
            character.current_room = room_ref;
        }
        guard.set_modified();
    }
    Ok(())
}

/// Move a character out of the room it is in
pub fn leave(character_ref: GameObjectRef, room_ref: GameObjectRef) -> Result<(), WorldError> {
    let character_object = resolve_or(character_ref)?;

    let current_ref = {
        let guard = character_object.read();
        guard
            .as_character()
            .ok_or(WorldError::WrongKind(
                character_ref,
                GameObjectType::Character,
            ))?
            .current_room
    };
    if current_ref != room_ref {
        return Err(WorldError::NotContained {
            child: character_ref,
            container: room_ref,
        });
    }

    if let Some(room_object) = room_ref.resolve() {
        let mut guard = room_object.write();
        if let Some(room) = guard.cast_mut::<Room>() {
            remove_ref(&mut room.characters, character_ref);
        }
    }
    {
        let mut guard = character_object.write();
        if let Some(character) = guard.as_character_mut() {
            character.current_room = GameObjectRef::NULL;
        }
        guard.set_modified();
    }
    Ok(())
}

/// Place an item on a room's floor
pub fn put_item(room_ref: GameObjectRef, item_ref: GameObjectRef) -> Result<(), WorldError> {
    if room_ref == item_ref {
        return Err(WorldError::SelfReference);
    }
    let room_object = resolve_or(room_ref)?;
    let item_object = resolve_or(item_ref)?;

    if item_object.read().cast::<Item>().is_none() {
        return Err(WorldError::WrongKind(item_ref, GameObjectType::Item));
    }

    let mut guard = room_object.write();
    let room = guard
        .cast_mut::<Room>()
        .ok_or(WorldError::WrongKind(room_ref, GameObjectType::Room))?;
    if room.items.contains(&item_ref) {
        return Err(WorldError::Duplicate {
            child: item_ref,
            container: room_ref,
        });
    }
    room.items.push(item_ref);
    guard.set_modified();
    Ok(())
}

/// Pick an item up from the character's current room
pub fn take_item(character_ref: GameObjectRef, item_ref: GameObjectRef) -> Result<(), WorldError> {
    let character_object = resolve_or(character_ref)?;
    let item_object = resolve_or(item_ref)?;

    {
        let guard = item_object.read();
        let item = guard
            .cast::<Item>()
            .ok_or(WorldError::WrongKind(item_ref, GameObjectType::Item))?;
        if !item.portable {
            return Err(WorldError::NotPortable(item_ref));
        }
    }
    let room_ref = {
        let guard = character_object.read();
        guard
            .as_character()
            .ok_or(WorldError::WrongKind(
                character_ref,
                GameObjectType::Character,
            ))?
            .current_room
    };
    if room_ref.is_null() {
        return Err(WorldError::NotInRoom(character_ref));
    }
    let room_object = resolve_or(room_ref)?;

    {
        let mut guard = room_object.write();
        let room = guard
            .cast_mut::<Room>()
            .ok_or(WorldError::WrongKind(room_ref, GameObjectType::Room))?;
        if !remove_ref(&mut room.items, item_ref) {
            return Err(WorldError::NotContained {
                child: item_ref,
                container: room_ref,
            });
        }
        guard.set_modified();
    }
    {
        let mut guard = character_object.write();
        if let Some(character) = guard.as_character_mut() {
            if !character.carries(item_ref) {
                character.inventory.push(item_ref);
            }
        }
        guard.set_modified();
    }
    Ok(())
}

/// Drop a carried item into the character's current room
pub fn drop_item(character_ref: GameObjectRef, item_ref: GameObjectRef) -> Result<(), WorldError> {
    let character_object = resolve_or(character_ref)?;

    let room_ref = {
        let guard = character_object.read();
        let character = guard.as_character().ok_or(WorldError::WrongKind(
            character_ref,
            GameObjectType::Character,
        ))?;
        if !character.carries(item_ref) {
            return Err(WorldError::NotContained {
                child: item_ref,
                container: character_ref,
            });
        }
        character.current_room
    };
    if room_ref.is_null() {
        return Err(WorldError::NotInRoom(character_ref));
    }
    let room_object = resolve_or(room_ref)?;

    {
        let mut guard = character_object.write();
        if let Some(character) = guard.as_character_mut() {
            remove_ref(&mut character.inventory, item_ref);
        }
        guard.set_modified();
    }
    {
        let mut guard = room_object.write();
        if let Some(room) = guard.cast_mut::<Room>() {
            if !room.items.contains(&item_ref) {
                room.items.push(item_ref);
            }
        }
        guard.set_modified();
    }
    Ok(())
}

/// Rebuild derived state after a world load
///
/// Areas push their `area` backref into each listed room; characters add
/// themselves to their room's presence list. A failure is logged, the
/// object is left registered in its partial state, and the pass continues
/// with the next object. Runs before the realm goes live, so nothing here
/// marks objects modified.
pub(crate) fn initialize(realm: &Realm) -> Vec<GameObjectId> {
    let mut failed = Vec::new();
    for (id, object) in realm.snapshot() {
        if let Err(err) = init_object(realm, id, &object) {
            error!(%id, %err, "init failed, object left partially initialized");
            failed.push(id);
        }
    }
    failed
}

fn init_object(
    realm: &Realm,
    id: GameObjectId,
    object: &Arc<RwLock<GameObject>>,
) -> Result<(), WorldError> {
    let self_ref = GameObjectRef::new(id);
    match id.object_type {
        GameObjectType::Area => {
            let rooms = object
                .read()
                .cast::<Area>()
                .map(|area| area.rooms.clone())
                .unwrap_or_default();
            for room_ref in rooms {
                let room_object = realm
                    .resolve_ref(&room_ref)
                    .ok_or(WorldError::NotFound(room_ref))?;
                let mut guard = room_object.write();
                match guard.cast_mut::<Room>() {
                    Some(room) => room.area = self_ref,
                    None => return Err(WorldError::WrongKind(room_ref, GameObjectType::Room)),
                }
            }
        }
        GameObjectType::Character | GameObjectType::Player => {
            let current_ref = object
                .read()
                .as_character()
                .map(|character| character.current_room)
                .unwrap_or_default();
            if !current_ref.is_null() {
                let room_object = realm
                    .resolve_ref(&current_ref)
                    .ok_or(WorldError::NotFound(current_ref))?;
                let mut guard = room_object.write();
                let room = guard
                    .cast_mut::<Room>()
                    .ok_or(WorldError::WrongKind(current_ref, GameObjectType::Room))?;
                if !room.characters.contains(&self_ref) {
                    room.characters.push(self_ref);
                }
            }
        }
        _ => {}
    }
    Ok(())
}
