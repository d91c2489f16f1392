//! Rooms: the places characters move through
//!
//! `area` and `characters` are derived state (`stored: false`): the backref
//! comes from the owning area's room list and the presence list from each
//! character's `currentRoom`, both rebuilt by the init pass after load.

use crate::objects::entity::{GameObject, ObjectClass, ObjectData};
use crate::objects::id::GameObjectType;
use crate::objects::props::{self, PropertyDef, PropertyError};
use crate::objects::refs::GameObjectRef;
use crate::objects::value::{Value, ValueKind};
use crate::objects::vector::Vector3D;

#[derive(Debug, Clone, Default)]
pub struct Room {
    /// Backref to the owning area; derived from `Area::rooms`
    pub area: GameObjectRef,
    pub position: Vector3D,
    pub exits: Vec<GameObjectRef>,
    pub items: Vec<GameObjectRef>,
    /// Characters currently present; derived from `Character::current_room`
    pub characters: Vec<GameObjectRef>,
}

impl Room {
    pub fn has_exit(&self, exit: GameObjectRef) -> bool {
        self.exits.contains(&exit)
    }
}

impl ObjectClass for Room {
    const TYPE: GameObjectType = GameObjectType::Room;

    fn from_object(object: &GameObject) -> Option<&Self> {
        match object.data() {
            ObjectData::Room(room) => Some(room),
            _ => None,
        }
    }

    fn from_object_mut(object: &mut GameObject) -> Option<&mut Self> {
        match object.data_mut() {
            ObjectData::Room(room) => Some(room),
            _ => None,
        }
    }
}

pub(crate) const PROPS: &[PropertyDef] = &[
    PropertyDef {
        name: "area",
        kind: ValueKind::Ref,
        stored: false,
        get: |object| object.cast::<Room>().map(|room| Value::Ref(room.area)),
        set: |object, value| {
            let area = props::expect_ref("area", value)?;
            match object.cast_mut::<Room>() {
                Some(room) => room.area = area,
                None => return Err(PropertyError::Unsupported("area".into())),
            }
            Ok(())
        },
    },
    PropertyDef {
        name: "position",
        kind: ValueKind::Vector,
        stored: true,
        get: |object| object.cast::<Room>().map(|room| Value::Vector(room.position)),
        set: |object, value| {
            let position = props::expect_vector("position", value)?;
            match object.cast_mut::<Room>() {
                Some(room) if room.position != position => room.position = position,
                Some(_) => return Ok(()),
                None => return Err(PropertyError::Unsupported("position".into())),
            }
            object.set_modified();
            Ok(())
        },
    },
    PropertyDef {
        name: "exits",
        kind: ValueKind::RefList,
        stored: true,
        get: |object| object.cast::<Room>().map(|room| Value::RefList(room.exits.clone())),
        set: |object, value| {
            let exits = props::expect_ref_list("exits", value)?;
            match object.cast_mut::<Room>() {
                Some(room) if room.exits != exits => room.exits = exits,
                Some(_) => return Ok(()),
                None => return Err(PropertyError::Unsupported("exits".into())),
            }
            object.set_modified();
            Ok(())
        },
    },
    PropertyDef {
        name: "items",
        kind: ValueKind::RefList,
        stored: true,
        get: |object| object.cast::<Room>().map(|room| Value::RefList(room.items.clone())),
        set: |object, value| {
            let items = props::expect_ref_list("items", value)?;
            match object.cast_mut::<Room>() {
                Some(room) if room.items != items => room.items = items,
                Some(_) => return Ok(()),
                None => return Err(PropertyError::Unsupported("items".into())),
            }
            object.set_modified();
            Ok(())
        },
    },
    PropertyDef {
        name: "characters",
        kind: ValueKind::RefList,
        stored: false,
        get: |object| {
            object
                .cast::<Room>()
                .map(|room| Value::RefList(room.characters.clone()))
        },
        set: |object, value| {
            let characters = props::expect_ref_list("characters", value)?;
            match object.cast_mut::<Room>() {
                Some(room) => room.characters = characters,
                None => return Err(PropertyError::Unsupported("characters".into())),
            }
            Ok(())
        },
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::id::GameObjectId;

    #[test]
    fn test_derived_properties_are_not_stored() {
        let object = GameObject::create(GameObjectId::new(GameObjectType::Room, 1));
        let stored: Vec<&str> = object
            .property_defs()
            .filter(|def| def.stored)
            .map(|def| def.name)
            .collect();
        assert!(stored.contains(&"position"));
        assert!(stored.contains(&"exits"));
        assert!(!stored.contains(&"area"));
        assert!(!stored.contains(&"characters"));
    }

    #[test]
    fn test_position_property() {
        let mut object = GameObject::create(GameObjectId::new(GameObjectType::Room, 1));
        object
            .set_property("position", Value::Vector(Vector3D::new(1, 2, 3)))
            .unwrap();
        assert_eq!(object.cast::<Room>().unwrap().position, Vector3D::new(1, 2, 3));
    }
}
