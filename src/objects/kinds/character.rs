//! Characters: the living inhabitants of the world
//!
//! This table is shared with the Player kind: the accessors go through
//! `as_character`, which exposes a player's embedded character state.

use crate::objects::entity::{GameObject, ObjectClass, ObjectData};
use crate::objects::id::GameObjectType;
use crate::objects::props::{self, PropertyDef, PropertyError};
use crate::objects::refs::GameObjectRef;
use crate::objects::value::{Value, ValueKind};

#[derive(Debug, Clone)]
pub struct Character {
    pub current_room: GameObjectRef,
    pub inventory: Vec<GameObjectRef>,
    pub hp: i64,
    pub max_hp: i64,
    pub gold: i64,
}

impl Default for Character {
    fn default() -> Self {
        Self {
            current_room: GameObjectRef::NULL,
            inventory: Vec::new(),
            hp: 100,
            max_hp: 100,
            gold: 0,
        }
    }
}

impl Character {
    pub fn carries(&self, item: GameObjectRef) -> bool {
        self.inventory.contains(&item)
    }
}

impl ObjectClass for Character {
    const TYPE: GameObjectType = GameObjectType::Character;

    fn from_object(object: &GameObject) -> Option<&Self> {
        match object.data() {
            ObjectData::Character(character) => Some(character),
            _ => None,
        }
    }

    fn from_object_mut(object: &mut GameObject) -> Option<&mut Self> {
        match object.data_mut() {
            ObjectData::Character(character) => Some(character),
            _ => None,
        }
    }
}

fn unsupported(property: &'static str) -> PropertyError {
    PropertyError::Unsupported(property.into())
}

pub(crate) const PROPS: &[PropertyDef] = &[
    PropertyDef {
        name: "currentRoom",
        kind: ValueKind::Ref,
        stored: true,
        get: |object| {
            object
                .as_character()
                .map(|character| Value::Ref(character.current_room))
        },
        set: |object, value| {
            let room = props::expect_ref("currentRoom", value)?;
            match object.as_character_mut() {
                Some(character) if character.current_room != room => {
                    character.current_room = room
                }
                Some(_) => return Ok(()),
                None => return Err(unsupported("currentRoom")),
            }
            object.set_modified();
            Ok(())
        },
    },
    PropertyDef {
        name: "inventory",
        kind: ValueKind::RefList,
        stored: true,
        get: |object| {
            object
                .as_character()
                .map(|character| Value::RefList(character.inventory.clone()))
        },
        set: |object, value| {
            let inventory = props::expect_ref_list("inventory", value)?;
            match object.as_character_mut() {
                Some(character) if character.inventory != inventory => {
                    character.inventory = inventory
                }
                Some(_) => return Ok(()),
                None => return Err(unsupported("inventory")),
            }
            object.set_modified();
            Ok(())
        },
    },
    PropertyDef {
        name: "hp",
        kind: ValueKind::Int,
        stored: true,
        get: |object| object.as_character().map(|character| Value::Int(character.hp)),
        set: |object, value| {
            let hp = props::expect_int("hp", value)?;
            match object.as_character_mut() {
                Some(character) if character.hp != hp => character.hp = hp,
                Some(_) => return Ok(()),
                None => return Err(unsupported("hp")),
            }
            object.set_modified();
            Ok(())
        },
    },
    PropertyDef {
        name: "maxHp",
        kind: ValueKind::Int,
        stored: true,
        get: |object| {
            object
                .as_character()
                .map(|character| Value::Int(character.max_hp))
        },
        set: |object, value| {
            let max_hp = props::expect_int("maxHp", value)?;
            match object.as_character_mut() {
                Some(character) if character.max_hp != max_hp => character.max_hp = max_hp,
                Some(_) => return Ok(()),
                None => return Err(unsupported("maxHp")),
            }
            object.set_modified();
            Ok(())
        },
    },
    PropertyDef {
        name: "gold",
        kind: ValueKind::Int,
        stored: true,
        get: |object| {
            object
                .as_character()
                .map(|character| Value::Int(character.gold))
        },
        set: |object, value| {
            let gold = props::expect_int("gold", value)?;
            match object.as_character_mut() {
                Some(character) if character.gold != gold => character.gold = gold,
                Some(_) => return Ok(()),
                None => return Err(unsupported("gold")),
            }
            object.set_modified();
            Ok(())
        },
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::id::GameObjectId;

    #[test]
    fn test_defaults() {
        let character = Character::default();
        assert!(character.current_room.is_null());
        assert_eq!(character.hp, 100);
        assert_eq!(character.max_hp, 100);
    }

    #[test]
    fn test_table_reaches_player_base() {
        // the shared table must work through a Player's embedded character
        let mut object = GameObject::create(GameObjectId::new(GameObjectType::Player, 1));
        let room = GameObjectRef::new(GameObjectId::new(GameObjectType::Room, 4));
        object.set_property("currentRoom", Value::Ref(room)).unwrap();
        assert_eq!(object.as_character().unwrap().current_room, room);
        assert_eq!(object.property("currentRoom"), Some(Value::Ref(room)));
    }
}
