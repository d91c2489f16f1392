//! Areas: named groups of rooms
//!
//! The room list is the stored side of the area<->room relation; each
//! room's `area` backref is derived from it on load.

use crate::objects::entity::{GameObject, ObjectClass, ObjectData};
use crate::objects::id::GameObjectType;
use crate::objects::props::{self, PropertyDef, PropertyError};
use crate::objects::refs::GameObjectRef;
use crate::objects::value::{Value, ValueKind};

#[derive(Debug, Clone, Default)]
pub struct Area {
    pub rooms: Vec<GameObjectRef>,
}

impl Area {
    pub fn contains_room(&self, room: GameObjectRef) -> bool {
        self.rooms.contains(&room)
    }
}

impl ObjectClass for Area {
    const TYPE: GameObjectType = GameObjectType::Area;

    fn from_object(object: &GameObject) -> Option<&Self> {
        match object.data() {
            ObjectData::Area(area) => Some(area),
            _ => None,
        }
    }

    fn from_object_mut(object: &mut GameObject) -> Option<&mut Self> {
        match object.data_mut() {
            ObjectData::Area(area) => Some(area),
            _ => None,
        }
    }
}

pub(crate) const PROPS: &[PropertyDef] = &[PropertyDef {
    name: "rooms",
    kind: ValueKind::RefList,
    stored: true,
    get: |object| object.cast::<Area>().map(|area| Value::RefList(area.rooms.clone())),
    set: |object, value| {
        let rooms = props::expect_ref_list("rooms", value)?;
        match object.cast_mut::<Area>() {
            Some(area) if area.rooms != rooms => area.rooms = rooms,
            Some(_) => return Ok(()),
            None => return Err(PropertyError::Unsupported("rooms".into())),
        }
        object.set_modified();
        Ok(())
    },
}];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::id::GameObjectId;

    #[test]
    fn test_rooms_property() {
        let mut object = GameObject::create(GameObjectId::new(GameObjectType::Area, 1));
        let room = GameObjectRef::new(GameObjectId::new(GameObjectType::Room, 2));
        object
            .set_property("rooms", Value::RefList(vec![room]))
            .unwrap();
        assert!(object.cast::<Area>().unwrap().contains_room(room));
        assert_eq!(object.property("rooms"), Some(Value::RefList(vec![room])));
    }
}
