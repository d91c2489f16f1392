//! Items: portable (or fixed) objects found in rooms and inventories

use crate::objects::entity::{GameObject, ObjectClass, ObjectData};
use crate::objects::id::GameObjectType;
use crate::objects::props::{self, PropertyDef, PropertyError};
use crate::objects::value::{Value, ValueKind};
use crate::objects::vector::Vector3D;

#[derive(Debug, Clone)]
pub struct Item {
    pub position: Vector3D,
    pub weight: i64,
    /// Fixed scenery has `portable: false` and cannot be picked up
    pub portable: bool,
}

impl Default for Item {
    fn default() -> Self {
        Self {
            position: Vector3D::default(),
            weight: 0,
            portable: true,
        }
    }
}

impl ObjectClass for Item {
    const TYPE: GameObjectType = GameObjectType::Item;

    fn from_object(object: &GameObject) -> Option<&Self> {
        match object.data() {
            ObjectData::Item(item) => Some(item),
            _ => None,
        }
    }

    fn from_object_mut(object: &mut GameObject) -> Option<&mut Self> {
        match object.data_mut() {
            ObjectData::Item(item) => Some(item),
            _ => None,
        }
    }
}

pub(crate) const PROPS: &[PropertyDef] = &[
    PropertyDef {
        name: "position",
        kind: ValueKind::Vector,
        stored: true,
        get: |object| object.cast::<Item>().map(|item| Value::Vector(item.position)),
        set: |object, value| {
            let position = props::expect_vector("position", value)?;
            match object.cast_mut::<Item>() {
                Some(item) if item.position != position => item.position = position,
                Some(_) => return Ok(()),
                None => return Err(PropertyError::Unsupported("position".into())),
            }
            object.set_modified();
            Ok(())
        },
    },
    PropertyDef {
        name: "weight",
        kind: ValueKind::Int,
        stored: true,
        get: |object| object.cast::<Item>().map(|item| Value::Int(item.weight)),
        set: |object, value| {
            let weight = props::expect_int("weight", value)?;
            match object.cast_mut::<Item>() {
                Some(item) if item.weight != weight => item.weight = weight,
                Some(_) => return Ok(()),
                None => return Err(PropertyError::Unsupported("weight".into())),
            }
            object.set_modified();
            Ok(())
        },
    },
    PropertyDef {
        name: "portable",
        kind: ValueKind::Bool,
        stored: true,
        get: |object| object.cast::<Item>().map(|item| Value::Bool(item.portable)),
        set: |object, value| {
            let portable = props::expect_bool("portable", value)?;
            match object.cast_mut::<Item>() {
                Some(item) if item.portable != portable => item.portable = portable,
                Some(_) => return Ok(()),
                None => return Err(PropertyError::Unsupported("portable".into())),
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
        let item = Item::default();
        assert!(item.portable);
        assert_eq!(item.weight, 0);
    }

    #[test]
    fn test_weight_property() {
        let mut object = GameObject::create(GameObjectId::new(GameObjectType::Item, 1));
        object.set_property("weight", Value::Int(12)).unwrap();
        assert_eq!(object.property("weight"), Some(Value::Int(12)));
    }
}
