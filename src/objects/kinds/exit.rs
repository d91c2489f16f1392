//! Exits: one-way connections between rooms
//!
//! A two-way passage is a pair of exits pointing at each other through
//! `opposite`.

use crate::objects::entity::{GameObject, ObjectClass, ObjectData};
use crate::objects::id::GameObjectType;
use crate::objects::props::{self, PropertyDef, PropertyError};
use crate::objects::refs::GameObjectRef;
use crate::objects::value::{Value, ValueKind};

#[derive(Debug, Clone, Default)]
pub struct Exit {
    /// Room this exit leads to
    pub destination: GameObjectRef,
    /// Exit leading back, if the passage is two-way
    pub opposite: GameObjectRef,
    /// Hidden exits are not listed to characters in the room
    pub hidden: bool,
}

impl ObjectClass for Exit {
    const TYPE: GameObjectType = GameObjectType::Exit;

    fn from_object(object: &GameObject) -> Option<&Self> {
        match object.data() {
            ObjectData::Exit(exit) => Some(exit),
            _ => None,
        }
    }

    fn from_object_mut(object: &mut GameObject) -> Option<&mut Self> {
        match object.data_mut() {
            ObjectData::Exit(exit) => Some(exit),
            _ => None,
        }
    }
}

pub(crate) const PROPS: &[PropertyDef] = &[
    PropertyDef {
        name: "destination",
        kind: ValueKind::Ref,
        stored: true,
        get: |object| object.cast::<Exit>().map(|exit| Value::Ref(exit.destination)),
        set: |object, value| {
            let destination = props::expect_ref("destination", value)?;
            match object.cast_mut::<Exit>() {
                Some(exit) if exit.destination != destination => exit.destination = destination,
                Some(_) => return Ok(()),
                None => return Err(PropertyError::Unsupported("destination".into())),
            }
            object.set_modified();
            Ok(())
        },
    },
    PropertyDef {
        name: "opposite",
        kind: ValueKind::Ref,
        stored: true,
        get: |object| object.cast::<Exit>().map(|exit| Value::Ref(exit.opposite)),
        set: |object, value| {
            let opposite = props::expect_ref("opposite", value)?;
            match object.cast_mut::<Exit>() {
                Some(exit) if exit.opposite != opposite => exit.opposite = opposite,
                Some(_) => return Ok(()),
                None => return Err(PropertyError::Unsupported("opposite".into())),
            }
            object.set_modified();
            Ok(())
        },
    },
    PropertyDef {
        name: "hidden",
        kind: ValueKind::Bool,
        stored: true,
        get: |object| object.cast::<Exit>().map(|exit| Value::Bool(exit.hidden)),
        set: |object, value| {
            let hidden = props::expect_bool("hidden", value)?;
            match object.cast_mut::<Exit>() {
                Some(exit) if exit.hidden != hidden => exit.hidden = hidden,
                Some(_) => return Ok(()),
                None => return Err(PropertyError::Unsupported("hidden".into())),
            }
            object.set_modified();
            Ok(())
        },
    },
];
