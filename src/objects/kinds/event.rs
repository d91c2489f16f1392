//! Events: world happenings kept addressable like any other object

use crate::objects::entity::{GameObject, ObjectClass, ObjectData};
use crate::objects::id::GameObjectType;
use crate::objects::props::{self, PropertyDef, PropertyError};
use crate::objects::refs::GameObjectRef;
use crate::objects::value::{Value, ValueKind};

#[derive(Debug, Clone, Default)]
pub struct GameEvent {
    /// Room the event originated in
    pub origin: GameObjectRef,
    pub message: String,
}

impl ObjectClass for GameEvent {
    const TYPE: GameObjectType = GameObjectType::Event;

    fn from_object(object: &GameObject) -> Option<&Self> {
        match object.data() {
            ObjectData::Event(event) => Some(event),
            _ => None,
        }
    }

    fn from_object_mut(object: &mut GameObject) -> Option<&mut Self> {
        match object.data_mut() {
            ObjectData::Event(event) => Some(event),
            _ => None,
        }
    }
}

pub(crate) const PROPS: &[PropertyDef] = &[
    PropertyDef {
        name: "origin",
        kind: ValueKind::Ref,
        stored: true,
        get: |object| object.cast::<GameEvent>().map(|event| Value::Ref(event.origin)),
        set: |object, value| {
            let origin = props::expect_ref("origin", value)?;
            match object.cast_mut::<GameEvent>() {
                Some(event) if event.origin != origin => event.origin = origin,
                Some(_) => return Ok(()),
                None => return Err(PropertyError::Unsupported("origin".into())),
            }
            object.set_modified();
            Ok(())
        },
    },
    PropertyDef {
        name: "message",
        kind: ValueKind::String,
        stored: true,
        get: |object| {
            object
                .cast::<GameEvent>()
                .map(|event| Value::String(event.message.clone()))
        },
        set: |object, value| {
            let message = props::expect_string("message", value)?;
            match object.cast_mut::<GameEvent>() {
                Some(event) if event.message != message => event.message = message,
                Some(_) => return Ok(()),
                None => return Err(PropertyError::Unsupported("message".into())),
            }
            object.set_modified();
            Ok(())
        },
    },
];
