//! Object system - identity, references, and the generic property layer

mod entity;
mod id;
pub mod kinds;
pub mod password;
mod props;
mod refs;
mod value;
mod vector;

pub use entity::{GameObject, ObjectClass, ObjectData};
pub use id::{GameObjectId, GameObjectType};
pub use kinds::{Area, Character, Exit, GameEvent, Item, Player, Room};
pub use props::{PropertyDef, PropertyError};
pub use refs::{GameObjectRef, RefParseError};
pub use value::{Value, ValueKind};
pub use vector::Vector3D;

pub(crate) use refs::remove_ref;
