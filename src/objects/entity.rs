//! The common shape of all world objects
//!
//! `GameObject` carries the identity, the shared name/description pair, the
//! modified flag, and a payload enum with the concrete kind's state. Typed
//! access to the payload goes through the checked [`cast`](GameObject::cast)
//! operation; generic access goes through the per-kind property tables.

use chrono::{DateTime, Utc};

use super::id::{GameObjectId, GameObjectType};
use super::kinds::{self, Area, Character, Exit, GameEvent, Item, Player, Room};
use super::props::{self, PropertyDef, PropertyError};
use super::refs::GameObjectRef;
use super::value::{Value, ValueKind};
use crate::realm::{validate_character_name, Realm};

/// Concrete state of a world object, keyed by its type tag
#[derive(Debug, Clone)]
pub enum ObjectData {
    Area(Area),
    Room(Room),
    Exit(Exit),
    Item(Item),
    Character(Character),
    Player(Player),
    Event(GameEvent),
}

/// Checked downcast target; implemented by every concrete kind
///
/// `cast` is the only sanctioned narrowing operation: a mismatched kind
/// yields `None`, never an unchecked reinterpretation.
pub trait ObjectClass: Sized {
    const TYPE: GameObjectType;

    fn from_object(object: &GameObject) -> Option<&Self>;
    fn from_object_mut(object: &mut GameObject) -> Option<&mut Self>;
}

/// A world object
#[derive(Debug, Clone)]
pub struct GameObject {
    id: GameObjectId,
    name: String,
    description: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    modified: bool,
    data: ObjectData,
}

/// Properties shared by every object kind
pub(crate) const COMMON_PROPS: &[PropertyDef] = &[
    PropertyDef {
        name: "name",
        kind: ValueKind::String,
        stored: true,
        get: |object| Some(Value::String(object.name.clone())),
        set: |object, value| {
            let name = props::expect_string("name", value)?;
            object.set_name(&name)
        },
    },
    PropertyDef {
        name: "description",
        kind: ValueKind::String,
        stored: true,
        get: |object| Some(Value::String(object.description.clone())),
        set: |object, value| {
            let description = props::expect_string("description", value)?;
            object.set_description(&description);
            Ok(())
        },
    },
];

impl GameObject {
    /// Construct a fresh object of the kind named by the id's type tag
    ///
    /// This is the single factory used both by the realm at creation time
    /// and by the deserializer before applying a record's fields.
    pub fn create(id: GameObjectId) -> Self {
        let data = match id.object_type {
            GameObjectType::Area => ObjectData::Area(Area::default()),
            GameObjectType::Room => ObjectData::Room(Room::default()),
            GameObjectType::Exit => ObjectData::Exit(Exit::default()),
            GameObjectType::Item => ObjectData::Item(Item::default()),
            GameObjectType::Character => ObjectData::Character(Character::default()),
            GameObjectType::Player => ObjectData::Player(Player::default()),
            GameObjectType::Event => ObjectData::Event(GameEvent::default()),
        };
        let now = Utc::now();
        Self {
            id,
            name: String::new(),
            description: String::new(),
            created_at: now,
            updated_at: now,
            modified: false,
            data,
        }
    }

    pub fn id(&self) -> GameObjectId {
        self.id
    }

    pub fn object_type(&self) -> GameObjectType {
        self.id.object_type
    }

    /// A ref to this object
    pub fn object_ref(&self) -> GameObjectRef {
        GameObjectRef::new(self.id)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the object
    ///
    /// Character and player names are validated and re-indexed in the
    /// realm's name lookup; other kinds accept any text.
    pub fn set_name(&mut self, name: &str) -> Result<(), PropertyError> {
        if name == self.name {
            return Ok(());
        }
        if self.id.object_type.is_character() {
            validate_character_name(name).map_err(|err| PropertyError::Invalid {
                property: "name",
                reason: err.to_string(),
            })?;
            if let Some(realm) = Realm::try_instance() {
                realm.reindex_character(&self.name, name, self.object_ref());
            }
        }
        self.name = name.to_string();
        self.set_modified();
        Ok(())
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: &str) {
        if description != self.description {
            self.description = description.to_string();
            self.set_modified();
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn data(&self) -> &ObjectData {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut ObjectData {
        &mut self.data
    }

    /// Checked downcast to a concrete kind
    pub fn cast<T: ObjectClass>(&self) -> Option<&T> {
        T::from_object(self)
    }

    /// Checked mutable downcast to a concrete kind
    pub fn cast_mut<T: ObjectClass>(&mut self) -> Option<&mut T> {
        T::from_object_mut(self)
    }

    /// Character view shared by the Character and Player kinds
    pub fn as_character(&self) -> Option<&Character> {
        match &self.data {
            ObjectData::Character(character) => Some(character),
            ObjectData::Player(player) => Some(&player.base),
            _ => None,
        }
    }

    pub fn as_character_mut(&mut self) -> Option<&mut Character> {
        match &mut self.data {
            ObjectData::Character(character) => Some(character),
            ObjectData::Player(player) => Some(&mut player.base),
            _ => None,
        }
    }

    /// True while the object has mutations not yet written to disk
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Mark the object dirty and enqueue it with the sync worker
    ///
    /// This is the only path by which persistence is triggered; there is no
    /// periodic whole-world sweep.
    pub fn set_modified(&mut self) {
        self.modified = true;
        self.updated_at = Utc::now();
        if let Some(realm) = Realm::try_instance() {
            realm.mark_dirty(self.id);
        }
    }

    pub(crate) fn flag_modified(&mut self) {
        self.modified = true;
    }

    pub(crate) fn clear_modified(&mut self) {
        self.modified = false;
    }

    /// The property tables visible on this object, common entries first
    pub fn property_defs(&self) -> impl Iterator<Item = &'static PropertyDef> {
        std::iter::once(COMMON_PROPS)
            .chain(self.kind_tables().iter().copied())
            .flatten()
    }

    /// Generic read by property name; `None` for names outside the tables
    pub fn property(&self, name: &str) -> Option<Value> {
        let def = self.property_defs().find(|def| def.name == name)?;
        (def.get)(self)
    }

    /// Generic write by property name
    ///
    /// Fails with [`PropertyError::Unsupported`] for names outside the
    /// object's fixed property set, leaving the object untouched.
    pub fn set_property(&mut self, name: &str, value: Value) -> Result<(), PropertyError> {
        let def = self
            .property_defs()
            .find(|def| def.name == name)
            .ok_or_else(|| PropertyError::Unsupported(name.to_string()))?;
        (def.set)(self, value)
    }

    fn kind_tables(&self) -> &'static [&'static [PropertyDef]] {
        match self.data {
            ObjectData::Area(_) => &[kinds::area::PROPS],
            ObjectData::Room(_) => &[kinds::room::PROPS],
            ObjectData::Exit(_) => &[kinds::exit::PROPS],
            ObjectData::Item(_) => &[kinds::item::PROPS],
            ObjectData::Character(_) => &[kinds::character::PROPS],
            ObjectData::Player(_) => &[kinds::character::PROPS, kinds::player::PROPS],
            ObjectData::Event(_) => &[kinds::event::PROPS],
        }
    }

    // Raw field access for the deserializer: no validation, no realm
    // notification, no dirty marking.

    pub(crate) fn set_name_raw(&mut self, name: String) {
        self.name = name;
    }

    pub(crate) fn set_description_raw(&mut self, description: String) {
        self.description = description;
    }

    pub(crate) fn set_timestamps_raw(&mut self, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) {
        self.created_at = created_at;
        self.updated_at = updated_at;
    }
}
