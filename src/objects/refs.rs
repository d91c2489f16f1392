//! Lazily-resolved object references
//!
//! A `GameObjectRef` stores an object id, never a pointer. It resolves to
//! the live object through the realm on demand, which makes it safe to keep
//! inside other objects' properties: if the target is destroyed the ref
//! simply resolves to `None` from then on. String encoding is the stable
//! `"type:id"` form used on disk and in user-facing commands; the null ref
//! encodes as `"0"`.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::entity::{GameObject, ObjectClass};
use super::id::{GameObjectId, GameObjectType};
use crate::realm::Realm;

/// Parse errors for the `"type:id"` ref encoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefParseError {
    /// No `:` separator (and the text is not the null encoding `"0"`)
    MissingSeparator(String),
    /// The type tag is not a known object type
    UnknownType(String),
    /// The id part is not a positive integer
    InvalidId(String),
}

impl fmt::Display for RefParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefParseError::MissingSeparator(text) => {
                write!(f, "'{}' is not an object reference", text)
            }
            RefParseError::UnknownType(tag) => {
                write!(f, "unknown object type '{}'", tag)
            }
            RefParseError::InvalidId(text) => {
                write!(f, "'{}' is not a valid object id", text)
            }
        }
    }
}

impl std::error::Error for RefParseError {}

/// A lazily-resolved, type-tagged handle to a world object
///
/// Equality and hashing are purely by id, so refs can be compared and used
/// as map keys without resolving. The `Arc` returned by [`resolve`] is the
/// caller's resolution cache for the current operation; re-resolve after any
/// suspension point or destructive operation elsewhere.
///
/// # Examples
/// ```
/// use mudcore::objects::GameObjectRef;
///
/// let r: GameObjectRef = "room:17".parse().unwrap();
/// assert_eq!(r.to_string(), "room:17");
///
/// let null: GameObjectRef = "0".parse().unwrap();
/// assert!(null.is_null());
///
/// assert!("room17".parse::<GameObjectRef>().is_err());
/// ```
///
/// [`resolve`]: GameObjectRef::resolve
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GameObjectRef(Option<GameObjectId>);

impl GameObjectRef {
    /// The null reference
    pub const NULL: GameObjectRef = GameObjectRef(None);

    pub fn new(id: GameObjectId) -> Self {
        Self(Some(id))
    }

    pub fn is_null(&self) -> bool {
        self.0.is_none()
    }

    pub fn id(&self) -> Option<GameObjectId> {
        self.0
    }

    /// Type tag without resolving; `None` for the null ref
    pub fn object_type(&self) -> Option<GameObjectType> {
        self.0.map(|id| id.object_type)
    }

    /// Look up the live object through the realm
    ///
    /// Returns `None` for the null ref, for a destroyed or never-registered
    /// id, and when no realm is instantiated. Fast in-memory lookup; never
    /// touches the persistence path.
    pub fn resolve(&self) -> Option<Arc<RwLock<GameObject>>> {
        let id = self.0?;
        Realm::try_instance()?.resolve(id)
    }

    /// Checked narrowing: resolve only if the target is a `T`
    ///
    /// The type tag is checked before the lookup, so a mismatched cast is
    /// `None` without touching the registry. Downcast the locked object
    /// with [`GameObject::cast`] to reach the concrete state.
    pub fn cast<T: ObjectClass>(&self) -> Option<Arc<RwLock<GameObject>>> {
        if self.object_type()? != T::TYPE {
            return None;
        }
        self.resolve()
    }
}

impl From<GameObjectId> for GameObjectRef {
    fn from(id: GameObjectId) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for GameObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(id) => write!(f, "{}", id),
            None => f.write_str("0"),
        }
    }
}

impl FromStr for GameObjectRef {
    type Err = RefParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let text = text.trim();
        if text.is_empty() || text == "0" {
            return Ok(GameObjectRef::NULL);
        }
        let (tag, number) = text
            .split_once(':')
            .ok_or_else(|| RefParseError::MissingSeparator(text.to_string()))?;
        let object_type = GameObjectType::from_tag(tag)
            .ok_or_else(|| RefParseError::UnknownType(tag.to_string()))?;
        let id: u32 = number
            .parse()
            .map_err(|_| RefParseError::InvalidId(number.to_string()))?;
        if id == 0 {
            return Err(RefParseError::InvalidId(number.to_string()));
        }
        Ok(GameObjectRef::new(GameObjectId::new(object_type, id)))
    }
}

impl Serialize for GameObjectRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for GameObjectRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(D::Error::custom)
    }
}

/// Remove the first occurrence of `target` from `list`
pub(crate) fn remove_ref(list: &mut Vec<GameObjectRef>, target: GameObjectRef) -> bool {
    match list.iter().position(|r| *r == target) {
        Some(index) => {
            list.remove(index);
            true
        }
        None => false,
    }
}
