//! Object identity: type tags and numeric ids
//!
//! Every world object is identified by a `(type tag, numeric id)` pair that
//! is unique within the realm and assigned exactly once at creation. Ids are
//! never reused for the lifetime of the process, and the per-type counters
//! are persisted so restarts do not recycle the ids of deleted-but-still-
//! referenced objects. Numeric id `0` is reserved as the null sentinel and
//! is never allocated.

use std::fmt;

/// Type tag of a world object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GameObjectType {
    Area,
    Room,
    Exit,
    Item,
    Character,
    Player,
    Event,
}

impl GameObjectType {
    /// All type tags, in the order used for deterministic sweeps
    pub const ALL: [GameObjectType; 7] = [
        GameObjectType::Area,
        GameObjectType::Room,
        GameObjectType::Exit,
        GameObjectType::Item,
        GameObjectType::Character,
        GameObjectType::Player,
        GameObjectType::Event,
    ];

    /// Lowercase tag used in ref encodings and record file names
    pub fn as_str(&self) -> &'static str {
        match self {
            GameObjectType::Area => "area",
            GameObjectType::Room => "room",
            GameObjectType::Exit => "exit",
            GameObjectType::Item => "item",
            GameObjectType::Character => "character",
            GameObjectType::Player => "player",
            GameObjectType::Event => "event",
        }
    }

    /// Parse a lowercase tag; `None` for anything unrecognized
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "area" => Some(GameObjectType::Area),
            "room" => Some(GameObjectType::Room),
            "exit" => Some(GameObjectType::Exit),
            "item" => Some(GameObjectType::Item),
            "character" => Some(GameObjectType::Character),
            "player" => Some(GameObjectType::Player),
            "event" => Some(GameObjectType::Event),
            _ => None,
        }
    }

    /// Characters and players are name-addressable through the realm index
    pub fn is_character(&self) -> bool {
        matches!(self, GameObjectType::Character | GameObjectType::Player)
    }
}

impl fmt::Display for GameObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unique object identifier within the realm
///
/// The numeric id is unique within its type tag; the pair is globally
/// unique. `Display` yields the stable `"room:17"` encoding shared with
/// [`GameObjectRef`](super::GameObjectRef) and the on-disk record names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GameObjectId {
    pub object_type: GameObjectType,
    pub id: u32,
}

impl GameObjectId {
    pub fn new(object_type: GameObjectType, id: u32) -> Self {
        Self { object_type, id }
    }
}

impl fmt::Display for GameObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.object_type, self.id)
    }
}
