//! Players: characters driven by a session
//!
//! A player is a character plus login state. The password is stored as
//! `salt$hash` (see [`crate::objects::password`]); `passwordHash` is also
//! settable directly through the generic layer for administrative resets.

use super::character::Character;
use crate::objects::entity::{GameObject, ObjectClass, ObjectData};
use crate::objects::id::GameObjectType;
use crate::objects::password::{generate_salt, hash_password, verify_password};
use crate::objects::props::{self, PropertyDef, PropertyError};
use crate::objects::value::{Value, ValueKind};

#[derive(Debug, Clone, Default)]
pub struct Player {
    pub base: Character,
    pub password_hash: String,
    pub admin: bool,
}

impl Player {
    /// Hash and store a new password under a fresh random salt
    pub fn set_password(&mut self, password: &str) {
        let salt = generate_salt();
        let hash = hash_password(password, &salt);
        self.password_hash = format!("{}${}", salt, hash);
    }

    /// Check a password attempt against the stored `salt$hash`
    pub fn matches_password(&self, password: &str) -> bool {
        match self.password_hash.split_once('$') {
            Some((salt, hash)) => verify_password(password, salt, hash),
            None => false,
        }
    }
}

impl ObjectClass for Player {
    const TYPE: GameObjectType = GameObjectType::Player;

    fn from_object(object: &GameObject) -> Option<&Self> {
        match object.data() {
            ObjectData::Player(player) => Some(player),
            _ => None,
        }
    }

    fn from_object_mut(object: &mut GameObject) -> Option<&mut Self> {
        match object.data_mut() {
            ObjectData::Player(player) => Some(player),
            _ => None,
        }
    }
}

pub(crate) const PROPS: &[PropertyDef] = &[
    PropertyDef {
        name: "passwordHash",
        kind: ValueKind::String,
        stored: true,
        get: |object| {
            object
                .cast::<Player>()
                .map(|player| Value::String(player.password_hash.clone()))
        },
        set: |object, value| {
            let hash = props::expect_string("passwordHash", value)?;
            match object.cast_mut::<Player>() {
                Some(player) if player.password_hash != hash => player.password_hash = hash,
                Some(_) => return Ok(()),
                None => return Err(PropertyError::Unsupported("passwordHash".into())),
            }
            object.set_modified();
            Ok(())
        },
    },
    PropertyDef {
        name: "admin",
        kind: ValueKind::Bool,
        stored: true,
        get: |object| object.cast::<Player>().map(|player| Value::Bool(player.admin)),
        set: |object, value| {
            let admin = props::expect_bool("admin", value)?;
            match object.cast_mut::<Player>() {
                Some(player) if player.admin != admin => player.admin = admin,
                Some(_) => return Ok(()),
                None => return Err(PropertyError::Unsupported("admin".into())),
            }
            object.set_modified();
            Ok(())
        },
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_round_trip() {
        let mut player = Player::default();
        player.set_password("hunter2!");
        assert!(player.matches_password("hunter2!"));
        assert!(!player.matches_password("hunter3!"));
        assert!(player.password_hash.contains('$'));
    }

    #[test]
    fn test_unsalted_hash_never_matches() {
        let player = Player {
            password_hash: "deadbeef".into(),
            ..Player::default()
        };
        assert!(!player.matches_password("deadbeef"));
    }
}
