//! Character name validation
//!
//! Names entering the realm's character index must be plain words:
//! 3-16 letters, no digits, spaces, or punctuation. Lookup itself is
//! case-insensitive; the stored name keeps its capitalization.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Validation errors for character names
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    /// Name is too short (< 3 chars) or too long (> 16 chars)
    Length,
    /// Name contains anything other than letters
    InvalidFormat,
}

impl fmt::Display for NameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameError::Length => {
                write!(f, "character names must be 3-16 characters")
            }
            NameError::InvalidFormat => {
                write!(f, "character names may only contain letters")
            }
        }
    }
}

impl std::error::Error for NameError {}

static NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z]+$").unwrap());

/// Validate a character or player name
pub fn validate_character_name(name: &str) -> Result<(), NameError> {
    if name.len() < 3 || name.len() > 16 {
        return Err(NameError::Length);
    }
    if !NAME_REGEX.is_match(name) {
        return Err(NameError::InvalidFormat);
    }
    Ok(())
}
