//! Generic property access
//!
//! Each concrete object kind declares a fixed table of `PropertyDef`
//! entries mapping a property name to typed accessor functions. The table
//! is the single source of truth for what the generic `get`/`set` layer and
//! the serializer can see; there is no way to grow ad hoc fields at
//! runtime. Entries with `stored: false` are derived state that is exposed
//! to runtime code but rebuilt on load instead of being serialized.

use thiserror::Error;

use super::entity::GameObject;
use super::refs::GameObjectRef;
use super::value::{Value, ValueKind};
use super::vector::Vector3D;

/// One entry in a kind's property table
pub struct PropertyDef {
    pub name: &'static str,
    pub kind: ValueKind,
    /// Serialized to the object record, or derived-only
    pub stored: bool,
    pub get: fn(&GameObject) -> Option<Value>,
    pub set: fn(&mut GameObject, Value) -> Result<(), PropertyError>,
}

/// Errors from the generic property layer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropertyError {
    #[error("unsupported property '{0}'")]
    Unsupported(String),

    #[error("property '{property}' expects a {expected} value")]
    TypeMismatch {
        property: &'static str,
        expected: ValueKind,
    },

    #[error("invalid value for property '{property}': {reason}")]
    Invalid {
        property: &'static str,
        reason: String,
    },
}

pub(crate) fn expect_bool(property: &'static str, value: Value) -> Result<bool, PropertyError> {
    value.as_bool().ok_or(PropertyError::TypeMismatch {
        property,
        expected: ValueKind::Bool,
    })
}

pub(crate) fn expect_int(property: &'static str, value: Value) -> Result<i64, PropertyError> {
    value.as_int().ok_or(PropertyError::TypeMismatch {
        property,
        expected: ValueKind::Int,
    })
}

pub(crate) fn expect_string(property: &'static str, value: Value) -> Result<String, PropertyError> {
    match value {
        Value::String(text) => Ok(text),
        _ => Err(PropertyError::TypeMismatch {
            property,
            expected: ValueKind::String,
        }),
    }
}

pub(crate) fn expect_vector(
    property: &'static str,
    value: Value,
) -> Result<Vector3D, PropertyError> {
    value.as_vector().ok_or(PropertyError::TypeMismatch {
        property,
        expected: ValueKind::Vector,
    })
}

pub(crate) fn expect_ref(
    property: &'static str,
    value: Value,
) -> Result<GameObjectRef, PropertyError> {
    value.as_object_ref().ok_or(PropertyError::TypeMismatch {
        property,
        expected: ValueKind::Ref,
    })
}

pub(crate) fn expect_ref_list(
    property: &'static str,
    value: Value,
) -> Result<Vec<GameObjectRef>, PropertyError> {
    match value {
        Value::RefList(list) => Ok(list),
        _ => Err(PropertyError::TypeMismatch {
            property,
            expected: ValueKind::RefList,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expect_helpers() {
        assert_eq!(expect_bool("hidden", Value::Bool(true)), Ok(true));
        assert_eq!(expect_int("weight", Value::Int(9)), Ok(9));
        assert_eq!(
            expect_string("name", Value::String("sword".into())),
            Ok("sword".to_string())
        );
    }

    #[test]
    fn test_expect_mismatch_names_property_and_kind() {
        let err = expect_int("weight", Value::Bool(false)).unwrap_err();
        assert_eq!(
            err,
            PropertyError::TypeMismatch {
                property: "weight",
                expected: ValueKind::Int,
            }
        );
        assert_eq!(err.to_string(), "property 'weight' expects a int value");
    }
}
