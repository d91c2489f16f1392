//! Object records on disk
//!
//! One JSON record per object, named `<type>.<id>.json` under the realm's
//! `objects/` directory, so saves are incremental per object rather than
//! whole-world snapshots. Records hold the stored properties only; ref
//! values are encoded as their `"type:id"` string form, never as embedded
//! copies of the referenced object. Writes go through a temp file and
//! rename so a crash mid-write cannot corrupt an existing record.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::warn;

use crate::objects::{
    GameObject, GameObjectId, GameObjectType, PropertyError, RefParseError, Value, ValueKind,
    Vector3D,
};

/// Errors reading or decoding an object record
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("record is not a JSON object")]
    NotAnObject,

    #[error("property '{property}': expected {expected}")]
    TypeMismatch { property: String, expected: ValueKind },

    #[error("missing required property '{property}'")]
    MissingProperty { property: &'static str },

    #[error("property '{property}': {reason}")]
    InvalidProperty { property: String, reason: String },

    #[error("property '{property}': {source}")]
    BadRef {
        property: String,
        source: RefParseError,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// `room.000000017.json`
pub fn record_file_name(id: GameObjectId) -> String {
    format!("{}.{:09}.json", id.object_type, id.id)
}

/// Inverse of [`record_file_name`]; `None` for anything else in the directory
pub fn parse_record_file_name(name: &str) -> Option<GameObjectId> {
    let stem = name.strip_suffix(".json")?;
    let (tag, number) = stem.split_once('.')?;
    let object_type = GameObjectType::from_tag(tag)?;
    let id: u32 = number.parse().ok()?;
    if id == 0 {
        return None;
    }
    Some(GameObjectId::new(object_type, id))
}

pub fn record_path(objects_dir: &Path, id: GameObjectId) -> PathBuf {
    objects_dir.join(record_file_name(id))
}

/// Encode one property value into its record form
pub fn encode_value(value: &Value) -> serde_json::Value {
    match value {
        Value::Bool(value) => serde_json::Value::Bool(*value),
        Value::Int(value) => (*value).into(),
        Value::String(value) => serde_json::Value::String(value.clone()),
        Value::Vector(value) => serde_json::json!([value.x, value.y, value.z]),
        Value::Ref(value) => serde_json::Value::String(value.to_string()),
        Value::RefList(values) => values
            .iter()
            .map(|r| serde_json::Value::String(r.to_string()))
            .collect(),
    }
}

/// Decode a record field into the property's declared kind
pub fn decode_value(
    property: &str,
    kind: ValueKind,
    json: &serde_json::Value,
) -> Result<Value, RecordError> {
    let mismatch = || RecordError::TypeMismatch {
        property: property.to_string(),
        expected: kind,
    };
    match kind {
        ValueKind::Bool => json.as_bool().map(Value::Bool).ok_or_else(mismatch),
        ValueKind::Int => json.as_i64().map(Value::Int).ok_or_else(mismatch),
        ValueKind::String => json
            .as_str()
            .map(|text| Value::String(text.to_string()))
            .ok_or_else(mismatch),
        ValueKind::Vector => {
            let vector: Vector3D =
                serde_json::from_value(json.clone()).map_err(|_| mismatch())?;
            Ok(Value::Vector(vector))
        }
        ValueKind::Ref => {
            let text = json.as_str().ok_or_else(mismatch)?;
            let reference = text.parse().map_err(|source| RecordError::BadRef {
                property: property.to_string(),
                source,
            })?;
            Ok(Value::Ref(reference))
        }
        ValueKind::RefList => {
            let array = json.as_array().ok_or_else(mismatch)?;
            let mut refs = Vec::with_capacity(array.len());
            for element in array {
                let text = element.as_str().ok_or_else(mismatch)?;
                refs.push(text.parse().map_err(|source| RecordError::BadRef {
                    property: property.to_string(),
                    source,
                })?);
            }
            Ok(Value::RefList(refs))
        }
    }
}

/// Serialize an object's stored properties to its record
///
/// Output keys are sorted, so serializing the same state twice yields
/// byte-identical records.
pub fn serialize(object: &GameObject) -> serde_json::Value {
    let mut record = serde_json::Map::new();
    for def in object.property_defs().filter(|def| def.stored) {
        if let Some(value) = (def.get)(object) {
            record.insert(def.name.to_string(), encode_value(&value));
        }
    }
    record.insert(
        "created_at".to_string(),
        object.created_at().to_rfc3339().into(),
    );
    record.insert(
        "updated_at".to_string(),
        object.updated_at().to_rfc3339().into(),
    );
    serde_json::Value::Object(record)
}

/// Rebuild an object from its record
///
/// Fields the object's kind does not declare are skipped with a warning;
/// a field of the wrong JSON type fails the record. The returned object is
/// not marked modified - loading must never re-dirty the world.
pub fn deserialize(
    id: GameObjectId,
    record: &serde_json::Value,
) -> Result<GameObject, RecordError> {
    let map = record.as_object().ok_or(RecordError::NotAnObject)?;
    let mut object = GameObject::create(id);
    let mut created_at = object.created_at();
    let mut updated_at = object.updated_at();

    for (key, value) in map {
        match key.as_str() {
            "name" => {
                let text = value.as_str().ok_or_else(|| RecordError::TypeMismatch {
                    property: "name".to_string(),
                    expected: ValueKind::String,
                })?;
                object.set_name_raw(text.to_string());
            }
            "description" => {
                let text = value.as_str().ok_or_else(|| RecordError::TypeMismatch {
                    property: "description".to_string(),
                    expected: ValueKind::String,
                })?;
                object.set_description_raw(text.to_string());
            }
            "created_at" => {
                if let Some(stamp) = parse_timestamp(id, key, value) {
                    created_at = stamp;
                }
            }
            "updated_at" => {
                if let Some(stamp) = parse_timestamp(id, key, value) {
                    updated_at = stamp;
                }
            }
            _ => {
                let Some(def) = object
                    .property_defs()
                    .find(|def| def.stored && def.name == key)
                else {
                    warn!(%id, property = key.as_str(), "ignoring unknown property in record");
                    continue;
                };
                let decoded = decode_value(key, def.kind, value)?;
                (def.set)(&mut object, decoded).map_err(|err| match err {
                    PropertyError::TypeMismatch { property, expected } => {
                        RecordError::TypeMismatch {
                            property: property.to_string(),
                            expected,
                        }
                    }
                    other => RecordError::InvalidProperty {
                        property: key.clone(),
                        reason: other.to_string(),
                    },
                })?;
            }
        }
    }

    object.set_timestamps_raw(created_at, updated_at);
    object.clear_modified();

    // name-addressable kinds are unusable without a name
    if id.object_type.is_character() && object.name().is_empty() {
        return Err(RecordError::MissingProperty { property: "name" });
    }
    Ok(object)
}

fn parse_timestamp(
    id: GameObjectId,
    key: &str,
    value: &serde_json::Value,
) -> Option<chrono::DateTime<chrono::Utc>> {
    let parsed = value
        .as_str()
        .and_then(|text| chrono::DateTime::parse_from_rfc3339(text).ok())
        .map(|stamp| stamp.with_timezone(&chrono::Utc));
    if parsed.is_none() {
        warn!(%id, property = key, "ignoring unparseable timestamp in record");
    }
    parsed
}

/// Read and parse a record file (startup path, synchronous)
pub fn read_record(path: &Path) -> Result<serde_json::Value, RecordError> {
    let body = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&body)?)
}

/// Write a record atomically: temp file in the same directory, then rename
pub async fn write_record(path: &Path, record: &serde_json::Value) -> Result<(), RecordError> {
    let body = serde_json::to_string_pretty(record)?;
    write_atomic(path, body).await?;
    Ok(())
}

/// Remove a record; already-gone is not an error
pub async fn remove_record(path: &Path) -> Result<(), std::io::Error> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err),
    }
}

/// Read the persisted id-allocation counters; missing file means fresh realm
pub fn read_counters(path: &Path) -> Result<HashMap<String, u32>, RecordError> {
    match std::fs::read_to_string(path) {
        Ok(body) => Ok(serde_json::from_str(&body)?),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
        Err(err) => Err(err.into()),
    }
}

/// Write the id-allocation counters atomically
pub async fn write_counters(
    path: &Path,
    counters: &HashMap<String, u32>,
) -> Result<(), RecordError> {
    let body = serde_json::to_string_pretty(counters)?;
    write_atomic(path, body).await?;
    Ok(())
}

async fn write_atomic(path: &Path, body: String) -> Result<(), std::io::Error> {
    let tmp = tmp_path(path);
    tokio::fs::write(&tmp, body.as_bytes()).await?;
    if let Err(err) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(err);
    }
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "record".into());
    name.push(".tmp");
    match path.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}
