//! The seam between raw payload fields and the core's typed arguments.
//!
//! Every helper names the offending field and a fixed kind on failure.
//! The contract around emptiness is deliberate and asymmetric: absence
//! (`None`) means "not supplied", while the empty string is an explicit
//! "unset" signal that only some fields accept — the helpers that tolerate
//! it say so.

use quotebook_common::{AppError, AppResult, ValidationKind, is_valid_id};
use serde_json::Value;

/// Require a string field.
pub fn string(path: &str, value: Option<String>) -> AppResult<String> {
    value.ok_or_else(|| AppError::validation(path, ValidationKind::Required))
}

/// Require an entity id: present and ULID-shaped.
pub fn id(path: &str, value: Option<String>) -> AppResult<String> {
    let value = value.ok_or_else(|| AppError::validation(path, ValidationKind::Required))?;
    if is_valid_id(&value) {
        Ok(value)
    } else {
        Err(AppError::validation(path, ValidationKind::ObjectId))
    }
}

/// An optional entity id. Absence and the empty string both mean "none";
/// anything else must be ULID-shaped.
pub fn id_or_undefined(path: &str, value: Option<String>) -> AppResult<Option<String>> {
    match value {
        None => Ok(None),
        Some(value) if value.is_empty() => Ok(None),
        Some(value) => {
            if is_valid_id(&value) {
                Ok(Some(value))
            } else {
                Err(AppError::validation(path, ValidationKind::ObjectId))
            }
        }
    }
}

/// An optional entity id for edit payloads, where the empty string must
/// survive as the unset signal: `None` = unchanged, `Some("")` = unset,
/// anything else ULID-shaped.
pub fn id_or_unset(path: &str, value: Option<String>) -> AppResult<Option<String>> {
    match value {
        Some(value) if !value.is_empty() && !is_valid_id(&value) => {
            Err(AppError::validation(path, ValidationKind::ObjectId))
        }
        other => Ok(other),
    }
}

/// Require a boolean field, rejecting every other JSON type.
pub fn boolean(path: &str, value: Option<&Value>) -> AppResult<bool> {
    match value {
        None | Some(Value::Null) => Err(AppError::validation(path, ValidationKind::Required)),
        Some(Value::Bool(value)) => Ok(*value),
        Some(_) => Err(AppError::validation(path, ValidationKind::Boolean)),
    }
}
