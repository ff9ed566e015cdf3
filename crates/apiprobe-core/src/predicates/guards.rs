//! Type guards for decoded response bodies
//!
//! A guard answers whether a JSON value has the field names and primitive
//! types an entity needs before it is trusted as that entity. A failing
//! guard means "no usable entity", never an error.

use serde_json::{Map, Value};

/// Fields that must be present with the given type
fn has_required(map: &Map<String, Value>, fields: &[(&str, fn(&Value) -> bool)]) -> bool {
    fields
        .iter()
        .all(|(name, check)| map.get(*name).is_some_and(check))
}

/// Fields that, when present, must have the given type
fn has_optional(map: &Map<String, Value>, fields: &[(&str, fn(&Value) -> bool)]) -> bool {
    fields
        .iter()
        .all(|(name, check)| map.get(*name).map_or(true, check))
}

/// An authenticated user: a string `token`, optional string profile fields
pub fn is_user(value: &Value) -> bool {
    let Some(map) = value.as_object() else {
        return false;
    };
    has_required(map, &[("token", Value::is_string)])
        && has_optional(
            map,
            &[
                ("email", Value::is_string),
                ("name", Value::is_string),
                ("companyName", Value::is_string),
                ("companyImageUri", Value::is_string),
                ("userImageUri", Value::is_string),
            ],
        )
}

/// A department: string `departmentId` and `name`
pub fn is_department(value: &Value) -> bool {
    value.as_object().is_some_and(|map| {
        has_required(
            map,
            &[("departmentId", Value::is_string), ("name", Value::is_string)],
        )
    })
}

/// An employee: string `identityNumber`, `name`, `employeeImageUri`,
/// `gender` and `departmentId`
pub fn is_employee(value: &Value) -> bool {
    value.as_object().is_some_and(|map| {
        has_required(
            map,
            &[
                ("identityNumber", Value::is_string),
                ("name", Value::is_string),
                ("employeeImageUri", Value::is_string),
                ("gender", Value::is_string),
                ("departmentId", Value::is_string),
            ],
        )
    })
}
