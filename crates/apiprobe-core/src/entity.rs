//! Typed entities materialised from response bodies
//!
//! Conversion goes through the type guards first, so a body that does not
//! look like the entity yields `None` rather than a partial value.

use crate::http::RawResponse;
use crate::predicates::{is_department, is_employee, is_user};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An authenticated user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub token: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing)]
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_image_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_image_uri: Option<String>,
}

/// A department
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub department_id: String,
    pub name: String,
}

/// An employee
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub identity_number: String,
    pub name: String,
    pub employee_image_uri: String,
    pub gender: String,
    pub department_id: String,
}

/// Entities that can be trusted only after their type guard passes
pub trait Guarded: Sized + serde::de::DeserializeOwned {
    /// The guard for a single JSON value
    fn guard(value: &Value) -> bool;

    /// Materialise one entity from a JSON value
    fn from_json(value: &Value) -> Option<Self> {
        if !Self::guard(value) {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }

    /// Materialise one entity from a response body
    fn from_response(response: &RawResponse) -> Option<Self> {
        response.json().and_then(Self::from_json)
    }

    /// Materialise a list, all-or-nothing: one bad element rejects the body
    fn list_from_response(response: &RawResponse) -> Option<Vec<Self>> {
        let items = response.json()?.as_array()?;
        items.iter().map(Self::from_json).collect()
    }
}

impl Guarded for User {
    fn guard(value: &Value) -> bool {
        is_user(value)
    }
}

impl Guarded for Department {
    fn guard(value: &Value) -> bool {
        is_department(value)
    }
}

impl Guarded for Employee {
    fn guard(value: &Value) -> bool {
        is_employee(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_department_from_response() {
        let response = RawResponse::from_json(201, json!({"departmentId": "d-1", "name": "Ops"}));
        let department = Department::from_response(&response).unwrap();
        assert_eq!(department.department_id, "d-1");
        assert_eq!(department.name, "Ops");
    }

    #[test]
    fn test_guard_rejection_yields_none() {
        let response = RawResponse::from_json(201, json!({"departmentId": 1, "name": "Ops"}));
        assert!(Department::from_response(&response).is_none());
    }

    #[test]
    fn test_list_is_all_or_nothing() {
        let good = RawResponse::from_json(
            200,
            json!([{"departmentId": "1", "name": "a"}, {"departmentId": "2", "name": "b"}]),
        );
        assert_eq!(Department::list_from_response(&good).unwrap().len(), 2);

        let bad = RawResponse::from_json(200, json!([{"departmentId": "1", "name": "a"}, {"name": "b"}]));
        assert!(Department::list_from_response(&bad).is_none());
    }

    #[test]
    fn test_user_optional_fields() {
        let user = User::from_json(&json!({"token": "abc", "email": "a@b.co", "companyName": "Acme"})).unwrap();
        assert_eq!(user.token, "abc");
        assert_eq!(user.company_name.as_deref(), Some("Acme"));
        assert!(user.name.is_none());
    }

    #[test]
    fn test_employee_from_json() {
        let employee = Employee::from_json(&json!({
            "identityNumber": "99999",
            "name": "Dana",
            "employeeImageUri": "http://img/d.jpg",
            "gender": "female",
            "departmentId": "d-1"
        }))
        .unwrap();
        assert_eq!(employee.gender, "female");
    }
}
