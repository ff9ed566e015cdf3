//! Declarative suite and check documents
//!
//! A suite is a list of request cases run in file order. Each case names
//! its checks declaratively; [`build_checks`] turns them into a
//! [`CheckSet`] of core predicates.

use crate::error::{Error, Result};
use apiprobe_core::checks::CheckSet;
use apiprobe_core::http::{Method, RequestOption};
use apiprobe_core::{predicates, Department, Employee, Guarded, RawResponse, Schema, User};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

fn default_method() -> Method {
    Method::Get
}

fn default_negative_status() -> u16 {
    400
}

/// A named list of request cases
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suite {
    #[serde(default)]
    pub name: Option<String>,
    /// Headers added to every case, below the case's own headers
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    pub cases: Vec<CaseSpec>,
}

/// One request and the checks its response must pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseSpec {
    pub name: String,
    #[serde(default)]
    pub feature: Option<String>,
    #[serde(default = "default_method")]
    pub method: Method,
    pub path: String,
    /// JSON body, or query parameters for GET
    #[serde(default)]
    pub payload: Option<Value>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub options: Vec<RequestOption>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    #[serde(default)]
    pub checks: Vec<CheckSpec>,
    /// Field constraints; each yields negative cases against `payload`
    #[serde(default)]
    pub schema: Option<Schema>,
    #[serde(default = "default_negative_status")]
    pub negative_status: u16,
    #[serde(default)]
    pub upload: Option<UploadSpec>,
}

/// A file sent as one multipart part; the payload becomes text fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadSpec {
    pub field: String,
    /// Relative paths are resolved against the suite file's directory
    pub file: PathBuf,
    #[serde(default)]
    pub content_type: Option<String>,
}

/// A declarative check with an optional display name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub kind: CheckKind,
}

/// The predicate behind a [`CheckSpec`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CheckKind {
    Status { code: u16 },
    Exists { path: String },
    Equal { path: String, value: Value },
    EveryItemEqual { path: String, value: Value },
    EveryItemContain { path: String, substring: String },
    TotalInRange { path: String, min: usize, max: usize },
    Guard {
        entity: EntityKind,
        #[serde(default)]
        list: bool,
    },
}

/// Entities with a type guard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    User,
    Department,
    Employee,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::User => write!(f, "user"),
            EntityKind::Department => write!(f, "department"),
            EntityKind::Employee => write!(f, "employee"),
        }
    }
}

impl EntityKind {
    fn accepts(self, response: &RawResponse, list: bool) -> bool {
        fn check<T: Guarded>(response: &RawResponse, list: bool) -> bool {
            if list {
                T::list_from_response(response).is_some()
            } else {
                T::from_response(response).is_some()
            }
        }

        match self {
            EntityKind::User => check::<User>(response, list),
            EntityKind::Department => check::<Department>(response, list),
            EntityKind::Employee => check::<Employee>(response, list),
        }
    }
}

impl CheckSpec {
    /// The explicit name, or one derived from the check
    pub fn display_name(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        match &self.kind {
            CheckKind::Status { code } => format!("should return {code}"),
            CheckKind::Exists { path } => format!("should have {path}"),
            CheckKind::Equal { path, value } => format!("{path} should equal {value}"),
            CheckKind::EveryItemEqual { path, value } => format!("every {path} should equal {value}"),
            CheckKind::EveryItemContain { path, substring } => {
                format!("every {path} should contain '{substring}'")
            }
            CheckKind::TotalInRange { path, min, max } => {
                format!("{path} total should be within {min}..={max}")
            }
            CheckKind::Guard { entity, list: false } => format!("should be a valid {entity}"),
            CheckKind::Guard { entity, list: true } => format!("should be a list of valid {entity}s"),
        }
    }

    fn validate(&self, case: &str) -> Result<()> {
        if let CheckKind::TotalInRange { path, min, max } = &self.kind {
            if min > max {
                return Err(Error::InvalidSuite(format!(
                    "case '{case}': total_in_range on '{path}' has min {min} above max {max}"
                )));
            }
        }
        Ok(())
    }
}

/// Turn declarative checks into a check set, in order
pub fn build_checks(specs: &[CheckSpec]) -> CheckSet {
    let mut checks = CheckSet::new();
    for spec in specs {
        let name = spec.display_name();
        match spec.kind.clone() {
            CheckKind::Status { code } => {
                checks.insert(name, move |r| predicates::is_status(r, code));
            }
            CheckKind::Exists { path } => {
                checks.insert(name, move |r| predicates::is_exists(r, &path));
            }
            CheckKind::Equal { path, value } => {
                checks.insert(name, move |r| predicates::is_equal(r, &path, &value));
            }
            CheckKind::EveryItemEqual { path, value } => {
                checks.insert(name, move |r| predicates::is_every_item_equal(r, &path, &value));
            }
            CheckKind::EveryItemContain { path, substring } => {
                checks.insert(name, move |r| {
                    predicates::is_every_item_contain(r, &path, &substring)
                });
            }
            CheckKind::TotalInRange { path, min, max } => {
                checks.insert(name, move |r| {
                    predicates::is_total_data_in_range(r, &path, min, max)
                });
            }
            CheckKind::Guard { entity, list } => {
                checks.insert(name, move |r| entity.accepts(r, list));
            }
        }
    }
    checks
}

impl Suite {
    /// Reject suites that cannot run before any request is sent
    pub fn validate(&self) -> Result<()> {
        if self.cases.is_empty() {
            return Err(Error::InvalidSuite("suite has no cases".to_string()));
        }
        for case in &self.cases {
            case.validate()?;
        }
        Ok(())
    }
}

impl CaseSpec {
    pub fn feature_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.feature.as_deref().unwrap_or(fallback)
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidSuite("every case needs a name".to_string()));
        }
        if self.upload.is_some() && self.method != Method::Post {
            return Err(Error::InvalidSuite(format!(
                "case '{}': uploads are only sent with POST",
                self.name
            )));
        }
        if let Some(schema) = &self.schema {
            schema.validate()?;
            if !self.payload.as_ref().is_some_and(Value::is_object) {
                return Err(Error::InvalidSuite(format!(
                    "case '{}': a schema needs an object payload as its baseline",
                    self.name
                )));
            }
        }
        for check in &self.checks {
            check.validate(&self.name)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const SUITE: &str = r#"
name: departments
headers:
  Authorization: Bearer abc
cases:
  - name: create department
    feature: department
    method: post
    path: /v1/department
    payload:
      name: Engineering
    schema:
      name:
        type: string
        notNull: true
        minLength: 4
        maxLength: 33
    checks:
      - type: status
        code: 201
      - type: exists
        path: departmentId
      - type: guard
        entity: department
  - name: list departments
    path: /v1/department
    payload:
      limit: 5
    checks:
      - type: total_in_range
        path: ""
        min: 0
        max: 5
        name: at most five
"#;

    #[test]
    fn test_parse_suite() {
        let suite: Suite = serde_yaml::from_str(SUITE).unwrap();
        suite.validate().unwrap();

        assert_eq!(suite.name.as_deref(), Some("departments"));
        assert_eq!(suite.cases.len(), 2);

        let create = &suite.cases[0];
        assert_eq!(create.method, Method::Post);
        assert_eq!(create.negative_status, 400);
        assert_eq!(create.feature_or("x"), "department");
        assert_eq!(create.schema.as_ref().map(|s| s.len()), Some(1));

        let list = &suite.cases[1];
        assert_eq!(list.method, Method::Get);
        assert_eq!(list.feature_or("departments"), "departments");
        assert_eq!(list.checks[0].display_name(), "at most five");
    }

    #[test]
    fn test_default_names() {
        let specs: Vec<CheckSpec> = serde_json::from_value(json!([
            {"type": "status", "code": 200},
            {"type": "exists", "path": "token"},
            {"type": "equal", "path": "name", "value": "Dana"},
            {"type": "every_item_contain", "path": "[]name", "substring": "an"},
            {"type": "guard", "entity": "employee", "list": true}
        ]))
        .unwrap();
        let names: Vec<String> = specs.iter().map(CheckSpec::display_name).collect();
        assert_eq!(
            names,
            vec![
                "should return 200",
                "should have token",
                "name should equal \"Dana\"",
                "every []name should contain 'an'",
                "should be a list of valid employees",
            ]
        );
    }

    #[test]
    fn test_build_checks_evaluates_predicates() {
        let specs: Vec<CheckSpec> = serde_json::from_value(json!([
            {"type": "status", "code": 201},
            {"type": "exists", "path": "departmentId"},
            {"type": "equal", "path": "name", "value": "Engineering"},
            {"type": "guard", "entity": "department"},
            {"type": "guard", "entity": "user"}
        ]))
        .unwrap();
        let checks = build_checks(&specs);
        assert_eq!(checks.len(), 5);

        let response = RawResponse::from_json(201, json!({"departmentId": "d1", "name": "Engineering"}));
        let result = apiprobe_core::checks::run_checks(response, &checks);
        assert!(!result.is_success);
        assert_eq!(result.failed_checks, vec!["should be a valid user".to_string()]);
    }

    #[test]
    fn test_duplicate_names_replace_in_place() {
        let specs: Vec<CheckSpec> = serde_json::from_value(json!([
            {"type": "status", "code": 200, "name": "ok"},
            {"type": "exists", "path": "id"},
            {"type": "status", "code": 201, "name": "ok"}
        ]))
        .unwrap();
        let checks = build_checks(&specs);
        assert_eq!(checks.names().collect::<Vec<_>>(), vec!["ok", "should have id"]);

        let result = apiprobe_core::checks::run_checks(RawResponse::from_json(201, json!({"id": 1})), &checks);
        assert!(result.is_success);
    }

    #[test]
    fn test_invalid_suites() {
        let empty: Suite = serde_json::from_value(json!({"cases": []})).unwrap();
        assert!(empty.validate().is_err());

        let upload_with_get: Suite = serde_json::from_value(json!({"cases": [{
            "name": "upload",
            "path": "/v1/file",
            "upload": {"field": "file", "file": "a.png"}
        }]}))
        .unwrap();
        let err = upload_with_get.validate().unwrap_err();
        assert_eq!(err.exit_code(), 7);

        let schema_without_payload: Suite = serde_json::from_value(json!({"cases": [{
            "name": "create",
            "method": "POST",
            "path": "/v1/department",
            "schema": {"name": {"type": "string", "notNull": true}}
        }]}))
        .unwrap();
        assert!(schema_without_payload.validate().is_err());

        let bad_range: Suite = serde_json::from_value(json!({"cases": [{
            "name": "list",
            "path": "/v1/department",
            "checks": [{"type": "total_in_range", "path": "", "min": 5, "max": 1}]
        }]}))
        .unwrap();
        assert!(bad_range.validate().is_err());
    }

    #[test]
    fn test_unknown_check_type_rejected() {
        let parsed: std::result::Result<CheckSpec, _> =
            serde_json::from_value(json!({"type": "matches_regex", "path": "x"}));
        assert!(parsed.is_err());
    }
}
