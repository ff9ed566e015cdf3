//! Field-constraint schema types
//!
//! A schema maps field names to constraints and keeps its declaration
//! order, which is also the order fixtures are generated in.
//!
//! Copyright (c) 2025 Apiprobe Team
//! Licensed under the Apache-2.0 license

use super::mutator::MAX_STRING_LENGTH;
use crate::predicates::strict_eq;
use crate::{Error, Result};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Primitive type of a payload field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    String,
    Number,
    Boolean,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::String => write!(f, "string"),
            FieldType::Number => write!(f, "number"),
            FieldType::Boolean => write!(f, "boolean"),
        }
    }
}

/// A single declared constraint, named the way fixtures report it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Violation {
    NotNull,
    MinLength { min: usize },
    MaxLength { max: usize },
    Enum,
    Email,
    Url,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::NotNull => write!(f, "notNull"),
            Violation::MinLength { min } => write!(f, "minLength({min})"),
            Violation::MaxLength { max } => write!(f, "maxLength({max})"),
            Violation::Enum => write!(f, "enum"),
            Violation::Email => write!(f, "isEmail"),
            Violation::Url => write!(f, "isUrl"),
        }
    }
}

/// Constraints declared for one field
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldConstraint {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub not_null: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_email: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_url: bool,
}

impl FieldConstraint {
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            ..Self::default()
        }
    }

    pub fn string() -> Self {
        Self::new(FieldType::String)
    }

    pub fn number() -> Self {
        Self::new(FieldType::Number)
    }

    pub fn boolean() -> Self {
        Self::new(FieldType::Boolean)
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn one_of<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.allowed = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn email(mut self) -> Self {
        self.is_email = true;
        self
    }

    pub fn url(mut self) -> Self {
        self.is_url = true;
        self
    }

    /// Declared constraints in fixture order
    pub fn declared_violations(&self) -> Vec<Violation> {
        let mut declared = Vec::new();
        if self.not_null {
            declared.push(Violation::NotNull);
        }
        if let Some(min) = self.min_length {
            declared.push(Violation::MinLength { min });
        }
        if let Some(max) = self.max_length {
            declared.push(Violation::MaxLength { max });
        }
        if self.allowed.is_some() {
            declared.push(Violation::Enum);
        }
        if self.is_email {
            declared.push(Violation::Email);
        }
        if self.is_url {
            declared.push(Violation::Url);
        }
        declared
    }

    /// Every declared constraint `value` breaks, in fixture order
    ///
    /// Null only ever breaks notNull. Lengths count characters for strings
    /// and decimal digits for numbers; the email and url rules only look
    /// at strings.
    pub fn violations(&self, value: &Value) -> Vec<Violation> {
        if value.is_null() {
            return if self.not_null { vec![Violation::NotNull] } else { Vec::new() };
        }

        let length = measured_length(value);
        let text = value.as_str();
        self.declared_violations()
            .into_iter()
            .filter(|violation| match violation {
                Violation::NotNull => false,
                Violation::MinLength { min } => length.is_some_and(|length| length < *min),
                Violation::MaxLength { max } => length.is_some_and(|length| length > *max),
                Violation::Enum => self
                    .allowed
                    .as_deref()
                    .is_some_and(|allowed| !allowed.iter().any(|item| strict_eq(item, value))),
                Violation::Email => text.is_some_and(|text| !is_email_shaped(text)),
                Violation::Url => text.is_some_and(|text| !is_url_shaped(text)),
            })
            .collect()
    }

    /// Check the constraint is internally consistent
    pub fn validate(&self, field: &str) -> Result<()> {
        if let Some(min) = self.min_length {
            if min > MAX_STRING_LENGTH {
                return Err(Error::invalid_schema(
                    field,
                    format!("minLength {min} exceeds the supported maximum {MAX_STRING_LENGTH}"),
                ));
            }
        }

        if let (Some(min), Some(max)) = (self.min_length, self.max_length) {
            if min > max {
                return Err(Error::invalid_schema(
                    field,
                    format!("minLength {min} exceeds maxLength {max}"),
                ));
            }
        }

        if self.field_type == FieldType::Boolean
            && (self.min_length.is_some() || self.max_length.is_some())
        {
            return Err(Error::invalid_schema(
                field,
                "length constraints do not apply to boolean fields",
            ));
        }

        if (self.is_email || self.is_url) && self.field_type != FieldType::String {
            return Err(Error::invalid_schema(
                field,
                format!("isEmail/isUrl require a string field, found {}", self.field_type),
            ));
        }

        if let Some(allowed) = &self.allowed {
            if allowed.is_empty() {
                return Err(Error::invalid_schema(field, "enum must list at least one value"));
            }
        }

        Ok(())
    }
}

/// Characters for strings, decimal digits for numbers
pub(crate) fn measured_length(value: &Value) -> Option<usize> {
    match value {
        Value::String(text) => Some(text.chars().count()),
        Value::Number(number) => Some(number.to_string().chars().filter(char::is_ascii_digit).count()),
        _ => None,
    }
}

/// `local@host.tld` with a non-empty local part and no whitespace
fn is_email_shaped(text: &str) -> bool {
    if text.contains(char::is_whitespace) {
        return false;
    }
    match text.split_once('@') {
        Some((local, host)) => !local.is_empty() && !host.contains('@') && is_dotted_host(host),
        None => false,
    }
}

/// `http://` or `https://` followed by a dotted host and no whitespace
fn is_url_shaped(text: &str) -> bool {
    if text.contains(char::is_whitespace) {
        return false;
    }
    text.strip_prefix("http://")
        .or_else(|| text.strip_prefix("https://"))
        .is_some_and(is_dotted_host)
}

fn is_dotted_host(host: &str) -> bool {
    host.contains('.') && !host.starts_with('.') && !host.ends_with('.')
}

/// Ordered mapping from field name to constraint
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema {
    fields: Vec<(String, FieldConstraint)>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field, replacing an earlier declaration in place
    pub fn field(mut self, name: impl Into<String>, constraint: FieldConstraint) -> Self {
        self.insert(name, constraint);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, constraint: FieldConstraint) {
        let name = name.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = constraint,
            None => self.fields.push((name, constraint)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldConstraint> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, constraint)| constraint)
    }

    /// Fields in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldConstraint)> {
        self.fields
            .iter()
            .map(|(name, constraint)| (name.as_str(), constraint))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Validate every field constraint
    pub fn validate(&self) -> Result<()> {
        self.fields
            .iter()
            .try_for_each(|(name, constraint)| constraint.validate(name))
    }
}

impl Serialize for Schema {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, constraint) in &self.fields {
            map.serialize_entry(name, constraint)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Schema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct SchemaVisitor;

        impl<'de> Visitor<'de> for SchemaVisitor {
            type Value = Schema;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a mapping from field name to field constraint")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Schema, A::Error> {
                let mut schema = Schema::new();
                while let Some((name, constraint)) = access.next_entry::<String, FieldConstraint>()? {
                    schema.insert(name, constraint);
                }
                Ok(schema)
            }
        }

        deserializer.deserialize_map(SchemaVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_preserves_declaration_order() {
        let schema: Schema = serde_json::from_str(
            r#"{
                "name": {"type": "string", "notNull": true, "minLength": 4, "maxLength": 33},
                "gender": {"type": "string", "enum": ["male", "female"]},
                "age": {"type": "number"}
            }"#,
        )
        .unwrap();

        let names: Vec<_> = schema.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["name", "gender", "age"]);

        let name = schema.get("name").unwrap();
        assert!(name.not_null);
        assert_eq!(name.min_length, Some(4));
        assert_eq!(name.max_length, Some(33));
        assert_eq!(schema.get("age").unwrap().field_type, FieldType::Number);
    }

    #[test]
    fn test_builder_matches_deserialized() {
        let built = Schema::new().field(
            "email",
            FieldConstraint::string().not_null().min_length(1).max_length(255).email(),
        );
        let parsed: Schema = serde_json::from_str(
            r#"{"email": {"type": "string", "notNull": true, "minLength": 1, "maxLength": 255, "isEmail": true}}"#,
        )
        .unwrap();
        assert_eq!(built, parsed);
    }

    #[test]
    fn test_serialize_keeps_declaration_order() {
        let schema = Schema::new()
            .field("b", FieldConstraint::boolean().not_null())
            .field("a", FieldConstraint::string().one_of(["x", "y"]));
        let text = serde_json::to_string(&schema).unwrap();
        assert!(text.find("\"b\"").unwrap() < text.find("\"a\"").unwrap());
        assert!(text.contains("\"enum\":[\"x\",\"y\"]"));
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let schema = Schema::new()
            .field("a", FieldConstraint::string())
            .field("b", FieldConstraint::string())
            .field("a", FieldConstraint::number());
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.iter().next().unwrap().1.field_type, FieldType::Number);
    }

    #[test]
    fn test_validate_rejects_inverted_lengths() {
        let schema = Schema::new().field("name", FieldConstraint::string().min_length(5).max_length(3));
        let err = schema.validate().unwrap_err();
        assert!(err.to_string().contains("minLength 5 exceeds maxLength 3"));
    }

    #[test]
    fn test_validate_rejects_length_on_boolean() {
        let schema = Schema::new().field("active", FieldConstraint::boolean().max_length(1));
        assert!(schema.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_email_on_number() {
        let schema = Schema::new().field("phone", FieldConstraint::number().email());
        assert!(schema.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unreachable_min_length() {
        let schema = Schema::new().field("bio", FieldConstraint::string().min_length(usize::MAX));
        let err = schema.validate().unwrap_err();
        assert!(err.to_string().contains("supported maximum"));
        assert!(Schema::new()
            .field("bio", FieldConstraint::string().max_length(usize::MAX))
            .validate()
            .is_ok());
    }

    #[test]
    fn test_violations_lists_every_broken_constraint() {
        let email = FieldConstraint::string().not_null().min_length(8).max_length(40).email();
        assert!(email.violations(&json!("someone@example.com")).is_empty());
        assert_eq!(email.violations(&Value::Null), vec![Violation::NotNull]);
        assert_eq!(
            email.violations(&json!("abcdefg")),
            vec![Violation::MinLength { min: 8 }, Violation::Email]
        );
        assert_eq!(email.violations(&json!("a@b.io")), vec![Violation::MinLength { min: 8 }]);
    }

    #[test]
    fn test_violations_on_numbers_count_digits() {
        let code = FieldConstraint::number().min_length(2).max_length(3).one_of([10, 200]);
        assert!(code.violations(&json!(10.0)).is_empty());
        assert_eq!(
            code.violations(&json!(1)),
            vec![Violation::MinLength { min: 2 }, Violation::Enum]
        );
        assert_eq!(
            code.violations(&json!(1000)),
            vec![Violation::MaxLength { max: 3 }, Violation::Enum]
        );
    }

    #[test]
    fn test_email_and_url_shapes() {
        assert!(is_email_shaped("dana@example.com"));
        assert!(is_email_shaped("http://a@example.com"));
        assert!(!is_email_shaped("invalid-email"));
        assert!(!is_email_shaped("@example.com"));
        assert!(!is_email_shaped("dana@example"));
        assert!(!is_email_shaped("da na@example.com"));

        assert!(is_url_shaped("https://cdn.example.com/a.png"));
        assert!(is_url_shaped("http://a@example.com"));
        assert!(!is_url_shaped("invalid-url"));
        assert!(!is_url_shaped("ftp://example.com"));
        assert!(!is_url_shaped("http://localhost"));
    }

    #[test]
    fn test_validate_rejects_empty_enum() {
        let schema = Schema::new().field("gender", FieldConstraint::string().one_of(Vec::<String>::new()));
        assert!(schema.validate().is_err());
    }
}
