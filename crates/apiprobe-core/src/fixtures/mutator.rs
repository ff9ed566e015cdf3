//! Negative fixture generation
//!
//! For every field in a schema, in declaration order, one fixture is
//! produced per declared constraint: notNull, minLength, maxLength, enum,
//! isEmail, isUrl. Each fixture copies the baseline and overwrites exactly
//! one field with a value that breaks exactly that constraint. Length
//! violations sit one unit past the boundary.
//!
//! Candidate values are shaped to pass the field's other rules (email
//! strings end in `@example.com`, url strings are `http://...com`, and
//! lengths are fitted into the declared bounds), then every candidate is
//! checked with [`FieldConstraint::violations`]. A constraint with no
//! candidate that breaks it alone is skipped.
//!
//! Copyright (c) 2025 Apiprobe Team
//! Licensed under the Apache-2.0 license

use super::schema::{measured_length, FieldConstraint, FieldType, Schema, Violation};
use crate::Result;
use serde::Serialize;
use serde_json::{Map, Value};

/// A request body as a flat JSON object
pub type Payload = Map<String, Value>;

/// Longest string a fixture is allowed to carry
pub(crate) const MAX_STRING_LENGTH: usize = 1 << 20;

const SHORT_ALPHABET: &str = "abcdefghijklmnopqrstuvwxyz";
const INVALID_EMAIL: &str = "invalid-email";
const INVALID_URL: &str = "invalid-url";
const NOT_IN_ENUM: &str = "not_in_enum";
const EMAIL_DOMAIN: &str = "@example.com";
const URL_SCHEME: &str = "http://";
const URL_TLD: &str = ".com";
const ENUM_ATTEMPTS: usize = 1000;
const MAX_NUMBER_DIGITS: usize = 18;

/// One baseline copy with a single field broken
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fixture {
    pub field: String,
    pub violation: Violation,
    pub payload: Payload,
}

impl Fixture {
    /// The mutated value of the broken field
    pub fn value(&self) -> &Value {
        self.payload.get(&self.field).unwrap_or(&Value::Null)
    }
}

/// Generate every single-violation fixture for `schema` against `baseline`
pub fn generate(schema: &Schema, baseline: &Payload) -> Result<Vec<Fixture>> {
    schema.validate()?;

    let mut fixtures = Vec::new();
    for (field, constraint) in schema.iter() {
        for (violation, value) in violations_for(field, constraint) {
            let mut payload = baseline.clone();
            payload.insert(field.to_string(), value);
            tracing::trace!(field, %violation, "generated fixture");
            fixtures.push(Fixture {
                field: field.to_string(),
                violation,
                payload,
            });
        }
    }

    tracing::debug!(
        fields = schema.len(),
        fixtures = fixtures.len(),
        "negative fixtures generated"
    );
    Ok(fixtures)
}

fn violations_for(field: &str, constraint: &FieldConstraint) -> Vec<(Violation, Value)> {
    constraint
        .declared_violations()
        .into_iter()
        .filter_map(|target| {
            let found = candidates(constraint, &target).find(|value| {
                matches!(constraint.violations(value).as_slice(), [only] if *only == target)
            });
            if found.is_none() {
                skipped(field, &target);
            }
            found.map(|value| (target, value))
        })
        .collect()
}

fn skipped(field: &str, violation: &Violation) {
    tracing::debug!(
        field,
        constraint = %violation,
        "constraint cannot be violated alone, no fixture"
    );
}

type Candidates<'a> = Box<dyn Iterator<Item = Value> + 'a>;

/// Values to try for `target`, most natural first
fn candidates<'a>(constraint: &'a FieldConstraint, target: &Violation) -> Candidates<'a> {
    match *target {
        Violation::NotNull => Box::new(std::iter::once(Value::Null)),
        Violation::MinLength { min } => match min.checked_sub(1) {
            Some(length) => exact_length(constraint, length, |n| {
                SHORT_ALPHABET.chars().cycle().take(n).collect()
            }),
            None => Box::new(std::iter::empty()),
        },
        Violation::MaxLength { max } => match max.checked_add(1).filter(|n| *n <= MAX_STRING_LENGTH) {
            Some(length) => exact_length(constraint, length, |n| "a".repeat(n)),
            None => Box::new(std::iter::empty()),
        },
        Violation::Enum => outside_enum(constraint),
        Violation::Email => format_breaker(constraint, INVALID_EMAIL, false, constraint.is_url),
        Violation::Url => format_breaker(constraint, INVALID_URL, constraint.is_email, false),
    }
}

/// A value of exactly `length` units, then allowed values of that length
fn exact_length<'a>(
    constraint: &'a FieldConstraint,
    length: usize,
    fill: fn(usize) -> String,
) -> Candidates<'a> {
    let built = match constraint.field_type {
        FieldType::String => shaped_exact(length, constraint.is_email, constraint.is_url, fill).map(Value::String),
        FieldType::Number => number_with_digits(length),
        FieldType::Boolean => None,
    };
    let allowed = allowed_values(constraint).filter(move |value| measured_length(value) == Some(length));
    Box::new(built.into_iter().chain(allowed))
}

/// Breaks one format rule while keeping the other format and the lengths
fn format_breaker<'a>(constraint: &'a FieldConstraint, token: &str, email: bool, url: bool) -> Candidates<'a> {
    let built = fitted(token, constraint, email, url).map(Value::String);
    Box::new(built.into_iter().chain(allowed_values(constraint)))
}

fn outside_enum(constraint: &FieldConstraint) -> Candidates<'_> {
    match constraint.field_type {
        FieldType::String => Box::new(
            (0..ENUM_ATTEMPTS)
                .map(|attempt| match attempt {
                    0 => NOT_IN_ENUM.to_string(),
                    n => format!("{n}_{NOT_IN_ENUM}"),
                })
                .filter_map(|token| fitted(&token, constraint, constraint.is_email, constraint.is_url))
                .map(Value::String),
        ),
        FieldType::Number => {
            let highest = allowed_values(constraint)
                .filter_map(|value| value.as_f64())
                .fold(0.0_f64, f64::max);
            let above = (highest.floor() as i64).saturating_add(1);
            let shortest = constraint.min_length.unwrap_or(1).max(1);
            let longest = constraint.max_length.unwrap_or(MAX_NUMBER_DIGITS).min(MAX_NUMBER_DIGITS);
            let within_digits = (shortest..=longest).flat_map(|digits| {
                let start = 10_i64.pow((digits - 1) as u32);
                (0..ENUM_ATTEMPTS as i64).map(move |offset| start + offset)
            });
            Box::new(std::iter::once(above).chain(within_digits).map(Value::from))
        }
        FieldType::Boolean => Box::new([Value::Bool(false), Value::Bool(true)].into_iter()),
    }
}

fn allowed_values(constraint: &FieldConstraint) -> impl Iterator<Item = Value> + '_ {
    constraint.allowed.iter().flatten().cloned()
}

/// Prefix and suffix that make a string pass the requested format rules
fn affixes(email: bool, url: bool) -> (&'static str, &'static str) {
    match (email, url) {
        (false, false) => ("", ""),
        (true, false) => ("", EMAIL_DOMAIN),
        (false, true) => (URL_SCHEME, URL_TLD),
        (true, true) => (URL_SCHEME, EMAIL_DOMAIN),
    }
}

/// A string of exactly `length` chars in the requested format
///
/// `None` when the format's fixed parts leave no room for a body.
fn shaped_exact(length: usize, email: bool, url: bool, fill: fn(usize) -> String) -> Option<String> {
    let (prefix, suffix) = affixes(email, url);
    let fixed = prefix.len() + suffix.len();
    let body = length.checked_sub(fixed)?;
    if fixed > 0 && body == 0 {
        return None;
    }
    Some(format!("{prefix}{}{suffix}", fill(body)))
}

/// Wrap `token` in the requested format, trimming or padding the body
/// with `x` until the whole string fits the declared length bounds
fn fitted(token: &str, constraint: &FieldConstraint, email: bool, url: bool) -> Option<String> {
    let (prefix, suffix) = affixes(email, url);
    let fixed = prefix.len() + suffix.len();
    let shortest_body = usize::from(fixed > 0);
    let lower = constraint.min_length.unwrap_or(0).saturating_sub(fixed).max(shortest_body);
    let upper = match constraint.max_length {
        Some(max) => max.checked_sub(fixed)?,
        None => usize::MAX,
    };
    if upper < lower {
        return None;
    }

    let mut body: String = token.chars().take(upper).collect();
    let missing = lower.saturating_sub(body.chars().count());
    body.extend(std::iter::repeat('x').take(missing));
    Some(format!("{prefix}{body}{suffix}"))
}

/// Numbers measure length in decimal digits; zero digits is not a number
fn number_with_digits(digits: usize) -> Option<Value> {
    if digits == 0 || digits > MAX_NUMBER_DIGITS {
        return None;
    }
    "1".repeat(digits).parse::<u64>().ok().map(Value::from)
}
