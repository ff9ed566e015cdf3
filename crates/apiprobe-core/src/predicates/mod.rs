//! Named boolean predicates over HTTP responses
//!
//! Every predicate resolves its path through [`crate::path`] and answers
//! `false` for anything it cannot resolve: a non-JSON body, a missing
//! property, a projection over a non-array. "Path absent" and "predicate
//! false" are deliberately indistinguishable to the caller.

pub mod guards;

pub use guards::{is_department, is_employee, is_user};

use crate::http::RawResponse;
use crate::path::{self, Matches};
use serde_json::Value;

fn with_matches<F>(response: &RawResponse, path: &str, f: F) -> bool
where
    F: FnOnce(Matches<'_>) -> bool,
{
    match response.json() {
        Some(json) => f(path::resolve(json, path)),
        None => false,
    }
}

/// Status equality, `false` for transport failures
pub fn is_status(response: &RawResponse, expected: u16) -> bool {
    response.status == Some(expected)
}

/// At least one match and no match absent or null
///
/// An empty projection (`"[]id"` over `[]`) does not exist.
pub fn is_exists(response: &RawResponse, path: &str) -> bool {
    with_matches(response, path, |matches| matches.all_present())
}

/// Exactly one present match, strictly equal to `expected`
pub fn is_equal(response: &RawResponse, path: &str, expected: &Value) -> bool {
    with_matches(response, path, |matches| {
        matches.single().is_some_and(|value| strict_eq(value, expected))
    })
}

/// Apply a caller predicate to the resolved value
///
/// Projected paths hand the predicate an array of every match (absent
/// slots as null); plain paths hand it the single present match.
pub fn is_equal_with<F>(response: &RawResponse, path: &str, predicate: F) -> bool
where
    F: FnOnce(&Value) -> bool,
{
    with_matches(response, path, |matches| {
        if matches.is_projected() {
            if matches.is_empty() {
                return false;
            }
            predicate(&Value::Array(matches.to_values()))
        } else {
            matches.single().is_some_and(predicate)
        }
    })
}

/// Every resolved element strictly equals `expected`
pub fn is_every_item_equal(response: &RawResponse, path: &str, expected: &Value) -> bool {
    is_equal_with(response, path, |value| match value {
        Value::Array(items) => !items.is_empty() && items.iter().all(|item| strict_eq(item, expected)),
        other => strict_eq(other, expected),
    })
}

/// Every resolved element is a string containing `substring` (case-sensitive)
pub fn is_every_item_contain(response: &RawResponse, path: &str, substring: &str) -> bool {
    with_matches(response, path, |matches| {
        !matches.is_empty()
            && matches
                .slots()
                .iter()
                .all(|slot| matches!(slot, Some(Value::String(text)) if text.contains(substring)))
    })
}

/// The values at `path` in two responses share nothing
///
/// Used to prove that two pagination windows are disjoint. Both bodies
/// must be JSON; absent slots are ignored. Values compare with
/// [`strict_eq`], so `1` and `1.0` are the same item.
pub fn is_every_item_different(first: &RawResponse, second: &RawResponse, path: &str) -> bool {
    let (Some(first_json), Some(second_json)) = (first.json(), second.json()) else {
        return false;
    };

    let first_matches = path::resolve(first_json, path);
    let seen: Vec<&Value> = first_matches.present().collect();
    let second_matches = path::resolve(second_json, path);
    let disjoint = second_matches
        .present()
        .all(|value| !seen.iter().any(|earlier| strict_eq(earlier, value)));
    disjoint
}

/// Number of items at `path` lies in `[min, max]`
///
/// Projected paths count their matches; a plain path must point at an
/// array and counts its elements.
pub fn is_total_data_in_range(response: &RawResponse, path: &str, min: usize, max: usize) -> bool {
    with_matches(response, path, |matches| {
        let total = if matches.is_projected() {
            matches.len()
        } else {
            match matches.single() {
                Some(Value::Array(items)) => items.len(),
                _ => return false,
            }
        };
        (min..=max).contains(&total)
    })
}

/// JSON equality without coercion, numbers compared by value
pub fn strict_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => a == b,
        },
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| strict_eq(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter().all(|(key, x)| b.get(key).is_some_and(|y| strict_eq(x, y)))
        }
        _ => left == right,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ok(body: Value) -> RawResponse {
        RawResponse::from_json(200, body)
    }

    #[test]
    fn test_is_status() {
        assert!(is_status(&ok(json!({})), 200));
        assert!(!is_status(&ok(json!({})), 201));
        assert!(!is_status(&RawResponse::transport_failure("timeout", 0), 200));
    }

    #[test]
    fn test_is_exists_on_empty_projection_is_false() {
        assert!(!is_exists(&ok(json!([])), "[]field"));
        assert!(is_exists(&ok(json!([{"field": "x"}])), "[]field"));
    }

    #[test]
    fn test_is_exists_projection_needs_array_body() {
        let wrapped = ok(json!({"list": [{"field": "x"}]}));
        assert!(!is_exists(&wrapped, "[]field"));
        assert!(is_exists(&wrapped, "list"));
    }

    #[test]
    fn test_is_exists_requires_every_element() {
        let response = ok(json!([{"name": "a"}, {"name": null}]));
        assert!(!is_exists(&response, "[]name"));
        let response = ok(json!([{"name": "a"}, {}]));
        assert!(!is_exists(&response, "[]name"));
    }

    #[test]
    fn test_is_exists_on_plain_path() {
        let response = ok(json!({"departmentId": "d-1"}));
        assert!(is_exists(&response, "departmentId"));
        assert!(!is_exists(&response, "name"));
    }

    #[test]
    fn test_is_exists_on_non_json_body() {
        let response = RawResponse::new(200, Default::default(), "not json", 0);
        assert!(!is_exists(&response, ""));
    }

    #[test]
    fn test_is_equal() {
        let response = ok(json!({"name": "Engineering", "count": 3}));
        assert!(is_equal(&response, "name", &json!("Engineering")));
        assert!(!is_equal(&response, "name", &json!("engineering")));
        assert!(is_equal(&response, "count", &json!(3.0)));
        assert!(!is_equal(&response, "count", &json!("3")));
    }

    #[test]
    fn test_is_equal_rejects_multiple_matches() {
        let response = ok(json!([{"name": "a"}, {"name": "a"}]));
        assert!(!is_equal(&response, "[]name", &json!("a")));
        let response = ok(json!([{"name": "a"}]));
        assert!(is_equal(&response, "[]name", &json!("a")));
    }

    #[test]
    fn test_is_equal_with_projected_path_gets_array() {
        let response = ok(json!([{"name": "alpha"}, {"name": "gamma"}]));
        assert!(is_equal_with(&response, "[]name", |value| {
            value
                .as_array()
                .is_some_and(|names| names.iter().all(|n| n.as_str().is_some_and(|s| s.contains('a'))))
        }));
        assert!(!is_equal_with(&response, "[]name", |value| {
            value.as_array().is_some_and(|names| names.contains(&json!("beta")))
        }));
    }

    #[test]
    fn test_is_equal_with_plain_path() {
        let response = ok(json!({"gender": "female"}));
        assert!(is_equal_with(&response, "gender", |v| *v == "female"));
        assert!(!is_equal_with(&response, "missing", |_| true));
    }

    #[test]
    fn test_is_every_item_equal() {
        let response = ok(json!([{"gender": "male"}, {"gender": "male"}]));
        assert!(is_every_item_equal(&response, "[]gender", &json!("male")));
        let response = ok(json!([{"gender": "male"}, {"gender": "female"}]));
        assert!(!is_every_item_equal(&response, "[]gender", &json!("male")));
        assert!(!is_every_item_equal(&ok(json!([])), "[]gender", &json!("male")));
    }

    #[test]
    fn test_is_every_item_contain() {
        let response = ok(json!([{"name": "Dana"}, {"name": "Adam"}]));
        assert!(is_every_item_contain(&response, "[]name", "a"));
        assert!(!is_every_item_contain(&response, "[]name", "D"));
        let response = ok(json!([{"name": "Dana"}, {"name": 7}]));
        assert!(!is_every_item_contain(&response, "[]name", "a"));
    }

    #[test]
    fn test_is_every_item_different_on_disjoint_pages() {
        let page_one = ok(json!([{"departmentId": "1"}, {"departmentId": "2"}]));
        let page_two = ok(json!([{"departmentId": "3"}, {"departmentId": "4"}]));
        assert!(is_every_item_different(&page_one, &page_two, "[]departmentId"));
    }

    #[test]
    fn test_is_every_item_different_detects_overlap() {
        let page_one = ok(json!([{"departmentId": "1"}, {"departmentId": "2"}]));
        let page_two = ok(json!([{"departmentId": "2"}, {"departmentId": "3"}]));
        assert!(!is_every_item_different(&page_one, &page_two, "[]departmentId"));
    }

    #[test]
    fn test_is_every_item_different_compares_numbers_by_value() {
        let page_one = ok(json!([{"id": 1}, {"id": 2}]));
        let page_two = ok(json!([{"id": 2.0}, {"id": 3}]));
        assert!(!is_every_item_different(&page_one, &page_two, "[]id"));
        let page_three = ok(json!([{"id": "1"}, {"id": 3.5}]));
        assert!(is_every_item_different(&page_one, &page_three, "[]id"));
    }

    #[test]
    fn test_is_every_item_different_needs_json() {
        let page_one = ok(json!([{"departmentId": "1"}]));
        let broken = RawResponse::transport_failure("reset", 0);
        assert!(!is_every_item_different(&page_one, &broken, "[]departmentId"));
    }

    #[test]
    fn test_is_total_data_in_range() {
        let response = ok(json!([{"id": 1}, {"id": 2}]));
        assert!(is_total_data_in_range(&response, "[]", 1, 2));
        assert!(!is_total_data_in_range(&response, "[]", 3, 5));
        assert!(!is_total_data_in_range(&ok(json!([])), "[]", 1, 5));
        assert!(is_total_data_in_range(&ok(json!([])), "[]", 0, 5));
    }

    #[test]
    fn test_is_total_data_in_range_on_plain_array_path() {
        let response = ok(json!({"data": [1, 2, 3]}));
        assert!(is_total_data_in_range(&response, "data", 3, 3));
        assert!(!is_total_data_in_range(&response, "missing", 0, 10));
    }

    #[test]
    fn test_strict_eq() {
        assert!(strict_eq(&json!(1), &json!(1.0)));
        assert!(!strict_eq(&json!(1), &json!("1")));
        assert!(!strict_eq(&json!(null), &json!(false)));
        assert!(strict_eq(&json!({"a": [1, 2]}), &json!({"a": [1.0, 2]})));
    }
}
