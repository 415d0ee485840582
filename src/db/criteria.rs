//! Match filter evaluation
//!
//! A filter is a JSON object mapping dotted field paths to either a literal
//! (equality, with array fields matching when any element is equal) or an
//! operator expression such as `{"$exists": true, "$type": "array"}`.
//! Top-level `$and`, `$or` and `$nor` combine sub-filters.

use std::cmp::Ordering;

use serde_json::{Map, Value};

use crate::error::{StoreError, StoreResult};

/// Name of a JSON value's type as used by `$type`
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Check whether `doc` satisfies `filter`. A null filter matches everything.
pub fn matches(doc: &Value, filter: &Value) -> StoreResult<bool> {
    match filter {
        Value::Null => Ok(true),
        Value::Object(conditions) => {
            for (key, condition) in conditions {
                if !matches_entry(doc, key, condition)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        other => Err(StoreError::Criteria(format!(
            "filter must be an object, got {}",
            type_name(other)
        ))),
    }
}

/// Resolve a dotted path inside a document
pub fn lookup<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(doc, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

fn matches_entry(doc: &Value, key: &str, condition: &Value) -> StoreResult<bool> {
    match key {
        "$and" => {
            for clause in clauses(key, condition)? {
                if !matches(doc, clause)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        "$or" => {
            for clause in clauses(key, condition)? {
                if matches(doc, clause)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        "$nor" => {
            for clause in clauses(key, condition)? {
                if matches(doc, clause)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        op if op.starts_with('$') => Err(StoreError::Criteria(format!(
            "unknown top-level operator '{op}'"
        ))),
        path => {
            let found = lookup(doc, path);
            match operator_expression(condition) {
                Some(ops) => evaluate(found, ops),
                None => Ok(equals(found, condition)),
            }
        }
    }
}

fn clauses<'a>(op: &str, condition: &'a Value) -> StoreResult<&'a [Value]> {
    match condition {
        Value::Array(items) if !items.is_empty() => Ok(items.as_slice()),
        _ => Err(StoreError::Criteria(format!(
            "'{op}' expects a non-empty array of filters"
        ))),
    }
}

/// `Some` when the value is an operator object like `{"$gt": 1}`
fn operator_expression(value: &Value) -> Option<&Map<String, Value>> {
    match value {
        Value::Object(map)
            if !map.is_empty()
                && map.keys().all(|k| k.starts_with('$'))
                && oid(value).is_none() =>
        {
            Some(map)
        }
        _ => None,
    }
}

fn evaluate(found: Option<&Value>, ops: &Map<String, Value>) -> StoreResult<bool> {
    for (op, arg) in ops {
        let ok = match op.as_str() {
            "$exists" => found.is_some() == truthy(arg),
            "$type" => match arg {
                Value::String(name) => type_matches(found, name)?,
                Value::Array(names) => {
                    let mut any = false;
                    for name in names {
                        let Value::String(name) = name else {
                            return Err(StoreError::Criteria("'$type' names must be strings".into()));
                        };
                        any |= type_matches(found, name)?;
                    }
                    any
                }
                _ => return Err(StoreError::Criteria("'$type' expects a type name".into())),
            },
            "$not" => match operator_expression(arg) {
                Some(inner) => !evaluate(found, inner)?,
                None => {
                    return Err(StoreError::Criteria(
                        "'$not' expects an operator expression".into(),
                    ));
                }
            },
            "$eq" => equals(found, arg),
            "$ne" => !equals(found, arg),
            "$in" => in_list(op, found, arg)?,
            "$nin" => !in_list(op, found, arg)?,
            "$gt" => compare(found, arg) == Some(Ordering::Greater),
            "$gte" => matches!(compare(found, arg), Some(Ordering::Greater | Ordering::Equal)),
            "$lt" => compare(found, arg) == Some(Ordering::Less),
            "$lte" => matches!(compare(found, arg), Some(Ordering::Less | Ordering::Equal)),
            "$size" => match (found, arg.as_u64()) {
                (Some(Value::Array(items)), Some(size)) => items.len() as u64 == size,
                (_, None) => {
                    return Err(StoreError::Criteria("'$size' expects a non-negative integer".into()));
                }
                _ => false,
            },
            other => {
                return Err(StoreError::Criteria(format!("unknown operator '{other}'")));
            }
        };
        if !ok {
            return Ok(false);
        }
    }
    Ok(true)
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        _ => true,
    }
}

fn type_matches(found: Option<&Value>, name: &str) -> StoreResult<bool> {
    let wanted = match name {
        "null" => "null",
        "bool" | "boolean" => "bool",
        "number" | "double" | "int" | "long" | "decimal" => "number",
        "string" => "string",
        "array" => "array",
        "object" => "object",
        other => {
            return Err(StoreError::Criteria(format!("unknown type name '{other}'")));
        }
    };
    Ok(found.is_some_and(|v| type_name(v) == wanted))
}

fn in_list(op: &str, found: Option<&Value>, arg: &Value) -> StoreResult<bool> {
    match arg {
        Value::Array(candidates) => Ok(candidates.iter().any(|c| equals(found, c))),
        _ => Err(StoreError::Criteria(format!("'{op}' expects an array"))),
    }
}

/// Equality as used by literal conditions: a missing field equals null,
/// and an array field matches when any of its elements is equal.
fn equals(found: Option<&Value>, expected: &Value) -> bool {
    match found {
        None => expected.is_null(),
        Some(value) => {
            values_equal(value, expected)
                || matches!(value, Value::Array(items) if items.iter().any(|i| values_equal(i, expected)))
        }
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => match (oid(a), oid(b)) {
            (Some(x), Some(y)) => x == y,
            (Some(x), None) => b.as_str() == Some(x),
            (None, Some(y)) => a.as_str() == Some(y),
            (None, None) => a == b,
        },
    }
}

/// Hex string of an extended-JSON `{"$oid": "..."}` literal
fn oid(value: &Value) -> Option<&str> {
    match value {
        Value::Object(map) if map.len() == 1 => map.get("$oid").and_then(Value::as_str),
        _ => None,
    }
}

fn compare(found: Option<&Value>, bound: &Value) -> Option<Ordering> {
    match (found?, bound) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user() -> Value {
        json!({
            "_id": "u1",
            "name": "john",
            "age": 30,
            "tags": ["admin", "dev"],
            "address": {"city": "Paris", "zip": "75001"},
            "nickname": null
        })
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(matches(&user(), &json!({})).unwrap());
        assert!(matches(&user(), &Value::Null).unwrap());
    }

    #[test]
    fn test_literal_equality() {
        let doc = user();
        assert!(matches(&doc, &json!({"name": "john"})).unwrap());
        assert!(matches(&doc, &json!({"name": "john", "age": 30.0})).unwrap());
        assert!(!matches(&doc, &json!({"name": "jane"})).unwrap());
        assert!(matches(&doc, &json!({"address.city": "Paris"})).unwrap());
        assert!(matches(&doc, &json!({"address": {"city": "Paris", "zip": "75001"}})).unwrap());
        assert!(matches(&doc, &json!({"tags.1": "dev"})).unwrap());
    }

    #[test]
    fn test_array_field_matches_any_element() {
        let doc = user();
        assert!(matches(&doc, &json!({"tags": "admin"})).unwrap());
        assert!(matches(&doc, &json!({"tags": ["admin", "dev"]})).unwrap());
        assert!(!matches(&doc, &json!({"tags": "guest"})).unwrap());
    }

    #[test]
    fn test_missing_field_equals_null() {
        let doc = user();
        assert!(matches(&doc, &json!({"missing": null})).unwrap());
        assert!(matches(&doc, &json!({"nickname": null})).unwrap());
        assert!(!matches(&doc, &json!({"missing": "x"})).unwrap());
    }

    #[test]
    fn test_exists_and_type() {
        let doc = user();
        assert!(matches(&doc, &json!({"tags": {"$exists": true, "$type": "array"}})).unwrap());
        assert!(!matches(&doc, &json!({"address": {"$type": "array"}})).unwrap());
        assert!(
            matches(
                &doc,
                &json!({"address": {"$exists": true, "$not": {"$type": "array"}, "$type": "object"}})
            )
            .unwrap()
        );
        assert!(matches(&doc, &json!({"nickname": {"$exists": true, "$type": "null"}})).unwrap());
        assert!(matches(&doc, &json!({"missing": {"$exists": false}})).unwrap());
        assert!(!matches(&doc, &json!({"missing": {"$type": "object"}})).unwrap());
        assert!(matches(&doc, &json!({"age": {"$type": ["string", "int"]}})).unwrap());
    }

    #[test]
    fn test_comparisons() {
        let doc = user();
        assert!(matches(&doc, &json!({"age": {"$gt": 18, "$lte": 30}})).unwrap());
        assert!(!matches(&doc, &json!({"age": {"$lt": 30}})).unwrap());
        assert!(matches(&doc, &json!({"name": {"$gte": "j"}})).unwrap());
        assert!(!matches(&doc, &json!({"missing": {"$gt": 0}})).unwrap());
        assert!(matches(&doc, &json!({"name": {"$ne": "jane"}})).unwrap());
        assert!(matches(&doc, &json!({"name": {"$in": ["jane", "john"]}})).unwrap());
        assert!(matches(&doc, &json!({"name": {"$nin": ["jane"]}})).unwrap());
        assert!(matches(&doc, &json!({"tags": {"$size": 2}})).unwrap());
    }

    #[test]
    fn test_logical_operators() {
        let doc = user();
        assert!(matches(&doc, &json!({"$or": [{"name": "jane"}, {"age": 30}]})).unwrap());
        assert!(!matches(&doc, &json!({"$and": [{"name": "john"}, {"age": 31}]})).unwrap());
        assert!(matches(&doc, &json!({"$nor": [{"name": "jane"}]})).unwrap());
    }

    #[test]
    fn test_oid_literals_compare_by_hex() {
        let doc = json!({"_id": {"$oid": "5f1d7a3b9c8e4a0012345678"}});
        assert!(matches(&doc, &json!({"_id": "5f1d7a3b9c8e4a0012345678"})).unwrap());

        let doc = json!({"_id": "5f1d7a3b9c8e4a0012345678"});
        assert!(matches(&doc, &json!({"_id": {"$oid": "5f1d7a3b9c8e4a0012345678"}})).unwrap());
    }

    #[test]
    fn test_invalid_filters() {
        let doc = user();
        assert!(matches(&doc, &json!([1])).is_err());
        assert!(matches(&doc, &json!({"$where": "1"})).is_err());
        assert!(matches(&doc, &json!({"age": {"$regex": "x"}})).is_err());
        assert!(matches(&doc, &json!({"age": {"$type": "date"}})).is_err());
        assert!(matches(&doc, &json!({"$and": []})).is_err());
    }

    #[test]
    fn test_lookup() {
        let doc = user();
        assert_eq!(lookup(&doc, "address.zip"), Some(&json!("75001")));
        assert_eq!(lookup(&doc, "tags.0"), Some(&json!("admin")));
        assert_eq!(lookup(&doc, "tags.5"), None);
        assert_eq!(lookup(&doc, "name.first"), None);
    }
}
