//! Loose record identity.
//!
//! Path segments are always strings while stored ids may be numbers, so a
//! record with id `7` must be addressable as `"7"`. Comparison follows the
//! usual loose-equality rules between a scalar and a string.

use serde_json::Value;

/// Name of the identity field on every record.
pub const ID_FIELD: &str = "id";

/// Returns `true` if a stored id value loosely equals a path segment.
pub fn id_matches(id: &Value, segment: &str) -> bool {
    match id {
        Value::String(s) => s == segment,
        Value::Number(n) => match (n.as_f64(), parse_number(segment)) {
            (Some(stored), Some(wanted)) => stored == wanted,
            _ => false,
        },
        Value::Bool(b) => parse_number(segment) == Some(if *b { 1.0 } else { 0.0 }),
        Value::Null | Value::Array(_) | Value::Object(_) => false,
    }
}

/// Returns `true` if `record` is an object whose `id` loosely equals `segment`.
pub fn record_has_id(record: &Value, segment: &str) -> bool {
    record
        .get(ID_FIELD)
        .is_some_and(|id| id_matches(id, segment))
}

/// Integer view of an id, used for auto-id assignment.
///
/// Integral numbers and strings holding an integer qualify when they fit in
/// an `i64`; anything else is ignored rather than clamped.
pub fn numeric_id(id: &Value) -> Option<i64> {
    // 2^63: the first float past i64::MAX.
    const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;
    match id {
        Value::Number(n) => n.as_i64().or_else(|| {
            if n.is_u64() {
                return None;
            }
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= -I64_BOUND && *f < I64_BOUND)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Returns `true` when a record's id counts as "not supplied".
///
/// Absent, `null`, `false`, `0` and `""` all leave the id to be assigned.
pub fn id_is_missing(id: Option<&Value>) -> bool {
    match id {
        None | Some(Value::Null) => true,
        Some(Value::Bool(b)) => !b,
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => false,
    }
}

fn parse_number(segment: &str) -> Option<f64> {
    let trimmed = segment.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|f| f.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn number_matches_string_segment() {
        assert!(id_matches(&json!(7), "7"));
        assert!(id_matches(&json!(7), " 7 "));
        assert!(id_matches(&json!(7.0), "7"));
        assert!(id_matches(&json!(1.5), "1.5"));
        assert!(!id_matches(&json!(7), "8"));
        assert!(!id_matches(&json!(7), "seven"));
        assert!(!id_matches(&json!(0), ""));
    }

    #[test]
    fn string_matches_exactly() {
        assert!(id_matches(&json!("7"), "7"));
        assert!(id_matches(&json!("abc"), "abc"));
        assert!(!id_matches(&json!("07"), "7"));
    }

    #[test]
    fn booleans_compare_numerically() {
        assert!(id_matches(&json!(true), "1"));
        assert!(id_matches(&json!(false), "0"));
        assert!(!id_matches(&json!(true), "true"));
    }

    #[test]
    fn structured_ids_never_match() {
        assert!(!id_matches(&Value::Null, "null"));
        assert!(!id_matches(&json!([1]), "1"));
        assert!(!id_matches(&json!({"a": 1}), "1"));
    }

    #[test]
    fn record_without_id_never_matches() {
        assert!(record_has_id(&json!({"id": 3}), "3"));
        assert!(!record_has_id(&json!({"name": "x"}), "3"));
        assert!(!record_has_id(&json!(3), "3"));
    }

    #[test]
    fn numeric_views() {
        assert_eq!(numeric_id(&json!(4)), Some(4));
        assert_eq!(numeric_id(&json!(4.0)), Some(4));
        assert_eq!(numeric_id(&json!("12")), Some(12));
        assert_eq!(numeric_id(&json!(4.5)), None);
        assert_eq!(numeric_id(&json!("abc")), None);
        assert_eq!(numeric_id(&Value::Null), None);
    }

    #[test]
    fn out_of_range_ids_are_ignored() {
        assert_eq!(numeric_id(&json!(i64::MAX)), Some(i64::MAX));
        assert_eq!(numeric_id(&json!(u64::MAX)), None);
        assert_eq!(numeric_id(&json!(1e19)), None);
        assert_eq!(numeric_id(&json!(-1e19)), None);
        assert_eq!(numeric_id(&json!("18446744073709551615")), None);
    }

    #[test]
    fn missing_ids() {
        assert!(id_is_missing(None));
        assert!(id_is_missing(Some(&Value::Null)));
        assert!(id_is_missing(Some(&json!(0))));
        assert!(id_is_missing(Some(&json!(""))));
        assert!(id_is_missing(Some(&json!(false))));
        assert!(!id_is_missing(Some(&json!(5))));
        assert!(!id_is_missing(Some(&json!("x"))));
    }
}
