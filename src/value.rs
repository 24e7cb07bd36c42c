use std::{cmp::Ordering, fmt, sync::Arc};

use serde::{Deserialize, Serialize};

/// Represents a single scalar stored in a row field.
///
/// Comparisons between values are loose: a text holding `"42"` equals the
/// number `42`, booleans compare as `0`/`1`, and `NULL` only equals `NULL`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// represents an empty or missing value.
    Null,
    /// A boolean value.
    Bool(bool),
    /// A 64-bit signed integer value.
    Int(i64),
    /// A 64-bit floating-point value.
    Float(f64),
    /// A UTF-8 string value, wrapped in an [Arc] for cheap cloning between
    /// stored rows and result sets.
    Text(Arc<str>),
}

impl Value {
    /// Returns `true` if the value is [Value::Null].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the inner integer value if this is a [Value::Int].
    /// Otherwise, returns `None`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the inner float value if this is a [Value::Float].
    /// Otherwise, returns `None`.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns a reference to the inner string slice if this is a [Value::Text].
    /// Otherwise, returns `None`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the inner boolean value if this is a [Value::Bool].
    /// Otherwise, returns `None`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Numeric reading of the value used by loose comparisons.
    ///
    /// `NULL` reads as `0`, booleans as `0`/`1`, and text is parsed after
    /// trimming (empty text is `0`, unparsable text is `NaN`).
    pub fn to_number(&self) -> f64 {
        match self {
            Self::Null => 0.0,
            Self::Bool(b) => f64::from(u8::from(*b)),
            Self::Int(i) => *i as f64,
            Self::Float(f) => *f,
            Self::Text(s) => parse_number(s),
        }
    }

    /// Loose equality, as used by the `=` and `!=` comparators.
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Null, _) | (_, Self::Null) => false,
            (Self::Text(l), Self::Text(r)) => l == r,
            (Self::Bool(l), Self::Bool(r)) => l == r,
            (Self::Int(l), Self::Int(r)) => l == r,
            // a boolean is first turned into a number, then compared again
            (Self::Bool(_), _) => Value::Float(self.to_number()).loose_eq(other),
            (_, Self::Bool(_)) => self.loose_eq(&Value::Float(other.to_number())),
            _ => self.to_number() == other.to_number(),
        }
    }

    /// Loose ordering, as used by the `<`, `<=`, `>` and `>=` comparators.
    ///
    /// Two texts compare lexicographically; every other pair is compared
    /// numerically. Returns `None` when either side reads as `NaN`, in which
    /// case every ordering comparator is false.
    pub fn loose_cmp(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Self::Text(l), Self::Text(r)) => Some(l.cmp(r)),
            (Self::Int(l), Self::Int(r)) => Some(l.cmp(r)),
            _ => self.to_number().partial_cmp(&other.to_number()),
        }
    }

    /// Total order used by `ORDER BY`.
    ///
    /// Values of different kinds are ranked `NULL < bool < number < text`;
    /// integers and floats compare numerically with each other.
    pub fn sort_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Self::Bool(l), Self::Bool(r)) => l.cmp(r),
            (Self::Int(l), Self::Int(r)) => l.cmp(r),
            (Self::Text(l), Self::Text(r)) => l.cmp(r),
            (Self::Int(_) | Self::Float(_), Self::Int(_) | Self::Float(_)) => {
                self.to_number().total_cmp(&other.to_number())
            }
            _ => self.rank().cmp(&other.rank()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Bool(_) => 1,
            Self::Int(_) | Self::Float(_) => 2,
            Self::Text(_) => 3,
        }
    }
}

/// Parses text the way a loose comparison reads it as a number.
fn parse_number(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = trimmed.strip_prefix(prefix) {
            return u64::from_str_radix(digits, radix)
                .map(|n| n as f64)
                .unwrap_or(f64::NAN);
        }
    }

    // Rust also accepts "inf" and "nan" spellings which must stay NaN here
    if trimmed
        .chars()
        .any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E')
    {
        return f64::NAN;
    }

    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(Arc::from(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(Arc::from(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ─────────────────────────────────────────────────────────────
    // Test 1 : accessors
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_accessors() {
        assert!(Value::Null.is_null());
        assert!(!Value::Int(1).is_null());
        assert_eq!(Value::Int(42).as_int(), Some(42));
        assert_eq!(Value::Float(1.0).as_int(), None);
        assert_eq!(Value::Float(3.5).as_float(), Some(3.5));
        assert_eq!(Value::from("hello").as_str(), Some("hello"));
        assert_eq!(Value::Bool(false).as_bool(), Some(false));
        assert_eq!(Value::Text("true".into()).as_bool(), None);
    }

    // ─────────────────────────────────────────────────────────────
    // Test 2 : loose equality across kinds
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_loose_eq() {
        assert!(Value::Int(1).loose_eq(&Value::from("1")));
        assert!(Value::from(" 1 ").loose_eq(&Value::Int(1)));
        assert!(Value::Int(1).loose_eq(&Value::Float(1.0)));
        assert!(Value::Bool(true).loose_eq(&Value::Int(1)));
        assert!(Value::Bool(true).loose_eq(&Value::from("1")));
        assert!(Value::from("").loose_eq(&Value::Int(0)));
        assert!(Value::Null.loose_eq(&Value::Null));

        assert!(!Value::Null.loose_eq(&Value::Int(0)));
        assert!(!Value::from("abc").loose_eq(&Value::from("ABC")));
        assert!(!Value::from("abc").loose_eq(&Value::Float(f64::NAN)));
        assert!(!Value::Bool(true).loose_eq(&Value::from("true")));
    }

    // ─────────────────────────────────────────────────────────────
    // Test 3 : loose ordering
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_loose_cmp() {
        assert_eq!(Value::Int(2).loose_cmp(&Value::Int(10)), Some(Ordering::Less));
        // text against text is lexicographic
        assert_eq!(
            Value::from("2").loose_cmp(&Value::from("10")),
            Some(Ordering::Greater)
        );
        // text against a number is numeric
        assert_eq!(
            Value::from("2").loose_cmp(&Value::Int(10)),
            Some(Ordering::Less)
        );
        assert_eq!(Value::Null.loose_cmp(&Value::Int(1)), Some(Ordering::Less));
        assert_eq!(Value::from("abc").loose_cmp(&Value::Int(1)), None);
    }

    // ─────────────────────────────────────────────────────────────
    // Test 4 : sort order is total
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_sort_cmp() {
        let mut values = vec![
            Value::from("b"),
            Value::Int(3),
            Value::Null,
            Value::Float(2.5),
            Value::Bool(true),
            Value::from("a"),
        ];
        values.sort_by(Value::sort_cmp);

        assert_eq!(
            values,
            vec![
                Value::Null,
                Value::Bool(true),
                Value::Float(2.5),
                Value::Int(3),
                Value::from("a"),
                Value::from("b"),
            ]
        );
        assert_eq!(Value::Int(1).sort_cmp(&Value::Float(1.0)), Ordering::Equal);
    }

    // ─────────────────────────────────────────────────────────────
    // Test 5 : number parsing
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("12.5"), 12.5);
        assert_eq!(parse_number("1e3"), 1000.0);
        assert_eq!(parse_number("0x1A"), 26.0);
        assert_eq!(parse_number("-Infinity"), f64::NEG_INFINITY);
        assert!(parse_number("inf").is_nan());
        assert!(parse_number("12abc").is_nan());
    }

    // ─────────────────────────────────────────────────────────────
    // Test 6 : json shape
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_json_untagged() {
        let values = vec![
            Value::Null,
            Value::Bool(true),
            Value::Int(7),
            Value::Float(1.5),
            Value::from("x"),
        ];
        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(json, r#"[null,true,7,1.5,"x"]"#);

        let back: Vec<Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, values);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::from("Alice").to_string(), "Alice");
        assert_eq!(Value::Float(2.0).to_string(), "2");
    }
}
