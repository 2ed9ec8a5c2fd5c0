use std::fmt;

use serde::Serialize;
use shapefile::dbase::FieldValue;

/// A scalar attribute value read from either source.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttrValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Null,
}

impl AttrValue {
    /// True for `Null` and for text that is empty after trimming.
    pub fn is_missing(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Get the value as trimmed, non-empty text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) if !s.trim().is_empty() => Some(s.trim()),
            _ => None,
        }
    }

    /// Get the value as a number, parsing text if needed.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Canonical string used to compare join keys across sources.
    /// `7`, `7.0` and `" 7 "` all map to `"7"`; missing values have no key.
    pub fn join_key(&self) -> Option<String> {
        if self.is_missing() { return None }
        Some(self.to_string())
    }

    /// Join key for a key column that is numeric on the other side: numeric
    /// text takes the canonical number form, so `"7.0"` and `"07"` match `7`.
    pub fn numeric_join_key(&self) -> Option<String> {
        match self.as_f64() {
            Some(n) if n.is_finite() => Some(Self::Number(n).to_string()),
            _ => self.join_key(),
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{}", s.trim()),
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Self::Number(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Null => Ok(()),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self { Self::Text(s.to_string()) }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self { Self::Text(s) }
}

impl From<f64> for AttrValue {
    fn from(n: f64) -> Self { Self::Number(n) }
}

impl From<Option<&str>> for AttrValue {
    fn from(s: Option<&str>) -> Self {
        s.map_or(Self::Null, Self::from)
    }
}

impl From<FieldValue> for AttrValue {
    fn from(value: FieldValue) -> Self {
        match value {
            FieldValue::Character(Some(s)) | FieldValue::Memo(s) => Self::Text(s.trim().to_string()),
            FieldValue::Numeric(Some(n)) | FieldValue::Double(n) | FieldValue::Currency(n) => Self::Number(n),
            FieldValue::Float(Some(n)) => Self::Number(n as f64),
            FieldValue::Integer(n) => Self::Number(n as f64),
            FieldValue::Logical(Some(b)) => Self::Bool(b),
            FieldValue::Date(Some(d)) => Self::Text(format!("{:04}-{:02}-{:02}", d.year(), d.month(), d.day())),
            _ => Self::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_key_normalizes_numbers_and_text() {
        assert_eq!(AttrValue::Number(7.0).join_key().as_deref(), Some("7"));
        assert_eq!(AttrValue::from(" 7 ").join_key().as_deref(), Some("7"));
        assert_eq!(AttrValue::Number(7.5).join_key().as_deref(), Some("7.5"));
    }

    #[test]
    fn numeric_join_key_parses_text() {
        assert_eq!(AttrValue::from("7.0").numeric_join_key().as_deref(), Some("7"));
        assert_eq!(AttrValue::from("007").numeric_join_key().as_deref(), Some("7"));
        assert_eq!(AttrValue::from("PP").numeric_join_key().as_deref(), Some("PP"));
        assert_eq!(AttrValue::from("007").join_key().as_deref(), Some("007"));
        assert_eq!(AttrValue::Null.numeric_join_key(), None);
    }

    #[test]
    fn missing_values_have_no_key() {
        assert_eq!(AttrValue::Null.join_key(), None);
        assert_eq!(AttrValue::from("   ").join_key(), None);
        assert!(AttrValue::from("").is_missing());
        assert!(!AttrValue::Bool(false).is_missing());
    }

    #[test]
    fn as_f64_parses_text() {
        assert_eq!(AttrValue::from("2.5").as_f64(), Some(2.5));
        assert_eq!(AttrValue::from("wide").as_f64(), None);
        assert_eq!(AttrValue::Null.as_f64(), None);
    }

    #[test]
    fn dbase_values_convert() {
        assert_eq!(AttrValue::from(FieldValue::Character(Some(" Hydro ".into()))), AttrValue::from("Hydro"));
        assert_eq!(AttrValue::from(FieldValue::Numeric(Some(12.0))), AttrValue::Number(12.0));
        assert_eq!(AttrValue::from(FieldValue::Character(None)), AttrValue::Null);
        assert_eq!(AttrValue::from(FieldValue::Integer(3)), AttrValue::Number(3.0));
    }
}
