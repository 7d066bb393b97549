use std::fmt;

use serde::{Serialize, Serializer};

/// Literal text used in place of a field that could not be located.
pub const SENTINEL: &str = "N/A";

/// A field that is either present or explicitly missing.
///
/// `Missing` is never rendered as an empty string or omitted; it always
/// becomes [`SENTINEL`] so downstream rows keep a constant arity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldValue<T> {
    /// The field was located and converted.
    Present(T),
    /// The field was absent from the source.
    #[default]
    Missing,
}

impl<T> FieldValue<T> {
    /// Returns the present value, if any.
    #[must_use]
    pub const fn as_present(&self) -> Option<&T> {
        match self {
            Self::Present(value) => Some(value),
            Self::Missing => None,
        }
    }

    /// Returns `true` if the field was absent.
    #[must_use]
    pub const fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Maps the present value, keeping `Missing` as-is.
    #[must_use]
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FieldValue<U> {
        match self {
            Self::Present(value) => FieldValue::Present(f(value)),
            Self::Missing => FieldValue::Missing,
        }
    }
}

impl<T> From<Option<T>> for FieldValue<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Missing, Self::Present)
    }
}

impl<T: fmt::Display> fmt::Display for FieldValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present(value) => value.fmt(f),
            Self::Missing => f.write_str(SENTINEL),
        }
    }
}

impl<T: Serialize> Serialize for FieldValue<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Present(value) => value.serialize(serializer),
            Self::Missing => serializer.serialize_str(SENTINEL),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_renders_as_sentinel() {
        let value: FieldValue<i32> = FieldValue::Missing;
        assert_eq!(value.to_string(), "N/A");
        assert_eq!(serde_json::to_string(&value).unwrap(), "\"N/A\"");
    }

    #[test]
    fn present_renders_inner_value() {
        let value = FieldValue::Present(28);
        assert_eq!(value.to_string(), "28");
        assert_eq!(value.as_present(), Some(&28));
    }

    #[test]
    fn converts_from_option() {
        assert!(FieldValue::<u8>::from(None).is_missing());
        assert_eq!(FieldValue::from(Some(3)), FieldValue::Present(3));
    }
}
