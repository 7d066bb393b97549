#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Field extraction from document nodes and delimited text tokens.
//!
//! A [`FieldLocator`] is plain data (usually loaded from TOML) describing
//! how to find one logical field: a CSS selector, an optional label
//! filter, where the value lives, how to cut it out of the matched text,
//! which unit to strip, and what to fall back to. [`FieldLocator::compile`]
//! validates it once and yields a [`CompiledLocator`] that can be run
//! against any number of document units.
//!
//! A locator that matches nothing is not an error: the result is
//! [`Extracted::Fallback`], normally the `"N/A"` sentinel.

pub mod locator;
pub mod token;

pub use locator::{CompiledLocator, FieldLocator, LabelMatch, ValueSource};

/// Errors raised while compiling a [`FieldLocator`].
#[derive(Debug, thiserror::Error)]
pub enum LocatorError {
    /// The CSS selector did not parse.
    #[error("invalid CSS selector '{selector}': {message}")]
    Selector {
        /// The selector text.
        selector: String,
        /// Parser message.
        message: String,
    },

    /// A label or value pattern did not compile.
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// The outcome of extracting one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extracted {
    /// The field was located; holds the trimmed, unit-stripped value.
    Found(String),
    /// Nothing matched; holds the locator's fallback value.
    Fallback(String),
}

impl Extracted {
    /// The extracted text, whichever way it was produced.
    #[must_use]
    pub fn into_value(self) -> String {
        match self {
            Self::Found(value) | Self::Fallback(value) => value,
        }
    }

    /// Borrows the extracted text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Found(value) | Self::Fallback(value) => value,
        }
    }

    /// Whether the fallback was used.
    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}
