//! Filter predicates pushed to the building layers.
//!
//! Two predicates are derived from the current year `Y` over the year
//! attribute `F`:
//!
//! ```text
//! built before:  F IS NOT NULL AND F > 0 AND F < Y
//! built in:      F IS NOT NULL AND F > 0 AND F = Y
//! ```
//!
//! They never select the same building: a value is either strictly below
//! `Y` or equal to it. `matches()` evaluates a predicate locally so that
//! property can be checked without a renderer.

use serde::{Deserialize, Serialize};

use super::error::TimelineError;

/// Attribute holding the construction year in the building service
pub const DEFAULT_YEAR_FIELD: &str = "bouwjaar";

/// Validated name of the year attribute.
///
/// Only plain identifiers are accepted, so a predicate can never be broken
/// by whatever is written in the settings file.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearField(String);

impl YearField {
    pub fn new(name: impl Into<String>) -> Result<Self, TimelineError> {
        let name = name.into();
        let mut chars = name.chars();
        let valid_start = chars
            .next()
            .map(|c| c.is_ascii_alphabetic() || c == '_')
            .unwrap_or(false);
        if valid_start && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            Ok(Self(name))
        } else {
            Err(TimelineError::InvalidField(name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for YearField {
    fn default() -> Self {
        Self(DEFAULT_YEAR_FIELD.to_string())
    }
}

impl TryFrom<String> for YearField {
    type Error = TimelineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<YearField> for String {
    fn from(field: YearField) -> Self {
        field.0
    }
}

impl std::fmt::Display for YearField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// How the attribute is compared against the year
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    /// Built strictly before the year
    Before,
    /// Built in exactly the year
    Exactly,
}

impl Comparison {
    fn operator(self) -> &'static str {
        match self {
            Comparison::Before => "<",
            Comparison::Exactly => "=",
        }
    }
}

/// Declarative filter for one layer
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterExpr {
    pub field: YearField,
    pub comparison: Comparison,
    pub year: i32,
}

impl FilterExpr {
    pub fn built_before(field: &YearField, year: i32) -> Self {
        Self {
            field: field.clone(),
            comparison: Comparison::Before,
            year,
        }
    }

    pub fn built_in(field: &YearField, year: i32) -> Self {
        Self {
            field: field.clone(),
            comparison: Comparison::Exactly,
            year,
        }
    }

    /// Whether a building with attribute value `value` passes the filter.
    /// `None` stands for a NULL attribute.
    pub fn matches(&self, value: Option<i64>) -> bool {
        let Some(v) = value else {
            return false;
        };
        if v <= 0 {
            return false;
        }
        let year = i64::from(self.year);
        match self.comparison {
            Comparison::Before => v < year,
            Comparison::Exactly => v == year,
        }
    }

    /// Predicate string in the renderer's query grammar
    pub fn expression(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for FilterExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let field = &self.field;
        write!(
            f,
            "{field} IS NOT NULL AND {field} > 0 AND {field} {} {}",
            self.comparison.operator(),
            self.year
        )
    }
}
