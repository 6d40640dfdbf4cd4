//! Field validation with every failure collected, not just the first.
//!
//! Errors are keyed by field name and render in field-name order:
//!
//! ```text
//! author: cannot be blank; content: cannot be blank; title: cannot be blank.
//! ```

use std::collections::BTreeMap;
use std::fmt;

/// Why a single field was rejected.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FieldError {
    /// Empty or whitespace-only.
    Blank,
    /// Trimmed character count outside `min..=max`.
    Length { min: usize, max: usize },
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blank => f.write_str("cannot be blank"),
            Self::Length { min, max } => write!(f, "the length must be between {min} and {max}"),
        }
    }
}

/// The failing fields of one payload.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ValidationErrors(BTreeMap<&'static str, FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `error` for `field` if there is one. A field keeps its first
    /// error.
    pub fn check(&mut self, field: &'static str, error: Option<FieldError>) {
        if let Some(error) = error {
            self.0.entry(field).or_insert(error);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&FieldError> {
        self.0.get(field)
    }

    /// Failing field names in display order.
    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }

    /// `Ok(())` when nothing failed.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, error)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {error}")?;
        }
        if !self.0.is_empty() {
            f.write_str(".")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

// ── Rules ─────────────────────────────────────────────────────────────────────

/// Fails on empty or whitespace-only values.
pub fn required(value: &str) -> Option<FieldError> {
    value.trim().is_empty().then_some(FieldError::Blank)
}

/// Fails when the trimmed value has fewer than `min` or more than `max`
/// characters. Blank values pass; pair with [`required`] to reject them.
pub fn length(value: &str, min: usize, max: usize) -> Option<FieldError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    let len = trimmed.chars().count();
    (len < min || len > max).then_some(FieldError::Length { min, max })
}
