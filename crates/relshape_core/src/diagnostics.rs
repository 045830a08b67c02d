//! Diagnostic reporting for schema documents.

use serde::Serialize;
use std::fmt;

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    /// An error that prevents building queries from the schema.
    Error,
    /// A warning that doesn't prevent building queries.
    Warning,
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => f.write_str("error"),
            Self::Warning => f.write_str("warning"),
        }
    }
}

/// Where in a schema document a diagnostic applies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Location {
    /// Model (entity) or enum name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<String>,
    /// Field within the model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl Location {
    /// A location naming a whole model or enum.
    pub fn item(item: impl Into<String>) -> Self {
        Self {
            item: Some(item.into()),
            field: None,
        }
    }

    /// A location naming one field of a model.
    pub fn field(item: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            item: Some(item.into()),
            field: Some(field.into()),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.item, &self.field) {
            (Some(item), Some(field)) => write!(f, "{item}.{field}"),
            (Some(item), None) => f.write_str(item),
            (None, Some(field)) => f.write_str(field),
            (None, None) => f.write_str("<schema>"),
        }
    }
}

/// A diagnostic message.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    /// Severity level.
    pub severity: DiagnosticSeverity,
    /// Error code.
    pub code: &'static str,
    /// Short title.
    pub title: String,
    /// Detailed message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Where the problem is.
    pub location: Location,
}

impl Diagnostic {
    /// Creates a new error diagnostic.
    pub fn error(code: &'static str, title: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Error,
            code,
            title: title.into(),
            message: None,
            location: Location::default(),
        }
    }

    /// Creates a new warning diagnostic.
    pub fn warning(code: &'static str, title: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Warning,
            code,
            title: title.into(),
            message: None,
            location: Location::default(),
        }
    }

    /// Adds a message to the diagnostic.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Sets the location.
    #[must_use]
    pub fn at(mut self, location: Location) -> Self {
        self.location = location;
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}] {}: {}",
            self.severity, self.code, self.location, self.title
        )?;
        if let Some(message) = &self.message {
            write!(f, " ({message})")?;
        }
        Ok(())
    }
}

/// A collection of diagnostics.
#[derive(Debug, Default, Serialize)]
#[serde(transparent)]
pub struct DiagnosticBag {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticBag {
    /// Creates a new empty diagnostic bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a diagnostic.
    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Adds an error diagnostic.
    pub fn error(&mut self, code: &'static str, title: impl Into<String>, location: Location) {
        self.add(Diagnostic::error(code, title).at(location));
    }

    /// Adds a warning diagnostic.
    pub fn warning(&mut self, code: &'static str, title: impl Into<String>, location: Location) {
        self.add(Diagnostic::warning(code, title).at(location));
    }

    /// Returns true if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == DiagnosticSeverity::Error)
    }

    /// Returns the number of errors.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    /// Returns an iterator over all diagnostics.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Returns an iterator over errors.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == DiagnosticSeverity::Error)
    }

    /// Returns an iterator over warnings.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == DiagnosticSeverity::Warning)
    }

    /// Returns true if there are no diagnostics.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Returns the number of diagnostics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }
}

/// Diagnostic codes reported by the schema checker.
pub mod codes {
    pub const MISSING_TARGET: &str = "S0001";
    pub const UNKNOWN_MODEL: &str = "S0002";
    pub const UNKNOWN_ENUM: &str = "S0003";
    pub const INVALID_CONSTRAINT: &str = "S0010";
    pub const INVALID_PATTERN: &str = "S0011";
    pub const EMPTY_ENUM: &str = "S0020";
    pub const EMPTY_MODEL: &str = "S0021";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_bag() {
        let mut bag = DiagnosticBag::new();
        bag.error(codes::UNKNOWN_MODEL, "unknown model", Location::field("user", "posts"));
        bag.warning(codes::EMPTY_ENUM, "empty enum", Location::item("Role"));

        assert!(bag.has_errors());
        assert_eq!(bag.error_count(), 1);
        assert_eq!(bag.warnings().count(), 1);
        assert_eq!(bag.len(), 2);
    }

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::error(codes::UNKNOWN_ENUM, "unknown enum `Role`")
            .with_message("declare it under `enums`")
            .at(Location::field("user", "role"));

        assert_eq!(
            diag.to_string(),
            "error[S0003] user.role: unknown enum `Role` (declare it under `enums`)"
        );
    }
}
