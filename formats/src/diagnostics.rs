//! Non-fatal findings collected while decoding
//!
//! Decoders never log warnings themselves; they return them next to the
//! decoded value so the caller decides where they go.

use std::fmt;

/// How serious a diagnostic is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
}

/// A single finding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.severity {
            Severity::Info => write!(f, "info: {}", self.message),
            Severity::Warning => write!(f, "warning: {}", self.message),
        }
    }
}

/// Ordered list of diagnostics for one decode or build step
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.entries.push(Diagnostic {
            severity: Severity::Warning,
            message: message.into(),
        });
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.entries.push(Diagnostic {
            severity: Severity::Info,
            message: message.into(),
        });
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    pub fn has_warnings(&self) -> bool {
        self.warnings().next().is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Route every entry through `tracing`, tagged with the asset name
    pub fn emit(&self, asset: &str) {
        for entry in &self.entries {
            match entry.severity {
                Severity::Warning => tracing::warn!("{}: {}", asset, entry.message),
                Severity::Info => tracing::info!("{}: {}", asset, entry.message),
            }
        }
    }
}

/// A decoded value plus the diagnostics produced while decoding it
#[derive(Debug, Clone)]
pub struct Decoded<T> {
    pub value: T,
    pub diagnostics: Diagnostics,
}

impl<T> Decoded<T> {
    pub fn new(value: T, diagnostics: Diagnostics) -> Self {
        Self { value, diagnostics }
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Decoded<U> {
        Decoded {
            value: f(self.value),
            diagnostics: self.diagnostics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warnings_filter() {
        let mut diags = Diagnostics::new();
        diags.info("seeked to string block");
        assert!(!diags.has_warnings());

        diags.warn("index 9 exceeds vertex count 3");
        assert!(diags.has_warnings());
        assert_eq!(diags.len(), 2);
        assert_eq!(diags.warnings().count(), 1);
    }

    #[test]
    fn test_display() {
        let mut diags = Diagnostics::new();
        diags.warn("dropped bone");
        let first = diags.iter().next().unwrap();
        assert_eq!(first.to_string(), "warning: dropped bone");
    }

    #[test]
    fn test_decoded_map_keeps_diagnostics() {
        let mut diags = Diagnostics::new();
        diags.warn("odd");
        let decoded = Decoded::new(2u32, diags).map(|v| v * 2);
        assert_eq!(decoded.value, 4);
        assert_eq!(decoded.diagnostics.len(), 1);
    }
}
