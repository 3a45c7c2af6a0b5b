//! Run Report
//!
//! Collects per-unit diagnostics during a run. Nothing recorded here is
//! fatal: fatal conditions surface as [`crate::GenError`] instead.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Diagnostic Codes
// =============================================================================

/// Diagnostic code for categorizing issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticCode {
    /// Component document could not be read or parsed
    SkippedDocument,
    /// Component object lacks a name or schema section, or failed to convert
    SkippedComponent,
    /// Second definition of an already loaded component
    DuplicateComponent,
    /// Field descriptor has an invalid shape and was emitted as `z.any()`
    DegradedField,
    /// Field type tag outside the known vocabulary
    UnknownFieldType,
    /// Bloks whitelist names a component that was never converted
    UnresolvedBloks,
    /// Interface definition failed to convert
    SkippedInterface,
    /// Generated code references a shared symbol no interface defines
    UndefinedSymbol,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SkippedDocument => "W001",
            Self::SkippedComponent => "W002",
            Self::DuplicateComponent => "W003",
            Self::DegradedField => "W004",
            Self::UnknownFieldType => "I001",
            Self::UnresolvedBloks => "I002",
            Self::SkippedInterface => "W005",
            Self::UndefinedSymbol => "W006",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::UnknownFieldType | Self::UnresolvedBloks => Severity::Info,
            Self::SkippedDocument
            | Self::SkippedComponent
            | Self::DuplicateComponent
            | Self::DegradedField
            | Self::SkippedInterface
            | Self::UndefinedSymbol => Severity::Warning,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Severity
// =============================================================================

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

// =============================================================================
// Diagnostic Item
// =============================================================================

/// A single diagnostic item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticItem {
    /// Component, interface or file the diagnostic is about
    pub subject: String,
    pub code: DiagnosticCode,
    pub message: String,
}

impl DiagnosticItem {
    pub fn new(subject: impl Into<String>, code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            code,
            message: message.into(),
        }
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }
}

impl fmt::Display for DiagnosticItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {} ({})",
            self.code,
            self.code.severity(),
            self.message,
            self.subject
        )
    }
}

// =============================================================================
// Report
// =============================================================================

/// Diagnostics collected over one run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunReport {
    items: Vec<DiagnosticItem>,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic and mirror it to the log
    pub fn record(&mut self, subject: impl Into<String>, code: DiagnosticCode, message: impl Into<String>) {
        let item = DiagnosticItem::new(subject, code, message);
        match item.severity() {
            Severity::Warning => tracing::warn!(code = %item.code, subject = %item.subject, "{}", item.message),
            Severity::Info => tracing::debug!(code = %item.code, subject = %item.subject, "{}", item.message),
        }
        self.items.push(item);
    }

    pub fn with_code(&self, code: DiagnosticCode) -> impl Iterator<Item = &DiagnosticItem> {
        self.items.iter().filter(move |i| i.code == code)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &DiagnosticItem> {
        self.items.iter().filter(|i| i.severity() == Severity::Warning)
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for item in &self.items {
            writeln!(f, "{}", item)?;
        }
        if !self.is_empty() {
            writeln!(f, "\n{} warning(s), {} note(s)", self.warning_count(), self.len() - self.warning_count())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_severity() {
        assert_eq!(DiagnosticCode::SkippedComponent.severity(), Severity::Warning);
        assert_eq!(DiagnosticCode::UnresolvedBloks.severity(), Severity::Info);
    }

    #[test]
    fn test_report_collection() {
        let mut report = RunReport::new();
        report.record("broken.json", DiagnosticCode::SkippedDocument, "expected value at line 1");
        report.record("page", DiagnosticCode::UnknownFieldType, "unknown type 'plugin'");

        assert_eq!(report.len(), 2);
        assert_eq!(report.warning_count(), 1);
        assert_eq!(report.with_code(DiagnosticCode::UnknownFieldType).count(), 1);

        let rendered = report.to_string();
        assert!(rendered.contains("[W001] warning: expected value at line 1 (broken.json)"));
    }
}
