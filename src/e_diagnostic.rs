// src/e_diagnostic.rs
use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Severity {
    #[default]
    Error,
    Warning,
}

impl Severity {
    /// Maps a compiler level string. Anything that is not a warning is
    /// reported as an error.
    pub fn from_level(level: &str) -> Self {
        match level {
            "warning" => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// The single-character quickfix type.
    pub fn as_type(&self) -> &'static str {
        match self {
            Severity::Error => "E",
            Severity::Warning => "W",
        }
    }
}

/// One normalized error or warning.
///
/// Diagnostics are assembled with [`DiagnosticBuilder`] and are read-only once
/// built.
#[derive(Clone, PartialEq, Eq)]
pub struct Diagnostic {
    text: String,
    filename: String,
    line: usize,
    column: usize,
    severity: Severity,
}

impl Diagnostic {
    pub fn builder() -> DiagnosticBuilder {
        DiagnosticBuilder::new()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// The identity used by [`dedupe`]. Column and severity are deliberately
    /// left out.
    pub fn key(&self) -> (&str, usize, &str) {
        (&self.filename, self.line, &self.text)
    }

    pub fn render(&self) -> QuickfixEntry {
        QuickfixEntry {
            filename: self.filename.clone(),
            lnum: self.line,
            text: self.text.clone(),
            kind: self.severity.as_type().to_string(),
        }
    }
}

impl fmt::Debug for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{} [{}] {}",
            self.filename,
            self.line,
            self.column,
            self.severity.as_type(),
            self.text
        )
    }
}

/// A builder that assembles a [`Diagnostic`] field by field.
#[derive(Debug, Default, Clone)]
pub struct DiagnosticBuilder {
    text: Option<String>,
    filename: String,
    line: usize,
    column: usize,
    severity: Severity,
}

impl DiagnosticBuilder {
    /// Creates a new builder: empty text and filename, unknown position, error.
    pub fn new() -> Self {
        DiagnosticBuilder::default()
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Sets the text from an optional source. `None` leaves the text empty.
    pub fn maybe_text(mut self, text: Option<String>) -> Self {
        self.text = text;
        self
    }

    pub fn filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    pub fn line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }

    pub fn column(mut self, column: usize) -> Self {
        self.column = column;
        self
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Freezes the builder into a diagnostic.
    pub fn build(self) -> Diagnostic {
        Diagnostic {
            text: self.text.unwrap_or_default(),
            filename: self.filename,
            line: self.line,
            column: self.column,
            severity: self.severity,
        }
    }
}

/// Errors and warnings in the order they were discovered.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DiagnosticSet {
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

impl DiagnosticSet {
    pub fn new() -> Self {
        DiagnosticSet::default()
    }

    /// Files the diagnostic under errors or warnings by its severity.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity() {
            Severity::Error => self.errors.push(diagnostic),
            Severity::Warning => self.warnings.push(diagnostic),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }

    /// Deduplicates both partitions independently.
    pub fn deduped(self) -> Self {
        DiagnosticSet {
            errors: dedupe(self.errors),
            warnings: dedupe(self.warnings),
        }
    }
}

/// One entry of the editor's quickfix list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuickfixEntry {
    pub filename: String,
    pub lnum: usize,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Collapses diagnostics sharing `(filename, line, text)`.
///
/// Each key keeps the position of its first occurrence and the content of its
/// last one, so the surviving column and severity are the latest seen.
///
/// ```
/// use cargo_qf::{dedupe, Diagnostic};
///
/// let a = Diagnostic::builder().filename("f.rs").line(3).column(1).text("oops").build();
/// let b = Diagnostic::builder().filename("f.rs").line(3).column(9).text("oops").build();
/// let out = dedupe(vec![a, b]);
/// assert_eq!(out.len(), 1);
/// assert_eq!(out[0].column(), 9);
/// ```
pub fn dedupe(diagnostics: Vec<Diagnostic>) -> Vec<Diagnostic> {
    let mut slots: HashMap<(String, usize, String), usize> = HashMap::new();
    let mut out: Vec<Diagnostic> = Vec::with_capacity(diagnostics.len());
    for diagnostic in diagnostics {
        let (filename, line, text) = diagnostic.key();
        let key = (filename.to_string(), line, text.to_string());
        match slots.get(&key) {
            Some(&index) => out[index] = diagnostic,
            None => {
                slots.insert(key, out.len());
                out.push(diagnostic);
            }
        }
    }
    out
}
