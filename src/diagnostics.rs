//! Diagnostic records and the sink they are reported to

use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    HeaderNotNeeded,
    HeaderNotFound,
    HeaderWithImplementation,
}

impl DiagnosticKind {
    /// Stable identifier, suitable for filtering or machine-readable output.
    pub fn id(self) -> &'static str {
        match self {
            DiagnosticKind::HeaderNotNeeded => "HeaderNotNeeded",
            DiagnosticKind::HeaderNotFound => "HeaderNotFound",
            DiagnosticKind::HeaderWithImplementation => "HeaderWithImplementation",
        }
    }
}

/// One finding, located at the including file and the line of its `#include`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub file: PathBuf,
    pub line: usize,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}:{}] (style): {}",
            self.file.display(),
            self.line,
            self.message
        )
    }
}

pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

pub fn header_not_needed(header: &str) -> String {
    format!("The included header '{header}' is not needed")
}

pub fn forward_declaration_needed(header: &str) -> String {
    format!(
        "{} (but forward declaration is needed)",
        header_not_needed(header)
    )
}

pub fn needed_indirectly(header: &str, nested: &str) -> String {
    format!(
        "Inconclusive results: The included header '{header}' is not needed. \
         However it is needed indirectly because it includes '{nested}'. \
         If it is included by intention use '--skip {header}' to remove false positives."
    )
}

pub fn header_not_found(header: &str) -> String {
    format!("Header not found '{header}'. Use -I or --skip to fix this message.")
}

pub const IMPLEMENTATION_IN_HEADER: &str = "Found implementation in header";
