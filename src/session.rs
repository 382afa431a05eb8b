//! Checking one top-level file
//!
//! A [`Session`] ties the collaborators together and runs the pipeline:
//! tokenize, build the include graph, extract symbols, compute needs,
//! classify each include and report. Nothing is kept between calls.

use crate::analysis::needs::header_implementations;
use crate::analysis::{Analysis, Verdict};
use crate::config::{Heuristics, SearchConfig};
use crate::diagnostics::{self, Diagnostic, DiagnosticKind, DiagnosticSink};
use crate::errors::CheckError;
use crate::parser::lexer::Tokenizer;
use crate::parser::token::{IncludeTarget, TokenStream};
use crate::source::FileSource;
use std::path::Path;
use tracing::{debug, trace};

pub struct Session<'a> {
    source: &'a dyn FileSource,
    config: &'a SearchConfig,
    heuristics: &'a Heuristics,
}

impl<'a> Session<'a> {
    pub fn new(
        source: &'a dyn FileSource,
        config: &'a SearchConfig,
        heuristics: &'a Heuristics,
    ) -> Self {
        Self {
            source,
            config,
            heuristics,
        }
    }

    /// Tokenize `path` and everything it includes.
    pub fn tokenize(&self, path: &Path) -> Result<TokenStream, CheckError> {
        Tokenizer::new(self.source, self.config, self.heuristics)
            .tokenize(path)
            .ok_or_else(|| CheckError::MainFileNotFound {
                path: path.to_path_buf(),
            })
    }

    /// Check every include reachable from `path`, reporting findings to
    /// `sink`. Returns all verdicts, including the needed ones.
    pub fn check(
        &self,
        path: &Path,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<Vec<Verdict>, CheckError> {
        let stream = self.tokenize(path)?;
        debug!(
            "{}: {} tokens in {} files",
            path.display(),
            stream.tokens.len(),
            stream.files.len()
        );
        for token in &stream.tokens {
            trace!(
                "{}:{} {}",
                stream.files.name(token.file),
                token.line,
                token.text
            );
        }

        for include in &stream.includes {
            if include.target == IncludeTarget::NotFound {
                sink.report(Diagnostic {
                    file: stream.files.path(include.file).to_path_buf(),
                    line: include.line,
                    kind: DiagnosticKind::HeaderNotFound,
                    message: diagnostics::header_not_found(&include.name),
                });
            }
        }

        let verdicts = Analysis::new(&stream, self.heuristics).verdicts();
        for verdict in &verdicts {
            if let Some(message) = verdict.message(&stream.files) {
                sink.report(Diagnostic {
                    file: stream.files.path(verdict.includer).to_path_buf(),
                    line: verdict.line,
                    kind: DiagnosticKind::HeaderNotNeeded,
                    message,
                });
            }
        }

        if self.heuristics.check_implementation_in_headers {
            for token in header_implementations(&stream) {
                sink.report(Diagnostic {
                    file: stream.files.path(token.file).to_path_buf(),
                    line: token.line,
                    kind: DiagnosticKind::HeaderWithImplementation,
                    message: diagnostics::IMPLEMENTATION_IN_HEADER.to_string(),
                });
            }
        }

        Ok(verdicts)
    }
}
