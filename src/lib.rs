//! # Introduction
//!
//! checkheaders finds `#include` directives that a C/C++ source file does not
//! need. It tokenizes the file together with every header it pulls in,
//! collects what each header declares and what each file references, and
//! reports includes whose declarations are never used.
//!
//! ## Analysis pipeline
//!
//! ```text
//! Source → Tokenizer → TokenStream → Include graph → Symbols / Needs → Verdicts → Diagnostics
//! ```
//!
//! 1. [`parser`]: tokenizes the source, resolves and splices includes, and
//!    matches declaration shapes with a small pattern language.
//! 2. [`analysis`]: builds the include graph, extracts
//!    [`analysis::FileSymbols`] and [`analysis::FileNeeds`] per file, and
//!    classifies every include as an [`analysis::Necessity`].
//! 3. [`session`]: runs the pipeline for one top-level file and reports
//!    [`diagnostics::Diagnostic`]s to a [`diagnostics::DiagnosticSink`].
//! 4. [`source`] and [`config`]: where files come from, where headers are
//!    searched, and the tunable heuristics.
//!
//! ## Example
//!
//! ```
//! use checkheaders::config::{Heuristics, SearchConfig};
//! use checkheaders::diagnostics::Diagnostic;
//! use checkheaders::session::Session;
//! use checkheaders::source::MemorySource;
//! use std::path::Path;
//!
//! let source = MemorySource::new()
//!     .with_file("a.c", "#include \"a.h\"\nvoid f(){}\n")
//!     .with_file("a.h", "void hello(){}\n");
//! let config = SearchConfig::default();
//! let heuristics = Heuristics::default();
//! let mut found: Vec<Diagnostic> = Vec::new();
//!
//! Session::new(&source, &config, &heuristics)
//!     .check(Path::new("a.c"), &mut found)
//!     .unwrap();
//! assert_eq!(
//!     found[0].to_string(),
//!     "[a.c:1] (style): The included header 'a.h' is not needed"
//! );
//! ```
//!
//! ## Limits
//!
//! The tokenizer is a heuristic scanner. There is no macro expansion,
//! conditional compilation is ignored, and declarations are recognized by
//! shape only.

pub mod analysis;
pub mod config;
pub mod diagnostics;
pub mod errors;
pub mod logging;
pub mod parser;
pub mod session;
pub mod source;
