//! C/C++ source tokenizer
//!
//! This module turns a source file and every header it includes into one
//! file-tagged token stream:
//! - [`token`]: Token, file table and include directive definitions
//! - [`lexer`]: Tokenization (source text → tokens) with include expansion
//! - [`pattern`]: Matching declaration shapes against token sequences
//!
//! # What the lexer understands
//!
//! This is a heuristic scanner, not a preprocessor:
//! - Identifiers, numbers, string and character literals, punctuation
//! - `#include "..."` and `#include <...>` are resolved and spliced in
//! - Other directives only contribute their directive word (`#define`, `#ifdef`, ...)
//! - No macro expansion and no conditional compilation

pub mod lexer;
pub mod pattern;
pub mod token;
