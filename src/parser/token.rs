//! Token model shared by every analysis stage
//!
//! - [`Token`]: one lexical unit tagged with its originating file and line
//! - [`FileTable`]: bijection between file indices and the paths they were read from
//! - [`IncludeDirective`]: one `#include` edge discovered while lexing
//! - [`TokenStream`]: the finished, file-tagged token arena for one top-level file

use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};

/// Index of a file in the [`FileTable`]. The main file is always `0`.
pub type FileId = usize;

/// Marker token emitted in front of the path of a `#include "..."` directive.
pub const INCLUDE_MARKER: &str = "#include";

/// Marker token emitted in front of the path of a `#include <...>` directive.
pub const SYSTEM_INCLUDE_MARKER: &str = "#include<>";

/// Replacement text for the path token of an include that could not be resolved.
pub const NOT_FOUND: &str = "not found";

/// A single lexical unit: identifier, literal, punctuation or directive word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub file: FileId,
    pub line: usize,
}

impl Token {
    pub fn new(text: impl Into<String>, file: FileId, line: usize) -> Self {
        Self {
            text: text.into(),
            file,
            line,
        }
    }

    /// True when the text starts like an identifier (letter or underscore).
    pub fn is_name(&self) -> bool {
        is_name(&self.text)
    }

    /// True when the text starts with a decimal digit.
    pub fn is_number(&self) -> bool {
        self.text.starts_with(|c: char| c.is_ascii_digit())
    }

    /// True when this token is a single character contained in `chars`.
    pub fn is_one_of(&self, chars: &str) -> bool {
        let mut it = self.text.chars();
        match (it.next(), it.next()) {
            (Some(c), None) => chars.contains(c),
            _ => false,
        }
    }

    pub fn is_include_marker(&self) -> bool {
        self.text == INCLUDE_MARKER || self.text == SYSTEM_INCLUDE_MARKER
    }
}

impl AsRef<Token> for Token {
    fn as_ref(&self) -> &Token {
        self
    }
}

/// Identifier test used by the pattern matcher and the analyzers.
pub fn is_name(text: &str) -> bool {
    text.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_')
}

/// A file that has been read and tokenized.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Path the file was opened from; used for diagnostic locations.
    pub path: PathBuf,
    /// Text used to reach the file: the `#include` argument, or the
    /// command-line path for the main file.
    pub name: String,
    identity: PathBuf,
}

/// Every file tokenized for one top-level file, in first-encounter order.
///
/// A file identity is present at most once, which is what stops include
/// cycles and duplicate includes from being tokenized again.
#[derive(Debug, Clone, Default)]
pub struct FileTable {
    files: Vec<SourceFile>,
    by_identity: FxHashMap<PathBuf, FileId>,
}

impl FileTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a file by identity (see [`crate::source::FileSource::identity`]).
    pub fn lookup(&self, identity: &Path) -> Option<FileId> {
        self.by_identity.get(identity).copied()
    }

    /// Register a file, returning the existing index if the identity is known.
    pub fn insert(&mut self, path: PathBuf, name: String, identity: PathBuf) -> FileId {
        if let Some(id) = self.lookup(&identity) {
            return id;
        }
        let id = self.files.len();
        self.by_identity.insert(identity.clone(), id);
        self.files.push(SourceFile {
            path,
            name,
            identity,
        });
        id
    }

    pub fn get(&self, id: FileId) -> Option<&SourceFile> {
        self.files.get(id)
    }

    /// Path of a file known to be in the table.
    pub fn path(&self, id: FileId) -> &Path {
        &self.files[id].path
    }

    /// Include name of a file known to be in the table.
    pub fn name(&self, id: FileId) -> &str {
        &self.files[id].name
    }

    pub fn identity(&self, id: FileId) -> &Path {
        &self.files[id].identity
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FileId, &SourceFile)> {
        self.files.iter().enumerate()
    }
}

/// Where an `#include` led.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncludeTarget {
    Resolved(FileId),
    /// Not readable on any search path.
    NotFound,
    /// A precompiled-header convention file: never read, always needed.
    Precompiled,
}

/// One `#include` edge as written in the including file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeDirective {
    /// File containing the directive.
    pub file: FileId,
    /// Position of the marker token in [`TokenStream::tokens`].
    pub position: usize,
    pub line: usize,
    /// Literal text between the delimiters.
    pub name: String,
    /// `<...>` rather than `"..."`.
    pub system: bool,
    pub target: IncludeTarget,
}

/// The output of the lexer: one token arena plus the tables built alongside it.
#[derive(Debug, Clone, Default)]
pub struct TokenStream {
    pub tokens: Vec<Token>,
    pub files: FileTable,
    pub includes: Vec<IncludeDirective>,
}

// Adjacent single tokens merged into one operator, left to right.
const OPERATOR_PAIRS: &[(&str, &str)] = &[
    ("<", "<"),
    (">", ">"),
    ("&", "&"),
    ("|", "|"),
    ("+", "="),
    ("-", "="),
    ("*", "="),
    ("/", "="),
    ("&", "="),
    ("|", "="),
    ("=", "="),
    ("!", "="),
    ("<", "="),
    (">", "="),
    (":", ":"),
    ("-", ">"),
    ("private", ":"),
    ("protected", ":"),
    ("public", ":"),
];

fn is_operator_pair(first: &str, second: &str) -> bool {
    OPERATOR_PAIRS
        .iter()
        .any(|&(a, b)| a == first && b == second)
}

impl TokenStream {
    /// Tokens of one file, in source order, without `#include` marker and
    /// path tokens.
    pub fn file_tokens(&self, file: FileId) -> Vec<&Token> {
        let mut view = Vec::new();
        let mut skip_path = false;
        for token in self.tokens.iter().filter(|t| t.file == file) {
            if skip_path {
                skip_path = false;
                continue;
            }
            if token.is_include_marker() {
                skip_path = true;
                continue;
            }
            view.push(token);
        }
        view
    }

    /// Merge adjacent tokens that form a multi-character operator.
    ///
    /// Merging never crosses a file boundary or touches an include path
    /// token. Directive positions are remapped to the merged arena.
    pub(crate) fn combine_operators(&mut self) {
        let mut tokens = std::mem::take(&mut self.tokens).into_iter().peekable();
        let mut combined: Vec<Token> = Vec::with_capacity(tokens.len());
        let mut remap = Vec::with_capacity(tokens.len());
        let mut after_marker = false;

        while let Some(mut token) = tokens.next() {
            remap.push(combined.len());
            let merge = !after_marker
                && tokens.peek().is_some_and(|next| {
                    next.file == token.file && is_operator_pair(&token.text, &next.text)
                });
            after_marker = token.is_include_marker();
            if merge {
                if let Some(next) = tokens.next() {
                    remap.push(combined.len());
                    token.text.push_str(&next.text);
                }
            }
            combined.push(token);
        }

        for include in &mut self.includes {
            include.position = remap[include.position];
        }
        self.tokens = combined;
    }

    /// Rewrite every `->` to `.` so member access has a single spelling.
    pub(crate) fn normalize_member_access(&mut self) {
        for token in &mut self.tokens {
            if token.text == "->" {
                token.text = ".".to_string();
            }
        }
    }
}
