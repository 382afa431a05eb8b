//! Symbol extraction
//!
//! Walks the depth-0 tokens of one header and collects what it declares:
//! type-like names (`class`/`struct` definitions) and ordinary names
//! (variables, functions, enumerators, typedefs, macros).

use crate::config::Heuristics;
use crate::parser::pattern::{matches, text_at};
use crate::parser::token::{is_name, FileId, Token, TokenStream};
use rustc_hash::FxHashSet;

/// Index of the file under test; its symbols are never extracted.
pub const MAIN_FILE: FileId = 0;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSymbols {
    pub classes: FxHashSet<String>,
    pub names: FxHashSet<String>,
}

impl FileSymbols {
    fn strip_keywords(&mut self, heuristics: &Heuristics) {
        self.classes.retain(|s| !heuristics.is_keyword(s));
        self.names.retain(|s| !heuristics.is_keyword(s));
    }
}

#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub symbols: FileSymbols,
    /// Names of `struct X ;` / `class X ;` forward declarations. Whoever
    /// includes this file is taken to need them.
    pub forward_declared: Vec<String>,
}

/// Extract the declarations of `file`.
pub fn extract(stream: &TokenStream, file: FileId, heuristics: &Heuristics) -> Extraction {
    let mut out = Extraction::default();
    if file == MAIN_FILE {
        return out;
    }

    let tokens = stream.file_tokens(file);
    let mut depth = 0usize;
    let mut i = 0;
    while i < tokens.len() {
        match tokens[i].text.as_str() {
            "{" => depth += 1,
            "}" => depth = depth.saturating_sub(1),
            _ => {}
        }
        if depth == 0 {
            i = out.declaration(&tokens, i);
        }
        i += 1;
    }

    out.symbols.strip_keywords(heuristics);
    out
}

impl Extraction {
    /// Record the declaration starting at `i`, if any. Returns the index of
    /// the last token it consumed.
    fn declaration(&mut self, tokens: &[&Token], i: usize) -> usize {
        let name = |offset: usize| text_at(tokens, i + offset).to_string();

        if matches(tokens, i, "class %var% {")
            || matches(tokens, i, "class %var% :")
            || matches(tokens, i, "struct %var% {")
        {
            self.symbols.classes.insert(name(1));
            return i;
        }

        // Scopes: step over the `{` so it does not open a level.
        if matches(tokens, i, "namespace %var% {") || matches(tokens, i, "extern %str% {") {
            return i + 2;
        }

        if matches(tokens, i, "struct %var% ;") || matches(tokens, i, "class %var% ;") {
            self.forward_declared.push(name(1));
            return i + 2;
        }

        if matches(tokens, i, "const %type% %var% [=[]") {
            self.symbols.names.insert(name(2));
            return i;
        }
        if matches(tokens, i, "const %type% * %var% [=[]") {
            self.symbols.names.insert(name(3));
            return i;
        }

        if matches(tokens, i, "%type% %var% [;[=]") {
            self.symbols.names.insert(name(1));
            return i;
        }
        if matches(tokens, i, "%type% * %var% [;[=]") {
            self.symbols.names.insert(name(2));
            return i;
        }

        if tokens[i].text == "enum" {
            return self.enumeration(tokens, i + 1);
        }

        if matches(tokens, i, "%type% %var% (") || matches(tokens, i, "%type% * %var% (") {
            let at = if text_at(tokens, i + 1) == "*" { 2 } else { 1 };
            self.symbols.names.insert(name(at));
            // parameters are not exported
            let mut j = i + at;
            while j + 1 < tokens.len() && tokens[j].text != ")" {
                j += 1;
            }
            return j;
        }

        if tokens[i].text == "typedef" {
            if text_at(tokens, i + 1) == "enum" {
                return i;
            }
            return self.typedef(tokens, i + 1);
        }

        if matches(tokens, i, "#define %var%") {
            self.symbols.names.insert(name(1));
            return i + 1;
        }

        i
    }

    /// Every identifier from `start` up to the closing `;`.
    fn enumeration(&mut self, tokens: &[&Token], start: usize) -> usize {
        let mut j = start;
        while j < tokens.len() && tokens[j].text != ";" {
            if tokens[j].is_name() {
                self.symbols.names.insert(tokens[j].text.clone());
            }
            j += 1;
        }
        j
    }

    /// Alias names of a typedef: identifiers directly before a `;` at the
    /// typedef's own nesting level.
    fn typedef(&mut self, tokens: &[&Token], start: usize) -> usize {
        let mut level = 0usize;
        let mut j = start;
        while j < tokens.len() {
            match tokens[j].text.as_str() {
                "(" | "{" => level += 1,
                ")" | "}" => level = level.saturating_sub(1),
                ";" if level == 0 => break,
                _ => {}
            }
            if level == 0 && matches(tokens, j, "%var% ;") {
                self.symbols.names.insert(tokens[j].text.clone());
            }
            j += 1;
        }
        j
    }
}

/// True if `text` can name something a header declares.
pub fn is_symbol(text: &str, heuristics: &Heuristics) -> bool {
    is_name(text) && !heuristics.is_keyword(text)
}
