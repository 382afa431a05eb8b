//! Lexer (tokenizer) for C/C++ source code
//!
//! [`Lexer`] scans a single file into lexemes. [`Tokenizer`] drives one lexer
//! per file, resolves `#include` targets and splices each header's tokens into
//! the shared [`TokenStream`] right after the directive that pulled it in.
//!
//! The lexer is deliberately shallow: identifiers, numbers and unknown
//! characters are accumulated until whitespace or punctuation, every
//! punctuation character is its own token (multi-character operators are
//! merged afterwards), and preprocessor lines other than `#include` only
//! contribute their directive word.

use super::token::{
    FileId, FileTable, IncludeDirective, IncludeTarget, Token, TokenStream, INCLUDE_MARKER,
    NOT_FOUND, SYSTEM_INCLUDE_MARKER,
};
use crate::config::{Heuristics, SearchConfig};
use crate::source::FileSource;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Characters that always form a token of their own.
const PUNCTUATION: &str = "+-*/%&|^?!=<>[](){};:,.";

/// Raw output of a single-file scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lexeme {
    Token { text: String, line: usize },
    Include { name: String, system: bool, line: usize },
}

/// Scanner for the text of one file.
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    current: String,
    current_line: usize,
    pending: VecDeque<Lexeme>,
    /// Last emitted token closed a statement (`;`, `{`, `}`) or nothing was emitted yet.
    at_statement_start: bool,
    deleted_comments: bool,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            current: String::new(),
            current_line: 1,
            pending: VecDeque::new(),
            at_statement_start: true,
            deleted_comments: true,
        }
    }

    /// Enable or disable the `// X is deleted` comment heuristic.
    pub fn with_deleted_comments(mut self, enabled: bool) -> Self {
        self.deleted_comments = enabled;
        self
    }

    /// Scan the whole input. Include lexemes are returned, not followed.
    pub fn lex_all(mut self) -> Vec<Lexeme> {
        let mut out = Vec::new();
        while let Some(lexeme) = self.next_lexeme() {
            out.push(lexeme);
        }
        out
    }

    /// Produce the next lexeme, or `None` at end of input.
    pub fn next_lexeme(&mut self) -> Option<Lexeme> {
        loop {
            if let Some(lexeme) = self.pending.pop_front() {
                return Some(lexeme);
            }

            let Some(ch) = self.advance() else {
                self.flush();
                return self.pending.pop_front();
            };

            if !ch.is_ascii() {
                continue;
            }

            match ch {
                '#' if self.current.is_empty() => self.directive(),
                '/' => {
                    self.flush();
                    self.slash();
                }
                '\'' => {
                    self.flush();
                    self.char_literal();
                }
                '"' => {
                    self.flush();
                    self.string_literal();
                }
                _ if PUNCTUATION.contains(ch) => {
                    self.flush();
                    let line = self.line;
                    self.emit(ch.to_string(), line);
                }
                _ if ch.is_ascii_whitespace() || ch.is_ascii_control() => self.flush(),
                _ => {
                    if self.current.is_empty() {
                        self.current_line = self.line;
                    }
                    self.current.push(ch);
                }
            }
        }
    }

    /// `#` has been consumed. Emits the directive word, or an include lexeme.
    fn directive(&mut self) {
        let line = self.line;
        while matches!(self.peek(), Some(' ') | Some('\t')) {
            self.advance();
        }
        let mut word = String::from("#");
        while let Some(ch) = self.peek().filter(char::is_ascii_alphabetic) {
            word.push(ch);
            self.advance();
        }

        if word == INCLUDE_MARKER {
            self.include_line(line);
        } else {
            self.emit(word, line);
        }
    }

    /// Rest of an `#include` line, up to but excluding the newline.
    fn include_line(&mut self, line: usize) {
        let mut rest = String::new();
        while let Some(ch) = self.peek().filter(|&c| c != '\n') {
            rest.push(ch);
            self.advance();
        }
        if let Some(comment) = rest.find("//") {
            rest.truncate(comment);
        }

        let Some(open) = rest.find(['<', '"']) else {
            return;
        };
        let system = rest[open..].starts_with('<');
        let after = &rest[open + 1..];
        let Some(close) = after.find(['>', '"']) else {
            return;
        };

        self.pending.push_back(Lexeme::Include {
            name: after[..close].to_string(),
            system,
            line,
        });
        self.at_statement_start = true;
    }

    /// `/` has been consumed: line comment, block comment or division.
    fn slash(&mut self) {
        match self.peek() {
            Some('/') => {
                self.advance();
                let mut comment = String::new();
                while let Some(ch) = self.peek().filter(|&c| c != '\n') {
                    comment.push(ch);
                    self.advance();
                }
                if self.deleted_comments && self.at_statement_start {
                    self.deleted_comment(&comment);
                }
            }
            Some('*') => {
                self.advance();
                let mut prev = '\0';
                while let Some(ch) = self.advance() {
                    if prev == '*' && ch == '/' {
                        break;
                    }
                    prev = ch;
                }
            }
            _ => {
                let line = self.line;
                self.emit("/".to_string(), line);
            }
        }
    }

    /// `// fred is deleted` becomes `delete fred ;`.
    fn deleted_comment(&mut self, comment: &str) {
        let mut words = comment.split_whitespace();
        let Some(first) = words.next() else {
            return;
        };
        if words.any(|w| w == "deleted") {
            let line = self.line;
            let first = first.to_string();
            self.emit("delete".to_string(), line);
            self.emit(first, line);
            self.emit(";".to_string(), line);
        }
    }

    /// Opening quote has been consumed. An unterminated literal at end of
    /// input is dropped; one cut by a newline is kept as-is.
    fn char_literal(&mut self) {
        let line = self.line;
        let mut text = String::from('\'');
        loop {
            match self.peek() {
                None => return,
                Some('\n') => break,
                Some('\\') => {
                    text.push('\\');
                    self.advance();
                    match self.advance() {
                        Some(escaped) => text.push(escaped),
                        None => return,
                    }
                }
                Some(ch) => {
                    text.push(ch);
                    self.advance();
                    if ch == '\'' {
                        break;
                    }
                }
            }
        }
        self.emit(text, line);
    }

    /// Opening quote has been consumed. Escaped quotes do not close the
    /// literal; an unterminated literal is dropped.
    fn string_literal(&mut self) {
        let line = self.line;
        let mut text = String::from('"');
        let mut escaped = false;
        loop {
            let Some(ch) = self.advance() else {
                return;
            };
            text.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                break;
            }
        }
        self.emit(text, line);
    }

    /// Emit the accumulated identifier/number, if any.
    fn flush(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.current);
        let line = self.current_line;
        self.emit(normalize_number(text), line);
    }

    fn emit(&mut self, text: String, line: usize) {
        self.at_statement_start = matches!(text.as_str(), ";" | "{" | "}");
        self.pending.push_back(Lexeme::Token { text, line });
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = *self.input.get(self.position)?;
        self.position += 1;
        if ch == '\n' {
            self.line += 1;
        }
        Some(ch)
    }
}

/// Hexadecimal literals are rewritten in decimal; the suffix is dropped.
fn normalize_number(text: String) -> String {
    let Some(digits) = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
    else {
        return text;
    };
    let value = digits
        .chars()
        .map_while(|c| c.to_digit(16))
        .fold(0u64, |acc, d| acc.saturating_mul(16).saturating_add(u64::from(d)));
    value.to_string()
}

/// Builds the [`TokenStream`] for one top-level file.
pub struct Tokenizer<'a> {
    source: &'a dyn FileSource,
    config: &'a SearchConfig,
    heuristics: &'a Heuristics,
    tokens: Vec<Token>,
    files: FileTable,
    includes: Vec<IncludeDirective>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(
        source: &'a dyn FileSource,
        config: &'a SearchConfig,
        heuristics: &'a Heuristics,
    ) -> Self {
        Self {
            source,
            config,
            heuristics,
            tokens: Vec::new(),
            files: FileTable::new(),
            includes: Vec::new(),
        }
    }

    /// Tokenize `path` and everything it includes.
    ///
    /// Returns `None` when `path` itself cannot be read.
    pub fn tokenize(mut self, path: &Path) -> Option<TokenStream> {
        let text = self.source.read(path)?;
        let identity = self.source.identity(path);
        let main = self
            .files
            .insert(path.to_path_buf(), path.display().to_string(), identity);
        self.tokenize_file(main, &text);

        let mut stream = TokenStream {
            tokens: self.tokens,
            files: self.files,
            includes: self.includes,
        };
        stream.combine_operators();
        stream.normalize_member_access();
        Some(stream)
    }

    fn tokenize_file(&mut self, file: FileId, text: &str) {
        debug!("tokenizing {}", self.files.path(file).display());
        let mut lexer = Lexer::new(text).with_deleted_comments(self.heuristics.deleted_comments);
        while let Some(lexeme) = lexer.next_lexeme() {
            match lexeme {
                Lexeme::Token { text, line } => self.tokens.push(Token::new(text, file, line)),
                Lexeme::Include { name, system, line } => self.include(file, name, system, line),
            }
        }
    }

    fn include(&mut self, file: FileId, name: String, system: bool, line: usize) {
        if self.config.skip.contains(&name) {
            trace!("skipping include '{}'", name);
            return;
        }

        let position = self.tokens.len();
        let marker = if system {
            SYSTEM_INCLUDE_MARKER
        } else {
            INCLUDE_MARKER
        };
        self.tokens.push(Token::new(marker, file, line));
        self.tokens.push(Token::new(name.clone(), file, line));

        let target = self.resolve(file, &name);
        if target == IncludeTarget::NotFound {
            debug!(
                "header not found '{}' (included from {}:{})",
                name,
                self.files.path(file).display(),
                line
            );
            self.tokens[position + 1].text = NOT_FOUND.to_string();
        }

        self.includes.push(IncludeDirective {
            file,
            position,
            line,
            name,
            system,
            target,
        });
    }

    /// Try the includer's directory, then each search path. A file already in
    /// the table is linked, not tokenized again.
    fn resolve(&mut self, includer: FileId, name: &str) -> IncludeTarget {
        if self.heuristics.is_precompiled_header(name) {
            return IncludeTarget::Precompiled;
        }

        let base = self
            .files
            .path(includer)
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let candidates: Vec<PathBuf> = std::iter::once(base.join(name))
            .chain(self.config.include_paths.iter().map(|dir| dir.join(name)))
            .collect();

        for candidate in candidates {
            let identity = self.source.identity(&candidate);
            if let Some(existing) = self.files.lookup(&identity) {
                return IncludeTarget::Resolved(existing);
            }
            if let Some(text) = self.source.read(&candidate) {
                let header = self.files.insert(candidate, name.to_string(), identity);
                self.tokenize_file(header, &text);
                return IncludeTarget::Resolved(header);
            }
        }
        IncludeTarget::NotFound
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;

    fn lex(src: &str) -> Vec<String> {
        Lexer::new(src)
            .lex_all()
            .into_iter()
            .map(|l| match l {
                Lexeme::Token { text, .. } => text,
                Lexeme::Include { name, system, .. } => {
                    format!("{}{}", if system { "<>" } else { "\"\"" }, name)
                }
            })
            .collect()
    }

    fn tokenize(source: &MemorySource, main: &str) -> TokenStream {
        let config = SearchConfig::default();
        let heuristics = Heuristics::default();
        Tokenizer::new(source, &config, &heuristics)
            .tokenize(Path::new(main))
            .expect("main file should be readable")
    }

    fn texts(stream: &TokenStream) -> Vec<&str> {
        stream.tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_simple_tokens() {
        assert_eq!(
            lex("int main() { return 0; }"),
            vec!["int", "main", "(", ")", "{", "return", "0", ";", "}"]
        );
    }

    #[test]
    fn test_punctuation_is_split() {
        assert_eq!(lex("a+=b"), vec!["a", "+", "=", "b"]);
        assert_eq!(lex("~Fred()"), vec!["~Fred", "(", ")"]);
    }

    #[test]
    fn test_comments() {
        assert_eq!(
            lex("int x; // comment\nint y; /* block\ncomment */ int z;"),
            vec!["int", "x", ";", "int", "y", ";", "int", "z", ";"]
        );
    }

    #[test]
    fn test_line_numbers() {
        let lexemes = Lexer::new("a\n/* one\ntwo */ b\n\"s\" c").lex_all();
        let lines: Vec<usize> = lexemes
            .iter()
            .map(|l| match l {
                Lexeme::Token { line, .. } | Lexeme::Include { line, .. } => *line,
            })
            .collect();
        assert_eq!(lines, vec![1, 3, 4, 4]);
    }

    #[test]
    fn test_deleted_comment() {
        assert_eq!(
            lex("x = 0;\n// fred is deleted here\n"),
            vec!["x", "=", "0", ";", "delete", "fred", ";"]
        );
    }

    #[test]
    fn test_deleted_comment_needs_statement_boundary() {
        assert_eq!(lex("f(a, // a is deleted\n b);"), vec!["f", "(", "a", ",", "b", ")", ";"]);
    }

    #[test]
    fn test_deleted_comment_can_be_disabled() {
        let lexemes = Lexer::new("// fred is deleted\n")
            .with_deleted_comments(false)
            .lex_all();
        assert!(lexemes.is_empty());
    }

    #[test]
    fn test_char_literals() {
        assert_eq!(lex("c = 'x';"), vec!["c", "=", "'x'", ";"]);
        assert_eq!(lex(r"c = '\'';"), vec!["c", "=", r"'\''", ";"]);
        assert_eq!(lex(r"c = '\x41';"), vec!["c", "=", r"'\x41'", ";"]);
    }

    #[test]
    fn test_string_literals() {
        assert_eq!(
            lex(r#"s = "a \"quoted\" // not a comment";"#),
            vec!["s", "=", r#""a \"quoted\" // not a comment""#, ";"]
        );
    }

    #[test]
    fn test_unterminated_literals_stop_cleanly() {
        assert_eq!(lex("x \"never closed"), vec!["x"]);
        assert_eq!(lex("y /* never closed"), vec!["y"]);
        assert_eq!(lex("z '"), vec!["z"]);
    }

    #[test]
    fn test_hex_numbers_are_decimal() {
        assert_eq!(lex("a = 0x1F + 0X10UL;"), vec!["a", "=", "31", "+", "16", ";"]);
    }

    #[test]
    fn test_preprocessor_directives() {
        assert_eq!(
            lex("#define XY 0x033\n#  ifdef AAA\n#endif\n"),
            vec!["#define", "XY", "51", "#ifdef", "AAA", "#endif"]
        );
    }

    #[test]
    fn test_include_lines() {
        assert_eq!(
            lex("#include \"a.h\" // why\n#include <b.h>\n#include MACRO\nint x;"),
            vec!["\"\"a.h", "<>b.h", "int", "x", ";"]
        );
    }

    #[test]
    fn test_tokenize_splices_headers() {
        let source = MemorySource::new()
            .with_file("main.c", "#include \"a.h\"\nint y;\n")
            .with_file("a.h", "int x;\n");
        let stream = tokenize(&source, "main.c");

        assert_eq!(
            texts(&stream),
            vec![INCLUDE_MARKER, "a.h", "int", "x", ";", "int", "y", ";"]
        );
        assert_eq!(stream.files.len(), 2);
        assert_eq!(stream.tokens[2].file, 1);
        assert_eq!(stream.tokens[5].file, 0);
        assert_eq!(stream.tokens[5].line, 2);
        assert_eq!(stream.includes[0].target, IncludeTarget::Resolved(1));
    }

    #[test]
    fn test_tokenize_once_per_file() {
        let source = MemorySource::new()
            .with_file("main.c", "#include \"a.h\"\n#include \"b.h\"\n")
            .with_file("a.h", "#include \"b.h\"\n")
            .with_file("b.h", "#include \"a.h\"\nint b;\n");
        let stream = tokenize(&source, "main.c");

        assert_eq!(stream.files.len(), 3);
        assert_eq!(stream.tokens.iter().filter(|t| t.text == "b").count(), 1);
        assert_eq!(stream.includes.len(), 4);
    }

    #[test]
    fn test_tokenize_relative_to_includer() {
        let source = MemorySource::new()
            .with_file("src/main.c", "#include \"inc/a.h\"\n")
            .with_file("src/inc/a.h", "#include \"b.h\"\n")
            .with_file("src/inc/b.h", "int b;\n");
        let stream = tokenize(&source, "src/main.c");

        assert_eq!(stream.files.len(), 3);
        assert_eq!(stream.files.path(2), Path::new("src/inc/b.h"));
        assert_eq!(stream.files.name(2), "b.h");
    }

    #[test]
    fn test_tokenize_search_paths() {
        let source = MemorySource::new()
            .with_file("main.c", "#include <lib.h>\n")
            .with_file("/usr/include/lib.h", "void lib();\n");
        let config = SearchConfig::default().with_include_path("/usr/include");
        let heuristics = Heuristics::default();
        let stream = Tokenizer::new(&source, &config, &heuristics)
            .tokenize(Path::new("main.c"))
            .expect("main file should be readable");

        assert_eq!(stream.includes[0].target, IncludeTarget::Resolved(1));
        assert_eq!(stream.tokens[0].text, SYSTEM_INCLUDE_MARKER);
    }

    #[test]
    fn test_tokenize_not_found() {
        let source = MemorySource::new().with_file("main.c", "#include \"missing.h\"\nint x;\n");
        let stream = tokenize(&source, "main.c");

        assert_eq!(texts(&stream)[..2], [INCLUDE_MARKER, NOT_FOUND]);
        assert_eq!(stream.includes[0].target, IncludeTarget::NotFound);
        assert_eq!(stream.includes[0].name, "missing.h");
    }

    #[test]
    fn test_tokenize_skip_set() {
        let source = MemorySource::new()
            .with_file("main.c", "#include \"a.h\"\nint x;\n")
            .with_file("a.h", "int a;\n");
        let config = SearchConfig::default().with_skip("a.h");
        let heuristics = Heuristics::default();
        let stream = Tokenizer::new(&source, &config, &heuristics)
            .tokenize(Path::new("main.c"))
            .expect("main file should be readable");

        assert_eq!(texts(&stream), vec!["int", "x", ";"]);
        assert!(stream.includes.is_empty());
    }

    #[test]
    fn test_tokenize_precompiled_header() {
        let source = MemorySource::new()
            .with_file("main.c", "#include \"StdAfx.h\"\n")
            .with_file("StdAfx.h", "#include <stdio.h>\n");
        let stream = tokenize(&source, "main.c");

        assert_eq!(stream.files.len(), 1);
        assert_eq!(stream.includes[0].target, IncludeTarget::Precompiled);
    }

    #[test]
    fn test_tokenize_missing_main_file() {
        let source = MemorySource::new();
        let config = SearchConfig::default();
        let heuristics = Heuristics::default();
        assert!(Tokenizer::new(&source, &config, &heuristics)
            .tokenize(Path::new("nope.c"))
            .is_none());
    }

    #[test]
    fn test_tokenize_combines_and_normalizes() {
        let source = MemorySource::new().with_file("main.c", "if (a->b >= c && d) x <<= 1;");
        let stream = tokenize(&source, "main.c");
        assert_eq!(
            texts(&stream),
            vec!["if", "(", "a", ".", "b", ">=", "c", "&&", "d", ")", "x", "<<", "=", "1", ";"]
        );
    }
}
