//! Need computation and include classification
//!
//! For every file, [`compute_needs`] collects the identifiers it references.
//! [`Analysis`] then checks each include edge of each non-system file:
//! does the included header (or, for a system header, anything it pulls in)
//! declare one of those identifiers?

use super::graph::{IncludeGraph, Reachability};
use super::symbols::{extract, is_symbol, FileSymbols, MAIN_FILE};
use crate::config::Heuristics;
use crate::diagnostics;
use crate::parser::pattern::{matches, text_at};
use crate::parser::token::{FileId, FileTable, IncludeDirective, IncludeTarget, Token, TokenStream};
use std::collections::BTreeSet;
use tracing::debug;

/// Identifiers one file references.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileNeeds {
    pub needed: BTreeSet<String>,
    /// Types only used through a pointer outside any function body.
    pub need_declaration: BTreeSet<String>,
    /// The file contains at least one function body.
    pub has_body: bool,
}

/// Scan the tokens of `file` for referenced identifiers.
///
/// Pointer-only uses are promoted to `needed` when the file has a body,
/// since the body may dereference them.
pub fn compute_needs(stream: &TokenStream, file: FileId, heuristics: &Heuristics) -> FileNeeds {
    let tokens = stream.file_tokens(file);
    let mut needs = FileNeeds::default();
    let mut depth = 0usize;
    let mut i = 0;

    while i < tokens.len() {
        if depth == 0 && matches(&tokens, i, ") const| {") {
            while tokens[i].text != "{" {
                i += 1;
            }
            depth = 1;
            needs.has_body = true;
        } else if depth >= 1 {
            match tokens[i].text.as_str() {
                "{" => depth += 1,
                "}" => depth = depth.saturating_sub(1),
                _ => {}
            }
        }

        // base class
        if matches(&tokens, i, ": %var% {") || matches(&tokens, i, ": %type% %var% {") {
            let at = if text_at(&tokens, i + 2) == "{" { 1 } else { 2 };
            needs.insert_needed(text_at(&tokens, i + at), heuristics);
        }

        if depth == 0
            && matches(&tokens, i, "%type% * %var%")
            && matches(&tokens, i + 3, "[,;()[]")
        {
            let ty = &tokens[i].text;
            if is_symbol(ty, heuristics) {
                needs.need_declaration.insert(ty.clone());
            }
            i += 3;
            continue;
        }

        let text = tokens[i].text.as_str();
        if text != "struct" && text != "class" && text_at(&tokens, i + 1) != "{" {
            needs.insert_needed(text, heuristics);
        }
        i += 1;
    }

    if needs.has_body {
        let declared = needs.need_declaration.clone();
        needs.needed.extend(declared);
    }
    needs
}

impl FileNeeds {
    fn insert_needed(&mut self, text: &str, heuristics: &Heuristics) {
        if is_symbol(text, heuristics) {
            self.needed.insert(text.to_string());
        }
    }
}

/// Outcome for one include edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Necessity {
    /// `symbol` is declared in the header (or in a system header's closure).
    Needed { symbol: String },
    /// Only pointer uses of a type the header defines.
    ForwardDeclaration,
    NotNeeded,
    /// Nothing in the header itself, but `via`, which it includes, declares
    /// `symbol`.
    NeededIndirectly { via: FileId, symbol: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub includer: FileId,
    pub header: FileId,
    /// Text written between the `#include` delimiters.
    pub name: String,
    pub line: usize,
    pub necessity: Necessity,
}

impl Verdict {
    /// Diagnostic text, or `None` when the include is needed.
    pub fn message(&self, files: &FileTable) -> Option<String> {
        match &self.necessity {
            Necessity::Needed { .. } => None,
            Necessity::ForwardDeclaration => {
                Some(diagnostics::forward_declaration_needed(&self.name))
            }
            Necessity::NotNeeded => Some(diagnostics::header_not_needed(&self.name)),
            Necessity::NeededIndirectly { via, .. } => Some(diagnostics::needed_indirectly(
                &self.name,
                files.name(*via),
            )),
        }
    }
}

/// Symbols and needs of every file of one token stream.
pub struct Analysis<'s> {
    stream: &'s TokenStream,
    graph: IncludeGraph,
    symbols: Vec<FileSymbols>,
    needs: Vec<FileNeeds>,
}

impl<'s> Analysis<'s> {
    pub fn new(stream: &'s TokenStream, heuristics: &Heuristics) -> Self {
        let graph = IncludeGraph::build(stream);
        let count = stream.files.len();
        let mut symbols = Vec::with_capacity(count);
        let mut needs: Vec<FileNeeds> = (0..count)
            .map(|file| compute_needs(stream, file, heuristics))
            .collect();

        for file in 0..count {
            let extraction = extract(stream, file, heuristics);
            for name in &extraction.forward_declared {
                for includer in graph.includers_of(file).filter(|&f| f != file) {
                    needs[includer].insert_needed(name, heuristics);
                }
            }
            symbols.push(extraction.symbols);
        }

        Self {
            stream,
            graph,
            symbols,
            needs,
        }
    }

    pub fn graph(&self) -> &IncludeGraph {
        &self.graph
    }

    pub fn symbols(&self, file: FileId) -> &FileSymbols {
        &self.symbols[file]
    }

    pub fn needs(&self, file: FileId) -> &FileNeeds {
        &self.needs[file]
    }

    /// One verdict per checkable include edge, by including file then
    /// include order. System files are not checked; edges to missing or
    /// precompiled headers are skipped, as are edges whose outcome depends
    /// on a missing header.
    pub fn verdicts(&self) -> Vec<Verdict> {
        let mut verdicts = Vec::new();
        for file in 0..self.graph.file_count() {
            if self.graph.is_system(file) {
                continue;
            }
            for edge in self.graph.edges_from(file) {
                let IncludeTarget::Resolved(header) = edge.target else {
                    continue;
                };
                if let Some(necessity) = self.classify(file, header) {
                    verdicts.push(Verdict {
                        includer: file,
                        header,
                        name: edge.name.clone(),
                        line: edge.line,
                        necessity,
                    });
                } else {
                    self.log_bail_out(edge);
                }
            }
        }
        verdicts
    }

    fn classify(&self, file: FileId, header: FileId) -> Option<Necessity> {
        let files = &self.stream.files;
        debug!(
            "file {} checking include {}",
            files.name(file),
            files.name(header)
        );
        let needed = &self.needs[file].needed;

        let mut closure = if self.graph.is_system(header) {
            self.graph.reachable(header)
        } else {
            Reachability::Reachable(vec![header])
        };
        if let Some((_, symbol)) = self.first_match(needed, closure.files()) {
            debug!("needed symbol '{}'", symbol);
            return Some(Necessity::Needed { symbol });
        }

        if !self.graph.is_system(header) {
            closure = self.graph.reachable(header);
            if let Some((via, symbol)) = self.first_match(needed, closure.files()) {
                debug!("needed symbol '{}' via {}", symbol, files.name(via));
                return Some(Necessity::NeededIndirectly { via, symbol });
            }
        }

        if !closure.is_complete() {
            return None;
        }

        let need_declaration = &self.needs[file].need_declaration;
        let forward = closure.files().iter().any(|&f| {
            need_declaration
                .iter()
                .any(|s| self.symbols[f].classes.contains(s))
        });
        Some(if forward {
            Necessity::ForwardDeclaration
        } else {
            Necessity::NotNeeded
        })
    }

    /// First file in `files` declaring a needed symbol; classes are tested
    /// before names within each file.
    fn first_match(&self, needed: &BTreeSet<String>, files: &[FileId]) -> Option<(FileId, String)> {
        files.iter().find_map(|&f| {
            let symbols = &self.symbols[f];
            needed
                .iter()
                .find(|s| symbols.classes.contains(*s))
                .or_else(|| needed.iter().find(|s| symbols.names.contains(*s)))
                .map(|s| (f, s.clone()))
        })
    }

    fn log_bail_out(&self, edge: &IncludeDirective) {
        debug!(
            "bail out on '{}' in {}: header not found",
            edge.name,
            self.stream.files.name(edge.file)
        );
    }
}

/// Check every include of the stream.
pub fn analyze(stream: &TokenStream, heuristics: &Heuristics) -> Vec<Verdict> {
    Analysis::new(stream, heuristics).verdicts()
}

/// Function bodies in files other than the main file: the `)` closing the
/// parameter list of every `) const| {`.
pub fn header_implementations(stream: &TokenStream) -> Vec<&Token> {
    let mut found = Vec::new();
    for file in (0..stream.files.len()).filter(|&f| f != MAIN_FILE) {
        let tokens = stream.file_tokens(file);
        for i in 0..tokens.len() {
            if matches(&tokens, i, ") const| {") {
                found.push(tokens[i]);
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchConfig;
    use crate::parser::lexer::Tokenizer;
    use crate::source::MemorySource;
    use std::path::Path;

    fn stream(source: &MemorySource) -> TokenStream {
        let config = SearchConfig::default();
        let heuristics = Heuristics::default();
        Tokenizer::new(source, &config, &heuristics)
            .tokenize(Path::new("a.c"))
            .unwrap()
    }

    fn needs_of(src: &str) -> FileNeeds {
        let source = MemorySource::new().with_file("a.c", src);
        compute_needs(&stream(&source), 0, &Heuristics::default())
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_pointer_use_needs_declaration() {
        let needs = needs_of("void f(Fred *fred);");
        assert_eq!(needs.needed, set(&["f"]));
        assert_eq!(needs.need_declaration, set(&["Fred"]));
        assert!(!needs.has_body);
    }

    #[test]
    fn test_body_promotes_declarations() {
        let needs = needs_of("Foo *foo;\nvoid f()\n{\n    foo->x();\n}\n");
        assert!(needs.has_body);
        assert_eq!(needs.needed, set(&["Foo", "f", "foo", "x"]));
    }

    #[test]
    fn test_const_method_body() {
        let needs = needs_of("int Fred::get() const { return Wilma; }");
        assert!(needs.has_body);
        assert!(needs.needed.contains("Wilma"));
    }

    #[test]
    fn test_defined_names_are_not_needed() {
        let needs = needs_of("struct APP_INIT_DATA {\n  PROXY_INFO proxy_info;\n};\n");
        assert_eq!(needs.needed, set(&["PROXY_INFO", "proxy_info"]));
    }

    #[test]
    fn test_base_class_is_needed() {
        let needs = needs_of("class Derived : public Base {\n};");
        assert!(needs.needed.contains("Base"));
    }

    #[test]
    fn test_keywords_never_needed() {
        let needs = needs_of("int main() { if (x) return 0; for (;;) {} }");
        assert!(!needs.needed.contains("int"));
        assert!(!needs.needed.contains("if"));
        assert!(!needs.needed.contains("for"));
        assert!(needs.needed.contains("x"));
    }

    #[test]
    fn test_verdicts_for_chain() {
        let source = MemorySource::new()
            .with_file("a.c", "#include \"a1.h\"\nvoid f() { b(); }\n")
            .with_file("a1.h", "#include \"a2.h\"\n")
            .with_file("a2.h", "void b();\n");
        let stream = stream(&source);
        let verdicts = analyze(&stream, &Heuristics::default());

        assert_eq!(verdicts.len(), 2);
        assert_eq!(
            verdicts[0].necessity,
            Necessity::NeededIndirectly {
                via: 2,
                symbol: "b".to_string()
            }
        );
        assert_eq!(verdicts[1].includer, 1);
        assert_eq!(verdicts[1].necessity, Necessity::NotNeeded);
        assert_eq!(
            verdicts[1].message(&stream.files).as_deref(),
            Some("The included header 'a2.h' is not needed")
        );
    }

    #[test]
    fn test_classes_before_names() {
        let source = MemorySource::new()
            .with_file("a.c", "#include \"a.h\"\nvoid f() { Alpha x; zeta(); }\n")
            .with_file("a.h", "class zeta {};\nint Alpha;\n");
        let verdicts = analyze(&stream(&source), &Heuristics::default());
        assert_eq!(
            verdicts[0].necessity,
            Necessity::Needed {
                symbol: "zeta".to_string()
            }
        );
    }

    #[test]
    fn test_forward_declaration_passes_need_through() {
        let source = MemorySource::new()
            .with_file(
                "a.c",
                "#include \"foo.h\"\n#include \"ab.h\"\nvoid Foo::f() { ab->do_something(); }\n",
            )
            .with_file("foo.h", "struct AB;\nstruct Foo {\n    AB *ab;\n    void f();\n};")
            .with_file("ab.h", "struct AB {\n    void do_something() { }\n};");
        let stream = stream(&source);
        let analysis = Analysis::new(&stream, &Heuristics::default());
        assert!(analysis.needs(0).needed.contains("AB"));
        assert!(analysis
            .verdicts()
            .iter()
            .all(|v| matches!(v.necessity, Necessity::Needed { .. })));
    }

    #[test]
    fn test_missing_header_in_closure_bails_out() {
        let source = MemorySource::new()
            .with_file("a.c", "#include \"a.h\"\nint x;\n")
            .with_file("a.h", "#include \"missing.h\"\nint unused;\n");
        let verdicts = analyze(&stream(&source), &Heuristics::default());
        assert!(verdicts.is_empty());
    }

    #[test]
    fn test_header_implementations() {
        let source = MemorySource::new()
            .with_file("a.c", "#include \"a.h\"\nvoid f() {}\n")
            .with_file("a.h", "\nint g() const { return 0; }\nvoid h();\n");
        let stream = stream(&source);
        let found = header_implementations(&stream);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].file, 1);
        assert_eq!(found[0].line, 2);
    }
}
