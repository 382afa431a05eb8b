//! Search configuration and analysis heuristics
//!
//! [`SearchConfig`] says where headers are looked up and which include names
//! are never followed. [`Heuristics`] holds the pattern rules that are tuned
//! against real-world headers rather than derived from the language.

use crate::errors::CheckError;
use rustc_hash::FxHashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Identifiers removed from every symbol and need set.
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "void", "bool", "char", "short", "int", "long", "float", "double", "false", "true", "std",
    "if", "for", "while", "defined",
];

/// Include search directories plus the names that are never followed.
#[derive(Debug, Clone, Default)]
pub struct SearchConfig {
    /// Tried in order, after the including file's own directory.
    pub include_paths: Vec<PathBuf>,
    /// Compared against the literal `#include` text, not the resolved path.
    pub skip: FxHashSet<String>,
}

#[derive(Clone, Copy)]
enum Section {
    Include,
    Skip,
}

impl SearchConfig {
    pub fn with_include_path(mut self, dir: impl Into<PathBuf>) -> Self {
        self.include_paths.push(dir.into());
        self
    }

    pub fn with_skip(mut self, name: impl Into<String>) -> Self {
        self.skip.insert(name.into());
        self
    }

    /// Read a sections file and append its entries to `self`.
    ///
    /// ```text
    /// include
    /// /usr/local/include
    /// skip
    /// config.h
    /// ```
    pub fn load(mut self, path: &Path) -> Result<Self, CheckError> {
        let text = fs::read_to_string(path).map_err(|source| CheckError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.merge_sections(path, &text)?;
        Ok(self)
    }

    fn merge_sections(&mut self, path: &Path, text: &str) -> Result<(), CheckError> {
        let error = |line: usize, message: &str| CheckError::Config {
            path: path.to_path_buf(),
            line,
            message: message.to_string(),
        };

        let mut section = None;
        let mut entries = 0;
        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            match line {
                "" => continue,
                "include" | "INCLUDE" => section = Some(Section::Include),
                "skip" | "SKIP" => section = Some(Section::Skip),
                entry => {
                    match section {
                        Some(Section::Include) => self.include_paths.push(PathBuf::from(entry)),
                        Some(Section::Skip) => {
                            self.skip.insert(entry.to_string());
                        }
                        None => {
                            return Err(error(index + 1, "entry before 'include' or 'skip' section"))
                        }
                    }
                    entries += 1;
                }
            }
        }

        if entries == 0 {
            return Err(error(1, "no entries"));
        }
        Ok(())
    }
}

/// Best-effort pattern rules, all on by default except the
/// implementation-in-header check.
#[derive(Debug, Clone)]
pub struct Heuristics {
    /// Stripped from symbol and need sets after extraction.
    pub keywords: FxHashSet<String>,
    /// Turn `// X ... deleted` comments after a statement into `delete X ;`.
    pub deleted_comments: bool,
    /// Include names (file-name component, case-insensitive) that are never
    /// read and never checked.
    pub precompiled_headers: Vec<String>,
    /// Report function bodies found in headers.
    pub check_implementation_in_headers: bool,
}

impl Default for Heuristics {
    fn default() -> Self {
        Self {
            keywords: DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            deleted_comments: true,
            precompiled_headers: vec!["stdafx.h".to_string()],
            check_implementation_in_headers: false,
        }
    }
}

impl Heuristics {
    pub fn is_keyword(&self, text: &str) -> bool {
        self.keywords.contains(text)
    }

    pub fn is_precompiled_header(&self, include_name: &str) -> bool {
        let file_name = include_name
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(include_name);
        self.precompiled_headers
            .iter()
            .any(|p| p.eq_ignore_ascii_case(file_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<SearchConfig, CheckError> {
        let mut config = SearchConfig::default();
        config.merge_sections(Path::new("checkheaders.cfg"), text)?;
        Ok(config)
    }

    #[test]
    fn test_sections() {
        let config = parse("include\n/usr/include\n\n./inc\nSKIP\nconfig.h\n").unwrap();
        assert_eq!(
            config.include_paths,
            vec![PathBuf::from("/usr/include"), PathBuf::from("./inc")]
        );
        assert!(config.skip.contains("config.h"));
    }

    #[test]
    fn test_entry_before_section() {
        let err = parse("\nfoo.h\n").unwrap_err();
        assert!(matches!(err, CheckError::Config { line: 2, .. }));
    }

    #[test]
    fn test_empty_config() {
        assert!(matches!(parse("include\n\n"), Err(CheckError::Config { .. })));
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checkheaders.cfg");
        std::fs::write(&path, "skip\nwindows.h\n").unwrap();
        let config = SearchConfig::default().with_skip("a.h").load(&path).unwrap();
        assert_eq!(config.skip.len(), 2);

        let missing = SearchConfig::default().load(&dir.path().join("nope.cfg"));
        assert!(matches!(missing, Err(CheckError::Io { .. })));
    }

    #[test]
    fn test_precompiled_header_names() {
        let h = Heuristics::default();
        assert!(h.is_precompiled_header("stdafx.h"));
        assert!(h.is_precompiled_header("StdAfx.h"));
        assert!(h.is_precompiled_header("pch/stdafx.h"));
        assert!(!h.is_precompiled_header("stdafx.hpp"));
    }

    #[test]
    fn test_keywords() {
        let h = Heuristics::default();
        assert!(h.is_keyword("std"));
        assert!(!h.is_keyword("Fred"));
    }
}
