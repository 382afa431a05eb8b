//! Include graph: who includes whom, and which files are system headers

use crate::parser::token::{FileId, IncludeDirective, IncludeTarget, TokenStream};
use rustc_hash::FxHashSet;
use std::collections::VecDeque;

/// Result of a reachability walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reachability {
    /// Every include on the way was resolved.
    Reachable(Vec<FileId>),
    /// Some include on the way was not found or was a precompiled header;
    /// the files listed are only the part that could be walked.
    UnresolvedEncountered(Vec<FileId>),
}

impl Reachability {
    /// Visited files, sorted by index, start included.
    pub fn files(&self) -> &[FileId] {
        match self {
            Reachability::Reachable(files) | Reachability::UnresolvedEncountered(files) => files,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Reachability::Reachable(_))
    }
}

#[derive(Debug, Clone, Default)]
pub struct IncludeGraph {
    /// Per including file, its directives in source order.
    edges: Vec<Vec<IncludeDirective>>,
    system: Vec<bool>,
}

impl IncludeGraph {
    pub fn build(stream: &TokenStream) -> Self {
        let count = stream.files.len();
        let mut edges: Vec<Vec<IncludeDirective>> = vec![Vec::new(); count];
        for include in &stream.includes {
            edges[include.file].push(include.clone());
        }
        for list in &mut edges {
            list.sort_by_key(|e| e.position);
        }

        // A file is system if anything reaches it with <>, or if a system
        // file includes it. Iterate until nothing changes.
        let mut system = vec![false; count];
        loop {
            let mut changed = false;
            for include in &stream.includes {
                if let IncludeTarget::Resolved(target) = include.target {
                    if !system[target] && (include.system || system[include.file]) {
                        system[target] = true;
                        changed = true;
                    }
                }
            }
            if !changed {
                break;
            }
        }

        Self { edges, system }
    }

    pub fn file_count(&self) -> usize {
        self.edges.len()
    }

    /// Directives written in `file`, in source order.
    pub fn edges_from(&self, file: FileId) -> &[IncludeDirective] {
        self.edges.get(file).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Files with a resolved include of `file`.
    pub fn includers_of(&self, file: FileId) -> impl Iterator<Item = FileId> + '_ {
        self.edges.iter().enumerate().filter_map(move |(from, list)| {
            list.iter()
                .any(|e| e.target == IncludeTarget::Resolved(file))
                .then_some(from)
        })
    }

    pub fn is_system(&self, file: FileId) -> bool {
        self.system.get(file).copied().unwrap_or(false)
    }

    /// Breadth-first closure over resolved includes starting at `start`.
    pub fn reachable(&self, start: FileId) -> Reachability {
        let mut visited = FxHashSet::default();
        let mut queue = VecDeque::from([start]);
        let mut unresolved = false;
        visited.insert(start);

        while let Some(file) = queue.pop_front() {
            for edge in self.edges_from(file) {
                match edge.target {
                    IncludeTarget::Resolved(next) => {
                        if visited.insert(next) {
                            queue.push_back(next);
                        }
                    }
                    IncludeTarget::NotFound | IncludeTarget::Precompiled => unresolved = true,
                }
            }
        }

        let mut files: Vec<FileId> = visited.into_iter().collect();
        files.sort_unstable();
        if unresolved {
            Reachability::UnresolvedEncountered(files)
        } else {
            Reachability::Reachable(files)
        }
    }
}
