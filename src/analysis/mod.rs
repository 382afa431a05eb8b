//! Include analysis
//!
//! This module decides, per `#include`, whether the included header is used:
//! - [`graph`]: include edges and system-header classification
//! - [`symbols`]: what each header declares
//! - [`needs`]: what each file references, and the per-edge verdicts
//!
//! All three work on the [`crate::parser::token::TokenStream`] of one
//! top-level file and are rebuilt from scratch for the next one.

pub mod graph;
pub mod needs;
pub mod symbols;

pub use graph::{IncludeGraph, Reachability};
pub use needs::{analyze, Analysis, FileNeeds, Necessity, Verdict};
pub use symbols::{extract, FileSymbols};
