//! Trie-based pseudo-language generation library.
//!
//! This crate provides:
//! - A character trie built from word lists, with visit counts per node
//! - Persistence of tree collections (postcard binary, JSON, graphviz dot)
//! - A deterministic noise function and the decision generator built on it
//! - A translator that rewrites text word by word using a trained tree
//!
//! Given the same tree, seed and input text, translation output is
//! byte-identical from one run to the next.

/// Crate error type and result alias.
pub mod error;

/// Typed settings for tree construction and translation.
pub mod config;

/// Trie nodes, trees, tree collections and statistics.
pub mod model;

/// Stateless noise function and its cursor wrapper.
pub mod noise;

/// Per-word decisions (merge, depth limit, length) and weighted child draws.
pub mod decision;

/// Tokenization and resynthesis of input text.
pub mod translate;

/// I/O utilities (file loading, path helpers).
///
/// Not exposed
pub(crate) mod io;

pub use error::{LanggError, Result};
