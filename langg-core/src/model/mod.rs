//! The character trie and its containers.
//!
//! - `Node`: one character slot with its visit count and children
//! - `Tree`: a named trie with its character settings
//! - `TreeCollection`: ordered trees, the unit of persistence
//! - Statistics reported on trees

/// Trie vertex, insertion, merging and traversal helpers.
pub mod node;

/// Named trie: ingestion of raw text, weighted walk, dot rendering.
pub mod tree;

/// Ordered set of trees, built from sources and persisted as a whole.
pub mod collection;

/// Serializable statistics reports.
pub mod stats;
