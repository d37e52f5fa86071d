//! Text translation.
//!
//! A line is cut into word and separator runs by the [`tokenizer`], then the
//! [`translator`] replaces every word (or merged pair of words) by a word
//! walked from a tree, keeping separators and casing in place.

pub mod tokenizer;
pub mod translator;
