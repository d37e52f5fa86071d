use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::{TreeSettings, default_chars};
use crate::decision::{DecisionGenerator, Decisions};
use crate::error::{LanggError, Result};
use crate::model::node::Node;
use crate::model::stats::{Branch, KLengthPrefixes};

/// One trained character model.
///
/// # Responsibilities
/// - Clean raw text into words and ingest them into the trie
/// - Walk the trie under a [`DecisionGenerator`] to synthesize words
/// - Report statistics and render itself as a graphviz digraph
///
/// # Invariants
/// - `root` holds [`crate::model::node::ROOT_CHAR`] at depth 0
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Tree {
	/// Usually derived from the source filename(s).
	name: String,
	considered_chars: Vec<char>,
	root_chars: Vec<char>,
	root: Node,
}

impl Tree {
	/// Creates an empty tree.
	pub fn new(name: &str, settings: &TreeSettings) -> Self {
		Self {
			name: name.to_owned(),
			considered_chars: settings.considered_chars.clone(),
			root_chars: settings.root_chars.clone(),
			root: Node::root(),
		}
	}

	/// Creates an empty tree using the default character sets.
	pub fn with_default_chars(name: &str) -> Self {
		Self {
			name: name.to_owned(),
			considered_chars: default_chars(),
			root_chars: default_chars(),
			root: Node::root(),
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn considered_chars(&self) -> &[char] {
		&self.considered_chars
	}

	pub fn root_chars(&self) -> &[char] {
		&self.root_chars
	}

	pub fn root(&self) -> &Node {
		&self.root
	}

	/// Whether `ch` (already lowercase) is modelled by this tree.
	pub fn is_considered(&self, ch: char) -> bool {
		self.considered_chars.contains(&ch)
	}

	/// Cleans raw text into the words this tree would ingest.
	///
	/// - Lowercases everything
	/// - Replaces characters that are neither considered nor whitespace by a space
	/// - Drops apostrophes touching whitespace or the text boundary (quotes),
	///   keeps those between two other characters (contractions)
	pub fn words(&self, text: &str) -> Vec<String> {
		let lowered: Vec<char> = text
			.chars()
			.flat_map(char::to_lowercase)
			.map(|c| if self.is_considered(c) || c.is_whitespace() { c } else { ' ' })
			.collect();

		let bounded = |c: Option<&char>| c.is_none_or(|c| c.is_whitespace());

		let mut cleaned = String::with_capacity(lowered.len());
		for (i, &c) in lowered.iter().enumerate() {
			if c == '\'' {
				let before = i.checked_sub(1).and_then(|j| lowered.get(j));
				let after = lowered.get(i + 1);
				if bounded(before) || bounded(after) {
					continue;
				}
			}
			cleaned.push(c);
		}

		cleaned.split_whitespace().map(str::to_owned).collect()
	}

	/// Ingests raw text.
	///
	/// Words not starting with a root character are skipped. In full-words
	/// mode each word is inserted once, otherwise every suffix of it is.
	pub fn ingest(&mut self, text: &str, full_words: bool) {
		for word in self.words(text) {
			let chars: Vec<char> = word.chars().collect();
			match chars.first() {
				Some(first) if self.root_chars.contains(first) => (),
				_ => continue,
			}

			if full_words {
				self.root.insert(&chars);
			} else {
				for i in 0..chars.len() {
					self.root.insert(&chars[i..]);
				}
			}
		}
	}

	/// Sorts every node's children by character.
	///
	/// Required before serialization or generation so that the same input
	/// always yields the same child order.
	pub fn sort(&mut self) {
		self.root.sort();
	}

	/// Merges the trie of `other` into this one. Name and character sets are kept.
	pub fn merge(&mut self, other: &Self) {
		self.root.merge(&other.root);
	}

	pub fn node_count(&self) -> usize {
		self.root.node_count()
	}

	/// Deepest path from the root (root excluded). Should pretty much be the longest word.
	pub fn longest_branch(&self) -> Branch {
		Branch::from_path(&self.root.deepest_path())
	}

	/// All root-to-node paths of exactly `k` characters.
	pub fn k_length_prefixes(&self, k: u32) -> KLengthPrefixes {
		KLengthPrefixes::from_paths(k, &self.root.paths_at_depth(k))
	}

	/// Root child holding the character of `node`, or the root itself.
	fn anchor<'a>(&'a self, node: &Node) -> &'a Node {
		self.root.child(node.ch()).unwrap_or(&self.root)
	}

	/// Synthesizes a word of `decisions.word_length` characters.
	///
	/// While fewer than `max_depth` characters were emitted, every step
	/// re-anchors at the root child holding the current character, so the
	/// walk follows character pairs; past it the walk descends freely. Each
	/// step draws a child weighted by visit count. At a dead end the walk
	/// re-anchors without emitting anything, falling back to the root when
	/// the anchor is a dead end too.
	///
	/// # Errors
	/// Returns `EmptyTree` if the root has nothing to draw from.
	pub fn walk(&self, generator: &mut DecisionGenerator, decisions: &Decisions) -> Result<String> {
		if self.root.children_visits() == 0 {
			return Err(LanggError::EmptyTree { name: self.name.clone() });
		}

		let mut word = String::new();
		let mut length = 0;
		let mut steps = 0;
		let mut node = &self.root;

		while length < decisions.word_length {
			if steps < decisions.max_depth {
				node = self.anchor(node);
			}

			let visits: Vec<u64> = node.children().iter().map(Node::visits).collect();
			match generator.weighted_child_index(&visits) {
				Some(idx) => {
					node = &node.children()[idx];
					steps += 1;
					length += 1;
					word.push(node.ch());
				}
				None => {
					let anchored = self.anchor(node);
					node = if anchored.children_visits() > 0 { anchored } else { &self.root };
				}
			}
		}

		debug!("Walked {word:?} in tree '{}'", self.name);
		Ok(word)
	}

	/// Renders the tree as a strict graphviz digraph.
	pub fn to_dot(&self) -> String {
		let mut body = String::new();
		// Writing into a String cannot fail.
		let _ = self.root.write_dot(0, &mut body);
		format!("strict digraph {} {{\n{body}}}", graph_id(&self.name))
	}
}

/// Turns a tree name into a bare graphviz identifier.
fn graph_id(name: &str) -> String {
	let mut id: String = name.chars().map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' }).collect();
	if id.is_empty() || id.starts_with(|c: char| c.is_ascii_digit()) {
		id.insert(0, '_');
	}
	id
}
