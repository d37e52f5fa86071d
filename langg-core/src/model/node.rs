use std::fmt::{self, Write};

use serde::{Deserialize, Serialize};

/// Character held by the root of every tree.
pub const ROOT_CHAR: char = ' ';

/// One vertex of the character trie.
///
/// A `Node` is reached by spelling the characters on the path from the root;
/// its `visits` count how many ingested strings passed through it.
///
/// ## Invariants
/// - Each child's `depth` is `self.depth + 1`
/// - Children characters are unique
/// - Children keep insertion order until [`Node::sort`] is called
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Node {
	#[serde(rename = "char")]
	ch: char,
	depth: u32,
	visits: u64,
	/// Encoded as a sequence in binary formats and as a map keyed by
	/// character in human-readable ones.
	#[serde(with = "children")]
	children: Vec<Node>,
}

impl Node {
	/// Creates an unvisited node.
	pub fn new(ch: char, depth: u32) -> Self {
		Self { ch, depth, visits: 0, children: Vec::new() }
	}

	/// Creates an unvisited root node.
	pub fn root() -> Self {
		Self::new(ROOT_CHAR, 0)
	}

	pub fn ch(&self) -> char {
		self.ch
	}

	pub fn depth(&self) -> u32 {
		self.depth
	}

	pub fn visits(&self) -> u64 {
		self.visits
	}

	pub fn children(&self) -> &[Node] {
		&self.children
	}

	/// Returns the child holding `ch`, if any.
	pub fn child(&self, ch: char) -> Option<&Node> {
		self.children.iter().find(|child| child.ch == ch)
	}

	/// Sum of the children visit counts.
	pub fn children_visits(&self) -> u64 {
		self.children.iter().map(|child| child.visits).sum()
	}

	/// Inserts `word` below this node.
	///
	/// Walks (and extends) the trie one character at a time, incrementing
	/// `visits` on this node and every node passed through.
	pub fn insert(&mut self, word: &[char]) {
		let mut node = self;
		node.visits += 1;
		for &ch in word {
			let idx = match node.children.iter().position(|child| child.ch == ch) {
				Some(idx) => idx,
				None => {
					node.children.push(Node::new(ch, node.depth + 1));
					node.children.len() - 1
				}
			};
			node = &mut node.children[idx];
			node.visits += 1;
		}
	}

	/// Recursively sorts children by character.
	pub fn sort(&mut self) {
		self.children.sort_by_key(|child| child.ch);
		for child in &mut self.children {
			child.sort();
		}
	}

	/// Merges another node holding the same character into this one.
	///
	/// Visit counts are summed, missing children are cloned.
	pub fn merge(&mut self, other: &Self) {
		self.visits += other.visits;
		for theirs in &other.children {
			match self.children.iter_mut().find(|child| child.ch == theirs.ch) {
				Some(ours) => ours.merge(theirs),
				None => self.children.push(theirs.clone()),
			}
		}
	}

	/// Number of nodes in this subtree, this one included.
	pub fn node_count(&self) -> usize {
		self.children.iter().map(Node::node_count).sum::<usize>() + 1
	}

	/// Longest chain of descendants below this node (this node excluded).
	///
	/// On ties the first maximal path in child order wins.
	pub fn deepest_path(&self) -> Vec<&Node> {
		let mut best: Vec<&Node> = Vec::new();
		for child in &self.children {
			let mut path = vec![child];
			path.extend(child.deepest_path());
			if path.len() > best.len() {
				best = path;
			}
		}
		best
	}

	/// Every path from this node (excluded) to a descendant of depth `k`.
	pub fn paths_at_depth(&self, k: u32) -> Vec<Vec<&Node>> {
		let mut out = Vec::new();
		let mut path = Vec::new();
		self.collect_paths(k, &mut path, &mut out);
		out
	}

	fn collect_paths<'a>(&'a self, k: u32, path: &mut Vec<&'a Node>, out: &mut Vec<Vec<&'a Node>>) {
		if self.depth >= k {
			return;
		}
		for child in &self.children {
			path.push(child);
			if child.depth == k {
				out.push(path.clone());
			} else {
				child.collect_paths(k, path, out);
			}
			path.pop();
		}
	}

	/// Appends the graphviz declarations of this subtree to `out`.
	///
	/// Node ids are preorder indices starting at `id`.
	pub(crate) fn write_dot(&self, id: usize, out: &mut String) -> fmt::Result {
		let indent = " ".repeat(self.depth as usize + 1);
		writeln!(out, "{indent}n{id} [label=\"{} ({})\"]", escape_label(self.ch), self.visits)?;

		let mut child_id = id + 1;
		let mut child_ids = Vec::with_capacity(self.children.len());
		for child in &self.children {
			writeln!(out, "{indent}n{id} -> n{child_id}")?;
			child_ids.push(child_id);
			child_id += child.node_count();
		}

		for (child, child_id) in self.children.iter().zip(child_ids) {
			child.write_dot(child_id, out)?;
		}
		Ok(())
	}
}

fn escape_label(ch: char) -> String {
	match ch {
		'"' | '\\' => format!("\\{ch}"),
		_ => ch.to_string(),
	}
}

mod children {
	use std::fmt;

	use serde::de::{self, MapAccess, Visitor};
	use serde::ser::SerializeMap;
	use serde::{Deserialize, Deserializer, Serializer};

	use super::Node;

	pub fn serialize<S: Serializer>(children: &[Node], serializer: S) -> Result<S::Ok, S::Error> {
		if serializer.is_human_readable() {
			let mut map = serializer.serialize_map(Some(children.len()))?;
			for child in children {
				map.serialize_entry(&child.ch, child)?;
			}
			map.end()
		} else {
			serializer.collect_seq(children)
		}
	}

	pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Node>, D::Error> {
		if deserializer.is_human_readable() {
			deserializer.deserialize_map(ChildrenVisitor)
		} else {
			Vec::<Node>::deserialize(deserializer)
		}
	}

	struct ChildrenVisitor;

	impl<'de> Visitor<'de> for ChildrenVisitor {
		type Value = Vec<Node>;

		fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
			formatter.write_str("a map from characters to nodes")
		}

		fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
			let mut children: Vec<Node> = Vec::with_capacity(access.size_hint().unwrap_or(0));
			while let Some((key, node)) = access.next_entry::<char, Node>()? {
				if key != node.ch {
					return Err(de::Error::custom(format!("child keyed {key:?} holds {:?}", node.ch)));
				}
				if children.iter().any(|child| child.ch == key) {
					return Err(de::Error::custom(format!("duplicate child {key:?}")));
				}
				children.push(node);
			}
			Ok(children)
		}
	}
}
