use serde::Serialize;

use crate::model::node::Node;

/// Visit count of one character along a path.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct CharVisits {
	#[serde(rename = "char")]
	pub ch: char,
	pub visits: u64,
}

fn char_visits(path: &[&Node]) -> Vec<CharVisits> {
	path.iter().map(|node| CharVisits { ch: node.ch(), visits: node.visits() }).collect()
}

fn spell(path: &[&Node]) -> String {
	path.iter().map(|node| node.ch()).collect()
}

/// Longest branch of a tree.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Branch {
	pub string: String,
	pub visits: Vec<CharVisits>,
	pub length: usize,
}

impl Branch {
	pub(crate) fn from_path(path: &[&Node]) -> Self {
		Self { string: spell(path), visits: char_visits(path), length: path.len() }
	}
}

/// One prefix of length `k`.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Prefix {
	pub string: String,
	/// Visits of the last node of the prefix.
	pub count: u64,
	pub visits: Vec<CharVisits>,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct KLengthPrefixes {
	pub k: u32,
	pub list: Vec<String>,
	pub prefixes: Vec<Prefix>,
}

impl KLengthPrefixes {
	pub(crate) fn from_paths(k: u32, paths: &[Vec<&Node>]) -> Self {
		let prefixes: Vec<Prefix> = paths
			.iter()
			.map(|path| Prefix {
				string: spell(path),
				count: path.last().map_or(0, |node| node.visits()),
				visits: char_visits(path),
			})
			.collect();
		Self { k, list: prefixes.iter().map(|p| p.string.clone()).collect(), prefixes }
	}
}

/// Statistics report of one tree.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct TreeStatistics {
	pub name: String,
	pub node_count: usize,
	pub longest_branch: Branch,
	pub k_length_prefixes: KLengthPrefixes,
}
