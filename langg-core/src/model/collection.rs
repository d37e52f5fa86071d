use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;

use log::{error, info};
use serde::{Deserialize, Serialize};

use crate::config::{PersistFormat, TreeLayout, TreeSettings};
use crate::error::{LanggError, Result};
use crate::io::{get_filename, read_file, read_persisted, tree_name};
use crate::model::stats::TreeStatistics;
use crate::model::tree::Tree;

/// Ordered sequence of trees.
///
/// This is the unit that gets persisted and loaded:
/// - binary: postcard encoding of the list of trees
/// - JSON: an array of tree objects, children keyed by character
/// - dot: one strict digraph per tree
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct TreeCollection {
	trees: Vec<Tree>,
}

impl TreeCollection {
	pub fn new(trees: Vec<Tree>) -> Self {
		Self { trees }
	}

	pub fn trees(&self) -> &[Tree] {
		&self.trees
	}

	pub fn len(&self) -> usize {
		self.trees.len()
	}

	pub fn is_empty(&self) -> bool {
		self.trees.is_empty()
	}

	/// Returns the tree at `index`.
	///
	/// # Errors
	/// - `EmptyTreeCollection` if there are no trees at all
	/// - `TreeIndexOutOfRange` if `index` is past the end
	pub fn get(&self, index: usize) -> Result<&Tree> {
		if self.trees.is_empty() {
			return Err(LanggError::EmptyTreeCollection);
		}
		self.trees.get(index).ok_or(LanggError::TreeIndexOutOfRange { index, len: self.trees.len() })
	}

	/// Builds trees from dictionary files.
	///
	/// # Behavior
	/// - `Merged` layout: one tree named after every file stem joined by `_`
	/// - `Separate` layout: one tree per file, named after its stem
	/// - Trees are sorted before being returned
	///
	/// # Errors
	/// Returns an error if a file cannot be read.
	pub fn from_sources<P: AsRef<Path>>(sources: &[P], settings: &TreeSettings) -> Result<Self> {
		let groups: Vec<Vec<PathBuf>> = match settings.layout {
			TreeLayout::Merged => vec![sources.iter().map(|p| p.as_ref().to_path_buf()).collect()],
			TreeLayout::Separate => sources.iter().map(|p| vec![p.as_ref().to_path_buf()]).collect(),
		};

		let mut trees = Vec::with_capacity(groups.len());
		for group in groups {
			trees.push(Self::build_tree(&tree_name(&group)?, &group, settings)?);
		}

		Ok(Self { trees })
	}

	/// Builds a single full-words tree from in-memory text.
	///
	/// This is the path used by long-lived callers handling one uploaded
	/// dictionary per identity.
	pub fn from_text(name: &str, text: &str) -> Self {
		let mut tree = Tree::with_default_chars(name);
		tree.ingest(text, true);
		tree.sort();
		Self { trees: vec![tree] }
	}

	/// Reads every source, splits lines into chunks, ingests the chunks in
	/// parallel and merges the partial trees.
	///
	/// # Notes
	/// - Chunk count is based on CPU cores * factor
	/// - Lines are cut on whitespace, which already separates words, so the
	///   merged result equals a sequential ingestion once sorted
	fn build_tree(name: &str, sources: &[PathBuf], settings: &TreeSettings) -> Result<Tree> {
		let mut lines: Vec<String> = Vec::new();
		for source in sources {
			info!("Reading dictionary {}", source.display());
			lines.extend(read_file(source)?.lines().map(str::to_owned));
		}

		let mut tree = Tree::new(name, settings);
		if lines.is_empty() {
			return Ok(tree);
		}

		let factor = 8;
		let chunks = num_cpus::get() * factor;
		let chunk_size = lines.len().div_ceil(chunks).max(1);

		let (tx, rx) = mpsc::channel();
		for chunk in lines.chunks(chunk_size) {
			let tx = tx.clone();
			let text = chunk.join("\n");
			let mut partial_tree = Tree::new(name, settings);
			let full_words = settings.full_words;

			thread::spawn(move || {
				partial_tree.ingest(&text, full_words);
				// The receiver lives until every sender is dropped.
				let _ = tx.send(partial_tree);
			});
		}
		drop(tx);

		for partial_tree in rx.iter() {
			tree.merge(&partial_tree);
		}
		tree.sort();

		info!("Built tree '{name}' with {} nodes", tree.node_count());
		Ok(tree)
	}

	/// Sorts every tree deterministically.
	pub fn sort(&mut self) {
		for tree in &mut self.trees {
			tree.sort();
		}
	}

	/// Statistics of every tree, with prefixes of length `k`.
	pub fn statistics(&self, k: u32) -> Vec<TreeStatistics> {
		self.trees
			.iter()
			.map(|tree| TreeStatistics {
				name: tree.name().to_owned(),
				node_count: tree.node_count(),
				longest_branch: tree.longest_branch(),
				k_length_prefixes: tree.k_length_prefixes(k),
			})
			.collect()
	}

	pub fn to_binary(&self) -> Result<Vec<u8>> {
		Ok(postcard::to_stdvec(self)?)
	}

	pub fn from_binary(bytes: &[u8]) -> Result<Self> {
		Ok(postcard::from_bytes(bytes)?)
	}

	/// Serializes to JSON, indented if `pretty`.
	pub fn to_json(&self, pretty: bool) -> Result<String> {
		let json = if pretty { serde_json::to_string_pretty(self)? } else { serde_json::to_string(self)? };
		Ok(json)
	}

	pub fn from_json(json: &str) -> Result<Self> {
		Ok(serde_json::from_str(json)?)
	}

	/// Graphviz rendering, one digraph per tree.
	pub fn to_dot(&self) -> String {
		self.trees.iter().map(Tree::to_dot).collect::<Vec<_>>().join("\n")
	}

	pub fn write_dot<P: AsRef<Path>>(&self, path: P) -> Result<()> {
		fs::write(path, self.to_dot())?;
		Ok(())
	}

	/// Writes the collection to `path`. JSON is written compact.
	pub fn save<P: AsRef<Path>>(&self, path: P, format: PersistFormat) -> Result<()> {
		let bytes = match format {
			PersistFormat::Binary => self.to_binary()?,
			PersistFormat::Json => self.to_json(false)?.into_bytes(),
		};
		fs::write(path, bytes)?;
		Ok(())
	}

	/// Loads a collection previously written by [`TreeCollection::save`].
	///
	/// # Errors
	/// - `MissingOrUnreadablePersistedFile` if `path` is not a readable file
	/// - `Binary` / `Json` if its contents cannot be decoded
	pub fn load<P: AsRef<Path>>(path: P, format: PersistFormat) -> Result<Self> {
		let bytes = read_persisted(&path)?;
		match format {
			PersistFormat::Binary => Self::from_binary(&bytes),
			PersistFormat::Json => {
				let json = String::from_utf8(bytes).map_err(|e| LanggError::MissingOrUnreadablePersistedFile {
					path: path.as_ref().to_path_buf(),
					reason: e.to_string(),
				})?;
				Self::from_json(&json)
			}
		}
	}

	/// Like [`TreeCollection::load`], but logs failures and returns `None`.
	///
	/// Meant for long-lived callers where one bad file must not bring the
	/// whole process down.
	pub fn load_or_none<P: AsRef<Path>>(path: P, format: PersistFormat) -> Option<Self> {
		match Self::load(&path, format) {
			Ok(collection) => Some(collection),
			Err(e) => {
				error!("Failed to load {}: {e}", path.as_ref().display());
				None
			}
		}
	}

	/// Builds a collection from a single dictionary file named after its stem.
	pub fn from_dictionary_file<P: AsRef<Path>>(path: P) -> Result<Self> {
		let name = get_filename(&path)?;
		Ok(Self::from_text(&name, &read_file(&path)?))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sample() -> TreeCollection {
		let settings = TreeSettings::default();
		let mut first = Tree::new("first", &settings);
		first.ingest("cat car cap don't", false);
		let mut second = Tree::new("second", &settings);
		second.ingest("dog door", true);
		let mut collection = TreeCollection::new(vec![first, second]);
		collection.sort();
		collection
	}

	#[test]
	fn get_checks_bounds() {
		let collection = sample();
		assert_eq!(collection.get(1).unwrap().name(), "second");
		assert!(matches!(collection.get(2), Err(LanggError::TreeIndexOutOfRange { index: 2, len: 2 })));
		assert!(matches!(TreeCollection::default().get(0), Err(LanggError::EmptyTreeCollection)));
	}

	#[test]
	fn binary_round_trip() {
		let collection = sample();
		let bytes = collection.to_binary().unwrap();
		assert_eq!(TreeCollection::from_binary(&bytes).unwrap(), collection);
	}

	#[test]
	fn json_round_trip() {
		let collection = sample();
		for pretty in [false, true] {
			let json = collection.to_json(pretty).unwrap();
			assert_eq!(TreeCollection::from_json(&json).unwrap(), collection);
		}
	}

	#[test]
	fn json_layout() {
		let mut tree = Tree::with_default_chars("tiny");
		tree.ingest("ab", true);
		let json = TreeCollection::new(vec![tree]).to_json(false).unwrap();
		let value: serde_json::Value = serde_json::from_str(&json).unwrap();

		let tree = &value[0];
		assert_eq!(tree["name"], "tiny");
		assert_eq!(tree["root_chars"][0], "a");
		assert_eq!(tree["root"]["char"], " ");
		assert_eq!(tree["root"]["children"]["a"]["visits"], 1);
		assert_eq!(tree["root"]["children"]["a"]["children"]["b"]["depth"], 2);
	}

	#[test]
	fn json_rejects_mismatched_keys() {
		let json = r#"[{"name":"x","considered_chars":["a"],"root_chars":["a"],
			"root":{"char":" ","depth":0,"visits":1,"children":{"a":{"char":"b","depth":1,"visits":1,"children":{}}}}}]"#;
		assert!(matches!(TreeCollection::from_json(json), Err(LanggError::Json(_))));
	}

	#[test]
	fn from_text_uses_full_words() {
		let collection = TreeCollection::from_text("user", "Cat car");
		let tree = collection.get(0).unwrap();
		assert_eq!(tree.name(), "user");
		assert_eq!(tree.root().children().len(), 1);
		assert_eq!(tree.root().visits(), 2);
	}

	#[test]
	fn statistics_per_tree() {
		let stats = sample().statistics(3);
		assert_eq!(stats.len(), 2);
		assert_eq!(stats[1].name, "second");
		assert_eq!(stats[1].longest_branch.string, "door");
		assert_eq!(stats[1].k_length_prefixes.list, vec!["dog", "doo"]);
	}

	#[test]
	fn dot_has_one_graph_per_tree() {
		assert_eq!(sample().to_dot().matches("strict digraph").count(), 2);
	}
}
