use std::fs;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use log::warn;

use crate::decision::DEFAULT_SEED;
use crate::error::{LanggError, Result};
use crate::io;

/// Characters modelled when nothing else is configured: `a` to `z` and the apostrophe.
pub fn default_chars() -> Vec<char> {
	('a'..='z').chain(std::iter::once('\'')).collect()
}

/// How input sources are spread across trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeLayout {
	/// A single tree built from every source.
	#[default]
	Merged,
	/// One tree per source.
	Separate,
}

/// Settings used when building trees from raw text.
///
/// # Invariants
/// - `considered_chars` and `root_chars` are lowercase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeSettings {
	/// Characters eligible for modelling; anything else splits words.
	pub considered_chars: Vec<char>,
	/// A word is only ingested if it starts with one of these.
	pub root_chars: Vec<char>,
	/// Insert whole words only instead of every suffix.
	pub full_words: bool,
	pub layout: TreeLayout,
}

impl Default for TreeSettings {
	fn default() -> Self {
		Self {
			considered_chars: default_chars(),
			root_chars: default_chars(),
			full_words: false,
			layout: TreeLayout::Merged,
		}
	}
}

impl TreeSettings {
	/// Builds settings from optional user-supplied character lists.
	///
	/// Empty or missing lists fall back to [`default_chars`].
	pub fn from_chars(considered: Option<&str>, root: Option<&str>) -> Self {
		let parse = |chars: Option<&str>| -> Vec<char> {
			let mut out: Vec<char> = chars.unwrap_or_default().chars().flat_map(char::to_lowercase).collect();
			out.sort_unstable();
			out.dedup();
			if out.is_empty() { default_chars() } else { out }
		};
		Self {
			considered_chars: parse(considered),
			root_chars: parse(root),
			..Self::default()
		}
	}
}

/// Where the text to translate comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
	Text(String),
	/// Files whose words are translated one per line.
	Files(Vec<PathBuf>),
	Stdin,
}

impl InputSource {
	/// Selects the input source from the possible user choices.
	///
	/// Direct text wins over files, files over stdin.
	///
	/// # Errors
	/// Returns `UnknownInputSource` if none is supplied.
	pub fn select(text: Option<String>, files: Vec<PathBuf>, stdin: bool) -> Result<Self> {
		let supplied = usize::from(text.is_some()) + usize::from(!files.is_empty()) + usize::from(stdin);
		if supplied > 1 {
			warn!("{supplied} input sources supplied, using the highest priority one");
		}

		if let Some(text) = text {
			return Ok(Self::Text(text));
		}
		if !files.is_empty() {
			return Ok(Self::Files(files));
		}
		if stdin {
			return Ok(Self::Stdin);
		}
		Err(LanggError::UnknownInputSource)
	}

	/// Reads the whole input as lines.
	///
	/// # Errors
	/// Returns an error if a file or stdin cannot be read.
	pub fn read_lines(&self) -> Result<Vec<String>> {
		match self {
			Self::Text(text) => Ok(text.split('\n').map(str::to_owned).collect()),
			Self::Files(files) => {
				let mut words = Vec::new();
				for file in files {
					words.extend(io::read_words(file)?);
				}
				Ok(words)
			}
			Self::Stdin => Ok(std::io::stdin().lock().lines().collect::<std::io::Result<Vec<_>>>()?),
		}
	}
}

/// Where translated text is written.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OutputTarget {
	#[default]
	Stdout,
	File(PathBuf),
}

impl OutputTarget {
	/// Writes `text`, newline-terminated on stdout and as is in a file.
	pub fn write(&self, text: &str) -> Result<()> {
		match self {
			Self::Stdout => writeln!(std::io::stdout().lock(), "{text}")?,
			Self::File(path) => fs::write(path, text)?,
		}
		Ok(())
	}
}

/// On-disk representation of a tree collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistFormat {
	/// postcard encoding of the collection.
	Binary,
	Json,
}

/// Platform tokens copied through translation untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MentionStyle {
	#[default]
	Off,
	/// `@name` identifiers and `<@123>`, `<@!123>`, `<@&123>`, `<#123>` tags.
	Chat,
}

/// Settings for one translator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslateSettings {
	pub seed: u32,
	/// Index of the tree to translate with.
	pub tree_index: usize,
	pub mentions: MentionStyle,
}

impl Default for TranslateSettings {
	fn default() -> Self {
		Self { seed: DEFAULT_SEED, tree_index: 0, mentions: MentionStyle::Off }
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_chars_are_letters_and_apostrophe() {
		let chars = default_chars();
		assert_eq!(chars.len(), 27);
		assert!(chars.contains(&'\''));
		assert!(chars.contains(&'z'));
	}

	#[test]
	fn custom_chars_are_lowercased_and_deduplicated() {
		let settings = TreeSettings::from_chars(Some("AbBa"), None);
		assert_eq!(settings.considered_chars, vec!['a', 'b']);
		assert_eq!(settings.root_chars, default_chars());
	}

	#[test]
	fn input_source_requires_a_choice() {
		let err = InputSource::select(None, Vec::new(), false).unwrap_err();
		assert!(matches!(err, LanggError::UnknownInputSource));
	}

	#[test]
	fn text_wins_over_files() {
		let source = InputSource::select(Some("hi".to_owned()), vec![PathBuf::from("x")], true).unwrap();
		assert_eq!(source, InputSource::Text("hi".to_owned()));
	}

	#[test]
	fn output_file_is_written_as_is() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("out.txt");
		OutputTarget::File(path.clone()).write("a\nb").unwrap();
		assert_eq!(fs::read_to_string(path).unwrap(), "a\nb");
	}

	#[test]
	fn file_sources_yield_one_word_per_line() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("in.txt");
		fs::write(&path, "one two\n\tthree\n").unwrap();
		let lines = InputSource::Files(vec![path]).read_lines().unwrap();
		assert_eq!(lines, vec!["one", "two", "three"]);
	}

	#[test]
	fn text_lines_are_not_trimmed() {
		let lines = InputSource::Text("a b\n c".to_owned()).read_lines().unwrap();
		assert_eq!(lines, vec!["a b".to_owned(), " c".to_owned()]);
	}
}
