use log::info;

use crate::config::{MentionStyle, TranslateSettings};
use crate::decision::{DecisionGenerator, identity_seed};
use crate::error::Result;
use crate::model::collection::TreeCollection;
use crate::model::tree::Tree;
use crate::translate::tokenizer::{Casing, Tokenization, Tokenizer};

/// Replaces every word of a text by a word synthesized from one tree.
///
/// The tree is only borrowed: any number of translators may share it.
/// Each line gets its own [`DecisionGenerator`], so a line always translates
/// the same way whatever precedes it.
#[derive(Debug, Clone)]
pub struct Translator<'a> {
	tree: &'a Tree,
	seed: u32,
	tokenizer: Tokenizer,
}

impl<'a> Translator<'a> {
	/// # Errors
	/// - `EmptyTreeCollection` if `collection` has no trees
	/// - `TreeIndexOutOfRange` if `settings.tree_index` is past the end
	pub fn new(collection: &'a TreeCollection, settings: &TranslateSettings) -> Result<Self> {
		let tree = collection.get(settings.tree_index)?;
		info!("Running translator with seed: {} on tree '{}'", settings.seed, tree.name());
		Ok(Self {
			tree,
			seed: settings.seed,
			tokenizer: Tokenizer::new(tree.considered_chars(), settings.mentions),
		})
	}

	/// Translator for one identity (user, channel...) of a chat platform:
	/// first tree, seed derived from `identity`, mentions kept as is.
	pub fn for_identity(collection: &'a TreeCollection, identity: &str) -> Result<Self> {
		let settings = TranslateSettings {
			seed: identity_seed(identity),
			tree_index: 0,
			mentions: MentionStyle::Chat,
		};
		Self::new(collection, &settings)
	}

	pub fn seed(&self) -> u32 {
		self.seed
	}

	pub fn tree(&self) -> &Tree {
		self.tree
	}

	/// Translates `text` line by line; lines are split and joined on `\n`.
	pub fn translate(&self, text: &str) -> Result<String> {
		let lines = text.split('\n').map(|line| self.translate_line(line)).collect::<Result<Vec<_>>>()?;
		Ok(lines.join("\n"))
	}

	pub fn translate_line(&self, line: &str) -> Result<String> {
		let record = self.tokenizer.tokenize(line)?;
		let mut generator = DecisionGenerator::new(self.seed);
		Ok(self.translate_record(&record, &mut generator)?.concat())
	}

	/// Produces the output fragments of one tokenized line.
	///
	/// Words are consumed in pairs: the decisions for a word look at the next
	/// one too, and when they say to merge, both are replaced by a single
	/// synthesized word with an apostrophe inside and the separator between
	/// them is dropped.
	///
	/// # Errors
	/// Returns `EmptyTree` if the tree has nothing to walk.
	pub fn translate_record(&self, record: &Tokenization, generator: &mut DecisionGenerator) -> Result<Vec<String>> {
		if record.words.is_empty() {
			return Ok(record.separators.clone());
		}

		let offset = usize::from(!record.starts_with_word);
		let mut fragments = Vec::with_capacity(record.words.len() + record.separators.len());
		if offset == 1 {
			fragments.extend(record.separators.first().cloned());
		}

		let mut i = 0;
		while i < record.words.len() {
			let first = record.words[i].to_lowercase();
			let second = record.words.get(i + 1).map(|word| word.to_lowercase());

			let decisions = generator.compute_decisions(&first, second.as_deref());
			let synthesized = self.tree.walk(generator, &decisions)?;

			let mut word = match &record.casings[i] {
				Casing::Upper => synthesized.to_uppercase(),
				Casing::Positions(positions) => {
					let mut positions = positions.clone();
					if decisions.merge_words {
						let second_len = record.words[i + 1].chars().count();
						positions.extend(record.casings[i + 1].positions(second_len));
					}
					apply_casing(&synthesized, &positions)
				}
			};

			let last = if decisions.merge_words {
				if let Some(idx) = generator.contraction_index(&synthesized) {
					insert_apostrophe(&mut word, idx);
				}
				i + 1
			} else {
				i
			};

			fragments.push(word);
			fragments.extend(record.separators.get(last + offset).cloned());
			i = last + 1;
		}

		Ok(fragments)
	}
}

/// Upper-cases the character at `floor(p * len)` for every position `p`.
fn apply_casing(word: &str, positions: &[f64]) -> String {
	let len = word.chars().count();
	let upper: Vec<usize> = positions.iter().map(|p| (p * len as f64) as usize).collect();
	word.chars()
		.enumerate()
		.flat_map(|(i, c)| if upper.contains(&i) { c.to_uppercase().collect::<Vec<_>>() } else { vec![c] })
		.collect()
}

/// Inserts `'` before the `idx`-th character of `word`.
///
/// `word` may have grown while being upper-cased, so the index is counted
/// in characters.
fn insert_apostrophe(word: &mut String, idx: usize) {
	let byte_idx = word.char_indices().nth(idx).map_or(word.len(), |(b, _)| b);
	word.insert(byte_idx, '\'');
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::TreeSettings;
	use crate::error::LanggError;

	const CORPUS: &str = "the quick brown fox jumps over the lazy dog while seven wizards \
		quietly hex every jovial bumpkin and the mighty river flows past old stone bridges";

	fn collection() -> TreeCollection {
		let settings = TreeSettings { considered_chars: ('a'..='z').collect(), ..TreeSettings::default() };
		let mut tree = Tree::new("corpus", &settings);
		tree.ingest(CORPUS, false);
		tree.sort();
		TreeCollection::new(vec![tree])
	}

	fn translator(collection: &TreeCollection, seed: u32) -> Translator<'_> {
		let settings = TranslateSettings { seed, ..TranslateSettings::default() };
		Translator::new(collection, &settings).unwrap()
	}

	#[test]
	fn translation_is_deterministic() {
		let collection = collection();
		let text = "Hello there, General Kenobi!\nYou are a bold one.";
		let first = translator(&collection, 42).translate(text).unwrap();
		let second = translator(&collection, 42).translate(text).unwrap();
		assert_eq!(first, second);
		assert_eq!(first.matches('\n').count(), 1);
	}

	#[test]
	fn lines_do_not_depend_on_each_other() {
		let collection = collection();
		let translator = translator(&collection, 9);
		let alone = translator.translate("second line here").unwrap();
		let joined = translator.translate("first line\nsecond line here").unwrap();
		assert!(joined.ends_with(&format!("\n{alone}")));
	}

	#[test]
	fn separators_are_kept() {
		let collection = collection();
		for seed in 0..20 {
			let out = translator(&collection, seed).translate_line("  hello!? ").unwrap();
			assert!(out.starts_with("  "));
			assert!(out.ends_with("!? "));
			let word = &out[2..out.len() - 3];
			assert!(!word.is_empty());
			assert!(word.chars().all(|c| c.is_ascii_lowercase()));
		}
	}

	#[test]
	fn separator_only_lines_are_copied() {
		let collection = collection();
		let translator = translator(&collection, 1);
		assert_eq!(translator.translate_line(" ... 123 ").unwrap(), " ... 123 ");
		assert_eq!(translator.translate_line("").unwrap(), "");
	}

	#[test]
	fn casing_is_transferred() {
		let collection = collection();
		for seed in 0..20 {
			let translator = translator(&collection, seed);

			let upper = translator.translate_line("HELLO").unwrap();
			assert!(upper.chars().all(|c| c.is_ascii_uppercase()));

			let title = translator.translate_line("Hello").unwrap();
			let mut chars = title.chars();
			assert!(chars.next().is_some_and(|c| c.is_ascii_uppercase()));
			assert!(chars.all(|c| c.is_ascii_lowercase()));
		}
	}

	#[test]
	fn source_casing_does_not_change_letters() {
		let collection = collection();
		let translator = translator(&collection, 5);
		let lower = translator.translate_line("hello").unwrap();
		let upper = translator.translate_line("HELLO").unwrap();
		assert_eq!(lower.to_uppercase(), upper);
	}

	#[test]
	fn merged_words_get_an_apostrophe() {
		let collection = collection();
		let mut merged = 0;
		for seed in 0..1000 {
			let out = translator(&collection, seed).translate_line("alpha beta").unwrap();
			if out.contains(' ') {
				assert!(!out.contains('\''));
			} else {
				merged += 1;
				assert_eq!(out.matches('\'').count(), 1);
				assert!(!out.starts_with('\'') && !out.ends_with('\''));
			}
		}
		assert!(merged > 0);
	}

	#[test]
	fn merged_pair_keeps_outer_separators_and_both_casings() {
		let collection = collection();
		let mut merged = 0;
		for seed in 0..200 {
			let out = translator(&collection, seed).translate_line(" Alpha beTa!").unwrap();
			assert!(out.starts_with(' '));
			assert!(out.ends_with('!'));

			let inner = &out[1..out.len() - 1];
			if inner.contains(' ') {
				continue;
			}
			merged += 1;
			assert_eq!(inner.matches('\'').count(), 1);

			// "Alpha" contributes position 0, "beTa" position 0.5.
			let letters: Vec<char> = inner.chars().filter(|&c| c != '\'').collect();
			let upper = [0, letters.len() / 2];
			for (i, c) in letters.iter().enumerate() {
				assert_eq!(c.is_ascii_uppercase(), upper.contains(&i), "{out:?} at {i}");
			}
		}
		assert!(merged > 0);
	}

	#[test]
	fn mentions_are_kept_for_identities() {
		let collection = collection();
		let translator = Translator::for_identity(&collection, "someone#1234").unwrap();
		assert_eq!(translator.seed(), identity_seed("someone#1234"));
		assert!(translator.translate_line("hi <@123>").unwrap().ends_with(" <@123>"));
		assert!(translator.translate_line("@bob hi").unwrap().starts_with("@bob "));
	}

	#[test]
	fn tree_index_is_checked() {
		let collection = collection();
		let settings = TranslateSettings { tree_index: 3, ..TranslateSettings::default() };
		assert!(matches!(
			Translator::new(&collection, &settings),
			Err(LanggError::TreeIndexOutOfRange { index: 3, len: 1 })
		));
		assert!(matches!(
			Translator::new(&TreeCollection::default(), &TranslateSettings::default()),
			Err(LanggError::EmptyTreeCollection)
		));
	}

	#[test]
	fn apostrophe_is_inserted_by_character() {
		let mut word = "ÉCOLE".to_owned();
		insert_apostrophe(&mut word, 2);
		assert_eq!(word, "ÉC'OLE");
		assert_eq!(apply_casing("abcd", &[0.25, 0.75]), "aBcD");
	}
}
