use crate::config::MentionStyle;
use crate::error::{LanggError, Result};

/// Where a source word carries uppercase characters.
#[derive(Debug, Clone, PartialEq)]
pub enum Casing {
	/// Every cased character is uppercase.
	Upper,
	/// Fractional positions `i / len` of the uppercase characters, in `[0, 1)`.
	Positions(Vec<f64>),
}

impl Casing {
	/// Records the casing of `word` as written in the source text.
	pub fn of(word: &str) -> Self {
		let chars: Vec<char> = word.chars().collect();
		let has_upper = chars.iter().any(|c| c.is_uppercase());
		let has_lower = chars.iter().any(|c| c.is_lowercase());
		if has_upper && !has_lower {
			return Self::Upper;
		}

		let len = chars.len() as f64;
		Self::Positions(
			chars
				.iter()
				.enumerate()
				.filter(|(_, c)| c.is_uppercase())
				.map(|(i, _)| i as f64 / len)
				.collect(),
		)
	}

	/// Positions to upper-case when this casing is appended to another word's.
	///
	/// `Upper` expands to every position of a `len` character word.
	pub fn positions(&self, len: usize) -> Vec<f64> {
		match self {
			Self::Upper => (0..len).map(|i| i as f64 / len as f64).collect(),
			Self::Positions(positions) => positions.clone(),
		}
	}
}

/// One input line cut into alternating separator and word runs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Tokenization {
	pub separators: Vec<String>,
	pub words: Vec<String>,
	/// One entry per word.
	pub casings: Vec<Casing>,
	/// Whether the first token is a word rather than a separator.
	pub starts_with_word: bool,
}

impl Tokenization {
	/// Every token in line order.
	pub fn tokens(&self) -> Vec<&str> {
		let (leading, trailing) = if self.starts_with_word {
			(&self.words, &self.separators)
		} else {
			(&self.separators, &self.words)
		};

		let mut tokens = Vec::with_capacity(leading.len() + trailing.len());
		for i in 0..leading.len().max(trailing.len()) {
			tokens.extend(leading.get(i).map(String::as_str));
			tokens.extend(trailing.get(i).map(String::as_str));
		}
		tokens
	}
}

/// Splits lines into word runs (characters modelled by a tree) and separator runs.
///
/// An apostrophe belongs to a word only between two other word characters,
/// so quotes stay in separators. With [`MentionStyle::Chat`], mentions and
/// channel tags are folded verbatim into the separator run they appear in.
#[derive(Debug, Clone)]
pub struct Tokenizer {
	considered: Vec<char>,
	mentions: MentionStyle,
}

impl Tokenizer {
	pub fn new(considered: &[char], mentions: MentionStyle) -> Self {
		Self { considered: considered.to_vec(), mentions }
	}

	fn is_considered(&self, c: char) -> bool {
		let mut lower = c.to_lowercase();
		matches!((lower.next(), lower.next()), (Some(l), None) if self.considered.contains(&l))
	}

	fn is_letter(&self, c: char) -> bool {
		c != '\'' && self.is_considered(c)
	}

	fn is_word_char(&self, chars: &[char], i: usize) -> bool {
		match chars[i] {
			'\'' => {
				self.is_considered('\'')
					&& i > 0 && self.is_letter(chars[i - 1])
					&& chars.get(i + 1).is_some_and(|&c| self.is_letter(c))
			}
			c => self.is_considered(c),
		}
	}

	/// Length of the mention starting at `i`, or 0.
	fn mention_len(&self, chars: &[char], i: usize) -> usize {
		match self.mentions {
			MentionStyle::Off => 0,
			MentionStyle::Chat => match chars[i] {
				'@' => {
					let name = chars[i + 1..]
						.iter()
						.take_while(|c| c.is_alphanumeric() || matches!(c, '_' | '.'))
						.count();
					if name == 0 { 0 } else { name + 1 }
				}
				'<' => tag_len(&chars[i..]),
				_ => 0,
			},
		}
	}

	/// Cuts `line` into a [`Tokenization`].
	///
	/// # Errors
	/// Returns `TokenizationStall` if a step fails to consume any character.
	pub fn tokenize(&self, line: &str) -> Result<Tokenization> {
		let chars: Vec<char> = line.chars().collect();
		let mut record = Tokenization::default();
		let mut pos = 0;

		while pos < chars.len() {
			let start = pos;

			if self.mention_len(&chars, pos) == 0 && self.is_word_char(&chars, pos) {
				while pos < chars.len() && self.is_word_char(&chars, pos) {
					pos += 1;
				}
				let word: String = chars[start..pos].iter().collect();
				if start == 0 {
					record.starts_with_word = true;
				}
				record.casings.push(Casing::of(&word));
				record.words.push(word);
			} else {
				while pos < chars.len() {
					match self.mention_len(&chars, pos) {
						0 if self.is_word_char(&chars, pos) => break,
						0 => pos += 1,
						len => pos += len,
					}
				}
				record.separators.push(chars[start..pos].iter().collect());
			}

			if pos == start {
				return Err(LanggError::TokenizationStall { position: pos, line: line.to_owned() });
			}
		}

		Ok(record)
	}
}

/// Length of a `<@123>`, `<@!123>`, `<@&123>` or `<#123>` tag at the start of `chars`, or 0.
fn tag_len(chars: &[char]) -> usize {
	let prefix = match chars {
		['<', '@', '!' | '&', ..] => 3,
		['<', '@' | '#', ..] => 2,
		_ => return 0,
	};
	let digits = chars[prefix..].iter().take_while(|c| c.is_ascii_digit()).count();
	match chars.get(prefix + digits) {
		Some('>') if digits > 0 => prefix + digits + 1,
		_ => 0,
	}
}

#[cfg(test)]
mod tests {
	use rand::rngs::StdRng;
	use rand::{Rng, SeedableRng};

	use super::*;
	use crate::config::default_chars;

	fn tokenizer(mentions: MentionStyle) -> Tokenizer {
		Tokenizer::new(&default_chars(), mentions)
	}

	#[test]
	fn words_and_separators_alternate() {
		let record = tokenizer(MentionStyle::Off).tokenize("Hello, world!").unwrap();
		assert!(record.starts_with_word);
		assert_eq!(record.words, vec!["Hello", "world"]);
		assert_eq!(record.separators, vec![", ", "!"]);

		let record = tokenizer(MentionStyle::Off).tokenize("  hi").unwrap();
		assert!(!record.starts_with_word);
		assert_eq!(record.separators, vec!["  "]);
		assert_eq!(record.words, vec!["hi"]);
	}

	#[test]
	fn empty_line_has_no_tokens() {
		let record = tokenizer(MentionStyle::Off).tokenize("").unwrap();
		assert_eq!(record, Tokenization::default());
	}

	#[test]
	fn apostrophes() {
		let record = tokenizer(MentionStyle::Off).tokenize("'don't' dogs'").unwrap();
		assert_eq!(record.words, vec!["don't", "dogs"]);
		assert_eq!(record.separators, vec!["'", "' ", "'"]);
	}

	#[test]
	fn casing_is_recorded() {
		let record = tokenizer(MentionStyle::Off).tokenize("NASA Rocks aBcD I").unwrap();
		assert_eq!(record.casings[0], Casing::Upper);
		assert_eq!(record.casings[1], Casing::Positions(vec![0.0]));
		assert_eq!(record.casings[2], Casing::Positions(vec![0.25, 0.75]));
		assert_eq!(record.casings[3], Casing::Upper);
		assert_eq!(Casing::Upper.positions(4), vec![0.0, 0.25, 0.5, 0.75]);
	}

	#[test]
	fn mentions_fold_into_separators() {
		let line = "hey @some_one.x look <@123> <@!4> <@&5> <#6> <x>";
		let record = tokenizer(MentionStyle::Chat).tokenize(line).unwrap();
		assert_eq!(record.words, vec!["hey", "look", "x"]);
		assert_eq!(record.separators, vec![" @some_one.x ", " <@123> <@!4> <@&5> <#6> <", ">"]);
		assert_eq!(record.tokens().concat(), line);

		let record = tokenizer(MentionStyle::Off).tokenize("hey @bob").unwrap();
		assert_eq!(record.words, vec!["hey", "bob"]);
	}

	#[test]
	fn leading_mention_is_a_separator() {
		let record = tokenizer(MentionStyle::Chat).tokenize("@bob hi").unwrap();
		assert!(!record.starts_with_word);
		assert_eq!(record.separators, vec!["@bob "]);
		assert_eq!(record.words, vec!["hi"]);
	}

	#[test]
	fn tokens_cover_random_lowercase_lines() {
		let alphabet: Vec<char> = "abcxyz' ,.-!\t0".chars().collect();
		let tokenizer = tokenizer(MentionStyle::Off);
		let mut rng = StdRng::seed_from_u64(7);

		for _ in 0..500 {
			let len = rng.random_range(0..40);
			let line: String = (0..len).map(|_| alphabet[rng.random_range(0..alphabet.len())]).collect();
			let record = tokenizer.tokenize(&line).unwrap();
			assert_eq!(record.tokens().concat(), line);
			assert_eq!(record.words.len(), record.casings.len());
		}
	}
}
