use log::debug;

use crate::noise::NoiseCursor;

/// Width of one folded chunk in [`hash_word`].
const CHUNK_WIDTH: usize = 4;

/// Baseline probability threshold above which two words are merged.
pub const MERGE_WORDS_OFFSET: f64 = 0.92;

/// Largest length variation added to a synthesized word.
pub const WORD_VARIATION_MAX: usize = 3;

/// Bounds of the trie-walk depth limit.
const MAX_DEPTH_MIN: u32 = 4;
const MAX_DEPTH_MAX: u32 = 10;

/// Seed used when no explicit seed is configured, and the base for identity seeds.
pub const DEFAULT_SEED: u32 = 0x6C61_6E67;

/// Folds `word` into `seed`.
///
/// The word is right-padded with its own leading characters until its length
/// is a multiple of 4, then each 4-character chunk is read as a big-endian
/// 32-bit value (one byte per character) and xored into the seed.
pub fn hash_word(seed: u32, word: &str) -> u32 {
	let mut codes: Vec<u8> = word.chars().map(|c| u32::from(c) as u8).collect();

	let rem = codes.len() % CHUNK_WIDTH;
	if rem != 0 {
		let pad = CHUNK_WIDTH - rem;
		let prefix: Vec<u8> = codes.iter().take(pad).copied().collect();
		codes.extend(prefix.iter().cycle().take(pad));
	}

	codes.chunks_exact(CHUNK_WIDTH).fold(seed, |acc, chunk| {
		acc ^ u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]])
	})
}

/// Derives the deterministic seed of an identity (user name, channel...).
pub fn identity_seed(identity: &str) -> u32 {
	hash_word(DEFAULT_SEED, identity)
}

/// Choices driving the synthesis of one word (or one merged pair).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decisions {
	/// Fuse the current and the next word into one.
	pub merge_words: bool,
	/// Number of walk steps during which the walk re-anchors at the root.
	pub max_depth: u32,
	/// Target length of the synthesized word, always >= 1.
	pub word_length: usize,
}

/// Seeded source of every pseudo-random decision taken during translation.
///
/// Owns its cursor: one generator must serve exactly one translation session,
/// since each call advances the cursor and later draws depend on it.
#[derive(Debug, Clone)]
pub struct DecisionGenerator {
	initial_seed: u32,
	cursor: NoiseCursor,
	merge_probability: f64,
	/// Seed of the word currently being synthesized.
	word_seed: u32,
}

impl DecisionGenerator {
	/// Creates a generator and draws its merge probability (+0 to 5% above
	/// [`MERGE_WORDS_OFFSET`]).
	pub fn new(initial_seed: u32) -> Self {
		let mut cursor = NoiseCursor::new();
		let merge_probability = MERGE_WORDS_OFFSET + cursor.next_float(initial_seed) / 20.0;
		Self { initial_seed, cursor, merge_probability, word_seed: initial_seed }
	}

	pub fn initial_seed(&self) -> u32 {
		self.initial_seed
	}

	pub fn merge_probability(&self) -> f64 {
		self.merge_probability
	}

	/// Computes the decisions for `first`, optionally paired with `second`.
	///
	/// The merge draw continues from the current cursor position; the cursor
	/// is then reset and the depth and length draws use the seed of `first`,
	/// which also becomes the seed of subsequent child and contraction draws.
	pub fn compute_decisions(&mut self, first: &str, second: Option<&str>) -> Decisions {
		let merge_words = match second {
			Some(second) => {
				let merge_seed = hash_word(self.initial_seed, &format!("{first}{second}"));
				self.cursor.next_float(merge_seed) > self.merge_probability
			}
			None => false,
		};

		self.cursor.reset();
		self.word_seed = hash_word(self.initial_seed, first);

		let max_depth = self.cursor.next_int_in_range(self.word_seed, MAX_DEPTH_MIN, MAX_DEPTH_MAX);

		let base_len = match second {
			Some(second) => (first.chars().count() + second.chars().count()) / 2,
			None => first.chars().count(),
		};
		let word_length = self.word_length(base_len);

		let decisions = Decisions { merge_words, max_depth, word_length };
		debug!("Decisions for {first:?}/{second:?}: {decisions:?}");
		decisions
	}

	/// Adds a small variation to `base_len`, smaller variations being more likely.
	///
	/// For a cap of 3 the candidates are `[0, 0, 0, 1, 1, 2]`.
	fn word_length(&mut self, base_len: usize) -> usize {
		let variation_max = base_len.min(WORD_VARIATION_MAX);

		let variations: Vec<usize> = (0..variation_max)
			.flat_map(|i| std::iter::repeat_n(i, variation_max - i))
			.collect();

		let variation = if variations.is_empty() {
			0
		} else {
			let idx = self.cursor.next_int_in_range(self.word_seed, 0, (variations.len() - 1) as u32);
			variations.get(idx as usize).copied().unwrap_or(0)
		};

		(base_len + variation).max(1)
	}

	/// Where to insert an apostrophe in a merged word, in `[1, len - 1]`.
	///
	/// Returns `None` for words shorter than two characters, which have no
	/// inner position.
	pub fn contraction_index(&mut self, word: &str) -> Option<usize> {
		let len = word.chars().count();
		if len < 2 {
			return None;
		}
		Some(self.cursor.next_int_in_range(self.word_seed, 1, (len - 1) as u32) as usize)
	}

	/// Picks a child index with probability proportional to its visit count.
	///
	/// Equivalent to expanding index `i` `visits[i]` times and drawing a
	/// masked index into that expansion. Returns `None` (no draw) when there
	/// is nothing to pick from.
	pub fn weighted_child_index(&mut self, visits: &[u64]) -> Option<usize> {
		let total: u64 = visits.iter().sum();
		if total == 0 {
			return None;
		}

		// Masked on 64 bits: a span wider than 32 bits keeps every bit of the draw.
		let mut r = u64::from(self.cursor.next_int(self.word_seed)) & (total - 1);
		for (idx, visit) in visits.iter().enumerate() {
			if r < *visit {
				return Some(idx);
			}
			r -= visit;
		}

		// Unreachable: r < total by construction.
		visits.iter().rposition(|v| *v > 0)
	}
}
