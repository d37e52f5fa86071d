/// Multiplier applied to the position before mixing.
pub const BIT_NOISE_1: u32 = 0xB529_7A4D;
/// Offset added once the seed has been mixed in.
pub const BIT_NOISE_2: u32 = 0x68E3_1DA4;
/// Final multiplier.
pub const BIT_NOISE_3: u32 = 0x1B56_C4E9;

const U32_FULL: f64 = u32::MAX as f64;

/// Maps `(position, seed)` to a pseudo-random 32-bit value.
///
/// Intermediates are kept on 64 bits and only the low 32 bits of the result
/// are returned: the right shifts fold bits above 32 back into the result,
/// so truncating at every step would give different values. Bits above 64
/// never reach the low 32 bits of the output.
pub const fn mix(position: u32, seed: u32) -> u32 {
	let mut mangled = (position as u64).wrapping_mul(BIT_NOISE_1 as u64);
	mangled = mangled.wrapping_add(seed as u64);
	mangled ^= mangled >> 8;
	mangled = mangled.wrapping_add(BIT_NOISE_2 as u64);
	mangled ^= mangled << 8;
	mangled = mangled.wrapping_mul(BIT_NOISE_3 as u64);
	mangled ^= mangled >> 8;
	mangled as u32
}

/// Cursor over the noise function.
///
/// Every accessor moves the position forward by one before mixing, so the
/// first draw after construction or [`NoiseCursor::reset`] uses position 0.
///
/// ## Invariants
/// - Draws are ordering-sensitive: two cursors fed the same sequence of
///   seeds produce the same sequence of values.
#[derive(Debug, Clone, Default)]
pub struct NoiseCursor {
	/// Position of the last draw, `None` before the first one.
	position: Option<u32>,
}

impl NoiseCursor {
	/// Creates a cursor whose next draw uses position 0.
	pub const fn new() -> Self {
		Self { position: None }
	}

	/// Moves the cursor back before position 0.
	pub fn reset(&mut self) {
		self.position = None;
	}

	/// Returns the position used by the last draw, if any.
	pub fn position(&self) -> Option<u32> {
		self.position
	}

	/// Next raw 32-bit value for `seed`.
	pub fn next_int(&mut self, seed: u32) -> u32 {
		let position = self.position.map_or(0, |p| p.wrapping_add(1));
		self.position = Some(position);
		mix(position, seed)
	}

	/// Next value masked into `[min, max]`.
	///
	/// The range is applied with `& (max - min)`, not a modulo: only spans of
	/// the form `2^n - 1` are uniform. Decisions depend on this exact masking.
	pub fn next_int_in_range(&mut self, seed: u32, min: u32, max: u32) -> u32 {
		(self.next_int(seed) & max.wrapping_sub(min)).wrapping_add(min)
	}

	/// Next value scaled to `[0.0, 1.0]`.
	pub fn next_float(&mut self, seed: u32) -> f64 {
		f64::from(self.next_int(seed)) / U32_FULL
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn mix_matches_reference_vectors() {
		assert_eq!(mix(0, 0), 1_728_747_202);
		assert_eq!(mix(1, 0), 1_749_188_421);
		assert_eq!(mix(2, 0), 3_855_169_020);
		assert_eq!(mix(0, 1), 3_212_623_951);
		assert_eq!(mix(7, 42), 3_882_538_768);
		assert_eq!(mix(100, 0xDEAD_BEEF), 981_700_364);
	}

	#[test]
	fn high_bits_feed_back_into_the_result() {
		// The same steps truncated to 32 bits after each operation.
		let narrow = |position: u32, seed: u32| {
			let mut m = position.wrapping_mul(BIT_NOISE_1).wrapping_add(seed);
			m ^= m >> 8;
			m = m.wrapping_add(BIT_NOISE_2);
			m ^= m << 8;
			m = m.wrapping_mul(BIT_NOISE_3);
			m ^ (m >> 8)
		};
		assert_eq!(narrow(0, 0), 436_901_570);
		assert_ne!(mix(0, 0), narrow(0, 0));
	}

	#[test]
	fn cursor_starts_at_position_zero() {
		let mut cursor = NoiseCursor::new();
		assert_eq!(cursor.position(), None);
		assert_eq!(cursor.next_int(0), mix(0, 0));
		assert_eq!(cursor.next_int(0), mix(1, 0));
		assert_eq!(cursor.position(), Some(1));
	}

	#[test]
	fn reset_replays_the_sequence() {
		let mut cursor = NoiseCursor::new();
		let first: Vec<u32> = (0..4).map(|_| cursor.next_int(99)).collect();
		cursor.reset();
		let second: Vec<u32> = (0..4).map(|_| cursor.next_int(99)).collect();
		assert_eq!(first, second);
	}

	#[test]
	fn range_is_a_bit_mask() {
		let mut cursor = NoiseCursor::new();
		let raw = mix(0, 5);
		assert_eq!(cursor.next_int_in_range(5, 4, 10), (raw & 6) + 4);

		let mut cursor = NoiseCursor::new();
		for _ in 0..200 {
			let value = cursor.next_int_in_range(1234, 4, 10);
			assert!([4, 6, 8, 10].contains(&value));
		}
	}

	#[test]
	fn float_stays_in_unit_interval() {
		let mut cursor = NoiseCursor::new();
		for seed in 0..500 {
			let value = cursor.next_float(seed);
			assert!((0.0..=1.0).contains(&value));
		}
	}
}
