//! Placeholder importance signal.
//!
//! Content nodes need some importance for sizing; until a real ranking exists
//! this hands out a pseudo-random value per record. It is seeded and keyed by
//! record id, so the same record always gets the same value regardless of the
//! order records arrive in.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sha2::{Digest, Sha256};

use crate::config::GraphConfig;

#[derive(Clone, Debug)]
pub struct ImportanceGenerator {
	seed: u64,
	low: f64,
	high: f64,
}

impl ImportanceGenerator {
	pub fn new(seed: u64, low: f64, high: f64) -> Self {
		let (low, high) = if low <= high { (low, high) } else { (high, low) };
		Self {
			seed,
			low: low.clamp(0.0, 1.0),
			high: high.clamp(0.0, 1.0),
		}
	}

	pub fn from_config(config: &GraphConfig) -> Self {
		Self::new(config.importance_seed, config.importance_min, config.importance_max)
	}

	pub fn importance_for(&self, record_id: &str) -> f64 {
		let digest = Sha256::digest(record_id.as_bytes());
		let mut key = [0u8; 8];
		key.copy_from_slice(&digest[..8]);
		let mut rng = StdRng::seed_from_u64(self.seed ^ u64::from_le_bytes(key));
		rng.gen_range(self.low..=self.high)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn values_stay_in_range() {
		let generator = ImportanceGenerator::new(7, 0.3, 0.8);
		for i in 0..200 {
			let v = generator.importance_for(&format!("record-{i}"));
			assert!((0.3..=0.8).contains(&v), "{v} out of range");
		}
	}

	#[test]
	fn same_seed_same_value() {
		let a = ImportanceGenerator::new(42, 0.3, 0.8);
		let b = ImportanceGenerator::new(42, 0.3, 0.8);
		assert_eq!(a.importance_for("r1"), b.importance_for("r1"));
	}

	#[test]
	fn inverted_range_is_normalized() {
		let generator = ImportanceGenerator::new(1, 0.9, 0.2);
		let v = generator.importance_for("x");
		assert!((0.2..=0.9).contains(&v));
	}
}
