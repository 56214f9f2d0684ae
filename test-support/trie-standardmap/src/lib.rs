// Copyright 2017, 2018 Parity Technologies
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Deterministic sets of hash sized keys and values.

use hash_db::Hasher;
use sha3_hasher::{Sha3Hash, Sha3Hasher};

/// Alphabet to use when creating keys.
pub enum Alphabet {
	/// All values are allowed in each bytes of the key.
	All,
	/// Only 6 values ('a' - 'f') are chosen to compose the key, giving long shared prefixes.
	Low,
	/// Quite a few values (around 32) are chosen to compose the key.
	Mid,
	/// A set of bytes given is used to compose the key.
	Custom(Vec<u8>),
}

/// Means of determining the value.
pub enum ValueMode {
	/// Same as the key.
	Mirror,
	/// Pseudo random bytes.
	Random,
	/// Little-endian index, zero padded.
	Index,
}

/// Standard test map for profiling proofs.
pub struct StandardMap {
	/// The alphabet to use for keys.
	pub alphabet: Alphabet,
	/// Number of leading key bytes left at zero, forcing a common prefix.
	pub zero_prefix: usize,
	/// Mode of value generation.
	pub value_mode: ValueMode,
	/// Number of keys.
	pub count: u32,
}

impl StandardMap {
	/// Get a hash worth of random bytes. `seed` is mutated pseudoramdonly and used.
	fn random_bytes(seed: &mut Sha3Hash) -> Sha3Hash {
		*seed = Sha3Hasher::hash(&seed[..]);
		*seed
	}

	/// Get a random key with bytes drawn from `alphabet`. `seed` is mutated pseudoramdonly
	/// and used.
	fn random_word(alphabet: &[u8], seed: &mut Sha3Hash) -> Sha3Hash {
		*seed = Sha3Hasher::hash(&seed[..]);
		let mut ret = Sha3Hash::default();
		for (i, b) in ret.iter_mut().enumerate() {
			*b = alphabet[seed[i] as usize % alphabet.len()];
		}
		ret
	}

	/// Create the standard map (set of keys and values) for the object's fields.
	pub fn make(&self) -> Vec<(Sha3Hash, Sha3Hash)> {
		self.make_with(&mut Sha3Hash::default())
	}

	/// Create the standard map (set of keys and values) for the object's fields, using the given
	/// seed.
	///
	/// Keys may repeat for small alphabets.
	pub fn make_with(&self, seed: &mut Sha3Hash) -> Vec<(Sha3Hash, Sha3Hash)> {
		let low = b"abcdef";
		let mid = b"@QWERTYUIOPASDFGHJKLZXCVBNM[/]^_";

		let mut d = Vec::with_capacity(self.count as usize);
		for index in 0..self.count {
			let mut k = match self.alphabet {
				Alphabet::All => Self::random_bytes(seed),
				Alphabet::Low => Self::random_word(low, seed),
				Alphabet::Mid => Self::random_word(mid, seed),
				Alphabet::Custom(ref a) => Self::random_word(a, seed),
			};
			let prefix = self.zero_prefix.min(k.len());
			k[..prefix].iter_mut().for_each(|b| *b = 0);
			let v = match self.value_mode {
				ValueMode::Mirror => k,
				ValueMode::Random => Self::random_bytes(seed),
				ValueMode::Index => {
					let mut v = Sha3Hash::default();
					v[..4].copy_from_slice(&index.to_le_bytes());
					v
				},
			};
			d.push((k, v))
		}
		d
	}
}
