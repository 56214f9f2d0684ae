// Copyright 2020 Parity Technologies
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

#![cfg_attr(not(feature = "std"), no_std)]

//! Binary Merkle tree over an ordered sequence of hashes.
//!
//! The root is built level by level: each level is collapsed by hashing
//! adjacent pairs, and a level of odd length pairs its last hash with itself.
//! A flat proof for one leaf is the list of sibling hashes met on the way up.

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(feature = "std")]
mod rstd {
	pub use std::{marker, vec};
}

#[cfg(not(feature = "std"))]
mod rstd {
	pub use alloc::vec;
	pub use core::marker;
}

use crate::rstd::{marker::PhantomData, vec::Vec};
use hash_db::Hasher;

/// Hash of the concatenation `left ++ right`, reusing `buffer` as scratch space.
fn hash_pair<H: Hasher>(left: &H::Out, right: &H::Out, buffer: &mut Vec<u8>) -> H::Out {
	buffer.clear();
	buffer.extend_from_slice(left.as_ref());
	buffer.extend_from_slice(right.as_ref());
	H::hash(&buffer[..])
}

/// Accumulates leaf hashes and folds them into a Merkle root.
///
/// ```rust
/// use hash_db::Hasher;
/// use merkle_hash::MerkleHashBuilder;
/// use sha3_hasher::Sha3Hasher;
///
/// let leaf = Sha3Hasher::hash(b"leaf");
/// let mut builder = MerkleHashBuilder::<Sha3Hasher>::new();
/// builder.update(leaf);
/// assert_eq!(builder.finalize(), leaf);
/// ```
pub struct MerkleHashBuilder<H: Hasher> {
	hashes: Vec<H::Out>,
	_marker: PhantomData<H>,
}

impl<H: Hasher> Default for MerkleHashBuilder<H> {
	fn default() -> Self {
		Self::new()
	}
}

impl<H: Hasher> MerkleHashBuilder<H> {
	/// Create an empty builder.
	pub fn new() -> Self {
		MerkleHashBuilder { hashes: Vec::new(), _marker: PhantomData }
	}

	/// Create an empty builder with room for `capacity` leaves.
	pub fn with_capacity(capacity: usize) -> Self {
		MerkleHashBuilder { hashes: Vec::with_capacity(capacity), _marker: PhantomData }
	}

	/// Append a leaf hash.
	pub fn update(&mut self, hash: H::Out) {
		self.hashes.push(hash);
	}

	/// Number of leaves accumulated so far.
	pub fn len(&self) -> usize {
		self.hashes.len()
	}

	/// Returns true if no leaf was added.
	pub fn is_empty(&self) -> bool {
		self.hashes.is_empty()
	}

	/// Consume the builder and return the root.
	///
	/// No leaves give the zero hash, a single leaf is its own root.
	pub fn finalize(self) -> H::Out {
		let mut level = self.hashes;
		if level.is_empty() {
			return Default::default()
		}

		let mut buffer = Vec::with_capacity(2 * H::LENGTH);
		while level.len() > 1 {
			if level.len() % 2 == 1 {
				let last = level[level.len() - 1];
				level.push(last);
			}
			// collapse in place, pair `i` lands at index `i`
			for i in 0..level.len() / 2 {
				level[i] = hash_pair::<H>(&level[2 * i], &level[2 * i + 1], &mut buffer);
			}
			level.truncate(level.len() / 2);
		}
		level[0]
	}
}

impl<H: Hasher> Extend<H::Out> for MerkleHashBuilder<H> {
	fn extend<I: IntoIterator<Item = H::Out>>(&mut self, iter: I) {
		self.hashes.extend(iter)
	}
}

/// Generates the Merkle root of an ordered sequence of leaf hashes.
pub fn merkle_root<H, I>(input: I) -> H::Out
where
	H: Hasher,
	I: IntoIterator<Item = H::Out>,
{
	let mut builder = MerkleHashBuilder::<H>::new();
	builder.extend(input);
	builder.finalize()
}

/// One sibling met when walking from a leaf to the root.
#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(Debug))]
pub struct MerklePathStep<HO> {
	/// Hash of the sibling subtree.
	pub hash: HO,
	/// The sibling is the left operand when recombining.
	pub is_left: bool,
}

impl<HO> MerklePathStep<HO> {
	/// Sibling on the left of the running hash.
	pub fn left(hash: HO) -> Self {
		MerklePathStep { hash, is_left: true }
	}

	/// Sibling on the right of the running hash.
	pub fn right(hash: HO) -> Self {
		MerklePathStep { hash, is_left: false }
	}
}

/// Recompute the root implied by `leaf` and its sibling `path`.
pub fn merkle_proof_root<H: Hasher>(leaf: &H::Out, path: &[MerklePathStep<H::Out>]) -> H::Out {
	let mut buffer = Vec::with_capacity(2 * H::LENGTH);
	path.iter().fold(*leaf, |running, step| {
		if step.is_left {
			hash_pair::<H>(&step.hash, &running, &mut buffer)
		} else {
			hash_pair::<H>(&running, &step.hash, &mut buffer)
		}
	})
}

/// Verify that `leaf` is committed under `root` through `path`.
///
/// An empty path only verifies when the leaf is the root itself.
pub fn verify_merkle_proof<H: Hasher>(
	leaf: &H::Out,
	path: &[MerklePathStep<H::Out>],
	root: &H::Out,
) -> bool {
	merkle_proof_root::<H>(leaf, path) == *root
}
