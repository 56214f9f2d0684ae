// Copyright 2017, 2021 Parity Technologies
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

//! Sparse Merkle-Patricia trie proofs.
//!
//! A proof is a root-first sequence of serialized trie nodes. It is decoded with
//! [`decode_nodes`] and checked against a claimed key and value, the roots of the
//! sub-tries, and the state hash committing to those roots with [`verify_proof`].

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(feature = "std")]
mod rstd {
	pub use std::{fmt, iter, string, vec};
}

#[cfg(not(feature = "std"))]
mod rstd {
	pub use alloc::{string, vec};
	pub use core::{fmt, iter};
}

#[cfg(feature = "std")]
use self::rstd::fmt;

mod nibble;
pub mod node;
pub mod node_codec;
pub mod proof;

pub use self::{
	nibble::{nibble_ops, NibblePath, NibbleSlice},
	node::{BranchNode, LeafNode, TrieNode},
	node_codec::{decode_node, decode_nodes, encode_node, encode_nodes, Error as CodecError},
	proof::{state_hash, verify_proof, ProofOutcome},
};
pub use hash_db::Hasher;

/// Lower-case hex rendering of raw bytes, for trace output.
#[cfg(feature = "std")]
pub(crate) struct ToHex<'a>(pub(crate) &'a [u8]);
#[cfg(feature = "std")]
impl<'a> fmt::Debug for ToHex<'a> {
	fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
		let hex = rustc_hex::ToHexIter::new(self.0.iter());
		for b in hex {
			write!(fmt, "{}", b)?;
		}
		Ok(())
	}
}
