// Copyright 2019, 2021 Parity Technologies
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

//! Verification of a key against a proof path anchored in a set of sub-trie roots.

use crate::{
	nibble::{NibblePath, NibbleSlice},
	node::{BranchNode, TrieNode},
	rstd::vec::Vec,
};
#[cfg(feature = "std")]
use crate::{rstd::fmt, ToHex};
use hash_db::Hasher;

#[cfg(feature = "std")]
const TRACE_TARGET: &str = "patricia-proof";

/// Result of checking a proof. Every case is a regular value, none is an error.
#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(Debug))]
pub enum ProofOutcome {
	/// The key is present with the claimed value.
	ValidPositive,
	/// The key is provably absent.
	ValidNegative,
	/// The path ends on a branch whose link for the key is present but not followed.
	Inconclusive,
	/// The nibbles along the path do not match the key.
	PathMismatch,
	/// A node is not referenced by its predecessor.
	UnlinkedNode,
	/// The leaf value differs from the claimed value.
	LeafValueMismatch,
	/// The first node of the path is not one of the roots.
	UnanchoredPathTree,
	/// The roots do not hash to the state hash.
	StateHashDoesNotMatchRoots,
}

impl ProofOutcome {
	/// Is this outcome a conclusive proof, of presence or of absence.
	pub fn is_valid(&self) -> bool {
		matches!(self, ProofOutcome::ValidPositive | ProofOutcome::ValidNegative)
	}

	/// Upper snake case name of the outcome.
	pub fn as_str(&self) -> &'static str {
		match self {
			ProofOutcome::ValidPositive => "VALID_POSITIVE",
			ProofOutcome::ValidNegative => "VALID_NEGATIVE",
			ProofOutcome::Inconclusive => "INCONCLUSIVE",
			ProofOutcome::PathMismatch => "PATH_MISMATCH",
			ProofOutcome::UnlinkedNode => "UNLINKED_NODE",
			ProofOutcome::LeafValueMismatch => "LEAF_VALUE_MISMATCH",
			ProofOutcome::UnanchoredPathTree => "UNANCHORED_PATH_TREE",
			ProofOutcome::StateHashDoesNotMatchRoots => "STATE_HASH_DOES_NOT_MATCH_ROOTS",
		}
	}
}

#[cfg(feature = "std")]
impl fmt::Display for ProofOutcome {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Hash committing to the ordered sub-trie roots: the hash of their concatenation.
pub fn state_hash<H: Hasher>(roots: &[H::Out]) -> H::Out {
	let mut buffer = Vec::with_capacity(roots.len() * H::LENGTH);
	for root in roots {
		buffer.extend_from_slice(root.as_ref());
	}
	H::hash(&buffer)
}

/// Check that `path` proves `key` maps to `value`, or that `key` is absent when `value`
/// is `None`.
///
/// `path` lists nodes from the sub-trie root down. The root must be one of `roots`,
/// and `roots` must hash to `state_hash`. Checks run in this order and the first
/// failing one decides the outcome:
///
/// 1. `roots` against `state_hash`.
/// 2. The first node against `roots`.
/// 3. Each node against a link of its predecessor. The index of that link is the
///    nibble the branch consumes.
/// 4. The nibbles collected along the path against `key`, then the last node
///    against `value`.
pub fn verify_proof<H: Hasher>(
	key: &H::Out,
	value: Option<&H::Out>,
	path: &[TrieNode<H::Out>],
	state_hash: &H::Out,
	roots: &[H::Out],
) -> ProofOutcome {
	let outcome = verify_proof_inner::<H>(key, value, path, state_hash, roots);
	#[cfg(feature = "std")]
	log::debug!(
		target: TRACE_TARGET,
		"proof of {:?} over {} nodes: {}",
		ToHex(key.as_ref()),
		path.len(),
		outcome,
	);
	outcome
}

fn verify_proof_inner<H: Hasher>(
	key: &H::Out,
	value: Option<&H::Out>,
	path: &[TrieNode<H::Out>],
	expected_state_hash: &H::Out,
	roots: &[H::Out],
) -> ProofOutcome {
	let computed = state_hash::<H>(roots);
	if computed != *expected_state_hash {
		#[cfg(feature = "std")]
		log::trace!(
			target: TRACE_TARGET,
			"state hash {:?} computed over {} roots",
			ToHex(computed.as_ref()),
			roots.len(),
		);
		return ProofOutcome::StateHashDoesNotMatchRoots
	}

	let (first, rest) = match path.split_first() {
		Some(split) => split,
		None => return ProofOutcome::UnanchoredPathTree,
	};
	let mut hash = first.canonical_hash::<H>();
	if !roots.contains(&hash) {
		#[cfg(feature = "std")]
		log::trace!(target: TRACE_TARGET, "path root {:?} is not anchored", ToHex(hash.as_ref()));
		return ProofOutcome::UnanchoredPathTree
	}

	let key = NibbleSlice::new(key.as_ref());
	let mut actual = NibblePath::new();
	let mut node = first;
	for child in rest {
		actual.append(node.path());
		let child_hash = child.canonical_hash::<H>();
		let index = match node {
			TrieNode::Branch(branch) => selector(branch, &child_hash, &actual, &key),
			TrieNode::Leaf(_) => None,
		};
		match index {
			Some(index) => {
				#[cfg(feature = "std")]
				log::trace!(
					target: TRACE_TARGET,
					"{:?} links {:?} at {:x}",
					ToHex(hash.as_ref()),
					ToHex(child_hash.as_ref()),
					index,
				);
				actual.push(index);
			},
			None => {
				#[cfg(feature = "std")]
				log::trace!(
					target: TRACE_TARGET,
					"{:?} does not link {:?}",
					ToHex(hash.as_ref()),
					ToHex(child_hash.as_ref()),
				);
				return ProofOutcome::UnlinkedNode
			},
		}
		node = child;
		hash = child_hash;
	}
	actual.append(node.path());

	#[cfg(feature = "std")]
	log::trace!(target: TRACE_TARGET, "path {:?} against key {:?}", actual, key);

	match node {
		TrieNode::Leaf(leaf) => {
			if actual.len() != key.len() || !key.starts_with(&actual) {
				return ProofOutcome::PathMismatch
			}
			if value == Some(&leaf.value) {
				ProofOutcome::ValidPositive
			} else {
				ProofOutcome::LeafValueMismatch
			}
		},
		TrieNode::Branch(branch) => {
			if actual.len() >= key.len() || !key.starts_with(&actual) {
				return ProofOutcome::PathMismatch
			}
			match (branch.link(key.at(actual.len())), value) {
				(Some(_), _) => ProofOutcome::Inconclusive,
				(None, None) => ProofOutcome::ValidNegative,
				(None, Some(_)) => ProofOutcome::LeafValueMismatch,
			}
		},
	}
}

/// Nibble of the link of `branch` leading to `child_hash`.
///
/// The key's own nibble wins when it links the child, so that a branch holding the
/// same child under several nibbles still resolves to the key. Otherwise the first
/// matching link is taken and the key is checked against the collected path later.
fn selector<HO: PartialEq>(
	branch: &BranchNode<HO>,
	child_hash: &HO,
	actual: &NibblePath,
	key: &NibbleSlice,
) -> Option<u8> {
	if actual.len() < key.len() && key.starts_with(actual) {
		let nibble = key.at(actual.len());
		if branch.link(nibble) == Some(child_hash) {
			return Some(nibble)
		}
	}
	branch.position_of(child_hash)
}
