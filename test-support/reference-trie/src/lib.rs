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

//! Reference sparse Patricia trie, built in memory to produce proofs.
//!
//! Keys are hash sized. Leaves keep the rest of their key as path, branches keep the
//! nibbles shared by all keys below them, so there is no extension node and no value
//! in a branch.

use hash_db::Hasher;
use hashbrown::HashMap;
use patricia_proof::{
	encode_nodes, nibble_ops, state_hash, BranchNode, CodecError, LeafNode, NibblePath,
	NibbleSlice, TrieNode,
};
use std::{cmp, collections::BTreeMap};

/// Reference hasher.
pub type RefHasher = sha3_hasher::Sha3Hasher;

fn shared_prefix_len<T: Eq>(first: &[T], second: &[T]) -> usize {
	first
		.iter()
		.zip(second.iter())
		.position(|(f, s)| f != s)
		.unwrap_or_else(|| cmp::min(first.len(), second.len()))
}

/// A trie held as a map from node hash to node.
pub struct ReferenceTrie<H: Hasher> {
	nodes: HashMap<H::Out, TrieNode<H::Out>>,
	root: H::Out,
	len: usize,
}

impl<H: Hasher> ReferenceTrie<H> {
	/// Build the trie of `input`. The last value given for a key wins.
	pub fn new<I: IntoIterator<Item = (H::Out, H::Out)>>(input: I) -> Self {
		// sort and deduplicate on the nibble form of the key
		let input = input
			.into_iter()
			.map(|(k, v)| (NibbleSlice::new(k.as_ref()).iter().collect::<Vec<u8>>(), v))
			.collect::<BTreeMap<_, _>>()
			.into_iter()
			.collect::<Vec<_>>();

		let mut trie =
			ReferenceTrie { nodes: HashMap::new(), root: Default::default(), len: input.len() };
		if !input.is_empty() {
			trie.root = trie.build_node(&input, 0);
		}
		log::trace!(
			target: "reference-trie",
			"built {} entries into {} nodes",
			trie.len,
			trie.nodes.len(),
		);
		trie
	}

	/// Takes a sorted slice of key/value tuples where the key is a slice of nibbles,
	/// stores the node for the keys past `cursor` and returns its hash.
	fn build_node(&mut self, input: &[(Vec<u8>, H::Out)], cursor: usize) -> H::Out {
		let node = if input.len() == 1 {
			let (key, value) = &input[0];
			TrieNode::Leaf(LeafNode {
				path: NibblePath::from_nibbles(key[cursor..].iter().copied()),
				value: *value,
			})
		} else {
			let key = &input[0].0;
			let shared = input
				.iter()
				.skip(1)
				.fold(key.len(), |acc, (k, _)| cmp::min(shared_prefix_len(key, k), acc));

			let mut links = [None; nibble_ops::NIBBLE_LENGTH];
			let mut begin = 0;
			for (i, link) in links.iter_mut().enumerate() {
				let count =
					input[begin..].iter().take_while(|(k, _)| k[shared] == i as u8).count();
				if count > 0 {
					*link = Some(self.build_node(&input[begin..begin + count], shared + 1));
					begin += count;
				}
			}
			TrieNode::Branch(BranchNode {
				path: NibblePath::from_nibbles(key[cursor..shared].iter().copied()),
				links,
			})
		};
		let hash = node.canonical_hash::<H>();
		self.nodes.insert(hash, node);
		hash
	}

	/// Root hash, the zero hash for an empty trie.
	pub fn root(&self) -> H::Out {
		self.root
	}

	/// Number of distinct keys.
	pub fn len(&self) -> usize {
		self.len
	}

	/// Returns true if the trie holds no key.
	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	/// Number of stored nodes.
	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	/// Nodes from the root down, as far as `key` can be followed.
	///
	/// The walk stops at a leaf, at a branch whose path diverges from the key, or at a
	/// branch without a link for the next key nibble.
	pub fn generate_proof(&self, key: &H::Out) -> Vec<TrieNode<H::Out>> {
		let key = NibbleSlice::new(key.as_ref());
		let mut proof = Vec::new();
		let mut cursor = 0;
		let mut hash = self.root;
		while let Some(node) = self.nodes.get(&hash) {
			proof.push(node.clone());
			let branch = match node {
				TrieNode::Branch(branch) => branch,
				TrieNode::Leaf(_) => break,
			};
			if !key.mid(cursor).starts_with(&branch.path) {
				break
			}
			cursor += branch.path.len();
			if cursor >= key.len() {
				break
			}
			match branch.link(key.at(cursor)) {
				Some(child) => {
					hash = *child;
					cursor += 1;
				},
				None => break,
			}
		}
		proof
	}

	/// Serialized proof of `key`.
	pub fn encoded_proof(&self, key: &H::Out) -> Result<Vec<u8>, CodecError> {
		encode_nodes(&self.generate_proof(key))
	}

	/// Value stored under `key`.
	pub fn get(&self, key: &H::Out) -> Option<H::Out> {
		match self.generate_proof(key).pop() {
			Some(TrieNode::Leaf(leaf)) => {
				let nibbles = NibbleSlice::new(key.as_ref());
				let depth = nibbles.len() - leaf.path.len();
				if nibbles.mid(depth).starts_with(&leaf.path) {
					Some(leaf.value)
				} else {
					None
				}
			},
			_ => None,
		}
	}
}

/// An ordered forest of tries committed to by a single state hash.
pub struct ReferenceState<H: Hasher> {
	tries: Vec<ReferenceTrie<H>>,
}

impl<H: Hasher> ReferenceState<H> {
	/// Wrap `tries`, in commitment order.
	pub fn new(tries: Vec<ReferenceTrie<H>>) -> Self {
		ReferenceState { tries }
	}

	/// Roots of every trie.
	pub fn roots(&self) -> Vec<H::Out> {
		self.tries.iter().map(ReferenceTrie::root).collect()
	}

	/// Hash committing to the roots.
	pub fn state_hash(&self) -> H::Out {
		state_hash::<H>(&self.roots())
	}

	/// Trie at `index`.
	pub fn trie(&self, index: usize) -> &ReferenceTrie<H> {
		&self.tries[index]
	}

	/// Number of tries.
	pub fn len(&self) -> usize {
		self.tries.len()
	}

	/// Returns true if there is no trie.
	pub fn is_empty(&self) -> bool {
		self.tries.is_empty()
	}
}
