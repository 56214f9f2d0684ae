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

//! Trie nodes as carried by a proof.

use crate::{
	nibble::{nibble_ops, NibblePath},
	rstd::{string::String, vec::Vec},
};
use hash_db::Hasher;

/// Terminal node holding the value committed under its key.
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(Debug))]
pub struct LeafNode<HO> {
	/// Remaining key nibbles consumed by this node.
	pub path: NibblePath,
	/// Committed value.
	pub value: HO,
}

/// Interior node with up to one child per nibble.
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(Debug))]
pub struct BranchNode<HO> {
	/// Key nibbles shared by every key below this node.
	pub path: NibblePath,
	/// `links[i]` is the hash of the child reached by nibble `i`.
	pub links: [Option<HO>; nibble_ops::NIBBLE_LENGTH],
}

impl<HO: PartialEq> BranchNode<HO> {
	/// Child hash at `index`, if any.
	pub fn link(&self, index: u8) -> Option<&HO> {
		self.links.get(index as usize).and_then(Option::as_ref)
	}

	/// Number of present links.
	pub fn link_count(&self) -> usize {
		self.links.iter().filter(|l| l.is_some()).count()
	}

	/// Nibble of the first link equal to `hash`.
	pub fn position_of(&self, hash: &HO) -> Option<u8> {
		self.links.iter().position(|l| l.as_ref() == Some(hash)).map(|i| i as u8)
	}
}

/// A proof node.
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(Debug))]
pub enum TrieNode<HO> {
	/// Leaf node.
	Leaf(LeafNode<HO>),
	/// Branch node.
	Branch(BranchNode<HO>),
}

impl<HO> TrieNode<HO> {
	/// Key nibbles held by the node.
	pub fn path(&self) -> &NibblePath {
		match self {
			TrieNode::Leaf(leaf) => &leaf.path,
			TrieNode::Branch(branch) => &branch.path,
		}
	}

	/// Upper-case hex view of the path.
	pub fn hex_path(&self) -> String {
		self.path().to_hex()
	}

	/// Is this a leaf node.
	pub fn is_leaf(&self) -> bool {
		matches!(self, TrieNode::Leaf(_))
	}
}

impl<HO: AsRef<[u8]> + Default> TrieNode<HO> {
	/// Bytes the node hash is computed over.
	///
	/// Hex-prefix encoded path, then the value for a leaf, or all sixteen links
	/// for a branch with absent links written as zero hashes.
	pub fn canonical_encoding(&self) -> Vec<u8> {
		match self {
			TrieNode::Leaf(leaf) => {
				let path = leaf.path.encoded(true);
				let mut output = Vec::with_capacity(path.len() + leaf.value.as_ref().len());
				output.extend_from_slice(&path[..]);
				output.extend_from_slice(leaf.value.as_ref());
				output
			},
			TrieNode::Branch(branch) => {
				let path = branch.path.encoded(false);
				let empty = HO::default();
				let mut output = Vec::with_capacity(
					path.len() + nibble_ops::NIBBLE_LENGTH * empty.as_ref().len(),
				);
				output.extend_from_slice(&path[..]);
				for link in branch.links.iter() {
					output.extend_from_slice(link.as_ref().unwrap_or(&empty).as_ref());
				}
				output
			},
		}
	}

	/// Hash of [`TrieNode::canonical_encoding`].
	pub fn canonical_hash<H: Hasher<Out = HO>>(&self) -> HO {
		H::hash(&self.canonical_encoding())
	}
}

impl<HO> From<LeafNode<HO>> for TrieNode<HO> {
	fn from(leaf: LeafNode<HO>) -> Self {
		TrieNode::Leaf(leaf)
	}
}

impl<HO> From<BranchNode<HO>> for TrieNode<HO> {
	fn from(branch: BranchNode<HO>) -> Self {
		TrieNode::Branch(branch)
	}
}
