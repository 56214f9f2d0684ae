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

//! Serialization of proof nodes.
//!
//! A proof is a plain concatenation of node records:
//!
//! - one marker byte, [`LEAF_NODE_MARKER`] or [`BRANCH_NODE_MARKER`],
//! - one byte holding the number of path nibbles,
//! - the packed path nibbles,
//! - for a leaf, the value hash,
//! - for a branch, a little-endian bitmap of present links followed by one hash per
//!   set bit in ascending order.

use crate::{
	nibble::{nibble_ops, NibblePath},
	node::{BranchNode, LeafNode, TrieNode},
	rstd::vec::Vec,
};
#[cfg(feature = "std")]
use crate::rstd::fmt;
use hash_db::Hasher;

/// Marker of a serialized leaf node.
pub const LEAF_NODE_MARKER: u8 = 0xFF;
/// Marker of a serialized branch node.
pub const BRANCH_NODE_MARKER: u8 = 0x00;
/// Length of a 16 element bitmap.
pub const BITMAP_LENGTH: usize = 2;
/// Longest path a record can describe.
pub const NIBBLE_SIZE_BOUND: usize = u8::max_value() as usize;

/// Error decoding or encoding node records.
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(Debug))]
pub enum Error {
	/// A record starts with a byte that is neither a leaf nor a branch marker.
	InvalidMarker {
		/// Position of the marker in the input.
		offset: usize,
		/// Byte found.
		marker: u8,
	},
	/// The input ends in the middle of a record.
	UnexpectedEndOfInput {
		/// Position of the missing field in the input.
		offset: usize,
		/// Bytes the field needs.
		needed: usize,
		/// Bytes left in the input.
		remaining: usize,
	},
	/// A path is too long to be serialized.
	PathTooLong(usize),
}

#[cfg(feature = "std")]
impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match *self {
			Error::InvalidMarker { offset, marker } => write!(
				f,
				"invalid marker of a serialized node: {:#04x} at offset {}",
				marker, offset
			),
			Error::UnexpectedEndOfInput { offset, needed, remaining } => write!(
				f,
				"unexpected end of serialized node at offset {}: needed {} bytes, {} remaining",
				offset, needed, remaining
			),
			Error::PathTooLong(len) =>
				write!(f, "path of {} nibbles exceeds {} nibbles", len, NIBBLE_SIZE_BOUND),
		}
	}
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Bitmap of the present links of a branch.
#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(Debug))]
pub(crate) struct Bitmap(u16);

impl Bitmap {
	pub(crate) fn decode(data: &[u8; BITMAP_LENGTH]) -> Self {
		Bitmap(u16::from_le_bytes(*data))
	}

	pub(crate) fn value_at(&self, i: usize) -> bool {
		self.0 & (1u16 << i) != 0
	}

	pub(crate) fn encode<I: Iterator<Item = bool>>(has_children: I) -> [u8; BITMAP_LENGTH] {
		let mut bitmap: u16 = 0;
		let mut cursor: u16 = 1;
		for v in has_children {
			if v {
				bitmap |= cursor
			}
			cursor <<= 1;
		}
		bitmap.to_le_bytes()
	}
}

struct ByteSliceInput<'a> {
	data: &'a [u8],
	offset: usize,
}

impl<'a> ByteSliceInput<'a> {
	fn new(data: &'a [u8]) -> Self {
		ByteSliceInput { data, offset: 0 }
	}

	fn remaining_len(&self) -> usize {
		self.data.len() - self.offset
	}

	fn take(&mut self, count: usize) -> Result<&'a [u8], Error> {
		if self.remaining_len() < count {
			return Err(Error::UnexpectedEndOfInput {
				offset: self.offset,
				needed: count,
				remaining: self.remaining_len(),
			})
		}
		let data = &self.data[self.offset..self.offset + count];
		self.offset += count;
		Ok(data)
	}

	fn read_byte(&mut self) -> Result<u8, Error> {
		self.take(1).map(|b| b[0])
	}

	fn decode_hash<H: Hasher>(&mut self) -> Result<H::Out, Error> {
		let mut hash = H::Out::default();
		hash.as_mut().copy_from_slice(self.take(H::LENGTH)?);
		Ok(hash)
	}

	fn decode_path(&mut self) -> Result<NibblePath, Error> {
		let nibble_count = self.read_byte()? as usize;
		let packed = self.take(nibble_ops::packed_len(nibble_count))?;
		Ok(NibblePath::from_packed_exact(packed, nibble_count))
	}

	fn decode_node<H: Hasher>(&mut self) -> Result<TrieNode<H::Out>, Error> {
		let offset = self.offset;
		match self.read_byte()? {
			LEAF_NODE_MARKER => {
				let path = self.decode_path()?;
				let value = self.decode_hash::<H>()?;
				Ok(TrieNode::Leaf(LeafNode { path, value }))
			},
			BRANCH_NODE_MARKER => {
				let path = self.decode_path()?;
				let mut bitmap = [0u8; BITMAP_LENGTH];
				bitmap.copy_from_slice(self.take(BITMAP_LENGTH)?);
				let bitmap = Bitmap::decode(&bitmap);
				let mut links = [None; nibble_ops::NIBBLE_LENGTH];
				for (i, link) in links.iter_mut().enumerate() {
					if bitmap.value_at(i) {
						*link = Some(self.decode_hash::<H>()?);
					}
				}
				Ok(TrieNode::Branch(BranchNode { path, links }))
			},
			marker => Err(Error::InvalidMarker { offset, marker }),
		}
	}
}

/// Decode the first record of `data`, returning the node and the number of bytes read.
pub fn decode_node<H: Hasher>(data: &[u8]) -> Result<(TrieNode<H::Out>, usize), Error> {
	let mut input = ByteSliceInput::new(data);
	let node = input.decode_node::<H>()?;
	Ok((node, input.offset))
}

/// Decode a buffer of back-to-back records, in order.
///
/// An empty buffer decodes to no node. Any malformed record fails the whole buffer.
pub fn decode_nodes<H: Hasher>(data: &[u8]) -> Result<Vec<TrieNode<H::Out>>, Error> {
	let mut input = ByteSliceInput::new(data);
	let mut nodes = Vec::new();
	while input.remaining_len() > 0 {
		nodes.push(input.decode_node::<H>()?);
	}
	log::trace!(
		target: "patricia-proof",
		"decoded {} nodes from {} bytes",
		nodes.len(),
		data.len(),
	);
	Ok(nodes)
}

fn encode_path(path: &NibblePath, output: &mut Vec<u8>) -> Result<(), Error> {
	if path.len() > NIBBLE_SIZE_BOUND {
		return Err(Error::PathTooLong(path.len()))
	}
	output.push(path.len() as u8);
	output.extend_from_slice(path.packed());
	Ok(())
}

/// Append the record of `node` to `output`.
pub fn encode_node<HO: AsRef<[u8]>>(
	node: &TrieNode<HO>,
	output: &mut Vec<u8>,
) -> Result<(), Error> {
	match node {
		TrieNode::Leaf(leaf) => {
			output.push(LEAF_NODE_MARKER);
			encode_path(&leaf.path, output)?;
			output.extend_from_slice(leaf.value.as_ref());
		},
		TrieNode::Branch(branch) => {
			output.push(BRANCH_NODE_MARKER);
			encode_path(&branch.path, output)?;
			output.extend_from_slice(&Bitmap::encode(branch.links.iter().map(Option::is_some))[..]);
			for link in branch.links.iter().flatten() {
				output.extend_from_slice(link.as_ref());
			}
		},
	}
	Ok(())
}

/// Concatenate the records of `nodes`.
pub fn encode_nodes<HO: AsRef<[u8]>>(nodes: &[TrieNode<HO>]) -> Result<Vec<u8>, Error> {
	let mut output = Vec::new();
	for node in nodes {
		encode_node(node, &mut output)?;
	}
	Ok(output)
}
