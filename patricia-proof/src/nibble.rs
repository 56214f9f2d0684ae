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

//! Nibble oriented methods.

use crate::rstd::{iter, string::String};
#[cfg(feature = "std")]
use crate::rstd::fmt;
use smallvec::SmallVec;

/// Backing storage of a packed nibble path.
pub type BackingByteVec = SmallVec<[u8; 40]>;

/// Utility methods to work on radix 16 nibble.
pub mod nibble_ops {
	/// Single nibble length in bit.
	pub const BIT_PER_NIBBLE: usize = 4;
	/// Number of nibble per byte.
	pub const NIBBLE_PER_BYTE: usize = 2;
	/// Number of child for a branch (trie radix).
	pub const NIBBLE_LENGTH: usize = 16;
	/// Mask and right shift reading the nibble at each position of a byte.
	pub const PADDING_BITMASK: [(u8, usize); NIBBLE_PER_BYTE] = [(0xFF, 4), (0x0F, 0)];
	/// Hex-prefix flag set on the first encoded byte of a leaf path.
	pub const LEAF_FLAG: u8 = 0x20;
	/// Hex-prefix flag set on the first encoded byte of an odd length path.
	pub const ODD_FLAG: u8 = 0x10;

	/// Mask a byte, keeping only its left aligned nibble.
	#[inline(always)]
	pub fn pad_left(b: u8) -> u8 {
		b & !PADDING_BITMASK[1].0
	}

	/// Get u8 nibble value at a given index of a byte.
	#[inline(always)]
	pub fn at_left(ix: u8, b: u8) -> u8 {
		(b & PADDING_BITMASK[ix as usize].0) >> PADDING_BITMASK[ix as usize].1
	}

	/// Get u8 nibble value at a given index in a left aligned array.
	#[inline(always)]
	pub fn left_nibble_at(v1: &[u8], ix: usize) -> u8 {
		at_left((ix % NIBBLE_PER_BYTE) as u8, v1[ix / NIBBLE_PER_BYTE])
	}

	/// Push u8 nibble value at a given index into an existing byte.
	#[inline(always)]
	pub fn push_at_left(ix: u8, v: u8, into: u8) -> u8 {
		into | (v << PADDING_BITMASK[ix as usize].1)
	}

	/// Number of bytes needed to pack `nibble_count` nibbles.
	#[inline]
	pub fn packed_len(nibble_count: usize) -> usize {
		(nibble_count + NIBBLE_PER_BYTE - 1) / NIBBLE_PER_BYTE
	}

	/// Upper-case hex digit of a nibble.
	#[inline]
	pub fn to_hex_digit(nibble: u8) -> char {
		const DIGITS: &[u8; 16] = b"0123456789ABCDEF";
		DIGITS[(nibble & 0x0F) as usize] as char
	}
}

/// Nibble-orientated view onto a byte-slice, allowing nibble-precision offsets.
///
/// Used to read keys: the slice always ends on a byte boundary.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct NibbleSlice<'a> {
	data: &'a [u8],
	offset: usize,
}

impl<'a> NibbleSlice<'a> {
	/// Create a new nibble slice with the given byte-slice.
	pub fn new(data: &'a [u8]) -> Self {
		NibbleSlice::new_offset(data, 0)
	}

	/// Create a new nibble slice with the given byte-slice with a nibble offset.
	pub fn new_offset(data: &'a [u8], offset: usize) -> Self {
		NibbleSlice { data, offset }
	}

	/// Get the length (in nibbles, naturally) of this slice.
	#[inline]
	pub fn len(&self) -> usize {
		(self.data.len() * nibble_ops::NIBBLE_PER_BYTE).saturating_sub(self.offset)
	}

	/// Returns true if this slice has no nibbles.
	#[inline]
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Get the nibble at position `i`.
	#[inline(always)]
	pub fn at(&self, i: usize) -> u8 {
		nibble_ops::left_nibble_at(self.data, self.offset + i)
	}

	/// Return object which represents a view on to this slice (further) offset by `i` nibbles.
	pub fn mid(&self, i: usize) -> NibbleSlice<'a> {
		NibbleSlice { data: self.data, offset: self.offset + i }
	}

	/// Do we start with the same nibbles as the whole of `them`?
	pub fn starts_with(&self, them: &NibblePath) -> bool {
		self.len() >= them.len() && (0..them.len()).all(|i| self.at(i) == them.at(i))
	}

	/// Return an iterator over the nibbles of this slice.
	pub fn iter(&self) -> impl Iterator<Item = u8> + 'a {
		let slice = *self;
		(0..slice.len()).map(move |i| slice.at(i))
	}
}

#[cfg(feature = "std")]
impl<'a> fmt::Debug for NibbleSlice<'a> {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		for nibble in self.iter() {
			write!(f, "{:01x}", nibble)?;
		}
		Ok(())
	}
}

/// Owned sequence of nibbles, packed two per byte with the first nibble in the high half.
///
/// For an odd length the low half of the last byte is padding. Padding is kept
/// as given so that [`NibblePath::packed`] round-trips a serialized path, but it
/// never takes part in comparison or rendering.
#[derive(Clone, Default)]
pub struct NibblePath {
	inner: BackingByteVec,
	len: usize,
}

impl NibblePath {
	/// Make a new empty `NibblePath`.
	pub const fn new() -> Self {
		NibblePath { inner: SmallVec::new_const(), len: 0 }
	}

	/// Build from `len` nibbles packed in `packed`.
	///
	/// Returns `None` when `packed` is not exactly the packed size of `len` nibbles.
	pub fn from_packed(packed: &[u8], len: usize) -> Option<Self> {
		if packed.len() != nibble_ops::packed_len(len) {
			return None
		}
		Some(NibblePath::from_packed_exact(packed, len))
	}

	/// Build from `packed` when it is known to hold exactly `len` nibbles.
	pub(crate) fn from_packed_exact(packed: &[u8], len: usize) -> Self {
		debug_assert_eq!(packed.len(), nibble_ops::packed_len(len));
		NibblePath { inner: packed.into(), len }
	}

	/// Build from unpacked nibbles, one per item.
	pub fn from_nibbles<I: IntoIterator<Item = u8>>(nibbles: I) -> Self {
		let mut path = NibblePath::new();
		for nibble in nibbles {
			path.push(nibble);
		}
		path
	}

	/// Length of the `NibblePath`.
	#[inline(always)]
	pub fn len(&self) -> usize {
		self.len
	}

	/// Returns true if `NibblePath` has zero length.
	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	/// Try to get the nibble at the given offset.
	#[inline]
	pub fn at(&self, idx: usize) -> u8 {
		nibble_ops::left_nibble_at(&self.inner[..], idx)
	}

	/// Push a nibble onto the `NibblePath`. Ignores the high 4 bits.
	pub fn push(&mut self, nibble: u8) {
		let nibble = nibble & 0x0F;
		let i = self.len % nibble_ops::NIBBLE_PER_BYTE;
		if i == 0 {
			self.inner.push(nibble_ops::push_at_left(0, nibble, 0));
		} else if let Some(output) = self.inner.last_mut() {
			*output = nibble_ops::push_at_left(i as u8, nibble, nibble_ops::pad_left(*output));
		}
		self.len += 1;
	}

	/// Append another `NibblePath`.
	pub fn append(&mut self, v: &NibblePath) {
		if v.len == 0 {
			return
		}
		if self.len % nibble_ops::NIBBLE_PER_BYTE == 0 && v.len % nibble_ops::NIBBLE_PER_BYTE == 0 {
			self.inner.extend_from_slice(&v.inner[..]);
			self.len += v.len;
		} else {
			for nibble in v.iter() {
				self.push(nibble);
			}
		}
	}

	/// Packed bytes, padding included.
	pub fn packed(&self) -> &[u8] {
		&self.inner[..]
	}

	/// Return an iterator over the nibbles of this path.
	pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
		(0..self.len).map(move |i| self.at(i))
	}

	/// Do we start with the same nibbles as the whole of `them`?
	pub fn starts_with(&self, them: &NibblePath) -> bool {
		self.len >= them.len && (0..them.len).all(|i| self.at(i) == them.at(i))
	}

	/// Upper-case hex rendering, one character per nibble.
	pub fn to_hex(&self) -> String {
		self.iter().map(nibble_ops::to_hex_digit).collect()
	}

	/// Encode the path in prefixed hex notation, noting whether it `is_leaf`.
	///
	/// The first byte carries the leaf and odd flags in its high half, and the first
	/// nibble in its low half when the length is odd.
	pub fn encoded(&self, is_leaf: bool) -> BackingByteVec {
		let mut output = BackingByteVec::with_capacity(1 + self.len / nibble_ops::NIBBLE_PER_BYTE);
		let mut nibbles = self.iter();
		let mut first = if is_leaf { nibble_ops::LEAF_FLAG } else { 0 };
		if self.len % nibble_ops::NIBBLE_PER_BYTE == 1 {
			first |= nibble_ops::ODD_FLAG | nibbles.next().unwrap_or(0);
		}
		output.push(first);
		while let Some(high) = nibbles.next() {
			let low = nibbles.next().unwrap_or(0);
			output.push(nibble_ops::push_at_left(1, low, nibble_ops::push_at_left(0, high, 0)));
		}
		output
	}
}

impl PartialEq for NibblePath {
	fn eq(&self, them: &NibblePath) -> bool {
		self.len == them.len && self.iter().eq(them.iter())
	}
}

impl Eq for NibblePath {}

impl<'a> From<NibbleSlice<'a>> for NibblePath {
	fn from(s: NibbleSlice<'a>) -> Self {
		NibblePath::from_nibbles(s.iter())
	}
}

impl iter::FromIterator<u8> for NibblePath {
	fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
		NibblePath::from_nibbles(iter)
	}
}

#[cfg(feature = "std")]
impl fmt::Debug for NibblePath {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "NibblePath({})", self.to_hex())
	}
}
