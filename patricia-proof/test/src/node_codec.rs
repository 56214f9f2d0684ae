// Copyright 2021 Parity Technologies
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

use crate::fixtures::{NEGATIVE_PROOF, POSITIVE_PROOF, POSITIVE_PROOF_ODD};
use hex_literal::hex;
use patricia_proof::{decode_node, decode_nodes, encode_nodes, CodecError, NibblePath, TrieNode};
use reference_trie::RefHasher;
use sha3_hasher::Sha3Hash;

const ENCODED_EVEN_PATH: &str = "3CFD50029F6E1DEFD128D221EEACC5E1796E1AAA9C247204019CEFE3CA050E";
const ENCODED_ODD_PATH: &str = "3D93E37E8616665E4E5DA0CAF388172AB754CEE17FE702019228A996084F6E70";
const EVEN_PATH_HEX: &str = "FD50029F6E1DEFD128D221EEACC5E1796E1AAA9C247204019CEFE3CA050E";
const ODD_PATH_HEX: &str = "93E37E8616665E4E5DA0CAF388172AB754CEE17FE702019228A996084F6E7";

const ENCODED_BRANCH_LINKS: &str = concat!(
	"2615",
	"541A465385264D8C8AF8F16946B1FCFF37F5131E3F710119699D65587C39D5F2",
	"0DB344B8A1DD95EB3DB12C1BC150EE6657A8F440F8ADC6BEF724519D4403A58B",
	"5EC30C0C07151672EC8A9234FC12BE35F69B07CC4E69896E2D003905611E2126",
	"9DE0488DD979C15D1150FB5B2C87E64DC6E07A935EEDBC1850D21EBBE59DE0C8",
	"130B276733332C7CA5D059202F352FE4887D381301573A4789C622C29B4B4DE4",
	"88CEB3B43A69784787E791D703FF61D7C9EBE0F70719650F94BD39DD6D941C63",
);

const EVEN_LEAF_VALUE: &str = "3A50C5BF83CBA3370CF4E4AC0FC5A6FFB0E29501F66DA12DE25FFB13A419BA77";
const ODD_LEAF_VALUE: &str = "F48F12376B7C72F97E1533DE6DDB6F957DAB4F9031F959261AA2C5B655C864AA";

fn decode_hex(parts: &[&str]) -> Vec<u8> {
	array_bytes::hex2bytes(parts.concat()).unwrap()
}

fn decode_single(parts: &[&str]) -> TrieNode<Sha3Hash> {
	let mut nodes = decode_nodes::<RefHasher>(&decode_hex(parts)).unwrap();
	assert_eq!(nodes.len(), 1);
	nodes.remove(0)
}

fn default_branch_links() -> [Option<Sha3Hash>; 16] {
	let mut links = [None; 16];
	links[1] = Some(hex!("541A465385264D8C8AF8F16946B1FCFF37F5131E3F710119699D65587C39D5F2"));
	links[2] = Some(hex!("0DB344B8A1DD95EB3DB12C1BC150EE6657A8F440F8ADC6BEF724519D4403A58B"));
	links[5] = Some(hex!("5EC30C0C07151672EC8A9234FC12BE35F69B07CC4E69896E2D003905611E2126"));
	links[8] = Some(hex!("9DE0488DD979C15D1150FB5B2C87E64DC6E07A935EEDBC1850D21EBBE59DE0C8"));
	links[10] = Some(hex!("130B276733332C7CA5D059202F352FE4887D381301573A4789C622C29B4B4DE4"));
	links[12] = Some(hex!("88CEB3B43A69784787E791D703FF61D7C9EBE0F70719650F94BD39DD6D941C63"));
	links
}

#[test]
fn leaf_with_even_path() {
	let node = decode_single(&["FF", ENCODED_EVEN_PATH, EVEN_LEAF_VALUE]);
	let leaf = match &node {
		TrieNode::Leaf(leaf) => leaf,
		TrieNode::Branch(_) => panic!("expected a leaf"),
	};
	assert_eq!(leaf.path.len(), 60);
	assert_eq!(leaf.path.packed(), &array_bytes::hex2bytes(EVEN_PATH_HEX).unwrap()[..]);
	assert_eq!(node.hex_path(), EVEN_PATH_HEX);
	assert_eq!(
		leaf.value,
		hex!("3A50C5BF83CBA3370CF4E4AC0FC5A6FFB0E29501F66DA12DE25FFB13A419BA77"),
	);
	assert_eq!(
		node.canonical_hash::<RefHasher>(),
		hex!("9DE0488DD979C15D1150FB5B2C87E64DC6E07A935EEDBC1850D21EBBE59DE0C8"),
	);
}

#[test]
fn leaf_with_odd_path() {
	let node = decode_single(&["FF", ENCODED_ODD_PATH, ODD_LEAF_VALUE]);
	let leaf = match &node {
		TrieNode::Leaf(leaf) => leaf,
		TrieNode::Branch(_) => panic!("expected a leaf"),
	};
	assert_eq!(leaf.path.len(), 61);
	// the padding nibble is kept in the packed form, dropped from the hex form
	assert_eq!(leaf.path.packed(), &array_bytes::hex2bytes(&ENCODED_ODD_PATH[2..]).unwrap()[..]);
	assert_eq!(node.hex_path(), ODD_PATH_HEX);
	assert_eq!(
		leaf.value,
		hex!("F48F12376B7C72F97E1533DE6DDB6F957DAB4F9031F959261AA2C5B655C864AA"),
	);
	assert_eq!(
		node.canonical_hash::<RefHasher>(),
		hex!("89C46989937A631F9D5DE7936EAC12CA5924E37DE3336F2B158CFAC7AC377F60"),
	);
}

fn check_branch(node: &TrieNode<Sha3Hash>, path_len: usize, path_hex: &str, hash: Sha3Hash) {
	let branch = match node {
		TrieNode::Branch(branch) => branch,
		TrieNode::Leaf(_) => panic!("expected a branch"),
	};
	assert_eq!(branch.path.len(), path_len);
	assert_eq!(node.hex_path(), path_hex);
	assert_eq!(branch.links, default_branch_links());
	assert_eq!(branch.link_count(), 6);
	assert_eq!(node.canonical_hash::<RefHasher>(), hash);
}

#[test]
fn branch_with_no_path() {
	let node = decode_single(&["0000", ENCODED_BRANCH_LINKS]);
	assert!(node.path().packed().is_empty());
	check_branch(
		&node,
		0,
		"",
		hex!("57E684CC77BECEF30EAD8C81EC812374AB3FF6DB82E0842DFA6DA2AC7C897DEF"),
	);
}

#[test]
fn branch_with_even_path() {
	let node = decode_single(&["00", ENCODED_EVEN_PATH, ENCODED_BRANCH_LINKS]);
	check_branch(
		&node,
		60,
		EVEN_PATH_HEX,
		hex!("DD7BE080F4DEBC3ECA2CEEE49121CC2E8C159CF224E9FF6363AB5282E596697F"),
	);
}

#[test]
fn branch_with_odd_path() {
	let node = decode_single(&["00", ENCODED_ODD_PATH, ENCODED_BRANCH_LINKS]);
	check_branch(
		&node,
		61,
		ODD_PATH_HEX,
		hex!("78FAD74CE33005103D4948D94D3B648EFE702F6A507315327D4925D79D7B384E"),
	);
}

#[test]
fn unknown_marker() {
	let data = decode_hex(&["FE", ENCODED_EVEN_PATH, EVEN_LEAF_VALUE]);
	let err = decode_nodes::<RefHasher>(&data).unwrap_err();
	assert_eq!(err, CodecError::InvalidMarker { offset: 0, marker: 0xFE });
	assert!(err.to_string().starts_with("invalid marker of a serialized node"));
}

#[test]
fn truncated_record() {
	let data = decode_hex(&["FF", ENCODED_EVEN_PATH, EVEN_LEAF_VALUE]);
	for len in 1..data.len() {
		assert!(
			matches!(
				decode_nodes::<RefHasher>(&data[..len]),
				Err(CodecError::UnexpectedEndOfInput { .. })
			),
			"prefix of {} bytes",
			len,
		);
	}
}

#[test]
fn multiple_nodes_with_even_path() {
	let nodes =
		decode_nodes::<RefHasher>(&array_bytes::hex2bytes(POSITIVE_PROOF).unwrap()).unwrap();
	let hashes = nodes.iter().map(|n| n.canonical_hash::<RefHasher>()).collect::<Vec<_>>();
	assert_eq!(
		hashes,
		vec![
			hex!("7AA6503C54F63578FC4301E7EA785760FA7F6677A1DE322A9DE3BFA639BBF070"),
			hex!("B3FC1F206624E25A33A71B1E9F646D7FAD46B43DA110C3A144AF8E6A1ACE853D"),
			hex!("46A229B981BD2624101CC1C1E57BF1E78D806C3C7D7CE3550705733E53FA59BF"),
			hex!("180DBFCF9B96913B67596692688236DBCD987A43289B970AC3B2269F4601F441"),
			hex!("8E321E29839084810B0CD552497357ED73D07C200E09F338EBAA7053954D40E1"),
		],
	);
	assert!(nodes[4].is_leaf());
	assert_eq!(nodes[4].path().len(), 60);
}

#[test]
fn multiple_nodes_with_odd_path() {
	let nodes =
		decode_nodes::<RefHasher>(&array_bytes::hex2bytes(POSITIVE_PROOF_ODD).unwrap()).unwrap();
	let hashes = nodes.iter().map(|n| n.canonical_hash::<RefHasher>()).collect::<Vec<_>>();
	assert_eq!(
		hashes,
		vec![
			hex!("F4ACC6BAECD9CC5984591F34008F08EB5B50B14CE84BDD6EDC73F26F4C68C071"),
			hex!("997FAC2CC412C4A359241955390E02DF648D39EE8121578AC192F465C9EC1D41"),
			hex!("61F7C1393209E53D38189D28CD3A9C6D4325647F7D1D810994EE9CF1DB90718F"),
			hex!("DABE94628AFAC26C029C544A78FDC4649E26E2E2C6B61972B28DCE1974379B23"),
		],
	);
	assert!(nodes[3].is_leaf());
	assert_eq!(nodes[3].path().len(), 61);
}

#[test]
fn hash_does_not_depend_on_framing() {
	let data = array_bytes::hex2bytes(POSITIVE_PROOF).unwrap();
	let nodes = decode_nodes::<RefHasher>(&data).unwrap();
	let mut offset = 0;
	for node in nodes.iter() {
		let (alone, consumed) = decode_node::<RefHasher>(&data[offset..]).unwrap();
		let record = &data[offset..offset + consumed];
		assert_eq!(decode_nodes::<RefHasher>(record).unwrap(), vec![alone.clone()]);
		assert_eq!(alone.canonical_hash::<RefHasher>(), node.canonical_hash::<RefHasher>());
		offset += consumed;
	}
	assert_eq!(offset, data.len());
}

#[test]
fn proofs_encode_back_to_the_same_bytes() {
	for proof in [POSITIVE_PROOF, POSITIVE_PROOF_ODD, NEGATIVE_PROOF].iter() {
		let data = array_bytes::hex2bytes(proof).unwrap();
		let nodes = decode_nodes::<RefHasher>(&data).unwrap();
		assert_eq!(encode_nodes(&nodes).unwrap(), data);
	}
}

#[test]
fn built_nodes_round_trip() {
	let path = NibblePath::from_nibbles(vec![0xA, 0xB, 0xC]);
	let leaf: TrieNode<Sha3Hash> =
		patricia_proof::LeafNode { path: path.clone(), value: [0x11; 32] }.into();
	let mut links = [None; 16];
	links[0] = Some(leaf.canonical_hash::<RefHasher>());
	links[15] = Some([0x22; 32]);
	let branch: TrieNode<Sha3Hash> = patricia_proof::BranchNode { path, links }.into();

	let nodes = vec![branch, leaf];
	let data = encode_nodes(&nodes).unwrap();
	assert_eq!(data[0], patricia_proof::node_codec::BRANCH_NODE_MARKER);
	assert_eq!(&data[1..5], &[3, 0xAB, 0xC0, 0x01][..]);
	assert_eq!(data[5], 0x80);
	assert_eq!(decode_nodes::<RefHasher>(&data).unwrap(), nodes);
}
