//! Dictionary encoding (PLAIN_DICTIONARY): maps a column's distinct values
//! to small integer indices, RLE/bit-packed hybrid encoded (spec 4.1, 4.4).

use crate::error::Result;
use crate::levels::Value;
use crate::primitive::rle::{bit_width_for_max, decode_hybrid, encode_hybrid};

/// A value that can live in a dictionary. `Value` doesn't implement `Eq`/`Hash`
/// (floats), so dictionaries key on this byte-exact wrapper instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum DictKey {
	Bool(bool),
	Int32(i32),
	Int64(i64),
	Int96([u32; 3]),
	Float32Bits(u32),
	Float64Bits(u64),
	Bytes(Vec<u8>),
}

fn dict_key(v: &Value) -> Option<DictKey> {
	Some(match v {
		Value::Bool(b) => DictKey::Bool(*b),
		Value::Int32(i) => DictKey::Int32(*i),
		Value::Int64(i) => DictKey::Int64(*i),
		Value::Int96(w) => DictKey::Int96(*w),
		Value::Float32(f) => DictKey::Float32Bits(f.to_bits()),
		Value::Float64(f) => DictKey::Float64Bits(f.to_bits()),
		Value::ByteArray(b) | Value::FixedLenByteArray(b) => DictKey::Bytes(b.clone()),
		_ => return None,
	})
}

/// A built dictionary: the ordered distinct values (the dictionary page
/// content) plus the index for each input value (the data page content).
pub struct Dictionary {
	pub distinct_values: Vec<Value>,
	pub indices: Vec<u32>,
}

/// Builds a dictionary for `values`, preserving first-seen order so the
/// dictionary page is deterministic for a given input.
pub fn build_dictionary(values: &[Value]) -> Option<Dictionary> {
	let mut distinct_values = Vec::new();
	let mut lookup: std::collections::HashMap<DictKey, u32> = std::collections::HashMap::new();
	let mut indices = Vec::with_capacity(values.len());
	for v in values {
		let key = dict_key(v)?;
		let idx = *lookup.entry(key).or_insert_with(|| {
			distinct_values.push(v.clone());
			(distinct_values.len() - 1) as u32
		});
		indices.push(idx);
	}
	Some(Dictionary { distinct_values, indices })
}

/// Heuristic from spec 4.4: dictionary-encode when distinct values are
/// fewer than 80% of the total and the dictionary itself stays under 2^20
/// entries.
pub fn should_use_dictionary(total: usize, distinct: usize) -> bool {
	if total == 0 {
		return false;
	}
	distinct < (total * 4) / 5 && distinct <= (1 << 20)
}

/// Encodes dictionary indices for the data-page-embedded form: one leading
/// byte giving the bit width, then the hybrid body with *no* length prefix
/// (spec 4.4: "no outer 4-byte length in the indices-in-data-page case").
pub fn encode_indices(indices: &[u32]) -> Vec<u8> {
	let max = indices.iter().copied().max().unwrap_or(0);
	let bit_width = bit_width_for_max(max as u64).max(1);
	let mut out = Vec::with_capacity(1 + indices.len());
	out.push(bit_width);
	out.extend(encode_hybrid(indices, bit_width));
	out
}

pub fn decode_indices(bytes: &[u8], count: usize) -> Result<Vec<u32>> {
	let bit_width = *bytes.first().unwrap_or(&0);
	decode_hybrid(&bytes[1.min(bytes.len())..], count, bit_width)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn repeated_values_build_small_dictionary() {
		let values = vec![Value::ByteArray(b"a".to_vec()), Value::ByteArray(b"b".to_vec()), Value::ByteArray(b"a".to_vec()), Value::ByteArray(b"a".to_vec())];
		let dict = build_dictionary(&values).unwrap();
		assert_eq!(dict.distinct_values.len(), 2);
		assert_eq!(dict.indices, vec![0, 1, 0, 0]);
	}

	#[test]
	fn indices_round_trip_through_hybrid_encoding() {
		let indices: Vec<u32> = vec![0, 1, 2, 0, 1, 2, 2, 2, 2, 2];
		let bytes = encode_indices(&indices);
		let back = decode_indices(&bytes, indices.len()).unwrap();
		assert_eq!(back, indices);
	}

	#[test]
	fn dictionary_heuristic_rejects_high_cardinality() {
		assert!(!should_use_dictionary(1000, 950));
		assert!(should_use_dictionary(1000, 100));
	}
}
