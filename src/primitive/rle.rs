//! RLE/bit-packed hybrid (spec section 4.1): used for rep/def levels and
//! dictionary indices. Two run kinds share one stream, each self-describing
//! via a varint header whose low bit picks the kind.

use byteorder::{LittleEndian, WriteBytesExt};

use crate::error::{ParquetCoreError, Result};

/// Smallest `bit_width` that can hold `max_value` (spec: `ceil(log2(max_value + 1))`).
pub fn bit_width_for_max(max_value: u64) -> u8 {
	if max_value == 0 {
		return 0;
	}
	64 - max_value.leading_zeros() as u8
}

fn write_varint(out: &mut Vec<u8>, mut value: u64) {
	loop {
		let byte = (value & 0x7f) as u8;
		value >>= 7;
		if value == 0 {
			out.push(byte);
			break;
		}
		out.push(byte | 0x80);
	}
}

fn read_varint(bytes: &[u8], pos: &mut usize) -> Result<u64> {
	let mut result = 0u64;
	let mut shift = 0;
	loop {
		let byte = *bytes.get(*pos).ok_or_else(|| ParquetCoreError::corrupt("truncated varint in RLE stream"))?;
		*pos += 1;
		result |= ((byte & 0x7f) as u64) << shift;
		if byte & 0x80 == 0 {
			break;
		}
		shift += 7;
	}
	Ok(result)
}

/// Encodes `values` (already known to fit in `bit_width` bits each) as a
/// single RLE run if there's one contiguous value in `values`, else falls
/// back to a bit-packed run for the whole slice. Real writers mix run
/// kinds to chase file size; this encoder instead always chooses whichever
/// kind needs fewer bytes for the given buffer, which is enough to produce
/// a spec-conformant stream (mixing runs is an optimization, not a
/// correctness requirement: any legal partition round-trips the same way).
pub fn encode_hybrid(values: &[u32], bit_width: u8) -> Vec<u8> {
	let mut body = Vec::new();
	if bit_width == 0 {
		return body;
	}
	let mut i = 0;
	while i < values.len() {
		let run_start = i;
		while i + 1 < values.len() && values[i + 1] == values[run_start] {
			i += 1;
		}
		let run_len = i - run_start + 1;
		if run_len >= 8 {
			encode_rle_run(&mut body, values[run_start], run_len as u64, bit_width);
			i += 1;
		} else {
			let bp_start = run_start;
			let mut j = run_start;
			while j < values.len() {
				let mut k = j;
				while k + 1 < values.len() && values[k + 1] == values[k] {
					k += 1;
				}
				if k - j + 1 >= 8 {
					break;
				}
				j = k + 1;
			}
			encode_bit_packed_run(&mut body, &values[bp_start..j], bit_width);
			i = j;
		}
	}
	body
}

fn encode_rle_run(out: &mut Vec<u8>, value: u32, run_length: u64, bit_width: u8) {
	write_varint(out, run_length << 1);
	let num_bytes = ((bit_width as usize) + 7) / 8;
	let mut v = value;
	for _ in 0..num_bytes {
		out.push((v & 0xff) as u8);
		v >>= 8;
	}
}

fn encode_bit_packed_run(out: &mut Vec<u8>, values: &[u32], bit_width: u8) {
	let num_groups = (values.len() + 7) / 8;
	write_varint(out, ((num_groups as u64) << 1) | 1);
	let mut bit_buffer: u64 = 0;
	let mut bits_in_buffer = 0u32;
	let padded_len = num_groups * 8;
	for idx in 0..padded_len {
		let v = *values.get(idx).unwrap_or(&0) as u64;
		bit_buffer |= v << bits_in_buffer;
		bits_in_buffer += bit_width as u32;
		while bits_in_buffer >= 8 {
			out.push((bit_buffer & 0xff) as u8);
			bit_buffer >>= 8;
			bits_in_buffer -= 8;
		}
	}
	if bits_in_buffer > 0 {
		out.push((bit_buffer & 0xff) as u8);
	}
}

/// Decodes exactly `count` values from a hybrid stream at `bit_width`.
pub fn decode_hybrid(bytes: &[u8], count: usize, bit_width: u8) -> Result<Vec<u32>> {
	let mut out = Vec::with_capacity(count);
	if bit_width == 0 {
		out.resize(count, 0);
		return Ok(out);
	}
	let mut pos = 0usize;
	while out.len() < count {
		let header = read_varint(bytes, &mut pos)?;
		if header & 1 == 0 {
			let run_length = (header >> 1) as usize;
			let num_bytes = ((bit_width as usize) + 7) / 8;
			let mut v: u32 = 0;
			for b in 0..num_bytes {
				let byte = *bytes.get(pos + b).ok_or_else(|| ParquetCoreError::corrupt("truncated RLE run payload"))?;
				v |= (byte as u32) << (8 * b);
			}
			pos += num_bytes;
			out.extend(std::iter::repeat(v).take(run_length));
		} else {
			let num_groups = (header >> 1) as usize;
			let total = num_groups * 8;
			let total_bytes = (total * bit_width as usize + 7) / 8;
			let slice = bytes.get(pos..pos + total_bytes).ok_or_else(|| ParquetCoreError::corrupt("truncated bit-packed run payload"))?;
			pos += total_bytes;
			let mut bit_buffer: u64 = 0;
			let mut bits_in_buffer = 0u32;
			let mut byte_idx = 0usize;
			for _ in 0..total {
				while bits_in_buffer < bit_width as u32 {
					bit_buffer |= (*slice.get(byte_idx).unwrap_or(&0) as u64) << bits_in_buffer;
					bits_in_buffer += 8;
					byte_idx += 1;
				}
				let mask = (1u64 << bit_width) - 1;
				out.push((bit_buffer & mask) as u32);
				bit_buffer >>= bit_width;
				bits_in_buffer -= bit_width as u32;
			}
		}
	}
	out.truncate(count);
	Ok(out)
}

/// Wraps a hybrid-encoded body with the 4-byte little-endian length prefix
/// used for rep/def level streams in a data page.
pub fn encode_hybrid_with_length_prefix(values: &[u32], bit_width: u8) -> Result<Vec<u8>> {
	let body = encode_hybrid(values, bit_width);
	let mut out = Vec::with_capacity(body.len() + 4);
	out.write_u32::<LittleEndian>(body.len() as u32)?;
	out.extend_from_slice(&body);
	Ok(out)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn bit_width_matches_spec_formula() {
		assert_eq!(bit_width_for_max(0), 0);
		assert_eq!(bit_width_for_max(1), 1);
		assert_eq!(bit_width_for_max(3), 2);
		assert_eq!(bit_width_for_max(4), 3);
		assert_eq!(bit_width_for_max(255), 8);
	}

	#[test]
	fn run_of_repeats_round_trips() {
		let values = vec![2u32; 20];
		let bytes = encode_hybrid(&values, bit_width_for_max(2));
		let back = decode_hybrid(&bytes, 20, bit_width_for_max(2)).unwrap();
		assert_eq!(back, values);
	}

	#[test]
	fn bit_packed_run_round_trips() {
		let values: Vec<u32> = (0..17).map(|i| i % 3).collect();
		let bw = bit_width_for_max(2);
		let bytes = encode_hybrid(&values, bw);
		let back = decode_hybrid(&bytes, values.len(), bw).unwrap();
		assert_eq!(back, values);
	}

	#[test]
	fn mixed_runs_round_trip() {
		let mut values = vec![1u32; 12];
		values.extend((0..11).map(|i| i % 2));
		values.extend(vec![0u32; 9]);
		let bw = bit_width_for_max(1);
		let bytes = encode_hybrid(&values, bw);
		let back = decode_hybrid(&bytes, values.len(), bw).unwrap();
		assert_eq!(back, values);
	}

	#[test]
	fn zero_bit_width_emits_no_payload() {
		let values = vec![0u32; 5];
		let bytes = encode_hybrid(&values, 0);
		assert!(bytes.is_empty());
		let back = decode_hybrid(&bytes, 5, 0).unwrap();
		assert_eq!(back, values);
	}
}
