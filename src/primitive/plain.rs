//! PLAIN encoding (spec section 4.1): the fixed/variable-width byte layout
//! every other encoding in this crate is defined relative to.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::Read;

use crate::error::{ParquetCoreError, Result};
use crate::levels::Value;
use crate::schema::physical::PhysicalType;

/// Appends the PLAIN encoding of `value` to `out`. `type_length` is the
/// declared byte width for `FixedLenByteArray`; ignored otherwise.
pub fn encode_one(out: &mut Vec<u8>, value: &Value, type_length: Option<i32>) -> Result<()> {
	match value {
		Value::Bool(_) => encode_bool_run(out, std::slice::from_ref(value)),
		Value::Int32(v) => out.write_i32::<LittleEndian>(*v).map_err(Into::into),
		Value::Int64(v) => out.write_i64::<LittleEndian>(*v).map_err(Into::into),
		Value::Int96(words) => {
			for w in words {
				out.write_u32::<LittleEndian>(*w)?;
			}
			Ok(())
		}
		Value::Float32(v) => out.write_f32::<LittleEndian>(*v).map_err(Into::into),
		Value::Float64(v) => out.write_f64::<LittleEndian>(*v).map_err(Into::into),
		Value::ByteArray(bytes) => {
			out.write_u32::<LittleEndian>(bytes.len() as u32)?;
			out.extend_from_slice(bytes);
			Ok(())
		}
		Value::FixedLenByteArray(bytes) => {
			if let Some(len) = type_length {
				if bytes.len() != len as usize {
					return Err(ParquetCoreError::invalid_argument(format!(
						"fixed_len_byte_array has {} bytes, schema declares {}",
						bytes.len(),
						len
					)));
				}
			}
			out.extend_from_slice(bytes);
			Ok(())
		}
		other => Err(ParquetCoreError::invalid_argument(format!("{:?} is not a PLAIN-encodable scalar", other))),
	}
}

/// Encodes a run of values sharing one physical type, as stored densely in
/// a page (no level information here: that's the level packer's job).
pub fn encode_plain(values: &[Value], physical_type: PhysicalType, type_length: Option<i32>) -> Result<Vec<u8>> {
	if physical_type == PhysicalType::Boolean {
		let mut out = Vec::new();
		encode_bool_run(&mut out, values)?;
		return Ok(out);
	}
	let mut out = Vec::with_capacity(values.len() * 4);
	for v in values {
		encode_one(&mut out, v, type_length)?;
	}
	Ok(out)
}

fn encode_bool_run(out: &mut Vec<u8>, values: &[Value]) -> Result<()> {
	for chunk in values.chunks(8) {
		let mut byte = 0u8;
		for (i, v) in chunk.iter().enumerate() {
			let Value::Bool(b) = v else {
				return Err(ParquetCoreError::invalid_argument("expected a bool value"));
			};
			if *b {
				byte |= 1 << i;
			}
		}
		out.push(byte);
	}
	Ok(())
}

/// Decodes `count` PLAIN-encoded values of `physical_type` from `bytes`.
pub fn decode_plain(bytes: &[u8], count: usize, physical_type: PhysicalType, type_length: Option<i32>) -> Result<Vec<Value>> {
	let mut cursor = std::io::Cursor::new(bytes);
	let mut out = Vec::with_capacity(count);
	match physical_type {
		PhysicalType::Boolean => {
			let mut byte = 0u8;
			for i in 0..count {
				if i % 8 == 0 {
					byte = cursor.read_u8().map_err(|_| ParquetCoreError::corrupt("truncated PLAIN boolean page"))?;
				}
				out.push(Value::Bool((byte >> (i % 8)) & 1 == 1));
			}
		}
		PhysicalType::Int32 => {
			for _ in 0..count {
				out.push(Value::Int32(cursor.read_i32::<LittleEndian>().map_err(|_| ParquetCoreError::corrupt("truncated PLAIN int32 page"))?));
			}
		}
		PhysicalType::Int64 => {
			for _ in 0..count {
				out.push(Value::Int64(cursor.read_i64::<LittleEndian>().map_err(|_| ParquetCoreError::corrupt("truncated PLAIN int64 page"))?));
			}
		}
		PhysicalType::Int96 => {
			for _ in 0..count {
				let mut words = [0u32; 3];
				for w in words.iter_mut() {
					*w = cursor.read_u32::<LittleEndian>().map_err(|_| ParquetCoreError::corrupt("truncated PLAIN int96 page"))?;
				}
				out.push(Value::Int96(words));
			}
		}
		PhysicalType::Float => {
			for _ in 0..count {
				out.push(Value::Float32(cursor.read_f32::<LittleEndian>().map_err(|_| ParquetCoreError::corrupt("truncated PLAIN float page"))?));
			}
		}
		PhysicalType::Double => {
			for _ in 0..count {
				out.push(Value::Float64(cursor.read_f64::<LittleEndian>().map_err(|_| ParquetCoreError::corrupt("truncated PLAIN double page"))?));
			}
		}
		PhysicalType::ByteArray => {
			for _ in 0..count {
				let len = cursor.read_u32::<LittleEndian>().map_err(|_| ParquetCoreError::corrupt("truncated PLAIN byte_array length"))? as usize;
				let mut buf = vec![0u8; len];
				cursor.read_exact(&mut buf).map_err(|_| ParquetCoreError::corrupt("truncated PLAIN byte_array payload"))?;
				out.push(Value::ByteArray(buf));
			}
		}
		PhysicalType::FixedLenByteArray => {
			let len = type_length.ok_or_else(|| ParquetCoreError::corrupt("fixed_len_byte_array page with no declared length"))? as usize;
			for _ in 0..count {
				let mut buf = vec![0u8; len];
				cursor.read_exact(&mut buf).map_err(|_| ParquetCoreError::corrupt("truncated PLAIN fixed_len_byte_array payload"))?;
				out.push(Value::FixedLenByteArray(buf));
			}
		}
	}
	Ok(out)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn int32_round_trips() {
		let values = vec![Value::Int32(1), Value::Int32(-2), Value::Int32(i32::MAX)];
		let bytes = encode_plain(&values, PhysicalType::Int32, None).unwrap();
		assert_eq!(bytes.len(), 12);
		let back = decode_plain(&bytes, 3, PhysicalType::Int32, None).unwrap();
		assert_eq!(back, values);
	}

	#[test]
	fn byte_array_round_trips() {
		let values = vec![Value::ByteArray(b"record#1".to_vec()), Value::ByteArray(b"".to_vec())];
		let bytes = encode_plain(&values, PhysicalType::ByteArray, None).unwrap();
		let back = decode_plain(&bytes, 2, PhysicalType::ByteArray, None).unwrap();
		assert_eq!(back, values);
	}

	#[test]
	fn bool_packs_eight_per_byte() {
		let values: Vec<Value> = (0..10).map(|i| Value::Bool(i % 3 == 0)).collect();
		let bytes = encode_plain(&values, PhysicalType::Boolean, None).unwrap();
		assert_eq!(bytes.len(), 2);
		let back = decode_plain(&bytes, 10, PhysicalType::Boolean, None).unwrap();
		assert_eq!(back, values);
	}

	#[test]
	fn fixed_len_byte_array_rejects_wrong_width() {
		let mut out = Vec::new();
		let err = encode_one(&mut out, &Value::FixedLenByteArray(vec![1, 2, 3]), Some(4));
		assert!(err.is_err());
	}
}
