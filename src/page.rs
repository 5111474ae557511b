//! The page engine (spec section 4.4): assembles a dictionary page or a data
//! page's bytes, including the Thrift-serialized `PageHeader`.
//!
//! Thrift (de)serialization is treated the way the spec frames it (section
//! 1: "the Thrift transport for footer bytes ... an opaque capability") and
//! delegated to `parquet-format-safe`'s generated structs plus its compact
//! protocol implementation.

use std::io::{Read, Write};

use parquet_format_safe::{
	thrift::protocol::{TCompactInputProtocol, TCompactOutputProtocol},
	DataPageHeader, DictionaryPageHeader, Encoding, PageHeader, PageType, Statistics,
};

use crate::compression::{compress, decompress, Codec};
use crate::error::{ParquetCoreError, Result};
use crate::levels::Value;
use crate::primitive::{bit_width_for_max, encode_hybrid_with_length_prefix};
use crate::primitive::{decode_hybrid, encode_indices, encode_plain};
use crate::schema::physical::PhysicalType;

fn thrift_err(e: impl std::fmt::Display) -> ParquetCoreError {
	ParquetCoreError::CorruptFile(format!("thrift error: {}", e))
}

/// One assembled page's bytes plus the metadata the column-chunk writer
/// needs to record (encoding used, value count, byte sizes).
pub struct BuiltPage {
	pub bytes: Vec<u8>,
	pub encoding: Encoding,
	pub num_values: usize,
	pub uncompressed_size: usize,
}

/// Builds the dictionary page for a column's distinct values (spec 4.4).
pub fn build_dictionary_page(distinct_values: &[Value], physical_type: PhysicalType, type_length: Option<i32>, codec: Codec) -> Result<BuiltPage> {
	let plain = encode_plain(distinct_values, physical_type, type_length)?;
	let compressed = compress(codec, &plain)?;

	let header = PageHeader {
		type_: PageType::DICTIONARY_PAGE,
		uncompressed_page_size: plain.len() as i32,
		compressed_page_size: compressed.len() as i32,
		crc: None,
		data_page_header: None,
		index_page_header: None,
		dictionary_page_header: Some(DictionaryPageHeader { num_values: distinct_values.len() as i32, encoding: Encoding::PLAIN, is_sorted: None }),
		data_page_header_v2: None,
	};

	let mut out = Vec::new();
	write_page_header(&mut out, &header)?;
	out.extend_from_slice(&compressed);
	Ok(BuiltPage { bytes: out, encoding: Encoding::PLAIN_DICTIONARY, num_values: distinct_values.len(), uncompressed_size: plain.len() })
}

/// Builds one data page: level prefixes (if any), then either PLAIN values
/// or dictionary indices, all concatenated and compressed as one blob
/// (spec 4.4).
pub fn build_data_page(
	values: &[Value],
	dictionary_indices: Option<&[u32]>,
	definition_levels: &[i16],
	repetition_levels: &[i16],
	max_dl: i16,
	max_rl: i16,
	physical_type: PhysicalType,
	type_length: Option<i32>,
	codec: Codec,
) -> Result<BuiltPage> {
	let num_values = definition_levels.len().max(values.len());

	let mut uncompressed = Vec::new();
	if max_rl > 0 {
		let bw = bit_width_for_max(max_rl as u64);
		uncompressed.extend(encode_hybrid_with_length_prefix(&rep_to_u32(repetition_levels), bw)?);
	}
	if max_dl > 0 {
		let bw = bit_width_for_max(max_dl as u64);
		uncompressed.extend(encode_hybrid_with_length_prefix(&rep_to_u32(definition_levels), bw)?);
	}

	let encoding = if let Some(indices) = dictionary_indices {
		uncompressed.extend(encode_indices(indices));
		Encoding::PLAIN_DICTIONARY
	} else {
		uncompressed.extend(encode_plain(values, physical_type, type_length)?);
		Encoding::PLAIN
	};

	let compressed = compress(codec, &uncompressed)?;

	let header = PageHeader {
		type_: PageType::DATA_PAGE,
		uncompressed_page_size: uncompressed.len() as i32,
		compressed_page_size: compressed.len() as i32,
		crc: None,
		data_page_header: Some(DataPageHeader {
			num_values: num_values as i32,
			encoding,
			definition_level_encoding: Encoding::RLE,
			repetition_level_encoding: Encoding::RLE,
			statistics: Some(Statistics::default()),
		}),
		index_page_header: None,
		dictionary_page_header: None,
		data_page_header_v2: None,
	};

	let mut out = Vec::new();
	write_page_header(&mut out, &header)?;
	out.extend_from_slice(&compressed);
	Ok(BuiltPage { bytes: out, encoding, num_values, uncompressed_size: uncompressed.len() })
}

fn rep_to_u32(levels: &[i16]) -> Vec<u32> {
	levels.iter().map(|&l| l as u32).collect()
}

pub fn write_page_header(out: &mut Vec<u8>, header: &PageHeader) -> Result<()> {
	let mut protocol = TCompactOutputProtocol::new(out);
	header.write_to_out_protocol(&mut protocol).map_err(thrift_err)
}

pub fn read_page_header<R: Read>(reader: &mut R) -> Result<PageHeader> {
	let mut protocol = TCompactInputProtocol::new(reader);
	PageHeader::read_from_in_protocol(&mut protocol).map_err(thrift_err)
}

/// Reads back a data page's values given the already-parsed header.
pub struct DecodedDataPage {
	pub definition_levels: Vec<i16>,
	pub repetition_levels: Vec<i16>,
	pub values: Vec<Value>,
	pub dictionary_indices: Option<Vec<u32>>,
}

pub fn decode_data_page(
	header: &PageHeader,
	compressed: &[u8],
	max_dl: i16,
	max_rl: i16,
	physical_type: PhysicalType,
	type_length: Option<i32>,
	codec: Codec,
) -> Result<DecodedDataPage> {
	let data_header = header.data_page_header.as_ref().ok_or_else(|| ParquetCoreError::corrupt("DATA_PAGE header missing data_page_header"))?;
	let num_values = data_header.num_values as usize;
	let plain = decompress(codec, compressed, header.uncompressed_page_size as usize)?;

	let mut cursor = std::io::Cursor::new(plain.as_slice());
	let repetition_levels = if max_rl > 0 { read_length_prefixed_levels(&mut cursor, num_values, max_rl)? } else { Vec::new() };
	let definition_levels = if max_dl > 0 { read_length_prefixed_levels(&mut cursor, num_values, max_dl)? } else { Vec::new() };

	let present = if max_dl > 0 { definition_levels.iter().filter(|&&d| d == max_dl).count() } else { num_values };
	let mut rest = Vec::new();
	cursor.read_to_end(&mut rest).map_err(|_| ParquetCoreError::corrupt("truncated data page body"))?;

	match data_header.encoding {
		Encoding::PLAIN_DICTIONARY | Encoding::RLE_DICTIONARY => {
			let indices = crate::primitive::decode_indices(&rest, present)?;
			Ok(DecodedDataPage { definition_levels, repetition_levels, values: Vec::new(), dictionary_indices: Some(indices) })
		}
		_ => {
			let values = crate::primitive::decode_plain(&rest, present, physical_type, type_length)?;
			Ok(DecodedDataPage { definition_levels, repetition_levels, values, dictionary_indices: None })
		}
	}
}

fn read_length_prefixed_levels<R: Read>(reader: &mut R, count: usize, max_level: i16) -> Result<Vec<i16>> {
	use byteorder::{LittleEndian, ReadBytesExt};
	let len = reader.read_u32::<LittleEndian>().map_err(|_| ParquetCoreError::corrupt("truncated level stream length prefix"))? as usize;
	let mut body = vec![0u8; len];
	reader.read_exact(&mut body).map_err(|_| ParquetCoreError::corrupt("truncated level stream body"))?;
	let bw = bit_width_for_max(max_level as u64);
	let levels = decode_hybrid(&body, count, bw)?;
	levels
		.into_iter()
		.map(|l| {
			let l = l as i16;
			if l > max_level {
				Err(ParquetCoreError::corrupt(format!("level {} exceeds column max {}", l, max_level)))
			} else {
				Ok(l)
			}
		})
		.collect()
}

pub fn read_dictionary_page<R: Read>(header: &PageHeader, compressed: &[u8], physical_type: PhysicalType, type_length: Option<i32>, codec: Codec) -> Result<Vec<Value>> {
	let dict_header = header.dictionary_page_header.as_ref().ok_or_else(|| ParquetCoreError::corrupt("DICTIONARY_PAGE header missing dictionary_page_header"))?;
	let plain = decompress(codec, compressed, header.uncompressed_page_size as usize)?;
	crate::primitive::decode_plain(&plain, dict_header.num_values as usize, physical_type, type_length)
}
