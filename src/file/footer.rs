//! Footer construction/parsing (spec section 4.5, 6): the bridge between
//! this crate's physical schema / compression types and the Thrift structs
//! `parquet-format-safe` generates from the on-disk IDL.

use std::io::{Read, Write};

use parquet_format_safe::{
	thrift::protocol::{TCompactInputProtocol, TCompactOutputProtocol},
	ConvertedType as TConvertedType, FieldRepetitionType, FileMetaData, KeyValue, RowGroup, SchemaElement as TSchemaElement, Type as TType,
};

use crate::compression::Codec;
use crate::error::{ParquetCoreError, Result};
use crate::schema::physical::{ConvertedType, PhysicalType, Repetition, SchemaElement, SchemaTree};

fn thrift_err(e: impl std::fmt::Display) -> ParquetCoreError {
	ParquetCoreError::CorruptFile(format!("thrift error: {}", e))
}

pub fn write_footer<W: Write>(w: &mut W, metadata: &FileMetaData) -> Result<()> {
	let mut protocol = TCompactOutputProtocol::new(w);
	metadata.write_to_out_protocol(&mut protocol).map_err(thrift_err)
}

pub fn read_footer<R: Read>(r: &mut R) -> Result<FileMetaData> {
	let mut protocol = TCompactInputProtocol::new(r);
	FileMetaData::read_from_in_protocol(&mut protocol).map_err(thrift_err)
}

pub fn build_file_metadata(tree: &SchemaTree, row_groups: Vec<RowGroup>, num_rows: i64, created_by: String, key_value_metadata: Vec<(String, String)>) -> FileMetaData {
	let kv = if key_value_metadata.is_empty() {
		None
	} else {
		Some(key_value_metadata.into_iter().map(|(key, value)| KeyValue { key, value: Some(value) }).collect())
	};
	FileMetaData {
		version: 1,
		schema: to_thrift_schema(tree),
		num_rows,
		row_groups,
		key_value_metadata: kv,
		created_by: Some(created_by),
		column_orders: None,
		encryption_algorithm: None,
		footer_signing_key_metadata: None,
	}
}

pub fn to_thrift_schema(tree: &SchemaTree) -> Vec<TSchemaElement> {
	tree.elements.iter().map(to_thrift_element).collect()
}

fn to_thrift_element(el: &SchemaElement) -> TSchemaElement {
	TSchemaElement {
		type_: el.physical_type.map(to_thrift_type),
		type_length: el.type_length,
		repetition_type: el.repetition.map(to_thrift_repetition),
		name: el.name.clone(),
		num_children: if el.is_group() || el.num_children > 0 { Some(el.num_children as i32) } else { None },
		converted_type: el.converted_type.map(to_thrift_converted),
		scale: el.scale.map(|s| s as i32),
		precision: el.precision.map(|p| p as i32),
		field_id: None,
		logical_type: None,
	}
}

pub fn from_thrift_schema(elements: Vec<TSchemaElement>) -> Result<SchemaTree> {
	let converted: Vec<SchemaElement> = elements.iter().map(from_thrift_element).collect::<Result<Vec<_>>>()?;
	SchemaTree::from_elements(converted)
}

fn from_thrift_element(el: &TSchemaElement) -> Result<SchemaElement> {
	Ok(SchemaElement {
		name: el.name.clone(),
		repetition: el.repetition_type.map(from_thrift_repetition).transpose()?,
		physical_type: el.type_.map(from_thrift_type).transpose()?,
		converted_type: el.converted_type.map(from_thrift_converted).transpose()?,
		num_children: el.num_children.unwrap_or(0) as usize,
		type_length: el.type_length,
		precision: el.precision.map(|p| p as u32),
		scale: el.scale.map(|s| s as u32),
	})
}

pub fn to_thrift_type(t: PhysicalType) -> TType {
	match t {
		PhysicalType::Boolean => TType::BOOLEAN,
		PhysicalType::Int32 => TType::INT32,
		PhysicalType::Int64 => TType::INT64,
		PhysicalType::Int96 => TType::INT96,
		PhysicalType::Float => TType::FLOAT,
		PhysicalType::Double => TType::DOUBLE,
		PhysicalType::ByteArray => TType::BYTE_ARRAY,
		PhysicalType::FixedLenByteArray => TType::FIXED_LEN_BYTE_ARRAY,
	}
}

pub fn from_thrift_type(t: TType) -> Result<PhysicalType> {
	Ok(match t {
		TType::BOOLEAN => PhysicalType::Boolean,
		TType::INT32 => PhysicalType::Int32,
		TType::INT64 => PhysicalType::Int64,
		TType::INT96 => PhysicalType::Int96,
		TType::FLOAT => PhysicalType::Float,
		TType::DOUBLE => PhysicalType::Double,
		TType::BYTE_ARRAY => PhysicalType::ByteArray,
		TType::FIXED_LEN_BYTE_ARRAY => PhysicalType::FixedLenByteArray,
		other => return Err(ParquetCoreError::unsupported(format!("unrecognized physical type {:?}", other))),
	})
}

fn to_thrift_repetition(r: Repetition) -> FieldRepetitionType {
	match r {
		Repetition::Required => FieldRepetitionType::REQUIRED,
		Repetition::Optional => FieldRepetitionType::OPTIONAL,
		Repetition::Repeated => FieldRepetitionType::REPEATED,
	}
}

fn from_thrift_repetition(r: FieldRepetitionType) -> Result<Repetition> {
	Ok(match r {
		FieldRepetitionType::REQUIRED => Repetition::Required,
		FieldRepetitionType::OPTIONAL => Repetition::Optional,
		FieldRepetitionType::REPEATED => Repetition::Repeated,
		other => return Err(ParquetCoreError::unsupported(format!("unrecognized repetition type {:?}", other))),
	})
}

fn to_thrift_converted(c: ConvertedType) -> TConvertedType {
	match c {
		ConvertedType::Utf8 => TConvertedType::UTF8,
		ConvertedType::Map => TConvertedType::MAP,
		ConvertedType::MapKeyValue => TConvertedType::MAP_KEY_VALUE,
		ConvertedType::List => TConvertedType::LIST,
		ConvertedType::Enum => TConvertedType::ENUM,
		ConvertedType::Decimal => TConvertedType::DECIMAL,
		ConvertedType::Date => TConvertedType::DATE,
		ConvertedType::TimeMillis => TConvertedType::TIME_MILLIS,
		ConvertedType::TimeMicros => TConvertedType::TIME_MICROS,
		ConvertedType::TimestampMillis => TConvertedType::TIMESTAMP_MILLIS,
		ConvertedType::TimestampMicros => TConvertedType::TIMESTAMP_MICROS,
		ConvertedType::Uint8 => TConvertedType::UINT_8,
		ConvertedType::Uint16 => TConvertedType::UINT_16,
		ConvertedType::Uint32 => TConvertedType::UINT_32,
		ConvertedType::Uint64 => TConvertedType::UINT_64,
		ConvertedType::Int8 => TConvertedType::INT_8,
		ConvertedType::Int16 => TConvertedType::INT_16,
		ConvertedType::Int32 => TConvertedType::INT_32,
		ConvertedType::Int64 => TConvertedType::INT_64,
		ConvertedType::Json => TConvertedType::JSON,
		ConvertedType::Bson => TConvertedType::BSON,
		ConvertedType::Interval => TConvertedType::INTERVAL,
	}
}

fn from_thrift_converted(c: TConvertedType) -> Result<ConvertedType> {
	Ok(match c {
		TConvertedType::UTF8 => ConvertedType::Utf8,
		TConvertedType::MAP => ConvertedType::Map,
		TConvertedType::MAP_KEY_VALUE => ConvertedType::MapKeyValue,
		TConvertedType::LIST => ConvertedType::List,
		TConvertedType::ENUM => ConvertedType::Enum,
		TConvertedType::DECIMAL => ConvertedType::Decimal,
		TConvertedType::DATE => ConvertedType::Date,
		TConvertedType::TIME_MILLIS => ConvertedType::TimeMillis,
		TConvertedType::TIME_MICROS => ConvertedType::TimeMicros,
		TConvertedType::TIMESTAMP_MILLIS => ConvertedType::TimestampMillis,
		TConvertedType::TIMESTAMP_MICROS => ConvertedType::TimestampMicros,
		TConvertedType::UINT_8 => ConvertedType::Uint8,
		TConvertedType::UINT_16 => ConvertedType::Uint16,
		TConvertedType::UINT_32 => ConvertedType::Uint32,
		TConvertedType::UINT_64 => ConvertedType::Uint64,
		TConvertedType::INT_8 => ConvertedType::Int8,
		TConvertedType::INT_16 => ConvertedType::Int16,
		TConvertedType::INT_32 => ConvertedType::Int32,
		TConvertedType::INT_64 => ConvertedType::Int64,
		TConvertedType::JSON => ConvertedType::Json,
		TConvertedType::BSON => ConvertedType::Bson,
		TConvertedType::INTERVAL => ConvertedType::Interval,
		other => return Err(ParquetCoreError::unsupported(format!("unrecognized converted type {:?}", other))),
	})
}

pub fn to_thrift_codec(c: Codec) -> parquet_format_safe::CompressionCodec {
	use parquet_format_safe::CompressionCodec as TC;
	match c {
		Codec::Uncompressed => TC::UNCOMPRESSED,
		Codec::Snappy => TC::SNAPPY,
		Codec::Gzip => TC::GZIP,
		Codec::Brotli => TC::BROTLI,
		Codec::Lz4 => TC::LZ4_RAW,
		Codec::Zstd => TC::ZSTD,
	}
}

pub fn from_thrift_codec(c: parquet_format_safe::CompressionCodec) -> Result<Codec> {
	use parquet_format_safe::CompressionCodec as TC;
	Ok(match c {
		TC::UNCOMPRESSED => Codec::Uncompressed,
		TC::SNAPPY => Codec::Snappy,
		TC::GZIP => Codec::Gzip,
		TC::BROTLI => Codec::Brotli,
		TC::LZ4_RAW | TC::LZ4 => Codec::Lz4,
		TC::ZSTD => Codec::Zstd,
		other => return Err(ParquetCoreError::unsupported(format!("unsupported compression codec {:?}", other))),
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::schema::encode::encode_schema;
	use crate::schema::logical::*;

	#[test]
	fn schema_round_trips_through_thrift_shapes() {
		let schema = Schema::new(vec![
			Field::Data(DataField { name: "id".into(), logical_type: LogicalType::Int32, nullable: false, array: false }),
			Field::List(ListField {
				name: "categories".into(),
				element: Box::new(Field::Data(DataField { name: "element".into(), logical_type: LogicalType::Utf8, nullable: true, array: false })),
			}),
		]);
		let tree = encode_schema(&schema).unwrap();
		let thrift = to_thrift_schema(&tree);
		let back = from_thrift_schema(thrift).unwrap();
		assert_eq!(back.elements, tree.elements);
	}
}
