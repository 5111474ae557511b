//! Logical -> physical schema encoding (spec section 4.2 "Encode").

use crate::error::{ParquetCoreError, Result};
use crate::schema::logical::{DataField, Field, LogicalType, Schema, TimeUnit};
use crate::schema::physical::{ConvertedType, PhysicalType, Repetition, SchemaElement, SchemaTree};

/// Builds the flat physical schema (including the element-0 root group) for
/// a logical [`Schema`].
pub fn encode_schema(schema: &Schema) -> Result<SchemaTree> {
	let mut elements = vec![SchemaElement::root(schema.fields.len())];
	for field in &schema.fields {
		encode_field(field, &mut elements)?;
	}
	SchemaTree::from_elements(elements)
}

fn encode_field(field: &Field, out: &mut Vec<SchemaElement>) -> Result<()> {
	match field {
		Field::Data(d) if d.array => encode_array_shorthand(d, out),
		Field::Data(d) => {
			let (physical_type, converted_type, type_length, precision, scale) = physical_repr(&d.logical_type)?;
			let mut el = SchemaElement::primitive(
				d.name.clone(),
				if d.nullable { Repetition::Optional } else { Repetition::Required },
				physical_type,
				converted_type,
			);
			el.type_length = type_length;
			el.precision = precision;
			el.scale = scale;
			out.push(el);
			Ok(())
		}
		Field::Struct(s) => {
			out.push(SchemaElement::group(s.name.clone(), Repetition::Optional, s.children.len(), None));
			for c in &s.children {
				encode_field(c, out)?;
			}
			Ok(())
		}
		Field::List(l) => {
			out.push(SchemaElement::group(l.name.clone(), Repetition::Optional, 1, Some(ConvertedType::List)));
			out.push(SchemaElement::group("list", Repetition::Repeated, 1, None));
			encode_field(&l.element, out)
		}
		Field::Map(m) => {
			out.push(SchemaElement::group(m.name.clone(), Repetition::Optional, 1, Some(ConvertedType::Map)));
			out.push(SchemaElement::group("key_value", Repetition::Repeated, 2, Some(ConvertedType::MapKeyValue)));
			encode_map_key(&m.key, out)?;
			encode_field(&m.value, out)
		}
	}
}

/// A data field with `array == true` is shorthand for a non-nullable list of
/// a (possibly-nullable) scalar (spec section 3: "a syntactic convenience
/// for a single-level repeated scalar").
fn encode_array_shorthand(d: &DataField, out: &mut Vec<SchemaElement>) -> Result<()> {
	out.push(SchemaElement::group(d.name.clone(), Repetition::Optional, 1, Some(ConvertedType::List)));
	out.push(SchemaElement::group("list", Repetition::Repeated, 1, None));
	let (physical_type, converted_type, type_length, precision, scale) = physical_repr(&d.logical_type)?;
	let mut el = SchemaElement::primitive(
		"element",
		if d.nullable { Repetition::Optional } else { Repetition::Required },
		physical_type,
		converted_type,
	);
	el.type_length = type_length;
	el.precision = precision;
	el.scale = scale;
	out.push(el);
	Ok(())
}

fn encode_map_key(key: &Field, out: &mut Vec<SchemaElement>) -> Result<()> {
	let Field::Data(d) = key else {
		return Err(ParquetCoreError::invalid_argument("map key field must be a scalar data field"));
	};
	if d.nullable {
		return Err(ParquetCoreError::invalid_argument("map key field must be non-nullable"));
	}
	let (physical_type, converted_type, type_length, precision, scale) = physical_repr(&d.logical_type)?;
	let mut el = SchemaElement::primitive(d.name.clone(), Repetition::Required, physical_type, converted_type);
	el.type_length = type_length;
	el.precision = precision;
	el.scale = scale;
	out.push(el);
	Ok(())
}

/// Maps a [`LogicalType`] to its physical storage type and converted-type
/// annotation (spec section 4.1 and 4.2).
pub fn physical_repr(t: &LogicalType) -> Result<(PhysicalType, Option<ConvertedType>, Option<i32>, Option<u32>, Option<u32>)> {
	Ok(match t {
		LogicalType::Boolean => (PhysicalType::Boolean, None, None, None, None),
		LogicalType::Int8 => (PhysicalType::Int32, Some(ConvertedType::Int8), None, None, None),
		LogicalType::Int16 => (PhysicalType::Int32, Some(ConvertedType::Int16), None, None, None),
		LogicalType::Int32 => (PhysicalType::Int32, None, None, None, None),
		LogicalType::Int64 => (PhysicalType::Int64, None, None, None, None),
		LogicalType::UInt8 => (PhysicalType::Int32, Some(ConvertedType::Uint8), None, None, None),
		LogicalType::UInt16 => (PhysicalType::Int32, Some(ConvertedType::Uint16), None, None, None),
		LogicalType::UInt32 => (PhysicalType::Int32, Some(ConvertedType::Uint32), None, None, None),
		LogicalType::UInt64 => (PhysicalType::Int64, Some(ConvertedType::Uint64), None, None, None),
		LogicalType::Float32 => (PhysicalType::Float, None, None, None, None),
		LogicalType::Float64 => (PhysicalType::Double, None, None, None, None),
		LogicalType::Date => (PhysicalType::Int32, Some(ConvertedType::Date), None, None, None),
		LogicalType::Time => (PhysicalType::Int64, Some(ConvertedType::TimeMicros), None, None, None),
		LogicalType::Timestamp(TimeUnit::Millis) => (PhysicalType::Int64, Some(ConvertedType::TimestampMillis), None, None, None),
		LogicalType::Timestamp(TimeUnit::Micros) => (PhysicalType::Int64, Some(ConvertedType::TimestampMicros), None, None, None),
		// parquet-format has no TIMESTAMP_NANOS converted type; nanosecond
		// timestamps are stored as plain INT64 and the unit is carried only
		// at the logical-schema layer (the reader must be told out of band).
		LogicalType::Timestamp(TimeUnit::Nanos) => (PhysicalType::Int64, None, None, None, None),
		LogicalType::ByteArray => (PhysicalType::ByteArray, None, None, None, None),
		LogicalType::Utf8 => (PhysicalType::ByteArray, Some(ConvertedType::Utf8), None, None, None),
		LogicalType::Interval => (PhysicalType::FixedLenByteArray, Some(ConvertedType::Interval), Some(12), None, None),
		LogicalType::Decimal { precision, scale } => decimal_repr(*precision, *scale)?,
	})
}

fn decimal_repr(precision: u32, scale: u32) -> Result<(PhysicalType, Option<ConvertedType>, Option<i32>, Option<u32>, Option<u32>)> {
	if precision == 0 || precision > 38 {
		return Err(ParquetCoreError::unsupported(format!("decimal precision {} exceeds handler maximum of 38", precision)));
	}
	let physical = if precision <= 9 {
		PhysicalType::Int32
	} else if precision <= 18 {
		PhysicalType::Int64
	} else {
		PhysicalType::FixedLenByteArray
	};
	let type_length = if physical == PhysicalType::FixedLenByteArray { Some(decimal_byte_width(precision)) } else { None };
	Ok((physical, Some(ConvertedType::Decimal), type_length, Some(precision), Some(scale)))
}

/// Minimum two's-complement big-endian byte width that can hold `precision`
/// decimal digits (spec section 4.1).
pub fn decimal_byte_width(precision: u32) -> i32 {
	// ceil(precision * log2(10) / 8) computed without floats, a digit needs
	// just over 3.32 bits; this matches the widths every Parquet
	// implementation publishes for DECIMAL(p, _).
	let bits = (precision as f64 * std::f64::consts::LOG2_10).ceil() as i64 + 1;
	(((bits + 7) / 8) as i32).max(1)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::schema::logical::*;

	#[test]
	fn flat_schema_round_trips_shape() {
		let schema = Schema::new(vec![
			Field::Data(DataField { name: "id".into(), logical_type: LogicalType::Int32, nullable: false, array: false }),
			Field::Data(DataField { name: "city".into(), logical_type: LogicalType::Utf8, nullable: true, array: false }),
		]);
		let tree = encode_schema(&schema).unwrap();
		assert_eq!(tree.elements.len(), 3);
		assert_eq!(tree.elements[0].num_children, 2);
		assert_eq!(tree.elements[1].repetition, Some(Repetition::Required));
		assert_eq!(tree.elements[2].repetition, Some(Repetition::Optional));
		assert_eq!(tree.elements[2].converted_type, Some(ConvertedType::Utf8));
	}

	#[test]
	fn list_encodes_three_level_idiom() {
		let schema = Schema::new(vec![Field::List(ListField {
			name: "categories".into(),
			element: Box::new(Field::Data(DataField { name: "element".into(), logical_type: LogicalType::Utf8, nullable: true, array: false })),
		})]);
		let tree = encode_schema(&schema).unwrap();
		assert_eq!(tree.elements.len(), 4);
		assert_eq!(tree.elements[1].converted_type, Some(ConvertedType::List));
		assert_eq!(tree.elements[2].repetition, Some(Repetition::Repeated));
		assert_eq!(tree.elements[2].name, "list");
		assert_eq!(tree.elements[3].name, "element");
		assert_eq!(tree.max_repetition_level(3), 1);
		assert_eq!(tree.max_definition_level(3), 3);
	}

	#[test]
	fn map_key_must_be_non_nullable_scalar() {
		let schema = Schema::new(vec![Field::Map(MapField {
			name: "population".into(),
			key: Box::new(Field::Data(DataField { name: "key".into(), logical_type: LogicalType::Int32, nullable: true, array: false })),
			value: Box::new(Field::Data(DataField { name: "value".into(), logical_type: LogicalType::Int64, nullable: false, array: false })),
		})]);
		assert!(encode_schema(&schema).is_err());
	}

	#[test]
	fn decimal_precision_picks_right_physical_type() {
		assert_eq!(physical_repr(&LogicalType::Decimal { precision: 5, scale: 2 }).unwrap().0, PhysicalType::Int32);
		assert_eq!(physical_repr(&LogicalType::Decimal { precision: 18, scale: 2 }).unwrap().0, PhysicalType::Int64);
		assert_eq!(physical_repr(&LogicalType::Decimal { precision: 30, scale: 2 }).unwrap().0, PhysicalType::FixedLenByteArray);
		assert!(physical_repr(&LogicalType::Decimal { precision: 40, scale: 2 }).is_err());
	}
}
