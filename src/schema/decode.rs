//! Physical -> logical schema decoding (spec section 4.2 "Decode").
//!
//! The decoder is specified as a streaming pre-order walk that reports how
//! many physical elements each emitted logical field consumed. Since
//! [`SchemaTree`] already resolves the flat vector into an arena during
//! construction (itself a pre-order, children-count-driven walk), the
//! "elements consumed" bookkeeping falls out of the tree shape: see
//! [`SchemaTree::subtree_size`].

use crate::error::{ParquetCoreError, Result};
use crate::schema::logical::{DataField, Field, ListField, LogicalType, MapField, Schema, StructField, TimeUnit};
use crate::schema::physical::{ConvertedType, PhysicalType, Repetition, SchemaTree};

impl SchemaTree {
	/// Number of flat elements in the subtree rooted at `idx`, inclusive.
	pub fn subtree_size(&self, idx: usize) -> usize {
		1 + self.nodes[idx].children.iter().map(|&c| self.subtree_size(c)).sum::<usize>()
	}
}

/// Decodes the whole physical schema back into a logical [`Schema`].
pub fn decode_schema(tree: &SchemaTree) -> Result<Schema> {
	let mut fields = Vec::new();
	for &child in &tree.root().children {
		fields.push(decode_field(tree, child)?);
	}
	Ok(Schema::new(fields))
}

/// Classifies and decodes the node at `idx`, per spec 4.2's "first match
/// wins" rule list.
pub fn decode_field(tree: &SchemaTree, idx: usize) -> Result<Field> {
	let el = tree.element(idx);
	let children = &tree.nodes[idx].children;

	// Rule 1: three-level list idiom.
	if el.converted_type == Some(ConvertedType::List) && el.num_children == 1 {
		let mid = children[0];
		let mid_el = tree.element(mid);
		if mid_el.repetition == Some(Repetition::Repeated) && mid_el.num_children == 1 {
			let element_idx = tree.nodes[mid].children[0];
			let element = decode_field(tree, element_idx)?;
			return Ok(Field::List(ListField { name: el.name.clone(), element: Box::new(element) }));
		}
	}

	// Rule 2: three-level map idiom (also tolerates a legacy encoding where
	// the wrapper group itself carries MAP_KEY_VALUE).
	if matches!(el.converted_type, Some(ConvertedType::Map) | Some(ConvertedType::MapKeyValue)) {
		if let Some(&mid) = children.first() {
			let mid_el = tree.element(mid);
			if mid_el.repetition == Some(Repetition::Repeated) && mid_el.num_children == 2 {
				let key_idx = tree.nodes[mid].children[0];
				let value_idx = tree.nodes[mid].children[1];
				let key = decode_field(tree, key_idx)?;
				let value = decode_field(tree, value_idx)?;
				if !matches!(key, Field::Data(ref d) if !d.nullable) {
					return Err(ParquetCoreError::corrupt(format!("map '{}' key must decode to a non-nullable scalar", el.name)));
				}
				return Ok(Field::Map(MapField { name: el.name.clone(), key: Box::new(key), value: Box::new(value) }));
			}
		}
	}

	// Rule 3: legacy two-level list of primitives (REPEATED primitive with
	// no wrapper group). Per spec 9, prefer the three-level interpretation
	// above whenever the REPEATED group has a single group child; this rule
	// only fires for a directly-repeated *primitive*.
	if el.repetition == Some(Repetition::Repeated) && el.physical_type.is_some() {
		let logical_type = logical_repr(el)?;
		return Ok(Field::Data(DataField { name: el.name.clone(), logical_type, nullable: false, array: true }));
	}

	// Rule 4: struct.
	if el.num_children > 0 {
		let mut kids = Vec::with_capacity(children.len());
		for &c in children {
			kids.push(decode_field(tree, c)?);
		}
		return Ok(Field::Struct(StructField { name: el.name.clone(), children: kids }));
	}

	// Rule 5: plain scalar.
	if el.physical_type.is_some() {
		let logical_type = logical_repr(el)?;
		let nullable = el.repetition != Some(Repetition::Required);
		return Ok(Field::Data(DataField { name: el.name.clone(), logical_type, nullable, array: false }));
	}

	Err(ParquetCoreError::corrupt(format!("schema element '{}' matches no known shape (group node with zero children and no primitive type)", el.name)))
}

/// Inverse of [`crate::schema::encode::physical_repr`].
pub fn logical_repr(el: &crate::schema::physical::SchemaElement) -> Result<LogicalType> {
	let physical = el.physical_type.ok_or_else(|| ParquetCoreError::corrupt(format!("element '{}' has no physical type", el.name)))?;
	Ok(match (physical, el.converted_type) {
		(PhysicalType::Boolean, _) => LogicalType::Boolean,
		(PhysicalType::Int32, Some(ConvertedType::Int8)) => LogicalType::Int8,
		(PhysicalType::Int32, Some(ConvertedType::Int16)) => LogicalType::Int16,
		(PhysicalType::Int32, Some(ConvertedType::Uint8)) => LogicalType::UInt8,
		(PhysicalType::Int32, Some(ConvertedType::Uint16)) => LogicalType::UInt16,
		(PhysicalType::Int32, Some(ConvertedType::Uint32)) => LogicalType::UInt32,
		(PhysicalType::Int32, Some(ConvertedType::Date)) => LogicalType::Date,
		(PhysicalType::Int32, Some(ConvertedType::Decimal)) => decimal_logical(el)?,
		(PhysicalType::Int32, None) => LogicalType::Int32,
		(PhysicalType::Int64, Some(ConvertedType::Uint64)) => LogicalType::UInt64,
		(PhysicalType::Int64, Some(ConvertedType::TimeMillis)) | (PhysicalType::Int64, Some(ConvertedType::TimeMicros)) => LogicalType::Time,
		(PhysicalType::Int64, Some(ConvertedType::TimestampMillis)) => LogicalType::Timestamp(TimeUnit::Millis),
		(PhysicalType::Int64, Some(ConvertedType::TimestampMicros)) => LogicalType::Timestamp(TimeUnit::Micros),
		(PhysicalType::Int64, Some(ConvertedType::Decimal)) => decimal_logical(el)?,
		(PhysicalType::Int64, None) => LogicalType::Int64,
		(PhysicalType::Int96, _) => LogicalType::Timestamp(TimeUnit::Nanos),
		(PhysicalType::Float, _) => LogicalType::Float32,
		(PhysicalType::Double, _) => LogicalType::Float64,
		(PhysicalType::ByteArray, Some(ConvertedType::Utf8)) => LogicalType::Utf8,
		(PhysicalType::ByteArray, Some(ConvertedType::Decimal)) => decimal_logical(el)?,
		(PhysicalType::ByteArray, _) => LogicalType::ByteArray,
		(PhysicalType::FixedLenByteArray, Some(ConvertedType::Decimal)) => decimal_logical(el)?,
		(PhysicalType::FixedLenByteArray, Some(ConvertedType::Interval)) => LogicalType::Interval,
		(PhysicalType::FixedLenByteArray, _) => {
			return Err(ParquetCoreError::unsupported(format!(
				"element '{}' is a bare FIXED_LEN_BYTE_ARRAY with no recognized converted type",
				el.name
			)))
		}
	})
}

fn decimal_logical(el: &crate::schema::physical::SchemaElement) -> Result<LogicalType> {
	let precision = el.precision.ok_or_else(|| ParquetCoreError::corrupt(format!("decimal element '{}' is missing precision", el.name)))?;
	let scale = el.scale.unwrap_or(0);
	Ok(LogicalType::Decimal { precision, scale })
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::schema::encode::encode_schema;
	use crate::schema::logical::*;

	fn round_trip(schema: Schema) -> Schema {
		let tree = encode_schema(&schema).unwrap();
		decode_schema(&tree).unwrap()
	}

	#[test]
	fn flat_schema_round_trips() {
		let schema = Schema::new(vec![
			Field::Data(DataField { name: "id".into(), logical_type: LogicalType::Int32, nullable: false, array: false }),
			Field::Data(DataField { name: "city".into(), logical_type: LogicalType::Utf8, nullable: true, array: false }),
		]);
		assert_eq!(round_trip(schema.clone()), schema);
	}

	#[test]
	fn list_round_trips() {
		let schema = Schema::new(vec![Field::List(ListField {
			name: "categories".into(),
			element: Box::new(Field::Data(DataField { name: "element".into(), logical_type: LogicalType::Utf8, nullable: true, array: false })),
		})]);
		assert_eq!(round_trip(schema.clone()), schema);
	}

	#[test]
	fn map_round_trips() {
		let schema = Schema::new(vec![Field::Map(MapField {
			name: "population".into(),
			key: Box::new(Field::Data(DataField { name: "key".into(), logical_type: LogicalType::Int32, nullable: false, array: false })),
			value: Box::new(Field::Data(DataField { name: "value".into(), logical_type: LogicalType::Int64, nullable: false, array: false })),
		})]);
		assert_eq!(round_trip(schema.clone()), schema);
	}

	#[test]
	fn legacy_two_level_list_decodes_as_array_field() {
		use crate::schema::physical::*;
		let elements = vec![
			SchemaElement::root(1),
			SchemaElement::primitive("tags", Repetition::Repeated, PhysicalType::ByteArray, Some(ConvertedType::Utf8)),
		];
		let tree = SchemaTree::from_elements(elements).unwrap();
		let schema = decode_schema(&tree).unwrap();
		match &schema.fields[0] {
			Field::Data(d) => {
				assert!(d.array);
				assert!(!d.nullable);
				assert_eq!(d.logical_type, LogicalType::Utf8);
			}
			_ => panic!("expected a synthesized array data field"),
		}
	}

	#[test]
	fn struct_round_trips() {
		let schema = Schema::new(vec![Field::Struct(StructField {
			name: "address".into(),
			children: vec![
				Field::Data(DataField { name: "street".into(), logical_type: LogicalType::Utf8, nullable: true, array: false }),
				Field::Data(DataField { name: "zip".into(), logical_type: LogicalType::Int32, nullable: false, array: false }),
			],
		})]);
		assert_eq!(round_trip(schema.clone()), schema);
	}
}
