//! The physical schema: Parquet's flat pre-order sequence of schema elements
//! (spec section 3), plus the arena-with-parent-links reconstruction spec
//! section 9 calls for ("the cyclic node <-> parent relation should be
//! realized as indices into an arena of nodes, not as owning bidirectional
//! pointers").

use crate::error::{ParquetCoreError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repetition {
	Required,
	Optional,
	Repeated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhysicalType {
	Boolean,
	Int32,
	Int64,
	Int96,
	Float,
	Double,
	ByteArray,
	FixedLenByteArray,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertedType {
	Utf8,
	Map,
	MapKeyValue,
	List,
	Enum,
	Decimal,
	Date,
	TimeMillis,
	TimeMicros,
	TimestampMillis,
	TimestampMicros,
	Uint8,
	Uint16,
	Uint32,
	Uint64,
	Int8,
	Int16,
	Int32,
	Int64,
	Json,
	Bson,
	Interval,
}

/// One flat entry of the physical schema (mirrors Thrift `SchemaElement`,
/// spec section 6 "Thrift surface").
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaElement {
	pub name: String,
	/// `None` only for element 0, the unnamed root group.
	pub repetition: Option<Repetition>,
	/// Absent for group nodes.
	pub physical_type: Option<PhysicalType>,
	pub converted_type: Option<ConvertedType>,
	pub num_children: usize,
	/// Byte length, required when `physical_type == FixedLenByteArray`.
	pub type_length: Option<i32>,
	/// Required together for `converted_type == Decimal`.
	pub precision: Option<u32>,
	pub scale: Option<u32>,
}

impl SchemaElement {
	pub fn root(num_children: usize) -> Self {
		SchemaElement {
			name: String::new(),
			repetition: None,
			physical_type: None,
			converted_type: None,
			num_children,
			type_length: None,
			precision: None,
			scale: None,
		}
	}

	pub fn group(name: impl Into<String>, repetition: Repetition, num_children: usize, converted_type: Option<ConvertedType>) -> Self {
		SchemaElement {
			name: name.into(),
			repetition: Some(repetition),
			physical_type: None,
			converted_type,
			num_children,
			type_length: None,
			precision: None,
			scale: None,
		}
	}

	pub fn primitive(name: impl Into<String>, repetition: Repetition, physical_type: PhysicalType, converted_type: Option<ConvertedType>) -> Self {
		SchemaElement {
			name: name.into(),
			repetition: Some(repetition),
			physical_type: Some(physical_type),
			converted_type,
			num_children: 0,
			type_length: None,
			precision: None,
			scale: None,
		}
	}

	pub fn is_group(&self) -> bool {
		self.physical_type.is_none()
	}
}

/// A node in the arena-backed tree reconstructed from the flat element list.
/// `index` is the element's position in [`SchemaTree::elements`] *and* this
/// node's own stable identity, used instead of reference-equality tricks
/// when looking a node up by identity (spec section 9).
#[derive(Debug, Clone)]
pub struct SchemaNode {
	pub index: usize,
	pub parent: Option<usize>,
	pub children: Vec<usize>,
}

/// The physical schema, plus the tree shape needed for path resolution and
/// level computation.
#[derive(Debug, Clone)]
pub struct SchemaTree {
	pub elements: Vec<SchemaElement>,
	pub nodes: Vec<SchemaNode>,
}

impl SchemaTree {
	/// Reconstructs the arena from a flat pre-order vector, as read off the
	/// wire or built by the schema encoder.
	pub fn from_elements(elements: Vec<SchemaElement>) -> Result<Self> {
		if elements.is_empty() {
			return Err(ParquetCoreError::corrupt("schema has no elements"));
		}
		let mut nodes: Vec<SchemaNode> = elements
			.iter()
			.enumerate()
			.map(|(i, _)| SchemaNode { index: i, parent: None, children: Vec::new() })
			.collect();

		let mut cursor = 1usize;
		fn link(elements: &[SchemaElement], nodes: &mut [SchemaNode], parent: usize, cursor: &mut usize) -> Result<()> {
			let want = elements[parent].num_children;
			for _ in 0..want {
				if *cursor >= elements.len() {
					return Err(ParquetCoreError::corrupt("schema element declares more children than remain"));
				}
				let child = *cursor;
				*cursor += 1;
				nodes[child].parent = Some(parent);
				nodes[parent].children.push(child);
				link(elements, nodes, child, cursor)?;
			}
			Ok(())
		}
		link(&elements, &mut nodes, 0, &mut cursor)?;
		if cursor != elements.len() {
			return Err(ParquetCoreError::corrupt("trailing schema elements not reachable from root"));
		}

		Ok(SchemaTree { elements, nodes })
	}

	pub fn root(&self) -> &SchemaNode {
		&self.nodes[0]
	}

	pub fn element(&self, idx: usize) -> &SchemaElement {
		&self.elements[idx]
	}

	/// Ancestor-name chain for a node, root excluded (spec section 3's
	/// "fully qualified path").
	pub fn path(&self, idx: usize) -> Vec<String> {
		let mut chain = Vec::new();
		let mut cur = idx;
		while cur != 0 {
			chain.push(self.elements[cur].name.clone());
			cur = self.nodes[cur].parent.expect("non-root node always has a parent");
		}
		chain.reverse();
		chain
	}

	/// Count of REPEATED ancestors on the path to `idx`, root excluded
	/// (spec section 3: `max_repetition_level`).
	pub fn max_repetition_level(&self, idx: usize) -> i16 {
		let mut count = 0i16;
		let mut cur = idx;
		while cur != 0 {
			if self.elements[cur].repetition == Some(Repetition::Repeated) {
				count += 1;
			}
			cur = self.nodes[cur].parent.unwrap();
		}
		count
	}

	/// Count of non-REQUIRED ancestors on the path to `idx`, root excluded
	/// (spec section 3: `max_definition_level`).
	pub fn max_definition_level(&self, idx: usize) -> i16 {
		let mut count = 0i16;
		let mut cur = idx;
		while cur != 0 {
			if self.elements[cur].repetition != Some(Repetition::Required) {
				count += 1;
			}
			cur = self.nodes[cur].parent.unwrap();
		}
		count
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn elem(name: &str, rep: Repetition, nchild: usize) -> SchemaElement {
		SchemaElement::group(name, rep, nchild, None)
	}

	#[test]
	fn flat_two_column_tree_links_correctly() {
		let elements = vec![
			SchemaElement::root(2),
			SchemaElement::primitive("id", Repetition::Required, PhysicalType::Int32, None),
			SchemaElement::primitive("city", Repetition::Optional, PhysicalType::ByteArray, Some(ConvertedType::Utf8)),
		];
		let tree = SchemaTree::from_elements(elements).unwrap();
		assert_eq!(tree.path(1), vec!["id".to_string()]);
		assert_eq!(tree.path(2), vec!["city".to_string()]);
		assert_eq!(tree.max_definition_level(1), 0);
		assert_eq!(tree.max_definition_level(2), 1);
		assert_eq!(tree.max_repetition_level(1), 0);
	}

	#[test]
	fn three_level_list_levels() {
		// root -> list (OPTIONAL group) -> repeated group "list" -> element (OPTIONAL)
		let elements = vec![
			SchemaElement::root(1),
			elem("categories", Repetition::Optional, 1),
			elem("list", Repetition::Repeated, 1),
			SchemaElement::primitive("element", Repetition::Optional, PhysicalType::ByteArray, Some(ConvertedType::Utf8)),
		];
		let tree = SchemaTree::from_elements(elements).unwrap();
		assert_eq!(tree.max_repetition_level(3), 1);
		assert_eq!(tree.max_definition_level(3), 3);
		assert_eq!(tree.path(3), vec!["categories", "list", "element"]);
	}

	#[test]
	fn rejects_truncated_schema() {
		let elements = vec![SchemaElement::root(2), SchemaElement::primitive("only_one", Repetition::Required, PhysicalType::Int32, None)];
		assert!(SchemaTree::from_elements(elements).is_err());
	}
}
