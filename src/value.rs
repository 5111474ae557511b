//! `DataColumn`: the public unit of column data crossing the API boundary
//! (spec section 6). Internally the crate works with nested [`crate::levels::Value`]
//! trees and [`crate::levels::LeafColumnData`]; `DataColumn` is the flattened,
//! already-shredded shape non-core code hands to or receives from a row group.

use crate::levels::Value;
use crate::schema::logical::Field;

/// One column's worth of data: the field it describes, its dense values in
/// row-major order, and (for nested fields) the parallel rep/def level
/// arrays alongside them.
#[derive(Debug, Clone)]
pub struct DataColumn {
	pub field: Field,
	pub values: Vec<Value>,
	pub definition_levels: Vec<i16>,
	pub repetition_levels: Vec<i16>,
}

impl DataColumn {
	pub fn new(field: Field, values: Vec<Value>, definition_levels: Vec<i16>, repetition_levels: Vec<i16>) -> Self {
		DataColumn { field, values, definition_levels, repetition_levels }
	}

	/// A flat, non-nested column has no use for explicit levels; callers
	/// may still query `max_dl == 0 && max_rl == 0` on the corresponding
	/// schema node instead of tracking this separately.
	pub fn flat(field: Field, values: Vec<Value>) -> Self {
		DataColumn { field, values, definition_levels: Vec::new(), repetition_levels: Vec::new() }
	}
}
