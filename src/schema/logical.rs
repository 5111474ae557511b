//! The logical schema: an ordered tree of fields as the application sees it,
//! before it is flattened into Parquet's physical schema (spec section 3).

/// Closed set of logical data types a [`DataField`] may carry (spec section 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
	Millis,
	Micros,
	Nanos,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LogicalType {
	Boolean,
	Int8,
	Int16,
	Int32,
	Int64,
	UInt8,
	UInt16,
	UInt32,
	UInt64,
	Float32,
	Float64,
	Decimal { precision: u32, scale: u32 },
	Date,
	Time,
	Timestamp(TimeUnit),
	ByteArray,
	Utf8,
	Interval,
}

/// One node of the logical schema tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
	Data(DataField),
	Struct(StructField),
	List(ListField),
	Map(MapField),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataField {
	pub name: String,
	pub logical_type: LogicalType,
	pub nullable: bool,
	/// Syntactic convenience for a single-level repeated scalar (spec 3).
	/// Equivalent to wrapping the field in a non-nullable `List` whose
	/// element is this same scalar type.
	pub array: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructField {
	pub name: String,
	pub children: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListField {
	pub name: String,
	pub element: Box<Field>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapField {
	pub name: String,
	pub key: Box<Field>,
	pub value: Box<Field>,
}

impl Field {
	pub fn name(&self) -> &str {
		match self {
			Field::Data(f) => &f.name,
			Field::Struct(f) => &f.name,
			Field::List(f) => &f.name,
			Field::Map(f) => &f.name,
		}
	}

	/// `true` for a field that is never skipped even when its value is
	/// absent (`DataField::nullable == false` and not an `array` field,
	/// and not one of the always-optional compound kinds).
	pub fn is_required_data(&self) -> bool {
		matches!(self, Field::Data(f) if !f.nullable && !f.array)
	}
}

/// A schema is an ordered, named, top-level list of fields (spec section 3).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
	pub fields: Vec<Field>,
}

impl Schema {
	pub fn new(fields: Vec<Field>) -> Self {
		Schema { fields }
	}

	/// Every leaf data field together with its fully qualified, dot-joined
	/// path from the schema root (spec section 3: "Every field has a fully
	/// qualified path, computed as its ancestor-name chain.").
	pub fn leaves(&self) -> Vec<(Vec<String>, &DataField)> {
		let mut out = Vec::new();
		for f in &self.fields {
			collect_leaves(f, &mut Vec::new(), &mut out);
		}
		out
	}
}

fn collect_leaves<'a>(field: &'a Field, path: &mut Vec<String>, out: &mut Vec<(Vec<String>, &'a DataField)>) {
	path.push(field.name().to_string());
	match field {
		Field::Data(d) => out.push((path.clone(), d)),
		Field::Struct(s) => {
			for c in &s.children {
				collect_leaves(c, path, out);
			}
		}
		Field::List(l) => collect_leaves(&l.element, path, out),
		Field::Map(m) => {
			collect_leaves(&m.key, path, out);
			collect_leaves(&m.value, path, out);
		}
	}
	path.pop();
}
