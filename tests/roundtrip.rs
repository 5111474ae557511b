//! End-to-end write/read coverage over the public API (spec section 8's
//! scenarios): flat tables, arrays, maps, empty-list alternation,
//! multi-row-group append, and custom metadata, plus a few boundary cases.

use std::io::Cursor;

use parquet_core::levels::{build_shredder, LevelIndexList, Shredder, Value};
use parquet_core::schema::encode_schema;
use parquet_core::schema::logical::{DataField, Field, ListField, LogicalType, MapField, Schema};
use parquet_core::{open_reader, open_writer, CancellationToken, DataColumn, WriterOptions};

fn data_field(name: &str, ty: LogicalType, nullable: bool) -> Field {
	Field::Data(DataField { name: name.to_string(), logical_type: ty, nullable, array: false })
}

/// Shreds one top-level field's per-row values into its leaf `DataColumn`s,
/// using the same `Shredder` machinery the writer drives internally —
/// exercised here directly so tests can build nested columns without
/// hand-computing repetition/definition levels. Each leaf is paired back up
/// with its own scalar `Field::Data`, since `write_column` validates against
/// the leaf's logical type, not the composite field's.
fn shred_rows(field: &Field, rows: &[Value]) -> Vec<DataColumn> {
	let schema = Schema::new(vec![field.clone()]);
	let tree = encode_schema(&schema).unwrap();
	let root_child = tree.root().children[0];
	let mut shredder = build_shredder(&tree, root_child, field).unwrap();
	for row in rows {
		shredder.copy_value_opt(&LevelIndexList::new(), row).unwrap();
	}
	let mut leaves = Vec::new();
	shredder.collect_leaves(&mut leaves);

	let leaf_fields: Vec<Field> = schema
		.leaves()
		.into_iter()
		.map(|(_, d)| Field::Data(DataField { name: d.name.clone(), logical_type: d.logical_type.clone(), nullable: d.nullable, array: false }))
		.collect();

	leaves.into_iter().zip(leaf_fields).map(|(l, f)| DataColumn::new(f, l.values, l.def_levels, l.rep_levels)).collect()
}

#[test]
fn flat_two_column_table_round_trips() {
	let schema = Schema::new(vec![data_field("id", LogicalType::Int64, false), data_field("name", LogicalType::Utf8, true)]);

	let mut stream = Cursor::new(Vec::new());
	let mut writer = open_writer(schema.clone(), &mut stream, WriterOptions::default(), false).unwrap();
	let mut rg = writer.create_row_group();
	let cancel = CancellationToken::none();

	rg.write_column(DataColumn::flat(schema.fields[0].clone(), vec![Value::Int64(1), Value::Int64(2), Value::Int64(3)]), None, &cancel).unwrap();
	rg.write_column(
		DataColumn::new(
			schema.fields[1].clone(),
			vec![Value::ByteArray(b"alice".to_vec()), Value::ByteArray(b"carol".to_vec())],
			vec![1, 0, 1],
			vec![],
		),
		None,
		&cancel,
	)
	.unwrap();
	rg.close().unwrap();
	writer.close().unwrap();

	let mut reader = open_reader(stream).unwrap();
	assert_eq!(reader.num_rows(), 3);
	assert_eq!(reader.row_group_count(), 1);
	let mut group = reader.open_row_group(0).unwrap();
	let id = group.read_column("id").unwrap();
	assert_eq!(id.values, vec![Value::Int64(1), Value::Int64(2), Value::Int64(3)]);
	let name = group.read_column("name").unwrap();
	assert_eq!(name.values, vec![Value::ByteArray(b"alice".to_vec()), Value::ByteArray(b"carol".to_vec())]);
	assert_eq!(name.definition_levels, vec![1, 0, 1]);
}

#[test]
fn array_column_round_trips() {
	let field = Field::Data(DataField { name: "tags".to_string(), logical_type: LogicalType::Utf8, nullable: false, array: true });
	let rows = vec![
		Value::List(vec![Value::ByteArray(b"a".to_vec()), Value::ByteArray(b"b".to_vec())]),
		Value::List(vec![]),
		Value::List(vec![Value::ByteArray(b"c".to_vec())]),
	];
	let columns = shred_rows(&field, &rows);
	assert_eq!(columns.len(), 1);

	let schema = Schema::new(vec![field]);
	let mut stream = Cursor::new(Vec::new());
	let mut writer = open_writer(schema, &mut stream, WriterOptions::default(), false).unwrap();
	let mut rg = writer.create_row_group();
	let cancel = CancellationToken::none();
	for c in columns {
		rg.write_column(c, None, &cancel).unwrap();
	}
	rg.close().unwrap();
	writer.close().unwrap();

	let mut reader = open_reader(stream).unwrap();
	let mut group = reader.open_row_group(0).unwrap();
	let tags = group.read_column("tags").unwrap();
	assert_eq!(tags.values, rows);
}

#[test]
fn map_column_round_trips() {
	let field = Field::Map(MapField {
		name: "scores".to_string(),
		key: Box::new(data_field("key", LogicalType::Utf8, false)),
		value: Box::new(data_field("value", LogicalType::Int32, false)),
	});
	let rows = vec![
		Value::Map(vec![(Value::ByteArray(b"a".to_vec()), Value::Int32(1)), (Value::ByteArray(b"b".to_vec()), Value::Int32(2))]),
		Value::Map(vec![]),
	];
	let columns = shred_rows(&field, &rows);

	let schema = Schema::new(vec![field]);
	let mut stream = Cursor::new(Vec::new());
	let mut writer = open_writer(schema, &mut stream, WriterOptions::default(), false).unwrap();
	let mut rg = writer.create_row_group();
	let cancel = CancellationToken::none();
	for c in columns {
		rg.write_column(c, None, &cancel).unwrap();
	}
	rg.close().unwrap();
	writer.close().unwrap();

	let mut reader = open_reader(stream).unwrap();
	let mut group = reader.open_row_group(0).unwrap();
	let scores = group.read_column("scores").unwrap();
	assert_eq!(scores.values, rows);
}

#[test]
fn empty_list_alternation_round_trips() {
	let field = Field::List(ListField { name: "groups".to_string(), element: Box::new(data_field("element", LogicalType::Int32, false)) });
	let rows = vec![Value::List(vec![]), Value::List(vec![Value::Int32(7)]), Value::List(vec![]), Value::List(vec![Value::Int32(8), Value::Int32(9)])];
	let columns = shred_rows(&field, &rows);

	let schema = Schema::new(vec![field]);
	let mut stream = Cursor::new(Vec::new());
	let mut writer = open_writer(schema, &mut stream, WriterOptions::default(), false).unwrap();
	let mut rg = writer.create_row_group();
	let cancel = CancellationToken::none();
	for c in columns {
		rg.write_column(c, None, &cancel).unwrap();
	}
	rg.close().unwrap();
	writer.close().unwrap();

	let mut reader = open_reader(stream).unwrap();
	let mut group = reader.open_row_group(0).unwrap();
	let groups = group.read_column("groups").unwrap();
	assert_eq!(groups.values, rows);
}

#[test]
fn multi_row_group_append_round_trips() {
	let schema = Schema::new(vec![data_field("n", LogicalType::Int32, false)]);
	let options = WriterOptions::default().with_row_group_size(2);
	let cancel = CancellationToken::none();

	let mut stream = Cursor::new(Vec::new());
	{
		let mut writer = open_writer(schema.clone(), &mut stream, options.clone(), false).unwrap();
		let mut rg = writer.create_row_group();
		rg.write_column(DataColumn::flat(schema.fields[0].clone(), vec![Value::Int32(1), Value::Int32(2)]), None, &cancel).unwrap();
		rg.close().unwrap();
		writer.close().unwrap();
	}

	{
		let mut writer = open_writer(schema.clone(), &mut stream, options, true).unwrap();
		let mut rg = writer.create_row_group();
		rg.write_column(DataColumn::flat(schema.fields[0].clone(), vec![Value::Int32(3), Value::Int32(4)]), None, &cancel).unwrap();
		rg.close().unwrap();
		writer.close().unwrap();
	}

	let mut reader = open_reader(stream).unwrap();
	assert_eq!(reader.row_group_count(), 2);
	assert_eq!(reader.num_rows(), 4);
	let first = reader.open_row_group(0).unwrap().read_column("n").unwrap();
	assert_eq!(first.values, vec![Value::Int32(1), Value::Int32(2)]);
	let second = reader.open_row_group(1).unwrap().read_column("n").unwrap();
	assert_eq!(second.values, vec![Value::Int32(3), Value::Int32(4)]);
}

#[test]
fn custom_metadata_round_trips() {
	let schema = Schema::new(vec![data_field("n", LogicalType::Int32, false)]);
	let mut stream = Cursor::new(Vec::new());
	let mut writer = open_writer(schema.clone(), &mut stream, WriterOptions::default(), false).unwrap();
	writer.set_custom_metadata(vec![("source".to_string(), "unit-test".to_string())]);
	let mut rg = writer.create_row_group();
	rg.write_column(DataColumn::flat(schema.fields[0].clone(), vec![Value::Int32(1)]), None, &CancellationToken::none()).unwrap();
	rg.close().unwrap();
	writer.close().unwrap();

	let reader = open_reader(stream).unwrap();
	assert_eq!(reader.custom_metadata(), vec![("source".to_string(), "unit-test".to_string())]);
}

#[test]
fn all_null_column_round_trips() {
	let schema = Schema::new(vec![data_field("maybe", LogicalType::Int32, true)]);
	let mut stream = Cursor::new(Vec::new());
	let mut writer = open_writer(schema.clone(), &mut stream, WriterOptions::default(), false).unwrap();
	let mut rg = writer.create_row_group();
	rg.write_column(
		DataColumn::new(schema.fields[0].clone(), vec![], vec![0, 0, 0], vec![]),
		None,
		&CancellationToken::none(),
	)
	.unwrap();
	rg.close().unwrap();
	writer.close().unwrap();

	let mut reader = open_reader(stream).unwrap();
	assert_eq!(reader.num_rows(), 3);
	let mut group = reader.open_row_group(0).unwrap();
	let maybe = group.read_column("maybe").unwrap();
	assert_eq!(maybe.values, Vec::<Value>::new());
	assert_eq!(maybe.definition_levels, vec![0, 0, 0]);
}

#[test]
fn zero_row_row_group_round_trips() {
	let schema = Schema::new(vec![data_field("n", LogicalType::Int32, false)]);
	let mut stream = Cursor::new(Vec::new());
	let mut writer = open_writer(schema.clone(), &mut stream, WriterOptions::default(), false).unwrap();
	let mut rg = writer.create_row_group();
	rg.write_column(DataColumn::flat(schema.fields[0].clone(), vec![]), None, &CancellationToken::none()).unwrap();
	rg.close().unwrap();
	writer.close().unwrap();

	let mut reader = open_reader(stream).unwrap();
	assert_eq!(reader.num_rows(), 0);
	let mut group = reader.open_row_group(0).unwrap();
	let n = group.read_column("n").unwrap();
	assert!(n.values.is_empty());
}

#[test]
fn out_of_order_column_write_fails() {
	let schema = Schema::new(vec![data_field("a", LogicalType::Int32, false), data_field("b", LogicalType::Int32, false)]);
	let mut stream = Cursor::new(Vec::new());
	let mut writer = open_writer(schema.clone(), &mut stream, WriterOptions::default(), false).unwrap();
	let mut rg = writer.create_row_group();
	let cancel = CancellationToken::none();

	rg.write_column(DataColumn::flat(schema.fields[1].clone(), vec![Value::Int32(1)]), None, &cancel).unwrap();
	let second = rg.write_column(DataColumn::flat(schema.fields[0].clone(), vec![Value::Int32(1)]), None, &cancel);
	assert!(second.is_err());
}

#[test]
fn type_mismatch_write_fails() {
	let schema = Schema::new(vec![data_field("a", LogicalType::Int32, false)]);
	let mut stream = Cursor::new(Vec::new());
	let mut writer = open_writer(schema.clone(), &mut stream, WriterOptions::default(), false).unwrap();
	let mut rg = writer.create_row_group();
	let wrong_field = data_field("a", LogicalType::Utf8, false);
	let result = rg.write_column(DataColumn::flat(wrong_field, vec![Value::ByteArray(b"x".to_vec())]), None, &CancellationToken::none());
	assert!(result.is_err());
}

#[test]
fn closing_row_group_before_all_columns_written_fails() {
	let schema = Schema::new(vec![data_field("a", LogicalType::Int32, false), data_field("b", LogicalType::Int32, false)]);
	let mut stream = Cursor::new(Vec::new());
	let mut writer = open_writer(schema.clone(), &mut stream, WriterOptions::default(), false).unwrap();
	let mut rg = writer.create_row_group();
	rg.write_column(DataColumn::flat(schema.fields[0].clone(), vec![Value::Int32(1)]), None, &CancellationToken::none()).unwrap();
	assert!(rg.close().is_err());
}
