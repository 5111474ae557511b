//! The reader side of the file engine (spec 4.5).

use std::io::{Read, Seek, SeekFrom};

use parquet_format_safe::FileMetaData;
use tracing::info;

use crate::column::read_column_chunk;
use crate::error::{ParquetCoreError, Result};
use crate::file::footer::{from_thrift_schema, read_footer};
use crate::file::magic::read_and_verify_magic;
use crate::levels::{build_unshredder, LeafCursor, Unshredder};
use crate::schema::decode::decode_field;
use crate::schema::logical::{Field, Schema};
use crate::schema::physical::SchemaTree;
use crate::value::DataColumn;

pub struct Reader<R> {
	stream: R,
	tree: SchemaTree,
	schema: Schema,
	metadata: FileMetaData,
}

impl<R: Read + Seek> Reader<R> {
	/// Verifies both magics, locates the footer, and parses it (spec 4.5).
	pub fn open(mut stream: R) -> Result<Self> {
		stream.seek(SeekFrom::Start(0))?;
		read_and_verify_magic(&mut stream)?;

		let end = stream.seek(SeekFrom::End(0))?;
		if end < 12 {
			return Err(ParquetCoreError::corrupt("file too short to contain a footer"));
		}
		stream.seek(SeekFrom::End(-4))?;
		let mut trailing = [0u8; 4];
		stream.read_exact(&mut trailing)?;
		crate::file::magic::verify_bytes(&trailing)?;

		stream.seek(SeekFrom::End(-8))?;
		let mut len_bytes = [0u8; 4];
		stream.read_exact(&mut len_bytes)?;
		let footer_len = u32::from_le_bytes(len_bytes) as u64;
		let footer_start = end.checked_sub(8 + footer_len).ok_or_else(|| ParquetCoreError::corrupt("footer length exceeds file size"))?;

		stream.seek(SeekFrom::Start(footer_start))?;
		let metadata = read_footer(&mut stream)?;
		let tree = from_thrift_schema(metadata.schema.clone())?;

		let mut fields = Vec::new();
		for &child in &tree.root().children {
			fields.push(decode_field(&tree, child)?);
		}
		let schema = Schema::new(fields);

		info!(row_groups = metadata.row_groups.len(), num_rows = metadata.num_rows, "opened parquet reader");
		Ok(Reader { stream, tree, schema, metadata })
	}

	pub fn row_group_count(&self) -> usize {
		self.metadata.row_groups.len()
	}

	pub fn num_rows(&self) -> i64 {
		self.metadata.num_rows
	}

	pub fn schema(&self) -> &Schema {
		&self.schema
	}

	pub fn custom_metadata(&self) -> Vec<(String, String)> {
		self.metadata
			.key_value_metadata
			.clone()
			.unwrap_or_default()
			.into_iter()
			.map(|kv| (kv.key, kv.value.unwrap_or_default()))
			.collect()
	}

	pub fn thrift_metadata(&self) -> &FileMetaData {
		&self.metadata
	}

	pub fn open_row_group(&mut self, index: usize) -> Result<RowGroupReader<'_, R>> {
		if index >= self.metadata.row_groups.len() {
			return Err(ParquetCoreError::invalid_argument(format!("row group {} out of range ({} total)", index, self.metadata.row_groups.len())));
		}
		Ok(RowGroupReader { reader: self, index })
	}
}

pub struct RowGroupReader<'r, R> {
	reader: &'r mut Reader<R>,
	index: usize,
}

impl<'r, R: Read + Seek> RowGroupReader<'r, R> {
	pub fn num_rows(&self) -> i64 {
		self.reader.metadata.row_groups[self.index].num_rows
	}

	/// Reads back the whole top-level field named `field_name`, zipping
	/// together every physical leaf underneath it (spec 6: `rg.read_column`).
	/// See `levels` module docs for the lockstep assumption this makes when
	/// a field has more than one leaf.
	pub fn read_column(&mut self, field_name: &str) -> Result<DataColumn> {
		let root_children = self.reader.tree.root().children.clone();
		let (node_idx, field) = root_children
			.iter()
			.find_map(|&idx| {
				let f = decode_field(&self.reader.tree, idx).ok()?;
				if f.name() == field_name {
					Some((idx, f))
				} else {
					None
				}
			})
			.ok_or_else(|| ParquetCoreError::invalid_argument(format!("no top-level field named '{}'", field_name)))?;

		let leaf_paths = leaf_paths_under(&self.reader.tree, node_idx);
		let row_group = &self.reader.metadata.row_groups[self.index];

		let mut leaf_data = Vec::new();
		for path in &leaf_paths {
			let chunk = row_group
				.columns
				.iter()
				.find(|c| c.meta_data.as_ref().map(|m| &m.path_in_schema) == Some(path))
				.and_then(|c| c.meta_data.as_ref())
				.ok_or_else(|| ParquetCoreError::corrupt(format!("row group is missing column '{}'", path.join("."))))?;

			let leaf_node = find_node_by_path(&self.reader.tree, path);
			let max_dl = self.reader.tree.max_definition_level(leaf_node);
			let max_rl = self.reader.tree.max_repetition_level(leaf_node);
			let type_length = self.reader.tree.element(leaf_node).type_length;

			let data = read_column_chunk(&mut self.reader.stream, chunk, max_dl, max_rl, type_length)?;
			leaf_data.push(crate::levels::LeafColumnData {
				path: path.clone(),
				physical_type: None,
				max_dl,
				max_rl,
				values: data.values,
				def_levels: data.definition_levels,
				rep_levels: data.repetition_levels,
			});
		}

		if leaf_data.len() == 1 && matches!(field, Field::Data(_)) {
			let leaf = leaf_data.into_iter().next().unwrap();
			return Ok(DataColumn::new(field, leaf.values, leaf.def_levels, leaf.rep_levels));
		}

		let unshredder = build_unshredder(&self.reader.tree, node_idx, &field)?;
		let mut cursors: Vec<LeafCursor> = leaf_data.iter().map(LeafCursor::new).collect();
		let num_rows = self.num_rows();
		let mut values = Vec::with_capacity(num_rows as usize);
		for _ in 0..num_rows {
			let (v, _rep, _def) = unshredder.assemble_one(&mut cursors)?;
			values.push(v);
		}
		Ok(DataColumn::new(field, values, Vec::new(), Vec::new()))
	}
}

fn leaf_paths_under(tree: &SchemaTree, node_idx: usize) -> Vec<Vec<String>> {
	let el = tree.element(node_idx);
	if el.physical_type.is_some() {
		return vec![tree.path(node_idx)];
	}
	tree.nodes[node_idx].children.iter().flat_map(|&c| leaf_paths_under(tree, c)).collect()
}

fn find_node_by_path(tree: &SchemaTree, path: &[String]) -> usize {
	for idx in 0..tree.elements.len() {
		if tree.element(idx).physical_type.is_some() && tree.path(idx) == path {
			return idx;
		}
	}
	unreachable!("column path came from this same tree's leaf enumeration")
}
