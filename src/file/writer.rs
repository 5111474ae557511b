//! The writer side of the file engine (spec 4.5): row-group lifecycle,
//! magic bytes, append mode, footer serialization.

use std::io::{Read, Seek, SeekFrom, Write};

use parquet_format_safe::RowGroup;
use tracing::{debug, info};

use crate::cancel::CancellationToken;
use crate::column::{write_column_chunk, ColumnChunkPlan};
use crate::error::{ParquetCoreError, Result};
use crate::file::footer::{build_file_metadata, read_footer, write_footer};
use crate::file::magic::{read_and_verify_magic, write_magic, MAGIC};
use crate::options::WriterOptions;
use crate::schema::encode::physical_repr;
use crate::schema::logical::{Field, Schema};
use crate::schema::physical::{PhysicalType, SchemaTree};
use crate::value::DataColumn;

/// One physical (leaf) column's static schema facts, read off the physical
/// schema in flat pre-order — the order `write_column` enforces.
#[derive(Clone)]
struct LeafInfo {
	path: Vec<String>,
	physical_type: PhysicalType,
	type_length: Option<i32>,
	max_dl: i16,
	max_rl: i16,
}

fn physical_leaves(tree: &SchemaTree) -> Vec<LeafInfo> {
	tree.elements
		.iter()
		.enumerate()
		.filter(|(_, el)| el.physical_type.is_some())
		.map(|(idx, el)| LeafInfo {
			path: tree.path(idx),
			physical_type: el.physical_type.unwrap(),
			type_length: el.type_length,
			max_dl: tree.max_definition_level(idx),
			max_rl: tree.max_repetition_level(idx),
		})
		.collect()
}

pub struct Writer<W> {
	stream: W,
	schema: Schema,
	tree: SchemaTree,
	leaves: Vec<LeafInfo>,
	options: WriterOptions,
	row_groups: Vec<RowGroup>,
	num_rows: i64,
	custom_metadata: Vec<(String, String)>,
}

impl<W: Write + Seek> Writer<W> {
	pub fn create(schema: Schema, mut stream: W, options: WriterOptions) -> Result<Self> {
		let tree = crate::schema::encode_schema(&schema)?;
		let leaves = physical_leaves(&tree);
		write_magic(&mut stream)?;
		info!(fields = schema.fields.len(), "opened parquet writer");
		Ok(Writer { stream, schema, tree, leaves, options, row_groups: Vec::new(), num_rows: 0, custom_metadata: Vec::new() })
	}

	pub fn set_custom_metadata(&mut self, metadata: Vec<(String, String)>) {
		self.custom_metadata = metadata;
	}

	pub fn create_row_group(&mut self) -> RowGroupWriter<'_, W> {
		RowGroupWriter { writer: self, next_leaf: 0, columns: Vec::new(), num_rows: None, aborted: false }
	}

	pub fn close(mut self) -> Result<W> {
		let footer = build_file_metadata(&self.tree, self.row_groups.clone(), self.num_rows, self.options.created_by.clone(), self.custom_metadata.clone());
		let footer_start = self.stream.stream_position()?;
		write_footer(&mut self.stream, &footer)?;
		let footer_end = self.stream.stream_position()?;
		let footer_len = (footer_end - footer_start) as u32;
		self.stream.write_all(&footer_len.to_le_bytes())?;
		write_magic(&mut self.stream)?;
		info!(num_rows = self.num_rows, row_groups = self.row_groups.len(), "closed parquet writer");
		Ok(self.stream)
	}
}

impl<W: Write + Read + Seek> Writer<W> {
	/// Opens in append mode: seeks to the end, locates the trailing magic
	/// and footer length, reads the existing footer, and truncates the
	/// stream to just before the old footer-length field (spec 4.5).
	pub fn open_append(schema: Schema, mut stream: W, options: WriterOptions) -> Result<Self> {
		let end = stream.seek(SeekFrom::End(0))?;
		if end < 12 {
			return Err(ParquetCoreError::corrupt("file too short to contain a footer"));
		}
		stream.seek(SeekFrom::End(-4))?;
		let mut trailing = [0u8; 4];
		stream.read_exact(&mut trailing)?;
		if &trailing != MAGIC {
			return Err(ParquetCoreError::corrupt("missing trailing magic; cannot append"));
		}
		stream.seek(SeekFrom::End(-8))?;
		let mut len_bytes = [0u8; 4];
		stream.read_exact(&mut len_bytes)?;
		let footer_len = u32::from_le_bytes(len_bytes) as u64;
		let footer_start = end.checked_sub(8 + footer_len).ok_or_else(|| ParquetCoreError::corrupt("footer length exceeds file size"))?;

		stream.seek(SeekFrom::Start(footer_start))?;
		let existing = read_footer(&mut stream)?;

		let tree = crate::file::footer::from_thrift_schema(existing.schema)?;
		let leaves = physical_leaves(&tree);

		// Rewind to where the old footer began; subsequent row-group writes
		// overwrite it. True truncation (for a real file on disk, so a
		// shorter rewrite doesn't leave trailing garbage) is left to the
		// caller, since `Seek` alone has no portable truncate operation.
		stream.seek(SeekFrom::Start(footer_start))?;

		let custom_metadata = existing
			.key_value_metadata
			.unwrap_or_default()
			.into_iter()
			.map(|kv| (kv.key, kv.value.unwrap_or_default()))
			.collect();

		info!(existing_row_groups = existing.row_groups.len(), "reopened parquet writer in append mode");
		Ok(Writer { stream, schema, tree, leaves, options, row_groups: existing.row_groups, num_rows: existing.num_rows, custom_metadata })
	}
}

pub struct RowGroupWriter<'w, W> {
	writer: &'w mut Writer<W>,
	next_leaf: usize,
	columns: Vec<parquet_format_safe::ColumnChunk>,
	num_rows: Option<i64>,
	aborted: bool,
}

impl<'w, W: Write + Seek> RowGroupWriter<'w, W> {
	/// Writes the next leaf column in schema order (spec 4.5: "accepts
	/// column writes in schema order; attempting to write a column out of
	/// order fails").
	pub fn write_column(&mut self, column: DataColumn, codec_override: Option<crate::compression::Codec>, cancel: &CancellationToken) -> Result<()> {
		cancel.check()?;
		if self.aborted {
			return Err(ParquetCoreError::invalid_argument("row group already aborted by a previous error"));
		}
		let result = self.write_column_inner(column, codec_override);
		if result.is_err() {
			self.aborted = true;
		}
		result
	}

	fn write_column_inner(&mut self, column: DataColumn, codec_override: Option<crate::compression::Codec>) -> Result<()> {
		let leaf = self
			.writer
			.leaves
			.get(self.next_leaf)
			.ok_or_else(|| ParquetCoreError::invalid_argument("all columns for this row group have already been written"))?
			.clone();

		if leaf.physical_type == PhysicalType::Int96 && !self.writer.options.allow_int96_writes {
			return Err(ParquetCoreError::unsupported(format!(
				"column '{}' is physically INT96; enable WriterOptions::allow_int96_writes to write legacy INT96 timestamps",
				leaf.path.join(".")
			)));
		}

		let Field::Data(d) = &column.field else {
			return Err(ParquetCoreError::invalid_argument("write_column expects a leaf (data field) column"));
		};
		let (expected_physical, _, expected_type_length, _, _) = physical_repr(&d.logical_type)?;
		if expected_physical != leaf.physical_type || expected_type_length != leaf.type_length {
			return Err(ParquetCoreError::invalid_argument(format!(
				"column {} has logical type {:?} which does not match schema leaf '{}'",
				self.next_leaf,
				d.logical_type,
				leaf.path.join(".")
			)));
		}

		let row_count = if leaf.max_rl > 0 {
			column.repetition_levels.iter().filter(|&&r| r == 0).count() as i64
		} else if leaf.max_dl > 0 {
			column.definition_levels.len() as i64
		} else {
			column.values.len() as i64
		};
		match self.num_rows {
			Some(expected) if expected != row_count => {
				return Err(ParquetCoreError::invalid_argument(format!("column '{}' reports {} rows, row group expects {}", leaf.path.join("."), row_count, expected)));
			}
			None => self.num_rows = Some(row_count),
			_ => {}
		}

		let plan = ColumnChunkPlan {
			path: leaf.path.clone(),
			physical_type: leaf.physical_type,
			type_length: leaf.type_length,
			max_dl: leaf.max_dl,
			max_rl: leaf.max_rl,
			values: &column.values,
			definition_levels: &column.definition_levels,
			repetition_levels: &column.repetition_levels,
			codec: codec_override.unwrap_or(self.writer.options.compression),
			use_dictionary: self.writer.options.use_dictionary,
		};
		let chunk = write_column_chunk(&mut self.writer.stream, &plan)?;
		self.columns.push(chunk);
		self.next_leaf += 1;
		Ok(())
	}

	/// Seals the row group; requires every schema column to have been
	/// written (spec 4.5's state machine).
	pub fn close(self) -> Result<()> {
		if self.aborted {
			debug!("row group aborted, not appended to footer");
			return Ok(());
		}
		if self.next_leaf != self.writer.leaves.len() {
			return Err(ParquetCoreError::invalid_argument(format!(
				"row group closed after {} of {} columns were written",
				self.next_leaf,
				self.writer.leaves.len()
			)));
		}
		let num_rows = self.num_rows.unwrap_or(0);
		let total_byte_size: i64 = self.columns.iter().filter_map(|c| c.meta_data.as_ref()).map(|m| m.total_uncompressed_size).sum();
		let total_compressed_size: i64 = self.columns.iter().filter_map(|c| c.meta_data.as_ref()).map(|m| m.total_compressed_size).sum();
		let file_offset = self.columns.first().map(|c| c.file_offset).unwrap_or(0);
		self.writer.row_groups.push(RowGroup {
			columns: self.columns,
			total_byte_size,
			num_rows,
			sorting_columns: None,
			file_offset: Some(file_offset),
			total_compressed_size: Some(total_compressed_size),
			ordinal: Some(self.writer.row_groups.len() as i16),
		});
		self.writer.num_rows += num_rows;
		Ok(())
	}
}
