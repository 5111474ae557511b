//! Core codec for the Parquet columnar storage format: logical/physical
//! schema translation, Dremel-style record shredding, page assembly, and
//! file read/write. See `SPEC_FULL.md` in the repository root for the
//! full component breakdown this crate follows.

pub mod cancel;
pub mod column;
pub mod compression;
pub mod error;
pub mod file;
pub mod levels;
pub mod options;
pub mod page;
pub mod primitive;
pub mod schema;
pub mod value;

pub use cancel::CancellationToken;
pub use compression::Codec;
pub use error::{ParquetCoreError, Result};
pub use file::{Reader, RowGroupReader, RowGroupWriter, Writer};
pub use levels::Value;
pub use options::{ReaderOptions, WriterOptions};
pub use schema::{decode_schema, encode_schema, DataField, Field, ListField, LogicalType, MapField, Schema, StructField, TimeUnit};
pub use value::DataColumn;

use std::io::{Read, Seek, Write};

/// Opens a writer for `schema` over `stream`. `append` reopens an existing
/// file and pre-seeds its row-groups list instead of starting fresh (spec
/// section 4.5, 6).
pub fn open_writer<W: Write + Read + Seek>(schema: Schema, stream: W, options: WriterOptions, append: bool) -> Result<Writer<W>> {
	if append {
		Writer::open_append(schema, stream, options)
	} else {
		Writer::create(schema, stream, options)
	}
}

/// Opens a reader over `stream`, parsing the footer eagerly (spec section 6).
pub fn open_reader<R: Read + Seek>(stream: R) -> Result<Reader<R>> {
	Reader::open(stream)
}
