//! Writer/reader options (spec section 6).

use crate::compression::Codec;

#[derive(Debug, Clone)]
pub struct WriterOptions {
	pub compression: Codec,
	pub row_group_size: usize,
	pub use_dictionary: bool,
	pub created_by: String,
	/// Supplemented feature (SPEC_FULL): INT96 is legacy and several modern
	/// readers reject it outright, so writing it is opt-in.
	pub allow_int96_writes: bool,
}

impl Default for WriterOptions {
	fn default() -> Self {
		WriterOptions {
			compression: Codec::Snappy,
			row_group_size: 5000,
			use_dictionary: true,
			created_by: "parquet-core version 1.0".to_string(),
			allow_int96_writes: false,
		}
	}
}

impl WriterOptions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_compression(mut self, codec: Codec) -> Self {
		self.compression = codec;
		self
	}

	pub fn with_row_group_size(mut self, rows: usize) -> Self {
		self.row_group_size = rows;
		self
	}

	pub fn with_dictionary(mut self, enabled: bool) -> Self {
		self.use_dictionary = enabled;
		self
	}

	pub fn with_created_by(mut self, created_by: impl Into<String>) -> Self {
		self.created_by = created_by.into();
		self
	}

	pub fn with_allow_int96_writes(mut self, allowed: bool) -> Self {
		self.allow_int96_writes = allowed;
		self
	}
}

#[derive(Debug, Clone, Default)]
pub struct ReaderOptions {
	/// Decode BYTE_ARRAY columns with no UTF8 converted type as `Utf8`
	/// instead of `ByteArray` (spec section 6, read-side only).
	pub treat_byte_array_as_string: bool,
}

impl ReaderOptions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_treat_byte_array_as_string(mut self, enabled: bool) -> Self {
		self.treat_byte_array_as_string = enabled;
		self
	}
}
