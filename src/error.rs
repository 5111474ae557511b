use thiserror::Error;

/// Structured failure surface for the whole crate.
///
/// Every fallible operation in this crate returns one of these four kinds
/// (spec section 7) instead of an opaque I/O exception. `Io` exists purely to
/// let `?` cross the boundary into the byte-stream collaborator; Thrift
/// (de)serialization errors are mapped to `CorruptFile` in both directions,
/// since the Thrift layer itself is an opaque collaborator we don't
/// categorize further.
#[derive(Error, Debug)]
pub enum ParquetCoreError {
	#[error("invalid argument: {0}")]
	InvalidArgument(String),

	#[error("corrupt file: {0}")]
	CorruptFile(String),

	#[error("unsupported: {0}")]
	Unsupported(String),

	#[error("operation cancelled")]
	Cancelled,

	#[error("io error: {0}")]
	Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ParquetCoreError>;

impl ParquetCoreError {
	pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
		ParquetCoreError::InvalidArgument(msg.into())
	}

	pub fn corrupt<S: Into<String>>(msg: S) -> Self {
		ParquetCoreError::CorruptFile(msg.into())
	}

	pub fn unsupported<S: Into<String>>(msg: S) -> Self {
		ParquetCoreError::Unsupported(msg.into())
	}
}
