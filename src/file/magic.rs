//! The four-byte magic that opens and closes every Parquet file (spec
//! section 4.5, section 6).

pub const MAGIC: &[u8; 4] = b"PAR1";

use std::io::{Read, Write};

use crate::error::{ParquetCoreError, Result};

pub fn write_magic<W: Write>(w: &mut W) -> Result<()> {
	w.write_all(MAGIC)?;
	Ok(())
}

pub fn read_and_verify_magic<R: Read>(r: &mut R) -> Result<()> {
	let mut buf = [0u8; 4];
	r.read_exact(&mut buf).map_err(|_| ParquetCoreError::corrupt("file shorter than the leading magic"))?;
	verify_bytes(&buf)
}

pub fn verify_bytes(buf: &[u8; 4]) -> Result<()> {
	if buf != MAGIC {
		return Err(ParquetCoreError::corrupt("missing or mismatched magic"));
	}
	Ok(())
}
