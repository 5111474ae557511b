//! Block compression (spec section 1: treated as an opaque `compress(bytes)
//! -> bytes` collaborator, keyed by codec id). Each codec is feature-gated
//! to match the optional dependency it pulls in, mirroring how
//! `jorgecarleitao-parquet2` structures its own compression feature flags.

use crate::error::{ParquetCoreError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
	Uncompressed,
	Snappy,
	Gzip,
	Brotli,
	Lz4,
	Zstd,
}

pub fn compress(codec: Codec, bytes: &[u8]) -> Result<Vec<u8>> {
	match codec {
		Codec::Uncompressed => Ok(bytes.to_vec()),
		#[cfg(feature = "snappy")]
		Codec::Snappy => {
			let mut encoder = snap::raw::Encoder::new();
			encoder.compress_vec(bytes).map_err(|e| ParquetCoreError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))
		}
		#[cfg(feature = "gzip")]
		Codec::Gzip => {
			use std::io::Write;
			let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
			encoder.write_all(bytes)?;
			encoder.finish().map_err(Into::into)
		}
		#[cfg(feature = "brotli")]
		Codec::Brotli => {
			let mut out = Vec::new();
			let params = brotli::enc::BrotliEncoderParams::default();
			brotli::BrotliCompress(&mut std::io::Cursor::new(bytes), &mut out, &params)?;
			Ok(out)
		}
		#[cfg(feature = "lz4")]
		Codec::Lz4 => Ok(lz4_flex::block::compress_prepend_size(bytes)),
		#[cfg(feature = "zstd")]
		Codec::Zstd => zstd::stream::encode_all(bytes, 0).map_err(Into::into),
		#[allow(unreachable_patterns)]
		other => Err(ParquetCoreError::unsupported(format!("codec {:?} was not compiled in (its cargo feature is disabled)", other))),
	}
}

pub fn decompress(codec: Codec, bytes: &[u8], uncompressed_size: usize) -> Result<Vec<u8>> {
	match codec {
		Codec::Uncompressed => Ok(bytes.to_vec()),
		#[cfg(feature = "snappy")]
		Codec::Snappy => {
			let mut decoder = snap::raw::Decoder::new();
			decoder.decompress_vec(bytes).map_err(|e| ParquetCoreError::CorruptFile(format!("snappy decompression failed: {}", e)))
		}
		#[cfg(feature = "gzip")]
		Codec::Gzip => {
			use std::io::Read;
			let mut decoder = flate2::read::GzDecoder::new(bytes);
			let mut out = Vec::with_capacity(uncompressed_size);
			decoder.read_to_end(&mut out).map_err(|e| ParquetCoreError::CorruptFile(format!("gzip decompression failed: {}", e)))?;
			Ok(out)
		}
		#[cfg(feature = "brotli")]
		Codec::Brotli => {
			let mut out = Vec::with_capacity(uncompressed_size);
			brotli::BrotliDecompress(&mut std::io::Cursor::new(bytes), &mut out)
				.map_err(|e| ParquetCoreError::CorruptFile(format!("brotli decompression failed: {}", e)))?;
			Ok(out)
		}
		#[cfg(feature = "lz4")]
		Codec::Lz4 => lz4_flex::block::decompress_size_prepended(bytes).map_err(|e| ParquetCoreError::CorruptFile(format!("lz4 decompression failed: {}", e))),
		#[cfg(feature = "zstd")]
		Codec::Zstd => zstd::stream::decode_all(bytes).map_err(|e| ParquetCoreError::CorruptFile(format!("zstd decompression failed: {}", e))),
		#[allow(unreachable_patterns)]
		other => Err(ParquetCoreError::unsupported(format!("codec {:?} was not compiled in (its cargo feature is disabled)", other))),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn uncompressed_is_identity() {
		let data = b"hello parquet".to_vec();
		let compressed = compress(Codec::Uncompressed, &data).unwrap();
		assert_eq!(compressed, data);
		let back = decompress(Codec::Uncompressed, &compressed, data.len()).unwrap();
		assert_eq!(back, data);
	}

	#[cfg(feature = "snappy")]
	#[test]
	fn snappy_round_trips() {
		let data = b"the quick brown fox the quick brown fox".to_vec();
		let compressed = compress(Codec::Snappy, &data).unwrap();
		let back = decompress(Codec::Snappy, &compressed, data.len()).unwrap();
		assert_eq!(back, data);
	}

	#[cfg(feature = "zstd")]
	#[test]
	fn zstd_round_trips() {
		let data = b"the quick brown fox the quick brown fox".to_vec();
		let compressed = compress(Codec::Zstd, &data).unwrap();
		let back = decompress(Codec::Zstd, &compressed, data.len()).unwrap();
		assert_eq!(back, data);
	}
}
