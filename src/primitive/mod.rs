pub mod dictionary;
pub mod plain;
pub mod rle;

pub use dictionary::{build_dictionary, decode_indices, encode_indices, should_use_dictionary, Dictionary};
pub use plain::{decode_plain, encode_plain};
pub use rle::{bit_width_for_max, decode_hybrid, encode_hybrid, encode_hybrid_with_length_prefix};
