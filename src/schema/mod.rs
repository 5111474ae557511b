pub mod decode;
pub mod encode;
pub mod logical;
pub mod physical;

pub use decode::decode_schema;
pub use encode::encode_schema;
pub use logical::{DataField, Field, ListField, LogicalType, MapField, Schema, StructField, TimeUnit};
pub use physical::{ConvertedType, PhysicalType, Repetition, SchemaElement, SchemaNode, SchemaTree};
