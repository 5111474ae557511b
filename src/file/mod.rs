pub mod footer;
pub mod magic;
pub mod reader;
pub mod writer;

pub use reader::{Reader, RowGroupReader};
pub use writer::{RowGroupWriter, Writer};
