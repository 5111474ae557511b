use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{ParquetCoreError, Result};

/// Cooperative cancellation token (spec section 5).
///
/// Every I/O-bearing operation checks this before each page read/write and
/// between row groups. Triggering it does not itself interrupt anything; the
/// next checkpoint observes it and returns [`ParquetCoreError::Cancelled`].
#[derive(Clone, Default)]
pub struct CancellationToken {
	flag: Arc<AtomicBool>,
}

impl CancellationToken {
	pub fn new() -> Self {
		CancellationToken { flag: Arc::new(AtomicBool::new(false)) }
	}

	/// A token that never cancels; the default for callers that don't need one.
	pub fn none() -> Self {
		Self::new()
	}

	pub fn cancel(&self) {
		self.flag.store(true, Ordering::SeqCst);
	}

	pub fn is_cancelled(&self) -> bool {
		self.flag.load(Ordering::SeqCst)
	}

	pub fn check(&self) -> Result<()> {
		if self.is_cancelled() {
			Err(ParquetCoreError::Cancelled)
		} else {
			Ok(())
		}
	}
}
