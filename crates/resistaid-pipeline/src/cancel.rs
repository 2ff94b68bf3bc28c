use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use resistaid_common::{ResistaidError, Result};

use crate::stage::RunStage;

/// Cooperative cancellation flag, checked between stages.
#[derive(Debug, Clone, Default)]
pub struct Cancellation(Arc<AtomicBool>);

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// `Cancelled` naming the stage that would have run next.
    pub fn check(&self, next: RunStage) -> Result<()> {
        if self.is_cancelled() {
            Err(ResistaidError::Cancelled(next.as_str().to_string()))
        } else {
            Ok(())
        }
    }
}
