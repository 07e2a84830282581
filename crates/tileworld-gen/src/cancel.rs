//! Cooperative cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tileworld_common::{GenError, GenResult};

/// Shared flag checked between generation stages.
///
/// Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Creates a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Fails with [`GenError::Cancelled`] once cancellation was requested.
    pub fn check(&self) -> GenResult<()> {
        if self.is_cancelled() {
            Err(GenError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_flag() {
        let token = CancelToken::new();
        let other = token.clone();
        assert!(token.check().is_ok());

        other.cancel();
        assert!(token.is_cancelled());
        assert!(matches!(token.check(), Err(GenError::Cancelled)));
    }
}
