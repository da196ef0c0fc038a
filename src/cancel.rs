//! Cooperative cancellation: every operation accepts an
//! optional signal that is checked at chunk and KV-call boundaries. Firing
//! it stops the operation with a `Cancelled` error; no KV writes already
//! applied are rolled back.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{Error, Result};

/// A cheap, `Clone`-able cancellation flag. `None` (via `Cancel::none()`)
/// means "never cancelled" and is the default for callers that don't need
/// it.
#[derive(Debug, Clone, Default)]
pub struct Cancel(Option<Arc<AtomicBool>>);

impl Cancel {
    /// A token that can never be fired; the cheapest option for callers
    /// with no cancellation source.
    pub fn none() -> Self {
        Cancel(None)
    }

    /// Creates a live token paired with the handle used to fire it.
    pub fn new() -> (Self, CancelHandle) {
        let flag = Arc::new(AtomicBool::new(false));
        (Cancel(Some(flag.clone())), CancelHandle(flag))
    }

    pub fn is_cancelled(&self) -> bool {
        match &self.0 {
            Some(flag) => flag.load(Ordering::Acquire),
            None => false,
        }
    }

    /// Returns `Err(Cancelled)` if the token has fired, `Ok(())` otherwise.
    /// Intended to be called at every chunk boundary in the executor and
    /// index manager scans.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(Error::cancelled());
        }
        Ok(())
    }
}

/// The write side of a `Cancel` token, held by whoever can decide to abort
/// an in-flight operation (e.g. a front end reacting to client disconnect).
#[derive(Debug, Clone)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_token_never_cancels() {
        assert!(Cancel::none().check().is_ok());
    }

    #[test]
    fn firing_the_handle_cancels_the_token() {
        let (token, handle) = Cancel::new();
        assert!(token.check().is_ok());
        handle.cancel();
        assert!(token.check().is_err());
    }

    #[test]
    fn cloned_tokens_observe_the_same_cancellation() {
        let (token, handle) = Cancel::new();
        let clone = token.clone();
        handle.cancel();
        assert!(clone.is_cancelled());
    }
}
