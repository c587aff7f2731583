//! Scoped ownership of an open blob

use super::BlobHandle;
use crate::errors::Result;

/// Owns an open blob and guarantees it is closed exactly once
///
/// `close()` consumes the guard and reports the close result. If the
/// guard is dropped instead (an early `?` return), the blob is aborted
/// from `Drop` and any error is logged, so it never replaces the error
/// that caused the early return.
pub struct BlobGuard<B: BlobHandle> {
    blob: B,
    name: String,
    closed: bool,
}

impl<B: BlobHandle> BlobGuard<B> {
    pub fn new(blob: B, name: impl Into<String>) -> Self {
        Self {
            blob,
            name: name.into(),
            closed: false,
        }
    }

    /// Borrow the blob for streaming
    pub fn blob(&mut self) -> &mut B {
        &mut self.blob
    }

    /// Close the blob and report the result
    pub fn close(mut self) -> Result<()> {
        self.closed = true;
        self.blob.close()
    }
}

impl<B: BlobHandle> Drop for BlobGuard<B> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Err(e) = self.blob.abort() {
            tracing::warn!(
                blob = %self.name,
                err.code = e.code(),
                "releasing blob on error path failed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modelzoo_core::{ExError, ExErrorKind};
    use std::cell::Cell;
    use std::rc::Rc;

    struct Counting {
        closes: Rc<Cell<usize>>,
        fail: bool,
    }

    impl BlobHandle for Counting {
        fn close(&mut self) -> Result<()> {
            self.closes.set(self.closes.get() + 1);
            if self.fail {
                Err(ExError::new(ExErrorKind::BlobCloseFailure))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn test_explicit_close_runs_once() {
        let closes = Rc::new(Cell::new(0));
        let guard = BlobGuard::new(
            Counting {
                closes: Rc::clone(&closes),
                fail: false,
            },
            "t",
        );
        guard.close().unwrap();
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn test_drop_closes_once() {
        let closes = Rc::new(Cell::new(0));
        {
            let _guard = BlobGuard::new(
                Counting {
                    closes: Rc::clone(&closes),
                    fail: true,
                },
                "t",
            );
        }
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn test_close_error_is_reported() {
        let closes = Rc::new(Cell::new(0));
        let guard = BlobGuard::new(
            Counting {
                closes: Rc::clone(&closes),
                fail: true,
            },
            "t",
        );
        let err = guard.close().unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::BlobCloseFailure);
        assert_eq!(closes.get(), 1);
    }
}
