use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::assets::decode::DecodedImage;

/// Shared counter of issued and released content handles.
#[derive(Debug, Default)]
pub struct HandleLedger {
    issued: AtomicU64,
    released: AtomicU64,
}

impl HandleLedger {
    /// Fresh ledger behind an `Arc`.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Handles issued so far.
    pub fn issued(&self) -> u64 {
        self.issued.load(Ordering::Relaxed)
    }

    /// Handles released so far.
    pub fn released(&self) -> u64 {
        self.released.load(Ordering::Relaxed)
    }

    /// Handles issued and not yet released.
    pub fn outstanding(&self) -> u64 {
        self.issued().saturating_sub(self.released())
    }

    /// Issue a handle over `image`.
    pub fn issue(self: &Arc<Self>, image: DecodedImage) -> ContentHandle {
        let id = self.issued.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::debug!(handle = id, w = image.width, h = image.height, "content handle issued");
        ContentHandle {
            id,
            image: Arc::new(image),
            ledger: Arc::clone(self),
        }
    }
}

/// Render-ready reference to one slot's current content.
///
/// Not `Clone`: dropping the value is the release, so each issued handle is released exactly once.
#[derive(Debug)]
pub struct ContentHandle {
    id: u64,
    image: Arc<DecodedImage>,
    ledger: Arc<HandleLedger>,
}

impl ContentHandle {
    /// Ledger-assigned id, starting at 1.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Decoded content.
    pub fn image(&self) -> &DecodedImage {
        &self.image
    }
}

impl Drop for ContentHandle {
    fn drop(&mut self) {
        self.ledger.released.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(handle = self.id, "content handle released");
    }
}

#[cfg(test)]
#[path = "../../tests/unit/slots/handle.rs"]
mod tests;
