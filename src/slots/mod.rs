//! Per-slot session state.
//!
//! [`controller::SlotController`] is the only writer of the blob and metadata stores. It owns the
//! content handle for each slot, hydrates stored content on resume and heals metadata that points
//! at content which no longer exists.

/// Slot lifecycle, hydration and viewport commits.
pub mod controller;
/// Content handles and their ledger.
pub mod handle;
/// Slot identity.
pub mod slot;
