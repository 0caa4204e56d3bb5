//! Persistence.
//!
//! Two tiers: small JSON records (slot metadata, settings) and per-slot binary content. Both fall
//! back to session memory when their backend is unavailable or refuses a write.

/// Per-slot binary content.
pub mod blob;
/// Slot metadata and settings records.
pub mod metadata;
/// Small JSON records with quota and memory fallback.
pub mod records;
