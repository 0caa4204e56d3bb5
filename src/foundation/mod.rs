//! Shared value types and the crate error taxonomy.

pub(crate) mod core;
pub(crate) mod error;
