//! Protocol decoding modules.
//!
//! Each protocol follows a layered structure:
//! - `layout`: byte offsets, masks and wire constants (source of truth)
//! - `reader`: bounded byte access
//! - `parser`: domain-level decoding (no direct byte indexing)
//! - `error`: explicit errors carrying the failing offset
//!
//! Parsers are pure and contain no I/O; sources and analysis layers handle
//! file access and aggregation.

pub(crate) mod common;
pub mod mmrp;
