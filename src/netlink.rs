//! Netfilter NFLOG wire format
//!
//! This module decodes the attribute stream of an NFLOG packet message.
//! It does not open sockets or receive anything; callers pass in a buffer
//! they already got from the kernel (or from a capture file).
//!
//! # Architecture
//!
//! - `structures`: constants, the pseudo-header, byte order, alignment
//! - `attribute`: pseudo-header detection and the bounds-checked TLV walker
//! - `nflog`: per-attribute decoding into [`crate::Attribute`]
//!
//! # Message Format
//!
//! ```text
//! ┌─────────────────────────────┐
//! │ nfgenmsg (4 bytes, opt.)    │  ← family, version, resource id
//! ├─────────────────────────────┤
//! │ Attribute 1                 │  ← nla_len, nla_type, value, padding
//! ├─────────────────────────────┤
//! │ ...                         │
//! ├─────────────────────────────┤
//! │ Attribute N                 │
//! └─────────────────────────────┘
//! ```

// ============================================================================
// SUBMODULE DECLARATIONS
// ============================================================================

pub mod attribute; // Pseudo-header detection and TLV iteration
pub mod nflog; // NFLOG attribute decoding
pub mod structures; // Constants and binary layout helpers

// ============================================================================
// PUBLIC RE-EXPORTS
// ============================================================================

pub use attribute::{check_header, AttributeIter, RawAttribute};
pub use nflog::decode_attributes;
