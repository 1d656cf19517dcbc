//! Netlink attribute (TLV) iteration
//!
//! This module walks the attribute stream of an NFLOG message and hands
//! out one raw attribute at a time. It knows nothing about what the
//! attributes mean; that is the job of [`crate::netlink::nflog`].
//!
//! # Attribute Format
//!
//! ```text
//! ┌────────────────┐
//! │ nla_len: u16   │ ← header + value, host byte order
//! │ nla_type: u16  │ ← top two bits are flags (nested, net byte order)
//! ├────────────────┤
//! │ Value          │ ← nla_len - 4 bytes
//! ├────────────────┤
//! │ Padding        │ ← 0-3 bytes (align to 4-byte boundary)
//! └────────────────┘
//! ```
//!
//! ## Message Layout
//!
//! The kernel prefixes the attributes of an NFLOG packet message with a
//! 4-byte `nfgenmsg`. Buffers taken from other sources (pcap captures, the
//! payload of an already-stripped message) may start directly with the
//! first attribute. [`check_header`] tells the two apart.
//!
//! ## Bounds
//!
//! Every length in the stream comes from outside the process. Each slice
//! is taken with `get()` and a failed lookup becomes a [`DecodeError`];
//! nothing here can index past the end of the buffer.

use crate::error::{DecodeError, Result};
use crate::netlink::structures::*;

// ============================================================================
// PSEUDO-HEADER DETECTION
// ============================================================================

/// Offset at which the attribute stream starts
///
/// Returns [`NFGENMSG_LEN`] when the buffer starts with an `nfgenmsg`
/// (family `AF_INET` or `AF_INET6` followed by `NFNETLINK_V0`), and `0`
/// otherwise.
///
/// # Errors
///
/// A buffer shorter than two bytes cannot be inspected and is rejected with
/// [`DecodeError::Unsupported`] rather than treated as empty.
///
/// # Example
///
/// ```
/// # use nflog_decode::netlink::attribute::check_header;
/// # use nflog_decode::netlink::structures::{AF_INET, NFNETLINK_V0};
/// assert_eq!(check_header(&[AF_INET, NFNETLINK_V0, 0, 1])?, 4);
/// assert_eq!(check_header(&[8, 0, 2, 0])?, 0);
/// # Ok::<(), nflog_decode::DecodeError>(())
/// ```
pub fn check_header(data: &[u8]) -> Result<usize> {
    match data {
        [family, version, ..] => {
            if (*family == AF_INET || *family == AF_INET6) && *version == NFNETLINK_V0 {
                Ok(NFGENMSG_LEN)
            } else {
                Ok(0)
            }
        }
        _ => Err(DecodeError::Unsupported { len: data.len() }),
    }
}

// ============================================================================
// RAW ATTRIBUTES
// ============================================================================

/// One attribute as it appears in the stream
///
/// Only lives while the stream is being walked; the value borrows from the
/// input buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawAttribute<'a> {
    /// Attribute type with the flag bits masked off
    pub kind: u16,
    /// The `NLA_F_NESTED` / `NLA_F_NET_BYTEORDER` bits that were set
    pub flags: u16,
    /// Value bytes, exactly `nla_len - 4` long
    pub data: &'a [u8],
}

impl RawAttribute<'_> {
    #[must_use]
    pub const fn is_nested(&self) -> bool {
        self.flags & NLA_F_NESTED != 0
    }
}

/// Iterator over the attributes of a stream
///
/// Yields `Err` once for the first malformed attribute and then stops.
///
/// # Example
///
/// ```
/// # use nflog_decode::netlink::attribute::AttributeIter;
/// # use nflog_decode::netlink::structures::{NATIVE_BYTE_ORDER, NFULA_MARK};
/// let mut data = Vec::new();
/// data.extend_from_slice(&8u16.to_ne_bytes());
/// data.extend_from_slice(&NFULA_MARK.to_ne_bytes());
/// data.extend_from_slice(&[0x00, 0x00, 0x10, 0x00]);
///
/// let attrs = AttributeIter::new(&data, NATIVE_BYTE_ORDER).collect::<Result<Vec<_>, _>>()?;
/// assert_eq!(attrs.len(), 1);
/// assert_eq!(attrs[0].kind, NFULA_MARK);
/// assert_eq!(attrs[0].data, &[0x00, 0x00, 0x10, 0x00]);
/// # Ok::<(), nflog_decode::DecodeError>(())
/// ```
#[derive(Debug, Clone)]
pub struct AttributeIter<'a> {
    data: &'a [u8],
    offset: usize,
    order: ByteOrder,
    failed: bool,
}

impl<'a> AttributeIter<'a> {
    /// Walk `data`, which must start at the first attribute header
    #[must_use]
    pub const fn new(data: &'a [u8], order: ByteOrder) -> Self {
        Self {
            data,
            offset: 0,
            order,
            failed: false,
        }
    }

    /// Offset of the next attribute header, relative to the stream start
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    fn read_next(&mut self) -> Result<RawAttribute<'a>> {
        let offset = self.offset;
        let rest = self.data.get(offset..).unwrap_or_default();

        // === STEP 1: Read the header ===
        let Some(header) = rest.get(..NLA_HDRLEN) else {
            return Err(DecodeError::Truncated {
                offset,
                needed: NLA_HDRLEN,
                available: rest.len(),
            });
        };
        let attr_len = usize::from(self.order.read_u16([header[0], header[1]]));
        let attr_type = self.order.read_u16([header[2], header[3]]);

        // A length shorter than the header would never advance the cursor
        if attr_len < NLA_HDRLEN {
            return Err(DecodeError::InvalidLength {
                offset,
                length: attr_len,
            });
        }

        // === STEP 2: Slice the value ===
        let Some(value) = rest.get(NLA_HDRLEN..attr_len) else {
            return Err(DecodeError::Truncated {
                offset,
                needed: attr_len,
                available: rest.len(),
            });
        };

        // === STEP 3: Move to the next 4-byte boundary ===
        //
        // Padding after the last attribute may be missing from the buffer;
        // the iterator then simply ends.
        self.offset = nla_align(attr_len)
            .and_then(|aligned| offset.checked_add(aligned))
            .unwrap_or(self.data.len());

        Ok(RawAttribute {
            kind: attr_type & NLA_TYPE_MASK,
            flags: attr_type & !NLA_TYPE_MASK,
            data: value,
        })
    }
}

impl<'a> Iterator for AttributeIter<'a> {
    type Item = Result<RawAttribute<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.offset >= self.data.len() {
            return None;
        }

        let item = self.read_next();
        if item.is_err() {
            self.failed = true;
        }
        Some(item)
    }
}

impl std::iter::FusedIterator for AttributeIter<'_> {}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Append one attribute with padding
    fn push_attr(buf: &mut Vec<u8>, attr_type: u16, value: &[u8]) {
        let len = (NLA_HDRLEN + value.len()) as u16;
        buf.extend_from_slice(&len.to_ne_bytes());
        buf.extend_from_slice(&attr_type.to_ne_bytes());
        buf.extend_from_slice(value);
        while buf.len() % 4 != 0 {
            buf.push(0);
        }
    }

    fn collect(data: &[u8]) -> Result<Vec<RawAttribute<'_>>> {
        AttributeIter::new(data, NATIVE_BYTE_ORDER).collect()
    }

    #[test]
    fn test_check_header_inet() {
        assert_eq!(check_header(&[AF_INET, NFNETLINK_V0]), Ok(4));
        assert_eq!(check_header(&[AF_INET6, NFNETLINK_V0, 0, 0]), Ok(4));
    }

    #[test]
    fn test_check_header_absent() {
        // Wrong version
        assert_eq!(check_header(&[AF_INET, 1]), Ok(0));
        // Bridge family is not a pseudo-header we skip
        assert_eq!(check_header(&[AF_BRIDGE, NFNETLINK_V0]), Ok(0));
        // Start of an attribute header (len = 8 on little-endian)
        assert_eq!(check_header(&[8, 0, 2, 0]), Ok(0));
    }

    #[test]
    fn test_check_header_too_short() {
        assert_eq!(
            check_header(&[AF_INET]),
            Err(DecodeError::Unsupported { len: 1 })
        );
        assert_eq!(check_header(&[]), Err(DecodeError::Unsupported { len: 0 }));
    }

    #[test]
    fn test_iter_empty() {
        let attrs = collect(&[]).expect("Should handle empty data");
        assert!(attrs.is_empty());
    }

    #[test]
    fn test_iter_multiple_with_padding() {
        let mut data = Vec::new();
        push_attr(&mut data, NFULA_HWTYPE, &[0x00, 0x01]);
        push_attr(&mut data, NFULA_MARK, &[0x33, 0x44, 0x55, 0x66]);

        let attrs = collect(&data).expect("Should parse successfully");

        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs[0].kind, NFULA_HWTYPE);
        assert_eq!(attrs[0].data, &[0x00, 0x01]);
        assert_eq!(attrs[1].kind, NFULA_MARK);
        assert_eq!(attrs[1].data, &[0x33, 0x44, 0x55, 0x66]);
    }

    #[test]
    fn test_iter_masks_flags() {
        let mut data = Vec::new();
        push_attr(&mut data, NFULA_HWADDR | NLA_F_NESTED, &[0; 4]);

        let attrs = collect(&data).expect("Should parse successfully");

        assert_eq!(attrs[0].kind, NFULA_HWADDR);
        assert_eq!(attrs[0].flags, NLA_F_NESTED);
        assert!(attrs[0].is_nested());
    }

    #[test]
    fn test_iter_missing_final_padding() {
        let mut data = Vec::new();
        push_attr(&mut data, NFULA_PREFIX, b"ab");
        // Drop the 2 padding bytes after the final attribute
        data.truncate(data.len() - 2);

        let attrs = collect(&data).expect("Final padding is optional");
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs[0].data, b"ab");
    }

    #[test]
    fn test_iter_length_exceeds_buffer() {
        let mut data = Vec::new();
        data.extend_from_slice(&64u16.to_ne_bytes());
        data.extend_from_slice(&NFULA_PAYLOAD.to_ne_bytes());
        data.extend_from_slice(&[0xAA; 8]);

        let err = collect(&data).expect_err("Declared length runs past the end");
        assert_eq!(
            err,
            DecodeError::Truncated {
                offset: 0,
                needed: 64,
                available: 12,
            }
        );
        assert!(err.is_malformed());
    }

    #[test]
    fn test_iter_length_below_header() {
        let mut data = Vec::new();
        data.extend_from_slice(&2u16.to_ne_bytes());
        data.extend_from_slice(&NFULA_MARK.to_ne_bytes());

        let err = collect(&data).expect_err("Zero-progress length");
        assert_eq!(err, DecodeError::InvalidLength { offset: 0, length: 2 });
    }

    #[test]
    fn test_iter_trailing_partial_header() {
        let mut data = Vec::new();
        push_attr(&mut data, NFULA_MARK, &[0, 0, 0, 1]);
        data.extend_from_slice(&[0x08, 0x00]);

        let mut iter = AttributeIter::new(&data, NATIVE_BYTE_ORDER);
        assert!(iter.next().expect("first attribute").is_ok());
        assert_eq!(
            iter.next().expect("error item"),
            Err(DecodeError::Truncated {
                offset: 8,
                needed: NLA_HDRLEN,
                available: 2,
            })
        );
        // Fused after the error
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_iter_foreign_byte_order() {
        let foreign = match NATIVE_BYTE_ORDER {
            ByteOrder::Little => ByteOrder::Big,
            ByteOrder::Big => ByteOrder::Little,
        };
        let mut data = Vec::new();
        push_attr(&mut data, NFULA_MARK, &[0, 0, 0, 1]);

        // Header read in the wrong order turns 8 into 2048
        let err = AttributeIter::new(&data, foreign)
            .collect::<Result<Vec<_>>>()
            .expect_err("Wrong header byte order");
        assert!(matches!(err, DecodeError::Truncated { needed: 2048, .. }));
    }
}
