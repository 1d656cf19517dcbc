//! NFLOG attribute decoding
//!
//! This module turns the raw attributes produced by
//! [`AttributeIter`](crate::netlink::attribute::AttributeIter) into the
//! fields of an [`Attribute`] record.
//!
//! # Value Encoding
//!
//! Attribute headers are in host byte order, but every integer the kernel
//! puts *inside* an NFLOG attribute is big-endian:
//!
//! ```text
//! NFULA_PACKET_HDR   [hw_protocol: be16][hook: u8 @ index 3]
//! NFULA_TIMESTAMP    [sec: be64][usec: be64], both signed
//! NFULA_HWADDR       [hw_addrlen: be16][pad: u16][hw_addr: hw_addrlen bytes]
//! NFULA_MARK, ...    [value: be32]
//! NFULA_HWTYPE, ...  [value: be16]
//! ```
//!
//! Every reader checks the value length before touching a byte and reports
//! [`DecodeError::ShortValue`] if it is too small.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::error::{DecodeError, Result};
use crate::netlink::attribute::{AttributeIter, RawAttribute};
use crate::netlink::structures::*;
use crate::sink::LogSink;
use crate::{Attribute, DecoderConfig};

// ============================================================================
// STREAM DECODING
// ============================================================================

/// Decode an attribute stream into `record`
///
/// `data` must start at the first attribute header (the pseudo-header, if
/// any, already skipped). Unknown attribute types are passed to `sink` and
/// skipped. The first malformed attribute aborts decoding; fields written
/// before that point are left in `record` but are not authoritative.
///
/// # Errors
///
/// Any malformed-stream [`DecodeError`] from the walker or the field readers.
pub fn decode_attributes<S>(
    data: &[u8],
    record: &mut Attribute,
    config: &DecoderConfig,
    sink: &S,
) -> Result<()>
where
    S: LogSink + ?Sized,
{
    for attr in AttributeIter::new(data, config.header_byte_order) {
        apply_attribute(&attr?, record, config, sink)?;
    }

    if let (Some(hw_len), Some(hw_header)) = (record.hw_len, record.hw_header.as_ref()) {
        if usize::from(hw_len) != hw_header.len() {
            sink.anomaly(&format!(
                "hardware header length {} does not match declared length {hw_len}",
                hw_header.len()
            ));
        }
    }

    Ok(())
}

/// Write one attribute into the record
fn apply_attribute<S>(
    attr: &RawAttribute<'_>,
    record: &mut Attribute,
    config: &DecoderConfig,
    sink: &S,
) -> Result<()>
where
    S: LogSink + ?Sized,
{
    let data = attr.data;

    match attr.kind {
        NFULA_PACKET_HDR => {
            let value = require(attr, 4)?;
            record.hw_protocol = Some(u16::from_be_bytes([value[0], value[1]]));
            record.hook = Some(value[3]);
        }
        NFULA_MARK => record.mark = Some(be_u32(attr)?),
        NFULA_TIMESTAMP => record.timestamp = Some(parse_timestamp(attr)?),
        NFULA_IFINDEX_INDEV => record.in_dev = Some(be_u32(attr)?),
        NFULA_IFINDEX_OUTDEV => record.out_dev = Some(be_u32(attr)?),
        NFULA_IFINDEX_PHYSINDEV => record.phys_in_dev = Some(be_u32(attr)?),
        NFULA_IFINDEX_PHYSOUTDEV => record.phys_out_dev = Some(be_u32(attr)?),
        NFULA_HWADDR => record.hw_addr = Some(parse_hw_addr(attr)?.to_vec()),
        NFULA_PAYLOAD => record.payload = Some(data.to_vec()),
        NFULA_PREFIX => record.prefix = Some(parse_prefix(data)),
        NFULA_UID => record.uid = Some(be_u32(attr)?),
        NFULA_SEQ => record.seq = Some(be_u32(attr)?),
        NFULA_SEQ_GLOBAL => record.seq_global = Some(be_u32(attr)?),
        NFULA_GID => record.gid = Some(be_u32(attr)?),
        NFULA_HWTYPE => record.hw_type = Some(be_u16(attr)?),
        NFULA_HWHEADER => record.hw_header = Some(data.to_vec()),
        NFULA_HWLEN => record.hw_len = Some(be_u16(attr)?),
        NFULA_CT => record.ct = Some(data.to_vec()),
        NFULA_CT_INFO => record.ct_info = Some(be_u32(attr)?),
        unknown => {
            // Newer kernels may send types we have never heard of
            let logged: &[u8] = if config.log_unknown_payload { data } else { &[] };
            sink.unknown_attribute(unknown, logged);
        }
    }

    Ok(())
}

// ============================================================================
// FIELD READERS
// ============================================================================

/// Value bytes, provided at least `expected` are present
fn require<'a>(attr: &RawAttribute<'a>, expected: usize) -> Result<&'a [u8]> {
    if attr.data.len() < expected {
        return Err(DecodeError::ShortValue {
            attr: attr.kind,
            expected,
            actual: attr.data.len(),
        });
    }
    Ok(attr.data)
}

fn be_u16(attr: &RawAttribute<'_>) -> Result<u16> {
    let value = require(attr, 2)?;
    Ok(u16::from_be_bytes([value[0], value[1]]))
}

fn be_u32(attr: &RawAttribute<'_>) -> Result<u32> {
    let value = require(attr, 4)?;
    Ok(u32::from_be_bytes([value[0], value[1], value[2], value[3]]))
}

fn be_i64(bytes: &[u8]) -> Option<i64> {
    let buf: [u8; 8] = bytes.get(..8)?.try_into().ok()?;
    Some(i64::from_be_bytes(buf))
}

/// `NFULA_TIMESTAMP`: signed seconds and microseconds since the epoch
fn parse_timestamp(attr: &RawAttribute<'_>) -> Result<SystemTime> {
    let value = require(attr, 16)?;
    let parts = be_i64(value).zip(value.get(8..).and_then(be_i64));
    let Some((seconds, micros)) = parts else {
        return Err(DecodeError::ShortValue {
            attr: attr.kind,
            expected: 16,
            actual: value.len(),
        });
    };
    timestamp_from_parts(seconds, micros)
}

/// Compose `seconds` + `micros` into an instant
///
/// Either part may be negative; microsecond counts of a second or more
/// carry into the seconds. Only instants `SystemTime` cannot hold fail.
pub(crate) fn timestamp_from_parts(seconds: i64, micros: i64) -> Result<SystemTime> {
    const NANOS_PER_SEC: u128 = 1_000_000_000;

    let total = i128::from(seconds) * 1_000_000_000 + i128::from(micros) * 1_000;
    let magnitude = total.unsigned_abs();
    let offset = u64::try_from(magnitude / NANOS_PER_SEC)
        .ok()
        .map(|secs| Duration::new(secs, (magnitude % NANOS_PER_SEC) as u32));

    let instant = if total >= 0 {
        offset.and_then(|d| UNIX_EPOCH.checked_add(d))
    } else {
        offset.and_then(|d| UNIX_EPOCH.checked_sub(d))
    };
    instant.ok_or(DecodeError::InvalidTimestamp { seconds, micros })
}

/// `NFULA_HWADDR`: length-prefixed hardware address
fn parse_hw_addr<'a>(attr: &RawAttribute<'a>) -> Result<&'a [u8]> {
    let value = require(attr, 4)?;
    let declared = usize::from(u16::from_be_bytes([value[0], value[1]]));
    value
        .get(4..4 + declared)
        .ok_or(DecodeError::InvalidNestedLength {
            declared,
            available: value.len() - 4,
        })
}

/// `NFULA_PREFIX`: text up to the first nul, or the whole value if none
fn parse_prefix(data: &[u8]) -> String {
    let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
    String::from_utf8_lossy(&data[..end]).into_owned()
}

// ============================================================================
// TESTS
// ============================================================================
