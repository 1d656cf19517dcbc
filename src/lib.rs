// ============================================================================
// NFLOG DECODER LIBRARY
// ============================================================================
// This library decodes messages delivered by the Linux Netfilter NFLOG
// subsystem into a structured record describing one logged packet.
//
// === KEY FEATURES ===
// 1. Detect the optional nfgenmsg pseudo-header in front of the attributes
// 2. Walk the Netlink attribute (TLV) stream with bounds checks on every slice
// 3. Convert big-endian attribute values into typed record fields
// 4. Report unknown attribute types to a pluggable sink instead of failing
//
// The decoder never does I/O. Opening the Netlink socket, joining the log
// group and receiving datagrams is left to the caller, which hands each
// received message to `Decoder::decode`.

use serde::{Deserialize, Serialize};
use std::time::SystemTime;

pub mod error;
pub mod netlink;
pub mod sink;

pub use error::{DecodeError, Result};
pub use netlink::structures::{ByteOrder, PseudoHeader, NATIVE_BYTE_ORDER};
pub use sink::{CollectingSink, LogCrateSink, LogSink, NullSink, SinkEvent};

use netlink::attribute::check_header;
use netlink::nflog::decode_attributes;
use netlink::structures::{ct_info_name, hook_name};

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// One logged packet, as reported by NFLOG
///
/// Every field is `None` unless the matching attribute was present in the
/// message. Byte fields hold exactly the bytes the attribute declared.
///
/// # Example
///
/// ```
/// # use nflog_decode::extract_attributes;
/// let mut msg = vec![2, 0, 0, 1]; // AF_INET, NFNETLINK_V0, group 1
/// msg.extend_from_slice(&8u16.to_ne_bytes());
/// msg.extend_from_slice(&2u16.to_ne_bytes()); // NFULA_MARK
/// msg.extend_from_slice(&[0x00, 0x00, 0x10, 0x00]);
///
/// let attrs = extract_attributes(&msg)?;
/// assert_eq!(attrs.mark, Some(4096));
/// assert_eq!(attrs.payload, None);
/// # Ok::<(), nflog_decode::DecodeError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Attribute {
    /// Link-layer protocol (ethertype) of the packet
    pub hw_protocol: Option<u16>,
    /// Netfilter hook the packet was logged at
    pub hook: Option<u8>,
    /// Packet mark
    pub mark: Option<u32>,
    /// Capture time, microsecond precision
    pub timestamp: Option<SystemTime>,
    /// Interface index the packet arrived on (may be a bridge)
    pub in_dev: Option<u32>,
    /// Interface index the packet is leaving on (may be a bridge)
    pub out_dev: Option<u32>,
    /// Physical interface index the packet arrived on
    pub phys_in_dev: Option<u32>,
    /// Physical interface index the packet is leaving on
    pub phys_out_dev: Option<u32>,
    /// Hardware source address
    pub hw_addr: Option<Vec<u8>>,
    /// Packet bytes from the network layer up
    pub payload: Option<Vec<u8>>,
    /// Log rule prefix
    pub prefix: Option<String>,
    /// UID owning the socket
    pub uid: Option<u32>,
    /// GID owning the socket
    pub gid: Option<u32>,
    /// Per-instance sequence number
    pub seq: Option<u32>,
    /// Global sequence number
    pub seq_global: Option<u32>,
    /// `ARPHRD_*` hardware type
    pub hw_type: Option<u16>,
    /// Raw link-layer header
    pub hw_header: Option<Vec<u8>>,
    /// Length of the link-layer header
    pub hw_len: Option<u16>,
    /// Opaque conntrack attributes
    pub ct: Option<Vec<u8>>,
    /// `ip_conntrack_info` state
    pub ct_info: Option<u32>,
}

impl Attribute {
    /// Name of the netfilter hook, if one was reported
    #[must_use]
    pub fn hook_name(&self) -> Option<&'static str> {
        self.hook.map(hook_name)
    }

    /// Name of the conntrack state, if one was reported
    #[must_use]
    pub fn ct_info_name(&self) -> Option<&'static str> {
        self.ct_info.map(ct_info_name)
    }
}

/// A decoded message together with its pseudo-header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogMessage {
    /// The `nfgenmsg` prefix, if the buffer carried one
    pub header: Option<PseudoHeader>,
    /// Fields decoded from the attribute stream
    pub attributes: Attribute,
}

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Decoder settings
///
/// Deserializes with defaults for missing keys, so it can be embedded in an
/// application's own configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Byte order of the attribute headers (not of the values)
    pub header_byte_order: ByteOrder,
    /// Pass the raw bytes of unknown attributes to the sink
    pub log_unknown_payload: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            header_byte_order: NATIVE_BYTE_ORDER,
            log_unknown_payload: true,
        }
    }
}

// ============================================================================
// DECODER
// ============================================================================

/// Stateless NFLOG message decoder
///
/// Holds only its configuration and sink, so one instance can decode from
/// many threads at once as long as each call gets its own buffer.
#[derive(Debug, Clone, Default)]
pub struct Decoder<S = LogCrateSink> {
    config: DecoderConfig,
    sink: S,
}

impl<S: LogSink> Decoder<S> {
    #[must_use]
    pub const fn new(config: DecoderConfig, sink: S) -> Self {
        Self { config, sink }
    }

    #[must_use]
    pub const fn config(&self) -> &DecoderConfig {
        &self.config
    }

    #[must_use]
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// Decode one NFLOG message into a fresh record
    ///
    /// `data` may or may not start with the `nfgenmsg` pseudo-header.
    ///
    /// # Errors
    ///
    /// * [`DecodeError::Unsupported`] if `data` is shorter than two bytes
    /// * any malformed-stream variant if an attribute is inconsistent with
    ///   the buffer
    pub fn decode(&self, data: &[u8]) -> Result<Attribute> {
        self.decode_message(data).map(|msg| msg.attributes)
    }

    /// Decode one NFLOG message, keeping the pseudo-header
    ///
    /// # Errors
    ///
    /// Same as [`Decoder::decode`].
    pub fn decode_message(&self, data: &[u8]) -> Result<LogMessage> {
        // === STEP 1: Skip the pseudo-header, if any ===
        let offset = check_header(data)?;
        let header = if offset > 0 {
            PseudoHeader::parse(data)
        } else {
            None
        };
        let Some(stream) = data.get(offset..) else {
            return Err(DecodeError::Truncated {
                offset: 0,
                needed: offset,
                available: data.len(),
            });
        };

        // === STEP 2: Decode the attributes ===
        let mut attributes = Attribute::default();
        decode_attributes(stream, &mut attributes, &self.config, &self.sink)?;

        Ok(LogMessage { header, attributes })
    }
}

/// Decode one NFLOG message with the default configuration
///
/// Unknown attributes are logged through the `log` crate.
///
/// # Errors
///
/// Same as [`Decoder::decode`].
pub fn extract_attributes(data: &[u8]) -> Result<Attribute> {
    Decoder::new(DecoderConfig::default(), LogCrateSink).decode(data)
}

// ============================================================================
// UNIT TESTS
// ============================================================================
