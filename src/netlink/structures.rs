//! Binary structures and constants for Netfilter NFLOG messages
//!
//! Attribute headers follow host byte order (as all Netlink headers do),
//! while the integer values carried inside NFLOG attributes are in network
//! byte order (big-endian). The pseudo-header's resource id is big-endian too.

use serde::{Deserialize, Serialize};

// ATTRIBUTE HEADER

/// Size of a Netlink attribute header (`nla_len: u16` + `nla_type: u16`)
pub const NLA_HDRLEN: usize = 4;

/// Size of the `nfgenmsg` pseudo-header that may precede the attributes
pub const NFGENMSG_LEN: usize = 4;

// Attribute type flag bits
pub const NLA_F_NESTED: u16 = 1 << 15;
pub const NLA_F_NET_BYTEORDER: u16 = 1 << 14;
pub const NLA_TYPE_MASK: u16 = !(NLA_F_NESTED | NLA_F_NET_BYTEORDER);

// Address families
pub const AF_UNSPEC: u8 = 0;
pub const AF_INET: u8 = 2;
pub const AF_BRIDGE: u8 = 7;
pub const AF_INET6: u8 = 10;

// nfnetlink protocol version
pub const NFNETLINK_V0: u8 = 0;

// NFLOG ATTRIBUTES (linux/netfilter/nfnetlink_log.h)

pub const NFULA_PACKET_HDR: u16 = 1;
pub const NFULA_MARK: u16 = 2;
pub const NFULA_TIMESTAMP: u16 = 3;
pub const NFULA_IFINDEX_INDEV: u16 = 4;
pub const NFULA_IFINDEX_OUTDEV: u16 = 5;
pub const NFULA_IFINDEX_PHYSINDEV: u16 = 6;
pub const NFULA_IFINDEX_PHYSOUTDEV: u16 = 7;
pub const NFULA_HWADDR: u16 = 8;
pub const NFULA_PAYLOAD: u16 = 9;
pub const NFULA_PREFIX: u16 = 10;
pub const NFULA_UID: u16 = 11;
pub const NFULA_SEQ: u16 = 12;
pub const NFULA_SEQ_GLOBAL: u16 = 13;
pub const NFULA_GID: u16 = 14;
pub const NFULA_HWTYPE: u16 = 15;
pub const NFULA_HWHEADER: u16 = 16;
pub const NFULA_HWLEN: u16 = 17;
pub const NFULA_CT: u16 = 18;
pub const NFULA_CT_INFO: u16 = 19;

// Netfilter inet hooks
pub const NF_INET_PRE_ROUTING: u8 = 0;
pub const NF_INET_LOCAL_IN: u8 = 1;
pub const NF_INET_FORWARD: u8 = 2;
pub const NF_INET_LOCAL_OUT: u8 = 3;
pub const NF_INET_POST_ROUTING: u8 = 4;
pub const NF_INET_INGRESS: u8 = 5;

// enum ip_conntrack_info
pub const IP_CT_ESTABLISHED: u32 = 0;
pub const IP_CT_RELATED: u32 = 1;
pub const IP_CT_NEW: u32 = 2;
pub const IP_CT_IS_REPLY: u32 = 3;
pub const IP_CT_ESTABLISHED_REPLY: u32 = IP_CT_ESTABLISHED + IP_CT_IS_REPLY;
pub const IP_CT_RELATED_REPLY: u32 = IP_CT_RELATED + IP_CT_IS_REPLY;
pub const IP_CT_UNTRACKED: u32 = 7;

// BYTE ORDER

/// Byte order used to read attribute headers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    /// Read a `u16` from the first two bytes of `bytes`
    ///
    /// Callers must have checked that at least two bytes are available.
    #[must_use]
    pub const fn read_u16(self, bytes: [u8; 2]) -> u16 {
        match self {
            Self::Little => u16::from_le_bytes(bytes),
            Self::Big => u16::from_be_bytes(bytes),
        }
    }
}

impl Default for ByteOrder {
    fn default() -> Self {
        NATIVE_BYTE_ORDER
    }
}

/// Host byte order, fixed at compile time
#[cfg(target_endian = "little")]
pub const NATIVE_BYTE_ORDER: ByteOrder = ByteOrder::Little;
#[cfg(target_endian = "big")]
pub const NATIVE_BYTE_ORDER: ByteOrder = ByteOrder::Big;

// PSEUDO-HEADER

/// `nfgenmsg` prefix of an NFLOG packet message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PseudoHeader {
    /// Address family of the logged packet (`AF_INET`, `AF_INET6`)
    pub family: u8,
    /// nfnetlink version, currently always `NFNETLINK_V0`
    pub version: u8,
    /// NFLOG group the packet was logged to
    pub resource_id: u16,
}

impl PseudoHeader {
    /// Parse the 4-byte pseudo-header, `None` if fewer bytes are available
    #[must_use]
    pub fn parse(data: &[u8]) -> Option<Self> {
        match data {
            [family, version, hi, lo, ..] => Some(Self {
                family: *family,
                version: *version,
                resource_id: u16::from_be_bytes([*hi, *lo]),
            }),
            _ => None,
        }
    }
}

// HELPER FUNCTIONS

/// Align attribute length to 4-byte boundary
///
/// Returns `None` when rounding up would overflow.
#[must_use]
pub const fn nla_align(len: usize) -> Option<usize> {
    match len.checked_add(3) {
        Some(n) => Some(n & !3),
        None => None,
    }
}

/// Human-readable name of a netfilter inet hook
#[must_use]
pub const fn hook_name(hook: u8) -> &'static str {
    match hook {
        NF_INET_PRE_ROUTING => "PREROUTING",
        NF_INET_LOCAL_IN => "INPUT",
        NF_INET_FORWARD => "FORWARD",
        NF_INET_LOCAL_OUT => "OUTPUT",
        NF_INET_POST_ROUTING => "POSTROUTING",
        NF_INET_INGRESS => "INGRESS",
        _ => "UNKNOWN",
    }
}

/// Human-readable name of an `ip_conntrack_info` value
#[must_use]
pub const fn ct_info_name(ctinfo: u32) -> &'static str {
    match ctinfo {
        IP_CT_ESTABLISHED => "ESTABLISHED",
        IP_CT_RELATED => "RELATED",
        IP_CT_NEW => "NEW",
        IP_CT_ESTABLISHED_REPLY => "ESTABLISHED_REPLY",
        IP_CT_RELATED_REPLY => "RELATED_REPLY",
        IP_CT_UNTRACKED => "UNTRACKED",
        _ => "UNKNOWN",
    }
}

/// Human-readable name of an address family
#[must_use]
pub const fn family_name(family: u8) -> &'static str {
    match family {
        AF_UNSPEC => "UNSPEC",
        AF_INET => "INET",
        AF_BRIDGE => "BRIDGE",
        AF_INET6 => "INET6",
        _ => "UNKNOWN",
    }
}

// TESTS
