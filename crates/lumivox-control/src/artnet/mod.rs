//! Art-Net 4 output (ArtDMX, opcode 0x5000)
//!
//! Art-Net is a UDP-based protocol for transmitting DMX512 over Ethernet.
//! This module covers the byte-exact packet encoder, the fire-and-forget
//! UDP sender, and source-interface selection for multi-NIC hosts.

pub mod netif;
mod sender;

pub use netif::{NicCandidate, NicPreferences};
pub use sender::{ArtNetEndpoint, ArtNetSender};

use serde::{Deserialize, Serialize};

/// Default Art-Net UDP port
pub const ARTNET_PORT: u16 = 6454;

/// Art-Net packet ID, including the terminating NUL
const ARTNET_ID: &[u8; 8] = b"Art-Net\0";
/// ArtDMX opcode (transmitted little-endian)
const OP_DMX: u16 = 0x5000;
/// Protocol revision (transmitted big-endian)
const PROTOCOL_VERSION: u16 = 14;
/// Fixed header length preceding the channel payload
const HEADER_LEN: usize = 18;

/// An Art-Net port address: 7-bit net plus 4-bit subnet and universe.
///
/// The subnet/universe nibbles pack into the single SubUni byte of the
/// ArtDMX header; this struct is the one canonical representation, whether
/// the installation configures the nibbles or the packed byte directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawAddress", into = "RawAddress")]
pub struct ArtNetAddress {
    net: u8,
    subnet: u8,
    universe: u8,
}

/// Serde-facing form of [`ArtNetAddress`]; re-masked on the way in
#[derive(Serialize, Deserialize)]
struct RawAddress {
    net: u8,
    subnet: u8,
    universe: u8,
}

impl From<RawAddress> for ArtNetAddress {
    fn from(raw: RawAddress) -> Self {
        Self::new(raw.net, raw.subnet, raw.universe)
    }
}

impl From<ArtNetAddress> for RawAddress {
    fn from(addr: ArtNetAddress) -> Self {
        Self {
            net: addr.net,
            subnet: addr.subnet,
            universe: addr.universe,
        }
    }
}

impl Default for ArtNetAddress {
    fn default() -> Self {
        Self::new(0, 0, 0)
    }
}

impl ArtNetAddress {
    /// Build from the three fields; oversized values are masked down
    pub fn new(net: u8, subnet: u8, universe: u8) -> Self {
        Self {
            net: net & 0x7F,
            subnet: subnet & 0x0F,
            universe: universe & 0x0F,
        }
    }

    /// Build from a raw packed SubUni byte (high nibble subnet, low
    /// nibble universe)
    pub fn from_sub_uni(net: u8, sub_uni: u8) -> Self {
        Self::new(net, sub_uni >> 4, sub_uni & 0x0F)
    }

    /// The 7-bit net field
    pub fn net(&self) -> u8 {
        self.net
    }

    /// The packed SubUni byte
    pub fn sub_uni(&self) -> u8 {
        (self.subnet << 4) | self.universe
    }
}

/// Encode one ArtDMX packet: 18-byte header plus the channel payload.
///
/// `data` must already be sliced to the configured universe length
/// (1..=512); the caller guarantees the bound.
pub(crate) fn encode_artdmx(address: ArtNetAddress, sequence: u8, data: &[u8]) -> Vec<u8> {
    debug_assert!((1..=512).contains(&data.len()));
    let mut packet = vec![0u8; HEADER_LEN + data.len()];

    packet[0..8].copy_from_slice(ARTNET_ID);
    packet[8..10].copy_from_slice(&OP_DMX.to_le_bytes());
    packet[10..12].copy_from_slice(&PROTOCOL_VERSION.to_be_bytes());
    packet[12] = sequence;
    packet[13] = 0; // Physical: informational only, unused
    packet[14] = address.sub_uni();
    packet[15] = address.net();
    packet[16..18].copy_from_slice(&(data.len() as u16).to_be_bytes());
    packet[18..].copy_from_slice(data);

    packet
}
