//! UDP transport for ArtDMX frames

use std::net::{IpAddr, SocketAddr, UdpSocket};

use serde::{Deserialize, Serialize};
use tracing::{info, trace};

use crate::dmx::universe::{DmxUniverse, UNIVERSE_SIZE};
use crate::error::{ControlError, Result};

use super::netif::{self, NicPreferences};
use super::{encode_artdmx, ArtNetAddress, ARTNET_PORT};

/// Where and how ArtDMX frames are sent
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtNetEndpoint {
    /// Destination IP, unicast or broadcast
    pub destination: IpAddr,
    /// Destination UDP port
    pub port: u16,
    /// Port address carried in every frame
    pub address: ArtNetAddress,
    /// Number of channels per frame (1..=512)
    pub universe_length: u16,
    /// Source-interface selection preferences
    pub nic: NicPreferences,
}

impl Default for ArtNetEndpoint {
    fn default() -> Self {
        Self {
            destination: IpAddr::from([255, 255, 255, 255]),
            port: ARTNET_PORT,
            address: ArtNetAddress::default(),
            universe_length: UNIVERSE_SIZE as u16,
            nic: NicPreferences::default(),
        }
    }
}

impl ArtNetEndpoint {
    fn validate(&self) -> Result<()> {
        if self.universe_length == 0 || self.universe_length > UNIVERSE_SIZE as u16 {
            return Err(ControlError::InvalidEndpoint(format!(
                "universe length {} outside 1..=512",
                self.universe_length
            )));
        }
        Ok(())
    }

    fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.destination, self.port)
    }
}

/// Fire-and-forget Art-Net sender.
///
/// Owns the ArtDMX sequence counter, which wraps 1..=255 (0 is reserved
/// and never transmitted) and increments once per packet.
pub struct ArtNetSender {
    socket: UdpSocket,
    endpoint: ArtNetEndpoint,
    sequence: u8,
}

impl ArtNetSender {
    /// Create a sender, resolving the source interface once up front.
    ///
    /// When no suitable interface is found the socket stays unbound and
    /// the OS routing table decides; that degraded mode is logged inside
    /// the resolver, not an error.
    pub fn new(endpoint: ArtNetEndpoint) -> Result<Self> {
        endpoint.validate()?;

        let bind_ip = netif::resolve_bind_ip(&endpoint.nic, endpoint.destination)
            .map(IpAddr::from)
            .unwrap_or_else(|| IpAddr::from([0, 0, 0, 0]));
        let socket = UdpSocket::bind(SocketAddr::new(bind_ip, 0))?;
        socket.set_broadcast(true)?;
        socket.set_nonblocking(true)?;

        info!(
            destination = %endpoint.socket_addr(),
            source = %bind_ip,
            "Art-Net sender ready"
        );

        Ok(Self {
            socket,
            endpoint,
            sequence: 0,
        })
    }

    /// The configured endpoint
    pub fn endpoint(&self) -> &ArtNetEndpoint {
        &self.endpoint
    }

    /// The sequence value carried by the most recent packet (0 before the
    /// first send)
    pub fn sequence(&self) -> u8 {
        self.sequence
    }

    /// Re-run source-interface selection and rebind the socket, e.g. after
    /// the operator changes NIC preferences.
    pub fn rebind(&mut self, nic: NicPreferences) -> Result<()> {
        self.endpoint.nic = nic;
        let bind_ip = netif::resolve_bind_ip(&self.endpoint.nic, self.endpoint.destination)
            .map(IpAddr::from)
            .unwrap_or_else(|| IpAddr::from([0, 0, 0, 0]));
        let socket = UdpSocket::bind(SocketAddr::new(bind_ip, 0))?;
        socket.set_broadcast(true)?;
        socket.set_nonblocking(true)?;
        self.socket = socket;
        info!(source = %bind_ip, "Art-Net sender rebound");
        Ok(())
    }

    /// Encode and transmit the universe's current state.
    ///
    /// DMX has no acknowledgment or retransmission: a failed send drops
    /// this frame and the next tick supersedes it with fresh data, so the
    /// caller logs the error and keeps ticking.
    pub fn send(&mut self, universe: &DmxUniverse) -> Result<()> {
        let len = self.endpoint.universe_length as usize;
        // 0 never appears on the wire: 255 wraps back to 1. The counter
        // only advances once the packet actually left, so a dropped frame
        // does not consume a sequence number.
        let sequence = self.sequence % 255 + 1;

        let packet = encode_artdmx(self.endpoint.address, sequence, &universe.data()[..len]);
        self.socket.send_to(&packet, self.endpoint.socket_addr())?;
        self.sequence = sequence;
        trace!(sequence, len, "sent ArtDMX frame");
        Ok(())
    }
}
