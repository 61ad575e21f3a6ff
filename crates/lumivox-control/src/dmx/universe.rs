//! The 512-channel DMX universe buffer

/// Number of channels in one DMX universe
pub const UNIVERSE_SIZE: usize = 512;

/// One DMX universe: 512 one-byte channels, channel 1 at index 0.
///
/// Exclusively owned by the controller that writes it; the transport only
/// ever reads it.
#[derive(Debug, Clone)]
pub struct DmxUniverse {
    channels: [u8; UNIVERSE_SIZE],
}

impl Default for DmxUniverse {
    fn default() -> Self {
        Self {
            channels: [0; UNIVERSE_SIZE],
        }
    }
}

impl DmxUniverse {
    /// Create an all-zero universe
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a channel value. `address` is 1-based (1..=512); anything
    /// outside that range is silently ignored so a misconfigured fixture
    /// cannot crash the control loop.
    pub fn set_channel(&mut self, address: u16, value: u8) {
        if (1..=UNIVERSE_SIZE as u16).contains(&address) {
            self.channels[address as usize - 1] = value;
        }
    }

    /// Read a channel value; out-of-range addresses read as 0
    pub fn channel(&self, address: u16) -> u8 {
        if (1..=UNIVERSE_SIZE as u16).contains(&address) {
            self.channels[address as usize - 1]
        } else {
            0
        }
    }

    /// The raw channel data, channel 1 first
    pub fn data(&self) -> &[u8; UNIVERSE_SIZE] {
        &self.channels
    }

    /// Zero every channel
    pub fn clear(&mut self) {
        self.channels = [0; UNIVERSE_SIZE];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_one_is_index_zero() {
        let mut universe = DmxUniverse::new();
        universe.set_channel(1, 200);
        assert_eq!(universe.data()[0], 200);
        assert_eq!(universe.channel(1), 200);
    }

    #[test]
    fn out_of_range_writes_are_ignored() {
        let mut universe = DmxUniverse::new();
        universe.set_channel(0, 99);
        universe.set_channel(513, 99);
        assert!(universe.data().iter().all(|&c| c == 0));
    }

    #[test]
    fn clear_zeroes_everything() {
        let mut universe = DmxUniverse::new();
        universe.set_channel(512, 255);
        universe.clear();
        assert_eq!(universe.channel(512), 0);
    }
}
