//! Hardware limits the validator checks requests against.

use crate::{ChannelId, GpioId};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Capabilities of the underlying PWM peripheral.
///
/// These are properties of the target board, not of any individual channel,
/// and are supplied once at manager construction. [`HardwareLimits::default`]
/// models a Raspberry-Pi-class board: 15 DMA channels usable for pacing,
/// GPIO bank 0, and a 10 kHz ceiling for DMA-paced PWM.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HardwareLimits {
    /// Number of logical channels; valid ids are `0..channel_count`.
    pub channel_count: ChannelId,
    /// Number of GPIO lines; valid ids are `0..gpio_count`.
    pub gpio_count: GpioId,
    /// Maximum supported PWM frequency in Hz.
    pub max_frequency_hz: f64,
}

impl HardwareLimits {
    /// Construct limits for a specific board.
    pub const fn new(channel_count: ChannelId, gpio_count: GpioId, max_frequency_hz: f64) -> Self {
        HardwareLimits {
            channel_count,
            gpio_count,
            max_frequency_hz,
        }
    }

    /// Whether `channel` is a valid channel id for this board.
    pub fn valid_channel(&self, channel: ChannelId) -> bool {
        channel < self.channel_count
    }

    /// Whether `gpio` is a valid GPIO line id for this board.
    pub fn valid_gpio(&self, gpio: GpioId) -> bool {
        gpio < self.gpio_count
    }
}

impl Default for HardwareLimits {
    fn default() -> Self {
        HardwareLimits::new(15, 32, 10_000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile() {
        let limits = HardwareLimits::default();
        assert!(limits.valid_channel(0));
        assert!(limits.valid_channel(14));
        assert!(!limits.valid_channel(15));
        assert!(limits.valid_gpio(31));
        assert!(!limits.valid_gpio(32));
    }

    #[test]
    fn test_custom_profile() {
        // Single-channel, two-line part
        let limits = HardwareLimits::new(1, 2, 500.0);
        assert!(limits.valid_channel(0));
        assert!(!limits.valid_channel(1));
        assert!(limits.valid_gpio(1));
        assert!(!limits.valid_gpio(2));
        assert_eq!(limits.max_frequency_hz, 500.0);
    }
}
