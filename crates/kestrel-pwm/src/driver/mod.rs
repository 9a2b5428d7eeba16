//! The peripheral driver capability consumed by the channel manager.
//!
//! Everything hardware-specific (DMA control blocks, timer pacing, register
//! programming) lives behind [`PwmDriver`]. The manager invokes it only
//! after validation succeeds, and treats it as stateless: both operations are
//! keyed by channel id and idempotent.

use crate::{ChannelId, GpioId};

pub mod mock;

/// Failures reported by the peripheral driver.
///
/// These originate outside the resource manager's control (peripheral busy,
/// DMA exhaustion, device faults) and surface to callers as
/// [`PwmError::HardwareFailure`](crate::PwmError::HardwareFailure).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DriverError {
    /// The peripheral cannot accept a programming request right now.
    #[error("peripheral is busy")]
    Busy,

    /// No DMA/timer slot is available to realize the channel.
    #[error("no free DMA/timer slot for channel {0}")]
    SlotExhausted(ChannelId),

    /// The device reported a fault condition.
    #[error("peripheral fault: {0}")]
    Fault(&'static str),
}

/// Hardware-programming capability that realizes a channel's configuration
/// electrically.
///
/// # Contract
///
/// - [`program`](PwmDriver::program) is idempotent: programming an
///   already-programmed channel with new parameters atomically replaces the
///   old waveform, never momentarily producing a third configuration.
/// - [`unprogram`](PwmDriver::unprogram) disables output and releases the
///   channel's underlying timer/DMA slot. Behavior on an already-unprogrammed
///   channel is implementation-defined but must not crash.
pub trait PwmDriver {
    /// Program `channel` to drive `gpios` with the given waveform.
    ///
    /// # Errors
    ///
    /// Returns a [`DriverError`] when the peripheral cannot realize the
    /// waveform; the caller rolls its bookkeeping back in that case.
    fn program(
        &mut self,
        channel: ChannelId,
        gpios: &[GpioId],
        frequency_hz: f64,
        duty: f64,
    ) -> Result<(), DriverError>;

    /// Disable `channel`'s output and release its timer/DMA slot.
    ///
    /// # Errors
    ///
    /// Returns a [`DriverError`] when the peripheral refuses; the caller
    /// keeps the channel's resources reserved in that case.
    fn unprogram(&mut self, channel: ChannelId) -> Result<(), DriverError>;
}
