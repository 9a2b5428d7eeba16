//! This module defines the error types used by the `kestrel-pwm` crate.

use crate::driver::DriverError;
use crate::{ChannelId, GpioId};

/// Error type for channel configuration and release operations.
///
/// All variants except [`PwmError::HardwareFailure`] are detected purely from
/// logical state before any hardware action, so they are always side-effect
/// free. `HardwareFailure` is returned only after the resource table has been
/// rolled back to its pre-call state (on `configure`) or deliberately left
/// intact (on `free`), so callers may treat every error as a strict no-op with
/// respect to channel state.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PwmError {
    /// The requested channel id is outside the supported range.
    #[error("channel {0} is outside the supported channel range")]
    InvalidChannel(ChannelId),

    /// The requested GPIO list is empty, contains duplicates, or contains an
    /// id outside the supported range.
    #[error("invalid GPIO list: {0}")]
    InvalidGpio(&'static str),

    /// The requested frequency is not positive or exceeds the peripheral
    /// maximum.
    #[error("frequency {0} Hz is outside the supported range")]
    InvalidFrequency(f64),

    /// The requested duty cycle lies outside `[0.0, 1.0]`.
    #[error("duty cycle {0} must lie in [0.0, 1.0]")]
    InvalidDuty(f64),

    /// A requested GPIO line is already bound to a different channel.
    #[error("GPIO {gpio} is already bound to channel {owner}")]
    GpioConflict {
        /// The contested GPIO line.
        gpio: GpioId,
        /// The channel currently holding it.
        owner: ChannelId,
    },

    /// The channel has no entry in the resource table.
    #[error("channel {0} is not currently bound")]
    UnknownChannel(ChannelId),

    /// The peripheral driver failed to program or unprogram the channel.
    #[error("peripheral programming failed: {0}")]
    HardwareFailure(#[from] DriverError),
}
