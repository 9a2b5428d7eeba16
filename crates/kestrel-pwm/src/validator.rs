//! Request validation against hardware limits and current allocations.
//!
//! Both checks here are pure predicates over a table snapshot: they touch no
//! hardware and mutate nothing, which is what enables the manager's
//! check-fully-then-commit semantics. A request rejected here is guaranteed
//! to have had no effect.

use crate::error::PwmError;
use crate::limits::HardwareLimits;
use crate::table::ResourceTable;
use crate::{ChannelId, GpioId};

/// Validate a `configure` request.
///
/// Checks, in order: channel id range, GPIO list shape and range, frequency,
/// duty cycle, and finally per-GPIO conflicts against the current table.
/// GPIOs already owned by `channel` itself are not conflicts; a
/// reconfiguration releases and re-binds them in one step.
///
/// # Errors
///
/// `InvalidChannel`, `InvalidGpio`, `InvalidFrequency`, `InvalidDuty`, or
/// `GpioConflict` as described in [`PwmError`].
pub fn validate_configure(
    table: &ResourceTable,
    limits: &HardwareLimits,
    channel: ChannelId,
    gpios: &[GpioId],
    frequency_hz: f64,
    duty: f64,
) -> Result<(), PwmError> {
    if !limits.valid_channel(channel) {
        return Err(PwmError::InvalidChannel(channel));
    }

    if gpios.is_empty() {
        return Err(PwmError::InvalidGpio("at least one GPIO line is required"));
    }
    for (i, gpio) in gpios.iter().enumerate() {
        if !limits.valid_gpio(*gpio) {
            return Err(PwmError::InvalidGpio("GPIO id out of range"));
        }
        if gpios[..i].contains(gpio) {
            return Err(PwmError::InvalidGpio("duplicate GPIO id"));
        }
    }

    // NaN fails both comparisons below, so it is rejected as well.
    if !(frequency_hz > 0.0 && frequency_hz <= limits.max_frequency_hz) {
        return Err(PwmError::InvalidFrequency(frequency_hz));
    }
    if !(0.0..=1.0).contains(&duty) {
        return Err(PwmError::InvalidDuty(duty));
    }

    for gpio in gpios {
        if let Some(owner) = table.gpio_owner(*gpio) {
            if owner != channel {
                return Err(PwmError::GpioConflict { gpio: *gpio, owner });
            }
        }
    }

    Ok(())
}

/// Validate a `free` request.
///
/// # Errors
///
/// `UnknownChannel` if `channel` has no entry. Freeing an already-free
/// channel is an error, not a no-op; callers track channel state themselves.
pub fn validate_free(table: &ResourceTable, channel: ChannelId) -> Result<(), PwmError> {
    if table.channel_info(channel).is_none() {
        return Err(PwmError::UnknownChannel(channel));
    }
    Ok(())
}
