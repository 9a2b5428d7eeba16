//! The channel manager façade.
//!
//! Per channel id the observable lifecycle is Unbound → Bound (on a
//! successful `configure`), Bound → Bound (reconfigure), Bound → Unbound (on
//! `free`). The transient configuring state exists only inside the
//! reserve/program/commit-or-rollback protocol and is never observable:
//! hardware programming is the one step that can fail for reasons outside
//! this crate's control, and the resource table must never claim a binding
//! that was not realized electrically.

use parking_lot::RwLock;
use tracing::{info, warn};

use crate::driver::PwmDriver;
use crate::error::PwmError;
use crate::limits::HardwareLimits;
use crate::table::{ChannelConfig, ResourceTable};
use crate::validator;
use crate::{ChannelId, GpioId};

struct Inner<D> {
    table: ResourceTable,
    driver: D,
}

/// Façade over the validator, the resource table and the peripheral driver.
///
/// All mutating sequences run under a single write lock, so concurrent
/// `configure`/`free` calls from independent threads serialize against each
/// other and no caller ever observes a half-applied reservation. Read-only
/// lookups share a read lock and run concurrently with each other. Every
/// operation is synchronous; the caller blocks until it fully succeeds or
/// fails, and any error leaves channel state unchanged.
pub struct ChannelManager<D: PwmDriver> {
    limits: HardwareLimits,
    inner: RwLock<Inner<D>>,
}

impl<D: PwmDriver> ChannelManager<D> {
    /// Create a manager with the default hardware profile. No channel is
    /// pre-bound at startup.
    pub fn new(driver: D) -> Self {
        ChannelManager::with_limits(driver, HardwareLimits::default())
    }

    /// Create a manager for a specific board profile.
    pub fn with_limits(driver: D, limits: HardwareLimits) -> Self {
        ChannelManager {
            limits,
            inner: RwLock::new(Inner {
                table: ResourceTable::new(),
                driver,
            }),
        }
    }

    /// The hardware profile this manager validates against.
    pub fn limits(&self) -> &HardwareLimits {
        &self.limits
    }

    /// Bind `channel` to `gpios` and have it produce the requested waveform.
    ///
    /// A bound channel is fully reconfigured by a second call on the same id;
    /// its old GPIO lines not reused by the new request are released in the
    /// same step.
    ///
    /// # Errors
    ///
    /// Validation errors leave the table untouched. A driver failure returns
    /// [`PwmError::HardwareFailure`] after rolling the table back, so the
    /// channel is still bound to its old configuration, or still unbound if
    /// this was a first-time configure.
    pub fn configure(
        &self,
        channel: ChannelId,
        gpios: &[GpioId],
        frequency_hz: f64,
        duty: f64,
    ) -> Result<(), PwmError> {
        let mut inner = self.inner.write();

        validator::validate_configure(&inner.table, &self.limits, channel, gpios, frequency_hz, duty)?;

        let previous = inner.table.reserve(channel, gpios, frequency_hz, duty);
        match inner.driver.program(channel, gpios, frequency_hz, duty) {
            Ok(()) => {
                inner.table.commit(channel);
                info!(channel, ?gpios, frequency_hz, duty, "channel bound");
                Ok(())
            }
            Err(error) => {
                inner.table.rollback(channel, previous);
                warn!(channel, %error, "programming failed, reservation rolled back");
                Err(PwmError::HardwareFailure(error))
            }
        }
    }

    /// Release `channel`, disabling its output and returning its GPIO lines
    /// and peripheral slot to the free pool.
    ///
    /// # Errors
    ///
    /// [`PwmError::UnknownChannel`] if the channel is not bound. On a driver
    /// failure the channel stays bound and its resources stay reserved:
    /// they must not be declared free while still electrically active.
    pub fn free(&self, channel: ChannelId) -> Result<(), PwmError> {
        let mut inner = self.inner.write();

        validator::validate_free(&inner.table, channel)?;

        if let Err(error) = inner.driver.unprogram(channel) {
            warn!(channel, %error, "unprogram failed, channel stays bound");
            return Err(PwmError::HardwareFailure(error));
        }

        let released = inner.table.release(channel)?;
        info!(channel, gpios = ?released.gpios, "channel freed");
        Ok(())
    }

    /// Free every bound channel, in ascending id order.
    ///
    /// Intended for process shutdown. The first driver failure aborts the
    /// teardown and surfaces [`PwmError::HardwareFailure`]; the failed
    /// channel and any not yet reached stay bound.
    pub fn shutdown(&self) -> Result<(), PwmError> {
        let mut inner = self.inner.write();

        let mut bound: Vec<ChannelId> = inner.table.iter().map(|(id, _)| id).collect();
        bound.sort_unstable();

        for channel in bound {
            if let Err(error) = inner.driver.unprogram(channel) {
                warn!(channel, %error, "teardown aborted, channel stays bound");
                return Err(PwmError::HardwareFailure(error));
            }
            inner.table.release(channel)?;
            info!(channel, "channel freed during teardown");
        }
        Ok(())
    }

    /// Configuration currently held by `channel`, if it is bound.
    pub fn channel_info(&self, channel: ChannelId) -> Option<ChannelConfig> {
        self.inner.read().table.channel_info(channel).cloned()
    }

    /// Channel currently holding `gpio`, if any.
    pub fn gpio_owner(&self, gpio: GpioId) -> Option<ChannelId> {
        self.inner.read().table.gpio_owner(gpio)
    }

    /// Full-state snapshot of the resource table.
    ///
    /// Persisting the table across process boundaries is an external
    /// serialization concern; this is the seam for it.
    pub fn snapshot(&self) -> ResourceTable {
        self.inner.read().table.clone()
    }
}
