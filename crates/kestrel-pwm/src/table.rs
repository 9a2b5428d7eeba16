//! The authoritative mapping of channel-to-GPIO bindings.
//!
//! The resource table owns every channel record and GPIO binding in the
//! system. It keeps a forward map (channel id to configuration) and a reverse
//! map (GPIO line to owning channel) that must agree at all times: every GPIO
//! recorded as bound to a channel appears in that channel's GPIO list, and
//! vice versa. Mutations go through the reserve/commit/rollback protocol so a
//! failed peripheral programming call can restore the exact prior state.

use std::collections::HashMap;

use crate::error::PwmError;
use crate::{ChannelId, GpioId};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Waveform and pin configuration held by a bound channel.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelConfig {
    /// GPIO lines driven by this channel, in the order they were requested.
    pub gpios: Vec<GpioId>,
    /// Target PWM frequency in Hz.
    pub frequency_hz: f64,
    /// Duty cycle in `[0.0, 1.0]`.
    pub duty: f64,
}

/// Mapping from channel ids to configurations plus the reverse GPIO-owner map.
///
/// The table accepts at most one in-flight mutation at a time; the channel
/// manager serializes callers, and the in-flight marker set by [`reserve`]
/// and cleared by [`commit`] or [`rollback`] makes that rule checkable in
/// debug builds.
///
/// [`reserve`]: ResourceTable::reserve
/// [`commit`]: ResourceTable::commit
/// [`rollback`]: ResourceTable::rollback
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceTable {
    channels: HashMap<ChannelId, ChannelConfig>,
    gpio_owners: HashMap<GpioId, ChannelId>,
    in_flight: Option<ChannelId>,
}

impl ResourceTable {
    /// Create an empty table. No channel is pre-bound at startup.
    pub fn new() -> Self {
        ResourceTable::default()
    }

    /// Stage a new or replacement record for `channel` and rewrite the
    /// reverse map in the same step.
    ///
    /// If the channel previously existed (reconfiguration), its old GPIO
    /// bindings that are not reused by the new request are released here, and
    /// the displaced record is returned as the rollback snapshot. The caller
    /// must follow up with [`commit`] or [`rollback`].
    ///
    /// The caller is responsible for having validated the request first; in
    /// particular the GPIOs must be distinct and free (or owned by `channel`
    /// itself).
    ///
    /// [`commit`]: ResourceTable::commit
    /// [`rollback`]: ResourceTable::rollback
    pub fn reserve(
        &mut self,
        channel: ChannelId,
        gpios: &[GpioId],
        frequency_hz: f64,
        duty: f64,
    ) -> Option<ChannelConfig> {
        debug_assert!(self.in_flight.is_none(), "reservation already in flight");

        let previous = self.remove_entry(channel);
        self.insert_entry(
            channel,
            ChannelConfig {
                gpios: gpios.to_vec(),
                frequency_hz,
                duty,
            },
        );
        self.in_flight = Some(channel);

        debug_assert!(self.is_consistent());
        previous
    }

    /// Seal the in-flight reservation for `channel` after the peripheral
    /// driver confirmed the new waveform.
    pub fn commit(&mut self, channel: ChannelId) {
        debug_assert_eq!(self.in_flight, Some(channel), "commit without reserve");
        self.in_flight = None;
    }

    /// Restore the table to its state immediately before the matching
    /// [`reserve`], using the snapshot that call returned.
    ///
    /// [`reserve`]: ResourceTable::reserve
    pub fn rollback(&mut self, channel: ChannelId, previous: Option<ChannelConfig>) {
        debug_assert_eq!(self.in_flight, Some(channel), "rollback without reserve");

        self.remove_entry(channel);
        if let Some(config) = previous {
            self.insert_entry(channel, config);
        }
        self.in_flight = None;

        debug_assert!(self.is_consistent());
    }

    /// Remove a channel's record and all its GPIO bindings.
    pub fn release(&mut self, channel: ChannelId) -> Result<ChannelConfig, PwmError> {
        debug_assert!(self.in_flight.is_none(), "release during reservation");

        let config = self
            .remove_entry(channel)
            .ok_or(PwmError::UnknownChannel(channel))?;

        debug_assert!(self.is_consistent());
        Ok(config)
    }

    /// Configuration currently held by `channel`, if it is bound.
    pub fn channel_info(&self, channel: ChannelId) -> Option<&ChannelConfig> {
        self.channels.get(&channel)
    }

    /// Channel currently holding `gpio`, if any.
    pub fn gpio_owner(&self, gpio: GpioId) -> Option<ChannelId> {
        self.gpio_owners.get(&gpio).copied()
    }

    /// Iterate over all bound channels and their configurations.
    pub fn iter(&self) -> impl Iterator<Item = (ChannelId, &ChannelConfig)> {
        self.channels.iter().map(|(id, config)| (*id, config))
    }

    /// Number of bound channels.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Whether no channel is bound.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    fn insert_entry(&mut self, channel: ChannelId, config: ChannelConfig) {
        for gpio in &config.gpios {
            self.gpio_owners.insert(*gpio, channel);
        }
        self.channels.insert(channel, config);
    }

    fn remove_entry(&mut self, channel: ChannelId) -> Option<ChannelConfig> {
        let config = self.channels.remove(&channel)?;
        for gpio in &config.gpios {
            self.gpio_owners.remove(gpio);
        }
        Some(config)
    }

    /// Forward/reverse agreement: every owner entry appears in its channel's
    /// GPIO list and every listed GPIO maps back to its channel.
    pub(crate) fn is_consistent(&self) -> bool {
        let forward_bindings: usize = self.channels.values().map(|c| c.gpios.len()).sum();
        if forward_bindings != self.gpio_owners.len() {
            return false;
        }
        self.channels.iter().all(|(channel, config)| {
            config
                .gpios
                .iter()
                .all(|gpio| self.gpio_owners.get(gpio) == Some(channel))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reserve_and_commit(table: &mut ResourceTable, channel: ChannelId, gpios: &[GpioId]) {
        let previous = table.reserve(channel, gpios, 1_000.0, 0.5);
        table.commit(channel);
        assert!(previous.is_none());
    }

    #[test]
    fn test_reserve_first_time() {
        let mut table = ResourceTable::new();
        let previous = table.reserve(0, &[17, 18], 1_000.0, 0.5);
        assert!(previous.is_none());
        table.commit(0);

        let config = table.channel_info(0).unwrap();
        assert_eq!(config.gpios, vec![17, 18]);
        assert_eq!(config.frequency_hz, 1_000.0);
        assert_eq!(config.duty, 0.5);
        assert_eq!(table.gpio_owner(17), Some(0));
        assert_eq!(table.gpio_owner(18), Some(0));
        assert!(table.is_consistent());
    }

    #[test]
    fn test_reserve_reconfiguration_releases_dropped_gpios() {
        let mut table = ResourceTable::new();
        reserve_and_commit(&mut table, 0, &[17, 18]);

        // Keep 17, drop 18, add 22
        let previous = table.reserve(0, &[17, 22], 2_000.0, 0.25);
        table.commit(0);

        let previous = previous.unwrap();
        assert_eq!(previous.gpios, vec![17, 18]);
        assert_eq!(table.gpio_owner(17), Some(0));
        assert_eq!(table.gpio_owner(18), None);
        assert_eq!(table.gpio_owner(22), Some(0));
        assert!(table.is_consistent());
    }

    #[test]
    fn test_rollback_first_time_restores_empty() {
        let mut table = ResourceTable::new();
        let before = table.clone();

        let previous = table.reserve(3, &[5], 100.0, 0.1);
        table.rollback(3, previous);

        assert_eq!(table, before);
        assert!(table.is_empty());
        assert_eq!(table.gpio_owner(5), None);
    }

    #[test]
    fn test_rollback_reconfiguration_restores_previous() {
        let mut table = ResourceTable::new();
        reserve_and_commit(&mut table, 0, &[17]);
        let before = table.clone();

        let previous = table.reserve(0, &[22, 23], 2_000.0, 0.9);
        table.rollback(0, previous);

        assert_eq!(table, before);
        assert_eq!(table.channel_info(0).unwrap().gpios, vec![17]);
        assert_eq!(table.gpio_owner(17), Some(0));
        assert_eq!(table.gpio_owner(22), None);
        assert_eq!(table.gpio_owner(23), None);
    }

    #[test]
    fn test_release_removes_all_bindings() {
        let mut table = ResourceTable::new();
        reserve_and_commit(&mut table, 0, &[17, 18]);
        reserve_and_commit(&mut table, 1, &[4]);

        let released = table.release(0).unwrap();
        assert_eq!(released.gpios, vec![17, 18]);
        assert_eq!(table.gpio_owner(17), None);
        assert_eq!(table.gpio_owner(18), None);
        assert_eq!(table.gpio_owner(4), Some(1));
        assert_eq!(table.len(), 1);
        assert!(table.is_consistent());
    }

    #[test]
    fn test_release_unknown_channel() {
        let mut table = ResourceTable::new();
        let before = table.clone();
        assert!(matches!(table.release(7), Err(PwmError::UnknownChannel(7))));
        assert_eq!(table, before);
    }

    #[test]
    fn test_iter_and_len() {
        let mut table = ResourceTable::new();
        assert!(table.is_empty());
        reserve_and_commit(&mut table, 0, &[17]);
        reserve_and_commit(&mut table, 2, &[4]);

        let mut bound: Vec<ChannelId> = table.iter().map(|(id, _)| id).collect();
        bound.sort_unstable();
        assert_eq!(bound, vec![0, 2]);
        assert_eq!(table.len(), 2);
    }
}
