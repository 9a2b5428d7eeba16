//! Mock peripheral driver for host-side testing.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use super::{DriverError, PwmDriver};
use crate::{ChannelId, GpioId};

/// Waveform a channel was last programmed with.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgrammedWaveform {
    /// GPIO lines the channel drives, in request order.
    pub gpios: Vec<GpioId>,
    /// Frequency in Hz.
    pub frequency_hz: f64,
    /// Duty cycle in `[0.0, 1.0]`.
    pub duty: f64,
}

#[derive(Debug, Default)]
struct MockState {
    programmed: HashMap<ChannelId, ProgrammedWaveform>,
    fail_program: Option<DriverError>,
    fail_unprogram: Option<DriverError>,
    program_calls: u32,
    unprogram_calls: u32,
}

/// Mock PWM peripheral driver.
///
/// Tracks the waveform programmed per channel for test verification and
/// supports single-shot failure injection on either operation. Clones share
/// state, so a test can keep a handle after moving the driver into a
/// [`ChannelManager`](crate::ChannelManager).
#[derive(Debug, Clone, Default)]
pub struct MockPwmDriver {
    state: Arc<Mutex<MockState>>,
}

impl MockPwmDriver {
    /// Create a mock with no channel programmed.
    pub fn new() -> Self {
        MockPwmDriver::default()
    }

    /// Make the next `program` call fail with `error`.
    pub fn fail_next_program(&self, error: DriverError) {
        self.state.lock().fail_program = Some(error);
    }

    /// Make the next `unprogram` call fail with `error`.
    pub fn fail_next_unprogram(&self, error: DriverError) {
        self.state.lock().fail_unprogram = Some(error);
    }

    /// Waveform `channel` is currently programmed with, if any.
    pub fn programmed(&self, channel: ChannelId) -> Option<ProgrammedWaveform> {
        self.state.lock().programmed.get(&channel).cloned()
    }

    /// Whether `channel` is currently programmed.
    pub fn is_programmed(&self, channel: ChannelId) -> bool {
        self.state.lock().programmed.contains_key(&channel)
    }

    /// Number of channels currently programmed.
    pub fn programmed_count(&self) -> usize {
        self.state.lock().programmed.len()
    }

    /// Total `program` calls seen, including failed ones.
    pub fn program_calls(&self) -> u32 {
        self.state.lock().program_calls
    }

    /// Total `unprogram` calls seen, including failed ones.
    pub fn unprogram_calls(&self) -> u32 {
        self.state.lock().unprogram_calls
    }
}

impl PwmDriver for MockPwmDriver {
    fn program(
        &mut self,
        channel: ChannelId,
        gpios: &[GpioId],
        frequency_hz: f64,
        duty: f64,
    ) -> Result<(), DriverError> {
        let mut state = self.state.lock();
        state.program_calls += 1;
        if let Some(error) = state.fail_program.take() {
            return Err(error);
        }
        // Replaces any previous waveform for this channel in one step
        state.programmed.insert(
            channel,
            ProgrammedWaveform {
                gpios: gpios.to_vec(),
                frequency_hz,
                duty,
            },
        );
        Ok(())
    }

    fn unprogram(&mut self, channel: ChannelId) -> Result<(), DriverError> {
        let mut state = self.state.lock();
        state.unprogram_calls += 1;
        if let Some(error) = state.fail_unprogram.take() {
            return Err(error);
        }
        // Unprogramming an unprogrammed channel is accepted
        state.programmed.remove(&channel);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_and_unprogram() {
        let mut driver = MockPwmDriver::new();
        assert!(!driver.is_programmed(0));

        driver.program(0, &[17], 1_000.0, 0.5).unwrap();
        let waveform = driver.programmed(0).unwrap();
        assert_eq!(waveform.gpios, vec![17]);
        assert_eq!(waveform.frequency_hz, 1_000.0);
        assert_eq!(waveform.duty, 0.5);

        driver.unprogram(0).unwrap();
        assert!(!driver.is_programmed(0));
    }

    #[test]
    fn test_program_replaces_waveform() {
        let mut driver = MockPwmDriver::new();
        driver.program(0, &[17], 1_000.0, 0.5).unwrap();
        driver.program(0, &[22, 23], 2_000.0, 0.75).unwrap();

        let waveform = driver.programmed(0).unwrap();
        assert_eq!(waveform.gpios, vec![22, 23]);
        assert_eq!(driver.programmed_count(), 1);
    }

    #[test]
    fn test_unprogram_unprogrammed_channel_is_accepted() {
        let mut driver = MockPwmDriver::new();
        assert!(driver.unprogram(9).is_ok());
        assert_eq!(driver.unprogram_calls(), 1);
    }

    #[test]
    fn test_failure_injection_is_single_shot() {
        let mut driver = MockPwmDriver::new();
        driver.fail_next_program(DriverError::Busy);

        let result = driver.program(0, &[17], 1_000.0, 0.5);
        assert!(matches!(result, Err(DriverError::Busy)));
        assert!(!driver.is_programmed(0));

        // The injected failure is consumed; the retry succeeds
        driver.program(0, &[17], 1_000.0, 0.5).unwrap();
        assert!(driver.is_programmed(0));
        assert_eq!(driver.program_calls(), 2);
    }

    #[test]
    fn test_clones_share_state() {
        let driver = MockPwmDriver::new();
        let mut handle = driver.clone();

        handle.program(3, &[4], 500.0, 0.25).unwrap();
        assert!(driver.is_programmed(3));
        assert_eq!(driver.program_calls(), 1);
    }
}
