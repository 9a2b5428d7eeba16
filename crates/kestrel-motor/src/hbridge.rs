//! DRV8833-class H-bridge driven through managed PWM channels.
//!
//! Truth table for one bridge (per motor):
//!
//! | IN1 | IN2 | Motor state                                |
//! |-----|-----|--------------------------------------------|
//! | 0   | 0   | Coast (High-Z, motor freewheels)           |
//! | PWM | 0   | Forward (speed = PWM duty cycle)           |
//! | 0   | PWM | Reverse (speed = PWM duty cycle)           |
//! | 1   | 1   | Brake (both terminals shorted to GND)      |
//!
//! Each bridge input gets its own managed PWM channel, so exclusive
//! ownership of the bridge's GPIO lines is enforced by the channel manager:
//! wiring two motors to the same line fails construction with a conflict
//! instead of silently corrupting waveforms.

use std::sync::Arc;

use tracing::{debug, warn};

use kestrel_pwm::{ChannelId, ChannelManager, GpioId, PwmDriver};

use crate::traits::{MotorControl, MotorError};

/// One bridge input: the managed PWM channel and the GPIO line it drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeInput {
    /// Logical PWM channel claimed for this input.
    pub channel: ChannelId,
    /// GPIO line wired to the bridge input pin.
    pub gpio: GpioId,
}

impl BridgeInput {
    /// Construct a bridge input descriptor.
    pub const fn new(channel: ChannelId, gpio: GpioId) -> Self {
        BridgeInput { channel, gpio }
    }
}

/// A DC motor behind one half of a DRV8833-class dual H-bridge.
///
/// Construction claims both PWM channels at zero duty (coast). Dropping the
/// motor does not free them; call [`release`](HBridgeMotor::release) to
/// return the lines and peripheral slots to the pool.
pub struct HBridgeMotor<D: PwmDriver> {
    manager: Arc<ChannelManager<D>>,
    in1: BridgeInput,
    in2: BridgeInput,
    frequency_hz: f64,
    speed: f64,
}

impl<D: PwmDriver> HBridgeMotor<D> {
    /// Claim `in1` and `in2` and put the bridge into coast.
    ///
    /// # Errors
    ///
    /// Surfaces the channel manager's error if either claim fails (invalid
    /// parameters, a GPIO already owned by another channel, or a peripheral
    /// failure). If the second claim fails the first is released again, so a
    /// failed construction leaves no channel bound.
    pub fn new(
        manager: Arc<ChannelManager<D>>,
        in1: BridgeInput,
        in2: BridgeInput,
        frequency_hz: f64,
    ) -> Result<Self, MotorError> {
        manager.configure(in1.channel, &[in1.gpio], frequency_hz, 0.0)?;
        if let Err(error) = manager.configure(in2.channel, &[in2.gpio], frequency_hz, 0.0) {
            let _ = manager.free(in1.channel);
            return Err(error.into());
        }

        Ok(HBridgeMotor {
            manager,
            in1,
            in2,
            frequency_hz,
            speed: 0.0,
        })
    }

    /// Actively brake the motor by driving both bridge inputs high.
    ///
    /// # Errors
    ///
    /// Returns a wrapped [`PwmError`](kestrel_pwm::PwmError) if either
    /// channel update is rejected; the bridge is driven back to coast first.
    pub fn brake(&mut self) -> Result<(), MotorError> {
        self.apply(1.0, 1.0)?;
        self.speed = 0.0;
        Ok(())
    }

    /// Free both bridge channels, consuming the motor.
    ///
    /// # Errors
    ///
    /// Surfaces the first failed `free`; in that case the failed channel
    /// (and any not yet reached) stays bound.
    pub fn release(self) -> Result<(), MotorError> {
        self.manager.free(self.in1.channel)?;
        self.manager.free(self.in2.channel)?;
        Ok(())
    }

    /// Reconfigure both inputs; on failure drive the bridge back to coast so
    /// it is never left in a mixed state.
    fn apply(&self, in1_duty: f64, in2_duty: f64) -> Result<(), MotorError> {
        let result = self
            .manager
            .configure(self.in1.channel, &[self.in1.gpio], self.frequency_hz, in1_duty)
            .and_then(|()| {
                self.manager.configure(
                    self.in2.channel,
                    &[self.in2.gpio],
                    self.frequency_hz,
                    in2_duty,
                )
            });

        if let Err(error) = result {
            warn!(%error, "bridge update failed, coasting");
            let _ = self
                .manager
                .configure(self.in1.channel, &[self.in1.gpio], self.frequency_hz, 0.0);
            let _ = self
                .manager
                .configure(self.in2.channel, &[self.in2.gpio], self.frequency_hz, 0.0);
            return Err(error.into());
        }
        Ok(())
    }
}

impl<D: PwmDriver> MotorControl for HBridgeMotor<D> {
    fn set_speed(&mut self, speed: f64) -> Result<(), MotorError> {
        if !(-1.0..=1.0).contains(&speed) {
            return Err(MotorError::InvalidSpeed(speed));
        }

        // Truth table: forward IN1=PWM/IN2=0, reverse IN1=0/IN2=PWM,
        // zero coasts both inputs.
        let (in1_duty, in2_duty) = if speed > 0.0 {
            (speed, 0.0)
        } else if speed < 0.0 {
            (0.0, -speed)
        } else {
            (0.0, 0.0)
        };

        match self.apply(in1_duty, in2_duty) {
            Ok(()) => {
                self.speed = speed;
                debug!(speed, "motor speed applied");
                Ok(())
            }
            Err(error) => {
                // apply() already coasted the bridge
                self.speed = 0.0;
                Err(error)
            }
        }
    }

    fn stop(&mut self) -> Result<(), MotorError> {
        self.apply(0.0, 0.0)?;
        self.speed = 0.0;
        Ok(())
    }

    fn speed(&self) -> f64 {
        self.speed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kestrel_pwm::{DriverError, MockPwmDriver, PwmError};

    const IN1: BridgeInput = BridgeInput::new(0, 17);
    const IN2: BridgeInput = BridgeInput::new(1, 18);

    fn motor() -> (HBridgeMotor<MockPwmDriver>, MockPwmDriver) {
        let driver = MockPwmDriver::new();
        let manager = Arc::new(ChannelManager::new(driver.clone()));
        let motor = HBridgeMotor::new(manager, IN1, IN2, 1_000.0).unwrap();
        (motor, driver)
    }

    fn duties(driver: &MockPwmDriver) -> (f64, f64) {
        (
            driver.programmed(IN1.channel).unwrap().duty,
            driver.programmed(IN2.channel).unwrap().duty,
        )
    }

    #[test]
    fn test_new_claims_both_inputs_coasting() {
        let (motor, driver) = motor();
        assert_eq!(duties(&driver), (0.0, 0.0));
        assert!(!motor.is_running());
        assert_eq!(driver.programmed(IN1.channel).unwrap().gpios, vec![17]);
        assert_eq!(driver.programmed(IN2.channel).unwrap().gpios, vec![18]);
    }

    #[test]
    fn test_forward() {
        let (mut motor, driver) = motor();
        motor.set_speed(0.75).unwrap();

        assert_eq!(duties(&driver), (0.75, 0.0));
        assert_eq!(motor.speed(), 0.75);
        assert!(motor.is_running());
    }

    #[test]
    fn test_reverse() {
        let (mut motor, driver) = motor();
        motor.set_speed(-0.5).unwrap();

        assert_eq!(duties(&driver), (0.0, 0.5));
        assert_eq!(motor.speed(), -0.5);
    }

    #[test]
    fn test_coast_and_stop() {
        let (mut motor, driver) = motor();
        motor.set_speed(0.75).unwrap();

        motor.set_speed(0.0).unwrap();
        assert_eq!(duties(&driver), (0.0, 0.0));
        assert!(!motor.is_running());

        motor.set_speed(-1.0).unwrap();
        motor.stop().unwrap();
        assert_eq!(duties(&driver), (0.0, 0.0));
        assert_eq!(motor.speed(), 0.0);
    }

    #[test]
    fn test_brake() {
        let (mut motor, driver) = motor();
        motor.set_speed(0.75).unwrap();

        motor.brake().unwrap();
        assert_eq!(duties(&driver), (1.0, 1.0));
        assert_eq!(motor.speed(), 0.0);
    }

    #[test]
    fn test_speed_boundaries() {
        let (mut motor, driver) = motor();

        motor.set_speed(1.0).unwrap();
        assert_eq!(duties(&driver), (1.0, 0.0));

        motor.set_speed(-1.0).unwrap();
        assert_eq!(duties(&driver), (0.0, 1.0));

        assert!(matches!(
            motor.set_speed(1.5),
            Err(MotorError::InvalidSpeed(_))
        ));
        assert!(matches!(
            motor.set_speed(-1.5),
            Err(MotorError::InvalidSpeed(_))
        ));
    }

    #[test]
    fn test_shared_gpio_fails_construction() {
        let driver = MockPwmDriver::new();
        let manager = Arc::new(ChannelManager::new(driver.clone()));
        let _motor_a =
            HBridgeMotor::new(Arc::clone(&manager), IN1, IN2, 1_000.0).unwrap();

        // Motor B wired to motor A's IN2 line
        let motor_b = HBridgeMotor::new(
            Arc::clone(&manager),
            BridgeInput::new(2, 22),
            BridgeInput::new(3, 18),
            1_000.0,
        );
        assert!(matches!(
            motor_b,
            Err(MotorError::Pwm(PwmError::GpioConflict { gpio: 18, owner: 1 }))
        ));
        // The failed construction released its first claim again
        assert_eq!(manager.gpio_owner(22), None);
        assert!(!driver.is_programmed(2));
    }

    #[test]
    fn test_failed_update_coasts_bridge() {
        let (mut motor, driver) = motor();

        driver.fail_next_program(DriverError::Busy);
        let result = motor.set_speed(0.9);

        assert!(matches!(
            result,
            Err(MotorError::Pwm(PwmError::HardwareFailure(_)))
        ));
        assert_eq!(motor.speed(), 0.0);
        assert_eq!(duties(&driver), (0.0, 0.0));
    }

    #[test]
    fn test_release_frees_both_channels() {
        let (motor, driver) = motor();
        let manager = Arc::clone(&motor.manager);

        motor.release().unwrap();
        assert_eq!(manager.gpio_owner(17), None);
        assert_eq!(manager.gpio_owner(18), None);
        assert_eq!(driver.programmed_count(), 0);
    }
}
