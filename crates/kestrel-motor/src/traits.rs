//! Motor control interface and errors.

use kestrel_pwm::PwmError;

/// Error type for motor operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MotorError {
    /// The requested speed lies outside `[-1.0, 1.0]`.
    #[error("speed {0} must lie in [-1.0, 1.0]")]
    InvalidSpeed(f64),

    /// The channel manager rejected the underlying PWM operation.
    #[error(transparent)]
    Pwm(#[from] PwmError),
}

/// Interface for motors with signed variable speed control.
pub trait MotorControl {
    /// Set the motor speed.
    ///
    /// # Arguments
    ///
    /// * `speed` - Signed speed in `[-1.0, 1.0]`: positive is forward,
    ///   negative is reverse, `0.0` lets the motor coast.
    ///
    /// # Errors
    ///
    /// Returns `MotorError::InvalidSpeed` if `speed` is out of range, or a
    /// wrapped [`PwmError`] if the channel manager rejects the update.
    fn set_speed(&mut self, speed: f64) -> Result<(), MotorError>;

    /// Stop the motor (coast).
    ///
    /// # Errors
    ///
    /// Returns a wrapped [`PwmError`] if the channel manager rejects the
    /// update.
    fn stop(&mut self) -> Result<(), MotorError>;

    /// The last speed successfully applied, in `[-1.0, 1.0]`.
    fn speed(&self) -> f64;

    /// Whether the motor is currently being driven.
    fn is_running(&self) -> bool {
        self.speed() != 0.0
    }
}
