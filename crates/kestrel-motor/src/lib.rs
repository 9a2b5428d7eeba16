#![warn(missing_docs)]
#![doc = "H-bridge motor control layered on the kestrel PWM channel manager."]
#![doc = ""]
#![doc = "A DRV8833-class bridge steers a DC motor with two inputs, IN1 and IN2,"]
#![doc = "each driven by its own PWM waveform. This crate claims one managed PWM"]
#![doc = "channel per bridge input, so the channel manager's conflict detection"]
#![doc = "guarantees no two motors ever share a line, and translates signed"]
#![doc = "fractional speeds into the bridge truth table."]

pub mod hbridge;
pub mod traits;

pub use hbridge::{BridgeInput, HBridgeMotor};
pub use traits::{MotorControl, MotorError};
