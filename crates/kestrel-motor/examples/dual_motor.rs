use std::sync::Arc;

use kestrel_motor::{BridgeInput, HBridgeMotor, MotorControl};
use kestrel_pwm::{ChannelManager, MockPwmDriver};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let driver = MockPwmDriver::new();
    let manager = Arc::new(ChannelManager::new(driver.clone()));

    // One DRV8833 drives two motors; each bridge input gets its own channel.
    // Wiring here follows the usual Pi header hookup for a small rover.
    let mut left = HBridgeMotor::new(
        Arc::clone(&manager),
        BridgeInput::new(0, 17), // AIN1
        BridgeInput::new(1, 18), // AIN2
        1_000.0,
    )?;
    let mut right = HBridgeMotor::new(
        Arc::clone(&manager),
        BridgeInput::new(2, 22), // BIN1
        BridgeInput::new(3, 23), // BIN2
        1_000.0,
    )?;

    // Ramp both motors up, then turn in place
    for step in 1..=4 {
        let speed = step as f64 * 0.25;
        left.set_speed(speed)?;
        right.set_speed(speed)?;
        println!("forward at {:.0}%", speed * 100.0);
    }

    left.set_speed(-0.5)?;
    right.set_speed(0.5)?;
    println!(
        "turning: left={:.2} right={:.2}, AIN2 waveform: {:?}",
        left.speed(),
        right.speed(),
        driver.programmed(1)
    );

    // Brake, then give the lines back
    left.brake()?;
    right.brake()?;
    left.release()?;
    right.release()?;
    println!("bound channels after release: {}", manager.snapshot().len());

    Ok(())
}
