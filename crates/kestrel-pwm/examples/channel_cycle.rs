use kestrel_pwm::{ChannelManager, MockPwmDriver, PwmError};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let driver = MockPwmDriver::new();
    let manager = ChannelManager::new(driver.clone());

    // Bind channel 0 to GPIO 17 at 1 kHz, 50% duty
    manager.configure(0, &[17], 1_000.0, 0.5)?;
    println!("channel 0: {:?}", manager.channel_info(0));

    // A second channel asking for the same line is rejected wholesale
    match manager.configure(1, &[17], 500.0, 0.25) {
        Err(PwmError::GpioConflict { gpio, owner }) => {
            println!("channel 1 rejected: GPIO {gpio} is held by channel {owner}")
        }
        other => println!("unexpected: {other:?}"),
    }

    // Reconfigure channel 0 onto two lines; GPIO 17 stays its own
    manager.configure(0, &[17, 18], 2_000.0, 0.75)?;
    println!(
        "channel 0 after reconfigure: {:?}, waveform: {:?}",
        manager.channel_info(0),
        driver.programmed(0)
    );

    // Free channel 0; the lines become available and channel 1 can take one
    manager.free(0)?;
    manager.configure(1, &[17], 500.0, 0.25)?;
    println!("GPIO 17 now owned by channel {:?}", manager.gpio_owner(17));

    // Tear everything down
    manager.shutdown()?;
    println!("bound channels after shutdown: {}", manager.snapshot().len());

    Ok(())
}
