//! Command-line front end for the kestrel PWM channel manager.
//!
//! Two entry points: `configure` binds a channel to GPIO lines with a
//! waveform, `free` releases it. Exit status is 0 on success and a distinct
//! non-zero status per error kind, so scripts can branch on the failure.
//!
//! With the mock backend each invocation starts from an empty table, so this
//! is a dry-run harness for the manager; a DMA backend holding peripheral
//! state across processes slots in behind the same trait.

use std::env;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use kestrel_pwm::{ChannelManager, MockPwmDriver, PwmError};

const USAGE: &str = "usage: kestrel-robotics configure <channel> <gpio>[,<gpio>...] <frequency_hz> <duty>\n       kestrel-robotics free <channel>";

/// Exit status for malformed invocations (bad argument count or parse).
const USAGE_STATUS: u8 = 1;

#[derive(Debug, PartialEq)]
enum Command {
    Configure {
        channel: u8,
        gpios: Vec<u8>,
        frequency_hz: f64,
        duty: f64,
    },
    Free {
        channel: u8,
    },
}

impl Command {
    fn parse(args: &[String]) -> Result<Self> {
        match args {
            [op, channel, gpios, frequency_hz, duty] if op.as_str() == "configure" => Ok(Command::Configure {
                channel: channel.parse().context("channel must be an integer")?,
                gpios: parse_gpio_list(gpios)?,
                frequency_hz: frequency_hz.parse().context("frequency must be a number")?,
                duty: duty.parse().context("duty must be a number")?,
            }),
            [op, channel] if op.as_str() == "free" => Ok(Command::Free {
                channel: channel.parse().context("channel must be an integer")?,
            }),
            _ => bail!("unrecognized arguments"),
        }
    }

    fn run(&self, manager: &ChannelManager<MockPwmDriver>) -> Result<(), PwmError> {
        match self {
            Command::Configure {
                channel,
                gpios,
                frequency_hz,
                duty,
            } => manager.configure(*channel, gpios, *frequency_hz, *duty),
            Command::Free { channel } => manager.free(*channel),
        }
    }
}

fn parse_gpio_list(arg: &str) -> Result<Vec<u8>> {
    arg.split(',')
        .map(|part| part.trim().parse().context("gpio must be an integer"))
        .collect()
}

/// A distinct non-zero exit status per error kind.
fn exit_status(error: &PwmError) -> u8 {
    match error {
        PwmError::InvalidChannel(_) => 2,
        PwmError::InvalidGpio(_) => 3,
        PwmError::InvalidFrequency(_) => 4,
        PwmError::InvalidDuty(_) => 5,
        PwmError::GpioConflict { .. } => 6,
        PwmError::UnknownChannel(_) => 7,
        PwmError::HardwareFailure(_) => 8,
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let command = match Command::parse(&args) {
        Ok(command) => command,
        Err(e) => {
            error!("{e:#}");
            eprintln!("{USAGE}");
            return ExitCode::from(USAGE_STATUS);
        }
    };

    // TODO: swap the mock backend for the DMA peripheral driver once it lands.
    let manager = ChannelManager::new(MockPwmDriver::new());

    match command.run(&manager) {
        Ok(()) => {
            info!(?command, "done");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::from(exit_status(&e))
        }
    }
}
