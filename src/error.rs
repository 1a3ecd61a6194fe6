use thiserror::Error;

use crate::gpio::Direction;

/// Errors raised by pin translation, pin control and command execution.
///
/// A command that runs but exits non-zero is *not* an error; see
/// [`CommandExecutor::run`](crate::exec::CommandExecutor::run).
#[derive(Debug, Error)]
pub enum GpioError {
    /// The direction is neither `"in"` nor `"out"`.
    #[error("Unknown direction set to the pin: {0:?}")]
    InvalidDirection(String),

    /// The physical pin is not on the expansion header table.
    #[error("Invalid pin number {0} - could not be exported.")]
    InvalidPin(u32),

    /// A write was attempted on an input pin.
    #[error("Invalid operation `{operation}` for a pin with direction `{direction}`.")]
    InvalidOperation {
        operation: &'static str,
        direction: Direction,
    },

    /// The shell process could not be created.
    #[error("Failed to spawn process for command '{command}'")]
    ProcessSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

impl GpioError {
    /// Returns `true` for faults of the environment rather than of the caller's arguments.
    pub fn is_environment_fault(&self) -> bool {
        matches!(self, GpioError::ProcessSpawn { .. })
    }
}

pub type Result<T> = std::result::Result<T, GpioError>;
