//! GPIO control for the Dragonboard 410c low-speed expansion header.
//!
//! Pins are addressed by their physical number on the board schematic (24 to
//! 34) and driven through the kernel's sysfs interface under
//! `/sys/class/gpio`. The process must be allowed to write there, which on
//! Debian for the Dragonboard usually means running as root.
//!
//! ```rust,no_run
//! use db410c_gpio::{Gpio, Direction};
//!
//! let button = Gpio::new(24, Direction::IN).unwrap();
//! let led = Gpio::new(29, Direction::OUT).unwrap();
//!
//! if button.read_value().unwrap() == 1 {
//!     led.set_high().unwrap();
//! }
//!
//! button.unexport_pin().unwrap();
//! led.unexport_pin().unwrap();
//! ```

pub mod error;
pub mod exec;
pub mod gpio;
pub mod gpio_pin_data;
pub mod logging;

pub use crate::error::{GpioError, Result};
pub use crate::exec::{
    shell_quote, strip_trailing_newline, CommandExecutor, CommandOutput, ShellExecutor,
};
pub use crate::gpio::{Direction, Gpio, Level, SysfsPaths};
pub use crate::gpio_pin_data::{convert_physical_pin, supported_physical_pins, PIN_MAPPING};
pub use crate::logging::init_logger;
