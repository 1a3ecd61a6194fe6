use anyhow::Context;
use log::info;
use std::{
    env, fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use crate::error::{GpioError, Result};
use crate::exec::{shell_quote, CommandExecutor, ShellExecutor};
use crate::gpio_pin_data::convert_physical_pin;

static SYSFS_ROOT: &str = "/sys/class/gpio";
static SYSFS_ROOT_ENV: &str = "GPIO_SYSFS_ROOT";

/// Specifies the GPIO pin value.
///
/// * `LOW` - 0
/// * `HIGH` - 1
///
/// # Example
///
/// ```rust,no_run
/// use db410c_gpio::{Gpio, Direction, Level};
///
/// let gpio = Gpio::new(29, Direction::OUT).unwrap();
/// gpio.write(Level::HIGH).unwrap();
/// assert_eq!(gpio.read_level().unwrap(), Level::HIGH);
/// ```
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Level {
    LOW = 0,
    HIGH = 1,
}

impl Level {
    /// The text written to and read from the `value` file.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::LOW => "0",
            Level::HIGH => "1",
        }
    }
}

/// Specifies the GPIO pin direction.
///
/// * `IN` - Input
/// * `OUT` - Output
///
/// The direction is fixed for the lifetime of a [`Gpio`]. To change it,
/// unexport the pin and set it up again.
///
/// # Example
///
/// ```rust
/// use db410c_gpio::Direction;
///
/// assert_eq!("out".parse::<Direction>().unwrap(), Direction::OUT);
/// assert!("OUT".parse::<Direction>().is_err());
/// ```
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Direction {
    IN,
    OUT,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::IN => "in",
            Direction::OUT => "out",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = GpioError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "in" => Ok(Direction::IN),
            "out" => Ok(Direction::OUT),
            _ => Err(GpioError::InvalidDirection(s.to_string())),
        }
    }
}

/// Location of the sysfs GPIO control files.
///
/// Defaults to `/sys/class/gpio`. The `GPIO_SYSFS_ROOT` environment variable
/// overrides the default, which is mostly useful for running against a fake
/// tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SysfsPaths {
    root: PathBuf,
}

impl SysfsPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        SysfsPaths { root: root.into() }
    }

    /// Reads the root from `GPIO_SYSFS_ROOT`, falling back to `/sys/class/gpio`.
    pub fn from_env() -> Self {
        match env::var_os(SYSFS_ROOT_ENV) {
            Some(root) if !root.is_empty() => SysfsPaths::new(root),
            _ => SysfsPaths::new(SYSFS_ROOT),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn export(&self) -> PathBuf {
        self.root.join("export")
    }

    pub fn unexport(&self) -> PathBuf {
        self.root.join("unexport")
    }

    pub fn direction(&self, pin_no: u32) -> PathBuf {
        self.root.join(format!("gpio{}", pin_no)).join("direction")
    }

    pub fn value(&self, pin_no: u32) -> PathBuf {
        self.root.join(format!("gpio{}", pin_no)).join("value")
    }

    /// Checks that the export and unexport files can be written.
    ///
    /// Pin operations never fail loudly on missing permissions, so this is
    /// the place to find out early.
    pub fn check_write_access(&self) -> anyhow::Result<()> {
        for path in [self.export(), self.unexport()] {
            let metadata = fs::metadata(&path)
                .with_context(|| format!("Cannot access {}", path.display()))?;
            if metadata.permissions().readonly() {
                anyhow::bail!(
                    "You do not have write access to the GPIO sysfs interface ({}).",
                    path.display()
                );
            }
        }

        Ok(())
    }
}

impl Default for SysfsPaths {
    fn default() -> Self {
        Self::from_env()
    }
}

/// One exported and configured GPIO pin.
///
/// Construction exports the pin and writes its direction. Nothing is undone
/// on drop: call [`unexport_pin`](Gpio::unexport_pin) when done, and do not
/// use the handle afterwards.
///
/// Commands that fail at the OS level do not return errors. They print a
/// diagnostic and yield an empty string, see
/// [`CommandExecutor::run`](crate::exec::CommandExecutor::run).
///
/// # Example
///
/// ```rust,no_run
/// use db410c_gpio::{Gpio, Direction};
///
/// let led = Gpio::new(29, Direction::OUT).unwrap();
/// led.set_high().unwrap();
/// led.set_low().unwrap();
/// led.unexport_pin().unwrap();
/// ```
#[derive(Debug)]
pub struct Gpio<E: CommandExecutor = ShellExecutor> {
    pin_no: u32,
    direction: Direction,
    paths: SysfsPaths,
    executor: E,
}

impl Gpio<ShellExecutor> {
    /// Exports `physical_pin` and sets its direction.
    ///
    /// # Arguments
    ///
    /// * `physical_pin` - Pin number as shown on the board schematic, 24 to 34 inclusive.
    /// * `direction` - `Direction::OUT` or `Direction::IN`.
    pub fn new(physical_pin: u32, direction: Direction) -> Result<Self> {
        Self::with_executor(physical_pin, direction, ShellExecutor::new())
    }

    /// Same as [`Gpio::new`] with the direction given as `"in"` or `"out"`.
    ///
    /// The direction is checked before the pin number.
    pub fn setup(physical_pin: u32, direction: &str) -> Result<Self> {
        let direction = direction.parse::<Direction>()?;
        Self::new(physical_pin, direction)
    }
}

impl<E: CommandExecutor> Gpio<E> {
    pub fn with_executor(physical_pin: u32, direction: Direction, executor: E) -> Result<Self> {
        Self::with_paths(physical_pin, direction, SysfsPaths::default(), executor)
    }

    pub fn with_paths(
        physical_pin: u32,
        direction: Direction,
        paths: SysfsPaths,
        executor: E,
    ) -> Result<Self> {
        let pin_no = convert_physical_pin(physical_pin)?;

        let gpio = Gpio {
            pin_no,
            direction,
            paths,
            executor,
        };

        gpio.export_pin()?;
        gpio.echo(direction.as_str(), &gpio.paths.direction(pin_no))?;
        info!(
            "exported gpio{} (physical pin {}) as {}",
            pin_no, physical_pin, direction
        );

        Ok(gpio)
    }

    /// The system pin number used in sysfs paths.
    pub fn pin_no(&self) -> u32 {
        self.pin_no
    }

    /// The direction this pin was set up with.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Reads the direction back from sysfs.
    ///
    /// Returns `"in"` or `"out"`, or an empty string if the read failed.
    pub fn get_direction(&self) -> Result<String> {
        self.cat(&self.paths.direction(self.pin_no))
    }

    /// Returns 1 if the pin reads high and 0 otherwise.
    ///
    /// A failed read also returns 0; this call cannot tell a low pin from a
    /// read that did not happen.
    pub fn read_value(&self) -> Result<u8> {
        Ok(self.read_level()? as u8)
    }

    /// Same as [`read_value`](Gpio::read_value), as a [`Level`].
    pub fn read_level(&self) -> Result<Level> {
        let value = self.cat(&self.paths.value(self.pin_no))?;
        if value == Level::HIGH.as_str() {
            Ok(Level::HIGH)
        } else {
            Ok(Level::LOW)
        }
    }

    /// Drives the pin high.
    ///
    /// Fails with `InvalidOperation` on an input pin.
    pub fn set_high(&self) -> Result<()> {
        self.write(Level::HIGH)
    }

    /// Drives the pin low.
    ///
    /// Fails with `InvalidOperation` on an input pin.
    pub fn set_low(&self) -> Result<()> {
        self.write(Level::LOW)
    }

    pub fn write(&self, level: Level) -> Result<()> {
        if self.direction == Direction::IN {
            return Err(GpioError::InvalidOperation {
                operation: match level {
                    Level::HIGH => "set_high",
                    Level::LOW => "set_low",
                },
                direction: self.direction,
            });
        }

        self.echo(level.as_str(), &self.paths.value(self.pin_no))
    }

    /// Unexports the pin. It cannot be used afterwards.
    ///
    /// The handle is left as it is; further calls will be issued against a
    /// pin that no longer exists and fail at the OS level.
    pub fn unexport_pin(&self) -> Result<()> {
        self.echo(&self.pin_no.to_string(), &self.paths.unexport())?;
        info!("unexported gpio{}", self.pin_no);
        Ok(())
    }

    fn export_pin(&self) -> Result<()> {
        self.echo(&self.pin_no.to_string(), &self.paths.export())
    }

    fn echo(&self, text: &str, path: &Path) -> Result<()> {
        self.executor
            .run(&format!("echo {} > {}", text, shell_quote(path)))
            .map(|_| ())
    }

    fn cat(&self, path: &Path) -> Result<String> {
        self.executor.run(&format!("cat {}", shell_quote(path)))
    }
}
