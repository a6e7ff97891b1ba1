//! GPIO Pin Configuration
//!
//! Register-level pin direction setup for the STM32F1 port layout, where
//! each pin owns a 4-bit MODE/CNF nibble in CRL (pins 0-7) or CRH
//! (pins 8-15). Used for pins the clock driver has to claim itself, such
//! as the MCO output.

use core::fmt;

use crate::registers::{Port, Register, RegisterAccess};

/// Pin direction and output slew rate (MODE bits)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PinMode {
    /// Input (reset state)
    Input,
    /// Output, max speed 10 MHz
    Output10MHz,
    /// Output, max speed 2 MHz
    Output2MHz,
    /// Output, max speed 50 MHz
    Output50MHz,
}

impl PinMode {
    /// 2-bit MODE encoding
    #[must_use]
    pub const fn bits(self) -> u32 {
        match self {
            Self::Input => 0b00,
            Self::Output10MHz => 0b01,
            Self::Output2MHz => 0b10,
            Self::Output50MHz => 0b11,
        }
    }

    /// Whether this is one of the output modes
    #[must_use]
    pub const fn is_output(self) -> bool {
        !matches!(self, Self::Input)
    }
}

/// Pin electrical configuration (CNF bits)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PinConfig {
    /// Analog input
    Analog,
    /// Floating input (reset state)
    Floating,
    /// Input with pull-up or pull-down
    PullUpDown,
    /// General purpose push-pull output
    PushPull,
    /// General purpose open-drain output
    OpenDrain,
    /// Alternate function push-pull output
    AltPushPull,
    /// Alternate function open-drain output
    AltOpenDrain,
}

impl PinConfig {
    /// 2-bit CNF encoding
    #[must_use]
    pub const fn bits(self) -> u32 {
        match self {
            Self::Analog | Self::PushPull => 0b00,
            Self::Floating | Self::OpenDrain => 0b01,
            Self::PullUpDown | Self::AltPushPull => 0b10,
            Self::AltOpenDrain => 0b11,
        }
    }

    /// Whether this configuration only exists for output modes
    #[must_use]
    pub const fn is_output(self) -> bool {
        matches!(
            self,
            Self::PushPull | Self::OpenDrain | Self::AltPushPull | Self::AltOpenDrain
        )
    }
}

/// Pin configuration error
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GpioError {
    /// Pin number above 15
    InvalidPin(u8),
    /// Input configuration with an output mode, or the reverse
    ModeMismatch(PinMode, PinConfig),
}

impl fmt::Display for GpioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPin(pin) => write!(f, "pin {pin} does not exist"),
            Self::ModeMismatch(mode, config) => {
                write!(f, "{config:?} is not valid in {mode:?} mode")
            }
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for GpioError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::InvalidPin(pin) => defmt::write!(f, "InvalidPin({})", pin),
            Self::ModeMismatch(mode, config) => defmt::write!(
                f,
                "ModeMismatch(mode={=u32:b}, cnf={=u32:b})",
                mode.bits(),
                config.bits()
            ),
        }
    }
}

/// Enable the port clock and program one pin's MODE/CNF nibble
///
/// # Errors
///
/// Returns [`GpioError`] for a pin above 15 or an input/output mismatch
/// between `mode` and `config`. No register is touched in that case.
pub fn configure_pin<R: RegisterAccess>(
    regs: &mut R,
    port: Port,
    pin: u8,
    mode: PinMode,
    config: PinConfig,
) -> Result<(), GpioError> {
    if pin > 15 {
        return Err(GpioError::InvalidPin(pin));
    }
    if mode.is_output() != config.is_output() {
        return Err(GpioError::ModeMismatch(mode, config));
    }

    regs.set_bits(Register::RccApb2enr, port.clock_enable_bit());

    let reg = if pin < 8 {
        Register::GpioCrl(port)
    } else {
        Register::GpioCrh(port)
    };
    let shift = u32::from(pin % 8) * 4;
    let nibble = (config.bits() << 2) | mode.bits();
    regs.modify(reg, 0b1111 << shift, nibble << shift);

    Ok(())
}
