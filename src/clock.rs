//! Clock Tree Control
//!
//! Configures the STM32F103 clock tree: HSE and PLL switching, AHB/APB/ADC
//! prescalers, flash wait states and the MCO pin.
//!
//! # Sequencing
//!
//! SYSCLK is always moved onto the bare HSE oscillator before the PLL is
//! touched, because the PLL multiplier and predivider bits must not change
//! while the PLL drives the core. Flash latency is raised before the new
//! frequency takes effect.
//!
//! ```text
//!   ┌─────────┐  HSEON, SW=HSE, PLLON=0   ┌─────────┐
//!   │   PLL   │ ────────────────────────▶ │   HSE   │
//!   │ driven  │ ◀──────────────────────── │ driven  │
//!   └─────────┘  flash, HPRE, PLLMUL,     └─────────┘
//!                PPRE1, PLLON, SW=PLL
//! ```

use core::fmt;

use crate::types::SystemClockSpeed;

pub mod plan;
pub mod sequencer;
pub mod state;

pub use plan::ClockPlan;
pub use sequencer::ClockSequencer;
pub use state::ClockState;

/// Hardware status flag the sequencer waits on
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadyFlag {
    /// HSERDY set after HSEON
    HseReady,
    /// SWS reports HSE
    HseSelected,
    /// PLLRDY set after PLLON
    PllReady,
    /// SWS reports PLL
    PllSelected,
    /// PRFTBS cleared after PRFTBE was cleared
    PrefetchDisabled,
    /// PRFTBS set after PRFTBE was set
    PrefetchEnabled,
}

impl fmt::Display for ReadyFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::HseReady => "HSE ready",
            Self::HseSelected => "HSE selected as SYSCLK",
            Self::PllReady => "PLL locked",
            Self::PllSelected => "PLL selected as SYSCLK",
            Self::PrefetchDisabled => "prefetch buffer disabled",
            Self::PrefetchEnabled => "prefetch buffer enabled",
        };
        f.write_str(name)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for ReadyFlag {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::HseReady => defmt::write!(f, "HSERDY"),
            Self::HseSelected => defmt::write!(f, "SWS=HSE"),
            Self::PllReady => defmt::write!(f, "PLLRDY"),
            Self::PllSelected => defmt::write!(f, "SWS=PLL"),
            Self::PrefetchDisabled => defmt::write!(f, "PRFTBS=0"),
            Self::PrefetchEnabled => defmt::write!(f, "PRFTBS=1"),
        }
    }
}

/// Clock configuration error
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockError {
    /// Requested frequency is not one of [`SystemClockSpeed::ALL`]
    UnsupportedFrequency(u32),
    /// A status flag never reached its expected state
    HardwareTimeout(ReadyFlag),
}

impl fmt::Display for ClockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedFrequency(hz) => write!(f, "unsupported system clock {hz} Hz"),
            Self::HardwareTimeout(flag) => write!(f, "timed out waiting for {flag}"),
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for ClockError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::UnsupportedFrequency(hz) => defmt::write!(f, "UnsupportedFrequency({} Hz)", hz),
            Self::HardwareTimeout(flag) => defmt::write!(f, "HardwareTimeout({})", flag),
        }
    }
}

/// Clock operation result
pub type ClockResult<T> = Result<T, ClockError>;

/// Receives the new SYSCLK whenever the core changes speed
///
/// Implemented by whatever counts ticks or busy-waits in cycles, so delays
/// stay calibrated across clock changes.
pub trait ClockListener {
    /// Called once the PLL drives SYSCLK at `speed`, or once a failed
    /// reconfiguration has left the core on the HSE
    fn system_clock_changed(&mut self, speed: SystemClockSpeed);
}

impl<T: ClockListener + ?Sized> ClockListener for &mut T {
    fn system_clock_changed(&mut self, speed: SystemClockSpeed) {
        (**self).system_clock_changed(speed);
    }
}

/// Listener for callers with nothing to recalibrate
impl ClockListener for () {
    fn system_clock_changed(&mut self, _speed: SystemClockSpeed) {}
}
