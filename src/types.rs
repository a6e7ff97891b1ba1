//! Shared types used across the clock and DAC drivers
//!
//! This module defines the enumerated register selectors and clock speeds.
//! Every value that ends up in an RCC or FLASH bit field is a closed enum,
//! so an unsupported selector cannot be expressed at all.

use core::fmt;

use crate::clock::ClockError;

/// Supported system clock (HCLK) frequencies
///
/// Only these targets can be produced from the 8 MHz HSE crystal with the
/// PLL and AHB prescaler combinations in [`crate::clock::plan`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u32)]
pub enum SystemClockSpeed {
    /// 1 MHz
    MHz1 = 1_000_000,
    /// 2 MHz
    MHz2 = 2_000_000,
    /// 3 MHz
    MHz3 = 3_000_000,
    /// 4 MHz
    MHz4 = 4_000_000,
    /// 5 MHz
    MHz5 = 5_000_000,
    /// 6 MHz
    MHz6 = 6_000_000,
    /// 7 MHz
    MHz7 = 7_000_000,
    /// 8 MHz
    MHz8 = 8_000_000,
    /// 9 MHz
    MHz9 = 9_000_000,
    /// 10 MHz
    MHz10 = 10_000_000,
    /// 11 MHz
    MHz11 = 11_000_000,
    /// 12 MHz
    MHz12 = 12_000_000,
    /// 13 MHz
    MHz13 = 13_000_000,
    /// 14 MHz
    MHz14 = 14_000_000,
    /// 15 MHz
    MHz15 = 15_000_000,
    /// 16 MHz
    MHz16 = 16_000_000,
    /// 18 MHz
    MHz18 = 18_000_000,
    /// 20 MHz
    MHz20 = 20_000_000,
    /// 22 MHz
    MHz22 = 22_000_000,
    /// 24 MHz
    MHz24 = 24_000_000,
    /// 26 MHz
    MHz26 = 26_000_000,
    /// 28 MHz
    MHz28 = 28_000_000,
    /// 30 MHz
    MHz30 = 30_000_000,
    /// 32 MHz
    MHz32 = 32_000_000,
    /// 36 MHz
    MHz36 = 36_000_000,
    /// 40 MHz
    MHz40 = 40_000_000,
    /// 44 MHz
    MHz44 = 44_000_000,
    /// 48 MHz
    MHz48 = 48_000_000,
    /// 52 MHz
    MHz52 = 52_000_000,
    /// 56 MHz
    MHz56 = 56_000_000,
    /// 60 MHz
    MHz60 = 60_000_000,
    /// 64 MHz
    MHz64 = 64_000_000,
    /// 72 MHz (device maximum)
    MHz72 = 72_000_000,
}

impl SystemClockSpeed {
    /// Every supported speed, in ascending order
    pub const ALL: [Self; 33] = [
        Self::MHz1,
        Self::MHz2,
        Self::MHz3,
        Self::MHz4,
        Self::MHz5,
        Self::MHz6,
        Self::MHz7,
        Self::MHz8,
        Self::MHz9,
        Self::MHz10,
        Self::MHz11,
        Self::MHz12,
        Self::MHz13,
        Self::MHz14,
        Self::MHz15,
        Self::MHz16,
        Self::MHz18,
        Self::MHz20,
        Self::MHz22,
        Self::MHz24,
        Self::MHz26,
        Self::MHz28,
        Self::MHz30,
        Self::MHz32,
        Self::MHz36,
        Self::MHz40,
        Self::MHz44,
        Self::MHz48,
        Self::MHz52,
        Self::MHz56,
        Self::MHz60,
        Self::MHz64,
        Self::MHz72,
    ];

    /// Get the frequency in Hz
    #[must_use]
    pub const fn as_hz(self) -> u32 {
        self as u32
    }

    /// Get the frequency in whole MHz
    #[must_use]
    pub const fn as_mhz(self) -> u32 {
        self.as_hz() / 1_000_000
    }

    /// Look up the enumerated speed for a frequency in Hz
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::UnsupportedFrequency`] when `hz` is not one of
    /// the enumerated speeds.
    pub fn from_hz(hz: u32) -> Result<Self, ClockError> {
        Self::ALL
            .iter()
            .copied()
            .find(|speed| speed.as_hz() == hz)
            .ok_or(ClockError::UnsupportedFrequency(hz))
    }
}

impl fmt::Debug for SystemClockSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SystemClockSpeed({} MHz)", self.as_mhz())
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for SystemClockSpeed {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{} MHz", self.as_mhz());
    }
}

/// APB1/APB2 bus prescaler (PPRE1/PPRE2 fields)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ApbPrescaler {
    /// HCLK not divided
    #[default]
    Div1,
    /// HCLK / 2
    Div2,
    /// HCLK / 4
    Div4,
    /// HCLK / 8
    Div8,
    /// HCLK / 16
    Div16,
}

impl ApbPrescaler {
    /// Integer divisor applied to HCLK
    #[must_use]
    pub const fn divisor(self) -> u32 {
        match self {
            Self::Div1 => 1,
            Self::Div2 => 2,
            Self::Div4 => 4,
            Self::Div8 => 8,
            Self::Div16 => 16,
        }
    }

    /// 3-bit PPRE field encoding
    #[must_use]
    pub const fn bits(self) -> u32 {
        match self {
            Self::Div1 => 0b000,
            Self::Div2 => 0b100,
            Self::Div4 => 0b101,
            Self::Div8 => 0b110,
            Self::Div16 => 0b111,
        }
    }

    /// Decode a PPRE field (any `0xx` value means not divided)
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        match bits & 0b111 {
            0b100 => Self::Div2,
            0b101 => Self::Div4,
            0b110 => Self::Div8,
            0b111 => Self::Div16,
            _ => Self::Div1,
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for ApbPrescaler {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "/{}", self.divisor());
    }
}

/// AHB prescaler (HPRE field)
///
/// Only the divisors the clock plan can select are modelled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AhbPrescaler {
    /// SYSCLK not divided
    #[default]
    Div1,
    /// SYSCLK / 2
    Div2,
    /// SYSCLK / 4
    Div4,
    /// SYSCLK / 8
    Div8,
}

impl AhbPrescaler {
    /// Integer divisor applied to SYSCLK
    #[must_use]
    pub const fn divisor(self) -> u32 {
        match self {
            Self::Div1 => 1,
            Self::Div2 => 2,
            Self::Div4 => 4,
            Self::Div8 => 8,
        }
    }

    /// 4-bit HPRE field encoding
    #[must_use]
    pub const fn bits(self) -> u32 {
        match self {
            Self::Div1 => 0b0000,
            Self::Div2 => 0b1000,
            Self::Div4 => 0b1001,
            Self::Div8 => 0b1010,
        }
    }

    /// Decode an HPRE field, `None` for divisors beyond /8
    #[must_use]
    pub const fn from_bits(bits: u32) -> Option<Self> {
        match bits & 0b1111 {
            0b0000..=0b0111 => Some(Self::Div1),
            0b1000 => Some(Self::Div2),
            0b1001 => Some(Self::Div4),
            0b1010 => Some(Self::Div8),
            _ => None,
        }
    }
}

/// ADC prescaler (ADCPRE field), divides PCLK2
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AdcPrescaler {
    /// PCLK2 / 2 (reset value)
    #[default]
    Div2,
    /// PCLK2 / 4
    Div4,
    /// PCLK2 / 6
    Div6,
    /// PCLK2 / 8
    Div8,
}

impl AdcPrescaler {
    /// Integer divisor applied to PCLK2
    #[must_use]
    pub const fn divisor(self) -> u32 {
        match self {
            Self::Div2 => 2,
            Self::Div4 => 4,
            Self::Div6 => 6,
            Self::Div8 => 8,
        }
    }

    /// 2-bit ADCPRE field encoding
    #[must_use]
    pub const fn bits(self) -> u32 {
        match self {
            Self::Div2 => 0b00,
            Self::Div4 => 0b01,
            Self::Div6 => 0b10,
            Self::Div8 => 0b11,
        }
    }
}

/// Microcontroller clock output source (MCO field)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum McoSource {
    /// Output disabled
    #[default]
    NoClock,
    /// System clock
    SystemClock,
    /// Internal 8 MHz RC oscillator
    Hsi,
    /// External crystal oscillator
    Hse,
    /// PLL output divided by 2
    PllDiv2,
}

impl McoSource {
    /// 3-bit MCO field encoding
    #[must_use]
    pub const fn bits(self) -> u32 {
        match self {
            Self::NoClock => 0b000,
            Self::SystemClock => 0b100,
            Self::Hsi => 0b101,
            Self::Hse => 0b110,
            Self::PllDiv2 => 0b111,
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for McoSource {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::NoClock => defmt::write!(f, "off"),
            Self::SystemClock => defmt::write!(f, "SYSCLK"),
            Self::Hsi => defmt::write!(f, "HSI"),
            Self::Hse => defmt::write!(f, "HSE"),
            Self::PllDiv2 => defmt::write!(f, "PLL/2"),
        }
    }
}

/// HSE divider in front of the PLL input mux (PLLXTPRE bit)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PllPredivider {
    /// HSE fed to the PLL undivided
    #[default]
    None,
    /// HSE / 2 fed to the PLL
    Div2,
}

impl PllPredivider {
    /// Integer divisor applied to HSE
    #[must_use]
    pub const fn divisor(self) -> u32 {
        match self {
            Self::None => 1,
            Self::Div2 => 2,
        }
    }
}

/// PLL multiplication factor (x2 to x16)
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct PllMultiplier(u8);

impl PllMultiplier {
    /// Smallest multiplier the PLLMUL field can encode
    pub const MIN: u8 = 2;

    /// Largest multiplier the PLLMUL field can encode
    pub const MAX: u8 = 16;

    /// Build from the raw 4-bit PLLMUL field (`factor - 2`)
    ///
    /// Field value `0b1111` also means x16 on this part.
    #[must_use]
    pub const fn from_field(field: u8) -> Self {
        let factor = (field & 0x0F) + 2;
        Self(if factor > Self::MAX { Self::MAX } else { factor })
    }

    /// The multiplication factor
    #[must_use]
    pub const fn factor(self) -> u8 {
        self.0
    }

    /// The PLLMUL field encoding (`factor - 2`)
    #[must_use]
    pub const fn field(self) -> u8 {
        self.0 - Self::MIN
    }
}

/// Flash access latency (LATENCY field of FLASH_ACR)
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum FlashLatency {
    /// Zero wait states, 0 < SYSCLK <= 24 MHz
    #[default]
    WaitStates0,
    /// One wait state, 24 MHz < SYSCLK <= 48 MHz
    WaitStates1,
    /// Two wait states, 48 MHz < SYSCLK <= 72 MHz
    WaitStates2,
}

impl FlashLatency {
    /// 3-bit LATENCY field encoding
    #[must_use]
    pub const fn bits(self) -> u32 {
        match self {
            Self::WaitStates0 => 0b000,
            Self::WaitStates1 => 0b001,
            Self::WaitStates2 => 0b010,
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for FlashLatency {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{}WS", self.bits());
    }
}

/// Oscillator currently driving SYSCLK
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockSource {
    /// External crystal, PLL bypassed
    Hse,
    /// PLL output
    Pll,
}

#[cfg(feature = "embedded")]
impl defmt::Format for ClockSource {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Hse => defmt::write!(f, "HSE"),
            Self::Pll => defmt::write!(f, "PLL"),
        }
    }
}
