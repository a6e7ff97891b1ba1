//! LTC1451 12-bit DAC Driver
//!
//! The LTC1451 is a 3-wire serial DAC with an internal 2.048 V reference and
//! a gain of 2, so one LSB is 1 mV and full scale is 4.095 V.
//!
//! Data is shifted in MSB first while CS/LD is low and latched into the DAC
//! register on the rising edge of CS/LD. The driver sends a 16-bit frame:
//! four zero padding bits that fall off the end of the 12-bit shift
//! register, then the 12 data bits.
//!
//! ```text
//!  CS/LD  ‾‾\_________________________________/‾‾
//!  DIN        0 0 0 0 D11 D10 ... D1 D0
//! ```

use core::fmt;

use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;

use crate::config::DAC_FULL_SCALE_MV;

/// 12-bit DAC input code (0-4095)
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct DacCode(u16);

impl DacCode {
    /// Largest code
    pub const MAX: u16 = 4095;

    /// 0 V
    pub const ZERO: Self = Self(0);

    /// Mid-scale output
    pub const MID_SCALE: Self = Self(2048);

    /// Full-scale output
    pub const FULL_SCALE: Self = Self(Self::MAX);

    /// Create from a raw value, `None` above 4095
    #[must_use]
    pub const fn new(value: u16) -> Option<Self> {
        if value <= Self::MAX {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Create from a raw value, clamping to full scale
    #[must_use]
    pub const fn saturating(value: u16) -> Self {
        Self(if value > Self::MAX { Self::MAX } else { value })
    }

    /// Code for an output voltage in millivolts, `None` above full scale
    #[must_use]
    pub fn from_millivolts(millivolts: u32) -> Option<Self> {
        if millivolts > DAC_FULL_SCALE_MV {
            return None;
        }
        let code = millivolts * u32::from(Self::MAX) / DAC_FULL_SCALE_MV;
        u16::try_from(code).ok().and_then(Self::new)
    }

    /// Raw 12-bit value
    #[must_use]
    pub const fn value(self) -> u16 {
        self.0
    }

    /// 16-bit frame: four zero padding bits, then the 12 data bits
    #[must_use]
    pub const fn frame(self) -> u16 {
        self.0 & 0x0FFF
    }

    /// Frame as it goes on the wire, MSB first
    #[must_use]
    pub const fn to_bytes(self) -> [u8; 2] {
        self.frame().to_be_bytes()
    }

    /// Nominal output voltage in millivolts
    #[must_use]
    pub fn millivolts(self) -> u32 {
        u32::from(self.0) * DAC_FULL_SCALE_MV / u32::from(Self::MAX)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for DacCode {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "DAC({})", self.0);
    }
}

/// LTC1451 driver error
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DacError<SpiE, PinE> {
    /// Value above 4095, or above 4095 mV; nothing was sent
    OutOfRange(u32),
    /// SPI transfer failed; chip select was still released
    Spi(SpiE),
    /// Chip select pin could not be driven
    ChipSelect(PinE),
}

impl<SpiE: fmt::Debug, PinE: fmt::Debug> fmt::Display for DacError<SpiE, PinE> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange(value) => write!(f, "DAC value {value} out of range"),
            Self::Spi(e) => write!(f, "SPI error: {e:?}"),
            Self::ChipSelect(e) => write!(f, "chip select error: {e:?}"),
        }
    }
}

#[cfg(feature = "embedded")]
impl<SpiE, PinE> defmt::Format for DacError<SpiE, PinE>
where
    SpiE: embedded_hal::spi::Error,
    PinE: embedded_hal::digital::Error,
{
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::OutOfRange(value) => defmt::write!(f, "OutOfRange({})", value),
            Self::Spi(e) => defmt::write!(f, "Spi({})", e.kind()),
            Self::ChipSelect(e) => defmt::write!(f, "ChipSelect({})", e.kind()),
        }
    }
}

/// Result type of the LTC1451 driver
pub type DacResult<SPI, CS> = Result<
    (),
    DacError<
        <SPI as embedded_hal::spi::ErrorType>::Error,
        <CS as embedded_hal::digital::ErrorType>::Error,
    >,
>;

/// LTC1451 on a dedicated SPI bus with a software chip select
pub struct Ltc1451<SPI, CS> {
    spi: SPI,
    cs: CS,
}

impl<SPI, CS> Ltc1451<SPI, CS>
where
    SPI: SpiBus<u8>,
    CS: OutputPin,
{
    /// Take the bus and chip select, leaving the DAC deselected
    ///
    /// No data is sent; the DAC keeps its power-on output until the first
    /// write.
    ///
    /// # Errors
    ///
    /// Returns [`DacError::ChipSelect`] if CS cannot be driven high.
    pub fn new(spi: SPI, mut cs: CS) -> Result<Self, DacError<SPI::Error, CS::Error>> {
        if let Err(e) = cs.set_high() {
            return Err(DacError::ChipSelect(e));
        }
        Ok(Self { spi, cs })
    }

    /// Write a raw 12-bit value
    ///
    /// # Errors
    ///
    /// Returns [`DacError::OutOfRange`] above 4095 without touching the bus,
    /// otherwise as [`write_code`](Self::write_code).
    pub fn write(&mut self, value: u16) -> DacResult<SPI, CS> {
        let Some(code) = DacCode::new(value) else {
            return Err(DacError::OutOfRange(u32::from(value)));
        };
        self.write_code(code)
    }

    /// Write an output voltage in millivolts
    ///
    /// # Errors
    ///
    /// Returns [`DacError::OutOfRange`] above 4095 mV without touching the
    /// bus, otherwise as [`write_code`](Self::write_code).
    pub fn write_millivolts(&mut self, millivolts: u32) -> DacResult<SPI, CS> {
        let Some(code) = DacCode::from_millivolts(millivolts) else {
            return Err(DacError::OutOfRange(millivolts));
        };
        self.write_code(code)
    }

    /// Shift one frame out and latch it
    ///
    /// Chip select is released on every path, including SPI faults, so the
    /// bus is never left with the DAC selected.
    ///
    /// # Errors
    ///
    /// Returns [`DacError::Spi`] if the transfer fails, or
    /// [`DacError::ChipSelect`] if CS cannot be driven. An SPI error takes
    /// precedence over a failure to release CS.
    pub fn write_code(&mut self, code: DacCode) -> DacResult<SPI, CS> {
        if let Err(e) = self.cs.set_low() {
            let _ = self.cs.set_high();
            return Err(DacError::ChipSelect(e));
        }

        let sent = self
            .spi
            .write(&code.to_bytes())
            .and_then(|()| self.spi.flush());
        let released = self.cs.set_high();

        match sent {
            Err(e) => Err(DacError::Spi(e)),
            Ok(()) => released.map_err(DacError::ChipSelect),
        }
    }

    /// Give back the bus and chip select
    pub fn release(self) -> (SPI, CS) {
        (self.spi, self.cs)
    }
}
