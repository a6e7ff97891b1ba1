//! Tracked Clock State
//!
//! The RCC registers hold the divider encodings, but the derived bus
//! frequencies need the target speed as well. `ClockState` keeps both, owned
//! by one [`ClockSequencer`](super::ClockSequencer).

use crate::types::{AdcPrescaler, ApbPrescaler, ClockSource, SystemClockSpeed};

/// Clock tree as last programmed by the sequencer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ClockState {
    /// Last successfully applied SYSCLK/HCLK target
    speed: Option<SystemClockSpeed>,
    /// Oscillator driving SYSCLK
    source: Option<ClockSource>,
    /// APB1 divider
    apb1: ApbPrescaler,
    /// APB2 divider
    apb2: ApbPrescaler,
    /// ADC divider
    adc: AdcPrescaler,
}

impl ClockState {
    /// State before any configuration call
    #[must_use]
    pub const fn new() -> Self {
        Self {
            speed: None,
            source: None,
            apb1: ApbPrescaler::Div1,
            apb2: ApbPrescaler::Div1,
            adc: AdcPrescaler::Div2,
        }
    }

    /// Last committed speed
    #[must_use]
    pub const fn speed(&self) -> Option<SystemClockSpeed> {
        self.speed
    }

    /// Oscillator currently driving SYSCLK
    #[must_use]
    pub const fn source(&self) -> Option<ClockSource> {
        self.source
    }

    /// APB1 divider
    #[must_use]
    pub const fn apb1_prescaler(&self) -> ApbPrescaler {
        self.apb1
    }

    /// APB2 divider
    #[must_use]
    pub const fn apb2_prescaler(&self) -> ApbPrescaler {
        self.apb2
    }

    /// ADC divider
    #[must_use]
    pub const fn adc_prescaler(&self) -> AdcPrescaler {
        self.adc
    }

    /// PCLK1 frequency
    #[must_use]
    pub fn apb1_hz(&self) -> Option<u32> {
        self.speed.map(|s| s.as_hz() / self.apb1.divisor())
    }

    /// PCLK2 frequency
    #[must_use]
    pub fn apb2_hz(&self) -> Option<u32> {
        self.speed.map(|s| s.as_hz() / self.apb2.divisor())
    }

    /// Timer clock on the APB1 domain
    #[must_use]
    pub fn apb1_timer_hz(&self) -> Option<u32> {
        self.apb1_hz().map(|hz| hz * 2)
    }

    /// ADC clock, derived from PCLK2
    #[must_use]
    pub fn adc_hz(&self) -> Option<u32> {
        self.apb2_hz().map(|hz| hz / self.adc.divisor())
    }

    pub(crate) fn commit_speed(&mut self, speed: SystemClockSpeed) {
        self.speed = Some(speed);
    }

    pub(crate) fn clear_speed(&mut self) {
        self.speed = None;
    }

    pub(crate) fn set_source(&mut self, source: ClockSource) {
        self.source = Some(source);
    }

    pub(crate) fn set_apb1(&mut self, prescaler: ApbPrescaler) {
        self.apb1 = prescaler;
    }

    pub(crate) fn set_apb2(&mut self, prescaler: ApbPrescaler) {
        self.apb2 = prescaler;
    }

    pub(crate) fn set_adc(&mut self, prescaler: AdcPrescaler) {
        self.adc = prescaler;
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for ClockState {
    fn format(&self, f: defmt::Formatter) {
        match (self.speed, self.source) {
            (Some(speed), Some(source)) => defmt::write!(
                f,
                "Clocks({} via {}, APB1 {}, APB2 {})",
                speed,
                source,
                self.apb1,
                self.apb2
            ),
            _ => defmt::write!(f, "Clocks(unconfigured)"),
        }
    }
}
