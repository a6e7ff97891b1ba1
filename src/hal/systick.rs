//! SysTick Timebase
//!
//! Keeps SysTick ticking at [`SYSTICK_HZ`] across clock changes and uses it
//! for blocking delays.

use cortex_m::peripheral::syst::SystClkSource;
use cortex_m::peripheral::SYST;
use embedded_hal::delay::DelayNs;

use crate::clock::ClockListener;
use crate::config::{HSI_HZ, SYSTICK_HZ};
use crate::types::SystemClockSpeed;

/// SysTick reprogrammed on every clock change
pub struct SysTickTimebase {
    syst: SYST,
    hclk_hz: u32,
}

impl SysTickTimebase {
    /// Take SysTick, assuming the reset clock (HSI) until told otherwise
    #[must_use]
    pub fn new(syst: SYST) -> Self {
        let mut timebase = Self {
            syst,
            hclk_hz: HSI_HZ,
        };
        timebase.reload();
        timebase
    }

    /// Core clock the timebase is calibrated for
    #[must_use]
    pub const fn hclk_hz(&self) -> u32 {
        self.hclk_hz
    }

    /// Give SysTick back
    pub fn free(self) -> SYST {
        self.syst
    }

    fn reload(&mut self) {
        self.syst.disable_counter();
        self.syst.set_clock_source(SystClkSource::Core);
        self.syst.set_reload(self.hclk_hz / SYSTICK_HZ - 1);
        self.syst.clear_current();
        self.syst.enable_counter();
    }
}

impl ClockListener for SysTickTimebase {
    fn system_clock_changed(&mut self, speed: SystemClockSpeed) {
        self.hclk_hz = speed.as_hz();
        self.reload();
        defmt::debug!("SysTick recalibrated for {}", speed);
    }
}

impl DelayNs for SysTickTimebase {
    fn delay_ns(&mut self, ns: u32) {
        let cycles = u64::from(ns) * u64::from(self.hclk_hz) / 1_000_000_000;
        cortex_m::asm::delay(u32::try_from(cycles).unwrap_or(u32::MAX));
    }

    fn delay_ms(&mut self, ms: u32) {
        // Each wrap is one SysTick period
        self.syst.clear_current();
        let _ = self.syst.has_wrapped();
        for _ in 0..ms {
            while !self.syst.has_wrapped() {}
        }
    }
}
