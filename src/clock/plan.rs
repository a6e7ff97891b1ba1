//! Clock Plan Lookup
//!
//! Maps every [`SystemClockSpeed`] to the PLL predivider, PLL multiplier and
//! AHB prescaler that produce it from the 8 MHz HSE. This module is
//! testable on the host.
//!
//! # Frequency bands
//!
//! | Band | PLL input | AHB | Targets |
//! |------|-----------|-----|---------|
//! | A | HSE (8 MHz) | /1 | 16-72 MHz in 8 MHz steps |
//! | B | HSE/2 (4 MHz) | /1 | 8, 12, 20 ... 60 MHz |
//! | C | HSE/2 (4 MHz) | /2 | 4, 6, 10 ... 30 MHz |
//! | D | HSE/2 (4 MHz) | /4 | 2, 3, 5 ... 15 MHz |
//! | E | HSE/2 (4 MHz) | /8 | 1 MHz |
//!
//! The table is written out per speed rather than derived, so each row can
//! be checked against the reference manual on its own. The 1 MHz row has
//! been seen to run faster than nominal on real boards; it is kept as
//! listed until someone measures it.

use crate::config::{APB1_MAX_HZ, FLASH_ONE_WAIT_MAX_HZ, FLASH_ZERO_WAIT_MAX_HZ, HSE_HZ};
use crate::types::{
    AhbPrescaler, ApbPrescaler, FlashLatency, PllMultiplier, PllPredivider, SystemClockSpeed,
};

/// Register settings for one target speed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClockPlan {
    /// PLLXTPRE setting
    pub predivider: PllPredivider,
    /// PLLMUL setting
    pub multiplier: PllMultiplier,
    /// HPRE setting
    pub ahb: AhbPrescaler,
}

impl ClockPlan {
    const fn new(predivider: PllPredivider, ahb: AhbPrescaler, pllmul_field: u8) -> Self {
        Self {
            predivider,
            multiplier: PllMultiplier::from_field(pllmul_field),
            ahb,
        }
    }

    /// Look up the plan for a target speed
    #[must_use]
    pub const fn for_speed(speed: SystemClockSpeed) -> Self {
        use AhbPrescaler as Ahb;
        use PllPredivider as Pre;
        use SystemClockSpeed as S;

        match speed {
            // Band A: 8 MHz reference
            S::MHz16 => Self::new(Pre::None, Ahb::Div1, 0),
            S::MHz24 => Self::new(Pre::None, Ahb::Div1, 1),
            S::MHz32 => Self::new(Pre::None, Ahb::Div1, 2),
            S::MHz40 => Self::new(Pre::None, Ahb::Div1, 3),
            S::MHz48 => Self::new(Pre::None, Ahb::Div1, 4),
            S::MHz56 => Self::new(Pre::None, Ahb::Div1, 5),
            S::MHz64 => Self::new(Pre::None, Ahb::Div1, 6),
            S::MHz72 => Self::new(Pre::None, Ahb::Div1, 7),

            // Band B: 4 MHz reference
            S::MHz8 => Self::new(Pre::Div2, Ahb::Div1, 0),
            S::MHz12 => Self::new(Pre::Div2, Ahb::Div1, 1),
            S::MHz20 => Self::new(Pre::Div2, Ahb::Div1, 3),
            S::MHz28 => Self::new(Pre::Div2, Ahb::Div1, 5),
            S::MHz36 => Self::new(Pre::Div2, Ahb::Div1, 7),
            S::MHz44 => Self::new(Pre::Div2, Ahb::Div1, 9),
            S::MHz52 => Self::new(Pre::Div2, Ahb::Div1, 11),
            S::MHz60 => Self::new(Pre::Div2, Ahb::Div1, 13),

            // Band C: 2 MHz reference
            S::MHz4 => Self::new(Pre::Div2, Ahb::Div2, 0),
            S::MHz6 => Self::new(Pre::Div2, Ahb::Div2, 1),
            S::MHz10 => Self::new(Pre::Div2, Ahb::Div2, 3),
            S::MHz14 => Self::new(Pre::Div2, Ahb::Div2, 5),
            S::MHz18 => Self::new(Pre::Div2, Ahb::Div2, 7),
            S::MHz22 => Self::new(Pre::Div2, Ahb::Div2, 9),
            S::MHz26 => Self::new(Pre::Div2, Ahb::Div2, 11),
            S::MHz30 => Self::new(Pre::Div2, Ahb::Div2, 13),

            // Band D: 1 MHz reference
            S::MHz2 => Self::new(Pre::Div2, Ahb::Div4, 0),
            S::MHz3 => Self::new(Pre::Div2, Ahb::Div4, 1),
            S::MHz5 => Self::new(Pre::Div2, Ahb::Div4, 3),
            S::MHz7 => Self::new(Pre::Div2, Ahb::Div4, 5),
            S::MHz9 => Self::new(Pre::Div2, Ahb::Div4, 7),
            S::MHz11 => Self::new(Pre::Div2, Ahb::Div4, 9),
            S::MHz13 => Self::new(Pre::Div2, Ahb::Div4, 11),
            S::MHz15 => Self::new(Pre::Div2, Ahb::Div4, 13),

            // Band E: 500 kHz reference
            S::MHz1 => Self::new(Pre::Div2, Ahb::Div8, 0),
        }
    }

    /// PLL input frequency after the predivider
    #[must_use]
    pub const fn pll_input_hz(&self) -> u32 {
        HSE_HZ / self.predivider.divisor()
    }

    /// Nominal PLL output, which becomes SYSCLK
    #[must_use]
    pub const fn sysclk_hz(&self) -> u32 {
        self.pll_input_hz() * self.multiplier.factor() as u32
    }

    /// Nominal HCLK after the AHB prescaler
    #[must_use]
    pub const fn hclk_hz(&self) -> u32 {
        self.sysclk_hz() / self.ahb.divisor()
    }

    /// Whether the flash prefetch buffer is kept on for this plan
    ///
    /// The buffer is switched off when HCLK is undivided and on otherwise.
    #[must_use]
    pub const fn prefetch_enabled(&self) -> bool {
        !matches!(self.ahb, AhbPrescaler::Div1)
    }
}

/// Flash wait states needed at `speed`
#[must_use]
pub const fn flash_latency(speed: SystemClockSpeed) -> FlashLatency {
    let hz = speed.as_hz();
    if hz <= FLASH_ZERO_WAIT_MAX_HZ {
        FlashLatency::WaitStates0
    } else if hz <= FLASH_ONE_WAIT_MAX_HZ {
        FlashLatency::WaitStates1
    } else {
        FlashLatency::WaitStates2
    }
}

/// APB1 prescaler that keeps PCLK1 within its 36 MHz limit
#[must_use]
pub const fn apb1_prescaler(speed: SystemClockSpeed) -> ApbPrescaler {
    if speed.as_hz() > APB1_MAX_HZ {
        ApbPrescaler::Div2
    } else {
        ApbPrescaler::Div1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_plan_produces_its_nominal_speed() {
        for speed in SystemClockSpeed::ALL {
            let plan = ClockPlan::for_speed(speed);
            assert_eq!(plan.hclk_hz(), speed.as_hz(), "{speed:?}");
        }
    }

    #[test]
    fn multipliers_stay_in_hardware_range() {
        for speed in SystemClockSpeed::ALL {
            let factor = ClockPlan::for_speed(speed).multiplier.factor();
            assert!((PllMultiplier::MIN..=PllMultiplier::MAX).contains(&factor));
        }
    }

    #[test]
    fn prefetch_follows_ahb_divider() {
        assert!(!ClockPlan::for_speed(SystemClockSpeed::MHz72).prefetch_enabled());
        assert!(!ClockPlan::for_speed(SystemClockSpeed::MHz8).prefetch_enabled());
        assert!(ClockPlan::for_speed(SystemClockSpeed::MHz4).prefetch_enabled());
        assert!(ClockPlan::for_speed(SystemClockSpeed::MHz1).prefetch_enabled());
    }

    #[test]
    fn apb1_divides_only_above_36mhz() {
        assert_eq!(apb1_prescaler(SystemClockSpeed::MHz36), ApbPrescaler::Div1);
        assert_eq!(apb1_prescaler(SystemClockSpeed::MHz40), ApbPrescaler::Div2);
    }
}
