//! System configuration and hardware constants
//!
//! This module defines compile-time constants for the STM32F103 board.
//! Clock limits, flash timing boundaries and pin assignments are centralized here.

use crate::types::SystemClockSpeed;

/// External crystal (HSE) frequency
pub const HSE_HZ: u32 = 8_000_000;

/// Internal RC oscillator (HSI) frequency
pub const HSI_HZ: u32 = 8_000_000;

/// Maximum SYSCLK of the STM32F103
pub const MAX_SYSTEM_CLOCK_HZ: u32 = 72_000_000;

/// Maximum APB1 (PCLK1) frequency
pub const APB1_MAX_HZ: u32 = 36_000_000;

/// Fastest clock the MCO pin may carry
pub const MCO_MAX_HZ: u32 = 50_000_000;

/// Highest SYSCLK that runs with zero flash wait states
pub const FLASH_ZERO_WAIT_MAX_HZ: u32 = 24_000_000;

/// Highest SYSCLK that runs with one flash wait state
pub const FLASH_ONE_WAIT_MAX_HZ: u32 = 48_000_000;

/// Polls before the firmware declares a ready flag stuck
///
/// HSE start-up is the slowest handshake, typically well under 100k polls.
pub const READY_WAIT_ATTEMPTS: u32 = 1_000_000;

/// Clock the firmware configures at boot
pub const DEFAULT_SYSTEM_CLOCK: SystemClockSpeed = SystemClockSpeed::MHz72;

/// SysTick interrupt rate used by the timebase
pub const SYSTICK_HZ: u32 = 1_000;

/// LTC1451 full-scale output in millivolts (internal 2.048 V reference, gain 2)
pub const DAC_FULL_SCALE_MV: u32 = 4_095;

/// SPI clock for the LTC1451 (datasheet max 12.5 MHz at 5 V)
pub const DAC_SPI_FREQUENCY_HZ: u32 = 1_000_000;

/// Pin assignments for GPIO
pub mod pins {
    //! GPIO pin assignments matching the board wiring

    /// MCO alternate function output
    pub const MCO: &str = "PA8";

    /// MCO pin number on GPIOA
    pub const MCO_PIN: u8 = 8;

    /// SPI1 SCK to LTC1451 CLK
    pub const DAC_SCK: &str = "PA5";

    /// SPI1 MOSI to LTC1451 DIN
    pub const DAC_MOSI: &str = "PA7";

    /// Software chip select to LTC1451 CS/LD
    pub const DAC_CS: &str = "PA4";

    /// Status LED on the Blue Pill
    pub const LED_STATUS: &str = "PC13";
}
