//! STM32F103 Clock Tree and DAC Driver Library
//!
//! This library configures the STM32F103 clock tree (HSE, PLL, bus
//! prescalers, flash wait states, MCO) and drives an external LTC1451
//! 12-bit SPI DAC.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       DRIVER LAYER                           │
//! │   ClockSequencer (clock)   │   Ltc1451 (drivers)            │
//! ├─────────────────────────────────────────────────────────────┤
//! │                     ACCESS SEAMS                             │
//! │  RegisterAccess │ WaitPolicy │ ClockListener │ embedded-hal │
//! ├─────────────────────────────────────────────────────────────┤
//! │                     BACKENDS                                 │
//! │  MmioRegisters, SysTickTimebase (hal)  │  SimulatedRegisters │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Design Principles
//!
//! - **Owned state**: each `ClockSequencer` owns its register backend and
//!   tracked clock state, no globals
//! - **Closed enums**: only supported speeds and selectors can be expressed
//! - **Table-driven**: the speed to PLL/AHB mapping is a literal table
//! - **No unsafe in driver code**: register access goes through the PAC
//! - **Explicit error handling**: stuck flags and bad values return `Result`

#![cfg_attr(feature = "embedded", no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Re-export dependencies needed by applications (only in embedded mode)
#[cfg(feature = "embedded")]
pub use embassy_executor;
#[cfg(feature = "embedded")]
pub use embassy_stm32;

/// Hardware Abstraction Layer
///
/// Memory-mapped register backend and SysTick timebase.
#[cfg(feature = "embedded")]
pub mod hal;

/// Peripheral Drivers
///
/// Drivers for external ICs (LTC1451 DAC).
pub mod drivers;

/// Clock Tree Control
///
/// Clock sequencer, frequency plan table and tracked clock state.
pub mod clock;

/// Register Access
///
/// Register map, access trait, wait policy and simulated backend.
pub mod registers;

/// GPIO Configuration
///
/// Register-level pin mode setup.
pub mod gpio;

/// Shared types used across modules
pub mod types;

/// System configuration and constants
pub mod config;

/// Prelude module for common imports
pub mod prelude {
    //! Convenient re-exports for common types and traits.

    pub use crate::clock::{ClockError, ClockListener, ClockSequencer};
    pub use crate::config::*;
    pub use crate::drivers::ltc1451::{DacCode, DacError, Ltc1451};
    pub use crate::registers::{RegisterAccess, WaitPolicy};
    pub use crate::types::*;

    #[cfg(feature = "embedded")]
    pub use crate::hal::{mmio::MmioRegisters, systick::SysTickTimebase};

    // Common traits
    pub use embedded_hal::delay::DelayNs;
    pub use embedded_hal::digital::OutputPin;
    pub use embedded_hal::spi::SpiBus;

    // Logging
    #[cfg(feature = "embedded")]
    pub use defmt::{debug, error, info, trace, warn};
}
