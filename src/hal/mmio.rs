//! Memory-Mapped Register Backend
//!
//! Implements [`RegisterAccess`] on the real RCC, FLASH and GPIO blocks
//! through the embassy-stm32 peripheral access crate.

use embassy_stm32::pac;

use crate::registers::{Port, Register, RegisterAccess};

/// Register access through the STM32F103 memory map
#[derive(Clone, Copy, Debug, Default)]
pub struct MmioRegisters {
    _private: (),
}

impl MmioRegisters {
    /// Create the backend
    ///
    /// All instances alias the same hardware; only one sequencer should
    /// own a backend at a time.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    const fn gpio(port: Port) -> pac::gpio::Gpio {
        match port {
            Port::A => pac::GPIOA,
            Port::B => pac::GPIOB,
            Port::C => pac::GPIOC,
            Port::D => pac::GPIOD,
            Port::E => pac::GPIOE,
        }
    }
}

impl RegisterAccess for MmioRegisters {
    fn read(&self, reg: Register) -> u32 {
        match reg {
            Register::RccCr => pac::RCC.cr().read().0,
            Register::RccCfgr => pac::RCC.cfgr().read().0,
            Register::RccApb2enr => pac::RCC.apb2enr().read().0,
            Register::FlashAcr => pac::FLASH.acr().read().0,
            Register::GpioCrl(port) => Self::gpio(port).cr(0).read().0,
            Register::GpioCrh(port) => Self::gpio(port).cr(1).read().0,
        }
    }

    fn write(&mut self, reg: Register, value: u32) {
        match reg {
            Register::RccCr => pac::RCC.cr().write_value(pac::rcc::regs::Cr(value)),
            Register::RccCfgr => pac::RCC.cfgr().write_value(pac::rcc::regs::Cfgr(value)),
            Register::RccApb2enr => {
                pac::RCC.apb2enr().write_value(pac::rcc::regs::Apb2enr(value));
            }
            Register::FlashAcr => pac::FLASH.acr().write_value(pac::flash::regs::Acr(value)),
            Register::GpioCrl(port) => Self::gpio(port).cr(0).write_value(pac::gpio::regs::Cr(value)),
            Register::GpioCrh(port) => Self::gpio(port).cr(1).write_value(pac::gpio::regs::Cr(value)),
        }
    }
}
