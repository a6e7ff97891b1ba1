//! Register Access Layer
//!
//! The clock sequencer never touches memory directly. It reads and writes
//! whole 32-bit registers through [`RegisterAccess`], which has two
//! implementations:
//!
//! - `hal::mmio::MmioRegisters` maps onto the memory-mapped peripherals
//! - [`SimulatedRegisters`] is a register file that mimics the RCC and FLASH
//!   ready handshakes, for host tests and on-target self tests
//!
//! Busy-waits on ready flags go through a [`WaitPolicy`], so a flag that
//! never asserts can surface as an error instead of a hang.

use core::cell::Cell;

use heapless::Vec;

/// GPIO port
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Port {
    /// GPIOA
    A,
    /// GPIOB
    B,
    /// GPIOC
    C,
    /// GPIOD
    D,
    /// GPIOE
    E,
}

impl Port {
    /// Zero-based port index (A = 0)
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
            Self::C => 2,
            Self::D => 3,
            Self::E => 4,
        }
    }

    /// Clock enable bit of this port in RCC_APB2ENR
    #[must_use]
    pub const fn clock_enable_bit(self) -> u32 {
        bits::rcc_apb2enr::IOPAEN << self.index()
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Port {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::A => defmt::write!(f, "GPIOA"),
            Self::B => defmt::write!(f, "GPIOB"),
            Self::C => defmt::write!(f, "GPIOC"),
            Self::D => defmt::write!(f, "GPIOD"),
            Self::E => defmt::write!(f, "GPIOE"),
        }
    }
}

/// Registers the drivers in this crate use
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Register {
    /// RCC clock control register
    RccCr,
    /// RCC clock configuration register
    RccCfgr,
    /// RCC APB2 peripheral clock enable register
    RccApb2enr,
    /// FLASH access control register
    FlashAcr,
    /// GPIO configuration register low (pins 0-7)
    GpioCrl(Port),
    /// GPIO configuration register high (pins 8-15)
    GpioCrh(Port),
}

impl Register {
    /// Number of distinct registers
    pub const COUNT: usize = 14;

    /// Value after a system reset (RM0008)
    #[must_use]
    pub const fn reset_value(self) -> u32 {
        match self {
            // HSION | HSIRDY, HSITRIM = 16
            Self::RccCr => 0x0000_0083,
            Self::RccCfgr | Self::RccApb2enr => 0,
            // PRFTBE | PRFTBS
            Self::FlashAcr => 0x0000_0030,
            // Every pin floating input
            Self::GpioCrl(_) | Self::GpioCrh(_) => 0x4444_4444,
        }
    }

    /// Dense index, used to store a register file in an array
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::RccCr => 0,
            Self::RccCfgr => 1,
            Self::RccApb2enr => 2,
            Self::FlashAcr => 3,
            Self::GpioCrl(port) => 4 + port.index(),
            Self::GpioCrh(port) => 9 + port.index(),
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Register {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::RccCr => defmt::write!(f, "RCC_CR"),
            Self::RccCfgr => defmt::write!(f, "RCC_CFGR"),
            Self::RccApb2enr => defmt::write!(f, "RCC_APB2ENR"),
            Self::FlashAcr => defmt::write!(f, "FLASH_ACR"),
            Self::GpioCrl(port) => defmt::write!(f, "{}_CRL", port),
            Self::GpioCrh(port) => defmt::write!(f, "{}_CRH", port),
        }
    }
}

/// Bit layout of the registers (RM0008, sections 3.3 and 7.3)
pub mod bits {
    /// RCC_CR
    pub mod rcc_cr {
        /// HSE clock enable
        pub const HSEON: u32 = 1 << 16;
        /// HSE clock ready flag
        pub const HSERDY: u32 = 1 << 17;
        /// PLL enable
        pub const PLLON: u32 = 1 << 24;
        /// PLL clock ready flag
        pub const PLLRDY: u32 = 1 << 25;
    }

    /// RCC_CFGR
    pub mod rcc_cfgr {
        /// System clock switch
        pub const SW_POS: u32 = 0;
        /// SW mask
        pub const SW_MASK: u32 = 0b11 << SW_POS;
        /// System clock switch status
        pub const SWS_POS: u32 = 2;
        /// SWS mask
        pub const SWS_MASK: u32 = 0b11 << SWS_POS;
        /// SW/SWS value selecting HSE
        pub const SW_HSE: u32 = 0b01;
        /// SW/SWS value selecting PLL
        pub const SW_PLL: u32 = 0b10;
        /// AHB prescaler
        pub const HPRE_POS: u32 = 4;
        /// HPRE mask
        pub const HPRE_MASK: u32 = 0b1111 << HPRE_POS;
        /// APB1 prescaler
        pub const PPRE1_POS: u32 = 8;
        /// PPRE1 mask
        pub const PPRE1_MASK: u32 = 0b111 << PPRE1_POS;
        /// APB2 prescaler
        pub const PPRE2_POS: u32 = 11;
        /// PPRE2 mask
        pub const PPRE2_MASK: u32 = 0b111 << PPRE2_POS;
        /// ADC prescaler
        pub const ADCPRE_POS: u32 = 14;
        /// ADCPRE mask
        pub const ADCPRE_MASK: u32 = 0b11 << ADCPRE_POS;
        /// PLL entry clock source (set = HSE)
        pub const PLLSRC: u32 = 1 << 16;
        /// HSE divider for PLL entry (set = HSE / 2)
        pub const PLLXTPRE: u32 = 1 << 17;
        /// PLL multiplication factor
        pub const PLLMUL_POS: u32 = 18;
        /// PLLMUL mask
        pub const PLLMUL_MASK: u32 = 0b1111 << PLLMUL_POS;
        /// Microcontroller clock output
        pub const MCO_POS: u32 = 24;
        /// MCO mask
        pub const MCO_MASK: u32 = 0b111 << MCO_POS;
    }

    /// RCC_APB2ENR
    pub mod rcc_apb2enr {
        /// IO port A clock enable, ports B-E follow
        pub const IOPAEN: u32 = 1 << 2;
    }

    /// FLASH_ACR
    pub mod flash_acr {
        /// Wait states
        pub const LATENCY_MASK: u32 = 0b111;
        /// Prefetch buffer enable
        pub const PRFTBE: u32 = 1 << 4;
        /// Prefetch buffer status
        pub const PRFTBS: u32 = 1 << 5;
    }
}

/// Whole-register access to the RCC, FLASH and GPIO blocks
pub trait RegisterAccess {
    /// Read a register
    fn read(&self, reg: Register) -> u32;

    /// Write a register
    fn write(&mut self, reg: Register, value: u32);

    /// Read-modify-write: clear `clear`, then set `set`
    fn modify(&mut self, reg: Register, clear: u32, set: u32) {
        let value = self.read(reg);
        self.write(reg, (value & !clear) | set);
    }

    /// Set bits, leaving the others untouched
    fn set_bits(&mut self, reg: Register, bits: u32) {
        self.modify(reg, 0, bits);
    }

    /// Clear bits, leaving the others untouched
    fn clear_bits(&mut self, reg: Register, bits: u32) {
        self.modify(reg, bits, 0);
    }

    /// Check whether any bit of `mask` is set
    fn is_set(&self, reg: Register, mask: u32) -> bool {
        self.read(reg) & mask != 0
    }
}

impl<T: RegisterAccess + ?Sized> RegisterAccess for &mut T {
    fn read(&self, reg: Register) -> u32 {
        (**self).read(reg)
    }

    fn write(&mut self, reg: Register, value: u32) {
        (**self).write(reg, value);
    }
}

/// A ready flag did not reach its expected state in time
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaitExpired;

/// How busy-waits on hardware status bits behave
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaitPolicy {
    /// Spin until the condition holds, however long it takes
    Unbounded,
    /// Poll at most this many times (at least once)
    Bounded(u32),
}

impl WaitPolicy {
    /// Spin until `ready` returns true
    ///
    /// # Errors
    ///
    /// Returns [`WaitExpired`] when a bounded policy runs out of attempts.
    pub fn wait_until<F>(self, mut ready: F) -> Result<(), WaitExpired>
    where
        F: FnMut() -> bool,
    {
        match self {
            Self::Unbounded => {
                while !ready() {
                    core::hint::spin_loop();
                }
                Ok(())
            }
            Self::Bounded(max_attempts) => {
                for _ in 0..max_attempts.max(1) {
                    if ready() {
                        return Ok(());
                    }
                    core::hint::spin_loop();
                }
                Err(WaitExpired)
            }
        }
    }
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self::Unbounded
    }
}

/// One logged register write
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegisterWrite {
    /// Register written
    pub reg: Register,
    /// Value after the write, status bits included
    pub value: u32,
}

/// Writes kept in the simulated register log before it stops recording
const LOG_CAPACITY: usize = 128;

/// Simulated RCC/FLASH/GPIO register file
///
/// Status flags follow their control bits the moment the control bit is
/// written: HSERDY tracks HSEON, PLLRDY tracks PLLON, SWS tracks SW and
/// PRFTBS tracks PRFTBE. [`freeze`](Self::freeze) pins status bits to
/// their current value to simulate an oscillator that never starts.
pub struct SimulatedRegisters {
    values: [u32; Register::COUNT],
    frozen: [u32; Register::COUNT],
    log: Vec<RegisterWrite, LOG_CAPACITY>,
    log_overflowed: bool,
    reads: Cell<u32>,
}

impl SimulatedRegisters {
    /// Writes kept in the log before it stops recording
    pub const LOG_CAPACITY: usize = LOG_CAPACITY;

    /// Create a register file holding reset values
    #[must_use]
    pub fn new() -> Self {
        let mut values = [0; Register::COUNT];
        for reg in Self::all_registers() {
            values[reg.index()] = reg.reset_value();
        }
        Self {
            values,
            frozen: [0; Register::COUNT],
            log: Vec::new(),
            log_overflowed: false,
            reads: Cell::new(0),
        }
    }

    /// Stop the status bits in `mask` from following their control bits
    pub fn freeze(&mut self, reg: Register, mask: u32) {
        self.frozen[reg.index()] |= mask;
    }

    /// Let frozen status bits follow their control bits again
    pub fn thaw(&mut self, reg: Register, mask: u32) {
        self.frozen[reg.index()] &= !mask;
        let value = self.values[reg.index()];
        self.values[reg.index()] = self.settle(reg, value, value);
    }

    /// Current value without counting as an access
    #[must_use]
    pub fn peek(&self, reg: Register) -> u32 {
        self.values[reg.index()]
    }

    /// Force a raw value, bypassing the status-bit model and the log
    pub fn poke(&mut self, reg: Register, value: u32) {
        self.values[reg.index()] = value;
    }

    /// Writes recorded so far, oldest first
    #[must_use]
    pub fn writes(&self) -> &[RegisterWrite] {
        &self.log
    }

    /// Whether writes were dropped because the log was full
    #[must_use]
    pub const fn log_overflowed(&self) -> bool {
        self.log_overflowed
    }

    /// Number of register reads so far
    #[must_use]
    pub fn read_count(&self) -> u32 {
        self.reads.get()
    }

    /// Forget recorded writes and reads
    pub fn clear_log(&mut self) {
        self.log.clear();
        self.log_overflowed = false;
        self.reads.set(0);
    }

    fn all_registers() -> [Register; Register::COUNT] {
        use Port::{A, B, C, D, E};
        [
            Register::RccCr,
            Register::RccCfgr,
            Register::RccApb2enr,
            Register::FlashAcr,
            Register::GpioCrl(A),
            Register::GpioCrl(B),
            Register::GpioCrl(C),
            Register::GpioCrl(D),
            Register::GpioCrl(E),
            Register::GpioCrh(A),
            Register::GpioCrh(B),
            Register::GpioCrh(C),
            Register::GpioCrh(D),
            Register::GpioCrh(E),
        ]
    }

    /// Mask of read-only status bits in a register
    const fn status_mask(reg: Register) -> u32 {
        match reg {
            Register::RccCr => bits::rcc_cr::HSERDY | bits::rcc_cr::PLLRDY,
            Register::RccCfgr => bits::rcc_cfgr::SWS_MASK,
            Register::FlashAcr => bits::flash_acr::PRFTBS,
            _ => 0,
        }
    }

    /// Combine a written value with the status bits the hardware would show
    fn settle(&self, reg: Register, previous: u32, written: u32) -> u32 {
        let status = Self::status_mask(reg);
        let frozen = self.frozen[reg.index()] & status;

        let tracked = match reg {
            Register::RccCr => {
                let mut flags = 0;
                if written & bits::rcc_cr::HSEON != 0 {
                    flags |= bits::rcc_cr::HSERDY;
                }
                if written & bits::rcc_cr::PLLON != 0 {
                    flags |= bits::rcc_cr::PLLRDY;
                }
                flags
            }
            Register::RccCfgr => {
                let sw = (written & bits::rcc_cfgr::SW_MASK) >> bits::rcc_cfgr::SW_POS;
                sw << bits::rcc_cfgr::SWS_POS
            }
            Register::FlashAcr => {
                if written & bits::flash_acr::PRFTBE != 0 {
                    bits::flash_acr::PRFTBS
                } else {
                    0
                }
            }
            _ => 0,
        };

        (written & !status) | (tracked & status & !frozen) | (previous & frozen)
    }
}

impl Default for SimulatedRegisters {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterAccess for SimulatedRegisters {
    fn read(&self, reg: Register) -> u32 {
        self.reads.set(self.reads.get().saturating_add(1));
        self.values[reg.index()]
    }

    fn write(&mut self, reg: Register, value: u32) {
        let previous = self.values[reg.index()];
        let settled = self.settle(reg, previous, value);
        self.values[reg.index()] = settled;

        if self
            .log
            .push(RegisterWrite {
                reg,
                value: settled,
            })
            .is_err()
        {
            self.log_overflowed = true;
        }
    }
}
