//! Clock Sequencer
//!
//! Drives the RCC and FLASH registers through an ordered switch from the
//! running oscillator to the HSE-fed PLL. Every handshake with the hardware
//! is a busy-wait on a status flag, bounded or not depending on the
//! [`WaitPolicy`].
//!
//! The sequencer owns its register backend and its [`ClockState`], so
//! several independent instances can run side by side on simulated
//! registers.

use crate::config::{pins, HSE_HZ, MCO_MAX_HZ};
use crate::gpio::{self, GpioError, PinConfig, PinMode};
use crate::registers::bits::{flash_acr, rcc_cfgr, rcc_cr};
use crate::registers::{Port, Register, RegisterAccess, WaitExpired, WaitPolicy};
use crate::types::{
    AdcPrescaler, AhbPrescaler, ApbPrescaler, ClockSource, McoSource, PllPredivider,
    SystemClockSpeed,
};

use super::plan::{self, ClockPlan};
use super::{ClockError, ClockListener, ClockResult, ClockState, ReadyFlag};

/// STM32F103 clock tree sequencer
pub struct ClockSequencer<R, L> {
    regs: R,
    listener: L,
    wait: WaitPolicy,
    state: ClockState,
}

impl<R: RegisterAccess, L: ClockListener> ClockSequencer<R, L> {
    /// Create a sequencer that waits on ready flags indefinitely
    ///
    /// Nothing is written to the hardware until the first call.
    pub fn new(regs: R, listener: L) -> Self {
        Self {
            regs,
            listener,
            wait: WaitPolicy::default(),
            state: ClockState::new(),
        }
    }

    /// Replace the wait policy
    #[must_use]
    pub fn with_wait_policy(mut self, wait: WaitPolicy) -> Self {
        self.wait = wait;
        self
    }

    /// Current wait policy
    #[must_use]
    pub const fn wait_policy(&self) -> WaitPolicy {
        self.wait
    }

    /// Switch SYSCLK to the PLL at `target`
    ///
    /// Runs to completion or stops at the first flag that never asserts.
    /// The speed is committed, and the listener notified, once the PLL is
    /// confirmed as SYSCLK. A stall before HSE drives SYSCLK leaves the
    /// tracked state alone. A stall after that leaves the core on the HSE,
    /// and the tracked state is rebuilt from the dividers actually
    /// programmed.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::HardwareTimeout`] if a status flag does not
    /// reach its expected state within the wait policy.
    pub fn set_system_clock_speed(&mut self, target: SystemClockSpeed) -> ClockResult<()> {
        let plan = ClockPlan::for_speed(target);

        #[cfg(feature = "embedded")]
        defmt::debug!(
            "SYSCLK -> {} (PLL x{}, prediv /{}, AHB /{})",
            target,
            plan.multiplier.factor(),
            plan.predivider.divisor(),
            plan.ahb.divisor()
        );

        self.regs.set_bits(Register::RccCfgr, rcc_cfgr::PLLSRC);
        self.switch_to_hse()?;

        if let Err(e) = self.reprogram_pll(target, &plan) {
            self.fall_back_to_hse();
            return Err(e);
        }

        self.listener.system_clock_changed(target);
        self.state.commit_speed(target);

        #[cfg(feature = "embedded")]
        defmt::info!("Clock tree configured: {}", self.state);

        Ok(())
    }

    /// Switch SYSCLK to the PLL at a frequency given in Hz
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::UnsupportedFrequency`] before any register
    /// access when `hz` is not an enumerated speed, otherwise as
    /// [`set_system_clock_speed`](Self::set_system_clock_speed).
    pub fn set_system_clock_hz(&mut self, hz: u32) -> ClockResult<()> {
        let target = SystemClockSpeed::from_hz(hz)?;
        self.set_system_clock_speed(target)
    }

    /// Last committed SYSCLK speed
    #[must_use]
    pub const fn system_clock_speed(&self) -> Option<SystemClockSpeed> {
        self.state.speed()
    }

    /// PCLK1 frequency in Hz
    #[must_use]
    pub fn apb1_clock_hz(&self) -> Option<u32> {
        self.state.apb1_hz()
    }

    /// PCLK2 frequency in Hz
    #[must_use]
    pub fn apb2_clock_hz(&self) -> Option<u32> {
        self.state.apb2_hz()
    }

    /// APB1 timer clock in Hz (twice PCLK1)
    #[must_use]
    pub fn apb1_timer_clock_hz(&self) -> Option<u32> {
        self.state.apb1_timer_hz()
    }

    /// ADC clock in Hz
    #[must_use]
    pub fn adc_clock_hz(&self) -> Option<u32> {
        self.state.adc_hz()
    }

    /// Oscillator currently driving SYSCLK
    #[must_use]
    pub const fn clock_source(&self) -> Option<ClockSource> {
        self.state.source()
    }

    /// Full tracked state
    #[must_use]
    pub const fn state(&self) -> &ClockState {
        &self.state
    }

    /// Route a clock to the MCO pin (PA8)
    ///
    /// Above 50 MHz the request is overridden with PLL/2, the only source
    /// slow enough for the pin at that point. Returns the source actually
    /// programmed.
    ///
    /// # Errors
    ///
    /// Propagates [`GpioError`] from the pin setup.
    pub fn set_mco_output(&mut self, source: McoSource) -> Result<McoSource, GpioError> {
        gpio::configure_pin(
            &mut self.regs,
            Port::A,
            pins::MCO_PIN,
            PinMode::Output50MHz,
            PinConfig::AltPushPull,
        )?;

        let over_limit = self
            .state
            .speed()
            .is_some_and(|speed| speed.as_hz() > MCO_MAX_HZ);
        let effective = if over_limit {
            McoSource::PllDiv2
        } else {
            source
        };

        #[cfg(feature = "embedded")]
        if over_limit {
            defmt::warn!("MCO {} too fast for PA8, using {}", source, effective);
        }

        self.regs.modify(
            Register::RccCfgr,
            rcc_cfgr::MCO_MASK,
            effective.bits() << rcc_cfgr::MCO_POS,
        );
        Ok(effective)
    }

    /// Program the ADC prescaler
    pub fn set_adc_prescaler(&mut self, prescaler: AdcPrescaler) {
        self.regs.modify(
            Register::RccCfgr,
            rcc_cfgr::ADCPRE_MASK,
            prescaler.bits() << rcc_cfgr::ADCPRE_POS,
        );
        self.state.set_adc(prescaler);
    }

    /// Program the APB1 prescaler
    pub fn set_apb1_prescaler(&mut self, prescaler: ApbPrescaler) {
        self.regs.modify(
            Register::RccCfgr,
            rcc_cfgr::PPRE1_MASK,
            prescaler.bits() << rcc_cfgr::PPRE1_POS,
        );
        self.state.set_apb1(prescaler);
    }

    /// Program the APB2 prescaler
    pub fn set_apb2_prescaler(&mut self, prescaler: ApbPrescaler) {
        self.regs.modify(
            Register::RccCfgr,
            rcc_cfgr::PPRE2_MASK,
            prescaler.bits() << rcc_cfgr::PPRE2_POS,
        );
        self.state.set_apb2(prescaler);
    }

    /// Register backend
    #[must_use]
    pub const fn registers(&self) -> &R {
        &self.regs
    }

    /// Mutable register backend, bypassing the tracked state
    pub fn registers_mut(&mut self) -> &mut R {
        &mut self.regs
    }

    /// Clock change listener
    #[must_use]
    pub const fn listener(&self) -> &L {
        &self.listener
    }

    /// Give back the register backend and listener
    pub fn release(self) -> (R, L) {
        (self.regs, self.listener)
    }

    /// Run SYSCLK from the bare HSE and stop the PLL
    fn switch_to_hse(&mut self) -> ClockResult<()> {
        self.regs.set_bits(Register::RccCr, rcc_cr::HSEON);
        self.wait_for(ReadyFlag::HseReady, Register::RccCr, rcc_cr::HSERDY, rcc_cr::HSERDY)?;

        self.regs.modify(
            Register::RccCfgr,
            rcc_cfgr::SW_MASK,
            rcc_cfgr::SW_HSE << rcc_cfgr::SW_POS,
        );
        self.wait_for(
            ReadyFlag::HseSelected,
            Register::RccCfgr,
            rcc_cfgr::SWS_MASK,
            rcc_cfgr::SW_HSE << rcc_cfgr::SWS_POS,
        )?;
        self.state.set_source(ClockSource::Hse);

        self.regs.clear_bits(Register::RccCr, rcc_cr::PLLON);
        Ok(())
    }

    /// Steps run with SYSCLK on the HSE: dividers, flash, PLL
    fn reprogram_pll(&mut self, target: SystemClockSpeed, plan: &ClockPlan) -> ClockResult<()> {
        self.regs.clear_bits(
            Register::RccCfgr,
            rcc_cfgr::PLLXTPRE | rcc_cfgr::PLLMUL_MASK | rcc_cfgr::HPRE_MASK | rcc_cfgr::PPRE1_MASK,
        );

        // Flash has to be slowed down before HCLK goes up
        self.program_flash(target, plan)?;

        let mut cfgr = (plan.ahb.bits() << rcc_cfgr::HPRE_POS)
            | (u32::from(plan.multiplier.field()) << rcc_cfgr::PLLMUL_POS);
        if plan.predivider == PllPredivider::Div2 {
            cfgr |= rcc_cfgr::PLLXTPRE;
        }
        self.regs.set_bits(Register::RccCfgr, cfgr);

        self.set_apb1_prescaler(plan::apb1_prescaler(target));

        self.switch_to_pll()
    }

    /// Track the bare HSE after a stalled reconfiguration
    ///
    /// SWS still reads HSE here, so HCLK is the crystal through whatever
    /// HPRE holds.
    fn fall_back_to_hse(&mut self) {
        let cfgr = self.regs.read(Register::RccCfgr);
        let apb1 = ApbPrescaler::from_bits((cfgr & rcc_cfgr::PPRE1_MASK) >> rcc_cfgr::PPRE1_POS);
        self.state.set_apb1(apb1);

        let speed = AhbPrescaler::from_bits((cfgr & rcc_cfgr::HPRE_MASK) >> rcc_cfgr::HPRE_POS)
            .and_then(|ahb| SystemClockSpeed::from_hz(HSE_HZ / ahb.divisor()).ok());
        match speed {
            Some(speed) => {
                self.listener.system_clock_changed(speed);
                self.state.commit_speed(speed);
            }
            None => self.state.clear_speed(),
        }

        #[cfg(feature = "embedded")]
        defmt::warn!("Clock tree left on HSE: {}", self.state);
    }

    /// Start the PLL and hand SYSCLK over to it
    fn switch_to_pll(&mut self) -> ClockResult<()> {
        self.regs.set_bits(Register::RccCr, rcc_cr::PLLON);
        self.wait_for(ReadyFlag::PllReady, Register::RccCr, rcc_cr::PLLRDY, rcc_cr::PLLRDY)?;

        self.regs.modify(
            Register::RccCfgr,
            rcc_cfgr::SW_MASK,
            rcc_cfgr::SW_PLL << rcc_cfgr::SW_POS,
        );
        self.wait_for(
            ReadyFlag::PllSelected,
            Register::RccCfgr,
            rcc_cfgr::SWS_MASK,
            rcc_cfgr::SW_PLL << rcc_cfgr::SWS_POS,
        )?;
        self.state.set_source(ClockSource::Pll);
        Ok(())
    }

    /// Prefetch buffer and wait states for the coming speed
    fn program_flash(&mut self, target: SystemClockSpeed, plan: &ClockPlan) -> ClockResult<()> {
        if plan.prefetch_enabled() {
            self.regs.set_bits(Register::FlashAcr, flash_acr::PRFTBE);
            self.wait_for(
                ReadyFlag::PrefetchEnabled,
                Register::FlashAcr,
                flash_acr::PRFTBS,
                flash_acr::PRFTBS,
            )?;
        } else {
            self.regs.clear_bits(Register::FlashAcr, flash_acr::PRFTBE);
            self.wait_for(
                ReadyFlag::PrefetchDisabled,
                Register::FlashAcr,
                flash_acr::PRFTBS,
                0,
            )?;
        }

        let latency = plan::flash_latency(target);
        self.regs
            .modify(Register::FlashAcr, flash_acr::LATENCY_MASK, latency.bits());

        #[cfg(feature = "embedded")]
        defmt::trace!("Flash: {}, prefetch {}", latency, plan.prefetch_enabled());

        Ok(())
    }

    /// Spin until `reg & mask == expected`
    fn wait_for(&self, flag: ReadyFlag, reg: Register, mask: u32, expected: u32) -> ClockResult<()> {
        let regs = &self.regs;
        self.wait
            .wait_until(|| regs.read(reg) & mask == expected)
            .map_err(|WaitExpired| {
                #[cfg(feature = "embedded")]
                defmt::error!("Clock sequence stalled on {}", flag);

                ClockError::HardwareTimeout(flag)
            })
    }
}
