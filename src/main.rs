//! STM32F103 Clock Tree Demo Application
//!
//! Brings the clock tree up to 72 MHz from the HSE crystal, routes SYSCLK to
//! the MCO pin and drives a sawtooth out of the LTC1451 DAC.

#![no_std]
#![no_main]

use defmt::{error, info, warn};
use embassy_executor::Spawner;
use embassy_stm32::gpio::{Level, Output, Speed};
use embassy_stm32::spi::{self, Spi};
use embassy_stm32::time::Hertz;
use {defmt_rtt as _, panic_probe as _};

use f103_clocktree::prelude::*;

/// DAC code increment per ramp step
const RAMP_STEP: u16 = 64;

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("F103 clock tree demo v{}", env!("CARGO_PKG_VERSION"));

    // Embassy leaves the core on HSI; the sequencer takes it from there
    let p = embassy_stm32::init(embassy_stm32::Config::default());
    let core = defmt::unwrap!(cortex_m::Peripherals::take());

    let mut timebase = SysTickTimebase::new(core.SYST);
    let apb2_hz = {
        let mut clocks = ClockSequencer::new(MmioRegisters::new(), &mut timebase)
            .with_wait_policy(WaitPolicy::Bounded(READY_WAIT_ATTEMPTS));

        // Intermediate register states must not be observed by interrupts
        let configured = critical_section::with(|_| {
            clocks.set_system_clock_speed(DEFAULT_SYSTEM_CLOCK)
        });
        if let Err(e) = configured {
            error!("Clock setup failed, staying on {}: {}", clocks.clock_source(), e);
        }

        clocks.set_apb2_prescaler(ApbPrescaler::Div1);
        // ADC clock must stay at or below 14 MHz
        clocks.set_adc_prescaler(AdcPrescaler::Div6);

        match clocks.set_mco_output(McoSource::SystemClock) {
            Ok(source) => info!("MCO on {}: {}", pins::MCO, source),
            Err(e) => warn!("MCO not configured: {}", e),
        }

        info!(
            "APB1 {} Hz, APB1 timers {} Hz, ADC {} Hz",
            clocks.apb1_clock_hz(),
            clocks.apb1_timer_clock_hz(),
            clocks.adc_clock_hz()
        );
        clocks.apb2_clock_hz().unwrap_or(HSI_HZ)
    };

    // Embassy computes the SPI divider from the HSI clock it saw at init
    let mut spi_config = spi::Config::default();
    spi_config.mode = spi::MODE_0;
    spi_config.frequency = Hertz(DAC_SPI_FREQUENCY_HZ / (apb2_hz / HSI_HZ).max(1));

    let spi = Spi::new_blocking_txonly(p.SPI1, p.PA5, p.PA7, spi_config);
    let cs = Output::new(p.PA4, Level::High, Speed::Low);
    let mut dac = defmt::unwrap!(Ltc1451::new(spi, cs));
    let mut led = Output::new(p.PC13, Level::High, Speed::Low);

    info!("LTC1451 ready on SPI1 ({}, {}, CS {})", pins::DAC_SCK, pins::DAC_MOSI, pins::DAC_CS);

    loop {
        let mut value = 0;
        while value <= DacCode::MAX {
            if let Err(e) = dac.write(value) {
                warn!("DAC write failed: {}", e);
            }
            timebase.delay_ms(1);
            value += RAMP_STEP;
        }
        led.toggle();
    }
}
