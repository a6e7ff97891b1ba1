//! Configuration and Constants Tests
//!
//! Tests to verify configuration values are valid and consistent.
//! Run with: cargo test --target x86_64-unknown-linux-gnu --no-default-features --features std --test config_tests

use f103_clocktree::config::*;
use f103_clocktree::registers::WaitPolicy;
use f103_clocktree::types::SystemClockSpeed;

// =============================================================================
// Clock Limit Tests
// =============================================================================

#[test]
fn oscillators_are_8mhz() {
    // Blue Pill crystal and the F103 internal RC
    assert_eq!(HSE_HZ, 8_000_000);
    assert_eq!(HSI_HZ, 8_000_000);
}

#[test]
fn max_clock_matches_table() {
    assert_eq!(MAX_SYSTEM_CLOCK_HZ, 72_000_000);
    let fastest = SystemClockSpeed::ALL[SystemClockSpeed::ALL.len() - 1];
    assert_eq!(fastest.as_hz(), MAX_SYSTEM_CLOCK_HZ);
}

#[test]
fn bus_limits_below_max_clock() {
    assert_eq!(APB1_MAX_HZ, MAX_SYSTEM_CLOCK_HZ / 2);
    assert!(MCO_MAX_HZ < MAX_SYSTEM_CLOCK_HZ);
}

#[test]
fn flash_boundaries_ordered() {
    assert!(FLASH_ZERO_WAIT_MAX_HZ < FLASH_ONE_WAIT_MAX_HZ);
    assert!(FLASH_ONE_WAIT_MAX_HZ < MAX_SYSTEM_CLOCK_HZ);
    assert_eq!(FLASH_ZERO_WAIT_MAX_HZ, 24_000_000);
    assert_eq!(FLASH_ONE_WAIT_MAX_HZ, 48_000_000);
}

#[test]
fn default_clock_is_max() {
    assert_eq!(DEFAULT_SYSTEM_CLOCK, SystemClockSpeed::MHz72);
}

// =============================================================================
// Wait Policy Tests
// =============================================================================

#[test]
fn default_wait_is_unbounded() {
    assert_eq!(WaitPolicy::default(), WaitPolicy::Unbounded);
    assert!(READY_WAIT_ATTEMPTS > 0);
}

// =============================================================================
// DAC Configuration Tests
// =============================================================================

#[test]
fn dac_full_scale_is_one_mv_per_lsb() {
    // 2.048 V reference, gain of 2, 12 bits
    assert_eq!(DAC_FULL_SCALE_MV, 4_095);
}

#[test]
fn dac_spi_within_datasheet() {
    assert!(DAC_SPI_FREQUENCY_HZ > 0);
    assert!(DAC_SPI_FREQUENCY_HZ <= 12_500_000);
}

// =============================================================================
// Pin Tests
// =============================================================================

#[test]
fn mco_pin_is_pa8() {
    assert_eq!(pins::MCO, "PA8");
    assert_eq!(pins::MCO_PIN, 8);
}

#[test]
fn dac_pins_on_spi1() {
    assert_eq!(pins::DAC_SCK, "PA5");
    assert_eq!(pins::DAC_MOSI, "PA7");
    assert_eq!(pins::DAC_CS, "PA4");
}

#[test]
fn pins_unique() {
    let all = [pins::MCO, pins::DAC_SCK, pins::DAC_MOSI, pins::DAC_CS, pins::LED_STATUS];
    for (i, a) in all.iter().enumerate() {
        for b in &all[i + 1..] {
            assert_ne!(a, b);
        }
    }
}
