//! Clock Plan Tests
//!
//! Tests for the speed to PLL/AHB table, flash latency and APB1 selection.
//! Run with: cargo test --target x86_64-unknown-linux-gnu --no-default-features --features std --test plan_tests

use f103_clocktree::clock::plan::{self, ClockPlan};
use f103_clocktree::types::{
    AhbPrescaler, ApbPrescaler, FlashLatency, PllPredivider, SystemClockSpeed,
};

use AhbPrescaler as Ahb;
use PllPredivider as Pre;
use SystemClockSpeed as S;

/// (speed, predivider, PLL factor, AHB divider) for every supported speed
const TABLE: [(S, Pre, u8, Ahb); 33] = [
    (S::MHz1, Pre::Div2, 2, Ahb::Div8),
    (S::MHz2, Pre::Div2, 2, Ahb::Div4),
    (S::MHz3, Pre::Div2, 3, Ahb::Div4),
    (S::MHz4, Pre::Div2, 2, Ahb::Div2),
    (S::MHz5, Pre::Div2, 5, Ahb::Div4),
    (S::MHz6, Pre::Div2, 3, Ahb::Div2),
    (S::MHz7, Pre::Div2, 7, Ahb::Div4),
    (S::MHz8, Pre::Div2, 2, Ahb::Div1),
    (S::MHz9, Pre::Div2, 9, Ahb::Div4),
    (S::MHz10, Pre::Div2, 5, Ahb::Div2),
    (S::MHz11, Pre::Div2, 11, Ahb::Div4),
    (S::MHz12, Pre::Div2, 3, Ahb::Div1),
    (S::MHz13, Pre::Div2, 13, Ahb::Div4),
    (S::MHz14, Pre::Div2, 7, Ahb::Div2),
    (S::MHz15, Pre::Div2, 15, Ahb::Div4),
    (S::MHz16, Pre::None, 2, Ahb::Div1),
    (S::MHz18, Pre::Div2, 9, Ahb::Div2),
    (S::MHz20, Pre::Div2, 5, Ahb::Div1),
    (S::MHz22, Pre::Div2, 11, Ahb::Div2),
    (S::MHz24, Pre::None, 3, Ahb::Div1),
    (S::MHz26, Pre::Div2, 13, Ahb::Div2),
    (S::MHz28, Pre::Div2, 7, Ahb::Div1),
    (S::MHz30, Pre::Div2, 15, Ahb::Div2),
    (S::MHz32, Pre::None, 4, Ahb::Div1),
    (S::MHz36, Pre::Div2, 9, Ahb::Div1),
    (S::MHz40, Pre::None, 5, Ahb::Div1),
    (S::MHz44, Pre::Div2, 11, Ahb::Div1),
    (S::MHz48, Pre::None, 6, Ahb::Div1),
    (S::MHz52, Pre::Div2, 13, Ahb::Div1),
    (S::MHz56, Pre::None, 7, Ahb::Div1),
    (S::MHz60, Pre::Div2, 15, Ahb::Div1),
    (S::MHz64, Pre::None, 8, Ahb::Div1),
    (S::MHz72, Pre::None, 9, Ahb::Div1),
];

// =============================================================================
// Table Tests
// =============================================================================

#[test]
fn test_table_matches_every_speed() {
    for (speed, predivider, factor, ahb) in TABLE {
        let plan = ClockPlan::for_speed(speed);
        assert_eq!(plan.predivider, predivider, "{speed:?}");
        assert_eq!(plan.multiplier.factor(), factor, "{speed:?}");
        assert_eq!(plan.ahb, ahb, "{speed:?}");
    }
}

#[test]
fn test_table_covers_all_speeds() {
    for (row, speed) in TABLE.iter().zip(SystemClockSpeed::ALL) {
        assert_eq!(row.0, speed);
    }
}

#[test]
fn test_72mhz_plan() {
    // 8 MHz HSE x9, undivided
    let plan = ClockPlan::for_speed(S::MHz72);
    assert_eq!(plan.pll_input_hz(), 8_000_000);
    assert_eq!(plan.sysclk_hz(), 72_000_000);
    assert_eq!(plan.hclk_hz(), 72_000_000);
    assert_eq!(plan.multiplier.field(), 7);
}

#[test]
fn test_1mhz_plan() {
    // 4 MHz x2 = 8 MHz SYSCLK, AHB /8
    let plan = ClockPlan::for_speed(S::MHz1);
    assert_eq!(plan.pll_input_hz(), 4_000_000);
    assert_eq!(plan.sysclk_hz(), 8_000_000);
    assert_eq!(plan.hclk_hz(), 1_000_000);
}

#[test]
fn test_pll_output_within_device_limit() {
    for speed in SystemClockSpeed::ALL {
        let plan = ClockPlan::for_speed(speed);
        assert!(plan.sysclk_hz() <= 72_000_000, "{speed:?}");
        assert!(plan.sysclk_hz() >= plan.hclk_hz());
    }
}

#[test]
fn test_prefetch_off_only_when_undivided() {
    for speed in SystemClockSpeed::ALL {
        let plan = ClockPlan::for_speed(speed);
        assert_eq!(plan.prefetch_enabled(), plan.ahb != Ahb::Div1, "{speed:?}");
    }
}

// =============================================================================
// Flash Latency Tests
// =============================================================================

#[test]
fn test_latency_boundaries() {
    assert_eq!(plan::flash_latency(S::MHz1), FlashLatency::WaitStates0);
    assert_eq!(plan::flash_latency(S::MHz24), FlashLatency::WaitStates0);
    assert_eq!(plan::flash_latency(S::MHz26), FlashLatency::WaitStates1);
    assert_eq!(plan::flash_latency(S::MHz48), FlashLatency::WaitStates1);
    assert_eq!(plan::flash_latency(S::MHz52), FlashLatency::WaitStates2);
    assert_eq!(plan::flash_latency(S::MHz72), FlashLatency::WaitStates2);
}

#[test]
fn test_latency_monotonic() {
    for pair in SystemClockSpeed::ALL.windows(2) {
        assert!(plan::flash_latency(pair[0]) <= plan::flash_latency(pair[1]));
    }
}

// =============================================================================
// APB1 Tests
// =============================================================================

#[test]
fn test_apb1_prescaler_selection() {
    for speed in SystemClockSpeed::ALL {
        let expected = if speed.as_hz() > 36_000_000 {
            ApbPrescaler::Div2
        } else {
            ApbPrescaler::Div1
        };
        assert_eq!(plan::apb1_prescaler(speed), expected, "{speed:?}");
    }
}

#[test]
fn test_apb1_never_exceeds_36mhz() {
    for speed in SystemClockSpeed::ALL {
        let pclk1 = speed.as_hz() / plan::apb1_prescaler(speed).divisor();
        assert!(pclk1 <= 36_000_000, "{speed:?}");
    }
}
