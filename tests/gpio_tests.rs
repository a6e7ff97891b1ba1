//! GPIO Configuration Tests
//!
//! Tests for MODE/CNF nibble programming and port clock enables.
//! Run with: cargo test --target x86_64-unknown-linux-gnu --no-default-features --features std --test gpio_tests

use f103_clocktree::gpio::{configure_pin, GpioError, PinConfig, PinMode};
use f103_clocktree::registers::bits::rcc_apb2enr;
use f103_clocktree::registers::{Port, Register, SimulatedRegisters};

// =============================================================================
// Encoding Tests
// =============================================================================

#[test]
fn test_mode_bits() {
    assert_eq!(PinMode::Input.bits(), 0b00);
    assert_eq!(PinMode::Output10MHz.bits(), 0b01);
    assert_eq!(PinMode::Output2MHz.bits(), 0b10);
    assert_eq!(PinMode::Output50MHz.bits(), 0b11);
}

#[test]
fn test_config_bits() {
    assert_eq!(PinConfig::Analog.bits(), 0b00);
    assert_eq!(PinConfig::Floating.bits(), 0b01);
    assert_eq!(PinConfig::PullUpDown.bits(), 0b10);
    assert_eq!(PinConfig::PushPull.bits(), 0b00);
    assert_eq!(PinConfig::OpenDrain.bits(), 0b01);
    assert_eq!(PinConfig::AltPushPull.bits(), 0b10);
    assert_eq!(PinConfig::AltOpenDrain.bits(), 0b11);
}

#[test]
fn test_port_clock_enable_bits() {
    assert_eq!(Port::A.clock_enable_bit(), rcc_apb2enr::IOPAEN);
    assert_eq!(Port::A.clock_enable_bit(), 1 << 2);
    assert_eq!(Port::C.clock_enable_bit(), 1 << 4);
    assert_eq!(Port::E.clock_enable_bit(), 1 << 6);
}

// =============================================================================
// configure_pin Tests
// =============================================================================

#[test]
fn test_low_pin_uses_crl() {
    let mut regs = SimulatedRegisters::new();
    configure_pin(&mut regs, Port::B, 3, PinMode::Output2MHz, PinConfig::PushPull).unwrap();

    // Nibble 3: CNF 00, MODE 10
    assert_eq!(regs.peek(Register::GpioCrl(Port::B)), 0x4444_2444);
    assert_eq!(regs.peek(Register::GpioCrh(Port::B)), 0x4444_4444);
    assert_eq!(regs.peek(Register::RccApb2enr), Port::B.clock_enable_bit());
}

#[test]
fn test_high_pin_uses_crh() {
    let mut regs = SimulatedRegisters::new();
    configure_pin(&mut regs, Port::C, 13, PinMode::Output50MHz, PinConfig::OpenDrain).unwrap();

    // Nibble 5: CNF 01, MODE 11
    assert_eq!(regs.peek(Register::GpioCrh(Port::C)), 0x4474_4444);
    assert_eq!(regs.peek(Register::GpioCrl(Port::C)), 0x4444_4444);
}

#[test]
fn test_input_modes() {
    let mut regs = SimulatedRegisters::new();
    configure_pin(&mut regs, Port::A, 0, PinMode::Input, PinConfig::Analog).unwrap();
    configure_pin(&mut regs, Port::A, 1, PinMode::Input, PinConfig::PullUpDown).unwrap();

    assert_eq!(regs.peek(Register::GpioCrl(Port::A)), 0x4444_4480);
}

#[test]
fn test_reconfigure_replaces_nibble() {
    let mut regs = SimulatedRegisters::new();
    configure_pin(&mut regs, Port::A, 15, PinMode::Output10MHz, PinConfig::AltOpenDrain).unwrap();
    assert_eq!(regs.peek(Register::GpioCrh(Port::A)) >> 28, 0b1101);

    configure_pin(&mut regs, Port::A, 15, PinMode::Input, PinConfig::Floating).unwrap();
    assert_eq!(regs.peek(Register::GpioCrh(Port::A)), 0x4444_4444);
}

#[test]
fn test_clock_enables_accumulate() {
    let mut regs = SimulatedRegisters::new();
    configure_pin(&mut regs, Port::A, 8, PinMode::Output50MHz, PinConfig::AltPushPull).unwrap();
    configure_pin(&mut regs, Port::C, 13, PinMode::Output2MHz, PinConfig::PushPull).unwrap();

    assert_eq!(
        regs.peek(Register::RccApb2enr),
        Port::A.clock_enable_bit() | Port::C.clock_enable_bit()
    );
}

// =============================================================================
// Error Tests
// =============================================================================

#[test]
fn test_invalid_pin_rejected() {
    let mut regs = SimulatedRegisters::new();
    assert_eq!(
        configure_pin(&mut regs, Port::A, 16, PinMode::Input, PinConfig::Floating),
        Err(GpioError::InvalidPin(16))
    );
    assert!(regs.writes().is_empty());
    assert_eq!(regs.read_count(), 0);
}

#[test]
fn test_mode_mismatch_rejected() {
    let mut regs = SimulatedRegisters::new();
    assert_eq!(
        configure_pin(&mut regs, Port::A, 2, PinMode::Input, PinConfig::PushPull),
        Err(GpioError::ModeMismatch(PinMode::Input, PinConfig::PushPull))
    );
    assert_eq!(
        configure_pin(&mut regs, Port::A, 2, PinMode::Output2MHz, PinConfig::Floating),
        Err(GpioError::ModeMismatch(PinMode::Output2MHz, PinConfig::Floating))
    );
    assert!(regs.writes().is_empty());
}

#[test]
fn test_error_display() {
    assert_eq!(GpioError::InvalidPin(20).to_string(), "pin 20 does not exist");
}
