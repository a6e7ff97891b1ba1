//! Build script for the F103 clock tree firmware
//!
//! Handles:
//! - Linker arguments for the firmware binary (memory.x comes from
//!   embassy-stm32's `memory-x` feature)

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Linker scripts are only needed for the firmware binary
    if std::env::var_os("CARGO_FEATURE_EMBEDDED").is_some() {
        println!("cargo:rustc-link-arg-bins=--nmagic");
        println!("cargo:rustc-link-arg-bins=-Tlink.x");
        println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
    }
}
