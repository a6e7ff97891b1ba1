//! Peripheral Drivers
//!
//! Drivers for external ICs, generic over the `embedded-hal` traits so they
//! run against the embassy HAL on target and against mocks on the host.

pub mod ltc1451;
