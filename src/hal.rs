//! Hardware Abstraction Layer
//!
//! Target-side implementations of the seams the drivers are written
//! against: memory-mapped register access and the SysTick timebase.

pub mod mmio;
pub mod systick;
