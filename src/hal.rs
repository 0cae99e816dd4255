//! Hardware Abstraction Layer
//!
//! Thin wrappers over the `embedded-hal-async` traits. Peripheral setup for
//! the STM32G474 lives in the binary; everything here is generic so the
//! drivers above it run against fakes on the host.

pub mod i2c;
