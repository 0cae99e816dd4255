//! QRSS / CW Beacon Firmware Library
//!
//! Core of an unattended amateur radio beacon built around an `Si5351A`
//! clock synthesizer. The beacon alternates between a fixed-frequency CW
//! transmission for skimmer networks and a very slow two-tone FSKCW (QRSS)
//! transmission for waterfall grabbers, parking the synthesizer on a
//! keep-warm clock in between.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       BEACON LAYER                           │
//! │  Scheduler (park / transmit / delay)  │  Timing engine       │
//! ├─────────────────────────────────────────────────────────────┤
//! │                    ENCODING / PLANNING                       │
//! │  Morse table  │  Message encoder  │  Frequency planner       │
//! ├─────────────────────────────────────────────────────────────┤
//! │                   HAL / DRIVER LAYER                         │
//! │  I2C bus  │  Si5351A (SynthesizerPort)                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │                    RTOS / SCHEDULER                          │
//! │           embassy-rs (async/await executor)                  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Data flows from the message encoder through the timing engine and the
//! frequency planner to the synthesizer port. Only the scheduler talks to
//! the port.
//!
//! # Design Principles
//!
//! - **Immutable configuration**: one `BeaconConfig` value, passed by reference
//! - **Type-driven design**: custom types enforce invariants at compile time
//! - **No unsafe in application code**
//! - **Functional core, imperative shell**: encoding and planning are pure;
//!   hardware sits behind traits and is faked on the host
//! - **Explicit error handling**: all fallible operations return `Result`

#![cfg_attr(feature = "embedded", no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Re-export dependencies needed by applications (only in embedded mode)
#[cfg(feature = "embedded")]
pub use embassy_executor;
#[cfg(feature = "embedded")]
pub use embassy_stm32;
#[cfg(feature = "embedded")]
pub use embassy_time;

/// Hardware Abstraction Layer
///
/// Register access over any async I2C bus.
pub mod hal;

/// Peripheral Drivers
///
/// `Si5351A` clock synthesizer.
pub mod drivers;

/// Morse Code
///
/// Character table and message encoder.
pub mod morse;

/// Frequency Synthesis
///
/// Conversion of a target frequency into synthesizer parameters.
pub mod synth;

/// Beacon Control Logic
///
/// Keying, timing and the transmission state machine.
pub mod beacon;

/// Error types
pub mod error;

/// Shared types used across modules
pub mod types;

/// System configuration and constants
pub mod config;

/// Prelude module for common imports
pub mod prelude {
    //! Convenient re-exports for common types and traits.

    pub use crate::beacon::{BeaconPhase, BeaconScheduler, SynthesizerPort};
    pub use crate::config::*;
    pub use crate::error::{BeaconError, SchedulerError};
    pub use crate::types::*;

    // Common traits
    pub use embedded_hal_async::delay::DelayNs;
    pub use embedded_hal_async::i2c::I2c;

    // Embassy
    #[cfg(feature = "embedded")]
    pub use embassy_time::{Delay, Duration, Instant, Timer};

    // Error handling
    pub use core::result::Result;

    // Logging
    #[cfg(feature = "embedded")]
    pub use defmt::{debug, error, info, trace, warn};
}
