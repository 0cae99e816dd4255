//! Beacon Control Logic
//!
//! Keying, timing and the park / transmit / delay state machine.
//! Implements the functional core of the beacon; hardware is reached only
//! through [`port::SynthesizerPort`].

pub mod port;
pub mod scheduler;
pub mod timing;

pub use port::SynthesizerPort;
pub use scheduler::{BeaconPhase, BeaconScheduler};
pub use timing::{BeaconTimingEngine, Carrier, GapKeying, KeyEvent, KeyEvents, Keying};
