//! Frequency Synthesis
//!
//! Converts output frequencies into `Si5351` PLL and multisynth settings.
//! Pure computation, testable on the host.

pub mod planner;

pub use planner::{FrequencyPlanner, MsParams, PlannedFrequency, PllParams};
