//! Synthesizer Port
//!
//! The only way the beacon core reaches the clock chip. Frequencies always
//! arrive already planned; the port never sees a bare Hz value.

use crate::synth::PlannedFrequency;
use crate::types::ClockOutput;

/// Clock synthesizer commands used by the scheduler
///
/// Each command completes before the next one is issued.
#[allow(async_fn_in_trait)]
pub trait SynthesizerPort {
    /// Bus or device error
    type Error;

    /// Program a clock output to a planned frequency
    async fn set_clock_frequency(
        &mut self,
        clock: ClockOutput,
        plan: &PlannedFrequency,
    ) -> Result<(), Self::Error>;

    /// Turn a clock output on
    async fn enable_clock(&mut self, clock: ClockOutput) -> Result<(), Self::Error>;

    /// Turn a clock output off
    async fn disable_clock(&mut self, clock: ClockOutput) -> Result<(), Self::Error>;
}

impl<T: SynthesizerPort + ?Sized> SynthesizerPort for &mut T {
    type Error = T::Error;

    async fn set_clock_frequency(
        &mut self,
        clock: ClockOutput,
        plan: &PlannedFrequency,
    ) -> Result<(), Self::Error> {
        T::set_clock_frequency(self, clock, plan).await
    }

    async fn enable_clock(&mut self, clock: ClockOutput) -> Result<(), Self::Error> {
        T::enable_clock(self, clock).await
    }

    async fn disable_clock(&mut self, clock: ClockOutput) -> Result<(), Self::Error> {
        T::disable_clock(self, clock).await
    }
}
