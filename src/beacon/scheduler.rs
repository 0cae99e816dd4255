//! Beacon Scheduler
//!
//! Sequences one transmission at a time:
//!
//! ```text
//! Park -> TransmitCw | TransmitQrss -> PostTxDelay -> Park
//! ```
//!
//! A transmission always runs every key event to completion. A message that
//! cannot be encoded never starts keying; the scheduler parks and reports
//! `EncodingFailed`. Nothing is retried.

use embedded_hal_async::delay::DelayNs;

use super::port::SynthesizerPort;
use super::timing::{BeaconTimingEngine, Carrier, KeyEvents, Keying};
use crate::config::BeaconConfig;
use crate::error::{BeaconError, SchedulerError};
use crate::synth::{FrequencyPlanner, PlannedFrequency};
use crate::types::{Frequency, KeyingMode};

/// Scheduler state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BeaconPhase {
    /// Transmit clock off, park clock keeping the synthesizer warm
    #[default]
    Park,
    /// Sending the CW message
    TransmitCw,
    /// Sending the QRSS message
    TransmitQrss,
    /// Idle hold after a transmission
    PostTxDelay,
}

impl BeaconPhase {
    /// Transmit phase for a keying mode
    #[must_use]
    pub const fn transmit(mode: KeyingMode) -> Self {
        match mode {
            KeyingMode::OnOffKeyed => Self::TransmitCw,
            KeyingMode::FrequencyShiftKeyed => Self::TransmitQrss,
        }
    }

    /// Check if the transmitter may be keyed in this phase
    #[must_use]
    pub const fn is_transmitting(self) -> bool {
        matches!(self, Self::TransmitCw | Self::TransmitQrss)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for BeaconPhase {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Park => defmt::write!(f, "PARK"),
            Self::TransmitCw => defmt::write!(f, "TX CW"),
            Self::TransmitQrss => defmt::write!(f, "TX QRSS"),
            Self::PostTxDelay => defmt::write!(f, "DELAY"),
        }
    }
}

/// Beacon state machine
///
/// Owns the synthesizer port and the delay provider for its lifetime; pass
/// `&mut port` to keep ownership outside.
pub struct BeaconScheduler<'c, P, D> {
    config: &'c BeaconConfig,
    planner: FrequencyPlanner,
    park_plan: PlannedFrequency,
    port: P,
    delay: D,
    phase: BeaconPhase,
    /// Frequency the transmit clock was last programmed to
    tx_frequency: Option<Frequency>,
    tx_enabled: bool,
}

impl<'c, P: SynthesizerPort, D: DelayNs> BeaconScheduler<'c, P, D> {
    /// Create a scheduler in the `Park` phase
    ///
    /// Plans every frequency the configuration can put on air. No command is
    /// sent to the port.
    ///
    /// # Errors
    ///
    /// `FrequencyOutOfRange` if the park frequency or any carrier frequency of
    /// either mode is outside the synthesizer range.
    pub fn new(config: &'c BeaconConfig, port: P, delay: D) -> Result<Self, BeaconError> {
        let planner = FrequencyPlanner::new(config.correction);
        let park_plan = planner.plan(config.park_frequency)?;

        for mode in [KeyingMode::OnOffKeyed, KeyingMode::FrequencyShiftKeyed] {
            let keying = config.keying(mode);
            for offset in keying.carrier_offsets() {
                let frequency = keying
                    .frequency_at(offset)
                    .ok_or(BeaconError::FrequencyOutOfRange(keying.base.as_hz()))?;
                planner.plan(frequency)?;
            }
        }

        Ok(Self {
            config,
            planner,
            park_plan,
            port,
            delay,
            phase: BeaconPhase::Park,
            tx_frequency: None,
            tx_enabled: false,
        })
    }

    /// Current phase
    #[must_use]
    pub const fn phase(&self) -> BeaconPhase {
        self.phase
    }

    /// Configuration in use
    #[must_use]
    pub const fn config(&self) -> &'c BeaconConfig {
        self.config
    }

    /// Synthesizer port
    #[must_use]
    pub const fn port(&self) -> &P {
        &self.port
    }

    /// Give back the port and delay provider
    pub fn release(self) -> (P, D) {
        (self.port, self.delay)
    }

    /// Put the hardware in the park state
    ///
    /// Transmit clock off, park clock on at the park frequency.
    ///
    /// # Errors
    ///
    /// `Port` if the synthesizer rejects a command.
    pub async fn park(&mut self) -> Result<(), SchedulerError<P::Error>> {
        self.park_outputs().await?;
        self.enter(BeaconPhase::Park);
        Ok(())
    }

    /// Send one complete message in a keying mode, hold, then park
    ///
    /// # Errors
    ///
    /// - `Beacon(EncodingFailed)` if the message has an unsupported
    ///   character; nothing is keyed and the scheduler is parked.
    /// - `Port` if the synthesizer rejects a command; the transmission stops,
    ///   one attempt is made to park and the phase returns to `Park` whatever
    ///   its outcome.
    pub async fn run(&mut self, mode: KeyingMode) -> Result<(), SchedulerError<P::Error>> {
        let keying = self.config.keying(mode);
        let encoder = self.config.encoder(mode);

        let events = match BeaconTimingEngine::new(keying).events(&encoder) {
            Ok(events) => events,
            Err(err) => {
                #[cfg(feature = "embedded")]
                defmt::warn!("{} message not sent: {}", mode, err);
                self.abort_to_park().await?;
                return Err(err.into());
            }
        };

        #[cfg(feature = "embedded")]
        defmt::info!(
            "{} on {}: {} units, {} ms",
            mode,
            keying.base,
            encoder.total_units(),
            events.total_ms()
        );

        let result = self.transmit(mode, keying, events).await;
        if result.is_err() {
            #[cfg(feature = "embedded")]
            defmt::error!("transmission aborted, parking");
            if self.abort_to_park().await.is_err() {
                #[cfg(feature = "embedded")]
                defmt::warn!("park after aborted transmission failed");
            }
        }
        result
    }

    /// Run every mode of the configured cycle once
    ///
    /// A message that fails to encode is skipped.
    ///
    /// # Errors
    ///
    /// `Port` from the first transmission the synthesizer fails on.
    pub async fn run_cycle(&mut self) -> Result<(), SchedulerError<P::Error>> {
        for &mode in self.config.cycle {
            match self.run(mode).await {
                Ok(()) | Err(SchedulerError::Beacon(BeaconError::EncodingFailed(_))) => {}
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    async fn transmit(
        &mut self,
        mode: KeyingMode,
        keying: Keying,
        events: KeyEvents<'_>,
    ) -> Result<(), SchedulerError<P::Error>> {
        self.enter(BeaconPhase::transmit(mode));
        self.port
            .disable_clock(self.config.park_clock)
            .await
            .map_err(SchedulerError::Port)?;

        for event in events {
            match event.carrier() {
                Carrier::Off => self.key_up().await?,
                Carrier::On { offset_hz } => {
                    let frequency = keying
                        .frequency_at(offset_hz)
                        .ok_or(BeaconError::FrequencyOutOfRange(keying.base.as_hz()))?;
                    self.key_down(frequency).await?;
                }
            }
            self.delay.delay_ms(event.duration_ms()).await;
        }

        self.park_outputs().await?;
        self.enter(BeaconPhase::PostTxDelay);
        self.delay.delay_ms(self.config.post_tx_delay_ms).await;
        self.enter(BeaconPhase::Park);
        Ok(())
    }

    /// Carrier on at a frequency, retuning only when it changed
    async fn key_down(&mut self, frequency: Frequency) -> Result<(), SchedulerError<P::Error>> {
        if self.tx_frequency != Some(frequency) {
            let plan = self.planner.plan(frequency)?;
            self.port
                .set_clock_frequency(self.config.tx_clock, &plan)
                .await
                .map_err(SchedulerError::Port)?;
            self.tx_frequency = Some(frequency);
        }
        if !self.tx_enabled {
            self.port
                .enable_clock(self.config.tx_clock)
                .await
                .map_err(SchedulerError::Port)?;
            self.tx_enabled = true;
        }
        Ok(())
    }

    async fn key_up(&mut self) -> Result<(), SchedulerError<P::Error>> {
        if self.tx_enabled {
            self.port
                .disable_clock(self.config.tx_clock)
                .await
                .map_err(SchedulerError::Port)?;
            self.tx_enabled = false;
        }
        Ok(())
    }

    async fn park_outputs(&mut self) -> Result<(), SchedulerError<P::Error>> {
        let tx = self.config.tx_clock;
        let park = self.config.park_clock;

        self.tx_enabled = false;
        // The park clock may share a PLL with the transmit clock
        self.tx_frequency = None;

        self.port.disable_clock(tx).await.map_err(SchedulerError::Port)?;
        self.port
            .set_clock_frequency(park, &self.park_plan)
            .await
            .map_err(SchedulerError::Port)?;
        self.port.enable_clock(park).await.map_err(SchedulerError::Port)?;
        Ok(())
    }

    /// Best-effort park that leaves the phase at `Park` even when the port fails
    async fn abort_to_park(&mut self) -> Result<(), SchedulerError<P::Error>> {
        let result = self.park_outputs().await;
        self.enter(BeaconPhase::Park);
        result
    }

    fn enter(&mut self, phase: BeaconPhase) {
        #[cfg(feature = "embedded")]
        defmt::debug!("{} -> {}", self.phase, phase);
        self.phase = phase;
    }
}
