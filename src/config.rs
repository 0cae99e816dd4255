//! System configuration and hardware constants
//!
//! Hardware constants are compile-time values. Beacon behaviour lives in
//! [`BeaconConfig`], an immutable value built once at startup and handed to
//! the scheduler by reference.

use crate::beacon::timing::{GapKeying, Keying};
use crate::morse::{MessageEncoder, UnsupportedCharPolicy};
use crate::types::{
    Band, ClockOutput, CorrectionFactor, CrystalLoad, DitDuration, DriveStrength, Frequency,
    KeyingMode,
};

/// Firmware version reported at startup
pub const FIRMWARE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Board name reported at startup
pub const BOARD_NAME: &str = "STM32G474 Nucleo";

/// I2C bus frequency for `Si5351A`
pub const I2C_FREQUENCY_HZ: u32 = 400_000;

/// `Si5351A` I2C address
pub const SI5351_I2C_ADDR: u8 = 0x60;

/// `Si5351A` crystal frequency (25 MHz standard)
pub const SI5351_XTAL_FREQ: u32 = 25_000_000;

/// Pin assignments for GPIO
pub mod pins {
    //! GPIO pin assignments matching the schematic

    /// I2C1 SCL (Si5351)
    pub const I2C1_SCL: &str = "PB8";

    /// I2C1 SDA (Si5351)
    pub const I2C1_SDA: &str = "PB9";
}

/// Fixed-frequency CW beacon for skimmer networks
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CwBeacon {
    /// Transmit frequency
    pub frequency: Frequency,
    /// Speed in words per minute
    pub wpm: u8,
    /// Message text
    pub message: &'static str,
    /// Carrier behaviour between marks
    pub gap: GapKeying,
}

/// Slow FSKCW beacon for waterfall reception
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QrssBeacon {
    /// Lower edge of the QRSS window
    pub base: Frequency,
    /// Dit (low tone) offset above the base
    pub offset_hz: i32,
    /// Dah (high tone) shift above the dit tone
    pub fsk_shift_hz: i32,
    /// Dit duration
    pub dit: DitDuration,
    /// Message text
    pub message: &'static str,
}

/// Complete beacon configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BeaconConfig {
    /// CW beacon settings
    pub cw: CwBeacon,
    /// QRSS beacon settings
    pub qrss: QrssBeacon,
    /// Clock output keyed for transmission
    pub tx_clock: ClockOutput,
    /// Clock output that keeps the synthesizer warm between transmissions
    pub park_clock: ClockOutput,
    /// Frequency of the park clock
    pub park_frequency: Frequency,
    /// Idle time after each transmission (ms)
    pub post_tx_delay_ms: u32,
    /// Crystal calibration
    pub correction: CorrectionFactor,
    /// Synthesizer I2C address
    pub synth_address: u8,
    /// Crystal load capacitance
    pub crystal_load: CrystalLoad,
    /// Output drive strength
    pub drive: DriveStrength,
    /// Handling of characters with no Morse mapping
    pub unsupported_chars: UnsupportedCharPolicy,
    /// Transmission order repeated by the beacon loop
    pub cycle: &'static [KeyingMode],
}

impl BeaconConfig {
    /// VE3WMB reference beacon: 20m CW for RBN, 30m QRSS6 FSKCW
    pub const DEFAULT: Self = Self {
        cw: CwBeacon {
            frequency: Frequency::from_hz(14_063_000),
            wpm: 12,
            message: "TEST TEST DE VE3WMB/B VE3WMB/B",
            gap: GapKeying::CarrierOff,
        },
        qrss: QrssBeacon {
            base: Band::M30.qrss_base(),
            offset_hz: 10,
            fsk_shift_hz: 4,
            dit: DitDuration::QRSS6,
            message: "  VE3WMB ",
        },
        tx_clock: ClockOutput::Clk0,
        park_clock: ClockOutput::Clk1,
        park_frequency: Frequency::from_hz(108_000_000),
        post_tx_delay_ms: 300_000,
        correction: CorrectionFactor::from_centihz(11_219),
        synth_address: SI5351_I2C_ADDR,
        crystal_load: CrystalLoad::Load10pF,
        drive: DriveStrength::Drive8mA,
        unsupported_chars: UnsupportedCharPolicy::Abort,
        cycle: &[KeyingMode::OnOffKeyed, KeyingMode::FrequencyShiftKeyed],
    };

    /// CW dit duration implied by the configured speed
    #[must_use]
    pub const fn cw_dit(&self) -> DitDuration {
        DitDuration::from_wpm(self.cw.wpm)
    }

    /// Carrier plan for a keying mode
    #[must_use]
    pub const fn keying(&self, mode: KeyingMode) -> Keying {
        match mode {
            KeyingMode::OnOffKeyed => Keying {
                mode,
                base: self.cw.frequency,
                tx_offset_hz: 0,
                fsk_shift_hz: 0,
                gap: self.cw.gap,
            },
            KeyingMode::FrequencyShiftKeyed => Keying {
                mode,
                base: self.qrss.base,
                tx_offset_hz: self.qrss.offset_hz,
                fsk_shift_hz: self.qrss.fsk_shift_hz,
                gap: GapKeying::CarrierOff,
            },
        }
    }

    /// Dit duration of a keying mode
    #[must_use]
    pub const fn dit(&self, mode: KeyingMode) -> DitDuration {
        match mode {
            KeyingMode::OnOffKeyed => self.cw_dit(),
            KeyingMode::FrequencyShiftKeyed => self.qrss.dit,
        }
    }

    /// Message sent in a keying mode
    #[must_use]
    pub const fn message(&self, mode: KeyingMode) -> &'static str {
        match mode {
            KeyingMode::OnOffKeyed => self.cw.message,
            KeyingMode::FrequencyShiftKeyed => self.qrss.message,
        }
    }

    /// Encoder for a keying mode's message at that mode's speed
    #[must_use]
    pub const fn encoder(&self, mode: KeyingMode) -> MessageEncoder<'static> {
        MessageEncoder::new(self.message(mode), self.dit(mode), self.unsupported_chars)
    }
}

impl Default for BeaconConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
