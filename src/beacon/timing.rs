//! Beacon Timing Engine
//!
//! Maps Morse symbols to carrier commands with durations.
//!
//! # Keying
//!
//! - On/off keying: dots and dashes put the carrier on the transmit offset.
//!   Gaps either drop the carrier or move it to a gap offset, depending on
//!   [`GapKeying`].
//! - Frequency-shift keying: the carrier never drops. Dots and every gap sit
//!   on the low tone (the transmit offset); dashes sit `fsk_shift_hz` higher.
//!
//! Leading and trailing word gaps from the encoder are kept, so spaces around
//! a QRSS callsign separate repeats on the waterfall.

use heapless::Vec;

use crate::error::BeaconError;
use crate::morse::{MessageEncoder, MorseSymbol, MorseSymbols};
use crate::types::{DitDuration, Frequency, KeyingMode};

/// Carrier behaviour during gaps in on/off keying
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum GapKeying {
    /// Carrier off between marks
    #[default]
    CarrierOff,
    /// Carrier moved to an offset between marks, for hardware that cannot key
    Shift {
        /// Gap offset from the base frequency
        offset_hz: i32,
    },
}

/// Carrier state for one key event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Carrier {
    /// No output
    Off,
    /// Output at an offset from the base frequency
    On {
        /// Offset from the base frequency in Hz
        offset_hz: i32,
    },
}

#[cfg(feature = "embedded")]
impl defmt::Format for Carrier {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Off => defmt::write!(f, "off"),
            Self::On { offset_hz } => defmt::write!(f, "{=i32} Hz", offset_hz),
        }
    }
}

/// One carrier command held for a duration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    carrier: Carrier,
    duration_ms: u32,
}

impl KeyEvent {
    /// Carrier state
    #[must_use]
    pub const fn carrier(&self) -> Carrier {
        self.carrier
    }

    /// Offset from the base, None when the carrier is off
    #[must_use]
    pub const fn offset_hz(&self) -> Option<i32> {
        match self.carrier {
            Carrier::Off => None,
            Carrier::On { offset_hz } => Some(offset_hz),
        }
    }

    /// Check if the carrier is off
    #[must_use]
    pub const fn is_carrier_off(&self) -> bool {
        matches!(self.carrier, Carrier::Off)
    }

    /// How long the carrier state is held
    #[must_use]
    pub const fn duration_ms(&self) -> u32 {
        self.duration_ms
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for KeyEvent {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{} for {} ms", self.carrier, self.duration_ms);
    }
}

/// Carrier plan of one beacon mode
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Keying {
    /// Keying mode
    pub mode: KeyingMode,
    /// Base frequency offsets are relative to
    pub base: Frequency,
    /// Mark offset (on/off) or low tone offset (FSK)
    pub tx_offset_hz: i32,
    /// High tone shift above the low tone (FSK only)
    pub fsk_shift_hz: i32,
    /// Gap behaviour (on/off only)
    pub gap: GapKeying,
}

impl Keying {
    /// Carrier for a symbol
    #[must_use]
    pub const fn carrier_for(&self, symbol: MorseSymbol) -> Carrier {
        match self.mode {
            KeyingMode::OnOffKeyed => match (symbol.is_mark(), self.gap) {
                (true, _) => Carrier::On {
                    offset_hz: self.tx_offset_hz,
                },
                (false, GapKeying::CarrierOff) => Carrier::Off,
                (false, GapKeying::Shift { offset_hz }) => Carrier::On { offset_hz },
            },
            KeyingMode::FrequencyShiftKeyed => match symbol {
                MorseSymbol::Dash => Carrier::On {
                    offset_hz: self.tx_offset_hz + self.fsk_shift_hz,
                },
                _ => Carrier::On {
                    offset_hz: self.tx_offset_hz,
                },
            },
        }
    }

    /// Every offset this keying can put the carrier on
    #[must_use]
    pub fn carrier_offsets(&self) -> Vec<i32, 2> {
        let mut offsets = Vec::new();
        let second = match self.mode {
            KeyingMode::OnOffKeyed => match self.gap {
                GapKeying::CarrierOff => None,
                GapKeying::Shift { offset_hz } => Some(offset_hz),
            },
            KeyingMode::FrequencyShiftKeyed => Some(self.tx_offset_hz + self.fsk_shift_hz),
        };
        // Capacity 2 always fits both
        let _ = offsets.push(self.tx_offset_hz);
        if let Some(offset) = second {
            let _ = offsets.push(offset);
        }
        offsets
    }

    /// Absolute frequency for an offset, None if it leaves `u32`
    #[must_use]
    pub const fn frequency_at(&self, offset_hz: i32) -> Option<Frequency> {
        self.base.offset_by(offset_hz)
    }
}

/// Converts encoded messages into key events for one keying plan
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BeaconTimingEngine {
    keying: Keying,
}

impl BeaconTimingEngine {
    /// Create an engine for a keying plan
    #[must_use]
    pub const fn new(keying: Keying) -> Self {
        Self { keying }
    }

    /// Keying plan in use
    #[must_use]
    pub const fn keying(&self) -> Keying {
        self.keying
    }

    /// Key events for a whole message
    ///
    /// The message is checked in full before anything is returned, so a
    /// transmission never starts on a message that cannot finish.
    ///
    /// # Errors
    ///
    /// `EncodingFailed` if the encoder hits an unsupported character under
    /// the abort policy.
    pub fn events<'m>(&self, encoder: &MessageEncoder<'m>) -> Result<KeyEvents<'m>, BeaconError> {
        encoder.validate().map_err(|err| match err {
            BeaconError::UnsupportedCharacter(c) => BeaconError::EncodingFailed(c),
            other => other,
        })?;

        Ok(KeyEvents {
            symbols: encoder.symbols(),
            keying: self.keying,
            dit: encoder.dit(),
        })
    }
}

/// Lazy key event stream for one validated message
#[derive(Clone, Debug)]
pub struct KeyEvents<'m> {
    symbols: MorseSymbols<'m>,
    keying: Keying,
    dit: DitDuration,
}

impl KeyEvents<'_> {
    /// Sum of all remaining event durations
    #[must_use]
    pub fn total_ms(&self) -> u64 {
        self.clone().map(|event| u64::from(event.duration_ms)).sum()
    }
}

impl Iterator for KeyEvents<'_> {
    type Item = KeyEvent;

    fn next(&mut self) -> Option<KeyEvent> {
        // Validated at construction: an error here cannot occur
        let symbol = self.symbols.next()?.ok()?;
        Some(KeyEvent {
            carrier: self.keying.carrier_for(symbol),
            duration_ms: symbol.units() * self.dit.as_ms(),
        })
    }
}

impl core::iter::FusedIterator for KeyEvents<'_> {}
