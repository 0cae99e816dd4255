//! Beacon error kinds
//!
//! `UnsupportedCharacter` is local to the encoder, `EncodingFailed` costs one
//! transmission cycle, and `FrequencyOutOfRange` means the configuration is
//! unusable.

use core::fmt;

/// Errors raised by the beacon core
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BeaconError {
    /// Message contains a character with no Morse mapping
    UnsupportedCharacter(char),
    /// Whole-message transmission aborted before keying
    EncodingFailed(char),
    /// Requested frequency outside the synthesizer's range (Hz)
    FrequencyOutOfRange(u32),
}

impl fmt::Display for BeaconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedCharacter(c) => write!(f, "no Morse mapping for {c:?}"),
            Self::EncodingFailed(c) => write!(f, "message encoding failed at {c:?}"),
            Self::FrequencyOutOfRange(hz) => write!(f, "{hz} Hz is outside the synthesizer range"),
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for BeaconError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::UnsupportedCharacter(c) => defmt::write!(f, "UnsupportedCharacter({})", c),
            Self::EncodingFailed(c) => defmt::write!(f, "EncodingFailed({})", c),
            Self::FrequencyOutOfRange(hz) => defmt::write!(f, "FrequencyOutOfRange({} Hz)", hz),
        }
    }
}

/// Errors from a scheduler run: beacon logic or the synthesizer bus
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerError<E> {
    /// Encoding or planning failure
    Beacon(BeaconError),
    /// Synthesizer port failure
    Port(E),
}

impl<E> From<BeaconError> for SchedulerError<E> {
    fn from(err: BeaconError) -> Self {
        Self::Beacon(err)
    }
}

impl<E: fmt::Debug> fmt::Display for SchedulerError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Beacon(err) => write!(f, "{err}"),
            Self::Port(err) => write!(f, "synthesizer port error: {err:?}"),
        }
    }
}

#[cfg(feature = "embedded")]
impl<E: defmt::Format> defmt::Format for SchedulerError<E> {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Beacon(err) => defmt::write!(f, "{}", err),
            Self::Port(err) => defmt::write!(f, "Port({})", err),
        }
    }
}
