//! Shared types used across the beacon firmware
//!
//! This module defines domain-specific types that enforce invariants
//! at compile time and provide type safety throughout the codebase.

use core::fmt;

/// Frequency in Hertz
///
/// Any value can be held; whether the synthesizer can produce it is
/// decided by the frequency planner, never by the caller.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Frequency(u32);

impl Frequency {
    /// Create a new Frequency from Hz
    #[must_use]
    pub const fn from_hz(hz: u32) -> Self {
        Self(hz)
    }

    /// Create a new Frequency from kHz, returns None on overflow
    #[must_use]
    pub const fn from_khz(khz: u32) -> Option<Self> {
        match khz.checked_mul(1000) {
            Some(hz) => Some(Self(hz)),
            None => None,
        }
    }

    /// Get the frequency in Hz
    #[must_use]
    pub const fn as_hz(self) -> u32 {
        self.0
    }

    /// Get the frequency in kHz (truncated)
    #[must_use]
    pub const fn as_khz(self) -> u32 {
        self.0 / 1000
    }

    /// Shift by a signed offset, returns None if the result leaves `u32`
    #[must_use]
    pub const fn offset_by(self, offset_hz: i32) -> Option<Self> {
        match self.0.checked_add_signed(offset_hz) {
            Some(hz) => Some(Self(hz)),
            None => None,
        }
    }
}

impl fmt::Debug for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frequency({} Hz)", self.0)
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Hz", self.0)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Frequency {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{} Hz", self.0);
    }
}

/// Crystal correction in hundredths of a Hz
///
/// Added to the nominal crystal frequency before any synthesis math.
/// Calibrated once per board; positive means the crystal runs fast.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct CorrectionFactor(i32);

impl CorrectionFactor {
    /// No correction
    pub const NONE: Self = Self(0);

    /// Create from a correction in centi-Hz
    #[must_use]
    pub const fn from_centihz(centihz: i32) -> Self {
        Self(centihz)
    }

    /// Get the correction in centi-Hz
    #[must_use]
    pub const fn as_centihz(self) -> i32 {
        self.0
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for CorrectionFactor {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{} cHz", self.0);
    }
}

/// Duration of one Morse dit in milliseconds, never zero
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct DitDuration(u32);

impl DitDuration {
    /// Standard timing: 1 WPM = 1200ms per unit
    const MS_PER_UNIT_AT_1WPM: u32 = 1200;

    /// Minimum CW speed
    pub const MIN_WPM: u8 = 5;

    /// Maximum CW speed
    pub const MAX_WPM: u8 = 50;

    /// QRSS3: 3 second dits
    pub const QRSS3: Self = Self(3_000);

    /// QRSS6: 6 second dits
    pub const QRSS6: Self = Self(6_000);

    /// QRSS10: 10 second dits
    pub const QRSS10: Self = Self(10_000);

    /// QRSS30: 30 second dits
    pub const QRSS30: Self = Self(30_000);

    /// Longest dit whose 7-unit word gap still fits in a `u32` of milliseconds
    pub const MAX_MS: u32 = u32::MAX / 7;

    /// Create from milliseconds, returns None for zero or above `MAX_MS`
    #[must_use]
    pub const fn from_ms(ms: u32) -> Option<Self> {
        if ms == 0 || ms > Self::MAX_MS {
            None
        } else {
            Some(Self(ms))
        }
    }

    /// Dit length for a CW speed (PARIS timing), speed clamped to 5-50 WPM
    #[must_use]
    pub const fn from_wpm(wpm: u8) -> Self {
        let wpm = if wpm < Self::MIN_WPM {
            Self::MIN_WPM
        } else if wpm > Self::MAX_WPM {
            Self::MAX_WPM
        } else {
            wpm
        };
        Self(Self::MS_PER_UNIT_AT_1WPM / wpm as u32)
    }

    /// Get the duration in milliseconds
    #[must_use]
    pub const fn as_ms(self) -> u32 {
        self.0
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for DitDuration {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{} ms/dit", self.0);
    }
}

/// How the carrier represents Morse elements
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyingMode {
    /// Classic CW: carrier present = mark, absent = space
    OnOffKeyed,
    /// FSKCW: carrier always present, dits low and dahs high
    FrequencyShiftKeyed,
}

#[cfg(feature = "embedded")]
impl defmt::Format for KeyingMode {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::OnOffKeyed => defmt::write!(f, "CW"),
            Self::FrequencyShiftKeyed => defmt::write!(f, "FSKCW"),
        }
    }
}

/// Amateur band with a QRSS window
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Band {
    /// 40 meters (7 039 800 - 7 040 000 Hz)
    M40,
    /// 30 meters (10 139 900 - 10 140 100 Hz)
    M30,
    /// 20 meters (14 096 800 - 14 097 000 Hz)
    M20,
    /// 10 meters (28 000 700 - 28 000 900 Hz)
    M10,
}

impl Band {
    /// Width of every QRSS window above its base
    pub const QRSS_WINDOW_HZ: u32 = 200;

    /// Lower edge of the band's QRSS window
    #[must_use]
    pub const fn qrss_base(self) -> Frequency {
        Frequency::from_hz(match self {
            Self::M40 => 7_039_800,
            Self::M30 => 10_139_900,
            Self::M20 => 14_096_800,
            Self::M10 => 28_000_700,
        })
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Band {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::M40 => defmt::write!(f, "40m"),
            Self::M30 => defmt::write!(f, "30m"),
            Self::M20 => defmt::write!(f, "20m"),
            Self::M10 => defmt::write!(f, "10m"),
        }
    }
}

/// Synthesizer clock output
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockOutput {
    /// CLK0 output
    Clk0,
    /// CLK1 output
    Clk1,
    /// CLK2 output
    Clk2,
}

impl ClockOutput {
    /// Output index (0-2)
    #[must_use]
    pub const fn index(self) -> u8 {
        match self {
            Self::Clk0 => 0,
            Self::Clk1 => 1,
            Self::Clk2 => 2,
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for ClockOutput {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Clk0 => defmt::write!(f, "CLK0"),
            Self::Clk1 => defmt::write!(f, "CLK1"),
            Self::Clk2 => defmt::write!(f, "CLK2"),
        }
    }
}

/// Output drive strength setting
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DriveStrength {
    /// 2mA drive
    Drive2mA,
    /// 4mA drive
    Drive4mA,
    /// 6mA drive
    Drive6mA,
    /// 8mA drive (maximum)
    #[default]
    Drive8mA,
}

impl DriveStrength {
    /// Get register value
    #[must_use]
    pub const fn as_reg(self) -> u8 {
        match self {
            Self::Drive2mA => 0,
            Self::Drive4mA => 1,
            Self::Drive6mA => 2,
            Self::Drive8mA => 3,
        }
    }
}

/// Crystal load capacitance
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CrystalLoad {
    /// 6 pF load
    Load6pF,
    /// 8 pF load
    Load8pF,
    /// 10 pF load
    #[default]
    Load10pF,
}

impl CrystalLoad {
    /// Get register 183 value (reserved low bits set per datasheet)
    #[must_use]
    pub const fn as_reg(self) -> u8 {
        match self {
            Self::Load6pF => 0b0101_0010,
            Self::Load8pF => 0b1001_0010,
            Self::Load10pF => 0b1101_0010,
        }
    }
}
