//! Morse Table
//!
//! Static character to dot/dash mapping (ITU). Letters are matched
//! case-insensitively; a space maps to an empty pattern.

use crate::error::BeaconError;

/// One timed Morse symbol
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MorseSymbol {
    /// Dot (1 unit, mark)
    Dot,
    /// Dash (3 units, mark)
    Dash,
    /// Gap between elements of one character (1 unit)
    IntraCharacterGap,
    /// Gap between characters of one word (3 units)
    InterCharacterGap,
    /// Gap between words (7 units)
    WordGap,
}

impl MorseSymbol {
    /// Duration in dit units
    #[must_use]
    pub const fn units(self) -> u32 {
        match self {
            Self::Dot | Self::IntraCharacterGap => 1,
            Self::Dash | Self::InterCharacterGap => 3,
            Self::WordGap => 7,
        }
    }

    /// Check if this symbol is a mark (dot or dash)
    #[must_use]
    pub const fn is_mark(self) -> bool {
        matches!(self, Self::Dot | Self::Dash)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for MorseSymbol {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Dot => defmt::write!(f, "."),
            Self::Dash => defmt::write!(f, "-"),
            Self::IntraCharacterGap => defmt::write!(f, "_"),
            Self::InterCharacterGap => defmt::write!(f, "___"),
            Self::WordGap => defmt::write!(f, "/"),
        }
    }
}

/// Dot/dash pattern of one character, iterated in sending order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pattern {
    remaining: &'static [u8],
}

impl Pattern {
    /// Number of dots and dashes left
    #[must_use]
    pub const fn len(&self) -> usize {
        self.remaining.len()
    }

    /// Check if the pattern is exhausted
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.remaining.is_empty()
    }
}

impl Iterator for Pattern {
    type Item = MorseSymbol;

    fn next(&mut self) -> Option<MorseSymbol> {
        let (&first, rest) = self.remaining.split_first()?;
        self.remaining = rest;
        Some(if first == b'-' {
            MorseSymbol::Dash
        } else {
            MorseSymbol::Dot
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining.len(), Some(self.remaining.len()))
    }
}

impl ExactSizeIterator for Pattern {}

/// Look up the Morse pattern for a character
///
/// # Errors
///
/// `UnsupportedCharacter` if the character has no mapping.
pub fn lookup(c: char) -> Result<Pattern, BeaconError> {
    char_to_morse(c)
        .map(|code| Pattern {
            remaining: code.as_bytes(),
        })
        .ok_or(BeaconError::UnsupportedCharacter(c))
}

/// Convert character to Morse pattern
const fn char_to_morse(c: char) -> Option<&'static str> {
    match c.to_ascii_uppercase() {
        'A' => Some(".-"),
        'B' => Some("-..."),
        'C' => Some("-.-."),
        'D' => Some("-.."),
        'E' => Some("."),
        'F' => Some("..-."),
        'G' => Some("--."),
        'H' => Some("...."),
        'I' => Some(".."),
        'J' => Some(".---"),
        'K' => Some("-.-"),
        'L' => Some(".-.."),
        'M' => Some("--"),
        'N' => Some("-."),
        'O' => Some("---"),
        'P' => Some(".--."),
        'Q' => Some("--.-"),
        'R' => Some(".-."),
        'S' => Some("..."),
        'T' => Some("-"),
        'U' => Some("..-"),
        'V' => Some("...-"),
        'W' => Some(".--"),
        'X' => Some("-..-"),
        'Y' => Some("-.--"),
        'Z' => Some("--.."),
        '0' => Some("-----"),
        '1' => Some(".----"),
        '2' => Some("..---"),
        '3' => Some("...--"),
        '4' => Some("....-"),
        '5' => Some("....."),
        '6' => Some("-...."),
        '7' => Some("--..."),
        '8' => Some("---.."),
        '9' => Some("----."),
        '.' => Some(".-.-.-"),
        ',' => Some("--..--"),
        '?' => Some("..--.."),
        '/' => Some("-..-."),
        '=' => Some("-...-"),
        '-' => Some("-....-"),
        '+' => Some(".-.-."),
        ':' => Some("---..."),
        '\'' => Some(".----."),
        '(' => Some("-.--."),
        ')' => Some("-.--.-"),
        ' ' => Some(""),
        _ => None,
    }
}
