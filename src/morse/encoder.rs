//! Message Encoder
//!
//! Turns a message into the flat symbol stream that is sent on air,
//! using standard 1:3:7 timing:
//!
//! - `IntraCharacterGap` between the dots and dashes of one character
//! - `InterCharacterGap` between two characters of the same word
//! - one `WordGap` per space in the message, in place of the inter-character gap
//!
//! Leading and trailing spaces become leading and trailing word gaps. The
//! last character of a message is not followed by a gap.

use super::table::{self, MorseSymbol, Pattern};
use crate::error::BeaconError;
use crate::types::DitDuration;

/// What to do with characters that have no Morse mapping
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum UnsupportedCharPolicy {
    /// Drop the character and keep encoding
    Skip,
    /// Stop the stream with an error
    #[default]
    Abort,
}

/// Encoder for one message at one speed
///
/// Holds no iteration state: every call to [`symbols`](Self::symbols)
/// starts again from the first character.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MessageEncoder<'m> {
    message: &'m str,
    dit: DitDuration,
    policy: UnsupportedCharPolicy,
}

impl<'m> MessageEncoder<'m> {
    /// Create an encoder
    #[must_use]
    pub const fn new(message: &'m str, dit: DitDuration, policy: UnsupportedCharPolicy) -> Self {
        Self {
            message,
            dit,
            policy,
        }
    }

    /// Message being encoded
    #[must_use]
    pub const fn message(&self) -> &'m str {
        self.message
    }

    /// Dit duration symbols are scaled by
    #[must_use]
    pub const fn dit(&self) -> DitDuration {
        self.dit
    }

    /// Unsupported character policy
    #[must_use]
    pub const fn policy(&self) -> UnsupportedCharPolicy {
        self.policy
    }

    /// Fresh symbol stream from the start of the message
    #[must_use]
    pub fn symbols(&self) -> MorseSymbols<'m> {
        MorseSymbols {
            chars: self.message.chars(),
            policy: self.policy,
            pattern: None,
            gap_due: false,
            lookahead: None,
            failed: false,
        }
    }

    /// Check the whole message encodes under the current policy
    ///
    /// # Errors
    ///
    /// `UnsupportedCharacter` for the first unmapped character when the
    /// policy is `Abort`.
    pub fn validate(&self) -> Result<(), BeaconError> {
        self.symbols().try_for_each(|symbol| symbol.map(|_| ()))
    }

    /// Total length of the message in dit units, unsupported characters excluded
    #[must_use]
    pub fn total_units(&self) -> u32 {
        self.symbols().map_while(Result::ok).map(MorseSymbol::units).sum()
    }

    /// Total length of the message in milliseconds
    #[must_use]
    pub fn total_ms(&self) -> u64 {
        u64::from(self.total_units()) * u64::from(self.dit.as_ms())
    }
}

/// Next unit of the message after skipping per policy
#[derive(Clone, Copy, Debug)]
enum Token {
    Character(Pattern),
    Space,
    Unsupported(char),
}

/// Lazy symbol stream for one message
///
/// Yields `Err(UnsupportedCharacter)` once and then ends when the policy is
/// `Abort` and an unmapped character is reached.
#[derive(Clone, Debug)]
pub struct MorseSymbols<'m> {
    chars: core::str::Chars<'m>,
    policy: UnsupportedCharPolicy,
    /// Elements left in the character being sent
    pattern: Option<Pattern>,
    /// An intra-character gap precedes the next element
    gap_due: bool,
    /// Token read ahead to decide the gap after a character
    lookahead: Option<Token>,
    failed: bool,
}

impl MorseSymbols<'_> {
    fn next_token(&mut self) -> Option<Token> {
        if let Some(token) = self.lookahead.take() {
            return Some(token);
        }

        loop {
            let c = self.chars.next()?;
            if c == ' ' {
                return Some(Token::Space);
            }
            match table::lookup(c) {
                Ok(pattern) => return Some(Token::Character(pattern)),
                Err(_) if self.policy == UnsupportedCharPolicy::Skip => {}
                Err(_) => return Some(Token::Unsupported(c)),
            }
        }
    }
}

impl Iterator for MorseSymbols<'_> {
    type Item = Result<MorseSymbol, BeaconError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            if let Some(pattern) = self.pattern.as_mut() {
                if !pattern.is_empty() {
                    if self.gap_due {
                        self.gap_due = false;
                        return Some(Ok(MorseSymbol::IntraCharacterGap));
                    }
                    self.gap_due = true;
                    if let Some(element) = pattern.next() {
                        return Some(Ok(element));
                    }
                }

                // Character complete: the gap depends on what follows
                self.pattern = None;
                self.gap_due = false;
                self.lookahead = self.next_token();
                if matches!(self.lookahead, Some(Token::Character(_))) {
                    return Some(Ok(MorseSymbol::InterCharacterGap));
                }
                continue;
            }

            match self.next_token()? {
                Token::Space => return Some(Ok(MorseSymbol::WordGap)),
                Token::Character(pattern) => self.pattern = Some(pattern),
                Token::Unsupported(c) => {
                    self.failed = true;
                    return Some(Err(BeaconError::UnsupportedCharacter(c)));
                }
            }
        }
    }
}

impl core::iter::FusedIterator for MorseSymbols<'_> {}
