//! Morse Code
//!
//! Character lookup and message encoding into timed Morse symbols.
//! Pure functions of their inputs, testable on the host.

pub mod encoder;
pub mod table;

pub use encoder::{MessageEncoder, MorseSymbols, UnsupportedCharPolicy};
pub use table::{lookup, MorseSymbol, Pattern};
