//! Logical pad buttons of the emulated handheld

use std::fmt;
use std::str::FromStr;

/// Bitmask over [`PadKey`] values. Bit `n` corresponds to the key with
/// discriminant `n`.
pub type KeyBits = u16;

/// One logical button on the emulated pad.
///
/// The discriminant is the bit position used in [`KeyBits`] masks and in the
/// machine core's button register, so the order here is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PadKey {
    A = 0,
    B,
    Select,
    Start,
    Right,
    Left,
    Up,
    Down,
    R,
    L,
}

impl PadKey {
    /// Number of logical buttons; every mapping table is sized to this.
    pub const COUNT: usize = 10;

    /// All keys in discriminant order.
    pub const ALL: [PadKey; PadKey::COUNT] = [
        PadKey::A,
        PadKey::B,
        PadKey::Select,
        PadKey::Start,
        PadKey::Right,
        PadKey::Left,
        PadKey::Up,
        PadKey::Down,
        PadKey::R,
        PadKey::L,
    ];

    /// The single-bit mask for this key.
    pub const fn bit(self) -> KeyBits {
        1 << self as u16
    }

    /// Key for a raw bit index, if in range.
    pub fn from_index(index: usize) -> Option<PadKey> {
        PadKey::ALL.get(index).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            PadKey::A => "A",
            PadKey::B => "B",
            PadKey::Select => "Select",
            PadKey::Start => "Start",
            PadKey::Right => "Right",
            PadKey::Left => "Left",
            PadKey::Up => "Up",
            PadKey::Down => "Down",
            PadKey::R => "R",
            PadKey::L => "L",
        }
    }
}

impl fmt::Display for PadKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error for unrecognized pad key names in stored bindings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized pad key name")]
pub struct ParseKeyError;

impl FromStr for PadKey {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PadKey::ALL
            .iter()
            .copied()
            .find(|key| key.name().eq_ignore_ascii_case(s))
            .ok_or(ParseKeyError)
    }
}
