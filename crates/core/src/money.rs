use crate::codec::{Decode, Encode};
use crate::error::CodecError;
use bytes::BufMut;
use std::fmt;
use std::ops::{Add, Sub};

/// Fixed-point monetary amount, stored as a count of micros (10⁻⁶ units).
///
/// Arithmetic is exact integer addition/subtraction. Only FX conversion (an
/// inherently irrational division) rounds, to the nearest micro. `Display`
/// renders with six fractional digits to match the textual balance format
/// clients parse (`"100.000000"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Money {
    micros: i64,
}

const MICROS_PER_UNIT: f64 = 1_000_000.0;

impl Money {
    pub const ZERO: Money = Money { micros: 0 };

    pub fn from_micros(micros: i64) -> Money {
        Money { micros }
    }

    /// Constructs a `Money` from a major-unit floating point amount, e.g.
    /// `Money::from_major(100.5)` for "100.50". Used at the RPC boundary when
    /// decoding a client-supplied amount.
    pub fn from_major(amount: f64) -> Money {
        Money {
            micros: (amount * MICROS_PER_UNIT).round() as i64,
        }
    }

    pub fn micros(self) -> i64 {
        self.micros
    }

    pub fn to_major(self) -> f64 {
        self.micros as f64 / MICROS_PER_UNIT
    }

    /// `self / rate`, rounded to the nearest micro. Used for FX conversion,
    /// where `rate` is the static exchange table entry.
    pub fn div_rate(self, rate: f64) -> Money {
        Money {
            micros: (self.micros as f64 / rate).round() as i64,
        }
    }

    /// Subtracts `amount`, failing rather than going negative.
    pub fn checked_sub(self, amount: Money) -> Option<Money> {
        if self < amount {
            None
        } else {
            Some(Money {
                micros: self.micros - amount.micros,
            })
        }
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money {
            micros: self.micros + rhs.micros,
        }
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money {
            micros: self.micros - rhs.micros,
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.micros < 0 { "-" } else { "" };
        let abs = self.micros.unsigned_abs();
        let major = abs / 1_000_000;
        let fraction = abs % 1_000_000;
        write!(f, "{sign}{major}.{fraction:06}")
    }
}

/// On the wire, amounts travel as a major-unit floating point value. The
/// fixed-point `Money` representation is purely an internal server-side
/// choice.
impl Encode for Money {
    fn encode(&self, buf: &mut dyn BufMut) {
        self.to_major().encode(buf);
    }
}

impl Decode for Money {
    fn decode_unfinished(buf: &[u8]) -> Result<(Self, &[u8]), CodecError> {
        let (amount, rest) = f64::decode_unfinished(buf)?;
        Ok((Money::from_major(amount), rest))
    }
}
