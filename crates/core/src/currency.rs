use crate::codec::{Decode, Encode};
use crate::error::CodecError;
use crate::money::Money;
use bytes::BufMut;

/// Closed enumeration of the five currencies the bank trades in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Currency {
    Usd,
    Rmb,
    Sgd,
    Jpy,
    Bpd,
}

impl Currency {
    pub const ALL: [Currency; 5] = [
        Currency::Usd,
        Currency::Rmb,
        Currency::Sgd,
        Currency::Jpy,
        Currency::Bpd,
    ];

    fn index(self) -> usize {
        match self {
            Currency::Usd => 0,
            Currency::Rmb => 1,
            Currency::Sgd => 2,
            Currency::Jpy => 3,
            Currency::Bpd => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Rmb => "RMB",
            Currency::Sgd => "SGD",
            Currency::Jpy => "JPY",
            Currency::Bpd => "BPD",
        }
    }

    pub fn from_str(s: &str) -> Option<Currency> {
        match s {
            "USD" => Some(Currency::Usd),
            "RMB" => Some(Currency::Rmb),
            "SGD" => Some(Currency::Sgd),
            "JPY" => Some(Currency::Jpy),
            "BPD" => Some(Currency::Bpd),
            _ => None,
        }
    }
}

/// `EXCHANGE_TABLE[from][to]` gives the units of `from` needed to obtain one
/// unit of `to`.
#[rustfmt::skip]
const EXCHANGE_TABLE: [[f64; 5]; 5] = [
    [1.0000, 7.2300, 1.3400, 150.50,  0.7900],
    [0.1383, 1.0000, 0.1853,  20.810, 0.1093],
    [0.7463, 5.3960, 1.0000, 112.31,  0.5896],
    [0.0066, 0.0480, 0.0089,   1.0000, 0.0052],
    [1.2658, 9.1491, 1.6960, 192.30,  1.0000],
];

/// `amount / E[from][to]`. Division is performed in floating point on the
/// micro-unit count and rounded to the nearest micro, since the exchange
/// rates themselves are not exact fixed-point values.
pub fn convert(amount: Money, from: Currency, to: Currency) -> Money {
    let rate = EXCHANGE_TABLE[from.index()][to.index()];
    amount.div_rate(rate)
}

impl Encode for Currency {
    fn encode(&self, buf: &mut dyn BufMut) {
        self.as_str().to_owned().encode(buf);
    }
}

impl Decode for Currency {
    fn decode_unfinished(buf: &[u8]) -> Result<(Self, &[u8]), CodecError> {
        let (tag, rest) = String::decode_unfinished(buf)?;
        let currency =
            Currency::from_str(&tag).ok_or_else(|| CodecError::InvalidCurrency(tag))?;
        Ok((currency, rest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagonal_is_identity() {
        for c in Currency::ALL {
            assert_eq!(EXCHANGE_TABLE[c.index()][c.index()], 1.0);
        }
    }

    #[test]
    fn roundtrip_currency() {
        for c in Currency::ALL {
            let encoded = c.encode_to_vec();
            assert_eq!(Currency::decode(&encoded).unwrap(), c);
        }
    }

    #[test]
    fn decode_rejects_unknown_currency() {
        let encoded = "XYZ".to_owned().encode_to_vec();
        let err = Currency::decode(&encoded).unwrap_err();
        assert!(matches!(err, CodecError::InvalidCurrency(tag) if tag == "XYZ"));
    }

    #[test]
    fn exchange_example_matches_known_rate() {
        let amount = Money::from_major(100.0);
        let converted = convert(amount, Currency::Usd, Currency::Rmb);
        // 100 / 7.23 ~= 13.831
        let expected = Money::from_major(100.0 / 7.23);
        let diff = (converted.micros() - expected.micros()).abs();
        assert!(diff <= 1, "converted={converted:?} expected={expected:?}");
    }
}
