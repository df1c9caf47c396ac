use crate::codec::{Decode, Encode};
use crate::error::CodecError;
use bytes::BufMut;

/// The eight RPC operations a `Request` can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpCode {
    Open = 1,
    Close = 2,
    CheckBalance = 3,
    Deposit = 4,
    Withdraw = 5,
    Transfer = 6,
    Exchange = 7,
    Monitor = 8,
}

impl OpCode {
    pub fn from_i32(value: i32) -> Option<OpCode> {
        match value {
            1 => Some(OpCode::Open),
            2 => Some(OpCode::Close),
            3 => Some(OpCode::CheckBalance),
            4 => Some(OpCode::Deposit),
            5 => Some(OpCode::Withdraw),
            6 => Some(OpCode::Transfer),
            7 => Some(OpCode::Exchange),
            8 => Some(OpCode::Monitor),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OpCode::Open => "open",
            OpCode::Close => "close",
            OpCode::CheckBalance => "check_balance",
            OpCode::Deposit => "deposit",
            OpCode::Withdraw => "withdraw",
            OpCode::Transfer => "transfer",
            OpCode::Exchange => "exchange",
            OpCode::Monitor => "monitor",
        }
    }
}

impl Encode for OpCode {
    fn encode(&self, buf: &mut dyn BufMut) {
        (*self as i32).encode(buf);
    }
}

impl Decode for OpCode {
    fn decode_unfinished(buf: &[u8]) -> Result<(Self, &[u8]), CodecError> {
        let (tag, rest) = i32::decode_unfinished(buf)?;
        let op = OpCode::from_i32(tag).ok_or(CodecError::InvalidOpCode(tag))?;
        Ok((op, rest))
    }
}

/// The four response classifications: `Success` for an applied mutation,
/// `Fail` for a business-rule violation, `Error` for an identity failure
/// (no such account), and `Callback` for an unsolicited push notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    Success = 1,
    Fail = 2,
    Error = 3,
    Callback = 4,
}

impl StatusCode {
    pub fn from_i32(value: i32) -> Option<StatusCode> {
        match value {
            1 => Some(StatusCode::Success),
            2 => Some(StatusCode::Fail),
            3 => Some(StatusCode::Error),
            4 => Some(StatusCode::Callback),
            _ => None,
        }
    }
}

impl Encode for StatusCode {
    fn encode(&self, buf: &mut dyn BufMut) {
        (*self as i32).encode(buf);
    }
}

impl Decode for StatusCode {
    fn decode_unfinished(buf: &[u8]) -> Result<(Self, &[u8]), CodecError> {
        let (tag, rest) = i32::decode_unfinished(buf)?;
        let status = StatusCode::from_i32(tag).ok_or(CodecError::InvalidStatusCode(tag))?;
        Ok((status, rest))
    }
}

/// Selects the duplicate-detection behavior of the invocation-semantics
/// filter. `Maybe` is reserved by the protocol and treated as a silent
/// no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticsMode {
    AtLeastOnce = 1,
    AtMostOnce = 2,
    Maybe = 3,
}

impl SemanticsMode {
    pub fn from_i32(value: i32) -> Option<SemanticsMode> {
        match value {
            1 => Some(SemanticsMode::AtLeastOnce),
            2 => Some(SemanticsMode::AtMostOnce),
            3 => Some(SemanticsMode::Maybe),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SemanticsMode::AtLeastOnce => "at least once semantic",
            SemanticsMode::AtMostOnce => "at most once semantic",
            SemanticsMode::Maybe => "maybe semantic",
        }
    }
}

impl Encode for SemanticsMode {
    fn encode(&self, buf: &mut dyn BufMut) {
        (*self as i32).encode(buf);
    }
}

impl Decode for SemanticsMode {
    fn decode_unfinished(buf: &[u8]) -> Result<(Self, &[u8]), CodecError> {
        let (tag, rest) = i32::decode_unfinished(buf)?;
        let mode = SemanticsMode::from_i32(tag).ok_or(CodecError::InvalidSemanticsMode(tag))?;
        Ok((mode, rest))
    }
}
