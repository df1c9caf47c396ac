//! `Request` and `Response`, the two envelope types carried by every
//! datagram.
//!
//! Both are thin records over the codec. A request pairs an id and op
//! code with a 1200-byte payload region whose content is interpreted
//! per-handler. A response pairs an id and status code with a
//! length-prefixed text message padded to the same 1200-byte region.

use crate::codec::{Decode, Encode, FixedBytes};
use crate::error::CodecError;
use crate::protocol::{OpCode, StatusCode};
use bytes::BufMut;

/// Size of the payload region carried by both `Request` and `Response`.
pub const PAYLOAD_LEN: usize = 1200;

/// `id (i32) | op_code (i32) | payload (1200 bytes)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub id: i32,
    pub op: OpCode,
    payload: FixedBytes<PAYLOAD_LEN>,
}

impl Request {
    /// Copies at most `PAYLOAD_LEN - 1` bytes of `payload_bytes`, leaving
    /// position `PAYLOAD_LEN - 1` (and anything beyond the copy) zeroed.
    pub fn new(id: i32, op: OpCode, payload_bytes: &[u8]) -> Request {
        let mut payload = FixedBytes::zeroed();
        let n = payload_bytes.len().min(PAYLOAD_LEN - 1);
        payload.as_mut_slice()[..n].copy_from_slice(&payload_bytes[..n]);
        Request { id, op, payload }
    }

    /// The raw payload region, for a handler to decode per its op code.
    /// Trailing zero padding is harmless: handlers use
    /// `Decode::decode_unfinished` and ignore whatever remains.
    pub fn payload(&self) -> &[u8] {
        self.payload.as_slice()
    }
}

impl Encode for Request {
    fn encode(&self, buf: &mut dyn BufMut) {
        self.id.encode(buf);
        self.op.encode(buf);
        self.payload.encode(buf);
    }
}

impl Decode for Request {
    fn decode_unfinished(buf: &[u8]) -> Result<(Self, &[u8]), CodecError> {
        let (id, rest) = i32::decode_unfinished(buf)?;
        let (op, rest) = OpCode::decode_unfinished(rest)?;
        let (payload, rest) = FixedBytes::<PAYLOAD_LEN>::decode_unfinished(rest)?;
        Ok((Request { id, op, payload }, rest))
    }
}

/// `id (i32) | status_code (i32) | payload (1200 bytes)`, where the
/// payload is an 8-byte length prefix followed by that many text bytes
/// and zero padding to fill the region.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub id: i32,
    pub status: StatusCode,
    text: String,
}

/// The length prefix itself occupies 8 bytes of the payload region.
const MAX_TEXT_LEN: usize = PAYLOAD_LEN - 8;

impl Response {
    /// Builds a response, truncating `text` (at a UTF-8 char boundary) if
    /// it would not otherwise fit alongside its length prefix.
    pub fn with(id: i32, status: StatusCode, text: impl Into<String>) -> Response {
        let mut text = text.into();
        if text.len() > MAX_TEXT_LEN {
            let mut cut = MAX_TEXT_LEN;
            while !text.is_char_boundary(cut) {
                cut -= 1;
            }
            text.truncate(cut);
        }
        Response { id, status, text }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Encode for Response {
    fn encode(&self, buf: &mut dyn BufMut) {
        self.id.encode(buf);
        self.status.encode(buf);
        let bytes = self.text.as_bytes();
        (bytes.len() as u64).encode(buf);
        buf.put_slice(bytes);
        buf.put_bytes(0, MAX_TEXT_LEN - bytes.len());
    }
}

impl Decode for Response {
    fn decode_unfinished(buf: &[u8]) -> Result<(Self, &[u8]), CodecError> {
        let (id, rest) = i32::decode_unfinished(buf)?;
        let (status, rest) = StatusCode::decode_unfinished(rest)?;
        if rest.len() < PAYLOAD_LEN {
            return Err(CodecError::UnexpectedEof {
                needed: PAYLOAD_LEN,
                available: rest.len(),
            });
        }
        let region = &rest[..PAYLOAD_LEN];
        let (len, after_len) = u64::decode_unfinished(region)?;
        let len = len as usize;
        if len > MAX_TEXT_LEN {
            return Err(CodecError::PayloadTooLong(len));
        }
        if after_len.len() < len {
            return Err(CodecError::UnexpectedEof {
                needed: len,
                available: after_len.len(),
            });
        }
        let text = std::str::from_utf8(&after_len[..len])
            .map_err(|_| CodecError::InvalidUtf8)?
            .to_owned();
        Ok((
            Response { id, status, text },
            &rest[PAYLOAD_LEN..],
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::Currency;
    use crate::money::Money;

    #[test]
    fn request_copies_payload_and_zero_pads() {
        let req = Request::new(7, OpCode::Deposit, b"hello");
        assert_eq!(&req.payload()[..5], b"hello");
        assert_eq!(req.payload()[5], 0);
        assert_eq!(req.payload().len(), PAYLOAD_LEN);
    }

    #[test]
    fn request_decodes_heterogeneous_handler_fields_from_payload() {
        let mut embedded = Vec::new();
        "alice".to_owned().encode(&mut embedded);
        "pw".to_owned().encode(&mut embedded);
        Currency::Usd.encode(&mut embedded);
        Money::from_major(50.0).encode(&mut embedded);

        let req = Request::new(1, OpCode::Deposit, &embedded);
        let encoded = req.encode_to_vec();
        let decoded = Request::decode(&encoded).unwrap();

        let rest = decoded.payload();
        let (user_name, rest) = String::decode_unfinished(rest).unwrap();
        let (password, rest) = String::decode_unfinished(rest).unwrap();
        let (currency, rest) = Currency::decode_unfinished(rest).unwrap();
        let (amount, _rest) = Money::decode_unfinished(rest).unwrap();

        assert_eq!(user_name, "alice");
        assert_eq!(password, "pw");
        assert_eq!(currency, Currency::Usd);
        assert_eq!(amount, Money::from_major(50.0));
    }

    #[test]
    fn roundtrip_request() {
        let req = Request::new(42, OpCode::Open, b"payload bytes");
        let encoded = req.encode_to_vec();
        assert_eq!(Request::decode(&encoded).unwrap(), req);
    }

    #[test]
    fn roundtrip_response() {
        let resp = Response::with(42, StatusCode::Success, "account created: id 0");
        let encoded = resp.encode_to_vec();
        let decoded = Response::decode(&encoded).unwrap();
        assert_eq!(decoded, resp);
        assert_eq!(decoded.text(), "account created: id 0");
    }

    #[test]
    fn response_encoding_is_exactly_the_envelope_size() {
        let resp = Response::with(1, StatusCode::Fail, "insufficient fund");
        let encoded = resp.encode_to_vec();
        assert_eq!(encoded.len(), 4 + 4 + PAYLOAD_LEN);
    }

    #[test]
    fn response_text_longer_than_region_is_truncated() {
        let long = "x".repeat(PAYLOAD_LEN * 2);
        let resp = Response::with(1, StatusCode::Success, long);
        assert_eq!(resp.text().len(), MAX_TEXT_LEN);
    }
}
