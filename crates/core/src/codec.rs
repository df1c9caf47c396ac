//! Bit-exact serialization for the closed set of types the wire protocol carries.
//!
//! The format is intentionally not self-delimiting at the byte-stream level.
//! Callers know from context (a field's declared type) what to decode next.
//! Wire endianness is fixed little-endian, and decoding an unknown enum tag
//! is an error rather than a default value.

use crate::error::CodecError;
use bytes::{Buf, BufMut};
use std::collections::HashMap;
use std::hash::Hash;

/// Encodes a value into a caller-supplied, growable byte buffer.
pub trait Encode {
    fn encode(&self, buf: &mut dyn BufMut);

    /// Convenience: encode into a fresh `Vec<u8>`.
    fn encode_to_vec(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.encode(&mut buf);
        buf
    }
}

/// Decodes a value from the front of a byte slice, returning the value and
/// whatever bytes remain unconsumed.
pub trait Decode: Sized {
    fn decode_unfinished(buf: &[u8]) -> Result<(Self, &[u8]), CodecError>;

    /// Decode a value that is expected to consume the entire slice.
    fn decode(buf: &[u8]) -> Result<Self, CodecError> {
        let (value, rest) = Self::decode_unfinished(buf)?;
        if !rest.is_empty() {
            return Err(CodecError::TrailingBytes);
        }
        Ok(value)
    }
}

fn require(buf: &[u8], needed: usize) -> Result<(), CodecError> {
    if buf.len() < needed {
        return Err(CodecError::UnexpectedEof {
            needed,
            available: buf.len(),
        });
    }
    Ok(())
}

macro_rules! impl_int_codec {
    ($t:ty, $read:ident, $put:ident) => {
        impl Encode for $t {
            fn encode(&self, buf: &mut dyn BufMut) {
                buf.$put(*self);
            }
        }

        impl Decode for $t {
            fn decode_unfinished(buf: &[u8]) -> Result<(Self, &[u8]), CodecError> {
                const SIZE: usize = std::mem::size_of::<$t>();
                require(buf, SIZE)?;
                let mut reader = &buf[..SIZE];
                let value = reader.$read();
                Ok((value, &buf[SIZE..]))
            }
        }
    };
}

impl_int_codec!(i32, get_i32_le, put_i32_le);
impl_int_codec!(i64, get_i64_le, put_i64_le);
impl_int_codec!(u64, get_u64_le, put_u64_le);
impl_int_codec!(u8, get_u8, put_u8);
impl_int_codec!(f64, get_f64_le, put_f64_le);

impl Encode for String {
    fn encode(&self, buf: &mut dyn BufMut) {
        (self.len() as u64).encode(buf);
        buf.put_slice(self.as_bytes());
    }
}

impl Decode for String {
    fn decode_unfinished(buf: &[u8]) -> Result<(Self, &[u8]), CodecError> {
        let (len, rest) = u64::decode_unfinished(buf)?;
        let len = len as usize;
        require(rest, len)?;
        let text =
            std::str::from_utf8(&rest[..len]).map_err(|_| CodecError::InvalidUtf8)?;
        Ok((text.to_owned(), &rest[len..]))
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode(&self, buf: &mut dyn BufMut) {
        (self.len() as u64).encode(buf);
        for item in self {
            item.encode(buf);
        }
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn decode_unfinished(buf: &[u8]) -> Result<(Self, &[u8]), CodecError> {
        let (len, mut rest) = u64::decode_unfinished(buf)?;
        let mut items = Vec::with_capacity(len as usize);
        for _ in 0..len {
            let (item, next) = T::decode_unfinished(rest)?;
            items.push(item);
            rest = next;
        }
        Ok((items, rest))
    }
}

impl<K: Encode, V: Encode> Encode for HashMap<K, V> {
    fn encode(&self, buf: &mut dyn BufMut) {
        (self.len() as u64).encode(buf);
        for (key, value) in self {
            key.encode(buf);
            value.encode(buf);
        }
    }
}

impl<K: Decode + Eq + Hash, V: Decode> Decode for HashMap<K, V> {
    fn decode_unfinished(buf: &[u8]) -> Result<(Self, &[u8]), CodecError> {
        let (len, mut rest) = u64::decode_unfinished(buf)?;
        let mut map = HashMap::with_capacity(len as usize);
        for _ in 0..len {
            let (key, next) = K::decode_unfinished(rest)?;
            let (value, next) = V::decode_unfinished(next)?;
            map.insert(key, value);
            rest = next;
        }
        Ok((map, rest))
    }
}

/// A fixed-size, non-length-prefixed byte region (the 1200-byte request/response
/// payload tail). Encoding writes exactly `N` raw bytes; decoding consumes
/// exactly `N` bytes with no framing of its own.
#[derive(Clone)]
pub struct FixedBytes<const N: usize>(pub [u8; N]);

impl<const N: usize> FixedBytes<N> {
    pub fn zeroed() -> Self {
        FixedBytes([0u8; N])
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.0
    }
}

impl<const N: usize> Encode for FixedBytes<N> {
    fn encode(&self, buf: &mut dyn BufMut) {
        buf.put_slice(&self.0);
    }
}

impl<const N: usize> Decode for FixedBytes<N> {
    fn decode_unfinished(buf: &[u8]) -> Result<(Self, &[u8]), CodecError> {
        require(buf, N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&buf[..N]);
        Ok((FixedBytes(out), &buf[N..]))
    }
}
