//! Wire format and domain types for the bank RPC protocol.
//!
//! This crate is intentionally free of any transport or async runtime
//! dependency: it only knows how to turn domain values into bytes and
//! back (`codec`), and what those domain values mean (`account`,
//! `currency`, `money`). The engine that drives a socket with this
//! format lives in `bankrpc-net`.

pub mod account;
pub mod codec;
pub mod currency;
pub mod error;
pub mod money;
pub mod protocol;
pub mod wire;

pub use account::Account;
pub use currency::Currency;
pub use error::CodecError;
pub use money::Money;
pub use protocol::{OpCode, SemanticsMode, StatusCode};
pub use wire::{Request, Response};
