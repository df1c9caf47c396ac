//! Error taxonomy for the engine.
//!
//! `HandlerError` is the single source of truth for the status-code
//! mapping a dispatched request can produce: every handler in
//! [`crate::handlers`] returns a `Result<DispatchOutcome, CodecError>`,
//! building its `Response` inline via `Dispatcher::reply`, which pairs
//! a `HandlerError`'s message with [`HandlerError::status`].

use bankrpc_core::StatusCode;
use std::net::SocketAddr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HandlerError {
    #[error("account not found with id: {0}")]
    AccountNotFound(i32),
    #[error("authentication fails: username not correct")]
    WrongUserName,
    #[error("authentication fails: password not correct")]
    WrongPassword,
    #[error("insufficient fund")]
    InsufficientFunds,
    #[error("monitor window already exists")]
    DuplicateSubscription,
}

impl HandlerError {
    /// Maps a handler failure to the wire status it surfaces as:
    /// identity failures are `error`, everything else a handler can
    /// reject on is a `fail`.
    pub fn status(&self) -> StatusCode {
        match self {
            HandlerError::AccountNotFound(_) => StatusCode::Error,
            HandlerError::WrongUserName
            | HandlerError::WrongPassword
            | HandlerError::InsufficientFunds
            | HandlerError::DuplicateSubscription => StatusCode::Fail,
        }
    }
}

/// Errors that can abort process startup: socket creation and bind
/// failures are fatal, unlike per-datagram errors which are logged and
/// the listener continues.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind udp socket at {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}
