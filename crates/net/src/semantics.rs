//! The invocation-semantics filter.
//!
//! Sits between the loss-gated inbound datagram and the dispatcher:
//! decides, from the current [`SemanticsMode`] and the request history,
//! whether to dispatch, replay a cached response, or silently drop.

use crate::dispatcher::{DispatchOutcome, Dispatcher};
use crate::history::History;
use bankrpc_core::{CodecError, Request, SemanticsMode};
use std::net::SocketAddr;

/// `None` means the filter produced no reply at all: either `maybe`
/// mode's silent no-op, or a payload decode error.
pub fn apply(
    mode: SemanticsMode,
    history: &mut History,
    dispatcher: &mut Dispatcher,
    from: SocketAddr,
    request: Request,
) -> Result<Option<DispatchOutcome>, CodecError> {
    match mode {
        SemanticsMode::AtLeastOnce => {
            // Always dispatch, never record, never consult history: a
            // retransmission re-executes the handler in full.
            dispatcher.dispatch(from, &request).map(Some)
        }
        SemanticsMode::AtMostOnce => {
            if let Some(cached) = history.cached_response(request.id) {
                return Ok(Some(DispatchOutcome::reply_only(cached.clone())));
            }
            let outcome = dispatcher.dispatch(from, &request)?;
            history.record(request, outcome.response.clone());
            Ok(Some(outcome))
        }
        SemanticsMode::Maybe => Ok(None),
    }
}
