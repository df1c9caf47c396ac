//! The account database and request dispatcher.
//!
//! `Dispatcher` owns the account table and the subscription registry and
//! routes a decoded [`Request`] to the matching handler in
//! [`crate::handlers`]. It has no knowledge of sockets or loss
//! simulation (those live one layer up in [`crate::server`]), so it can
//! be exercised directly in tests.

use crate::controller::Controller;
use crate::subscription::SubscriptionRegistry;
use bankrpc_core::{Account, CodecError, Response, StatusCode};
use std::collections::HashMap;
use std::net::SocketAddr;

/// The outcome of one dispatched request: the reply destined for the
/// requester, plus zero or more callback datagrams destined for active
/// subscribers.
pub struct DispatchOutcome {
    pub response: Response,
    pub fan_out: Vec<(SocketAddr, Response)>,
}

impl DispatchOutcome {
    pub(crate) fn reply_only(response: Response) -> DispatchOutcome {
        DispatchOutcome {
            response,
            fan_out: Vec::new(),
        }
    }
}

pub struct Dispatcher {
    pub(crate) next_account_id: i32,
    pub(crate) accounts: HashMap<i32, Account>,
    pub(crate) subscriptions: SubscriptionRegistry,
    pub(crate) controller: Controller,
}

impl Dispatcher {
    pub fn new(controller: Controller) -> Dispatcher {
        Dispatcher {
            next_account_id: 0,
            accounts: HashMap::new(),
            subscriptions: SubscriptionRegistry::new(),
            controller,
        }
    }

    /// Dispatches a decoded request. Returns `Err` only if a handler's
    /// embedded payload fails to decode, in which case the caller
    /// discards the datagram with no reply.
    pub fn dispatch(
        &mut self,
        from: SocketAddr,
        request: &bankrpc_core::Request,
    ) -> Result<DispatchOutcome, CodecError> {
        use bankrpc_core::OpCode;
        match request.op {
            OpCode::Open => self.handle_open(request),
            OpCode::Close => self.handle_close(request),
            OpCode::CheckBalance => self.handle_check_balance(request),
            OpCode::Deposit => self.handle_deposit(request),
            OpCode::Withdraw => self.handle_withdraw(request),
            OpCode::Transfer => self.handle_transfer(request),
            OpCode::Exchange => self.handle_exchange(request),
            OpCode::Monitor => self.handle_monitor(from, request),
        }
    }

    /// Builds the set of callback datagrams a mutating handler must fan
    /// out, one per currently-active subscription.
    pub(crate) fn fan_out(&self, message: impl Into<String>) -> Vec<(SocketAddr, Response)> {
        let message = message.into();
        self.subscriptions
            .active_addresses()
            .map(|addr| (addr, Response::with(0, StatusCode::Callback, message.clone())))
            .collect()
    }
}
