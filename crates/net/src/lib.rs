//! The datagram listener engine built on top of `bankrpc-core`'s wire format:
//! the loss simulator, the invocation-semantics filter, the dispatcher and
//! its handlers, the subscription registry, and the observer/command
//! channels a UI or CLI can drive the listener through.

pub mod controller;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod history;
pub mod loss;
pub mod semantics;
pub mod server;
pub mod state;
pub mod subscription;

pub use controller::{Command, CommandSender, Controller, Event};
pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use error::{HandlerError, ServerError};
pub use history::History;
pub use loss::LossSimulator;
pub use server::Server;
pub use state::SharedState;
pub use subscription::{Subscription, SubscriptionRegistry};
