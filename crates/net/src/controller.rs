//! The observer/controller hooks.
//!
//! Two independent channels connect the listener to an operator: the
//! `Controller` posts `Event`s from the listener to whatever is
//! receiving (a test harness, a future UI), and `CommandSender` carries
//! operator commands (`SetMode`, `SetLossThreshold`) the other way.
//! Neither side owns the other, and neither blocks on the other.
//! `Controller::post` is fire-and-forget, dropped silently if nothing is
//! listening.

use bankrpc_core::{Account, Request, Response, SemanticsMode};
use crate::subscription::Subscription;
use std::net::IpAddr;
use tokio::sync::mpsc;

/// Every core→observer notification the listener can post.
#[derive(Debug, Clone)]
pub enum Event {
    RequestReceived { ip: IpAddr, request: Request },
    ResponsePosted { ip: IpAddr, response: Response },
    Console(String),
    AccountCreated(Account),
    AccountDeleted(Account),
    Deposit(Account),
    Withdraw(Account),
    Exchange(Account),
    Transfer { receiver: Account, sender: Account },
    CallbackCreated(Subscription),
    CallbackDeleted(Subscription),
}

/// Operator→core commands.
#[derive(Debug, Clone, Copy)]
pub enum Command {
    SetMode(SemanticsMode),
    SetLossThreshold(u8),
}

pub type EventReceiver = mpsc::UnboundedReceiver<Event>;
pub type CommandReceiver = mpsc::UnboundedReceiver<Command>;

#[derive(Clone)]
pub struct Controller {
    events: mpsc::UnboundedSender<Event>,
}

impl Controller {
    pub fn new() -> (Controller, EventReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Controller { events: tx }, rx)
    }

    fn post(&self, event: Event) {
        // Fire-and-forget: the core never waits for the UI to acknowledge,
        // and a dropped receiver (no UI attached) is not an error.
        let _ = self.events.send(event);
    }

    pub fn on_request_received(&self, ip: IpAddr, request: Request) {
        self.post(Event::RequestReceived { ip, request });
    }

    pub fn on_response_posted(&self, ip: IpAddr, response: Response) {
        self.post(Event::ResponsePosted { ip, response });
    }

    pub fn on_console(&self, text: impl Into<String>) {
        self.post(Event::Console(text.into()));
    }

    pub fn on_account_created(&self, account: Account) {
        self.post(Event::AccountCreated(account));
    }

    pub fn on_account_deleted(&self, account: Account) {
        self.post(Event::AccountDeleted(account));
    }

    pub fn on_deposit(&self, account: Account) {
        self.post(Event::Deposit(account));
    }

    pub fn on_withdraw(&self, account: Account) {
        self.post(Event::Withdraw(account));
    }

    pub fn on_exchange(&self, account: Account) {
        self.post(Event::Exchange(account));
    }

    pub fn on_transfer(&self, receiver: Account, sender: Account) {
        self.post(Event::Transfer { receiver, sender });
    }

    pub fn on_callback_created(&self, subscription: Subscription) {
        self.post(Event::CallbackCreated(subscription));
    }

    pub fn on_callback_deleted(&self, subscription: Subscription) {
        self.post(Event::CallbackDeleted(subscription));
    }
}

#[derive(Clone)]
pub struct CommandSender {
    commands: mpsc::UnboundedSender<Command>,
}

impl CommandSender {
    pub fn set_mode(&self, mode: SemanticsMode) {
        let _ = self.commands.send(Command::SetMode(mode));
    }

    pub fn set_loss_threshold(&self, threshold: u8) {
        let _ = self.commands.send(Command::SetLossThreshold(threshold));
    }
}

pub fn command_channel() -> (CommandSender, CommandReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (CommandSender { commands: tx }, rx)
}
