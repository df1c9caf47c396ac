//! The eight per-operation handlers, as an `impl` block extending
//! [`crate::dispatcher::Dispatcher`]. Every handler
//! decodes its op-specific payload fields, applies the uniform
//! authentication rule where applicable, mutates the account table, and
//! returns a [`DispatchOutcome`] carrying the reply plus any fan-out
//! callback datagrams.

use crate::dispatcher::{DispatchOutcome, Dispatcher};
use crate::error::HandlerError;
use bankrpc_core::codec::Decode;
use bankrpc_core::{Account, CodecError, Currency, Money, Request, Response, StatusCode};
use std::net::SocketAddr;
use std::time::Duration;

impl Dispatcher {
    /// The authentication rule applied uniformly by every handler that
    /// takes (id, user_name, password): account not found is an
    /// identity failure (`error`), a username/password mismatch is a
    /// business-rule failure (`fail`).
    fn authenticate(&self, id: i32, user_name: &str, password: &str) -> Result<&Account, HandlerError> {
        let account = self
            .accounts
            .get(&id)
            .ok_or(HandlerError::AccountNotFound(id))?;
        if account.user_name != user_name {
            return Err(HandlerError::WrongUserName);
        }
        if account.password != password {
            return Err(HandlerError::WrongPassword);
        }
        Ok(account)
    }

    fn reply(&self, request: &Request, error: HandlerError) -> DispatchOutcome {
        DispatchOutcome::reply_only(Response::with(request.id, error.status(), error.to_string()))
    }

    pub(crate) fn handle_open(&mut self, request: &Request) -> Result<DispatchOutcome, CodecError> {
        let (user_name, rest) = String::decode_unfinished(request.payload())?;
        let (password, rest) = String::decode_unfinished(rest)?;
        let (balance, rest) = Money::decode_unfinished(rest)?;
        let (currency, _rest) = Currency::decode_unfinished(rest)?;

        let id = self.next_account_id;
        self.next_account_id += 1;
        let account = Account::new(id, user_name, password, currency, balance);
        self.accounts.insert(id, account.clone());
        self.controller.on_account_created(account);

        let message = format!(
            "account created: id {id}, balance {balance} {cur}",
            cur = currency.as_str()
        );
        let mut outcome = DispatchOutcome::reply_only(Response::with(
            request.id,
            StatusCode::Success,
            message.clone(),
        ));
        outcome.fan_out = self.fan_out(message);
        Ok(outcome)
    }

    pub(crate) fn handle_close(&mut self, request: &Request) -> Result<DispatchOutcome, CodecError> {
        let (id, rest) = i32::decode_unfinished(request.payload())?;
        let (user_name, rest) = String::decode_unfinished(rest)?;
        let (password, _rest) = String::decode_unfinished(rest)?;

        if let Err(err) = self.authenticate(id, &user_name, &password) {
            return Ok(self.reply(request, err));
        }

        let account = self.accounts.remove(&id).expect("authenticate just found this id");
        self.controller.on_account_deleted(account);

        let message = format!("successfully removed account with id: {id}");
        let mut outcome = DispatchOutcome::reply_only(Response::with(
            request.id,
            StatusCode::Success,
            message.clone(),
        ));
        outcome.fan_out = self.fan_out(message);
        Ok(outcome)
    }

    pub(crate) fn handle_check_balance(
        &mut self,
        request: &Request,
    ) -> Result<DispatchOutcome, CodecError> {
        let (id, rest) = i32::decode_unfinished(request.payload())?;
        let (user_name, rest) = String::decode_unfinished(rest)?;
        let (password, rest) = String::decode_unfinished(rest)?;
        let (currency, _rest) = Currency::decode_unfinished(rest)?;

        let account = match self.authenticate(id, &user_name, &password) {
            Ok(account) => account,
            Err(err) => return Ok(self.reply(request, err)),
        };

        let balance = account.balance_of(currency);
        Ok(DispatchOutcome::reply_only(Response::with(
            request.id,
            StatusCode::Success,
            balance.to_string(),
        )))
    }

    pub(crate) fn handle_deposit(&mut self, request: &Request) -> Result<DispatchOutcome, CodecError> {
        let (id, rest) = i32::decode_unfinished(request.payload())?;
        let (user_name, rest) = String::decode_unfinished(rest)?;
        let (password, rest) = String::decode_unfinished(rest)?;
        let (currency, rest) = Currency::decode_unfinished(rest)?;
        let (amount, _rest) = Money::decode_unfinished(rest)?;

        if let Err(err) = self.authenticate(id, &user_name, &password) {
            return Ok(self.reply(request, err));
        }

        let account = self
            .accounts
            .get_mut(&id)
            .expect("authenticate just found this id");
        account.deposit(currency, amount);
        let new_balance = account.balance_of(currency);
        self.controller.on_deposit(account.clone());

        let message = format!(
            "deposit success, current balance of {cur} is: {new_balance}",
            cur = currency.as_str()
        );
        let mut outcome = DispatchOutcome::reply_only(Response::with(
            request.id,
            StatusCode::Success,
            message,
        ));
        outcome.fan_out = self.fan_out(format!(
            "successful deposit {amount} {cur} to account with id: {id}",
            cur = currency.as_str()
        ));
        Ok(outcome)
    }

    pub(crate) fn handle_withdraw(&mut self, request: &Request) -> Result<DispatchOutcome, CodecError> {
        let (id, rest) = i32::decode_unfinished(request.payload())?;
        let (user_name, rest) = String::decode_unfinished(rest)?;
        let (password, rest) = String::decode_unfinished(rest)?;
        let (currency, rest) = Currency::decode_unfinished(rest)?;
        let (amount, _rest) = Money::decode_unfinished(rest)?;

        let account = match self.authenticate(id, &user_name, &password) {
            Ok(account) => account,
            Err(err) => return Ok(self.reply(request, err)),
        };
        if account.balance_of(currency) < amount {
            return Ok(self.reply(request, HandlerError::InsufficientFunds));
        }

        let account = self
            .accounts
            .get_mut(&id)
            .expect("authenticate just found this id");
        account
            .withdraw(currency, amount)
            .expect("balance check above guarantees this succeeds");
        let new_balance = account.balance_of(currency);
        self.controller.on_withdraw(account.clone());

        let message = format!(
            "withdraw success, current balance of {cur} is: {new_balance}",
            cur = currency.as_str()
        );
        let mut outcome = DispatchOutcome::reply_only(Response::with(
            request.id,
            StatusCode::Success,
            message,
        ));
        outcome.fan_out = self.fan_out(format!(
            "successful withdraw {amount} {cur} from account with id: {id}",
            cur = currency.as_str()
        ));
        Ok(outcome)
    }

    pub(crate) fn handle_transfer(&mut self, request: &Request) -> Result<DispatchOutcome, CodecError> {
        let (sender_id, rest) = i32::decode_unfinished(request.payload())?;
        let (user_name, rest) = String::decode_unfinished(rest)?;
        let (password, rest) = String::decode_unfinished(rest)?;
        let (currency, rest) = Currency::decode_unfinished(rest)?;
        let (amount, rest) = Money::decode_unfinished(rest)?;
        let (receiver_id, _rest) = i32::decode_unfinished(rest)?;

        // Sender-lookup errors are reported before receiver-lookup errors.
        if let Err(err) = self.authenticate(sender_id, &user_name, &password) {
            return Ok(self.reply(request, err));
        }
        if !self.accounts.contains_key(&receiver_id) {
            return Ok(self.reply(request, HandlerError::AccountNotFound(receiver_id)));
        }
        if self.accounts[&sender_id].balance_of(currency) < amount {
            return Ok(self.reply(request, HandlerError::InsufficientFunds));
        }

        self.accounts
            .get_mut(&sender_id)
            .expect("checked above")
            .withdraw(currency, amount)
            .expect("balance check above guarantees this succeeds");
        self.accounts
            .get_mut(&receiver_id)
            .expect("checked above")
            .deposit(currency, amount);
        let sender = self.accounts[&sender_id].clone();
        let receiver = self.accounts[&receiver_id].clone();
        self.controller.on_transfer(receiver, sender);

        let message = format!(
            "transferred {amount} {cur} to account with id: {receiver_id}",
            cur = currency.as_str()
        );
        let mut outcome = DispatchOutcome::reply_only(Response::with(
            request.id,
            StatusCode::Success,
            message.clone(),
        ));
        outcome.fan_out = self.fan_out(message);
        Ok(outcome)
    }

    pub(crate) fn handle_exchange(&mut self, request: &Request) -> Result<DispatchOutcome, CodecError> {
        let (id, rest) = i32::decode_unfinished(request.payload())?;
        let (user_name, rest) = String::decode_unfinished(rest)?;
        let (password, rest) = String::decode_unfinished(rest)?;
        let (from_currency, rest) = Currency::decode_unfinished(rest)?;
        let (to_currency, rest) = Currency::decode_unfinished(rest)?;
        let (amount_to_exchange, _rest) = Money::decode_unfinished(rest)?;

        if let Err(err) = self.authenticate(id, &user_name, &password) {
            return Ok(self.reply(request, err));
        }

        let amount_needed = bankrpc_core::currency::convert(amount_to_exchange, from_currency, to_currency);
        if self.accounts[&id].balance_of(from_currency) < amount_needed {
            return Ok(self.reply(request, HandlerError::InsufficientFunds));
        }

        let account = self.accounts.get_mut(&id).expect("checked above");
        account
            .withdraw(from_currency, amount_needed)
            .expect("balance check above guarantees this succeeds");
        account.deposit(to_currency, amount_to_exchange);
        self.controller.on_exchange(account.clone());

        let message = format!(
            "exchanged {amount_needed} {from} into {amount_to_exchange} {to} for account with id: {id}",
            from = from_currency.as_str(),
            to = to_currency.as_str()
        );
        let mut outcome = DispatchOutcome::reply_only(Response::with(
            request.id,
            StatusCode::Success,
            message.clone(),
        ));
        outcome.fan_out = self.fan_out(message);
        Ok(outcome)
    }

    pub(crate) fn handle_monitor(
        &mut self,
        from: SocketAddr,
        request: &Request,
    ) -> Result<DispatchOutcome, CodecError> {
        let (duration_ms, _rest) = i64::decode_unfinished(request.payload())?;
        let duration = Duration::from_millis(duration_ms.max(0) as u64);

        let outcome = self.subscriptions.monitor(from, duration);
        for pruned in outcome.pruned {
            self.controller.on_callback_deleted(pruned);
        }

        match outcome.result {
            Err(err) => Ok(self.reply(request, err)),
            Ok(subscription) => {
                self.controller.on_callback_created(subscription);
                Ok(DispatchOutcome::reply_only(Response::with(
                    request.id,
                    StatusCode::Success,
                    "new monitor window created",
                )))
            }
        }
    }
}
