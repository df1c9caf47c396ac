use crate::codec::{Decode, Encode};
use crate::currency::Currency;
use crate::error::CodecError;
use crate::money::Money;
use bytes::BufMut;
use std::collections::HashMap;

/// A named, password-protected holder of per-currency balances.
///
/// An absent currency key is semantically equivalent to a zero balance
/// (`balance_of` never panics on a currency the account has never touched).
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: i32,
    pub user_name: String,
    pub password: String,
    balance: HashMap<Currency, Money>,
}

impl Account {
    pub fn new(id: i32, user_name: String, password: String, currency: Currency, amount: Money) -> Account {
        let mut balance = HashMap::new();
        balance.insert(currency, amount);
        Account {
            id,
            user_name,
            password,
            balance,
        }
    }

    pub fn balance_of(&self, currency: Currency) -> Money {
        self.balance.get(&currency).copied().unwrap_or(Money::ZERO)
    }

    pub fn deposit(&mut self, currency: Currency, amount: Money) {
        let entry = self.balance.entry(currency).or_insert(Money::ZERO);
        *entry = *entry + amount;
    }

    /// Fails rather than overdrawing. Callers at the handler layer are
    /// expected to check `balance_of` first and turn this into a `fail`
    /// response.
    pub fn withdraw(&mut self, currency: Currency, amount: Money) -> Result<(), InsufficientFunds> {
        let current = self.balance_of(currency);
        let remaining = current.checked_sub(amount).ok_or(InsufficientFunds)?;
        self.balance.insert(currency, remaining);
        Ok(())
    }

    pub fn balances(&self) -> impl Iterator<Item = (Currency, Money)> + '_ {
        self.balance.iter().map(|(&c, &m)| (c, m))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsufficientFunds;

impl std::fmt::Display for InsufficientFunds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "insufficient fund")
    }
}

impl std::error::Error for InsufficientFunds {}

impl Encode for Account {
    fn encode(&self, buf: &mut dyn BufMut) {
        self.id.encode(buf);
        self.user_name.clone().encode(buf);
        self.password.clone().encode(buf);
        self.balance.encode(buf);
    }
}

impl Decode for Account {
    fn decode_unfinished(buf: &[u8]) -> Result<(Self, &[u8]), CodecError> {
        let (id, rest) = i32::decode_unfinished(buf)?;
        let (user_name, rest) = String::decode_unfinished(rest)?;
        let (password, rest) = String::decode_unfinished(rest)?;
        let (balance, rest) = HashMap::<Currency, Money>::decode_unfinished(rest)?;
        Ok((
            Account {
                id,
                user_name,
                password,
                balance,
            },
            rest,
        ))
    }
}
