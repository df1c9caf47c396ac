//! Time-bounded subscriptions ("callbacks").
//!
//! At most one *active* subscription may exist per client address; a
//! second `monitor` while one is active fails. Expired entries are only
//! pruned lazily, when a later `monitor` arrives from the same address
//! (a deliberate policy choice, not a defect).

use crate::error::HandlerError;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Subscription {
    pub addr: SocketAddr,
    pub start: Instant,
    pub duration: Duration,
}

impl Subscription {
    pub fn new(addr: SocketAddr, duration: Duration) -> Subscription {
        Subscription {
            addr,
            start: Instant::now(),
            duration,
        }
    }

    pub fn is_active(&self) -> bool {
        Instant::now() < self.start + self.duration
    }
}

/// Result of a `monitor` call: subscriptions from `addr` that were found
/// expired and pruned along the way, plus the outcome of the request
/// itself.
pub struct MonitorOutcome {
    pub pruned: Vec<Subscription>,
    pub result: Result<Subscription, HandlerError>,
}

#[derive(Default)]
pub struct SubscriptionRegistry {
    subscriptions: Vec<Subscription>,
}

impl SubscriptionRegistry {
    pub fn new() -> SubscriptionRegistry {
        SubscriptionRegistry::default()
    }

    /// Handles `monitor`: scans every entry matching `addr`.
    /// An active match sets the "already exists" flag (request fails);
    /// an inactive match is removed and reported for the observer hook.
    /// If nothing active was found, a fresh subscription is registered.
    pub fn monitor(&mut self, addr: SocketAddr, duration: Duration) -> MonitorOutcome {
        let mut already_active = false;
        let mut pruned = Vec::new();
        self.subscriptions.retain(|sub| {
            if sub.addr != addr {
                return true;
            }
            if sub.is_active() {
                already_active = true;
                true
            } else {
                pruned.push(sub.clone());
                false
            }
        });

        let result = if already_active {
            Err(HandlerError::DuplicateSubscription)
        } else {
            let sub = Subscription::new(addr, duration);
            self.subscriptions.push(sub.clone());
            Ok(sub)
        };

        MonitorOutcome { pruned, result }
    }

    /// Fan-out target list: active entries only, inactive entries are
    /// left in place (pruned lazily by `monitor`).
    pub fn active_addresses(&self) -> impl Iterator<Item = SocketAddr> + '_ {
        self.subscriptions
            .iter()
            .filter(|sub| sub.is_active())
            .map(|sub| sub.addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(port: u16) -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], port))
    }

    #[test]
    fn first_monitor_succeeds_and_becomes_active() {
        let mut registry = SubscriptionRegistry::new();
        let outcome = registry.monitor(addr(9000), Duration::from_secs(60));
        assert!(outcome.result.is_ok());
        assert!(outcome.pruned.is_empty());
        assert_eq!(registry.active_addresses().count(), 1);
    }

    #[test]
    fn second_monitor_while_active_fails() {
        let mut registry = SubscriptionRegistry::new();
        registry.monitor(addr(9000), Duration::from_secs(60));
        let outcome = registry.monitor(addr(9000), Duration::from_secs(60));
        assert_eq!(outcome.result.unwrap_err(), HandlerError::DuplicateSubscription);
        assert_eq!(registry.active_addresses().count(), 1);
    }

    #[test]
    fn monitor_after_expiry_prunes_and_succeeds() {
        let mut registry = SubscriptionRegistry::new();
        registry.monitor(addr(9000), Duration::from_millis(0));
        std::thread::sleep(Duration::from_millis(5));
        let outcome = registry.monitor(addr(9000), Duration::from_secs(60));
        assert_eq!(outcome.pruned.len(), 1);
        assert!(outcome.result.is_ok());
        assert_eq!(registry.active_addresses().count(), 1);
    }

    #[test]
    fn inactive_entries_are_not_pruned_outside_monitor() {
        let mut registry = SubscriptionRegistry::new();
        registry.monitor(addr(9000), Duration::from_millis(0));
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(registry.active_addresses().count(), 0);
    }
}
