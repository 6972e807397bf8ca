//! Host-environment seams injected into the arbiter: the block clock, the custody
//! ledger, and the protocol event transport.

use alloy_primitives::{Address, U256};
use gamejutsu_primitives::ArbiterEvent;

/// The [Clock] trait supplies the host timestamp, in UNIX seconds. The arbiter reads
/// it at most once per operation.
pub trait Clock {
    fn now(&self) -> u64;
}

/// The [Ledger] trait is the custody seam. The arbiter never holds value itself; it
/// validates incoming `value` arguments against required stakes and instructs the
/// ledger once per payout leg. Within one terminal operation the credited legs sum
/// to exactly the escrow (plus any timeout bond) taken in.
pub trait Ledger {
    fn credit(&mut self, to: Address, amount: U256);
}

/// The [EventSink] trait transports protocol events to the host. Events are emitted
/// only by operations that succeed, atomically with their state change.
pub trait EventSink {
    fn emit(&mut self, event: ArbiterEvent);
}

/// The [Host] trait bundles the three collaborator seams an [crate::Arbiter] runs
/// against.
pub trait Host: Clock + Ledger + EventSink {}

impl<T: Clock + Ledger + EventSink> Host for T {}

/// The [MockHost] is an in-memory [Host] for tests: a settable clock plus recorded
/// credits and events.
#[derive(Debug, Default)]
pub struct MockHost {
    pub timestamp: u64,
    pub credits: Vec<(Address, U256)>,
    pub events: Vec<ArbiterEvent>,
}

impl MockHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances the mock clock by `seconds`.
    pub fn advance(&mut self, seconds: u64) {
        self.timestamp += seconds;
    }

    /// Total value credited to `to` across all recorded payouts.
    pub fn credited(&self, to: Address) -> U256 {
        self.credits
            .iter()
            .filter(|(addr, _)| *addr == to)
            .fold(U256::ZERO, |acc, (_, amount)| acc + *amount)
    }
}

impl Clock for MockHost {
    fn now(&self) -> u64 {
        self.timestamp
    }
}

impl Ledger for MockHost {
    fn credit(&mut self, to: Address, amount: U256) {
        self.credits.push((to, amount));
    }
}

impl EventSink for MockHost {
    fn emit(&mut self, event: ArbiterEvent) {
        self.events.push(event);
    }
}
