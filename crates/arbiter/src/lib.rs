#![doc = include_str!("../README.md")]

//! The arbiter module contains the game lifecycle state machine, the EIP-712 move
//! signer, and the timeout sub-machine.

extern crate gamejutsu_primitives;

mod arbiter;
mod host;
mod signer;
mod state;

pub use crate::arbiter::{Arbiter, DEFAULT_TIMEOUT_STAKE, TIMEOUT_DURATION};
pub use crate::host::{Clock, EventSink, Host, Ledger, MockHost};
pub use crate::signer::{
    MoveSigner, CHAIN_ID, DOMAIN_NAME, DOMAIN_VERSION, SALT, VERIFYING_CONTRACT,
};
pub use crate::state::{Game, Timeout};

pub mod prelude {
    pub use super::{arbiter::*, host::*, signer::*, state::*};
}
