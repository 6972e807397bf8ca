#![doc = include_str!("../README.md")]

//! Primitives for GameJutsu, a dispute arbiter for state-channel board games.

extern crate alloy_primitives;
extern crate alloy_sol_types;

mod error;
pub use error::ArbiterError;

mod event;
pub use event::ArbiterEvent;

mod game;
pub use game::{GameId, GameMove, GameState, Nonce, SignedGameMove, NUM_PLAYERS};

mod traits;
pub use traits::Rules;
