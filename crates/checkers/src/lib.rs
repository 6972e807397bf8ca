#![doc = include_str!("../README.md")]

//! Checkers rules module for the GameJutsu arbiter.

extern crate gamejutsu_primitives;

mod rules;
pub use rules::CheckersRules;

mod state;
pub use state::{Move, State, EMPTY, RED_KING, RED_MAN, WHITE_KING, WHITE_MAN};

mod tables;
pub use tables::{JUMPS, MOVES, RJUMP, RMOVS};
