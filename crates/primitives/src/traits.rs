//! The traits module contains the rules-module seam of the arbiter.

use crate::{ArbiterError, GameState};
use alloy_primitives::Bytes;

/// The [Rules] trait is the pluggable rules-module seam. A rules module is a pure,
/// deterministic validator and transitioner for one game's positions; the arbiter
/// delegates every legality question to it and never interprets position bytes
/// itself.
///
/// Implementations decode the opaque `state` / `mv` payloads and fail with
/// [ArbiterError::MalformedPayload] when they do not parse. All operations are pure:
/// same inputs, same outputs, no side effects.
pub trait Rules {
    /// Returns whether `mv` is a legal move for `player_id` (0 or 1) from `state`,
    /// assuming the position is well-formed and it is `player_id`'s turn.
    fn is_valid_move(
        &self,
        state: &GameState,
        player_id: u8,
        mv: &[u8],
    ) -> Result<bool, ArbiterError>;

    /// Applies `mv` to `state` and returns the successor position with `nonce + 1`.
    ///
    /// The result is unspecified when [Rules::is_valid_move] is false for the same
    /// inputs; callers must check legality first.
    fn transition(
        &self,
        state: &GameState,
        player_id: u8,
        mv: &[u8],
    ) -> Result<GameState, ArbiterError>;

    /// Returns whether `state` is terminal.
    fn is_final(&self, state: &GameState) -> Result<bool, ArbiterError>;

    /// Returns whether `player_id` has won in `state`. At most one player may be a
    /// winner; a terminal state with no winner is a draw.
    fn is_win(&self, state: &GameState, player_id: u8) -> Result<bool, ArbiterError>;

    /// The canonical starting position for a new game.
    fn default_initial_state(&self) -> Bytes;
}
