//! Types related to the arbiter's move protocol.

use crate::ArbiterError;
use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{sol, SolType};
use serde::{Deserialize, Serialize};

/// The [GameId] type is a monotonically assigned sequence number identifying one game
/// held by the arbiter.
pub type GameId = u64;

/// The [Nonce] type counts accepted moves within a game. It increases strictly by 1
/// per accepted move.
pub type Nonce = u64;

/// The number of players in every game arbitrated by this protocol.
pub const NUM_PLAYERS: usize = 2;

type GameStateConstruction = sol! { tuple(uint256, uint256, bytes) };
type GameMoveConstruction = sol! { tuple(uint256, uint256, address, bytes, bytes, bytes) };

/// The [GameState] struct is the arbiter's view of a game position: the game it
/// belongs to, the move count, and the position bytes owned by the rules module.
///
/// The position bytes are opaque to the arbiter. Only the [crate::Rules]
/// implementation attached to the game interprets them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// The game this position belongs to.
    pub game_id: GameId,
    /// The number of moves accepted before this position was reached.
    pub nonce: Nonce,
    /// The rules-module-owned position bytes.
    pub state: Bytes,
}

impl GameState {
    pub fn new(game_id: GameId, nonce: Nonce, state: Bytes) -> Self {
        Self {
            game_id,
            nonce,
            state,
        }
    }

    /// ABI-encodes the state as `(uint256 gameId, uint256 nonce, bytes state)`.
    pub fn abi_encode(&self) -> Vec<u8> {
        GameStateConstruction::abi_encode(&(
            U256::from(self.game_id),
            U256::from(self.nonce),
            self.state.clone(),
        ))
    }

    /// Decodes a state previously produced by [GameState::abi_encode].
    pub fn abi_decode(data: &[u8]) -> Result<Self, ArbiterError> {
        let (game_id, nonce, state) = GameStateConstruction::abi_decode(data, true)
            .map_err(|_| ArbiterError::MalformedPayload)?;
        Ok(Self {
            game_id: u64::try_from(game_id).map_err(|_| ArbiterError::MalformedPayload)?,
            nonce: u64::try_from(nonce).map_err(|_| ArbiterError::MalformedPayload)?,
            state,
        })
    }
}

/// The [GameMove] struct is the assertion "from `old_state`, `player` plays `mv`,
/// yielding `new_state`" at the given nonce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameMove {
    pub game_id: GameId,
    pub nonce: Nonce,
    /// The address asserting the move. May be a primary player address or a
    /// registered session key.
    pub player: Address,
    pub old_state: Bytes,
    pub new_state: Bytes,
    /// The move bytes, interpreted only by the rules module.
    pub mv: Bytes,
}

impl GameMove {
    /// The position this move starts from.
    pub fn old_game_state(&self) -> GameState {
        GameState::new(self.game_id, self.nonce, self.old_state.clone())
    }

    /// The position this move asserts as its successor, at `nonce + 1`.
    pub fn new_game_state(&self) -> GameState {
        GameState::new(self.game_id, self.nonce + 1, self.new_state.clone())
    }

    /// ABI-encodes the move as
    /// `(uint256 gameId, uint256 nonce, address player, bytes oldState, bytes newState, bytes move)`.
    pub fn abi_encode(&self) -> Vec<u8> {
        GameMoveConstruction::abi_encode(&(
            U256::from(self.game_id),
            U256::from(self.nonce),
            self.player,
            self.old_state.clone(),
            self.new_state.clone(),
            self.mv.clone(),
        ))
    }

    /// Decodes a move previously produced by [GameMove::abi_encode].
    pub fn abi_decode(data: &[u8]) -> Result<Self, ArbiterError> {
        let (game_id, nonce, player, old_state, new_state, mv) =
            GameMoveConstruction::abi_decode(data, true)
                .map_err(|_| ArbiterError::MalformedPayload)?;
        Ok(Self {
            game_id: u64::try_from(game_id).map_err(|_| ArbiterError::MalformedPayload)?,
            nonce: u64::try_from(nonce).map_err(|_| ArbiterError::MalformedPayload)?,
            player,
            old_state,
            new_state,
            mv,
        })
    }
}

/// The [SignedGameMove] struct carries a [GameMove] together with an ordered list of
/// signatures over its typed-data digest. Signature order is meaningful: index 0 is
/// the mover's signature by convention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedGameMove {
    pub game_move: GameMove,
    pub signatures: Vec<Bytes>,
}

impl SignedGameMove {
    pub fn new(game_move: GameMove, signatures: Vec<Bytes>) -> Self {
        Self {
            game_move,
            signatures,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use alloy_primitives::address;

    fn sample_move() -> GameMove {
        GameMove {
            game_id: 7,
            nonce: 3,
            player: address!("00000000000000000000000000000000000000a1"),
            old_state: Bytes::from(vec![1, 2, 3]),
            new_state: Bytes::from(vec![4, 5, 6, 7]),
            mv: Bytes::from(vec![9]),
        }
    }

    #[test]
    fn game_state_roundtrip() {
        let state = GameState::new(42, 9, Bytes::from(vec![0xde, 0xad, 0xbe, 0xef]));
        let encoded = state.abi_encode();
        assert_eq!(GameState::abi_decode(&encoded).unwrap(), state);
    }

    #[test]
    fn game_move_roundtrip() {
        let game_move = sample_move();
        let encoded = game_move.abi_encode();
        assert_eq!(GameMove::abi_decode(&encoded).unwrap(), game_move);
    }

    #[test]
    fn truncated_payload_is_malformed() {
        let encoded = sample_move().abi_encode();
        assert_eq!(
            GameMove::abi_decode(&encoded[..encoded.len() - 1]),
            Err(ArbiterError::MalformedPayload)
        );
        assert_eq!(
            GameState::abi_decode(&[0u8; 31]),
            Err(ArbiterError::MalformedPayload)
        );
    }

    #[test]
    fn successor_state_increments_nonce() {
        let game_move = sample_move();
        assert_eq!(game_move.old_game_state().nonce, 3);
        assert_eq!(game_move.new_game_state().nonce, 4);
        assert_eq!(game_move.new_game_state().state, game_move.new_state);
    }
}
