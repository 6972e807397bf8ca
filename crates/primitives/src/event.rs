//! Protocol events emitted by the arbiter through the host's event sink.

use crate::{GameId, Nonce};
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// The [ArbiterEvent] enum is the protocol's event vocabulary. Events are emitted
/// atomically with the state change and payouts of the operation that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArbiterEvent {
    /// A game was proposed and is awaiting an acceptor.
    GameProposed {
        game_id: GameId,
        stake: U256,
        proposer: Address,
    },
    /// A proposed game was accepted; play may begin. `stake` is the full escrow.
    GameStarted {
        game_id: GameId,
        stake: U256,
        players: [Address; 2],
    },
    /// A member aliased a session key to their player slot.
    SessionAddressRegistered {
        game_id: GameId,
        player: Address,
        session_addr: Address,
    },
    /// A player resigned; their opponent wins the escrow.
    PlayerResigned { game_id: GameId, player: Address },
    /// A player was disqualified for an illegal move or a timed-out stall.
    PlayerDisqualified { game_id: GameId, player: Address },
    /// A forced-move timer was started against `player`, who must produce the move
    /// at `nonce` before `expires_at`.
    TimeoutStarted {
        game_id: GameId,
        player: Address,
        nonce: Nonce,
        expires_at: u64,
    },
    /// The game concluded and the escrow was disbursed.
    GameFinished {
        game_id: GameId,
        winner: Address,
        loser: Address,
        is_draw: bool,
    },
}
