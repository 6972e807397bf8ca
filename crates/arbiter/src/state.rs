//! Durable per-game records held by the arbiter.

use alloy_primitives::{Address, U256};
use gamejutsu_primitives::{GameMove, Rules, NUM_PLAYERS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// The [Game] struct is the durable record of one arbitrated game: its rules module,
/// the escrowed stake, the two primary players, the membership map covering primaries
/// and session keys, and the lifecycle flags.
///
/// Lifecycle: proposed (`!started`), started (`started && !finished`), finished.
/// `started` implies a second player is set; `finished` implies `started`; the
/// escrow is disbursed exactly once, on the transition to finished.
#[derive(Clone)]
pub struct Game {
    pub(crate) rules: Arc<dyn Rules>,
    pub(crate) stake: U256,
    pub(crate) players: [Address; NUM_PLAYERS],
    pub(crate) members: BTreeMap<Address, usize>,
    pub(crate) started: bool,
    pub(crate) finished: bool,
}

impl Game {
    pub(crate) fn propose(rules: Arc<dyn Rules>, proposer: Address, stake: U256) -> Self {
        let mut members = BTreeMap::new();
        members.insert(proposer, 0);
        Self {
            rules,
            stake,
            players: [proposer, Address::ZERO],
            members,
            started: false,
            finished: false,
        }
    }

    /// The full escrow currently at stake.
    pub fn stake(&self) -> U256 {
        self.stake
    }

    /// The primary player addresses; index 0 is the proposer.
    pub fn players(&self) -> &[Address; NUM_PLAYERS] {
        &self.players
    }

    pub fn started(&self) -> bool {
        self.started
    }

    pub fn finished(&self) -> bool {
        self.finished
    }

    /// The rules module this game is played under.
    pub fn rules(&self) -> &Arc<dyn Rules> {
        &self.rules
    }

    /// The player slot `addr` occupies, whether as a primary address or a session
    /// key. `None` for non-members.
    pub fn member_index(&self, addr: &Address) -> Option<usize> {
        self.members.get(addr).copied()
    }

    pub(crate) fn opponent_of(&self, index: usize) -> usize {
        1 - index
    }
}

impl fmt::Debug for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Game")
            .field("stake", &self.stake)
            .field("players", &self.players)
            .field("members", &self.members)
            .field("started", &self.started)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

/// The [Timeout] struct is the stake-backed forced-move timer: when it expires
/// unresolved, the player expected to continue from `pending_move` is disqualified.
///
/// At most one timeout is active per game; the arbiter drops the record when the
/// timeout resolves or the game concludes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timeout {
    pub(crate) start_time: u64,
    pub(crate) stake: U256,
    pub(crate) pending_move: GameMove,
    pub(crate) initiator: Address,
}

impl Timeout {
    /// When the timeout was initiated.
    pub fn start_time(&self) -> u64 {
        self.start_time
    }

    /// The bond posted by the initiator.
    pub fn stake(&self) -> U256 {
        self.stake
    }

    /// The latest mover-signed move; the opponent must continue from its successor
    /// position.
    pub fn pending_move(&self) -> &GameMove {
        &self.pending_move
    }

    /// Who posted the bond.
    pub fn initiator(&self) -> Address {
        self.initiator
    }
}
