//! The arbiter state machine: game lifecycle, dispute adjudication, and the
//! timeout sub-machine.
//!
//! Every operation validates fully before touching state. An `Err` return means
//! nothing changed: no stored mutation, no payout, no event.

use crate::host::Host;
use crate::signer::MoveSigner;
use crate::state::{Game, Timeout};
use alloy_primitives::{Address, U256};
use gamejutsu_primitives::{
    ArbiterError, ArbiterEvent, GameId, GameMove, Rules, SignedGameMove, NUM_PLAYERS,
};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Seconds a stalled player has to respond before [Arbiter::finalize_timeout] may
/// disqualify them.
pub const TIMEOUT_DURATION: u64 = 300;

/// The bond posted with [Arbiter::init_timeout], in wei (0.1 ether).
pub const DEFAULT_TIMEOUT_STAKE: U256 = U256::from_limbs([100_000_000_000_000_000, 0, 0, 0]);

/// The [Arbiter] holds every game's durable record and adjudicates the protocol:
/// propose → accept → play (off chain) → finish, dispute, resign, or time out.
///
/// Game positions stay opaque: the [Rules] module attached at proposal time is the
/// only component that interprets them. The host environment (clock, custody
/// ledger, event transport) is injected through the [Host] seam.
#[derive(Debug)]
pub struct Arbiter<H: Host> {
    host: H,
    signer: MoveSigner,
    games: BTreeMap<GameId, Game>,
    timeouts: BTreeMap<GameId, Timeout>,
    next_game_id: GameId,
}

impl<H: Host> Arbiter<H> {
    /// An arbiter over the production signing domain.
    pub fn new(host: H) -> Self {
        Self::with_signer(host, MoveSigner::new())
    }

    pub fn with_signer(host: H, signer: MoveSigner) -> Self {
        Self {
            host,
            signer,
            games: BTreeMap::new(),
            timeouts: BTreeMap::new(),
            next_game_id: 0,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn signer(&self) -> &MoveSigner {
        &self.signer
    }

    pub fn game(&self, game_id: GameId) -> Option<&Game> {
        self.games.get(&game_id)
    }

    /// The active timeout for `game_id`, if one is running.
    pub fn timeout(&self, game_id: GameId) -> Option<&Timeout> {
        self.timeouts.get(&game_id)
    }

    /// Opens a new game. The caller becomes player 0, `value` is escrowed as the
    /// stake the acceptor must match, and any `session_keys` are aliased to the
    /// proposer's slot.
    pub fn propose_game(
        &mut self,
        proposer: Address,
        value: U256,
        rules: Arc<dyn Rules>,
        session_keys: &[Address],
    ) -> Result<GameId, ArbiterError> {
        let game_id = self.next_game_id;
        let mut game = Game::propose(rules, proposer, value);
        for key in session_keys {
            game.members.entry(*key).or_insert(0);
        }
        self.next_game_id += 1;
        self.games.insert(game_id, game);

        tracing::info!(target: "arbiter", game_id, %proposer, "game proposed");
        self.host.emit(ArbiterEvent::GameProposed {
            game_id,
            stake: value,
            proposer,
        });
        Ok(game_id)
    }

    /// Joins a proposed game as player 1, matching (or exceeding) the proposer's
    /// stake. The full value joins the escrow and play begins.
    pub fn accept_game(
        &mut self,
        caller: Address,
        value: U256,
        game_id: GameId,
        session_keys: &[Address],
    ) -> Result<(), ArbiterError> {
        let game = self
            .games
            .get_mut(&game_id)
            .ok_or(ArbiterError::WrongLifecycleState)?;
        if game.started {
            return Err(ArbiterError::WrongLifecycleState);
        }
        // The proposer (or one of their session keys) cannot accept their own game.
        if game.members.contains_key(&caller) {
            return Err(ArbiterError::NotAMember);
        }
        if value < game.stake {
            return Err(ArbiterError::StakeMismatch);
        }

        game.stake += value;
        game.players[1] = caller;
        game.members.insert(caller, 1);
        for key in session_keys {
            game.members.entry(*key).or_insert(1);
        }
        game.started = true;
        let stake = game.stake;
        let players = game.players;

        tracing::info!(target: "arbiter", game_id, acceptor = %caller, "game started");
        self.host.emit(ArbiterEvent::GameStarted {
            game_id,
            stake,
            players,
        });
        Ok(())
    }

    /// Aliases `session_addr` to the calling member's player slot. Signatures from
    /// the session key are accepted interchangeably with the primary address from
    /// then on. An address already registered to the opponent cannot be re-aliased.
    pub fn register_session_address(
        &mut self,
        caller: Address,
        game_id: GameId,
        session_addr: Address,
    ) -> Result<(), ArbiterError> {
        let game = self.started_game(game_id)?;
        let index = game.member_index(&caller).ok_or(ArbiterError::NotAMember)?;
        if matches!(game.member_index(&session_addr), Some(existing) if existing != index) {
            return Err(ArbiterError::NotAMember);
        }
        let player = game.players[index];

        self.games
            .get_mut(&game_id)
            .ok_or(ArbiterError::WrongLifecycleState)?
            .members
            .insert(session_addr, index);

        tracing::debug!(target: "arbiter", game_id, %session_addr, "session address registered");
        self.host.emit(ArbiterEvent::SessionAddressRegistered {
            game_id,
            player,
            session_addr,
        });
        Ok(())
    }

    /// Concedes the game: the caller's opponent wins the escrow.
    pub fn resign(&mut self, caller: Address, game_id: GameId) -> Result<(), ArbiterError> {
        let game = self.started_game(game_id)?;
        let index = game.member_index(&caller).ok_or(ArbiterError::NotAMember)?;
        let resigned = game.players[index];
        let winner_index = game.opponent_of(index);

        tracing::info!(target: "arbiter", game_id, player = %resigned, "player resigned");
        self.host.emit(ArbiterEvent::PlayerResigned {
            game_id,
            player: resigned,
        });
        self.conclude(game_id, Some(winner_index), U256::ZERO)
    }

    /// Adjudicates a cheating claim: a mover-signed move the rules module rejects
    /// disqualifies its signer, and the opponent wins the escrow.
    ///
    /// Fails with [ArbiterError::IllegalMove] when the move is actually legal:
    /// a legal move cannot be disputed.
    pub fn dispute_move(&mut self, signed_move: &SignedGameMove) -> Result<(), ArbiterError> {
        let game_move = &signed_move.game_move;
        let game_id = game_move.game_id;
        let game = self.started_game(game_id)?;
        let cheater_index = game
            .member_index(&game_move.player)
            .ok_or(ArbiterError::NotAMember)?;

        let sig = signed_move
            .signatures
            .first()
            .ok_or(ArbiterError::BadSignature)?;
        if self.signer.recover(game_move, sig)? != game_move.player {
            return Err(ArbiterError::BadSignature);
        }
        if game
            .rules
            .is_valid_move(&game_move.old_game_state(), cheater_index as u8, &game_move.mv)?
        {
            return Err(ArbiterError::IllegalMove);
        }

        let cheater = game.players[cheater_index];
        let winner_index = game.opponent_of(cheater_index);

        tracing::info!(target: "arbiter", game_id, player = %cheater, "player disqualified by dispute");
        self.host.emit(ArbiterEvent::PlayerDisqualified {
            game_id,
            player: cheater,
        });
        self.conclude(game_id, Some(winner_index), U256::ZERO)
    }

    /// Concludes a game from a checkpoint: a co-signed move both players agreed on,
    /// followed by a mover-signed move into a terminal position. The winner (or a
    /// draw split) follows the rules module's verdict on the final position.
    pub fn finish_game(&mut self, signed_moves: &[SignedGameMove; 2]) -> Result<(), ArbiterError> {
        let last = &signed_moves[1].game_move;
        let game_id = signed_moves[0].game_move.game_id;
        let game = self.started_game(game_id)?;
        self.verify_move_pair(game, signed_moves)?;

        let final_state = last.new_game_state();
        if !game.rules.is_final(&final_state)? {
            return Err(ArbiterError::NotFinal);
        }
        let winner_index = if game.rules.is_win(&final_state, 0)? {
            Some(0)
        } else if game.rules.is_win(&final_state, 1)? {
            Some(1)
        } else {
            None
        };

        tracing::info!(target: "arbiter", game_id, nonce = last.nonce + 1, "game finished");
        self.conclude(game_id, winner_index, U256::ZERO)
    }

    /// Starts the forced-move timer against the player expected to answer
    /// `signed_moves[1]`. The caller posts [DEFAULT_TIMEOUT_STAKE] as a bond,
    /// returned if the timer is resolved in time and forfeited to the winner if
    /// the stall is finalized.
    pub fn init_timeout(
        &mut self,
        caller: Address,
        value: U256,
        signed_moves: &[SignedGameMove; 2],
    ) -> Result<(), ArbiterError> {
        if value != DEFAULT_TIMEOUT_STAKE {
            return Err(ArbiterError::StakeMismatch);
        }
        let last = &signed_moves[1].game_move;
        let game_id = signed_moves[0].game_move.game_id;
        let game = self.started_game(game_id)?;
        if game.member_index(&caller).is_none() {
            return Err(ArbiterError::NotAMember);
        }
        if self.timeouts.contains_key(&game_id) {
            return Err(ArbiterError::TimeoutConflict);
        }
        self.verify_move_pair(game, signed_moves)?;

        let mover_index = game
            .member_index(&last.player)
            .ok_or(ArbiterError::NotAMember)?;
        let responder = game.players[game.opponent_of(mover_index)];
        let expected_nonce = last.nonce + 1;
        let now = self.host.now();
        let pending_move = last.clone();

        self.timeouts.insert(
            game_id,
            Timeout {
                start_time: now,
                stake: value,
                pending_move,
                initiator: caller,
            },
        );

        tracing::info!(target: "arbiter", game_id, player = %responder, "timeout started");
        self.host.emit(ArbiterEvent::TimeoutStarted {
            game_id,
            player: responder,
            nonce: expected_nonce,
            expires_at: now + TIMEOUT_DURATION,
        });
        Ok(())
    }

    /// Clears a running timeout by supplying the demanded move: signed by the
    /// player the timer runs against, chained onto the pending move, and legal.
    /// The initiator's bond is returned.
    pub fn resolve_timeout(&mut self, signed_move: &SignedGameMove) -> Result<(), ArbiterError> {
        let game_move = &signed_move.game_move;
        let game_id = game_move.game_id;
        let timeout = self
            .timeouts
            .get(&game_id)
            .ok_or(ArbiterError::TimeoutConflict)?;
        if self.host.now() > timeout.start_time + TIMEOUT_DURATION {
            return Err(ArbiterError::TimeoutConflict);
        }

        let pending = &timeout.pending_move;
        if game_move.nonce != pending.nonce + 1 || game_move.old_state != pending.new_state {
            return Err(ArbiterError::ChainBroken);
        }
        let game = self.started_game(game_id)?;
        let pending_index = game
            .member_index(&pending.player)
            .ok_or(ArbiterError::NotAMember)?;
        let mover_index = game
            .member_index(&game_move.player)
            .ok_or(ArbiterError::NotAMember)?;
        if mover_index != game.opponent_of(pending_index) {
            return Err(ArbiterError::ChainBroken);
        }
        self.require_mover_signed(signed_move)?;
        self.require_valid_game_move(game, game_move)?;

        let initiator = timeout.initiator;
        let bond = timeout.stake;
        self.timeouts.remove(&game_id);
        self.host.credit(initiator, bond);

        tracing::info!(target: "arbiter", game_id, nonce = game_move.nonce, "timeout resolved");
        Ok(())
    }

    /// Disqualifies the player who let the timer expire. Their opponent (the
    /// pending move's side) wins the escrow plus the bond.
    pub fn finalize_timeout(&mut self, game_id: GameId) -> Result<(), ArbiterError> {
        let timeout = self
            .timeouts
            .get(&game_id)
            .ok_or(ArbiterError::TimeoutConflict)?;
        if self.host.now() <= timeout.start_time + TIMEOUT_DURATION {
            return Err(ArbiterError::TimeoutConflict);
        }
        let game = self.started_game(game_id)?;
        let pending_index = game
            .member_index(&timeout.pending_move.player)
            .ok_or(ArbiterError::NotAMember)?;
        let stalled_index = game.opponent_of(pending_index);
        let stalled = game.players[stalled_index];
        let bond = timeout.stake;

        self.timeouts.remove(&game_id);

        tracing::info!(target: "arbiter", game_id, player = %stalled, "player disqualified by timeout");
        self.host.emit(ArbiterEvent::PlayerDisqualified {
            game_id,
            player: stalled,
        });
        self.conclude(game_id, Some(pending_index), bond)
    }

    /// The game in the `Started` lifecycle state, or [ArbiterError::WrongLifecycleState].
    fn started_game(&self, game_id: GameId) -> Result<&Game, ArbiterError> {
        let game = self
            .games
            .get(&game_id)
            .ok_or(ArbiterError::WrongLifecycleState)?;
        if !game.started || game.finished {
            return Err(ArbiterError::WrongLifecycleState);
        }
        Ok(game)
    }

    /// The chaining contract on a `[checkpoint, successor]` pair: same game, the
    /// checkpoint co-signed by both players, the successor mover-signed, nonces
    /// consecutive, states linked byte-exactly, and both moves valid transitions.
    fn verify_move_pair(
        &self,
        game: &Game,
        signed_moves: &[SignedGameMove; 2],
    ) -> Result<(), ArbiterError> {
        let first = &signed_moves[0].game_move;
        let last = &signed_moves[1].game_move;
        if first.game_id != last.game_id {
            return Err(ArbiterError::ChainBroken);
        }
        self.require_cosigned(game, &signed_moves[0])?;
        self.require_mover_signed(&signed_moves[1])?;
        if last.nonce != first.nonce + 1 || first.new_state != last.old_state {
            return Err(ArbiterError::ChainBroken);
        }
        self.require_valid_game_move(game, first)?;
        self.require_valid_game_move(game, last)?;
        Ok(())
    }

    /// Requires signatures covering both player slots (primaries or session keys).
    fn require_cosigned(&self, game: &Game, signed: &SignedGameMove) -> Result<(), ArbiterError> {
        let mut covered = [false; NUM_PLAYERS];
        for sig in &signed.signatures {
            let recovered = self.signer.recover(&signed.game_move, sig)?;
            let index = game
                .member_index(&recovered)
                .ok_or(ArbiterError::NotAMember)?;
            covered[index] = true;
        }
        if covered.iter().all(|&c| c) {
            Ok(())
        } else {
            Err(ArbiterError::BadSignature)
        }
    }

    /// Requires signature 0 (the mover's slot by convention) to recover to the
    /// move's claimed player.
    fn require_mover_signed(&self, signed: &SignedGameMove) -> Result<(), ArbiterError> {
        let sig = signed
            .signatures
            .first()
            .ok_or(ArbiterError::BadSignature)?;
        if self.signer.recover(&signed.game_move, sig)? == signed.game_move.player {
            Ok(())
        } else {
            Err(ArbiterError::BadSignature)
        }
    }

    /// A single move's transition validity: states differ, the mover is a member,
    /// the rules module accepts the move, and the asserted successor matches the
    /// rules module's transition byte-exactly.
    fn require_valid_game_move(
        &self,
        game: &Game,
        game_move: &GameMove,
    ) -> Result<(), ArbiterError> {
        if game_move.old_state == game_move.new_state {
            return Err(ArbiterError::IllegalMove);
        }
        let index = game
            .member_index(&game_move.player)
            .ok_or(ArbiterError::NotAMember)? as u8;
        if !game
            .rules
            .is_valid_move(&game_move.old_game_state(), index, &game_move.mv)?
        {
            return Err(ArbiterError::IllegalMove);
        }
        let next = game
            .rules
            .transition(&game_move.old_game_state(), index, &game_move.mv)?;
        if next.state != game_move.new_state {
            return Err(ArbiterError::IllegalMove);
        }
        Ok(())
    }

    /// Marks the game finished and disburses the whole pot: escrow plus `bond` to
    /// the winner, or the dust-free split on a draw. A still-running timeout's
    /// bond goes back to its initiator, since the game ending through another
    /// path is not the initiator's fault.
    fn conclude(
        &mut self,
        game_id: GameId,
        winner_index: Option<usize>,
        bond: U256,
    ) -> Result<(), ArbiterError> {
        if let Some(timeout) = self.timeouts.remove(&game_id) {
            self.host.credit(timeout.initiator, timeout.stake);
        }
        let game = self
            .games
            .get_mut(&game_id)
            .ok_or(ArbiterError::WrongLifecycleState)?;
        game.finished = true;
        let stake = game.stake;
        let players = game.players;

        match winner_index {
            Some(w) => {
                let winner = players[w];
                let loser = players[1 - w];
                self.host.credit(winner, stake + bond);
                self.host.emit(ArbiterEvent::GameFinished {
                    game_id,
                    winner,
                    loser,
                    is_draw: false,
                });
            }
            None => {
                let half = stake / U256::from(2);
                self.host.credit(players[0], half);
                self.host.credit(players[1], stake - half);
                self.host.emit(ArbiterEvent::GameFinished {
                    game_id,
                    winner: players[0],
                    loser: players[1],
                    is_draw: true,
                });
            }
        }
        Ok(())
    }
}
