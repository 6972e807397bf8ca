//! Move validation, transition, and end-of-game detection for the checkers rules
//! module.

use crate::state::{color, is_king, Move, State, EMPTY, KING_FLAG, RED, WHITE};
use crate::tables::{JUMPS, MOVES, RJUMP, RMOVS};
use alloy_primitives::Bytes;
use gamejutsu_primitives::{ArbiterError, GameState, Rules};

/// A travel direction on the board: white men head toward square 32, red men toward
/// square 1, kings both ways.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dir {
    White,
    Red,
}

impl Dir {
    fn moves(self) -> &'static [u8; 64] {
        match self {
            Dir::White => &MOVES,
            Dir::Red => &RMOVS,
        }
    }

    fn jumps(self) -> &'static [u8; 64] {
        match self {
            Dir::White => &JUMPS,
            Dir::Red => &RJUMP,
        }
    }
}

/// The directions a piece may travel: its own colour's, plus the reverse for a king.
fn headings(piece: u8) -> &'static [Dir] {
    if is_king(piece) {
        &[Dir::White, Dir::Red]
    } else if color(piece) == RED {
        &[Dir::Red]
    } else {
        &[Dir::White]
    }
}

/// Whether the piece on 0-based square `i` has a non-capturing move.
fn can_move(cells: &[u8; 32], i: usize) -> bool {
    let piece = cells[i];
    if piece == EMPTY {
        return false;
    }
    headings(piece).iter().any(|dir| {
        (0..2).any(|slot| {
            let to = dir.moves()[2 * i + slot];
            to != 0 && cells[to as usize - 1] == EMPTY
        })
    })
}

/// Whether the piece on 0-based square `i` has a capturing jump.
fn can_jump(cells: &[u8; 32], i: usize) -> bool {
    let piece = cells[i];
    if piece == EMPTY {
        return false;
    }
    headings(piece).iter().any(|dir| {
        (0..2).any(|slot| {
            let landing = dir.jumps()[2 * i + slot];
            let over = dir.moves()[2 * i + slot];
            landing != 0
                && cells[landing as usize - 1] == EMPTY
                && over != 0
                && cells[over as usize - 1] != EMPTY
                && color(cells[over as usize - 1]) != color(piece)
        })
    })
}

/// The square a jump from 0-based `from` to 1-based `to` passes over, if some jump
/// table `piece` may use admits the landing.
///
/// The capture is read out of the same-direction move table at the slot that matched
/// the jump; validation and transition both come through here, so they can never
/// disagree about which piece a jump removes.
fn capture_square(piece: u8, from: usize, to: u8) -> Option<u8> {
    for dir in headings(piece) {
        for slot in 0..2 {
            if dir.jumps()[2 * from + slot] == to {
                let over = dir.moves()[2 * from + slot];
                if over != 0 {
                    return Some(over);
                }
            }
        }
    }
    None
}

/// Whether some move table `piece` may use takes 0-based `from` to 1-based `to`.
fn move_target_allowed(piece: u8, from: usize, to: u8) -> bool {
    headings(piece)
        .iter()
        .any(|dir| (0..2).any(|slot| dir.moves()[2 * from + slot] == to))
}

/// A man landing on the opponent's back rank becomes a king. Kings stay kings.
fn promote(piece: u8, to: u8) -> u8 {
    let back_rank = if color(piece) == RED {
        (1..=4).contains(&to)
    } else {
        (29..=32).contains(&to)
    };
    if back_rank {
        piece | KING_FLAG
    } else {
        piece
    }
}

/// Applies a validated move to the board: relocation, promotion, capture removal.
/// Shared by the continuation check in [validate] and by [transition_state].
fn apply(cells: &[u8; 32], mv: &Move) -> [u8; 32] {
    let mut next = *cells;
    let piece = next[mv.from as usize - 1];
    next[mv.from as usize - 1] = EMPTY;
    next[mv.to as usize - 1] = promote(piece, mv.to);
    if mv.is_jump {
        if let Some(over) = capture_square(piece, mv.from as usize - 1, mv.to) {
            next[over as usize - 1] = EMPTY;
        }
    }
    next
}

fn validate(state: &State, player_id: u8, mv: &Move) -> bool {
    // Terminal positions admit no further play.
    if state.winner != 0 {
        return false;
    }
    if !(1..=32).contains(&mv.from) || !(1..=32).contains(&mv.to) {
        return false;
    }
    if (player_id == 1) != state.red_moves {
        return false;
    }
    let from = mv.from as usize - 1;
    let to = mv.to as usize - 1;
    let piece = state.cells[from];
    if piece == EMPTY || state.cells[to] != EMPTY {
        return false;
    }
    let mover_color = if state.red_moves { RED } else { WHITE };
    if color(piece) != mover_color {
        return false;
    }

    if mv.is_jump {
        let Some(over) = capture_square(piece, from, mv.to) else {
            return false;
        };
        let over_piece = state.cells[over as usize - 1];
        if over_piece == EMPTY || color(over_piece) == color(piece) {
            return false;
        }
        // The mover declares continuation: the turn stays theirs exactly when the
        // jumping piece can jump again from its landing square.
        let further = can_jump(&apply(&state.cells, mv), to);
        mv.pass_to_opponent == !further
    } else {
        // Men only ever appear in their own colour's table, so direction falls out
        // of the lookup; kings appear in both.
        move_target_allowed(piece, from, mv.to) && mv.pass_to_opponent
    }
}

fn transition_state(state: &State, mv: &Move) -> State {
    let cells = apply(&state.cells, mv);
    let pass = !mv.is_jump || !can_jump(&cells, mv.to as usize - 1);
    let red_moves = if pass {
        !state.red_moves
    } else {
        state.red_moves
    };

    // The side now to move loses if it has nothing left to play.
    let to_move = if red_moves { RED } else { WHITE };
    let winner = if side_can_act(&cells, to_move) {
        0
    } else if to_move == RED {
        WHITE
    } else {
        RED
    };

    State {
        cells,
        red_moves,
        winner,
    }
}

fn side_can_act(cells: &[u8; 32], side: u8) -> bool {
    (0..32).any(|i| color(cells[i]) == side && (can_move(cells, i) || can_jump(cells, i)))
}

/// The checkers rules module. Stateless: every operation is a pure function of the
/// supplied position and move bytes.
#[derive(Debug, Default, Clone, Copy)]
pub struct CheckersRules;

impl Rules for CheckersRules {
    fn is_valid_move(
        &self,
        state: &GameState,
        player_id: u8,
        mv: &[u8],
    ) -> Result<bool, ArbiterError> {
        let position = State::decode(&state.state)?;
        let mv = Move::decode(mv)?;
        Ok(validate(&position, player_id, &mv))
    }

    fn transition(
        &self,
        state: &GameState,
        _player_id: u8,
        mv: &[u8],
    ) -> Result<GameState, ArbiterError> {
        let position = State::decode(&state.state)?;
        let mv = Move::decode(mv)?;
        if !(1..=32).contains(&mv.from) || !(1..=32).contains(&mv.to) {
            return Err(ArbiterError::IllegalMove);
        }
        let next = transition_state(&position, &mv);
        Ok(GameState::new(state.game_id, state.nonce + 1, next.encode()))
    }

    fn is_final(&self, state: &GameState) -> Result<bool, ArbiterError> {
        Ok(State::decode(&state.state)?.winner != 0)
    }

    fn is_win(&self, state: &GameState, player_id: u8) -> Result<bool, ArbiterError> {
        Ok(State::decode(&state.state)?.winner == player_id + 1)
    }

    fn default_initial_state(&self) -> Bytes {
        State::initial().encode()
    }
}
