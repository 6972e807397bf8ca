//! The packed checkers position and move types, plus their canonical encodings.

use alloy_primitives::Bytes;
use alloy_sol_types::{sol, SolType};
use gamejutsu_primitives::ArbiterError;

/// An unoccupied square.
pub const EMPTY: u8 = 0x00;
/// A white man.
pub const WHITE_MAN: u8 = 0x01;
/// A red man.
pub const RED_MAN: u8 = 0x02;
/// A promoted white piece.
pub const WHITE_KING: u8 = 0xA1;
/// A promoted red piece.
pub const RED_KING: u8 = 0xA2;

/// OR-ed onto a man when it reaches the opponent's back rank.
pub(crate) const KING_FLAG: u8 = 0xA0;

/// White colour code; also the winner code for a white victory.
pub(crate) const WHITE: u8 = 0x01;
/// Red colour code; also the winner code for a red victory.
pub(crate) const RED: u8 = 0x02;

type StateConstruction = sol! { tuple(uint8[32], bool, uint8) };
type MoveConstruction = sol! { tuple(uint8, uint8, bool, bool) };

/// The colour of a piece code, `0` for an empty square.
#[inline]
pub(crate) fn color(piece: u8) -> u8 {
    piece & 0x0F
}

/// Whether a piece code carries the king flag.
#[inline]
pub(crate) fn is_king(piece: u8) -> bool {
    piece & 0xF0 == KING_FLAG
}

/// The [State] struct is a checkers position: one piece code per dark square in
/// reading order from white's far side, the side to move, and the winner flag.
///
/// White occupies squares 1..12 at the start and moves toward 32; red occupies
/// 21..32 and moves toward 1. `winner` is `0` while play continues, `1` for a white
/// win, `2` for a red win.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct State {
    pub cells: [u8; 32],
    pub red_moves: bool,
    pub winner: u8,
}

impl State {
    /// The canonical starting position. White moves first.
    pub fn initial() -> Self {
        let mut cells = [EMPTY; 32];
        cells[..12].fill(WHITE_MAN);
        cells[20..].fill(RED_MAN);
        Self {
            cells,
            red_moves: false,
            winner: 0,
        }
    }

    /// ABI-encodes the position as `(uint8[32] cells, bool redMoves, uint8 winner)`:
    /// 34 words, every cell padded to its own word.
    pub fn encode(&self) -> Bytes {
        StateConstruction::abi_encode(&(self.cells, self.red_moves, self.winner)).into()
    }

    /// Decodes a position previously produced by [State::encode], rejecting unknown
    /// piece codes and winner tags.
    pub fn decode(data: &[u8]) -> Result<Self, ArbiterError> {
        let (cells, red_moves, winner) = StateConstruction::abi_decode(data, true)
            .map_err(|_| ArbiterError::MalformedPayload)?;
        if winner > 2 {
            return Err(ArbiterError::MalformedPayload);
        }
        for cell in cells {
            if !matches!(cell, EMPTY | WHITE_MAN | RED_MAN | WHITE_KING | RED_KING) {
                return Err(ArbiterError::MalformedPayload);
            }
        }
        Ok(Self {
            cells,
            red_moves,
            winner,
        })
    }
}

/// The [Move] struct names a source and destination square (1-based), whether the
/// move is a jump, and whether the mover declares the turn passed to the opponent.
///
/// Multi-capture chains are the mover's responsibility to declare: after a jump that
/// leaves another jump open to the same piece, `pass_to_opponent` must be `false`
/// and the mover keeps the turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub from: u8,
    pub to: u8,
    pub is_jump: bool,
    pub pass_to_opponent: bool,
}

impl Move {
    /// ABI-encodes the move as `(uint8 from, uint8 to, bool isJump, bool passMoveToOpponent)`.
    pub fn encode(&self) -> Bytes {
        MoveConstruction::abi_encode(&(self.from, self.to, self.is_jump, self.pass_to_opponent))
            .into()
    }

    /// Decodes a move previously produced by [Move::encode]. Square ranges are a
    /// legality question, not a decoding one; out-of-range squares decode fine and
    /// fail validation instead.
    pub fn decode(data: &[u8]) -> Result<Self, ArbiterError> {
        let (from, to, is_jump, pass_to_opponent) = MoveConstruction::abi_decode(data, true)
            .map_err(|_| ArbiterError::MalformedPayload)?;
        Ok(Self {
            from,
            to,
            is_jump,
            pass_to_opponent,
        })
    }
}
