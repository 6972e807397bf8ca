//! Precomputed diagonal-adjacency tables over the 32-square numbering.
//!
//! Each table holds two slots per square: entries `[2i]` and `[2i + 1]` are the
//! 1-based destination squares reachable from square `i + 1`, slot 0 being the
//! lower-column diagonal and slot 1 the higher-column diagonal. `0` marks a
//! destination off the edge of the board.
//!
//! The square captured by a jump is table-derived, never an arithmetic midpoint:
//! a jump matched in [JUMPS] at `(i, slot)` passes over `MOVES[2 * i + slot]`, and a
//! jump matched in [RJUMP] passes over `RMOVS[2 * i + slot]`. The numbering's
//! diagonal geometry is non-linear across row boundaries, so `(from + to) / 2` is
//! wrong near the edges.

/// Non-capturing move targets in the white direction (toward square 32).
pub const MOVES: [u8; 64] = [
    5, 6, 6, 7, 7, 8, 8, 0, // squares 1..4
    0, 9, 9, 10, 10, 11, 11, 12, // squares 5..8
    13, 14, 14, 15, 15, 16, 16, 0, // squares 9..12
    0, 17, 17, 18, 18, 19, 19, 20, // squares 13..16
    21, 22, 22, 23, 23, 24, 24, 0, // squares 17..20
    0, 25, 25, 26, 26, 27, 27, 28, // squares 21..24
    29, 30, 30, 31, 31, 32, 32, 0, // squares 25..28
    0, 0, 0, 0, 0, 0, 0, 0, // squares 29..32
];

/// Non-capturing move targets in the red direction (toward square 1).
pub const RMOVS: [u8; 64] = [
    0, 0, 0, 0, 0, 0, 0, 0, // squares 1..4
    0, 1, 1, 2, 2, 3, 3, 4, // squares 5..8
    5, 6, 6, 7, 7, 8, 8, 0, // squares 9..12
    0, 9, 9, 10, 10, 11, 11, 12, // squares 13..16
    13, 14, 14, 15, 15, 16, 16, 0, // squares 17..20
    0, 17, 17, 18, 18, 19, 19, 20, // squares 21..24
    21, 22, 22, 23, 23, 24, 24, 0, // squares 25..28
    0, 25, 25, 26, 26, 27, 27, 28, // squares 29..32
];

/// Jump landing squares in the white direction.
pub const JUMPS: [u8; 64] = [
    0, 10, 9, 11, 10, 12, 11, 0, // squares 1..4
    0, 14, 13, 15, 14, 16, 15, 0, // squares 5..8
    0, 18, 17, 19, 18, 20, 19, 0, // squares 9..12
    0, 22, 21, 23, 22, 24, 23, 0, // squares 13..16
    0, 26, 25, 27, 26, 28, 27, 0, // squares 17..20
    0, 30, 29, 31, 30, 32, 31, 0, // squares 21..24
    0, 0, 0, 0, 0, 0, 0, 0, // squares 25..28
    0, 0, 0, 0, 0, 0, 0, 0, // squares 29..32
];

/// Jump landing squares in the red direction.
pub const RJUMP: [u8; 64] = [
    0, 0, 0, 0, 0, 0, 0, 0, // squares 1..4
    0, 0, 0, 0, 0, 0, 0, 0, // squares 5..8
    0, 2, 1, 3, 2, 4, 3, 0, // squares 9..12
    0, 6, 5, 7, 6, 8, 7, 0, // squares 13..16
    0, 10, 9, 11, 10, 12, 11, 0, // squares 17..20
    0, 14, 13, 15, 14, 16, 15, 0, // squares 21..24
    0, 18, 17, 19, 18, 20, 19, 0, // squares 25..28
    0, 22, 21, 23, 22, 24, 23, 0, // squares 29..32
];

#[cfg(test)]
mod test {
    use super::*;

    /// Board coordinates of square `s`: `(row, column)` on the 8×8 board, 0-based.
    fn coords(s: u8) -> (i32, i32) {
        let i = (s - 1) as i32;
        let row = i / 4;
        let k = i % 4;
        let col = if row % 2 == 0 { 2 * k + 1 } else { 2 * k };
        (row, col)
    }

    fn square_at(row: i32, col: i32) -> u8 {
        if !(0..8).contains(&row) || !(0..8).contains(&col) || (row + col) % 2 == 0 {
            return 0;
        }
        let k = if row % 2 == 0 { (col - 1) / 2 } else { col / 2 };
        (row * 4 + k + 1) as u8
    }

    fn check_table(table: &[u8; 64], row_step: i32, col_step: i32) {
        for i in 0..32 {
            let (row, col) = coords(i + 1);
            for slot in 0..2 {
                let lateral = if slot == 0 { -col_step } else { col_step };
                let expected = square_at(row + row_step, col + lateral);
                assert_eq!(
                    table[2 * i as usize + slot],
                    expected,
                    "square {} slot {}",
                    i + 1,
                    slot
                );
            }
        }
    }

    #[test]
    fn move_tables_match_board_geometry() {
        check_table(&MOVES, 1, 1);
        check_table(&RMOVS, -1, 1);
    }

    #[test]
    fn jump_tables_match_board_geometry() {
        check_table(&JUMPS, 2, 2);
        check_table(&RJUMP, -2, 2);
    }

    #[test]
    fn jump_implies_intervening_move_square() {
        // Every on-board jump landing has an on-board square being jumped over in
        // the same slot of the same-direction move table.
        for i in 0..32 {
            for slot in 0..2 {
                if JUMPS[2 * i + slot] != 0 {
                    assert_ne!(MOVES[2 * i + slot], 0, "square {} slot {}", i + 1, slot);
                }
                if RJUMP[2 * i + slot] != 0 {
                    assert_ne!(RMOVS[2 * i + slot], 0, "square {} slot {}", i + 1, slot);
                }
            }
        }
    }

    #[test]
    fn known_rows() {
        assert_eq!(&MOVES[16..18], &[13, 14]);
        assert_eq!(&MOVES[48..50], &[29, 30]);
        assert_eq!(&RMOVS[34..36], &[14, 15]);
        assert_eq!(&JUMPS[16..18], &[0, 18]);
        assert_eq!(&RJUMP[34..36], &[9, 11]);
    }
}
