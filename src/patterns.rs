//! 3x3 shape matching for the "Pattern" tactical rule.
//!
//! Each source pattern is a 3x3 grid around an empty centre point:
//! - X: a stone of one colour
//! - O: a stone of the other colour
//! - .: empty
//! - x: not X (O, . or #)
//! - o: not O (X, . or #)
//! - ?: anything
//! - #: off the board
//!
//! The set is expanded over all rotations, reflections and colour swaps, so
//! matching does not depend on whose turn it is.
//!
//! The expanded set is a 65536-bit table indexed by a 16-bit encoding of the
//! eight neighbours (`env8`).

use std::sync::OnceLock;

use crate::board::{Board, Cell, Color, Point};

const PAT3_SRC: &[&[u8; 9]] = &[
    // hane: enclosing hane
    b"XOX...???",
    // hane: non-cutting hane
    b"XO....?.?",
    // hane: magari
    b"XO?X..x.?",
    // katatsuke or diagonal attachment
    b".O.X.....",
    // cut: unprotected
    b"XO?O.o?o?",
    // cut: peeped
    b"XO?O.X???",
    // cut: de
    b"?X?O.Oooo",
    // cut: keima
    b"OX?o.O???",
    // side: chase
    b"X.?O.?##?",
    // side: block side cut
    b"OX?X.O###",
    // side: block side connection
    b"?X?x.O###",
    // side: sagari
    b"?XOx.x###",
    // side: cut
    b"?OXX.O###",
];

const PAT3_BYTES: usize = 8192;

static PAT3SET: OnceLock<[u8; PAT3_BYTES]> = OnceLock::new();

/// Check if the neighbourhood of `pt` matches any 3x3 pattern.
pub fn pat3_match(board: &Board, pt: Point) -> bool {
    let pat3set = PAT3SET.get_or_init(make_pat3set);
    let env8 = board_env8(board, pt);
    (pat3set[(env8 >> 3) as usize] & (1 << (env8 & 7))) != 0
}

/// Encode the eight neighbours of `pt` in the same layout as [`compute_code`].
fn board_env8(board: &Board, pt: Point) -> u16 {
    let symbol = |p: Point| match board.cell(p) {
        Cell::Stone(Color::White) => b'O',
        Cell::Stone(Color::Black) => b'X',
        Cell::Empty => b'.',
        Cell::Border => b'#',
    };
    let [s, w, e, n] = board.neighbors(pt);
    let [sw, se, nw, ne] = board.diagonal_neighbors(pt);
    // Row-major grid, north on top
    let grid = [
        symbol(nw),
        symbol(n),
        symbol(ne),
        symbol(w),
        b'.',
        symbol(e),
        symbol(sw),
        symbol(s),
        symbol(se),
    ];
    compute_code(&grid)
}

/// Build the 3x3 pattern lookup table.
fn make_pat3set() -> [u8; PAT3_BYTES] {
    let mut pat3set = [0u8; PAT3_BYTES];
    for &src in PAT3_SRC {
        pat_enumerate(*src, &mut pat3set);
    }
    pat3set
}

/// Add every rotation, reflection and colour swap of a pattern.
fn pat_enumerate(src: [u8; 9], pat3set: &mut [u8; PAT3_BYTES]) {
    for rotated in [src, rot90(src)] {
        for vflipped in [rotated, vertflip(rotated)] {
            for hflipped in [vflipped, horizflip(vflipped)] {
                pat_wildexp(hflipped, 0, pat3set);
                pat_wildexp(swapcolor(hflipped), 0, pat3set);
            }
        }
    }
}

/// Expand wildcards and set the bit of every concrete pattern.
fn pat_wildexp(src: [u8; 9], i: usize, pat3set: &mut [u8; PAT3_BYTES]) {
    if i == 9 {
        let env8 = compute_code(&src);
        pat3set[(env8 >> 3) as usize] |= 1 << (env8 & 7);
        return;
    }

    let choices: &[u8] = match src[i] {
        b'?' => b"XO.#",
        b'x' => b"O.#",
        b'o' => b"X.#",
        _ => return pat_wildexp(src, i + 1, pat3set),
    };
    for &c in choices {
        let mut expanded = src;
        expanded[i] = c;
        pat_wildexp(expanded, i + 1, pat3set);
    }
}

/// Compute the 16-bit env8 code from a 3x3 grid.
///
/// ```text
/// 0 1 2     bits: 7 0 4
/// 3 4 5  ->       3 . 1
/// 6 7 8           6 2 5
/// ```
///
/// Low byte = orthogonal neighbours, high byte = diagonal neighbours.
fn compute_code(src: &[u8; 9]) -> u16 {
    code(src[1], 0)
        | code(src[5], 1)
        | code(src[7], 2)
        | code(src[3], 3)
        | code(src[2], 0) << 8
        | code(src[8], 1) << 8
        | code(src[6], 2) << 8
        | code(src[0], 3) << 8
}

/// Encode one neighbour (O=0, X=1, .=2, #=3) as two bits at `p` and `p + 4`.
fn code(symbol: u8, p: u8) -> u16 {
    let c: u16 = match symbol {
        b'X' => 1,
        b'.' => 2,
        b'#' => 3,
        _ => 0,
    };
    (((c >> 1) & 1) << 4 | (c & 1)) << p
}

fn swapcolor(mut src: [u8; 9]) -> [u8; 9] {
    for c in src.iter_mut() {
        *c = match *c {
            b'X' => b'O',
            b'O' => b'X',
            b'x' => b'o',
            b'o' => b'x',
            other => other,
        };
    }
    src
}

fn horizflip(mut src: [u8; 9]) -> [u8; 9] {
    src.swap(0, 6);
    src.swap(1, 7);
    src.swap(2, 8);
    src
}

fn vertflip(mut src: [u8; 9]) -> [u8; 9] {
    src.swap(0, 2);
    src.swap(3, 5);
    src.swap(6, 8);
    src
}

fn rot90(src: [u8; 9]) -> [u8; 9] {
    [
        src[2], src[5], src[8], src[1], src[4], src[7], src[0], src[3], src[6],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Move;

    fn place(board: &mut Board, color: Color, vertices: &[&str]) {
        for v in vertices {
            let mv = board.parse_move(v).unwrap();
            board.play(mv, color).unwrap();
        }
    }

    fn is_set(pat3set: &[u8; PAT3_BYTES], src: &[u8; 9]) -> bool {
        let env8 = compute_code(src);
        pat3set[(env8 >> 3) as usize] & (1 << (env8 & 7)) != 0
    }

    #[test]
    fn test_make_pat3set() {
        let pat3set = make_pat3set();
        let count: usize = pat3set.iter().map(|b| b.count_ones() as usize).sum();
        assert!(count > 1000, "Expected many pattern matches, got {}", count);
    }

    #[test]
    fn test_compute_code_empty() {
        // All EMPTY (2) sets the high bit of every 2-bit code
        assert_eq!(compute_code(b"........."), 0xF0F0);
    }

    #[test]
    fn test_rot90_cycles() {
        let src = *b"XO?X..x.?";
        let back = rot90(rot90(rot90(rot90(src))));
        assert_eq!(back, src);
        assert_ne!(rot90(src), src);
    }

    #[test]
    fn test_table_is_symmetric() {
        let pat3set = make_pat3set();
        // Enclosing hane and its colour-swapped, rotated forms
        assert!(is_set(&pat3set, b"XOX......"));
        assert!(is_set(&pat3set, b"OXO......"));
        assert!(is_set(&pat3set, b"X..O..X.."));
        assert!(!is_set(&pat3set, b"........."));
    }

    #[test]
    fn test_pat3_match_cut() {
        // Black C5, E5 with White D6: D5 matches the "de" cut shape
        let mut board = Board::new(7).unwrap();
        place(&mut board, Color::Black, &["C5", "E5"]);
        place(&mut board, Color::White, &["D6"]);
        let d5 = board.parse_move("D5").unwrap();
        let Move::Play(d5) = d5 else { unreachable!() };
        assert!(pat3_match(&board, d5));
    }

    #[test]
    fn test_empty_board_has_no_match() {
        let board = Board::new(7).unwrap();
        assert!(board.points().all(|pt| !pat3_match(&board, pt)));
    }
}
