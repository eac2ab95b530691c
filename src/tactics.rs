//! Tactical move generation around the last move.
//!
//! The generator answers the opponent's last stone with a small candidate
//! set, trying rules in priority order:
//!
//! 1. capture the last-played stone if it is in atari;
//! 2. save own groups the last move put in atari, by running away or by
//!    capturing an adjacent attacker;
//! 3. play a 3x3 shape next to the last two moves (optional);
//! 4. otherwise, any legal move that does not fill an own eye.

use std::fmt;

use fastrand::Rng;

use crate::board::{Board, Cell, Color, Move, Point};
use crate::patterns::pat3_match;

/// Which rule produced a set of policy moves.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MoveSource {
    /// No last move to react to
    None,
    AtariCapture,
    AtariDefense,
    Pattern,
    Random,
}

impl fmt::Display for MoveSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MoveSource::None => "none",
            MoveSource::AtariCapture => "AtariCapture",
            MoveSource::AtariDefense => "AtariDefense",
            MoveSource::Pattern => "Pattern",
            MoveSource::Random => "Random",
        };
        f.write_str(name)
    }
}

/// Candidate moves together with the rule that produced them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PolicyMoves {
    pub moves: Vec<Point>,
    pub source: MoveSource,
}

/// Switches for the tactical generator.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TacticsConfig {
    /// Try the 3x3 pattern rule before falling back to random moves
    pub use_patterns: bool,
    /// Drop self-atari moves from rule output
    pub filter_self_atari: bool,
}

struct Rule {
    source: MoveSource,
    generate: fn(&Board, Color) -> Vec<Point>,
}

const RULES: [Rule; 3] = [
    Rule {
        source: MoveSource::AtariCapture,
        generate: atari_capture,
    },
    Rule {
        source: MoveSource::AtariDefense,
        generate: atari_defense,
    },
    Rule {
        source: MoveSource::Pattern,
        generate: pattern_moves,
    },
];

/// Generate policy moves for `color` in response to the last move.
///
/// Returns no moves, tagged [`MoveSource::None`], when there is no last move
/// (start of game, or the opponent passed).
pub fn generate_tactical_moves(
    board: &Board,
    color: Color,
    config: TacticsConfig,
    rng: &mut Rng,
) -> PolicyMoves {
    if board.last_move().is_none() {
        return PolicyMoves {
            moves: Vec::new(),
            source: MoveSource::None,
        };
    }

    for rule in &RULES {
        if rule.source == MoveSource::Pattern && !config.use_patterns {
            continue;
        }
        let moves = filter_moves(
            board,
            (rule.generate)(board, color),
            color,
            config.filter_self_atari,
        );
        if !moves.is_empty() {
            return PolicyMoves {
                moves,
                source: rule.source,
            };
        }
    }

    PolicyMoves {
        moves: random_moves(board, color, rng),
        source: MoveSource::Random,
    }
}

/// The sole liberty of the last-played stone, if `color` can take it.
pub fn atari_capture(board: &Board, color: Color) -> Vec<Point> {
    let Some(last) = board.last_move() else {
        return Vec::new();
    };
    match board.single_liberty(last, color.opponent()) {
        Some(lib) if board.is_legal(Move::Play(lib), color) => vec![lib],
        _ => Vec::new(),
    }
}

/// Escape and counter-capture moves for `color` groups the last move put in atari.
pub fn atari_defense(board: &Board, color: Color) -> Vec<Point> {
    let Some(last) = board.last_move() else {
        return Vec::new();
    };
    let mut moves = Vec::new();
    for n in board.neighbors(last) {
        if board.cell(n) != Cell::Stone(color) {
            continue;
        }
        let Some(lib) = board.single_liberty(n, color) else {
            continue;
        };
        if let Some(escape) = runaway(board, n, lib, color) {
            push_unique(&mut moves, escape);
        }
        for capture in counter_captures(board, n, color) {
            push_unique(&mut moves, capture);
        }
    }
    moves
}

/// Extend the group at `group` onto its last liberty if that gains liberties.
fn runaway(board: &Board, group: Point, lib: Point, color: Color) -> Option<Point> {
    let mut cboard = board.clone();
    cboard.play(Move::Play(lib), color).ok()?;
    (cboard.liberty_count(group, color) > 1).then_some(lib)
}

/// Capturing moves against adjacent opponent groups in atari that leave the
/// `color` group at `group` with more than one liberty.
fn counter_captures(board: &Board, group: Point, color: Color) -> Vec<Point> {
    let opp = color.opponent();
    let mut targets = Vec::new();
    for stone in board.group(group) {
        for n in board.neighbors(stone) {
            if board.cell(n) != Cell::Stone(opp) {
                continue;
            }
            if let Some(lib) = board.single_liberty(n, opp) {
                push_unique(&mut targets, lib);
            }
        }
    }

    targets
        .into_iter()
        .filter(|&lib| {
            let mut cboard = board.clone();
            cboard.play(Move::Play(lib), color).is_ok() && cboard.liberty_count(group, color) > 1
        })
        .collect()
}

/// Legal empty points next to the last two moves that match a 3x3 pattern.
pub fn pattern_moves(board: &Board, color: Color) -> Vec<Point> {
    let mut moves = Vec::new();
    for last in board.last_moves().into_iter().flatten() {
        let around = board
            .neighbors(last)
            .into_iter()
            .chain(board.diagonal_neighbors(last));
        for pt in around {
            if board.cell(pt) == Cell::Empty
                && board.is_legal(Move::Play(pt), color)
                && pat3_match(board, pt)
            {
                push_unique(&mut moves, pt);
            }
        }
    }
    moves
}

/// Legal moves for `color` that do not fill its own eyes, shuffled.
pub fn random_moves(board: &Board, color: Color, rng: &mut Rng) -> Vec<Point> {
    let mut moves: Vec<Point> = board
        .legal_moves(color)
        .into_iter()
        .filter(|&pt| !board.is_eye(pt, color))
        .collect();
    rng.shuffle(&mut moves);
    moves
}

/// A move is self-atari if, once played and captures are resolved, the
/// mover's group holding the new stone has exactly one liberty.
///
/// Snap-backs are not recognised. Illegal moves are not self-atari.
pub fn is_self_atari(board: &Board, pt: Point, color: Color) -> bool {
    let mut cboard = board.clone();
    cboard.play(Move::Play(pt), color).is_ok() && cboard.liberty_count(pt, color) == 1
}

/// Drop illegal moves, and self-atari moves when `filter_self_atari` is set.
///
/// The self-atari filter never empties the list: if every legal move is
/// self-atari they are all kept.
pub fn filter_moves(
    board: &Board,
    moves: Vec<Point>,
    color: Color,
    filter_self_atari: bool,
) -> Vec<Point> {
    let legal: Vec<Point> = moves
        .into_iter()
        .filter(|&pt| board.is_legal(Move::Play(pt), color))
        .collect();
    if !filter_self_atari {
        return legal;
    }
    let safe: Vec<Point> = legal
        .iter()
        .copied()
        .filter(|&pt| !is_self_atari(board, pt, color))
        .collect();
    if safe.is_empty() { legal } else { safe }
}

fn push_unique(moves: &mut Vec<Point>, pt: Point) {
    if !moves.contains(&pt) {
        moves.push(pt);
    }
}
