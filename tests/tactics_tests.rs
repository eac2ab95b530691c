//! Tactical move generator regression tests.
//!
//! Each test sets up a position on a 7x7 board, then asks the generator for
//! the side to move's policy moves and checks both the moves and the rule
//! that produced them.

use fastrand::Rng;

use flatgo::board::{Board, Color, Move, Point};
use flatgo::tactics::{
    MoveSource, PolicyMoves, TacticsConfig, filter_moves, generate_tactical_moves, is_self_atari,
};

// =============================================================================
// Helper functions
// =============================================================================

/// Place `black` stones, then `white` stones. The last white stone is the
/// last move and Black is to play.
fn setup(black: &[&str], white: &[&str]) -> Board {
    let mut board = Board::new(7).unwrap();
    for (color, vertices) in [(Color::Black, black), (Color::White, white)] {
        for v in vertices {
            let mv = board.parse_move(v).unwrap();
            if let Err(err) = board.play(mv, color) {
                panic!("illegal setup move {v} for {color}: {err}");
            }
        }
    }
    board
}

fn pt(board: &Board, vertex: &str) -> Point {
    match board.parse_move(vertex).unwrap() {
        Move::Play(pt) => pt,
        Move::Pass => panic!("expected a point, got pass"),
    }
}

fn policy(board: &Board, config: TacticsConfig) -> PolicyMoves {
    let mut rng = Rng::with_seed(1);
    generate_tactical_moves(board, board.to_play(), config, &mut rng)
}

/// Format moves for assertion messages
fn format_moves(board: &Board, moves: &[Point]) -> String {
    moves
        .iter()
        .map(|&m| board.format_point(m))
        .collect::<Vec<_>>()
        .join(" ")
}

// =============================================================================
// No last move
// =============================================================================

#[test]
fn test_empty_board_has_no_policy_moves() {
    let board = Board::new(7).unwrap();
    let result = policy(&board, TacticsConfig::default());
    assert_eq!(result.moves, Vec::<Point>::new());
    assert_eq!(result.source, MoveSource::None);
}

#[test]
fn test_pass_clears_last_move() {
    let mut board = setup(&["C4", "E4", "D5"], &["D4"]);
    board.play(Move::Pass, Color::Black).unwrap();
    board.play(Move::Pass, Color::White).unwrap();
    let result = policy(&board, TacticsConfig::default());
    assert!(result.moves.is_empty());
    assert_eq!(result.source, MoveSource::None);
}

// =============================================================================
// Atari capture
// =============================================================================

#[test]
fn test_capture_last_stone() {
    // White D4 is surrounded on three sides; its last liberty is D3
    let board = setup(&["C4", "E4", "D5"], &["D4"]);
    let result = policy(&board, TacticsConfig::default());
    assert_eq!(result.source, MoveSource::AtariCapture);
    assert_eq!(
        result.moves,
        vec![pt(&board, "D3")],
        "expected [D3], got [{}]",
        format_moves(&board, &result.moves)
    );
}

#[test]
fn test_capture_only_targets_last_move() {
    // White C4 is in atari at D4, but the last move D5 is not
    let board = setup(&["B4", "C5", "C3"], &["C4", "D5"]);
    assert_eq!(
        board.single_liberty(pt(&board, "C4"), Color::White),
        Some(pt(&board, "D4"))
    );
    let result = policy(&board, TacticsConfig::default());
    assert_eq!(result.source, MoveSource::Random);
}

// =============================================================================
// Atari defense
// =============================================================================

#[test]
fn test_defense_runs_away() {
    // White D5 puts Black D4 in atari; extending to D3 gains liberties
    let board = setup(&["D4"], &["C4", "E4", "D5"]);
    let result = policy(&board, TacticsConfig::default());
    assert_eq!(result.source, MoveSource::AtariDefense);
    assert_eq!(
        result.moves,
        vec![pt(&board, "D3")],
        "expected [D3], got [{}]",
        format_moves(&board, &result.moves)
    );
}

#[test]
fn test_defense_runs_away_or_captures() {
    // As above, but White C4 is itself in atari at C3
    let board = setup(&["B4", "C5", "D4"], &["C4", "E4", "D5"]);
    let result = policy(&board, TacticsConfig::default());
    assert_eq!(result.source, MoveSource::AtariDefense);
    assert_eq!(
        result.moves,
        vec![pt(&board, "D3"), pt(&board, "C3")],
        "expected [D3 C3], got [{}]",
        format_moves(&board, &result.moves)
    );
}

#[test]
fn test_no_defense_on_hopeless_corner_stone() {
    // Black A1 in atari at B1; B1 would still leave a single liberty
    let board = setup(&["A1"], &["B2", "A2"]);
    let result = policy(&board, TacticsConfig::default());
    assert_eq!(result.source, MoveSource::Random);
}

// =============================================================================
// Patterns
// =============================================================================

#[test]
fn test_pattern_next_to_last_move() {
    // Black C5 and E5 with White D6: the cut at D5
    let board = setup(&["C5", "E5"], &["D6"]);
    let config = TacticsConfig {
        use_patterns: true,
        filter_self_atari: false,
    };
    let result = policy(&board, config);
    assert_eq!(result.source, MoveSource::Pattern);
    assert!(
        result.moves.contains(&pt(&board, "D5")),
        "expected D5 among [{}]",
        format_moves(&board, &result.moves)
    );
}

#[test]
fn test_patterns_disabled_falls_back_to_random() {
    let board = setup(&["C5", "E5"], &["D6"]);
    let result = policy(&board, TacticsConfig::default());
    assert_eq!(result.source, MoveSource::Random);
    let mut moves = result.moves.clone();
    moves.sort_unstable();
    let mut legal = board.legal_moves(Color::Black);
    legal.sort_unstable();
    assert_eq!(moves, legal);
}

// =============================================================================
// Self-atari filter
// =============================================================================

#[test]
fn test_self_atari_definition() {
    let board = setup(&[], &["A2", "B2"]);
    assert!(is_self_atari(&board, pt(&board, "A1"), Color::Black));
    assert!(!is_self_atari(&board, pt(&board, "B1"), Color::Black));
    assert!(!is_self_atari(&board, pt(&board, "D4"), Color::Black));
}

#[test]
fn test_captures_count_toward_liberties() {
    // Black A1 captures White A2 and keeps liberties A2 and B1
    let board = setup(&["A3", "B2"], &["A2"]);
    assert!(!is_self_atari(&board, pt(&board, "A1"), Color::Black));
}

#[test]
fn test_filter_drops_self_atari() {
    let board = setup(&[], &["A2", "B2"]);
    let moves = vec![pt(&board, "A1"), pt(&board, "D4")];
    assert_eq!(
        filter_moves(&board, moves.clone(), Color::Black, true),
        vec![pt(&board, "D4")]
    );
    assert_eq!(filter_moves(&board, moves.clone(), Color::Black, false), moves);
}

#[test]
fn test_filter_never_empties_candidates() {
    // Both A1 and B1 leave Black with a single liberty
    let board = setup(&[], &["A2", "B2", "C1"]);
    let moves = vec![pt(&board, "A1"), pt(&board, "B1")];
    assert_eq!(filter_moves(&board, moves.clone(), Color::Black, true), moves);
}

#[test]
fn test_filtered_capture_rule_keeps_self_atari_capture() {
    // Taking White D4 at D3 leaves Black D3 with D4 as its only liberty
    let board = setup(&["C4", "E4", "D5"], &["C3", "E3", "D2", "D4"]);
    let d3 = pt(&board, "D3");
    assert!(is_self_atari(&board, d3, Color::Black));
    let config = TacticsConfig {
        use_patterns: false,
        filter_self_atari: true,
    };
    let result = policy(&board, config);
    assert_eq!(result.source, MoveSource::AtariCapture);
    assert_eq!(result.moves, vec![d3]);
}
