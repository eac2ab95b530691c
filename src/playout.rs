//! Monte Carlo playouts (game simulation to the end).
//!
//! A playout plays moves for both sides until two consecutive passes or the
//! ply limit, then scores the final position by area.

use fastrand::Rng;

use crate::board::{Board, Color, Move};
use crate::config::SimulationPolicy;
use crate::tactics::{TacticsConfig, generate_tactical_moves, random_moves};

/// Everything a playout needs besides the board and the random source.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PlayoutSettings {
    pub komi: f64,
    pub ply_limit: usize,
    pub policy: SimulationPolicy,
    pub tactics: TacticsConfig,
}

/// Choose the next move for `color` inside a playout.
///
/// Both policies pass only when nothing else is left. The rule-based policy
/// falls back to a random move when the tactical generator has no candidates.
pub fn select_playout_move(
    board: &Board,
    color: Color,
    policy: SimulationPolicy,
    tactics: TacticsConfig,
    rng: &mut Rng,
) -> Move {
    let candidates = match policy {
        SimulationPolicy::Random => random_moves(board, color, rng),
        SimulationPolicy::RuleBased => {
            let policy_moves = generate_tactical_moves(board, color, tactics, rng);
            if policy_moves.moves.is_empty() {
                random_moves(board, color, rng)
            } else {
                policy_moves.moves
            }
        }
    };

    if candidates.is_empty() {
        return Move::Pass;
    }
    Move::Play(candidates[rng.usize(..candidates.len())])
}

/// Play the game out from `board` with `color` to move and return the winner.
///
/// The board is consumed as scratch space; callers pass a clone of any
/// position they want to keep.
///
/// # Panics
///
/// Panics if the policy produces a move the board rejects, which means the
/// legality checks and the board disagree.
pub fn run_playout(
    board: &mut Board,
    mut color: Color,
    settings: &PlayoutSettings,
    rng: &mut Rng,
) -> Color {
    let mut plies = 0;
    while plies < settings.ply_limit && board.consecutive_passes() < 2 {
        let mv = select_playout_move(board, color, settings.policy, settings.tactics, rng);
        if let Err(err) = board.play(mv, color) {
            panic!(
                "playout policy chose illegal move {} for {color}: {err}",
                board.format_move(mv)
            );
        }
        color = color.opponent();
        plies += 1;
    }

    board.winner(settings.komi)
}
