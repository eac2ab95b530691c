//! Flat Monte Carlo move selection.
//!
//! For one decision the engine enumerates root candidates (pass always
//! included), spends playouts on them and picks one:
//!
//! - **simple**: the same number of playouts for every candidate; the one
//!   with the most wins is chosen, ties going to the earlier candidate.
//! - **ucb**: a shared budget where each playout goes to the candidate with
//!   the highest `win_rate + C * sqrt(ln(n) / visits)`; unvisited candidates
//!   come first. The most visited candidate is chosen.
//!
//! No tree is kept between decisions.

use anyhow::Result;
use fastrand::Rng;
use log::{debug, info, log_enabled};

use crate::board::{Board, Color, Move};
use crate::config::{EngineConfig, MoveSelection, SimulationPolicy};
use crate::playout::{PlayoutSettings, run_playout};
use crate::tactics::{PolicyMoves, generate_tactical_moves};

/// Playout statistics of one root candidate.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ArmStats {
    /// Playouts run
    pub visits: u32,
    /// Playouts won by the side to move at the root
    pub wins: u32,
}

impl ArmStats {
    pub fn record(&mut self, won: bool) {
        self.visits += 1;
        if won {
            self.wins += 1;
        }
    }

    /// Fraction of playouts won, 0 when unvisited.
    #[inline]
    pub fn win_rate(&self) -> f64 {
        if self.visits > 0 {
            self.wins as f64 / self.visits as f64
        } else {
            0.0
        }
    }
}

/// Outcome of one move decision.
#[derive(Clone, Debug, PartialEq)]
pub struct Evaluation {
    /// Root candidates, pass last
    pub candidates: Vec<Move>,
    /// Statistics indexed like `candidates`
    pub stats: Vec<ArmStats>,
    /// Index of the chosen candidate
    pub best: usize,
}

impl Evaluation {
    pub fn best_move(&self) -> Move {
        self.candidates[self.best]
    }

    pub fn total_playouts(&self) -> u64 {
        self.stats.iter().map(|s| u64::from(s.visits)).sum()
    }
}

/// Confidence bound of a candidate after `total` playouts in this decision.
///
/// Unvisited candidates score infinity.
pub fn ucb_score(arm: &ArmStats, exploration: f64, total: u64) -> f64 {
    if arm.visits == 0 {
        return f64::INFINITY;
    }
    arm.win_rate() + exploration * ((total as f64).ln() / arm.visits as f64).sqrt()
}

/// Index of the candidate to simulate next. Ties go to the lowest index.
pub fn select_arm(stats: &[ArmStats], exploration: f64) -> usize {
    let total: u64 = stats.iter().map(|s| u64::from(s.visits)).sum();
    let mut best = 0;
    let mut best_score = f64::NEG_INFINITY;
    for (i, arm) in stats.iter().enumerate() {
        let score = ucb_score(arm, exploration, total);
        if score > best_score {
            best = i;
            best_score = score;
        }
    }
    best
}

/// First index holding the maximum of `key`.
fn stable_argmax(stats: &[ArmStats], key: impl Fn(&ArmStats) -> u32) -> usize {
    let mut best = 0;
    for (i, arm) in stats.iter().enumerate() {
        if key(arm) > key(&stats[best]) {
            best = i;
        }
    }
    best
}

/// Candidate with the most wins, earliest on ties.
pub fn most_wins(stats: &[ArmStats]) -> usize {
    stable_argmax(stats, |s| s.wins)
}

/// Candidate with the most visits, earliest on ties.
pub fn most_visited(stats: &[ArmStats]) -> usize {
    stable_argmax(stats, |s| s.visits)
}

/// The move-selection engine.
pub struct Engine {
    config: EngineConfig,
    rng: Rng,
    /// Playouts run over the engine's lifetime
    playouts: u64,
}

impl Engine {
    /// Create an engine, seeding its random source from `config.seed` if set.
    pub fn new(config: EngineConfig) -> Result<Self> {
        let rng = match config.seed {
            Some(seed) => Rng::with_seed(seed),
            None => Rng::new(),
        };
        Self::with_rng(config, rng)
    }

    /// Create an engine drawing from the given random source.
    pub fn with_rng(config: EngineConfig, rng: Rng) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            rng,
            playouts: 0,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn set_komi(&mut self, komi: f64) {
        self.config.komi = komi;
    }

    /// Total playouts run so far.
    pub fn playouts_run(&self) -> u64 {
        self.playouts
    }

    /// Tactical policy moves for the side to move, without simulating.
    pub fn list_policy_moves(&mut self, board: &Board) -> PolicyMoves {
        generate_tactical_moves(board, board.to_play(), self.config.tactics(), &mut self.rng)
    }

    /// Root candidates for `color`, with pass appended.
    ///
    /// Rule-based engines start from the tactical generator and fall back to
    /// every legal move when it has nothing to say.
    pub fn candidate_moves(&mut self, board: &Board, color: Color) -> Vec<Move> {
        let points = match self.config.simulation_policy {
            SimulationPolicy::Random => board.legal_moves(color),
            SimulationPolicy::RuleBased => {
                let policy_moves =
                    generate_tactical_moves(board, color, self.config.tactics(), &mut self.rng);
                debug!("root candidates from {} rule", policy_moves.source);
                if policy_moves.moves.is_empty() {
                    board.legal_moves(color)
                } else {
                    policy_moves.moves
                }
            }
        };
        let mut candidates: Vec<Move> = points.into_iter().map(Move::Play).collect();
        candidates.push(Move::Pass);
        candidates
    }

    /// Choose a move for `color`. Passes without simulating when pass is the
    /// only candidate.
    pub fn choose_move(&mut self, board: &Board, color: Color) -> Move {
        self.evaluate(board, color)
            .map_or(Move::Pass, |evaluation| evaluation.best_move())
    }

    /// Run the configured selection for `color` and report the statistics.
    ///
    /// Returns `None` when there is no legal move besides pass.
    pub fn evaluate(&mut self, board: &Board, color: Color) -> Option<Evaluation> {
        let candidates = self.candidate_moves(board, color);
        if candidates.len() == 1 {
            debug!("no legal move for {color}, passing");
            return None;
        }

        let settings = self.config.playout_settings();
        let (stats, best) = match self.config.move_selection {
            MoveSelection::Simple => {
                let stats = self.run_simple(board, color, &candidates, &settings);
                let best = most_wins(&stats);
                (stats, best)
            }
            MoveSelection::ConfidenceBound => {
                let stats = self.run_ucb(board, color, &candidates, &settings);
                let best = most_visited(&stats);
                (stats, best)
            }
        };

        let evaluation = Evaluation {
            candidates,
            stats,
            best,
        };
        log_evaluation(board, &evaluation);
        Some(evaluation)
    }

    /// Exactly `simulations` playouts for each candidate.
    fn run_simple(
        &mut self,
        board: &Board,
        color: Color,
        candidates: &[Move],
        settings: &PlayoutSettings,
    ) -> Vec<ArmStats> {
        candidates
            .iter()
            .map(|&mv| {
                let mut arm = ArmStats::default();
                for _ in 0..self.config.simulations {
                    let won = self.simulate(board, mv, color, settings);
                    arm.record(won);
                }
                arm
            })
            .collect()
    }

    /// `simulations * candidates` playouts spread by confidence bound.
    fn run_ucb(
        &mut self,
        board: &Board,
        color: Color,
        candidates: &[Move],
        settings: &PlayoutSettings,
    ) -> Vec<ArmStats> {
        let mut stats = vec![ArmStats::default(); candidates.len()];
        let budget = self.config.simulations * candidates.len();
        for _ in 0..budget {
            let i = select_arm(&stats, self.config.exploration);
            let won = self.simulate(board, candidates[i], color, settings);
            stats[i].record(won);
        }
        stats
    }

    /// Play `mv` on a private copy of `board` and play the game out.
    ///
    /// Returns whether `color` won.
    fn simulate(&mut self, board: &Board, mv: Move, color: Color, settings: &PlayoutSettings) -> bool {
        let mut cboard = board.clone();
        if let Err(err) = cboard.play(mv, color) {
            panic!(
                "root candidate {} is illegal for {color}: {err}",
                board.format_move(mv)
            );
        }
        self.playouts += 1;
        run_playout(&mut cboard, color.opponent(), settings, &mut self.rng) == color
    }
}

/// Log win rates, best first.
fn log_evaluation(board: &Board, evaluation: &Evaluation) {
    if !log_enabled!(log::Level::Info) {
        return;
    }
    let mut rates: Vec<(String, ArmStats)> = evaluation
        .candidates
        .iter()
        .zip(&evaluation.stats)
        .map(|(&mv, &arm)| (board.format_move(mv), arm))
        .collect();
    rates.sort_by(|a, b| b.1.win_rate().total_cmp(&a.1.win_rate()));

    let summary = rates
        .iter()
        .map(|(mv, arm)| format!("{mv} {:.2}", arm.win_rate()))
        .collect::<Vec<_>>()
        .join(", ");
    info!("win rates: {summary}");

    for (mv, arm) in &rates {
        debug!("move {mv} v={} w={} wr={:.3}", arm.visits, arm.wins, arm.win_rate());
    }
    info!(
        "chose {} after {} playouts",
        board.format_move(evaluation.best_move()),
        evaluation.total_playouts()
    );
}
