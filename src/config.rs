//! Engine configuration.
//!
//! The command line is parsed once into an [`EngineConfig`], which is handed
//! to [`crate::search::Engine::new`] and never read from global state.

use std::fmt;
use std::str::FromStr;

use anyhow::{Result, bail, ensure};
use clap::ValueEnum;

use crate::constants::{DEFAULT_KOMI, DEFAULT_PLY_LIMIT, DEFAULT_SIMULATIONS, UCB_EXPLORATION};
use crate::playout::PlayoutSettings;
use crate::tactics::TacticsConfig;

/// How the playout budget is spread over root candidates.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum MoveSelection {
    /// Same number of playouts for every candidate, most wins is chosen
    Simple,
    /// Confidence-bound allocation, most visited is chosen
    #[value(name = "ucb", alias = "confidence-bound")]
    ConfidenceBound,
}

/// Policy used to pick moves inside playouts.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum SimulationPolicy {
    /// Uniformly random legal moves
    Random,
    /// Tactical rules first, random moves as fallback
    #[value(name = "rulebased", alias = "rule-based")]
    RuleBased,
}

impl FromStr for MoveSelection {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "simple" => Ok(MoveSelection::Simple),
            "ucb" | "confidence-bound" => Ok(MoveSelection::ConfidenceBound),
            _ => bail!("moveselect must be simple or ucb (got '{s}')"),
        }
    }
}

impl FromStr for SimulationPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "random" => Ok(SimulationPolicy::Random),
            "rulebased" | "rule-based" => Ok(SimulationPolicy::RuleBased),
            _ => bail!("simulations must be random or rulebased (got '{s}')"),
        }
    }
}

impl fmt::Display for MoveSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveSelection::Simple => write!(f, "simple"),
            MoveSelection::ConfidenceBound => write!(f, "ucb"),
        }
    }
}

impl fmt::Display for SimulationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationPolicy::Random => write!(f, "random"),
            SimulationPolicy::RuleBased => write!(f, "rulebased"),
        }
    }
}

/// Settings for one engine instance.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// Playouts per candidate move (the total budget is this times the candidate count)
    pub simulations: usize,
    pub move_selection: MoveSelection,
    pub simulation_policy: SimulationPolicy,
    /// Remove self-atari moves from tactical candidates
    pub self_atari_filter: bool,
    /// Maximum plies per playout
    pub ply_limit: usize,
    pub komi: f64,
    /// Exploration coefficient for confidence-bound selection
    pub exploration: f64,
    /// Seed for the engine's random source; `None` seeds from entropy
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            simulations: DEFAULT_SIMULATIONS,
            move_selection: MoveSelection::Simple,
            simulation_policy: SimulationPolicy::Random,
            self_atari_filter: false,
            ply_limit: DEFAULT_PLY_LIMIT,
            komi: DEFAULT_KOMI,
            exploration: UCB_EXPLORATION,
            seed: None,
        }
    }
}

impl EngineConfig {
    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.simulations > 0, "simulation count must be at least 1");
        ensure!(self.ply_limit > 0, "playout ply limit must be at least 1");
        ensure!(self.komi.is_finite(), "komi must be a finite number");
        ensure!(
            self.exploration.is_finite() && self.exploration >= 0.0,
            "exploration constant must be a non-negative number"
        );
        Ok(())
    }

    /// Tactical generator switches implied by this configuration.
    ///
    /// Patterns are only used together with rule-based simulations.
    pub fn tactics(&self) -> TacticsConfig {
        TacticsConfig {
            use_patterns: self.simulation_policy == SimulationPolicy::RuleBased,
            filter_self_atari: self.self_atari_filter,
        }
    }

    pub fn playout_settings(&self) -> PlayoutSettings {
        PlayoutSettings {
            komi: self.komi,
            ply_limit: self.ply_limit,
            policy: self.simulation_policy,
            tactics: self.tactics(),
        }
    }
}
