//! Default engine parameters and board limits.
//!
//! The board size is chosen at runtime (GTP `boardsize`), so only its bounds
//! and the default live here.

// =============================================================================
// Board Geometry
// =============================================================================

/// Board size used when none is requested.
pub const DEFAULT_BOARD_SIZE: usize = 7;

/// Smallest supported board.
pub const MIN_BOARD_SIZE: usize = 2;

/// Largest supported board (coordinates run A-T without I).
pub const MAX_BOARD_SIZE: usize = 19;

// =============================================================================
// Search Parameters
// =============================================================================

/// Default number of playouts per candidate move.
pub const DEFAULT_SIMULATIONS: usize = 10;

/// Default maximum number of plies in one playout.
pub const DEFAULT_PLY_LIMIT: usize = 100;

/// Default komi (compensation points for White).
pub const DEFAULT_KOMI: f64 = 6.5;

/// Exploration coefficient for confidence-bound selection.
///
/// sqrt(2) is the safe choice; this is more aggressive.
pub const UCB_EXPLORATION: f64 = 0.4;

// =============================================================================
// Coordinates
// =============================================================================

/// Column letters in GTP order (no 'I').
pub const COLUMN_LETTERS: &[u8] = b"ABCDEFGHJKLMNOPQRST";
