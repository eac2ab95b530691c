//! flatgo: a flat Monte Carlo Go engine.
//!
//! Every legal move at the root is evaluated by random or rule-based
//! playouts, and the best one is played. There is no search tree. The
//! rule-based playouts use a small tactical move generator (capture a stone
//! in atari, save an own group in atari, 3x3 shape patterns) that can also be
//! queried directly.
//!
//! ## Modules
//!
//! - [`constants`] - Board size limits and engine defaults
//! - [`board`] - Board state, legality, captures, ko and area scoring
//! - [`patterns`] - 3x3 shape patterns around the last moves
//! - [`tactics`] - Tactical move generator and self-atari filter
//! - [`playout`] - Random and rule-based game simulation
//! - [`search`] - Simple and confidence-bound move selection
//! - [`config`] - Engine settings
//! - [`gtp`] - Go Text Protocol front end
//!
//! ## Example
//!
//! ```
//! use flatgo::board::{Board, Color, Move};
//! use flatgo::config::EngineConfig;
//! use flatgo::search::Engine;
//!
//! let mut board = Board::new(7).unwrap();
//! let d4 = board.parse_move("D4").unwrap();
//! board.play(d4, Color::Black).unwrap();
//!
//! let config = EngineConfig {
//!     simulations: 2,
//!     seed: Some(7),
//!     ..EngineConfig::default()
//! };
//! let mut engine = Engine::new(config).unwrap();
//! let reply = engine.choose_move(&board, Color::White);
//! assert!(reply == Move::Pass || board.is_legal(reply, Color::White));
//! println!("White plays {}", board.format_move(reply));
//! ```

pub mod board;
pub mod config;
pub mod constants;
pub mod gtp;
pub mod patterns;
pub mod playout;
pub mod search;
pub mod tactics;
