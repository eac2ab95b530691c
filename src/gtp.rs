//! Go Text Protocol (GTP) front end.
//!
//! GTP is a text-based protocol for communicating with Go-playing programs.
//! This module implements GTP version 2 so the engine can be driven by a GUI
//! (Sabaki, GoGui) or a match runner.
//!
//! ## Supported Commands
//!
//! - `name`, `version`, `protocol_version`
//! - `list_commands`, `known_command <cmd>`, `quit`
//! - `boardsize <size>`, `clear_board`, `komi <value>`
//! - `play <color> <vertex>`, `genmove <color>`
//! - `legal_moves [color]`, `showboard`
//! - `policy_moves` - tactical candidates for the side to move and the rule
//!   that produced them, without running any simulation
//!
//! ## Example
//!
//! ```ignore
//! use flatgo::gtp::GtpEngine;
//! let mut gtp = GtpEngine::new(board, engine);
//! gtp.run()?;
//! ```

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result, anyhow, bail};
use log::{debug, info};

use crate::board::{Board, Color, Move};
use crate::search::Engine;

/// The list of known GTP commands.
const KNOWN_COMMANDS: &[&str] = &[
    "boardsize",
    "clear_board",
    "genmove",
    "known_command",
    "komi",
    "legal_moves",
    "list_commands",
    "name",
    "play",
    "policy_moves",
    "protocol_version",
    "quit",
    "showboard",
    "version",
];

/// GTP session state: the game board and the engine choosing moves on it.
pub struct GtpEngine {
    board: Board,
    engine: Engine,
}

impl GtpEngine {
    pub fn new(board: Board, engine: Engine) -> Self {
        Self { board, engine }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Run the GTP command loop on stdin and stdout.
    pub fn run(&mut self) -> Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.serve(stdin.lock(), stdout.lock())
    }

    /// Serve commands from `input` until `quit` or end of input.
    pub fn serve(&mut self, input: impl BufRead, mut output: impl Write) -> Result<()> {
        for line in input.lines() {
            let line = line.context("failed to read GTP command")?;

            // Skip empty lines and comments
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);
            let parts: Vec<&str> = command_line.split_whitespace().collect();
            let Some((command, args)) = parts.split_first() else {
                continue;
            };
            let command = command.to_lowercase();
            info!("> {command_line}");

            let (prefix, message) = match self.execute(&command, args) {
                Ok(message) => ('=', message),
                Err(err) => ('?', err.to_string()),
            };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();
            debug!("< {prefix}{id_str} {message}");

            write!(output, "{prefix}{id_str} {message}\n\n")?;
            output.flush()?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Parse an optional numeric command ID from the beginning of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        if end > 0 {
            if let Ok(id) = trimmed[..end].parse::<u32>() {
                return (Some(id), trimmed[end..].trim());
            }
        }
        (None, trimmed)
    }

    /// Execute a GTP command and return the success message.
    fn execute(&mut self, command: &str, args: &[&str]) -> Result<String> {
        match command {
            "name" => Ok(env!("CARGO_PKG_NAME").to_string()),

            "version" => Ok(env!("CARGO_PKG_VERSION").to_string()),

            "protocol_version" => Ok("2".to_string()),

            "list_commands" => Ok(KNOWN_COMMANDS.join("\n")),

            "known_command" => {
                let name = first_arg(args)?;
                let known = KNOWN_COMMANDS.contains(&name.to_lowercase().as_str());
                Ok(known.to_string())
            }

            "quit" => Ok(String::new()),

            "boardsize" => {
                let size = first_arg(args)?
                    .parse::<usize>()
                    .map_err(|_| anyhow!("boardsize is not an integer"))?;
                self.board = Board::new(size)?;
                Ok(String::new())
            }

            "clear_board" => {
                self.board.clear();
                Ok(String::new())
            }

            "komi" => {
                let komi = first_arg(args)?
                    .parse::<f64>()
                    .map_err(|_| anyhow!("komi is not a number"))?;
                if !komi.is_finite() {
                    bail!("komi is not a number");
                }
                self.engine.set_komi(komi);
                Ok(String::new())
            }

            "play" => {
                let [color, vertex, ..] = args else {
                    bail!("missing arguments");
                };
                let color = parse_color(color)?;
                let mv = self.board.parse_move(vertex)?;
                self.board
                    .play(mv, color)
                    .map_err(|err| anyhow!("illegal move: \"{vertex}\" ({err})"))?;
                Ok(String::new())
            }

            "genmove" => {
                let color = parse_color(first_arg(args)?)?;
                let mv = self.engine.choose_move(&self.board, color);
                self.board
                    .play(mv, color)
                    .map_err(|err| anyhow!("engine chose an illegal move: {err}"))?;
                Ok(self.board.format_move(mv))
            }

            "legal_moves" => {
                let color = match args.first() {
                    Some(c) => parse_color(c)?,
                    None => self.board.to_play(),
                };
                let moves: Vec<Move> = self
                    .board
                    .legal_moves(color)
                    .into_iter()
                    .map(Move::Play)
                    .collect();
                Ok(self.sorted_moves(&moves))
            }

            "showboard" => Ok(format!("\n{}", self.board)),

            "policy_moves" => {
                let policy_moves = self.engine.list_policy_moves(&self.board);
                if policy_moves.moves.is_empty() {
                    return Ok("Pass".to_string());
                }
                let moves: Vec<Move> = policy_moves.moves.into_iter().map(Move::Play).collect();
                Ok(format!("{} {}", policy_moves.source, self.sorted_moves(&moves)))
            }

            _ => bail!("unknown command: {command}"),
        }
    }

    /// Format moves as vertices sorted by name, space separated.
    fn sorted_moves(&self, moves: &[Move]) -> String {
        let mut names: Vec<String> = moves.iter().map(|&mv| self.board.format_move(mv)).collect();
        names.sort();
        names.join(" ")
    }
}

fn first_arg<'a>(args: &[&'a str]) -> Result<&'a str> {
    args.first().copied().ok_or_else(|| anyhow!("missing argument"))
}

fn parse_color(s: &str) -> Result<Color> {
    Color::parse(s).ok_or_else(|| anyhow!("invalid color '{s}'"))
}
