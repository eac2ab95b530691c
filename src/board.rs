//! Go board representation and move execution.
//!
//! The board is a 1D array with a border of [`Cell::Border`] points around the
//! playable area. Rows have stride `size + 1`, so the column-0 border of one row
//! doubles as the right-hand border of the row before it, and every playable
//! point has in-range orthogonal and diagonal neighbours.
//!
//! Rows are numbered from the bottom (row 1) and columns from the left, the
//! same way GTP vertices are written (`A1` is the lower-left corner).

use std::fmt;

use anyhow::{Context, Result, anyhow, bail};

use crate::constants::{COLUMN_LETTERS, MAX_BOARD_SIZE, MIN_BOARD_SIZE};

/// A point on the board, represented as an index into the 1D board array.
pub type Point = usize;

/// One of the two players.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    White,
}

impl Color {
    /// The other player.
    #[inline]
    pub fn opponent(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    /// Parse a GTP colour (`b`, `black`, `w`, `white`, any case).
    pub fn parse(s: &str) -> Option<Color> {
        match s.to_ascii_lowercase().as_str() {
            "b" | "black" => Some(Color::Black),
            "w" | "white" => Some(Color::White),
            _ => None,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Black => write!(f, "black"),
            Color::White => write!(f, "white"),
        }
    }
}

/// Content of a single board array entry.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Stone(Color),
    Border,
}

/// A move: a stone on a point, or a pass.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Move {
    Pass,
    Play(Point),
}

impl Move {
    /// The point played, or `None` for a pass.
    pub fn point(self) -> Option<Point> {
        match self {
            Move::Pass => None,
            Move::Play(pt) => Some(pt),
        }
    }

    pub fn is_pass(self) -> bool {
        self == Move::Pass
    }
}

/// Reason a move was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    /// Point is outside the playable area
    OffBoard,
    /// Point is not empty
    Occupied,
    /// Move retakes a ko
    Ko,
    /// Move would leave its own group without liberties
    Suicide,
}

impl fmt::Display for MoveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveError::OffBoard => write!(f, "point not on the board"),
            MoveError::Occupied => write!(f, "point not empty"),
            MoveError::Ko => write!(f, "retakes ko"),
            MoveError::Suicide => write!(f, "suicide"),
        }
    }
}

impl std::error::Error for MoveError {}

/// A Go position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    size: usize,
    stride: usize,
    cells: Vec<Cell>,
    /// Player to move
    to_play: Color,
    /// Point that may not be played immediately, and the colour it is forbidden for
    ko: Option<(Point, Color)>,
    /// Last stone played (`None` after a pass or at the start)
    last_move: Option<Point>,
    /// Move before the last one
    last_move2: Option<Point>,
    /// Number of consecutive passes ending the move sequence
    passes: u32,
    /// Moves played so far, passes included
    moves_played: usize,
}

impl Board {
    /// Create an empty board of `size` x `size`.
    pub fn new(size: usize) -> Result<Self> {
        if !(MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&size) {
            bail!("unacceptable size {size}, expected {MIN_BOARD_SIZE} to {MAX_BOARD_SIZE}");
        }
        Ok(Self::empty(size))
    }

    fn empty(size: usize) -> Self {
        let stride = size + 1;
        let mut cells = vec![Cell::Border; (size + 2) * stride + 1];
        for row in 1..=size {
            for col in 1..=size {
                cells[row * stride + col] = Cell::Empty;
            }
        }
        Self {
            size,
            stride,
            cells,
            to_play: Color::Black,
            ko: None,
            last_move: None,
            last_move2: None,
            passes: 0,
            moves_played: 0,
        }
    }

    /// Reset to an empty board of the same size with Black to move.
    pub fn clear(&mut self) {
        *self = Self::empty(self.size);
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn to_play(&self) -> Color {
        self.to_play
    }

    pub fn set_to_play(&mut self, color: Color) {
        self.to_play = color;
    }

    /// Content of a point. Indices outside the array read as border.
    #[inline]
    pub fn cell(&self, pt: Point) -> Cell {
        self.cells.get(pt).copied().unwrap_or(Cell::Border)
    }

    /// Last stone played, `None` at the start of the game or after a pass.
    pub fn last_move(&self) -> Option<Point> {
        self.last_move
    }

    /// The last two moves, most recent first.
    pub fn last_moves(&self) -> [Option<Point>; 2] {
        [self.last_move, self.last_move2]
    }

    pub fn consecutive_passes(&self) -> u32 {
        self.passes
    }

    pub fn moves_played(&self) -> usize {
        self.moves_played
    }

    /// The point at 1-based `row` (from the bottom) and `col` (from the left).
    pub fn point(&self, row: usize, col: usize) -> Option<Point> {
        if (1..=self.size).contains(&row) && (1..=self.size).contains(&col) {
            Some(row * self.stride + col)
        } else {
            None
        }
    }

    /// Inverse of [`Board::point`]: `(row, col)`.
    pub fn coord(&self, pt: Point) -> (usize, usize) {
        (pt / self.stride, pt % self.stride)
    }

    /// All playable points, from A1 row by row.
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        let (size, stride) = (self.size, self.stride);
        (1..=size).flat_map(move |row| (1..=size).map(move |col| row * stride + col))
    }

    pub fn empty_points(&self) -> Vec<Point> {
        self.points()
            .filter(|&pt| self.cells[pt] == Cell::Empty)
            .collect()
    }

    /// The 4 orthogonal neighbours (S, W, E, N) of a playable point.
    #[inline]
    pub fn neighbors(&self, pt: Point) -> [Point; 4] {
        [pt - self.stride, pt - 1, pt + 1, pt + self.stride]
    }

    /// The 4 diagonal neighbours (SW, SE, NW, NE) of a playable point.
    #[inline]
    pub fn diagonal_neighbors(&self, pt: Point) -> [Point; 4] {
        [
            pt - self.stride - 1,
            pt - self.stride + 1,
            pt + self.stride - 1,
            pt + self.stride + 1,
        ]
    }

    /// Collect all stones in the group at `start`.
    ///
    /// Returns an empty vector when `start` holds no stone.
    pub fn group(&self, start: Point) -> Vec<Point> {
        self.group_and_liberties(start).0
    }

    /// Flood-fill the group at `start`, returning its stones and distinct liberties.
    fn group_and_liberties(&self, start: Point) -> (Vec<Point>, Vec<Point>) {
        let color = match self.cell(start) {
            Cell::Stone(c) => c,
            _ => return (Vec::new(), Vec::new()),
        };
        let mut stones = Vec::new();
        let mut liberties = Vec::new();
        let mut visited = vec![false; self.cells.len()];
        let mut stack = vec![start];
        visited[start] = true;

        while let Some(pt) = stack.pop() {
            stones.push(pt);
            for n in self.neighbors(pt) {
                if visited[n] {
                    continue;
                }
                match self.cells[n] {
                    Cell::Empty => {
                        visited[n] = true;
                        liberties.push(n);
                    }
                    Cell::Stone(c) if c == color => {
                        visited[n] = true;
                        stack.push(n);
                    }
                    _ => {}
                }
            }
        }
        (stones, liberties)
    }

    /// Number of liberties of the `color` group at `pt` (0 if `pt` is not a `color` stone).
    pub fn liberty_count(&self, pt: Point, color: Color) -> usize {
        if self.cell(pt) != Cell::Stone(color) {
            return 0;
        }
        self.group_and_liberties(pt).1.len()
    }

    /// The sole liberty of the `color` group at `pt`, if it has exactly one.
    pub fn single_liberty(&self, pt: Point, color: Color) -> Option<Point> {
        if self.cell(pt) != Cell::Stone(color) {
            return None;
        }
        match self.group_and_liberties(pt).1.as_slice() {
            [lib] => Some(*lib),
            _ => None,
        }
    }

    /// Check whether `color` may play `pt` without changing the board.
    fn check_play(&self, pt: Point, color: Color) -> Result<(), MoveError> {
        match self.cell(pt) {
            Cell::Border => return Err(MoveError::OffBoard),
            Cell::Stone(_) => return Err(MoveError::Occupied),
            Cell::Empty => {}
        }
        if self.ko == Some((pt, color)) {
            return Err(MoveError::Ko);
        }
        for n in self.neighbors(pt) {
            match self.cells[n] {
                Cell::Empty => return Ok(()),
                // Own group keeps a liberty other than pt
                Cell::Stone(c) if c == color => {
                    if self.group_and_liberties(n).1.len() > 1 {
                        return Ok(());
                    }
                }
                // Opponent group whose last liberty is pt gets captured
                Cell::Stone(_) => {
                    if self.group_and_liberties(n).1.len() == 1 {
                        return Ok(());
                    }
                }
                Cell::Border => {}
            }
        }
        Err(MoveError::Suicide)
    }

    pub fn is_legal(&self, mv: Move, color: Color) -> bool {
        match mv {
            Move::Pass => true,
            Move::Play(pt) => self.check_play(pt, color).is_ok(),
        }
    }

    /// All points where `color` may legally play.
    pub fn legal_moves(&self, color: Color) -> Vec<Point> {
        self.points()
            .filter(|&pt| self.check_play(pt, color).is_ok())
            .collect()
    }

    /// Play `mv` for `color`, resolving captures and ko. The opponent moves next.
    pub fn play(&mut self, mv: Move, color: Color) -> Result<(), MoveError> {
        let pt = match mv {
            Move::Pass => {
                self.ko = None;
                self.passes += 1;
                self.record_move(None, color);
                return Ok(());
            }
            Move::Play(pt) => pt,
        };
        self.check_play(pt, color)?;

        self.cells[pt] = Cell::Stone(color);
        let opp = color.opponent();
        let mut captured = Vec::new();
        for n in self.neighbors(pt) {
            if self.cells[n] == Cell::Stone(opp) {
                let (stones, liberties) = self.group_and_liberties(n);
                if liberties.is_empty() {
                    for &s in &stones {
                        self.cells[s] = Cell::Empty;
                    }
                    captured.extend(stones);
                }
            }
        }

        // A lone stone that captured a lone stone and sits in atari forms a ko
        self.ko = None;
        if let [single] = captured.as_slice() {
            let (stones, liberties) = self.group_and_liberties(pt);
            if stones.len() == 1 && liberties.len() == 1 {
                self.ko = Some((*single, opp));
            }
        }

        self.passes = 0;
        self.record_move(Some(pt), color);
        Ok(())
    }

    fn record_move(&mut self, pt: Option<Point>, color: Color) {
        self.last_move2 = self.last_move;
        self.last_move = pt;
        self.to_play = color.opponent();
        self.moves_played += 1;
    }

    /// If every on-board neighbour of the empty point `pt` is a stone of one
    /// colour, return that colour. May be a false eye.
    pub fn eyeish_color(&self, pt: Point) -> Option<Color> {
        if self.cell(pt) != Cell::Empty {
            return None;
        }
        let mut eye_color = None;
        for n in self.neighbors(pt) {
            match self.cells[n] {
                Cell::Border => continue,
                Cell::Empty => return None,
                Cell::Stone(c) => match eye_color {
                    None => eye_color = Some(c),
                    Some(e) if e != c => return None,
                    Some(_) => {}
                },
            }
        }
        eye_color
    }

    /// Check whether `pt` is a true eye of `color`.
    ///
    /// The point must be eyeish and have at most one opponent stone on its
    /// diagonals; on the edge, none.
    pub fn is_eye(&self, pt: Point, color: Color) -> bool {
        if self.eyeish_color(pt) != Some(color) {
            return false;
        }
        let mut at_edge = false;
        let mut false_count = 0;
        for d in self.diagonal_neighbors(pt) {
            match self.cells[d] {
                Cell::Border => at_edge = true,
                Cell::Stone(c) if c != color => false_count += 1,
                _ => {}
            }
        }
        false_count + usize::from(at_edge) < 2
    }

    /// Area of each colour: stones plus empty regions bordered only by that colour.
    ///
    /// Returns `(black, white)`.
    pub fn areas(&self) -> (usize, usize) {
        let mut black = 0;
        let mut white = 0;
        let mut visited = vec![false; self.cells.len()];

        for pt in self.points() {
            match self.cells[pt] {
                Cell::Stone(Color::Black) => black += 1,
                Cell::Stone(Color::White) => white += 1,
                Cell::Empty if !visited[pt] => {
                    let mut region = 0;
                    let mut touches_black = false;
                    let mut touches_white = false;
                    let mut stack = vec![pt];
                    visited[pt] = true;
                    while let Some(p) = stack.pop() {
                        region += 1;
                        for n in self.neighbors(p) {
                            match self.cells[n] {
                                Cell::Empty if !visited[n] => {
                                    visited[n] = true;
                                    stack.push(n);
                                }
                                Cell::Stone(Color::Black) => touches_black = true,
                                Cell::Stone(Color::White) => touches_white = true,
                                _ => {}
                            }
                        }
                    }
                    match (touches_black, touches_white) {
                        (true, false) => black += region,
                        (false, true) => white += region,
                        _ => {}
                    }
                }
                _ => {}
            }
        }
        (black, white)
    }

    /// Area score from Black's point of view, komi included.
    pub fn score(&self, komi: f64) -> f64 {
        let (black, white) = self.areas();
        black as f64 - white as f64 - komi
    }

    /// The winner under area scoring. Black needs to exceed komi; ties go to White.
    pub fn winner(&self, komi: f64) -> Color {
        if self.score(komi) > 0.0 {
            Color::Black
        } else {
            Color::White
        }
    }

    /// Parse a GTP vertex (e.g. `D4`, `pass`).
    pub fn parse_move(&self, s: &str) -> Result<Move> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("pass") {
            return Ok(Move::Pass);
        }
        let mut chars = s.chars();
        let letter = chars
            .next()
            .ok_or_else(|| anyhow!("empty vertex"))?
            .to_ascii_uppercase();
        // 'I' is skipped in Go coordinates
        let col = COLUMN_LETTERS
            .iter()
            .position(|&b| b as char == letter)
            .map(|i| i + 1)
            .ok_or_else(|| anyhow!("invalid vertex '{s}'"))?;
        let row: usize = chars
            .as_str()
            .parse()
            .with_context(|| format!("invalid vertex '{s}'"))?;
        self.point(row, col)
            .map(Move::Play)
            .ok_or_else(|| anyhow!("vertex '{s}' is off the board"))
    }

    /// Format a point as a GTP vertex (e.g. `D4`).
    pub fn format_point(&self, pt: Point) -> String {
        let (row, col) = self.coord(pt);
        format!("{}{row}", COLUMN_LETTERS[col - 1] as char)
    }

    /// Format a move as a GTP vertex, `pass` for a pass.
    pub fn format_move(&self, mv: Move) -> String {
        match mv {
            Move::Pass => "pass".into(),
            Move::Play(pt) => self.format_point(pt),
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in (1..=self.size).rev() {
            write!(f, "{row:2}")?;
            for col in 1..=self.size {
                let ch = match self.cells[row * self.stride + col] {
                    Cell::Stone(Color::Black) => 'X',
                    Cell::Stone(Color::White) => 'O',
                    _ => '.',
                };
                write!(f, " {ch}")?;
            }
            writeln!(f)?;
        }
        write!(f, "  ")?;
        for &letter in &COLUMN_LETTERS[..self.size] {
            write!(f, " {}", letter as char)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mv(board: &Board, s: &str) -> Move {
        board.parse_move(s).unwrap()
    }

    fn pt(board: &Board, s: &str) -> Point {
        mv(board, s).point().unwrap()
    }

    fn play_all(board: &mut Board, color: Color, vertices: &[&str]) {
        for v in vertices {
            let m = mv(board, v);
            board.play(m, color).unwrap();
        }
    }

    #[test]
    fn test_empty_board() {
        let board = Board::new(7).unwrap();
        assert_eq!(board.points().count(), 49);
        assert_eq!(board.empty_points().len(), 49);
        assert_eq!(board.to_play(), Color::Black);
        assert_eq!(board.last_move(), None);
        assert_eq!(board.legal_moves(Color::Black).len(), 49);
    }

    #[test]
    fn test_rejects_bad_sizes() {
        assert!(Board::new(1).is_err());
        assert!(Board::new(20).is_err());
        assert!(Board::new(19).is_ok());
    }

    #[test]
    fn test_parse_format_roundtrip() {
        let board = Board::new(9).unwrap();
        for p in board.points() {
            let s = board.format_point(p);
            assert_eq!(board.parse_move(&s).unwrap(), Move::Play(p), "roundtrip {s}");
        }
        assert_eq!(board.parse_move("PASS").unwrap(), Move::Pass);
        assert_eq!(board.format_point(pt(&board, "J9")), "J9");
        assert!(board.parse_move("I5").is_err());
        assert!(board.parse_move("K1").is_err());
        assert!(board.parse_move("A0").is_err());
    }

    #[test]
    fn test_neighbors_of_corner_touch_border() {
        let board = Board::new(7).unwrap();
        let a1 = pt(&board, "A1");
        let borders = board
            .neighbors(a1)
            .iter()
            .filter(|&&n| board.cell(n) == Cell::Border)
            .count();
        assert_eq!(borders, 2);
        let g7 = pt(&board, "G7");
        let borders = board
            .diagonal_neighbors(g7)
            .iter()
            .filter(|&&n| board.cell(n) == Cell::Border)
            .count();
        assert_eq!(borders, 3);
    }

    #[test]
    fn test_play_updates_metadata() {
        let mut board = Board::new(7).unwrap();
        let d4 = pt(&board, "D4");
        board.play(Move::Play(d4), Color::Black).unwrap();
        assert_eq!(board.cell(d4), Cell::Stone(Color::Black));
        assert_eq!(board.to_play(), Color::White);
        assert_eq!(board.last_move(), Some(d4));
        assert_eq!(board.liberty_count(d4, Color::Black), 4);
        assert_eq!(board.liberty_count(d4, Color::White), 0);

        board.play(Move::Pass, Color::White).unwrap();
        assert_eq!(board.last_move(), None);
        assert_eq!(board.last_moves(), [None, Some(d4)]);
        assert_eq!(board.consecutive_passes(), 1);
        assert_eq!(board.moves_played(), 2);
    }

    #[test]
    fn test_occupied() {
        let mut board = Board::new(7).unwrap();
        play_all(&mut board, Color::Black, &["D4"]);
        let d4 = mv(&board, "D4");
        assert_eq!(board.play(d4, Color::White), Err(MoveError::Occupied));
    }

    #[test]
    fn test_suicide() {
        let mut board = Board::new(7).unwrap();
        play_all(&mut board, Color::Black, &["A2", "B1"]);
        let a1 = mv(&board, "A1");
        assert!(!board.is_legal(a1, Color::White));
        assert_eq!(board.play(a1, Color::White), Err(MoveError::Suicide));
        // Filling its own eye is legal for Black
        assert!(board.is_legal(a1, Color::Black));
    }

    #[test]
    fn test_capture_group() {
        let mut board = Board::new(7).unwrap();
        play_all(&mut board, Color::White, &["D4", "D5"]);
        play_all(&mut board, Color::Black, &["C4", "C5", "E4", "E5", "D3"]);
        let d4 = pt(&board, "D4");
        assert_eq!(board.single_liberty(d4, Color::White), Some(pt(&board, "D6")));
        assert_eq!(board.group(d4).len(), 2);

        play_all(&mut board, Color::Black, &["D6"]);
        assert_eq!(board.cell(d4), Cell::Empty);
        assert_eq!(board.cell(pt(&board, "D5")), Cell::Empty);
    }

    #[test]
    fn test_capture_is_not_suicide() {
        let mut board = Board::new(7).unwrap();
        play_all(&mut board, Color::White, &["A2", "B1"]);
        play_all(&mut board, Color::Black, &["A3", "B2", "C1"]);
        // A1 has no empty neighbour but captures both white stones
        let a1 = mv(&board, "A1");
        assert!(board.is_legal(a1, Color::Black));
        board.play(a1, Color::Black).unwrap();
        assert_eq!(board.cell(pt(&board, "A2")), Cell::Empty);
        assert_eq!(board.cell(pt(&board, "B1")), Cell::Empty);
    }

    #[test]
    fn test_simple_ko() {
        // 3 . X O .
        // 2 X O . O
        // 1 . X O .
        let mut board = Board::new(7).unwrap();
        play_all(&mut board, Color::Black, &["B3", "A2", "B1"]);
        play_all(&mut board, Color::White, &["C3", "B2", "D2", "C1"]);
        play_all(&mut board, Color::Black, &["C2"]);

        let b2 = mv(&board, "B2");
        assert_eq!(board.cell(pt(&board, "B2")), Cell::Empty);
        assert!(!board.is_legal(b2, Color::White));
        assert_eq!(board.play(b2, Color::White), Err(MoveError::Ko));

        // After an exchange elsewhere the ko can be retaken
        play_all(&mut board, Color::White, &["F6"]);
        play_all(&mut board, Color::Black, &["F2"]);
        assert!(board.is_legal(b2, Color::White));
        board.play(b2, Color::White).unwrap();
        assert_eq!(board.cell(pt(&board, "C2")), Cell::Empty);
    }

    #[test]
    fn test_eyes() {
        let mut board = Board::new(7).unwrap();
        play_all(&mut board, Color::Black, &["A2", "B1"]);
        let a1 = pt(&board, "A1");
        assert_eq!(board.eyeish_color(a1), Some(Color::Black));
        assert!(board.is_eye(a1, Color::Black));
        assert!(!board.is_eye(a1, Color::White));

        // An opponent stone on the only inner diagonal makes it false
        play_all(&mut board, Color::White, &["B2"]);
        assert!(!board.is_eye(a1, Color::Black));

        let empty = Board::new(7).unwrap();
        assert_eq!(empty.eyeish_color(pt(&empty, "D4")), None);
    }

    #[test]
    fn test_center_eye_tolerates_one_bad_diagonal() {
        let mut board = Board::new(7).unwrap();
        play_all(&mut board, Color::Black, &["D3", "C4", "E4", "D5"]);
        let d4 = pt(&board, "D4");
        assert!(board.is_eye(d4, Color::Black));
        play_all(&mut board, Color::White, &["C3"]);
        assert!(board.is_eye(d4, Color::Black));
        play_all(&mut board, Color::White, &["E5"]);
        assert!(!board.is_eye(d4, Color::Black));
    }

    #[test]
    fn test_scoring() {
        let mut board = Board::new(7).unwrap();
        assert_eq!(board.areas(), (0, 0));
        assert_eq!(board.winner(6.5), Color::White);

        play_all(&mut board, Color::Black, &["D4"]);
        assert_eq!(board.areas(), (49, 0));
        assert_eq!(board.winner(6.5), Color::Black);

        // Shared empty region counts for nobody
        play_all(&mut board, Color::White, &["A1"]);
        assert_eq!(board.areas(), (1, 1));
        assert_eq!(board.winner(0.5), Color::White);
    }

    #[test]
    fn test_clear() {
        let mut board = Board::new(5).unwrap();
        play_all(&mut board, Color::Black, &["C3"]);
        board.clear();
        assert_eq!(board, Board::new(5).unwrap());
    }

    #[test]
    fn test_display() {
        let mut board = Board::new(3).unwrap();
        play_all(&mut board, Color::Black, &["A1"]);
        play_all(&mut board, Color::White, &["C3"]);
        let text = board.to_string();
        assert_eq!(text, " 3 . . O\n 2 . . .\n 1 X . .\n   A B C");
    }
}
