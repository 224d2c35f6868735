//! 3x3 board: move legality, win and draw detection.

use serde::{Deserialize, Serialize};

pub const CELLS: usize = 9;

/// Rows, columns, diagonals.
pub const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    X,
    O,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::X, Role::O];

    pub fn opponent(self) -> Role {
        match self {
            Role::X => Role::O,
            Role::O => Role::X,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Role::X => 0,
            Role::O => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::X => "X",
            Role::O => "O",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One board square. Serializes as `""`, `"X"` or `"O"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    #[serde(rename = "")]
    Empty,
    X,
    O,
}

impl Cell {
    pub fn role(self) -> Option<Role> {
        match self {
            Cell::Empty => None,
            Cell::X => Some(Role::X),
            Cell::O => Some(Role::O),
        }
    }
}

impl From<Role> for Cell {
    fn from(role: Role) -> Self {
        match role {
            Role::X => Cell::X,
            Role::O => Cell::O,
        }
    }
}

impl From<Option<Role>> for Cell {
    fn from(role: Option<Role>) -> Self {
        role.map(Cell::from).unwrap_or_default()
    }
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardError {
    #[error("index out of range")]
    InvalidIndex,
    #[error("cell already used")]
    CellOccupied,
}

/// Result of scanning the board after a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    pub winner: Option<Role>,
    pub is_draw: bool,
}

impl Evaluation {
    pub fn is_over(&self) -> bool {
        self.winner.is_some() || self.is_draw
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct Board([Cell; CELLS]);

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cells(&self) -> &[Cell; CELLS] {
        &self.0
    }

    pub fn is_full(&self) -> bool {
        self.0.iter().all(|c| *c != Cell::Empty)
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|c| *c == Cell::Empty)
    }

    /// Returns the board with `role` placed at `index`. `self` is untouched
    /// on failure.
    pub fn apply_move(&self, role: Role, index: usize) -> Result<Board, BoardError> {
        let cell = self.0.get(index).ok_or(BoardError::InvalidIndex)?;
        if *cell != Cell::Empty {
            return Err(BoardError::CellOccupied);
        }
        let mut next = *self;
        next.0[index] = role.into();
        Ok(next)
    }

    pub fn evaluate(&self) -> Evaluation {
        let winner = LINES.iter().find_map(|&[a, b, c]| {
            let first = self.0[a];
            (first != Cell::Empty && first == self.0[b] && first == self.0[c])
                .then(|| first.role())
                .flatten()
        });
        Evaluation { winner, is_draw: winner.is_none() && self.is_full() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play(moves: &[(Role, usize)]) -> Board {
        moves
            .iter()
            .fold(Board::new(), |b, &(r, i)| b.apply_move(r, i).unwrap())
    }

    #[test]
    fn apply_move_marks_the_cell() {
        let b = Board::new().apply_move(Role::X, 4).unwrap();
        assert_eq!(b.cells()[4], Cell::X);
        assert_eq!(b.cells().iter().filter(|c| **c != Cell::Empty).count(), 1);
    }

    #[test]
    fn apply_move_rejects_out_of_range() {
        assert_eq!(Board::new().apply_move(Role::X, 9), Err(BoardError::InvalidIndex));
    }

    #[test]
    fn apply_move_never_overwrites() {
        let b = play(&[(Role::X, 0)]);
        assert_eq!(b.apply_move(Role::O, 0), Err(BoardError::CellOccupied));
        assert_eq!(b.cells()[0], Cell::X);
    }

    #[test]
    fn every_line_is_detected() {
        for line in LINES {
            let mut b = Board::new();
            for i in line {
                b = b.apply_move(Role::O, i).unwrap();
            }
            let eval = b.evaluate();
            assert_eq!(eval.winner, Some(Role::O), "line {line:?}");
            assert!(!eval.is_draw);
        }
    }

    #[test]
    fn two_in_a_row_is_not_a_win() {
        let b = play(&[(Role::X, 0), (Role::O, 4), (Role::X, 1)]);
        let eval = b.evaluate();
        assert_eq!(eval.winner, None);
        assert!(!eval.is_over());
    }

    #[test]
    fn full_board_without_line_is_a_draw() {
        // X O X
        // X O O
        // O X X
        let b = play(&[
            (Role::X, 0),
            (Role::O, 1),
            (Role::X, 2),
            (Role::O, 4),
            (Role::X, 3),
            (Role::O, 5),
            (Role::X, 7),
            (Role::O, 6),
            (Role::X, 8),
        ]);
        let eval = b.evaluate();
        assert_eq!(eval.winner, None);
        assert!(eval.is_draw);
    }

    #[test]
    fn win_on_last_cell_is_not_a_draw() {
        // X X X filled last
        let b = play(&[
            (Role::X, 0),
            (Role::O, 3),
            (Role::X, 1),
            (Role::O, 4),
            (Role::X, 6),
            (Role::O, 8),
            (Role::X, 5),
            (Role::O, 7),
            (Role::X, 2),
        ]);
        assert!(b.is_full());
        let eval = b.evaluate();
        assert_eq!(eval.winner, Some(Role::X));
        assert!(!eval.is_draw);
    }

    fn walk(board: Board, turn: Role, games: &mut usize) {
        let cells = board.cells();
        let lines: Vec<Role> = LINES
            .iter()
            .filter_map(|&[a, b, c]| {
                (cells[a] == cells[b] && cells[a] == cells[c]).then(|| cells[a].role()).flatten()
            })
            .collect();
        let eval = board.evaluate();
        assert!(lines.windows(2).all(|w| w[0] == w[1]), "{board:?}");
        assert_eq!(eval.winner, lines.first().copied(), "{board:?}");
        assert_eq!(eval.is_draw, lines.is_empty() && board.is_full(), "{board:?}");

        if eval.is_over() {
            // only the player who just moved can have completed a line
            if let Some(winner) = eval.winner {
                assert_eq!(winner, turn.opponent(), "{board:?}");
            }
            *games += 1;
            return;
        }
        for i in 0..CELLS {
            if let Ok(next) = board.apply_move(turn, i) {
                walk(next, turn.opponent(), games);
            }
        }
    }

    #[test]
    fn every_reachable_game_ends_by_the_rules() {
        let mut games = 0;
        walk(Board::new(), Role::X, &mut games);
        assert_eq!(games, 255_168);
    }

    #[test]
    fn cells_serialize_as_strings() {
        let b = play(&[(Role::X, 0), (Role::O, 8)]);
        let json = serde_json::to_string(&b).unwrap();
        assert_eq!(json, r#"["X","","","","","","","","O"]"#);
    }
}
