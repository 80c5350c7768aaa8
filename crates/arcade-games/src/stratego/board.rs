//! The 10×10 Stratego board: setup, move legality, and combat.

use arcade_protocol::{BoardPos, Color, MoveResultKind};

use super::piece::{Deck, Piece, Rank};

pub const ROWS: usize = 10;
pub const COLS: usize = 10;

/// Rows of the two lakes.
const LAKE_ROWS: [usize; 2] = [4, 5];
/// Columns of the two lakes.
const LAKE_COLS: [usize; 4] = [2, 3, 6, 7];

/// Wire encoding of a lake cell.
pub const LAKE_CELL: &str = "XX";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Lake,
    Piece(Piece),
}

/// Why a move was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IllegalMove {
    #[error("position off the board")]
    OutOfBounds,
    #[error("source and destination are the same cell")]
    NoMovement,
    #[error("moves must be along a row or a column")]
    Diagonal,
    #[error("lakes cannot be entered or left")]
    Lake,
    #[error("no piece of the moving color at the source")]
    NotOwnPiece,
    #[error("bombs and flags cannot move")]
    Immovable,
    #[error("destination holds a piece of the same color")]
    FriendlyTarget,
    #[error("only scouts move more than one cell")]
    TooFar,
    #[error("path is blocked")]
    Blocked,
}

/// What happened when a move was carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    pub kind: MoveResultKind,
    /// Set when the move captured a flag: the capturing color.
    pub flag_captured_by: Option<Color>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: [[Cell; COLS]; ROWS],
}

impl Board {
    /// A board holding only the lakes.
    pub fn empty() -> Self {
        let mut cells = [[Cell::Empty; COLS]; ROWS];
        for r in LAKE_ROWS {
            for c in LAKE_COLS {
                cells[r][c] = Cell::Lake;
            }
        }
        Self { cells }
    }

    /// Places both decks. Red's back row lands on board row 9, blue's on
    /// row 0; blue's columns are mirrored so each side's deck reads the
    /// same way from its own end of the board.
    pub fn setup(red: &Deck, blue: &Deck) -> Self {
        let mut board = Self::empty();
        for r in 0..4 {
            for c in 0..COLS {
                board.cells[ROWS - 1 - r][c] = Cell::Piece(Piece::new(Color::Red, red.at(r, c)));
                board.cells[r][COLS - 1 - c] =
                    Cell::Piece(Piece::new(Color::Blue, blue.at(r, c)));
            }
        }
        board
    }

    fn in_bounds(pos: BoardPos) -> bool {
        pos.row < ROWS && pos.col < COLS
    }

    /// The cell at `pos`, or `None` off the board.
    pub fn get(&self, pos: BoardPos) -> Option<Cell> {
        Self::in_bounds(pos).then(|| self.cells[pos.row][pos.col])
    }

    /// Overwrites a cell. Positions off the board are ignored.
    pub fn set(&mut self, pos: BoardPos, cell: Cell) {
        if Self::in_bounds(pos) {
            self.cells[pos.row][pos.col] = cell;
        }
    }

    /// Checks whether `color` may move the piece at `from` to `to`.
    pub fn check_move(&self, color: Color, from: BoardPos, to: BoardPos) -> Result<(), IllegalMove> {
        let (Some(src), Some(dst)) = (self.get(from), self.get(to)) else {
            return Err(IllegalMove::OutOfBounds);
        };
        if from == to {
            return Err(IllegalMove::NoMovement);
        }
        if from.row != to.row && from.col != to.col {
            return Err(IllegalMove::Diagonal);
        }
        if src == Cell::Lake || dst == Cell::Lake {
            return Err(IllegalMove::Lake);
        }
        let mover = match src {
            Cell::Piece(p) if p.color == color => p,
            _ => return Err(IllegalMove::NotOwnPiece),
        };
        if !mover.rank.is_movable() {
            return Err(IllegalMove::Immovable);
        }
        if matches!(dst, Cell::Piece(p) if p.color == color) {
            return Err(IllegalMove::FriendlyTarget);
        }

        let distance = from.row.abs_diff(to.row) + from.col.abs_diff(to.col);
        if distance == 1 {
            return Ok(());
        }
        if mover.rank != Rank::Scout {
            return Err(IllegalMove::TooFar);
        }
        if self.path_between(from, to).any(|pos| self.cells[pos.row][pos.col] != Cell::Empty) {
            return Err(IllegalMove::Blocked);
        }
        Ok(())
    }

    pub fn is_legal(&self, color: Color, from: BoardPos, to: BoardPos) -> bool {
        self.check_move(color, from, to).is_ok()
    }

    /// Cells strictly between two positions on the same row or column.
    fn path_between(&self, from: BoardPos, to: BoardPos) -> impl Iterator<Item = BoardPos> {
        let steps = from.row.abs_diff(to.row) + from.col.abs_diff(to.col);
        let step = |a: usize, b: usize, i: usize| {
            if b > a {
                a + i
            } else if b < a {
                a - i
            } else {
                a
            }
        };
        (1..steps).map(move |i| BoardPos::new(step(from.row, to.row, i), step(from.col, to.col, i)))
    }

    /// Carries out a move that [`check_move`](Self::check_move) accepted.
    pub fn resolve(&mut self, from: BoardPos, to: BoardPos) -> MoveOutcome {
        let attacker = match self.get(from) {
            Some(Cell::Piece(p)) => p,
            _ => {
                return MoveOutcome {
                    kind: MoveResultKind::Movement,
                    flag_captured_by: None,
                };
            }
        };

        let defender = match self.get(to) {
            Some(Cell::Piece(p)) => p,
            _ => {
                self.set(to, Cell::Piece(attacker));
                self.set(from, Cell::Empty);
                return MoveOutcome {
                    kind: MoveResultKind::Movement,
                    flag_captured_by: None,
                };
            }
        };

        self.set(from, Cell::Empty);
        let (kind, flag_captured_by) = if attacker.rank.beats_when_attacking(defender.rank) {
            self.set(to, Cell::Piece(attacker));
            let flag = (defender.rank == Rank::Flag).then_some(attacker.color);
            (MoveResultKind::AttackSuccess, flag)
        } else if defender.rank.strength() == attacker.rank.strength() {
            self.set(to, Cell::Empty);
            (MoveResultKind::Tie, None)
        } else {
            (MoveResultKind::AttackFail, None)
        };

        MoveOutcome {
            kind,
            flag_captured_by,
        }
    }

    /// Whether `color` has at least one legal move anywhere.
    pub fn has_legal_move(&self, color: Color) -> bool {
        const DIRS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
        self.positions().any(|from| {
            DIRS.iter().any(|(dr, dc)| {
                let row = from.row.checked_add_signed(*dr);
                let col = from.col.checked_add_signed(*dc);
                match (row, col) {
                    (Some(row), Some(col)) => self.is_legal(color, from, BoardPos::new(row, col)),
                    _ => false,
                }
            })
        })
    }

    fn positions(&self) -> impl Iterator<Item = BoardPos> {
        (0..ROWS).flat_map(|r| (0..COLS).map(move |c| BoardPos::new(r, c)))
    }

    /// Number of pieces of either color on the board.
    pub fn piece_count(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|c| matches!(c, Cell::Piece(_)))
            .count()
    }

    /// Row-major wire encoding: `<color><piece>`, `XX` for lakes, empty
    /// string for empty cells.
    pub fn serialize(&self) -> Vec<String> {
        self.cells
            .iter()
            .flatten()
            .map(|cell| match cell {
                Cell::Empty => String::new(),
                Cell::Lake => LAKE_CELL.to_string(),
                Cell::Piece(p) => p.to_string(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(row: usize, col: usize) -> BoardPos {
        BoardPos::new(row, col)
    }

    fn put(board: &mut Board, at: BoardPos, color: Color, rank: Rank) {
        board.set(at, Cell::Piece(Piece::new(color, rank)));
    }

    #[test]
    fn test_empty_has_eight_lakes() {
        let board = Board::empty();
        let lakes = board.serialize().iter().filter(|c| *c == LAKE_CELL).count();
        assert_eq!(lakes, 8);
        assert_eq!(board.get(pos(4, 2)), Some(Cell::Lake));
        assert_eq!(board.get(pos(5, 7)), Some(Cell::Lake));
    }

    #[test]
    fn test_setup_places_and_mirrors_decks() {
        let deck = Deck::standard();
        let board = Board::setup(&deck, &deck);

        // Deck index 0 (back row, column 0) is the flag.
        assert_eq!(board.get(pos(9, 0)), Some(Cell::Piece(Piece::new(Color::Red, Rank::Flag))));
        assert_eq!(board.get(pos(0, 9)), Some(Cell::Piece(Piece::new(Color::Blue, Rank::Flag))));
        // Front rows face each other.
        assert_eq!(board.get(pos(6, 1)), Some(Cell::Piece(Piece::new(Color::Red, Rank::Spy))));
        assert_eq!(board.get(pos(3, 8)), Some(Cell::Piece(Piece::new(Color::Blue, Rank::Spy))));
        assert_eq!(board.piece_count(), 80);
    }

    #[test]
    fn test_serialize_has_100_cells_with_encodings() {
        let board = Board::setup(&Deck::standard(), &Deck::standard());
        let cells = board.serialize();
        assert_eq!(cells.len(), 100);
        assert_eq!(cells[90], "rF");
        assert_eq!(cells[9], "bF");
        assert_eq!(cells[42], "XX");
        assert_eq!(cells[40], "");
    }

    #[test]
    fn test_check_move_one_step_forward() {
        let board = Board::setup(&Deck::standard(), &Deck::standard());
        assert!(board.is_legal(Color::Red, pos(6, 0), pos(5, 0)));
        assert!(board.is_legal(Color::Blue, pos(3, 0), pos(4, 0)));
    }

    #[test]
    fn test_check_move_rejections() {
        let board = Board::setup(&Deck::standard(), &Deck::standard());
        assert_eq!(board.check_move(Color::Red, pos(6, 0), pos(6, 0)), Err(IllegalMove::NoMovement));
        assert_eq!(board.check_move(Color::Red, pos(6, 0), pos(5, 1)), Err(IllegalMove::Diagonal));
        assert_eq!(board.check_move(Color::Red, pos(6, 2), pos(5, 2)), Err(IllegalMove::Lake));
        assert_eq!(board.check_move(Color::Red, pos(3, 0), pos(4, 0)), Err(IllegalMove::NotOwnPiece));
        assert_eq!(board.check_move(Color::Red, pos(9, 7), pos(8, 7)), Err(IllegalMove::FriendlyTarget));
        assert_eq!(board.check_move(Color::Red, pos(6, 0), pos(10, 0)), Err(IllegalMove::OutOfBounds));
    }

    #[test]
    fn test_check_move_immovable_pieces() {
        let mut board = Board::empty();
        put(&mut board, pos(7, 0), Color::Red, Rank::Bomb);
        put(&mut board, pos(7, 5), Color::Red, Rank::Flag);
        assert_eq!(board.check_move(Color::Red, pos(7, 0), pos(6, 0)), Err(IllegalMove::Immovable));
        assert_eq!(board.check_move(Color::Red, pos(7, 5), pos(6, 5)), Err(IllegalMove::Immovable));
    }

    #[test]
    fn test_check_move_non_scout_limited_to_one_cell() {
        let mut board = Board::empty();
        put(&mut board, pos(8, 0), Color::Red, Rank::Marshal);
        assert_eq!(board.check_move(Color::Red, pos(8, 0), pos(6, 0)), Err(IllegalMove::TooFar));
    }

    #[test]
    fn test_check_move_scout_long_range_clear_path() {
        let mut board = Board::empty();
        put(&mut board, pos(0, 0), Color::Red, Rank::Scout);
        assert!(board.is_legal(Color::Red, pos(0, 0), pos(0, 9)));
        assert!(board.is_legal(Color::Red, pos(0, 0), pos(9, 0)));
    }

    #[test]
    fn test_check_move_scout_blocked_by_piece_in_path() {
        let mut board = Board::empty();
        put(&mut board, pos(0, 0), Color::Red, Rank::Scout);
        put(&mut board, pos(0, 2), Color::Blue, Rank::Sergeant);
        assert_eq!(board.check_move(Color::Red, pos(0, 0), pos(0, 5)), Err(IllegalMove::Blocked));
        // Attacking the blocker itself is fine.
        assert!(board.is_legal(Color::Red, pos(0, 0), pos(0, 2)));
    }

    #[test]
    fn test_check_move_scout_blocked_by_lake() {
        let mut board = Board::empty();
        put(&mut board, pos(4, 0), Color::Red, Rank::Scout);
        assert_eq!(board.check_move(Color::Red, pos(4, 0), pos(4, 5)), Err(IllegalMove::Blocked));
    }

    #[test]
    fn test_resolve_movement_conserves_pieces() {
        let mut board = Board::setup(&Deck::standard(), &Deck::standard());
        let outcome = board.resolve(pos(6, 0), pos(5, 0));
        assert_eq!(outcome.kind, MoveResultKind::Movement);
        assert_eq!(board.piece_count(), 80);
        assert_eq!(board.get(pos(6, 0)), Some(Cell::Empty));
    }

    #[test]
    fn test_resolve_attack_success_removes_one() {
        let mut board = Board::empty();
        put(&mut board, pos(5, 0), Color::Red, Rank::General);
        put(&mut board, pos(4, 0), Color::Blue, Rank::Captain);
        let outcome = board.resolve(pos(5, 0), pos(4, 0));
        assert_eq!(outcome.kind, MoveResultKind::AttackSuccess);
        assert_eq!(board.piece_count(), 1);
        assert_eq!(board.get(pos(4, 0)), Some(Cell::Piece(Piece::new(Color::Red, Rank::General))));
    }

    #[test]
    fn test_resolve_attack_fail_removes_attacker() {
        let mut board = Board::empty();
        put(&mut board, pos(5, 0), Color::Red, Rank::Scout);
        put(&mut board, pos(4, 0), Color::Blue, Rank::Bomb);
        let outcome = board.resolve(pos(5, 0), pos(4, 0));
        assert_eq!(outcome.kind, MoveResultKind::AttackFail);
        assert_eq!(board.piece_count(), 1);
        assert_eq!(board.get(pos(4, 0)), Some(Cell::Piece(Piece::new(Color::Blue, Rank::Bomb))));
        assert_eq!(board.get(pos(5, 0)), Some(Cell::Empty));
    }

    #[test]
    fn test_resolve_tie_removes_both() {
        let mut board = Board::empty();
        put(&mut board, pos(5, 0), Color::Red, Rank::Major);
        put(&mut board, pos(4, 0), Color::Blue, Rank::Major);
        let outcome = board.resolve(pos(5, 0), pos(4, 0));
        assert_eq!(outcome.kind, MoveResultKind::Tie);
        assert_eq!(board.piece_count(), 0);
    }

    #[test]
    fn test_resolve_spy_takes_marshal_only_when_attacking() {
        let mut board = Board::empty();
        put(&mut board, pos(5, 0), Color::Red, Rank::Spy);
        put(&mut board, pos(4, 0), Color::Blue, Rank::Marshal);
        assert_eq!(board.resolve(pos(5, 0), pos(4, 0)).kind, MoveResultKind::AttackSuccess);

        let mut board = Board::empty();
        put(&mut board, pos(5, 0), Color::Red, Rank::Marshal);
        put(&mut board, pos(4, 0), Color::Blue, Rank::Spy);
        assert_eq!(board.resolve(pos(5, 0), pos(4, 0)).kind, MoveResultKind::AttackSuccess);
    }

    #[test]
    fn test_resolve_miner_defuses_bomb() {
        let mut board = Board::empty();
        put(&mut board, pos(5, 0), Color::Blue, Rank::Miner);
        put(&mut board, pos(6, 0), Color::Red, Rank::Bomb);
        assert_eq!(board.resolve(pos(5, 0), pos(6, 0)).kind, MoveResultKind::AttackSuccess);
    }

    #[test]
    fn test_resolve_flag_capture_reports_winner() {
        let mut board = Board::empty();
        put(&mut board, pos(1, 0), Color::Red, Rank::Scout);
        put(&mut board, pos(0, 0), Color::Blue, Rank::Flag);
        let outcome = board.resolve(pos(1, 0), pos(0, 0));
        assert_eq!(outcome.kind, MoveResultKind::AttackSuccess);
        assert_eq!(outcome.flag_captured_by, Some(Color::Red));
    }

    #[test]
    fn test_has_legal_move_only_bombs_and_flag() {
        let mut board = Board::empty();
        put(&mut board, pos(9, 0), Color::Red, Rank::Flag);
        put(&mut board, pos(9, 1), Color::Red, Rank::Bomb);
        put(&mut board, pos(0, 0), Color::Blue, Rank::Scout);
        assert!(!board.has_legal_move(Color::Red));
        assert!(board.has_legal_move(Color::Blue));
    }
}
