//! Board module - manages the game grid
//!
//! The board is a 10x18 grid where each cell is clear or merged with a piece kind.
//! Uses a flat array for better cache locality and zero-allocation.
//! Coordinates: (x, y) where x ranges 0..9 (left to right), y ranges 0..17 (top to bottom).
//! Rows above the top edge (y < 0) are off-screen but legal for a falling piece.

use arrayvec::ArrayVec;

use crate::pieces::Piece;
use crate::types::{Cell, PieceKind, BOARD_HEIGHT, BOARD_WIDTH};

/// Total number of cells on the board
const BOARD_SIZE: usize = (BOARD_WIDTH as usize) * (BOARD_HEIGHT as usize);

/// Row indices removed by one sweep (top to bottom, pre-sweep coordinates).
pub type ClearedRows = ArrayVec<usize, { BOARD_HEIGHT as usize }>;

/// The game board - 10 columns x 18 rows using flat array storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// Flat array of cells, row-major order (y * WIDTH + x)
    cells: [Cell; BOARD_SIZE],
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Self {
            cells: [Cell::Clear; BOARD_SIZE],
        }
    }

    #[inline(always)]
    fn index(x: i8, y: i8) -> Option<usize> {
        if x < 0 || x >= BOARD_WIDTH as i8 || y < 0 || y >= BOARD_HEIGHT as i8 {
            return None;
        }
        Some((y as usize) * (BOARD_WIDTH as usize) + (x as usize))
    }

    pub fn width(&self) -> u8 {
        BOARD_WIDTH
    }

    pub fn height(&self) -> u8 {
        BOARD_HEIGHT
    }

    /// Get cell at position (x, y)
    /// Returns None if out of bounds
    pub fn get(&self, x: i8, y: i8) -> Option<Cell> {
        Self::index(x, y).map(|idx| self.cells[idx])
    }

    /// Set cell at position (x, y)
    /// Returns false if out of bounds
    pub fn set(&mut self, x: i8, y: i8, cell: Cell) -> bool {
        match Self::index(x, y) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Merge a single cell (test and fixture helper)
    pub fn merge(&mut self, x: i8, y: i8, kind: PieceKind) -> bool {
        self.set(x, y, Cell::Merged(kind))
    }

    /// Check if position is inside the board and merged
    pub fn is_merged(&self, x: i8, y: i8) -> bool {
        matches!(self.get(x, y), Some(Cell::Merged(_)))
    }

    /// Check if a row has every cell merged
    pub fn is_row_full(&self, y: usize) -> bool {
        self.row(y)
            .map(|row| row.iter().all(Cell::is_merged))
            .unwrap_or(false)
    }

    /// Borrow one row; None past the bottom
    pub fn row(&self, y: usize) -> Option<&[Cell]> {
        if y >= BOARD_HEIGHT as usize {
            return None;
        }
        let start = y * BOARD_WIDTH as usize;
        Some(&self.cells[start..start + BOARD_WIDTH as usize])
    }

    /// Remove every full row and prepend an empty row for each.
    ///
    /// Rows are scanned top to bottom. Surviving rows keep their relative
    /// order. Uses a bottom-up two-pointer compaction, so nothing is allocated.
    pub fn sweep_full_rows(&mut self) -> ClearedRows {
        let mut cleared = ClearedRows::new();
        let width = BOARD_WIDTH as usize;
        let mut write_y = BOARD_HEIGHT as usize;

        for read_y in (0..BOARD_HEIGHT as usize).rev() {
            if self.is_row_full(read_y) {
                cleared.push(read_y);
            } else {
                write_y -= 1;
                if write_y != read_y {
                    let src = read_y * width;
                    self.cells.copy_within(src..src + width, write_y * width);
                }
            }
        }

        self.cells[..write_y * width].fill(Cell::Clear);

        cleared.reverse();
        cleared
    }

    /// Get a reference to the internal cells array
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Write the board as a `u8` grid (0 = clear, 1..=7 = piece code)
    pub fn write_u8_grid(&self, out: &mut [[u8; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize]) {
        for (y, row) in out.iter_mut().enumerate() {
            let start = y * BOARD_WIDTH as usize;
            for (x, v) in row.iter_mut().enumerate() {
                *v = self.cells[start + x].code();
            }
        }
    }

    /// Number of merged cells on the board
    pub fn merged_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_merged()).count()
    }

    /// Clear the entire board
    pub fn clear(&mut self) {
        self.cells.fill(Cell::Clear);
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether `piece`, shifted by `offset`, would be in an illegal spot.
///
/// A cell collides when its column is outside `[0, width)`, its row is at or
/// past the bottom, or it lands on a merged cell. Rows above the top edge never
/// collide. Every movement goes through this predicate.
pub fn collides(piece: &Piece, board: &Board, offset: (i8, i8)) -> bool {
    let (dx, dy) = offset;
    piece.cells().any(|(x, y)| {
        let x = x + dx;
        let y = y + dy;
        if x < 0 || x >= BOARD_WIDTH as i8 || y >= BOARD_HEIGHT as i8 {
            return true;
        }
        y >= 0 && board.is_merged(x, y)
    })
}

/// Board with the piece's cells written as merged at its current position.
///
/// Cells above the top edge are dropped. The piece itself is untouched.
pub fn settle(piece: &Piece, board: &Board) -> Board {
    let mut next = board.clone();
    for (x, y) in piece.cells() {
        next.set(x, y, Cell::Merged(piece.kind));
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill_row(board: &mut Board, y: i8, kind: PieceKind) {
        for x in 0..BOARD_WIDTH as i8 {
            board.merge(x, y, kind);
        }
    }

    #[test]
    fn test_board_index_calculation() {
        assert_eq!(Board::index(0, 0), Some(0));
        assert_eq!(Board::index(9, 0), Some(9));
        assert_eq!(Board::index(0, 1), Some(10));
        assert_eq!(Board::index(9, 17), Some(179));
        assert_eq!(Board::index(-1, 0), None);
        assert_eq!(Board::index(10, 0), None);
        assert_eq!(Board::index(0, 18), None);
    }

    #[test]
    fn test_collides_walls_and_floor() {
        let board = Board::new();
        let mut piece = Piece::spawn(PieceKind::O);

        piece.x = 0;
        assert!(!collides(&piece, &board, (0, 0)));
        assert!(collides(&piece, &board, (-1, 0)));

        piece.x = 8;
        assert!(!collides(&piece, &board, (0, 0)));
        assert!(collides(&piece, &board, (1, 0)));

        piece.y = 16;
        assert!(!collides(&piece, &board, (0, 0)));
        assert!(collides(&piece, &board, (0, 1)));
    }

    #[test]
    fn test_collides_ignores_rows_above_top() {
        let board = Board::new();
        let mut piece = Piece::spawn(PieceKind::I);
        piece.y = -10;
        assert!(!collides(&piece, &board, (0, 0)));
        // Horizontal bounds still apply above the board.
        piece.x = -1;
        assert!(collides(&piece, &board, (0, 0)));
    }

    #[test]
    fn test_collides_with_merged_cells_only() {
        let mut board = Board::new();
        let piece = Piece::spawn(PieceKind::O); // cells (4,0) (5,0) (4,1) (5,1)
        board.merge(4, 2, PieceKind::Z);
        assert!(!collides(&piece, &board, (0, 0)));
        assert!(collides(&piece, &board, (0, 1)));
        assert!(!collides(&piece, &board, (2, 1)));
    }

    #[test]
    fn test_settle_writes_merged_cells_without_mutating_input() {
        let board = Board::new();
        let mut piece = Piece::spawn(PieceKind::T);
        piece.y = 5;
        let settled = settle(&piece, &board);

        assert_eq!(board.merged_count(), 0);
        assert_eq!(settled.merged_count(), 4);
        assert_eq!(settled.get(4, 5), Some(Cell::Merged(PieceKind::T)));
        assert_eq!(settled.get(5, 6), Some(Cell::Merged(PieceKind::T)));
        assert_eq!(piece.y, 5);
    }

    #[test]
    fn test_settle_drops_cells_above_top() {
        let board = Board::new();
        let mut piece = Piece::spawn(PieceKind::J); // rows 0..=2 of the matrix
        piece.y = -2;
        let settled = settle(&piece, &board);
        // Only the bottom matrix row (two cells) is on the board.
        assert_eq!(settled.merged_count(), 2);
    }

    #[test]
    fn test_sweep_keeps_order_and_prepends_empty_rows() {
        let mut board = Board::new();
        fill_row(&mut board, 3, PieceKind::I);
        fill_row(&mut board, 7, PieceKind::I);
        board.merge(0, 2, PieceKind::S);
        board.merge(1, 5, PieceKind::T);
        board.merge(2, 10, PieceKind::L);

        let cleared = board.sweep_full_rows();
        assert_eq!(cleared.as_slice(), &[3, 7]);

        // Row 2 had two rows added above it; row 5 one; row 10 none.
        assert_eq!(board.get(0, 4), Some(Cell::Merged(PieceKind::S)));
        assert_eq!(board.get(1, 6), Some(Cell::Merged(PieceKind::T)));
        assert_eq!(board.get(2, 10), Some(Cell::Merged(PieceKind::L)));
        assert!(board.row(0).unwrap().iter().all(|c| *c == Cell::Clear));
        assert!(board.row(1).unwrap().iter().all(|c| *c == Cell::Clear));
        assert_eq!(board.merged_count(), 3);
    }

    #[test]
    fn test_sweep_without_full_rows_is_noop() {
        let mut board = Board::new();
        board.merge(3, 17, PieceKind::O);
        let before = board.clone();
        assert!(board.sweep_full_rows().is_empty());
        assert_eq!(board, before);
    }

    #[test]
    fn test_u8_grid() {
        let mut board = Board::new();
        board.merge(9, 17, PieceKind::Z);
        let mut grid = [[0u8; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize];
        board.write_u8_grid(&mut grid);
        assert_eq!(grid[17][9], PieceKind::Z.code());
        assert_eq!(grid[0][0], 0);
    }
}
