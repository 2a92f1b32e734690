//! Pieces module - tetromino catalog, shape matrices and rotation
//!
//! Shapes are small square 0/1 matrices. Rotation works on the matrix itself
//! (transpose, then reverse) rather than on per-rotation lookup tables, and the
//! wall kick is a simple alternating horizontal search instead of SRS tables.

use crate::board::{collides, Board};
use crate::types::{PieceKind, Rgb, BOARD_WIDTH, MAX_SHAPE_SIZE};

/// Square occupancy matrix of a piece, stored in a fixed 4x4 buffer.
///
/// Only the top-left `size x size` region is meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeMatrix {
    size: u8,
    cells: [[bool; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE],
}

impl ShapeMatrix {
    /// Build from rows of 0/1 values. Every row must be as long as the row count.
    pub fn from_rows(rows: &[&[u8]]) -> Self {
        let size = rows.len().min(MAX_SHAPE_SIZE);
        let mut cells = [[false; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE];
        for (y, row) in rows.iter().take(size).enumerate() {
            for (x, v) in row.iter().take(size).enumerate() {
                cells[y][x] = *v != 0;
            }
        }
        Self {
            size: size as u8,
            cells,
        }
    }

    /// Side length of the matrix (also its width).
    pub fn size(&self) -> u8 {
        self.size
    }

    pub fn width(&self) -> u8 {
        self.size
    }

    pub fn is_filled(&self, x: usize, y: usize) -> bool {
        x < self.size as usize && y < self.size as usize && self.cells[y][x]
    }

    /// Offsets `(dx, dy)` of every occupied cell, row-major.
    pub fn occupied(&self) -> impl Iterator<Item = (i8, i8)> + '_ {
        let n = self.size as usize;
        (0..n).flat_map(move |y| {
            (0..n).filter_map(move |x| self.cells[y][x].then_some((x as i8, y as i8)))
        })
    }

    /// Rows as 0/1 values (for snapshots and the wire protocol).
    pub fn rows(&self) -> Vec<Vec<u8>> {
        let n = self.size as usize;
        (0..n)
            .map(|y| (0..n).map(|x| self.cells[y][x] as u8).collect())
            .collect()
    }

    fn transposed(&self) -> Self {
        let n = self.size as usize;
        let mut cells = [[false; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE];
        for (y, row) in cells.iter_mut().enumerate().take(n) {
            for (x, cell) in row.iter_mut().enumerate().take(n) {
                *cell = self.cells[x][y];
            }
        }
        Self {
            size: self.size,
            cells,
        }
    }

    /// Rotate 90 degrees.
    ///
    /// Clockwise reverses each row of the transpose; counter-clockwise reverses
    /// the row order of the transpose.
    pub fn rotated(&self, clockwise: bool) -> Self {
        let n = self.size as usize;
        let mut out = self.transposed();
        if clockwise {
            for row in out.cells.iter_mut().take(n) {
                row[..n].reverse();
            }
        } else {
            out.cells[..n].reverse();
        }
        out
    }
}

/// Canonical rotation-0 shape for a piece kind.
pub fn spawn_shape(kind: PieceKind) -> ShapeMatrix {
    match kind {
        PieceKind::I => ShapeMatrix::from_rows(&[
            &[0, 0, 0, 0],
            &[1, 1, 1, 1],
            &[0, 0, 0, 0],
            &[0, 0, 0, 0],
        ]),
        PieceKind::J => ShapeMatrix::from_rows(&[&[0, 1, 0], &[0, 1, 0], &[1, 1, 0]]),
        PieceKind::L => ShapeMatrix::from_rows(&[&[0, 1, 0], &[0, 1, 0], &[0, 1, 1]]),
        PieceKind::O => ShapeMatrix::from_rows(&[&[1, 1], &[1, 1]]),
        PieceKind::S => ShapeMatrix::from_rows(&[&[0, 1, 1], &[1, 1, 0], &[0, 0, 0]]),
        PieceKind::T => ShapeMatrix::from_rows(&[&[1, 1, 1], &[0, 1, 0], &[0, 0, 0]]),
        PieceKind::Z => ShapeMatrix::from_rows(&[&[1, 1, 0], &[0, 1, 1], &[0, 0, 0]]),
    }
}

/// Active falling piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub shape: ShapeMatrix,
    pub x: i8,
    pub y: i8,
    /// Set when the piece came to rest this step; the session settles it.
    pub collided: bool,
}

impl Piece {
    /// Create a new piece at the centred spawn position on row 0
    pub fn spawn(kind: PieceKind) -> Self {
        let shape = spawn_shape(kind);
        Self {
            kind,
            shape,
            x: spawn_x(shape.width()),
            y: 0,
            collided: false,
        }
    }

    pub fn color(&self) -> Rgb {
        self.kind.color()
    }

    /// Absolute board coordinates of every occupied cell.
    pub fn cells(&self) -> impl Iterator<Item = (i8, i8)> + '_ {
        self.shape
            .occupied()
            .map(move |(dx, dy)| (self.x + dx, self.y + dy))
    }
}

/// Column where a shape of the given width spawns.
pub fn spawn_x(shape_width: u8) -> i8 {
    (BOARD_WIDTH / 2) as i8 - (shape_width / 2) as i8
}

/// Rotate with the alternating wall-kick search.
///
/// Trial shifts accumulate by `+1, -2, +3, -4, ...` from the current column
/// until the rotated shape fits. The search gives up once the next shift
/// exceeds the rotated width; `None` means the piece stays as it was.
pub fn try_rotate(piece: &Piece, board: &Board, clockwise: bool) -> Option<Piece> {
    let mut candidate = Piece {
        shape: piece.shape.rotated(clockwise),
        ..*piece
    };
    let width = candidate.shape.width() as i8;
    let mut offset: i8 = 1;

    while collides(&candidate, board, (0, 0)) {
        candidate.x += offset;
        offset = -(offset + offset.signum());
        if offset > width {
            return None;
        }
    }

    Some(candidate)
}
