//! Row-major 2-D grids.
//!
//! # Ownership
//!
//! Two construction paths share one access trait:
//!
//! - [`Grid<T>`] owns its `Vec<T>` buffer.
//! - [`GridView<'a, T>`] borrows a caller-owned `&'a mut [T]`.  The caller
//!   keeps ownership and the lifetime `'a` guarantees the buffer outlives the
//!   view.  Use this for zero-copy ingestion of raster buffers owned by an
//!   I/O layer.
//!
//! In both cases the shape is fixed at construction and cell `(r, c)` lives
//! at `r * cols + c` in the backing buffer.

use std::fmt;
use std::ops::{Index, IndexMut};

use crate::{PopsError, PopsResult};

// ── Cell ──────────────────────────────────────────────────────────────────────

/// A `(row, col)` address inside a grid.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    #[inline]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Convert a signed `(row, col)` pair, returning `None` if either
    /// coordinate is negative.
    #[inline]
    pub fn from_signed(row: i64, col: i64) -> Option<Self> {
        if row < 0 || col < 0 {
            return None;
        }
        Some(Self { row: row as usize, col: col as usize })
    }

    #[inline]
    pub fn signed(self) -> (i64, i64) {
        (self.row as i64, self.col as i64)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl From<(usize, usize)> for Cell {
    #[inline]
    fn from((row, col): (usize, usize)) -> Self {
        Self { row, col }
    }
}

// ── Shared access ─────────────────────────────────────────────────────────────

/// Read/write access common to owned and borrowed grids.
///
/// Implementors only provide the shape and the raw buffer; all addressing
/// helpers are derived from those.
pub trait GridAccess<T> {
    fn rows(&self) -> usize;
    fn cols(&self) -> usize;

    /// Backing buffer in row-major order.
    fn as_slice(&self) -> &[T];

    /// Mutable backing buffer in row-major order.
    fn as_mut_slice(&mut self) -> &mut [T];

    #[inline]
    fn len(&self) -> usize {
        self.rows() * self.cols()
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `true` if the signed coordinate lies inside `[0, rows) × [0, cols)`.
    #[inline]
    fn contains(&self, row: i64, col: i64) -> bool {
        row >= 0 && col >= 0 && (row as usize) < self.rows() && (col as usize) < self.cols()
    }

    /// `None` outside the grid.
    #[inline]
    fn get(&self, row: usize, col: usize) -> Option<&T> {
        if row < self.rows() && col < self.cols() {
            self.as_slice().get(row * self.cols() + col)
        } else {
            None
        }
    }

    #[inline]
    fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut T> {
        if row < self.rows() && col < self.cols() {
            let cols = self.cols();
            self.as_mut_slice().get_mut(row * cols + col)
        } else {
            None
        }
    }

    /// `true` if `other` has the same row and column count.
    #[inline]
    fn same_shape<U, G: GridAccess<U> + ?Sized>(&self, other: &G) -> bool {
        self.rows() == other.rows() && self.cols() == other.cols()
    }

    /// All cells in row-major order.
    fn iter_cells(&self) -> CellIter {
        CellIter { rows: self.rows(), cols: self.cols(), next: 0 }
    }
}

/// Row-major iterator over the cells of a grid shape.
#[derive(Clone, Debug)]
pub struct CellIter {
    rows: usize,
    cols: usize,
    next: usize,
}

impl Iterator for CellIter {
    type Item = Cell;

    fn next(&mut self) -> Option<Cell> {
        if self.next >= self.rows * self.cols {
            return None;
        }
        let cell = Cell::new(self.next / self.cols, self.next % self.cols);
        self.next += 1;
        Some(cell)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.rows * self.cols - self.next.min(self.rows * self.cols);
        (left, Some(left))
    }
}

impl ExactSizeIterator for CellIter {}

// ── Grid ──────────────────────────────────────────────────────────────────────

/// A grid that owns its buffer.
///
/// Deserialisation goes through [`Grid::from_vec`], so a buffer whose length
/// disagrees with the shape is rejected.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawGrid<T>"))]
pub struct Grid<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

/// Unchecked serde form of [`Grid`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawGrid<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

#[cfg(feature = "serde")]
impl<T> TryFrom<RawGrid<T>> for Grid<T> {
    type Error = PopsError;

    fn try_from(raw: RawGrid<T>) -> PopsResult<Self> {
        Grid::from_vec(raw.rows, raw.cols, raw.data)
    }
}

impl<T: Clone> Grid<T> {
    /// A `rows × cols` grid with every cell set to `fill`.
    pub fn new(rows: usize, cols: usize, fill: T) -> Self {
        Self { rows, cols, data: vec![fill; rows * cols] }
    }

    /// Build from nested rows.  All rows must have the same length.
    pub fn from_rows(rows: &[Vec<T>]) -> PopsResult<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        if let Some(bad) = rows.iter().find(|r| r.len() != cols) {
            return Err(PopsError::Config(format!(
                "ragged grid rows: expected {cols} columns, found a row with {}",
                bad.len()
            )));
        }
        let data = rows.iter().flat_map(|r| r.iter().cloned()).collect();
        Ok(Self { rows: rows.len(), cols, data })
    }

    /// Fill every cell with `value`.
    pub fn fill(&mut self, value: T) {
        self.data.iter_mut().for_each(|v| *v = value.clone());
    }
}

impl<T> Grid<T> {
    /// Take ownership of a row-major buffer.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<T>) -> PopsResult<Self> {
        if data.len() != rows * cols {
            return Err(PopsError::BufferSize { rows, cols, got: data.len() });
        }
        Ok(Self { rows, cols, data })
    }

    /// Release the backing buffer.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Borrow this grid as a [`GridView`].
    pub fn view_mut(&mut self) -> GridView<'_, T> {
        GridView { rows: self.rows, cols: self.cols, data: &mut self.data }
    }

    /// Apply `f` to every cell, producing a grid of the same shape.
    pub fn map<U, F: FnMut(&T) -> U>(&self, f: F) -> Grid<U> {
        Grid { rows: self.rows, cols: self.cols, data: self.data.iter().map(f).collect() }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }
}

impl<T: Copy + std::iter::Sum<T>> Grid<T> {
    pub fn sum(&self) -> T {
        self.data.iter().copied().sum()
    }
}

impl<T> GridAccess<T> for Grid<T> {
    #[inline]
    fn rows(&self) -> usize {
        self.rows
    }
    #[inline]
    fn cols(&self) -> usize {
        self.cols
    }
    #[inline]
    fn as_slice(&self) -> &[T] {
        &self.data
    }
    #[inline]
    fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }
}

impl<T> Index<(usize, usize)> for Grid<T> {
    type Output = T;

    /// # Panics
    /// Panics if `(row, col)` is outside the grid.
    #[inline]
    fn index(&self, (row, col): (usize, usize)) -> &T {
        assert!(row < self.rows && col < self.cols, "cell ({row}, {col}) outside {}x{} grid", self.rows, self.cols);
        &self.data[row * self.cols + col]
    }
}

impl<T> IndexMut<(usize, usize)> for Grid<T> {
    #[inline]
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        assert!(row < self.rows && col < self.cols, "cell ({row}, {col}) outside {}x{} grid", self.rows, self.cols);
        &mut self.data[row * self.cols + col]
    }
}

impl<T> Index<Cell> for Grid<T> {
    type Output = T;
    #[inline]
    fn index(&self, cell: Cell) -> &T {
        &self[(cell.row, cell.col)]
    }
}

impl<T> IndexMut<Cell> for Grid<T> {
    #[inline]
    fn index_mut(&mut self, cell: Cell) -> &mut T {
        &mut self[(cell.row, cell.col)]
    }
}

impl<T: fmt::Display> fmt::Display for Grid<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.data.chunks(self.cols.max(1)) {
            let line: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}

// ── GridView ──────────────────────────────────────────────────────────────────

/// A grid over a buffer owned by someone else.
///
/// Writes go straight to the caller's buffer; dropping the view releases the
/// borrow and leaves the buffer with the caller.
#[derive(Debug)]
pub struct GridView<'a, T> {
    rows: usize,
    cols: usize,
    data: &'a mut [T],
}

impl<'a, T> GridView<'a, T> {
    /// Wrap `data` as a `rows × cols` grid.
    pub fn new(rows: usize, cols: usize, data: &'a mut [T]) -> PopsResult<Self> {
        if data.len() != rows * cols {
            return Err(PopsError::BufferSize { rows, cols, got: data.len() });
        }
        Ok(Self { rows, cols, data })
    }
}

impl<T: Clone> GridView<'_, T> {
    /// Copy the viewed cells into an owned [`Grid`].
    pub fn to_grid(&self) -> Grid<T> {
        Grid { rows: self.rows, cols: self.cols, data: self.data.to_vec() }
    }

    /// Overwrite the viewed cells from `grid`.  Shapes must match.
    pub fn copy_from(&mut self, grid: &Grid<T>) -> PopsResult<()> {
        if !self.same_shape(grid) {
            return Err(PopsError::BufferSize { rows: self.rows, cols: self.cols, got: grid.len() });
        }
        self.data.clone_from_slice(grid.as_slice());
        Ok(())
    }
}

impl<T> GridAccess<T> for GridView<'_, T> {
    #[inline]
    fn rows(&self) -> usize {
        self.rows
    }
    #[inline]
    fn cols(&self) -> usize {
        self.cols
    }
    #[inline]
    fn as_slice(&self) -> &[T] {
        self.data
    }
    #[inline]
    fn as_mut_slice(&mut self) -> &mut [T] {
        self.data
    }
}

impl<T> Index<(usize, usize)> for GridView<'_, T> {
    type Output = T;
    #[inline]
    fn index(&self, (row, col): (usize, usize)) -> &T {
        assert!(row < self.rows && col < self.cols, "cell ({row}, {col}) outside {}x{} grid", self.rows, self.cols);
        &self.data[row * self.cols + col]
    }
}

impl<T> IndexMut<(usize, usize)> for GridView<'_, T> {
    #[inline]
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        assert!(row < self.rows && col < self.cols, "cell ({row}, {col}) outside {}x{} grid", self.rows, self.cols);
        &mut self.data[row * self.cols + col]
    }
}
