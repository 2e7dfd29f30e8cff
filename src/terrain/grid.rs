use crate::error::{Result, SimError};
use std::fmt;
use std::ops::{Index, IndexMut};

/// Grid coordinate, row first
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pos {
    pub row: usize,
    pub col: usize,
}

impl Pos {
    #[inline]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Chebyshev (king-move) distance
    #[inline]
    pub fn chebyshev(self, other: Pos) -> usize {
        self.row.abs_diff(other.row).max(self.col.abs_diff(other.col))
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl From<(usize, usize)> for Pos {
    fn from((row, col): (usize, usize)) -> Self {
        Self::new(row, col)
    }
}

/// Square per-cell field stored as one flat row-major buffer
#[derive(Clone, Debug, PartialEq)]
pub struct Grid<T> {
    size: usize,
    cells: Vec<T>,
}

impl<T: Clone> Grid<T> {
    /// Create a `size`x`size` grid filled with `value`
    pub fn new(size: usize, value: T) -> Self {
        Self {
            size,
            cells: vec![value; size * size],
        }
    }

    /// Overwrite every cell with `value`
    pub fn fill(&mut self, value: T) {
        self.cells.fill(value);
    }
}

impl<T> Grid<T> {
    /// Build a grid from a row-major buffer of exactly `size * size` values
    pub fn from_vec(size: usize, cells: Vec<T>) -> Result<Self> {
        if cells.len() != size * size {
            return Err(SimError::InvalidConfig(format!(
                "expected {} cells for a {size}x{size} grid, got {}",
                size * size,
                cells.len()
            )));
        }
        Ok(Self { size, cells })
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn contains(&self, pos: Pos) -> bool {
        pos.row < self.size && pos.col < self.size
    }

    /// Flat index of `pos`, the single bounds check for every field
    #[inline]
    pub fn index_of(&self, pos: Pos) -> Result<usize> {
        if self.contains(pos) {
            Ok(pos.row * self.size + pos.col)
        } else {
            Err(SimError::OutOfBounds {
                pos,
                size: self.size,
            })
        }
    }

    #[inline]
    pub fn get(&self, pos: Pos) -> Result<&T> {
        let idx = self.index_of(pos)?;
        Ok(&self.cells[idx])
    }

    #[inline]
    pub fn get_mut(&mut self, pos: Pos) -> Result<&mut T> {
        let idx = self.index_of(pos)?;
        Ok(&mut self.cells[idx])
    }

    /// Position of a flat index
    #[inline]
    pub fn pos_of(&self, idx: usize) -> Pos {
        Pos::new(idx / self.size, idx % self.size)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.cells.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.cells.iter_mut()
    }

    /// Iterate `(pos, value)` pairs in row-major order
    pub fn enumerate(&self) -> impl Iterator<Item = (Pos, &T)> {
        let size = self.size;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, v)| (Pos::new(i / size, i % size), v))
    }

    pub fn as_slice(&self) -> &[T] {
        &self.cells
    }
}

/// Direct access for positions already known to be in bounds.
/// Panics on out-of-grid positions.
impl<T> Index<Pos> for Grid<T> {
    type Output = T;

    #[inline]
    fn index(&self, pos: Pos) -> &T {
        debug_assert!(self.contains(pos), "{pos} outside {0}x{0} grid", self.size);
        &self.cells[pos.row * self.size + pos.col]
    }
}

impl<T> IndexMut<Pos> for Grid<T> {
    #[inline]
    fn index_mut(&mut self, pos: Pos) -> &mut T {
        debug_assert!(self.contains(pos), "{pos} outside {0}x{0} grid", self.size);
        &mut self.cells[pos.row * self.size + pos.col]
    }
}
