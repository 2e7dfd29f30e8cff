use crate::direction::Direction;
use crate::error::{Result, SimError};
use crate::terrain::cell::CellKind;
use crate::terrain::grid::{Grid, Pos};
use std::collections::HashSet;

/// Spacing of the procedural road grid
pub const ROAD_PERIOD: usize = 6;
/// Chance that a candidate road cell is actually paved
pub const ROAD_FILL: f64 = 0.8;

/// City layout: cell classification, elevation and the cached drain set
#[derive(Clone, Debug)]
pub struct Terrain {
    cells: Grid<CellKind>,
    elevation: Grid<f64>,
    drains: HashSet<Pos>,
}

impl Terrain {
    /// Generate a procedural city of `size`x`size` cells
    pub fn generate(size: usize, rng: &mut fastrand::Rng) -> Result<Self> {
        check_size(size)?;

        // Random base plus two orthogonal waves gives gentle large-scale hills
        let elevation: Vec<f64> = (0..size * size)
            .map(|i| {
                let (row, col) = ((i / size) as f64, (i % size) as f64);
                rng.i32(0..=100) as f64 + 30.0 * (row / 10.0).sin() + 30.0 * (col / 10.0).cos()
            })
            .collect();

        let mut terrain = Self::from_elevation(size, elevation)?;

        for row in (0..size).step_by(ROAD_PERIOD) {
            for col in 0..size {
                if rng.f64() < ROAD_FILL {
                    terrain.cells[Pos::new(row, col)] = CellKind::Road;
                }
            }
        }
        for col in (0..size).step_by(ROAD_PERIOD) {
            for row in 0..size {
                if rng.f64() < ROAD_FILL {
                    terrain.cells[Pos::new(row, col)] = CellKind::Road;
                }
            }
        }

        // Houses keep off the outer ring
        let houses = rng.usize(30..=50);
        if size >= 3 {
            for _ in 0..houses {
                let pos = Pos::new(rng.usize(1..=size - 2), rng.usize(1..=size - 2));
                terrain.place_if_empty(pos, CellKind::House);
            }
        }

        let trees = rng.usize(20..=40);
        for _ in 0..trees {
            let pos = Pos::new(rng.usize(..size), rng.usize(..size));
            terrain.place_if_empty(pos, CellKind::Tree);
        }

        Ok(terrain)
    }

    /// An empty, perfectly flat city
    pub fn flat(size: usize) -> Result<Self> {
        check_size(size)?;
        Self::from_elevation(size, vec![0.0; size * size])
    }

    /// An empty city over a caller-supplied row-major elevation field
    pub fn from_elevation(size: usize, elevation: Vec<f64>) -> Result<Self> {
        check_size(size)?;
        Ok(Self {
            cells: Grid::new(size, CellKind::Empty),
            elevation: Grid::from_vec(size, elevation)?,
            drains: HashSet::new(),
        })
    }

    /// Set one cell while building a layout by hand
    pub fn with_cell(mut self, pos: Pos, kind: CellKind) -> Result<Self> {
        let cell = self.cells.get_mut(pos)?;
        *cell = kind;
        if kind == CellKind::Drain {
            self.drains.insert(pos);
        } else {
            self.drains.remove(&pos);
        }
        Ok(self)
    }

    #[inline]
    fn place_if_empty(&mut self, pos: Pos, kind: CellKind) {
        let cell = &mut self.cells[pos];
        if *cell == CellKind::Empty {
            *cell = kind;
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.cells.size()
    }

    #[inline]
    pub fn contains(&self, pos: Pos) -> bool {
        self.cells.contains(pos)
    }

    /// Classification of `pos`
    pub fn classify(&self, pos: Pos) -> Result<CellKind> {
        self.cells.get(pos).copied()
    }

    /// Elevation of `pos`
    pub fn elevation(&self, pos: Pos) -> Result<f64> {
        self.elevation.get(pos).copied()
    }

    /// In-bounds classification lookup
    #[inline]
    pub(crate) fn kind_at(&self, pos: Pos) -> CellKind {
        self.cells[pos]
    }

    /// In-bounds elevation lookup
    #[inline]
    pub(crate) fn elevation_at(&self, pos: Pos) -> f64 {
        self.elevation[pos]
    }

    #[inline]
    pub fn is_drain(&self, pos: Pos) -> bool {
        self.drains.contains(&pos)
    }

    pub fn drains(&self) -> impl Iterator<Item = Pos> + '_ {
        self.drains.iter().copied()
    }

    pub fn drain_count(&self) -> usize {
        self.drains.len()
    }

    /// Number of cells of the given kind
    pub fn count(&self, kind: CellKind) -> usize {
        self.cells.iter().filter(|&&k| k == kind).count()
    }

    pub fn cells(&self) -> &Grid<CellKind> {
        &self.cells
    }

    pub fn elevations(&self) -> &Grid<f64> {
        &self.elevation
    }

    /// Turn an empty or road cell into a drain
    pub fn add_drain(&mut self, pos: Pos) -> Result<()> {
        let cell = self.cells.get_mut(pos)?;
        if !cell.can_host_drain() {
            return Err(SimError::CellNotBuildable { pos, kind: *cell });
        }
        *cell = CellKind::Drain;
        self.drains.insert(pos);
        Ok(())
    }

    /// Remove a drain, leaving empty ground behind
    pub fn remove_drain(&mut self, pos: Pos) -> Result<()> {
        let cell = self.cells.get_mut(pos)?;
        if *cell != CellKind::Drain {
            return Err(SimError::NoDrainAt(pos));
        }
        *cell = CellKind::Empty;
        self.drains.remove(&pos);
        Ok(())
    }

    /// Turn every drain back into empty ground
    pub fn clear_drains(&mut self) {
        for pos in self.drains.drain() {
            self.cells[pos] = CellKind::Empty;
        }
    }

    /// In-bounds neighbors of `pos` in the given directions
    pub fn neighbors<'a>(
        &self,
        pos: Pos,
        directions: &'a [Direction],
    ) -> impl Iterator<Item = Pos> + 'a {
        let size = self.size();
        directions.iter().filter_map(move |d| d.step(pos, size))
    }

    /// True if a house lies within Chebyshev distance 1 of `pos`
    pub fn near_house(&self, pos: Pos) -> bool {
        self.kind_at(pos) == CellKind::House
            || self
                .neighbors(pos, &Direction::ALL)
                .any(|n| self.kind_at(n) == CellKind::House)
    }
}

fn check_size(size: usize) -> Result<()> {
    if size == 0 {
        return Err(SimError::InvalidConfig(
            "grid size must be positive".to_string(),
        ));
    }
    Ok(())
}
