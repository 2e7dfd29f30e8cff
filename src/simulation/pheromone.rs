use crate::error::Result;
use crate::terrain::{Grid, Pos};

/// Starting trail level on every cell
pub const INITIAL_PHEROMONE: f64 = 1.0;
/// No cell ever drops below this, so every cell stays reachable
pub const PHEROMONE_FLOOR: f64 = 0.1;

/// Shared trail field steering ants towards earlier successful routes
#[derive(Clone, Debug)]
pub struct PheromoneField {
    levels: Grid<f64>,
}

impl PheromoneField {
    pub fn new(size: usize) -> Self {
        Self {
            levels: Grid::new(size, INITIAL_PHEROMONE),
        }
    }

    /// Trail level at `pos`
    pub fn level(&self, pos: Pos) -> Result<f64> {
        self.levels.get(pos).copied()
    }

    #[inline]
    pub(crate) fn level_at(&self, pos: Pos) -> f64 {
        self.levels[pos]
    }

    pub fn levels(&self) -> &Grid<f64> {
        &self.levels
    }

    /// Scale every level by `1 - rate`, clamped to the floor
    pub fn evaporate(&mut self, rate: f64) {
        let keep = 1.0 - rate;
        for level in self.levels.iter_mut() {
            *level = (*level * keep).max(PHEROMONE_FLOOR);
        }
    }

    /// Add `amount` to every cell of `path`
    pub fn deposit(&mut self, path: &[Pos], amount: f64) {
        for &pos in path {
            self.levels[pos] += amount;
        }
    }

    pub fn min_level(&self) -> f64 {
        self.levels.iter().copied().fold(f64::INFINITY, f64::min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_uniform() {
        let field = PheromoneField::new(4);
        assert!(field.levels().iter().all(|&l| l == INITIAL_PHEROMONE));
        assert!(field.level(Pos::new(4, 0)).is_err());
    }

    #[test]
    fn test_evaporation_floor() {
        let mut field = PheromoneField::new(3);
        for _ in 0..500 {
            field.evaporate(0.5);
        }
        assert_eq!(field.min_level(), PHEROMONE_FLOOR);

        field.evaporate(1.0);
        assert_eq!(field.min_level(), PHEROMONE_FLOOR);
    }

    #[test]
    fn test_deposit_along_path() {
        let mut field = PheromoneField::new(3);
        let path = [Pos::new(0, 0), Pos::new(1, 1)];
        field.deposit(&path, 2.5);

        assert_eq!(field.level(Pos::new(0, 0)).unwrap(), 3.5);
        assert_eq!(field.level(Pos::new(1, 1)).unwrap(), 3.5);
        assert_eq!(field.level(Pos::new(2, 2)).unwrap(), 1.0);
    }
}
