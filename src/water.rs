use crate::direction::Direction;
use crate::error::{Result, SimError};
use crate::terrain::{CellKind, Grid, Pos, Terrain};
use std::collections::HashSet;

/// Depth a drain swallows per tick
pub const DRAIN_ABSORPTION: f64 = 2.0;
/// Below this depth water only evaporates
pub const NOISE_FLOOR: f64 = 0.1;
/// Share of a drained cell's depth that leaves it per tick
pub const OUTFLOW_SHARE: f64 = 0.4;

const EVAPORATION: f64 = 0.95;
const BLOCKED_DECAY: f64 = 0.98;
const STANDING_DECAY: f64 = 0.99;

/// Per-cell water depth over the city
#[derive(Clone, Debug)]
pub struct WaterField {
    depth: Grid<f64>,
    retained: Grid<f64>,
    inflow: Grid<f64>,
}

impl WaterField {
    /// A dry field for a `size`x`size` city
    pub fn new(size: usize) -> Self {
        Self {
            depth: Grid::new(size, 0.0),
            retained: Grid::new(size, 0.0),
            inflow: Grid::new(size, 0.0),
        }
    }

    pub fn size(&self) -> usize {
        self.depth.size()
    }

    /// Water depth at `pos`
    pub fn depth(&self, pos: Pos) -> Result<f64> {
        self.depth.get(pos).copied()
    }

    pub fn depths(&self) -> &Grid<f64> {
        &self.depth
    }

    /// Overwrite the depth at one cell, clamped to be non-negative
    pub fn set_depth(&mut self, pos: Pos, value: f64) -> Result<()> {
        *self.depth.get_mut(pos)? = value.max(0.0);
        Ok(())
    }

    /// Total water in the city
    pub fn total(&self) -> f64 {
        self.depth.iter().sum()
    }

    pub fn max_depth(&self) -> f64 {
        self.depth.iter().copied().fold(0.0, f64::max)
    }

    pub fn clear(&mut self) {
        self.depth.fill(0.0);
    }

    fn check_terrain(&self, terrain: &Terrain) -> Result<()> {
        if terrain.size() != self.size() {
            return Err(SimError::InvalidConfig(format!(
                "water field is {0}x{0} but the terrain is {1}x{1}",
                self.size(),
                terrain.size()
            )));
        }
        Ok(())
    }

    /// Add `intensity * U(0.8, 1.2)` to every non-obstacle cell
    pub fn rain(
        &mut self,
        terrain: &Terrain,
        intensity: f64,
        rng: &mut fastrand::Rng,
    ) -> Result<()> {
        self.check_terrain(terrain)?;
        for (idx, depth) in self.depth.iter_mut().enumerate() {
            let kind = terrain.cells().as_slice()[idx];
            if kind.is_passable() {
                *depth += intensity * (0.8 + 0.4 * rng.f64());
            }
        }
        Ok(())
    }

    /// One tick of drainage towards drains and down through `pipe_cells`.
    ///
    /// Every cell first decides how much it keeps and how much it sends to
    /// each outflow neighbor; the new field is `retained + inflow`, so the
    /// result does not depend on the order cells are visited in.
    pub fn drain(&mut self, terrain: &Terrain, pipe_cells: &HashSet<Pos>) -> Result<()> {
        self.check_terrain(terrain)?;
        self.inflow.fill(0.0);

        let mut outflow: Vec<Pos> = Vec::with_capacity(4);
        for (pos, &current) in self.depth.enumerate() {
            let kept = match terrain.kind_at(pos) {
                CellKind::Drain => (current - DRAIN_ABSORPTION).max(0.0),
                CellKind::Obstacle => 0.0,
                CellKind::Empty | CellKind::Road | CellKind::House | CellKind::Tree => {
                    if current <= NOISE_FLOOR {
                        current * EVAPORATION
                    } else if has_drainage(terrain, pipe_cells, pos) {
                        outflow.clear();
                        let here = terrain.elevation_at(pos);
                        outflow.extend(terrain.neighbors(pos, &Direction::ORTHOGONAL).filter(|&n| {
                            terrain.is_drain(n)
                                || (pipe_cells.contains(&n) && terrain.elevation_at(n) <= here)
                        }));

                        if outflow.is_empty() {
                            current * BLOCKED_DECAY
                        } else {
                            let flow = current * OUTFLOW_SHARE;
                            let share = flow / outflow.len() as f64;
                            for &n in &outflow {
                                self.inflow[n] += share;
                            }
                            current - flow
                        }
                    } else {
                        current * STANDING_DECAY
                    }
                }
            };
            self.retained[pos] = kept;
        }

        for (idx, (kept, added)) in self
            .retained
            .iter()
            .zip(self.inflow.iter())
            .enumerate()
        {
            let pos = self.depth.pos_of(idx);
            self.depth[pos] = match terrain.kind_at(pos) {
                CellKind::Obstacle => 0.0,
                _ => kept + added,
            };
        }

        tracing::trace!(
            target: "flood_aco::water",
            total = self.total(),
            pipe_cells = pipe_cells.len(),
            "water.drain"
        );
        Ok(())
    }
}

/// A cell drains if it is a pipe itself or touches a drain or pipe
fn has_drainage(terrain: &Terrain, pipe_cells: &HashSet<Pos>, pos: Pos) -> bool {
    pipe_cells.contains(&pos)
        || terrain
            .neighbors(pos, &Direction::ORTHOGONAL)
            .any(|n| terrain.is_drain(n) || pipe_cells.contains(&n))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(field: &mut WaterField, row: usize, col: usize, value: f64) {
        field.set_depth(Pos::new(row, col), value).unwrap();
    }

    fn at(field: &WaterField, row: usize, col: usize) -> f64 {
        field.depth(Pos::new(row, col)).unwrap()
    }

    #[test]
    fn test_zero_rain_stays_dry() {
        let terrain = Terrain::flat(6).unwrap();
        let mut water = WaterField::new(6);
        let mut rng = fastrand::Rng::with_seed(1);

        for _ in 0..50 {
            water.rain(&terrain, 0.0, &mut rng).unwrap();
            water.drain(&terrain, &HashSet::new()).unwrap();
        }
        assert!(water.depths().iter().all(|&d| d == 0.0));
    }

    #[test]
    fn test_rain_skips_obstacles() {
        let terrain = Terrain::flat(3)
            .unwrap()
            .with_cell(Pos::new(1, 1), CellKind::Obstacle)
            .unwrap();
        let mut water = WaterField::new(3);
        water.rain(&terrain, 1.0, &mut fastrand::Rng::with_seed(2)).unwrap();

        assert_eq!(at(&water, 1, 1), 0.0);
        for (pos, &d) in water.depths().enumerate() {
            if pos != Pos::new(1, 1) {
                assert!((0.8..=1.2).contains(&d));
            }
        }
    }

    #[test]
    fn test_obstacle_forced_dry() {
        let terrain = Terrain::flat(3)
            .unwrap()
            .with_cell(Pos::new(0, 0), CellKind::Obstacle)
            .unwrap();
        let mut water = WaterField::new(3);
        set(&mut water, 0, 0, 42.0);

        water.drain(&terrain, &HashSet::new()).unwrap();
        assert_eq!(at(&water, 0, 0), 0.0);
    }

    #[test]
    fn test_drain_absorbs_fixed_rate() {
        let terrain = Terrain::flat(3)
            .unwrap()
            .with_cell(Pos::new(1, 1), CellKind::Drain)
            .unwrap();
        let mut water = WaterField::new(3);
        set(&mut water, 1, 1, 5.0);

        water.drain(&terrain, &HashSet::new()).unwrap();
        assert!((at(&water, 1, 1) - 3.0).abs() < 1e-12);

        set(&mut water, 1, 1, 1.5);
        water.drain(&terrain, &HashSet::new()).unwrap();
        assert_eq!(at(&water, 1, 1), 0.0);
    }

    #[test]
    fn test_isolated_water_accumulates() {
        let terrain = Terrain::flat(5).unwrap();
        let mut water = WaterField::new(5);
        set(&mut water, 2, 2, 10.0);
        set(&mut water, 0, 0, 0.1);

        water.drain(&terrain, &HashSet::new()).unwrap();
        assert!((at(&water, 2, 2) - 9.9).abs() < 1e-12);
        assert!((at(&water, 0, 0) - 0.095).abs() < 1e-12);
    }

    #[test]
    fn test_flow_into_adjacent_drain() {
        let terrain = Terrain::flat(3)
            .unwrap()
            .with_cell(Pos::new(1, 2), CellKind::Drain)
            .unwrap();
        let mut water = WaterField::new(3);
        set(&mut water, 1, 1, 10.0);

        water.drain(&terrain, &HashSet::new()).unwrap();

        assert!((at(&water, 1, 1) - 6.0).abs() < 1e-12);
        // drain was dry: inflow of 4.0 lands after absorption
        assert!((at(&water, 1, 2) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_pipes_do_not_carry_water_uphill() {
        let elevation = vec![
            0.0, 0.0, 0.0, //
            0.0, 5.0, 9.0, //
            0.0, 1.0, 0.0, //
        ];
        let terrain = Terrain::from_elevation(3, elevation).unwrap();
        let pipes: HashSet<Pos> = [Pos::new(1, 2), Pos::new(2, 1)].into_iter().collect();
        let mut water = WaterField::new(3);
        set(&mut water, 1, 1, 10.0);

        water.drain(&terrain, &pipes).unwrap();

        // only the downhill pipe at (2, 1) receives flow
        assert!((at(&water, 1, 1) - 6.0).abs() < 1e-12);
        assert!((at(&water, 2, 1) - 4.0).abs() < 1e-12);
        assert_eq!(at(&water, 1, 2), 0.0);
    }

    #[test]
    fn test_blocked_pipe_decays_slowly() {
        let elevation = vec![
            9.0, 9.0, 9.0, //
            9.0, 1.0, 9.0, //
            9.0, 9.0, 9.0, //
        ];
        let terrain = Terrain::from_elevation(3, elevation).unwrap();
        let pipes: HashSet<Pos> = [Pos::new(0, 1)].into_iter().collect();
        let mut water = WaterField::new(3);
        set(&mut water, 1, 1, 10.0);

        water.drain(&terrain, &pipes).unwrap();
        assert!((at(&water, 1, 1) - 9.8).abs() < 1e-12);
    }

    #[test]
    fn test_result_is_order_independent() {
        // two cells feeding each other along a flat pipe
        let terrain = Terrain::flat(2).unwrap();
        let pipes: HashSet<Pos> = [Pos::new(0, 0), Pos::new(0, 1)].into_iter().collect();
        let mut water = WaterField::new(2);
        set(&mut water, 0, 0, 10.0);
        set(&mut water, 0, 1, 10.0);

        let before = water.total();
        water.drain(&terrain, &pipes).unwrap();

        assert!((at(&water, 0, 0) - at(&water, 0, 1)).abs() < 1e-12);
        assert!((water.total() - before).abs() < 1e-9);
    }

    #[test]
    fn test_mismatched_terrain_rejected() {
        let terrain = Terrain::flat(4).unwrap();
        let mut water = WaterField::new(6);
        let mut rng = fastrand::Rng::with_seed(3);

        assert!(matches!(
            water.rain(&terrain, 1.0, &mut rng),
            Err(SimError::InvalidConfig(_))
        ));
        assert!(matches!(
            water.drain(&terrain, &HashSet::new()),
            Err(SimError::InvalidConfig(_))
        ));
        assert_eq!(water.total(), 0.0);
    }

    #[test]
    fn test_depth_never_negative() {
        let mut rng = fastrand::Rng::with_seed(11);
        let mut terrain = Terrain::generate(12, &mut rng).unwrap();
        let _ = terrain.add_drain(Pos::new(0, 0));
        let pipes: HashSet<Pos> = (0..12).map(|c| Pos::new(6, c)).collect();
        let mut water = WaterField::new(12);

        for _ in 0..100 {
            water.rain(&terrain, 1.5, &mut rng).unwrap();
            water.drain(&terrain, &pipes).unwrap();
        }
        assert!(water.depths().iter().all(|&d| d >= 0.0));
        assert!(water.max_depth() > 0.0);

        water.clear();
        assert_eq!(water.total(), 0.0);
    }
}
