use crate::terrain::Pos;

/// The 8 Chebyshev directions around a cell
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Direction {
    North = 0,
    South = 1,
    East = 2,
    West = 3,
    NorthEast = 4,
    NorthWest = 5,
    SouthEast = 6,
    SouthWest = 7,
}

impl Direction {
    /// All 8 directions, orthogonal ones first
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
        Direction::NorthEast,
        Direction::NorthWest,
        Direction::SouthEast,
        Direction::SouthWest,
    ];

    /// The 4 orthogonal directions used by water flow
    pub const ORTHOGONAL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    /// Get direction index for array indexing
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Row/column delta of one step in this direction
    #[inline]
    pub const fn offset(self) -> (isize, isize) {
        match self {
            Direction::North => (-1, 0),
            Direction::South => (1, 0),
            Direction::East => (0, 1),
            Direction::West => (0, -1),
            Direction::NorthEast => (-1, 1),
            Direction::NorthWest => (-1, -1),
            Direction::SouthEast => (1, 1),
            Direction::SouthWest => (1, -1),
        }
    }

    /// Get direction name as string
    pub const fn as_str(self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::South => "south",
            Direction::East => "east",
            Direction::West => "west",
            Direction::NorthEast => "northeast",
            Direction::NorthWest => "northwest",
            Direction::SouthEast => "southeast",
            Direction::SouthWest => "southwest",
        }
    }

    /// Step from `pos` in this direction, `None` if that leaves a `size`x`size` grid
    #[inline]
    pub fn step(self, pos: Pos, size: usize) -> Option<Pos> {
        let (dr, dc) = self.offset();
        let row = pos.row.checked_add_signed(dr)?;
        let col = pos.col.checked_add_signed(dc)?;
        (row < size && col < size).then_some(Pos::new(row, col))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets_are_unique_and_unit() {
        for (i, a) in Direction::ALL.iter().enumerate() {
            let (dr, dc) = a.offset();
            assert!(dr.abs() <= 1 && dc.abs() <= 1);
            assert_ne!((dr, dc), (0, 0));
            for b in &Direction::ALL[i + 1..] {
                assert_ne!(a.offset(), b.offset());
            }
        }
    }

    #[test]
    fn test_step_clips_to_grid() {
        let corner = Pos::new(0, 0);
        let inside: Vec<_> = Direction::ALL
            .iter()
            .filter_map(|d| d.step(corner, 5))
            .collect();

        assert_eq!(inside.len(), 3);
        assert!(inside.contains(&Pos::new(0, 1)));
        assert!(inside.contains(&Pos::new(1, 0)));
        assert!(inside.contains(&Pos::new(1, 1)));

        assert_eq!(Direction::South.step(Pos::new(4, 2), 5), None);
        assert_eq!(Direction::East.step(Pos::new(2, 4), 5), None);
    }

    #[test]
    fn test_orthogonal_subset() {
        for d in Direction::ORTHOGONAL {
            let (dr, dc) = d.offset();
            assert_eq!(dr.abs() + dc.abs(), 1);
            assert_eq!(Direction::ALL[d.index()], d);
        }
    }
}
