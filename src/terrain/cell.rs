use std::fmt;

/// Classification of one city cell
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CellKind {
    #[default]
    Empty = 0,
    Road = 1,
    House = 2,
    Tree = 3,
    Drain = 4,
    Obstacle = 5,
}

impl CellKind {
    pub const ALL: [CellKind; 6] = [
        CellKind::Empty,
        CellKind::Road,
        CellKind::House,
        CellKind::Tree,
        CellKind::Drain,
        CellKind::Obstacle,
    ];

    /// Whether ants may walk through and water may sit on this cell
    #[inline]
    pub const fn is_passable(self) -> bool {
        match self {
            CellKind::Empty
            | CellKind::Road
            | CellKind::House
            | CellKind::Tree
            | CellKind::Drain => true,
            CellKind::Obstacle => false,
        }
    }

    /// Drains can only be built on open ground
    #[inline]
    pub const fn can_host_drain(self) -> bool {
        match self {
            CellKind::Empty | CellKind::Road => true,
            CellKind::House | CellKind::Tree | CellKind::Drain | CellKind::Obstacle => false,
        }
    }

    /// Whether an ant may start an iteration here
    #[inline]
    pub const fn can_start_walk(self) -> bool {
        match self {
            CellKind::Empty | CellKind::Road | CellKind::House | CellKind::Tree => true,
            CellKind::Drain | CellKind::Obstacle => false,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            CellKind::Empty => "empty",
            CellKind::Road => "road",
            CellKind::House => "house",
            CellKind::Tree => "tree",
            CellKind::Drain => "drain",
            CellKind::Obstacle => "obstacle",
        }
    }
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
