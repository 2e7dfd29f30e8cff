pub mod cell;
pub mod grid;
pub mod parser;
pub mod terrain;

pub use cell::CellKind;
pub use grid::{Grid, Pos};
pub use parser::{parse_drain_plan, parse_drain_plan_str, parse_pos};
pub use terrain::Terrain;
