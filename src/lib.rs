//! # Flood ACO
//!
//! Drainage planning for a flooding city.
//!
//! Ants search a procedurally generated city for pipe routes into drains
//! under a budget and a total-length cap; the committed network is then
//! put to the test by a cellular rain and drainage simulation.

pub mod cli;
pub mod config;
pub mod direction;
pub mod error;
pub mod simulation;
pub mod terrain;
pub mod utils;
pub mod walker;
pub mod water;

pub use cli::Args;
pub use config::{ColonyParams, Config};
pub use direction::Direction;
pub use error::{Result, SimError};
pub use simulation::{Colony, ConstraintViolation, Phase, SimulationEngine};
pub use terrain::{CellKind, Pos, Terrain};
pub use walker::{StepOutcome, Walker};
pub use water::WaterField;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        Args, CellKind, Colony, ColonyParams, Config, ConstraintViolation, Direction, Phase, Pos,
        Result, SimError, SimulationEngine, StepOutcome, Terrain, Walker, WaterField,
    };
}
