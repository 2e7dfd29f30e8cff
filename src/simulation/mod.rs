pub mod colony;
pub mod engine;
pub mod pheromone;

use std::fmt;

pub use colony::{Colony, ColonyState, ConstraintViolation};
pub use engine::SimulationEngine;
pub use pheromone::PheromoneField;

/// Game phase driven by [`SimulationEngine`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Drains are placed and removed
    Setup,
    /// The colony searches for pipe routes
    Optimizing,
    /// Rain falls on the committed network
    Defending,
    GameOver,
    Victory,
}

impl Phase {
    pub const fn as_str(self) -> &'static str {
        match self {
            Phase::Setup => "setup",
            Phase::Optimizing => "optimizing",
            Phase::Defending => "defending",
            Phase::GameOver => "game over",
            Phase::Victory => "victory",
        }
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Phase::GameOver | Phase::Victory)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
