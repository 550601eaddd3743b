//! AI systems (ECS adapters вокруг HunterBrain)

pub mod concealment;
pub mod fsm;

// Re-export all systems
pub use concealment::*;
pub use fsm::*;
