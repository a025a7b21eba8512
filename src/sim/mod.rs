pub mod context;
pub mod crisis;
pub mod diplomacy;
pub mod economy;
pub mod engine;
pub mod opposition;
pub mod outcome;
pub mod politics;
pub mod scheduler;

pub use context::TurnContext;
pub use crisis::CrisisEngine;
pub use diplomacy::DiplomacyEngine;
pub use economy::EconomyEngine;
pub use engine::Engine;
pub use opposition::OppositionEngine;
pub use outcome::OutcomeEngine;
pub use politics::PoliticsEngine;
pub use scheduler::{AutosaveHook, RunState, Scheduler, default_engines};
