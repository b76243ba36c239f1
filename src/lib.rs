pub mod config;
pub mod economy;
pub mod engine;
pub mod error;
pub mod farm;
pub mod rng;
pub mod scenario;
pub mod systems;
pub mod weather;
pub mod world;

pub use config::BalanceConfig;
pub use engine::{Engine, EngineBuilder, EngineSettings};
pub use error::{FarmError, Result};
pub use farm::{Crop, CropKind, Farm, FarmTile};
pub use world::{ActionOutcome, DaySummary, FarmSnapshot, World};
