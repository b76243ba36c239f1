mod alerts;
mod farm;
mod plan;
mod rainfall;
mod weather;

pub use alerts::AlertSystem;
pub use farm::FarmSystem;
pub use plan::{PlanSystem, PlannedAction};
pub use rainfall::RainfallSystem;
pub use weather::{WeatherSource, WeatherSystem};
