use anyhow::Result;

use crate::{
    engine::{System, SystemContext},
    rng::SystemRng,
    world::World,
};

#[derive(Default)]
pub struct RainfallSystem;

impl RainfallSystem {
    pub fn new() -> Self {
        Self
    }
}

impl System for RainfallSystem {
    fn name(&self) -> &str {
        "rainfall"
    }

    fn run(
        &mut self,
        _ctx: &SystemContext,
        world: &mut World,
        _rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        let precipitation = world.weather.precipitation();
        world.rain_absorbed = world.farm.apply_rainfall(precipitation);
        Ok(())
    }
}
