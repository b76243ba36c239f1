use anyhow::Result;

use crate::{
    engine::{System, SystemContext},
    rng::SystemRng,
    world::World,
};

/// Ages every tile by a day and rolls for outbreaks.
#[derive(Default)]
pub struct FarmSystem;

impl FarmSystem {
    pub fn new() -> Self {
        Self
    }
}

impl System for FarmSystem {
    fn name(&self) -> &str {
        "farm"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut World,
        rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        let weather = world.weather.clone();
        world.outbreak = world.farm.update(ctx.date, &weather, rng);
        Ok(())
    }
}
