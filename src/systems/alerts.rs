use anyhow::Result;
use tracing::{info, warn};

use crate::{
    engine::{System, SystemContext},
    rng::SystemRng,
    weather::{check_alerts, check_forecast_alerts},
    world::World,
};

#[derive(Default)]
pub struct AlertSystem;

impl AlertSystem {
    pub fn new() -> Self {
        Self
    }
}

impl System for AlertSystem {
    fn name(&self) -> &str {
        "alerts"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut World,
        _rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        let mut alerts = check_alerts(&world.weather);
        alerts.extend(check_forecast_alerts(&world.forecast));
        world.alerts = alerts;
        for alert in &world.alerts {
            if alert.is_warning() {
                warn!(date = %ctx.date, "{alert}");
            } else {
                info!(date = %ctx.date, "{alert}");
            }
        }
        Ok(())
    }
}
