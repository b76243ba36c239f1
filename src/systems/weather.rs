use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::{
    engine::{System, SystemContext},
    rng::SystemRng,
    weather::{simulate_daily_weather, simulate_forecast, WeatherData, FORECAST_DAYS},
    world::World,
};

/// Where each day's weather comes from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum WeatherSource {
    /// Seasonal model driven by the "weather" random stream.
    #[default]
    Simulated,
    /// The same reading every day.
    Fixed { reading: WeatherData },
    /// One reading per day; placeholder weather once the script runs out.
    Script { days: Vec<WeatherData> },
}

impl WeatherSource {
    fn forecast(&self, ctx: &SystemContext, rng: &mut SystemRng<'_>) -> Vec<WeatherData> {
        let Some(tomorrow) = ctx.date.succ_opt() else {
            return Vec::new();
        };
        match self {
            WeatherSource::Simulated => simulate_forecast(tomorrow, FORECAST_DAYS, rng),
            WeatherSource::Fixed { reading } => vec![reading.clone(); FORECAST_DAYS],
            WeatherSource::Script { days } => usize::try_from(ctx.day)
                .ok()
                .and_then(|day| days.get(day.checked_add(1)?..))
                .unwrap_or_default()
                .iter()
                .take(FORECAST_DAYS)
                .cloned()
                .collect(),
        }
    }
}

pub struct WeatherSystem {
    source: WeatherSource,
}

impl WeatherSystem {
    pub fn new(source: WeatherSource) -> Self {
        Self { source }
    }
}

impl Default for WeatherSystem {
    fn default() -> Self {
        Self::new(WeatherSource::default())
    }
}

impl System for WeatherSystem {
    fn name(&self) -> &str {
        "weather"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut World,
        rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        world.weather = match &self.source {
            WeatherSource::Simulated => simulate_daily_weather(ctx.date, rng),
            WeatherSource::Fixed { reading } => reading.clone(),
            WeatherSource::Script { days } => usize::try_from(ctx.day)
                .ok()
                .and_then(|day| days.get(day))
                .cloned()
                .unwrap_or_else(WeatherData::placeholder),
        };
        world.forecast = self.source.forecast(ctx, rng);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::{config::BalanceConfig, rng::RngManager};

    fn run_day(source: WeatherSource, day: u64) -> World {
        let start = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let mut world = World::new(1, 1, start, BalanceConfig::default());
        let mut system = WeatherSystem::new(source);
        let mut rng = RngManager::new(5);
        let ctx = SystemContext {
            date: start,
            day,
            scenario_name: "weather",
        };
        system.run(&ctx, &mut world, &mut rng.stream("weather")).unwrap();
        world
    }

    #[test]
    fn simulated_source_fills_a_month_of_forecast() {
        let world = run_day(WeatherSource::Simulated, 0);
        assert_eq!(world.forecast.len(), FORECAST_DAYS);
        assert!(world.forecast.iter().all(|day| day.is_placeholder));
    }

    #[test]
    fn script_forecast_is_the_rest_of_the_script() {
        let days: Vec<WeatherData> = (0..4)
            .map(|i| WeatherData::new(i as f64, 0.0, 50.0))
            .collect();
        let world = run_day(WeatherSource::Script { days }, 1);
        assert_eq!(world.weather.temperature(), 1.0);
        let temps: Vec<f64> = world.forecast.iter().map(WeatherData::temperature).collect();
        assert_eq!(temps, vec![2.0, 3.0]);

        let past_end = run_day(WeatherSource::Script { days: Vec::new() }, 3);
        assert!(past_end.forecast.is_empty());
        assert!(past_end.weather.is_placeholder);
    }
}
