use anyhow::Result;
use chrono::NaiveDate;
use tracing::debug;

use crate::{
    rng::{RngManager, SystemRng},
    world::{DaySummary, FarmSnapshot, World},
};

pub struct EngineSettings {
    pub scenario_name: String,
    pub seed: u64,
}

pub struct EngineBuilder {
    settings: EngineSettings,
    systems: Vec<Box<dyn System>>,
}

impl EngineBuilder {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            systems: Vec::new(),
        }
    }

    pub fn with_system(mut self, system: impl System + 'static) -> Self {
        self.systems.push(Box::new(system));
        self
    }

    pub fn push_system(&mut self, system: impl System + 'static) {
        self.systems.push(Box::new(system));
    }

    pub fn build(self) -> Engine {
        Engine {
            rng: RngManager::new(self.settings.seed),
            systems: self.systems,
            settings: self.settings,
        }
    }
}

/// Runs the registered systems once per simulated day, in registration order.
pub struct Engine {
    rng: RngManager,
    systems: Vec<Box<dyn System>>,
    settings: EngineSettings,
}

impl Engine {
    pub fn scenario_name(&self) -> &str {
        &self.settings.scenario_name
    }

    pub fn system_names(&self) -> Vec<&str> {
        self.systems.iter().map(|system| system.name()).collect()
    }

    /// Run one day on the world's current date, then move the calendar on.
    pub fn advance_day(&mut self, world: &mut World) -> Result<DaySummary> {
        world.begin_day();
        let ctx = SystemContext {
            date: world.date(),
            day: world.day(),
            scenario_name: &self.settings.scenario_name,
        };
        for system in &mut self.systems {
            let mut rng_stream = self.rng.stream(system.name());
            system.run(&ctx, world, &mut rng_stream)?;
        }
        let summary = world.day_summary();
        debug!(day = summary.day, date = %summary.date, money = summary.money, "day complete");
        world.advance_time();
        Ok(summary)
    }

    pub fn run(&mut self, world: &mut World, days: u64) -> Result<Vec<DaySummary>> {
        self.run_with_hook(world, days, |_| {})
    }

    /// Like [`Engine::run`], handing a snapshot to `hook` after every day.
    pub fn run_with_hook<F>(
        &mut self,
        world: &mut World,
        days: u64,
        mut hook: F,
    ) -> Result<Vec<DaySummary>>
    where
        F: FnMut(FarmSnapshot),
    {
        let mut summaries = Vec::new();
        for _ in 0..days {
            summaries.push(self.advance_day(world)?);
            hook(world.snapshot());
        }
        Ok(summaries)
    }
}

pub struct SystemContext<'a> {
    pub date: NaiveDate,
    pub day: u64,
    pub scenario_name: &'a str,
}

pub trait System {
    fn name(&self) -> &str;
    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut World,
        rng: &mut SystemRng<'_>,
    ) -> Result<()>;
}
