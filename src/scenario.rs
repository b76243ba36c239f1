use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::{
    config::BalanceConfig,
    economy::PlayerAction,
    engine::{Engine, EngineBuilder, EngineSettings},
    error::FarmError,
    farm::CropKind,
    systems::{
        AlertSystem, FarmSystem, PlanSystem, PlannedAction, RainfallSystem, WeatherSource,
        WeatherSystem,
    },
    world::World,
};

fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 4, 1).unwrap_or_default()
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub description: Option<String>,
    pub seed: u64,
    #[serde(default = "default_start_date")]
    pub start_date: NaiveDate,
    #[serde(default)]
    pub days: Option<u64>,
    pub farm: FarmLayout,
    /// Overrides applied on top of the default balance table.
    #[serde(default)]
    pub balance: Option<BalanceConfig>,
    #[serde(default)]
    pub weather: WeatherSource,
    #[serde(default)]
    pub plan: Vec<PlanStep>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct FarmLayout {
    pub width: usize,
    pub height: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionName {
    Plant,
    Water,
    Fertilize,
    Harvest,
    Treat,
    Protect,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlanStep {
    pub day: u64,
    #[serde(default)]
    pub every: Option<u64>,
    #[serde(default)]
    pub until: Option<u64>,
    pub action: ActionName,
    #[serde(default)]
    pub crop: Option<CropKind>,
    /// `[x, y]` pairs. Empty means every tile.
    #[serde(default)]
    pub tiles: Vec<[usize; 2]>,
}

impl PlanStep {
    fn player_action(&self) -> Option<PlayerAction> {
        Some(match self.action {
            ActionName::Plant => PlayerAction::Plant(self.crop?),
            ActionName::Water => PlayerAction::Water,
            ActionName::Fertilize => PlayerAction::Fertilize,
            ActionName::Harvest => PlayerAction::Harvest,
            ActionName::Treat => PlayerAction::Treat,
            ActionName::Protect => PlayerAction::Protect,
        })
    }
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario: Scenario = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        scenario
            .validate()
            .with_context(|| format!("Invalid scenario {}", path.display()))?;
        Ok(scenario)
    }
}

impl Scenario {
    pub fn validate(&self) -> crate::error::Result<()> {
        let FarmLayout { width, height } = self.farm;
        if width == 0 || height == 0 {
            return Err(FarmError::InvalidScenario(format!(
                "farm must be at least 1x1, got {width}x{height}"
            )));
        }
        if let Some(balance) = &self.balance {
            balance.validate()?;
        }
        for (i, step) in self.plan.iter().enumerate() {
            if step.player_action().is_none() {
                return Err(FarmError::InvalidScenario(format!(
                    "plan step {i}: plant needs a crop"
                )));
            }
            if let Some(&[x, y]) = step.tiles.iter().find(|[x, y]| *x >= width || *y >= height) {
                return Err(FarmError::InvalidScenario(format!(
                    "plan step {i}: tile ({x}, {y}) is outside the {width}x{height} farm"
                )));
            }
        }
        Ok(())
    }

    pub fn balance_config(&self) -> BalanceConfig {
        self.balance.clone().unwrap_or_default()
    }

    pub fn build_world(&self) -> World {
        self.build_world_with(self.balance_config())
    }

    pub fn build_world_with(&self, config: BalanceConfig) -> World {
        World::new(self.farm.width, self.farm.height, self.start_date, config)
    }

    pub fn days(&self, override_days: Option<u64>) -> u64 {
        override_days.or(self.days).unwrap_or(90)
    }

    pub fn planned_actions(&self) -> Vec<PlannedAction> {
        let all_tiles: Vec<(usize, usize)> = (0..self.farm.height)
            .flat_map(|y| (0..self.farm.width).map(move |x| (x, y)))
            .collect();
        self.plan
            .iter()
            .filter_map(|step| {
                let action = step.player_action()?;
                let tiles = if step.tiles.is_empty() {
                    all_tiles.clone()
                } else {
                    step.tiles.iter().map(|&[x, y]| (x, y)).collect()
                };
                Some(PlannedAction {
                    day: step.day,
                    every: step.every,
                    until: step.until,
                    action,
                    tiles,
                })
            })
            .collect()
    }

    /// The standard day: weather, alerts, the player's plan, rain, then the
    /// farm update.
    pub fn build_engine(&self, seed_override: Option<u64>) -> Engine {
        let settings = EngineSettings {
            scenario_name: self.name.clone(),
            seed: seed_override.unwrap_or(self.seed),
        };
        EngineBuilder::new(settings)
            .with_system(WeatherSystem::new(self.weather.clone()))
            .with_system(AlertSystem::new())
            .with_system(PlanSystem::new(self.planned_actions()))
            .with_system(RainfallSystem::new())
            .with_system(FarmSystem::new())
            .build()
    }
}
