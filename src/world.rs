use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::BalanceConfig;
use crate::economy::{Ledger, PlayerAction};
use crate::farm::{CropKind, Disease, Farm, Outbreak, Pest, WeatherStress};
use crate::weather::{WeatherAlert, WeatherData};

/// What happened when the player tried an action.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum ActionOutcome {
    /// The action costs more than the player has. Nothing changed.
    InsufficientFunds { cost: f64, money: f64 },
    /// The farm refused the action (bad tile, occupied, nothing to harvest).
    /// Nothing was charged.
    Rejected,
    Applied { cost: f64 },
    Harvested {
        kind: CropKind,
        amount: f64,
        earnings: f64,
    },
}

impl ActionOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(
            self,
            ActionOutcome::Applied { .. } | ActionOutcome::Harvested { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub x: usize,
    pub y: usize,
    pub action: PlayerAction,
    pub outcome: ActionOutcome,
}

/// One simulated day as seen after every system has run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    pub day: u64,
    pub date: NaiveDate,
    pub weather: WeatherData,
    pub alerts: Vec<WeatherAlert>,
    pub rain_absorbed: f64,
    pub outbreak: Option<Outbreak>,
    pub actions: Vec<ActionRecord>,
    pub mature_crops: usize,
    pub money: f64,
}

/// A game session: the farm, the player's money and the calendar.
pub struct World {
    pub farm: Farm,
    pub ledger: Ledger,
    date: NaiveDate,
    day: u64,
    pub weather: WeatherData,
    /// Upcoming days, starting tomorrow.
    pub forecast: Vec<WeatherData>,
    pub alerts: Vec<WeatherAlert>,
    pub rain_absorbed: f64,
    pub outbreak: Option<Outbreak>,
    actions: Vec<ActionRecord>,
}

impl World {
    pub fn new(width: usize, height: usize, start_date: NaiveDate, config: BalanceConfig) -> Self {
        let ledger = Ledger::new(config.economy.starting_money);
        Self {
            farm: Farm::with_config(width, height, config),
            ledger,
            date: start_date,
            day: 0,
            weather: WeatherData::placeholder(),
            forecast: Vec::new(),
            alerts: Vec::new(),
            rain_absorbed: 0.0,
            outbreak: None,
            actions: Vec::new(),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn day(&self) -> u64 {
        self.day
    }

    pub fn config(&self) -> &BalanceConfig {
        self.farm.config()
    }

    /// Clear the per-day records before the systems run.
    pub fn begin_day(&mut self) {
        self.alerts.clear();
        self.rain_absorbed = 0.0;
        self.outbreak = None;
        self.actions.clear();
    }

    pub fn advance_time(&mut self) {
        self.day += 1;
        self.date = self
            .date
            .checked_add_days(Days::new(1))
            .unwrap_or(NaiveDate::MAX);
    }

    pub fn actions_today(&self) -> &[ActionRecord] {
        &self.actions
    }

    /// Try a player action on tile `(x, y)`, charging its price.
    ///
    /// The price is checked before the farm is touched, and only charged when
    /// the farm accepts the action.
    pub fn perform(&mut self, action: PlayerAction, x: usize, y: usize) -> ActionOutcome {
        let outcome = self.perform_inner(action, x, y);
        debug!(day = self.day, %action, x, y, ?outcome, "player action");
        self.actions.push(ActionRecord {
            x,
            y,
            action,
            outcome,
        });
        outcome
    }

    fn perform_inner(&mut self, action: PlayerAction, x: usize, y: usize) -> ActionOutcome {
        let prices = &self.farm.config().prices;
        let cost = prices.cost_of(action);
        if !self.ledger.can_afford(cost) {
            warn!(%action, cost, money = self.ledger.money, "not enough money");
            return ActionOutcome::InsufficientFunds {
                cost,
                money: self.ledger.money,
            };
        }

        if action == PlayerAction::Harvest {
            return self.harvest(x, y, cost);
        }

        let applied = match action {
            PlayerAction::Plant(kind) => self.farm.plant_crop(x, y, kind),
            PlayerAction::Water => self.farm.water_tile(x, y),
            PlayerAction::Fertilize => self.farm.fertilize_tile(x, y),
            PlayerAction::Treat => self.farm.treat_tile(x, y),
            PlayerAction::Protect => self.farm.protect_tile(x, y),
            PlayerAction::Harvest => false,
        };
        if !applied {
            return ActionOutcome::Rejected;
        }
        self.ledger.record_expense(self.date, action, cost, (x, y));
        ActionOutcome::Applied { cost }
    }

    fn harvest(&mut self, x: usize, y: usize, cost: f64) -> ActionOutcome {
        let Some(harvest) = self.farm.harvest(x, y) else {
            return ActionOutcome::Rejected;
        };
        if harvest.amount <= 0.0 {
            return ActionOutcome::Rejected;
        }
        if cost > 0.0 {
            self.ledger
                .record_expense(self.date, PlayerAction::Harvest, cost, (x, y));
        }
        let earnings = harvest.amount * self.farm.config().prices.sale_price(harvest.kind);
        self.ledger
            .record_income(self.date, PlayerAction::Harvest, earnings, (x, y));
        ActionOutcome::Harvested {
            kind: harvest.kind,
            amount: harvest.amount,
            earnings,
        }
    }

    pub fn day_summary(&self) -> DaySummary {
        DaySummary {
            day: self.day,
            date: self.date,
            weather: self.weather.clone(),
            alerts: self.alerts.clone(),
            rain_absorbed: self.rain_absorbed,
            outbreak: self.outbreak,
            actions: self.actions.clone(),
            mature_crops: self.farm.mature_count(),
            money: self.ledger.money,
        }
    }

    pub fn snapshot(&self) -> FarmSnapshot {
        let tiles = self
            .farm
            .tiles()
            .map(|(x, y, tile)| TileSnapshot {
                x,
                y,
                water_level: tile.water_level,
                nutrient_level: tile.nutrient_level,
                crop: tile.crop.as_ref().map(|crop| CropSnapshot {
                    kind: crop.kind,
                    growth_stage: crop.growth_stage,
                    health: crop.health,
                    days_since_planted: crop.days_since_planted,
                    disease: crop.disease,
                    disease_severity: crop.disease_severity,
                    pest: crop.pest,
                    pest_severity: crop.pest_severity,
                    weather_protection: crop.weather_protection,
                    weather_stress: crop.get_weather_stress_level(),
                    dominant_stress: crop.get_dominant_weather_stress(),
                    mature: crop.is_mature(),
                }),
            })
            .collect();

        FarmSnapshot {
            day: self.day,
            date: self.date,
            width: self.farm.width,
            height: self.farm.height,
            money: self.ledger.money,
            total_earned: self.ledger.total_earned,
            total_spent: self.ledger.total_spent,
            profit: self.ledger.profit(),
            total_planted: self.farm.total_planted,
            total_harvested: self.farm.total_harvested,
            water_used: self.farm.water_used,
            fertilizer_used: self.farm.fertilizer_used,
            weather: self.weather.clone(),
            forecast: self.forecast.clone(),
            alerts: self.alerts.clone(),
            tiles,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropSnapshot {
    pub kind: CropKind,
    pub growth_stage: f64,
    pub health: f64,
    pub days_since_planted: u32,
    pub disease: Option<Disease>,
    pub disease_severity: f64,
    pub pest: Option<Pest>,
    pub pest_severity: f64,
    pub weather_protection: bool,
    pub weather_stress: f64,
    pub dominant_stress: Option<WeatherStress>,
    pub mature: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileSnapshot {
    pub x: usize,
    pub y: usize,
    pub water_level: f64,
    pub nutrient_level: f64,
    pub crop: Option<CropSnapshot>,
}

/// Read-only view of the session for display or export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmSnapshot {
    pub day: u64,
    pub date: NaiveDate,
    pub width: usize,
    pub height: usize,
    pub money: f64,
    pub total_earned: f64,
    pub total_spent: f64,
    pub profit: f64,
    pub total_planted: u32,
    pub total_harvested: u32,
    pub water_used: f64,
    pub fertilizer_used: f64,
    pub weather: WeatherData,
    pub forecast: Vec<WeatherData>,
    pub alerts: Vec<WeatherAlert>,
    pub tiles: Vec<TileSnapshot>,
}

impl FarmSnapshot {
    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
