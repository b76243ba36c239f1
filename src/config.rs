//! Balance configuration: crop profiles and every tunable constant of the model.
//!
//! Every section is `#[serde(default)]`, so a YAML file only needs to name the
//! values it wants to override.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::economy::{EconomyTuning, PriceTable};
use crate::error::{FarmError, Result};
use crate::farm::CropKind;

/// Static properties of a crop type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropProfile {
    pub growth_rate: f64,
    pub water_need: f64,
    pub nutrient_need: f64,
    pub days_to_mature: u32,
    pub base_yield: f64,
    /// Frost damage starts below `min_temp - frost_margin`.
    pub min_temp: f64,
    /// Heat stress starts above `max_temp + heat_margin`.
    pub max_temp: f64,
    pub drought_tolerance: f64,
    pub flood_tolerance: f64,
}

impl CropProfile {
    pub const CORN: Self = Self {
        growth_rate: 0.1,
        water_need: 0.6,
        nutrient_need: 0.5,
        days_to_mature: 80,
        base_yield: 8.0,
        min_temp: 10.0,
        max_temp: 35.0,
        drought_tolerance: 0.4,
        flood_tolerance: 0.6,
    };

    pub const WHEAT: Self = Self {
        growth_rate: 0.12,
        water_need: 0.4,
        nutrient_need: 0.3,
        days_to_mature: 70,
        base_yield: 6.0,
        min_temp: 5.0,
        max_temp: 30.0,
        drought_tolerance: 0.7,
        flood_tolerance: 0.3,
    };

    pub const TOMATO: Self = Self {
        growth_rate: 0.15,
        water_need: 0.7,
        nutrient_need: 0.6,
        days_to_mature: 60,
        base_yield: 10.0,
        min_temp: 15.0,
        max_temp: 32.0,
        drought_tolerance: 0.2,
        flood_tolerance: 0.4,
    };
}

/// Per-crop profiles. Each profile overlays its defaults field by field, so
/// `crops: {corn: {base_yield: 9.0}}` keeps the rest of corn as it was.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropCatalog {
    pub corn: CropProfile,
    pub wheat: CropProfile,
    pub tomato: CropProfile,
}

impl CropCatalog {
    pub fn profile(&self, kind: CropKind) -> &CropProfile {
        match kind {
            CropKind::Corn => &self.corn,
            CropKind::Wheat => &self.wheat,
            CropKind::Tomato => &self.tomato,
        }
    }

    fn iter(&self) -> impl Iterator<Item = (CropKind, &CropProfile)> {
        CropKind::ALL.into_iter().map(move |kind| (kind, self.profile(kind)))
    }
}

impl Default for CropCatalog {
    fn default() -> Self {
        Self {
            corn: CropProfile::CORN,
            wheat: CropProfile::WHEAT,
            tomato: CropProfile::TOMATO,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProfilePatch {
    growth_rate: Option<f64>,
    water_need: Option<f64>,
    nutrient_need: Option<f64>,
    days_to_mature: Option<u32>,
    base_yield: Option<f64>,
    min_temp: Option<f64>,
    max_temp: Option<f64>,
    drought_tolerance: Option<f64>,
    flood_tolerance: Option<f64>,
}

impl ProfilePatch {
    fn apply(self, base: CropProfile) -> CropProfile {
        CropProfile {
            growth_rate: self.growth_rate.unwrap_or(base.growth_rate),
            water_need: self.water_need.unwrap_or(base.water_need),
            nutrient_need: self.nutrient_need.unwrap_or(base.nutrient_need),
            days_to_mature: self.days_to_mature.unwrap_or(base.days_to_mature),
            base_yield: self.base_yield.unwrap_or(base.base_yield),
            min_temp: self.min_temp.unwrap_or(base.min_temp),
            max_temp: self.max_temp.unwrap_or(base.max_temp),
            drought_tolerance: self.drought_tolerance.unwrap_or(base.drought_tolerance),
            flood_tolerance: self.flood_tolerance.unwrap_or(base.flood_tolerance),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CatalogPatch {
    corn: ProfilePatch,
    wheat: ProfilePatch,
    tomato: ProfilePatch,
}

impl<'de> Deserialize<'de> for CropCatalog {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let patch = CatalogPatch::deserialize(deserializer)?;
        Ok(Self {
            corn: patch.corn.apply(CropProfile::CORN),
            wheat: patch.wheat.apply(CropProfile::WHEAT),
            tomato: patch.tomato.apply(CropProfile::TOMATO),
        })
    }
}

/// Rates and thresholds shared by every crop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropTuning {
    pub health_floor: f64,
    pub weather_health_floor: f64,
    /// Weight of yesterday's health in the daily health blend.
    pub health_retention: f64,
    /// Weight of today's growing conditions in the daily health blend.
    pub condition_weight: f64,
    pub disease_health_damage: f64,
    pub pest_health_damage: f64,

    pub disease_initial_severity: f64,
    pub disease_progression: f64,
    pub disease_treated_decline: f64,
    pub pest_initial_severity: f64,
    pub pest_progression: f64,
    pub pest_treated_decline: f64,
    pub recovery_threshold: f64,
    pub treatment_health_boost: f64,

    pub protection_stress_factor: f64,
    pub protection_days: u32,

    pub stress_recovery: f64,
    pub frost_margin: f64,
    pub heat_margin: f64,
    pub temperature_span: f64,
    pub temperature_stress_rate: f64,
    pub frost_cap: f64,
    pub heat_cap: f64,
    pub drought_precipitation: f64,
    pub drought_humidity: f64,
    pub drought_stress_rate: f64,
    pub drought_cap: f64,
    pub flood_precipitation: f64,
    pub flood_span: f64,
    pub flood_stress_rate: f64,
    pub flood_cap: f64,
    pub weather_health_rate: f64,
    pub weather_health_max_loss: f64,

    pub dominant_stress_threshold: f64,
    pub severe_health: f64,
    pub severe_infection: f64,
    pub maturity_stage: f64,
}

impl Default for CropTuning {
    fn default() -> Self {
        Self {
            health_floor: 0.3,
            weather_health_floor: 0.5,
            health_retention: 0.95,
            condition_weight: 0.05,
            disease_health_damage: 0.01,
            pest_health_damage: 0.008,
            disease_initial_severity: 0.2,
            disease_progression: 0.05,
            disease_treated_decline: 0.1,
            pest_initial_severity: 0.15,
            pest_progression: 0.03,
            pest_treated_decline: 0.15,
            recovery_threshold: 0.1,
            treatment_health_boost: 0.2,
            protection_stress_factor: 0.25,
            protection_days: 7,
            stress_recovery: 0.02,
            frost_margin: 5.0,
            heat_margin: 5.0,
            temperature_span: 15.0,
            temperature_stress_rate: 0.03,
            frost_cap: 0.5,
            heat_cap: 0.5,
            drought_precipitation: 1.0,
            drought_humidity: 30.0,
            drought_stress_rate: 0.02,
            drought_cap: 0.4,
            flood_precipitation: 40.0,
            flood_span: 60.0,
            flood_stress_rate: 0.04,
            flood_cap: 0.4,
            weather_health_rate: 0.005,
            weather_health_max_loss: 0.05,
            dominant_stress_threshold: 0.1,
            severe_health: 0.2,
            severe_infection: 0.8,
            maturity_stage: 0.95,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileTuning {
    pub max_water: f64,
    pub max_nutrients: f64,
    pub initial_water: f64,
    pub initial_nutrients: f64,
    pub water_decay: f64,
    pub nutrient_decay: f64,
    pub water_dose: f64,
    pub fertilizer_dose: f64,
    /// Water gained per millimetre of rain.
    pub rain_absorption: f64,
}

impl Default for TileTuning {
    fn default() -> Self {
        Self {
            max_water: 1.0,
            max_nutrients: 1.0,
            initial_water: 0.2,
            initial_nutrients: 0.2,
            water_decay: 0.05,
            nutrient_decay: 0.01,
            water_dose: 0.5,
            fertilizer_dose: 0.3,
            rain_absorption: 0.01,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutbreakTuning {
    /// Outbreaks are only rolled on days of the month divisible by this.
    pub check_every_day_of_month: u32,
    pub cooldown_days: i64,
    pub chance: f64,
    /// Share of outbreaks that are diseases rather than pests.
    pub disease_share: f64,
}

impl Default for OutbreakTuning {
    fn default() -> Self {
        Self {
            check_every_day_of_month: 3,
            cooldown_days: 7,
            chance: 0.05,
            disease_share: 0.5,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceConfig {
    pub crops: CropCatalog,
    pub crop: CropTuning,
    pub tile: TileTuning,
    pub outbreak: OutbreakTuning,
    pub prices: PriceTable,
    pub economy: EconomyTuning,
}

impl BalanceConfig {
    /// Load a balance file, filling anything it omits with the defaults.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let config: BalanceConfig = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        for (kind, profile) in self.crops.iter() {
            if profile.nutrient_need <= 0.0 {
                return Err(invalid(format!("{kind} nutrient_need must be positive")));
            }
            if profile.growth_rate < 0.0 || profile.base_yield < 0.0 {
                return Err(invalid(format!(
                    "{kind} growth_rate and base_yield must not be negative"
                )));
            }
            if profile.min_temp > profile.max_temp {
                return Err(invalid(format!("{kind} min_temp exceeds max_temp")));
            }
        }

        let crop = &self.crop;
        if crop.health_floor > 1.0 || crop.weather_health_floor > 1.0 {
            return Err(invalid("health floors must not exceed 1.0".into()));
        }
        if crop.temperature_span <= 0.0 || crop.flood_span <= 0.0 || crop.drought_humidity <= 0.0 {
            return Err(invalid("weather spans must be positive".into()));
        }
        let rates = [
            crop.disease_progression,
            crop.disease_treated_decline,
            crop.pest_progression,
            crop.pest_treated_decline,
            crop.stress_recovery,
            crop.temperature_stress_rate,
            crop.drought_stress_rate,
            crop.flood_stress_rate,
            crop.weather_health_rate,
        ];
        if rates.iter().any(|rate| *rate < 0.0) {
            return Err(invalid("crop rates must not be negative".into()));
        }

        let tile = &self.tile;
        if tile.max_water <= 0.0 || tile.max_nutrients <= 0.0 {
            return Err(invalid("tile capacities must be positive".into()));
        }
        if tile.water_decay < 0.0 || tile.nutrient_decay < 0.0 {
            return Err(invalid("tile decay must not be negative".into()));
        }

        let outbreak = &self.outbreak;
        if outbreak.check_every_day_of_month == 0 {
            return Err(invalid("outbreak check interval must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&outbreak.chance) || !(0.0..=1.0).contains(&outbreak.disease_share)
        {
            return Err(invalid("outbreak probabilities must lie in [0, 1]".into()));
        }

        self.prices.validate()?;
        Ok(())
    }
}

fn invalid(message: String) -> FarmError {
    FarmError::InvalidConfig(message)
}
