use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{BalanceConfig, CropProfile, CropTuning};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CropKind {
    Corn,
    Wheat,
    Tomato,
}

impl CropKind {
    pub const ALL: [CropKind; 3] = [CropKind::Corn, CropKind::Wheat, CropKind::Tomato];

    pub fn as_str(&self) -> &'static str {
        match self {
            CropKind::Corn => "corn",
            CropKind::Wheat => "wheat",
            CropKind::Tomato => "tomato",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "corn" | "maize" => Some(CropKind::Corn),
            "wheat" => Some(CropKind::Wheat),
            "tomato" | "tomatoes" => Some(CropKind::Tomato),
            _ => None,
        }
    }

    pub fn default_profile(&self) -> CropProfile {
        match self {
            CropKind::Corn => CropProfile::CORN,
            CropKind::Wheat => CropProfile::WHEAT,
            CropKind::Tomato => CropProfile::TOMATO,
        }
    }
}

impl std::fmt::Display for CropKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Disease {
    Blight,
    Rot,
    Wilt,
}

impl Disease {
    pub const ALL: [Disease; 3] = [Disease::Blight, Disease::Rot, Disease::Wilt];

    pub fn as_str(&self) -> &'static str {
        match self {
            Disease::Blight => "blight",
            Disease::Rot => "rot",
            Disease::Wilt => "wilt",
        }
    }
}

impl std::fmt::Display for Disease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pest {
    Aphids,
    Beetles,
    Caterpillars,
}

impl Pest {
    pub const ALL: [Pest; 3] = [Pest::Aphids, Pest::Beetles, Pest::Caterpillars];

    pub fn as_str(&self) -> &'static str {
        match self {
            Pest::Aphids => "aphids",
            Pest::Beetles => "beetles",
            Pest::Caterpillars => "caterpillars",
        }
    }
}

impl std::fmt::Display for Pest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherStress {
    Frost,
    Heat,
    Drought,
    Flood,
}

/// A single planted crop.
///
/// Health, severities and the four weather-stress pools are all fractions.
/// Health never drops below `CropTuning::health_floor` through growth and
/// never below `CropTuning::weather_health_floor` through weather damage.
#[derive(Debug, Clone, PartialEq)]
pub struct Crop {
    pub kind: CropKind,
    pub profile: CropProfile,
    tuning: CropTuning,

    pub growth_stage: f64,
    pub health: f64,
    pub days_since_planted: u32,

    pub disease: Option<Disease>,
    pub disease_severity: f64,
    pub days_infected: u32,
    pub pest: Option<Pest>,
    pub pest_severity: f64,
    pub days_infested: u32,
    /// Shared by the disease and pest tracks.
    pub treatment_applied: bool,

    pub frost_damage: f64,
    pub heat_stress: f64,
    pub drought_stress: f64,
    pub flood_damage: f64,
    pub weather_protection: bool,
    /// Unset until the first weather tick seen while protected.
    pub protection_days_left: Option<u32>,
}

impl Crop {
    pub fn new(kind: CropKind) -> Self {
        Self::from_parts(kind, kind.default_profile(), CropTuning::default())
    }

    pub fn with_config(kind: CropKind, config: &BalanceConfig) -> Self {
        Self::from_parts(kind, *config.crops.profile(kind), config.crop)
    }

    pub fn from_parts(kind: CropKind, profile: CropProfile, tuning: CropTuning) -> Self {
        Self {
            kind,
            profile,
            tuning,
            growth_stage: 0.0,
            health: 1.0,
            days_since_planted: 0,
            disease: None,
            disease_severity: 0.0,
            days_infected: 0,
            pest: None,
            pest_severity: 0.0,
            days_infested: 0,
            treatment_applied: false,
            frost_damage: 0.0,
            heat_stress: 0.0,
            drought_stress: 0.0,
            flood_damage: 0.0,
            weather_protection: false,
            protection_days_left: None,
        }
    }

    pub fn tuning(&self) -> &CropTuning {
        &self.tuning
    }

    /// Advance one day of growth given the tile's water and nutrient fractions.
    pub fn grow(&mut self, water_factor: f64, nutrient_factor: f64) {
        let t = self.tuning;
        let water_match = 1.0 - (water_factor - self.profile.water_need).abs();
        let nutrient_match = (nutrient_factor / self.profile.nutrient_need).min(1.0);

        let growth_factor = self.profile.growth_rate * water_match.min(nutrient_match);
        self.growth_stage = (self.growth_stage + growth_factor).clamp(0.0, 1.0);

        let health_factor = (water_match + nutrient_match) / 2.0;
        self.health = (self.health * t.health_retention + health_factor * t.condition_weight)
            .max(t.health_floor);

        let disease_damage = if self.disease.is_some() {
            self.disease_severity * t.disease_health_damage
        } else {
            0.0
        };
        let pest_damage = if self.pest.is_some() {
            self.pest_severity * t.pest_health_damage
        } else {
            0.0
        };
        self.health = (self.health - disease_damage - pest_damage).max(t.health_floor);

        self.days_since_planted += 1;
        self.progress_infections();
    }

    fn progress_infections(&mut self) {
        let t = self.tuning;

        if self.disease.is_some() {
            self.days_infected += 1;
            if !self.treatment_applied {
                self.disease_severity = (self.disease_severity + t.disease_progression).min(1.0);
            } else {
                self.disease_severity = (self.disease_severity - t.disease_treated_decline).max(0.0);
                if self.disease_severity <= t.recovery_threshold {
                    self.disease = None;
                    self.days_infected = 0;
                    self.treatment_applied = false;
                }
            }
        }

        if self.pest.is_some() {
            self.days_infested += 1;
            if !self.treatment_applied {
                self.pest_severity = (self.pest_severity + t.pest_progression).min(1.0);
            } else {
                self.pest_severity = (self.pest_severity - t.pest_treated_decline).max(0.0);
                if self.pest_severity <= t.recovery_threshold {
                    self.pest = None;
                    self.days_infested = 0;
                    self.treatment_applied = false;
                }
            }
        }
    }

    pub fn infect_with_disease(&mut self, disease: Disease) {
        if self.disease.is_none() {
            self.disease = Some(disease);
            self.disease_severity = self.tuning.disease_initial_severity;
            self.days_infected = 0;
        }
    }

    pub fn infest_with_pest(&mut self, pest: Pest) {
        if self.pest.is_none() {
            self.pest = Some(pest);
            self.pest_severity = self.tuning.pest_initial_severity;
            self.days_infested = 0;
        }
    }

    /// Cure any disease and pests. Returns whether anything was cured; the
    /// treatment flag is set either way.
    pub fn apply_treatment(&mut self) -> bool {
        let mut cured = false;

        if let Some(disease) = self.disease.take() {
            self.disease_severity = 0.0;
            self.days_infected = 0;
            cured = true;
            debug!(crop = %self.kind, %disease, "disease cured");
        }

        if let Some(pest) = self.pest.take() {
            self.pest_severity = 0.0;
            self.days_infested = 0;
            cured = true;
            debug!(crop = %self.kind, %pest, "pests removed");
        }

        if cured {
            self.health = (self.health + self.tuning.treatment_health_boost).min(1.0);
        }

        self.treatment_applied = true;
        cured
    }

    pub fn apply_weather_protection(&mut self) -> bool {
        if self.weather_protection {
            return false;
        }
        let factor = self.tuning.protection_stress_factor;
        self.weather_protection = true;
        self.frost_damage *= factor;
        self.heat_stress *= factor;
        self.drought_stress *= factor;
        self.flood_damage *= factor;
        true
    }

    /// Apply one day of weather. Temperature in °C, precipitation in mm,
    /// humidity in percent.
    pub fn process_weather_effects(&mut self, temperature: f64, precipitation: f64, humidity: f64) {
        let t = self.tuning;
        let profile = self.profile;

        self.frost_damage = (self.frost_damage - t.stress_recovery).max(0.0);
        self.heat_stress = (self.heat_stress - t.stress_recovery).max(0.0);
        self.drought_stress = (self.drought_stress - t.stress_recovery).max(0.0);
        self.flood_damage = (self.flood_damage - t.stress_recovery).max(0.0);

        if temperature < profile.min_temp - t.frost_margin && !self.weather_protection {
            let intensity = (profile.min_temp - temperature) / t.temperature_span;
            self.frost_damage =
                (self.frost_damage + intensity * t.temperature_stress_rate).min(t.frost_cap);
        }

        if temperature > profile.max_temp + t.heat_margin && !self.weather_protection {
            let intensity = (temperature - profile.max_temp) / t.temperature_span;
            self.heat_stress =
                (self.heat_stress + intensity * t.temperature_stress_rate).min(t.heat_cap);
        }

        if precipitation < t.drought_precipitation && humidity < t.drought_humidity {
            let dryness = (t.drought_humidity - humidity) / t.drought_humidity;
            let factor = dryness * (1.0 - precipitation);
            if factor > profile.drought_tolerance {
                self.drought_stress = (self.drought_stress
                    + (factor - profile.drought_tolerance) * t.drought_stress_rate)
                    .min(t.drought_cap);
            }
        }

        if precipitation > t.flood_precipitation {
            let intensity = (precipitation - t.flood_precipitation) / t.flood_span;
            if intensity > profile.flood_tolerance {
                self.flood_damage = (self.flood_damage
                    + (intensity - profile.flood_tolerance) * t.flood_stress_rate)
                    .min(t.flood_cap);
            }
        }

        let loss = (self.total_weather_stress() * t.weather_health_rate)
            .min(t.weather_health_max_loss);
        self.health = (self.health - loss).max(t.weather_health_floor);

        self.tick_protection();
    }

    fn tick_protection(&mut self) {
        if !self.weather_protection {
            return;
        }
        match self.protection_days_left {
            None => self.protection_days_left = Some(self.tuning.protection_days),
            Some(days) => {
                let left = days.saturating_sub(1);
                if left == 0 {
                    self.weather_protection = false;
                    self.protection_days_left = None;
                    info!(crop = %self.kind, "weather protection expired");
                } else {
                    self.protection_days_left = Some(left);
                }
            }
        }
    }

    fn total_weather_stress(&self) -> f64 {
        self.frost_damage + self.heat_stress + self.drought_stress + self.flood_damage
    }

    pub fn get_weather_stress_level(&self) -> f64 {
        self.total_weather_stress().min(1.0)
    }

    /// The largest stress pool, if it exceeds the reporting threshold. Ties go
    /// to the earlier of frost, heat, drought, flood.
    pub fn get_dominant_weather_stress(&self) -> Option<WeatherStress> {
        let pools = [
            (WeatherStress::Frost, self.frost_damage),
            (WeatherStress::Heat, self.heat_stress),
            (WeatherStress::Drought, self.drought_stress),
            (WeatherStress::Flood, self.flood_damage),
        ];
        let mut dominant = pools[0];
        for pool in &pools[1..] {
            if pool.1 > dominant.1 {
                dominant = *pool;
            }
        }
        (dominant.1 > self.tuning.dominant_stress_threshold).then_some(dominant.0)
    }

    pub fn is_healthy(&self) -> bool {
        self.disease.is_none() && self.pest.is_none()
    }

    pub fn is_severely_damaged(&self) -> bool {
        let t = &self.tuning;
        self.health < t.severe_health
            || self.disease_severity > t.severe_infection
            || self.pest_severity > t.severe_infection
    }

    pub fn is_mature(&self) -> bool {
        self.growth_stage >= self.tuning.maturity_stage
            || self.days_since_planted >= self.profile.days_to_mature
    }

    /// Harvest yield. The water and nutrient factors are accepted for API
    /// parity with `grow` but do not enter the formula.
    pub fn get_yield(&self, _water_factor: f64, _nutrient_factor: f64) -> f64 {
        if !self.is_mature() {
            return 0.0;
        }
        self.profile.base_yield * self.growth_stage * self.health
    }
}
