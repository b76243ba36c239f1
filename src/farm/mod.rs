//! The farm grid and its daily update.

mod crop;
mod tile;

pub use crop::{Crop, CropKind, Disease, Pest, WeatherStress};
pub use tile::{FarmTile, Harvest};

use chrono::{Datelike, NaiveDate};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::BalanceConfig;
use crate::rng::RngExt;
use crate::weather::WeatherData;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "type", content = "name")]
pub enum OutbreakKind {
    Disease(Disease),
    Pest(Pest),
}

impl std::fmt::Display for OutbreakKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutbreakKind::Disease(disease) => write!(f, "{disease}"),
            OutbreakKind::Pest(pest) => write!(f, "{pest}"),
        }
    }
}

/// A single infection event on one tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outbreak {
    pub x: usize,
    pub y: usize,
    pub kind: OutbreakKind,
}

/// A `width × height` grid of tiles plus running usage counters.
///
/// Player operations never fail loudly: bad coordinates, occupied tiles and
/// immature crops all come back as `false` or `0.0`.
#[derive(Debug, Clone)]
pub struct Farm {
    pub width: usize,
    pub height: usize,
    tiles: Vec<FarmTile>,
    pub total_planted: u32,
    pub total_harvested: u32,
    pub water_used: f64,
    pub fertilizer_used: f64,
    pub last_outbreak_day: Option<NaiveDate>,
    config: BalanceConfig,
}

impl Farm {
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_config(width, height, BalanceConfig::default())
    }

    pub fn with_config(width: usize, height: usize, config: BalanceConfig) -> Self {
        let tiles = (0..width * height)
            .map(|_| FarmTile::new(&config.tile))
            .collect();
        Self {
            width,
            height,
            tiles,
            total_planted: 0,
            total_harvested: 0,
            water_used: 0.0,
            fertilizer_used: 0.0,
            last_outbreak_day: None,
            config,
        }
    }

    pub fn config(&self) -> &BalanceConfig {
        &self.config
    }

    fn index(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    pub fn get_tile(&self, x: usize, y: usize) -> Option<&FarmTile> {
        self.index(x, y).map(|i| &self.tiles[i])
    }

    pub fn get_tile_mut(&mut self, x: usize, y: usize) -> Option<&mut FarmTile> {
        self.index(x, y).map(move |i| &mut self.tiles[i])
    }

    /// Tiles in row-major order with their coordinates.
    pub fn tiles(&self) -> impl Iterator<Item = (usize, usize, &FarmTile)> {
        let width = self.width;
        self.tiles
            .iter()
            .enumerate()
            .map(move |(i, tile)| (i % width, i / width, tile))
    }

    fn crop_mut(&mut self, x: usize, y: usize) -> Option<&mut Crop> {
        self.get_tile_mut(x, y)?.crop.as_mut()
    }

    pub fn plant_crop(&mut self, x: usize, y: usize, kind: CropKind) -> bool {
        let crop = Crop::with_config(kind, &self.config);
        let Some(tile) = self.get_tile_mut(x, y) else {
            return false;
        };
        if !tile.plant(crop) {
            return false;
        }
        self.total_planted += 1;
        debug!(x, y, crop = %kind, "planted");
        true
    }

    pub fn water_tile(&mut self, x: usize, y: usize) -> bool {
        let dose = self.config.tile.water_dose;
        let Some(tile) = self.get_tile_mut(x, y) else {
            return false;
        };
        let absorbed = tile.add_water(dose);
        self.water_used += absorbed;
        true
    }

    pub fn fertilize_tile(&mut self, x: usize, y: usize) -> bool {
        let dose = self.config.tile.fertilizer_dose;
        let Some(tile) = self.get_tile_mut(x, y) else {
            return false;
        };
        let absorbed = tile.add_nutrients(dose);
        self.fertilizer_used += absorbed;
        true
    }

    /// Harvest a mature crop, reporting what it was and how much it yielded.
    pub fn harvest(&mut self, x: usize, y: usize) -> Option<Harvest> {
        let harvest = self.get_tile_mut(x, y)?.harvest()?;
        self.total_harvested += 1;
        info!(x, y, crop = %harvest.kind, amount = harvest.amount, "harvested");
        Some(harvest)
    }

    pub fn harvest_crop(&mut self, x: usize, y: usize) -> f64 {
        self.harvest(x, y).map_or(0.0, |h| h.amount)
    }

    /// `true` whenever a crop is present, whether or not anything was cured.
    pub fn treat_tile(&mut self, x: usize, y: usize) -> bool {
        match self.crop_mut(x, y) {
            Some(crop) => {
                crop.apply_treatment();
                true
            }
            None => false,
        }
    }

    /// `true` whenever a crop is present, even if it was already protected.
    pub fn protect_tile(&mut self, x: usize, y: usize) -> bool {
        match self.crop_mut(x, y) {
            Some(crop) => {
                crop.apply_weather_protection();
                true
            }
            None => false,
        }
    }

    /// Soak rain into every tile. Returns the water absorbed, which also
    /// counts toward `water_used`.
    pub fn apply_rainfall(&mut self, precipitation: f64) -> f64 {
        if precipitation <= 0.0 {
            return 0.0;
        }
        let amount = precipitation * self.config.tile.rain_absorption;
        let absorbed: f64 = self
            .tiles
            .iter_mut()
            .map(|tile| tile.add_water(amount))
            .sum();
        self.water_used += absorbed;
        debug!(precipitation, absorbed, "rainfall");
        absorbed
    }

    /// Advance every tile by one day, then roll for an outbreak.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        date: NaiveDate,
        weather: &WeatherData,
        rng: &mut R,
    ) -> Option<Outbreak> {
        let tuning = self.config.tile;
        let temperature = weather.temperature();
        let precipitation = weather.precipitation();
        let humidity = weather.humidity();

        for tile in &mut self.tiles {
            tile.decay(tuning.water_decay, tuning.nutrient_decay);
            let water = tile.water_fraction();
            let nutrients = tile.nutrient_fraction();
            if let Some(crop) = tile.crop.as_mut() {
                crop.process_weather_effects(temperature, precipitation, humidity);
                crop.grow(water, nutrients);
            }
        }

        self.spawn_outbreak(date, rng)
    }

    fn spawn_outbreak<R: Rng + ?Sized>(&mut self, date: NaiveDate, rng: &mut R) -> Option<Outbreak> {
        let tuning = self.config.outbreak;

        // A zero interval never matches.
        if date.day().checked_rem(tuning.check_every_day_of_month) != Some(0) {
            return None;
        }
        if let Some(last) = self.last_outbreak_day {
            if (date - last).num_days().abs() < tuning.cooldown_days {
                return None;
            }
        }
        if !rng.chance(tuning.chance) {
            return None;
        }

        let healthy: Vec<usize> = self
            .tiles
            .iter()
            .enumerate()
            .filter(|(_, tile)| tile.crop.as_ref().is_some_and(Crop::is_healthy))
            .map(|(i, _)| i)
            .collect();
        let index = *healthy.choose(rng)?;

        let kind = if rng.chance(tuning.disease_share) {
            let disease = *Disease::ALL.choose(rng)?;
            OutbreakKind::Disease(disease)
        } else {
            let pest = *Pest::ALL.choose(rng)?;
            OutbreakKind::Pest(pest)
        };

        let crop = self.tiles[index].crop.as_mut()?;
        match kind {
            OutbreakKind::Disease(disease) => crop.infect_with_disease(disease),
            OutbreakKind::Pest(pest) => crop.infest_with_pest(pest),
        }

        self.last_outbreak_day = Some(date);
        let outbreak = Outbreak {
            x: index % self.width,
            y: index / self.width,
            kind,
        };
        info!(%date, x = outbreak.x, y = outbreak.y, %kind, "outbreak");
        Some(outbreak)
    }

    pub fn crop_count(&self) -> usize {
        self.tiles.iter().filter(|tile| tile.has_crop()).count()
    }

    pub fn mature_count(&self) -> usize {
        self.tiles
            .iter()
            .filter_map(|tile| tile.crop.as_ref())
            .filter(|crop| crop.is_mature())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
    }

    fn always_outbreak() -> BalanceConfig {
        let mut config = BalanceConfig::default();
        config.outbreak.chance = 1.0;
        config
    }

    #[test]
    fn out_of_range_actions_fail() {
        let mut farm = Farm::new(2, 2);
        assert!(!farm.plant_crop(2, 0, CropKind::Corn));
        assert!(!farm.water_tile(0, 5));
        assert!(!farm.fertilize_tile(9, 9));
        assert!(!farm.treat_tile(3, 3));
        assert!(!farm.protect_tile(0, 2));
        assert_eq!(farm.harvest_crop(2, 2), 0.0);
        assert!(farm.get_tile(1, 1).is_some());
        assert!(farm.get_tile(2, 1).is_none());
        assert_eq!(farm.total_planted, 0);
    }

    #[test]
    fn planting_twice_keeps_counter() {
        let mut farm = Farm::new(3, 3);
        assert!(farm.plant_crop(1, 2, CropKind::Wheat));
        assert!(!farm.plant_crop(1, 2, CropKind::Corn));
        assert_eq!(farm.total_planted, 1);
        assert_eq!(farm.crop_count(), 1);
    }

    #[test]
    fn watering_counts_actual_delta() {
        let mut farm = Farm::new(1, 1);
        assert!(farm.water_tile(0, 0));
        assert!(farm.water_tile(0, 0));
        assert!(farm.water_tile(0, 0));
        // 0.2 -> 0.7 -> 1.0 -> 1.0
        assert!((farm.water_used - 0.8).abs() < 1e-9);

        assert!(farm.fertilize_tile(0, 0));
        assert!(farm.fertilize_tile(0, 0));
        assert!(farm.fertilize_tile(0, 0));
        // 0.2 -> 0.5 -> 0.8 -> 1.0
        assert!((farm.fertilizer_used - 0.8).abs() < 1e-9);
    }

    #[test]
    fn levels_stay_in_bounds() {
        let mut farm = Farm::new(2, 1);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let weather = WeatherData::new(20.0, 0.0, 50.0);

        for day in 1..=28 {
            if day % 2 == 0 {
                farm.water_tile(0, 0);
                farm.fertilize_tile(0, 0);
            }
            if day % 5 == 0 {
                farm.apply_rainfall(80.0);
            }
            farm.update(date(day), &weather, &mut rng);

            for (_, _, tile) in farm.tiles() {
                assert!((0.0..=tile.max_water).contains(&tile.water_level));
                assert!((0.0..=tile.max_nutrients).contains(&tile.nutrient_level));
            }
        }
    }

    #[test]
    fn rainfall_waters_every_tile() {
        let mut farm = Farm::new(2, 2);
        assert_eq!(farm.apply_rainfall(0.0), 0.0);

        let absorbed = farm.apply_rainfall(20.0);
        assert!((absorbed - 0.8).abs() < 1e-9);
        assert!((farm.water_used - 0.8).abs() < 1e-9);
        for (_, _, tile) in farm.tiles() {
            assert!((tile.water_level - 0.4).abs() < 1e-9);
        }
    }

    #[test]
    fn harvest_immature_leaves_crop() {
        let mut farm = Farm::new(1, 1);
        farm.plant_crop(0, 0, CropKind::Corn);
        assert_eq!(farm.harvest_crop(0, 0), 0.0);
        assert!(farm.get_tile(0, 0).unwrap().has_crop());
        assert_eq!(farm.total_harvested, 0);
    }

    #[test]
    fn harvest_perfect_crop_returns_base_yield() {
        for kind in CropKind::ALL {
            let mut farm = Farm::new(1, 1);
            farm.plant_crop(0, 0, kind);
            let crop = farm.crop_mut(0, 0).unwrap();
            crop.growth_stage = 1.0;
            crop.health = 1.0;

            let amount = farm.harvest_crop(0, 0);
            assert_eq!(amount, kind.default_profile().base_yield);
            assert_eq!(farm.total_harvested, 1);
            assert!(!farm.get_tile(0, 0).unwrap().has_crop());
        }
    }

    #[test]
    fn treat_and_protect_need_a_crop() {
        let mut farm = Farm::new(1, 1);
        assert!(!farm.treat_tile(0, 0));
        assert!(!farm.protect_tile(0, 0));

        farm.plant_crop(0, 0, CropKind::Tomato);
        assert!(farm.treat_tile(0, 0));
        assert!(farm.protect_tile(0, 0));
        assert!(farm.protect_tile(0, 0));
        assert!(farm.get_tile(0, 0).unwrap().crop.as_ref().unwrap().weather_protection);
    }

    #[test]
    fn outbreaks_only_on_every_third_day_of_month() {
        let mut farm = Farm::with_config(1, 1, always_outbreak());
        farm.plant_crop(0, 0, CropKind::Corn);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let weather = WeatherData::default();

        assert!(farm.update(date(1), &weather, &mut rng).is_none());
        assert!(farm.update(date(2), &weather, &mut rng).is_none());
        let outbreak = farm.update(date(3), &weather, &mut rng).unwrap();
        assert_eq!((outbreak.x, outbreak.y), (0, 0));
        assert_eq!(farm.last_outbreak_day, Some(date(3)));
    }

    #[test]
    fn outbreak_cooldown_holds() {
        let mut farm = Farm::with_config(4, 4, always_outbreak());
        for y in 0..4 {
            for x in 0..4 {
                farm.plant_crop(x, y, CropKind::Wheat);
            }
        }
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let weather = WeatherData::default();

        let mut outbreak_days = Vec::new();
        for day in 1..=30 {
            if farm.update(date(day), &weather, &mut rng).is_some() {
                outbreak_days.push(day);
            }
        }

        assert_eq!(outbreak_days, vec![3, 12, 21, 30]);
        for pair in outbreak_days.windows(2) {
            assert!(pair[1] - pair[0] >= 7);
        }
    }

    #[test]
    fn outbreak_targets_only_healthy_crops() {
        let mut farm = Farm::with_config(2, 1, always_outbreak());
        farm.plant_crop(0, 0, CropKind::Corn);
        farm.plant_crop(1, 0, CropKind::Corn);
        farm.crop_mut(0, 0).unwrap().infest_with_pest(Pest::Aphids);
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        let outbreak = farm
            .update(date(3), &WeatherData::default(), &mut rng)
            .unwrap();
        assert_eq!((outbreak.x, outbreak.y), (1, 0));
        assert!(!farm.get_tile(1, 0).unwrap().crop.as_ref().unwrap().is_healthy());
    }

    #[test]
    fn no_healthy_crop_means_no_outbreak_and_no_cooldown() {
        let mut farm = Farm::with_config(1, 1, always_outbreak());
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        assert!(farm.update(date(3), &WeatherData::default(), &mut rng).is_none());
        assert_eq!(farm.last_outbreak_day, None);
    }

    #[test]
    fn zero_check_interval_disables_outbreaks() {
        let mut config = always_outbreak();
        config.outbreak.check_every_day_of_month = 0;
        let mut farm = Farm::with_config(2, 2, config);
        farm.plant_crop(0, 1, CropKind::Wheat);
        let mut rng = ChaCha8Rng::seed_from_u64(4);

        for day in 1..=31 {
            assert!(farm.update(date(day), &WeatherData::default(), &mut rng).is_none());
        }
        assert_eq!(farm.last_outbreak_day, None);
    }

    #[test]
    fn zero_chance_never_spawns() {
        let mut config = BalanceConfig::default();
        config.outbreak.chance = 0.0;
        let mut farm = Farm::with_config(3, 3, config);
        farm.plant_crop(1, 1, CropKind::Tomato);
        let mut rng = ChaCha8Rng::seed_from_u64(8);

        for day in 1..=31 {
            assert!(farm.update(date(day), &WeatherData::default(), &mut rng).is_none());
        }
    }

    #[test]
    fn update_uses_weather_defaults() {
        let mut explicit = Farm::new(1, 1);
        let mut implicit = Farm::new(1, 1);
        explicit.plant_crop(0, 0, CropKind::Corn);
        implicit.plant_crop(0, 0, CropKind::Corn);
        let mut rng_a = ChaCha8Rng::seed_from_u64(2);
        let mut rng_b = ChaCha8Rng::seed_from_u64(2);

        explicit.update(date(1), &WeatherData::new(20.0, 0.0, 50.0), &mut rng_a);
        implicit.update(date(1), &WeatherData::default(), &mut rng_b);

        assert_eq!(
            explicit.get_tile(0, 0).unwrap(),
            implicit.get_tile(0, 0).unwrap()
        );
    }

    #[test]
    fn update_decays_then_grows() {
        let mut farm = Farm::new(1, 1);
        farm.plant_crop(0, 0, CropKind::Wheat);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        farm.update(date(1), &WeatherData::default(), &mut rng);

        let tile = farm.get_tile(0, 0).unwrap();
        assert!((tile.water_level - 0.15).abs() < 1e-9);
        assert!((tile.nutrient_level - 0.19).abs() < 1e-9);
        let crop = tile.crop.as_ref().unwrap();
        assert_eq!(crop.days_since_planted, 1);
        // water_match = 1 - |0.15 - 0.4| = 0.75, nutrient_match = 0.19 / 0.3
        let expected = 0.12 * (0.19f64 / 0.3).min(0.75);
        assert!((crop.growth_stage - expected).abs() < 1e-9);
    }
}
