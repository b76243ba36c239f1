use crate::config::TileTuning;

use super::crop::{Crop, CropKind};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Harvest {
    pub kind: CropKind,
    pub amount: f64,
}

/// One grid cell: an optional crop plus its soil water and nutrient levels.
#[derive(Debug, Clone, PartialEq)]
pub struct FarmTile {
    pub crop: Option<Crop>,
    pub water_level: f64,
    pub max_water: f64,
    pub nutrient_level: f64,
    pub max_nutrients: f64,
}

impl FarmTile {
    pub fn new(tuning: &TileTuning) -> Self {
        Self {
            crop: None,
            water_level: tuning.initial_water.clamp(0.0, tuning.max_water),
            max_water: tuning.max_water,
            nutrient_level: tuning.initial_nutrients.clamp(0.0, tuning.max_nutrients),
            max_nutrients: tuning.max_nutrients,
        }
    }

    pub fn has_crop(&self) -> bool {
        self.crop.is_some()
    }

    pub fn plant(&mut self, crop: Crop) -> bool {
        if self.crop.is_some() {
            return false;
        }
        self.crop = Some(crop);
        true
    }

    /// Returns the amount actually absorbed.
    pub fn add_water(&mut self, amount: f64) -> f64 {
        let before = self.water_level;
        self.water_level = (self.water_level + amount).clamp(0.0, self.max_water);
        self.water_level - before
    }

    /// Returns the amount actually absorbed.
    pub fn add_nutrients(&mut self, amount: f64) -> f64 {
        let before = self.nutrient_level;
        self.nutrient_level = (self.nutrient_level + amount).clamp(0.0, self.max_nutrients);
        self.nutrient_level - before
    }

    pub fn decay(&mut self, water_loss: f64, nutrient_loss: f64) {
        self.water_level = (self.water_level - water_loss).max(0.0);
        self.nutrient_level = (self.nutrient_level - nutrient_loss).max(0.0);
    }

    pub fn water_fraction(&self) -> f64 {
        self.water_level / self.max_water
    }

    pub fn nutrient_fraction(&self) -> f64 {
        self.nutrient_level / self.max_nutrients
    }

    /// Remove a mature crop and report its yield. Immature crops stay put.
    pub fn harvest(&mut self) -> Option<Harvest> {
        let crop = self.crop.as_ref()?;
        if !crop.is_mature() {
            return None;
        }
        let amount = crop.get_yield(self.water_fraction(), self.nutrient_fraction());
        let kind = crop.kind;
        self.crop = None;
        Some(Harvest { kind, amount })
    }
}

impl Default for FarmTile {
    fn default() -> Self {
        Self::new(&TileTuning::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_tile_starts_partly_watered() {
        let tile = FarmTile::default();
        assert_eq!(tile.water_level, 0.2);
        assert_eq!(tile.nutrient_level, 0.2);
        assert!(!tile.has_crop());
    }

    #[test]
    fn water_is_capped_and_reports_actual_delta() {
        let mut tile = FarmTile::default();
        assert!((tile.add_water(0.5) - 0.5).abs() < 1e-9);
        let absorbed = tile.add_water(0.5);
        assert!((absorbed - 0.3).abs() < 1e-9);
        assert_eq!(tile.water_level, 1.0);
        assert_eq!(tile.add_water(0.5), 0.0);
    }

    #[test]
    fn decay_floors_at_zero() {
        let mut tile = FarmTile::default();
        for _ in 0..30 {
            tile.decay(0.05, 0.01);
        }
        assert_eq!(tile.water_level, 0.0);
        assert_eq!(tile.nutrient_level, 0.0);
    }

    #[test]
    fn planting_an_occupied_tile_fails() {
        let mut tile = FarmTile::default();
        assert!(tile.plant(Crop::new(CropKind::Wheat)));
        assert!(!tile.plant(Crop::new(CropKind::Corn)));
        assert_eq!(tile.crop.as_ref().map(|c| c.kind), Some(CropKind::Wheat));
    }

    #[test]
    fn harvest_requires_maturity() {
        let mut tile = FarmTile::default();
        tile.plant(Crop::new(CropKind::Tomato));
        assert_eq!(tile.harvest(), None);
        assert!(tile.has_crop());

        if let Some(crop) = tile.crop.as_mut() {
            crop.growth_stage = 1.0;
        }
        let harvest = tile.harvest().unwrap();
        assert_eq!(harvest.kind, CropKind::Tomato);
        assert_eq!(harvest.amount, 10.0);
        assert!(!tile.has_crop());
    }
}
